//! Builtin Catalog - core 계층 내장 모듈 카탈로그

use super::entry::ModuleRegistryEntry;

/// 내장 core 카탈로그 시드
///
/// `tetra.insights`는 journal/habits 데이터 위에서 동작하므로
/// 두 모듈이 먼저 설치되어 있어야 합니다.
pub(crate) fn builtin_catalog() -> Vec<ModuleRegistryEntry> {
    vec![
        ModuleRegistryEntry::new("tetra.calendar", "Calendar")
            .with_description("Schedule and deadline overview for the practical vertex")
            .with_category("planning")
            .with_tag("schedule")
            .with_tag("time")
            .with_manifest_ref("builtin:calendar")
            .verified(),
        ModuleRegistryEntry::new("tetra.journal", "Journal")
            .with_description("Daily reflection and mood logging")
            .with_category("reflection")
            .with_tag("writing")
            .with_tag("mood")
            .with_manifest_ref("builtin:journal")
            .verified(),
        ModuleRegistryEntry::new("tetra.habits", "Habit Tracker")
            .with_description("Recurring habit tracking with streaks")
            .with_category("health")
            .with_tag("routine")
            .with_manifest_ref("builtin:habits")
            .verified(),
        ModuleRegistryEntry::new("tetra.insights", "Insights")
            .with_description("Cross-module trends from journal and habit data")
            .with_category("analytics")
            .with_tag("trends")
            .with_dependency("tetra.journal")
            .with_dependency("tetra.habits")
            .with_manifest_ref("builtin:insights")
            .verified(),
    ]
}
