//! CLI output formatting for every command.
//!
//! # Unit-First Display
//!
//! Every line leads with the unit identity (locale, layout, variant) so a
//! failure can be located and retried without reading paths. Paths follow as
//! secondary context.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! Catalogs
//! de (po/de.po)
//!     local/release → data/locale/de/LC_MESSAGES/dev.example.app.mo
//!     local/develop → data/locale/de/LC_MESSAGES/dev.example.app.develop.mo
//!     bundle/release → AppDir/share/locale/de/LC_MESSAGES/dev.example.app.mo
//!
//! 2 locales, 6 catalogs planned
//! ```
//!
//! ## Build
//!
//! ```text
//! ok      de local/release → data/locale/de/LC_MESSAGES/dev.example.app.mo
//! FAILED  xx local/release → data/locale/xx/LC_MESSAGES/dev.example.app.mo
//!     po/xx.po: line 3: not valid UTF-8
//!
//! Failed units
//!     xx local/release
//!
//! Staged 5 of 6 catalogs for 2 locales, 1 failed
//! ```
//!
//! ## Check
//!
//! ```text
//! de: 4 translated
//! nl: 5 translated, 1 fuzzy, 1 untranslated
//! xx: FAILED po/xx.po: line 3: not valid UTF-8
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::pipeline::{CheckResult, Plan};
use crate::stage::{StageEvent, StageReport, UnitOutcome, UnitReport};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 locale` / `2 locales`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

// ============================================================================
// List
// ============================================================================

/// Format the discovered catalogs with their planned outputs.
pub fn format_plan(plan: &Plan) -> Vec<String> {
    let mut lines = vec!["Catalogs".to_string()];

    for catalog in &plan.catalogs {
        lines.push(format!("{} ({})", catalog.locale, catalog.path.display()));
        for unit in plan.units.iter().filter(|u| u.locale == catalog.locale) {
            lines.push(format!(
                "{}{}/{} → {}",
                indent(1),
                unit.layout,
                unit.variant,
                unit.output.display()
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{}, {} planned",
        plural(plan.catalogs.len(), "locale"),
        plural(plan.units.len(), "catalog")
    ));
    lines
}

pub fn print_plan(plan: &Plan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format one finished unit.
pub fn format_unit(report: &UnitReport) -> Vec<String> {
    let status = match report.outcome {
        UnitOutcome::Staged { .. } => "ok",
        UnitOutcome::Failed { .. } => "FAILED",
        UnitOutcome::Skipped => "skipped",
    };
    let mut lines = vec![format!(
        "{:<8}{} → {}",
        status,
        report.unit.label(),
        report.unit.output.display()
    )];
    if let UnitOutcome::Failed { error } = &report.outcome {
        lines.push(format!("{}{}", indent(1), error));
    }
    lines
}

/// Format a progress event as display lines.
pub fn format_stage_event(event: &StageEvent) -> Vec<String> {
    match event {
        StageEvent::UnitFinished(report) => format_unit(report),
    }
}

/// Format the end-of-run summary: every failed or skipped unit, then counts.
pub fn format_summary(report: &StageReport) -> Vec<String> {
    let mut lines = Vec::new();

    let failed: Vec<&UnitReport> = report.failures().collect();
    if !failed.is_empty() {
        lines.push(String::new());
        lines.push("Failed units".to_string());
        for r in &failed {
            lines.push(format!("{}{}", indent(1), r.unit.label()));
        }
    }

    let skipped: Vec<&UnitReport> = report.skipped().collect();
    if !skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped units".to_string());
        for r in &skipped {
            lines.push(format!("{}{}", indent(1), r.unit.label()));
        }
    }

    let mut counts = format!(
        "Staged {} of {} for {}",
        report.staged().count(),
        plural(report.units.len(), "catalog"),
        plural(report.locale_count(), "locale")
    );
    if !failed.is_empty() {
        counts.push_str(&format!(", {} failed", failed.len()));
    }
    if !skipped.is_empty() {
        counts.push_str(&format!(", {} skipped", skipped.len()));
    }
    lines.push(String::new());
    lines.push(counts);
    lines
}

pub fn print_summary(report: &StageReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format per-catalog parse results.
pub fn format_check_results(results: &[CheckResult]) -> Vec<String> {
    results
        .iter()
        .map(|r| match &r.result {
            Ok(stats) => {
                let mut parts = vec![format!("{} translated", stats.translated)];
                if stats.fuzzy > 0 {
                    parts.push(format!("{} fuzzy", stats.fuzzy));
                }
                if stats.untranslated > 0 {
                    parts.push(format!("{} untranslated", stats.untranslated));
                }
                format!("{}: {}", r.catalog.locale, parts.join(", "))
            }
            Err(e) => format!("{}: FAILED {}", r.catalog.locale, e),
        })
        .collect()
}

pub fn print_check_results(results: &[CheckResult]) {
    for line in format_check_results(results) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompileError;
    use crate::discover::SourceCatalog;
    use crate::layout::{TargetLayout, Variant};
    use crate::pipeline::CatalogStats;
    use crate::stage::{StageUnit, plan};
    use std::path::PathBuf;

    const APP: &str = "dev.example.app";

    fn catalogs(locales: &[&str]) -> Vec<SourceCatalog> {
        locales
            .iter()
            .map(|l| SourceCatalog {
                locale: l.to_string(),
                path: PathBuf::from(format!("po/{l}.po")),
            })
            .collect()
    }

    fn unit(locale: &str, layout: &str, variant: Variant) -> StageUnit {
        StageUnit {
            locale: locale.into(),
            source: PathBuf::from(format!("po/{locale}.po")),
            layout: layout.into(),
            variant,
            output: PathBuf::from(format!(
                "data/locale/{locale}/LC_MESSAGES/{}",
                variant.file_name(APP)
            )),
        }
    }

    fn report(unit: StageUnit, outcome: UnitOutcome) -> UnitReport {
        UnitReport { unit, outcome }
    }

    // =========================================================================
    // List
    // =========================================================================

    #[test]
    fn plan_lists_outputs_per_locale() {
        let catalogs = catalogs(&["de"]);
        let layouts = vec![
            TargetLayout::local("data"),
            TargetLayout::bundle("AppDir/share"),
        ];
        let units = plan(&catalogs, &layouts, APP);
        let lines = format_plan(&Plan {
            app_id: APP.into(),
            catalogs,
            layouts,
            units,
        });

        assert_eq!(
            lines,
            vec![
                "Catalogs",
                "de (po/de.po)",
                "    local/release → data/locale/de/LC_MESSAGES/dev.example.app.mo",
                "    local/develop → data/locale/de/LC_MESSAGES/dev.example.app.develop.mo",
                "    bundle/release → AppDir/share/locale/de/LC_MESSAGES/dev.example.app.mo",
                "",
                "1 locale, 3 catalogs planned",
            ]
        );
    }

    #[test]
    fn empty_plan_still_has_count_line() {
        let lines = format_plan(&Plan {
            app_id: APP.into(),
            catalogs: vec![],
            layouts: vec![],
            units: vec![],
        });
        assert_eq!(lines.last().unwrap(), "0 locales, 0 catalogs planned");
    }

    // =========================================================================
    // Build
    // =========================================================================

    #[test]
    fn staged_unit_is_one_line() {
        let lines = format_unit(&report(
            unit("nl", "local", Variant::Develop),
            UnitOutcome::Staged { bytes: 120 },
        ));
        assert_eq!(
            lines,
            vec!["ok      nl local/develop → data/locale/nl/LC_MESSAGES/dev.example.app.develop.mo"]
        );
    }

    #[test]
    fn failed_unit_shows_reason() {
        let event = StageEvent::UnitFinished(report(
            unit("xx", "local", Variant::Release),
            UnitOutcome::Failed {
                error: "po/xx.po: line 3: not valid UTF-8".into(),
            },
        ));
        let lines = format_stage_event(&event);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("FAILED  xx local/release → "));
        assert_eq!(lines[1], "    po/xx.po: line 3: not valid UTF-8");
    }

    #[test]
    fn skipped_unit_is_marked() {
        let lines = format_unit(&report(
            unit("nl", "local", Variant::Release),
            UnitOutcome::Skipped,
        ));
        assert!(lines[0].starts_with("skipped nl local/release"));
    }

    #[test]
    fn summary_all_staged() {
        let stage_report = StageReport {
            units: vec![
                report(unit("de", "local", Variant::Release), UnitOutcome::Staged { bytes: 1 }),
                report(unit("nl", "local", Variant::Release), UnitOutcome::Staged { bytes: 1 }),
            ],
        };
        assert_eq!(
            format_summary(&stage_report),
            vec!["", "Staged 2 of 2 catalogs for 2 locales"]
        );
    }

    #[test]
    fn summary_names_every_failed_unit() {
        let failed = || UnitOutcome::Failed {
            error: "boom".into(),
        };
        let stage_report = StageReport {
            units: vec![
                report(unit("de", "local", Variant::Release), UnitOutcome::Staged { bytes: 1 }),
                report(unit("xx", "local", Variant::Release), failed()),
                report(unit("xx", "local", Variant::Develop), failed()),
                report(unit("zz", "local", Variant::Release), UnitOutcome::Skipped),
            ],
        };

        assert_eq!(
            format_summary(&stage_report),
            vec![
                "",
                "Failed units",
                "    xx local/release",
                "    xx local/develop",
                "",
                "Skipped units",
                "    zz local/release",
                "",
                "Staged 1 of 4 catalogs for 3 locales, 2 failed, 1 skipped",
            ]
        );
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn check_results_show_counts_and_failures() {
        let mut cats = catalogs(&["de", "nl", "xx"]).into_iter();
        let results = vec![
            CheckResult {
                catalog: cats.next().unwrap(),
                result: Ok(CatalogStats {
                    translated: 4,
                    fuzzy: 0,
                    untranslated: 0,
                }),
            },
            CheckResult {
                catalog: cats.next().unwrap(),
                result: Ok(CatalogStats {
                    translated: 5,
                    fuzzy: 1,
                    untranslated: 1,
                }),
            },
            CheckResult {
                catalog: cats.next().unwrap(),
                result: Err(CompileError::Parse {
                    path: PathBuf::from("po/xx.po"),
                    message: "line 3: not valid UTF-8".into(),
                }),
            },
        ];

        assert_eq!(
            format_check_results(&results),
            vec![
                "de: 4 translated",
                "nl: 5 translated, 1 fuzzy, 1 untranslated",
                "xx: FAILED po/xx.po: line 3: not valid UTF-8",
            ]
        );
    }
}
