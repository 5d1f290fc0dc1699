//! Flattened text report ("build log") generation.
//!
//! Pure function of the instance and a caller-supplied current time, so the
//! output is deterministic and testable without freezing the clock globally.

use crate::enhancement::Enhancement;
use crate::ident;
use crate::sop::SopInfo;
use crate::step::Step;
use crate::tokens;
use chrono::{DateTime, Utc};
use std::fmt::Write;

const BANNER: &str = "==================================================";
const RULE: &str = "--------------------------------------------------";
const NOT_SET: &str = "(not set)";
const NOT_DONE: &str = "(not done)";

fn or_not_set(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_SET
    } else {
        value
    }
}

pub fn generate_report(
    sop: &SopInfo,
    steps: &[Step],
    enhancements: &[Enhancement],
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    // Header
    writeln!(out, "{BANNER}").unwrap();
    writeln!(out, "SOP BUILD LOG").unwrap();
    writeln!(out, "{BANNER}").unwrap();
    writeln!(out, "Exported:     {}", ident::run_stamp(now)).unwrap();
    writeln!(out, "SOP Name:     {}", or_not_set(&sop.name)).unwrap();
    writeln!(out, "SOP ID:       {}", or_not_set(&sop.id)).unwrap();
    writeln!(out, "Entity:       {}", or_not_set(&sop.entity)).unwrap();
    writeln!(out, "Repo:         {}", or_not_set(&sop.repo)).unwrap();
    writeln!(out, "Web Root:     {}", or_not_set(&sop.web_root)).unwrap();
    writeln!(out, "Run Label:    {}", or_not_set(&sop.run_label)).unwrap();
    writeln!(
        out,
        "Image Folder: {}",
        or_not_set(&tokens::resolve(&sop.img_folder, &sop.id))
    )
    .unwrap();
    writeln!(out, "Template Tag: {}", or_not_set(&sop.template_tag)).unwrap();

    // Steps
    writeln!(out).unwrap();
    writeln!(out, "{RULE}").unwrap();
    writeln!(out, "STEPS").unwrap();
    writeln!(out, "{RULE}").unwrap();
    if steps.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "(no steps)").unwrap();
    }
    for (i, step) in steps.iter().enumerate() {
        writeln!(out).unwrap();
        // Display number is the 1-based position, independent of stored order.
        writeln!(out, "Step {}: {}", i + 1, step.title).unwrap();
        let reminder = tokens::flatten(&tokens::resolve(&step.reminder, &sop.id));
        if !reminder.is_empty() {
            writeln!(out, "  Reminder: {reminder}").unwrap();
        }
        if step.runs.is_empty() {
            writeln!(out, "  (no runs yet)").unwrap();
        }
        for (j, run) in step.runs.iter().enumerate() {
            writeln!(
                out,
                "  [{}] {}: {} -> {}",
                run.kind,
                j + 1,
                or_not_set(&run.start),
                if run.end.trim().is_empty() {
                    NOT_DONE
                } else {
                    &run.end
                }
            )
            .unwrap();
        }
        let notes = tokens::flatten(&step.notes);
        if !notes.is_empty() {
            writeln!(out, "  Notes: {notes}").unwrap();
        }
    }

    // Enhancements, stored most-recent-first
    writeln!(out).unwrap();
    writeln!(out, "{RULE}").unwrap();
    writeln!(out, "ENHANCEMENTS").unwrap();
    writeln!(out, "{RULE}").unwrap();
    if enhancements.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "(none)").unwrap();
    }
    for (i, enh) in enhancements.iter().enumerate() {
        writeln!(out).unwrap();
        writeln!(out, "{}. {}", i + 1, enh.main).unwrap();
        writeln!(
            out,
            "   Logged: {} | Category: {}",
            or_not_set(&enh.ts),
            enh.category
        )
        .unwrap();
        let notes = tokens::flatten(&enh.notes);
        if !notes.is_empty() {
            writeln!(out, "   Notes: {notes}").unwrap();
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhancement::{add_enhancement, Category};
    use crate::step::{
        add_step, edit_run_timestamps, start_run, RunKind,
    };
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 25, 9, 0, 0).unwrap()
    }

    #[test]
    fn report_is_deterministic_for_fixed_inputs() {
        let sop = SopInfo::default();
        let mut steps: Vec<Step> = Vec::new();
        add_step(&mut steps, "Build", "run build.sh", "").unwrap();
        start_run(&mut steps, 0, RunKind::Run).unwrap();
        edit_run_timestamps(&mut steps, 0, 0, Some("2026-08-25 08:00:00"), None).unwrap();

        let a = generate_report(&sop, &steps, &[], fixed_now());
        let b = generate_report(&sop, &steps, &[], fixed_now());
        assert_eq!(a, b);
    }

    #[test]
    fn empty_fields_show_not_set() {
        let report = generate_report(&SopInfo::default(), &[], &[], fixed_now());
        assert!(report.contains("SOP Name:     (not set)"));
        assert!(report.contains("SOP ID:       (not set)"));
        assert!(report.contains("Exported:     2026-08-25 09:00:00"));
        assert!(report.contains("(no steps)"));
    }

    #[test]
    fn step_numbering_ignores_stored_order() {
        let mut steps: Vec<Step> = Vec::new();
        add_step(&mut steps, "Build", "", "").unwrap();
        add_step(&mut steps, "Verify", "", "").unwrap();
        steps[0].order = 42;

        let report = generate_report(&SopInfo::default(), &steps, &[], fixed_now());
        assert!(report.contains("Step 1: Build"));
        assert!(report.contains("Step 2: Verify"));
    }

    #[test]
    fn run_lines_are_tagged_and_numbered() {
        let mut steps: Vec<Step> = Vec::new();
        add_step(&mut steps, "Build", "", "").unwrap();
        start_run(&mut steps, 0, RunKind::Run).unwrap();
        start_run(&mut steps, 0, RunKind::Redo).unwrap();
        edit_run_timestamps(&mut steps, 0, 0, Some("08:00"), Some("08:05")).unwrap();
        edit_run_timestamps(&mut steps, 0, 1, Some("09:00"), None).unwrap();

        let report = generate_report(&SopInfo::default(), &steps, &[], fixed_now());
        assert!(report.contains("  [Run] 1: 08:00 -> 08:05"));
        assert!(report.contains("  [Redo] 2: 09:00 -> (not done)"));
    }

    #[test]
    fn no_runs_yet_line_for_fresh_step() {
        let mut steps: Vec<Step> = Vec::new();
        add_step(&mut steps, "Verify", "", "").unwrap();
        let report = generate_report(&SopInfo::default(), &steps, &[], fixed_now());
        assert!(report.contains("  (no runs yet)"));
    }

    #[test]
    fn reminder_and_notes_are_flattened_and_resolved() {
        let sop = SopInfo {
            id: "ACME-001".to_string(),
            ..Default::default()
        };
        let mut steps: Vec<Step> = Vec::new();
        add_step(&mut steps, "Upload", "", "place files\nunder <SOP_ID>\tfolder").unwrap();
        steps[0].notes = "line one\nline two".to_string();

        let report = generate_report(&sop, &steps, &[], fixed_now());
        assert!(report.contains("  Reminder: place files under ACME-001 folder"));
        assert!(report.contains("  Notes: line one line two"));
        assert!(report.contains("Image Folder: ../outputs/images/ACME-001"));
    }

    #[test]
    fn unresolved_token_stays_literal() {
        let report = generate_report(&SopInfo::default(), &[], &[], fixed_now());
        assert!(report.contains("Image Folder: ../outputs/images/<SOP_ID>"));
    }

    #[test]
    fn enhancements_render_most_recent_first() {
        let mut enhancements: Vec<Enhancement> = Vec::new();
        add_enhancement(&mut enhancements, "older", Category::Enhancement, "").unwrap();
        add_enhancement(&mut enhancements, "newer", Category::Bug, "ctx\nhere").unwrap();

        let report = generate_report(&SopInfo::default(), &[], &enhancements, fixed_now());
        let newer_pos = report.find("1. newer").unwrap();
        let older_pos = report.find("2. older").unwrap();
        assert!(newer_pos < older_pos);
        assert!(report.contains("Category: Bug"));
        assert!(report.contains("   Notes: ctx here"));
    }
}
