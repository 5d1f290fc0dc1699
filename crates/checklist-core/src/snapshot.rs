//! Portable JSON snapshots: export the full instance (plus an export
//! timestamp) and re-import it with permissive field-by-field fallback.

use crate::enhancement::Enhancement;
use crate::error::{ChecklistError, Result};
use crate::ident;
use crate::instance::ChecklistInstance;
use crate::sop::SopInfo;
use crate::step::Step;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Snapshot<'a> {
    #[serde(rename = "sopInfo")]
    sop_info: &'a SopInfo,
    steps: &'a [Step],
    enhancements: &'a [Enhancement],
    exported_at: String,
}

/// Render the instance as a standalone JSON document. Pure: the instance is
/// only read, never mutated.
pub fn export_json(instance: &ChecklistInstance, now: DateTime<Utc>) -> Result<String> {
    let snapshot = Snapshot {
        sop_info: &instance.sop_info,
        steps: &instance.steps,
        enhancements: &instance.enhancements,
        exported_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

/// Replace the instance's collections from an exported blob.
///
/// Fallback is per top-level key: a snapshot missing `sopInfo`, `steps`, or
/// `enhancements` keeps the instance's prior value for that section instead
/// of clearing it. Every present section is decoded into a temporary before
/// any of them is committed, so a failed import leaves the instance
/// untouched. Order is re-normalized after commit.
pub fn import_json(instance: &mut ChecklistInstance, blob: &str) -> Result<()> {
    let value: serde_json::Value = serde_json::from_str(blob)
        .map_err(|e| ChecklistError::CorruptState(format!("snapshot is not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(ChecklistError::CorruptState(
            "snapshot root must be a JSON object".to_string(),
        ));
    }

    let sop_info: Option<SopInfo> = decode_section(&value, "sopInfo")?;
    let steps: Option<Vec<Step>> = decode_section(&value, "steps")?;
    let enhancements: Option<Vec<Enhancement>> = decode_section(&value, "enhancements")?;

    if let Some(s) = sop_info {
        instance.sop_info = s;
    }
    if let Some(s) = steps {
        instance.steps = s;
    }
    if let Some(e) = enhancements {
        instance.enhancements = e;
    }
    instance.normalize();
    Ok(())
}

fn decode_section<T: serde::de::DeserializeOwned>(
    value: &serde_json::Value,
    key: &str,
) -> Result<Option<T>> {
    match value.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(section) => serde_json::from_value(section.clone())
            .map(Some)
            .map_err(|e| ChecklistError::CorruptState(format!("bad '{key}' section: {e}"))),
    }
}

// ---------------------------------------------------------------------------
// Filename conventions
// ---------------------------------------------------------------------------

fn filename_id(sop_id: &str) -> String {
    let safe = ident::sanitize_for_filename(sop_id);
    if safe.is_empty() {
        "SOP".to_string()
    } else {
        safe
    }
}

/// `{sopId or "SOP"}_checklist_state_{MMDDYY_HHMM}.json`
pub fn export_filename(sop_id: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}_checklist_state_{}.json",
        filename_id(sop_id),
        ident::file_stamp(now)
    )
}

/// `{sopId or "SOP"}_build_log_{MMDDYY_HHMM}.txt`
pub fn report_filename(sop_id: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}_build_log_{}.txt",
        filename_id(sop_id),
        ident::file_stamp(now)
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhancement::{add_enhancement, Category};
    use crate::step::{add_step, start_run, RunKind};
    use chrono::TimeZone;

    fn sample_instance() -> ChecklistInstance {
        let mut instance = ChecklistInstance::new(SopInfo {
            id: "ACME-001".to_string(),
            name: "Publish SOP".to_string(),
            ..Default::default()
        });
        add_step(&mut instance.steps, "Build", "run build.sh", "").unwrap();
        add_step(&mut instance.steps, "Verify", "", "check outputs").unwrap();
        start_run(&mut instance.steps, 0, RunKind::Run).unwrap();
        add_enhancement(&mut instance.enhancements, "tighten perms", Category::Idea, "").unwrap();
        instance
    }

    #[test]
    fn export_then_import_is_identity() {
        let original = sample_instance();
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 9, 0, 0).unwrap();
        let blob = export_json(&original, now).unwrap();

        let mut restored = ChecklistInstance::default();
        import_json(&mut restored, &blob).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn export_carries_timestamp_and_schema_keys() {
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 9, 0, 0).unwrap();
        let blob = export_json(&sample_instance(), now).unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        assert_eq!(value["exported_at"], "2026-08-25T09:00:00Z");
        assert!(value.get("sopInfo").is_some());
    }

    #[test]
    fn import_missing_enhancements_keeps_prior_list() {
        let mut instance = sample_instance();
        import_json(&mut instance, r#"{"sopInfo": {"id": "NEW"}, "steps": []}"#).unwrap();
        assert_eq!(instance.sop_info.id, "NEW");
        assert!(instance.steps.is_empty());
        assert_eq!(instance.enhancements.len(), 1);
        assert_eq!(instance.enhancements[0].main, "tighten perms");
    }

    #[test]
    fn import_malformed_json_leaves_state_unchanged() {
        let mut instance = sample_instance();
        let before = instance.clone();
        let err = import_json(&mut instance, "{definitely not json").unwrap_err();
        assert!(matches!(err, ChecklistError::CorruptState(_)));
        assert_eq!(instance, before);
    }

    #[test]
    fn import_bad_section_leaves_state_unchanged() {
        let mut instance = sample_instance();
        let before = instance.clone();
        // Valid JSON, but `steps` has the wrong shape.
        let err = import_json(&mut instance, r#"{"steps": "oops"}"#).unwrap_err();
        assert!(matches!(err, ChecklistError::CorruptState(_)));
        assert_eq!(instance, before);
    }

    #[test]
    fn import_renormalizes_orders() {
        let mut instance = ChecklistInstance::default();
        import_json(
            &mut instance,
            r#"{"steps": [
                {"id": "a", "order": 7, "title": "x"},
                {"id": "b", "order": 7, "title": "y"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(instance.steps[0].order, 1);
        assert_eq!(instance.steps[1].order, 2);
    }

    #[test]
    fn filename_conventions() {
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 14, 3, 0).unwrap();
        assert_eq!(
            export_filename("ACME-001", now),
            "ACME-001_checklist_state_082526_1403.json"
        );
        assert_eq!(report_filename("", now), "SOP_build_log_082526_1403.txt");
        assert_eq!(
            report_filename("a b/c", now),
            "a_b_c_build_log_082526_1403.txt"
        );
    }
}
