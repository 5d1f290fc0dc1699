use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Generate a fresh step id. Ids are unique for the lifetime of an instance
/// and are never reassigned on reorder.
pub fn new_step_id() -> String {
    format!("s-{}", Uuid::new_v4().simple())
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Human-readable stamp recorded on run start/end, e.g. "2026-08-25 14:03:07".
pub fn run_stamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Compact stamp used in export/report filenames: MMDDYY_HHMM.
pub fn file_stamp(now: DateTime<Utc>) -> String {
    now.format("%m%d%y_%H%M").to_string()
}

// ---------------------------------------------------------------------------
// Filename sanitization
// ---------------------------------------------------------------------------

static UNSAFE_RE: OnceLock<Regex> = OnceLock::new();

fn unsafe_re() -> &'static Regex {
    UNSAFE_RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_\-]+").unwrap())
}

/// Reduce a SOP id to something safe in a filename. Empty input stays empty
/// so callers can fall back to the "SOP" default.
pub fn sanitize_for_filename(id: &str) -> String {
    unsafe_re().replace_all(id.trim(), "_").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn step_ids_are_distinct() {
        let a = new_step_id();
        let b = new_step_id();
        assert_ne!(a, b);
        assert!(a.starts_with("s-"));
    }

    #[test]
    fn file_stamp_format() {
        let t = Utc.with_ymd_and_hms(2026, 8, 25, 14, 3, 0).unwrap();
        assert_eq!(file_stamp(t), "082526_1403");
    }

    #[test]
    fn run_stamp_format() {
        let t = Utc.with_ymd_and_hms(2026, 8, 25, 14, 3, 7).unwrap();
        assert_eq!(run_stamp(t), "2026-08-25 14:03:07");
    }

    #[test]
    fn sanitize_strips_path_characters() {
        assert_eq!(sanitize_for_filename("ACME/001: test"), "ACME_001_test");
        assert_eq!(sanitize_for_filename("  "), "");
        assert_eq!(sanitize_for_filename("ACME-001"), "ACME-001");
    }
}
