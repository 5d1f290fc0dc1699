use crate::error::{ChecklistError, Result};
use crate::instance::ChecklistInstance;
use crate::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Base namespace shared by every checklist slot. A non-empty SOP id is
/// suffixed onto it so distinct checklists never overwrite each other.
pub const STORAGE_BASE: &str = "sop_checklist_state";

/// Pure sharding rule mapping a SOP id to its slot key. Same input always
/// yields the same key; the empty (or all-whitespace) id falls back to the
/// bare base namespace.
pub fn storage_key_for(sop_id: &str) -> String {
    let trimmed = sop_id.trim();
    if trimmed.is_empty() {
        STORAGE_BASE.to_string()
    } else {
        format!("{STORAGE_BASE}__{trimmed}")
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Durable key/value slots for checklist instances, one JSON file per slot
/// under a root directory.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default store root: `~/.sop-checklists`.
    pub fn open_default() -> Result<Self> {
        let home = home::home_dir().ok_or(ChecklistError::HomeNotFound)?;
        Ok(Self::open(home.join(".sop-checklists")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, sop_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", storage_key_for(sop_id)))
    }

    pub fn exists(&self, sop_id: &str) -> bool {
        self.slot_path(sop_id).exists()
    }

    /// Serialize the instance into its slot, keyed by the instance's own
    /// SOP id.
    pub fn save(&self, instance: &ChecklistInstance) -> Result<()> {
        let path = self.slot_path(&instance.sop_info.id);
        let data = serde_json::to_string_pretty(instance)?;
        io::atomic_write(&path, data.as_bytes())?;
        debug!(path = %path.display(), steps = instance.steps.len(), "saved checklist");
        Ok(())
    }

    /// Load the instance saved under `sop_id`. Fails with `NotFound` when no
    /// slot exists and with `CorruptState` when the slot file does not parse
    /// as the expected shape. The returned instance is re-normalized.
    pub fn load(&self, sop_id: &str) -> Result<ChecklistInstance> {
        let path = self.slot_path(sop_id);
        if !path.exists() {
            return Err(ChecklistError::NotFound(storage_key_for(sop_id)));
        }
        let data = std::fs::read_to_string(&path)?;
        let mut instance: ChecklistInstance = serde_json::from_str(&data)
            .map_err(|e| ChecklistError::CorruptState(e.to_string()))?;
        instance.normalize();
        debug!(path = %path.display(), steps = instance.steps.len(), "loaded checklist");
        Ok(instance)
    }

    /// Delete the slot saved under `sop_id`. Missing slots are an error so a
    /// typo'd id is caught instead of silently succeeding.
    pub fn remove(&self, sop_id: &str) -> Result<()> {
        let path = self.slot_path(sop_id);
        if !path.exists() {
            return Err(ChecklistError::NotFound(storage_key_for(sop_id)));
        }
        std::fs::remove_file(path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sop::SopInfo;
    use crate::step::add_step;
    use tempfile::TempDir;

    fn instance_with_id(id: &str) -> ChecklistInstance {
        ChecklistInstance::new(SopInfo {
            id: id.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn storage_key_is_pure_and_collision_free() {
        assert_eq!(storage_key_for(""), STORAGE_BASE);
        assert_eq!(storage_key_for("   "), STORAGE_BASE);
        assert_eq!(storage_key_for("ACME-001"), "sop_checklist_state__ACME-001");
        assert_eq!(storage_key_for("ACME-001"), storage_key_for("ACME-001"));
        assert_ne!(storage_key_for(""), storage_key_for("ACME-001"));
    }

    #[test]
    fn default_root_is_under_home() {
        let store = Store::open_default().unwrap();
        assert!(store.root().ends_with(".sop-checklists"));
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());

        let mut instance = instance_with_id("ACME-001");
        add_step(&mut instance.steps, "Build", "run build.sh", "").unwrap();
        store.save(&instance).unwrap();

        let loaded = store.load("ACME-001").unwrap();
        assert_eq!(loaded, instance);
        assert_eq!(loaded.steps[0].order, 1);
    }

    #[test]
    fn distinct_sop_ids_use_distinct_slots() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());

        let mut a = instance_with_id("A");
        add_step(&mut a.steps, "only in A", "", "").unwrap();
        let b = instance_with_id("B");

        store.save(&a).unwrap();
        store.save(&b).unwrap();

        assert_eq!(store.load("A").unwrap().steps.len(), 1);
        assert!(store.load("B").unwrap().steps.is_empty());
    }

    #[test]
    fn load_missing_slot_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        assert!(matches!(
            store.load("nope"),
            Err(ChecklistError::NotFound(_))
        ));
    }

    #[test]
    fn load_unparseable_slot_is_corrupt_state() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        std::fs::write(
            dir.path().join(format!("{}.json", storage_key_for("bad"))),
            "{not json",
        )
        .unwrap();
        assert!(matches!(
            store.load("bad"),
            Err(ChecklistError::CorruptState(_))
        ));
    }

    #[test]
    fn remove_deletes_only_that_slot() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        store.save(&instance_with_id("A")).unwrap();
        store.save(&instance_with_id("B")).unwrap();

        store.remove("A").unwrap();
        assert!(!store.exists("A"));
        assert!(store.exists("B"));
        assert!(store.remove("A").is_err());
    }
}
