//! An owned editing session: one checklist instance bound to its store slot.
//!
//! Structural operations (add/insert/delete/move/duplicate, run lifecycle,
//! import) persist synchronously before returning. Free-text edits only mark
//! the session dirty and arm the autosave debouncer, so a burst of keystroke
//! edits costs one write after a quiet period instead of one write each.

use crate::enhancement::{self, Category, Enhancement};
use crate::error::Result;
use crate::instance::ChecklistInstance;
use crate::report;
use crate::snapshot;
use crate::sop::{SopInfo, SopPatch};
use crate::step::{self, RunKind, Step};
use crate::store::Store;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tracing::warn;

pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(600);

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

/// Single-slot trailing-edge timer: at most one pending save per session.
/// Re-arming replaces the deadline rather than queuing another save.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Clear and report a deadline that has passed. The caller performs the
    /// actual save.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Session {
    instance: ChecklistInstance,
    store: Store,
    autosave: Debouncer,
    dirty: bool,
}

impl Session {
    /// Start a brand-new checklist and write its initial slot.
    pub fn create(store: Store, sop_info: SopInfo) -> Result<Self> {
        let mut session = Self {
            instance: ChecklistInstance::new(sop_info),
            store,
            autosave: Debouncer::new(AUTOSAVE_DELAY),
            dirty: false,
        };
        session.persist()?;
        Ok(session)
    }

    /// Resume the checklist saved under `sop_id`.
    pub fn open(store: Store, sop_id: &str) -> Result<Self> {
        let instance = store.load(sop_id)?;
        Ok(Self {
            instance,
            store,
            autosave: Debouncer::new(AUTOSAVE_DELAY),
            dirty: false,
        })
    }

    pub fn instance(&self) -> &ChecklistInstance {
        &self.instance
    }

    pub fn sop_info(&self) -> &SopInfo {
        &self.instance.sop_info
    }

    pub fn steps(&self) -> &[Step] {
        &self.instance.steps
    }

    pub fn enhancements(&self) -> &[Enhancement] {
        &self.instance.enhancements
    }

    /// Normalize and write the slot. A synchronous save supersedes any
    /// pending autosave.
    fn persist(&mut self) -> Result<()> {
        self.instance.normalize();
        self.store.save(&self.instance)?;
        self.autosave.cancel();
        self.dirty = false;
        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.autosave.arm(Instant::now());
    }

    // -----------------------------------------------------------------------
    // Step operations (synchronous persistence)
    // -----------------------------------------------------------------------

    pub fn add_step(&mut self, title: &str, command: &str, reminder: &str) -> Result<String> {
        let id = step::add_step(&mut self.instance.steps, title, command, reminder)?;
        self.persist()?;
        Ok(id)
    }

    pub fn insert_step_at(
        &mut self,
        at: usize,
        title: &str,
        command: &str,
        reminder: &str,
    ) -> Result<String> {
        let id = step::insert_step_at(&mut self.instance.steps, at, title, command, reminder)?;
        self.persist()?;
        Ok(id)
    }

    pub fn insert_step_after(
        &mut self,
        index: usize,
        title: &str,
        command: &str,
        reminder: &str,
    ) -> Result<String> {
        let id = step::insert_step_after(&mut self.instance.steps, index, title, command, reminder)?;
        self.persist()?;
        Ok(id)
    }

    pub fn duplicate_step(&mut self, index: usize) -> Result<String> {
        let id = step::duplicate_step(&mut self.instance.steps, index)?;
        self.persist()?;
        Ok(id)
    }

    pub fn move_step(&mut self, index: usize, direction: i32) -> Result<()> {
        step::move_step(&mut self.instance.steps, index, direction);
        self.persist()
    }

    /// Caller confirmation is a precondition; the engine removes the step and
    /// its run history irrevocably.
    pub fn delete_step(&mut self, index: usize) -> Result<Step> {
        let removed = step::delete_step(&mut self.instance.steps, index)?;
        self.persist()?;
        Ok(removed)
    }

    pub fn toggle_done(&mut self, index: usize) -> Result<bool> {
        let done = step::toggle_done(&mut self.instance.steps, index)?;
        self.persist()?;
        Ok(done)
    }

    pub fn start_run(&mut self, index: usize, kind: RunKind) -> Result<()> {
        step::start_run(&mut self.instance.steps, index, kind)?;
        self.persist()
    }

    pub fn mark_run_done(&mut self, index: usize, run_index: usize) -> Result<()> {
        step::mark_run_done(&mut self.instance.steps, index, run_index)?;
        self.persist()
    }

    pub fn edit_run_timestamps(
        &mut self,
        index: usize,
        run_index: usize,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<()> {
        step::edit_run_timestamps(&mut self.instance.steps, index, run_index, start, end)?;
        self.persist()
    }

    pub fn delete_run(&mut self, index: usize, run_index: usize) -> Result<()> {
        step::delete_run(&mut self.instance.steps, index, run_index)?;
        self.persist()
    }

    // -----------------------------------------------------------------------
    // Free-text edits (debounced persistence)
    // -----------------------------------------------------------------------

    pub fn set_step_title(&mut self, index: usize, title: &str) -> Result<()> {
        self.edit_step(index, |s| s.title = title.to_string())
    }

    pub fn set_step_command(&mut self, index: usize, command: &str) -> Result<()> {
        self.edit_step(index, |s| s.command = command.to_string())
    }

    pub fn set_step_reminder(&mut self, index: usize, reminder: &str) -> Result<()> {
        self.edit_step(index, |s| s.reminder = reminder.to_string())
    }

    pub fn set_step_notes(&mut self, index: usize, notes: &str) -> Result<()> {
        self.edit_step(index, |s| s.notes = notes.to_string())
    }

    fn edit_step(&mut self, index: usize, edit: impl FnOnce(&mut Step)) -> Result<()> {
        let s = self
            .instance
            .steps
            .get_mut(index)
            .ok_or(crate::error::ChecklistError::StepNotFound(index))?;
        edit(s);
        self.mark_dirty();
        Ok(())
    }

    /// Apply a header patch. Header fields are keystroke-edited, so this
    /// schedules an autosave instead of writing immediately.
    pub fn apply_sop(&mut self, patch: &SopPatch) {
        self.instance.sop_info.apply(patch);
        self.mark_dirty();
    }

    // -----------------------------------------------------------------------
    // Enhancements (structural: synchronous persistence)
    // -----------------------------------------------------------------------

    pub fn add_enhancement(&mut self, main: &str, category: Category, notes: &str) -> Result<()> {
        enhancement::add_enhancement(&mut self.instance.enhancements, main, category, notes)?;
        self.persist()
    }

    pub fn remove_enhancement(&mut self, index: usize) -> Result<Enhancement> {
        let removed = enhancement::remove_enhancement(&mut self.instance.enhancements, index)?;
        self.persist()?;
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Snapshots & report
    // -----------------------------------------------------------------------

    pub fn export_json(&self, now: DateTime<Utc>) -> Result<String> {
        snapshot::export_json(&self.instance, now)
    }

    /// Replace the instance from an exported blob and persist. A failed
    /// import leaves both the instance and the slot untouched.
    pub fn import_json(&mut self, blob: &str) -> Result<()> {
        snapshot::import_json(&mut self.instance, blob)?;
        self.persist()
    }

    pub fn generate_report(&self, now: DateTime<Utc>) -> String {
        report::generate_report(
            &self.instance.sop_info,
            &self.instance.steps,
            &self.instance.enhancements,
            now,
        )
    }

    // -----------------------------------------------------------------------
    // Autosave plumbing
    // -----------------------------------------------------------------------

    /// Fire a due autosave. Returns whether a save happened.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        if self.autosave.fire_if_due(now) {
            self.persist()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Force out any unsaved edits, pending or not.
    pub fn flush(&mut self) -> Result<()> {
        if self.dirty || self.autosave.pending() {
            self.persist()?;
        }
        Ok(())
    }

    pub fn has_unsaved_edits(&self) -> bool {
        self.dirty
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Best-effort teardown save. Teardown must not panic, so a failure
        // is logged and swallowed.
        if self.dirty || self.autosave.pending() {
            if let Err(e) = self.persist() {
                warn!(error = %e, "teardown save failed");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
