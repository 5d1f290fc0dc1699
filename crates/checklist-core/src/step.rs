use crate::error::{ChecklistError, Result};
use crate::ident;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Run,
    Redo,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKind::Run => f.write_str("Run"),
            RunKind::Redo => f.write_str("Redo"),
        }
    }
}

/// One execution attempt of a step. `end == ""` means the attempt has been
/// started but not yet marked done. Both stamps are free-form text so a user
/// can correct them by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub kind: RunKind,
    pub start: String,
    #[serde(default)]
    pub end: String,
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Step {
    pub id: String,
    /// 1-based position. Derived: re-computed by [`normalize_orders`] after
    /// every structural mutation, never trusted from input.
    pub order: u32,
    pub title: String,
    pub command: String,
    pub reminder: String,
    pub notes: String,
    pub done: bool,
    pub runs: Vec<Run>,
}

impl Default for Step {
    fn default() -> Self {
        Self {
            id: String::new(),
            order: 0,
            title: String::new(),
            command: String::new(),
            reminder: String::new(),
            notes: String::new(),
            done: false,
            runs: Vec::new(),
        }
    }
}

impl Step {
    fn new(title: impl Into<String>, command: impl Into<String>, reminder: impl Into<String>) -> Self {
        Self {
            id: ident::new_step_id(),
            title: title.into(),
            command: command.into(),
            reminder: reminder.into(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Step list operations (operate on a mutable Vec<Step>)
// ---------------------------------------------------------------------------

/// Re-derive `order` as position + 1 for every step. Idempotent; called after
/// every structural mutation and after load/import.
pub fn normalize_orders(steps: &mut [Step]) {
    for (i, step) in steps.iter_mut().enumerate() {
        step.order = i as u32 + 1;
    }
}

/// Append a new step. Rejects an empty title; no other field is validated.
pub fn add_step(
    steps: &mut Vec<Step>,
    title: &str,
    command: &str,
    reminder: &str,
) -> Result<String> {
    if title.trim().is_empty() {
        return Err(ChecklistError::Validation("step title is required".to_string()));
    }
    let step = Step::new(title, command, reminder);
    let id = step.id.clone();
    steps.push(step);
    normalize_orders(steps);
    Ok(id)
}

/// Insert a new step at position `at` (0 = head), clamped into range. Later
/// steps keep their ids; only `order` is re-derived.
pub fn insert_step_at(
    steps: &mut Vec<Step>,
    at: usize,
    title: &str,
    command: &str,
    reminder: &str,
) -> Result<String> {
    if title.trim().is_empty() {
        return Err(ChecklistError::Validation("step title is required".to_string()));
    }
    let step = Step::new(title, command, reminder);
    let id = step.id.clone();
    steps.insert(at.min(steps.len()), step);
    normalize_orders(steps);
    Ok(id)
}

/// Insert a new step immediately after `index`, clamped into range.
pub fn insert_step_after(
    steps: &mut Vec<Step>,
    index: usize,
    title: &str,
    command: &str,
    reminder: &str,
) -> Result<String> {
    let at = if steps.is_empty() {
        0
    } else {
        index.min(steps.len() - 1) + 1
    };
    insert_step_at(steps, at, title, command, reminder)
}

/// Deep-copy the step at `index` with a fresh id, cleared completion state,
/// and a " (copy)" title suffix; inserted right after the source.
pub fn duplicate_step(steps: &mut Vec<Step>, index: usize) -> Result<String> {
    let source = steps.get(index).ok_or(ChecklistError::StepNotFound(index))?;
    let mut copy = source.clone();
    copy.id = ident::new_step_id();
    copy.title = format!("{} (copy)", source.title);
    copy.done = false;
    copy.runs.clear();
    let id = copy.id.clone();
    steps.insert(index + 1, copy);
    normalize_orders(steps);
    Ok(id)
}

/// Swap the step at `index` with its neighbor at `index + direction`.
/// Out-of-bounds targets are a silent no-op, not an error.
pub fn move_step(steps: &mut [Step], index: usize, direction: i32) {
    if index >= steps.len() {
        return;
    }
    let Some(target) = index.checked_add_signed(direction as isize) else {
        return;
    };
    if target >= steps.len() {
        return;
    }
    steps.swap(index, target);
    normalize_orders(steps);
}

/// Remove the step at `index` together with its entire run history.
/// The confirmation prompt is the caller's responsibility.
pub fn delete_step(steps: &mut Vec<Step>, index: usize) -> Result<Step> {
    if index >= steps.len() {
        return Err(ChecklistError::StepNotFound(index));
    }
    let removed = steps.remove(index);
    normalize_orders(steps);
    Ok(removed)
}

/// Flip the `done` flag. Independent of run history: a step may be done with
/// no recorded runs, or have runs and stay not-done.
pub fn toggle_done(steps: &mut [Step], index: usize) -> Result<bool> {
    let step = find_mut(steps, index)?;
    step.done = !step.done;
    Ok(step.done)
}

/// Append a run attempt stamped with the current time and an open end.
pub fn start_run(steps: &mut [Step], index: usize, kind: RunKind) -> Result<()> {
    let step = find_mut(steps, index)?;
    step.runs.push(Run {
        kind,
        start: ident::run_stamp(Utc::now()),
        end: String::new(),
    });
    Ok(())
}

/// Stamp the run's `end` with the current time. `start` is untouched.
pub fn mark_run_done(steps: &mut [Step], index: usize, run_index: usize) -> Result<()> {
    let run = find_run_mut(steps, index, run_index)?;
    run.end = ident::run_stamp(Utc::now());
    Ok(())
}

/// Overwrite either timestamp with caller-supplied text. The text is not
/// validated as a real timestamp; this exists for manual correction.
pub fn edit_run_timestamps(
    steps: &mut [Step],
    index: usize,
    run_index: usize,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<()> {
    let run = find_run_mut(steps, index, run_index)?;
    if let Some(s) = start {
        run.start = s.to_string();
    }
    if let Some(e) = end {
        run.end = e.to_string();
    }
    Ok(())
}

/// Remove one run attempt permanently.
pub fn delete_run(steps: &mut [Step], index: usize, run_index: usize) -> Result<Run> {
    let step = find_mut(steps, index)?;
    if run_index >= step.runs.len() {
        return Err(ChecklistError::RunNotFound { step: index, run: run_index });
    }
    Ok(step.runs.remove(run_index))
}

fn find_mut(steps: &mut [Step], index: usize) -> Result<&mut Step> {
    steps.get_mut(index).ok_or(ChecklistError::StepNotFound(index))
}

fn find_run_mut(steps: &mut [Step], index: usize, run_index: usize) -> Result<&mut Run> {
    let step = find_mut(steps, index)?;
    step.runs
        .get_mut(run_index)
        .ok_or(ChecklistError::RunNotFound { step: index, run: run_index })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
