use crate::cmd::to_index;
use crate::output::{print_json, print_table};
use anyhow::{bail, Context};
use checklist_core::session::Session;
use checklist_core::store::Store;
use checklist_core::tokens;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum StepSubcommand {
    /// Append a step to the end of the checklist
    Add {
        #[arg(required = true)]
        title: Vec<String>,
        #[arg(long, default_value = "")]
        command: String,
        #[arg(long, default_value = "")]
        reminder: String,
    },
    /// Insert a step immediately after the given position (0 = at the head)
    Insert {
        after: usize,
        #[arg(required = true)]
        title: Vec<String>,
        #[arg(long, default_value = "")]
        command: String,
        #[arg(long, default_value = "")]
        reminder: String,
    },
    /// Duplicate a step (fresh id, cleared run history)
    Dup { step: usize },
    /// Move a step one position up
    Up { step: usize },
    /// Move a step one position down
    Down { step: usize },
    /// Delete a step and its entire run history
    Rm {
        step: usize,
        /// Confirm the irreversible delete
        #[arg(long)]
        yes: bool,
    },
    /// Toggle a step's done flag
    Done { step: usize },
    /// Edit step text fields (unnamed fields keep their value)
    Edit {
        step: usize,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        command: Option<String>,
        #[arg(long)]
        reminder: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List all steps
    List,
    /// Show full details for one step
    Show { step: usize },
}

pub fn run(store: Store, sop_id: &str, subcmd: StepSubcommand, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(store, sop_id).context("failed to load checklist")?;
    match subcmd {
        StepSubcommand::Add {
            title,
            command,
            reminder,
        } => {
            let title = title.join(" ");
            session
                .add_step(&title, &command, &reminder)
                .context("failed to add step")?;
            done(&session, json, format!("Added step {}: {title}", session.steps().len()))
        }
        StepSubcommand::Insert {
            after,
            title,
            command,
            reminder,
        } => {
            let title = title.join(" ");
            if after == 0 {
                session
                    .insert_step_at(0, &title, &command, &reminder)
                    .context("failed to insert step")?;
                done(&session, json, format!("Inserted step at the head: {title}"))
            } else {
                session
                    .insert_step_after(to_index(after, "step")?, &title, &command, &reminder)
                    .context("failed to insert step")?;
                done(&session, json, format!("Inserted step after {after}: {title}"))
            }
        }
        StepSubcommand::Dup { step } => {
            session
                .duplicate_step(to_index(step, "step")?)
                .context("failed to duplicate step")?;
            done(&session, json, format!("Duplicated step {step}"))
        }
        StepSubcommand::Up { step } => {
            session.move_step(to_index(step, "step")?, -1)?;
            done(&session, json, format!("Moved step {step} up"))
        }
        StepSubcommand::Down { step } => {
            session.move_step(to_index(step, "step")?, 1)?;
            done(&session, json, format!("Moved step {step} down"))
        }
        StepSubcommand::Rm { step, yes } => {
            if !yes {
                bail!("deleting a step discards its run history; re-run with --yes to confirm");
            }
            let removed = session
                .delete_step(to_index(step, "step")?)
                .context("failed to delete step")?;
            done(
                &session,
                json,
                format!("Deleted step {step}: {} ({} runs)", removed.title, removed.runs.len()),
            )
        }
        StepSubcommand::Done { step } => {
            let now_done = session
                .toggle_done(to_index(step, "step")?)
                .context("failed to toggle step")?;
            let state = if now_done { "done" } else { "not done" };
            done(&session, json, format!("Step {step} is now {state}"))
        }
        StepSubcommand::Edit {
            step,
            title,
            command,
            reminder,
            notes,
        } => {
            if title.is_none() && command.is_none() && reminder.is_none() && notes.is_none() {
                bail!("nothing to update: pass at least one field flag");
            }
            let index = to_index(step, "step")?;
            if let Some(t) = &title {
                session.set_step_title(index, t)?;
            }
            if let Some(c) = &command {
                session.set_step_command(index, c)?;
            }
            if let Some(r) = &reminder {
                session.set_step_reminder(index, r)?;
            }
            if let Some(n) = &notes {
                session.set_step_notes(index, n)?;
            }
            session.flush().context("failed to save checklist")?;
            done(&session, json, format!("Updated step {step}"))
        }
        StepSubcommand::List => list(&session, json),
        StepSubcommand::Show { step } => show(&session, to_index(step, "step")?, json),
    }
}

fn done(session: &Session, json: bool, message: String) -> anyhow::Result<()> {
    if json {
        print_json(&session.instance().steps)?;
    } else {
        println!("{message}");
    }
    Ok(())
}

fn list(session: &Session, json: bool) -> anyhow::Result<()> {
    let steps = session.steps();
    if json {
        print_json(&steps)?;
        return Ok(());
    }
    if steps.is_empty() {
        println!("No steps yet. Add one with 'chk step add <title>'.");
        return Ok(());
    }

    let total_done = steps.iter().filter(|s| s.done).count();
    println!("{total_done}/{} steps done", steps.len());
    println!();

    let rows: Vec<Vec<String>> = steps
        .iter()
        .map(|s| {
            vec![
                s.order.to_string(),
                if s.done { "x" } else { "" }.to_string(),
                s.title.clone(),
                s.runs.len().to_string(),
            ]
        })
        .collect();
    print_table(&["#", "DONE", "TITLE", "RUNS"], rows);
    Ok(())
}

fn show(session: &Session, index: usize, json: bool) -> anyhow::Result<()> {
    let sop = session.sop_info();
    let step = session
        .steps()
        .get(index)
        .with_context(|| format!("no step at position {}", index + 1))?;

    if json {
        print_json(step)?;
        return Ok(());
    }

    println!("Step {}: {}", step.order, step.title);
    println!("Id:       {}", step.id);
    println!("Done:     {}", if step.done { "yes" } else { "no" });
    if !step.command.is_empty() {
        println!("Command:  {}", tokens::resolve(&step.command, &sop.id));
    }
    if !step.reminder.is_empty() {
        println!("Reminder: {}", tokens::resolve(&step.reminder, &sop.id));
    }
    if !step.notes.is_empty() {
        println!("Notes:    {}", step.notes);
    }
    if step.runs.is_empty() {
        println!("Runs:     (none yet)");
    } else {
        println!("Runs:");
        for (j, run) in step.runs.iter().enumerate() {
            let end = if run.end.is_empty() { "(not done)" } else { &run.end };
            println!("  [{}] {}: {} -> {}", run.kind, j + 1, run.start, end);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_core::sop::SopInfo;
    use tempfile::TempDir;

    fn seeded_store(dir: &TempDir, id: &str, titles: &[&str]) -> Store {
        let store = Store::open(dir.path());
        let mut session = Session::create(
            store.clone(),
            SopInfo {
                id: id.to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        for title in titles {
            session.add_step(title, "", "").unwrap();
        }
        store
    }

    #[test]
    fn insert_position_zero_goes_to_head() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, "X", &["existing"]);

        run(
            store.clone(),
            "X",
            StepSubcommand::Insert {
                after: 0,
                title: vec!["prologue".to_string()],
                command: String::new(),
                reminder: String::new(),
            },
            false,
        )
        .unwrap();

        let steps = store.load("X").unwrap().steps;
        assert_eq!(steps[0].title, "prologue");
        assert_eq!(steps[0].order, 1);
        assert_eq!(steps[1].title, "existing");
    }

    #[test]
    fn rm_without_confirmation_is_refused() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, "X", &["keep me"]);

        let err = run(
            store.clone(),
            "X",
            StepSubcommand::Rm { step: 1, yes: false },
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("--yes"));
        assert_eq!(store.load("X").unwrap().steps.len(), 1);
    }
}
