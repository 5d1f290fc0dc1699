use crate::cmd::to_index;
use crate::output::print_json;
use anyhow::{bail, Context};
use checklist_core::session::Session;
use checklist_core::step::RunKind;
use checklist_core::store::Store;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum RunSubcommand {
    /// Start a run attempt on a step
    Start { step: usize },
    /// Start a redo attempt on a step
    Redo { step: usize },
    /// Mark a run attempt as finished
    Done { step: usize, run: usize },
    /// Overwrite a run's timestamps by hand
    Edit {
        step: usize,
        run: usize,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Delete a run attempt
    Rm { step: usize, run: usize },
}

pub fn run(store: Store, sop_id: &str, subcmd: RunSubcommand, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(store, sop_id).context("failed to load checklist")?;
    match subcmd {
        RunSubcommand::Start { step } => {
            session
                .start_run(to_index(step, "step")?, RunKind::Run)
                .context("failed to start run")?;
            done(&session, step, json, format!("Started run on step {step}"))
        }
        RunSubcommand::Redo { step } => {
            session
                .start_run(to_index(step, "step")?, RunKind::Redo)
                .context("failed to start redo")?;
            done(&session, step, json, format!("Started redo on step {step}"))
        }
        RunSubcommand::Done { step, run } => {
            session
                .mark_run_done(to_index(step, "step")?, to_index(run, "run")?)
                .context("failed to mark run done")?;
            done(&session, step, json, format!("Finished run {run} on step {step}"))
        }
        RunSubcommand::Edit {
            step,
            run,
            start,
            end,
        } => {
            if start.is_none() && end.is_none() {
                bail!("nothing to update: pass --start and/or --end");
            }
            session
                .edit_run_timestamps(
                    to_index(step, "step")?,
                    to_index(run, "run")?,
                    start.as_deref(),
                    end.as_deref(),
                )
                .context("failed to edit run timestamps")?;
            done(&session, step, json, format!("Updated run {run} on step {step}"))
        }
        RunSubcommand::Rm { step, run } => {
            session
                .delete_run(to_index(step, "step")?, to_index(run, "run")?)
                .context("failed to delete run")?;
            done(&session, step, json, format!("Deleted run {run} from step {step}"))
        }
    }
}

fn done(session: &Session, step: usize, json: bool, message: String) -> anyhow::Result<()> {
    if json {
        // step was validated by the operation above
        print_json(&session.steps()[step - 1].runs)?;
    } else {
        println!("{message}");
    }
    Ok(())
}
