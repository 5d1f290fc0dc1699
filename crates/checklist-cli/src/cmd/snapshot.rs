use crate::output::print_json;
use anyhow::Context;
use checklist_core::session::Session;
use checklist_core::snapshot::{export_filename, report_filename};
use checklist_core::sop::SopInfo;
use checklist_core::store::{storage_key_for, Store};
use checklist_core::ChecklistError;
use chrono::Utc;
use std::path::Path;

/// Resolve an `--out` target: a directory gets the conventional filename
/// appended; anything else is used as the file path directly.
fn resolve_out(out: &Path, conventional: &str) -> std::path::PathBuf {
    if out.is_dir() {
        out.join(conventional)
    } else {
        out.to_path_buf()
    }
}

pub fn report(store: Store, sop_id: &str, out: Option<&Path>) -> anyhow::Result<()> {
    let session = Session::open(store, sop_id).context("failed to load checklist")?;
    let now = Utc::now();
    let text = session.generate_report(now);

    match out {
        None => print!("{text}"),
        Some(out) => {
            let path = resolve_out(out, &report_filename(&session.sop_info().id, now));
            std::fs::write(&path, &text)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            println!("Wrote report to {}", path.display());
        }
    }
    Ok(())
}

pub fn export(store: Store, sop_id: &str, out: Option<&Path>) -> anyhow::Result<()> {
    let session = Session::open(store, sop_id).context("failed to load checklist")?;
    let now = Utc::now();
    let blob = session.export_json(now).context("failed to export checklist")?;

    match out {
        None => println!("{blob}"),
        Some(out) => {
            let path = resolve_out(out, &export_filename(&session.sop_info().id, now));
            std::fs::write(&path, &blob)
                .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
            println!("Wrote snapshot to {}", path.display());
        }
    }
    Ok(())
}

pub fn import(store: Store, sop_id: &str, file: &Path, json: bool) -> anyhow::Result<()> {
    let blob = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    // Importing into an empty slot starts a fresh checklist there.
    let mut created_fresh = false;
    let mut session = match Session::open(store.clone(), sop_id) {
        Ok(session) => session,
        Err(ChecklistError::NotFound(_)) => {
            created_fresh = true;
            Session::create(
                store.clone(),
                SopInfo {
                    id: sop_id.to_string(),
                    ..Default::default()
                },
            )
            .context("failed to start a fresh checklist")?
        }
        Err(e) => return Err(e).context("failed to load checklist"),
    };
    session
        .import_json(&blob)
        .with_context(|| format!("failed to import {}", file.display()))?;

    // A blob carrying a different sopInfo.id re-keys the checklist; don't
    // leave the just-created empty slot stranded under the addressed id.
    if created_fresh && storage_key_for(&session.sop_info().id) != storage_key_for(sop_id) {
        store
            .remove(sop_id)
            .context("failed to remove the empty placeholder slot")?;
    }

    if json {
        print_json(session.instance())?;
    } else {
        println!(
            "Imported {} ({} steps, {} enhancements)",
            file.display(),
            session.steps().len(),
            session.enhancements().len()
        );
    }
    Ok(())
}
