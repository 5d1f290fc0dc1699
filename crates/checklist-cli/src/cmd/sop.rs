use crate::output::print_json;
use anyhow::Context;
use checklist_core::session::Session;
use checklist_core::sop::SopPatch;
use checklist_core::store::{storage_key_for, Store};
use checklist_core::tokens;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum SopSubcommand {
    /// Show the checklist header
    Show,
    /// Update header fields (unnamed fields keep their value)
    Set {
        #[arg(long)]
        name: Option<String>,
        /// Changing the id moves the checklist to a new persistence slot
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        entity: Option<String>,
        #[arg(long)]
        repo: Option<String>,
        #[arg(long)]
        web_root: Option<String>,
        #[arg(long)]
        run_label: Option<String>,
        #[arg(long)]
        img_folder: Option<String>,
        #[arg(long)]
        template_tag: Option<String>,
    },
}

pub fn run(store: Store, sop_id: &str, subcmd: SopSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SopSubcommand::Show => show(store, sop_id, json),
        SopSubcommand::Set {
            name,
            id,
            entity,
            repo,
            web_root,
            run_label,
            img_folder,
            template_tag,
        } => set(
            store,
            sop_id,
            SopPatch {
                name,
                id,
                entity,
                repo,
                web_root,
                run_label,
                img_folder,
                template_tag,
            },
            json,
        ),
    }
}

fn show(store: Store, sop_id: &str, json: bool) -> anyhow::Result<()> {
    let session = Session::open(store, sop_id).context("failed to load checklist")?;
    let sop = session.sop_info();

    if json {
        print_json(sop)?;
        return Ok(());
    }

    let or_dash = |v: &str| if v.is_empty() { "-".to_string() } else { v.to_string() };
    println!("Name:         {}", or_dash(&sop.name));
    println!("SOP ID:       {}", or_dash(&sop.id));
    println!("Entity:       {}", or_dash(&sop.entity));
    println!("Repo:         {}", or_dash(&sop.repo));
    println!("Web Root:     {}", or_dash(&sop.web_root));
    println!("Run Label:    {}", or_dash(&sop.run_label));
    println!(
        "Image Folder: {}",
        or_dash(&tokens::resolve(&sop.img_folder, &sop.id))
    );
    println!("Template Tag: {}", or_dash(&sop.template_tag));
    Ok(())
}

fn set(store: Store, sop_id: &str, patch: SopPatch, json: bool) -> anyhow::Result<()> {
    if patch.is_empty() {
        anyhow::bail!("nothing to update: pass at least one field flag");
    }
    let mut session = Session::open(store.clone(), sop_id).context("failed to load checklist")?;
    session.apply_sop(&patch);
    session.flush().context("failed to save checklist")?;

    // A changed id re-keys the checklist; drop the superseded slot so it
    // cannot linger as a stale divergent copy.
    let new_id = session.sop_info().id.clone();
    if storage_key_for(&new_id) != storage_key_for(sop_id) {
        store
            .remove(sop_id)
            .context("failed to remove the superseded slot")?;
    }

    if json {
        print_json(session.sop_info())?;
    } else {
        println!("Updated header");
        if new_id != sop_id {
            println!("Checklist now saved under SOP id '{new_id}' (use --sop {new_id})");
        }
    }
    Ok(())
}
