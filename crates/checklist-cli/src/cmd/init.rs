use crate::output::print_json;
use anyhow::{bail, Context};
use checklist_core::session::Session;
use checklist_core::sop::{SopInfo, SopPatch};
use checklist_core::store::{storage_key_for, Store};

pub fn run(store: Store, patch: SopPatch, json: bool) -> anyhow::Result<()> {
    let mut sop_info = SopInfo::default();
    sop_info.apply(&patch);

    if store.exists(&sop_info.id) {
        bail!(
            "a checklist already exists under key '{}'; pick a different --id or remove it first",
            storage_key_for(&sop_info.id)
        );
    }

    let session =
        Session::create(store, sop_info).context("failed to save the new checklist")?;

    if json {
        print_json(session.instance())?;
    } else {
        let sop = session.sop_info();
        let label = if sop.id.is_empty() {
            "(default)"
        } else {
            sop.id.as_str()
        };
        println!("Initialized checklist {label}");
        println!("Saved under key: {}", storage_key_for(&sop.id));
    }
    Ok(())
}
