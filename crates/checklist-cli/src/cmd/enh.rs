use crate::cmd::to_index;
use crate::output::{print_json, print_table};
use anyhow::Context;
use checklist_core::enhancement::Category;
use checklist_core::session::Session;
use checklist_core::store::Store;
use checklist_core::tokens;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum EnhSubcommand {
    /// Log an enhancement note (newest first)
    Add {
        #[arg(required = true)]
        text: Vec<String>,
        /// enhancement, bug, idea, or question
        #[arg(long, default_value = "enhancement")]
        category: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Remove an entry by position
    Rm { entry: usize },
    /// List all entries
    List,
}

pub fn run(store: Store, sop_id: &str, subcmd: EnhSubcommand, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(store, sop_id).context("failed to load checklist")?;
    match subcmd {
        EnhSubcommand::Add {
            text,
            category,
            notes,
        } => {
            let category: Category = category.parse()?;
            session
                .add_enhancement(&text.join(" "), category, &notes)
                .context("failed to add enhancement")?;
            if json {
                print_json(&session.enhancements())?;
            } else {
                println!("Logged {category} entry");
            }
            Ok(())
        }
        EnhSubcommand::Rm { entry } => {
            let removed = session
                .remove_enhancement(to_index(entry, "entry")?)
                .context("failed to remove enhancement")?;
            if json {
                print_json(&session.enhancements())?;
            } else {
                println!("Removed entry {entry}: {}", removed.main);
            }
            Ok(())
        }
        EnhSubcommand::List => {
            let entries = session.enhancements();
            if json {
                print_json(&entries)?;
                return Ok(());
            }
            if entries.is_empty() {
                println!("No enhancements logged.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    vec![
                        (i + 1).to_string(),
                        e.category.to_string(),
                        e.ts.clone(),
                        tokens::flatten(&e.main),
                    ]
                })
                .collect();
            print_table(&["#", "CATEGORY", "LOGGED", "TEXT"], rows);
            Ok(())
        }
    }
}
