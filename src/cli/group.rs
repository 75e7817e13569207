//! Group CLI commands

use anyhow::Result;
use clap::{Args, Subcommand};

use super::output::Output;
use crate::domain::{Group, Links, Meta};
use crate::storage::Project;

/// Fields shared by `group add` and `item add`
#[derive(Args, Debug, Default)]
pub struct EntryArgs {
    /// Explicit sort priority (assigned automatically when omitted)
    #[arg(long, short, allow_negative_numbers = true)]
    pub priority: Option<i64>,

    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// Sibling this entry should follow
    #[arg(long)]
    pub after: Option<String>,

    /// Sibling this entry should precede
    #[arg(long)]
    pub before: Option<String>,
}

impl EntryArgs {
    pub fn meta(&self) -> Meta {
        Meta::new(self.name.clone(), self.description.clone())
    }

    pub fn links(&self) -> Links {
        Links::new(self.after.clone(), self.before.clone())
    }
}

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Add a group to a pack
    Add {
        /// Pack ID
        pack: String,

        /// Group ID
        id: String,

        #[command(flatten)]
        entry: EntryArgs,
    },

    /// Rename a group in place
    Rename {
        /// Pack ID
        pack: String,

        /// Current group ID
        id: String,

        /// New group ID
        new_id: String,
    },

    /// Remove a group and its items
    Remove {
        /// Pack ID
        pack: String,

        /// Group ID
        id: String,
    },
}

pub fn run(cmd: GroupCommands, output: &Output) -> Result<()> {
    match cmd {
        GroupCommands::Add { pack, id, entry } => add_group(output, &pack, &id, &entry),
        GroupCommands::Rename { pack, id, new_id } => rename_group(output, &pack, &id, &new_id),
        GroupCommands::Remove { pack, id } => remove_group(output, &pack, &id),
    }
}

fn add_group(output: &Output, pack_id: &str, id: &str, entry: &EntryArgs) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.store();
    let mut pack = store.load(pack_id)?;

    let mut group = Group::new(id)
        .with_meta(entry.meta())
        .with_links(entry.links())
        .with_step(pack.step());
    if let Some(priority) = entry.priority {
        group.set_priority(priority);
    }

    pack.add(group)?;
    let priority = pack.group(id)?.priority();
    output.verbose_ctx("group", &format!("Assigned priority {}", priority));

    store.save(&mut pack)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "pack": pack_id,
            "id": id,
            "priority": priority.value(),
            "explicit": priority.explicit().is_some(),
        }));
    } else {
        output.success(&format!("Added group {} to {}, priority {}", id, pack_id, priority));
    }

    Ok(())
}

fn rename_group(output: &Output, pack_id: &str, id: &str, new_id: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.store();
    let mut pack = store.load(pack_id)?;

    pack.rename_group(id, new_id)?;
    store.save(&mut pack)?;

    output.success(&format!("Renamed group {} to {}", id, new_id));
    Ok(())
}

fn remove_group(output: &Output, pack_id: &str, id: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.store();
    let mut pack = store.load(pack_id)?;

    let group = pack.remove(id)?;
    store.save(&mut pack)?;

    output.success(&format!("Removed group {} ({} items)", id, group.len()));
    Ok(())
}
