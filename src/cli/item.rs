//! Item CLI commands

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use super::group::EntryArgs;
use super::output::Output;
use crate::domain::{Item, PATH_DELIMITER};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add an item to a group
    Add {
        /// Pack ID
        pack: String,

        /// Group ID
        group: String,

        /// Item ID
        id: String,

        /// Image path, relative to the pack root
        #[arg(long, short)]
        image: PathBuf,

        #[command(flatten)]
        entry: EntryArgs,
    },

    /// Rename an item in place
    Rename {
        /// Pack ID
        pack: String,

        /// Item path, e.g. `Alice/happy`
        path: String,

        /// New item ID
        new_id: String,
    },

    /// Remove an item
    Remove {
        /// Pack ID
        pack: String,

        /// Item path, e.g. `Alice/happy`
        path: String,
    },
}

pub fn run(cmd: ItemCommands, output: &Output) -> Result<()> {
    match cmd {
        ItemCommands::Add {
            pack,
            group,
            id,
            image,
            entry,
        } => add_item(output, &pack, &group, &id, image, &entry),
        ItemCommands::Rename { pack, path, new_id } => rename_item(output, &pack, &path, &new_id),
        ItemCommands::Remove { pack, path } => remove_item(output, &pack, &path),
    }
}

fn add_item(
    output: &Output,
    pack_id: &str,
    group_id: &str,
    id: &str,
    image: PathBuf,
    entry: &EntryArgs,
) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.store();
    let mut pack = store.load(pack_id)?;

    let mut item = Item::new(id, image)
        .with_meta(entry.meta())
        .with_links(entry.links());
    if let Some(priority) = entry.priority {
        item.set_priority(priority);
    }

    let group = pack.group_mut(group_id)?;
    group.add(item)?;
    let priority = group.item(id)?.priority();
    output.verbose_ctx("item", &format!("Assigned priority {}", priority));

    store.save(&mut pack)?;

    let path = format!("{}{}{}", group_id, PATH_DELIMITER, id);
    if output.is_json() {
        output.data(&serde_json::json!({
            "pack": pack_id,
            "path": path,
            "priority": priority.value(),
            "explicit": priority.explicit().is_some(),
        }));
    } else {
        output.success(&format!("Added item {}, priority {}", path, priority));
    }

    Ok(())
}

fn rename_item(output: &Output, pack_id: &str, path: &str, new_id: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.store();
    let mut pack = store.load(pack_id)?;

    pack.rename_item(path, new_id)?;
    store.save(&mut pack)?;

    output.success(&format!("Renamed item {} to {}", path, new_id));
    Ok(())
}

fn remove_item(output: &Output, pack_id: &str, path: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.store();
    let mut pack = store.load(pack_id)?;

    let item = pack.remove_item(path)?;
    store.save(&mut pack)?;

    output.success(&format!("Removed item {}", path));
    output.verbose_ctx("item", &format!("Image left on disk: {}", item.image().display()));
    Ok(())
}
