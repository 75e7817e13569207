//! Pack CLI commands

use anyhow::{bail, Result};
use clap::Subcommand;

use super::output::Output;
use crate::domain::{Collection, Group, Item, Meta};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum PackCommands {
    /// Create an empty pack
    New {
        /// Pack ID (also the file name)
        id: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Description
        #[arg(long)]
        description: Option<String>,
    },

    /// List all packs
    List,

    /// Show a pack's groups and items in order
    Show {
        /// Pack ID
        id: String,
    },

    /// Delete a pack
    Remove {
        /// Pack ID
        id: String,
    },

    /// Write a timestamped backup of a pack
    Snapshot {
        /// Pack ID
        id: String,
    },
}

pub fn run(cmd: PackCommands, output: &Output) -> Result<()> {
    match cmd {
        PackCommands::New {
            id,
            name,
            description,
        } => new_pack(output, &id, Meta::new(name, description)),
        PackCommands::List => list_packs(output),
        PackCommands::Show { id } => show_pack(output, &id),
        PackCommands::Remove { id } => remove_pack(output, &id),
        PackCommands::Snapshot { id } => snapshot_pack(output, &id),
    }
}

fn new_pack(output: &Output, id: &str, meta: Meta) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.store();

    let mut pack = Collection::new(id).with_meta(meta);
    let path = store.create(&mut pack)?;
    output.verbose_ctx("pack", &format!("Wrote {}", path.display()));

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": pack.id(),
            "name": pack.meta.name,
            "path": path.display().to_string(),
        }));
    } else {
        output.success(&format!("Created pack: {}", pack.id()));
    }

    Ok(())
}

fn list_packs(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.store();

    let ids = store.list()?;
    output.verbose_ctx("pack", &format!("Found {} pack files", ids.len()));

    let mut packs = Vec::with_capacity(ids.len());
    for id in &ids {
        packs.push(store.load(id)?);
    }

    if output.is_json() {
        let items: Vec<_> = packs
            .iter()
            .map(|pack| {
                serde_json::json!({
                    "id": pack.id(),
                    "name": pack.meta.name,
                    "groups": pack.len(),
                    "items": pack.item_count(),
                })
            })
            .collect();
        output.data(&items);
    } else if packs.is_empty() {
        println!("No packs found.");
    } else {
        println!("{:<20} {:>7} {:>7}  NAME", "ID", "GROUPS", "ITEMS");
        println!("{}", "-".repeat(60));
        for pack in &packs {
            println!(
                "{:<20} {:>7} {:>7}  {}",
                pack.id(),
                pack.len(),
                pack.item_count(),
                pack.display_name()
            );
        }
    }

    Ok(())
}

fn show_pack(output: &Output, id: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut pack = project.store().load(id)?;
    pack.sort_all();

    if output.is_json() {
        let groups: Vec<_> = pack.iter().map(group_json).collect();
        output.data(&serde_json::json!({
            "id": pack.id(),
            "name": pack.meta.name,
            "description": pack.meta.description,
            "groups": groups,
        }));
        return Ok(());
    }

    println!("{} ({})", pack.display_name(), pack.id());
    if let Some(description) = &pack.meta.description {
        println!("{}", description);
    }

    if pack.is_empty() {
        println!();
        println!("No groups.");
        return Ok(());
    }

    for group in pack.iter() {
        println!();
        println!("{} [{}]", group.display_name(), group.priority());
        for item in group.iter() {
            println!(
                "  {:<20} {:<14} {}",
                item.id(),
                item.priority().to_string(),
                item.image().display()
            );
        }
    }

    Ok(())
}

fn remove_pack(output: &Output, id: &str) -> Result<()> {
    let project = Project::open_current()?;

    if !project.store().remove(id)? {
        bail!("Pack not found: {}", id);
    }

    output.success(&format!("Removed pack: {}", id));
    Ok(())
}

fn snapshot_pack(output: &Output, id: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.store();

    let pack = store.load(id)?;
    let path = store.snapshot(&pack)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "snapshot": path.display().to_string(),
        }));
    } else {
        output.success(&format!("Snapshot written to {}", path.display()));
    }

    Ok(())
}

pub(super) fn group_json(group: &Group) -> serde_json::Value {
    let items: Vec<_> = group.iter().map(item_json).collect();
    serde_json::json!({
        "id": group.id(),
        "name": group.meta.name,
        "priority": group.priority().value(),
        "explicit": group.priority().explicit().is_some(),
        "items": items,
    })
}

pub(super) fn item_json(item: &Item) -> serde_json::Value {
    serde_json::json!({
        "id": item.id(),
        "group": item.group(),
        "image": item.image().display().to_string(),
        "name": item.meta.name,
        "description": item.meta.description,
        "priority": item.priority().value(),
        "explicit": item.priority().explicit().is_some(),
        "after": item.links.after,
        "before": item.links.before,
    })
}
