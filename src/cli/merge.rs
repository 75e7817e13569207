//! Merge command
//!
//! Folds several stored packs into a new one. Nothing is written when any
//! `group/item` pair appears in more than one source.

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::Merger;
use crate::storage::Project;

pub fn run(output: &Output, target: &str, sources: &[String]) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.store();

    let packs = sources
        .iter()
        .map(|id| store.load(id))
        .collect::<Result<Vec<_>>>()?;

    let (base, rest) = packs
        .split_first()
        .context("At least one pack is required")?;

    let mut merger = Merger::new(base);
    for (id, pack) in sources.iter().skip(1).zip(rest) {
        output.verbose_ctx("merge", &format!("Folding in {}", id));
        merger
            .add(pack)
            .with_context(|| format!("Failed to merge pack {}", id))?;
    }

    let mut merged = merger.finish()?;
    merged.set_id(target);

    let path = store.create(&mut merged)?;
    output.verbose_ctx("merge", &format!("Wrote {}", path.display()));

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": merged.id(),
            "sources": sources,
            "groups": merged.len(),
            "items": merged.item_count(),
        }));
    } else {
        output.success(&format!(
            "Merged {} packs into {} ({} groups, {} items)",
            merger.sources(),
            merged.id(),
            merged.len(),
            merged.item_count()
        ));
    }

    Ok(())
}
