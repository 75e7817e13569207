//! Query commands (get, order)

use anyhow::{bail, Result};

use super::output::Output;
use super::pack::item_json;
use crate::domain::{Arrangement, SortScratch};
use crate::storage::Project;

/// Resolve a `group/item` path and print the item
pub fn get(output: &Output, pack_id: &str, path: &str) -> Result<()> {
    let project = Project::open_current()?;
    let pack = project.store().load(pack_id)?;
    let item = pack.item(path)?;

    if output.is_json() {
        output.data(&item_json(item));
        return Ok(());
    }

    println!("{}", item.display_name());
    println!("  id:       {}", item.id());
    println!("  group:    {}", item.group().unwrap_or("-"));
    println!("  image:    {}", item.image().display());
    println!("  priority: {}", item.priority());
    if let Some(after) = &item.links.after {
        println!("  after:    {}", after);
    }
    if let Some(before) = &item.links.before {
        println!("  before:   {}", before);
    }
    if let Some(description) = &item.meta.description {
        println!();
        for line in description.lines() {
            println!("  {}", line);
        }
    }

    Ok(())
}

/// Order a pack's groups, or one group's items, by their links
pub fn order(
    output: &Output,
    pack_id: &str,
    group: Option<&str>,
    apply: bool,
    strict: bool,
) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.store();
    let strict = strict || project.config().project.ordering.strict;

    let mut pack = store.load(pack_id)?;
    let mut scratch = SortScratch::new();

    let (scope, arrangement) = match group {
        Some(id) => (format!("group {}", id), pack.group(id)?.arrange(&mut scratch)),
        None => (format!("pack {}", pack_id), pack.arrange(&mut scratch)),
    };
    output.verbose_ctx(
        "order",
        &format!("Arranged {} entries in {}", arrangement.order.len(), scope),
    );

    let diagnostics = &arrangement.diagnostics;
    let degraded = !diagnostics.is_clean();
    let will_apply = apply && !(strict && degraded);

    if output.is_json() {
        output.data(&serde_json::json!({
            "pack": pack_id,
            "group": group,
            "order": arrangement.order,
            "cycles": diagnostics.cycles,
            "dangling": diagnostics.dangling,
            "applied": will_apply,
        }));
    } else {
        print_arrangement(output, &scope, &arrangement);
    }

    if strict && degraded {
        bail!(
            "Ordering of {} has {} cycle(s) and {} dangling link(s)",
            scope,
            diagnostics.cycles.len(),
            diagnostics.dangling.len()
        );
    }

    if will_apply {
        match group {
            Some(id) => pack.group_mut(id)?.apply_arrangement(&arrangement.order)?,
            None => pack.apply_arrangement(&arrangement.order)?,
        }
        store.save(&mut pack)?;

        if !output.is_json() {
            output.success(&format!("Applied order to {}", scope));
        }
    }

    Ok(())
}

fn print_arrangement(output: &Output, scope: &str, arrangement: &Arrangement) {
    if arrangement.order.is_empty() {
        println!("Nothing to order in {}.", scope);
        return;
    }

    println!("Order for {}:", scope);
    for (position, id) in arrangement.order.iter().enumerate() {
        println!("{:>4}. {}", position + 1, id);
    }

    for cycle in &arrangement.diagnostics.cycles {
        output.warn(&format!(
            "cycle kept in insertion order: {}",
            cycle.join(" -> ")
        ));
    }
    for id in &arrangement.diagnostics.dangling {
        output.warn(&format!("link to missing entry: {}", id));
    }
}
