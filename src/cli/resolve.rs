//! `resolve` and `root` commands.

use std::path::Path;

use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use super::require_file;
use crate::keyspace::{KeyEngine, ResolvedKeyRef};

/// Resolve a key reference as seen from `from`.
pub async fn resolve(engine: &KeyEngine, reference: &str, from: &Path, json: bool) -> Result<()> {
    require_file(from)?;

    let Some(resolved) = engine.resolve_keyref(reference, from).await else {
        match engine.find_root_map(from).await {
            Some(root) => bail!("key `{}` is not defined in {}", reference, root.display()),
            None => bail!("no root map governs {}", from.display()),
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else {
        print_resolved(reference, &resolved);
    }
    Ok(())
}

fn print_resolved(reference: &str, resolved: &ResolvedKeyRef) {
    let def = &resolved.definition;
    println!("{}", reference.bold());

    if let Some(target) = &def.target_file {
        match &resolved.element_id {
            Some(id) => println!("  target   {}#{}", target.display(), id),
            None => println!("  target   {}", target.display()),
        }
    }
    if let Some(text) = &def.inline_content {
        println!("  content  {text}");
    }
    if def.is_empty() {
        println!("  {}", "(no target, no inline content)".dimmed());
    }
    if let Some(scope) = def.scope {
        println!("  scope    {}", scope.as_str());
    }
    if let Some(role) = &def.processing_role {
        println!("  role     {role}");
    }
    println!("  {}", format!("defined in {}", def.source_map.display()).dimmed());
}

/// Print the root map that governs `file`.
pub async fn show_root(engine: &KeyEngine, file: &Path) -> Result<()> {
    match engine.find_root_map(file).await {
        Some(root) => {
            println!("{}", root.display());
            Ok(())
        }
        None => bail!("no root map governs {}", file.display()),
    }
}
