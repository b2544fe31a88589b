//! `keys` and `stats` commands.

use std::path::{Path, PathBuf};

use anyhow::Result;
use owo_colors::OwoColorize;

use super::require_file;
use crate::keyspace::{KeyEngine, KeySpace};

/// Print every key of the key space rooted at `root_map`.
pub async fn list_keys(engine: &KeyEngine, root_map: &Path, json: bool) -> Result<()> {
    require_file(root_map)?;
    let space = engine.build_key_space(root_map).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&keys_json(&space))?);
        return Ok(());
    }

    for def in space.iter_sorted() {
        let value = match (&def.target_file, &def.inline_content) {
            (Some(target), _) => match &def.element_id {
                Some(id) => format!("{}#{}", target.display(), id),
                None => target.display().to_string(),
            },
            (None, Some(text)) => format!("\"{text}\""),
            (None, None) => "-".dimmed().to_string(),
        };
        println!("{}  {}", def.key_name.bold(), value);
    }

    crate::log!(
        "keys";
        "{} keys from {} maps",
        space.len(),
        space.map_hierarchy().len()
    );
    Ok(())
}

/// JSON document for a key space, keys in name order.
fn keys_json(space: &KeySpace) -> serde_json::Value {
    serde_json::json!({
        "root_map": space.root_map(),
        "map_hierarchy": space.map_hierarchy(),
        "keys": space.iter_sorted(),
    })
}

/// Build each root map twice (the second from cache) and print statistics.
pub async fn stats(engine: &KeyEngine, root_maps: &[PathBuf]) -> Result<()> {
    for root in root_maps {
        require_file(root)?;
        engine.build_key_space(root).await;
        engine.build_key_space(root).await;
    }
    println!("{}", serde_json::to_string_pretty(&engine.cache_stats())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_keys_json_is_sorted_with_provenance() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root.ditamap");
        fs::write(
            &root,
            r#"<map><keydef keys="zeta" href="z.dita"/><keydef keys="alpha"><topicmeta><navtitle>A</navtitle></topicmeta></keydef></map>"#,
        )
        .unwrap();

        let mut config = EngineConfig::default();
        config.workspace.roots = vec![temp.path().to_path_buf()];
        let engine = KeyEngine::with_config(config).unwrap();

        let space = engine.build_key_space(&root).await;
        let json = keys_json(&space);
        let keys = json["keys"].as_array().unwrap();
        assert_eq!(keys[0]["key_name"], "alpha");
        assert_eq!(keys[0]["inline_content"], "A");
        assert_eq!(keys[1]["key_name"], "zeta");
        assert_eq!(json["map_hierarchy"].as_array().unwrap().len(), 1);
    }
}
