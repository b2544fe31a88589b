//! `watch` command: keep one key space built while its maps change.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;

use super::require_file;
use crate::keyspace::{Boundary, KeyEngine, KeySpace};
use crate::logger::{status_error, status_success};
use crate::utils::path::normalize_path;
use crate::watch::MapWatcher;

pub async fn watch(engine: &KeyEngine, root_map: &Path) -> Result<()> {
    require_file(root_map)?;
    let root = normalize_path(root_map);

    engine.start();
    let mut events = engine.subscribe();

    let space = rebuild(engine, &root).await;
    let mut dirs = watch_dirs(engine.boundary(), &root, &space);
    let mut watcher =
        MapWatcher::new(&dirs, engine.change_sender()).context("failed to start file watcher")?;
    crate::log!("watch"; "watching {} (ctrl-c to stop)", root.display());

    loop {
        let space = tokio::select! {
            event = events.recv() => match event {
                Ok(notice) if notice.evicted_roots.contains(&root) => {
                    crate::debug!("watch"; "changed: {}", describe(&notice.changed));
                    rebuild(engine, &root).await
                }
                Ok(_) => continue,
                // Missed notices; rebuilding is always safe.
                Err(RecvError::Lagged(_)) => rebuild(engine, &root).await,
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        };

        // A rebuild can pull in maps from directories not yet watched.
        let next = watch_dirs(engine.boundary(), &root, &space);
        if next != dirs {
            watcher = MapWatcher::new(&next, engine.change_sender())
                .context("failed to restart file watcher")?;
            dirs = next;
        }
    }

    drop(watcher);
    engine.dispose();
    Ok(())
}

/// Directories to watch: the boundary roots, or, when boundaries are off,
/// the outermost directories holding the root map and its sub-maps.
fn watch_dirs(boundary: &Boundary, root: &Path, space: &KeySpace) -> Vec<PathBuf> {
    if !boundary.is_unrestricted() {
        return boundary.roots().to_vec();
    }

    let mut parents: Vec<PathBuf> = std::iter::once(root)
        .chain(space.map_hierarchy().iter().map(PathBuf::as_path))
        .filter_map(|map| map.parent().map(Path::to_path_buf))
        .collect();
    parents.sort();
    parents.dedup();

    // Watches are recursive; drop directories nested in another one.
    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in parents {
        if !dirs.iter().any(|kept| dir.starts_with(kept)) {
            dirs.push(dir);
        }
    }
    dirs
}

async fn rebuild(engine: &KeyEngine, root: &Path) -> Arc<KeySpace> {
    let space = engine.build_key_space(root).await;
    if space.map_hierarchy().is_empty() {
        status_error(
            &format!("cannot build {}", root.display()),
            "root map is missing or unreadable",
        );
    } else {
        status_success(&format!(
            "{}: {} keys from {} maps",
            root.display(),
            space.len(),
            space.map_hierarchy().len()
        ));
    }
    space
}

fn describe(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use std::fs;
    use tempfile::TempDir;

    async fn build(temp: &TempDir, roots: Vec<PathBuf>) -> (Boundary, PathBuf, Arc<KeySpace>) {
        let base = temp.path();
        fs::create_dir_all(base.join("book")).unwrap();
        fs::create_dir_all(base.join("shared/deep")).unwrap();
        fs::write(
            base.join("book/root.ditamap"),
            r#"<map><mapref href="../shared/keys.ditamap"/><mapref href="../shared/deep/more.ditamap"/></map>"#,
        )
        .unwrap();
        fs::write(base.join("shared/keys.ditamap"), "<map/>").unwrap();
        fs::write(base.join("shared/deep/more.ditamap"), "<map/>").unwrap();

        let mut config = EngineConfig::default();
        config.workspace.roots = roots;
        let engine = KeyEngine::with_config(config).unwrap();
        let root = normalize_path(&base.join("book/root.ditamap"));
        let space = engine.build_key_space(&root).await;
        (engine.boundary().clone(), root, space)
    }

    #[tokio::test]
    async fn test_unbounded_watch_covers_submap_directories() {
        let temp = TempDir::new().unwrap();
        let (boundary, root, space) = build(&temp, Vec::new()).await;
        let base = normalize_path(temp.path());

        assert_eq!(space.map_hierarchy().len(), 3);
        assert_eq!(
            watch_dirs(&boundary, &root, &space),
            vec![base.join("book"), base.join("shared")]
        );
    }

    #[tokio::test]
    async fn test_bounded_watch_uses_boundary_roots() {
        let temp = TempDir::new().unwrap();
        let (boundary, root, space) = build(&temp, vec![temp.path().to_path_buf()]).await;

        assert_eq!(
            watch_dirs(&boundary, &root, &space),
            vec![normalize_path(temp.path())]
        );
    }
}
