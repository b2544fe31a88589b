//! ditakeys - DITA key space resolution.
//!
//! Builds the key space of a DITA root map (every key defined anywhere in
//! its map hierarchy, first definition wins in breadth-first order),
//! caches it, and resolves `keyref` values for topics in the workspace.
//!
//! ```ignore
//! let engine = KeyEngine::with_config(EngineConfig::load(None)?)?;
//! engine.start();
//! let def = engine.resolve_key("product", Path::new("topics/intro.dita")).await;
//! ```

#[macro_use]
pub mod logger;

pub mod cli;
pub mod config;
pub mod keyspace;
pub mod utils;
pub mod watch;

pub use config::{ConfigError, EngineConfig};
pub use keyspace::{KeyDefinition, KeyEngine, KeySpace};
