//! Configuration sections.

mod cache;
mod parse;
mod watch;
mod workspace;

pub use cache::CacheConfig;
pub use parse::ParseConfig;
pub use watch::WatchConfig;
pub use workspace::WorkspaceConfig;
