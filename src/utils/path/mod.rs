//! Path and href utilities.
//!
//! Pure functions for path manipulation. No filesystem access.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `resolve_path`)
//! - [`route`]: href utilities (`is_remote_href`, `split_path_fragment`, `is_map_file`)

pub mod fs;
pub mod route;

pub use fs::{normalize_path, resolve_path};
pub use route::{is_map_file, is_remote_href, split_path_fragment};
