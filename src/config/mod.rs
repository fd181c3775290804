pub mod policy;
pub mod settings;

pub use policy::*;
pub use settings::*;

use std::path::{Path, PathBuf};

/// Project config file name, looked up in the base directory.
pub const CONFIG_FILE: &str = "scopebridge.yml";

/// Returns the runtime config path for a base directory.
pub fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join(CONFIG_FILE)
}
