//! Locate files checked in alongside the workspace.

use std::path::PathBuf;

/// Find the project root via the crate root provided by `cargo test`, then resolve `path`
/// against it. All our crates live two levels down, in `crates/<group>/<name>`.
pub fn get_path_from_project_root(path: &str) -> PathBuf {
    let mut root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    root.push("../../../");
    root.push(path);
    root
}
