use std::path::{Path, PathBuf};

pub mod dataset;
pub mod xml;

/// Resolves `file` relative to the directory of the config file, unless it is absolute
/// or explicitly relative to the working directory.
pub fn resolve_path(config: &Path, file: &str) -> PathBuf {
    let file_path = PathBuf::from(file);
    if file_path.is_absolute() || file_path.starts_with("./") {
        return file_path;
    }

    if let Some(path) = config.parent() {
        path.join(file_path)
    } else {
        file_path
    }
}
