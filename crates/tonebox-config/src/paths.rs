//! Platform-specific location of user patches.
//!
//! - Linux: `~/.config/tonebox/patches/`
//! - macOS: `~/Library/Application Support/tonebox/patches/`
//! - Windows: `%APPDATA%\tonebox\patches\`

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::factory_patches::get_factory_patch;
use crate::patch::Patch;

const APP_NAME: &str = "tonebox";

const PATCHES_SUBDIR: &str = "patches";

/// Returns the user-specific patches directory.
///
/// Falls back to `./tonebox/patches` if the config directory cannot be determined.
pub fn user_patches_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(PATCHES_SUBDIR)
}

/// Ensure the user patches directory exists.
pub fn ensure_user_patches_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_patches_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// Find a patch file by path, or by name in `dir` (`.toml` is optional).
pub fn find_patch_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{}.toml", name)
    };
    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// Find a patch file by path or by name in the user patches directory.
pub fn find_patch(name: &str) -> Option<PathBuf> {
    find_patch_in(&user_patches_dir(), name)
}

/// List patch files in `dir`, sorted by path.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_patches_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut patches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    patches.sort();
    patches
}

/// List patch files in the user patches directory.
pub fn list_user_patches() -> Vec<PathBuf> {
    list_patches_in(&user_patches_dir())
}

/// Get the patch name from a file path (the file stem).
///
/// # Example
///
/// ```rust
/// use tonebox_config::paths::patch_name_from_path;
/// use std::path::Path;
///
/// let name = patch_name_from_path(Path::new("/path/to/doorbell.toml"));
/// assert_eq!(name, Some("doorbell".to_string()));
/// ```
pub fn patch_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

/// Resolve a patch by file path, built-in name, or name in `dir`, in that order.
pub fn resolve_patch_in(dir: &Path, name: &str) -> Result<Patch, ConfigError> {
    let direct = Path::new(name);
    if direct.is_file() {
        return Patch::load(direct);
    }
    if let Some(patch) = get_factory_patch(name) {
        return Ok(patch);
    }
    match find_patch_in(dir, name) {
        Some(path) => Patch::load(path),
        None => Err(ConfigError::PatchNotFound(name.to_string())),
    }
}

/// Resolve a patch by file path, built-in name, or user patch name.
pub fn resolve_patch(name: &str) -> Result<Patch, ConfigError> {
    resolve_patch_in(&user_patches_dir(), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn user_dir_ends_with_app_and_subdir() {
        let dir = user_patches_dir();
        assert!(dir.ends_with("tonebox/patches"));
    }

    #[test]
    fn find_with_and_without_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("ding.toml"), "name = \"Ding\"").unwrap();

        assert!(find_patch_in(tmp.path(), "ding").is_some());
        assert!(find_patch_in(tmp.path(), "ding.toml").is_some());
        assert!(find_patch_in(tmp.path(), "dong").is_none());
    }

    #[test]
    fn list_only_toml_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.toml"), "").unwrap();
        fs::write(tmp.path().join("a.toml"), "").unwrap();
        fs::write(tmp.path().join("notes.txt"), "").unwrap();

        let names: Vec<_> = list_patches_in(tmp.path())
            .iter()
            .filter_map(|p| patch_name_from_path(p))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(list_patches_in(&tmp.path().join("missing")).is_empty());
    }

    #[test]
    fn resolve_prefers_builtin_over_user_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("beep.toml"),
            "name = \"Shadow\"\n[[voices]]\nfrequency = 1.0",
        )
        .unwrap();

        let patch = resolve_patch_in(tmp.path(), "beep").unwrap();
        assert_eq!(patch.name, "Beep");
    }

    #[test]
    fn resolve_unknown_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = resolve_patch_in(tmp.path(), "ghost").unwrap_err();
        assert!(matches!(err, ConfigError::PatchNotFound(ref n) if n == "ghost"));
    }
}
