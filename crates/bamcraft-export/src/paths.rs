//! Path and image-format conversion utilities
//!
//! Pure functions converting host-native file paths and image formats to
//! the target engine's conventions.

use std::path::{Component, Path, PathBuf};

/// Convert a host-native path to the engine's path syntax.
///
/// Backslashes become forward slashes, a drive letter becomes a
/// lower-cased leading segment (`C:\tex\a.png` -> `/c/tex/a.png`) and the
/// host's `//` project-relative marker becomes a `./` relative path.
pub fn to_engine_path(filepath: &str) -> String {
    let mut path = filepath.replace('\\', "/");

    if let Some(idx) = path.find(":/") {
        let drive = path[..idx].to_lowercase();
        let rest = &path[idx + 2..];
        path = format!("/{drive}/{rest}");
    }

    if let Some(rest) = path.strip_prefix("//") {
        path = format!("./{rest}");
    }

    path
}

/// Express `path` relative to `base` (both assumed absolute), walking up
/// with `..` segments where needed.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();

    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..base_parts.len() {
        result.push("..");
    }
    for part in &path_parts[common..] {
        result.push(part);
    }

    if result.as_os_str().is_empty() {
        result.push(".");
    }
    result
}

/// Map a host image-format name like "JPEG" to a file extension.
/// Returns `None` for unrecognized formats; callers warn and fall back
/// to ".png".
pub fn format_extension(file_format: &str) -> Option<&'static str> {
    match file_format {
        "BMP" => Some(".bmp"),
        "PNG" => Some(".png"),
        "JPEG" => Some(".jpg"),
        "TARGA" => Some(".tga"),
        "TIFF" => Some(".tiff"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_path_backslashes() {
        assert_eq!(to_engine_path("tex\\stone.png"), "tex/stone.png");
    }

    #[test]
    fn test_engine_path_drive_letter() {
        assert_eq!(
            to_engine_path("C:\\assets\\tex\\stone.png"),
            "/c/assets/tex/stone.png"
        );
        assert_eq!(to_engine_path("D:/a.png"), "/d/a.png");
    }

    #[test]
    fn test_engine_path_project_relative() {
        assert_eq!(to_engine_path("//tex/stone.png"), "./tex/stone.png");
    }

    #[test]
    fn test_engine_path_plain() {
        assert_eq!(to_engine_path("/home/user/a.png"), "/home/user/a.png");
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(
            relative_to(Path::new("/a/b/tex/s.png"), Path::new("/a/b")),
            PathBuf::from("tex/s.png")
        );
        assert_eq!(
            relative_to(Path::new("/a/x/s.png"), Path::new("/a/b/c")),
            PathBuf::from("../../x/s.png")
        );
        assert_eq!(
            relative_to(Path::new("/a/b"), Path::new("/a/b")),
            PathBuf::from(".")
        );
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(format_extension("JPEG"), Some(".jpg"));
        assert_eq!(format_extension("PNG"), Some(".png"));
        assert_eq!(format_extension("OPEN_EXR"), None);
    }
}
