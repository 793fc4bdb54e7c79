//! Input discovery: recursive directory walk with extension filter.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Accepted input extensions, matched case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tiff"];

/// Collect the image files under `input`.
///
/// A directory is walked recursively and filtered to
/// [`IMAGE_EXTENSIONS`]; entries are sorted by file name so the task
/// order (and therefore the report order) is stable across runs and
/// filesystems. A single-file input is returned as-is without the
/// extension filter -- the caller asked for that exact file, and the
/// decoder is the authority on whether it is readable. Unreadable
/// directory entries are skipped.
#[must_use]
pub fn discover(input: &Path) -> Vec<PathBuf> {
    if !input.is_dir() {
        return vec![input.to_path_buf()];
    }

    WalkDir::new(input)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| has_image_extension(path))
        .collect()
}

/// Whether the path carries one of the accepted image extensions.
fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(has_image_extension(Path::new("a.png")));
        assert!(has_image_extension(Path::new("a.PNG")));
        assert!(has_image_extension(Path::new("a.JpEg")));
        assert!(has_image_extension(Path::new("a.tiff")));
        assert!(!has_image_extension(Path::new("a.webp")));
        assert!(!has_image_extension(Path::new("a.txt")));
        assert!(!has_image_extension(Path::new("png")));
    }

    #[test]
    fn single_file_input_bypasses_filter() {
        let found = discover(Path::new("somewhere/image.xyz"));
        assert_eq!(found, vec![PathBuf::from("somewhere/image.xyz")]);
    }

    #[test]
    fn walks_directories_recursively_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("b.png"), b"x").unwrap();
        fs::write(dir.path().join("a.JPG"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(nested.join("c.bmp"), b"x").unwrap();

        let found = discover(dir.path());
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.bmp"]);
    }

    #[test]
    fn empty_directory_yields_no_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path()).is_empty());
    }
}
