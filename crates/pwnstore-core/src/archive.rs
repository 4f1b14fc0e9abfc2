//! Archive Resolver
//!
//! Streams exactly one named entry out of a zip archive. Entry paths come
//! from the registry and are validated before the archive is opened.

use std::io::{self, Read, Seek, Write};

use zip::ZipArchive;

use crate::error::{PwnStoreError, Result};

/// Reject absolute paths and parent-directory segments
pub fn validate_entry_path(path: &str) -> Result<()> {
    let unsafe_path = || PwnStoreError::UnsafePath {
        path: path.to_string(),
    };

    if path.is_empty() || path.starts_with('/') || path.starts_with('\\') {
        return Err(unsafe_path());
    }

    // Windows drive prefix, e.g. C:\ or C:/
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return Err(unsafe_path());
    }

    if path.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(unsafe_path());
    }

    Ok(())
}

/// Copy one entry into `out`, returning the number of bytes written
pub fn extract<R, W>(archive: R, entry_path: &str, out: &mut W) -> Result<u64>
where
    R: Read + Seek,
    W: Write + ?Sized,
{
    validate_entry_path(entry_path)?;

    let mut archive = ZipArchive::new(archive)?;
    let mut entry = archive.by_name(entry_path)?;
    if entry.is_dir() {
        return Err(PwnStoreError::UnsafePath {
            path: entry_path.to_string(),
        });
    }

    let written = io::copy(&mut entry, out)?;
    Ok(written)
}

/// Entries that look like plugin sources: matching extension, no package
/// `__init__` files, no hidden path segments
pub fn plugin_entries<R: Read + Seek>(archive: R, extension: &str) -> Result<Vec<String>> {
    let archive = ZipArchive::new(archive)?;
    let suffix = format!(".{}", extension);

    Ok(archive
        .file_names()
        .filter(|name| name.ends_with(&suffix))
        .filter(|name| !name.contains("__init__"))
        .filter(|name| !name.contains("/.") && !name.starts_with('.'))
        .filter(|name| validate_entry_path(name).is_ok())
        .map(|name| name.to_string())
        .collect())
}


#[cfg(test)]
mod tests {
    use super::fixtures::zip_bytes;
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_rejects_traversal_and_absolute() {
        for path in [
            "../../etc/passwd",
            "/etc/passwd",
            "plugins/../../x.py",
            "..",
            "\\windows\\system32",
            "C:\\evil.py",
            "plugins\\..\\x.py",
            "",
        ] {
            let err = validate_entry_path(path).unwrap_err();
            assert!(
                matches!(err, PwnStoreError::UnsafePath { .. }),
                "expected UnsafePath for {:?}",
                path
            );
        }
    }

    #[test]
    fn test_accepts_relative_paths() {
        validate_entry_path("plugins/foo.py").unwrap();
        validate_entry_path("repo-main/plugins/foo..bar.py").unwrap();
        validate_entry_path("foo.py").unwrap();
    }

    #[test]
    fn test_extract_single_entry() {
        let bytes = zip_bytes(&[
            ("repo-main/README.md", "readme"),
            ("repo-main/plugins/foo.py", "__version__ = '1.0'\n"),
        ]);

        let mut out = Vec::new();
        let written = extract(Cursor::new(bytes), "repo-main/plugins/foo.py", &mut out).unwrap();
        assert_eq!(out, b"__version__ = '1.0'\n");
        assert_eq!(written, out.len() as u64);
    }

    #[test]
    fn test_extract_unsafe_path_checked_before_opening() {
        // Not a zip at all: the path check must fire first
        let mut out = Vec::new();
        let err = extract(Cursor::new(b"junk".to_vec()), "../x.py", &mut out).unwrap_err();
        assert!(matches!(err, PwnStoreError::UnsafePath { .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_extract_missing_entry() {
        let bytes = zip_bytes(&[("a.py", "x")]);
        let mut out = Vec::new();
        let err = extract(Cursor::new(bytes), "b.py", &mut out).unwrap_err();
        assert!(matches!(err, PwnStoreError::Archive(_)));
    }

    #[test]
    fn test_plugin_entries_filter() {
        let bytes = zip_bytes(&[
            ("repo/plugins/foo.py", "x"),
            ("repo/plugins/__init__.py", "x"),
            ("repo/.github/script.py", "x"),
            ("repo/README.md", "x"),
            ("repo/bar.py", "x"),
        ]);

        let mut entries = plugin_entries(Cursor::new(bytes), "py").unwrap();
        entries.sort();
        assert_eq!(entries, vec!["repo/bar.py", "repo/plugins/foo.py"]);
    }
}
