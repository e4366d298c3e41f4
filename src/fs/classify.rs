//! Extension classification
//!
//! Maps a file path to the name of the subfolder it is sorted into.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;

/// Label used for files without an extension
pub const UNKNOWN_LABEL: &str = "unknown";

/// Subfolder name derived from a file's extension
///
/// Case is preserved (`report.PDF` sorts into `PDF`, not `pdf`) and
/// non-UTF-8 suffixes are kept byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtensionLabel(OsString);

impl ExtensionLabel {
    /// The label for files without an extension
    pub fn unknown() -> Self {
        Self(OsString::from(UNKNOWN_LABEL))
    }

    /// Whether this is the `unknown` label
    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_LABEL
    }

    /// Borrow the label as an OS string, suitable for joining onto a path
    pub fn as_os_str(&self) -> &OsStr {
        &self.0
    }
}

impl AsRef<Path> for ExtensionLabel {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for ExtensionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

/// Classify a file by the suffix after the last dot of its name
///
/// Names without a suffix (`README`), dot-files without a further dot
/// (`.bashrc`) and names ending in a dot (`notes.`) are all `unknown`.
pub fn extension_label(path: &Path) -> ExtensionLabel {
    match path.extension() {
        Some(ext) if !ext.is_empty() => ExtensionLabel(ext.to_os_string()),
        _ => ExtensionLabel::unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn label(name: &str) -> String {
        extension_label(Path::new(name)).to_string()
    }

    #[test]
    fn test_simple_extension() {
        assert_eq!(label("photo.jpg"), "jpg");
        assert_eq!(label("/deep/nested/dir/data.csv"), "csv");
    }

    #[test]
    fn test_case_preserved() {
        assert_eq!(label("report.PDF"), "PDF");
        assert_eq!(label("Report.Pdf"), "Pdf");
    }

    #[test]
    fn test_last_suffix_wins() {
        assert_eq!(label("archive.tar.gz"), "gz");
        assert_eq!(label("v1.2.3"), "3");
    }

    #[test]
    fn test_unknown_cases() {
        assert!(extension_label(Path::new("README")).is_unknown());
        assert!(extension_label(Path::new(".bashrc")).is_unknown());
        assert!(extension_label(Path::new("notes.")).is_unknown());
        assert_eq!(label("Makefile"), UNKNOWN_LABEL);
    }

    #[test]
    fn test_dotfile_with_suffix() {
        assert_eq!(label(".config.toml"), "toml");
    }

    #[test]
    fn test_dot_in_directory_only() {
        assert!(extension_label(Path::new("some.dir/LICENSE")).is_unknown());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_suffix_kept() {
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"blob.\xffx");
        let got = extension_label(Path::new(name));
        assert_eq!(got.as_os_str().as_bytes(), b"\xffx");
    }

    proptest! {
        #[test]
        fn prop_label_is_suffix(stem in "[a-zA-Z0-9_]{1,12}", ext in "[a-zA-Z0-9]{1,6}") {
            let name = format!("{}.{}", stem, ext);
            prop_assert_eq!(label(&name), ext);
        }

        #[test]
        fn prop_no_dot_is_unknown(name in "[a-zA-Z0-9_-]{1,20}") {
            prop_assert!(extension_label(Path::new(&name)).is_unknown());
        }
    }
}
