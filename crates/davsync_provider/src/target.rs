//! Sync targets: the logical data categories that each map to one remote file.

use crate::error::{SyncError, SyncResult};
use std::borrow::Cow;
use std::fmt;

/// A logical category of application data that maps to exactly one remote
/// resource.
///
/// Names are validated on construction so that a target can never resolve to
/// a path outside the configured sync folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncTarget(Cow<'static, str>);

impl SyncTarget {
    /// The main application state.
    pub const MAIN: SyncTarget = SyncTarget(Cow::Borrowed("MAIN"));

    /// Archived application data, synced separately from the main state.
    pub const ARCHIVE: SyncTarget = SyncTarget(Cow::Borrowed("ARCHIVE"));

    /// Creates a target from a name.
    ///
    /// Rejects empty names, `.`/`..`, path separators and control characters.
    pub fn new(name: impl Into<String>) -> SyncResult<Self> {
        let name = name.into();
        if let Some(reason) = reject_reason(&name) {
            return Err(SyncError::InvalidTarget { name, reason });
        }
        Ok(Self(Cow::Owned(name)))
    }

    /// Returns the target name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn reject_reason(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("name is empty");
    }
    if name == "." || name == ".." {
        return Some("name is a relative path component");
    }
    if name.contains(['/', '\\']) {
        return Some("name contains a path separator");
    }
    if name.chars().any(char::is_control) {
        return Some("name contains a control character");
    }
    None
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SyncTarget {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_targets() {
        assert_eq!(SyncTarget::MAIN.as_str(), "MAIN");
        assert_eq!(SyncTarget::ARCHIVE.to_string(), "ARCHIVE");
        assert_ne!(SyncTarget::MAIN, SyncTarget::ARCHIVE);
    }

    #[test]
    fn constructed_equals_builtin() {
        assert_eq!(SyncTarget::new("MAIN").unwrap(), SyncTarget::MAIN);
    }

    #[test]
    fn rejects_traversal() {
        for bad in ["", ".", "..", "../etc", "a/b", "a\\b", "x\0y", "tab\tname"] {
            let err = SyncTarget::new(bad).unwrap_err();
            assert!(
                matches!(err, SyncError::InvalidTarget { .. }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn accepts_dotted_names() {
        let target: SyncTarget = "settings.v2".parse().unwrap();
        assert_eq!(target.as_str(), "settings.v2");
        assert!(SyncTarget::new("..hidden").is_ok());
    }
}
