//! Remote path resolution.

use crate::target::SyncTarget;

/// File suffix of every synced resource.
pub const FILE_SUFFIX: &str = ".json";

/// Resolves the remote path of a sync target inside the configured folder.
///
/// The layout is `<folder>/<target>.json`. Trailing slashes on the folder are
/// dropped so `"/sync"` and `"/sync/"` resolve to the same resource. Target
/// names are validated by [`SyncTarget`], which keeps the result inside the
/// folder.
pub fn resolve_path(target: &SyncTarget, folder: &str) -> String {
    let folder = folder.trim_end_matches('/');
    format!("{}/{}{}", folder, target.as_str(), FILE_SUFFIX)
}
