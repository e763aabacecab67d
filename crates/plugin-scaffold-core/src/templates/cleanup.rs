//! Removal of template files and the plan document after rendering

use super::engine::discover;
use std::path::{Component, Path, PathBuf};

/// What cleanup removed and what it could not
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, std::io::Error)>,
}

/// Whether `name` is a single plain file name (no separators, `..` or root)
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Files cleanup would delete: every marked template plus the plan file if present.
///
/// Templates listed in `keep` (typically the ones that failed to render) are
/// left out so their content survives for manual editing.
pub fn cleanup_targets(
    root: &Path,
    marker: &str,
    plan_file: &str,
    keep: &[PathBuf],
) -> Vec<PathBuf> {
    let mut targets: Vec<PathBuf> = discover(root, marker)
        .into_iter()
        .filter(|path| !keep.contains(path))
        .collect();

    if is_plain_file_name(plan_file) {
        let plan = root.join(plan_file);
        if plan.is_file() {
            targets.push(plan);
        }
    } else if !plan_file.is_empty() {
        tracing::warn!(plan_file, "plan file is not a plain file name, leaving it alone");
    }
    targets
}

/// Delete template files and the plan file under `root`.
///
/// Only marker-suffixed files not listed in `keep` and the single named plan
/// file are touched.
pub fn cleanup(root: &Path, marker: &str, plan_file: &str, keep: &[PathBuf]) -> CleanupReport {
    let mut report = CleanupReport::default();

    for path in cleanup_targets(root, marker, plan_file, keep) {
        match std::fs::remove_file(&path) {
            Ok(()) => report.removed.push(path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not remove file");
                report.failed.push((path, e));
            }
        }
    }

    report
}
