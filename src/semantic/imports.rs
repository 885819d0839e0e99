//! Import path resolution.
//!
//! Maps an import literal plus the importing file's absolute path to a
//! file on disk by trying candidates in a fixed order: relative to the
//! importing file, its `node_modules`, package roots located by splitting
//! the importing path at a `/contracts/` marker or at nested
//! `/node_modules/` markers, then the configured base directories. The
//! first candidate that exists wins; a miss is a soft failure: logged,
//! edge dropped, importing file still valid.

use std::path::{Path, PathBuf};

use crate::base::normalize_path;

const PACKAGE_DIR: &str = "node_modules";

pub struct ImportResolver<'a> {
    basedirs: &'a [PathBuf],
}

impl<'a> ImportResolver<'a> {
    pub fn new(basedirs: &'a [PathBuf]) -> Self {
        Self { basedirs }
    }

    /// Resolve one import literal against the file that declares it.
    pub fn resolve(&self, literal: &str, importing_file: &Path) -> Option<PathBuf> {
        let resolved = self
            .candidates(literal, importing_file)
            .into_iter()
            .find(|candidate| candidate.exists());
        if resolved.is_none() {
            tracing::warn!(
                import = literal,
                file = %importing_file.display(),
                "import not found"
            );
        }
        resolved
    }

    /// All candidate paths in probe order, without touching the
    /// filesystem.
    pub fn candidates(&self, literal: &str, importing_file: &Path) -> Vec<PathBuf> {
        let importing_dir = importing_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let importing_str = importing_file.to_string_lossy().into_owned();

        let mut candidates = vec![
            normalize_path(&importing_dir.join(literal)),
            normalize_path(&importing_dir.join(PACKAGE_DIR).join(literal)),
        ];
        candidates.extend(contracts_marker_root(&importing_str, literal));
        candidates.extend(nearest_package_roots(&importing_str, literal));
        for basedir in self.basedirs {
            candidates.push(normalize_path(&basedir.join(literal)));
        }
        for basedir in self.basedirs {
            candidates.push(normalize_path(&basedir.join(PACKAGE_DIR).join(literal)));
        }
        candidates
    }
}

/// Heuristic (a): a `/contracts/` segment marks the project root; its
/// sibling `node_modules` is a candidate package root.
fn contracts_marker_root(importing_path: &str, literal: &str) -> Option<PathBuf> {
    let parts: Vec<&str> = importing_path.split("/contracts/").collect();
    if parts.len() != 2 {
        return None;
    }
    Some(normalize_path(&PathBuf::from(format!(
        "{}/{}/{}",
        parts[0], PACKAGE_DIR, literal
    ))))
}

/// Heuristics (b) and (c): for files already under `node_modules`, probe
/// the second-to-outermost and the outermost package root.
fn nearest_package_roots(importing_path: &str, literal: &str) -> Vec<PathBuf> {
    let marker = format!("/{PACKAGE_DIR}/");
    let parts: Vec<&str> = importing_path.split(marker.as_str()).collect();
    if parts.len() < 2 {
        return Vec::new();
    }
    let second_to_outermost = parts[..parts.len() - 2].join("/");
    vec![
        normalize_path(&PathBuf::from(format!(
            "{second_to_outermost}/{PACKAGE_DIR}/{literal}"
        ))),
        normalize_path(&PathBuf::from(format!(
            "{}/{}/{}",
            parts[0], PACKAGE_DIR, literal
        ))),
    ]
}
