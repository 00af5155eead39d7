//! Solidity file and sub-project discovery
//!
//! File discovery walks one project's source root. Sub-project discovery
//! walks a whole tree and returns every directory carrying a framework
//! marker, threading a [`DiscoveryContext`] through the walk.

use crate::config::ProjectConfig;
use crate::detector::{detect_framework, marker_framework};
use crate::{default_excluded_paths, is_excluded_name, ProjectInfo};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File discovery for one classified project
pub struct ProjectDiscovery<'a> {
    info: &'a ProjectInfo,
}

impl<'a> ProjectDiscovery<'a> {
    pub fn new(info: &'a ProjectInfo) -> Self {
        Self { info }
    }

    /// All `.sol` files under the source root, sorted. Hidden entries,
    /// excluded directories and nested sub-projects are skipped.
    pub fn discover_solidity_files(&self) -> Vec<PathBuf> {
        let source_root = &self.info.source_root;
        let excluded = self.info.excluded_paths();

        tracing::debug!("Discovering Solidity files in: {:?}", source_root);
        tracing::debug!("Excluding directories: {:?}", excluded);

        let mut files = Vec::new();
        let walker = WalkDir::new(source_root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !should_skip(e.path(), &excluded));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && is_solidity_file(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => tracing::warn!("Skipping unreadable entry: {}", e),
            }
        }

        files.sort();
        files
    }
}

/// State threaded through a sub-project walk
#[derive(Debug)]
pub struct DiscoveryContext {
    root: PathBuf,
    /// Vendored, build and configured directories of the root and of every
    /// marked project entered so far
    excluded: Vec<PathBuf>,
    found: Vec<PathBuf>,
    /// Depths of the marked projects enclosing the current entry
    enclosing: Vec<usize>,
    /// Whether the root owns `.sol` files outside every nested sub-project
    root_owns_sources: bool,
}

impl DiscoveryContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            excluded: default_excluded_paths(&root),
            root,
            found: Vec::new(),
            enclosing: Vec::new(),
            root_owns_sources: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree from the root and collect sub-project roots
    pub fn discover(mut self) -> Vec<PathBuf> {
        let root = self.root.clone();
        let root_marked = marker_framework(&root).is_some();
        if root_marked {
            self.enter_project(&root, 0);
        }

        let mut walker = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .min_depth(1)
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let depth = entry.depth();
            while self.enclosing.last().is_some_and(|&d| d >= depth && d > 0) {
                self.enclosing.pop();
            }

            let path = entry.path();
            if entry.file_type().is_dir() {
                if should_skip_name(path) || self.excluded.iter().any(|dir| dir == path) {
                    walker.skip_current_dir();
                } else if marker_framework(path).is_some() {
                    self.enter_project(path, depth);
                }
            } else if entry.file_type().is_file()
                && self.enclosing.is_empty()
                && is_solidity_file(path)
            {
                self.root_owns_sources = true;
            }
        }

        if !root_marked && (self.root_owns_sources || self.found.is_empty()) {
            self.found.push(root);
        }

        self.found.sort();
        self.found.dedup();
        tracing::debug!("Found {} sub-project(s)", self.found.len());
        self.found
    }

    fn enter_project(&mut self, dir: &Path, depth: usize) {
        self.excluded.extend(default_excluded_paths(dir));
        // A broken config still marks the directory as a project
        let framework = detect_framework(dir);
        if let Ok(config) = ProjectConfig::load(framework, dir) {
            self.excluded.extend(
                config
                    .exclude_dirs()
                    .into_iter()
                    .map(|d| dir.join(d.trim_start_matches("./"))),
            );
        }
        self.enclosing.push(depth);
        self.found.push(dir.to_path_buf());
    }
}

/// Sub-project roots under `root`, sorted. When nothing carries a marker the
/// root alone is returned.
pub fn discover_sub_projects(root: &Path) -> Vec<PathBuf> {
    DiscoveryContext::new(root).discover()
}

fn should_skip(path: &Path, excluded: &[PathBuf]) -> bool {
    if should_skip_name(path) || excluded.iter().any(|dir| dir == path) {
        return true;
    }
    path.is_dir() && marker_framework(path).is_some()
}

fn should_skip_name(path: &Path) -> bool {
    path.file_name()
        .map(|name| is_excluded_name(&name.to_string_lossy()))
        .unwrap_or(false)
}

fn is_solidity_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "sol")
}
