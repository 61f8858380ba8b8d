//! Route table built once at startup.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::RouteError;
use crate::pattern::{RouteFile, RoutePattern};

/// One route file. Immutable after the table is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    id: String,
    pattern: RoutePattern,
    params: Vec<String>,
    #[serde(skip)]
    dirs: Vec<String>,
    #[serde(skip)]
    stem: String,
}

impl Route {
    fn from_file(file: RouteFile) -> Self {
        Self {
            params: file.pattern.param_names(),
            id: file.id,
            pattern: file.pattern,
            dirs: file.dirs,
            stem: file.stem,
        }
    }

    /// Route id: the file path relative to the routes root, without extension.
    /// Also the key used to resolve the page module.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// URL pattern.
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Parameter names in pattern order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Directory depth of the route file.
    pub fn depth(&self) -> usize {
        self.dirs.len()
    }

    /// The top-level `index` file, which wraps every other route.
    pub fn is_root(&self) -> bool {
        self.dirs.is_empty() && self.pattern.is_index()
    }

    /// Whether this route's module wraps `other`'s in the layout tree.
    pub fn is_ancestor_of(&self, other: &Route) -> bool {
        if self.id == other.id {
            return false;
        }
        if self.is_root() {
            return true;
        }
        if self.pattern.is_index() {
            return false;
        }
        // A non-index file is the layout of the directory sharing its name.
        let scope = self.dirs.iter().chain(std::iter::once(&self.stem));
        let scope_len = self.dirs.len() + 1;
        other.dirs.len() >= scope_len && other.dirs.iter().zip(scope).all(|(a, b)| a == b)
    }
}

/// Static mapping from route files to URL patterns and layout nesting.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
    /// Per route, indices of its ancestors, outermost first.
    ancestors: Vec<Vec<usize>>,
}

impl RouteTable {
    /// Start building a table from route file paths.
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new()
    }

    /// Build a table from route file paths relative to the routes root.
    pub fn from_files<I, S>(files: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        files
            .into_iter()
            .fold(Self::builder(), |b, f| b.file(f))
            .build()
    }

    /// Scan `root` for route files with one of `extensions`.
    ///
    /// Hidden files and directories are skipped.
    pub fn from_dir(root: impl AsRef<Path>, extensions: &[&str]) -> Result<Self, RouteError> {
        let root = root.as_ref();
        let mut builder = Self::builder();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let matches_ext = entry
                .path()
                .extension()
                .map(|ext| extensions.iter().any(|e| ext == *e))
                .unwrap_or(false);
            if !matches_ext {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            builder = builder.file(parts.join("/"));
        }

        builder.build()
    }

    /// All routes, sorted by id.
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    /// Look up a route by id.
    pub fn get(&self, id: &str) -> Option<&Arc<Route>> {
        self.index_of(id).map(|i| &self.routes[i])
    }

    /// Ancestors of a route, outermost first.
    pub fn ancestors(&self, id: &str) -> Vec<&Arc<Route>> {
        self.index_of(id)
            .map(|i| self.ancestors[i].iter().map(|&a| &self.routes[a]).collect())
            .unwrap_or_default()
    }

    /// Immediate parent of a route in the layout tree.
    pub fn parent(&self, id: &str) -> Option<&Arc<Route>> {
        self.ancestors(id).last().copied()
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if there are no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub(crate) fn ancestor_indices(&self, index: usize) -> &[usize] {
        &self.ancestors[index]
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.routes.binary_search_by(|r| r.id.as_str().cmp(id)).ok()
    }
}

/// Builder collecting route files before the table is frozen.
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    files: Vec<String>,
}

impl RouteTableBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route file path (relative to the routes root).
    pub fn file(mut self, path: impl Into<String>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Parse every file and compute the layout tree.
    pub fn build(self) -> Result<RouteTable, RouteError> {
        let mut routes = Vec::with_capacity(self.files.len());
        for path in &self.files {
            routes.push(Route::from_file(RouteFile::parse(path)?));
        }

        routes.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(dup) = routes.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(RouteError::Duplicate(dup[0].id.clone()));
        }

        let ancestors = routes
            .iter()
            .map(|route| {
                let mut found: Vec<usize> = routes
                    .iter()
                    .enumerate()
                    .filter(|(_, candidate)| candidate.is_ancestor_of(route))
                    .map(|(i, _)| i)
                    .collect();
                found.sort_by_key(|&i| (routes[i].depth(), !routes[i].is_root()));
                found
            })
            .collect();

        tracing::debug!(routes = routes.len(), "route table built");

        Ok(RouteTable {
            routes: routes.into_iter().map(Arc::new).collect(),
            ancestors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::from_files([
            "index.rs",
            "about.rs",
            "users.rs",
            "users/index.rs",
            "users/[id].rs",
            "users/[id]/posts.rs",
            "(auth).rs",
            "(auth)/login.rs",
        ])
        .unwrap()
    }

    fn ids(routes: Vec<&Arc<Route>>) -> Vec<&str> {
        routes.into_iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_routes_are_sorted_by_id() {
        let table = table();
        let all: Vec<&str> = table.routes().iter().map(|r| r.id()).collect();
        let mut sorted = all.clone();
        sorted.sort();
        assert_eq!(all, sorted);
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn test_root_index_wraps_everything() {
        let table = table();
        assert_eq!(ids(table.ancestors("about")), vec!["index"]);
        assert!(table.ancestors("index").is_empty());
    }

    #[test]
    fn test_layout_nesting() {
        let table = table();
        assert_eq!(ids(table.ancestors("users/[id]")), vec!["index", "users"]);
        assert_eq!(ids(table.ancestors("users/index")), vec!["index", "users"]);
        assert_eq!(
            ids(table.ancestors("users/[id]/posts")),
            vec!["index", "users", "users/[id]"]
        );
        assert_eq!(table.parent("users/[id]/posts").unwrap().id(), "users/[id]");
    }

    #[test]
    fn test_group_layout() {
        let table = table();
        assert_eq!(ids(table.ancestors("(auth)/login")), vec!["index", "(auth)"]);
        assert_eq!(table.get("(auth)/login").unwrap().pattern().to_string(), "/login");
    }

    #[test]
    fn test_duplicate_routes_rejected() {
        let err = RouteTable::from_files(["about.rs", "about.tsx"]).unwrap_err();
        assert!(matches!(err, RouteError::Duplicate(id) if id == "about"));
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("users")).unwrap();
        std::fs::create_dir_all(root.join(".cache")).unwrap();
        std::fs::write(root.join("index.rs"), "").unwrap();
        std::fs::write(root.join("users/[id].rs"), "").unwrap();
        std::fs::write(root.join("users/notes.md"), "").unwrap();
        std::fs::write(root.join(".cache/stale.rs"), "").unwrap();

        let table = RouteTable::from_dir(root, &["rs"]).unwrap();
        let all: Vec<&str> = table.routes().iter().map(|r| r.id()).collect();
        assert_eq!(all, vec!["index", "users/[id]"]);
    }
}
