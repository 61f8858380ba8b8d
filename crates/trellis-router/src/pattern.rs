//! Route patterns derived from route file paths.
//!
//! ```text
//! index.rs            -> /
//! about.rs            -> /about
//! users.rs            -> /users        (layout for users/)
//! users/index.rs      -> /users
//! users/[id].rs       -> /users/:id
//! blog/[...slug].rs   -> /blog/*slug
//! (auth)/login.rs     -> /login        (group adds no segment)
//! ```

use serde::Serialize;
use trellis_core::RouteParams;

use crate::error::RouteError;

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Segment {
    /// Matches the literal exactly.
    Static(String),
    /// Binds exactly one path segment.
    Param(String),
    /// Binds one or more trailing path segments.
    CatchAll(String),
}

impl Segment {
    /// Rank used for specificity ordering: literal beats parameter beats catch-all.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Static(_) => 3,
            Self::Param(_) => 2,
            Self::CatchAll(_) => 1,
        }
    }

    fn parse(component: &str, file: &str) -> Result<Option<Self>, RouteError> {
        if component.starts_with('(') && component.ends_with(')') {
            return Ok(None);
        }
        if let Some(inner) = component.strip_prefix('[').and_then(|c| c.strip_suffix(']')) {
            let (catch_all, name) = match inner.strip_prefix("...") {
                Some(name) => (true, name),
                None => (false, inner),
            };
            if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(RouteError::InvalidParam {
                    file: file.to_string(),
                    segment: component.to_string(),
                });
            }
            let name = name.to_string();
            return Ok(Some(if catch_all {
                Self::CatchAll(name)
            } else {
                Self::Param(name)
            }));
        }
        if component.contains('[') || component.contains(']') {
            return Err(RouteError::InvalidParam {
                file: file.to_string(),
                segment: component.to_string(),
            });
        }
        Ok(Some(Self::Static(component.to_string())))
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(s) => write!(f, "{}", s),
            Self::Param(name) => write!(f, ":{}", name),
            Self::CatchAll(name) => write!(f, "*{}", name),
        }
    }
}

/// Parsed location of a route file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RouteFile {
    /// Normalized id: relative path without extension.
    pub id: String,
    /// Directory components leading to the file.
    pub dirs: Vec<String>,
    /// File name without extension.
    pub stem: String,
    pub pattern: RoutePattern,
}

impl RouteFile {
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let normalized = path.replace('\\', "/");
        let trimmed = normalized.trim_start_matches("./").trim_matches('/');

        let mut components: Vec<String> = trimmed
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .map(str::to_string)
            .collect();

        let file = components.pop().ok_or_else(|| RouteError::Empty(path.to_string()))?;
        let stem = strip_extension(&file).to_string();
        if stem.is_empty() {
            return Err(RouteError::Empty(path.to_string()));
        }

        let index = stem == "index";
        let mut segments = Vec::new();
        let named = components.iter().chain((!index).then_some(&stem));
        for component in named {
            if let Some(Segment::CatchAll(_)) = segments.last() {
                return Err(RouteError::CatchAllNotLast(path.to_string()));
            }
            if let Some(segment) = Segment::parse(component, path)? {
                segments.push(segment);
            }
        }

        let mut id_parts = components.clone();
        id_parts.push(stem.clone());

        Ok(Self {
            id: id_parts.join("/"),
            dirs: components,
            stem,
            pattern: RoutePattern { segments, index },
        })
    }
}

/// Route id for a route file path: the normalized path without extension.
pub fn route_id(path: &str) -> Result<String, RouteError> {
    RouteFile::parse(path).map(|file| file.id)
}

/// Only strip a plain alphanumeric extension so `[...slug]` stays intact.
fn strip_extension(file: &str) -> &str {
    match file.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => file,
    }
}

/// URL pattern of one route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RoutePattern {
    segments: Vec<Segment>,
    index: bool,
}

impl RoutePattern {
    /// Pattern segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the route is the `index` page of its directory.
    pub fn is_index(&self) -> bool {
        self.index
    }

    /// Parameter names in the order they appear.
    pub fn param_names(&self) -> Vec<String> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) | Segment::CatchAll(name) => Some(name.clone()),
                Segment::Static(_) => None,
            })
            .collect()
    }

    /// Specificity key: higher sorts first when picking a leaf.
    pub(crate) fn specificity(&self) -> Vec<u8> {
        self.segments.iter().map(Segment::rank).collect()
    }

    /// Match the whole path.
    pub fn match_full(&self, path: &[String]) -> Option<RouteParams> {
        self.bind(path, true)
    }

    /// Match a leading portion of the path (used for ancestors).
    pub fn match_prefix(&self, path: &[String]) -> Option<RouteParams> {
        self.bind(path, false)
    }

    fn bind(&self, path: &[String], full: bool) -> Option<RouteParams> {
        let mut params = RouteParams::new();
        let mut pos = 0;

        for segment in &self.segments {
            match segment {
                Segment::Static(literal) => {
                    if path.get(pos)? != literal {
                        return None;
                    }
                    pos += 1;
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), path.get(pos)?.clone());
                    pos += 1;
                }
                Segment::CatchAll(name) => {
                    if pos >= path.len() {
                        return None;
                    }
                    params.insert(name.clone(), path[pos..].join("/"));
                    pos = path.len();
                }
            }
        }

        if full && pos != path.len() {
            return None;
        }
        Some(params)
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> Vec<String> {
        p.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect()
    }

    #[test]
    fn test_parse_index() {
        let file = RouteFile::parse("index.rs").unwrap();
        assert_eq!(file.id, "index");
        assert!(file.pattern.is_index());
        assert_eq!(file.pattern.to_string(), "/");
    }

    #[test]
    fn test_parse_dynamic() {
        let file = RouteFile::parse("./users/[id].rs").unwrap();
        assert_eq!(file.id, "users/[id]");
        assert_eq!(file.dirs, vec!["users".to_string()]);
        assert_eq!(file.stem, "[id]");
        assert_eq!(file.pattern.to_string(), "/users/:id");
        assert_eq!(file.pattern.param_names(), vec!["id".to_string()]);
    }

    #[test]
    fn test_parse_catch_all_without_extension() {
        let file = RouteFile::parse("blog/[...slug]").unwrap();
        assert_eq!(file.id, "blog/[...slug]");
        assert_eq!(file.pattern.to_string(), "/blog/*slug");
    }

    #[test]
    fn test_parse_group_and_windows_separators() {
        let file = RouteFile::parse("(auth)\\login.tsx").unwrap();
        assert_eq!(file.id, "(auth)/login");
        assert_eq!(file.pattern.to_string(), "/login");
    }

    #[test]
    fn test_route_id() {
        assert_eq!(route_id("./users/[id].tsx").unwrap(), "users/[id]");
        assert!(route_id("/").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(RouteFile::parse(""), Err(RouteError::Empty(_))));
        assert!(matches!(
            RouteFile::parse("users/[].rs"),
            Err(RouteError::InvalidParam { .. })
        ));
        assert!(matches!(
            RouteFile::parse("users/a[b].rs"),
            Err(RouteError::InvalidParam { .. })
        ));
        assert!(matches!(
            RouteFile::parse("docs/[...rest]/edit.rs"),
            Err(RouteError::CatchAllNotLast(_))
        ));
    }

    #[test]
    fn test_catch_all_index_is_allowed() {
        let file = RouteFile::parse("docs/[...rest]/index.rs").unwrap();
        assert_eq!(file.pattern.to_string(), "/docs/*rest");
    }

    #[test]
    fn test_match_full_and_prefix() {
        let pattern = RouteFile::parse("users/[id].rs").unwrap().pattern;

        let params = pattern.match_full(&path("/users/42")).unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));

        assert!(pattern.match_full(&path("/users/42/posts")).is_none());
        assert!(pattern.match_prefix(&path("/users/42/posts")).is_some());
        assert!(pattern.match_full(&path("/users")).is_none());
        assert!(pattern.match_full(&path("/accounts/42")).is_none());
    }

    #[test]
    fn test_catch_all_requires_a_segment() {
        let pattern = RouteFile::parse("blog/[...slug].rs").unwrap().pattern;

        let params = pattern.match_full(&path("/blog/2024/hello")).unwrap();
        assert_eq!(params.get("slug").map(String::as_str), Some("2024/hello"));
        assert!(pattern.match_full(&path("/blog")).is_none());
    }

    #[test]
    fn test_specificity_order() {
        let literal = RouteFile::parse("users/new.rs").unwrap().pattern;
        let param = RouteFile::parse("users/[id].rs").unwrap().pattern;
        let rest = RouteFile::parse("users/[...rest].rs").unwrap().pattern;

        assert!(literal.specificity() > param.specificity());
        assert!(param.specificity() > rest.specificity());
    }
}
