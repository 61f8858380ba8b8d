//! Head metadata returned by page loaders.

use serde::{Deserialize, Serialize};

/// A `<meta name=.. content=..>` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaTag {
    pub name: String,
    pub content: String,
}

/// A `<link rel=.. href=..>` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTag {
    pub rel: String,
    pub href: String,
}

/// Metadata rendered into the document head for the innermost route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Page title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Meta description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Additional meta tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<MetaTag>,
    /// Link tags (canonical, stylesheets, etc.).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkTag>,
}

impl PageMeta {
    /// Create new metadata with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a meta tag.
    pub fn with_meta(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.tags.push(MetaTag {
            name: name.into(),
            content: content.into(),
        });
        self
    }

    /// Add a link tag.
    pub fn with_link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.links.push(LinkTag {
            rel: rel.into(),
            href: href.into(),
        });
        self
    }

    /// Add a stylesheet link.
    pub fn with_stylesheet(self, href: impl Into<String>) -> Self {
        self.with_link("stylesheet", href)
    }

    /// Check if there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tags.is_empty()
            && self.links.is_empty()
    }
}
