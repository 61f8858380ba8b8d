//! HTML template with head, data and body markers.

use crate::error::TemplateError;

/// Replaced with rendered head markup.
pub const META_MARKER: &str = "<!--meta:outlet-->";
/// Replaced with the embedded data script. Optional.
pub const DATA_MARKER: &str = "<!--ssr:data-->";
/// Where the streamed body is spliced in.
pub const BODY_MARKER: &str = "<!--ssr:outlet-->";

/// A validated template, already split at the body marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    prefix: String,
    suffix: String,
    has_data_marker: bool,
}

/// Template text with markers substituted, ready to wrap the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTemplate {
    pub prefix: String,
    pub suffix: String,
}

impl Template {
    /// Validate marker counts and split at the body marker.
    ///
    /// The meta and body markers must appear exactly once; the data marker
    /// at most once.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        expect_once(source, META_MARKER)?;
        expect_once(source, BODY_MARKER)?;
        let has_data_marker = match source.matches(DATA_MARKER).count() {
            0 => false,
            1 => true,
            _ => return Err(TemplateError::DuplicateMarker(DATA_MARKER)),
        };

        let (prefix, suffix) = source
            .split_once(BODY_MARKER)
            .ok_or(TemplateError::MissingMarker(BODY_MARKER))?;

        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            has_data_marker,
        })
    }

    /// Whether the template places the data script itself.
    pub fn has_data_marker(&self) -> bool {
        self.has_data_marker
    }

    /// Substitute head markup and the data script.
    ///
    /// Without a data marker the script goes right before the body.
    pub fn fill(&self, meta: &str, data_script: &str) -> SplitTemplate {
        let mut prefix = self.prefix.clone();
        let mut suffix = self.suffix.clone();

        if self.has_data_marker {
            replace_in_either(&mut prefix, &mut suffix, DATA_MARKER, data_script);
        } else {
            prefix.push_str(data_script);
        }
        replace_in_either(&mut prefix, &mut suffix, META_MARKER, meta);

        SplitTemplate { prefix, suffix }
    }
}

/// Inline script assigning the encoded result set to a window global.
///
/// `encoded` must already be script-safe.
pub fn data_script(global: &str, encoded: &str) -> String {
    format!("<script>window.{}={}</script>", global, encoded)
}

fn expect_once(source: &str, marker: &'static str) -> Result<(), TemplateError> {
    match source.matches(marker).count() {
        0 => Err(TemplateError::MissingMarker(marker)),
        1 => Ok(()),
        _ => Err(TemplateError::DuplicateMarker(marker)),
    }
}

fn replace_in_either(prefix: &mut String, suffix: &mut String, marker: &str, with: &str) {
    if prefix.contains(marker) {
        *prefix = prefix.replacen(marker, with, 1);
    } else {
        *suffix = suffix.replacen(marker, with, 1);
    }
}
