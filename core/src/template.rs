//! Page templates and token substitution.

use std::path::Path;

use crate::error::{IndexError, Result};

/// Marker distinguishing generated pages from hand-authored ones. A page
/// without it is never overwritten.
pub const GENERATED_MARKER: &str = "<!--!GENERATED_INDEX!-->";

/// Token replaced with a `<!--autoindex/… (os)-->` comment at load time.
pub(crate) const VERSION_TOKEN: &str = "%versioncomment%";
/// Token replaced with social-card meta tags, or nothing.
pub(crate) const IMG_TOKEN: &str = "<!--%img%-->";
/// Token replaced with the listing's root-relative location.
pub(crate) const LOCATION_TOKEN: &str = "%location%";
/// Token replaced with the formatted file table.
pub(crate) const FILES_TOKEN: &str = "%files%";
/// Token replaced with the sanitized README block, or nothing.
pub(crate) const README_TOKEN: &str = "%README%";
/// Start of the region a `.nofiles` block replaces.
pub(crate) const BEGIN_FILES_TOKEN: &str = "%begin_files%";
/// End of the region a `.nofiles` block replaces.
pub(crate) const END_FILES_TOKEN: &str = "%end_files%";

const DEFAULT_TEMPLATE: &str = include_str!("template.html");

/// A listing page template with the version comment already substituted.
#[derive(Debug, Clone)]
pub struct Template {
    html: String,
}

impl Template {
    /// The built-in dark-theme template.
    pub fn embedded() -> Self {
        Self::from_raw(DEFAULT_TEMPLATE.to_string())
    }

    /// Load a custom template from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| IndexError::Template(format!("{}: {e}", path.display())))?;
        Ok(Self::from_raw(raw))
    }

    /// Build a template from raw HTML.
    pub fn from_raw(raw: String) -> Self {
        let comment = format!("<!--{}-->", crate::version());
        Self { html: raw.replace(VERSION_TOKEN, &comment) }
    }

    /// The template HTML, ready for per-directory substitution.
    pub(crate) fn html(&self) -> &str {
        &self.html
    }
}

/// Replace everything from `%begin_files%` through `%end_files%` with
/// `content`. Returns `None` when either marker is missing.
pub(crate) fn splice_files_region(html: &str, content: &str) -> Option<String> {
    let begin = html.find(BEGIN_FILES_TOKEN)?;
    let end = html[begin..].find(END_FILES_TOKEN)? + begin + END_FILES_TOKEN.len();
    Some(format!("{}{}{}", &html[..begin], content, &html[end..]))
}

/// Drop the region markers, leaving whatever sits between them in place.
pub(crate) fn strip_region_markers(html: &str) -> String {
    html.replacen(BEGIN_FILES_TOKEN, "", 1).replacen(END_FILES_TOKEN, "", 1)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn embedded_template_carries_marker_and_tokens() {
        let template = Template::embedded();
        assert!(template.html().contains(GENERATED_MARKER));
        assert!(template.html().contains(LOCATION_TOKEN));
        assert!(template.html().contains(FILES_TOKEN));
        assert!(template.html().contains(README_TOKEN));
        assert!(template.html().contains(IMG_TOKEN));
        assert!(
            !template.html().contains(VERSION_TOKEN),
            "the version comment should already be substituted"
        );
    }

    #[test]
    fn version_token_becomes_a_comment() {
        let template = Template::from_raw("a %versioncomment% b".to_string());
        assert_eq!(template.html(), format!("a <!--{}--> b", crate::version()));
    }

    #[test]
    fn splice_replaces_the_whole_region() {
        let html = "before %begin_files%<pre>%files%</pre>%end_files% after";
        assert_eq!(splice_files_region(html, "STATIC").unwrap(), "before STATIC after");
        assert_eq!(splice_files_region("no markers here", "STATIC"), None);
    }

    #[test]
    fn strip_removes_markers_only() {
        assert_eq!(strip_region_markers("a %begin_files%X%end_files% b"), "a X b");
    }
}
