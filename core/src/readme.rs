//! README discovery and sanitized embedding.
//!
//! A directory's README is rendered straight into its listing page, which
//! makes the README author an input to the generated HTML. Executable URI
//! schemes are therefore rewritten before any other processing, and markup
//! only ever reaches the page through an allow-list sanitizer.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use maplit::{hashmap, hashset};
use regex_lite::Regex;

/// README file names recognized for embedding, highest priority first.
/// Matching is case-insensitive.
const README_NAMES: [&str; 3] = ["readme", "readme.txt", "readme.html"];

/// URI schemes rewritten wherever they appear in embedded content.
const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "data:", "vbscript:"];

/// Upper bound on neutralization passes. Real inputs converge in one or
/// two; the cap keeps pathological input from spinning.
const NEUTRALIZE_LIMIT: usize = 16;

/// A README file discovered in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readme {
    /// Full path to the file.
    pub path: PathBuf,
    /// Whether the file is HTML rather than plain text.
    pub html: bool,
}

/// Pick the README to embed from a directory's entry names: `README` over
/// `README.txt` over `README.html`, in any letter case.
pub fn find(dir: &Path, entries: &[String]) -> Option<Readme> {
    for wanted in README_NAMES {
        if let Some(name) = entries.iter().find(|n| n.to_lowercase() == wanted) {
            return Some(Readme { path: dir.join(name), html: wanted == "readme.html" });
        }
    }
    None
}

/// Rewrite blocked URI schemes by replacing their trailing colon with a
/// literal `&colon;`. The scan repeats until a pass changes nothing, so a
/// scheme stitched together by an earlier replacement still gets caught.
pub fn neutralize_schemes(input: &str) -> String {
    let mut text = input.to_string();
    for _ in 0..NEUTRALIZE_LIMIT {
        let next = neutralize_pass(&text);
        if next == text {
            break;
        }
        text = next;
    }
    text
}

/// One left-to-right, case-insensitive pass over `input`.
fn neutralize_pass(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;
    while pos < input.len() {
        let next_hit = BLOCKED_SCHEMES
            .iter()
            .filter_map(|scheme| lower[pos..].find(scheme).map(|i| (pos + i, scheme.len())))
            .min();
        let Some((start, len)) = next_hit else {
            out.push_str(&input[pos..]);
            break;
        };
        // keep the scheme text as written, swap only its colon
        out.push_str(&input[pos..start + len - 1]);
        out.push_str("&colon;");
        pos = start + len;
    }
    out
}

/// Renders README bodies into sanitized, embeddable HTML.
pub struct ReadmeRenderer {
    autolink: Option<Regex>,
    plain: ammonia::Builder<'static>,
    html: ammonia::Builder<'static>,
}

impl ReadmeRenderer {
    pub fn new() -> Self {
        Self {
            autolink: Regex::new(r"<(https?://[^>\s]+)>").ok(),
            plain: sanitizer(false),
            html: sanitizer(true),
        }
    }

    /// Render a README body for embedding below a listing's file table.
    /// Plain bodies come back wrapped in `<pre>`; HTML bodies keep their
    /// own structure. Both are sanitized.
    pub fn render(&self, raw: &str, html_readme: bool) -> String {
        let neutralized = neutralize_schemes(raw);
        let linked = self.link_bare_urls(&neutralized);
        if html_readme {
            self.html.clean(&linked).to_string()
        } else {
            format!("<pre>{}</pre>", self.plain.clean(&linked))
        }
    }

    /// Turn `<http://…>` and `<https://…>` spans into anchors.
    fn link_bare_urls(&self, input: &str) -> String {
        match &self.autolink {
            Some(re) => re.replace_all(input, r#"<a href="${1}">${1}</a>"#).into_owned(),
            None => input.to_string(),
        }
    }
}

impl Default for ReadmeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Allow-list sanitizer shared by both README flavors. HTML READMEs may
/// style headings, containers, anchors, and table cells; plain ones only
/// inline text tags.
fn sanitizer(html_readme: bool) -> ammonia::Builder<'static> {
    let mut builder = ammonia::Builder::default();
    builder
        .tags(hashset![
            "a", "b", "blockquote", "br", "code", "dd", "del", "details", "div", "dl",
            "dt", "em", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "ins",
            "kbd", "li", "mark", "ol", "p", "pre", "s", "small", "span", "strong",
            "sub", "summary", "sup", "table", "tbody", "td", "th", "thead", "tr", "u",
            "ul",
            // constrained svg subset, enough for badges and simple figures
            "circle", "ellipse", "g", "line", "path", "polygon", "polyline", "rect",
            "svg", "text", "title",
        ])
        .tag_attributes(hashmap![
            "a" => hashset!["href", "title"],
            "img" => hashset!["src", "alt", "title", "width", "height"],
            "td" => hashset!["colspan", "rowspan"],
            "th" => hashset!["colspan", "rowspan"],
            "details" => hashset!["open"],
            "ol" => hashset!["start"],
            "svg" => hashset!["width", "height", "viewBox", "xmlns"],
            "circle" => hashset!["cx", "cy", "r", "fill", "stroke", "stroke-width"],
            "ellipse" => hashset!["cx", "cy", "rx", "ry", "fill", "stroke", "stroke-width"],
            "g" => hashset!["fill", "stroke", "stroke-width"],
            "line" => hashset!["x1", "y1", "x2", "y2", "stroke", "stroke-width"],
            "path" => hashset!["d", "fill", "stroke", "stroke-width"],
            "polygon" => hashset!["points", "fill", "stroke"],
            "polyline" => hashset!["points", "fill", "stroke"],
            "rect" => hashset!["x", "y", "width", "height", "rx", "ry", "fill", "stroke"],
            "text" => hashset!["x", "y", "fill", "font-size", "text-anchor"],
        ])
        .url_schemes(hashset!["http", "https"])
        .attribute_filter(|_, attribute, value| {
            if attribute != "style" {
                return Some(value.into());
            }
            let kept = filter_style(value);
            if kept.is_empty() { None } else { Some(Cow::Owned(kept)) }
        });
    let styled_tags: &[&str] = if html_readme {
        &["a", "blockquote", "div", "h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "td", "th"]
    } else {
        &["code", "em", "mark", "span", "strong"]
    };
    for tag in styled_tags {
        builder.add_tag_attributes(tag, &["style"]);
    }
    builder
}

/// Keep only style declarations whose property is a plain CSS identifier
/// and whose value is built from numbers, measurements, color literals, and
/// keywords. Anything that could smuggle a URL or script fragment is
/// dropped.
fn filter_style(value: &str) -> String {
    let mut kept = Vec::new();
    for declaration in value.split(';') {
        let Some((property, val)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim();
        let val = val.trim();
        if !property.is_empty()
            && property.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
            && safe_style_value(val)
        {
            kept.push(format!("{property}: {val}"));
        }
    }
    kept.join("; ")
}

fn safe_style_value(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    !value.is_empty()
        && !lower.contains("url(")
        && !lower.contains("expression")
        && value.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, ' ' | '#' | '%' | '(' | ')' | ',' | '.' | '-')
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn find_prefers_plain_over_txt_over_html() {
        let dir = Path::new("/tree");

        let all = names(&["README.html", "readme.txt", "ReadMe"]);
        assert_eq!(find(dir, &all).unwrap().path, dir.join("ReadMe"));

        let txt_and_html = names(&["README.html", "README.TXT"]);
        let found = find(dir, &txt_and_html).unwrap();
        assert_eq!(found.path, dir.join("README.TXT"));
        assert!(!found.html);

        let html_only = names(&["other.txt", "Readme.Html"]);
        let found = find(dir, &html_only).unwrap();
        assert_eq!(found.path, dir.join("Readme.Html"));
        assert!(found.html);

        assert_eq!(find(dir, &names(&["notes.md"])), None);
    }

    #[test]
    fn neutralize_rewrites_each_blocked_scheme() {
        assert_eq!(neutralize_schemes("javascript:alert(1)"), "javascript&colon;alert(1)");
        assert_eq!(neutralize_schemes("DATA:text/html"), "DATA&colon;text/html");
        assert_eq!(neutralize_schemes("vbscript:msgbox"), "vbscript&colon;msgbox");
        assert_eq!(neutralize_schemes("https://ok.example/"), "https://ok.example/");
    }

    #[test]
    fn neutralize_runs_to_a_fixed_point() {
        let tricky = "javascriptjavascript::";
        let neutral = neutralize_schemes(tricky);
        assert!(!neutral.to_ascii_lowercase().contains("javascript:"), "got {neutral}");
    }

    #[test]
    fn autolinks_angle_bracketed_urls() {
        let renderer = ReadmeRenderer::new();
        let out = renderer.render("see <https://example.com/x> for details", false);
        assert!(out.contains(r#"<a href="https://example.com/x""#), "got {out}");
        assert!(out.starts_with("<pre>"), "got {out}");
    }

    #[test]
    fn strips_scripts_and_event_handlers() {
        let renderer = ReadmeRenderer::new();
        let out = renderer.render(r#"<p onclick="evil()">hi</p><script>alert(1)</script>"#, true);
        assert!(!out.contains("onclick"), "got {out}");
        assert!(!out.contains("alert"), "got {out}");
        assert!(out.contains("<p>hi</p>"), "got {out}");
    }

    #[test]
    fn drops_links_outside_http_and_https() {
        let renderer = ReadmeRenderer::new();
        let out = renderer.render(r#"<a href="ftp://example.com/">get</a>"#, true);
        assert!(!out.contains("ftp:"), "got {out}");
        assert!(out.contains("get"), "got {out}");
    }

    #[test]
    fn style_filter_keeps_simple_declarations_only() {
        assert_eq!(
            filter_style("color: #fff; background: url(http://evil/x.png); width: 50%"),
            "color: #fff; width: 50%"
        );
        assert_eq!(filter_style("behavior: expression(alert(1))"), "");
    }

    #[test]
    fn html_readmes_keep_filtered_styles() {
        let renderer = ReadmeRenderer::new();
        let out = renderer
            .render(r#"<h1 style="color: #abc; background: url(javascript:x)">Title</h1>"#, true);
        assert!(out.contains("color: #abc"), "got {out}");
        assert!(!out.contains("url("), "got {out}");
    }

    #[test]
    fn svg_subset_survives_sanitization() {
        let renderer = ReadmeRenderer::new();
        let out = renderer.render(
            r##"<svg width="10" height="10"><rect width="10" height="10" fill="#f00"></rect></svg>"##,
            true,
        );
        assert!(out.contains("<svg"), "got {out}");
        assert!(out.contains("<rect"), "got {out}");
    }
}
