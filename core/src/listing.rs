//! Listing generation: one directory in, one HTML page out.
//!
//! [`IndexBuilder`] owns the filesystem cache, the page template, and the
//! README renderer. `build` stitches them into a page for a single
//! directory; `walk` enumerates the tree a batch run covers, priming the
//! cache as it goes.

use std::cmp::Ordering;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::cache::FsCache;
use crate::error::{IndexError, Result};
use crate::format::{pretty_size, timestamp};
use crate::overrides;
use crate::readme::{self, ReadmeRenderer};
use crate::template::{self, GENERATED_MARKER, Template};
use crate::walker::{self, FileEntry};

/// Files whose presence marks a directory as hand-indexed.
const MANUAL_INDEX_NAMES: [&str; 3] = ["index.txt", "index.md", "index"];
/// Entries never shown in generated listings.
const HIDDEN_NAMES: [&str; 2] = [".git", ".gitkeep"];
/// Its contents replace the file-table region wholesale.
const NOFILES_NAME: &str = ".nofiles";
/// Social-card image looked up per directory, then at the root.
const SOCIAL_CARD_NAME: &str = "social-card.png";

/// Narrowest name column, in characters.
const MIN_NAME_COLUMN: usize = 51;
/// Widest name column; longer labels are truncated.
const MAX_NAME_COLUMN: usize = 60;
/// Width of the modification-time column.
const DATE_COLUMN: usize = 30;

/// Toggles for optional listing features.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Embed a sanitized README below the file table.
    pub embed_readme: bool,
    /// Let a `.nofiles` file replace the file table with static content.
    pub honor_nofiles: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { embed_readme: true, honor_nofiles: true }
    }
}

/// Where a listing's rows came from, which decides how they are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowOrder {
    /// Rows read from the directory: directories first, then by name.
    Sorted,
    /// Rows from an override file: declaration order, untouched.
    Declared,
}

/// One row of the file table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Row {
    /// Display text; directories carry a trailing `/`.
    label: String,
    /// Link target, relative to the directory.
    target: String,
}

/// Generates listing pages for directories under a serving root.
pub struct IndexBuilder {
    cache: FsCache,
    template: Template,
    options: BuildOptions,
    readme: ReadmeRenderer,
}

impl IndexBuilder {
    pub fn new(template: Template, options: BuildOptions) -> Self {
        Self { cache: FsCache::new(), template, options, readme: ReadmeRenderer::new() }
    }

    /// Builder with the embedded template and default options.
    pub fn with_defaults() -> Self {
        Self::new(Template::embedded(), BuildOptions::default())
    }

    /// The shared filesystem cache.
    pub fn cache(&self) -> &FsCache {
        &self.cache
    }

    /// Drop all memoized filesystem lookups.
    pub fn clear_caches(&self) {
        self.cache.clear();
    }

    /// Enumerate the tree under `root`, priming the cache along the way.
    pub fn walk(&self, root: &Path) -> Result<Vec<FileEntry>> {
        walker::walk(&self.cache, root)
    }

    /// Build the listing page for `dir`, where `root` is the top of the
    /// served tree. Returns `Ok(None)` when the directory keeps a
    /// hand-authored index.
    pub fn build(&self, dir: &Path, root: &Path) -> Result<Option<String>> {
        let entries = self.cache.entries(dir)?;
        if self.has_manual_index(dir, &entries)? {
            debug!("{} keeps its own index", dir.display());
            return Ok(None);
        }

        let mut page = self.template.html().to_string();
        page = page
            .replace(template::IMG_TOKEN, &self.social_card_tags(dir, root).unwrap_or_default());
        page = page.replace(template::LOCATION_TOKEN, &relative_location(dir, root));

        let static_region = if self.options.honor_nofiles {
            read_optional(&dir.join(NOFILES_NAME))?
        } else {
            None
        };
        page = match static_region
            .as_ref()
            .and_then(|block| template::splice_files_region(&page, block.trim()))
        {
            Some(with_static) => with_static,
            // no .nofiles, or a template without region markers
            None => {
                let rows = self.rows(dir, &entries)?;
                let table = self.file_table(dir, &rows);
                template::strip_region_markers(&page)
                    .replace(template::FILES_TOKEN, table.trim_end())
            }
        };

        let readme_block =
            if self.options.embed_readme { self.readme_block(dir, &entries)? } else { None };
        page = page.replace(template::README_TOKEN, readme_block.as_deref().unwrap_or(""));

        // README text can survive HTML parsing with its entities decoded,
        // so the composed page gets one more neutralization pass.
        Ok(Some(readme::neutralize_schemes(&page)))
    }

    /// Display rows: override-declared when an override file exists,
    /// otherwise the directory's entries sorted for display.
    fn rows(&self, dir: &Path, entries: &[String]) -> Result<Vec<Row>> {
        let (mut rows, order) = match overrides::load(dir)? {
            Some(declared) => {
                let rows = declared
                    .into_iter()
                    .map(|o| Row { label: o.label, target: o.target })
                    .collect();
                (rows, RowOrder::Declared)
            }
            None => (self.directory_rows(dir, entries), RowOrder::Sorted),
        };
        sort_rows(&mut rows, order);
        Ok(rows)
    }

    /// Rows for a directory's real entries, hidden names filtered out.
    fn directory_rows(&self, dir: &Path, entries: &[String]) -> Vec<Row> {
        entries
            .iter()
            .filter(|name| !HIDDEN_NAMES.contains(&name.as_str()))
            .map(|name| {
                let is_directory =
                    self.cache.stat(&dir.join(name)).is_ok_and(|meta| meta.is_dir());
                let label = if is_directory { format!("{name}/") } else { name.clone() };
                Row { label: label.clone(), target: label }
            })
            .collect()
    }

    /// Format rows into the fixed-width text block that sits inside the
    /// template's `<pre>`.
    fn file_table(&self, dir: &Path, rows: &[Row]) -> String {
        let longest = rows.iter().map(|row| row.label.chars().count()).max().unwrap_or(0);
        let width = name_column_width(longest);

        let mut table = String::new();
        for row in rows {
            let meta = self.row_metadata(dir, row);
            let label = truncate_label(&row.label, width);
            let pad = width.saturating_sub(label.chars().count());
            let date = match &meta {
                Some(meta) => timestamp(meta.modified().unwrap_or(SystemTime::UNIX_EPOCH)),
                None => timestamp(SystemTime::UNIX_EPOCH),
            };
            let date_pad = DATE_COLUMN.saturating_sub(date.chars().count());
            let size = match &meta {
                Some(meta) if meta.len() > 0 && !meta.is_dir() && !row.label.ends_with('/') => {
                    pretty_size(meta.len())
                }
                _ => "-".to_string(),
            };
            table.push_str(&format!(
                "<a href=\"{}\">{}</a>{}{}{}{}\n",
                escape_attribute(&row.target),
                escape_text(&label),
                " ".repeat(pad),
                date,
                " ".repeat(date_pad),
                size,
            ));
        }
        table
    }

    /// Stat a row's link target. Overrides can point at entries that do not
    /// exist; those degrade to `None` instead of failing the listing.
    fn row_metadata(&self, dir: &Path, row: &Row) -> Option<std::fs::Metadata> {
        let path = dir.join(&row.target);
        match self.cache.stat(&path) {
            Ok(meta) => Some(meta),
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("failed to stat {}: {e}", path.display());
                }
                None
            }
        }
    }

    /// True when the directory holds an index the generator must not touch:
    /// `index.txt`, `index.md`, extensionless `index`, or an `index.html`
    /// missing the generator marker.
    fn has_manual_index(&self, dir: &Path, entries: &[String]) -> Result<bool> {
        for name in entries {
            if MANUAL_INDEX_NAMES.contains(&name.as_str()) {
                return Ok(true);
            }
            if name == "index.html" {
                let html = std::fs::read(dir.join(name))?;
                if !String::from_utf8_lossy(&html).contains(GENERATED_MARKER) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Meta tags advertising a `social-card.png`, preferring one in `dir`
    /// and falling back to one at the root of the tree.
    fn social_card_tags(&self, dir: &Path, root: &Path) -> Option<String> {
        let content = if self.cache.stat(&dir.join(SOCIAL_CARD_NAME)).is_ok() {
            let location = relative_location(dir, root);
            format!("/{location}{SOCIAL_CARD_NAME}")
        } else if self.cache.stat(&root.join(SOCIAL_CARD_NAME)).is_ok() {
            format!("/{SOCIAL_CARD_NAME}")
        } else {
            return None;
        };
        Some(social_card_markup(&content))
    }

    /// The sanitized README block for a directory, if it has a README.
    fn readme_block(&self, dir: &Path, entries: &[String]) -> Result<Option<String>> {
        let Some(found) = readme::find(dir, entries) else {
            return Ok(None);
        };
        let raw = std::fs::read_to_string(&found.path)
            .map_err(|e| IndexError::Readme(format!("{}: {e}", found.path.display())))?;
        debug!("embedding {}", found.path.display());
        let body = self.readme.render(&raw, found.html);
        Ok(Some(format!("<hr>\n<div class=\"readme\">\n{body}\n</div>")))
    }
}

/// Sort rows for display. Declared rows keep their file order; sorted rows
/// put directories first, then compare names case-insensitively with a
/// case-sensitive tiebreak.
fn sort_rows(rows: &mut [Row], order: RowOrder) {
    if order == RowOrder::Declared {
        return;
    }
    rows.sort_by(|a, b| compare_labels(&a.label, &b.label));
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    let a_is_dir = a.ends_with('/');
    let b_is_dir = b.ends_with('/');
    b_is_dir
        .cmp(&a_is_dir)
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Name-column width for the longest label: one space past the longest,
/// clamped into the fixed range.
fn name_column_width(longest: usize) -> usize {
    (longest + 1).clamp(MIN_NAME_COLUMN, MAX_NAME_COLUMN)
}

/// Cut a label so at least one space separates it from the date column,
/// marking the cut with `…`.
fn truncate_label(label: &str, width: usize) -> String {
    if label.chars().count() < width {
        return label.to_string();
    }
    let mut cut: String = label.chars().take(width.saturating_sub(2)).collect();
    cut.push('…');
    cut
}

/// `dir` relative to `root`, as a URL path: empty for the root itself,
/// otherwise forward-slashed with a trailing `/`.
fn relative_location(dir: &Path, root: &Path) -> String {
    let Ok(relative) = dir.strip_prefix(root) else {
        return String::new();
    };
    let mut location = String::new();
    for component in relative.components() {
        location.push_str(&component.as_os_str().to_string_lossy());
        location.push('/');
    }
    location
}

/// The meta tags a social card expands into.
fn social_card_markup(content: &str) -> String {
    [
        format!(r#"<meta name="og:image" content="{content}">"#),
        format!(r#"<meta name="twitter:image" content="{content}">"#),
        format!(r#"<meta name="image" content="{content}">"#),
        r#"<meta name="og:card" content="summary_large_image">"#.to_string(),
        r#"<meta name="twitter:card" content="summary_large_image">"#.to_string(),
        r#"<meta name="card" content="summary_large_image">"#.to_string(),
    ]
    .join("\n  ")
}

/// Read a file that may legitimately be absent.
fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Escape text destined for an attribute value.
fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape text destined for element content.
fn escape_text(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
