//! # autoindex-core
//!
//! Directory-listing generation for static file trees.
//!
//! The crate walks a tree through a memoizing filesystem cache, renders an
//! HTML listing per directory from a token template, and refuses to touch
//! directories that keep a hand-authored index. Three optional inputs shape
//! each listing: an `indexoverwrite.json(5)` row override, a README
//! embedded after sanitization, and a `.nofiles` static block.
//!
//! Everything here is synchronous. Servers bridge [`IndexBuilder::build`]
//! onto a blocking pool and share one builder so its cache is shared too.

pub mod cache;
pub mod error;
pub mod format;
pub mod listing;
pub mod overrides;
pub mod readme;
pub mod template;
pub mod walker;

pub use cache::FsCache;
pub use error::{IndexError, Result};
pub use listing::{BuildOptions, IndexBuilder};
pub use template::{GENERATED_MARKER, Template};
pub use walker::{FileEntry, walk};

/// Version string advertised in generated pages and the server's
/// `X-Powered-By` header, e.g. `autoindex/0.1.0 (linux)`.
pub fn version() -> String {
    format!("autoindex/{} ({})", env!("CARGO_PKG_VERSION"), std::env::consts::OS)
}
