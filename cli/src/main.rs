//! Command-line front end: batch `build`, on-the-fly `serve`, and `license`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use autoindex_core::{BuildOptions, IndexBuilder, Template};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Generate directory-listing pages for a static file tree.
#[derive(Parser)]
#[command(name = "autoindex", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write an index.html into every directory under DIR.
    Build {
        /// Root of the tree to index.
        #[arg(default_value = ".")]
        dir: PathBuf,
        #[command(flatten)]
        listing: ListingArgs,
    },
    /// Serve DIR over HTTP, generating listings on the fly.
    Serve {
        /// Root of the tree to serve.
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Port to listen on.
        #[arg(short, long, default_value_t = 6660)]
        port: u16,
        #[command(flatten)]
        listing: ListingArgs,
    },
    /// Print the license.
    License,
}

/// Options shared by everything that renders listings.
#[derive(Args)]
struct ListingArgs {
    /// Page template to use instead of the built-in one.
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,
    /// Do not embed README files into listings.
    #[arg(long)]
    no_readme: bool,
    /// Ignore .nofiles markers.
    #[arg(long)]
    no_nofiles: bool,
}

impl ListingArgs {
    fn builder(&self) -> Result<IndexBuilder> {
        let template = match &self.template {
            Some(path) => Template::load(path)
                .with_context(|| format!("cannot load template {}", path.display()))?,
            None => Template::embedded(),
        };
        let options = BuildOptions {
            embed_readme: !self.no_readme,
            honor_nofiles: !self.no_nofiles,
        };
        Ok(IndexBuilder::new(template, options))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build { dir, listing } => build(&dir, &listing.builder()?),
        Command::Serve { dir, port, listing } => {
            autoindex_server::serve(dir, listing.builder()?, port).await?;
            Ok(())
        }
        Command::License => {
            println!("{}", include_str!("../../LICENSE"));
            Ok(())
        }
    }
}

fn build(dir: &Path, builder: &IndexBuilder) -> Result<()> {
    let root = dir
        .canonicalize()
        .with_context(|| format!("cannot index {}", dir.display()))?;

    let mut written = 0usize;
    for entry in builder.walk(&root)? {
        if entry.is_directory {
            written += usize::from(write_listing(builder, &entry.path, &root)?);
        }
    }
    written += usize::from(write_listing(builder, &root, &root)?);

    info!("wrote {written} listing(s) under {}", root.display());
    Ok(())
}

/// Render one directory and write its index.html. Returns whether a file
/// was written.
fn write_listing(builder: &IndexBuilder, dir: &Path, root: &Path) -> Result<bool> {
    match builder.build(dir, root) {
        Ok(Some(page)) => {
            let target = dir.join("index.html");
            std::fs::write(&target, page)
                .with_context(|| format!("cannot write {}", target.display()))?;
            Ok(true)
        }
        Ok(None) => {
            debug!("{} keeps its manual index", dir.display());
            Ok(false)
        }
        Err(e) => {
            warn!("skipping {}: {e}", dir.display());
            Ok(false)
        }
    }
}
