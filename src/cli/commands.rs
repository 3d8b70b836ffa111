//! CLI command definitions and handlers.
//!
//! Each subcommand is implemented as a function that takes the parsed
//! arguments and returns an `anyhow::Result<()>`.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::Error;
use crate::model::{LocalFile, LookupRequest, MediaType};
use crate::{artwork, config, hasher, platforms, scanner};

/// Cover Scout - locate cover artwork for archived software images
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve artwork for every ROM under a path
    Resolve {
        /// File or directory to process
        path: PathBuf,
        /// Platform short name (e.g. "nes", "gba")
        #[arg(short, long)]
        platform: String,
        /// Artwork kind: boxart, snap, or title
        #[arg(short, long, default_value = "boxart")]
        media: String,
    },
    /// Validate that a platform is served by the configured sources,
    /// warming caches along the way
    Prefetch {
        /// Platform short name (e.g. "nes", "gba")
        platform: String,
    },
    /// Print the CRC-32 digest of one or more files
    Hash {
        /// Files to hash
        paths: Vec<PathBuf>,
    },
    /// List supported platforms
    Platforms,
}

/// Dispatch the parsed command.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    match &cli.command {
        Commands::Resolve {
            path,
            platform,
            media,
        } => cmd_resolve(&rt, path, platform, media),
        Commands::Prefetch { platform } => cmd_prefetch(&rt, platform),
        Commands::Hash { paths } => cmd_hash(paths),
        Commands::Platforms => cmd_platforms(),
    }
}

fn resolve_platform(name: &str) -> Result<&'static platforms::Platform, Error> {
    platforms::by_short_name(name).ok_or_else(|| {
        let known: Vec<&str> = platforms::PLATFORMS.iter().map(|p| p.short_name).collect();
        Error::invalid_argument(format!(
            "Unknown platform '{}'. Supported: {}",
            name,
            known.join(", ")
        ))
    })
}

/// Resolve artwork for every candidate file under `path`.
fn cmd_resolve(rt: &Runtime, path: &Path, platform: &str, media: &str) -> anyhow::Result<()> {
    let platform = resolve_platform(platform)?;
    let media_type = MediaType::parse(media).ok_or_else(|| {
        Error::invalid_argument(format!("Unknown media type '{media}' (boxart, snap, title)"))
    })?;
    if !path.exists() {
        return Err(Error::not_found(path).into());
    }

    let config = config::load();

    let files = if path.is_file() {
        let size = std::fs::metadata(path)?.len();
        vec![LocalFile::new(path.to_path_buf(), size)]
    } else {
        scanner::scan(path)
    };
    if files.is_empty() {
        println!("No candidate files under {:?}", path);
        return Ok(());
    }
    info!("Found {} candidate file(s)", files.len());

    rt.block_on(async {
        let registry = artwork::default_registry();
        let mut chain = registry.build(&config.sources).await;
        if chain.is_empty() {
            anyhow::bail!("No usable sources; check configuration");
        }

        // Hash up front, best-effort, and only if a source will use it
        let hashes: Vec<Option<String>> = if chain.needs_hash() {
            let paths: Vec<&Path> = files.iter().map(|f| f.path.as_path()).collect();
            hasher::hash_files(&paths)
                .into_iter()
                .map(|r| r.ok())
                .collect()
        } else {
            vec![None; files.len()]
        };

        let mut confident = 0usize;
        let mut speculative = 0usize;
        let mut missed = 0usize;

        for (file, content_hash) in files.iter().zip(hashes) {
            let request = LookupRequest {
                file: file.clone(),
                content_hash,
                platform_id: platform.id,
                media_type,
                region_priority: config.matching.region_priority.clone(),
            };

            let outcome = chain.lookup_with_fallback(&request).await;
            let result = outcome.result;
            if result.found {
                let marker = if result.best_effort { "~" } else { "+" };
                if result.best_effort {
                    speculative += 1;
                } else {
                    confident += 1;
                }
                println!(
                    "{} {} -> {} [{}]",
                    marker,
                    file.file_name,
                    result.display_name.as_deref().unwrap_or("?"),
                    outcome.source_id.as_deref().unwrap_or("?"),
                );
                match result.media_url {
                    Some(url) => println!("    {}", url),
                    None => println!("    (identified, but no {} asset)", media_type),
                }
            } else {
                missed += 1;
                println!("- {}: no match", file.file_name);
            }
        }

        println!();
        println!(
            "{} confident, {} best-effort, {} unmatched",
            confident, speculative, missed
        );

        chain.dispose().await;
        Ok(())
    })
}

/// Fail-fast platform validation across the configured sources.
fn cmd_prefetch(rt: &Runtime, platform: &str) -> anyhow::Result<()> {
    let platform = resolve_platform(platform)?;
    let config = config::load();

    rt.block_on(async {
        let registry = artwork::default_registry();
        let mut chain = registry.build(&config.sources).await;
        if chain.is_empty() {
            anyhow::bail!("No usable sources; check configuration");
        }

        // Dispose on both outcomes; the trait promises the full lifecycle
        let result = chain.prefetch(platform.id).await;
        chain.dispose().await;
        result?;

        println!("Platform '{}' is available", platform.short_name);
        Ok(())
    })
}

/// Hash files and print digests; batch policy means one bad file does
/// not stop the rest.
fn cmd_hash(paths: &[PathBuf]) -> anyhow::Result<()> {
    if paths.is_empty() {
        anyhow::bail!("No files given");
    }
    let borrowed: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();
    for (path, result) in paths.iter().zip(hasher::hash_files(&borrowed)) {
        match result {
            Ok(digest) => println!("{}  {}", digest, path.display()),
            Err(e) => println!("error     {} ({})", path.display(), e),
        }
    }
    Ok(())
}

fn cmd_platforms() -> anyhow::Result<()> {
    for platform in platforms::PLATFORMS {
        println!("{:<14} {}", platform.short_name, platform.catalog_name);
    }
    Ok(())
}
