//! deskfind CLI - find desktop files by keyword and learn from what you open

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use deskfind::feedback::{self, FeedbackStore};
use deskfind::index::{self, Mapping};
use deskfind::memory::load_memory;
use deskfind::opener::SystemOpener;
use deskfind::{
    AppPaths, Config, Engine, ExtensionMatch, Item, JsonFeedbackStore, LoadOutcome, SearchOptions,
    SearchResult,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "deskfind")]
#[command(
    author,
    version,
    about = "deskfind - Desktop file finder that learns from your choices"
)]
#[command(propagate_version = true)]
struct Cli {
    /// Application directory (default: ~/.deskfind)
    #[arg(long, global = true, env = "DESKFIND_HOME")]
    app_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the configured roots and write the index
    Index {
        /// Rebuild even if the index is fresh
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Search the memory list and the index
    Search {
        /// Query words
        #[arg(required = true)]
        query: Vec<String>,

        /// Maximum number of results (default: top_k from config)
        #[arg(long, short = 'n')]
        top: Option<usize>,

        /// Output format (text, json)
        #[arg(long, short = 'o', default_value = "text")]
        format: String,

        /// Open result N (1-based) and record the outcome
        #[arg(long, conflicts_with = "interactive")]
        pick: Option<usize>,

        /// Ask which result to open
        #[arg(long, short = 'i')]
        interactive: bool,

        /// Show the score factors of every result
        #[arg(long)]
        explain: bool,

        /// Use the existing index without refreshing it
        #[arg(long)]
        no_index: bool,

        /// Tokens the extension bonus matches against (expanded, literal)
        #[arg(long)]
        extension_match: Option<ExtensionMatch>,
    },

    /// Record feedback for a path without opening it
    Feedback {
        /// Query the feedback applies to
        query: String,

        /// Path of the chosen item
        path: String,

        /// Record a rejection instead of an acceptance
        #[arg(long)]
        reject: bool,
    },

    /// Show paths, item counts and learned feedback
    Status {
        /// Output format (text, json)
        #[arg(long, short = 'o', default_value = "text")]
        format: String,
    },

    /// Forget all learned feedback
    ResetFeedback,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let paths = AppPaths::new(cli.app_dir.unwrap_or_else(deskfind::default_app_dir));
    std::fs::create_dir_all(&paths.root)
        .with_context(|| format!("Cannot create {}", paths.root.display()))?;

    match cli.command {
        Commands::Index { force } => cmd_index(&paths, force),
        Commands::Search {
            query,
            top,
            format,
            pick,
            interactive,
            explain,
            no_index,
            extension_match,
        } => cmd_search(
            &paths,
            &query.join(" "),
            SearchFlags {
                top,
                format,
                pick,
                interactive,
                explain,
                no_index,
                extension_match,
            },
        ),
        Commands::Feedback {
            query,
            path,
            reject,
        } => cmd_feedback(&paths, &query, &path, reject),
        Commands::Status { format } => cmd_status(&paths, &format),
        Commands::ResetFeedback => cmd_reset_feedback(&paths),
    }
}

fn cmd_index(paths: &AppPaths, force: bool) -> Result<()> {
    let config = Config::load(&paths.config)?;
    let stats = index::ensure_index(&config, &paths.index, force)?;

    if stats.rebuilt {
        println!(
            "Indexed {} files from {} roots in {:.2}s",
            stats.files_indexed,
            stats.roots_scanned,
            stats.duration.as_secs_f64()
        );
    } else {
        println!(
            "Index is fresh ({} files). Use --force to rebuild.",
            stats.files_indexed
        );
    }
    Ok(())
}

/// Memory entries first, then crawled files
fn load_items(paths: &AppPaths, config: &Config, refresh: bool) -> Result<Vec<Item>> {
    let mut items = load_memory(&paths.memory)
        .with_context(|| format!("Cannot read {}", paths.memory.display()))?;

    if refresh {
        index::ensure_index(config, &paths.index, false)?;
    }
    items.extend(Mapping::load(&paths.index)?.items);
    Ok(items)
}

/// Options of the `search` subcommand
struct SearchFlags {
    top: Option<usize>,
    format: String,
    pick: Option<usize>,
    interactive: bool,
    explain: bool,
    no_index: bool,
    extension_match: Option<ExtensionMatch>,
}

fn cmd_search(paths: &AppPaths, query: &str, flags: SearchFlags) -> Result<()> {
    let json = flags.format == "json";
    let query = query.trim();
    if query.is_empty() {
        if json {
            println!("[]");
        } else {
            println!("Enter some keywords, e.g. deskfind search 預製圖 dwg");
        }
        return Ok(());
    }

    let config = Config::load(&paths.config)?;
    let mut scoring = config.scoring.clone();
    if let Some(policy) = flags.extension_match {
        scoring.extension_match = policy;
    }

    let items = load_items(paths, &config, !flags.no_index)?;
    let engine = Engine::new(items, JsonFeedbackStore::new(&paths.feedback))
        .with_synonyms(config.synonym_table())
        .with_scoring(scoring);

    let options = SearchOptions {
        limit: flags.top.unwrap_or(config.top_k),
        explain: flags.explain,
        now: None,
    };
    let results = engine.search_with(query, &options);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(query, &results);
    }

    if results.is_empty() {
        return Ok(());
    }

    let choice = if flags.interactive {
        match prompt_choice(results.len())? {
            Some(n) => n,
            None => {
                eprintln!("Skipped opening.");
                return Ok(());
            }
        }
    } else {
        match flags.pick {
            Some(n) => n,
            None => return Ok(()),
        }
    };

    if choice == 0 || choice > results.len() {
        bail!("Pick must be between 1 and {}", results.len());
    }
    open_result(&engine, query, &results[choice - 1].item);
    Ok(())
}

fn print_results(query: &str, results: &[SearchResult]) {
    if results.is_empty() {
        println!("No results found for '{}'", query);
        return;
    }

    println!("Found {} results for '{}':\n", results.len(), query);
    for (i, result) in results.iter().enumerate() {
        let label = result
            .item
            .description
            .as_deref()
            .unwrap_or_else(|| result.item.display_name());
        println!(
            "{:>2}. [{:.3}] {}  ->  {}",
            i + 1,
            result.score,
            label,
            result.item.path_str()
        );
        if let Some(b) = &result.breakdown {
            println!(
                "    base {:.0} x fresh {:.3} x depth {:.3} x ext {:.2} x item {:.3} x tokens {:.3}",
                b.base, b.freshness, b.depth, b.extension, b.item_bias, b.token_bias
            );
        }
    }
}

/// Read a 1-based choice from stdin; empty input skips
fn prompt_choice(count: usize) -> Result<Option<usize>> {
    eprint!("\nOpen which result? (1-{}, Enter to skip): ", count);
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let n = line
        .parse::<usize>()
        .with_context(|| format!("Not a result number: '{}'", line))?;
    Ok(Some(n))
}

/// Outcome messages go to stderr so `--format json` output stays parseable
fn open_result(engine: &Engine<JsonFeedbackStore>, query: &str, item: &Item) {
    let target = item.path_str();
    if !target.is_empty() && !Path::new(target).exists() {
        tracing::warn!("{} does not exist; trying the action anyway", target);
    }

    match engine.open(&SystemOpener, query, item) {
        Ok(true) => eprintln!("Opened {} (recorded as accepted)", target),
        Ok(false) => eprintln!("Could not open {} (recorded as rejected)", target),
        Err(e) => tracing::warn!("Failed to record feedback for {}: {}", target, e),
    }
}

fn cmd_feedback(paths: &AppPaths, query: &str, path: &str, reject: bool) -> Result<()> {
    let store = JsonFeedbackStore::new(&paths.feedback);
    let item = Item::new(path);
    feedback::learn(&store, query, &item, !reject)?;

    println!(
        "Recorded {} for '{}' under '{}'",
        if reject { "rejection" } else { "acceptance" },
        path,
        query
    );
    Ok(())
}

fn cmd_status(paths: &AppPaths, format: &str) -> Result<()> {
    let config = Config::load_or_default(&paths.config)?;
    let mapping = Mapping::load(&paths.index)?;
    let memory = load_memory(&paths.memory)?;

    let store = JsonFeedbackStore::new(&paths.feedback);
    let outcome = store.load();
    let feedback_state = match &outcome {
        LoadOutcome::Loaded(_) => "ok".to_string(),
        LoadOutcome::Missing => "missing".to_string(),
        LoadOutcome::Corrupt { reason } => format!("corrupt ({})", reason),
    };
    let snapshot = outcome.into_snapshot();
    let stale = index::is_stale(&paths.index, config.refresh_days, std::time::SystemTime::now());
    let generated = chrono::DateTime::from_timestamp(mapping.generated_at as i64, 0)
        .filter(|_| mapping.generated_at > 0.0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string());

    if format == "json" {
        let data = serde_json::json!({
            "app_dir": paths.root,
            "config": paths.config,
            "index": {
                "path": paths.index,
                "items": mapping.count,
                "generated_at": generated,
                "stale": stale,
            },
            "memory": {
                "path": paths.memory,
                "items": memory.len(),
            },
            "feedback": {
                "path": paths.feedback,
                "state": feedback_state,
                "items": snapshot.item_bias.len(),
                "tokens": snapshot.token_bias.len(),
            },
            "roots": config.roots,
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("deskfind Status\n");
    println!("App dir: {}", paths.root.display());
    println!("Config: {}", paths.config.display());
    println!(
        "Index: {} ({} files, {}{})",
        paths.index.display(),
        mapping.count,
        generated.as_deref().unwrap_or("never built"),
        if stale { ", stale" } else { "" }
    );
    println!("Memory: {} ({} entries)", paths.memory.display(), memory.len());
    println!(
        "Feedback: {} ({}, {} items, {} tokens)",
        paths.feedback.display(),
        feedback_state,
        snapshot.item_bias.len(),
        snapshot.token_bias.len()
    );
    println!("\nRoots:");
    for root in &config.roots {
        let marker = if root.is_dir() { "" } else { " (missing)" };
        println!("  {}{}", root.display(), marker);
    }
    Ok(())
}

fn cmd_reset_feedback(paths: &AppPaths) -> Result<()> {
    JsonFeedbackStore::new(&paths.feedback).reset()?;
    println!("Cleared learned feedback at {}", paths.feedback.display());
    Ok(())
}
