//! sladump - Extract text from Scribus projects
//!
//! Dumps the visible text of an `.sla` file as markdown in reading order,
//! or in document order, or as a JSON tree.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::{ArgAction, Parser, Subcommand};
use slatext::{decode_source, dump_attribute_values, LayoutConfig, ScribusProject};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Extract text from Scribus (SLA) projects.
#[derive(Parser, Debug)]
#[command(name = "sladump")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// JSON layout configuration; missing keys keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log mismatched tags instead of failing
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    lenient: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Text of every visible page, in reading order
    Dump {
        project: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Text in document order, ignoring page layout
    Unsorted { project: PathBuf },

    /// Document tree as JSON
    Tree {
        project: PathBuf,

        /// Include byte spans
        #[arg(short, long, action = ArgAction::SetTrue)]
        locations: bool,
    },

    /// Every value of one attribute, without building a tree
    Values {
        project: PathBuf,

        #[arg(short, long, default_value = "CH")]
        attribute: String,
    },

    /// Dump two projects and report the first line where they differ
    Compare { left: PathBuf, right: PathBuf },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<LayoutConfig> {
    let mut config = match &cli.config {
        Some(path) => LayoutConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => LayoutConfig::default(),
    };
    if cli.lenient {
        config.lexer.strict = false;
    }
    Ok(config)
}

fn open(path: &Path, config: &LayoutConfig) -> Result<ScribusProject> {
    let mut next = 0.0;
    let progress = Box::new(move |ratio: f64| {
        if ratio >= next {
            log::trace!("lexed {:.0}%", ratio * 100.0);
            next = ratio + 0.1;
        }
    });
    ScribusProject::open_with_progress(path, config.clone(), progress)
        .with_context(|| format!("Failed to load {}", path.display()))
}

/// Sorted dump of one project into memory
fn dump_to_string(path: &Path, config: &LayoutConfig) -> Result<String> {
    let mut project = ScribusProject::open_with(path, config.clone())
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let mut out = Vec::new();
    project
        .dump_text(&mut out)
        .with_context(|| format!("Failed to dump {}", path.display()))?;
    String::from_utf8(out).context("Dump is not UTF-8")
}

fn compare(left: &Path, right: &Path, config: &LayoutConfig) -> Result<bool> {
    let (a, b) = rayon::join(|| dump_to_string(left, config), || dump_to_string(right, config));
    let (a, b) = (a?, b?);

    let mut a_lines = a.lines();
    let mut b_lines = b.lines();
    let mut number = 1;
    loop {
        match (a_lines.next(), b_lines.next()) {
            (None, None) => {
                println!("{} and {} have the same text", left.display(), right.display());
                return Ok(true);
            }
            (x, y) if x == y => number += 1,
            (x, y) => {
                println!("Line {} differs:", number);
                println!("< {}", x.unwrap_or_default());
                println!("> {}", y.unwrap_or_default());
                return Ok(false);
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Dump { project, output } => {
            let mut project = open(project, &config)?;
            match output {
                Some(output) => {
                    let count = project
                        .dump_to_file(output)
                        .with_context(|| format!("Failed to write {}", output.display()))?;
                    log::info!("{} pages", count);
                }
                None => {
                    let stdout = io::stdout();
                    let mut out = BufWriter::new(stdout.lock());
                    project.dump_text(&mut out)?;
                    out.flush()?;
                }
            }
        }
        Command::Unsorted { project } => {
            let project = open(project, &config)?;
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            project.dump_text_unsorted(&mut out)?;
            out.flush()?;
        }
        Command::Tree { project, locations } => {
            let project = open(project, &config)?;
            let json = project.document().to_json_pretty(*locations)?;
            println!("{}", json);
        }
        Command::Values { project, attribute } => {
            let bytes = std::fs::read(project)
                .with_context(|| format!("Failed to read {}", project.display()))?;
            let text = decode_source(&bytes)?;
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            let count = dump_attribute_values(&text, attribute, &mut out)?;
            out.flush()?;
            log::info!("{} values of {}", count, attribute);
        }
        Command::Compare { left, right } => {
            if !compare(left, right, &config)? {
                bail!("{} and {} differ", left.display(), right.display());
            }
        }
    }
    Ok(())
}
