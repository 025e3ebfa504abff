//! SLA Merge CLI tool
//!
//! Pairs resolution PDFs with their stipulations and merges them, or
//! merges two PDFs by hand.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sla_merge::orchestrate::{auto_merge, default_output_dir, manual_merge, MergeStatus};
use sla_merge::pairing::{scan_folder, Convention, DocumentRef, GroupState, MatchGroup};
use sla_merge::pdf::inspect;

/// SLA Merge - Pair resolutions with stipulations and merge them
#[derive(Parser)]
#[command(name = "sla-merge")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Merge every resolution with its stipulation, outputs go to ./components/merged
    sla-merge auto ./components

    # Preview the pairs without writing anything
    sla-merge scan ./components --verify

    # Use a custom naming convention
    sla-merge auto ./components -o ./out --convention convention.toml

    # Merge two files in order
    sla-merge manual reso.pdf stip.pdf -o combined.pdf")]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every resolution/stipulation pair found in a folder
    Auto {
        /// Folder containing resolution and stipulation PDFs
        folder: PathBuf,

        /// Output folder (default: <folder>/merged)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML file with the file naming convention
        #[arg(long)]
        convention: Option<PathBuf>,

        /// Open the output folder afterwards
        #[arg(long)]
        open: bool,
    },

    /// Merge two PDF files, first then second
    Manual {
        /// PDF whose pages come first
        first: PathBuf,

        /// PDF whose pages come second
        second: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Show how the PDFs in a folder pair up, without merging
    Scan {
        /// Folder containing resolution and stipulation PDFs
        folder: PathBuf,

        /// TOML file with the file naming convention
        #[arg(long)]
        convention: Option<PathBuf>,

        /// Also open every PDF and report its page count
        #[arg(long)]
        verify: bool,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Auto { folder, output, convention, open } => {
            cmd_auto(folder, output, convention, open)
        }
        Commands::Manual { first, second, output, open } => {
            cmd_manual(first, second, output, open)
        }
        Commands::Scan { folder, convention, verify } => {
            cmd_scan(folder, convention, verify)
        }
        Commands::Info { input } => {
            cmd_info(input)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays a clean report
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "sla_merge=warn",
        1 => "sla_merge=info",
        2 => "sla_merge=debug",
        _ => "sla_merge=trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_convention(path: Option<PathBuf>) -> Result<Convention> {
    match path {
        Some(path) => Ok(Convention::load(&path)?),
        None => Ok(Convention::default()),
    }
}

/// Open a file or folder with the system default application
fn open_path(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        process::Command::new("open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        process::Command::new("xdg-open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Merge every complete pair in a folder
fn cmd_auto(
    folder: PathBuf,
    output: Option<PathBuf>,
    convention: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    let convention = load_convention(convention)?;
    let output_dir = output.unwrap_or_else(|| default_output_dir(&folder));

    let report = auto_merge(&folder, &output_dir, &convention)
        .with_context(|| format!("auto merge of {} failed", folder.display()))?;

    for result in &report.results {
        match &result.status {
            MergeStatus::Merged { pages } => println!(
                "Merged {} -> {} ({} pages)",
                result.identifier,
                result.output_path.display(),
                pages
            ),
            MergeStatus::Failed(e) => println!("FAILED {}: {}", result.identifier, e),
        }
    }
    for issue in &report.issues {
        println!("Skipped: {}", issue);
    }

    let failed = report.failures().count();
    println!(
        "\n{} merged, {} failed, {} skipped",
        report.merged_count(),
        failed,
        report.issues.len()
    );

    if open && report.merged_count() > 0 {
        open_path(&output_dir)?;
    }

    if failed > 0 {
        bail!("{} group(s) failed to merge", failed);
    }

    Ok(())
}

/// Merge two PDFs in the given order
fn cmd_manual(first: PathBuf, second: PathBuf, output: PathBuf, open: bool) -> Result<()> {
    let pages = manual_merge(&first, &second, &output)?;

    println!("Merged to: {} ({} pages)", output.display(), pages);

    if open {
        open_path(&output)?;
    }

    Ok(())
}

/// Print the pairing of a folder
fn cmd_scan(folder: PathBuf, convention: Option<PathBuf>, verify: bool) -> Result<()> {
    let convention = load_convention(convention)?;
    let pairing = scan_folder(&folder, &convention)?;

    for group in &pairing.groups {
        println!("{}", describe_group(group));
        if verify {
            for doc in group_documents(group) {
                println!("    {}", verify_document(&doc.path));
            }
        }
    }

    let issues = pairing.issues();
    if !issues.is_empty() {
        println!();
        for issue in &issues {
            println!("Issue: {}", issue);
        }
    }

    println!(
        "\n{} complete, {} issues",
        pairing.complete_groups().count(),
        issues.len()
    );

    Ok(())
}

fn describe_group(group: &MatchGroup) -> String {
    match &group.state {
        GroupState::Complete { resolution, stipulation } => format!(
            "{:<8} complete    {} + {}",
            group.identifier,
            resolution.file_name(),
            stipulation.file_name()
        ),
        GroupState::Incomplete { present, missing } => format!(
            "{:<8} incomplete  {} (missing {})",
            group.identifier,
            present.file_name(),
            missing
        ),
        GroupState::Conflict { resolutions, stipulations } => format!(
            "{:<8} conflict    [{}] + [{}]",
            group.identifier,
            names(resolutions),
            names(stipulations)
        ),
    }
}

fn group_documents(group: &MatchGroup) -> Vec<&DocumentRef> {
    match &group.state {
        GroupState::Complete { resolution, stipulation } => vec![resolution, stipulation],
        GroupState::Incomplete { present, .. } => vec![present],
        GroupState::Conflict { resolutions, stipulations } => {
            resolutions.iter().chain(stipulations).collect()
        }
    }
}

fn names(docs: &[DocumentRef]) -> String {
    docs.iter().map(|d| d.file_name()).collect::<Vec<_>>().join(", ")
}

fn verify_document(path: &Path) -> String {
    match inspect(path) {
        Ok(summary) => format!("ok  {} pages  {}", summary.page_count, path.display()),
        Err(e) => format!("BAD {}", e),
    }
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> Result<()> {
    let summary = inspect(&input)?;

    println!("File: {}", summary.path.display());
    println!("Pages: {}", summary.page_count);

    if let Some(title) = summary.title {
        println!("Title: {}", title);
    }
    if let Some(author) = summary.author {
        println!("Author: {}", author);
    }

    Ok(())
}
