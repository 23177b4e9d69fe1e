//! untrack CLI - tracked-change tooling for Word documents
//!
//! A command-line tool for listing tracked changes and comments in a .docx
//! file and for producing clean copies with every change accepted or
//! rejected.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use untrack::{DocumentChanges, DocxPackage, Resolution, COMMENTS_PART, DOCUMENT_PART};

/// Tracked-change inspection and resolution for Word documents
#[derive(Parser)]
#[command(
    name = "untrack",
    author = "iyulab",
    version,
    about = "Inspect and resolve tracked changes in Word documents",
    long_about = "untrack - tracked-change tooling for Word documents.\n\n\
                  Lists insertions, deletions, and comments from a .docx file, and\n\
                  produces clean copies with all changes accepted or rejected."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tracked changes and comments
    #[command(visible_alias = "ls")]
    Changes {
        /// Input file path
        input: PathBuf,

        /// Output as JSON instead of a colored listing
        #[arg(long)]
        json: bool,

        /// Output compact JSON (no indentation)
        #[arg(long, requires = "json")]
        compact: bool,

        /// Output file path for JSON (default: stdout)
        #[arg(short, long, requires = "json")]
        output: Option<PathBuf>,
    },

    /// Write a copy with every change accepted (insertions kept, deletions removed)
    Accept {
        /// Input file path
        input: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "accepted_changes.docx")]
        output: PathBuf,
    },

    /// Write a copy with every change rejected (insertions removed, deletions restored)
    Reject {
        /// Input file path
        input: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "rejected_changes.docx")]
        output: PathBuf,
    },

    /// Show package information and change counts
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Changes {
            input,
            json,
            compact,
            output,
        } => {
            let pb = create_spinner("Scanning document...");
            let report = untrack::scan_file(&input)?;
            pb.finish_and_clear();

            if json {
                let rendered = report.to_json(!compact)?;
                write_output(output.as_ref(), &rendered)?;
            } else {
                print_report(&report);
            }
        }

        Commands::Accept { input, output } => {
            resolve_to_file(&input, &output, Resolution::Accept)?;
        }

        Commands::Reject { input, output } => {
            resolve_to_file(&input, &output, Resolution::Reject)?;
        }

        Commands::Info { input } => {
            let pb = create_spinner("Analyzing package...");
            let package = DocxPackage::open(&input)?;
            let report = untrack::scan_package(&package)?;
            pb.finish_and_clear();

            println!("{}", "Package Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Parts".bold(), package.part_names().len());
            println!(
                "{}: {}",
                "Document part".bold(),
                if package.has_part(DOCUMENT_PART) {
                    "present"
                } else {
                    "missing"
                }
            );
            println!(
                "{}: {}",
                "Comments part".bold(),
                if package.has_part(COMMENTS_PART) {
                    "present"
                } else {
                    "absent"
                }
            );

            println!("\n{}", "Tracked Changes".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Insertions".bold(), report.changes.insertions.len());
            println!("{}: {}", "Deletions".bold(), report.changes.deletions.len());
            println!("{}: {}", "Comments".bold(), report.comments.len());
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn resolve_to_file(
    input: &PathBuf,
    output: &PathBuf,
    resolution: Resolution,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_spinner("Resolving tracked changes...");
    let report = untrack::scan_file(input)?;
    let resolved = untrack::resolve_file(input, resolution)?;
    fs::write(output, resolved)?;
    pb.finish_and_clear();

    let (verb, kept, dropped) = match resolution {
        Resolution::Accept => (
            "Accepted",
            report.changes.insertions.len(),
            report.changes.deletions.len(),
        ),
        Resolution::Reject => (
            "Rejected",
            report.changes.deletions.len(),
            report.changes.insertions.len(),
        ),
    };
    println!(
        "{} {} all changes ({} kept, {} removed): {}",
        "✓".green().bold(),
        verb,
        kept,
        dropped,
        output.display()
    );
    Ok(())
}

fn print_report(report: &DocumentChanges) {
    println!(
        "{} ({})",
        "Insertions".cyan().bold(),
        report.changes.insertions.len()
    );
    if report.changes.insertions.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for ins in &report.changes.insertions {
        println!("  {} {}{}", "+".green().bold(), ins.text, annotate(&ins.author, &ins.date));
    }

    println!(
        "\n{} ({})",
        "Deletions".cyan().bold(),
        report.changes.deletions.len()
    );
    if report.changes.deletions.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for del in &report.changes.deletions {
        println!("  {} {}{}", "-".red().bold(), del.text, annotate(&del.author, &del.date));
    }

    println!("\n{} ({})", "Comments".cyan().bold(), report.comments.len());
    if report.comments.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for comment in &report.comments {
        println!(
            "  {} {}{}",
            "•".yellow().bold(),
            comment.text,
            annotate(&comment.author, &comment.date)
        );
    }
}

fn annotate(author: &Option<String>, date: &Option<String>) -> String {
    match (author, date) {
        (Some(author), Some(date)) => format!(" ({author}, {date})").dimmed().to_string(),
        (Some(author), None) => format!(" ({author})").dimmed().to_string(),
        (None, Some(date)) => format!(" ({date})").dimmed().to_string(),
        (None, None) => String::new(),
    }
}

fn print_version() {
    println!("{} {}", "untrack".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Tracked-change inspection and resolution for Word documents");
    println!();
    println!("Supported format: DOCX");
    println!("Repository: https://github.com/iyulab/untrack");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
