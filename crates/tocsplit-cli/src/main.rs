use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tocsplit_core::{FixedPage, OperatorInput};
use tocsplit_parsing::TocRange;
use tocsplit_pipeline::{PipelineEvent, RunConfig, run_pipeline};

mod output;
mod prompt;
mod settings;

use output::ColorMode;
use settings::{CliOverrides, HeuristicChoice};

/// Split a PDF into one file per chapter using its table of contents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the PDF to split (asked for when omitted)
    input: Option<PathBuf>,

    /// File page where the table of contents starts (1-indexed)
    #[arg(long)]
    toc_start: Option<usize>,

    /// File page where the table of contents ends (1-indexed, inclusive)
    #[arg(long)]
    toc_end: Option<usize>,

    /// Directory for the chapter PDFs (relative to the artifact directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Directory for TOC_contents.txt, PDF_metadata.txt and the results file
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Deepest numbering level that starts a new file (1 = top-level chapters)
    #[arg(long)]
    split_depth: Option<usize>,

    /// Number of pages after the TOC searched for the first chapter heading
    #[arg(long)]
    scan_window: Option<usize>,

    /// How large-font heading text is recognized
    #[arg(long, value_enum)]
    heuristic: Option<HeuristicChoice>,

    /// Custom chapter line regex with `number`, `title` and `page` groups
    #[arg(long)]
    chapter_pattern: Option<String>,

    /// Drop entries whose page number goes backwards
    #[arg(long)]
    drop_out_of_order: bool,

    /// File page of the first chapter, used instead of prompting when the scan fails
    #[arg(long)]
    first_chapter_page: Option<usize>,

    /// Also write the run report as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Exit with an error if any chapter could not be written
    #[arg(long)]
    strict: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = if verbose > 0 {
        tracing_subscriber::EnvFilter::new(default)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Resolve configuration: CLI flags > env vars > config file > defaults
    let file_config = tocsplit_core::config_file::load_config();
    let overrides = CliOverrides {
        toc_start: cli.toc_start,
        toc_end: cli.toc_end,
        output_dir: cli.output_dir.clone(),
        artifact_dir: cli.artifact_dir.clone(),
        split_depth: cli.split_depth,
        scan_window: cli.scan_window,
        heuristic: cli.heuristic,
        chapter_pattern: cli.chapter_pattern.clone(),
        drop_out_of_order: cli.drop_out_of_order,
        strict: cli.strict,
    };
    let settings = settings::resolve(&overrides, |name| std::env::var(name).ok(), &file_config)?;

    let color = ColorMode(!cli.no_color);
    let mut stdout = std::io::stdout();

    let input = match cli.input {
        Some(path) => path,
        None => prompt::ask_input_path(&mut std::io::stdin().lock(), &mut stdout)?,
    };
    if !input.exists() {
        anyhow::bail!("File not found: {}", input.display());
    }

    let config = RunConfig {
        input: input.clone(),
        toc_range: TocRange::new(settings.toc_start, settings.toc_end),
        parsing: settings.parsing,
        resolver: settings.resolver,
        artifact_dir: settings.artifact_dir,
        chapters_dir: settings.chapters_dir,
        json_path: cli.json,
    };

    writeln!(stdout, "Starting to process PDF: {}", input.display())?;

    let mut operator: Box<dyn OperatorInput> = match cli.first_chapter_page {
        Some(page) => Box::new(FixedPage(page)),
        None => Box::new(prompt::TerminalOperator::stdin()),
    };

    let bar_style = ProgressStyle::with_template("{msg} [{bar:40.cyan/dim}] {pos}/{len}")
        .context("invalid progress bar template")?
        .progress_chars("=> ");
    let mut bar: Option<ProgressBar> = None;

    let outcome = run_pipeline(&config, operator.as_mut(), |event| {
        match &event {
            PipelineEvent::ChapterWriting {
                index,
                total,
                file_name,
            } => {
                let pb = bar.get_or_insert_with(|| {
                    let pb = ProgressBar::new(*total as u64);
                    pb.set_style(bar_style.clone());
                    pb
                });
                pb.set_position(*index as u64);
                pb.set_message(file_name.to_string());
            }
            PipelineEvent::ChapterWritten(_) | PipelineEvent::ChapterFailed(_) => {
                if let Some(pb) = &bar {
                    pb.inc(1);
                    if pb.position() >= pb.length().unwrap_or(0) {
                        pb.finish_and_clear();
                    }
                }
            }
            _ => {}
        }

        let mut out = std::io::stdout();
        let printed = match &bar {
            Some(pb) if !pb.is_finished() => {
                let mut buf: Vec<u8> = Vec::new();
                let result = output::print_event(&mut buf, &event, color);
                let text = String::from_utf8_lossy(&buf);
                if !text.trim().is_empty() {
                    pb.println(text.trim_end());
                }
                result
            }
            _ => output::print_event(&mut out, &event, color),
        };
        if let Err(e) = printed {
            tracing::debug!(error = %e, "failed to print progress");
        }
    });
    if let Some(pb) = &bar {
        pb.finish_and_clear();
    }
    let outcome = outcome.with_context(|| format!("failed to split {}", input.display()))?;

    output::print_summary(&mut stdout, &outcome, color)?;

    if settings.strict && !outcome.is_complete() {
        anyhow::bail!(
            "{} chapter(s) were not written",
            outcome.report.problem_count()
        );
    }
    Ok(())
}
