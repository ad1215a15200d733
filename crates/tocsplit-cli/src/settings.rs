use std::path::PathBuf;

use anyhow::{Context, bail};
use tocsplit_core::config_file::ConfigFile;
use tocsplit_core::{HeadingHeuristic, ResolverConfig};
use tocsplit_parsing::{ParsingConfig, ParsingConfigBuilder};
use tocsplit_pipeline::DEFAULT_CHAPTERS_DIR;

pub const DEFAULT_TOC_START: usize = 5;
pub const DEFAULT_TOC_END: usize = 8;

/// Heading selection heuristic as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum HeuristicChoice {
    /// Spans within a small margin of the page's largest font
    NearMax,
    /// Spans well above the page's most common font size
    BaselineRatio,
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub toc_start: Option<usize>,
    pub toc_end: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub artifact_dir: Option<PathBuf>,
    pub split_depth: Option<usize>,
    pub scan_window: Option<usize>,
    pub heuristic: Option<HeuristicChoice>,
    pub chapter_pattern: Option<String>,
    pub drop_out_of_order: bool,
    pub strict: bool,
}

/// Fully resolved run settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub toc_start: usize,
    pub toc_end: usize,
    pub chapters_dir: PathBuf,
    pub artifact_dir: PathBuf,
    pub parsing: ParsingConfig,
    pub resolver: ResolverConfig,
    pub strict: bool,
}

fn env_usize(env: &impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Option<usize>> {
    match env(name) {
        Some(value) => {
            let parsed = value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("{name} must be a page number, got '{value}'"))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Resolve configuration: CLI flags > env vars > config file > defaults.
pub fn resolve(
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
    file: &ConfigFile,
) -> anyhow::Result<Settings> {
    let toc = file.toc.clone().unwrap_or_default();
    let parsing = file.parsing.clone().unwrap_or_default();
    let offset = file.offset.clone().unwrap_or_default();
    let output = file.output.clone().unwrap_or_default();

    let toc_start = match cli.toc_start {
        Some(v) => v,
        None => env_usize(&env, "TOCSPLIT_TOC_START")?
            .or(toc.start)
            .unwrap_or(DEFAULT_TOC_START),
    };
    let toc_end = match cli.toc_end {
        Some(v) => v,
        None => env_usize(&env, "TOCSPLIT_TOC_END")?
            .or(toc.end)
            .unwrap_or(DEFAULT_TOC_END),
    };

    let chapters_dir = cli
        .output_dir
        .clone()
        .or_else(|| env("TOCSPLIT_OUTPUT_DIR").map(PathBuf::from))
        .or_else(|| output.chapters_dir.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CHAPTERS_DIR));
    let artifact_dir = cli
        .artifact_dir
        .clone()
        .or_else(|| output.artifact_dir.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let mut builder = ParsingConfigBuilder::new();
    if let Some(depth) = cli.split_depth.or(parsing.split_depth) {
        builder = builder.split_depth(depth);
    }
    if let Some(n) = parsing.min_title_chars {
        builder = builder.min_title_chars(n);
    }
    if let Some(page) = parsing.min_printed_page {
        builder = builder.min_printed_page(page);
    }
    if cli.drop_out_of_order || parsing.drop_out_of_order.unwrap_or(false) {
        builder = builder.drop_out_of_order(true);
    }
    if let Some(pattern) = cli.chapter_pattern.as_ref().or(parsing.chapter_pattern.as_ref()) {
        builder = builder.chapter_regex(pattern);
    }
    let parsing = builder.build().context("invalid chapter pattern")?;

    let choice = match (cli.heuristic, offset.heuristic.as_deref()) {
        (Some(choice), _) => choice,
        (None, None) | (None, Some("near_max")) => HeuristicChoice::NearMax,
        (None, Some("baseline_ratio")) => HeuristicChoice::BaselineRatio,
        (None, Some(other)) => {
            bail!("unknown heuristic '{other}' in config (expected near_max or baseline_ratio)")
        }
    };
    let heuristic = match choice {
        HeuristicChoice::NearMax => HeadingHeuristic::NearMax {
            epsilon: offset.epsilon.unwrap_or(0.5),
        },
        HeuristicChoice::BaselineRatio => HeadingHeuristic::BaselineRatio {
            ratio: offset.ratio.unwrap_or(1.5),
        },
    };

    let defaults = ResolverConfig::default();
    let resolver = ResolverConfig {
        heuristic,
        scan_window: cli
            .scan_window
            .or(offset.scan_window)
            .unwrap_or(defaults.scan_window),
        fuzzy_threshold: offset.fuzzy_threshold.unwrap_or(defaults.fuzzy_threshold),
        search_words: defaults.search_words,
    };

    Ok(Settings {
        toc_start,
        toc_end,
        chapters_dir,
        artifact_dir,
        parsing,
        resolver,
        strict: cli.strict || output.strict.unwrap_or(false),
    })
}
