use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub toc: Option<TocConfig>,
    pub parsing: Option<ParsingSection>,
    pub offset: Option<OffsetSection>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TocConfig {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingSection {
    pub split_depth: Option<usize>,
    pub min_title_chars: Option<usize>,
    pub min_printed_page: Option<u32>,
    pub drop_out_of_order: Option<bool>,
    pub chapter_pattern: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OffsetSection {
    /// `"near_max"` or `"baseline_ratio"`.
    pub heuristic: Option<String>,
    pub epsilon: Option<f32>,
    pub ratio: Option<f32>,
    pub scan_window: Option<usize>,
    pub fuzzy_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub chapters_dir: Option<String>,
    pub artifact_dir: Option<String>,
    pub strict: Option<bool>,
}

/// Platform config directory path: `<config_dir>/tocsplit/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tocsplit").join("config.toml"))
}

/// Load config by cascading CWD `.tocsplit.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".tocsplit.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        toc: Some(TocConfig {
            start: overlay
                .toc
                .as_ref()
                .and_then(|t| t.start)
                .or_else(|| base.toc.as_ref().and_then(|t| t.start)),
            end: overlay
                .toc
                .as_ref()
                .and_then(|t| t.end)
                .or_else(|| base.toc.as_ref().and_then(|t| t.end)),
        }),
        parsing: Some(ParsingSection {
            split_depth: overlay
                .parsing
                .as_ref()
                .and_then(|p| p.split_depth)
                .or_else(|| base.parsing.as_ref().and_then(|p| p.split_depth)),
            min_title_chars: overlay
                .parsing
                .as_ref()
                .and_then(|p| p.min_title_chars)
                .or_else(|| base.parsing.as_ref().and_then(|p| p.min_title_chars)),
            min_printed_page: overlay
                .parsing
                .as_ref()
                .and_then(|p| p.min_printed_page)
                .or_else(|| base.parsing.as_ref().and_then(|p| p.min_printed_page)),
            drop_out_of_order: overlay
                .parsing
                .as_ref()
                .and_then(|p| p.drop_out_of_order)
                .or_else(|| base.parsing.as_ref().and_then(|p| p.drop_out_of_order)),
            chapter_pattern: overlay
                .parsing
                .as_ref()
                .and_then(|p| p.chapter_pattern.clone())
                .or_else(|| {
                    base.parsing
                        .as_ref()
                        .and_then(|p| p.chapter_pattern.clone())
                }),
        }),
        offset: Some(OffsetSection {
            heuristic: overlay
                .offset
                .as_ref()
                .and_then(|o| o.heuristic.clone())
                .or_else(|| base.offset.as_ref().and_then(|o| o.heuristic.clone())),
            epsilon: overlay
                .offset
                .as_ref()
                .and_then(|o| o.epsilon)
                .or_else(|| base.offset.as_ref().and_then(|o| o.epsilon)),
            ratio: overlay
                .offset
                .as_ref()
                .and_then(|o| o.ratio)
                .or_else(|| base.offset.as_ref().and_then(|o| o.ratio)),
            scan_window: overlay
                .offset
                .as_ref()
                .and_then(|o| o.scan_window)
                .or_else(|| base.offset.as_ref().and_then(|o| o.scan_window)),
            fuzzy_threshold: overlay
                .offset
                .as_ref()
                .and_then(|o| o.fuzzy_threshold)
                .or_else(|| base.offset.as_ref().and_then(|o| o.fuzzy_threshold)),
        }),
        output: Some(OutputConfig {
            chapters_dir: overlay
                .output
                .as_ref()
                .and_then(|o| o.chapters_dir.clone())
                .or_else(|| base.output.as_ref().and_then(|o| o.chapters_dir.clone())),
            artifact_dir: overlay
                .output
                .as_ref()
                .and_then(|o| o.artifact_dir.clone())
                .or_else(|| base.output.as_ref().and_then(|o| o.artifact_dir.clone())),
            strict: overlay
                .output
                .as_ref()
                .and_then(|o| o.strict)
                .or_else(|| base.output.as_ref().and_then(|o| o.strict)),
        }),
    }
}
