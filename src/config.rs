// src/config.rs

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

use crate::catalog::SourceDescriptor;
use crate::gemini::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::summarize::DEFAULT_MAX_PROMPT_ROWS;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
pub const DATA_DIR_VAR: &str = "PRICEBOOK_DATA_DIR";

pub const DEFAULT_LOG_FILE: &str = "pricebook.log";

/// The pricebook sheets searched when no sources are given.
pub const DEFAULT_SOURCES: &[&str] = &[
    "Trellix Helix.csv",
    "Trellix Email Security.csv",
    "Trellix Endpoint Security.csv",
    "Trellix Server Security.csv",
    "Trellix Data Security.csv",
    "Trellix EU_DE Data Center.csv",
    "Trellix JP_ AU Data Centers.csv",
    "Trellix SG Data Center.csv",
    "Trellix Network Security.csv",
    "Trellix IVX.csv",
    "Trellix SIEM.csv",
    "Trellix HW Accessories.csv",
    "Trellix Success Services.csv",
    "Trellix Legacy.csv",
    "Trellix Legacy (former FireEye.csv",
    "Skyhigh.csv",
    "Skyhigh Legacy.csv",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Gemini API key not found. Please set the {} environment variable.", API_KEY_VAR)]
    MissingApiKey,

    #[error("no pricebook sources configured")]
    NoSources,

    #[error("could not read source list {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What the command line asked for, before the environment is consulted.
#[derive(Debug, Default, PartialEq, Eq, Parser)]
#[command(name = "pricebook")]
#[command(about = "Search pricebook CSV sheets and ask Gemini about the matches")]
#[command(after_help = "Environment: GEMINI_API_KEY (required), GEMINI_MODEL, GEMINI_BASE_URL, PRICEBOOK_DATA_DIR")]
pub struct CliArgs {
    /// Directory that relative source paths are resolved against
    #[arg(short = 'd', long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Source list, one path per line ('#' starts a comment)
    #[arg(short = 's', long = "sources", value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Search once, print the results and answer, then exit
    #[arg(short, long)]
    pub query: Option<String>,

    /// Matched rows sent to Gemini per query [default: 10]
    #[arg(short = 'm', long = "max-rows", value_name = "ROWS", value_parser = positive_count)]
    pub max_prompt_rows: Option<usize>,

    /// Log file for the interactive view [default: pricebook.log]
    #[arg(short, long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Pricebook CSV files; replaces the built-in list
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

fn positive_count(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a positive number, got '{}'", value)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Interactive { log_file: PathBuf },
    OneShot { query: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub sources: Vec<SourceDescriptor>,
    pub gemini: GeminiConfig,
    pub max_prompt_rows: usize,
    pub mode: Mode,
}

impl Config {
    /// Combines the command line with environment lookups.
    pub fn resolve(
        cli: CliArgs,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = env(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let data_dir = cli
            .data_dir
            .or_else(|| env(DATA_DIR_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let names: Vec<PathBuf> = if !cli.files.is_empty() {
            cli.files
        } else if let Some(manifest) = &cli.manifest {
            read_manifest(manifest)?
        } else {
            DEFAULT_SOURCES.iter().map(|name| PathBuf::from(*name)).collect()
        };

        if names.is_empty() {
            return Err(ConfigError::NoSources);
        }

        let sources = names
            .into_iter()
            .map(|name| SourceDescriptor::new(resolve_path(&data_dir, name)))
            .collect();

        let mode = match cli.query {
            Some(query) => Mode::OneShot { query },
            None => Mode::Interactive {
                log_file: cli
                    .log_file
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            },
        };

        Ok(Config {
            sources,
            gemini: GeminiConfig {
                api_key,
                model: env(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: env(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            },
            max_prompt_rows: cli.max_prompt_rows.unwrap_or(DEFAULT_MAX_PROMPT_ROWS),
            mode,
        })
    }
}

fn resolve_path(data_dir: &Path, name: PathBuf) -> PathBuf {
    if name.is_absolute() {
        name
    } else {
        data_dir.join(name)
    }
}

fn read_manifest(path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Manifest {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(PathBuf::from)
        .collect())
}
