// src/main.rs

mod catalog;
mod config;
mod data_loader;
mod gemini;
mod logging;
mod search;
mod summarize;
mod tui_app;
mod unified_table;

use catalog::CatalogError;
use config::{CliArgs, Config, Mode};
use gemini::GeminiClient;
use search::{is_blank, search};
use summarize::{render_markdown, Summarizer};
use tui_app::{TuiApp, BLANK_QUERY_MESSAGE, NO_MATCHES_MESSAGE};
use unified_table::UnifiedTable;

use std::env;
use std::io::{self};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{error, info, warn};

fn main() -> Result<()> {
    let cli = CliArgs::parse();
    let config = Config::resolve(cli, |key| env::var(key).ok())?;

    match &config.mode {
        Mode::OneShot { .. } => logging::init_stderr(),
        Mode::Interactive { log_file } => logging::init_file(log_file)?,
    }
    info!(sources = config.sources.len(), model = %config.gemini.model, "startup");

    let report = catalog::load(&config.sources);
    let (table, warnings) = match report.into_table() {
        Ok(loaded) => loaded,
        Err(CatalogError::NothingLoaded {
            attempted,
            warnings,
        }) => {
            for warning in &warnings {
                eprintln!("{}", warning);
            }
            error!(attempted, "no pricebook data loaded");
            anyhow::bail!(
                "Could not load pricebook data: none of the {} sources could be read. \
                 Please ensure the CSV files are correctly named and present.",
                attempted
            );
        }
    };
    if table.is_empty() {
        warn!("pricebook sources loaded but hold no rows");
    }
    let warnings: Vec<String> = warnings.iter().map(ToString::to_string).collect();

    let client = GeminiClient::new(config.gemini.clone())?;

    match &config.mode {
        Mode::OneShot { query } => {
            run_once(&table, &warnings, &client, config.max_prompt_rows, query);
            Ok(())
        }
        Mode::Interactive { .. } => run_interactive(&table, warnings, &client, config.max_prompt_rows),
    }
}

fn run_once(
    table: &UnifiedTable,
    warnings: &[String],
    summarizer: &dyn Summarizer,
    max_prompt_rows: usize,
    query: &str,
) {
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
    println!("Loaded {} rows from your pricebook.\n", table.len());

    if is_blank(query) {
        println!("{}", BLANK_QUERY_MESSAGE);
        return;
    }

    let matches = search(table, query);
    info!(query, matches = matches.len(), "search");

    println!("Search Results from Pricebook\n");
    if matches.is_empty() {
        println!("{}", NO_MATCHES_MESSAGE);
    } else {
        println!("{}", render_markdown(matches.headers(), matches.rows()));
    }

    let answer = summarize::answer(summarizer, query, &matches, max_prompt_rows);
    println!("\nGemini's Answer\n\n{}", answer);
}

fn run_interactive(
    table: &UnifiedTable,
    warnings: Vec<String>,
    summarizer: &dyn Summarizer,
    max_prompt_rows: usize,
) -> Result<()> {
    let mut app = TuiApp::new(table, summarizer, max_prompt_rows, warnings);

    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.hide_cursor()?;

    let result = app.main_loop(&mut terminal);

    terminal.show_cursor()?;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}
