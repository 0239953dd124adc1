// src/summarize.rs

use anyhow::Result;
use tracing::{error, info};

use crate::search::MatchSet;
use crate::unified_table::Row;

pub const FALLBACK_ANSWER: &str = "Sorry, I couldn't get an answer from Gemini at this moment.";

pub const DEFAULT_MAX_PROMPT_ROWS: usize = 10;

/// Turns a query and its matched rows into prose.
pub trait Summarizer {
    /// At most `limit` rows of `matches` may be forwarded to the backend.
    fn summarize(&self, query: &str, matches: &MatchSet<'_>, limit: usize) -> Result<String>;
}

/// Calls the summarizer and swaps any failure for [`FALLBACK_ANSWER`].
pub fn answer(
    summarizer: &dyn Summarizer,
    query: &str,
    matches: &MatchSet<'_>,
    limit: usize,
) -> String {
    match summarizer.summarize(query, matches, limit) {
        Ok(text) => {
            info!(chars = text.len(), "summary received");
            text
        }
        Err(e) => {
            error!("Error communicating with Gemini API: {:#}", e);
            FALLBACK_ANSWER.to_string()
        }
    }
}

/// The first `limit` rows and how many were left out.
pub fn prompt_rows<'a>(matches: &MatchSet<'a>, limit: usize) -> (Vec<&'a Row>, usize) {
    let shown: Vec<&'a Row> = matches.rows().take(limit).collect();
    let omitted = matches.len() - shown.len();
    (shown, omitted)
}

/// Renders rows as a Markdown pipe table.
pub fn render_markdown<'a>(headers: &[String], rows: impl IntoIterator<Item = &'a Row>) -> String {
    let mut out = String::new();

    out.push('|');
    for header in headers {
        out.push(' ');
        out.push_str(&escape_cell(header));
        out.push_str(" |");
    }
    out.push('\n');

    out.push('|');
    for _ in headers {
        out.push_str("---|");
    }

    for row in rows {
        out.push('\n');
        out.push('|');
        for cell in row.cells() {
            out.push(' ');
            out.push_str(&escape_cell(cell));
            out.push_str(" |");
        }
    }

    out
}

fn escape_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

/// The text sent to the model for one query.
pub fn build_prompt(query: &str, matches: &MatchSet<'_>, limit: usize) -> String {
    if matches.is_empty() {
        return format!(
            "The user searched for '{}' but no relevant data was found in the pricebook. \
             Please provide a helpful response indicating that no matching items were found.",
            query
        );
    }

    let (shown, omitted) = prompt_rows(matches, limit);
    let mut results = render_markdown(matches.headers(), shown);
    if omitted > 0 {
        results.push_str(&format!(
            "\n... (and {} more results not shown due to length)",
            omitted
        ));
    }

    format!(
        "The user searched for '{}' in a pricebook spreadsheet. \
         Here are the relevant search results:\n\n{}\n\n\
         Based on these results, please provide a concise and helpful answer to the user's query. \
         If the results contain pricing information, mention it clearly. \
         If the results are unclear or incomplete for the query, state that you are providing \
         information based on the available data. \
         Focus on extracting key information like product names, descriptions, and prices if available.",
        query, results
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data_loader::TableData;
    use crate::search::search;
    use crate::unified_table::UnifiedTable;
    use std::cell::RefCell;

    /// Records what it was asked and replies with a canned result.
    pub(crate) struct StubSummarizer {
        pub reply: Option<String>,
        pub calls: RefCell<Vec<(String, usize, usize)>>,
    }

    impl StubSummarizer {
        pub fn replying(text: &str) -> Self {
            StubSummarizer {
                reply: Some(text.to_string()),
                calls: RefCell::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            StubSummarizer {
                reply: None,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Summarizer for StubSummarizer {
        fn summarize(&self, query: &str, matches: &MatchSet<'_>, limit: usize) -> Result<String> {
            self.calls
                .borrow_mut()
                .push((query.to_string(), matches.len(), limit));
            self.reply
                .clone()
                .ok_or_else(|| anyhow::anyhow!("connection reset"))
        }
    }

    fn products(count: usize) -> UnifiedTable {
        UnifiedTable::concat(vec![TableData::new(
            vec!["name".to_string(), "price".to_string()],
            (0..count)
                .map(|i| vec![format!("Security Module {}", i), format!("{}", 100 + i)])
                .collect(),
        )])
    }

    #[test]
    fn fifteen_matches_forward_ten_and_note_five() {
        let table = products(15);
        let matches = search(&table, "security");
        assert_eq!(matches.len(), 15);

        let (shown, omitted) = prompt_rows(&matches, 10);
        assert_eq!(shown.len(), 10);
        assert_eq!(omitted, 5);

        let prompt = build_prompt("security", &matches, 10);
        assert!(prompt.contains("Security Module 9 "));
        assert!(!prompt.contains("Security Module 10 "));
        assert!(prompt.contains("... (and 5 more results not shown due to length)"));
    }

    #[test]
    fn small_match_sets_are_sent_whole() {
        let table = products(3);
        let matches = search(&table, "module");
        let prompt = build_prompt("module", &matches, 10);

        assert!(prompt.starts_with("The user searched for 'module' in a pricebook spreadsheet."));
        assert!(prompt.contains("| Security Module 2 | 102 |"));
        assert!(!prompt.contains("more results not shown"));
    }

    #[test]
    fn empty_match_set_asks_for_a_not_found_reply() {
        let table = products(3);
        let prompt = build_prompt("zzz", &search(&table, "zzz"), 10);
        assert!(prompt.contains("no relevant data was found"));
    }

    #[test]
    fn markdown_escapes_pipes_and_newlines() {
        let table = UnifiedTable::concat(vec![TableData::new(
            vec!["a|b".to_string()],
            vec![vec!["line one\nline two".to_string()]],
        )]);
        let md = render_markdown(table.headers(), table.rows());
        assert_eq!(md, "| a\\|b |\n|---|\n| line one line two |");
    }

    #[test]
    fn failures_fall_back_to_apology() {
        let table = products(2);
        let matches = search(&table, "security");

        let failing = StubSummarizer::failing();
        assert_eq!(answer(&failing, "security", &matches, 10), FALLBACK_ANSWER);

        let ok = StubSummarizer::replying("Two modules found.");
        assert_eq!(answer(&ok, "security", &matches, 10), "Two modules found.");
        assert_eq!(
            ok.calls.borrow().as_slice(),
            &[("security".to_string(), 2, 10)]
        );
    }
}
