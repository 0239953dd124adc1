use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use tracing::info;

use crate::search::{is_blank, search, MatchSet};
use crate::summarize::{self, Summarizer};
use crate::unified_table::UnifiedTable;

const FIXED_WIDTH: u16 = 15;
const MAX_CONTENT_WIDTH: u16 = 80;
const COLUMN_SPACING: u16 = 1;
const MAX_WARNING_LINES: u16 = 4;

pub const BLANK_QUERY_MESSAGE: &str = "Please enter a query to search.";
pub const NO_MATCHES_MESSAGE: &str = "No direct matches found in the pricebook for your query.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnWidth {
    Fixed(u16),
    Content,
}

impl ColumnWidth {
    fn toggled(self) -> Self {
        match self {
            ColumnWidth::Fixed(_) => ColumnWidth::Content,
            ColumnWidth::Content => ColumnWidth::Fixed(FIXED_WIDTH),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Input,
    Results,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
}

/// Key hints shown in the footer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
enum Binding {
    Search,
    SwitchPane,
    Move,
    ColumnWidth,
    AllWidths,
    Details,
    Quit,
}

impl Binding {
    fn keys(self) -> &'static str {
        match self {
            Binding::Search => "Enter",
            Binding::SwitchPane => "Tab",
            Binding::Move => "Arrows",
            Binding::ColumnWidth => "_",
            Binding::AllWidths => "g_",
            Binding::Details => "Enter",
            Binding::Quit => "Esc/q",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Binding::Search => "search",
            Binding::SwitchPane => "switch pane",
            Binding::Move => "move",
            Binding::ColumnWidth => "fit column",
            Binding::AllWidths => "fit all",
            Binding::Details => "row details",
            Binding::Quit => "quit",
        }
    }

    fn applies_to(self, focus: Focus) -> bool {
        match self {
            Binding::Search => focus == Focus::Input,
            Binding::SwitchPane | Binding::Quit => true,
            _ => focus == Focus::Results,
        }
    }
}

pub struct TuiApp<'a> {
    pub table: &'a UnifiedTable,
    summarizer: &'a dyn Summarizer,
    max_prompt_rows: usize,
    pub warnings: Vec<String>,

    pub input: String,
    pub focus: Focus,
    pub pending: Option<String>,
    pub results: Option<MatchSet<'a>>,
    pub answer: Option<String>,
    pub notice: Notice,

    pub selected_row: usize,
    pub selected_column: usize,
    pub table_state: TableState,
    pub show_detail: bool,
    pub detail_state: TableState,

    pub awaiting_g_key: bool,
    pub column_widths: Vec<ColumnWidth>,
    pub horizontal_offset: u16,
    pub table_area_width: u16,
}

impl<'a> TuiApp<'a> {
    pub fn new(
        table: &'a UnifiedTable,
        summarizer: &'a dyn Summarizer,
        max_prompt_rows: usize,
        warnings: Vec<String>,
    ) -> Self {
        let mut table_state = TableState::default();
        table_state.select(Some(0));

        let mut detail_state = TableState::default();
        detail_state.select(Some(0));

        TuiApp {
            table,
            summarizer,
            max_prompt_rows,
            warnings,

            input: String::new(),
            focus: Focus::Input,
            pending: None,
            results: None,
            answer: None,
            notice: Notice::Info(
                "Enter your query in the text box below to search the pricebook.".to_string(),
            ),

            selected_row: 0,
            selected_column: 0,
            table_state,
            show_detail: false,
            detail_state,

            awaiting_g_key: false,
            column_widths: vec![ColumnWidth::Fixed(FIXED_WIDTH); table.headers().len()],
            horizontal_offset: 0,
            table_area_width: 0,
        }
    }

    pub fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            self.draw_ui(terminal)?;

            if let Some(query) = self.pending.take() {
                self.run_search(&query);
                continue;
            }

            if crossterm::event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        return Ok(());
                    }
                } else {
                    self.awaiting_g_key = false;
                }
            }
        }
    }

    /// Applies one key press; returns `true` when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.show_detail {
            match key.code {
                KeyCode::Up => {
                    let i = self.detail_state.selected().unwrap_or(0).saturating_sub(1);
                    self.detail_state.select(Some(i));
                }
                KeyCode::Down => {
                    let last = self.table.headers().len().saturating_sub(1);
                    let i = (self.detail_state.selected().unwrap_or(0) + 1).min(last);
                    self.detail_state.select(Some(i));
                }
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => {
                    self.show_detail = false;
                }
                _ => {}
            }
            return false;
        }

        match self.focus {
            Focus::Input => match key.code {
                KeyCode::Char(c) => self.input.push(c),
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Enter => self.submit(),
                KeyCode::Tab | KeyCode::Down => {
                    if self.match_count() > 0 {
                        self.focus = Focus::Results;
                    }
                }
                KeyCode::Esc => return true,
                _ => {}
            },
            Focus::Results => {
                if self.awaiting_g_key {
                    if key.code == KeyCode::Char('_') {
                        for width in &mut self.column_widths {
                            *width = width.toggled();
                        }
                        self.adjust_horizontal_offset();
                    }
                    self.awaiting_g_key = false;
                    return false;
                }

                match key.code {
                    KeyCode::Char('g') => {
                        self.awaiting_g_key = true;
                    }
                    KeyCode::Char('_') => {
                        if let Some(width) = self.column_widths.get_mut(self.selected_column) {
                            *width = width.toggled();
                        }
                        self.adjust_horizontal_offset();
                    }
                    KeyCode::Up => {
                        if self.selected_row > 0 {
                            self.selected_row -= 1;
                        }
                        self.table_state.select(Some(self.selected_row));
                    }
                    KeyCode::Down => {
                        if self.selected_row + 1 < self.match_count() {
                            self.selected_row += 1;
                        }
                        self.table_state.select(Some(self.selected_row));
                    }
                    KeyCode::Left => {
                        if self.selected_column > 0 {
                            self.selected_column -= 1;
                            self.adjust_horizontal_offset();
                        }
                    }
                    KeyCode::Right => {
                        if self.selected_column + 1 < self.table.headers().len() {
                            self.selected_column += 1;
                            self.adjust_horizontal_offset();
                        }
                    }
                    KeyCode::Enter => {
                        if self.selected_match().is_some() {
                            self.show_detail = true;
                            self.detail_state.select(Some(0));
                        }
                    }
                    KeyCode::Tab | KeyCode::Char('/') => {
                        self.focus = Focus::Input;
                    }
                    KeyCode::Esc | KeyCode::Char('q') => return true,
                    _ => {}
                }
            }
        }
        false
    }

    /// Queues the typed query; blank input is rejected without searching.
    fn submit(&mut self) {
        if is_blank(&self.input) {
            self.notice = Notice::Warning(BLANK_QUERY_MESSAGE.to_string());
            return;
        }
        self.pending = Some(self.input.clone());
        self.notice = Notice::Info("Searching and generating answer...".to_string());
    }

    /// Filters the catalog and asks the summarizer about the matches.
    pub fn run_search(&mut self, query: &str) {
        let matches = search(self.table, query);
        info!(query, matches = matches.len(), "search");

        let answer = summarize::answer(self.summarizer, query, &matches, self.max_prompt_rows);

        self.notice = if matches.is_empty() {
            Notice::Info(NO_MATCHES_MESSAGE.to_string())
        } else {
            Notice::Info(format!("{} matching rows for '{}'.", matches.len(), query))
        };
        self.results = Some(matches);
        self.answer = Some(answer);

        self.selected_row = 0;
        self.selected_column = 0;
        self.horizontal_offset = 0;
        self.table_state.select(Some(0));
    }

    fn match_count(&self) -> usize {
        self.results.as_ref().map_or(0, MatchSet::len)
    }

    fn selected_match(&self) -> Option<&'a crate::unified_table::Row> {
        self.results.as_ref().and_then(|m| m.get(self.selected_row))
    }

    fn adjust_horizontal_offset(&mut self) {
        let mut col_start = 0;
        for i in 0..self.selected_column {
            col_start += self.get_column_width(i) + COLUMN_SPACING;
        }

        let selected_col_width = self.get_column_width(self.selected_column);

        // Borders and the highlight symbol.
        let visible_width = self.table_area_width.saturating_sub(5);

        if col_start < self.horizontal_offset {
            self.horizontal_offset = col_start;
        } else if col_start + selected_col_width > self.horizontal_offset + visible_width {
            self.horizontal_offset = (col_start + selected_col_width).saturating_sub(visible_width);
        }
        // A column wider than the view is shown from its left edge.
        self.horizontal_offset = self.horizontal_offset.min(col_start);
    }

    fn get_column_width(&self, index: usize) -> u16 {
        match self.column_widths.get(index) {
            Some(ColumnWidth::Fixed(w)) => *w,
            Some(ColumnWidth::Content) => {
                let header = self.table.headers()[index].chars().count();
                let widest = self
                    .results
                    .iter()
                    .flat_map(|m| m.rows())
                    .map(|row| row.cells()[index].chars().count())
                    .max()
                    .unwrap_or(0);
                (header.max(widest) as u16 + 2).min(MAX_CONTENT_WIDTH)
            }
            None => FIXED_WIDTH,
        }
    }

    /// Columns whose left edge lies at or right of the scroll offset.
    fn visible_columns(&self) -> Vec<usize> {
        let mut start = 0;
        let mut visible = Vec::new();
        for i in 0..self.table.headers().len() {
            if start >= self.horizontal_offset {
                visible.push(i);
            }
            start += self.get_column_width(i) + COLUMN_SPACING;
        }
        visible
    }

    pub fn draw_ui<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        terminal.draw(|f| self.render(f))?;
        Ok(())
    }

    fn render(&mut self, f: &mut Frame) {
        let size = f.area();
        f.render_widget(Block::default(), size);

        let warning_height = if self.warnings.is_empty() {
            0
        } else {
            (self.warnings.len() as u16).min(MAX_WARNING_LINES) + 2
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(warning_height),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(8),
                Constraint::Length(1),
            ])
            .split(size);

        self.table_area_width = chunks[3].width;

        let banner = Paragraph::new(format!(
            "Loaded {} rows from your pricebook.",
            self.table.len()
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Pricebook Search Assistant"),
        );
        f.render_widget(banner, chunks[0]);

        if !self.warnings.is_empty() {
            let items: Vec<ListItem> = self
                .warnings
                .iter()
                .map(|w| ListItem::new(w.as_str()).style(Style::default().fg(Color::Yellow)))
                .collect();
            let list = List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Skipped sources ({})", self.warnings.len())),
            );
            f.render_widget(list, chunks[1]);
        }

        self.render_input(f, chunks[2]);
        self.render_results(f, chunks[3]);

        let answer = Paragraph::new(self.answer.as_deref().unwrap_or(""))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Gemini's Answer"));
        f.render_widget(answer, chunks[4]);

        self.render_footer(f, chunks[5]);

        if self.show_detail {
            self.render_detail(f, Self::centered_rect(70, 70, size));
        }
    }

    fn render_input(&self, f: &mut Frame, area: Rect) {
        let focused = self.focus == Focus::Input;
        let border_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let text = if focused {
            format!("{}█", self.input)
        } else {
            self.input.clone()
        };

        let input = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title("Search query (e.g. 'Trellix Endpoint Security price', 'Helix features')"),
        );
        f.render_widget(input, area);
    }

    fn render_results(&mut self, f: &mut Frame, area: Rect) {
        let border_style = if self.focus == Focus::Results {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        let matches = match &self.results {
            Some(matches) if !matches.is_empty() => matches,
            other => {
                let text = if other.is_some() {
                    NO_MATCHES_MESSAGE
                } else {
                    "Enter a query above and press Enter to search the pricebook."
                };
                let placeholder = Paragraph::new(text).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border_style)
                        .title("Search Results from Pricebook"),
                );
                f.render_widget(placeholder, area);
                return;
            }
        };

        let columns = self.visible_columns();
        let widths: Vec<Constraint> = columns
            .iter()
            .map(|&i| Constraint::Length(self.get_column_width(i)))
            .collect();

        let headers = self.table.headers();
        let header_cells = columns.iter().map(|&i| {
            let style = if i == self.selected_column {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                    .bg(Color::Blue)
            } else {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            };
            Cell::from(headers[i].as_str()).style(style)
        });
        let header = Row::new(header_cells).height(1).bottom_margin(0);

        let rows = matches.rows().enumerate().map(|(row_idx, row)| {
            let cells = columns.iter().map(|&col_idx| {
                let mut cell = Cell::from(row.cells()[col_idx].as_str());
                if row_idx == self.selected_row && col_idx == self.selected_column {
                    cell = cell.style(Style::default().bg(Color::LightBlue));
                }
                cell
            });
            Row::new(cells).height(1).bottom_margin(0)
        });

        let table = Table::new(rows, &widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(format!("Search Results from Pricebook ({})", matches.len())),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("-> ")
            .column_spacing(COLUMN_SPACING);

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_footer(&self, f: &mut Frame, area: Rect) {
        let (text, style) = match &self.notice {
            Notice::Info(text) => (text.as_str(), Style::default().fg(Color::Cyan)),
            Notice::Warning(text) => (text.as_str(), Style::default().fg(Color::Yellow)),
        };

        let mut spans = vec![Span::styled(text, style), Span::raw("  ")];
        for binding in Binding::iter().filter(|b| b.applies_to(self.focus)) {
            spans.push(Span::styled(
                binding.keys(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(format!(" {}  ", binding.label())));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_detail(&mut self, f: &mut Frame, area: Rect) {
        let row = match self.selected_match() {
            Some(row) => row,
            None => return,
        };
        let catalog_row = self
            .results
            .as_ref()
            .and_then(|m| m.indices().get(self.selected_row).copied())
            .map_or(0, |i| i + 1);

        let rows = self.table.fields(row).map(|(field, value)| {
            Row::new(vec![
                Cell::from(field).style(Style::default().fg(Color::Yellow)),
                Cell::from(value),
            ])
        });
        let widths = [Constraint::Percentage(30), Constraint::Percentage(70)];

        let detail = Table::new(rows, widths)
            .header(
                Row::new(vec!["Field", "Value"])
                    .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)),
            )
            .block(
                Block::default()
                    .title(format!("Catalog row {} (Esc to close)", catalog_row))
                    .borders(Borders::ALL)
                    .style(Style::default().bg(Color::Black)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .column_spacing(2);

        f.render_widget(Clear, area);
        f.render_stateful_widget(detail, area, &mut self.detail_state);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);
        let vertical_chunk = popup_layout[1];
        let horizontal_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(vertical_chunk);
        horizontal_layout[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::TableData;
    use crate::summarize::tests::StubSummarizer;
    use crate::summarize::FALLBACK_ANSWER;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut TuiApp<'_>, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn submit(app: &mut TuiApp<'_>) {
        app.handle_key(key(KeyCode::Enter));
        if let Some(query) = app.pending.take() {
            app.run_search(&query);
        }
    }

    fn catalog() -> UnifiedTable {
        UnifiedTable::concat(vec![
            TableData::new(
                vec!["name".to_string(), "price".to_string()],
                vec![
                    vec!["Endpoint Security".to_string(), "100".to_string()],
                    vec!["Network Security".to_string(), "250".to_string()],
                ],
            ),
            TableData::new(
                vec!["name".to_string(), "region".to_string()],
                vec![vec!["EU Data Center".to_string(), "DE".to_string()]],
            ),
        ])
    }

    fn screen(app: &mut TuiApp<'_>) -> String {
        screen_sized(app, 120, 40)
    }

    fn screen_sized(app: &mut TuiApp<'_>, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        app.draw_ui(&mut terminal).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn blank_query_does_not_search() {
        let table = catalog();
        let stub = StubSummarizer::replying("unused");
        let mut app = TuiApp::new(&table, &stub, 10, Vec::new());

        type_text(&mut app, "   ");
        submit(&mut app);

        assert!(app.results.is_none());
        assert_eq!(app.notice, Notice::Warning(BLANK_QUERY_MESSAGE.to_string()));
        assert!(stub.calls.borrow().is_empty());
    }

    #[test]
    fn search_shows_matches_and_answer() {
        let table = catalog();
        let stub = StubSummarizer::replying("Endpoint Security costs 100.");
        let mut app = TuiApp::new(&table, &stub, 10, Vec::new());

        type_text(&mut app, "security");
        submit(&mut app);

        assert_eq!(app.results.as_ref().map(|m| m.indices().to_vec()), Some(vec![0, 1]));
        assert_eq!(app.answer.as_deref(), Some("Endpoint Security costs 100."));
        assert_eq!(
            stub.calls.borrow().as_slice(),
            &[("security".to_string(), 2, 10)]
        );

        let text = screen(&mut app);
        assert!(text.contains("Loaded 3 rows from your pricebook."));
        assert!(text.contains("Network Secur"));
        assert!(text.contains("Endpoint Security costs 100."));
    }

    #[test]
    fn zero_matches_still_ask_for_an_answer() {
        let table = catalog();
        let stub = StubSummarizer::replying("Nothing matched.");
        let mut app = TuiApp::new(&table, &stub, 10, Vec::new());

        type_text(&mut app, "zzz");
        submit(&mut app);

        assert!(app.results.as_ref().is_some_and(|m| m.is_empty()));
        assert_eq!(app.notice, Notice::Info(NO_MATCHES_MESSAGE.to_string()));
        assert_eq!(stub.calls.borrow().len(), 1);
        assert!(screen(&mut app).contains(NO_MATCHES_MESSAGE));
    }

    #[test]
    fn summarizer_failure_shows_fallback() {
        let table = catalog();
        let stub = StubSummarizer::failing();
        let mut app = TuiApp::new(&table, &stub, 10, Vec::new());

        type_text(&mut app, "helix");
        submit(&mut app);

        assert_eq!(app.answer.as_deref(), Some(FALLBACK_ANSWER));
    }

    #[test]
    fn navigation_stays_within_results() {
        let table = catalog();
        let stub = StubSummarizer::replying("ok");
        let mut app = TuiApp::new(&table, &stub, 10, Vec::new());

        type_text(&mut app, "security");
        submit(&mut app);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Results);

        for _ in 0..5 {
            app.handle_key(key(KeyCode::Down));
            app.handle_key(key(KeyCode::Right));
        }
        assert_eq!(app.selected_row, 1);
        assert_eq!(app.selected_column, 2);

        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.selected_row, 0);
    }

    #[test]
    fn width_toggles() {
        let table = catalog();
        let stub = StubSummarizer::replying("ok");
        let mut app = TuiApp::new(&table, &stub, 10, Vec::new());

        type_text(&mut app, "security");
        submit(&mut app);
        app.handle_key(key(KeyCode::Tab));

        app.handle_key(key(KeyCode::Char('_')));
        assert_eq!(app.column_widths[0], ColumnWidth::Content);
        assert_eq!(app.get_column_width(0), "Endpoint Security".len() as u16 + 2);

        app.handle_key(key(KeyCode::Char('g')));
        app.handle_key(key(KeyCode::Char('_')));
        assert_eq!(
            app.column_widths,
            vec![ColumnWidth::Fixed(FIXED_WIDTH), ColumnWidth::Content, ColumnWidth::Content]
        );
    }

    #[test]
    fn detail_popup_lists_fields() {
        let table = catalog();
        let stub = StubSummarizer::replying("ok");
        let mut app = TuiApp::new(&table, &stub, 10, Vec::new());

        type_text(&mut app, "data center");
        submit(&mut app);
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.show_detail);

        let text = screen(&mut app);
        assert!(text.contains("Catalog row 3 (Esc to close)"));
        assert!(text.contains("region"));

        assert!(!app.handle_key(key(KeyCode::Esc)));
        assert!(!app.show_detail);
        assert!(app.handle_key(key(KeyCode::Char('q'))));
    }

    #[test]
    fn typing_q_in_the_input_does_not_quit() {
        let table = catalog();
        let stub = StubSummarizer::replying("ok");
        let mut app = TuiApp::new(&table, &stub, 10, vec!["File not found: Skyhigh.csv".to_string()]);

        assert!(!app.handle_key(key(KeyCode::Char('q'))));
        assert_eq!(app.input, "q");
        assert!(screen(&mut app).contains("File not found: Skyhigh.csv"));
        assert!(app.handle_key(key(KeyCode::Esc)));
    }

    #[test]
    fn wide_column_stays_visible_on_a_narrow_terminal() {
        let description = format!("Advanced threat bundle {}", "x".repeat(48));
        let table = UnifiedTable::concat(vec![TableData::new(
            vec!["name".to_string(), "desc".to_string()],
            vec![vec!["Helix".to_string(), description]],
        )]);
        let stub = StubSummarizer::replying("ok");
        let mut app = TuiApp::new(&table, &stub, 10, Vec::new());

        type_text(&mut app, "helix");
        submit(&mut app);
        screen_sized(&mut app, 40, 30);

        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Char('_')));

        assert_eq!(app.selected_column, 1);
        assert_eq!(app.horizontal_offset, FIXED_WIDTH + COLUMN_SPACING);
        assert_eq!(app.visible_columns(), vec![1]);
        assert!(screen_sized(&mut app, 40, 30).contains("Advanced threat"));
    }
}
