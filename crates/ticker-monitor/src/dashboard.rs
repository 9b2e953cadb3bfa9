//! TUI table view using ratatui.

use chrono::{DateTime, Local};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row as TableRow, Table},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use ticker_core::types::{Instrument, Row, Signal, Snapshot, Timeframe};
use ticker_engine::{CommitStatus, RowUpdate, SchedulerStatus};

const MAX_MESSAGES: usize = 50;
const UNKNOWN: &str = "unknown";

/// Everything the view renders. Built from the loaded snapshot and then
/// fed with row updates; never shared with the scheduler.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub rows: Snapshot,
    pub status: Option<SchedulerStatus>,
    pub last_update: Option<DateTime<Local>>,
    pub messages: Vec<String>,
}

impl DashboardState {
    pub fn new(rows: Snapshot) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Start from the loaded rows and add an all-unknown row for every
    /// watched instrument the snapshot does not have yet, so each one is
    /// visible before its first refresh.
    pub fn seeded(mut rows: Snapshot, watchlist: &[Instrument]) -> Self {
        for instrument in watchlist {
            if !rows.contains(&instrument.symbol) {
                rows.upsert(Row::unknown(instrument.clone()));
            }
        }
        Self::new(rows)
    }

    /// Fold one refreshed row into the view.
    pub fn apply(&mut self, update: RowUpdate) {
        if let CommitStatus::Pending { reason } = &update.commit {
            self.push_message(format!("{} not saved yet: {}", update.row.symbol(), reason));
        }
        self.rows.upsert(update.row);
        self.last_update = Some(Local::now());
    }

    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
        if self.messages.len() > MAX_MESSAGES {
            let excess = self.messages.len() - MAX_MESSAGES;
            self.messages.drain(..excess);
        }
    }
}

/// Cell colour for a signal.
pub fn signal_style(signal: Option<Signal>) -> Style {
    match signal {
        Some(Signal::StrongBuy) => Style::default().fg(Color::Rgb(0, 100, 0)),
        Some(Signal::Buy) => Style::default().fg(Color::Green),
        Some(Signal::Neutral) => Style::default().fg(Color::Gray),
        Some(Signal::Sell) => Style::default().fg(Color::Red),
        Some(Signal::StrongSell) => Style::default().fg(Color::Rgb(139, 0, 0)),
        None => Style::default().fg(Color::DarkGray),
    }
}

fn price(value: Option<f64>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| format!("{:.2}", v))
}

fn volume(value: Option<f64>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| format!("{:.0}", v))
}

fn table_row(row: &Row) -> TableRow<'static> {
    let quote = row.quote;
    let mut cells = vec![
        Cell::from(row.symbol().to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(price(quote.map(|q| q.open))),
        Cell::from(price(quote.map(|q| q.high))),
        Cell::from(price(quote.map(|q| q.low))),
        Cell::from(price(quote.map(|q| q.close))),
        Cell::from(volume(quote.map(|q| q.volume))),
    ];
    for timeframe in Timeframe::ALL {
        let signal = row.signal(timeframe);
        let text = signal.map_or(UNKNOWN, |s| s.as_str());
        cells.push(Cell::from(text).style(signal_style(signal)));
    }
    TableRow::new(cells)
}

/// TUI table view.
pub struct Dashboard {
    refresh_ms: u64,
}

impl Dashboard {
    /// Create a new dashboard.
    pub fn new(refresh_ms: u64) -> Self {
        Self { refresh_ms }
    }

    /// Run the dashboard until `q` or `Esc`.
    pub fn run<F>(&self, mut get_state: F) -> io::Result<()>
    where
        F: FnMut() -> DashboardState,
    {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_loop(&mut terminal, &mut get_state);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    fn run_loop<F>(
        &self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        get_state: &mut F,
    ) -> io::Result<()>
    where
        F: FnMut() -> DashboardState,
    {
        loop {
            let state = get_state();
            terminal.draw(|f| self.ui(f, &state))?;

            if event::poll(Duration::from_millis(self.refresh_ms))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press
                        && (key.code == KeyCode::Char('q') || key.code == KeyCode::Esc)
                    {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn ui(&self, frame: &mut Frame, state: &DashboardState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Status
                Constraint::Min(8),    // Rows
                Constraint::Length(7), // Messages
            ])
            .split(frame.area());

        self.render_status(frame, chunks[0], state);
        self.render_rows(frame, chunks[1], state);
        self.render_messages(frame, chunks[2], state);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let (status, cycle) = match &state.status {
            Some(s) => (s.state.to_string(), s.cycle.to_string()),
            None => ("starting".to_string(), "-".to_string()),
        };
        let updated = state
            .last_update
            .map_or_else(|| "never".to_string(), |t| t.format("%H:%M:%S").to_string());

        let line = Paragraph::new(Line::from(vec![
            Span::styled("Ticker", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" | "),
            Span::styled(status, Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | cycle {} | last update {}", cycle, updated)),
            Span::raw(" | Press 'q' to quit"),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Status"));
        frame.render_widget(line, area);
    }

    fn render_rows(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let mut titles = vec!["Stock", "Open", "High", "Low", "CMP", "Volume"];
        titles.extend(Timeframe::ALL.iter().map(|tf| tf.label()));
        let header = TableRow::new(
            titles
                .into_iter()
                .map(|h| Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))),
        )
        .height(1);

        let rows = state.rows.iter().map(table_row);
        let widths = [
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Stocks"));
        frame.render_widget(table, area);
    }

    fn render_messages(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let messages: Vec<Line> = state
            .messages
            .iter()
            .rev()
            .take(5)
            .map(|m| Line::from(m.as_str()).style(Style::default().fg(Color::Yellow)))
            .collect();

        let paragraph =
            Paragraph::new(messages).block(Block::default().borders(Borders::ALL).title("Messages"));
        frame.render_widget(paragraph, area);
    }
}
