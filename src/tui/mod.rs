//! Ratatui-based terminal dashboard.
//!
//! The TUI provides a settings panel (ticker, neutral band, test fraction,
//! sample seed, data source), then renders the price history with earnings
//! markers, the fit diagnostics, and the next-earnings recommendation.

use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::{self, RunOutput};
use crate::cli::RunArgs;
use crate::domain::{DataSource, EarningsEvent, PricePoint, Recommendation, RunConfig, VolatilityPoint};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::PriceChart;

/// Start the TUI.
pub fn run(mut args: RunArgs) -> Result<(), AppError> {
    // The dashboard is demo-first: with no earnings file and no CSVs, fall
    // back to the synthetic sample so a bare `ti` starts something useful.
    if args.earnings_file.is_none() && args.stock_csv.is_none() {
        args.sample = true;
    }

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::config(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(&args)?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::config(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::config(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Pre-loaded pipeline inputs, cached so refits don't refetch.
struct Inputs {
    prices: Vec<PricePoint>,
    volatility: Vec<VolatilityPoint>,
    events: Vec<EarningsEvent>,
}

struct App {
    config: RunConfig,
    ticker_input: String,
    selected_field: usize,
    editing_ticker: bool,
    status: String,
    inputs: Option<Inputs>,
    run: Option<RunOutput>,
}

const FIELD_TICKER: usize = 0;
const FIELD_BAND: usize = 1;
const FIELD_TEST_FRACTION: usize = 2;
const FIELD_SAMPLE_SEED: usize = 3;
const FIELD_SOURCE: usize = 4;
const FIELD_COUNT: usize = 5;

impl App {
    fn new(args: &RunArgs) -> Result<Self, AppError> {
        let config = crate::app::run_config_from_args(args)?;
        let mut app = Self {
            ticker_input: config.ticker.clone(),
            config,
            selected_field: 0,
            editing_ticker: false,
            status: "Loading data...".to_string(),
            inputs: None,
            run: None,
        };
        app.refresh_inputs();
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::config(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::config(format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::config(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_ticker {
            self.handle_ticker_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < FIELD_COUNT - 1 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => {
                if self.selected_field == FIELD_TICKER {
                    self.editing_ticker = true;
                    self.ticker_input = self.config.ticker.clone();
                    self.status = "Editing ticker. Enter to apply, Esc to cancel.".to_string();
                }
            }
            KeyCode::Char('r') => {
                self.refresh_inputs();
            }
            _ => {}
        }

        false
    }

    fn handle_ticker_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_ticker = false;
                self.status = "Ticker edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_ticker = false;
                let ticker = self.ticker_input.trim().to_uppercase();
                if ticker.is_empty() {
                    self.status = "Ticker cannot be empty.".to_string();
                    return;
                }
                self.config.ticker = ticker;
                self.refresh_inputs();
            }
            KeyCode::Backspace => {
                self.ticker_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_alphanumeric() || matches!(c, '^' | '.' | '-') {
                    self.ticker_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            FIELD_BAND => {
                let next = (self.config.neutral_band_pct + 0.1 * delta as f64).max(0.0);
                self.config.neutral_band_pct = (next * 10.0).round() / 10.0;
                self.rerun();
                self.status = format!("band: ±{:.1}%", self.config.neutral_band_pct);
            }
            FIELD_TEST_FRACTION => {
                let next = (self.config.train.test_fraction + 0.05 * delta as f64)
                    .clamp(0.05, 0.90);
                self.config.train.test_fraction = (next * 100.0).round() / 100.0;
                self.rerun();
                self.status = format!("test fraction: {:.2}", self.config.train.test_fraction);
            }
            FIELD_SAMPLE_SEED => {
                self.config.sample_seed = if delta >= 0 {
                    self.config.sample_seed.wrapping_add(1)
                } else {
                    self.config.sample_seed.wrapping_sub(1)
                };
                if self.config.source == DataSource::Sample {
                    self.refresh_inputs();
                    self.status = format!("resampled with seed {}", self.config.sample_seed);
                } else {
                    self.status = "Seed only affects the sample source.".to_string();
                }
            }
            FIELD_SOURCE => {
                match self.config.source {
                    DataSource::Sample => self.config.source = DataSource::Remote,
                    DataSource::Remote => self.config.source = DataSource::Sample,
                    // CSV paths come from the command line; there is nothing to
                    // cycle back to once abandoned, so leave them fixed.
                    DataSource::Csv { .. } => {
                        self.status = "Source is fixed to the given CSV files.".to_string();
                        return;
                    }
                }
                self.refresh_inputs();
            }
            _ => {}
        }
    }

    /// Reload series + events for the current config, then refit.
    ///
    /// Failures land in the status line; the dashboard stays up so the user
    /// can fix the setting that caused them.
    fn refresh_inputs(&mut self) {
        self.status = "Loading data...".to_string();
        let loaded = pipeline::load_series(&self.config).and_then(|(prices, volatility)| {
            let events = pipeline::load_events(&self.config)?;
            Ok(Inputs { prices, volatility, events })
        });

        match loaded {
            Ok(inputs) => {
                self.inputs = Some(inputs);
                self.rerun();
            }
            Err(err) => {
                self.inputs = None;
                self.run = None;
                self.status = err.to_string();
            }
        }
    }

    /// Refit on the cached inputs (band/fraction changes don't refetch).
    fn rerun(&mut self) {
        let Some(inputs) = &self.inputs else {
            self.status = "No data loaded.".to_string();
            return;
        };

        match pipeline::run_with_inputs(
            &self.config,
            inputs.prices.clone(),
            inputs.volatility.clone(),
            inputs.events.clone(),
        ) {
            Ok(run) => {
                self.status = format!(
                    "{} rows | {}",
                    run.summary.rows,
                    source_label(&self.config.source)
                );
                self.run = Some(run);
            }
            Err(err) => {
                self.run = None;
                self.status = err.to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("ti", Style::default().fg(Color::Cyan)),
            Span::raw(" — earnings event study (EPS + VIX → OLS)"),
        ]));

        let (events, rows) = self
            .run
            .as_ref()
            .map(|r| (r.summary.events_parsed, r.summary.rows))
            .unwrap_or((0, 0));
        lines.push(Line::from(Span::styled(
            format!(
                "ticker: {} | source: {} | range: {} → {} | events: {events} | rows: {rows}",
                self.config.ticker,
                source_label(&self.config.source),
                self.config.start,
                self.config.end,
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(run) = &self.run {
            let test_r2 = run
                .metrics
                .test_r2
                .map(|v| format!("{v:.3}"))
                .unwrap_or_else(|| "n/a".to_string());
            lines.push(Line::from(Span::styled(
                format!(
                    "train R²={:.3} | test R²={test_r2} | n_train={} n_test={}",
                    run.metrics.train_r2, run.metrics.n_train, run.metrics.n_test,
                ),
                Style::default().fg(Color::Gray),
            )));

            let latest = &run.latest;
            let rec_style = match latest.recommendation {
                Recommendation::Buy => Style::default().fg(Color::Green),
                Recommendation::Hold => Style::default().fg(Color::Yellow),
                Recommendation::Avoid => Style::default().fg(Color::Red),
            };
            lines.push(Line::from(vec![
                Span::raw(format!(
                    "next earnings (est. {}): {:+.2}% → ",
                    latest.est_next_earnings, latest.predicted_pct,
                )),
                Span::styled(
                    latest.recommendation.display_name(),
                    rec_style.add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" (band ±{:.1}%)", self.config.neutral_band_pct)),
            ]));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(9)])
            .split(area);

        self.draw_chart(frame, chunks[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);

        self.draw_settings(frame, bottom[0]);
        self.draw_events(frame, bottom[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title("Price history (markers: post-earnings moves)")
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let (prices, up, down, x_bounds, y_bounds) = chart_series(run);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = PriceChart {
            prices: &prices,
            up_events: &up,
            down_events: &down,
            x_bounds,
            y_bounds,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let ticker_label = if self.editing_ticker {
            format!("{}▏", self.ticker_input)
        } else {
            self.config.ticker.clone()
        };

        let items = vec![
            ListItem::new(format!("Ticker: {ticker_label}")),
            ListItem::new(format!("Band: ±{:.1}%", self.config.neutral_band_pct)),
            ListItem::new(format!("Test fraction: {:.2}", self.config.train.test_fraction)),
            ListItem::new(format!("Sample seed: {}", self.config.sample_seed)),
            ListItem::new(format!("Source: {}", source_label(&self.config.source))),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_events(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Recent events").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(run) = &self.run else {
            return;
        };

        // Show the most recent rows that fit the panel.
        let capacity = inner.height.saturating_sub(2) as usize;
        let start = run.dataset.len().saturating_sub(capacity);
        let table = crate::report::format_dataset_table(&run.dataset[start..]);

        let p = Paragraph::new(table).style(Style::default().fg(Color::Gray));
        frame.render_widget(p, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit ticker  r refresh  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn source_label(source: &DataSource) -> &'static str {
    match source {
        DataSource::Remote => "remote",
        DataSource::Sample => "sample",
        DataSource::Csv { .. } => "csv",
    }
}

/// Build chart series for Plotters: the price line plus one marker per
/// dataset row, colored by the sign of the realized move.
fn chart_series(
    run: &RunOutput,
) -> (
    Vec<(f64, f64)>,
    Vec<(f64, f64)>,
    Vec<(f64, f64)>,
    [f64; 2],
    [f64; 2],
) {
    let prices: Vec<(f64, f64)> = run
        .prices
        .iter()
        .map(|p| (day_number(p.date), p.close))
        .collect();

    let mut up = Vec::new();
    let mut down = Vec::new();
    for row in &run.dataset {
        // Anchor the marker at the first close on/after the event date.
        let split = run.prices.partition_point(|p| p.date < row.date);
        let Some(point) = run.prices.get(split) else {
            continue;
        };
        let marker = (day_number(point.date), point.close);
        if row.change_pct >= 0.0 {
            up.push(marker);
        } else {
            down.push(marker);
        }
    }

    let (mut x0, mut x1) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in &prices {
        x0 = x0.min(x);
        x1 = x1.max(x);
        y0 = y0.min(y);
        y1 = y1.max(y);
    }

    if !x0.is_finite() || !x1.is_finite() || x1 <= x0 {
        x0 = 0.0;
        x1 = 1.0;
    }
    if !y0.is_finite() || !y1.is_finite() || y1 <= y0 {
        y0 = 0.0;
        y1 = 1.0;
    }

    let pad = ((y1 - y0).abs() * 0.05).max(1e-12);
    (prices, up, down, [x0, x1], [y0 - pad, y1 + pad])
}

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn fmt_day_number(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_else(|| "?".to_string())
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 4usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_day_number(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let ticks = 5usize;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.0}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("date")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("close")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
