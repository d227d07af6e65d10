//! Ratatui-based terminal UI.
//!
//! The TUI shows a loading screen while the daily snapshots stream in, then
//! a selector panel (region, subregion, metric, totals, plus an optional
//! comparison series) and the aggregated line chart. Selector changes
//! re-aggregate against the in-memory record set; nothing is re-fetched.

use std::io;
use std::time::Duration;

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

use crate::app::pipeline::{self, LoadOutput};
use crate::cli::ChartArgs;
use crate::data::CsseClient;
use crate::domain::{
    ChartData, DateWindow, SeriesPatch, ViewParams, ViewPatch, ALL_REGIONS,
};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::{fmt_count, fmt_tick_date, TrendPlottersChart};

/// Start the TUI: ingest the window with a progress screen, then interact.
pub fn run(args: ChartArgs) -> Result<(), AppError> {
    let window = crate::app::window_from_args(&args)?;
    let view = crate::app::view_from_args(&args);
    let client = CsseClient::from_env()?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::data(format!("Failed to initialize terminal: {e}")))?;

    let load = load_with_progress(&client, window, &args, &mut terminal)?;

    let mut app = App::new(load, view);
    app.event_loop(&mut terminal)
}

/// Run the ingestion loop, redrawing the loading screen after each day.
///
/// Each redraw is one discrete state replacement; the fetch loop itself stays
/// strictly sequential (the redraw happens between two days' round trips).
fn load_with_progress<B: ratatui::backend::Backend>(
    client: &CsseClient,
    window: DateWindow,
    args: &ChartArgs,
    terminal: &mut Terminal<B>,
) -> Result<LoadOutput, AppError> {
    terminal
        .draw(|f| draw_loading(f, 0))
        .map_err(|e| AppError::data(format!("Terminal draw error: {e}")))?;

    // A failed redraw does not abort the fetch loop; the terminal error is
    // surfaced once the window completes.
    let mut draw_error: Option<io::Error> = None;
    let load = pipeline::run_load(client, window, args.on_error, &mut |pct, _date| {
        if draw_error.is_none() {
            if let Err(e) = terminal.draw(|f| draw_loading(f, pct)) {
                draw_error = Some(e);
            }
        }
    });

    if let Some(e) = draw_error {
        return Err(AppError::data(format!("Terminal draw error: {e}")));
    }

    Ok(load)
}

fn draw_loading(frame: &mut ratatui::Frame<'_>, pct: u8) {
    let area = frame.area();
    let block = Block::default()
        .title("trend — COVID-19 daily snapshots")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let msg = Paragraph::new(format!("Data loading {pct}% complete"))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    let rect = Rect {
        x: inner.x,
        y: inner.y + inner.height / 2,
        width: inner.width,
        height: 1,
    };
    frame.render_widget(msg, rect);
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::data(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::data(format!("Failed to enter alternate screen: {e}")));
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

/// Selector fields, in display order. The comparison quartet only exists
/// while the comparison series is enabled.
const FIELD_COUNTRY: usize = 0;
const FIELD_PROVINCE: usize = 1;
const FIELD_METRIC: usize = 2;
const FIELD_TOTALS: usize = 3;
const FIELD_COMPARE: usize = 4;
const FIELD_CMP_COUNTRY: usize = 5;
const FIELD_CMP_PROVINCE: usize = 6;
const FIELD_CMP_METRIC: usize = 7;
const FIELD_CMP_TOTALS: usize = 8;

struct App {
    load: LoadOutput,
    view: ViewParams,
    chart: ChartData,
    /// Subregion options for the primary country.
    provinces: Vec<String>,
    /// Subregion options for the comparison country.
    cmp_provinces: Vec<String>,
    selected_field: usize,
    status: String,
}

impl App {
    fn new(load: LoadOutput, view: ViewParams) -> Self {
        let chart = load.curate(&view);
        let provinces = load.provinces(&view.primary.country);
        let cmp_provinces = view
            .secondary
            .as_ref()
            .map(|s| load.provinces(&s.country))
            .unwrap_or_default();

        let status = if load.ingest.is_partial() {
            format!(
                "Partial data: {}/{} days loaded.",
                load.ingest.days_loaded,
                load.ingest.window.day_count()
            )
        } else {
            format!("Loaded {} days.", load.ingest.days_loaded)
        };

        Self {
            load,
            view,
            chart,
            provinces,
            cmp_provinces,
            selected_field: 0,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::data(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::data(format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::data(format!("Event read error: {e}")))? {
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

    fn field_count(&self) -> usize {
        if self.view.secondary.is_some() {
            FIELD_CMP_TOTALS + 1
        } else {
            FIELD_COMPARE + 1
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field + 1 < self.field_count() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i64) {
        let mut patch = ViewPatch::default();

        match self.selected_field {
            FIELD_COUNTRY => {
                let next = cycle(&self.country_options(), &self.view.primary.country, delta);
                // A country change invalidates the subregion selection.
                patch.primary = SeriesPatch {
                    country: Some(next.clone()),
                    province: Some(ALL_REGIONS.to_string()),
                    ..SeriesPatch::default()
                };
                self.provinces = self.load.provinces(&next);
                self.status = format!("region: {next}");
            }
            FIELD_PROVINCE => {
                let options = province_options(&self.provinces);
                let next = cycle(&options, &self.view.primary.province, delta);
                self.status = format!("subregion: {next}");
                patch.primary = SeriesPatch::province(next);
            }
            FIELD_METRIC => {
                let metric = if delta >= 0 {
                    self.view.primary.metric.next()
                } else {
                    self.view.primary.metric.prev()
                };
                patch.primary.metric = Some(metric);
                self.status = format!("metric: {}", metric.display_name());
            }
            FIELD_TOTALS => {
                let totals = self.view.primary.totals.toggled();
                patch.primary.totals = Some(totals);
                self.status = format!("totals: {}", totals.display_name());
            }
            FIELD_COMPARE => {
                let enable = self.view.secondary.is_none();
                patch.secondary_enabled = Some(enable);
                self.status = if enable {
                    "Comparison series on.".to_string()
                } else {
                    "Comparison series off.".to_string()
                };
            }
            FIELD_CMP_COUNTRY => {
                if let Some(secondary) = &self.view.secondary {
                    let next = cycle(&self.country_options(), &secondary.country, delta);
                    patch.secondary = SeriesPatch {
                        country: Some(next.clone()),
                        province: Some(ALL_REGIONS.to_string()),
                        ..SeriesPatch::default()
                    };
                    self.cmp_provinces = self.load.provinces(&next);
                    self.status = format!("compare region: {next}");
                }
            }
            FIELD_CMP_PROVINCE => {
                if let Some(secondary) = &self.view.secondary {
                    let options = province_options(&self.cmp_provinces);
                    let next = cycle(&options, &secondary.province, delta);
                    self.status = format!("compare subregion: {next}");
                    patch.secondary = SeriesPatch::province(next);
                }
            }
            FIELD_CMP_METRIC => {
                if let Some(secondary) = &self.view.secondary {
                    let metric = if delta >= 0 {
                        secondary.metric.next()
                    } else {
                        secondary.metric.prev()
                    };
                    patch.secondary.metric = Some(metric);
                    self.status = format!("compare metric: {}", metric.display_name());
                }
            }
            FIELD_CMP_TOTALS => {
                if let Some(secondary) = &self.view.secondary {
                    let totals = secondary.totals.toggled();
                    patch.secondary.totals = Some(totals);
                    self.status = format!("compare totals: {}", totals.display_name());
                }
            }
            _ => return,
        }

        self.view = self.view.apply(&patch);
        if self.selected_field == FIELD_COMPARE {
            // Toggling the comparison resolves its country (it mirrors the
            // primary on enable), so its subregion options change with it.
            self.cmp_provinces = match &self.view.secondary {
                Some(secondary) => self.load.provinces(&secondary.country),
                None => Vec::new(),
            };
        }
        if self.selected_field >= self.field_count() {
            self.selected_field = self.field_count() - 1;
        }
        self.chart = self.load.curate(&self.view);
    }

    fn country_options(&self) -> Vec<String> {
        let mut options = Vec::with_capacity(self.load.countries.len() + 1);
        options.push(ALL_REGIONS.to_string());
        options.extend(self.load.countries.iter().cloned());
        options
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let ingest = &self.load.ingest;

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("trend", Style::default().fg(Color::Cyan)),
            Span::raw(" — COVID-19 daily snapshots"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "window: {} → {} | days: {}/{} | records: {}",
                ingest.window.epoch,
                ingest.window.asof,
                ingest.days_loaded,
                ingest.window.day_count(),
                ingest.records.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        if ingest.is_partial() {
            lines.push(Line::from(Span::styled(
                format!(
                    "partial data: {} day(s) failed to load",
                    ingest.failures.len().max(
                        (ingest.window.day_count() - ingest.days_loaded) as usize
                    )
                ),
                Style::default().fg(Color::Yellow),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let settings_height = if self.view.secondary.is_some() { 11 } else { 7 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(settings_height)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(self.chart.labels.join(" vs "))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if self.chart.points.is_empty() {
            let msg = Paragraph::new("No data for the selected region.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        }

        let primary = self.chart.series_xy(0);
        let secondary = (self.chart.labels.len() > 1).then(|| self.chart.series_xy(1));

        let Some((x_bounds, y_bounds)) = chart_bounds(&primary, secondary.as_deref()) else {
            let msg = Paragraph::new("Not enough points to chart.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let x_origin = self.chart.points[0].date;

        let (chart_rect, insets) = chart_layout(inner);
        let widget = TrendPlottersChart {
            primary: &primary,
            secondary: secondary.as_deref(),
            x_bounds,
            y_bounds,
            x_origin,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, x_origin);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let primary = &self.view.primary;

        let mut items = Vec::new();
        items.push(ListItem::new(format!("Region: {}", primary.country)));
        items.push(ListItem::new(format!("Subregion: {}", primary.province)));
        items.push(ListItem::new(format!("Metric: {}", primary.metric.display_name())));
        items.push(ListItem::new(format!("Totals: {}", primary.totals.display_name())));

        match &self.view.secondary {
            None => items.push(ListItem::new("Compare: off")),
            Some(secondary) => {
                items.push(ListItem::new("Compare: on"));
                items.push(ListItem::new(format!("  Region: {}", secondary.country)));
                items.push(ListItem::new(format!("  Subregion: {}", secondary.province)));
                items.push(ListItem::new(format!(
                    "  Metric: {}",
                    secondary.metric.display_name()
                )));
                items.push(ListItem::new(format!(
                    "  Totals: {}",
                    secondary.totals.display_name()
                )));
            }
        }

        let list = List::new(items)
            .block(Block::default().title("Selectors").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Cycle through selector options, wrapping at both ends.
fn cycle(options: &[String], current: &str, delta: i64) -> String {
    if options.is_empty() {
        return current.to_string();
    }
    let len = options.len() as i64;
    let pos = options
        .iter()
        .position(|o| o == current)
        .map(|p| p as i64)
        .unwrap_or(0);
    let next = (pos + delta).rem_euclid(len);
    options[next as usize].clone()
}

fn province_options(provinces: &[String]) -> Vec<String> {
    let mut options = Vec::with_capacity(provinces.len() + 1);
    options.push(ALL_REGIONS.to_string());
    options.extend(provinces.iter().cloned());
    options
}

/// Compute chart bounds over both series, padding y by 5%.
fn chart_bounds(
    primary: &[(f64, f64)],
    secondary: Option<&[(f64, f64)]>,
) -> Option<([f64; 2], [f64; 2])> {
    let mut x_max = f64::NEG_INFINITY;
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);

    for &(x, y) in primary.iter().chain(secondary.unwrap_or(&[])) {
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !x_max.is_finite() || x_max <= 0.0 {
        return None;
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        return None;
    }
    if y_max <= y_min {
        // A flat series still deserves a drawable band.
        y_max = y_min + 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    Some(([0.0, x_max], [y_min - pad, y_max + pad]))
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
    x_origin: chrono::NaiveDate,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_tick_date(x_origin, x_val);
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

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_count(y_val);
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

    let y_label = Paragraph::new("count")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
