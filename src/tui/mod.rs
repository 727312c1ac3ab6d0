//! Ratatui-based terminal UI.
//!
//! Three views (Binomial, Weibull, OC) share one `Session`. A settings panel
//! lists the editable fields of the current view; edits are submitted as text
//! and go through the session, which validates them before any model changes.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use tracing::info;

use crate::app::{ModelEvent, ModelObserver, Session};
use crate::config::Settings;
use crate::domain::Field;
use crate::error::AppError;
use crate::models::WeibullFunction;

mod plotters_chart;

use plotters_chart::{ChartLine, ChartMarker, CurvePlottersChart};

/// Bounds of the OC axis windows.
const WINDOW_MIN: f64 = 0.001;
const WINDOW_MAX: f64 = 1.0;

const CYAN: RGBColor = RGBColor(0, 255, 255);
const YELLOW: RGBColor = RGBColor(255, 255, 0);
const GREEN: RGBColor = RGBColor(0, 255, 0);
const RED: RGBColor = RGBColor(255, 0, 0);

/// Start the TUI.
pub fn run(settings: Settings) -> Result<(), AppError> {
    let mut app = App::new(&settings)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    info!("tui started");
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Binomial,
    Weibull,
    Oc,
}

impl View {
    fn next(self) -> Self {
        match self {
            View::Binomial => View::Weibull,
            View::Weibull => View::Oc,
            View::Oc => View::Binomial,
        }
    }

    fn prev(self) -> Self {
        match self {
            View::Binomial => View::Oc,
            View::Weibull => View::Binomial,
            View::Oc => View::Weibull,
        }
    }

    fn title(self) -> &'static str {
        match self {
            View::Binomial => "Binomial Distribution",
            View::Weibull => "Weibull Model",
            View::Oc => "OC Curve",
        }
    }

    fn fields(self) -> &'static [Field] {
        match self {
            View::Binomial => &Field::BINOMIAL,
            View::Weibull => &Field::WEIBULL,
            View::Oc => &Field::OC,
        }
    }
}

/// Status line fed by the session after every accepted edit.
#[derive(Debug, Default)]
struct StatusFeed {
    status: String,
    is_error: bool,
}

impl StatusFeed {
    fn error(&mut self, message: String) {
        self.status = message;
        self.is_error = true;
    }

    fn note(&mut self, message: impl Into<String>) {
        self.status = message.into();
        self.is_error = false;
    }
}

impl ModelObserver for StatusFeed {
    fn model_changed(&mut self, event: &ModelEvent) {
        self.note(event.summary());
    }
}

/// Visible portion of the OC chart: `p <= x_max`, `P(accept) <= y_max`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OcWindow {
    x_max: f64,
    y_max: f64,
}

impl Default for OcWindow {
    fn default() -> Self {
        Self { x_max: 0.1, y_max: 1.0 }
    }
}

fn step_window(value: f64, grow: bool) -> f64 {
    let next = if grow { value * 1.25 } else { value * 0.8 };
    next.clamp(WINDOW_MIN, WINDOW_MAX)
}

struct App {
    session: Session,
    feed: StatusFeed,
    view: View,
    selected_field: usize,
    /// Text being typed while a field is in edit mode.
    input: Option<String>,
    weibull_fn: WeibullFunction,
    oc_window: OcWindow,
}

impl App {
    fn new(settings: &Settings) -> Result<Self, AppError> {
        let session = Session::new(settings)?;
        let mut feed = StatusFeed::default();
        feed.note("Ready.");
        Ok(Self {
            session,
            feed,
            view: View::Binomial,
            selected_field: 0,
            input: None,
            weibull_fn: WeibullFunction::default(),
            oc_window: OcWindow::default(),
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
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

    fn current_field(&self) -> Field {
        let fields = self.view.fields();
        fields[self.selected_field.min(fields.len() - 1)]
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.input.is_some() {
            self.handle_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => self.switch_view(self.view.next()),
            KeyCode::BackTab => self.switch_view(self.view.prev()),
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < self.view.fields().len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Enter => {
                let field = self.current_field();
                self.input = Some(self.session.value_text(field));
                self.feed
                    .note(format!("Editing {}. Enter to apply, Esc to cancel.", field.name()));
            }
            KeyCode::Char('f') if self.view == View::Weibull => {
                self.weibull_fn = self.weibull_fn.next();
                self.feed.note(format!("function: {}", self.weibull_fn.label()));
            }
            KeyCode::Char(c @ ('x' | 'X' | 'y' | 'Y')) if self.view == View::Oc => {
                let w = &mut self.oc_window;
                match c {
                    'x' => w.x_max = step_window(w.x_max, false),
                    'X' => w.x_max = step_window(w.x_max, true),
                    'y' => w.y_max = step_window(w.y_max, false),
                    _ => w.y_max = step_window(w.y_max, true),
                }
                self.feed
                    .note(format!("window: p <= {:.3}, P(accept) <= {:.3}", w.x_max, w.y_max));
            }
            _ => {}
        }

        false
    }

    fn switch_view(&mut self, view: View) {
        self.view = view;
        self.selected_field = 0;
        self.feed.note(format!("view: {}", view.title()));
    }

    fn handle_edit(&mut self, code: KeyCode) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.input = None;
                self.feed.note("Edit canceled.");
            }
            KeyCode::Enter => {
                let text = self.input.take().unwrap_or_default();
                let field = self.current_field();
                // On error the session leaves every model as it was.
                if let Err(err) = self.session.apply(field, &text, &mut self.feed) {
                    self.feed.error(format!("Error: {err}"));
                }
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E') => {
                input.push(c);
            }
            _ => {}
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let tabs: Vec<Span> = [View::Binomial, View::Weibull, View::Oc]
            .into_iter()
            .flat_map(|v| {
                let style = if v == self.view {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else {
                    Style::default().fg(Color::Gray)
                };
                [Span::styled(format!(" {} ", v.title()), style), Span::raw(" ")]
            })
            .collect();

        let mut first = vec![Span::styled("relc", Style::default().fg(Color::Cyan)), Span::raw("  ")];
        first.extend(tabs);

        let lines = vec![
            Line::from(first),
            Line::from(Span::styled(self.view_summary(), Style::default().fg(Color::Gray))),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn view_summary(&self) -> String {
        match self.view {
            View::Binomial => {
                let m = self.session.binomial();
                format!("n={} | p={} | rows={}", m.sample_size(), m.p_fail(), m.series().len())
            }
            View::Weibull => {
                let m = self.session.weibull();
                format!(
                    "m={} | c={} | t=[{}, {}] | function: {}",
                    m.shape(),
                    m.scale(),
                    m.config().t_start,
                    m.config().t_end,
                    self.weibull_fn.label()
                )
            }
            View::Oc => {
                let c = self.session.oc();
                let l = c.limits();
                format!(
                    "n={} | k={} | alpha={:.4} AQL={:.5} | beta={:.4} RQL={:.5}",
                    c.sample_size(),
                    c.acceptance_number(),
                    l.alpha,
                    l.aql,
                    l.beta,
                    l.rql
                )
            }
        }
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(36)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title(self.view.title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let data = chart_data(&self.session, self.view, self.weibull_fn, self.oc_window);
        let lines: Vec<ChartLine> = data
            .lines
            .iter()
            .map(|(points, color)| ChartLine { points, color: *color })
            .collect();

        let (chart_rect, insets) = chart_layout(inner);
        let widget = CurvePlottersChart {
            lines: &lines,
            markers: &data.markers,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: data.x_label,
            y_label: data.y_label,
            fmt_x: fmt_axis,
            fmt_y: fmt_axis,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &data);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let selected = self.current_field();
        let items: Vec<ListItem> = self
            .view
            .fields()
            .iter()
            .map(|&field| {
                let value = match (&self.input, field == selected) {
                    (Some(input), true) => format!("{input}_"),
                    _ => self.session.value_text(field),
                };
                ListItem::new(format!("{}: {value}", field.label()))
            })
            .collect();

        let title = if self.input.is_some() { "Settings (editing)" } else { "Settings" };
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.input.is_some() {
            let hint = Paragraph::new("Enter apply | Esc cancel")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.view {
            View::Binomial => "Tab view  ↑/↓ select  Enter edit  q quit",
            View::Weibull => "Tab view  ↑/↓ select  Enter edit  f function  q quit",
            View::Oc => "Tab view  ↑/↓ select  Enter edit  x/X p-axis  y/Y accept-axis  q quit",
        };
        let status_color = if self.feed.is_error { Color::Red } else { Color::Yellow };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.feed.status, Style::default().fg(status_color)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Everything the chart widget needs, computed outside the render call.
#[derive(Debug, Clone)]
struct ChartData {
    lines: Vec<(Vec<(f64, f64)>, RGBColor)>,
    markers: Vec<ChartMarker>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    x_label: &'static str,
    y_label: &'static str,
}

fn chart_data(session: &Session, view: View, weibull_fn: WeibullFunction, window: OcWindow) -> ChartData {
    match view {
        View::Binomial => {
            let s = session.binomial().series();
            let pts = |ys: &[f64]| -> Vec<(f64, f64)> {
                s.k.iter().zip(ys).map(|(&k, &y)| (f64::from(k), y)).collect()
            };
            let k_max = s.k.last().copied().unwrap_or(1).max(1);
            ChartData {
                lines: vec![(pts(&s.cdf), CYAN), (pts(&s.pmf), YELLOW)],
                markers: Vec::new(),
                x_bounds: [0.0, f64::from(k_max)],
                y_bounds: [0.0, 1.05],
                x_label: "failures k",
                y_label: "probability",
            }
        }
        View::Weibull => {
            let s = session.weibull().series();
            let ys = weibull_fn.values(s);
            let points: Vec<(f64, f64)> = s.t.iter().copied().zip(ys.iter().copied()).collect();
            let x_bounds = match (s.t.first(), s.t.last()) {
                (Some(&a), Some(&b)) if b > a => [a, b],
                _ => [0.0, 1.0],
            };
            ChartData {
                lines: vec![(points, CYAN)],
                markers: Vec::new(),
                x_bounds,
                y_bounds: padded_bounds(ys),
                x_label: "t",
                y_label: weibull_fn.label(),
            }
        }
        View::Oc => {
            let curve = session.oc();
            let limits = curve.limits();
            let points: Vec<(f64, f64)> = curve
                .p()
                .iter()
                .zip(curve.accept())
                .filter(|&(&p, _)| p <= window.x_max)
                .map(|(&p, &a)| (p, a.min(window.y_max)))
                .collect();
            ChartData {
                lines: vec![(points, CYAN)],
                markers: vec![
                    ChartMarker { x: limits.aql, color: GREEN },
                    ChartMarker { x: limits.rql, color: RED },
                ],
                x_bounds: [0.0, window.x_max],
                y_bounds: [0.0, window.y_max],
                x_label: "lot defect rate p",
                y_label: "P(accept)",
            }
        }
    }
}

fn padded_bounds(ys: &[f64]) -> [f64; 2] {
    let (mut lo, mut hi) = ys
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if hi - lo < 1e-9 {
        lo -= 0.5;
        hi += 0.5;
    }
    let pad = (hi - lo) * 0.05;
    [lo - pad, hi + pad]
}

fn fmt_axis(v: f64) -> String {
    if v.abs() < 1.0 {
        format!("{v:.3}")
    } else {
        format!("{v:.1}")
    }
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

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
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
    data: &ChartData,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);
    let [x0, x1] = data.x_bounds;
    let [y0, y1] = data.y_bounds;

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = fmt_axis(x0 + u * (x1 - x0));
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        let width = label.len() as u16;
        frame.render_widget(Paragraph::new(label).style(style), Rect { x: start, y, width, height: 1 });
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = fmt_axis(y0 + u * (y1 - y0));
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        let width = label.len() as u16;
        frame.render_widget(Paragraph::new(label).style(style), Rect { x: start, y, width, height: 1 });
    }

    let x_label = Paragraph::new(data.x_label)
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

    let y_label = Paragraph::new(data.y_label)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1) + insets.right,
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(&Settings::default()).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn edit_flow_updates_model_and_status() {
        let mut app = app();
        app.handle_key(KeyCode::Down); // sample size
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.input.as_deref(), Some("100"));

        for _ in 0..3 {
            app.handle_key(KeyCode::Backspace);
        }
        type_text(&mut app, "40");
        app.handle_key(KeyCode::Enter);

        assert!(app.input.is_none());
        assert_eq!(app.session.binomial().sample_size(), 40);
        assert!(!app.feed.is_error);
        assert!(app.feed.status.starts_with("Binomial n=40"), "{}", app.feed.status);
    }

    #[test]
    fn rejected_edit_shows_error_and_keeps_data() {
        let mut app = app();
        app.handle_key(KeyCode::Enter); // probability of failure
        app.input = Some(String::new());
        type_text(&mut app, "1.5");
        app.handle_key(KeyCode::Enter);

        assert!(app.feed.is_error);
        assert!(app.feed.status.contains("probability of failure"));
        assert_eq!(app.session.binomial().p_fail(), 0.05);
    }

    #[test]
    fn escape_cancels_edit() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        type_text(&mut app, "9");
        app.handle_key(KeyCode::Esc);
        assert!(app.input.is_none());
        assert_eq!(app.session.binomial().p_fail(), 0.05);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn tab_cycles_views_and_resets_selection() {
        let mut app = app();
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.view, View::Weibull);
        assert_eq!(app.selected_field, 0);
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.view, View::Oc);
        app.handle_key(KeyCode::BackTab);
        assert_eq!(app.view, View::Weibull);
    }

    #[test]
    fn selection_stays_in_range() {
        let mut app = app();
        app.switch_view(View::Oc);
        for _ in 0..20 {
            app.handle_key(KeyCode::Down);
        }
        assert_eq!(app.current_field(), Field::OcRql);
        for _ in 0..20 {
            app.handle_key(KeyCode::Up);
        }
        assert_eq!(app.current_field(), Field::OcSampleSize);
    }

    #[test]
    fn weibull_function_key_cycles() {
        let mut app = app();
        app.handle_key(KeyCode::Char('f'));
        assert_eq!(app.weibull_fn, WeibullFunction::Cdf);
        app.switch_view(View::Weibull);
        app.handle_key(KeyCode::Char('f'));
        assert_eq!(app.weibull_fn, WeibullFunction::Pdf);
    }

    #[test]
    fn oc_window_keys_clamp() {
        let mut app = app();
        app.switch_view(View::Oc);
        for _ in 0..50 {
            app.handle_key(KeyCode::Char('X'));
            app.handle_key(KeyCode::Char('y'));
        }
        assert_eq!(app.oc_window.x_max, WINDOW_MAX);
        assert_eq!(app.oc_window.y_max, WINDOW_MIN);
    }

    #[test]
    fn oc_chart_data_respects_window() {
        let session = Session::new(&Settings::default()).unwrap();
        let data = chart_data(&session, View::Oc, WeibullFunction::Cdf, OcWindow::default());
        let points = &data.lines[0].0;
        assert_eq!(points.len(), 101);
        assert!(points.iter().all(|&(p, a)| p <= 0.1 && a <= 1.0));
        assert_eq!(data.markers.len(), 2);
        assert_eq!(data.x_bounds, [0.0, 0.1]);
    }
}
