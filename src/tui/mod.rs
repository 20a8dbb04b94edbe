//! Ratatui-based terminal UI.
//!
//! The TUI charts the observed series with every fit's projection overlaid,
//! lists fit diagnostics in a legend panel, and lets the user change the
//! horizon, preset, and dataset without leaving the terminal.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::pipeline::RunOutput;
use crate::cli::FitArgs;
use crate::domain::{DatasetKind, RunConfig};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::{CasePlottersChart, FitLine};

/// Longest horizon reachable with the arrow keys.
const MAX_HORIZON: usize = 60;

/// High-contrast palette for fits, shared by chart lines and legend swatches.
const FIT_COLORS: [(u8, u8, u8); 6] = [
    (0, 255, 255),
    (255, 200, 0),
    (255, 0, 255),
    (0, 255, 0),
    (255, 100, 100),
    (120, 160, 255),
];

/// Start the TUI.
pub fn run(args: FitArgs) -> Result<(), AppError> {
    let mut app = App::new(crate::app::run_config_from_args(&args));

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

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

struct App {
    config: RunConfig,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(config: RunConfig) -> Self {
        let mut app = Self {
            config,
            status: String::new(),
            run: None,
        };
        app.refit();
        app
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

    /// Apply a key press. Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => {
                if self.config.days_to_predict > 0 {
                    self.config.days_to_predict -= 1;
                    self.refit();
                }
            }
            KeyCode::Right => {
                if self.config.days_to_predict < MAX_HORIZON {
                    self.config.days_to_predict += 1;
                    self.refit();
                }
            }
            KeyCode::Char('p') => {
                self.config.preset = self.config.preset.next();
                self.refit();
            }
            KeyCode::Char('d') => {
                self.config.dataset = self.config.dataset.next();
                self.refit();
            }
            KeyCode::Char('r') => {
                if self.config.dataset == DatasetKind::Synthetic {
                    self.config.seed = self.config.seed.wrapping_add(1);
                    self.refit();
                } else {
                    self.status = "Reseeding only applies to synthetic data.".to_string();
                }
            }
            _ => {}
        }
        false
    }

    fn refit(&mut self) {
        match crate::app::pipeline::run(&self.config) {
            Ok(run) => {
                let failed = run.failures().count();
                self.status = if failed == 0 {
                    format!("{} fit(s) ok", run.outcomes.len())
                } else {
                    format!("{failed} of {} fit(s) failed", run.outcomes.len())
                };
                self.run = Some(run);
            }
            Err(err) => {
                self.status = err.to_string();
                self.run = None;
            }
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
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("curves", Style::default().fg(Color::Cyan)),
            Span::raw(" - case curve projections"),
        ]));

        let series_info = self
            .run
            .as_ref()
            .map(|r| {
                let s = &r.analysis.series;
                format!(
                    "{} .. {} (n={})",
                    s.start_date(),
                    s.date_at(s.len().saturating_sub(1)),
                    s.len()
                )
            })
            .unwrap_or_else(|| "-".to_string());

        let seed = if self.config.dataset == DatasetKind::Synthetic {
            format!(" | seed: {}", self.config.seed)
        } else {
            String::new()
        };

        lines.push(Line::from(Span::styled(
            format!(
                "dataset: {} | preset: {} | horizon: {} day(s) | {series_info}{seed}",
                self.config.dataset.display_name(),
                self.config.preset.display_name(),
                self.config.days_to_predict,
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(44)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_legend(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Projections").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No data.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let data = chart_series(run);
        let start = run.analysis.series.start_date();
        let fmt_x = move |v: f64| fmt_axis_date(start, v);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = CasePlottersChart {
            observed: &data.observed,
            fits: &data.fits,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: "date",
            y_label: "cases",
            fmt_x: &fmt_x,
            fmt_y: fmt_axis_y,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, start, data.x_bounds, data.y_bounds);
        }
    }

    fn draw_legend(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = vec![Line::from(vec![
            Span::styled("━━ ", Style::default().fg(Color::White)),
            Span::raw("observed"),
        ])];

        if let Some(run) = &self.run {
            let mut color_idx = 0usize;
            for outcome in &run.outcomes {
                match &outcome.result {
                    Ok(fitted) => {
                        let (r, g, b) = FIT_COLORS[color_idx % FIT_COLORS.len()];
                        color_idx += 1;
                        lines.push(Line::from(vec![
                            Span::styled("╌╌ ", Style::default().fg(Color::Rgb(r, g, b))),
                            Span::styled(
                                outcome.spec.label.clone(),
                                Style::default().add_modifier(Modifier::BOLD),
                            ),
                        ]));
                        let last = fitted.projection.points.last().map(|p| p.value).unwrap_or(f64::NAN);
                        lines.push(Line::from(Span::styled(
                            format!(
                                "   rmse={:.2} bic={:.2} end={:.0}",
                                fitted.fit.quality.rmse, fitted.fit.quality.bic, last
                            ),
                            Style::default().fg(Color::Gray),
                        )));
                    }
                    Err(err) => {
                        lines.push(Line::from(Span::styled(
                            format!("✗  {}", outcome.spec.label),
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                        )));
                        lines.push(Line::from(Span::styled(
                            format!("   {err}"),
                            Style::default().fg(Color::Red),
                        )));
                    }
                }
            }
        }

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Fits").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ horizon  p preset  d dataset  r reseed  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart-ready series and bounds for one run.
struct ChartData {
    observed: Vec<(f64, f64)>,
    fits: Vec<FitLine>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(run: &RunOutput) -> ChartData {
    let observed: Vec<(f64, f64)> = run
        .analysis
        .series
        .values()
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();

    let fits: Vec<FitLine> = run
        .successes()
        .enumerate()
        .map(|(i, (_, fitted))| FitLine {
            color: FIT_COLORS[i % FIT_COLORS.len()],
            points: fitted
                .series_points()
                .into_iter()
                .filter(|(_, y)| y.is_finite())
                .collect(),
        })
        .collect();

    let all = || observed.iter().chain(fits.iter().flat_map(|f| f.points.iter()));

    let x_max = all().map(|p| p.0).fold(0.0_f64, f64::max);
    let x_bounds = if x_max > 0.0 { [0.0, x_max] } else { [0.0, 1.0] };

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in all() {
        if y.is_finite() {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    ChartData {
        observed,
        fits,
        x_bounds,
        y_bounds,
    }
}

/// Day offsets that get a date label: every 7th day inside the bounds.
fn weekly_ticks(x_bounds: [f64; 2]) -> Vec<usize> {
    let first = x_bounds[0].max(0.0).ceil() as usize;
    let last = x_bounds[1].max(0.0).floor() as usize;
    let first_week = first.div_ceil(7) * 7;
    (first_week..=last).step_by(7).collect()
}

fn fmt_axis_date(start: chrono::NaiveDate, offset: f64) -> String {
    if !offset.is_finite() || offset < 0.0 {
        return String::new();
    }
    start
        .checked_add_days(chrono::Days::new(offset.round() as u64))
        .map(|d| d.format("%m-%d").to_string())
        .unwrap_or_default()
}

fn fmt_axis_y(v: f64) -> String {
    format!("{v:.0}")
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
    start: chrono::NaiveDate,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let style = Style::default().fg(Color::Gray);

    // Weekly date labels; skip any that would overlap the previous one.
    let mut next_free = 0u16;
    for day in weekly_ticks(x_bounds) {
        let u = (day as f64 - x_bounds[0]) / (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_date(start, day as f64);
        let label_len = label.len() as u16;
        let begin = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 || begin < next_free || begin + label_len > inner.x + inner.width {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: begin,
                y,
                width: label_len,
                height: 1,
            },
        );
        next_free = begin + label_len + 1;
    }

    let ticks = 5usize;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_y(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let begin = x.saturating_sub(label_len);
        if begin < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: begin,
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

    let y_label = Paragraph::new("cases")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Preset;
    use chrono::NaiveDate;

    fn config() -> RunConfig {
        RunConfig {
            dataset: DatasetKind::Confirmed,
            preset: Preset::InitialRun,
            days_to_predict: 3,
            max_evaluations: 5000,
            strict: false,
            synthetic_days: 40,
            synthetic_noise: 0.05,
            seed: 42,
            plot: false,
            plot_width: 60,
            plot_height: 15,
            export_csv: None,
            export_json: None,
        }
    }

    #[test]
    fn weekly_ticks_are_multiples_of_seven() {
        assert_eq!(weekly_ticks([0.0, 29.0]), vec![0, 7, 14, 21, 28]);
        assert_eq!(weekly_ticks([3.0, 13.0]), vec![7]);
    }

    #[test]
    fn axis_dates_are_month_day() {
        let start = NaiveDate::from_ymd_opt(2020, 3, 8).unwrap();
        assert_eq!(fmt_axis_date(start, 0.0), "03-08");
        assert_eq!(fmt_axis_date(start, 24.0), "04-01");
        assert_eq!(fmt_axis_date(start, -1.0), "");
    }

    #[test]
    fn chart_bounds_cover_projection_horizon() {
        let app = App::new(config());
        let run = app.run.as_ref().unwrap();
        let data = chart_series(run);
        assert_eq!(data.fits.len(), 3);
        let colors: Vec<_> = data.fits.iter().map(|f| f.color).collect();
        assert_eq!(colors, FIT_COLORS[..3].to_vec());
        assert_eq!(data.x_bounds, [0.0, 29.0]);
        assert!(data.y_bounds[0] < 1.0 && data.y_bounds[1] > 724.0);
    }

    #[test]
    fn keys_adjust_settings_and_refit() {
        let mut app = App::new(config());
        assert!(!app.handle_key(KeyCode::Right));
        assert_eq!(app.config.days_to_predict, 4);
        let run = app.run.as_ref().unwrap();
        assert_eq!(run.analysis.days_to_predict, 4);

        for _ in 0..10 {
            app.handle_key(KeyCode::Left);
        }
        assert_eq!(app.config.days_to_predict, 0);

        app.handle_key(KeyCode::Char('p'));
        assert_eq!(app.config.preset, Preset::AllData);

        app.handle_key(KeyCode::Char('r'));
        assert_eq!(app.config.seed, 42);

        app.handle_key(KeyCode::Char('d'));
        assert_eq!(app.config.dataset, DatasetKind::Revised);
        app.handle_key(KeyCode::Char('d'));
        assert_eq!(app.config.dataset, DatasetKind::Synthetic);
        app.handle_key(KeyCode::Char('r'));
        assert_eq!(app.config.seed, 43);
        assert!(app.run.is_some());

        assert!(app.handle_key(KeyCode::Char('q')));
    }
}
