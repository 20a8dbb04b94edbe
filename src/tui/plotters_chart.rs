//! Plotters-powered projection chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - dashed line series for the fitted projections
//! - easy to extend later (annotations, exportable PNG/SVG backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One projected fit, ready to draw. Its label lives in the legend panel.
#[derive(Debug, Clone)]
pub struct FitLine {
    pub color: (u8, u8, u8),
    /// (series day offset, value); non-finite values already removed.
    pub points: Vec<(f64, f64)>,
}

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are computed
/// outside the render call. This keeps `render()` focused on drawing.
pub struct CasePlottersChart<'a> {
    /// Observed cumulative series (day offset, value).
    pub observed: &'a [(f64, f64)],
    /// One dashed line per successful fit.
    pub fits: &'a [FitLine],
    /// X bounds (day offsets from the series start).
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Axis labels (kept simple for terminal rendering).
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// Formatting of tick labels. The x formatter maps a day offset to a date.
    pub fmt_x: &'a dyn Fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for CasePlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are drawn by hand below: one per day, brighter on weeks.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let day_color = RGBColor(45, 45, 45);
            let week_color = RGBColor(100, 100, 100);
            let first_day = x0.ceil() as i64;
            let last_day = x1.floor() as i64;
            for day in first_day..=last_day {
                let color = if day % 7 == 0 { week_color } else { day_color };
                let x = day as f64;
                chart.draw_series(LineSeries::new([(x, y0), (x, y1)], &color))?;
            }

            // Observed data: solid white.
            chart.draw_series(LineSeries::new(self.observed.iter().copied(), &WHITE))?;

            // Fits: dashed, one color each.
            for fit in self.fits {
                let (r, g, b) = fit.color;
                let style = ShapeStyle::from(RGBColor(r, g, b)).stroke_width(1);
                chart.draw_series(DashedLineSeries::new(fit.points.iter().copied(), 2, 2, style))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
