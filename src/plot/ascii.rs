//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - one projected curve per fit, each with its own glyph (see legend)

use crate::app::pipeline::RunOutput;
use crate::domain::FitsFile;

/// Curve glyphs, assigned to fits in order.
const FIT_GLYPHS: [char; 5] = ['*', '+', 'x', '#', '%'];

/// Render a plot for an in-memory run.
pub fn render_ascii_plot(run: &RunOutput, width: usize, height: usize) -> String {
    let observed = observed_points(run.analysis.series.values());
    let curves: Vec<(String, Vec<(f64, f64)>)> = run
        .successes()
        .map(|(spec, fitted)| (spec.label.clone(), fitted.series_points()))
        .collect();

    render_plot(&observed, &curves, width, height)
}

/// Render a plot from a saved fits JSON file.
pub fn render_ascii_plot_from_fits_file(fits: &FitsFile, width: usize, height: usize) -> String {
    let observed = observed_points(&fits.observed);
    let curves: Vec<(String, Vec<(f64, f64)>)> = fits
        .fits
        .iter()
        .map(|f| {
            let pts = f
                .values
                .iter()
                .enumerate()
                .map(|(i, v)| ((f.window.start + i) as f64, v.unwrap_or(f64::NAN)))
                .collect();
            (f.label.clone(), pts)
        })
        .collect();

    render_plot(&observed, &curves, width, height)
}

fn observed_points(values: &[f64]) -> Vec<(f64, f64)> {
    values.iter().enumerate().map(|(i, &v)| (i as f64, v)).collect()
}

fn render_plot(
    observed: &[(f64, f64)],
    curves: &[(String, Vec<(f64, f64)>)],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all = || observed.iter().chain(curves.iter().flat_map(|(_, pts)| pts.iter()));
    let (x_min, x_max) = range(all().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(all().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curves first (so points can overlay).
    for (i, (_, pts)) in curves.iter().enumerate() {
        let glyph = FIT_GLYPHS[i % FIT_GLYPHS.len()];
        draw_curve(&mut grid, pts, (x_min, x_max), (y_min, y_max), glyph);
    }

    for &(x, y) in observed {
        if !y.is_finite() {
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    // Build final string. We include a small header with ranges and a legend.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: day=[{x_min:.0}, {x_max:.0}] | cases=[{y_min:.1}, {y_max:.1}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out.push_str("o observed\n");
    for (i, (label, _)) in curves.iter().enumerate() {
        out.push_str(&format!("{} {label}\n", FIT_GLYPHS[i % FIT_GLYPHS.len()]));
    }

    out
}

/// Finite min/max of `values`, `None` if empty or degenerate.
fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
    glyph: char,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        // Undefined values (log model outside its domain) break the line.
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, glyph),
            None if grid[row][col] == ' ' => grid[row][col] = glyph,
            None => {}
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        let observed = vec![(0.0, 0.0), (3.0, 30.0)];
        let curves = vec![(
            "line".to_string(),
            vec![(0.0, 0.0), (1.0, 10.0), (2.0, 20.0), (3.0, 30.0)],
        )];

        let txt = render_plot(&observed, &curves, 10, 5);
        let expected = concat!(
            "Plot: day=[0, 3] | cases=[-1.5, 31.5]\n",
            "        *o\n",
            "      **  \n",
            "    **    \n",
            "  **      \n",
            "o*        \n",
            "o observed\n",
            "* line\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn non_finite_values_are_skipped() {
        let curves = vec![(
            "log".to_string(),
            vec![(0.0, f64::NAN), (1.0, 1.0), (2.0, 2.0)],
        )];
        let txt = render_plot(&[], &curves, 10, 5);
        assert!(txt.starts_with("Plot: day=[0, 2]"));
        assert!(!txt.contains("NaN"));
    }

    #[test]
    fn fits_get_distinct_glyphs() {
        let curves = vec![
            ("a".to_string(), vec![(0.0, 0.0), (1.0, 1.0)]),
            ("b".to_string(), vec![(0.0, 1.0), (1.0, 0.0)]),
        ];
        let txt = render_plot(&[], &curves, 12, 6);
        assert!(txt.ends_with("* a\n+ b\n"));
        assert!(txt.contains('+'));
    }
}
