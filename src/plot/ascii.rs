//! ASCII plotting for terminal output.
//!
//! Deliberately a fixed-size character grid: quick visual checks in a terminal
//! and deterministic output for golden tests.
//!
//! Each series is drawn as a connected line with its own glyph; vertical
//! markers (AQL, RQL) are drawn as columns of their glyph underneath.

use crate::domain::CurveFile;

/// One line on the plot.
#[derive(Debug, Clone)]
pub struct PlotSeries {
    pub label: String,
    pub glyph: char,
    pub points: Vec<(f64, f64)>,
}

impl PlotSeries {
    pub fn new(label: impl Into<String>, glyph: char, xs: &[f64], ys: &[f64]) -> Self {
        Self {
            label: label.into(),
            glyph,
            points: xs.iter().copied().zip(ys.iter().copied()).collect(),
        }
    }
}

/// A vertical line at `x`.
#[derive(Debug, Clone, Copy)]
pub struct VerticalMarker {
    pub x: f64,
    pub glyph: char,
}

const GLYPHS: [char; 4] = ['-', '*', '+', '#'];

/// Plot every column of a saved curve file against its `x` column.
pub fn render_curve_file(curve: &CurveFile, width: usize, height: usize) -> String {
    let series: Vec<PlotSeries> = curve
        .series
        .iter()
        .enumerate()
        .map(|(i, col)| PlotSeries::new(&col.name, GLYPHS[i % GLYPHS.len()], &curve.x.values, &col.values))
        .collect();

    let mut out = format!("{} ({})\n", curve.kind.display_name(), curve.generated_at.to_rfc3339());
    out.push_str(&render_plot(&curve.x.name, &series, &[], width, height));
    out
}

pub fn render_plot(
    x_label: &str,
    series: &[PlotSeries],
    markers: &[VerticalMarker],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all = || series.iter().flat_map(|s| s.points.iter());
    let (x_min, x_max) = span(all().map(|&(x, _)| x)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = span(all().map(|&(_, y)| y)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for m in markers {
        if m.x < x_min || m.x > x_max {
            continue;
        }
        let col = map_x(m.x, x_min, x_max, width);
        for row in grid.iter_mut() {
            row[col] = m.glyph;
        }
    }

    for s in series {
        draw_series(&mut grid, &s.points, s.glyph, (x_min, x_max), (y_min, y_max));
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {x_label}=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.3}, {y_max:.3}]\n"
    ));
    if !series.is_empty() {
        let legend: Vec<String> = series.iter().map(|s| format!("{} {}", s.glyph, s.label)).collect();
        out.push_str(&format!("Legend: {}\n", legend.join("  ")));
    }

    for row in grid {
        let line: String = row.into_iter().collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo.is_finite() && hi.is_finite() && hi > lo {
        Some((lo, hi))
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
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    glyph: char,
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in points.iter().filter(|(x, y)| x.is_finite() && y.is_finite()) {
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, (x0, y0), (cx, cy), glyph),
            None => grid[cy][cx] = glyph,
        }
        prev = Some((cx, cy));
    }
}

/// Integer line drawing (Bresenham). Series overwrite markers but not each other.
fn draw_line(grid: &mut [Vec<char>], (x0, y0): (usize, usize), (x1, y1): (usize, usize), ch: char) {
    let (mut x, mut y) = (x0 as isize, y0 as isize);
    let (x1, y1) = (x1 as isize, y1 as isize);

    let dx = (x1 - x).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let dy = -(y1 - y).abs();
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        let cell = &mut grid[y as usize][x as usize];
        if !GLYPHS.contains(cell) || *cell == ch {
            *cell = ch;
        }

        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
