//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - predicted line: `-`
//! - upper error line: `^`
//! - lower error line: `v`

use crate::domain::FitLines;

/// Render projected lines and the observed points on a `width × height` grid.
pub fn render_lines_plot(lines: &FitLines, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(&lines.abscissa).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(lines).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Lines are straight, so the extreme abscissa values are enough. The
    // predicted line goes first so it wins where the band collapses onto it.
    let series = [
        (&lines.predicted, '-'),
        (&lines.upper, '^'),
        (&lines.lower, 'v'),
    ];
    for (values, ch) in series {
        if let Some(((x0, y0), (x1, y1))) = endpoints(&lines.abscissa, values) {
            draw_line(
                &mut grid,
                map_x(x0, x_min, x_max, width),
                map_y(y0, y_min, y_max, height),
                map_x(x1, x_min, x_max, width),
                map_y(y1, y_min, y_max, height),
                ch,
            );
        }
    }

    for (&x, &y) in lines.abscissa.iter().zip(&lines.ordinates) {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.3}, {y_max:.3}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn x_range(abscissa: &[f64]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &x in abscissa {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(lines: &FitLines) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let all = [
        &lines.ordinates,
        &lines.predicted,
        &lines.upper,
        &lines.lower,
    ];
    for &y in all.iter().flat_map(|s| s.iter()) {
        if y.is_finite() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

/// Points of `values` at the smallest and largest abscissa.
fn endpoints(abscissa: &[f64], values: &[f64]) -> Option<((f64, f64), (f64, f64))> {
    let pairs = || {
        abscissa
            .iter()
            .zip(values)
            .map(|(&x, &y)| (x, y))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
    };
    let first = pairs().min_by(|a, b| a.0.total_cmp(&b.0))?;
    let last = pairs().max_by(|a, b| a.0.total_cmp(&b.0))?;
    Some((first, last))
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

/// Integer line drawing (Bresenham-ish). Only fills empty cells.
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
