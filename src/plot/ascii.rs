//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - primary series: `-` line
//! - comparison series: `=` line

use crate::domain::ChartData;

/// Render the chart point sequence as a fixed-grid plot.
pub fn render_ascii_plot(chart: &ChartData, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let series: Vec<Vec<(f64, f64)>> = (0..chart.labels.len())
        .map(|i| chart.series_xy(i))
        .collect();

    let Some((x_min, x_max)) = x_range(&series) else {
        return "Plot: no data\n".to_string();
    };
    let (y_min, y_max) = y_range(&series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the comparison first so the primary overlays on collisions.
    let glyphs = ['-', '='];
    for (i, points) in series.iter().enumerate().rev() {
        draw_series(
            &mut grid,
            points,
            x_min,
            x_max,
            y_min,
            y_max,
            glyphs[i.min(glyphs.len() - 1)],
        );
    }

    let first = chart.points.first().map(|p| p.label.as_str()).unwrap_or("-");
    let last = chart.points.last().map(|p| p.label.as_str()).unwrap_or("-");

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | dates=[{first}, {last}] | y=[{y_min:.1}, {y_max:.1}]\n",
        chart.labels.join(" vs ")
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn x_range(series: &[Vec<(f64, f64)>]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for points in series {
        for &(x, _) in points {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
        }
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(series: &[Vec<(f64, f64)>]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for points in series {
        for &(_, y) in points {
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

fn draw_series(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in points {
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        if let Some((px, py)) = prev {
            draw_line(grid, px, py, cx, cy, ch);
        } else {
            grid[cy][cx] = ch;
        }
        prev = Some((cx, cy));
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
    use crate::domain::{date_label, ChartPoint};
    use chrono::NaiveDate;

    fn point(day: u32, value: u64) -> ChartPoint {
        let date = NaiveDate::from_ymd_opt(2020, 1, day).unwrap();
        ChartPoint {
            date,
            label: date_label(date),
            values: vec![Some(value)],
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let chart = ChartData {
            labels: vec!["confirmed in US".to_string()],
            points: vec![point(22, 0), point(23, 5), point(24, 10), point(25, 15)],
        };

        let txt = render_ascii_plot(&chart, 10, 5);
        let expected = concat!(
            "Plot: confirmed in US | dates=[1/22, 1/25] | y=[-0.8, 15.8]\n",
            "        --\n",
            "      --  \n",
            "    --    \n",
            "  --      \n",
            "--        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_chart_renders_placeholder() {
        let chart = ChartData::default();
        assert_eq!(render_ascii_plot(&chart, 10, 5), "Plot: no data\n");
    }
}
