//! Plotters-powered trend chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - easy to extend later (legend, annotations, exportable PNG/SVG backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::NaiveDate;
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::date_label;

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are computed
/// outside the render call. This keeps `render()` focused on drawing and makes
/// it easy to test/benchmark the data prep separately.
pub struct TrendPlottersChart<'a> {
    /// Line series for the primary selection, as (day offset, count).
    pub primary: &'a [(f64, f64)],
    /// Optional comparison series.
    pub secondary: Option<&'a [(f64, f64)]>,
    /// X bounds (day offsets from `x_origin`).
    pub x_bounds: [f64; 2],
    /// Y bounds (counts).
    pub y_bounds: [f64; 2],
    /// Calendar date at x == 0, used to format x-axis ticks as dates.
    pub x_origin: NaiveDate,
}

impl<'a> Widget for TrendPlottersChart<'a> {
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

        let origin = self.x_origin;

        // `plotters-ratatui-backend` draws Plotters primitives via Ratatui's
        // `Canvas` widget, which ultimately writes to the terminal buffer.
        //
        // We delegate rendering to the crate-provided widget helper to avoid
        // coupling our code to its internal backend types.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                // Small margins keep the chart readable without wasting space.
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Axes + tick labels.
            //
            // We disable the mesh lines to reduce visual clutter in low-resolution
            // terminal rendering; the axes + labels are usually enough here.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("date")
                .y_desc("count")
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_tick_date(origin, *v))
                .y_label_formatter(&|v| fmt_count(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Series styling: keep the palette high-contrast for terminal readability.
            let primary_color = RGBColor(0, 255, 255); // cyan
            let secondary_color = RGBColor(255, 0, 255); // magenta

            chart.draw_series(LineSeries::new(self.primary.iter().copied(), &primary_color))?;

            if let Some(secondary) = self.secondary {
                chart.draw_series(LineSeries::new(secondary.iter().copied(), &secondary_color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Format an x tick as a calendar date relative to the chart origin.
pub fn fmt_tick_date(origin: NaiveDate, offset: f64) -> String {
    let days = offset.round() as i64;
    date_label(origin + chrono::Duration::days(days))
}

/// Compact count formatting for low-resolution axes.
pub fn fmt_count(v: f64) -> String {
    if v.abs() >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if v.abs() >= 10_000.0 {
        format!("{:.0}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_ticks_compact_large_values() {
        assert_eq!(fmt_count(950.0), "950");
        assert_eq!(fmt_count(25_000.0), "25k");
        assert_eq!(fmt_count(3_400_000.0), "3.4M");
    }

    #[test]
    fn date_ticks_offset_from_origin() {
        let origin = NaiveDate::from_ymd_opt(2020, 1, 23).unwrap();
        assert_eq!(fmt_tick_date(origin, 0.0), "1/23");
        assert_eq!(fmt_tick_date(origin, 9.2), "2/1");
    }
}
