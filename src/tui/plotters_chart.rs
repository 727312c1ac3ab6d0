//! Plotters-powered curve chart widget for Ratatui.
//!
//! Plotters gives axis and mesh rendering with little manual tick work; its
//! output lands in the Ratatui buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One line series and its colour.
pub struct ChartLine<'a> {
    pub points: &'a [(f64, f64)],
    pub color: RGBColor,
}

/// A vertical rule across the full y range.
#[derive(Debug, Clone, Copy)]
pub struct ChartMarker {
    pub x: f64,
    pub color: RGBColor,
}

/// A render-only chart description.
///
/// All series and bounds are computed before the render call, so `render()`
/// only draws. Points are expected to lie inside the bounds already.
pub struct CurvePlottersChart<'a> {
    pub lines: &'a [ChartLine<'a>],
    pub markers: &'a [ChartMarker],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for CurvePlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters can fail to lay out a chart this small; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
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

            for m in self.markers {
                if m.x < x0 || m.x > x1 {
                    continue;
                }
                chart.draw_series(LineSeries::new([(m.x, y0), (m.x, y1)], &m.color))?;
            }

            for line in self.lines {
                chart.draw_series(LineSeries::new(line.points.iter().copied(), &line.color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
