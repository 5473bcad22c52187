//! Chart Plotter Module
//! Draws the declarative map and bar chart specs with egui_plot.

use crate::charts::spec::{BarChartSpec, DeckSpec};
use crate::stats::SummaryStats;
use egui::{Color32, RichText, Stroke};
use egui_plot::{Bar, BarChart, Plot, PlotPoints, Points, Polygon};
use polars::prelude::DataFrame;

/// Bar fill for histograms and category charts
pub const BAR_COLOR: Color32 = Color32::from_rgb(70, 130, 180); // Steel blue
pub const REGION_STROKE: Color32 = Color32::from_rgb(120, 120, 120);

fn rgba(color: [u8; 4]) -> Color32 {
    Color32::from_rgba_unmultiplied(color[0], color[1], color[2], color[3])
}

/// Creates the dashboard visualizations using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Screen radius for a column of the given elevation.
    pub fn column_radius(elevation: f64) -> f32 {
        (2.0 + elevation as f32 * 1.5).min(14.0)
    }

    /// Top-down map: region polygons shaded by hires, location columns sized
    /// by elevation. Hovering shows the tooltip text of the item.
    pub fn draw_map(ui: &mut egui::Ui, deck: &DeckSpec, height: f32) {
        let view = deck.initial_view_state;
        let [lon_min, lon_max] = view.longitude_range();
        let [lat_min, lat_max] = view.latitude_range();

        Plot::new("oyatoi_map")
            .height(height)
            .data_aspect(1.0)
            .include_x(lon_min)
            .include_x(lon_max)
            .include_y(lat_min)
            .include_y(lat_max)
            .allow_scroll(false)
            .show_grid(false)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .label_formatter(|name, _value| name.to_string())
            .show(ui, |plot_ui| {
                if let Some(regions) = deck.region_layer() {
                    for shape in &regions.shapes {
                        let name = shape.tooltip();
                        for ring in &shape.polygons {
                            let points: PlotPoints = ring.iter().map(|p| [p[0], p[1]]).collect();
                            plot_ui.polygon(
                                Polygon::new(points)
                                    .fill_color(rgba(shape.fill_color))
                                    .stroke(Stroke::new(0.5, REGION_STROKE))
                                    .name(&name),
                            );
                        }
                    }
                }

                if let Some(columns) = deck.column_layer() {
                    for datum in &columns.data {
                        plot_ui.points(
                            Points::new(vec![datum.position])
                                .radius(Self::column_radius(datum.elevation))
                                .color(rgba(datum.fill_color))
                                .name(datum.tooltip()),
                        );
                    }
                }
            });
    }

    /// Draw a bar chart; category labels replace numeric x ticks when present.
    pub fn draw_bar_chart(ui: &mut egui::Ui, spec: &BarChartSpec, height: f32) {
        let labels: Vec<Option<String>> = spec.bars.iter().map(|b| b.label.clone()).collect();
        let categorical = labels.iter().any(Option::is_some);

        let bars: Vec<Bar> = spec
            .bars
            .iter()
            .map(|b| {
                let name = b.label.clone().unwrap_or_else(|| format!("{:.2}", b.x));
                // Histogram bars are anchored at their bin's left edge.
                let center = if categorical {
                    b.x
                } else {
                    b.x + spec.bar_width / 2.0
                };
                Bar::new(center, b.value)
                    .width(spec.bar_width)
                    .name(name)
                    .fill(BAR_COLOR)
            })
            .collect();

        ui.label(RichText::new(&spec.title).size(14.0).strong());

        let mut plot = Plot::new(format!("bars_{}", spec.title))
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .y_axis_label(spec.y_label.clone());

        if categorical {
            plot = plot.x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx < 0.0 || (mark.value - idx).abs() > 1e-6 {
                    return String::new();
                }
                labels
                    .get(idx as usize)
                    .and_then(|l| l.clone())
                    .unwrap_or_default()
            });
        } else {
            plot = plot.x_axis_label(spec.x_label.clone());
        }

        plot.show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name(&spec.title));
        });
    }

    /// Mean and "standard error" lines under a histogram.
    pub fn draw_summary(ui: &mut egui::Ui, title: &str, unit: &str, summary: Option<&SummaryStats>) {
        match summary {
            Some(stats) => {
                ui.label(format!("Average {}: {:.2} {}", title, stats.mean, unit));
                ui.label(format!("Standard error: {:.2}", stats.standard_error()));
                ui.label(
                    RichText::new(format!("n = {}", stats.count))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            }
            None => {
                ui.label(RichText::new(format!("No valid {} values", title)).color(Color32::GRAY));
            }
        }
    }

    /// Raw table rows in a striped grid.
    pub fn draw_raw_table(ui: &mut egui::Ui, df: &DataFrame) {
        egui::ScrollArea::both()
            .id_salt("raw_data")
            .max_height(400.0)
            .show(ui, |ui| {
                egui::Grid::new("raw_data_grid")
                    .striped(true)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for name in df.get_column_names() {
                            ui.label(RichText::new(name.as_str()).strong().size(11.0));
                        }
                        ui.end_row();

                        let columns = df.get_columns();
                        for row in 0..df.height() {
                            for column in columns {
                                let text = column
                                    .get(row)
                                    .ok()
                                    .filter(|v| !v.is_null())
                                    .map(|v| v.to_string().trim_matches('"').to_string())
                                    .unwrap_or_default();
                                ui.label(RichText::new(text).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_radius_grows_with_elevation_and_caps() {
        assert!(ChartPlotter::column_radius(1.0) < ChartPlotter::column_radius(3.0));
        assert_eq!(ChartPlotter::column_radius(100.0), 14.0);
    }

    #[test]
    fn rgba_keeps_channels() {
        assert_eq!(
            rgba([255, 100, 100, 255]),
            Color32::from_rgb(255, 100, 100)
        );
    }
}
