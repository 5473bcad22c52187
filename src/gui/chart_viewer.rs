//! Chart Viewer Widget
//! Central panel laying out the map, histograms, breakdowns and raw data.

use crate::charts::ChartPlotter;
use crate::pipeline::DashboardViews;
use egui::{Color32, RichText, ScrollArea};
use polars::prelude::DataFrame;

const MAP_HEIGHT: f32 = 420.0;
const CHART_HEIGHT: f32 = 220.0;

/// Central panel showing the current dashboard views.
#[derive(Default)]
pub struct ChartViewer {
    pub views: Option<DashboardViews>,
    pub raw_data: Option<DataFrame>,
    pub error: Option<String>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.views = None;
        self.raw_data = None;
        self.error = None;
    }

    pub fn set_error(&mut self, error: String) {
        self.views = None;
        self.raw_data = None;
        self.error = Some(error);
    }

    /// Placeholder text when no views are available.
    pub fn placeholder(&self) -> String {
        match &self.error {
            Some(error) => format!("Failed to load data: {}", error),
            None => "Loading data...".to_string(),
        }
    }

    pub fn set_views(&mut self, views: DashboardViews, raw_data: Option<DataFrame>) {
        self.views = Some(views);
        self.raw_data = raw_data;
        self.error = None;
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(views) = &self.views else {
            let color = if self.error.is_some() {
                Color32::from_rgb(220, 80, 80)
            } else {
                Color32::GRAY
            };
            let text = self.placeholder();
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(text).size(18.0).color(color));
            });
            return;
        };

        ScrollArea::vertical().show(ui, |ui| {
            ui.heading("Hired Foreigners in Meiji Japan");
            ui.label(
                "Analyze the presence of hired foreigners in Japan during the Meiji era (1868-1912).",
            );
            ui.label(
                RichText::new(format!(
                    "{} of {} records, {} individuals",
                    views.filtered_rows, views.total_rows, views.unique_individuals
                ))
                .size(11.0)
                .color(Color32::GRAY),
            );
            ui.add_space(10.0);

            ChartPlotter::draw_map(ui, &views.deck, MAP_HEIGHT);
            ui.add_space(15.0);

            ChartPlotter::draw_bar_chart(ui, &views.hires_chart(), CHART_HEIGHT);
            ui.add_space(15.0);

            ChartPlotter::draw_bar_chart(ui, &views.duration_chart(), CHART_HEIGHT);
            ChartPlotter::draw_summary(
                ui,
                "employment duration",
                "days",
                views.duration_summary.as_ref(),
            );
            ui.add_space(15.0);

            ChartPlotter::draw_bar_chart(ui, &views.wage_chart(), CHART_HEIGHT);
            ChartPlotter::draw_summary(ui, "wage", "Yen", views.wage_summary.as_ref());
            ui.add_space(15.0);

            ui.columns(2, |columns| {
                ChartPlotter::draw_bar_chart(
                    &mut columns[0],
                    &views.nationality_chart(),
                    CHART_HEIGHT,
                );
                ChartPlotter::draw_bar_chart(&mut columns[1], &views.industry_chart(), CHART_HEIGHT);
            });

            if let Some(raw) = &self.raw_data {
                ui.add_space(15.0);
                ui.label(RichText::new("Raw Data").size(14.0).strong());
                ChartPlotter::draw_raw_table(ui, raw);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_failure_replaces_loading_placeholder() {
        let mut viewer = ChartViewer::new();
        assert_eq!(viewer.placeholder(), "Loading data...");

        viewer.set_error("S3 returned status 403".to_string());
        assert_eq!(
            viewer.placeholder(),
            "Failed to load data: S3 returned status 403"
        );

        viewer.clear();
        assert_eq!(viewer.placeholder(), "Loading data...");
    }
}
