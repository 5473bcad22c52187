//! Control Panel Widget
//! Left side panel with the data source status and the filter controls.

use crate::config::DisplayConfig;
use crate::data::{FilterParams, Industry};
use egui::{Color32, ComboBox, RichText};

/// User selections driving the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSettings {
    pub industry: Option<Industry>,
    pub duration_upper_limit: f64,
    pub show_raw_data: bool,
}

impl UserSettings {
    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            industry: self.industry,
            duration_upper_limit: self.duration_upper_limit,
        }
    }
}

/// Action requested by the control panel this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPanelAction {
    None,
    Reload,
    OpenLocalFolder,
}

/// Left side control panel with source selection and filter widgets.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub duration_slider_max: f64,
    pub source: String,
    pub status: String,
    pub row_summary: Option<String>,
    pub is_loading: bool,
}

impl ControlPanel {
    pub fn new(display: &DisplayConfig, source: String) -> Self {
        Self {
            settings: UserSettings {
                industry: None,
                duration_upper_limit: display.duration_upper_limit,
                show_raw_data: false,
            },
            duration_slider_max: display.duration_slider_max.max(display.duration_upper_limit),
            source,
            status: "Ready".to_string(),
            row_summary: None,
            is_loading: false,
        }
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("Hired Foreigners in Meiji Japan")
                    .size(18.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(RichText::new("1868 - 1912").size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&self.source).size(12.0));
                if let Some(summary) = &self.row_summary {
                    ui.label(RichText::new(summary).size(11.0).color(Color32::GRAY));
                }
                ui.horizontal(|ui| {
                    ui.add_enabled_ui(!self.is_loading, |ui| {
                        if ui.button("🔄 Reload").clicked() {
                            action = ControlPanelAction::Reload;
                        }
                        if ui.button("📂 Open local folder").clicked() {
                            action = ControlPanelAction::OpenLocalFolder;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filter Section =====
        ui.label(RichText::new("⚙️ Filters").size(14.0).strong());
        ui.add_space(5.0);

        ui.label("Industry:");
        let selected_text = self
            .settings
            .industry
            .map(|i| i.label().to_string())
            .unwrap_or_else(|| "All industries".to_string());
        ComboBox::from_id_salt("industry_combo")
            .selected_text(selected_text)
            .width(200.0)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.settings.industry, None, "All industries");
                for industry in Industry::ALL {
                    ui.selectable_value(
                        &mut self.settings.industry,
                        Some(industry),
                        industry.label(),
                    );
                }
            });

        ui.add_space(10.0);
        ui.label("Employment duration upper limit (days):");
        ui.add(
            egui::Slider::new(
                &mut self.settings.duration_upper_limit,
                1.0..=self.duration_slider_max,
            )
            .integer(),
        );

        ui.add_space(10.0);
        ui.checkbox(&mut self.settings.show_raw_data, "Show Raw Data");

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.horizontal(|ui| {
            if self.is_loading {
                ui.spinner();
            }
            ui.label(RichText::new(&self.status).size(12.0));
        });

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unfiltered_with_configured_limit() {
        let display = DisplayConfig {
            duration_upper_limit: 3650.0,
            duration_slider_max: 1000.0,
            ..DisplayConfig::default()
        };
        let panel = ControlPanel::new(&display, "S3".to_string());

        let params = panel.settings.filter_params();
        assert_eq!(params.industry, None);
        assert_eq!(params.duration_upper_limit, 3650.0);
        assert_eq!(panel.duration_slider_max, 3650.0);
        assert!(!panel.settings.show_raw_data);
    }
}
