use super::{Dashboard, PendingAction};
use crate::api::UploadSummary;
use crate::utils::color::{Accent, ERROR_RED, SUCCESS_GREEN};
use crate::utils::format::{format_metric, format_optional_metric, format_size, format_upload_time};
use eframe::egui::{self, Align2, Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, Text};
use std::path::PathBuf;
use tracing::error;

const REFRESH_LABEL: &str = "🔄 Refresh";

/// What the user clicked this frame; applied once rendering is done.
enum UiAction {
    PickFile,
    Upload,
    DownloadReport,
    RefreshHistory,
    OpenReport(PathBuf),
}

impl Dashboard {
    pub fn render(&mut self, ctx: &egui::Context) {
        let mut action = None;

        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label(RichText::new("⚡").size(22.0).color(Accent::Orange.color()));
                ui.heading("Chemical Visualizer");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        RichText::new(self.client.active_base_url())
                            .small()
                            .color(ui.visuals().text_color().gamma_multiply(0.6)),
                    );
                });
            });
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(10.0);
                self.render_control_bar(ui, &mut action);
                ui.add_space(16.0);

                match &self.state.summary {
                    Some(summary) => render_metrics(ui, summary),
                    None => {
                        ui.group(|ui| {
                            ui.set_width(ui.available_width());
                            ui.label(
                                RichText::new("Upload a CSV file to see summary statistics.")
                                    .color(ui.visuals().text_color().gamma_multiply(0.7)),
                            );
                        });
                    }
                }

                ui.add_space(16.0);
                ui.columns(2, |columns| {
                    self.render_chart_panel(&mut columns[0], &mut action);
                    self.render_history_panel(&mut columns[1], &mut action);
                });
                ui.add_space(20.0);
            });
        });

        match action {
            Some(UiAction::PickFile) => self.pick_file(),
            Some(UiAction::Upload) => self.submit_upload(),
            Some(UiAction::DownloadReport) => self.download_report(),
            Some(UiAction::RefreshHistory) => self.refresh_history(),
            Some(UiAction::OpenReport(path)) => {
                if let Err(e) = open::that(&path) {
                    error!("Failed to open {}: {}", path.display(), e);
                }
            }
            None => {}
        }
    }

    fn render_control_bar(&self, ui: &mut egui::Ui, action: &mut Option<UiAction>) {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Data Upload").strong().size(16.0));
            ui.add_space(6.0);

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!self.state.is_loading(), egui::Button::new("📂 Choose CSV File..."))
                    .clicked()
                {
                    *action = Some(UiAction::PickFile);
                }

                match &self.state.selected_file {
                    Some(file) => {
                        let size = file.size.map(format_size).unwrap_or_default();
                        ui.label(RichText::new(&file.name).strong());
                        ui.label(RichText::new(size).small());
                    }
                    None => {
                        ui.label(RichText::new("No file selected").italics());
                    }
                }

                let uploading = self.state.pending == Some(PendingAction::Uploading);
                let label = if uploading { "Processing..." } else { "Upload & Analyze" };
                let button = egui::Button::new(label).min_size(egui::vec2(160.0, 30.0));
                if ui.add_enabled(self.state.can_upload(), button).clicked() {
                    *action = Some(UiAction::Upload);
                }
                if uploading {
                    ui.spinner();
                }
            });

            if let Some(message) = &self.state.error_message {
                ui.add_space(8.0);
                ui.colored_label(ERROR_RED, message.as_str());
            }

            if let Some(message) = &self.state.success_message {
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    ui.colored_label(SUCCESS_GREEN, message.as_str());
                    if let Some(path) = &self.state.last_report {
                        if ui.link("Open").clicked() {
                            *action = Some(UiAction::OpenReport(path.clone()));
                        }
                    }
                });
            }
        });
    }

    fn render_chart_panel(&self, ui: &mut egui::Ui, action: &mut Option<UiAction>) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("Equipment Type Distribution").strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let downloading = self.state.pending == Some(PendingAction::Downloading);
                    let label = if downloading { "Downloading..." } else { "Download PDF" };
                    if ui
                        .add_enabled(self.state.can_download(), egui::Button::new(label))
                        .clicked()
                    {
                        *action = Some(UiAction::DownloadReport);
                    }
                });
            });
            ui.separator();

            let categories = self.state.chart_categories();
            if categories.is_empty() {
                ui.label("No distribution to show yet.");
            } else {
                render_distribution_chart(ui, &categories);
            }
        });
    }

    fn render_history_panel(&self, ui: &mut egui::Ui, action: &mut Option<UiAction>) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("Recent Uploads").strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button(REFRESH_LABEL).clicked() {
                        *action = Some(UiAction::RefreshHistory);
                    }
                });
            });
            ui.separator();

            if self.state.history.is_empty() {
                ui.label(
                    RichText::new("No history recorded.")
                        .color(ui.visuals().text_color().gamma_multiply(0.7)),
                );
                return;
            }

            egui::ScrollArea::horizontal().show(ui, |ui| {
                egui::Grid::new("history_table")
                    .striped(true)
                    .num_columns(6)
                    .spacing([16.0, 6.0])
                    .show(ui, |ui| {
                        for title in ["Filename", "Time", "Count", "Flow", "Pressure", "Temp"] {
                            ui.label(RichText::new(title).strong());
                        }
                        ui.end_row();

                        for entry in &self.state.history {
                            ui.label(RichText::new(&entry.file_name).strong());
                            ui.label(format_upload_time(&entry.uploaded_at));
                            ui.label(entry.total_equipment.to_string());
                            ui.label(format_optional_metric(entry.avg_flowrate));
                            ui.label(format_optional_metric(entry.avg_pressure));
                            ui.label(format_optional_metric(entry.avg_temperature));
                            ui.end_row();
                        }
                    });
            });
        });
    }
}

fn render_metrics(ui: &mut egui::Ui, summary: &UploadSummary) {
    let cards = [
        ("Total Equipment", summary.total_count.to_string(), "", Accent::Blue),
        ("Avg Flowrate", format_metric(summary.avg_flowrate), "L/min", Accent::Green),
        ("Avg Pressure", format_metric(summary.avg_pressure), "PSI", Accent::Orange),
        ("Avg Temp", format_metric(summary.avg_temperature), "°C", Accent::Red),
    ];

    ui.columns(cards.len(), |columns| {
        for (column, (label, value, unit, accent)) in columns.iter_mut().zip(cards) {
            metric_card(column, label, &value, unit, accent.color());
        }
    });
}

fn metric_card(ui: &mut egui::Ui, label: &str, value: &str, unit: &str, accent: Color32) {
    egui::Frame::none()
        .inner_margin(12.0)
        .rounding(6.0)
        .fill(ui.visuals().extreme_bg_color)
        .stroke(egui::Stroke::new(1.5, accent))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(label.to_uppercase()).small().color(accent));
            ui.horizontal(|ui| {
                ui.label(RichText::new(value).size(24.0).strong());
                if !unit.is_empty() {
                    ui.label(RichText::new(unit).small());
                }
            });
        });
}

fn render_distribution_chart(ui: &mut egui::Ui, categories: &[(&str, u64)]) {
    let fill = Accent::Chart.color();
    let max = categories.iter().map(|(_, count)| *count).max().unwrap_or(0) as f64;
    let label_offset = (max * 0.04).max(0.1);

    let bars: Vec<Bar> = categories
        .iter()
        .enumerate()
        .map(|(index, (name, count))| {
            Bar::new(index as f64, *count as f64)
                .name(*name)
                .width(0.6)
                .fill(fill)
        })
        .collect();

    Plot::new("type_distribution")
        .height(260.0)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show_background(false)
        .show_axes([false, true])
        .include_y(0.0)
        .include_y(-3.0 * label_offset)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Equipment Count").color(fill));

            for (index, (name, _)) in categories.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(index as f64, -label_offset), *name)
                        .anchor(Align2::CENTER_TOP),
                );
            }
        });
}
