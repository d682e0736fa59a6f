use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color;
use crate::data::filter::FilterChange;
use crate::data::model::{ModelResults, Sector};
use crate::export::ExportFormat;
use crate::ui::AppDashboard;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, dashboard: &mut AppDashboard) {
    ui.heading("Filters");
    ui.separator();

    // Clone what we need so we can mutate the dashboard inside the loops.
    let states = dashboard.states.clone();
    let (year_min, year_max) = dashboard.year_bounds();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Sectors ----
            ui.strong("Sector");
            for sector in Sector::TRACKED {
                let mut checked = dashboard.filters.selected_sectors.contains(&sector);
                if ui.checkbox(&mut checked, sector.label()).changed() {
                    dashboard.toggle_sector(sector);
                }
            }
            ui.separator();

            // ---- Year range ----
            ui.strong("Years");
            let (mut from, mut to) = dashboard.filters.year_range;
            let from_changed = ui
                .add(egui::Slider::new(&mut from, year_min..=year_max).text("from"))
                .changed();
            let to_changed = ui
                .add(egui::Slider::new(&mut to, year_min..=year_max).text("to"))
                .changed();
            if from_changed || to_changed {
                dashboard.set_year_range(from, to);
            }
            ui.separator();

            // ---- States (empty selection = all) ----
            let n_selected = dashboard.filters.selected_states.len();
            let header_text = if n_selected == 0 {
                format!("States  (all {})", states.len())
            } else {
                format!("States  ({n_selected}/{})", states.len())
            };
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("states")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    if ui.small_button("All").clicked() {
                        dashboard.apply_filter_change(FilterChange::states(Vec::<String>::new()));
                    }
                    for state in &states {
                        let mut checked = dashboard.filters.selected_states.contains(state);
                        if ui.checkbox(&mut checked, state).changed() {
                            dashboard.toggle_state(state);
                        }
                    }
                });
            ui.separator();

            if ui.button("Reset filters").clicked() {
                dashboard.reset_filters();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, dashboard: &mut AppDashboard) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Export", |ui: &mut Ui| {
            for format in ExportFormat::ALL {
                if ui.button(format!("{}…", format.label())).clicked() {
                    export_dialog(dashboard, format);
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        ui.label(format!(
            "{} records loaded, {} visible",
            dashboard.data.records.len(),
            dashboard.filtered.len()
        ));

        if let Some(msg) = &dashboard.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(color::to_color32(color::ACCENT)));
        }
    });
}

// ---------------------------------------------------------------------------
// Summary cards, model results, record table
// ---------------------------------------------------------------------------

pub fn summary_cards(ui: &mut Ui, dashboard: &AppDashboard) {
    let s = &dashboard.summary;
    let cards = [
        ("Total Consumption", Some(s.total)),
        ("Average", Some(s.mean)),
        ("Maximum", s.max),
        ("Minimum", s.min),
    ];
    ui.columns(cards.len(), |cols| {
        for (ui, (label, value)) in cols.iter_mut().zip(cards) {
            egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
                ui.label(label);
                let text = value.map(format_thousands).unwrap_or_else(|| "–".to_string());
                ui.heading(text);
            });
        }
    });
}

pub fn model_results(ui: &mut Ui, title: &str, results: &ModelResults) {
    egui::CollapsingHeader::new(title)
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if results.is_empty() {
                ui.label("Not available.");
                return;
            }
            let text = serde_json::to_string_pretty(results).unwrap_or_default();
            ScrollArea::vertical()
                .id_salt(title)
                .max_height(240.0)
                .show(ui, |ui: &mut Ui| {
                    ui.monospace(text);
                });
        });
}

pub fn record_table(ui: &mut Ui, dashboard: &AppDashboard) {
    let records = &dashboard.filtered;
    egui::CollapsingHeader::new(format!("Records ({})", records.len()))
        .id_salt("records")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(260.0)
                .column(Column::auto().at_least(140.0))
                .column(Column::auto().at_least(100.0))
                .column(Column::auto().at_least(60.0))
                .column(Column::remainder())
                .header(20.0, |mut header| {
                    for title in ["State", "Sector", "Year", "Value"] {
                        header.col(|ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, records.len(), |mut row| {
                        let r = &records[row.index()];
                        row.col(|ui| {
                            ui.label(&r.state);
                        });
                        row.col(|ui| {
                            ui.label(r.sector.label());
                        });
                        row.col(|ui| {
                            ui.label(r.year.to_string());
                        });
                        row.col(|ui| {
                            ui.label(format_thousands(r.value));
                        });
                    });
                });
        });
}

/// Round to an integer and group thousands: `1234567.8` → `1,234,568`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Export dialog
// ---------------------------------------------------------------------------

pub fn export_dialog(dashboard: &mut AppDashboard, format: ExportFormat) {
    let artifact = match dashboard.export(format) {
        Ok(artifact) => artifact,
        Err(e) => {
            log::error!("Export failed: {e}");
            dashboard.status_message = Some(format!("Error: {e}"));
            return;
        }
    };

    let file = rfd::FileDialog::new()
        .set_title("Save export")
        .set_file_name(artifact.file_name)
        .add_filter(format.label(), &[format.extension()])
        .save_file();

    if let Some(path) = file {
        match artifact.save_as(&path) {
            Ok(()) => {
                log::info!("Exported {} bytes to {}", artifact.bytes.len(), path.display());
                dashboard.status_message = None;
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                dashboard.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::format_thousands;

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1234567.8), "1,234,568");
        assert_eq!(format_thousands(-4500.0), "-4,500");
    }
}
