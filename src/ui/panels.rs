use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::network::DuplicatePolicy;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – threshold widgets and summary
// ---------------------------------------------------------------------------

/// Render the left threshold panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Thresholds");
    ui.separator();

    if state.table.is_none() {
        ui.label("No predictions loaded.");
        return;
    }

    // Sliders edit the draft; the network is rebuilt once a slider is let go.
    let p_resp = ui.add(
        egui::Slider::new(&mut state.draft.probability_min, 0.0..=1.0)
            .text("probability >")
            .fixed_decimals(2),
    );
    let e_resp = ui.add(
        egui::Slider::new(&mut state.draft.mfe_max, -60.0..=10.0)
            .text("MFE <")
            .fixed_decimals(1),
    );
    let dragging = p_resp.dragged() || e_resp.dragged();
    let edited = p_resp.changed() || e_resp.changed();
    let released = p_resp.drag_stopped() || e_resp.drag_stopped();
    if (released || edited) && !dragging {
        let draft = state.draft;
        state.set_thresholds(draft.probability_min, draft.mfe_max);
    }

    ui.add_space(4.0);
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Duplicate pairs");
        let current = state.matrix_options.duplicates;
        egui::ComboBox::from_id_salt("duplicates")
            .selected_text(policy_label(current))
            .show_ui(ui, |ui: &mut Ui| {
                for policy in [DuplicatePolicy::LastWins, DuplicatePolicy::Strongest] {
                    if ui
                        .selectable_label(current == policy, policy_label(policy))
                        .clicked()
                        && current != policy
                    {
                        state.matrix_options.duplicates = policy;
                        state.recompute();
                    }
                }
            });
    });

    ui.horizontal(|ui: &mut Ui| {
        ui.checkbox(&mut state.show_labels, "Labels");
        ui.checkbox(&mut state.show_weights, "Weights");
    });
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- miRNA legend ----
            if let Some(cm) = &state.color_map {
                egui::CollapsingHeader::new(RichText::new("Legend").strong())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.label(RichText::new("● gene").color(cm.gene_color()));
                        for (name, color) in cm.legend_entries() {
                            ui.label(RichText::new(format!("● {name}")).color(color));
                        }
                    });
            }

            // ---- miRNA occurrence table ----
            if let Some(summary) = &state.summary {
                egui::CollapsingHeader::new(
                    RichText::new(format!("miRNA occurrences ({})", summary.n_mirnas())).strong(),
                )
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    TableBuilder::new(ui)
                        .striped(true)
                        .max_scroll_height(320.0)
                        .column(Column::remainder())
                        .column(Column::auto())
                        .header(18.0, |mut header| {
                            header.col(|ui| {
                                ui.strong("miRNA");
                            });
                            header.col(|ui| {
                                ui.strong("count");
                            });
                        })
                        .body(|mut body| {
                            for (mirna, n) in &summary.mirna_counts {
                                body.row(16.0, |mut row| {
                                    row.col(|ui| {
                                        ui.label(mirna.as_str());
                                    });
                                    row.col(|ui| {
                                        ui.label(n.to_string());
                                    });
                                });
                            }
                        });
                });
            }
        });
}

fn policy_label(policy: DuplicatePolicy) -> &'static str {
    match policy {
        DuplicatePolicy::LastWins => "last wins",
        DuplicatePolicy::Strongest => "strongest",
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(outcome) = &state.outcome {
            ui.label(format!(
                "{} predictions loaded, {} kept",
                outcome.n_before, outcome.n_after
            ));
        }
        if let Some(matrix) = &state.matrix {
            let (genes, mirnas) = matrix.shape();
            ui.label(format!(
                "{genes} genes, {mirnas} miRNAs, {} interactions",
                matrix.n_interactions()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open target predictions")
        .add_filter(
            "Supported files",
            &["tsv", "txt", "tab", "csv", "json", "parquet", "pq"],
        )
        .add_filter("miRAW results", &["tsv", "txt", "tab"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} predictions with columns {:?}",
                    table.len(),
                    table.columns()
                );
                state.set_table(path, table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
