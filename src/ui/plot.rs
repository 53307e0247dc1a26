use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::network::NodeKind;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Network plot (central panel)
// ---------------------------------------------------------------------------

/// Render the gene/miRNA network in the central panel.
pub fn network_plot(ui: &mut Ui, state: &AppState) {
    let layout = match &state.layout {
        Some(layout) => layout,
        None => {
            let message = if state.table.is_none() {
                "Open a prediction file to view the network  (File → Open…)"
            } else {
                "No interactions pass the current thresholds"
            };
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading(message);
            });
            return;
        }
    };

    let color_map = state.color_map.as_ref();
    let max_weight = layout.max_weight().unwrap_or(1.0).max(f64::EPSILON);
    let max_degree = layout.nodes.iter().map(|n| n.degree).max().unwrap_or(1).max(1);

    Plot::new("network_plot")
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            // Edges first so nodes are drawn on top.
            for edge in &layout.edges {
                let a = layout.nodes[edge.source].position;
                let b = layout.nodes[edge.target].position;
                let mirna = &layout.nodes[edge.target].label;

                let color = color_map
                    .map(|cm| cm.color_for(mirna))
                    .unwrap_or(Color32::LIGHT_BLUE)
                    .gamma_multiply(0.6);
                let width = edge
                    .weight
                    .map(|w| 0.5 + 3.0 * (w / max_weight).clamp(0.0, 1.0) as f32)
                    .unwrap_or(0.5);

                plot_ui.line(
                    Line::new(PlotPoints::from(vec![a, b]))
                        .color(color)
                        .width(width),
                );

                if state.show_weights {
                    if let Some(w) = edge.weight {
                        let mid = PlotPoint::new((a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0);
                        plot_ui.text(Text::new(mid, RichText::new(format!("{w:.1}")).small()));
                    }
                }
            }

            for node in &layout.nodes {
                let color = match (node.kind, color_map) {
                    (NodeKind::Mirna, Some(cm)) => cm.color_for(&node.label),
                    (NodeKind::Gene, Some(cm)) => cm.gene_color(),
                    (_, None) => Color32::LIGHT_BLUE,
                };
                let radius = 3.0 + 9.0 * (node.degree as f32 / max_degree as f32).sqrt();

                plot_ui.points(
                    Points::new(vec![node.position])
                        .name(&node.label)
                        .color(color)
                        .radius(radius),
                );

                if state.show_labels {
                    let [x, y] = node.position;
                    let label = match node.kind {
                        NodeKind::Gene => RichText::new(&node.label).strong(),
                        NodeKind::Mirna => RichText::new(&node.label).color(color),
                    };
                    plot_ui.text(Text::new(PlotPoint::new(x, y + 6.0), label));
                }
            }
        });
}
