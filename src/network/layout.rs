//! Force-directed placement of the bipartite gene/miRNA network.

use super::matrix::InteractionMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Gene,
    Mirna,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub label: String,
    pub kind: NodeKind,
    pub degree: usize,
    pub position: [f64; 2],
}

/// Edge between two node indices of a [`NetworkLayout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEdge {
    pub source: usize,
    pub target: usize,
    /// Negated MFE; `None` for pairs observed without an MFE.
    pub weight: Option<f64>,
}

/// Genes first, then miRNAs; edges refer to positions in `nodes`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkLayout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

impl NetworkLayout {
    pub fn max_weight(&self) -> Option<f64> {
        self.edges
            .iter()
            .filter_map(|e| e.weight)
            .fold(None, |acc: Option<f64>, w| Some(acc.map_or(w, |a| a.max(w))))
    }
}

/// Spring simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub iterations: usize,
    pub repulsion: f64,
    pub spring_length: f64,
    pub spring_constant: f64,
    /// Largest per-axis move of a node in one iteration.
    pub max_step: f64,
    pub gravity: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            repulsion: 5000.0,
            spring_length: 50.0,
            spring_constant: 0.05,
            max_step: 10.0,
            gravity: 0.01,
        }
    }
}

/// Lay out every gene and miRNA of `matrix` around the origin.
///
/// Starts from a circle so the result is the same on every run.
pub fn spring_layout(matrix: &InteractionMatrix, config: &LayoutConfig) -> NetworkLayout {
    let n_genes = matrix.genes().len();
    let mut nodes: Vec<LayoutNode> = matrix
        .genes()
        .iter()
        .enumerate()
        .map(|(i, g)| LayoutNode {
            label: g.clone(),
            kind: NodeKind::Gene,
            degree: matrix.gene_degree(i),
            position: [0.0, 0.0],
        })
        .chain(matrix.mirnas().iter().enumerate().map(|(j, m)| LayoutNode {
            label: m.clone(),
            kind: NodeKind::Mirna,
            degree: matrix.mirna_degree(j),
            position: [0.0, 0.0],
        }))
        .collect();

    let edges: Vec<LayoutEdge> = matrix
        .edges()
        .map(|e| LayoutEdge {
            source: e.gene_index,
            target: n_genes + e.mirna_index,
            weight: e.weight,
        })
        .collect();

    let n = nodes.len();
    if n == 0 {
        return NetworkLayout { nodes, edges };
    }

    let radius = config.spring_length * (n as f64).sqrt();
    let mut positions: Vec<[f64; 2]> = (0..n)
        .map(|i| {
            let angle = i as f64 / n as f64 * std::f64::consts::TAU;
            [radius * angle.cos(), radius * angle.sin()]
        })
        .collect();

    for _ in 0..config.iterations {
        let mut forces = vec![[0.0f64; 2]; n];

        // Repulsion
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = positions[i][0] - positions[j][0];
                let dy = positions[i][1] - positions[j][1];
                let dist_sq = dx * dx + dy * dy + 0.1;
                let force = config.repulsion / dist_sq;
                forces[i][0] += dx * force;
                forces[i][1] += dy * force;
                forces[j][0] -= dx * force;
                forces[j][1] -= dy * force;
            }
        }

        // Attraction along edges
        for edge in &edges {
            let (s, t) = (edge.source, edge.target);
            let dx = positions[t][0] - positions[s][0];
            let dy = positions[t][1] - positions[s][1];
            let dist = (dx * dx + dy * dy).sqrt().max(1e-6);
            let force = (dist - config.spring_length) * config.spring_constant;
            let fx = dx / dist * force;
            let fy = dy / dist * force;
            forces[s][0] += fx;
            forces[s][1] += fy;
            forces[t][0] -= fx;
            forces[t][1] -= fy;
        }

        for (p, f) in positions.iter_mut().zip(&forces) {
            p[0] += f[0].clamp(-config.max_step, config.max_step);
            p[1] += f[1].clamp(-config.max_step, config.max_step);
            p[0] -= p[0] * config.gravity;
            p[1] -= p[1] * config.gravity;
        }
    }

    for (node, p) in nodes.iter_mut().zip(positions) {
        node.position = p;
    }
    NetworkLayout { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CellValue, ColumnSchema, PredictionTable};
    use crate::network::{build_matrix, MatrixOptions};

    fn matrix() -> InteractionMatrix {
        let rows = [("g1", "m1", -10.0), ("g2", "m1", -8.0), ("g2", "m2", -4.0)];
        let table = PredictionTable::from_rows(
            vec!["GeneName".into(), "miRNA".into(), "Prediction".into(), "MFE".into()],
            rows.iter()
                .map(|&(g, m, e)| {
                    vec![
                        CellValue::String(g.into()),
                        CellValue::String(m.into()),
                        CellValue::Float(0.9),
                        CellValue::Float(e),
                    ]
                })
                .collect(),
        )
        .unwrap();
        build_matrix(&table, &ColumnSchema::default(), &MatrixOptions::default()).unwrap()
    }

    #[test]
    fn test_bipartite_nodes_and_edges() {
        let layout = spring_layout(&matrix(), &LayoutConfig::default());
        let kinds: Vec<NodeKind> = layout.nodes.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            [NodeKind::Gene, NodeKind::Gene, NodeKind::Mirna, NodeKind::Mirna]
        );
        assert_eq!(layout.nodes[3].label, "m2");
        assert_eq!(layout.nodes[1].degree, 2);
        assert_eq!(layout.edges.len(), 3);
        assert_eq!(
            layout.edges[0],
            LayoutEdge { source: 0, target: 2, weight: Some(10.0) }
        );
        assert_eq!(layout.max_weight(), Some(10.0));
    }

    #[test]
    fn test_layout_is_deterministic_and_finite() {
        let m = matrix();
        let a = spring_layout(&m, &LayoutConfig::default());
        let b = spring_layout(&m, &LayoutConfig::default());
        assert_eq!(a, b);
        for node in &a.nodes {
            assert!(node.position.iter().all(|v| v.is_finite()));
        }
        // nodes do not collapse onto each other
        let [x0, y0] = a.nodes[0].position;
        let [x1, y1] = a.nodes[1].position;
        assert!(((x0 - x1).powi(2) + (y0 - y1).powi(2)).sqrt() > 1.0);
    }
}
