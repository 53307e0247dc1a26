//! Interaction network: the gene × miRNA weight matrix and its layout.

pub mod layout;
pub mod matrix;

pub use layout::{spring_layout, LayoutConfig, LayoutEdge, LayoutNode, NetworkLayout, NodeKind};
pub use matrix::{build_matrix, DuplicatePolicy, Edge, InteractionMatrix, MatrixOptions};
