//! Mesh builder - discretizes the deck into nodes and beam elements

use log::debug;
use serde::{Deserialize, Serialize};

use crate::elements::{Element, Node, SectionOverride, SectionProperties, DOFS_PER_NODE};
use crate::error::{BridgeError, BridgeResult};

/// Tolerance on the sum of span ratios
const RATIO_SUM_TOL: f64 = 1e-6;

/// Discretized deck
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    /// Total length in m
    pub length: f64,
    /// Nodes ordered by `x`, ids contiguous from 0
    pub nodes: Vec<Node>,
    /// Elements between consecutive nodes
    pub elements: Vec<Element>,
    /// Section table; index 0 is the base section
    pub sections: Vec<SectionProperties>,
}

impl Mesh {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Size of the global system
    pub fn dof_count(&self) -> usize {
        self.nodes.len() * DOFS_PER_NODE
    }

    /// Absolute tolerance used for position comparisons
    pub fn tolerance(&self) -> f64 {
        1e-9 * self.length
    }

    /// Section properties of an element
    pub fn section(&self, element: &Element) -> &SectionProperties {
        &self.sections[element.section]
    }

    /// Node closest to `x`
    pub fn nearest_node(&self, x: f64) -> &Node {
        let idx = self.nodes.partition_point(|n| n.x < x);
        match idx {
            0 => &self.nodes[0],
            i if i >= self.nodes.len() => &self.nodes[self.nodes.len() - 1],
            i => {
                let (left, right) = (&self.nodes[i - 1], &self.nodes[i]);
                if x - left.x <= right.x - x {
                    left
                } else {
                    right
                }
            }
        }
    }

    /// Index of the element containing `x`; a point on a shared node maps to
    /// the element on its left, except at `x = 0`.
    pub fn element_at(&self, x: f64) -> usize {
        let idx = self.nodes.partition_point(|n| n.x < x);
        idx.saturating_sub(1).min(self.elements.len() - 1)
    }
}

/// Builds a [`Mesh`] with uniform or span-aware spacing
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    length: f64,
    element_count: usize,
    span_ratios: Vec<f64>,
    section: SectionProperties,
    overrides: Vec<SectionOverride>,
}

impl MeshBuilder {
    /// Create a builder for a deck of `length` with `element_count` elements
    pub fn new(length: f64, element_count: usize) -> Self {
        Self {
            length,
            element_count,
            span_ratios: Vec::new(),
            section: SectionProperties::default(),
            overrides: Vec::new(),
        }
    }

    /// Split the deck into spans with these length fractions (must sum to 1).
    /// Each span boundary becomes a node.
    pub fn with_span_ratios(mut self, ratios: &[f64]) -> Self {
        self.span_ratios = ratios.to_vec();
        self
    }

    /// Set the base section
    pub fn with_section(mut self, section: SectionProperties) -> Self {
        self.section = section;
        self
    }

    /// Set per-span section overrides
    pub fn with_overrides(mut self, overrides: &[SectionOverride]) -> Self {
        self.overrides = overrides.to_vec();
        self
    }

    pub fn build(&self) -> BridgeResult<Mesh> {
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(BridgeError::InvalidMesh(format!(
                "length must be positive, got {}",
                self.length
            )));
        }
        if self.element_count < 1 {
            return Err(BridgeError::InvalidMesh(
                "element count must be at least 1".to_string(),
            ));
        }

        let ratios = self.normalized_ratios()?;
        if self.element_count < ratios.len() {
            return Err(BridgeError::InvalidMesh(format!(
                "{} elements cannot cover {} spans",
                self.element_count,
                ratios.len()
            )));
        }

        self.section.validate()?;
        for o in &self.overrides {
            o.validate()?;
        }

        let counts = allocate_elements(self.element_count, &ratios);
        let xs = self.node_coordinates(&ratios, &counts);

        let nodes: Vec<Node> = xs.iter().enumerate().map(|(id, &x)| Node::new(id, x)).collect();

        let mut sections = vec![self.section];
        sections.extend(self.overrides.iter().map(|o| o.section));

        let elements = nodes
            .windows(2)
            .enumerate()
            .map(|(id, pair)| {
                let length = pair[1].x - pair[0].x;
                let mid_ratio = (pair[0].x + 0.5 * length) / self.length;
                let section = self
                    .overrides
                    .iter()
                    .rposition(|o| o.covers(mid_ratio))
                    .map_or(0, |k| k + 1);
                Element {
                    id,
                    i_node: pair[0].id,
                    j_node: pair[1].id,
                    x_i: pair[0].x,
                    length,
                    section,
                }
            })
            .collect::<Vec<_>>();

        if let Some(e) = elements.iter().find(|e| e.length <= 0.0) {
            return Err(BridgeError::InvalidMesh(format!(
                "element {} has non-positive length {}",
                e.id, e.length
            )));
        }

        debug!(
            "Mesh: {} nodes, {} elements over {} spans, {} sections",
            nodes.len(),
            elements.len(),
            counts.len(),
            sections.len()
        );

        Ok(Mesh {
            length: self.length,
            nodes,
            elements,
            sections,
        })
    }

    fn normalized_ratios(&self) -> BridgeResult<Vec<f64>> {
        if self.span_ratios.is_empty() {
            return Ok(vec![1.0]);
        }
        if let Some(r) = self.span_ratios.iter().find(|r| !r.is_finite() || **r <= 0.0) {
            return Err(BridgeError::InvalidMesh(format!(
                "span ratios must be positive, got {r}"
            )));
        }
        let sum: f64 = self.span_ratios.iter().sum();
        if (sum - 1.0).abs() > RATIO_SUM_TOL {
            return Err(BridgeError::InvalidMesh(format!(
                "span ratios must sum to 1, got {sum}"
            )));
        }
        Ok(self.span_ratios.iter().map(|r| r / sum).collect())
    }

    fn node_coordinates(&self, ratios: &[f64], counts: &[usize]) -> Vec<f64> {
        let mut xs = Vec::with_capacity(self.element_count + 1);
        xs.push(0.0);

        let mut start = 0.0;
        let mut cumulative = 0.0;
        for (k, (&ratio, &count)) in ratios.iter().zip(counts).enumerate() {
            cumulative += ratio;
            let end = if k + 1 == ratios.len() {
                self.length
            } else {
                cumulative * self.length
            };
            let dx = (end - start) / count as f64;
            for m in 1..count {
                xs.push(start + m as f64 * dx);
            }
            xs.push(end);
            start = end;
        }

        xs
    }
}

/// Distribute `total` elements over spans in proportion to their ratios,
/// with at least one element per span.
fn allocate_elements(total: usize, ratios: &[f64]) -> Vec<usize> {
    let ideal: Vec<f64> = ratios.iter().map(|r| r * total as f64).collect();
    let mut counts: Vec<usize> = ideal.iter().map(|v| (v.floor() as usize).max(1)).collect();

    let deficit = |counts: &[usize], k: usize| ideal[k] - counts[k] as f64;

    while counts.iter().sum::<usize>() < total {
        let k = (0..counts.len())
            .max_by(|&a, &b| deficit(&counts, a).total_cmp(&deficit(&counts, b)))
            .unwrap_or(0);
        counts[k] += 1;
    }
    while counts.iter().sum::<usize>() > total {
        let candidate = (0..counts.len())
            .filter(|&k| counts[k] > 1)
            .min_by(|&a, &b| deficit(&counts, a).total_cmp(&deficit(&counts, b)));
        match candidate {
            Some(k) => counts[k] -= 1,
            None => break,
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_mesh() {
        let mesh = MeshBuilder::new(60.0, 30).build().unwrap();
        assert_eq!(mesh.node_count(), 31);
        assert_eq!(mesh.elements.len(), 30);
        assert_eq!(mesh.dof_count(), 93);
        assert_relative_eq!(mesh.nodes[30].x, 60.0);
        assert!(mesh.elements.iter().all(|e| (e.length - 2.0).abs() < 1e-12));
    }

    #[test]
    fn test_span_aware_mesh() {
        let mesh = MeshBuilder::new(60.0, 10)
            .with_span_ratios(&[0.3, 0.7])
            .build()
            .unwrap();
        assert_eq!(mesh.elements.len(), 10);
        // Span boundary at 18 m is a node
        assert!(mesh.nodes.iter().any(|n| (n.x - 18.0).abs() < 1e-9));
        assert_relative_eq!(mesh.nodes.last().unwrap().x, 60.0);
        for pair in mesh.nodes.windows(2) {
            assert!(pair[1].x > pair[0].x);
        }
    }

    #[test]
    fn test_thirds_land_on_nodes() {
        let mesh = MeshBuilder::new(60.0, 30)
            .with_span_ratios(&[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0])
            .build()
            .unwrap();
        assert_relative_eq!(mesh.nearest_node(20.0).x, 20.0, epsilon = 1e-9);
        assert_relative_eq!(mesh.nearest_node(40.0).x, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_allocation_keeps_total() {
        assert_eq!(allocate_elements(7, &[0.1, 0.45, 0.45]), vec![1, 3, 3]);
        assert_eq!(allocate_elements(3, &[0.01, 0.01, 0.98]), vec![1, 1, 1]);
        assert_eq!(allocate_elements(10, &[0.25, 0.75]).iter().sum::<usize>(), 10);
    }

    #[test]
    fn test_invalid_mesh() {
        assert!(matches!(
            MeshBuilder::new(0.0, 10).build(),
            Err(BridgeError::InvalidMesh(_))
        ));
        assert!(matches!(
            MeshBuilder::new(10.0, 0).build(),
            Err(BridgeError::InvalidMesh(_))
        ));
        assert!(matches!(
            MeshBuilder::new(10.0, 10).with_span_ratios(&[0.5, 0.4]).build(),
            Err(BridgeError::InvalidMesh(_))
        ));
        assert!(matches!(
            MeshBuilder::new(10.0, 2).with_span_ratios(&[0.2, 0.3, 0.5]).build(),
            Err(BridgeError::InvalidMesh(_))
        ));
    }

    #[test]
    fn test_section_overrides() {
        let stiff = SectionProperties::new(60e9, 2.0, 1.0, 2500.0);
        let mesh = MeshBuilder::new(10.0, 10)
            .with_overrides(&[SectionOverride::new(0.0, 0.3, stiff)])
            .build()
            .unwrap();
        assert_eq!(mesh.section(&mesh.elements[0]).e, 60e9);
        assert_eq!(mesh.section(&mesh.elements[2]).e, 60e9);
        assert_eq!(mesh.section(&mesh.elements[5]).e, SectionProperties::default().e);
    }

    #[test]
    fn test_nearest_and_element_lookup() {
        let mesh = MeshBuilder::new(10.0, 5).build().unwrap();
        assert_eq!(mesh.nearest_node(3.1).id, 2);
        assert_eq!(mesh.nearest_node(-1.0).id, 0);
        assert_eq!(mesh.nearest_node(11.0).id, 5);
        assert_eq!(mesh.element_at(0.0), 0);
        assert_eq!(mesh.element_at(3.0), 1);
        assert_eq!(mesh.element_at(3.5), 1);
        assert_eq!(mesh.element_at(10.0), 4);
    }
}
