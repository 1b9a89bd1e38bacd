//! Mesh nodes and beam elements

use serde::{Deserialize, Serialize};

/// Degrees of freedom per node: axial `u`, transverse `v`, rotation `θ`
pub const DOFS_PER_NODE: usize = 3;
/// Local index of the axial DOF
pub const DOF_U: usize = 0;
/// Local index of the transverse (vertical) DOF
pub const DOF_V: usize = 1;
/// Local index of the rotational DOF
pub const DOF_THETA: usize = 2;

/// A node on the beam axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Contiguous id, ordered by `x`
    pub id: usize,
    /// Longitudinal coordinate in m
    pub x: f64,
}

impl Node {
    /// Create a new node
    pub fn new(id: usize, x: f64) -> Self {
        Self { id, x }
    }

    /// Global index of one of this node's DOFs
    pub fn dof(&self, local: usize) -> usize {
        self.id * DOFS_PER_NODE + local
    }

    /// Global indices of `[u, v, θ]`
    pub fn dofs(&self) -> [usize; 3] {
        [self.dof(DOF_U), self.dof(DOF_V), self.dof(DOF_THETA)]
    }
}

/// A 2-node beam element between adjacent nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Element id (position along the deck)
    pub id: usize,
    /// Start node id
    pub i_node: usize,
    /// End node id (`x_i < x_j`)
    pub j_node: usize,
    /// Start coordinate in m
    pub x_i: f64,
    /// Element length in m
    pub length: f64,
    /// Index into the mesh section table
    pub section: usize,
}

impl Element {
    /// End coordinate in m
    pub fn x_j(&self) -> f64 {
        self.x_i + self.length
    }

    /// Global DOF indices `[u_i, v_i, θ_i, u_j, v_j, θ_j]`
    pub fn dofs(&self) -> [usize; 6] {
        let i = self.i_node * DOFS_PER_NODE;
        let j = self.j_node * DOFS_PER_NODE;
        [i, i + 1, i + 2, j, j + 1, j + 2]
    }

    /// Direction cosines `(cos, sin)` of the element axis.
    /// The deck is collinear and horizontal.
    pub fn direction_cosines(&self) -> (f64, f64) {
        (1.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_dofs() {
        let node = Node::new(4, 8.0);
        assert_eq!(node.dofs(), [12, 13, 14]);
        assert_eq!(node.dof(DOF_V), 13);
    }

    #[test]
    fn test_element_dofs() {
        let element = Element {
            id: 1,
            i_node: 1,
            j_node: 2,
            x_i: 2.0,
            length: 2.0,
            section: 0,
        };
        assert_eq!(element.dofs(), [3, 4, 5, 6, 7, 8]);
        assert!((element.x_j() - 4.0).abs() < 1e-12);
    }
}
