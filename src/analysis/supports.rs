//! Support resolver - maps pier configurations onto per-DOF boundary conditions

use log::debug;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::elements::{PierConfig, DOF_THETA, DOF_U, DOF_V};
use crate::error::{BridgeError, BridgeResult};
use crate::mesh::Mesh;

/// Boundary condition on one DOF
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    /// DOF is eliminated from the free system
    pub constrained: bool,
    /// Prescribed value; zero for a rigid constraint, nonzero for settlement
    pub imposed_value: f64,
}

impl BoundaryCondition {
    pub fn free() -> Self {
        Self::default()
    }

    /// Rigid constraint at zero
    pub fn fixed() -> Self {
        Self {
            constrained: true,
            imposed_value: 0.0,
        }
    }

    /// Constraint at a nonzero target
    pub fn imposed(value: f64) -> Self {
        Self {
            constrained: true,
            imposed_value: value,
        }
    }

    pub fn is_settlement(&self) -> bool {
        self.constrained && self.imposed_value != 0.0
    }
}

/// How a pier supports the deck vertically
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalSupport {
    /// Rigid, with `(h_ref - h) * rate` imposed on shorter piers
    Settlement { rate: f64 },
    /// Axial pier spring `k = E·A/h` on a free `v` DOF
    Elastic { modulus: f64, area: f64 },
}

/// Where one pier landed on the mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PierSupport {
    /// Index in the input pier list
    pub pier: usize,
    /// Node carrying the pier
    pub node: usize,
    /// Effective restraint mask `[u, v, θ]`
    pub restraints: [bool; 3],
    /// Imposed vertical settlement in m (positive upward)
    pub settlement: f64,
    /// Vertical spring stiffness in N/m, if elastic
    pub spring: Option<f64>,
    /// Transverse bearings collapsed onto the node
    pub bearings: usize,
}

/// Boundary conditions for every DOF of a mesh
#[derive(Debug, Clone)]
pub struct BoundaryMap {
    /// One entry per global DOF
    pub conditions: Vec<BoundaryCondition>,
    /// Vertical springs `(dof, stiffness)`
    pub springs: Vec<(usize, f64)>,
    /// Pier placement, in input order
    pub piers: Vec<PierSupport>,
}

impl BoundaryMap {
    /// Unsupported map for `dof_count` DOFs
    pub fn new(dof_count: usize) -> Self {
        Self {
            conditions: vec![BoundaryCondition::free(); dof_count],
            springs: Vec::new(),
            piers: Vec::new(),
        }
    }

    pub fn free_dofs(&self) -> Vec<usize> {
        (0..self.conditions.len())
            .filter(|&d| !self.conditions[d].constrained)
            .collect()
    }

    pub fn constrained_dofs(&self) -> Vec<usize> {
        (0..self.conditions.len())
            .filter(|&d| self.conditions[d].constrained)
            .collect()
    }

    /// Prescribed displacement vector (zero on free DOFs)
    pub fn prescribed(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.conditions.len(),
            self.conditions.iter().map(|bc| bc.imposed_value),
        )
    }

    /// DOFs with a nonzero imposed value
    pub fn settlement_dofs(&self) -> Vec<usize> {
        (0..self.conditions.len())
            .filter(|&d| self.conditions[d].is_settlement())
            .collect()
    }
}

/// Resolves piers onto mesh nodes
pub struct SupportResolver<'a> {
    mesh: &'a Mesh,
    snap_tolerance: f64,
}

impl<'a> SupportResolver<'a> {
    pub fn new(mesh: &'a Mesh, snap_tolerance: f64) -> Self {
        Self {
            mesh,
            snap_tolerance,
        }
    }

    /// Node under a pier; the pier must coincide with it within the snap tolerance
    pub fn locate(&self, index: usize, pier: &PierConfig) -> BridgeResult<usize> {
        let x = pier.position * self.mesh.length;
        let node = self.mesh.nearest_node(x);
        let offset = (node.x - x).abs();
        if offset > self.snap_tolerance {
            return Err(BridgeError::InvalidSupport(format!(
                "pier {index} at x = {x:.4} m is {offset:.4} m from the nearest node \
                 (tolerance {} m)",
                self.snap_tolerance
            )));
        }
        Ok(node.id)
    }

    pub fn resolve(&self, piers: &[PierConfig], vertical: VerticalSupport) -> BridgeResult<BoundaryMap> {
        let mut map = BoundaryMap::new(self.mesh.dof_count());

        for (index, pier) in piers.iter().enumerate() {
            pier.validate(index)?;
            let node = self.locate(index, pier)?;
            if let Some(other) = map.piers.iter().find(|p| p.node == node) {
                return Err(BridgeError::InvalidSupport(format!(
                    "piers {} and {index} share node {node}",
                    other.pier
                )));
            }
            map.piers.push(PierSupport {
                pier: index,
                node,
                restraints: pier.restraints(),
                settlement: 0.0,
                spring: None,
                bearings: pier.bearings,
            });
        }

        // Constraint types first, then settlement values on top of them
        for support in &map.piers {
            let base = self.mesh.nodes[support.node].dof(DOF_U);
            for (local, &restrained) in support.restraints.iter().enumerate() {
                let vertical_spring =
                    local == DOF_V && matches!(vertical, VerticalSupport::Elastic { .. });
                if restrained && !vertical_spring {
                    map.conditions[base + local] = BoundaryCondition::fixed();
                }
            }
        }

        match vertical {
            VerticalSupport::Settlement { rate } => self.apply_settlement(piers, &mut map, rate),
            VerticalSupport::Elastic { modulus, area } => {
                self.apply_springs(piers, &mut map, modulus, area)
            }
        }

        debug!(
            "Supports: {} piers, {} constrained DOFs, {} settlements, {} springs",
            map.piers.len(),
            map.constrained_dofs().len(),
            map.settlement_dofs().len(),
            map.springs.len()
        );

        Ok(map)
    }

    fn apply_settlement(&self, piers: &[PierConfig], map: &mut BoundaryMap, rate: f64) {
        let reference = piers.iter().map(|p| p.height).fold(f64::NEG_INFINITY, f64::max);

        for support in map.piers.iter_mut() {
            let dof = self.mesh.nodes[support.node].dof(DOF_V);
            if !map.conditions[dof].constrained {
                continue;
            }
            let settlement = (reference - piers[support.pier].height) * rate;
            if settlement != 0.0 {
                map.conditions[dof] = BoundaryCondition::imposed(settlement);
                support.settlement = settlement;
            }
        }
    }

    fn apply_springs(&self, piers: &[PierConfig], map: &mut BoundaryMap, modulus: f64, area: f64) {
        for support in map.piers.iter_mut() {
            if !support.restraints[DOF_V] {
                continue;
            }
            let k = modulus * area / piers[support.pier].height;
            map.springs.push((self.mesh.nodes[support.node].dof(DOF_V), k));
            support.spring = Some(k);
        }
    }
}

/// Static-stability findings for a pier layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportDiagnostics {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl SupportDiagnostics {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Count restraints across piers and flag layouts that cannot be stable
pub fn check_support_layout(piers: &[PierConfig]) -> SupportDiagnostics {
    let mut diagnostics = SupportDiagnostics::default();

    let masks: Vec<[bool; 3]> = piers.iter().map(PierConfig::restraints).collect();
    let count = |local: usize| masks.iter().filter(|m| m[local]).count();
    let (u, v, theta) = (count(DOF_U), count(DOF_V), count(DOF_THETA));
    let clamped = masks.iter().any(|m| m[DOF_V] && m[DOF_THETA]);

    if u == 0 {
        diagnostics
            .errors
            .push("no pier restrains horizontal movement".to_string());
    }
    if v < 2 && !clamped {
        diagnostics.errors.push(format!(
            "{v} vertical restraint(s) cannot prevent rigid rotation; \
             need two or a fixed support"
        ));
    }
    let total = u + v + theta;
    if total > 3 {
        diagnostics.warnings.push(format!(
            "{total} restraints: statically indeterminate to degree {}",
            total - 3
        ));
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Releases, SupportType};
    use crate::mesh::MeshBuilder;

    fn mesh() -> Mesh {
        MeshBuilder::new(60.0, 30).build().unwrap()
    }

    #[test]
    fn test_support_types() {
        let mesh = mesh();
        let piers = [
            PierConfig::fixed(0.0, 8.0),
            PierConfig::fixed_pin(0.5, 8.0),
            PierConfig::roller(1.0, 8.0),
        ];
        let map = SupportResolver::new(&mesh, 1e-3)
            .resolve(&piers, VerticalSupport::Settlement { rate: 0.001 })
            .unwrap();

        assert!(map.conditions[0..3].iter().all(|bc| bc.constrained));
        assert_eq!(
            map.conditions[45..48].iter().map(|bc| bc.constrained).collect::<Vec<_>>(),
            vec![true, true, false]
        );
        assert_eq!(
            map.conditions[90..93].iter().map(|bc| bc.constrained).collect::<Vec<_>>(),
            vec![false, true, false]
        );
        assert_eq!(map.constrained_dofs().len(), 6);
        assert!(map.settlement_dofs().is_empty());
    }

    #[test]
    fn test_settlement_on_shorter_piers() {
        let mesh = mesh();
        let piers = [
            PierConfig::fixed_pin(0.0, 10.0),
            PierConfig::roller(0.5, 6.0),
            PierConfig::fixed(1.0, 8.0),
        ];
        let map = SupportResolver::new(&mesh, 1e-3)
            .resolve(&piers, VerticalSupport::Settlement { rate: 0.001 })
            .unwrap();

        assert_eq!(map.conditions[1], BoundaryCondition::fixed());
        assert!((map.conditions[46].imposed_value - 0.004).abs() < 1e-15);
        assert!((map.conditions[91].imposed_value - 0.002).abs() < 1e-15);
        // Rotations never settle
        assert_eq!(map.conditions[92], BoundaryCondition::fixed());
        assert_eq!(map.settlement_dofs(), vec![46, 91]);
        assert_eq!(map.prescribed()[46], map.piers[1].settlement);
    }

    #[test]
    fn test_released_vertical_gets_no_settlement() {
        let mesh = mesh();
        let piers = [
            PierConfig::fixed(0.0, 10.0),
            PierConfig::fixed(1.0, 5.0).with_releases(Releases {
                v: true,
                ..Releases::none()
            }),
        ];
        let map = SupportResolver::new(&mesh, 1e-3)
            .resolve(&piers, VerticalSupport::Settlement { rate: 0.001 })
            .unwrap();
        assert!(!map.conditions[91].constrained);
        assert!(map.settlement_dofs().is_empty());
    }

    #[test]
    fn test_elastic_springs() {
        let mesh = mesh();
        let piers = [
            PierConfig::fixed_pin(0.0, 10.0),
            PierConfig::roller(1.0, 5.0),
        ];
        let map = SupportResolver::new(&mesh, 1e-3)
            .resolve(
                &piers,
                VerticalSupport::Elastic {
                    modulus: 30e9,
                    area: 0.5,
                },
            )
            .unwrap();

        assert!(map.conditions[0].constrained);
        assert!(!map.conditions[1].constrained);
        assert_eq!(map.springs, vec![(1, 1.5e9), (91, 3e9)]);
    }

    #[test]
    fn test_pier_off_node_rejected() {
        let mesh = mesh();
        let piers = [PierConfig::roller(0.51, 8.0)];
        let err = SupportResolver::new(&mesh, 1e-3)
            .resolve(&piers, VerticalSupport::Settlement { rate: 0.0 })
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidSupport(_)));
    }

    #[test]
    fn test_duplicate_pier_node_rejected() {
        let mesh = mesh();
        let piers = [PierConfig::roller(0.5, 8.0), PierConfig::fixed(0.5, 8.0)];
        let err = SupportResolver::new(&mesh, 1e-3)
            .resolve(&piers, VerticalSupport::Settlement { rate: 0.0 })
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidSupport(_)));
    }

    #[test]
    fn test_layout_diagnostics() {
        let stable = check_support_layout(&[
            PierConfig::fixed_pin(0.0, 8.0),
            PierConfig::roller(0.5, 8.0),
            PierConfig::roller(1.0, 8.0),
        ]);
        assert!(stable.is_ok());
        assert_eq!(stable.warnings.len(), 1);

        let rollers = check_support_layout(&[
            PierConfig::roller(0.0, 8.0),
            PierConfig::roller(1.0, 8.0),
        ]);
        assert_eq!(rollers.errors.len(), 1);

        let cantilever = check_support_layout(&[PierConfig::new(0.0, SupportType::Fixed, 8.0)]);
        assert!(cantilever.is_ok());
        assert!(cantilever.warnings.is_empty());

        assert_eq!(check_support_layout(&[]).errors.len(), 2);
    }
}
