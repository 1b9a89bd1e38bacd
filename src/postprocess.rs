//! Post-processor - element forces, diagrams, reactions and extremes

use nalgebra::DVector;

use crate::analysis::assembly::LinearSolution;
use crate::analysis::BoundaryMap;
use crate::elements::{PierConfig, DOF_THETA, DOF_U, DOF_V};
use crate::error::BridgeResult;
use crate::loads::{AssembledLoads, ElementLoading};
use crate::math::{self, Vec6};
use crate::mesh::Mesh;
use crate::results::{
    DeflectionCheck, DiagramPoint, ElementForces, NodalDisplacement, PierReaction, ResultSummary,
};

/// Span-to-deflection ratio of the serviceability check
pub const DEFLECTION_RATIO: f64 = 250.0;

/// Local end forces `K_local · T · d + FER` acting on an element
pub fn element_end_forces(
    mesh: &Mesh,
    element: usize,
    displacements: &DVector<f64>,
    loading: &ElementLoading,
) -> BridgeResult<Vec6> {
    let el = &mesh.elements[element];
    let section = mesh.section(el);
    let k_local = math::beam_local_stiffness(el.length, section.e, section.a, section.i)?;
    let (cos, sin) = el.direction_cosines();
    let t = math::beam_transformation_matrix(cos, sin);

    let d_global = Vec6::from_iterator(el.dofs().iter().map(|&d| displacements[d]));
    Ok(k_local * (t * d_global) + loading.fer)
}

/// Internal forces along one element, from its i-end forces and span loads
struct ElementDiagram<'a> {
    x_i: f64,
    forces: ElementForces,
    loading: &'a ElementLoading,
}

impl ElementDiagram<'_> {
    fn moment(&self, s: f64) -> f64 {
        self.forces.moment_i + self.forces.shear_i * s + self.loading.moment_increment(s)
    }

    fn shear(&self, s: f64) -> f64 {
        self.forces.shear_i + self.loading.shear_increment(s)
    }

    /// Station offsets, interior point-load positions and zero-shear points
    fn critical_offsets(&self, stations: &[f64], length: f64) -> Vec<f64> {
        let mut offsets = stations.to_vec();
        offsets.extend(self.loading.point_loads.iter().map(|(a, _)| *a));
        offsets.extend(self.zero_shear_offsets(length));
        offsets
    }

    /// Offsets where the shear changes sign inside a loaded interval.
    /// Between load breakpoints the shear is linear in `s`.
    fn zero_shear_offsets(&self, length: f64) -> Vec<f64> {
        let mut breaks: Vec<f64> = vec![0.0, length];
        breaks.extend(self.loading.point_loads.iter().map(|(a, _)| *a));
        for (a, b, _) in &self.loading.segments {
            breaks.push(*a);
            breaks.push(*b);
        }
        breaks.sort_by(f64::total_cmp);
        breaks.dedup();

        let mut offsets = Vec::new();
        for pair in breaks.windows(2) {
            let (s0, s1) = (pair[0], pair[1]);
            let mid = 0.5 * (s0 + s1);
            let q: f64 = self
                .loading
                .segments
                .iter()
                .filter(|(a, b, _)| *a <= mid && *b >= mid)
                .map(|(_, _, w)| w)
                .sum();
            if q == 0.0 {
                continue;
            }
            let s = s0 - self.shear(s0) / q;
            if s > s0 && s < s1 {
                offsets.push(s);
            }
        }
        offsets
    }
}

/// Running extreme with its location
#[derive(Debug, Clone, Copy)]
struct Extreme {
    value: f64,
    location: f64,
}

impl Extreme {
    fn max() -> Self {
        Self {
            value: f64::NEG_INFINITY,
            location: 0.0,
        }
    }

    fn min() -> Self {
        Self {
            value: f64::INFINITY,
            location: 0.0,
        }
    }

    fn above(&mut self, value: f64, location: f64) {
        if value > self.value {
            *self = Self { value, location };
        }
    }

    fn below(&mut self, value: f64, location: f64) {
        if value < self.value {
            *self = Self { value, location };
        }
    }

    /// Zero when nothing was sampled
    fn finite(self) -> Self {
        if self.value.is_finite() {
            self
        } else {
            Self {
                value: 0.0,
                location: 0.0,
            }
        }
    }
}

/// Everything the post-processor recovers from a solution
pub struct PostProcessed {
    pub displacements: Vec<NodalDisplacement>,
    pub reactions: Vec<PierReaction>,
    pub element_forces: Vec<ElementForces>,
    pub moment_diagram: Vec<DiagramPoint>,
    pub shear_diagram: Vec<DiagramPoint>,
    pub axial_diagram: Vec<DiagramPoint>,
    pub summary: ResultSummary,
}

/// Recover engineering quantities from a solved system
pub fn post_process(
    mesh: &Mesh,
    piers: &[PierConfig],
    boundary: &BoundaryMap,
    loads: &AssembledLoads,
    solution: &LinearSolution,
    samples_per_element: usize,
) -> BridgeResult<PostProcessed> {
    let x = &solution.displacements;

    let displacements: Vec<NodalDisplacement> = mesh
        .nodes
        .iter()
        .map(|n| NodalDisplacement {
            node_id: n.id,
            x: n.x,
            u: x[n.dof(DOF_U)],
            v: x[n.dof(DOF_V)],
            theta: x[n.dof(DOF_THETA)],
        })
        .collect();

    let reactions = pier_reactions(mesh, boundary, &solution.reactions);

    let samples = samples_per_element.max(2);
    let mut element_forces = Vec::with_capacity(mesh.elements.len());
    let mut moment_diagram = Vec::with_capacity(mesh.elements.len() * samples);
    let mut shear_diagram = Vec::with_capacity(mesh.elements.len() * samples);
    let mut axial_diagram = Vec::with_capacity(mesh.elements.len() * samples);

    let (mut max_moment, mut min_moment) = (Extreme::max(), Extreme::min());
    let (mut max_shear, mut min_shear) = (Extreme::max(), Extreme::min());

    for (e, element) in mesh.elements.iter().enumerate() {
        let loading = &loads.elements[e];
        let f = element_end_forces(mesh, e, x, loading)?;
        let forces = ElementForces::from_local(
            element.id,
            element.x_i,
            element.x_j(),
            &[f[0], f[1], f[2], f[3], f[4], f[5]],
        );
        element_forces.push(forces);

        let diagram = ElementDiagram {
            x_i: element.x_i,
            forces,
            loading,
        };
        let stations: Vec<f64> = (0..samples)
            .map(|k| element.length * k as f64 / (samples - 1) as f64)
            .collect();

        for &s in &stations {
            let position = diagram.x_i + s;
            moment_diagram.push(DiagramPoint::new(position, diagram.moment(s)));
            shear_diagram.push(DiagramPoint::new(position, diagram.shear(s)));
            axial_diagram.push(DiagramPoint::new(position, forces.axial_i));
        }

        for s in diagram.critical_offsets(&stations, element.length) {
            let position = diagram.x_i + s;
            let moment = diagram.moment(s);
            max_moment.above(moment, position);
            min_moment.below(moment, position);

            // Both sides of a shear jump
            let ahead = diagram.shear(s);
            let behind = if s > 0.0 {
                diagram.shear(s - 1e-12 * element.length)
            } else {
                ahead
            };
            for v in [ahead, behind] {
                max_shear.above(v, position);
                min_shear.below(v, position);
            }
        }
    }

    let mut max_displacement = Extreme::max();
    for d in &displacements {
        max_displacement.above(d.v.abs(), d.x);
    }
    let max_displacement = max_displacement.finite();

    let total_vertical_reaction: f64 = reactions.iter().map(|r| r.fy).sum();
    let total_horizontal_reaction: f64 = reactions.iter().map(|r| r.fx).sum();
    let total_moment_reaction: f64 = reactions.iter().map(|r| r.mz).sum();
    let max_vertical_reaction = reactions.iter().map(|r| r.fy.abs()).fold(0.0, f64::max);
    let max_horizontal_reaction = reactions.iter().map(|r| r.fx.abs()).fold(0.0, f64::max);

    let (max_moment, min_moment) = (max_moment.finite(), min_moment.finite());
    let (max_shear, min_shear) = (max_shear.finite(), min_shear.finite());

    let summary = ResultSummary {
        max_displacement: max_displacement.value,
        max_displacement_location: max_displacement.location,
        max_moment: max_moment.value,
        max_moment_location: max_moment.location,
        min_moment: min_moment.value,
        min_moment_location: min_moment.location,
        max_shear: max_shear.value,
        max_shear_location: max_shear.location,
        min_shear: min_shear.value,
        min_shear_location: min_shear.location,
        total_applied_load: loads.total_vertical,
        total_vertical_reaction,
        total_horizontal_reaction,
        total_moment_reaction,
        max_vertical_reaction,
        max_horizontal_reaction,
        deflection_check: deflection_check(piers, mesh.length, max_displacement.value),
    };

    Ok(PostProcessed {
        displacements,
        reactions,
        element_forces,
        moment_diagram,
        shear_diagram,
        axial_diagram,
        summary,
    })
}

/// Support forces at each pier node, in input order
pub fn pier_reactions(mesh: &Mesh, boundary: &BoundaryMap, reactions: &DVector<f64>) -> Vec<PierReaction> {
    boundary
        .piers
        .iter()
        .map(|support| {
            let node = &mesh.nodes[support.node];
            let fy = reactions[node.dof(DOF_V)];
            PierReaction {
                pier_index: support.pier,
                node_id: node.id,
                fx: reactions[node.dof(DOF_U)],
                fy,
                mz: reactions[node.dof(DOF_THETA)],
                fy_per_bearing: fy / support.bearings.max(1) as f64,
            }
        })
        .collect()
}

/// Deflection limit from the longest distance between consecutive piers
pub fn deflection_check(piers: &[PierConfig], length: f64, actual: f64) -> DeflectionCheck {
    let mut positions: Vec<f64> = piers.iter().map(|p| p.position * length).collect();
    positions.sort_by(f64::total_cmp);

    let span = positions
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(0.0, f64::max);
    let span = if span > 0.0 { span } else { length };

    let limit = span / DEFLECTION_RATIO;
    DeflectionCheck {
        limit,
        actual,
        ok: actual <= limit,
    }
}
