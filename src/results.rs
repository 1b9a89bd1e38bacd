//! Result types for bridge analysis

use serde::{Deserialize, Serialize};

use crate::analysis::EngineKind;
use crate::error::{BridgeError, ErrorKind};

/// Displacement of one node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodalDisplacement {
    pub node_id: usize,
    /// Node coordinate in m
    pub x: f64,
    /// Axial displacement in m
    pub u: f64,
    /// Vertical displacement in m (positive upward)
    pub v: f64,
    /// Rotation in rad (counter-clockwise positive)
    pub theta: f64,
}

/// Support forces at one pier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PierReaction {
    /// Index in the input pier list
    pub pier_index: usize,
    pub node_id: usize,
    /// Horizontal reaction in N
    pub fx: f64,
    /// Vertical reaction in N (positive upward)
    pub fy: f64,
    /// Moment reaction in N·m
    pub mz: f64,
    /// `fy` shared evenly between the pier's bearings
    pub fy_per_bearing: f64,
}

/// Internal forces at both ends of an element.
/// Tension and sagging moment are positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementForces {
    pub element_id: usize,
    pub x_i: f64,
    pub x_j: f64,
    pub axial_i: f64,
    pub shear_i: f64,
    pub moment_i: f64,
    pub axial_j: f64,
    pub shear_j: f64,
    pub moment_j: f64,
}

impl ElementForces {
    /// Build from local end forces `[N_i, V_i, M_i, N_j, V_j, M_j]` acting on the element
    pub fn from_local(element_id: usize, x_i: f64, x_j: f64, forces: &[f64; 6]) -> Self {
        Self {
            element_id,
            x_i,
            x_j,
            axial_i: -forces[0],
            shear_i: forces[1],
            moment_i: -forces[2],
            axial_j: forces[3],
            shear_j: -forces[4],
            moment_j: forces[5],
        }
    }
}

/// One diagram sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagramPoint {
    /// Position along the deck in m
    pub position: f64,
    pub value: f64,
}

impl DiagramPoint {
    pub fn new(position: f64, value: f64) -> Self {
        Self { position, value }
    }
}

/// Serviceability deflection limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeflectionCheck {
    /// Allowed deflection, longest pier spacing / 250
    pub limit: f64,
    /// Largest vertical deflection magnitude
    pub actual: f64,
    pub ok: bool,
}

/// Scalar extremes of a solved model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    /// Largest |v| in m
    pub max_displacement: f64,
    pub max_displacement_location: f64,
    /// Largest sagging moment in N·m
    pub max_moment: f64,
    pub max_moment_location: f64,
    /// Largest hogging moment (most negative) in N·m
    pub min_moment: f64,
    pub min_moment_location: f64,
    pub max_shear: f64,
    pub max_shear_location: f64,
    pub min_shear: f64,
    pub min_shear_location: f64,
    /// Sum of applied vertical loads in N
    pub total_applied_load: f64,
    pub total_vertical_reaction: f64,
    pub total_horizontal_reaction: f64,
    /// Sum of pier moment reactions in N·m
    pub total_moment_reaction: f64,
    /// Largest |fy| at any pier
    pub max_vertical_reaction: f64,
    /// Largest |fx| at any pier
    pub max_horizontal_reaction: f64,
    pub deflection_check: DeflectionCheck,
}

/// Error record of a failed analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Output of one analysis run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    /// Set when `success` is false
    pub error: Option<AnalysisError>,
    pub engine: Option<EngineKind>,
    pub displacements: Vec<NodalDisplacement>,
    pub reactions: Vec<PierReaction>,
    pub element_forces: Vec<ElementForces>,
    pub moment_diagram: Vec<DiagramPoint>,
    pub shear_diagram: Vec<DiagramPoint>,
    pub axial_diagram: Vec<DiagramPoint>,
    pub summary: Option<ResultSummary>,
    /// Support layout notes
    pub warnings: Vec<String>,
}

impl AnalysisResult {
    /// Failed result; carries no numeric data
    pub fn failure(error: &BridgeError) -> Self {
        Self {
            success: false,
            error: Some(AnalysisError {
                kind: error.kind(),
                message: error.to_string(),
            }),
            ..Self::default()
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    /// Reaction record of a pier
    pub fn reaction(&self, pier_index: usize) -> Option<&PierReaction> {
        self.reactions.iter().find(|r| r.pier_index == pier_index)
    }

    /// Vertical displacement of the node nearest `x`
    pub fn deflection_at(&self, x: f64) -> Option<f64> {
        self.displacements
            .iter()
            .min_by(|a, b| (a.x - x).abs().total_cmp(&(b.x - x).abs()))
            .map(|d| d.v)
    }
}

/// Pointwise max/min of a diagram over several solves
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeCurve {
    pub positions: Vec<f64>,
    pub max: Vec<f64>,
    pub min: Vec<f64>,
}

impl EnvelopeCurve {
    pub fn from_samples(samples: &[DiagramPoint]) -> Self {
        Self {
            positions: samples.iter().map(|p| p.position).collect(),
            max: samples.iter().map(|p| p.value).collect(),
            min: samples.iter().map(|p| p.value).collect(),
        }
    }

    /// Fold in another solve sampled at the same stations
    pub fn include(&mut self, samples: &[DiagramPoint]) {
        for (k, p) in samples.iter().enumerate().take(self.positions.len()) {
            self.max[k] = self.max[k].max(p.value);
            self.min[k] = self.min[k].min(p.value);
        }
    }

    /// Overall `(min, max)`
    pub fn range(&self) -> (f64, f64) {
        let max = self.max.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = self.min.iter().copied().fold(f64::INFINITY, f64::min);
        (min, max)
    }
}

/// Vertical reaction range at one pier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReactionEnvelope {
    pub pier_index: usize,
    pub max_fy: f64,
    pub min_fy: f64,
}

/// Moving-load envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Lead-axle stations in m
    pub vehicle_positions: Vec<f64>,
    pub moment: EnvelopeCurve,
    pub shear: EnvelopeCurve,
    /// Nodal vertical displacement
    pub displacement: EnvelopeCurve,
    pub reactions: Vec<ReactionEnvelope>,
}

impl Envelope {
    pub fn from_result(position: f64, result: &AnalysisResult) -> Self {
        Self {
            vehicle_positions: vec![position],
            moment: EnvelopeCurve::from_samples(&result.moment_diagram),
            shear: EnvelopeCurve::from_samples(&result.shear_diagram),
            displacement: EnvelopeCurve::from_samples(&displacement_samples(result)),
            reactions: result
                .reactions
                .iter()
                .map(|r| ReactionEnvelope {
                    pier_index: r.pier_index,
                    max_fy: r.fy,
                    min_fy: r.fy,
                })
                .collect(),
        }
    }

    pub fn include(&mut self, position: f64, result: &AnalysisResult) {
        self.vehicle_positions.push(position);
        self.moment.include(&result.moment_diagram);
        self.shear.include(&result.shear_diagram);
        self.displacement.include(&displacement_samples(result));
        for (envelope, r) in self.reactions.iter_mut().zip(&result.reactions) {
            envelope.max_fy = envelope.max_fy.max(r.fy);
            envelope.min_fy = envelope.min_fy.min(r.fy);
        }
    }
}

fn displacement_samples(result: &AnalysisResult) -> Vec<DiagramPoint> {
    result
        .displacements
        .iter()
        .map(|d| DiagramPoint::new(d.x, d.v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_has_no_data() {
        let result = AnalysisResult::failure(&BridgeError::InvalidLoad("x = 70 m".to_string()));
        assert!(!result.success);
        assert_eq!(result.error_kind(), Some(ErrorKind::InvalidLoad));
        assert!(result.displacements.is_empty());
        assert!(result.moment_diagram.is_empty());
        assert!(result.summary.is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"]["kind"], "InvalidLoadError");
    }

    #[test]
    fn test_element_forces_sign_convention() {
        // Simply supported element under a downward midspan load: no end moments
        let forces = ElementForces::from_local(0, 0.0, 4.0, &[0.0, 5.0, 0.0, 0.0, 5.0, 0.0]);
        assert_eq!(forces.shear_i, 5.0);
        assert_eq!(forces.shear_j, -5.0);
        assert_eq!(forces.moment_i, 0.0);
    }

    #[test]
    fn test_envelope_curve() {
        let mut curve = EnvelopeCurve::from_samples(&[DiagramPoint::new(0.0, 1.0), DiagramPoint::new(1.0, -2.0)]);
        curve.include(&[DiagramPoint::new(0.0, 3.0), DiagramPoint::new(1.0, -5.0)]);
        assert_eq!(curve.max, vec![3.0, -2.0]);
        assert_eq!(curve.min, vec![1.0, -5.0]);
        assert_eq!(curve.range(), (-5.0, 3.0));
    }
}
