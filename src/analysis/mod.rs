//! Analysis options, support resolution and the linear solver

pub mod assembly;
mod engine;
mod envelope;
mod supports;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};

pub use engine::{analyze, run, solver_for, ElasticPierSolver, SettlementSolver, Solver};
pub use envelope::moving_load_envelope;
pub use supports::{
    check_support_layout, BoundaryCondition, BoundaryMap, PierSupport, SupportDiagnostics,
    SupportResolver, VerticalSupport,
};

/// How pier height differences reach the deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Rigid vertical supports with imposed settlement on shorter piers
    #[default]
    Settlement,
    /// Vertical supports as axial pier springs `E·A/h`
    ElasticPier,
}

/// Options for a bridge analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Solver strategy
    pub engine: EngineKind,
    /// Imposed settlement per metre of height difference (m/m)
    pub settlement_rate: f64,
    /// Maximum distance between a pier and its node in m
    pub snap_tolerance: f64,
    /// Relative pivot size below which the system is singular
    pub pivot_tolerance: f64,
    /// Diagram stations per element (ends included)
    pub samples_per_element: usize,
    /// Add the deck self-weight as a uniform load
    pub include_self_weight: bool,
    /// Gravitational acceleration in m/s²
    pub gravity: f64,
    /// Pier elastic modulus in Pa (elastic-pier engine)
    pub pier_modulus: f64,
    /// Pier cross-sectional area in m² (elastic-pier engine)
    pub pier_area: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            engine: EngineKind::Settlement,
            settlement_rate: 0.001,
            snap_tolerance: 1e-3,
            pivot_tolerance: 1e-10,
            samples_per_element: 5,
            include_self_weight: false,
            gravity: 9.81,
            pier_modulus: 30e9,
            pier_area: 0.8,
        }
    }
}

impl AnalysisOptions {
    /// Options for the elastic-pier engine
    pub fn elastic_pier() -> Self {
        Self {
            engine: EngineKind::ElasticPier,
            ..Self::default()
        }
    }

    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    /// Set the settlement rate (m per m of height difference)
    pub fn with_settlement_rate(mut self, rate: f64) -> Self {
        self.settlement_rate = rate;
        self
    }

    /// Set the pier snapping tolerance
    pub fn with_snap_tolerance(mut self, tol: f64) -> Self {
        self.snap_tolerance = tol;
        self
    }

    pub fn with_pivot_tolerance(mut self, tol: f64) -> Self {
        self.pivot_tolerance = tol;
        self
    }

    /// Set the number of diagram stations per element
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples_per_element = samples;
        self
    }

    /// Include self-weight
    pub fn with_self_weight(mut self) -> Self {
        self.include_self_weight = true;
        self
    }

    /// Set pier stiffness properties
    pub fn with_pier_properties(mut self, modulus: f64, area: f64) -> Self {
        self.pier_modulus = modulus;
        self.pier_area = area;
        self
    }

    pub fn validate(&self) -> BridgeResult<()> {
        let positive = [
            ("snap_tolerance", self.snap_tolerance),
            ("pivot_tolerance", self.pivot_tolerance),
            ("gravity", self.gravity),
            ("pier_modulus", self.pier_modulus),
            ("pier_area", self.pier_area),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(BridgeError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !self.settlement_rate.is_finite() || self.settlement_rate < 0.0 {
            return Err(BridgeError::InvalidConfig(format!(
                "settlement_rate must be non-negative, got {}",
                self.settlement_rate
            )));
        }
        if self.samples_per_element < 2 {
            return Err(BridgeError::InvalidConfig(format!(
                "samples_per_element must be at least 2, got {}",
                self.samples_per_element
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = AnalysisOptions::default();
        assert_eq!(options.engine, EngineKind::Settlement);
        assert_eq!(options.settlement_rate, 0.001);
        assert!(options.validate().is_ok());
        assert_eq!(AnalysisOptions::elastic_pier().engine, EngineKind::ElasticPier);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: AnalysisOptions =
            serde_json::from_str(r#"{"engine":"elastic_pier","samples_per_element":9}"#).unwrap();
        assert_eq!(options.engine, EngineKind::ElasticPier);
        assert_eq!(options.samples_per_element, 9);
        assert_eq!(options.snap_tolerance, 1e-3);
    }

    #[test]
    fn test_invalid_options() {
        assert!(AnalysisOptions::default().with_samples(1).validate().is_err());
        assert!(AnalysisOptions::default().with_snap_tolerance(0.0).validate().is_err());
        assert!(AnalysisOptions::default()
            .with_settlement_rate(-1.0)
            .validate()
            .is_err());
    }
}
