//! Load definitions

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};

/// A location along the deck
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Distance from the left end in m
    Absolute(f64),
    /// Fraction of total length (0-1)
    Ratio(f64),
}

impl Position {
    /// Distance from the left end in m
    pub fn resolve(&self, length: f64) -> f64 {
        match *self {
            Position::Absolute(x) => x,
            Position::Ratio(r) => r * length,
        }
    }
}

impl From<f64> for Position {
    fn from(x: f64) -> Self {
        Position::Absolute(x)
    }
}

/// A vehicle with equally spaced axles.
/// Axle `k` sits at `position + k * axle_spacing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleLoad {
    /// Axle loads in N (negative = downward)
    pub axle_loads: Vec<f64>,
    /// Distance between consecutive axles in m
    pub axle_spacing: f64,
    /// Lead axle position
    pub position: Position,
}

impl VehicleLoad {
    pub fn new(axle_loads: Vec<f64>, axle_spacing: f64, position: impl Into<Position>) -> Self {
        Self {
            axle_loads,
            axle_spacing,
            position: position.into(),
        }
    }

    /// Two-axle truck
    pub fn two_axle(front: f64, rear: f64, axle_spacing: f64, position: impl Into<Position>) -> Self {
        Self::new(vec![front, rear], axle_spacing, position)
    }

    /// The same vehicle with its lead axle moved
    pub fn at(&self, position: impl Into<Position>) -> Self {
        Self {
            position: position.into(),
            ..self.clone()
        }
    }

    /// Total weight of all axles
    pub fn total(&self) -> f64 {
        self.axle_loads.iter().sum()
    }

    /// `(x, load)` of every axle on `[0, length]`; axles past the far end are off the deck
    pub fn axles_on_deck(&self, length: f64, tol: f64) -> Vec<(f64, f64)> {
        let lead = self.position.resolve(length);
        self.axle_loads
            .iter()
            .enumerate()
            .map(|(k, &p)| (lead + k as f64 * self.axle_spacing, p))
            .filter(|&(x, _)| x <= length + tol)
            .collect()
    }

    pub fn validate(&self) -> BridgeResult<()> {
        if self.axle_loads.is_empty() {
            return Err(BridgeError::InvalidLoad("vehicle has no axles".to_string()));
        }
        if let Some(p) = self.axle_loads.iter().find(|p| !p.is_finite()) {
            return Err(BridgeError::InvalidLoad(format!("axle load {p} is not finite")));
        }
        if !self.axle_spacing.is_finite() || self.axle_spacing < 0.0 {
            return Err(BridgeError::InvalidLoad(format!(
                "axle spacing must be non-negative, got {}",
                self.axle_spacing
            )));
        }
        Ok(())
    }
}

/// A load on the deck; vertical, positive upward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Load {
    /// Concentrated force in N
    Point { magnitude: f64, position: Position },
    /// Uniform line load in N/m over `[start, end]`
    Distributed {
        magnitude_per_length: f64,
        start: Position,
        end: Position,
    },
    /// Axle group
    Vehicle(VehicleLoad),
}

impl Load {
    /// Point load at `x` m
    pub fn point(magnitude: f64, x: f64) -> Self {
        Load::Point {
            magnitude,
            position: Position::Absolute(x),
        }
    }

    /// Point load at a fraction of the length
    pub fn point_at_ratio(magnitude: f64, ratio: f64) -> Self {
        Load::Point {
            magnitude,
            position: Position::Ratio(ratio),
        }
    }

    /// Uniform load between `start` and `end` m
    pub fn distributed(magnitude_per_length: f64, start: f64, end: f64) -> Self {
        Load::Distributed {
            magnitude_per_length,
            start: Position::Absolute(start),
            end: Position::Absolute(end),
        }
    }

    /// Uniform load over the whole deck
    pub fn uniform(magnitude_per_length: f64) -> Self {
        Load::Distributed {
            magnitude_per_length,
            start: Position::Ratio(0.0),
            end: Position::Ratio(1.0),
        }
    }

    pub fn vehicle(vehicle: VehicleLoad) -> Self {
        Load::Vehicle(vehicle)
    }
}
