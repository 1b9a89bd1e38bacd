//! Pier and support conditions

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};

/// Bearing type at a pier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportType {
    /// `u`, `v` and `θ` restrained
    Fixed,
    /// `u` and `v` restrained, `θ` free
    FixedPin,
    /// `v` restrained only
    Roller,
}

impl SupportType {
    /// Restraint mask `[u, v, θ]` before releases
    pub fn restraints(&self) -> [bool; 3] {
        match self {
            SupportType::Fixed => [true, true, true],
            SupportType::FixedPin => [true, true, false],
            SupportType::Roller => [false, true, false],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SupportType::Fixed => "Fixed (dx=0, dy=0, rz=0)",
            SupportType::FixedPin => "Fixed Pin (dx=0, dy=0, rz=free)",
            SupportType::Roller => "Roller (dx=free, dy=0, rz=free)",
        }
    }
}

/// Per-direction releases applied on top of the support type.
/// A released direction is left free even if the type restrains it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Releases {
    pub u: bool,
    pub v: bool,
    pub theta: bool,
}

impl Releases {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn as_array(&self) -> [bool; 3] {
        [self.u, self.v, self.theta]
    }
}

/// One pier (or abutment) under the deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PierConfig {
    /// Position as a fraction of total length (0-1)
    pub position: f64,
    /// Bearing type
    pub support: SupportType,
    /// Pier height in m
    pub height: f64,
    /// Optional per-direction releases
    #[serde(default)]
    pub releases: Releases,
    /// Bearings across the deck width, collapsed onto one node
    #[serde(default = "default_bearings")]
    pub bearings: usize,
}

fn default_bearings() -> usize {
    1
}

impl PierConfig {
    /// Create a new pier
    pub fn new(position: f64, support: SupportType, height: f64) -> Self {
        Self {
            position,
            support,
            height,
            releases: Releases::none(),
            bearings: 1,
        }
    }

    pub fn fixed(position: f64, height: f64) -> Self {
        Self::new(position, SupportType::Fixed, height)
    }

    pub fn fixed_pin(position: f64, height: f64) -> Self {
        Self::new(position, SupportType::FixedPin, height)
    }

    pub fn roller(position: f64, height: f64) -> Self {
        Self::new(position, SupportType::Roller, height)
    }

    /// Set per-direction releases
    pub fn with_releases(mut self, releases: Releases) -> Self {
        self.releases = releases;
        self
    }

    /// Set the number of transverse bearings
    pub fn with_bearings(mut self, bearings: usize) -> Self {
        self.bearings = bearings;
        self
    }

    /// Effective restraint mask `[u, v, θ]`
    pub fn restraints(&self) -> [bool; 3] {
        let mut mask = self.support.restraints();
        for (restrained, released) in mask.iter_mut().zip(self.releases.as_array()) {
            *restrained &= !released;
        }
        mask
    }

    pub fn validate(&self, index: usize) -> BridgeResult<()> {
        if !self.position.is_finite() || !(0.0..=1.0).contains(&self.position) {
            return Err(BridgeError::InvalidSupport(format!(
                "pier {index} position {} is outside [0, 1]",
                self.position
            )));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(BridgeError::InvalidSupport(format!(
                "pier {index} height must be positive, got {}",
                self.height
            )));
        }
        if self.bearings == 0 {
            return Err(BridgeError::InvalidSupport(format!(
                "pier {index} has no bearings"
            )));
        }
        if !self.restraints().iter().any(|&r| r) {
            return Err(BridgeError::InvalidSupport(format!(
                "pier {index} restrains no degree of freedom"
            )));
        }
        Ok(())
    }
}

/// Pier arrangement rules for standard 2- and 3-span decks
pub struct PierLayout;

impl PierLayout {
    /// Relative pier positions for `num_spans` spans, the first pier at `start_ratio`.
    pub fn positions(num_spans: usize, start_ratio: f64) -> BridgeResult<Vec<f64>> {
        if !start_ratio.is_finite() || !(0.0..1.0).contains(&start_ratio) {
            return Err(BridgeError::InvalidConfig(format!(
                "pier start position {start_ratio} must lie in [0, 1)"
            )));
        }
        match num_spans {
            2 if start_ratio == 0.0 => Ok(vec![0.0, 0.5, 1.0]),
            3 if start_ratio == 0.0 => Ok(vec![0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]),
            2 | 3 => {
                let span = (1.0 - start_ratio) / num_spans as f64;
                let mut positions: Vec<f64> =
                    (0..num_spans).map(|k| start_ratio + k as f64 * span).collect();
                positions.push(1.0);
                Ok(positions)
            }
            n => Err(BridgeError::InvalidConfig(format!(
                "only 2 or 3 spans are supported, got {n}"
            ))),
        }
    }

    /// Default piers: a fixed pin at the first pier, rollers elsewhere
    pub fn generate(num_spans: usize, start_ratio: f64, height: f64) -> BridgeResult<Vec<PierConfig>> {
        let piers = Self::positions(num_spans, start_ratio)?
            .into_iter()
            .enumerate()
            .map(|(k, position)| {
                if k == 0 {
                    PierConfig::fixed_pin(position, height)
                } else {
                    PierConfig::roller(position, height)
                }
            })
            .collect();
        Ok(piers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_restraints() {
        assert_eq!(SupportType::Fixed.restraints(), [true, true, true]);
        assert_eq!(SupportType::FixedPin.restraints(), [true, true, false]);
        assert_eq!(SupportType::Roller.restraints(), [false, true, false]);
        assert!(SupportType::FixedPin.description().contains("rz=free"));
    }

    #[test]
    fn test_releases() {
        let pier = PierConfig::fixed(0.0, 8.0).with_releases(Releases {
            theta: true,
            ..Releases::none()
        });
        assert_eq!(pier.restraints(), [true, true, false]);
    }

    #[test]
    fn test_pier_validation() {
        assert!(PierConfig::roller(0.5, 8.0).validate(0).is_ok());
        assert!(PierConfig::roller(1.2, 8.0).validate(0).is_err());
        assert!(PierConfig::roller(0.5, 0.0).validate(0).is_err());
        let released = PierConfig::roller(0.5, 8.0).with_releases(Releases {
            v: true,
            ..Releases::none()
        });
        assert!(released.validate(0).is_err());
    }

    #[test]
    fn test_layout() {
        assert_eq!(PierLayout::positions(2, 0.0).unwrap(), vec![0.0, 0.5, 1.0]);
        let shifted = PierLayout::positions(3, 0.1).unwrap();
        assert_eq!(shifted.len(), 4);
        assert!((shifted[1] - 0.4).abs() < 1e-12);
        assert!((shifted[2] - 0.7).abs() < 1e-12);
        assert!(PierLayout::positions(4, 0.0).is_err());

        let piers = PierLayout::generate(2, 0.0, 8.0).unwrap();
        assert_eq!(piers[0].support, SupportType::FixedPin);
        assert_eq!(piers[2].support, SupportType::Roller);
    }
}
