//! Section and material properties for the deck

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};

/// Elastic section properties of a beam segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Modulus of elasticity in Pa
    pub e: f64,
    /// Cross-sectional area in m²
    pub a: f64,
    /// Second moment of area in m⁴
    pub i: f64,
    /// Density in kg/m³
    pub rho: f64,
}

impl SectionProperties {
    /// Create a new section with the given properties
    pub fn new(e: f64, a: f64, i: f64, rho: f64) -> Self {
        Self { e, a, i, rho }
    }

    /// Create a solid rectangular section
    pub fn rectangular(e: f64, width: f64, height: f64, rho: f64) -> Self {
        Self {
            e,
            a: width * height,
            i: width * height.powi(3) / 12.0,
            rho,
        }
    }

    /// Create a rectangular section from a material preset
    pub fn rectangular_grade(grade: MaterialGrade, width: f64, height: f64) -> Self {
        Self::rectangular(grade.modulus(), width, height, grade.density())
    }

    /// Self-weight per unit length in N/m
    pub fn weight_per_length(&self, gravity: f64) -> f64 {
        self.rho * gravity * self.a
    }

    /// Flexural rigidity `EI`
    pub fn ei(&self) -> f64 {
        self.e * self.i
    }

    /// Check that the properties describe a physical section
    pub fn validate(&self) -> BridgeResult<()> {
        let positive = [("E", self.e), ("A", self.a), ("I", self.i)];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(BridgeError::InvalidConfig(format!(
                    "section property {name} must be positive, got {value}"
                )));
            }
        }
        if !self.rho.is_finite() || self.rho < 0.0 {
            return Err(BridgeError::InvalidConfig(format!(
                "density must be non-negative, got {}",
                self.rho
            )));
        }
        Ok(())
    }
}

impl Default for SectionProperties {
    fn default() -> Self {
        // 1.0 m wide x 1.5 m deep C30 deck
        Self::rectangular_grade(MaterialGrade::C30, 1.0, 1.5)
    }
}

/// Common deck materials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialGrade {
    C30,
    C40,
    C50,
    Steel,
    Prestressed,
}

impl MaterialGrade {
    /// Modulus of elasticity in Pa
    pub fn modulus(&self) -> f64 {
        match self {
            MaterialGrade::C30 => 30e9,
            MaterialGrade::C40 => 32.5e9,
            MaterialGrade::C50 => 34.5e9,
            MaterialGrade::Steel => 200e9,
            MaterialGrade::Prestressed => 36e9,
        }
    }

    /// Density in kg/m³
    pub fn density(&self) -> f64 {
        match self {
            MaterialGrade::C30 => 2400.0,
            MaterialGrade::C40 => 2450.0,
            MaterialGrade::C50 | MaterialGrade::Prestressed => 2500.0,
            MaterialGrade::Steel => 7850.0,
        }
    }
}

/// Section used over part of the deck instead of the base section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionOverride {
    /// Start as a fraction of total length
    pub start_ratio: f64,
    /// End as a fraction of total length
    pub end_ratio: f64,
    pub section: SectionProperties,
}

impl SectionOverride {
    pub fn new(start_ratio: f64, end_ratio: f64, section: SectionProperties) -> Self {
        Self {
            start_ratio,
            end_ratio,
            section,
        }
    }

    /// Whether an element with this mid-point ratio falls under the override
    pub fn covers(&self, ratio: f64) -> bool {
        ratio >= self.start_ratio && ratio <= self.end_ratio
    }

    pub fn validate(&self) -> BridgeResult<()> {
        let in_range = |r: f64| r.is_finite() && (0.0..=1.0).contains(&r);
        if !in_range(self.start_ratio)
            || !in_range(self.end_ratio)
            || self.start_ratio >= self.end_ratio
        {
            return Err(BridgeError::InvalidConfig(format!(
                "section override range [{}, {}] is not a sub-range of [0, 1]",
                self.start_ratio, self.end_ratio
            )));
        }
        self.section.validate()
    }
}
