//! Bridge model - the input record of an analysis

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisOptions;
use crate::elements::{PierConfig, PierLayout, SectionOverride, SectionProperties};
use crate::error::{BridgeError, BridgeResult};
use crate::loads::Load;
use crate::mesh::{Mesh, MeshBuilder};

/// Default pier height in m
const DEFAULT_PIER_HEIGHT: f64 = 8.0;

/// A continuous beam bridge: geometry, section, piers and loads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Total deck length in m
    pub length: f64,
    /// Number of beam elements
    pub element_count: usize,
    /// Span length fractions; empty for uniform spacing
    pub span_ratios: Vec<f64>,
    /// Base deck section
    pub section: SectionProperties,
    /// Per-span section changes
    pub overrides: Vec<SectionOverride>,
    pub piers: Vec<PierConfig>,
    pub loads: Vec<Load>,
    pub options: AnalysisOptions,
}

impl Default for BridgeConfig {
    /// 60 m three-span deck on four piers, unloaded
    fn default() -> Self {
        Self {
            length: 60.0,
            element_count: 30,
            span_ratios: Vec::new(),
            section: SectionProperties::default(),
            overrides: Vec::new(),
            piers: PierLayout::generate(3, 0.0, DEFAULT_PIER_HEIGHT).unwrap_or_default(),
            loads: Vec::new(),
            options: AnalysisOptions::default(),
        }
    }
}

impl BridgeConfig {
    /// Deck of `length` with `element_count` elements, default section, no piers
    pub fn new(length: f64, element_count: usize) -> Self {
        Self {
            length,
            element_count,
            piers: Vec::new(),
            ..Self::default()
        }
    }

    /// Continuous deck whose spans run between consecutive piers.
    ///
    /// A leading or trailing overhang beyond the outer piers becomes a span
    /// of its own, so every pier lands on a node.
    pub fn continuous(
        length: f64,
        element_count: usize,
        section: SectionProperties,
        piers: Vec<PierConfig>,
    ) -> BridgeResult<Self> {
        let mut cuts: Vec<f64> = piers.iter().map(|p| p.position).collect();
        cuts.push(0.0);
        cuts.push(1.0);
        cuts.sort_by(f64::total_cmp);
        cuts.dedup_by(|a, b| (*a - *b).abs() < 1e-12);

        if let Some(bad) = cuts.iter().find(|c| !c.is_finite() || **c < 0.0 || **c > 1.0) {
            return Err(BridgeError::InvalidSupport(format!(
                "pier position {bad} is outside [0, 1]"
            )));
        }

        let span_ratios = cuts.windows(2).map(|w| w[1] - w[0]).collect();

        Ok(Self {
            length,
            element_count,
            span_ratios,
            section,
            piers,
            ..Self::default()
        })
    }

    pub fn with_span_ratios(mut self, ratios: Vec<f64>) -> Self {
        self.span_ratios = ratios;
        self
    }

    pub fn with_section(mut self, section: SectionProperties) -> Self {
        self.section = section;
        self
    }

    pub fn with_overrides(mut self, overrides: Vec<SectionOverride>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_piers(mut self, piers: Vec<PierConfig>) -> Self {
        self.piers = piers;
        self
    }

    pub fn with_loads(mut self, loads: Vec<Load>) -> Self {
        self.loads = loads;
        self
    }

    /// Add one load
    pub fn add_load(&mut self, load: Load) {
        self.loads.push(load);
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    /// Discretize the deck
    pub fn mesh(&self) -> BridgeResult<Mesh> {
        MeshBuilder::new(self.length, self.element_count)
            .with_span_ratios(&self.span_ratios)
            .with_section(self.section)
            .with_overrides(&self.overrides)
            .build()
    }

    pub fn from_json(json: &str) -> BridgeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> BridgeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
