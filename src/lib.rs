//! Bridge FEA - static analysis of multi-span continuous beam bridges
//!
//! The deck is modelled as a line of 2D Euler-Bernoulli beam elements with
//! three DOFs per node (`u`, `v`, `θ`). Supports:
//! - Fixed, fixed-pin and roller piers with per-direction releases
//! - Pier height differences as imposed settlement or as elastic pier springs
//! - Point, distributed and multi-axle vehicle loads
//! - Moment, shear and axial diagrams, reactions per pier and moving-load envelopes
//!
//! ## Example
//! ```rust
//! use bridge_fea::prelude::*;
//!
//! let config = BridgeConfig::new(40.0, 20)
//!     .with_piers(vec![
//!         PierConfig::fixed_pin(0.0, 8.0),
//!         PierConfig::roller(0.5, 7.0),
//!         PierConfig::roller(1.0, 8.0),
//!     ])
//!     .with_loads(vec![Load::uniform(-20e3), Load::point(-150e3, 10.0)]);
//!
//! let result = run(&config);
//! assert!(result.success);
//!
//! let summary = result.summary.unwrap();
//! println!("max moment: {:.1} kN·m", summary.max_moment / 1e3);
//! ```

pub mod analysis;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod mesh;
pub mod model;
pub mod postprocess;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{
        analyze, check_support_layout, moving_load_envelope, run, solver_for, AnalysisOptions,
        ElasticPierSolver, EngineKind, SettlementSolver, Solver,
    };
    pub use crate::elements::{
        MaterialGrade, PierConfig, PierLayout, Releases, SectionOverride, SectionProperties,
        SupportType,
    };
    pub use crate::error::{BridgeError, BridgeResult, ErrorKind};
    pub use crate::loads::{Load, Position, VehicleLoad};
    pub use crate::mesh::{Mesh, MeshBuilder};
    pub use crate::model::BridgeConfig;
    pub use crate::results::{
        AnalysisResult, DeflectionCheck, DiagramPoint, ElementForces, Envelope,
        NodalDisplacement, PierReaction, ResultSummary,
    };
}
