//! Solver strategies and the analysis pipeline

use log::{debug, info, warn};

use super::assembly::{global_stiffness, solve_partitioned};
use super::supports::{check_support_layout, SupportResolver, VerticalSupport};
use super::{AnalysisOptions, EngineKind};
use crate::error::BridgeResult;
use crate::loads::assemble_loads;
use crate::model::BridgeConfig;
use crate::postprocess::post_process;
use crate::results::AnalysisResult;

/// A bridge analysis strategy.
///
/// Implementations decide how piers hold the deck vertically; meshing,
/// loading, solving and post-processing are shared.
pub trait Solver {
    fn kind(&self) -> EngineKind;

    /// Vertical support model for these options
    fn vertical_support(&self, options: &AnalysisOptions) -> VerticalSupport;

    /// Run the full pipeline on a configuration
    fn analyze(&self, config: &BridgeConfig) -> BridgeResult<AnalysisResult> {
        let options = &config.options;
        options.validate()?;

        let mesh = config.mesh()?;

        let diagnostics = check_support_layout(&config.piers);
        for error in &diagnostics.errors {
            warn!("Support layout: {}", error);
        }
        for note in &diagnostics.warnings {
            debug!("Support layout: {}", note);
        }

        let boundary = SupportResolver::new(&mesh, options.snap_tolerance)
            .resolve(&config.piers, self.vertical_support(options))?;

        let self_weight = options.include_self_weight.then_some(options.gravity);
        let loads = assemble_loads(&mesh, &config.loads, self_weight)?;

        let k = global_stiffness(&mesh, &boundary)?;
        let solution = solve_partitioned(&k, &loads.nodal, &boundary, options.pivot_tolerance)?;

        let out = post_process(
            &mesh,
            &config.piers,
            &boundary,
            &loads,
            &solution,
            options.samples_per_element,
        )?;

        info!(
            "{:?} analysis: {} nodes, max |v| = {:.3} mm, M = [{:.1}, {:.1}] kN·m, ΣR = {:.1} kN",
            self.kind(),
            mesh.node_count(),
            out.summary.max_displacement * 1e3,
            out.summary.min_moment / 1e3,
            out.summary.max_moment / 1e3,
            out.summary.total_vertical_reaction / 1e3
        );

        Ok(AnalysisResult {
            success: true,
            error: None,
            engine: Some(self.kind()),
            displacements: out.displacements,
            reactions: out.reactions,
            element_forces: out.element_forces,
            moment_diagram: out.moment_diagram,
            shear_diagram: out.shear_diagram,
            axial_diagram: out.axial_diagram,
            summary: Some(out.summary),
            warnings: diagnostics.errors.into_iter().chain(diagnostics.warnings).collect(),
        })
    }
}

/// Rigid vertical supports; shorter piers receive an upward imposed settlement
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementSolver;

impl Solver for SettlementSolver {
    fn kind(&self) -> EngineKind {
        EngineKind::Settlement
    }

    fn vertical_support(&self, options: &AnalysisOptions) -> VerticalSupport {
        VerticalSupport::Settlement {
            rate: options.settlement_rate,
        }
    }
}

/// Vertical supports as axial pier springs
#[derive(Debug, Clone, Copy, Default)]
pub struct ElasticPierSolver;

impl Solver for ElasticPierSolver {
    fn kind(&self) -> EngineKind {
        EngineKind::ElasticPier
    }

    fn vertical_support(&self, options: &AnalysisOptions) -> VerticalSupport {
        VerticalSupport::Elastic {
            modulus: options.pier_modulus,
            area: options.pier_area,
        }
    }
}

pub fn solver_for(kind: EngineKind) -> Box<dyn Solver> {
    match kind {
        EngineKind::Settlement => Box::new(SettlementSolver),
        EngineKind::ElasticPier => Box::new(ElasticPierSolver),
    }
}

/// Analyze with the engine named in the options
pub fn analyze(config: &BridgeConfig) -> BridgeResult<AnalysisResult> {
    solver_for(config.options.engine).analyze(config)
}

/// Analyze, turning any error into a failed result
pub fn run(config: &BridgeConfig) -> AnalysisResult {
    match analyze(config) {
        Ok(result) => result,
        Err(e) => {
            warn!("Analysis failed ({}): {}", e.kind(), e);
            AnalysisResult::failure(&e)
        }
    }
}
