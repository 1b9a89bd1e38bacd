//! Bridge FEA Example - three-span continuous deck

use anyhow::{bail, Context, Result};
use bridge_fea::prelude::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== Bridge FEA Example: 60 m three-span deck ===\n");

    //   fixed pin     roller      roller      roller
    //      |-----------|-----------|-----------|
    //     0 m         20 m        40 m        60 m
    //    h = 8       h = 6       h = 7       h = 8
    let piers = vec![
        PierConfig::fixed_pin(0.0, 8.0).with_bearings(2),
        PierConfig::roller(1.0 / 3.0, 6.0).with_bearings(2),
        PierConfig::roller(2.0 / 3.0, 7.0).with_bearings(2),
        PierConfig::roller(1.0, 8.0).with_bearings(2),
    ];
    for (k, pier) in piers.iter().enumerate() {
        println!(
            "Pier {k}: x = {:>4.1} m, h = {:.1} m, {}",
            pier.position * 60.0,
            pier.height,
            pier.support.description()
        );
    }
    println!();
    let section = SectionProperties::rectangular_grade(MaterialGrade::C40, 1.2, 1.6);

    let mut config = BridgeConfig::continuous(60.0, 60, section, piers)
        .context("building the bridge")?
        .with_options(AnalysisOptions::default().with_self_weight());

    // 20 kN/m lane load and a 150 kN point load in the middle span
    config.add_load(Load::uniform(-20e3));
    config.add_load(Load::point(-150e3, 30.0));

    for engine in [EngineKind::Settlement, EngineKind::ElasticPier] {
        let mut run_config = config.clone();
        run_config.options = run_config.options.with_engine(engine);

        let result = run(&run_config);
        if !result.success {
            let error = result.error.map(|e| e.message).unwrap_or_default();
            bail!("{engine:?} analysis failed: {error}");
        }
        let summary = result.summary.context("successful analysis without summary")?;

        println!("--- {engine:?} engine ---");
        println!(
            "Max deflection: {:.2} mm at x = {:.1} m (limit {:.1} mm, {})",
            summary.max_displacement * 1e3,
            summary.max_displacement_location,
            summary.deflection_check.limit * 1e3,
            if summary.deflection_check.ok { "OK" } else { "EXCEEDED" }
        );
        println!(
            "Moment: max {:.1} kN·m at {:.1} m, min {:.1} kN·m at {:.1} m",
            summary.max_moment / 1e3,
            summary.max_moment_location,
            summary.min_moment / 1e3,
            summary.min_moment_location
        );
        println!(
            "Shear: max {:.1} kN, min {:.1} kN",
            summary.max_shear / 1e3,
            summary.min_shear / 1e3
        );
        println!("Reactions:");
        for r in &result.reactions {
            println!(
                "  Pier {}: Fx = {:>9.1} kN, Fy = {:>9.1} kN ({:.1} kN per bearing), Mz = {:>8.1} kN·m",
                r.pier_index,
                r.fx / 1e3,
                r.fy / 1e3,
                r.fy_per_bearing / 1e3,
                r.mz / 1e3
            );
        }
        let middle = result.reaction(1).context("no reaction at pier 1")?;
        println!(
            "Shortest pier (1) carries {:.1}% of the load",
            100.0 * middle.fy / -summary.total_applied_load
        );
        println!(
            "Equilibrium: applied {:.1} kN, reactions {:.1} kN, ΣMz = {:.1} kN·m\n",
            summary.total_applied_load / 1e3,
            summary.total_vertical_reaction / 1e3,
            summary.total_moment_reaction / 1e3
        );
    }

    // Three-axle truck crossing the deck
    let truck = VehicleLoad::new(vec![-60e3, -120e3, -120e3], 4.0, 0.0);
    let envelope = moving_load_envelope(&config, &truck, 60)?;
    let (m_min, m_max) = envelope.moment.range();
    println!("--- Moving load envelope ({} stations) ---", envelope.vehicle_positions.len());
    println!("Moment range: {:.1} to {:.1} kN·m", m_min / 1e3, m_max / 1e3);
    for r in &envelope.reactions {
        println!(
            "  Pier {}: Fy from {:.1} to {:.1} kN",
            r.pier_index,
            r.min_fy / 1e3,
            r.max_fy / 1e3
        );
    }

    // A misplaced load is reported, not solved
    let mut bad = config.clone();
    bad.add_load(Load::point(-10e3, 75.0));
    let failed = run(&bad);
    println!(
        "\nLoad at 75 m: success = {}, error = {:?}",
        failed.success,
        failed.error_kind()
    );

    Ok(())
}
