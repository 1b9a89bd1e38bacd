//! Moving-load envelope

use log::{debug, info};

use super::engine::solver_for;
use crate::error::{BridgeError, BridgeResult};
use crate::loads::{Load, Position, VehicleLoad};
use crate::model::BridgeConfig;
use crate::results::Envelope;

/// Sweep a vehicle across the deck and take pointwise extremes.
///
/// The lead axle visits `steps + 1` evenly spaced stations on `[0, L]`;
/// each station is an independent solve with the configured loads plus the
/// vehicle. Axles that run past the far end are off the deck.
pub fn moving_load_envelope(
    config: &BridgeConfig,
    vehicle: &VehicleLoad,
    steps: usize,
) -> BridgeResult<Envelope> {
    if steps == 0 {
        return Err(BridgeError::InvalidConfig(
            "moving load sweep needs at least one step".to_string(),
        ));
    }
    vehicle.validate()?;

    let solver = solver_for(config.options.engine);
    let mut envelope: Option<Envelope> = None;

    for k in 0..=steps {
        let lead = config.length * k as f64 / steps as f64;
        let mut station = config.clone();
        station
            .loads
            .push(Load::vehicle(vehicle.at(Position::Absolute(lead))));

        let result = solver.analyze(&station)?;
        debug!("Vehicle at {:.2} m solved", lead);

        match envelope.as_mut() {
            Some(env) => env.include(lead, &result),
            None => envelope = Some(Envelope::from_result(lead, &result)),
        }
    }

    let envelope = envelope.unwrap_or_default();
    let (m_min, m_max) = envelope.moment.range();
    info!(
        "Moving load envelope: {} stations, M = [{:.1}, {:.1}] kN·m",
        envelope.vehicle_positions.len(),
        m_min / 1e3,
        m_max / 1e3
    );
    Ok(envelope)
}
