//! Deck loads and their conversion to nodal forces

mod assembler;
mod load;

pub use assembler::{assemble_loads, AssembledLoads, ElementLoading, LoadAssembler};
pub use load::{Load, Position, VehicleLoad};
