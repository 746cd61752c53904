//! Mission registry and procedural generation.

mod generator;
mod registry;

#[cfg(test)]
pub use generator::MissionGenerator;
pub use generator::{Generation, spawn_generation};
pub use registry::MissionRegistry;
