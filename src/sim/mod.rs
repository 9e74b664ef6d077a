//! Sensor simulation
//!
//! Drives traffic at the gateway: a world model of moving objects, a
//! measurement generator that turns them into wire frames, and a fault
//! injector that degrades the outgoing batch like a lossy channel would.
//! Everything is seeded, so a scenario run is reproducible.

mod faults;
mod measurement;
mod objects;
mod scenario;
mod world;

pub use faults::{FaultConfig, FaultInjector, FaultStats};
pub use measurement::MeasurementGenerator;
pub use objects::{ObjectGenerator, ScenarioProfile, WorldObject};
pub use scenario::{load_scenario, scenario_from_str};
pub use world::WorldModel;
