//! # Reference Simulation Harness
//!
//! Deterministic stand-ins for everything the radio model expects from its
//! host: data memory, interrupt controller, clock and the shared medium.
//!
//! - [`node::NodeHal`] records what one radio does, for unit tests
//! - [`network::Network`] runs several radios on one medium
//! - [`scenario::Scenario`] replays JSON scripts against a network

pub mod memory;
pub mod network;
pub mod node;
pub mod queue;
pub mod scenario;

pub use network::{LinkQuality, Network};
pub use node::{MediumRequest, NodeHal};
pub use scenario::{Scenario, ScenarioReport, Step};
