//! Minimal physics collaborator
//!
//! Scene-local rigid bodies and the explicit integrators that advance them
//! during fixed steps. No collision handling lives here.

pub mod accumulator;
pub mod components;
pub mod integration;

pub use accumulator::StepAccumulator;
pub use components::Rigidbody;
pub use integration::{integrate_dynamic_body, integrate_kinematic_body};
