//! Decorative fire effects shown behind the pages.

pub mod particles;

pub use particles::{DeviceCapabilities, Ember, EmberField, FireSimulation, FlameColor, Particle};
