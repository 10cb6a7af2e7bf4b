//! Proxim Services Layer
//!
//! Session-level services around the core: settings today.

pub mod settings;

pub use settings::{Settings, SettingsError, SimulationSettings};
