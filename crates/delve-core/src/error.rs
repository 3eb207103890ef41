//! Configuration errors
//!
//! Generation itself never fails; these are reported by
//! [`LevelSettings::validate`](crate::settings::LevelSettings::validate).

use thiserror::Error;

use crate::layout::{GridCoord, SpecialPathKind};

/// Problems found in a settings object
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("Grid size must be positive on every axis, got {size}")]
    InvalidGridSize { size: GridCoord },

    #[error("Basic room range is inverted: min {min} > max {max}")]
    InvertedRoomRange { min: u32, max: u32 },

    #[error("Probability '{name}' must lie in [0, 1], got {value}")]
    InvalidProbability { name: String, value: f64 },

    #[error("Selection weight of '{name}' is negative: {value}")]
    NegativeWeight { name: String, value: f64 },

    #[error("Room template '{name}' has an invalid footprint: {reason}")]
    InvalidRoomFootprint { name: String, reason: String },

    #[error("Access point {offset} of '{name}' lies outside its footprint")]
    AccessPointOutsideFootprint { name: String, offset: GridCoord },

    #[error("Structure template {kind} has an invalid footprint: {reason}")]
    InvalidStructure { kind: SpecialPathKind, reason: String },
}
