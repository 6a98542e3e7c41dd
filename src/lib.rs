//! Household energy forecast dashboard core.
//!
//! Composes lookback and forward consumption series from a sample dataset
//! (or synthesizes them), aggregates forward cost per appliance, classifies
//! budget risk and decides budget notifications.

pub mod aggregate;
pub mod alerts;
pub mod appliance;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod forward;
pub mod io;
pub mod labels;
pub mod noise;
pub mod notify;
pub mod series;
pub mod settings;

/// REST API (feature `api`).
#[cfg(feature = "api")]
pub mod api;
