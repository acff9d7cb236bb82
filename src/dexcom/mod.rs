//! Dexcom Share data provider.
//!
//! # Architecture
//!
//! - `types` - Glucose readings, trend directions, unit conversion
//! - `client` - HTTP client for the Dexcom Share web service
//!
//! The MCP layer only depends on the [`GlucoseProvider`] trait, so the real
//! client can be swapped for an in-memory provider in tests.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use client::{Credentials, DexcomClient, Region};
pub use types::{format_mmol, mg_to_mmol, GlucoseReading, TrendDirection};

/// Source of glucose readings.
#[async_trait]
pub trait GlucoseProvider: Send + Sync {
    /// The most recent reading.
    async fn get_latest_reading(&self) -> Result<GlucoseReading>;

    /// Readings from the trailing `window_minutes`, at most `max_count` of
    /// them, in the order the source returns them.
    async fn get_readings(&self, window_minutes: u32, max_count: u32) -> Result<Vec<GlucoseReading>>;
}
