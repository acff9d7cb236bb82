//! Glucose tools: current reading and recent history.

use tracing::debug;

use crate::dexcom::{format_mmol, GlucoseProvider, GlucoseReading};
use crate::error::Result;
use crate::mcp::handler::success_result;
use crate::mcp::protocol::ToolResult;

/// How many readings are requested from the provider for a history call.
pub const HISTORY_FETCH_COUNT: u32 = 20;

/// How many readings a history call renders.
pub const HISTORY_DISPLAY_COUNT: usize = 10;

/// `get_current_glucose`.
pub async fn current_glucose(provider: &dyn GlucoseProvider) -> Result<ToolResult> {
    let reading = provider.get_latest_reading().await?;
    debug!("Latest reading: {} mg/dL", reading.value_mgdl);
    Ok(success_result(format_current_reading(&reading)))
}

/// `get_glucose_history`.
pub async fn glucose_history(provider: &dyn GlucoseProvider, hours: u32) -> Result<ToolResult> {
    let readings = provider
        .get_readings(hours.saturating_mul(60), HISTORY_FETCH_COUNT)
        .await?;
    debug!("History for {}h: {} readings", hours, readings.len());
    Ok(success_result(format_history(hours, &readings)))
}

pub fn format_current_reading(reading: &GlucoseReading) -> String {
    format!(
        "🩸 Current Glucose: {} mg/dL ({} mmol/L)\n📈 Trend: {}\n⏰ Time: {}",
        reading.value_mgdl,
        format_mmol(reading.mmol_l()),
        reading.trend_description(),
        reading.formatted_time()
    )
}

/// Render a numbered history list, keeping the provider's ordering.
pub fn format_history(hours: u32, readings: &[GlucoseReading]) -> String {
    if readings.is_empty() {
        return format!("No glucose readings found for the last {} hours.", hours);
    }

    let mut lines = vec![format!("📊 Last {}h glucose readings:", hours)];
    lines.extend(
        readings
            .iter()
            .take(HISTORY_DISPLAY_COUNT)
            .enumerate()
            .map(|(i, reading)| format_history_line(i + 1, reading)),
    );
    lines.join("\n")
}

fn format_history_line(position: usize, reading: &GlucoseReading) -> String {
    format!(
        "{}. {} - {} mg/dL ({} mmol/L) [{}]",
        position,
        reading.formatted_time(),
        reading.value_mgdl,
        format_mmol(reading.mmol_l()),
        reading.trend_description()
    )
}
