use serde::Deserialize;
use serde_json::Value;

use crate::anchor::DEFAULT_HEADER_GAP_PX;
use crate::log::{LogLevel, DEFAULT_LOG_LEVEL};
use crate::scroll::DEFAULT_SCROLL_THRESHOLD_PX;
use crate::throttle::DEFAULT_THROTTLE_MS;

pub const CONFIG_ATTRIBUTE: &str = "data-site-config";

const DEFAULT_FEEDBACK_DURATION_MS: u32 = 2_000;
const DEFAULT_SUCCESS_COLOR: &str = "#90EE90";
const DEFAULT_FAILURE_COLOR: &str = "#FFB6C1";
const DEFAULT_SUCCESS_LABEL: &str = "Copied!";
const DEFAULT_FAILURE_LABEL: &str = "Copy Failed";

const SCROLL_THRESHOLD_PX_BOUNDS: (f64, f64) = (0.0, 10_000.0);
const SCROLL_THROTTLE_MS_BOUNDS: (u32, u32) = (1, 2_000);
const HEADER_GAP_PX_BOUNDS: (f64, f64) = (0.0, 200.0);
const FEEDBACK_DURATION_MS_BOUNDS: (u32, u32) = (100, 30_000);

/// Tunables for every interactive component on the page.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub scroll_threshold_px: f64,
    pub scroll_throttle_ms: u32,
    pub header_gap_px: f64,
    pub feedback_duration_ms: u32,
    pub success_color: String,
    pub failure_color: String,
    pub success_label: String,
    pub failure_label: String,
    pub log_level: LogLevel,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            scroll_threshold_px: DEFAULT_SCROLL_THRESHOLD_PX,
            scroll_throttle_ms: DEFAULT_THROTTLE_MS,
            header_gap_px: DEFAULT_HEADER_GAP_PX,
            feedback_duration_ms: DEFAULT_FEEDBACK_DURATION_MS,
            success_color: DEFAULT_SUCCESS_COLOR.to_string(),
            failure_color: DEFAULT_FAILURE_COLOR.to_string(),
            success_label: DEFAULT_SUCCESS_LABEL.to_string(),
            failure_label: DEFAULT_FAILURE_LABEL.to_string(),
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigOverrides {
    scroll_threshold_px: Option<Value>,
    scroll_throttle_ms: Option<Value>,
    header_gap_px: Option<Value>,
    feedback_duration_ms: Option<Value>,
    success_color: Option<Value>,
    failure_color: Option<Value>,
    success_label: Option<Value>,
    failure_label: Option<Value>,
    log_level: Option<Value>,
}

impl SiteConfig {
    /// Reads overrides from the JSON carried by the `data-site-config`
    /// attribute. Each field falls back to its default on its own when it is
    /// missing, malformed or out of bounds.
    pub fn from_json_str(raw: Option<&str>) -> Self {
        let overrides = raw
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .and_then(|value| serde_json::from_str::<ConfigOverrides>(value).ok())
            .unwrap_or_default();

        Self {
            scroll_threshold_px: parse_f64_with_bounds(
                overrides.scroll_threshold_px.as_ref(),
                DEFAULT_SCROLL_THRESHOLD_PX,
                SCROLL_THRESHOLD_PX_BOUNDS,
            ),
            scroll_throttle_ms: parse_u32_with_bounds(
                overrides.scroll_throttle_ms.as_ref(),
                DEFAULT_THROTTLE_MS,
                SCROLL_THROTTLE_MS_BOUNDS,
            ),
            header_gap_px: parse_f64_with_bounds(
                overrides.header_gap_px.as_ref(),
                DEFAULT_HEADER_GAP_PX,
                HEADER_GAP_PX_BOUNDS,
            ),
            feedback_duration_ms: parse_u32_with_bounds(
                overrides.feedback_duration_ms.as_ref(),
                DEFAULT_FEEDBACK_DURATION_MS,
                FEEDBACK_DURATION_MS_BOUNDS,
            ),
            success_color: parse_non_empty_string(overrides.success_color.as_ref())
                .unwrap_or_else(|| DEFAULT_SUCCESS_COLOR.to_string()),
            failure_color: parse_non_empty_string(overrides.failure_color.as_ref())
                .unwrap_or_else(|| DEFAULT_FAILURE_COLOR.to_string()),
            success_label: parse_non_empty_string(overrides.success_label.as_ref())
                .unwrap_or_else(|| DEFAULT_SUCCESS_LABEL.to_string()),
            failure_label: parse_non_empty_string(overrides.failure_label.as_ref())
                .unwrap_or_else(|| DEFAULT_FAILURE_LABEL.to_string()),
            log_level: parse_non_empty_string(overrides.log_level.as_ref())
                .and_then(|value| LogLevel::parse(&value))
                .unwrap_or(DEFAULT_LOG_LEVEL),
        }
    }
}

fn parse_u32_with_bounds(value: Option<&Value>, default: u32, bounds: (u32, u32)) -> u32 {
    value
        .and_then(Value::as_u64)
        .and_then(|value| u32::try_from(value).ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_f64_with_bounds(value: Option<&Value>, default: f64, bounds: (f64, f64)) -> f64 {
    value
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite() && (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_attribute_yields_defaults() {
        assert_eq!(SiteConfig::from_json_str(None), SiteConfig::default());
        assert_eq!(SiteConfig::from_json_str(Some("   ")), SiteConfig::default());
    }

    #[test]
    fn malformed_json_yields_defaults() {
        assert_eq!(
            SiteConfig::from_json_str(Some("{scrollThresholdPx: 10")),
            SiteConfig::default()
        );
    }

    #[test]
    fn defaults_come_from_the_components() {
        let config = SiteConfig::default();

        assert_eq!(config.scroll_threshold_px, 300.0);
        assert_eq!(config.scroll_throttle_ms, 100);
        assert_eq!(config.header_gap_px, 20.0);
        assert_eq!(config.feedback_duration_ms, 2_000);
    }

    #[test]
    fn valid_overrides_are_applied() {
        let config = SiteConfig::from_json_str(Some(
            r##"{
                "scrollThresholdPx": 480,
                "scrollThrottleMs": 50,
                "headerGapPx": 8.5,
                "feedbackDurationMs": 1500,
                "successColor": "#00ff00",
                "failureLabel": "Nope",
                "logLevel": "debug"
            }"##,
        ));

        assert_eq!(config.scroll_threshold_px, 480.0);
        assert_eq!(config.scroll_throttle_ms, 50);
        assert_eq!(config.header_gap_px, 8.5);
        assert_eq!(config.feedback_duration_ms, 1_500);
        assert_eq!(config.success_color, "#00ff00");
        assert_eq!(config.failure_color, DEFAULT_FAILURE_COLOR);
        assert_eq!(config.success_label, DEFAULT_SUCCESS_LABEL);
        assert_eq!(config.failure_label, "Nope");
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn out_of_bounds_fields_fall_back_individually() {
        let config = SiteConfig::from_json_str(Some(
            r#"{
                "scrollThresholdPx": -5,
                "scrollThrottleMs": 0,
                "headerGapPx": 24,
                "feedbackDurationMs": "soon",
                "successLabel": "   ",
                "logLevel": "loud"
            }"#,
        ));

        assert_eq!(config.scroll_threshold_px, DEFAULT_SCROLL_THRESHOLD_PX);
        assert_eq!(config.scroll_throttle_ms, DEFAULT_THROTTLE_MS);
        assert_eq!(config.header_gap_px, 24.0);
        assert_eq!(config.feedback_duration_ms, DEFAULT_FEEDBACK_DURATION_MS);
        assert_eq!(config.success_label, DEFAULT_SUCCESS_LABEL);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }
}
