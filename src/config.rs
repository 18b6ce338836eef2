use crate::{Error, Result};

/// Thresholds and timings for every page behavior. Offsets are CSS pixels,
/// durations are milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    /// Header turns compact strictly past this scroll offset.
    pub header_compact_offset: f64,
    /// Reveal when the element top is above `viewport - reveal_offset`.
    pub reveal_offset: f64,
    pub stats_trigger_offset: f64,
    pub counter_duration_ms: i64,
    pub counter_frame_ms: i64,
    pub back_to_top_offset: f64,
    pub back_to_top_throttle_ms: i64,
    /// Room left for the fixed header when scrolling to an anchor.
    pub scroll_header_offset: f64,
    pub toast_display_ms: i64,
    pub toast_exit_ms: i64,
    /// Lines logged once when the page initializes.
    pub banner: Vec<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            header_compact_offset: 50.0,
            reveal_offset: 100.0,
            stats_trigger_offset: 100.0,
            counter_duration_ms: 2000,
            counter_frame_ms: 16,
            back_to_top_offset: 300.0,
            back_to_top_throttle_ms: 150,
            scroll_header_offset: 80.0,
            toast_display_ms: 5000,
            toast_exit_ms: 300,
            banner: vec![
                "Naher Alaqeeq Building Contracting LLC".to_string(),
                "16+ Years of Excellence in Construction".to_string(),
            ],
        }
    }
}

impl PageConfig {
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("counter_duration_ms", self.counter_duration_ms),
            ("counter_frame_ms", self.counter_frame_ms),
        ];
        for (name, value) in durations {
            if value <= 0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("back_to_top_throttle_ms", self.back_to_top_throttle_ms),
            ("toast_display_ms", self.toast_display_ms),
            ("toast_exit_ms", self.toast_exit_ms),
        ];
        for (name, value) in non_negative {
            if value < 0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        let offsets = [
            ("header_compact_offset", self.header_compact_offset),
            ("reveal_offset", self.reveal_offset),
            ("stats_trigger_offset", self.stats_trigger_offset),
            ("back_to_top_offset", self.back_to_top_offset),
            ("scroll_header_offset", self.scroll_header_offset),
        ];
        for (name, value) in offsets {
            if !value.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        Ok(())
    }

    /// Frames the stats counter needs to reach its target.
    pub fn counter_steps(&self) -> f64 {
        self.counter_duration_ms as f64 / self.counter_frame_ms as f64
    }
}
