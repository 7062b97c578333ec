//! Retry budgets, delays and buff durations.
//!
//! These are product-tuning values, so they live in the application config
//! rather than in code. Every field has a default and may be omitted.

use std::time::Duration;

use data::FixedRole;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
	/// Food buff length.
	pub food_duration_s: u64,
	/// Potion buff length.
	pub potion_duration_s: u64,

	/// Detector polls per detection cycle.
	pub detection_attempts: u32,
	/// Delay between two detector polls.
	pub detection_delay_ms: u64,
	/// Detection cycles before a run aborts with a detection timeout.
	pub detection_cycles: u32,

	/// Window lookups after the target disappears.
	pub reacquire_attempts: u32,
	pub reacquire_delay_ms: u64,

	/// Extra attempts after the input backend reports a failure.
	pub dispatch_retries: u32,

	/// Longest uninterrupted sleep; bounds how late a stop is noticed.
	pub wait_slice_ms: u64,

	/// Maximum edit distance between a keyword and recognized text.
	pub keyword_distance: usize,

	/// Consume enabled buffs before the first step instead of a full duration later.
	pub apply_buffs_at_start: bool,

	/// Roles dispatched once at start when the recipe uses HQ ingredients.
	pub hq_sequence: Vec<FixedRole>,
	/// Roles dispatched before the first step of every repetition.
	pub repetition_sequence: Vec<FixedRole>,
}

impl Default for Tuning {
	fn default() -> Self {
		Self {
			food_duration_s: 30 * 60,
			potion_duration_s: 15 * 60,
			detection_attempts: 10,
			detection_delay_ms: 500,
			detection_cycles: 3,
			reacquire_attempts: 5,
			reacquire_delay_ms: 1000,
			dispatch_retries: 1,
			wait_slice_ms: 100,
			keyword_distance: 2,
			apply_buffs_at_start: true,
			hq_sequence: vec![FixedRole::Right, FixedRole::Confirm, FixedRole::Left],
			repetition_sequence: Vec::new(),
		}
	}
}

impl Tuning {
	pub fn food_duration(&self) -> Duration {
		Duration::from_secs(self.food_duration_s)
	}

	pub fn potion_duration(&self) -> Duration {
		Duration::from_secs(self.potion_duration_s)
	}

	pub fn detection_delay(&self) -> Duration {
		Duration::from_millis(self.detection_delay_ms)
	}

	pub fn reacquire_delay(&self) -> Duration {
		Duration::from_millis(self.reacquire_delay_ms)
	}

	/// Never zero, a zero slice would spin.
	pub fn wait_slice(&self) -> Duration {
		Duration::from_millis(self.wait_slice_ms.max(1))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn omitted_fields_fall_back_to_defaults() {
		let tuning: Tuning = serde_json::from_str(r#"{"detection_cycles": 5, "hq_sequence": ["confirm"]}"#).unwrap();
		assert_eq!(tuning.detection_cycles, 5);
		assert_eq!(tuning.hq_sequence, vec![FixedRole::Confirm]);
		assert_eq!(tuning.food_duration(), Duration::from_secs(1800));
		assert_eq!(tuning.potion_duration(), Duration::from_secs(900));
		assert_eq!(tuning.dispatch_retries, 1);
	}

	#[test]
	fn wait_slice_is_never_zero() {
		let tuning = Tuning {
			wait_slice_ms: 0,
			..Tuning::default()
		};
		assert_eq!(tuning.wait_slice(), Duration::from_millis(1));
	}
}
