use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::KeyCombo;

/// Default cooldown of an action saved without one.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(3);

/// A named, user-bound key combination with the minimum delay between two of its dispatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
	pub name: String,
	pub shortcut: KeyCombo,
	#[serde(
		rename = "cooldown_s",
		alias = "duration",
		with = "cooldown_secs",
		default = "default_cooldown"
	)]
	pub cooldown: Duration,
}

fn default_cooldown() -> Duration {
	DEFAULT_COOLDOWN
}

impl Action {
	pub fn new(name: impl Into<String>, shortcut: KeyCombo, cooldown: Duration) -> Self {
		Self {
			name: name.into(),
			shortcut,
			cooldown,
		}
	}
}

/// Cooldowns are stored as fractional seconds.
mod cooldown_secs {
	use std::time::Duration;

	use serde::{de::Error, Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_f64(value.as_secs_f64())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		let secs = f64::deserialize(deserializer)?;
		Duration::try_from_secs_f64(secs)
			.map_err(|_| D::Error::custom(format!("cooldown must be a finite, non-negative number of seconds, got {secs}")))
	}
}
