use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::{Detection, ErrorKind};

/// Lifecycle phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
	Idle,
	Starting,
	ExecutingStep,
	AwaitingDetection,
	ReapplyingBuff,
	Paused,
	Completed,
	Aborted,
}

impl Phase {
	pub fn is_terminal(&self) -> bool {
		matches!(self, Phase::Completed | Phase::Aborted)
	}
}

impl fmt::Display for Phase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Phase::Idle => "idle",
			Phase::Starting => "starting",
			Phase::ExecutingStep => "executing step",
			Phase::AwaitingDetection => "awaiting detection",
			Phase::ReapplyingBuff => "reapplying buff",
			Phase::Paused => "paused",
			Phase::Completed => "completed",
			Phase::Aborted => "aborted",
		};
		f.write_str(s)
	}
}

/// One status notification from the run thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
	pub phase: Phase,
	pub repetition: u32,
	pub step: usize,
	/// Completed repetitions over quantity, `0.0..=1.0`.
	pub fraction: f32,
	pub message: String,
}

/// Everything the orchestrator knows about a run. Observers only ever see copies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunState {
	pub recipe: String,
	pub quantity: u32,
	/// Repetitions fully completed so far.
	pub repetition: u32,
	/// Step of the current repetition awaiting dispatch or confirmation.
	pub step: usize,
	pub phase: Phase,
	pub food_remaining: Option<Duration>,
	pub potion_remaining: Option<Duration>,
	pub last_detection: Option<Detection>,
	pub dispatched: u64,
	pub error: Option<ErrorKind>,
}

impl RunState {
	pub fn new(recipe: impl Into<String>, quantity: u32) -> Self {
		Self {
			recipe: recipe.into(),
			quantity,
			repetition: 0,
			step: 0,
			phase: Phase::Idle,
			food_remaining: None,
			potion_remaining: None,
			last_detection: None,
			dispatched: 0,
			error: None,
		}
	}

	pub fn fraction(&self) -> f32 {
		if self.quantity == 0 {
			return 0.0;
		}
		self.repetition as f32 / self.quantity as f32
	}
}
