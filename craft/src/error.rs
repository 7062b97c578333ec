use serde::Serialize;
use thiserror::Error;

use data::ModelError;

/// Tag recorded in the run state when a run aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	PreconditionFailed,
	DetectionTimeout,
	TargetLost,
	DispatchFailure,
	Stopped,
	/// The run thread panicked.
	Internal,
}

#[derive(Debug, Error)]
pub enum CraftError {
	#[error("precondition failed: {0}")]
	PreconditionFailed(String),

	#[error("craft window not detected after {cycles} detection cycles")]
	DetectionTimeout { cycles: u32 },

	#[error("target window lost and not reacquired after {attempts} attempts")]
	TargetLost { attempts: u32 },

	#[error("could not send '{action}': {reason}")]
	DispatchFailure { action: String, reason: String },

	#[error("run stopped")]
	Stopped,

	#[error("run failed unexpectedly: {0}")]
	Internal(String),
}

impl CraftError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			CraftError::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
			CraftError::DetectionTimeout { .. } => ErrorKind::DetectionTimeout,
			CraftError::TargetLost { .. } => ErrorKind::TargetLost,
			CraftError::DispatchFailure { .. } => ErrorKind::DispatchFailure,
			CraftError::Stopped => ErrorKind::Stopped,
			CraftError::Internal(_) => ErrorKind::Internal,
		}
	}
}

impl From<ModelError> for CraftError {
	fn from(err: ModelError) -> Self {
		CraftError::PreconditionFailed(err.to_string())
	}
}

/// The stop signal was observed at a suspension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Halted;

impl From<Halted> for CraftError {
	fn from(_: Halted) -> Self {
		CraftError::Stopped
	}
}
