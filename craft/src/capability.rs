//! Narrow interfaces to the outside world.
//!
//! The engine never talks to a window system, an OCR library or a keyboard
//! directly; the binary supplies implementations of these traits.

use std::fmt;
use std::time::Instant;

use data::KeyCombo;

use crate::Region;

/// Opaque handle of the automated application's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#x}", self.0)
	}
}

/// Finds the target window.
pub trait TargetLocator: Send {
	/// `None` when no window matches the hint.
	fn find_window(&mut self, title_hint: &str) -> Option<WindowHandle>;
}

/// Text read from a captured region, tagged with the language it was read as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
	pub text: String,
	pub language: String,
}

/// External OCR capability.
pub trait TextRecognizer: Send {
	/// `None` when nothing legible was found in the region.
	fn recognize(&mut self, window: WindowHandle, region: Region, language: &str) -> Option<Recognition>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFailure(pub String);

impl fmt::Display for InputFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl std::error::Error for InputFailure {}

/// External input simulation capability.
pub trait InputSink: Send {
	fn send_key_combination(&mut self, window: WindowHandle, combo: &KeyCombo) -> Result<(), InputFailure>;
}

/// Time source for buff accounting.
pub trait Clock: Send + Sync {
	fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Instant {
		Instant::now()
	}
}
