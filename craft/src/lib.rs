//! Crafting automation engine: runs a recipe's actions against the game window,
//! confirming each step through the craft window detector and keeping food and
//! potion buffs up.
//!
//! Everything outside the process (window lookup, OCR, keyboard input, time)
//! comes in through the traits in [`capability`], so the engine runs unchanged
//! against fakes in tests.

pub mod buffs;
pub mod capability;
pub mod control;
mod detector;
mod dispatch;
mod error;
mod orchestrator;
mod progress;
mod session;
mod tuning;

#[cfg(test)]
mod testing;

pub use buffs::{Buff, BuffScheduler, Expired};
pub use capability::{Clock, InputFailure, InputSink, Recognition, SystemClock, TargetLocator, TextRecognizer, WindowHandle};
pub use control::Signal;
pub use detector::{CraftWindowDetector, Detection, LanguageProfile, Region};
pub use error::{CraftError, ErrorKind, Halted};
pub use orchestrator::{Capabilities, Controller, Crafter, Outcome, RunHandle};
pub use progress::{Phase, Progress, RunState};
pub use tuning::Tuning;
