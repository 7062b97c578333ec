//! Sends one action at a time to the target window, honoring cooldowns.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use data::Action;

use crate::session::Session;
use crate::{Clock, Halted, InputSink, TargetLocator, WindowHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
	/// The window vanished; reacquire before the next step.
	TargetLost,
	/// The input backend refused the key combination.
	Failed(String),
	Halted,
}

impl From<Halted> for DispatchError {
	fn from(_: Halted) -> Self {
		DispatchError::Halted
	}
}

pub struct Dispatcher {
	locator: Box<dyn TargetLocator>,
	input: Box<dyn InputSink>,
	clock: Arc<dyn Clock>,
	title_hint: String,
	last: HashMap<String, Instant>,
}

impl Dispatcher {
	pub fn new(
		locator: Box<dyn TargetLocator>,
		input: Box<dyn InputSink>,
		clock: Arc<dyn Clock>,
		title_hint: impl Into<String>,
	) -> Self {
		Self {
			locator,
			input,
			clock,
			title_hint: title_hint.into(),
			last: HashMap::new(),
		}
	}

	pub fn locate(&mut self) -> Option<WindowHandle> {
		self.locator.find_window(&self.title_hint)
	}

	pub fn title_hint(&self) -> &str {
		&self.title_hint
	}

	/// Time left before `action` may be sent again.
	pub fn cooldown_remaining(&self, action: &Action) -> Duration {
		match self.last.get(&action.name) {
			Some(last) => action
				.cooldown
				.saturating_sub(self.clock.now().saturating_duration_since(*last)),
			None => Duration::ZERO,
		}
	}

	/// Wait out the cooldown in `session` (a cancellable suspension point).
	pub fn wait_ready(&mut self, action: &Action, session: &mut Session) -> Result<(), Halted> {
		let wait = self.cooldown_remaining(action);
		if !wait.is_zero() {
			tracing::trace!(action = %action.name, wait_ms = wait.as_millis() as u64, "waiting for cooldown");
			session.sleep(wait)?;
		}
		Ok(())
	}

	/// Re-check the window and send the key combination. Does not wait.
	pub fn send(&mut self, action: &Action) -> Result<WindowHandle, DispatchError> {
		let window = self.locate().ok_or(DispatchError::TargetLost)?;
		self.input
			.send_key_combination(window, &action.shortcut)
			.map_err(|err| DispatchError::Failed(err.0))?;

		self.last.insert(action.name.clone(), self.clock.now());
		tracing::debug!(action = %action.name, shortcut = %action.shortcut, window = %window, "dispatched");
		Ok(window)
	}

	/// [`Dispatcher::wait_ready`] followed by [`Dispatcher::send`].
	pub fn dispatch(&mut self, action: &Action, session: &mut Session) -> Result<WindowHandle, DispatchError> {
		self.wait_ready(action, session)?;
		self.send(action)
	}
}
