//! Per-run bookkeeping owned by the run thread: run state, buff timers,
//! suspension points and the outgoing status channel.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::buffs::{Buff, BuffScheduler, Expired};
use crate::control::{Signal, Wake};
use crate::{Clock, Halted, Phase, Progress, RunState};

pub struct Session {
	signal: Arc<Signal>,
	clock: Arc<dyn Clock>,
	buffs: BuffScheduler,
	last_tick: Instant,
	state: RunState,
	shared: Arc<Mutex<RunState>>,
	events: Sender<Progress>,
	slice: Duration,
	pausable: bool,
}

impl Session {
	pub fn new(
		signal: Arc<Signal>,
		clock: Arc<dyn Clock>,
		buffs: BuffScheduler,
		state: RunState,
		shared: Arc<Mutex<RunState>>,
		events: Sender<Progress>,
		slice: Duration,
	) -> Self {
		let last_tick = clock.now();
		let mut session = Self {
			signal,
			clock,
			buffs,
			last_tick,
			state,
			shared,
			events,
			slice,
			pausable: false,
		};
		session.publish();
		session
	}

	pub fn state(&self) -> &RunState {
		&self.state
	}

	pub fn state_mut(&mut self) -> &mut RunState {
		&mut self.state
	}

	pub fn into_state(self) -> RunState {
		self.state
	}

	/// Pauses are deferred (left latched) until this is set.
	pub fn set_pausable(&mut self, pausable: bool) {
		self.pausable = pausable;
	}

	/// Cancellable sleep. A pause suspends the sleep; the remaining time still
	/// elapses in wall-clock terms, so a resumed sleep may end immediately.
	pub fn sleep(&mut self, duration: Duration) -> Result<(), Halted> {
		let deadline = Instant::now() + duration;
		loop {
			let wake = if self.pausable {
				self.signal.wait_until(deadline, self.slice)
			} else {
				self.signal.wait_until_stopped(deadline, self.slice)
			};
			match wake {
				Wake::Stopped => return Err(Halted),
				Wake::Paused => self.hold()?,
				Wake::Elapsed | Wake::Resumed => return Ok(()),
			}
		}
	}

	/// Honor pending control signals between two units of work.
	pub fn checkpoint(&mut self) -> Result<(), Halted> {
		match self.signal.poll() {
			Wake::Stopped => Err(Halted),
			Wake::Paused if self.pausable => self.hold(),
			_ => Ok(()),
		}
	}

	fn hold(&mut self) -> Result<(), Halted> {
		self.tick_buffs();
		self.buffs.pause();
		let resume_to = self.state.phase;
		self.set_phase(Phase::Paused);
		self.report("paused");

		let wake = self.signal.wait_resume(self.slice);

		// Time spent paused never reaches the buff timers.
		self.last_tick = self.clock.now();
		self.buffs.resume();

		if wake == Wake::Stopped {
			return Err(Halted);
		}
		self.set_phase(resume_to);
		self.report("resumed");
		Ok(())
	}

	/// Feed the time since the previous tick to the buff timers.
	pub fn tick_buffs(&mut self) -> Expired {
		let now = self.clock.now();
		let elapsed = now.saturating_duration_since(self.last_tick);
		self.last_tick = now;
		let expired = self.buffs.tick(elapsed);
		self.publish();
		expired
	}

	/// Replace the buff timers once the recipe is known and restart the tick base.
	pub fn arm_buffs(&mut self, buffs: BuffScheduler) {
		self.buffs = buffs;
		self.last_tick = self.clock.now();
		self.publish();
	}

	pub fn reset_buff(&mut self, buff: Buff) {
		self.buffs.reset(buff);
		self.publish();
	}

	pub fn set_phase(&mut self, phase: Phase) {
		if self.state.phase != phase {
			tracing::debug!(from = %self.state.phase, to = %phase, "phase transition");
			self.state.phase = phase;
		}
		self.publish();
	}

	/// Copy the run state to the observer-visible snapshot.
	pub fn publish(&mut self) {
		self.state.food_remaining = self.buffs.remaining(Buff::Food);
		self.state.potion_remaining = self.buffs.remaining(Buff::Potion);
		*self.shared.lock().expect("run state lock poisoned") = self.state.clone();
	}

	/// Send a status event. Never blocks; a vanished observer is ignored.
	pub fn report(&self, message: impl Into<String>) {
		let progress = Progress {
			phase: self.state.phase,
			repetition: self.state.repetition,
			step: self.state.step,
			fraction: self.state.fraction(),
			message: message.into(),
		};
		tracing::info!(
			phase = %progress.phase,
			repetition = progress.repetition,
			step = progress.step,
			"{}",
			progress.message
		);
		let _ = self.events.send(progress);
	}
}
