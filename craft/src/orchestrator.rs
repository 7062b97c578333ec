//! Runs a recipe to completion on a dedicated thread.
//!
//! A run walks `Starting → (ExecutingStep → AwaitingDetection)* → Completed`,
//! detouring through `ReapplyingBuff` whenever a buff timer runs out and
//! through `Paused` whenever the controller asks. Any unrecoverable failure or
//! a stop ends the run in `Aborted` with the error kind recorded.
//!
//! The controller side ([`RunHandle`], [`Controller`]) never touches the run
//! directly. It flips flags on a shared [`Signal`] and reads a snapshot of the
//! run state that the run thread republishes after every change.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use data::{Action, FixedRole, Library, ModelError, Plan};

use crate::buffs::{Buff, BuffScheduler};
use crate::control::Signal;
use crate::dispatch::{DispatchError, Dispatcher};
use crate::session::Session;
use crate::{
	Clock, CraftError, CraftWindowDetector, ErrorKind, InputSink, Phase, Progress, RunState, TargetLocator,
	Tuning, WindowHandle,
};

/// Per-run capabilities. The detector is shared across runs; these are not.
pub struct Capabilities {
	pub locator: Box<dyn TargetLocator>,
	pub input: Box<dyn InputSink>,
	pub clock: Arc<dyn Clock>,
}

/// Final state of a finished run.
#[derive(Debug)]
pub struct Outcome {
	pub state: RunState,
	pub error: Option<CraftError>,
}

impl Outcome {
	pub fn phase(&self) -> Phase {
		self.state.phase
	}

	pub fn is_completed(&self) -> bool {
		self.state.phase == Phase::Completed
	}
}

/// Cloneable control surface of a run.
#[derive(Debug, Clone)]
pub struct Controller {
	signal: Arc<Signal>,
	shared: Arc<Mutex<RunState>>,
}

impl Controller {
	/// No-op (returns `false`) when already paused or the run has finished.
	/// A pause requested while starting takes effect at the first step.
	pub fn pause(&self) -> bool {
		if self.phase().is_terminal() {
			return false;
		}
		self.signal.pause()
	}

	/// No-op (returns `false`) when not paused.
	pub fn resume(&self) -> bool {
		self.signal.resume()
	}

	/// No-op (returns `false`) when already stopped or the run has finished.
	pub fn stop(&self) -> bool {
		if self.phase().is_terminal() {
			return false;
		}
		self.signal.stop()
	}

	pub fn snapshot(&self) -> RunState {
		self.shared.lock().expect("run state lock poisoned").clone()
	}

	pub fn phase(&self) -> Phase {
		self.shared.lock().expect("run state lock poisoned").phase
	}
}

pub struct RunHandle {
	controller: Controller,
	events: Receiver<Progress>,
	thread: JoinHandle<Outcome>,
}

impl RunHandle {
	pub fn controller(&self) -> Controller {
		self.controller.clone()
	}

	pub fn pause(&self) -> bool {
		self.controller.pause()
	}

	pub fn resume(&self) -> bool {
		self.controller.resume()
	}

	pub fn stop(&self) -> bool {
		self.controller.stop()
	}

	pub fn snapshot(&self) -> RunState {
		self.controller.snapshot()
	}

	pub fn phase(&self) -> Phase {
		self.controller.phase()
	}

	/// Status events in emission order. The channel closes when the run ends.
	pub fn events(&self) -> &Receiver<Progress> {
		&self.events
	}

	/// Wait for the run to end.
	pub fn join(self) -> Outcome {
		let controller = self.controller;
		self.thread.join().unwrap_or_else(|payload| {
			// Panics inside the run itself are caught by the run and reported there.
			let mut state = controller.snapshot();
			tracing::error!(recipe = %state.recipe, "run thread panicked");
			state.phase = Phase::Aborted;
			state.error = Some(ErrorKind::Internal);
			Outcome {
				state,
				error: Some(CraftError::Internal(panic_message(&*payload))),
			}
		})
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	payload
		.downcast_ref::<&str>()
		.map(|s| s.to_string())
		.or_else(|| payload.downcast_ref::<String>().cloned())
		.unwrap_or_else(|| "run thread panicked".to_string())
}

/// Starts runs against one target application.
pub struct Crafter {
	detector: Arc<Mutex<CraftWindowDetector>>,
	tuning: Tuning,
	title_hint: String,
}

impl Crafter {
	pub fn new(detector: CraftWindowDetector, tuning: Tuning, title_hint: impl Into<String>) -> Self {
		Self {
			detector: Arc::new(Mutex::new(detector)),
			tuning,
			title_hint: title_hint.into(),
		}
	}

	/// Language the detector matched last, for persisting between sessions.
	pub fn cached_language(&self) -> Option<String> {
		self.detector
			.lock()
			.expect("detector lock poisoned")
			.cached_language()
			.map(str::to_string)
	}

	/// Start `recipe` from `library`. `quantity` overrides the recipe's own.
	///
	/// The library is snapshotted; later edits do not affect the run.
	pub fn start(&self, library: &Library, recipe: &str, quantity: Option<u32>, caps: Capabilities) -> RunHandle {
		self.start_with(library, recipe, quantity, caps, Arc::new(Signal::new()))
	}

	/// [`Crafter::start`] with a caller-provided signal.
	pub fn start_with(
		&self,
		library: &Library,
		recipe: &str,
		quantity: Option<u32>,
		caps: Capabilities,
		signal: Arc<Signal>,
	) -> RunHandle {
		let initial = RunState::new(
			recipe,
			quantity.or_else(|| library.recipe(recipe).map(|r| r.quantity)).unwrap_or(0),
		);
		let shared = Arc::new(Mutex::new(initial.clone()));
		let (tx, events) = mpsc::channel();

		let session = Session::new(
			signal.clone(),
			caps.clock.clone(),
			BuffScheduler::new(None, None, false),
			initial,
			shared.clone(),
			tx,
			self.tuning.wait_slice(),
		);
		let run = Run {
			library: library.clone(),
			recipe: recipe.to_string(),
			quantity,
			tuning: self.tuning.clone(),
			detector: self.detector.clone(),
			dispatcher: Dispatcher::new(caps.locator, caps.input, caps.clock, self.title_hint.clone()),
			session,
		};
		let thread = std::thread::spawn(move || run.run());

		RunHandle {
			controller: Controller { signal, shared },
			events,
			thread,
		}
	}
}

struct Run {
	library: Library,
	recipe: String,
	quantity: Option<u32>,
	tuning: Tuning,
	detector: Arc<Mutex<CraftWindowDetector>>,
	dispatcher: Dispatcher,
	session: Session,
}

impl Run {
	fn run(mut self) -> Outcome {
		let span = tracing::info_span!("run", recipe = %self.recipe);
		let _enter = span.enter();

		self.session.set_phase(Phase::Starting);
		self.session.report(format!("starting {}", self.recipe));

		let result = panic::catch_unwind(AssertUnwindSafe(|| self.start().and_then(|plan| self.execute(&plan))))
			.unwrap_or_else(|payload| Err(CraftError::Internal(panic_message(&*payload))));
		let error = match result {
			Ok(()) => {
				self.session.set_phase(Phase::Completed);
				let state = self.session.state();
				let message = format!("completed {}/{} repetitions", state.repetition, state.quantity);
				self.session.report(message);
				None
			}
			Err(err) => {
				match &err {
					CraftError::Stopped => tracing::info!("run stopped"),
					err => tracing::error!(error = %err, "run aborted"),
				}
				self.session.state_mut().error = Some(err.kind());
				self.session.set_phase(Phase::Aborted);
				self.session.report(format!("aborted: {err}"));
				Some(err)
			}
		};

		Outcome {
			state: self.session.into_state(),
			error,
		}
	}

	/// Validate, arm the buff timers, confirm the target and the craft window,
	/// then run the start sequence.
	fn start(&mut self) -> Result<Plan, CraftError> {
		let recipe = self
			.library
			.recipe(&self.recipe)
			.cloned()
			.ok_or_else(|| ModelError::UnknownRecipe(self.recipe.clone()))?;
		let recipe = match self.quantity {
			Some(quantity) => recipe.with_quantity(quantity),
			None => recipe,
		};
		self.session.state_mut().quantity = recipe.quantity;
		let plan = Plan::prepare(&self.library, &recipe)?;

		self.session.arm_buffs(BuffScheduler::new(
			recipe.use_food.then(|| self.tuning.food_duration()),
			recipe.use_potion.then(|| self.tuning.potion_duration()),
			self.tuning.apply_buffs_at_start,
		));

		let Some(window) = self.dispatcher.locate() else {
			return Err(CraftError::PreconditionFailed(format!(
				"no window matching '{}'",
				self.dispatcher.title_hint()
			)));
		};
		tracing::debug!(%window, "target window found");
		if !self.poll_detector(window) {
			return Err(CraftError::PreconditionFailed("craft window not visible in the game".to_string()));
		}

		if recipe.use_hq_ingredients {
			for role in self.tuning.hq_sequence.clone() {
				self.dispatch(plan.fixed(role))?;
			}
		}

		self.session.set_pausable(true);
		Ok(plan)
	}

	fn execute(&mut self, plan: &Plan) -> Result<(), CraftError> {
		let quantity = plan.quantity();
		let steps = plan.steps.len();

		while self.session.state().repetition < quantity {
			if self.session.state().step == 0 {
				for role in self.tuning.repetition_sequence.clone() {
					self.session.checkpoint()?;
					self.session.set_phase(Phase::ExecutingStep);
					self.perform(plan, plan.fixed(role))?;
				}
			}

			self.session.checkpoint()?;

			let index = self.session.state().step;
			let action = &plan.steps[index];
			self.session.set_phase(Phase::ExecutingStep);
			let repetition = self.session.state().repetition;
			self.session.report(format!(
				"repetition {}/{quantity}, step {}/{steps}: {}",
				repetition + 1,
				index + 1,
				action.name
			));
			self.perform(plan, action)?;

			self.session.set_phase(Phase::AwaitingDetection);
			self.await_detection()?;

			let state = self.session.state_mut();
			state.step += 1;
			if state.step == steps {
				state.step = 0;
				state.repetition += 1;
				let message = format!("repetition {}/{quantity} done", state.repetition);
				self.session.publish();
				self.session.report(message);
			} else {
				self.session.publish();
			}
		}
		Ok(())
	}

	/// Wait out `action`'s cooldown, reapply whatever buff ran out meanwhile,
	/// then send `action`.
	fn perform(&mut self, plan: &Plan, action: &Action) -> Result<(), CraftError> {
		self.dispatcher.wait_ready(action, &mut self.session)?;
		self.reapply_buffs(plan)?;
		self.session.set_phase(Phase::ExecutingStep);
		self.dispatch(action)
	}

	/// Dispatch any expired buff before the next unit of work. A buff's timer is
	/// only reset once its action was actually sent.
	fn reapply_buffs(&mut self, plan: &Plan) -> Result<(), CraftError> {
		let expired = self.session.tick_buffs();
		for buff in Buff::ALL {
			if !expired.contains(buff) {
				continue;
			}
			let role = match buff {
				Buff::Food => FixedRole::Food,
				Buff::Potion => FixedRole::Potion,
			};
			self.session.set_phase(Phase::ReapplyingBuff);
			self.session.report(format!("{} expired, reapplying", buff.as_str()));
			self.dispatch(plan.fixed(role))?;
			self.session.reset_buff(buff);
		}
		Ok(())
	}

	/// Send one action, reacquiring a lost window and retrying input failures
	/// within their budgets.
	fn dispatch(&mut self, action: &Action) -> Result<(), CraftError> {
		let mut failures = 0;
		let mut losses = 0;
		loop {
			match self.dispatcher.dispatch(action, &mut self.session) {
				Ok(_) => {
					self.session.state_mut().dispatched += 1;
					self.session.publish();
					return Ok(());
				}
				Err(DispatchError::Halted) => return Err(CraftError::Stopped),
				Err(DispatchError::TargetLost) => {
					losses += 1;
					if losses > self.tuning.reacquire_attempts.max(1) {
						return Err(CraftError::TargetLost {
							attempts: self.tuning.reacquire_attempts,
						});
					}
					self.reacquire()?;
				}
				Err(DispatchError::Failed(reason)) => {
					failures += 1;
					if failures > self.tuning.dispatch_retries {
						return Err(CraftError::DispatchFailure {
							action: action.name.clone(),
							reason,
						});
					}
					tracing::warn!(action = %action.name, %reason, attempt = failures, "input failed, retrying");
					self.session.report(format!("retrying '{}': {reason}", action.name));
				}
			}
		}
	}

	fn reacquire(&mut self) -> Result<WindowHandle, CraftError> {
		let attempts = self.tuning.reacquire_attempts;
		tracing::warn!(hint = %self.dispatcher.title_hint(), "target window lost");
		self.session.report("target window lost, reacquiring");

		for attempt in 1..=attempts {
			self.session.sleep(self.tuning.reacquire_delay())?;
			if let Some(window) = self.dispatcher.locate() {
				self.session.report("target window reacquired");
				return Ok(window);
			}
			tracing::debug!(attempt, attempts, "target window still missing");
		}
		Err(CraftError::TargetLost { attempts })
	}

	/// Poll the detector until the craft window is confirmed or the cycle budget runs out.
	fn await_detection(&mut self) -> Result<(), CraftError> {
		let cycles = self.tuning.detection_cycles.max(1);
		let attempts = self.tuning.detection_attempts.max(1);

		for cycle in 1..=cycles {
			for attempt in 1..=attempts {
				self.session.checkpoint()?;
				let window = match self.dispatcher.locate() {
					Some(window) => window,
					None => self.reacquire()?,
				};

				if self.poll_detector(window) {
					return Ok(());
				}

				if cycle < cycles || attempt < attempts {
					self.session.sleep(self.tuning.detection_delay())?;
				}
			}
			tracing::warn!(cycle, cycles, "craft window not detected");
			self.session.report(format!("craft window not detected (cycle {cycle}/{cycles})"));
		}
		Err(CraftError::DetectionTimeout { cycles })
	}

	fn poll_detector(&mut self, window: WindowHandle) -> bool {
		let detection = self.detector.lock().expect("detector lock poisoned").detect(window);
		let detected = detection.is_detected();
		self.session.state_mut().last_detection = Some(detection);
		self.session.publish();
		detected
	}
}
