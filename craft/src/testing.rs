//! Scripted stand-ins for the external capabilities.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use data::{Action, Document, FixedRole, KeyCombo, Library, Recipe};

use crate::buffs::BuffScheduler;
use crate::control::Signal;
use crate::session::Session;
use crate::{
	Clock, InputFailure, InputSink, Progress, Recognition, Region, RunState, TargetLocator, TextRecognizer,
	WindowHandle,
};

pub const WINDOW: WindowHandle = WindowHandle(0x2a);

#[derive(Debug)]
pub struct FakeClock {
	base: Instant,
	offset: Mutex<Duration>,
}

impl FakeClock {
	pub fn new() -> Arc<Self> {
		Arc::new(Self {
			base: Instant::now(),
			offset: Mutex::new(Duration::ZERO),
		})
	}

	pub fn advance(&self, by: Duration) {
		*self.offset.lock().unwrap() += by;
	}

	pub fn elapsed(&self) -> Duration {
		*self.offset.lock().unwrap()
	}
}

impl Clock for FakeClock {
	fn now(&self) -> Instant {
		self.base + *self.offset.lock().unwrap()
	}
}

#[derive(Debug, Default)]
struct LocatorScript {
	present: bool,
	queued: VecDeque<bool>,
}

/// Answers lookups from a queue first, then from a fixed presence flag.
#[derive(Debug, Clone, Default)]
pub struct FakeLocator(Arc<Mutex<LocatorScript>>);

impl FakeLocator {
	pub fn present() -> Self {
		let locator = Self::default();
		locator.set_present(true);
		locator
	}

	pub fn absent() -> Self {
		Self::default()
	}

	pub fn set_present(&self, present: bool) {
		self.0.lock().unwrap().present = present;
	}

	pub fn queue(&self, answers: impl IntoIterator<Item = bool>) {
		self.0.lock().unwrap().queued.extend(answers);
	}
}

impl TargetLocator for FakeLocator {
	fn find_window(&mut self, _title_hint: &str) -> Option<WindowHandle> {
		let mut script = self.0.lock().unwrap();
		let present = script.queued.pop_front().unwrap_or(script.present);
		present.then_some(WINDOW)
	}
}

#[derive(Debug, Default)]
struct RecognizerScript {
	texts: HashMap<String, String>,
	probes: Vec<String>,
}

/// Returns a fixed text per language and records every probe.
#[derive(Debug, Clone, Default)]
pub struct FakeRecognizer(Arc<Mutex<RecognizerScript>>);

impl FakeRecognizer {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set_text(&self, language: &str, text: &str) {
		self.0.lock().unwrap().texts.insert(language.to_string(), text.to_string());
	}

	pub fn clear_text(&self, language: &str) {
		self.0.lock().unwrap().texts.remove(language);
	}

	pub fn probes(&self) -> Vec<String> {
		self.0.lock().unwrap().probes.clone()
	}

	pub fn clear_probes(&self) {
		self.0.lock().unwrap().probes.clear();
	}
}

impl TextRecognizer for FakeRecognizer {
	fn recognize(&mut self, _window: WindowHandle, _region: Region, language: &str) -> Option<Recognition> {
		let mut script = self.0.lock().unwrap();
		script.probes.push(language.to_string());
		script.texts.get(language).map(|text| Recognition {
			text: text.clone(),
			language: language.to_string(),
		})
	}
}

type SendHook = Box<dyn FnMut(usize, &str) + Send>;

#[derive(Default)]
struct InputScript {
	sent: Vec<String>,
	sent_at: Vec<Duration>,
	fail_next: u32,
	fail_always: bool,
	clock: Option<(Arc<FakeClock>, Duration)>,
	hook: Option<SendHook>,
}

/// Records successful sends; can fail on demand, advance a fake clock per send
/// and run a hook after each send.
#[derive(Clone, Default)]
pub struct FakeInput(Arc<Mutex<InputScript>>);

impl FakeInput {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn fail_next(&self, count: u32) {
		self.0.lock().unwrap().fail_next = count;
	}

	pub fn fail_always(&self) {
		self.0.lock().unwrap().fail_always = true;
	}

	pub fn advance_per_send(&self, clock: Arc<FakeClock>, by: Duration) {
		self.0.lock().unwrap().clock = Some((clock, by));
	}

	pub fn on_send(&self, hook: impl FnMut(usize, &str) + Send + 'static) {
		self.0.lock().unwrap().hook = Some(Box::new(hook));
	}

	pub fn sent(&self) -> Vec<String> {
		self.0.lock().unwrap().sent.clone()
	}

	/// Fake-clock time of each successful send.
	pub fn sent_at(&self) -> Vec<Duration> {
		self.0.lock().unwrap().sent_at.clone()
	}
}

impl InputSink for FakeInput {
	fn send_key_combination(&mut self, _window: WindowHandle, combo: &KeyCombo) -> Result<(), InputFailure> {
		let mut script = self.0.lock().unwrap();
		if script.fail_always {
			return Err(InputFailure("input backend unavailable".into()));
		}
		if script.fail_next > 0 {
			script.fail_next -= 1;
			return Err(InputFailure("key event rejected".into()));
		}

		let combo = combo.to_string();
		let at = script.clock.as_ref().map(|(clock, _)| clock.elapsed()).unwrap_or_default();
		script.sent.push(combo.clone());
		script.sent_at.push(at);
		if let Some((clock, by)) = &script.clock {
			clock.advance(*by);
		}
		let count = script.sent.len();
		if let Some(hook) = script.hook.as_mut() {
			hook(count, &combo);
		}
		Ok(())
	}
}

/// A session wired to a fresh signal, for driving suspension points directly.
pub fn session() -> (Session, Arc<Signal>, Receiver<Progress>) {
	let signal = Arc::new(Signal::new());
	let (tx, rx) = mpsc::channel();
	let session = Session::new(
		signal.clone(),
		Arc::new(crate::SystemClock),
		BuffScheduler::new(None, None, false),
		RunState::new("test", 1),
		Arc::new(Mutex::new(RunState::new("test", 1))),
		tx,
		Duration::from_millis(5),
	);
	(session, signal, rx)
}

fn action(name: &str, shortcut: &str) -> Action {
	Action::new(name, KeyCombo::parse(shortcut).unwrap(), Duration::ZERO)
}

/// Document with every fixed role bound and a few zero-cooldown crafting actions.
///
/// Shortcuts: steps are `Num1`..`Num4`, food `Ctrl+F1`, potion `Ctrl+F2`,
/// confirm `Num0`, arrows are the arrow keys.
fn document(recipes: impl IntoIterator<Item = Recipe>) -> Document {
	let mut document = Document {
		recipes: recipes.into_iter().collect(),
		actions: vec![
			action("Muscle Memory", "1"),
			action("Veneration", "2"),
			action("Groundwork", "3"),
			action("Careful Synthesis", "4"),
			action("Confirm", "Num0"),
			action("Cancel", "Esc"),
			action("Recipe Book", "N"),
			action("Food", "Ctrl+F1"),
			action("Potion", "Ctrl+F2"),
			action("Up", "Up"),
			action("Down", "Down"),
			action("Left", "Left"),
			action("Right", "Right"),
		],
		..Document::default()
	};
	for (role, name) in [
		(FixedRole::Confirm, "Confirm"),
		(FixedRole::Cancel, "Cancel"),
		(FixedRole::RecipeBook, "Recipe Book"),
		(FixedRole::Food, "Food"),
		(FixedRole::Potion, "Potion"),
		(FixedRole::Up, "Up"),
		(FixedRole::Down, "Down"),
		(FixedRole::Left, "Left"),
		(FixedRole::Right, "Right"),
	] {
		document.fixed_actions.insert(role, name.to_string());
	}
	document
}

pub fn library(recipes: impl IntoIterator<Item = Recipe>) -> Library {
	document(recipes).into_library().unwrap()
}

/// [`document`] with `name`'s cooldown replaced.
pub fn library_with_cooldown(recipes: impl IntoIterator<Item = Recipe>, name: &str, cooldown: Duration) -> Library {
	let mut document = document(recipes);
	for action in document.actions.iter_mut().filter(|a| a.name == name) {
		action.cooldown = cooldown;
	}
	document.into_library().unwrap()
}
