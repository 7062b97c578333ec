//! Food and potion countdowns.
//!
//! Time only moves through [`BuffScheduler::tick`]; the scheduler never reads
//! a clock itself, so a frozen (paused) scheduler simply ignores what it is fed.

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Buff {
	Food,
	Potion,
}

impl Buff {
	pub const ALL: [Buff; 2] = [Buff::Food, Buff::Potion];

	pub fn as_str(&self) -> &'static str {
		match self {
			Buff::Food => "food",
			Buff::Potion => "potion",
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expired {
	pub food: bool,
	pub potion: bool,
}

impl Expired {
	pub fn any(&self) -> bool {
		self.food || self.potion
	}

	pub fn contains(&self, buff: Buff) -> bool {
		match buff {
			Buff::Food => self.food,
			Buff::Potion => self.potion,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timer {
	active: bool,
	duration: Duration,
	remaining: Duration,
}

impl Timer {
	fn new(active: bool, duration: Duration, expired: bool) -> Self {
		Self {
			active,
			duration,
			remaining: if expired { Duration::ZERO } else { duration },
		}
	}

	fn expired(&self) -> bool {
		self.active && self.remaining.is_zero()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuffScheduler {
	food: Timer,
	potion: Timer,
	paused: bool,
}

impl BuffScheduler {
	/// Inactive timers never expire. With `start_expired`, active timers start
	/// at zero so the first check asks for an application.
	pub fn new(food: Option<Duration>, potion: Option<Duration>, start_expired: bool) -> Self {
		Self {
			food: Timer::new(food.is_some(), food.unwrap_or_default(), start_expired),
			potion: Timer::new(potion.is_some(), potion.unwrap_or_default(), start_expired),
			paused: false,
		}
	}

	fn timer(&self, buff: Buff) -> &Timer {
		match buff {
			Buff::Food => &self.food,
			Buff::Potion => &self.potion,
		}
	}

	fn timer_mut(&mut self, buff: Buff) -> &mut Timer {
		match buff {
			Buff::Food => &mut self.food,
			Buff::Potion => &mut self.potion,
		}
	}

	/// Account `elapsed` against both timers, unless paused.
	pub fn tick(&mut self, elapsed: Duration) -> Expired {
		if !self.paused {
			for timer in [&mut self.food, &mut self.potion] {
				if timer.active {
					timer.remaining = timer.remaining.saturating_sub(elapsed);
				}
			}
		}
		self.expired()
	}

	pub fn expired(&self) -> Expired {
		Expired {
			food: self.food.expired(),
			potion: self.potion.expired(),
		}
	}

	pub fn pause(&mut self) {
		self.paused = true;
	}

	pub fn resume(&mut self) {
		self.paused = false;
	}

	/// Restore the full duration after a successful reapplication.
	pub fn reset(&mut self, buff: Buff) {
		let timer = self.timer_mut(buff);
		timer.remaining = timer.duration;
	}

	/// `None` for an inactive timer.
	pub fn remaining(&self, buff: Buff) -> Option<Duration> {
		let timer = self.timer(buff);
		timer.active.then_some(timer.remaining)
	}
}
