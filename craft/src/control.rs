//! Pause/resume/stop signalling between a controller and the run thread.
//!
//! The controller only flips flags; the run thread observes them at its
//! suspension points. Waits are sliced so a stop is seen within one slice even
//! if a notification is missed.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Flags {
	paused: bool,
	stopped: bool,
}

/// Why a wait returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
	Elapsed,
	Paused,
	Resumed,
	Stopped,
}

#[derive(Debug, Default)]
pub struct Signal {
	flags: Mutex<Flags>,
	cv: Condvar,
}

impl Signal {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `false` when already paused or stopped.
	pub fn pause(&self) -> bool {
		let mut flags = self.flags.lock().expect("signal lock poisoned");
		if flags.paused || flags.stopped {
			return false;
		}
		flags.paused = true;
		self.cv.notify_all();
		true
	}

	/// Returns `false` when not paused.
	pub fn resume(&self) -> bool {
		let mut flags = self.flags.lock().expect("signal lock poisoned");
		if !flags.paused {
			return false;
		}
		flags.paused = false;
		self.cv.notify_all();
		true
	}

	/// Returns `false` when already stopped.
	pub fn stop(&self) -> bool {
		let mut flags = self.flags.lock().expect("signal lock poisoned");
		if flags.stopped {
			return false;
		}
		flags.stopped = true;
		self.cv.notify_all();
		true
	}

	pub fn is_paused(&self) -> bool {
		self.flags.lock().expect("signal lock poisoned").paused
	}

	/// Current request without waiting: `Stopped`, `Paused` or `Elapsed` (nothing pending).
	pub fn poll(&self) -> Wake {
		let flags = self.flags.lock().expect("signal lock poisoned");
		if flags.stopped {
			Wake::Stopped
		} else if flags.paused {
			Wake::Paused
		} else {
			Wake::Elapsed
		}
	}

	/// Sleep until `deadline`, returning early on pause or stop.
	pub fn wait_until(&self, deadline: Instant, slice: Duration) -> Wake {
		self.wait(deadline, slice, true)
	}

	/// Sleep until `deadline`, returning early only on stop. A pending pause stays latched.
	pub fn wait_until_stopped(&self, deadline: Instant, slice: Duration) -> Wake {
		self.wait(deadline, slice, false)
	}

	fn wait(&self, deadline: Instant, slice: Duration, honor_pause: bool) -> Wake {
		let mut flags = self.flags.lock().expect("signal lock poisoned");
		loop {
			if flags.stopped {
				return Wake::Stopped;
			}
			if honor_pause && flags.paused {
				return Wake::Paused;
			}
			let now = Instant::now();
			if now >= deadline {
				return Wake::Elapsed;
			}
			let dur = deadline.saturating_duration_since(now).min(slice);
			let (guard, _timeout) = self
				.cv
				.wait_timeout(flags, dur)
				.expect("signal lock poisoned during wait");
			flags = guard;
		}
	}

	/// Block while paused. Returns `Resumed` or `Stopped`.
	pub fn wait_resume(&self, slice: Duration) -> Wake {
		let mut flags = self.flags.lock().expect("signal lock poisoned");
		loop {
			if flags.stopped {
				return Wake::Stopped;
			}
			if !flags.paused {
				return Wake::Resumed;
			}
			let (guard, _timeout) = self
				.cv
				.wait_timeout(flags, slice)
				.expect("signal lock poisoned during wait");
			flags = guard;
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;

	const SLICE: Duration = Duration::from_millis(10);

	#[test]
	fn signals_are_idempotent() {
		let signal = Signal::new();
		assert!(signal.pause());
		assert!(!signal.pause());
		assert!(signal.resume());
		assert!(!signal.resume());
		assert!(signal.stop());
		assert!(!signal.stop());
		assert!(!signal.pause());
		assert_eq!(signal.poll(), Wake::Stopped);
	}

	#[test]
	fn wait_elapses_without_signals() {
		let signal = Signal::new();
		let start = Instant::now();
		let wake = signal.wait_until(start + Duration::from_millis(30), SLICE);
		assert_eq!(wake, Wake::Elapsed);
		assert!(start.elapsed() >= Duration::from_millis(30));
	}

	#[test]
	fn stop_cuts_a_long_wait_short() {
		let signal = Arc::new(Signal::new());
		let stopper = signal.clone();
		let handle = std::thread::spawn(move || {
			std::thread::sleep(Duration::from_millis(20));
			stopper.stop();
		});

		let start = Instant::now();
		let wake = signal.wait_until(start + Duration::from_secs(30), SLICE);
		handle.join().unwrap();

		assert_eq!(wake, Wake::Stopped);
		assert!(start.elapsed() < Duration::from_secs(5));
	}

	#[test]
	fn wait_resume_returns_on_resume_or_stop() {
		let signal = Arc::new(Signal::new());
		signal.pause();
		assert_eq!(signal.wait_until(Instant::now() + Duration::from_secs(30), SLICE), Wake::Paused);

		let resumer = signal.clone();
		let handle = std::thread::spawn(move || {
			std::thread::sleep(Duration::from_millis(20));
			resumer.resume();
		});
		assert_eq!(signal.wait_resume(SLICE), Wake::Resumed);
		handle.join().unwrap();

		signal.pause();
		signal.stop();
		assert_eq!(signal.wait_resume(SLICE), Wake::Stopped);
	}

	#[test]
	fn pause_can_be_left_latched() {
		let signal = Signal::new();
		signal.pause();
		let start = Instant::now();
		let wake = signal.wait_until_stopped(start + Duration::from_millis(30), SLICE);
		assert_eq!(wake, Wake::Elapsed);
		assert!(start.elapsed() >= Duration::from_millis(30));
		assert!(signal.is_paused());
	}
}
