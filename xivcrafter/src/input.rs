//! Keyboard input backend.
//!
//! Each main key of a combination is sent on its own, wrapped in the
//! combination's modifiers. The game only reads input while focused, so the
//! window is brought to the foreground first where the platform allows it.

use std::time::Duration;

use craft::{InputFailure, InputSink, WindowHandle};
use data::{Key, KeyCombo, NamedKey, NumpadKey};
use enigo::{Direction, Enigo, Keyboard, Settings};

/// How long a key stays down; the game drops shorter taps.
const KEY_HOLD: Duration = Duration::from_millis(30);

fn unsupported(key: &Key) -> InputFailure {
	InputFailure(format!("key '{key}' is not supported on this platform"))
}

fn enigo_key(key: &Key) -> Result<enigo::Key, InputFailure> {
	use enigo::Key as E;

	let mapped = match key {
		Key::Char(c) => E::Unicode(*c),
		Key::Function(n) => match n {
			1 => E::F1,
			2 => E::F2,
			3 => E::F3,
			4 => E::F4,
			5 => E::F5,
			6 => E::F6,
			7 => E::F7,
			8 => E::F8,
			9 => E::F9,
			10 => E::F10,
			11 => E::F11,
			12 => E::F12,
			13 => E::F13,
			14 => E::F14,
			15 => E::F15,
			16 => E::F16,
			17 => E::F17,
			18 => E::F18,
			19 => E::F19,
			20 => E::F20,
			_ => return Err(unsupported(key)),
		},
		Key::Named(named) => match named {
			NamedKey::Enter => E::Return,
			NamedKey::Tab => E::Tab,
			NamedKey::Escape => E::Escape,
			NamedKey::Space => E::Space,
			NamedKey::Backspace => E::Backspace,
			NamedKey::Delete => E::Delete,
			NamedKey::Home => E::Home,
			NamedKey::End => E::End,
			NamedKey::PageUp => E::PageUp,
			NamedKey::PageDown => E::PageDown,
			NamedKey::Up => E::UpArrow,
			NamedKey::Down => E::DownArrow,
			NamedKey::Left => E::LeftArrow,
			NamedKey::Right => E::RightArrow,
			NamedKey::CapsLock => E::CapsLock,
			#[cfg(windows)]
			NamedKey::Insert => E::Insert,
			#[cfg(windows)]
			NamedKey::NumLock => E::Numlock,
			#[cfg(windows)]
			NamedKey::ScrollLock => E::Scroll,
			#[cfg(windows)]
			NamedKey::PrintScreen => E::Snapshot,
			#[cfg(windows)]
			NamedKey::Pause => E::Pause,
			#[cfg(windows)]
			NamedKey::Menu => E::Apps,
			#[cfg(not(windows))]
			_ => return Err(unsupported(key)),
		},
		Key::Numpad(numpad) => numpad_key(key, *numpad)?,
	};
	Ok(mapped)
}

#[cfg(windows)]
fn numpad_key(key: &Key, numpad: NumpadKey) -> Result<enigo::Key, InputFailure> {
	use enigo::Key as E;

	Ok(match numpad {
		NumpadKey::Digit(0) => E::Numpad0,
		NumpadKey::Digit(1) => E::Numpad1,
		NumpadKey::Digit(2) => E::Numpad2,
		NumpadKey::Digit(3) => E::Numpad3,
		NumpadKey::Digit(4) => E::Numpad4,
		NumpadKey::Digit(5) => E::Numpad5,
		NumpadKey::Digit(6) => E::Numpad6,
		NumpadKey::Digit(7) => E::Numpad7,
		NumpadKey::Digit(8) => E::Numpad8,
		NumpadKey::Digit(9) => E::Numpad9,
		NumpadKey::Digit(_) => return Err(unsupported(key)),
		NumpadKey::Multiply => E::Multiply,
		NumpadKey::Add => E::Add,
		NumpadKey::Subtract => E::Subtract,
		NumpadKey::Decimal => E::Decimal,
		NumpadKey::Divide => E::Divide,
		NumpadKey::Enter => E::Return,
	})
}

#[cfg(not(windows))]
fn numpad_key(key: &Key, _numpad: NumpadKey) -> Result<enigo::Key, InputFailure> {
	Err(unsupported(key))
}

#[cfg(windows)]
fn focus(window: WindowHandle) {
	use windows::Win32::Foundation::HWND;
	use windows::Win32::UI::WindowsAndMessaging::SetForegroundWindow;

	// SAFETY: the handle came from the window enumeration; a stale handle only
	// makes the call fail.
	let focused = unsafe { SetForegroundWindow(HWND(window.0 as usize as *mut _)) };
	if !focused.as_bool() {
		tracing::debug!(%window, "could not bring window to the foreground");
	}
}

#[cfg(not(windows))]
fn focus(_window: WindowHandle) {}

fn input_error(err: enigo::InputError) -> InputFailure {
	InputFailure(err.to_string())
}

#[derive(Debug, Default)]
pub struct EnigoInput;

impl EnigoInput {
	fn modifiers(combo: &KeyCombo) -> Vec<enigo::Key> {
		let mut keys = Vec::new();
		if combo.modifiers.ctrl {
			keys.push(enigo::Key::Control);
		}
		if combo.modifiers.alt {
			keys.push(enigo::Key::Alt);
		}
		if combo.modifiers.shift {
			keys.push(enigo::Key::Shift);
		}
		keys
	}

	fn send(enigo: &mut Enigo, modifiers: &[enigo::Key], key: enigo::Key) -> Result<(), InputFailure> {
		for modifier in modifiers {
			enigo.key(*modifier, Direction::Press).map_err(input_error)?;
		}
		let pressed = enigo.key(key, Direction::Press).map_err(input_error);
		std::thread::sleep(KEY_HOLD);
		let released = enigo.key(key, Direction::Release).map_err(input_error);
		// Modifiers are released even when the main key failed.
		for modifier in modifiers.iter().rev() {
			enigo.key(*modifier, Direction::Release).map_err(input_error)?;
		}
		pressed.and(released)
	}
}

impl InputSink for EnigoInput {
	fn send_key_combination(&mut self, window: WindowHandle, combo: &KeyCombo) -> Result<(), InputFailure> {
		let keys = combo.keys.iter().map(enigo_key).collect::<Result<Vec<_>, _>>()?;
		let modifiers = Self::modifiers(combo);

		focus(window);
		// Connections are not shared across threads on every platform, so one is
		// opened per combination.
		let mut enigo = Enigo::new(&Settings::default()).map_err(|err| InputFailure(err.to_string()))?;
		for key in keys {
			Self::send(&mut enigo, &modifiers, key)?;
		}
		tracing::trace!(%combo, %window, "keys sent");
		Ok(())
	}
}
