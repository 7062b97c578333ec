//! Key combinations as typed by the user (`Ctrl+F1`, `Alt+Q`, `Shift+Num3`).
//!
//! The textual form is what the document stores; the parsed form is what the
//! input backend consumes. Parsing is case-insensitive and rejects shortcuts
//! without a main key. A bare digit is the numpad digit, the way hotbar
//! shortcuts are usually bound in game; there is no spelling for the main-row
//! digits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Modifier keys held for the duration of a combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
	pub ctrl: bool,
	pub alt: bool,
	pub shift: bool,
}

impl Modifiers {
	pub const NONE: Self = Self { ctrl: false, alt: false, shift: false };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
	Enter,
	Tab,
	Escape,
	Space,
	Backspace,
	Delete,
	Insert,
	Home,
	End,
	PageUp,
	PageDown,
	Up,
	Down,
	Left,
	Right,
	CapsLock,
	NumLock,
	ScrollLock,
	PrintScreen,
	Pause,
	Menu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumpadKey {
	Digit(u8),
	Multiply,
	Add,
	Subtract,
	Decimal,
	Divide,
	Enter,
}

/// A single physical key (modifiers excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
	Char(char),
	Function(u8),
	Named(NamedKey),
	Numpad(NumpadKey),
}

impl Key {
	fn parse(token: &str) -> Option<Self> {
		let lower = token.to_ascii_lowercase();

		if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
			return (1..=24).contains(&n).then_some(Key::Function(n));
		}

		let named = match lower.as_str() {
			"enter" | "return" => Some(NamedKey::Enter),
			"tab" => Some(NamedKey::Tab),
			"esc" | "escape" => Some(NamedKey::Escape),
			"space" | "spacebar" => Some(NamedKey::Space),
			"backspace" | "bs" => Some(NamedKey::Backspace),
			"delete" | "del" => Some(NamedKey::Delete),
			"insert" | "ins" => Some(NamedKey::Insert),
			"home" => Some(NamedKey::Home),
			"end" => Some(NamedKey::End),
			"pageup" | "pgup" => Some(NamedKey::PageUp),
			"pagedown" | "pgdn" => Some(NamedKey::PageDown),
			"up" => Some(NamedKey::Up),
			"down" => Some(NamedKey::Down),
			"left" => Some(NamedKey::Left),
			"right" => Some(NamedKey::Right),
			"capslock" => Some(NamedKey::CapsLock),
			"numlock" => Some(NamedKey::NumLock),
			"scrolllock" => Some(NamedKey::ScrollLock),
			"printscreen" | "prtsc" => Some(NamedKey::PrintScreen),
			"pause" | "break" => Some(NamedKey::Pause),
			"menu" | "apps" => Some(NamedKey::Menu),
			_ => None,
		};
		if let Some(named) = named {
			return Some(Key::Named(named));
		}

		let numpad = match lower.as_str() {
			"numpadmultiply" | "num*" => Some(NumpadKey::Multiply),
			"numpadadd" => Some(NumpadKey::Add),
			"numpadsubtract" | "num-" => Some(NumpadKey::Subtract),
			"numpaddecimal" | "num." => Some(NumpadKey::Decimal),
			"numpaddivide" | "num/" => Some(NumpadKey::Divide),
			"numpadenter" => Some(NumpadKey::Enter),
			other => other
				.strip_prefix("numpad")
				.or_else(|| other.strip_prefix("num"))
				.and_then(|d| d.parse::<u8>().ok())
				.filter(|d| *d <= 9)
				.map(NumpadKey::Digit),
		};
		if let Some(numpad) = numpad {
			return Some(Key::Numpad(numpad));
		}

		let mut chars = token.chars();
		match (chars.next(), chars.next()) {
			(Some(c), None) if c.is_ascii_digit() => Some(Key::Numpad(NumpadKey::Digit(c as u8 - b'0'))),
			(Some(c), None) if !c.is_whitespace() => Some(Key::Char(c.to_ascii_lowercase())),
			_ => None,
		}
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
			Key::Function(n) => write!(f, "F{n}"),
			Key::Named(named) => write!(f, "{named:?}"),
			Key::Numpad(NumpadKey::Digit(d)) => write!(f, "Num{d}"),
			Key::Numpad(NumpadKey::Multiply) => write!(f, "Num*"),
			Key::Numpad(NumpadKey::Add) => write!(f, "NumpadAdd"),
			Key::Numpad(NumpadKey::Subtract) => write!(f, "Num-"),
			Key::Numpad(NumpadKey::Decimal) => write!(f, "Num."),
			Key::Numpad(NumpadKey::Divide) => write!(f, "Num/"),
			Key::Numpad(NumpadKey::Enter) => write!(f, "NumpadEnter"),
		}
	}
}

/// Ordered set of physical keys plus the modifiers held around them.
///
/// Main keys are pressed one after another while the modifiers stay down.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyCombo {
	pub modifiers: Modifiers,
	pub keys: Vec<Key>,
}

impl KeyCombo {
	pub fn parse(shortcut: &str) -> Result<Self, ModelError> {
		let invalid = || ModelError::InvalidShortcut(shortcut.to_string());

		let mut tokens = shortcut.split('+').map(str::trim).collect::<Vec<_>>();
		// "Ctrl++" splits into ["Ctrl", "", ""]: the trailing pair stands for the plus key.
		let plus = tokens.len() >= 3 && tokens[tokens.len() - 1].is_empty() && tokens[tokens.len() - 2].is_empty();
		if plus {
			tokens.truncate(tokens.len() - 2);
		}

		let mut modifiers = Modifiers::NONE;
		let mut keys = Vec::new();
		for token in tokens {
			match token.to_ascii_lowercase().as_str() {
				"" if shortcut.trim() == "+" => keys.push(Key::Char('+')),
				"" => return Err(invalid()),
				"ctrl" | "control" => modifiers.ctrl = true,
				"alt" => modifiers.alt = true,
				"shift" => modifiers.shift = true,
				_ => keys.push(Key::parse(token).ok_or_else(invalid)?),
			}
		}
		if plus {
			keys.push(Key::Char('+'));
		}

		if keys.is_empty() {
			return Err(invalid());
		}
		keys.dedup();

		Ok(Self { modifiers, keys })
	}
}

impl fmt::Display for KeyCombo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut parts = Vec::new();
		if self.modifiers.ctrl {
			parts.push("Ctrl".to_string());
		}
		if self.modifiers.alt {
			parts.push("Alt".to_string());
		}
		if self.modifiers.shift {
			parts.push("Shift".to_string());
		}
		parts.extend(self.keys.iter().map(Key::to_string));
		write!(f, "{}", parts.join("+"))
	}
}

impl TryFrom<String> for KeyCombo {
	type Error = ModelError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}

impl From<KeyCombo> for String {
	fn from(value: KeyCombo) -> Self {
		value.to_string()
	}
}

impl std::str::FromStr for KeyCombo {
	type Err = ModelError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_modifiers_and_function_key() {
		let combo = KeyCombo::parse("Ctrl+Shift+F1").unwrap();
		assert!(combo.modifiers.ctrl);
		assert!(combo.modifiers.shift);
		assert!(!combo.modifiers.alt);
		assert_eq!(combo.keys, vec![Key::Function(1)]);
		assert_eq!(combo.to_string(), "Ctrl+Shift+F1");
	}

	#[test]
	fn parses_named_and_numpad_keys_case_insensitively() {
		assert_eq!(KeyCombo::parse("ESC").unwrap().keys, vec![Key::Named(NamedKey::Escape)]);
		assert_eq!(KeyCombo::parse("pgdn").unwrap().keys, vec![Key::Named(NamedKey::PageDown)]);
		assert_eq!(
			KeyCombo::parse("alt+Num3").unwrap().keys,
			vec![Key::Numpad(NumpadKey::Digit(3))]
		);
		assert_eq!(
			KeyCombo::parse("numpadenter").unwrap().keys,
			vec![Key::Numpad(NumpadKey::Enter)]
		);
	}

	#[test]
	fn trailing_double_plus_is_the_plus_key() {
		let combo = KeyCombo::parse("Ctrl++").unwrap();
		assert!(combo.modifiers.ctrl);
		assert_eq!(combo.keys, vec![Key::Char('+')]);

		assert_eq!(KeyCombo::parse("+").unwrap().keys, vec![Key::Char('+')]);
	}

	#[test]
	fn bare_digits_are_numpad_digits() {
		let combo = KeyCombo::parse("3").unwrap();
		assert_eq!(combo.keys, vec![Key::Numpad(NumpadKey::Digit(3))]);
		assert_eq!(combo.to_string(), "Num3");
		assert_eq!(KeyCombo::parse("Num3").unwrap(), combo);
		assert_eq!(
			KeyCombo::parse("Ctrl+0").unwrap().keys,
			vec![Key::Numpad(NumpadKey::Digit(0))]
		);
	}

	#[test]
	fn numpad_operators_survive_the_textual_form() {
		for (shortcut, key) in [
			("Ctrl+NumpadAdd", NumpadKey::Add),
			("Ctrl+Num-", NumpadKey::Subtract),
			("Ctrl+Num*", NumpadKey::Multiply),
			("Ctrl+Num/", NumpadKey::Divide),
			("Ctrl+Num.", NumpadKey::Decimal),
		] {
			let combo = KeyCombo::parse(shortcut).unwrap();
			assert_eq!(combo.keys, vec![Key::Numpad(key)], "{shortcut}");
			assert_eq!(KeyCombo::parse(&combo.to_string()).unwrap(), combo, "{shortcut}");
		}
		// The plus sign separates keys, so the numpad plus is only spelled out.
		assert!(KeyCombo::parse("num+").is_err());
	}

	#[test]
	fn rejects_modifier_only_and_unknown_tokens() {
		assert!(matches!(KeyCombo::parse("Ctrl+Alt"), Err(ModelError::InvalidShortcut(_))));
		assert!(KeyCombo::parse("").is_err());
		assert!(KeyCombo::parse("Ctrl+F25").is_err());
		assert!(KeyCombo::parse("Ctrl+banana").is_err());
	}

	#[test]
	fn serde_uses_the_textual_form() {
		let combo: KeyCombo = serde_json::from_str("\"alt+q\"").unwrap();
		assert_eq!(serde_json::to_string(&combo).unwrap(), "\"Alt+Q\"");
	}
}
