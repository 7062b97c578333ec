//! Craft window detection through recognized text.
//!
//! Each poll probes the configured languages, most recently successful first,
//! and stops at the first language whose keywords appear in the text read for
//! it. The winning language is cached for the next poll; the cache is the only
//! engine state that outlives a run, and this detector is its only writer.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{TextRecognizer, WindowHandle};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Capture area as fractions of the window client area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
	pub x: f32,
	pub y: f32,
	pub width: f32,
	pub height: f32,
}

impl Region {
	pub const FULL: Self = Self {
		x: 0.0,
		y: 0.0,
		width: 1.0,
		height: 1.0,
	};
}

impl Default for Region {
	fn default() -> Self {
		Self::FULL
	}
}

/// Keywords that identify the crafting interface in one game language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageProfile {
	pub tag: String,
	pub keywords: Vec<String>,
}

impl LanguageProfile {
	pub fn new(tag: impl Into<String>, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			tag: tag.into(),
			keywords: keywords.into_iter().map(Into::into).collect(),
		}
	}

	/// Crafting log title plus the synthesis window's gauges, per client language.
	pub fn defaults() -> Vec<Self> {
		vec![
			Self::new("en", ["Crafting Log", "Durability", "Progress", "Quality"]),
			Self::new("fr", ["Carnet d'artisanat", "Solidité", "Progression", "Qualité"]),
			Self::new("de", ["Rezeptbuch", "Haltbarkeit", "Fortschritt", "Qualität"]),
			Self::new("ja", ["製作手帳", "耐久", "工数", "品質"]),
		]
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Detection {
	Detected { language: String },
	NotDetected,
}

impl Detection {
	pub fn is_detected(&self) -> bool {
		matches!(self, Detection::Detected { .. })
	}
}

fn normalize(text: &str) -> String {
	WHITESPACE.replace_all(text.trim(), " ").to_lowercase()
}

struct Language {
	tag: String,
	keywords: Vec<String>,
}

impl Language {
	fn compile(profile: LanguageProfile) -> Self {
		Self {
			tag: profile.tag,
			keywords: profile
				.keywords
				.iter()
				.map(|k| normalize(k))
				.filter(|k| !k.is_empty())
				.collect(),
		}
	}

	fn matches(&self, text: &str, distance: usize) -> bool {
		let text = normalize(text);
		self.keywords.iter().any(|keyword| keyword_matches(&text, keyword, distance))
	}
}

/// Substring match, then a fuzzy match over word windows of the keyword's length.
///
/// Short keywords get a proportionally smaller edit budget so that two-glyph
/// keywords must match exactly.
fn keyword_matches(text: &str, keyword: &str, distance: usize) -> bool {
	if text.contains(keyword) {
		return true;
	}

	let allowed = distance.min(keyword.chars().count() / 4);
	if allowed == 0 {
		return false;
	}

	let words = text.split(' ').collect::<Vec<_>>();
	let width = keyword.split(' ').count();
	if words.len() < width {
		return false;
	}
	words
		.windows(width)
		.any(|window| levenshtein::levenshtein(&window.join(" "), keyword) <= allowed)
}

pub struct CraftWindowDetector {
	recognizer: Box<dyn TextRecognizer>,
	languages: Vec<Language>,
	region: Region,
	distance: usize,
	cached: Option<String>,
}

impl CraftWindowDetector {
	pub fn new(
		recognizer: Box<dyn TextRecognizer>,
		profiles: Vec<LanguageProfile>,
		region: Region,
		distance: usize,
	) -> Self {
		Self {
			recognizer,
			languages: profiles.into_iter().map(Language::compile).collect(),
			region,
			distance,
			cached: None,
		}
	}

	/// Seed the cache from a persisted hint; unknown tags are ignored.
	pub fn with_cached_language(mut self, hint: Option<&str>) -> Self {
		self.cached = hint
			.filter(|tag| self.languages.iter().any(|l| l.tag == *tag))
			.map(str::to_string);
		self
	}

	pub fn cached_language(&self) -> Option<&str> {
		self.cached.as_deref()
	}

	/// Cached language first, then the rest in configured order.
	pub fn probe_order(&self) -> Vec<&str> {
		let cached = self.cached.as_deref();
		cached
			.into_iter()
			.chain(self.languages.iter().map(|l| l.tag.as_str()).filter(|tag| Some(*tag) != cached))
			.collect()
	}

	/// One poll over the full fallback list.
	pub fn detect(&mut self, window: WindowHandle) -> Detection {
		let order = self.probe_order().into_iter().map(str::to_string).collect::<Vec<_>>();

		for tag in order {
			let Some(language) = self.languages.iter().find(|l| l.tag == tag) else {
				continue;
			};
			let Some(recognition) = self.recognizer.recognize(window, self.region, &tag) else {
				tracing::trace!(language = %tag, "no text recognized");
				continue;
			};
			if !language.matches(&recognition.text, self.distance) {
				tracing::trace!(language = %tag, text = %recognition.text, "no keyword match");
				continue;
			}

			if self.cached.as_deref() != Some(tag.as_str()) {
				tracing::info!(language = %tag, previous = ?self.cached, "craft window language changed");
				self.cached = Some(tag.clone());
			}
			return Detection::Detected { language: tag };
		}

		Detection::NotDetected
	}
}
