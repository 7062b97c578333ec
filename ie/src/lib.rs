//! Image extraction: capture views, OCR preprocessing and the OCR engines.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;

mod image;
pub use self::image::*;
mod ocr;
pub use ocr::Ocr;

/// OCR engines keyed by recognition model name (`latin`, `japan`, ...).
///
/// Several languages usually share one model, so engines are loaded once per
/// model rather than once per language.
#[derive(Default)]
pub struct Ie {
	engines: HashMap<String, Ocr>,
}

impl Ie {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn has_model(&self, model: &str) -> bool {
		self.engines.contains_key(model)
	}

	pub fn load_model(
		&mut self,
		model: &str,
		ocr_detection: impl AsRef<Path>,
		ocr_recognition: impl AsRef<Path>,
		ocr_charsset: impl AsRef<Path>,
	) -> Result<()> {
		let ocr = Ocr::try_new(ocr_detection, ocr_recognition, ocr_charsset)?;
		self.engines.insert(model.to_string(), ocr);
		Ok(())
	}

	/// Read the text of `image` with the engine for `model`.
	///
	/// Returns `Ok(None)` when that model was never loaded.
	pub fn read_text(&self, image: Image, model: &str) -> Result<Option<String>> {
		match self.engines.get(model) {
			Some(ocr) => image.get_text(ocr).map(Some),
			None => Ok(None),
		}
	}
}
