//! Window lookup and OCR over window captures.

use std::collections::BTreeMap;
use std::path::PathBuf;

use craft::{Recognition, Region, TargetLocator, TextRecognizer, WindowHandle};
use xcap::image::EncodableLayout;

use crate::util::assets;

pub fn find_window(title_hint: &str) -> Option<xcap::Window> {
	let windows = xcap::Window::all().ok()?;
	windows.into_iter().find(|window| {
		!window.is_minimized().unwrap_or(false)
			&& window.title().is_ok_and(|title| title.contains(title_hint))
	})
}

fn window_by_handle(handle: WindowHandle) -> Option<xcap::Window> {
	let windows = xcap::Window::all().ok()?;
	windows
		.into_iter()
		.find(|window| window.id().is_ok_and(|id| u64::from(id) == handle.0))
}

pub fn capture_specific(handle: WindowHandle) -> Option<ie::OwnedImage> {
	let window = window_by_handle(handle)?;
	let img = window.capture_image().ok()?;
	Some(ie::OwnedImage::from_rgba(img.width() as usize, img.as_bytes()))
}

/// Finds the game window by a substring of its title.
#[derive(Debug, Default)]
pub struct XcapLocator;

impl TargetLocator for XcapLocator {
	fn find_window(&mut self, title_hint: &str) -> Option<WindowHandle> {
		let window = find_window(title_hint)?;
		let id = window.id().ok()?;
		Some(WindowHandle(u64::from(id)))
	}
}

/// OCR over a fresh capture of the window, one engine per recognition model.
///
/// Models are loaded on first use; a model that failed to load is not retried.
pub struct OcrRecognizer {
	ie: ie::Ie,
	models: BTreeMap<String, String>,
	assets_dir: Option<PathBuf>,
	failed: Vec<String>,
}

impl OcrRecognizer {
	pub fn new(models: BTreeMap<String, String>, assets_dir: Option<PathBuf>) -> Self {
		Self {
			ie: ie::Ie::new(),
			models,
			assets_dir,
			failed: Vec::new(),
		}
	}

	fn model_for(&self, language: &str) -> String {
		self.models.get(language).cloned().unwrap_or_else(|| "latin".to_string())
	}

	fn ensure_model(&mut self, model: &str) -> bool {
		if self.ie.has_model(model) {
			return true;
		}
		if self.failed.iter().any(|m| m == model) {
			return false;
		}

		let loaded = assets::resolve_ocr_assets(model, self.assets_dir.as_deref())
			.and_then(|a| self.ie.load_model(model, &a.detection, &a.recognition, &a.charset));
		match loaded {
			Ok(()) => {
				tracing::info!(model, "OCR model loaded");
				true
			}
			Err(err) => {
				tracing::error!(model, error = %err, "failed to load OCR model");
				self.failed.push(model.to_string());
				false
			}
		}
	}
}

impl TextRecognizer for OcrRecognizer {
	fn recognize(&mut self, window: WindowHandle, region: Region, language: &str) -> Option<Recognition> {
		let model = self.model_for(language);
		if !self.ensure_model(&model) {
			return None;
		}

		let image = capture_specific(window)?;
		let view = image
			.as_image()
			.sub_image_fraction(region.x, region.y, region.width, region.height);
		let text = match self.ie.read_text(view, &model) {
			Ok(Some(text)) => text,
			Ok(None) => return None,
			Err(err) => {
				tracing::warn!(language, error = %err, "OCR failed");
				return None;
			}
		};
		if text.trim().is_empty() {
			return None;
		}
		tracing::trace!(language, %text, "recognized");
		Some(Recognition {
			text,
			language: language.to_string(),
		})
	}
}
