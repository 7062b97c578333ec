//! OCR wrapper.
//!
//! The project relies on `ocr-rs` (Rust PaddleOCR bindings). OCR engines are
//! sensitive to input quality, so most preprocessing is done in
//! `Image::get_text(...)` before calling into this module.

use std::path::Path;

use anyhow::{Context, Result};

pub struct Ocr {
    engine: ocr_rs::OcrEngine,
}

impl Ocr {
    /// Initialize the OCR engine with the given model paths.
    ///
    /// Missing or invalid model files are reported to the caller; the
    /// recognizer treats a language without a model as "no text found".
    pub fn try_new(
        detection: impl AsRef<Path>,
        recognition: impl AsRef<Path>,
        charsset: impl AsRef<Path>,
    ) -> Result<Self> {
        let thread_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        let engine = ocr_rs::OcrEngine::new(
            detection,
            recognition,
            charsset,
            Some(ocr_rs::OcrEngineConfig {
                backend: ocr_rs::Backend::CPU,
                thread_count,
                // High precision helps with the small serif fonts of in-game windows.
                precision_mode: ocr_rs::PrecisionMode::High,
                enable_parallel: thread_count > 1,
                min_result_confidence: 0.5,
                ..Default::default()
            }),
        )
        .context("failed to initialize OCR engine")?;

        Ok(Self { engine })
    }

    /// Recognize text from an RGB image view.
    pub fn get_text(&self, image: crate::Image) -> Result<String> {
        let image = ocr_rs::preprocess::rgb_to_image(&image.get_bytes(), image.width(), image.height());

        let results = self
            .engine
            .recognize(&image)
            .context("OCR recognition failed")?;

        Ok(results
            .into_iter()
            .map(|v| v.text)
            .collect::<Vec<_>>()
            .join(" "))
    }
}
