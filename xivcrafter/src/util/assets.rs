use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

#[derive(Debug, Clone)]
pub struct OcrAssets {
	pub detection: PathBuf,
	pub recognition: PathBuf,
	pub charset: PathBuf,
}

fn normalize_ocr_dir(dir: PathBuf) -> PathBuf {
	// Accept either the app root (containing `ocr/`) or the `ocr/` folder itself.
	if dir.join("detection.mnn").is_file() {
		dir
	} else {
		dir.join("ocr")
	}
}

fn candidates(configured: Option<&Path>) -> Vec<PathBuf> {
	let mut candidates = Vec::new();
	if let Some(dir) = configured {
		candidates.push(dir.to_path_buf());
	}
	if let Some(dir) = std::env::var_os("XIVCRAFTER_ASSETS_DIR") {
		candidates.push(PathBuf::from(dir));
	}
	if let Ok(exe) = std::env::current_exe()
		&& let Some(dir) = exe.parent()
	{
		candidates.push(dir.to_path_buf());
	}
	if let Ok(cwd) = std::env::current_dir() {
		candidates.push(cwd);
	}
	// Workspace root, for `cargo run` from another directory.
	#[cfg(debug_assertions)]
	candidates.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".."));
	candidates
}

/// Resolve the files of one OCR recognition model (`latin`, `japan`, ...).
///
/// Searched in order: the configured folder, `XIVCRAFTER_ASSETS_DIR`, next to
/// the executable, then the working directory.
pub fn resolve_ocr_assets(model: &str, configured: Option<&Path>) -> Result<OcrAssets> {
	let recognition_name = format!("{model}_recognition.mnn");
	let charset_name = format!("{model}_charset.txt");

	let mut tried = Vec::new();
	for base in candidates(configured) {
		let ocr_dir = normalize_ocr_dir(base);
		let detection = ocr_dir.join("detection.mnn");
		let recognition = ocr_dir.join(&recognition_name);
		let charset = ocr_dir.join(&charset_name);

		if detection.is_file() && recognition.is_file() && charset.is_file() {
			return Ok(OcrAssets { detection, recognition, charset });
		}

		tried.push(ocr_dir);
	}

	bail!(
		"OCR model files not found. Expected these files:\n  - ocr/detection.mnn\n  - ocr/{recognition_name}\n  - ocr/{charset_name}\n\nSearched in:\n{}\n\nFix: copy the 'ocr/' folder next to the executable (or set XIVCRAFTER_ASSETS_DIR to the folder that contains it).",
		tried
			.into_iter()
			.map(|p| format!("  - {}", p.display()))
			.collect::<Vec<_>>()
			.join("\n")
	)
}

#[cfg(test)]
mod tests {
	use std::fs;

	use super::*;

	#[test]
	fn configured_folder_is_searched_first() {
		let dir = tempfile::tempdir().unwrap();
		let ocr = dir.path().join("ocr");
		fs::create_dir(&ocr).unwrap();
		for name in ["detection.mnn", "japan_recognition.mnn", "japan_charset.txt"] {
			fs::write(ocr.join(name), b"").unwrap();
		}

		let assets = resolve_ocr_assets("japan", Some(dir.path())).unwrap();
		assert_eq!(assets.recognition, ocr.join("japan_recognition.mnn"));

		// Pointing straight at the `ocr/` folder works too.
		let assets = resolve_ocr_assets("japan", Some(&ocr)).unwrap();
		assert_eq!(assets.charset, ocr.join("japan_charset.txt"));
	}

	#[test]
	fn missing_model_lists_searched_folders() {
		let dir = tempfile::tempdir().unwrap();
		let err = resolve_ocr_assets("klingon", Some(dir.path())).unwrap_err().to_string();
		assert!(err.contains("klingon_recognition.mnn"));
		assert!(err.contains(&dir.path().join("ocr").display().to_string()));
	}
}
