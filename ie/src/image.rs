//! Image primitives for window captures.
//!
//! Captures arrive as RGBA bytes and are stored as an owned RGB image
//! (`OwnedImage`). Cropping to the configured capture region borrows a view
//! (`Image<'a>`) instead of copying pixels; only OCR preprocessing produces
//! new owned images.

use anyhow::{Context, Result};

/// Owned RGB image (no alpha).
#[derive(Clone, Debug)]
pub struct OwnedImage {
    width: u32,
    height: u32,
    data: Vec<Color>,
}

impl OwnedImage {
    /// Build an `OwnedImage` from RGBA bytes (alpha is discarded).
    ///
    /// The buffer is expected to be tightly packed: `width * height * 4` bytes.
    pub fn from_rgba(width: usize, bytes: &[u8]) -> Self {
        let height = bytes.len() / width.max(1) / 4;
        let data = bytes
            .chunks_exact(4)
            .take(width * height)
            .map(|v| Color::new(v[0], v[1], v[2]))
            .collect::<Vec<_>>();

        Self {
            width: width as u32,
            height: height as u32,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize this image to the given height (preserving aspect ratio).
    ///
    /// Uses `fast_image_resize` (SIMD-optimized) and keeps output in `Vec<Color>`.
    pub fn resize_h(&mut self, height: u32) -> Result<()> {
        if self.height == height || self.width == 0 || self.height == 0 {
            return Ok(());
        }

        let height = height.max(1);
        let width = ((self.width as u64 * height as u64 / self.height as u64) as u32).max(1);

        // SAFETY: `Color` is `#[repr(C)]` with 3 x `u8`, so it is layout-compatible
        // with `fast_image_resize::pixels::U8x3` (alignment 1).
        let src_pixels = unsafe {
            std::slice::from_raw_parts(
                self.data.as_ptr() as *const fast_image_resize::pixels::U8x3,
                self.data.len(),
            )
        };

        let src = fast_image_resize::images::ImageRef::from_pixels(self.width, self.height, src_pixels)
            .context("fast_image_resize: ImageRef::from_pixels")?;

        let mut dst = fast_image_resize::images::Image::new(width, height, fast_image_resize::PixelType::U8x3);

        let mut resizer = fast_image_resize::Resizer::new();
        let options = fast_image_resize::ResizeOptions::new().resize_alg(
            fast_image_resize::ResizeAlg::Interpolation(fast_image_resize::FilterType::CatmullRom),
        );

        resizer
            .resize(&src, &mut dst, &Some(options))
            .context("fast_image_resize: resize")?;

        let bytes: Vec<u8> = dst.into_vec();
        self.data = bytes
            .chunks_exact(3)
            .map(|px| Color::new(px[0], px[1], px[2]))
            .collect();
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Create a borrowed view of this entire image.
    pub fn as_image<'a>(&'a self) -> Image<'a> {
        Image {
            x1: 0,
            y1: 0,
            x2: self.width,
            y2: self.height,
            true_width: self.width,
            data: &self.data,
        }
    }

    /// Convert to a grayscale `GrayImage` (luma).
    pub fn to_gray_image(&self) -> image::GrayImage {
        use image::{GrayImage, Luma};
        let mut out = GrayImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.data[(x + y * self.width) as usize];
                out.put_pixel(x, y, Luma([c.luma()]));
            }
        }
        out
    }

    /// Create an RGB `OwnedImage` from a grayscale image (each pixel repeated into RGB).
    pub fn from_gray_as_rgb(gray: &image::GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let data = gray
            .pixels()
            .map(|p| Color::new(p.0[0], p.0[0], p.0[0]))
            .collect();
        Self {
            width: w,
            height: h,
            data,
        }
    }
}

// ----------

/// Borrowed image view into an `OwnedImage`.
#[derive(Clone, Copy)]
pub struct Image<'a> {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    true_width: u32,
    data: &'a [Color],
}

impl<'a> Image<'a> {
    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    #[inline(always)]
    fn pixel(&self, x: u32, y: u32) -> &Color {
        &self.data[(x + y * self.true_width) as usize]
    }

    pub fn to_owned_image(self) -> OwnedImage {
        let mut data = Vec::with_capacity((self.width() * self.height()) as usize);
        for y in self.y1..self.y2 {
            for x in self.x1..self.x2 {
                data.push(*self.pixel(x, y));
            }
        }

        OwnedImage {
            width: self.width(),
            height: self.height(),
            data,
        }
    }

    pub fn get_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width() * self.height() * 3) as usize);
        for y in self.y1..self.y2 {
            for x in self.x1..self.x2 {
                let clr = self.pixel(x, y);
                bytes.extend_from_slice(&[clr.r, clr.g, clr.b]);
            }
        }
        bytes
    }

    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let img = image::RgbImage::from_raw(self.width(), self.height(), self.get_bytes())
            .context("RgbImage::from_raw failed")?;
        img.save_with_format(path, image::ImageFormat::Png)
            .context("save png")?;
        Ok(())
    }

    /// Create an arbitrary subimage (relative coordinates, clamped to this view).
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);

        Self {
            x1: self.x1 + x,
            y1: self.y1 + y,
            x2: self.x1 + x + width,
            y2: self.y1 + y + height,
            true_width: self.true_width,
            data: self.data,
        }
    }

    /// Subimage from fractions of this view (`0.0..=1.0` on both axes).
    ///
    /// Lets the capture region stay valid across window sizes.
    pub fn sub_image_fraction(&self, x: f32, y: f32, width: f32, height: f32) -> Self {
        let w = self.width() as f32;
        let h = self.height() as f32;
        let frac = |v: f32| v.clamp(0.0, 1.0);

        self.sub_image(
            (frac(x) * w).round() as u32,
            (frac(y) * h).round() as u32,
            (frac(width) * w).round() as u32,
            (frac(height) * h).round() as u32,
        )
    }

    /// Extract text using OCR with preprocessing (grayscale, thresholding, upscale).
    ///
    /// The function tries multiple preprocessing strategies (adaptive threshold,
    /// Otsu threshold, plain equalized grayscale) and picks the most plausible result.
    pub fn get_text(&self, ocr: &crate::Ocr) -> Result<String> {
        use imageproc::contrast::{adaptive_threshold, equalize_histogram, otsu_level, threshold, ThresholdType};

        if self.width() == 0 || self.height() == 0 {
            return Ok(String::new());
        }

        // Upscale small crops, OCR performs better on larger glyphs.
        let mut base = self.to_owned_image();
        const MIN_H: u32 = 80;
        if base.height < MIN_H {
            base.resize_h(MIN_H)?;
        }
        let gray = equalize_histogram(&base.to_gray_image());

        // Candidate 1: adaptive threshold (handles gradients/transparency).
        let adaptive = OwnedImage::from_gray_as_rgb(&ensure_dark_text_on_light(adaptive_threshold(&gray, 7, 10)));

        // Candidate 2: global Otsu.
        let otsu = {
            let level = otsu_level(&gray);
            OwnedImage::from_gray_as_rgb(&ensure_dark_text_on_light(threshold(&gray, level, ThresholdType::Binary)))
        };

        // Candidate 3: no binarization (anti-aliased CJK glyphs survive better).
        let plain = OwnedImage::from_gray_as_rgb(&gray);

        let mut best = String::new();
        let mut best_score = i64::MIN;

        for cand in [adaptive, otsu, plain] {
            let text = ocr.get_text(cand.as_image())?;
            let score = score_ocr_text(&text);
            if score > best_score {
                best_score = score;
                best = text;
            }
        }

        // Optional debug snapshots.
        if std::env::var("XIVCRAFTER_WRITE_IMAGE").as_deref() == Ok("1") {
            let name = best.chars().filter(|c| c.is_alphanumeric()).take(40).collect::<String>();
            if let Err(err) = self.save_png(format!("./debug_ocr_{name}.png")) {
                tracing::debug!(error = %err, "failed to write OCR debug snapshot");
            }
        }

        Ok(best)
    }
}

fn ensure_dark_text_on_light(mut bin: image::GrayImage) -> image::GrayImage {
    // If the image is mostly black, invert it so background becomes light.
    let white = bin.pixels().filter(|p| p.0[0] > 0).count();
    let black = bin.pixels().count() - white;
    if black > white {
        for p in bin.pixels_mut() {
            p.0[0] = 255u8.saturating_sub(p.0[0]);
        }
    }
    bin
}

fn score_ocr_text(text: &str) -> i64 {
    // Prefer strings with more alphanumerics (less noise) and slightly longer length.
    let mut score = 0i64;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            score += 3;
        } else if !ch.is_whitespace() {
            score += 1;
        }
    }
    score + text.chars().count() as i64
}

// ----------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Compute luma (grayscale intensity).
    pub fn luma(&self) -> u8 {
        let r = self.r as u32;
        let g = self.g as u32;
        let b = self.b as u32;
        ((299 * r + 587 * g + 114 * b) / 1000) as u8
    }
}
