//! Candle shape detection
//!
//! Chart pixels are reduced to intensity, everything at or below the
//! threshold becomes foreground, and each outermost connected foreground
//! region yields one bounding box. The heuristic assumes a light background
//! with darker candles; dark-themed charts come out empty or inverted.

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;
use tracing::debug;

use crate::params::ExtractionParams;
use crate::{AnalysisError, Result};

/// Foreground value in the binary mask
const FOREGROUND: u8 = 255;
const BACKGROUND: u8 = 0;

/// Axis-aligned bounding box of a detected region, in pixels
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Shape {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Shape {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn top(&self) -> u32 {
        self.y
    }

    /// Widened so `y + height` cannot overflow
    #[inline]
    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    #[inline]
    pub fn center_y(&self) -> f64 {
        f64::from(self.y) + f64::from(self.height) / 2.0
    }
}

/// Finds candle-like regions in a chart image
#[derive(Debug, Clone, Copy)]
pub struct ShapeDetector {
    threshold: u8,
}

impl Default for ShapeDetector {
    fn default() -> Self {
        Self::from_params(&ExtractionParams::default())
    }
}

impl ShapeDetector {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    pub fn from_params(params: &ExtractionParams) -> Self {
        Self::new(params.threshold)
    }

    #[inline]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Bounding boxes of all outermost foreground regions. No ordering.
    pub fn detect(&self, image: &DynamicImage) -> Vec<Shape> {
        let mask = self.binarize(image);
        let shapes = external_boxes(&mask);
        debug!(
            width = image.width(),
            height = image.height(),
            shapes = shapes.len(),
            "shapes detected"
        );
        shapes
    }

    /// Decode an encoded image held in memory, then detect
    pub fn detect_bytes(&self, bytes: &[u8]) -> Result<Vec<Shape>> {
        let image = decode(bytes)?;
        Ok(self.detect(&image))
    }

    /// Read and decode an image file, then detect
    pub fn detect_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Shape>> {
        let image = open(path)?;
        Ok(self.detect(&image))
    }

    /// Binary mask: pixels with intensity `<= threshold` are foreground
    pub fn binarize(&self, image: &DynamicImage) -> GrayImage {
        let rgb = image.to_rgb8();
        let threshold = self.threshold;

        GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
            let [r, g, b] = rgb.get_pixel(x, y).0;
            if luma(r, g, b) <= threshold {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        })
    }
}

/// Decode an encoded image (PNG, JPEG, BMP, ...) from memory
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| AnalysisError::ImageDecode(e.to_string()))
}

/// Read and decode an image file
pub fn open<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();
    image::open(path)
        .map_err(|e| AnalysisError::ImageDecode(format!("{}: {}", path.display(), e)))
}

/// ITU-R BT.601 luma
#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    y.round().min(255.0) as u8
}

/// Bounding boxes of the outermost regions. The mask is framed with one
/// pixel of background first: a region touching the image edge would
/// otherwise be traced as a top-level hole instead of an outer border.
fn external_boxes(mask: &GrayImage) -> Vec<Shape> {
    find_contours::<u32>(&framed(mask))
        .into_iter()
        .filter(|c| c.parent.is_none() && matches!(c.border_type, BorderType::Outer))
        .filter_map(|c| bounding_box(&c.points))
        .map(|s| Shape::new(s.x.saturating_sub(1), s.y.saturating_sub(1), s.width, s.height))
        .collect()
}

/// `mask` inset by one pixel in a background-filled canvas
fn framed(mask: &GrayImage) -> GrayImage {
    let mut out = GrayImage::from_pixel(mask.width() + 2, mask.height() + 2, Luma([BACKGROUND]));
    image::imageops::replace(&mut out, mask, 1, 1);
    out
}

/// Inclusive pixel extent: a lone pixel is 1x1
fn bounding_box(points: &[Point<u32>]) -> Option<Shape> {
    let first = points.first()?;
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);

    for p in &points[1..] {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    Some(Shape::new(
        min_x,
        min_y,
        max_x - min_x + 1,
        max_y - min_y + 1,
    ))
}

// ============================================================
// TESTS
// ============================================================
