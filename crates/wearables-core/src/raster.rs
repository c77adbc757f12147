//! Decoded image buffer and the 2D drawing surface classifiers read from.

use crate::analyzer::AnalysisError;
use std::path::Path;

const BYTES_PER_PIXEL: usize = 4;

/// A decoded RGBA8 image.
#[derive(Clone)]
pub struct Raster {
    /// Packed RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Read-only view over a raster whose buffer matches its dimensions.
#[derive(Debug)]
pub struct Surface<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl Raster {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self { data, width, height }
    }

    /// A uniformly filled raster, mostly useful for tests and diagnostics.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let data = rgba.iter().copied().cycle().take(pixels * BYTES_PER_PIXEL).collect();
        Self { data, width, height }
    }

    pub fn from_image(img: &image::DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            data: rgba.into_raw(),
            width,
            height,
        }
    }

    /// Decode an image file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| AnalysisError::Decode(format!("{}: {e}", path.display())))?;
        let raster = Self::from_image(&img);
        tracing::debug!(
            path = %path.display(),
            width = raster.width,
            height = raster.height,
            "decoded image"
        );
        Ok(raster)
    }

    /// Obtain a drawing surface for this raster.
    ///
    /// Fails with `InvalidInput` for a zero-area image and with `Render`
    /// when the pixel buffer does not match the declared dimensions.
    pub fn surface(&self) -> Result<Surface<'_>, AnalysisError> {
        if self.width == 0 || self.height == 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "zero-area image ({}x{})",
                self.width, self.height
            )));
        }
        let expected = self.width as usize * self.height as usize * BYTES_PER_PIXEL;
        if self.data.len() != expected {
            return Err(AnalysisError::Render {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(Surface {
            data: &self.data,
            width: self.width,
            height: self.height,
        })
    }
}

impl Surface<'_> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Average Rec.601 luma (0.0–255.0).
    pub fn avg_luma(&self) -> f32 {
        let pixels = self.data.len() / BYTES_PER_PIXEL;
        if pixels == 0 {
            return 0.0;
        }
        let sum: f32 = self
            .data
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|p| 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32)
            .sum();
        sum / pixels as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_raster_length() {
        let r = Raster::filled(4, 3, [1, 2, 3, 255]);
        assert_eq!(r.data.len(), 4 * 3 * 4);
        assert_eq!(&r.data[4..8], &[1, 2, 3, 255]);
    }

    #[test]
    fn test_surface_rejects_mismatched_buffer() {
        let r = Raster::new(vec![0u8; 10], 4, 4);
        match r.surface() {
            Err(AnalysisError::Render { expected, actual }) => {
                assert_eq!(expected, 64);
                assert_eq!(actual, 10);
            }
            Err(other) => panic!("expected Render error, got {other}"),
            Ok(surface) => panic!("expected Render error, got {surface:?}"),
        }
    }

    #[test]
    fn test_surface_debug_is_printable() {
        let r = Raster::filled(3, 2, [0, 0, 0, 255]);
        let s = r.surface().unwrap();
        let dbg = format!("{s:?}");
        assert!(dbg.starts_with("Surface"), "{dbg}");
        assert!(dbg.contains("width: 3"), "{dbg}");
    }

    #[test]
    fn test_surface_rejects_zero_area() {
        let r = Raster::new(Vec::new(), 0, 10);
        assert!(matches!(r.surface(), Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_avg_luma_white() {
        let r = Raster::filled(8, 8, [255, 255, 255, 255]);
        let luma = r.surface().unwrap().avg_luma();
        assert!((luma - 255.0).abs() < 0.01, "luma = {luma}");
    }

    #[test]
    fn test_from_image_dimensions() {
        let img = image::DynamicImage::new_rgb8(5, 7);
        let r = Raster::from_image(&img);
        assert_eq!((r.width, r.height), (5, 7));
        assert!(r.surface().is_ok());
    }
}
