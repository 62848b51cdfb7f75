//! Monochrome threshold filter
//!
//! Three-band luminance quantization used to improve recognition accuracy
//! on low-contrast scans. Per pixel, the three channel intensities are
//! summed (0..=765) and mapped to one band: white above 510, a 127.5
//! middle band above 255, black otherwise. Alpha is forced fully opaque.
//! This is deliberately not a weighted grayscale conversion; the exact
//! thresholds and the non-integer middle band are part of the output
//! contract.

use std::io::Cursor;

use base64::Engine as _;
use image::{DynamicImage, RgbaImage};

use crate::ocr::PageImage;

/// One filtered page: encoded bytes plus a displayable representation.
#[derive(Debug, Clone)]
pub struct FilteredImage {
    /// Output file name, 1-based ("filtered_page_1.png", ...)
    pub name: String,
    /// PNG-encoded filtered image
    pub png: Vec<u8>,
    /// `data:image/png;base64,` URL for direct display
    pub data_url: String,
}

impl FilteredImage {
    /// View the filtered image as a page ready for recognition.
    pub fn into_page_image(self) -> PageImage {
        PageImage::new(self.name, self.png)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode filtered image: {0}")]
    Encode(String),
}

/// Band value for a channel sum, before 8-bit quantization.
fn band(sum: u16) -> f32 {
    if sum > 510 {
        255.0
    } else if sum > 255 {
        127.5
    } else {
        0.0
    }
}

/// Store a band value into an 8-bit channel the way a canvas
/// `Uint8ClampedArray` would: clamp, then round half to even (127.5 -> 128).
fn quantize(value: f32) -> u8 {
    let clamped = value.clamp(0.0, 255.0);
    let floor = clamped.floor();
    let frac = clamped - floor;
    let rounded = if frac > 0.5 {
        floor + 1.0
    } else if frac < 0.5 {
        floor
    } else if (floor as u32) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    };
    rounded as u8
}

/// Apply the three-band filter to every image in order.
///
/// The output sequence is index-aligned with the input; each entry carries
/// both the binary PNG and a base64 data URL.
pub fn apply(images: &[PageImage]) -> Result<Vec<FilteredImage>, FilterError> {
    let mut filtered = Vec::with_capacity(images.len());
    for (index, image) in images.iter().enumerate() {
        filtered.push(filter_one(image, index)?);
    }
    Ok(filtered)
}

fn filter_one(image: &PageImage, index: usize) -> Result<FilteredImage, FilterError> {
    let decoded = image::load_from_memory(&image.data)
        .map_err(|e| FilterError::Decode(format!("{}: {}", image.name, e)))?;

    let mut rgba: RgbaImage = decoded.to_rgba8();
    for pixel in rgba.pixels_mut() {
        let sum = pixel[0] as u16 + pixel[1] as u16 + pixel[2] as u16;
        let value = quantize(band(sum));
        pixel[0] = value;
        pixel[1] = value;
        pixel[2] = value;
        pixel[3] = 255;
    }

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(rgba)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| FilterError::Encode(e.to_string()))?;

    let data_url = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&png)
    );

    Ok(FilteredImage {
        name: format!("filtered_page_{}.png", index + 1),
        png,
        data_url,
    })
}
