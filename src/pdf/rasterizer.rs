//! PDF page rasterization
//!
//! Renders every page of a PDF to a PNG bitmap via MuPDF. Rendering is
//! CPU-bound and runs under `spawn_blocking`; the document is opened fresh
//! from bytes for each run, so no MuPDF state outlives a call.

use std::io::Cursor;

use image::DynamicImage;
use mupdf::{Colorspace, Document, Matrix};

use crate::ocr::PageImage;

/// Render scale (2.0 = 144 DPI), chosen for OCR accuracy.
pub const RENDER_SCALE: f32 = 2.0;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("Failed to open PDF: {0}")]
    Open(String),

    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },

    #[error("Rasterization task failed: {0}")]
    Task(String),
}

/// Rasterize all pages of a PDF into an ordered PNG sequence.
///
/// Page images are named `{stem}_page_{n}.png` (1-based) after the source
/// file name. Any page failure aborts the whole run.
pub async fn rasterize(data: Vec<u8>, file_name: &str) -> Result<Vec<PageImage>, RasterError> {
    let stem = file_name
        .split('.')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("document")
        .to_string();

    tokio::task::spawn_blocking(move || rasterize_blocking(&data, &stem))
        .await
        .map_err(|e| RasterError::Task(format!("Task join error: {}", e)))?
}

fn rasterize_blocking(data: &[u8], stem: &str) -> Result<Vec<PageImage>, RasterError> {
    let doc = Document::from_bytes(data, "application/pdf")
        .map_err(|e| RasterError::Open(e.to_string()))?;
    let page_count = doc
        .page_count()
        .map_err(|e| RasterError::Open(e.to_string()))? as usize;

    let mut pages = Vec::with_capacity(page_count);
    for index in 0..page_count {
        let png = render_page(&doc, index)?;
        pages.push(PageImage::new(page_name(stem, index), png));
    }

    tracing::debug!(pages = pages.len(), "Rasterized PDF");
    Ok(pages)
}

fn render_page(doc: &Document, index: usize) -> Result<Vec<u8>, RasterError> {
    let render_err = |e: String| RasterError::Render {
        page: index,
        message: e,
    };

    let page = doc
        .load_page(index as i32)
        .map_err(|e| render_err(e.to_string()))?;

    let matrix = Matrix::new_scale(RENDER_SCALE, RENDER_SCALE);
    let colorspace = Colorspace::device_rgb();
    let pixmap = page
        .to_pixmap(&matrix, &colorspace, true, true)
        .map_err(|e| render_err(e.to_string()))?;

    encode_pixmap(&pixmap).map_err(render_err)
}

/// Convert a MuPDF pixmap into PNG bytes.
fn encode_pixmap(pixmap: &mupdf::Pixmap) -> Result<Vec<u8>, String> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    let mut rgba_buffer = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(0);
            let g = samples.get(offset + 1).copied().unwrap_or(0);
            let b = samples.get(offset + 2).copied().unwrap_or(0);
            let a = if n >= 4 {
                samples.get(offset + 3).copied().unwrap_or(255)
            } else {
                255
            };
            rgba_buffer.extend_from_slice(&[r, g, b, a]);
        }
    }

    let img = image::RgbaImage::from_raw(width, height, rgba_buffer)
        .ok_or_else(|| "Failed to create image buffer".to_string())?;

    let mut output = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(output)
}

fn page_name(stem: &str, index: usize) -> String {
    format!("{}_page_{}.png", stem, index + 1)
}
