//! PDF handling
//!
//! Rasterization of multi-page PDFs into page-image sequences via MuPDF.

mod rasterizer;

pub use rasterizer::{rasterize, RasterError, RENDER_SCALE};
