//! Docscan Server Library
//!
//! Document text extraction: PDF/image uploads are rasterized, optionally
//! contrast-filtered, and run through sequential multi-page OCR with live
//! progress aggregation. Upload attempts are recorded in a flat-file log.
//!
//! The server binary lives in main.rs; this crate root exposes the
//! application modules for tests.

pub mod config;
pub mod extract;
pub mod filter;
pub mod ocr;
pub mod pdf;
pub mod routes;
pub mod state;
pub mod uploadlog;
