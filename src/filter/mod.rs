//! Image preprocessing filters

mod monochrome;

pub use monochrome::{apply, FilterError, FilteredImage};
