//! Route modules

pub mod extract;
pub mod log;
