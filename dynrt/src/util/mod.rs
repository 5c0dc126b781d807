//! Util Module - shared utilities

pub mod alignment;

pub use alignment::Alignment;
