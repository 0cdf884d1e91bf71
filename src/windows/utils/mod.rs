//! Windows utility functions

pub mod string_conv;

pub use string_conv::{string_to_wide, wide_to_string};
