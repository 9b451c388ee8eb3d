//! Type definitions for scalelink

pub mod error;
pub mod weight;

pub use error::{Error, Result};
pub use weight::{divisor, DecimalWeight, WeightReading};
