//! Launch domain types: artifact locations and the resolved launch config.

pub mod launch;
pub mod location;

pub use launch::*;
pub use location::*;
