//! Binary point file formats

pub mod pts;
