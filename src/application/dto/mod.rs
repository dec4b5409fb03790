//! Data Transfer Objects - Wire shapes for the transport boundary

pub mod roll;

pub use roll::*;
