//! Application layer - Use case services and boundary interfaces

pub mod dto;
pub mod ports;
pub mod services;
