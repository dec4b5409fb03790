//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: class progression, resolved action attempts
//! - Value Objects: roll parameters, rule set selection, the monster table

pub mod entities;
pub mod value_objects;
