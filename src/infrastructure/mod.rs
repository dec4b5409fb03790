//! Infrastructure layer - Adapters behind the outbound ports
//!
//! This layer contains:
//! - Config: Rules configuration from the environment
//! - Dice: Local and scripted roll evaluation
//! - Memory: A complete in-memory host for tests and standalone use
//!
//! Real table hosts live outside this crate and implement the ports in
//! `application::ports::outbound` themselves.

pub mod config;
pub mod dice;
pub mod memory;

pub use config::RulesConfig;
pub use dice::{ScriptedDiceRoller, ThreadRngDiceRoller};
pub use memory::{MemoryHost, Notice, NoticeLevel, RecordedMessage};
