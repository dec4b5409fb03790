//! WrldBldr Rules - Action resolution, roll brokering, and class progression
//!
//! A host-agnostic rules core for TTRPG tables. The crate:
//! - Builds and canonicalizes dice formulas, including X-in-6 and
//!   percentile check notation
//! - Brokers roll requests between participants, with decline and
//!   visibility handling
//! - Advances class progressions with hit point rolls and an append-only
//!   experience log
//! - Narrates attempts from a configurable template set and runs their
//!   follow-ups
//!
//! All table state lives behind the outbound ports in
//! [`application::ports::outbound`]; hosts implement those against their
//! own documents, chat, and dialogs. [`infrastructure::MemoryHost`] is a
//! complete in-memory implementation to start from.

pub mod application;
pub mod domain;
pub mod infrastructure;
