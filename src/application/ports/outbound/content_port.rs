//! Content port - Host-side effects, roll tables, and macros

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::domain::value_objects::DocumentRef;

/// Port for the host content an action's follow-ups can touch
#[async_trait]
pub trait ContentPort: Send + Sync {
    /// Apply an effect document to a target.
    async fn create_effect(&self, target: &DocumentRef, effect: &Value) -> Result<()>;

    /// Draw from a named roll table and return the drawn text.
    async fn roll_table(&self, table: &str) -> Result<String>;

    /// Run a named host macro with a context payload.
    async fn execute_macro(&self, name: &str, context: &Value) -> Result<()>;
}
