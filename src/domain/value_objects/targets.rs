//! Target selection normalization
//!
//! Hosts hand over targets in whatever shape their UI produced: nothing, a
//! single token, nested lists, or a keyed map of groups. Services only ever
//! deal with the flattened list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::DocumentRef;

/// A resolved target of an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    pub name: String,
    /// Host document behind the target, when one exists.
    pub reference: Option<DocumentRef>,
}

impl TargetRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: DocumentRef) -> Self {
        self.reference = Some(reference);
        self
    }
}

/// Target input as received from a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSelection {
    None,
    One(TargetRef),
    Many(Vec<TargetSelection>),
    Keyed(BTreeMap<String, TargetSelection>),
}

impl TargetSelection {
    /// Flatten any nesting into a plain target list, preserving order.
    /// Keyed groups contribute in key order.
    pub fn flatten(&self) -> Vec<TargetRef> {
        let mut targets = Vec::new();
        self.collect_into(&mut targets);
        targets
    }

    pub fn is_empty(&self) -> bool {
        self.flatten().is_empty()
    }

    fn collect_into(&self, targets: &mut Vec<TargetRef>) {
        match self {
            TargetSelection::None => {}
            TargetSelection::One(target) => targets.push(target.clone()),
            TargetSelection::Many(selections) => {
                for selection in selections {
                    selection.collect_into(targets);
                }
            }
            TargetSelection::Keyed(groups) => {
                for selection in groups.values() {
                    selection.collect_into(targets);
                }
            }
        }
    }
}

impl Default for TargetSelection {
    fn default() -> Self {
        TargetSelection::None
    }
}
