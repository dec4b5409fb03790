//! Roll visibility modes

use serde::{Deserialize, Serialize};

/// Who gets to see a roll result once it is posted.
///
/// The wire names match the host's chat settings vocabulary, so a mode
/// picked in a host dialog deserializes directly into this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollMode {
    /// Visible to every participant.
    Public,
    /// Whispered to the acting participant only.
    Private,
    /// Delivered to moderators and hidden from the roller.
    Blind,
    /// Kept on the roller's own screen.
    #[serde(rename = "self")]
    SelfOnly,
}

impl RollMode {
    /// True when the result is withheld from the general audience.
    pub fn is_restricted(&self) -> bool {
        !matches!(self, RollMode::Public)
    }
}

impl Default for RollMode {
    fn default() -> Self {
        Self::Public
    }
}

impl std::fmt::Display for RollMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RollMode::Public => "public",
            RollMode::Private => "private",
            RollMode::Blind => "blind",
            RollMode::SelfOnly => "self",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names_match_host_vocabulary() {
        assert_eq!(serde_json::to_string(&RollMode::Public).unwrap(), "\"public\"");
        assert_eq!(serde_json::to_string(&RollMode::SelfOnly).unwrap(), "\"self\"");

        let parsed: RollMode = serde_json::from_str("\"blind\"").unwrap();
        assert_eq!(parsed, RollMode::Blind);
    }

    #[test]
    fn test_public_is_only_unrestricted_mode() {
        assert!(!RollMode::Public.is_restricted());
        assert!(RollMode::Private.is_restricted());
        assert!(RollMode::Blind.is_restricted());
        assert!(RollMode::SelfOnly.is_restricted());
    }
}
