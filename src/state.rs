//! Resource lifecycle states and the transitions between them.
//!
//! Key resources move through `Enabled`, `Disabled` and `ScheduledDeletion`;
//! network resources report `Active`, `Error` and the `Pending*` states. A
//! state string the client does not know decodes to
//! [`ResourceState::Unknown`] carrying the raw value, so new provider states
//! never break decoding of a whole response.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Lifecycle state reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceState {
    Enabled,
    Disabled,
    ScheduledDeletion,
    PendingCreate,
    PendingUpdate,
    PendingDelete,
    Active,
    Error,
    /// A value this client does not recognize, kept verbatim.
    Unknown(String),
}

impl ResourceState {
    /// Every declared state, in declaration order.
    pub const DECLARED: [ResourceState; 8] = [
        ResourceState::Enabled,
        ResourceState::Disabled,
        ResourceState::ScheduledDeletion,
        ResourceState::PendingCreate,
        ResourceState::PendingUpdate,
        ResourceState::PendingDelete,
        ResourceState::Active,
        ResourceState::Error,
    ];

    /// Wire form: the upper-case name, or the raw value for `Unknown`.
    pub fn as_str(&self) -> &str {
        match self {
            ResourceState::Enabled => "ENABLED",
            ResourceState::Disabled => "DISABLED",
            ResourceState::ScheduledDeletion => "SCHEDULED_DELETION",
            ResourceState::PendingCreate => "PENDING_CREATE",
            ResourceState::PendingUpdate => "PENDING_UPDATE",
            ResourceState::PendingDelete => "PENDING_DELETE",
            ResourceState::Active => "ACTIVE",
            ResourceState::Error => "ERROR",
            ResourceState::Unknown(raw) => raw,
        }
    }

    /// Decode a wire value, case-insensitively. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ENABLED" => ResourceState::Enabled,
            "DISABLED" => ResourceState::Disabled,
            "SCHEDULED_DELETION" => ResourceState::ScheduledDeletion,
            "PENDING_CREATE" => ResourceState::PendingCreate,
            "PENDING_UPDATE" => ResourceState::PendingUpdate,
            "PENDING_DELETE" => ResourceState::PendingDelete,
            "ACTIVE" => ResourceState::Active,
            "ERROR" => ResourceState::Error,
            _ => ResourceState::Unknown(raw.to_string()),
        }
    }

    /// True for values outside the declared set.
    pub fn is_unknown(&self) -> bool {
        matches!(self, ResourceState::Unknown(_))
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ResourceState {
    fn from(raw: &str) -> Self {
        ResourceState::parse(raw)
    }
}

impl Serialize for ResourceState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ResourceState::parse(&raw))
    }
}

/// Resource families and the state subset each one uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceFamily {
    Key,
    Network,
}

impl ResourceFamily {
    /// Whether `state` may be reported for this family.
    ///
    /// `Unknown` is accepted for every family.
    pub fn allows(&self, state: &ResourceState) -> bool {
        use ResourceState::*;
        match (self, state) {
            (_, Unknown(_)) => true,
            (ResourceFamily::Key, Enabled | Disabled | ScheduledDeletion) => true,
            (
                ResourceFamily::Network,
                Active | Error | PendingCreate | PendingUpdate | PendingDelete,
            ) => true,
            _ => false,
        }
    }

    /// State a freshly created resource starts in.
    pub fn initial_state(&self) -> ResourceState {
        match self {
            ResourceFamily::Key => ResourceState::Enabled,
            ResourceFamily::Network => ResourceState::PendingCreate,
        }
    }

    /// Reject a decoded state that belongs to another family.
    pub fn check(&self, state: &ResourceState) -> Result<()> {
        if self.allows(state) {
            Ok(())
        } else {
            Err(Error::Protocol(format!(
                "state {state} is not valid for {self:?} resources"
            )))
        }
    }
}

/// Client-initiated transitions of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransition {
    Enable,
    Disable,
    ScheduleDeletion,
    CancelDeletion,
}

impl KeyTransition {
    /// State the key is in after the provider accepts the transition.
    pub fn target(&self) -> ResourceState {
        match self {
            KeyTransition::Enable => ResourceState::Enabled,
            KeyTransition::Disable | KeyTransition::CancelDeletion => ResourceState::Disabled,
            KeyTransition::ScheduleDeletion => ResourceState::ScheduledDeletion,
        }
    }

    /// The key state machine: the state reached from `from`, or `None` if
    /// the transition is not legal from there.
    ///
    /// Enabling an enabled key and disabling a disabled one are no-ops.
    /// The provider remains the authority; this lets callers holding a
    /// recently fetched [`Key`](crate::Key) skip calls that would be refused.
    ///
    /// ```
    /// use hwcloud::{KeyTransition, ResourceState};
    ///
    /// let from = ResourceState::ScheduledDeletion;
    /// assert_eq!(
    ///     KeyTransition::CancelDeletion.apply(&from),
    ///     Some(ResourceState::Disabled)
    /// );
    /// assert_eq!(KeyTransition::Enable.apply(&from), None);
    /// ```
    pub fn apply(&self, from: &ResourceState) -> Option<ResourceState> {
        use ResourceState::*;
        match (self, from) {
            (KeyTransition::Enable, Enabled | Disabled) => Some(Enabled),
            (KeyTransition::Disable, Enabled | Disabled) => Some(Disabled),
            (KeyTransition::ScheduleDeletion, Enabled | Disabled) => Some(ScheduledDeletion),
            (KeyTransition::CancelDeletion, ScheduledDeletion) => Some(Disabled),
            _ => None,
        }
    }

    /// Validate the state the provider reported after this transition.
    ///
    /// Anything other than the target state is an impossible transition,
    /// except `Unknown`, which is passed through.
    pub fn check_reported(&self, reported: &ResourceState) -> Result<()> {
        if reported.is_unknown() || *reported == self.target() {
            Ok(())
        } else {
            Err(Error::Protocol(format!(
                "{self:?} reported state {reported}, expected {}",
                self.target()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_round_trip_for_declared_states() {
        for state in ResourceState::DECLARED {
            let json = serde_json::to_string(&state).unwrap();
            let back: ResourceState = serde_json::from_str(&json).unwrap();
            assert_eq!(back, state);
        }
    }

    #[test]
    fn test_unknown_keeps_raw_value() {
        let state: ResourceState = serde_json::from_str(r#""FROZEN""#).unwrap();
        assert_eq!(state, ResourceState::Unknown("FROZEN".to_string()));
        assert_eq!(serde_json::to_string(&state).unwrap(), r#""FROZEN""#);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ResourceState::parse("enabled"), ResourceState::Enabled);
        assert_eq!(ResourceState::parse("Pending_Create"), ResourceState::PendingCreate);
    }

    #[test]
    fn test_family_subsets() {
        assert!(ResourceFamily::Key.allows(&ResourceState::ScheduledDeletion));
        assert!(!ResourceFamily::Key.allows(&ResourceState::Active));
        assert!(ResourceFamily::Network.allows(&ResourceState::PendingDelete));
        assert!(!ResourceFamily::Network.allows(&ResourceState::Enabled));
        assert!(ResourceFamily::Network.allows(&ResourceState::Unknown("X".into())));
        assert!(matches!(
            ResourceFamily::Key.check(&ResourceState::Error),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn test_key_lifecycle_transitions() {
        let created = ResourceFamily::Key.initial_state();
        assert_eq!(created, ResourceState::Enabled);

        let scheduled = KeyTransition::ScheduleDeletion.apply(&created).unwrap();
        assert_eq!(scheduled, ResourceState::ScheduledDeletion);

        let cancelled = KeyTransition::CancelDeletion.apply(&scheduled).unwrap();
        assert_eq!(cancelled, ResourceState::Disabled);

        let enabled = KeyTransition::Enable.apply(&cancelled).unwrap();
        assert_eq!(enabled, ResourceState::Enabled);
    }

    #[test]
    fn test_illegal_key_transitions() {
        assert!(KeyTransition::Enable.apply(&ResourceState::ScheduledDeletion).is_none());
        assert!(KeyTransition::CancelDeletion.apply(&ResourceState::Enabled).is_none());
        assert!(KeyTransition::Disable.apply(&ResourceState::Active).is_none());
    }

    #[test]
    fn test_check_reported() {
        assert!(KeyTransition::CancelDeletion.check_reported(&ResourceState::Disabled).is_ok());
        assert!(KeyTransition::Enable.check_reported(&ResourceState::Unknown("NEW".into())).is_ok());
        assert!(matches!(
            KeyTransition::Enable.check_reported(&ResourceState::ScheduledDeletion),
            Err(Error::Protocol(_))
        ));
    }
}
