// Error kinds shared by every dugout component.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DugoutError>;

#[derive(Debug, Error)]
pub enum DugoutError {
    /// The player store could not be reached, was not configured, or failed
    /// mid-query. Surfaced to callers as a service-unavailable condition.
    #[error("backing store unavailable: {reason}")]
    BackingStoreUnavailable { reason: String },

    /// An offline data provider (roster feed, stats file, id register)
    /// could not be read.
    #[error("data provider unavailable: {reason}")]
    ProviderUnavailable { reason: String },

    #[error("player with id {id} not found")]
    PlayerNotFound { id: i64 },

    #[error("{kind} {id} not found")]
    EntityNotFound { kind: &'static str, id: String },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A record had missing or unparseable fields. Season decoders log this
    /// and fall back to defaults instead of returning it.
    #[error("malformed record {context}: {reason}")]
    MalformedRecord { context: String, reason: String },

    /// A result could not be encoded as JSON for the caller.
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        source: serde_json::Error,
    },
}

impl DugoutError {
    pub fn store_unavailable(err: impl std::fmt::Display) -> Self {
        DugoutError::BackingStoreUnavailable {
            reason: err.to_string(),
        }
    }

    pub fn provider_unavailable(err: impl std::fmt::Display) -> Self {
        DugoutError::ProviderUnavailable {
            reason: err.to_string(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        DugoutError::InvalidInput {
            message: message.into(),
        }
    }

    /// Whether the boundary should report this as a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DugoutError::PlayerNotFound { .. } | DugoutError::EntityNotFound { .. }
        )
    }

    /// Whether the boundary should report this as service-unavailable.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DugoutError::BackingStoreUnavailable { .. } | DugoutError::ProviderUnavailable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_kinds_are_classified() {
        assert!(DugoutError::PlayerNotFound { id: 1 }.is_not_found());
        assert!(DugoutError::EntityNotFound {
            kind: "saved player",
            id: "7".into()
        }
        .is_not_found());
        assert!(!DugoutError::store_unavailable("down").is_not_found());
    }

    #[test]
    fn unavailable_kinds_are_classified() {
        assert!(DugoutError::store_unavailable("connection refused").is_unavailable());
        assert!(DugoutError::provider_unavailable("timeout").is_unavailable());
        assert!(!DugoutError::invalid_input("missing id").is_unavailable());
    }

    #[test]
    fn display_includes_reason() {
        let err = DugoutError::store_unavailable("disk I/O error");
        assert_eq!(err.to_string(), "backing store unavailable: disk I/O error");

        let err = DugoutError::PlayerNotFound { id: 660271 };
        assert_eq!(err.to_string(), "player with id 660271 not found");
    }
}
