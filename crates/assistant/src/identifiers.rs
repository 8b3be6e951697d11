//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`RepositoryOwner`] with a [`BranchName`] even though both are `String`
//! under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: GitHub-integer-backed
// ---------------------------------------------------------------------------

/// Identifies a pull request within its repository.
///
/// Wraps the pull request number assigned by GitHub (positive integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Creates a new identifier from a raw integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PullRequestNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies one conversation session (one [`crate::ConversationState`]).
///
/// Generated fresh when a conversation starts; recorded on tracing spans so
/// all activity from a single session can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a new random session identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// A GitHub user or organisation login (e.g. `"acme"`).
    ///
    /// Case is preserved; the platform, not this crate, decides whether it exists.
    RepositoryOwner
}

string_id! {
    /// A repository name within its owner (e.g. `"widgets"`).
    RepositoryName
}

string_id! {
    /// A Git branch name (e.g. `"main"`, `"feature/login"`).
    BranchName
}

impl BranchName {
    /// Returns [`crate::DEFAULT_BASE_BRANCH`] as a branch name.
    pub fn default_base() -> Self {
        Self(crate::DEFAULT_BASE_BRANCH.to_string())
    }
}

string_id! {
    /// The provider-assigned identifier of one tool call request.
    ///
    /// Tool result turns carry the id of the request they answer.
    ToolCallId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_ids_reject_empty_values() {
        assert!(RepositoryOwner::new("").is_none());
        assert!(BranchName::new(String::new()).is_none());
        assert!(ToolCallId::new("call_1").is_some());
    }

    #[test]
    fn string_ids_preserve_case() {
        let owner = RepositoryOwner::new("Acme-Corp").unwrap();
        assert_eq!(owner.as_str(), "Acme-Corp");
        assert_eq!(owner.to_string(), "Acme-Corp");
    }

    #[test]
    fn pull_request_number_displays_with_hash() {
        assert_eq!(PullRequestNumber::new(7).to_string(), "#7");
        assert_eq!(PullRequestNumber::new(7).as_u64(), 7);
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new_random(), SessionId::new_random());
    }
}
