// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier newtypes.
//!
//! Agent, connection, and team identifiers are opaque strings chosen
//! outside the broker (by operators or by the connecting client). Sessions
//! and projects are catalog rows and use plain `i64` row ids.

/// Define a string-backed identifier newtype.
///
/// Generates `new()`, `as_str()`, `Display`, `From<&str>`, `From<String>`,
/// `PartialEq<str>`, `PartialEq<&str>`, and `Borrow<str>` so the type can
/// be used as a `HashMap` key looked up by `&str`.
macro_rules! string_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Logical AI-client identity, independent of any particular socket.
    ///
    /// Externally meaningful: operators hand these out and clients present
    /// them when connecting. The integer `id` column in the agents table is
    /// a surrogate key that never leaves the storage layer.
    pub struct AgentId;
}

string_id! {
    /// Identifier of one WebSocket connection, chosen by the client in the
    /// connect URL (`/ws/{connection_id}`).
    pub struct ConnectionId;
}

string_id! {
    /// Team identifier. Agents carry a set of these; team-level reads are
    /// scoped to authors whose team set intersects the requester's.
    pub struct TeamId;
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
