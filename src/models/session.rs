// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session snapshot and the access-gate states derived from it.

use super::Identity;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Immutable view of the current authentication state.
///
/// Fields are private so that `is_authenticated` can only ever be derived
/// from the identity, and `is_initializing` can only be true for the
/// snapshot built by [`Session::initializing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: Option<Identity>,
    is_initializing: bool,
}

impl Session {
    /// Snapshot published before the first identity check resolves.
    pub fn initializing() -> Self {
        Self {
            identity: None,
            is_initializing: true,
        }
    }

    /// Snapshot after the first identity check (or any later change).
    pub fn resolved(identity: Option<Identity>) -> Self {
        Self {
            identity,
            is_initializing: false,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn is_initializing(&self) -> bool {
        self.is_initializing
    }

    /// Access-gate state for this snapshot.
    pub fn gate_state(&self) -> GateState {
        GateState::from_session(self)
    }
}

/// Access Gate states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Initializing,
    Unauthenticated,
    Authenticated,
}

impl GateState {
    pub fn from_session(session: &Session) -> Self {
        if session.is_initializing() {
            GateState::Initializing
        } else if session.is_authenticated() {
            GateState::Authenticated
        } else {
            GateState::Unauthenticated
        }
    }
}

/// Wire form of a [`Session`].
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub identity: Option<Identity>,
    pub is_authenticated: bool,
    pub is_initializing: bool,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            identity: session.identity.clone(),
            is_authenticated: session.is_authenticated(),
            is_initializing: session.is_initializing(),
        }
    }
}
