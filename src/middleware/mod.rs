// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (access gate, security headers).

pub mod gate;
pub mod security;

pub use gate::{require_session, CurrentUser, LOGIN_PATH};
