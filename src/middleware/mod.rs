// SPDX-License-Identifier: MIT

//! Middleware for authentication and response hardening.

pub mod auth;
pub mod security;
