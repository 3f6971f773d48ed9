// SPDX-License-Identifier: MIT

//! Credential hashing and session tracking.

pub mod password;
pub mod session;

pub use session::SessionStore;
