// SPDX-License-Identifier: MIT

//! Services module - external collaborators.

pub mod model;

pub use model::{GeminiClient, GenerativeModel, ModelError};
