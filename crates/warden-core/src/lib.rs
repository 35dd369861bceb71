//! # warden-core
//!
//! Cross-cutting support utilities for the Warden bot: error types, bot
//! token handling, log sanitization, string helpers, and the metrics facade.

pub mod error;
pub mod metrics;
pub mod sanitize;
pub mod text;
pub mod token;
