//! Bot token handling — format validation, fingerprinting, redaction.
//!
//! Telegram bot tokens have the shape `{BOT_ID}:{SECRET}`. Nothing here
//! talks to the network; online validation belongs to the bot lifecycle.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::CoreError;

/// Extract the numeric bot ID from a `{BOT_ID}:{SECRET}` token.
pub fn extract_bot_id(token: &str) -> Result<i64, CoreError> {
    if token.is_empty() {
        return Err(CoreError::InvalidToken("token cannot be empty".into()));
    }

    let (id_part, _secret) = token.split_once(':').ok_or_else(|| {
        CoreError::InvalidToken(format!("expected 'BOT_ID:SECRET', got {token:?}"))
    })?;

    if id_part.is_empty() {
        return Err(CoreError::InvalidToken("bot ID cannot be empty".into()));
    }

    let bot_id: i64 = id_part.parse().map_err(|_| {
        CoreError::InvalidToken(format!("invalid bot ID {id_part:?}: must be an integer"))
    })?;

    if bot_id <= 0 {
        return Err(CoreError::InvalidToken(format!(
            "invalid bot ID {bot_id}: must be positive"
        )));
    }

    debug!("extracted bot ID {bot_id} from token");
    Ok(bot_id)
}

/// Whether the token has the `{BOT_ID}:{SECRET}` shape, without any API call.
pub fn is_valid_format(token: &str) -> bool {
    extract_bot_id(token).is_ok()
}

/// SHA-256 fingerprint of the token, hex encoded.
///
/// Lets callers compare stored tokens without keeping the plain text around.
pub fn fingerprint(token: &str) -> String {
    if token.is_empty() {
        return String::new();
    }
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Redacted form safe for logs: `123456789:***`.
pub fn redact(token: &str) -> String {
    match token.split_once(':') {
        Some((id, _)) if !id.is_empty() => format!("{id}:***"),
        _ => "***".to_string(),
    }
}
