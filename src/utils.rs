use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Random OAuth `state`: 16 random bytes as 32 lowercase hex characters.
pub fn generate_state() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Formats a duration as `m:ss`.
pub fn duration_to_string(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Parses an `<artist-id>:<album-id>` pick as given on the command line.
///
/// The album id may itself contain colons (`top-tracks:<artist-id>`), so
/// only the first colon separates the two.
pub fn parse_pick(value: &str) -> Result<(String, String), String> {
    match value.split_once(':') {
        Some((artist, album)) if !artist.is_empty() && !album.is_empty() => {
            Ok((artist.to_string(), album.to_string()))
        }
        _ => Err(format!(
            "invalid pick '{value}', expected <artist-id>:<album-id>"
        )),
    }
}
