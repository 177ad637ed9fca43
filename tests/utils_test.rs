use std::time::Duration;

use namethatsong::config::Config;
use namethatsong::spotify::auth::authorize_url;
use namethatsong::utils::*;

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    let verifier = "test_verifier_123";
    let challenge = generate_code_challenge(verifier);

    assert!(!challenge.is_empty());

    // Deterministic
    let challenge2 = generate_code_challenge(verifier);
    assert_eq!(challenge, challenge2);

    let challenge3 = generate_code_challenge("different_verifier");
    assert_ne!(challenge, challenge3);

    // Should be base64-encoded (URL-safe, no padding)
    assert!(
        challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
    // SHA-256 digest is 32 bytes, 43 chars without padding
    assert_eq!(challenge.len(), 43);
}

#[test]
fn test_generate_state() {
    let state = generate_state();

    assert_eq!(state.len(), 32);
    assert!(state.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_ne!(state, generate_state());
}

#[test]
fn test_duration_to_string() {
    assert_eq!(duration_to_string(Duration::ZERO), "0:00");
    assert_eq!(duration_to_string(Duration::from_secs(59)), "0:59");
    assert_eq!(duration_to_string(Duration::from_millis(61_999)), "1:01");
    assert_eq!(duration_to_string(Duration::from_secs(605)), "10:05");
}

#[test]
fn test_parse_pick() {
    assert_eq!(
        parse_pick("artist1:album1"),
        Ok(("artist1".to_string(), "album1".to_string()))
    );

    // the synthetic top tracks album keeps its own colon
    assert_eq!(
        parse_pick("artist1:top-tracks:artist1"),
        Ok(("artist1".to_string(), "top-tracks:artist1".to_string()))
    );

    assert!(parse_pick("artist1").is_err());
    assert!(parse_pick(":album1").is_err());
    assert!(parse_pick("artist1:").is_err());
}

#[test]
fn test_authorize_url() {
    let config = Config::new("client-123", "http://127.0.0.1:8080/callback");
    let url = authorize_url(&config, "abc123", "challenge-xyz").unwrap();

    assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
    assert!(url.contains("client_id=client-123"));
    assert!(url.contains("response_type=code"));
    assert!(url.contains("state=abc123"));
    assert!(url.contains("code_challenge=challenge-xyz"));
    assert!(url.contains("code_challenge_method=S256"));
    assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8080%2Fcallback"));
    // spaces of the scope list are form encoded
    assert!(url.contains("scope=user-read-private+user-read-email"));
}
