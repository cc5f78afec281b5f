use chrono::{Duration, Utc};
use knowledge_hub::token::{Identity, TOKEN_TTL_DAYS, TokenError, TokenService};
use uuid::Uuid;

const SECRET: &str = "token-test-secret";

fn alice() -> Identity {
    Identity {
        id: Uuid::new_v4(),
        email: "alice@example.com".to_string(),
        name: "Alice".to_string(),
        photo: Some("https://img.example.com/alice.png".to_string()),
    }
}

/// Replaces one character in the middle of the signature segment.
fn tamper(token: &str) -> String {
    let (head, signature) = token.rsplit_once('.').expect("token has three segments");
    let mut chars: Vec<char> = signature.chars().collect();
    let mid = chars.len() / 2;
    chars[mid] = if chars[mid] == 'A' { 'B' } else { 'A' };
    format!("{}.{}", head, chars.into_iter().collect::<String>())
}

#[test]
fn test_issue_then_verify_returns_identity() {
    let service = TokenService::new(SECRET);
    let identity = alice();

    let token = service.issue(&identity).expect("signing should succeed");
    let claims = service.verify(&token).expect("fresh token should verify");

    assert_eq!(claims.identity(), identity);
    assert_eq!(claims.exp - claims.iat, Duration::days(TOKEN_TTL_DAYS).num_seconds());
}

#[test]
fn test_token_without_photo_omits_claim() {
    let service = TokenService::new(SECRET);
    let identity = Identity {
        photo: None,
        ..alice()
    };

    let token = service.issue(&identity).unwrap();
    let claims = service.verify(&token).unwrap();

    assert_eq!(claims.photo, None);
    assert_eq!(claims.identity(), identity);
}

#[test]
fn test_token_issued_six_days_ago_is_still_valid() {
    let service = TokenService::new(SECRET);
    let token = service
        .issue_at(&alice(), Utc::now() - Duration::days(6))
        .unwrap();

    assert!(service.verify(&token).is_ok());
}

#[test]
fn test_token_issued_eight_days_ago_is_expired() {
    let service = TokenService::new(SECRET);
    let token = service
        .issue_at(&alice(), Utc::now() - Duration::days(8))
        .unwrap();

    assert!(matches!(
        service.verify(&token),
        Err(TokenError::InvalidToken(_))
    ));
}

#[test]
fn test_tampered_signature_is_rejected() {
    let service = TokenService::new(SECRET);
    let token = service.issue(&alice()).unwrap();

    assert!(service.verify(&tamper(&token)).is_err());
}

#[test]
fn test_rewritten_email_claim_is_rejected() {
    let service = TokenService::new(SECRET);
    let genuine = service.issue(&alice()).unwrap();
    let victim = Identity {
        email: "victim@example.com".to_string(),
        ..alice()
    };
    let other = service.issue(&victim).unwrap();

    // Victim's payload, but the signature that was issued for alice.
    let mut genuine_parts = genuine.split('.');
    let header = genuine_parts.next().unwrap();
    let signature = genuine_parts.nth(1).unwrap();
    let victim_payload = other.split('.').nth(1).unwrap();
    let forged = format!("{}.{}.{}", header, victim_payload, signature);

    assert_ne!(forged, genuine);
    assert!(matches!(
        service.verify(&forged),
        Err(TokenError::InvalidToken(_))
    ));
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let issuer = TokenService::new("some-other-secret");
    let verifier = TokenService::new(SECRET);
    let token = issuer.issue(&alice()).unwrap();

    assert!(verifier.verify(&token).is_err());
}

#[test]
fn test_garbage_is_rejected() {
    let service = TokenService::new(SECRET);

    assert!(service.verify("not-a-token").is_err());
    assert!(service.verify("").is_err());
}
