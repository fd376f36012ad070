//! Session token generation and validation
//!
//! HS256-signed JWTs built directly on hmac + sha2. The session token
//! carries the account id as its only claim and expires after 23 hours;
//! revocation before expiry happens through the stored-token comparison
//! in the session extractor, not here.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Session token expiry in seconds (23 hours)
pub const SESSION_TOKEN_EXPIRY: u64 = 23 * 60 * 60;

/// JWT Header for HS256
#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

impl Default for JwtHeader {
    fn default() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (account ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration (Unix timestamp)
    pub exp: u64,
}

/// Encode claims to JWT using HS256
fn encode_jwt(claims: &SessionClaims, secret: &str) -> Result<String, String> {
    let header = JwtHeader::default();
    let header_json = serde_json::to_string(&header).map_err(|e| e.to_string())?;
    let header_b64 = URL_SAFE_NO_PAD.encode(header_json.as_bytes());

    let payload_json = serde_json::to_string(claims).map_err(|e| e.to_string())?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());

    let signing_input = format!("{}.{}", header_b64, payload_b64);

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| format!("HMAC error: {}", e))?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = URL_SAFE_NO_PAD.encode(signature);

    Ok(format!("{}.{}", signing_input, signature_b64))
}

/// Decode and validate JWT using HS256
fn decode_jwt(token: &str, secret: &str) -> Result<SessionClaims, String> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let payload_b64 = parts[1];
    let signature_b64 = parts[2];

    // Verify signature
    let signing_input = format!("{}.{}", header_b64, payload_b64);
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| format!("HMAC error: {}", e))?;
    mac.update(signing_input.as_bytes());

    let expected_signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| "Invalid signature encoding")?;

    mac.verify_slice(&expected_signature)
        .map_err(|_| "Invalid signature")?;

    // Verify header
    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|_| "Invalid header encoding")?;
    let header: JwtHeader =
        serde_json::from_slice(&header_bytes).map_err(|_| "Invalid header format")?;

    if header.alg != "HS256" {
        return Err("Unsupported algorithm".to_string());
    }

    // Decode payload
    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| "Invalid payload encoding")?;
    let claims: SessionClaims =
        serde_json::from_slice(&payload_bytes).map_err(|_| "Invalid payload format")?;

    Ok(claims)
}

/// Generate a session token for an account
pub fn generate_session_token(account_id: &str, secret: &str) -> Result<String, String> {
    let now = chrono::Utc::now().timestamp() as u64;

    let claims = SessionClaims {
        sub: account_id.to_string(),
        iat: now,
        exp: now + SESSION_TOKEN_EXPIRY,
    };

    encode_jwt(&claims, secret).map_err(|e| format!("Failed to generate session token: {}", e))
}

/// Validate a session token and extract its claims
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, String> {
    let claims = decode_jwt(token, secret).map_err(|e| format!("Invalid session token: {}", e))?;

    let now = chrono::Utc::now().timestamp() as u64;
    if claims.exp < now {
        return Err("Session token expired".to_string());
    }

    Ok(claims)
}

/// Extract Bearer token from Authorization header
pub fn extract_bearer_token(auth_header: Option<&str>) -> Option<String> {
    auth_header
        .filter(|h| h.starts_with("Bearer "))
        .map(|h| h[7..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_session_token_generation_and_validation() {
        let token = generate_session_token("account-123", TEST_SECRET).unwrap();

        let claims = validate_session_token(&token, TEST_SECRET).unwrap();

        assert_eq!(claims.sub, "account-123");
        assert_eq!(claims.exp, claims.iat + SESSION_TOKEN_EXPIRY);
    }

    #[test]
    fn test_invalid_token() {
        let result = validate_session_token("invalid-token", TEST_SECRET);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let token = generate_session_token("account-123", TEST_SECRET).unwrap();

        let result = validate_session_token(&token, "wrong-secret");
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = SessionClaims {
            sub: "account-123".to_string(),
            iat: now - SESSION_TOKEN_EXPIRY - 60,
            exp: now - 60,
        };
        let token = encode_jwt(&claims, TEST_SECRET).unwrap();

        let result = validate_session_token(&token, TEST_SECRET);
        assert!(result.unwrap_err().contains("expired"));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = generate_session_token("account-123", TEST_SECRET).unwrap();
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();

        let forged = SessionClaims {
            sub: "someone-else".to_string(),
            iat: 0,
            exp: u64::MAX,
        };
        parts[1] = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());

        let result = validate_session_token(&parts.join("."), TEST_SECRET);
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(
            extract_bearer_token(Some("Bearer abc123")),
            Some("abc123".to_string())
        );

        assert_eq!(extract_bearer_token(Some("abc123")), None);
        assert_eq!(extract_bearer_token(Some("Basic abc123")), None);
        assert_eq!(extract_bearer_token(None), None);
    }

    #[test]
    fn test_jwt_format() {
        let token = generate_session_token("account-123", TEST_SECRET).unwrap();

        // JWT should have 3 parts separated by dots
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        // Header should decode to valid JSON with HS256
        let header_bytes = URL_SAFE_NO_PAD.decode(parts[0]).unwrap();
        let header: JwtHeader = serde_json::from_slice(&header_bytes).unwrap();
        assert_eq!(header.alg, "HS256");
        assert_eq!(header.typ, "JWT");
    }
}
