//! HS256 JSON Web Tokens.
//!
//! `base64url(header) . base64url(claims) . base64url(HMAC-SHA256)`, no
//! padding. Only `HS256` is accepted on verification.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{EngineError, ResultEngine};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
pub const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by every credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub role: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Issue time, seconds since the Unix epoch.
    pub iat: i64,
}

#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: TimeDelta,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

fn unauthorized(reason: &str) -> EngineError {
    EngineError::Unauthorized(reason.to_string())
}

impl TokenSigner {
    pub fn new(secret: &str, ttl: TimeDelta) -> ResultEngine<Self> {
        if secret.is_empty() {
            return Err(EngineError::Internal(
                "token secret must not be empty".to_string(),
            ));
        }
        if ttl <= TimeDelta::zero() {
            return Err(EngineError::Internal(
                "token validity must be positive".to_string(),
            ));
        }
        Ok(Self {
            secret: secret.as_bytes().to_vec(),
            ttl,
        })
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Issue a credential for a user, valid for the configured window.
    pub fn issue(&self, user_id: &str, email: &str, now: DateTime<Utc>) -> ResultEngine<String> {
        let claims = Claims {
            id: user_id.to_string(),
            email: email.to_string(),
            role: DEFAULT_ROLE.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> ResultEngine<String> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let header = serde_json::to_vec(&header)
            .map_err(|err| EngineError::Internal(format!("cannot encode token header: {err}")))?;
        let claims = serde_json::to_vec(claims)
            .map_err(|err| EngineError::Internal(format!("cannot encode token claims: {err}")))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        );
        let signature = self.mac(&signing_input)?.finalize().into_bytes();
        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Check structure, algorithm, signature and expiry, in that order.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> ResultEngine<Claims> {
        let mut parts = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(unauthorized("malformed token"));
        };

        let header: Header = decode_segment(header)?;
        if header.alg != ALGORITHM {
            return Err(unauthorized("unsupported token algorithm"));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| unauthorized("malformed token signature"))?;
        self.mac(&token[..token.len() - signature_len(token)])?
            .verify_slice(&signature)
            .map_err(|_| unauthorized("invalid token signature"))?;

        let claims: Claims = decode_segment(claims)?;
        if claims.exp <= now.timestamp() {
            return Err(unauthorized("token expired"));
        }
        Ok(claims)
    }

    fn mac(&self, signing_input: &str) -> ResultEngine<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|err| EngineError::Internal(format!("invalid token secret: {err}")))?;
        mac.update(signing_input.as_bytes());
        Ok(mac)
    }
}

/// Length of the `.signature` suffix of a three-part token.
fn signature_len(token: &str) -> usize {
    token.rfind('.').map_or(0, |dot| token.len() - dot)
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> ResultEngine<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| unauthorized("malformed token"))?;
    serde_json::from_slice(&bytes).map_err(|_| unauthorized("malformed token"))
}
