use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::settings::AuthConfig;
use crate::errors::{Error, Result};

/// Distinguishes short-lived access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Presented on every request
    Access,
    /// Exchanged for a new access token
    Refresh,
}

/// JWT claims. Roles are not carried here; they are derived from the
/// database on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub username: String,
    pub kind: TokenKind,
    pub iat: i64, // Issued at
    pub exp: i64, // Expiration
}

impl Claims {
    /// The numeric user id in `sub`.
    pub fn user_id(&self) -> Result<i64> {
        self.sub.parse().map_err(|_| Error::Unauthorized {
            message: "Invalid subject in token".to_string(),
        })
    }
}

/// Access + refresh token pair returned on login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &str, config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_token_minutes),
            refresh_ttl: Duration::days(config.refresh_token_days),
        }
    }

    fn create_token(&self, user_id: i64, username: &str, kind: TokenKind) -> Result<String> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| Error::Credential {
            message: e.to_string(),
        })
    }

    pub fn issue_pair(&self, user_id: i64, username: &str) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.create_token(user_id, username, TokenKind::Access)?,
            refresh: self.create_token(user_id, username, TokenKind::Refresh)?,
        })
    }

    /// Verifies signature and expiry and that the token is of the expected kind.
    pub fn verify_token(&self, token: &str, expected: TokenKind) -> Result<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| Error::Unauthorized {
                message: format!("Invalid token: {e}"),
            })?;

        if claims.kind != expected {
            return Err(Error::Unauthorized {
                message: "Wrong token type".to_string(),
            });
        }

        Ok(claims)
    }

    /// Exchanges a refresh token for a fresh access token.
    pub fn refresh_access(&self, refresh_token: &str) -> Result<String> {
        let claims = self.verify_token(refresh_token, TokenKind::Refresh)?;
        self.create_token(claims.user_id()?, &claims.username, TokenKind::Access)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn service(secret: &str) -> JwtService {
        JwtService::new(secret, &AuthConfig::default())
    }

    #[test]
    fn test_issue_and_verify() {
        let jwt = service("test_secret_key");
        let pair = jwt.issue_pair(7, "alice").unwrap();

        let claims = jwt.verify_token(&pair.access, TokenKind::Access).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.username, "alice");

        let refresh = jwt.verify_token(&pair.refresh, TokenKind::Refresh).unwrap();
        assert_eq!(refresh.kind, TokenKind::Refresh);
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let jwt = service("test_secret_key");
        let pair = jwt.issue_pair(7, "alice").unwrap();

        assert!(jwt.verify_token(&pair.refresh, TokenKind::Access).is_err());
        assert!(jwt.refresh_access(&pair.access).is_err());

        let access = jwt.refresh_access(&pair.refresh).unwrap();
        assert!(jwt.verify_token(&access, TokenKind::Access).is_ok());
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = service("secret1");
        let verifier = service("secret2");
        let pair = issuer.issue_pair(1, "bob").unwrap();

        let result = verifier.verify_token(&pair.access, TokenKind::Access);
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
    }

    #[test]
    fn test_invalid_token() {
        let jwt = service("test_secret_key");
        assert!(jwt.verify_token("not-a-token", TokenKind::Access).is_err());
    }
}
