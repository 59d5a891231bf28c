//! JWT token generation and verification.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{debug, info, warn};

use super::{AuthError, TokenError};
use crate::models::auth::{IssuedToken, TokenClaims, UserId};

/// Default access token lifetime: 60 minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

/// Issues and verifies HS256 bearer tokens.
///
/// Stateless: validity is decided by the signature and the `exp` claim alone,
/// against a caller-supplied clock.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Token lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Sign a token for `user_id`, expiring `ttl` after `now`.
    pub fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenIssuance(format!("jwt encode: {e}")))?;
        Ok(IssuedToken {
            access_token,
            expires_in: self.ttl_secs(),
        })
    }

    /// Verify `token` and return the user id it is bound to.
    ///
    /// The signature is checked before expiry, so a forged token is always
    /// `Invalid` regardless of its claimed `exp`.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::Absent);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<TokenClaims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "rejected bearer token");
            TokenError::Invalid
        })?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenError::Invalid)
    }
}

/// Environment variables consulted for the signing secret, in order.
const SECRET_ENV_VARS: [&str; 2] = ["JWT_SECRET", "AUTH_SECRET"];

/// Resolve the HMAC secret that signs access tokens.
///
/// The first non-empty variable in [`SECRET_ENV_VARS`] wins. Otherwise the
/// secret persisted under the user data dir is reused, and when that is
/// missing too a random 64-character secret is generated and written there
/// so issued tokens stay valid across restarts.
pub fn resolve_jwt_secret() -> String {
    if let Some(secret) = secret_from_env(|name| std::env::var(name).ok()) {
        return secret;
    }

    let secret_path = jwt_secret_path();
    if let Some(secret) = std::fs::read_to_string(&secret_path)
        .ok()
        .map(|contents| contents.trim().to_string())
        .filter(|secret| !secret.is_empty())
    {
        debug!(path = %secret_path.display(), "using persisted JWT secret");
        return secret;
    }

    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    persist_secret(&secret_path, &secret);
    secret
}

fn secret_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    SECRET_ENV_VARS
        .into_iter()
        .filter_map(lookup)
        .find(|secret| !secret.is_empty())
}

fn persist_secret(path: &Path, secret: &str) {
    if let Some(parent) = path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        warn!(path = %parent.display(), error = %e, "could not create secret directory");
    }
    match std::fs::write(path, secret) {
        Ok(()) => info!(path = %path.display(), "generated new JWT secret"),
        Err(e) => warn!(
            path = %path.display(),
            error = %e,
            "generated JWT secret could not be persisted; tokens will not survive a restart"
        ),
    }
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hackr")
        .join("jwt-secret")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", Duration::minutes(60))
    }

    #[test]
    fn validate_after_issue_returns_same_user() {
        let svc = service();
        let now = Utc::now();
        let token = svc.issue(42, now).unwrap();
        assert_eq!(token.expires_in, 3600);
        assert_eq!(svc.validate(&token.access_token, now), Ok(42));
    }

    #[test]
    fn valid_until_just_before_expiry() {
        let svc = service();
        let now = Utc::now();
        let token = svc.issue(7, now).unwrap();
        let almost = now + Duration::minutes(60) - Duration::seconds(1);
        assert_eq!(svc.validate(&token.access_token, almost), Ok(7));
    }

    #[test]
    fn expired_token_is_expired() {
        let svc = service();
        let now = Utc::now();
        let token = svc.issue(7, now).unwrap();
        let later = now + Duration::minutes(60);
        assert_eq!(
            svc.validate(&token.access_token, later),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn corrupted_token_is_invalid() {
        let svc = service();
        let now = Utc::now();
        let token = svc.issue(7, now).unwrap();
        let mut corrupted = token.access_token.clone();
        corrupted.truncate(corrupted.len() - 4);
        corrupted.push_str("AAAA");
        assert_eq!(svc.validate(&corrupted, now), Err(TokenError::Invalid));
        assert_eq!(svc.validate("not.a.jwt", now), Err(TokenError::Invalid));
        assert_eq!(svc.validate("garbage", now), Err(TokenError::Invalid));
    }

    #[test]
    fn foreign_signature_is_invalid_even_when_expired() {
        let other = TokenService::new(b"other-secret", Duration::minutes(60));
        let now = Utc::now();
        let token = other.issue(7, now).unwrap();
        let later = now + Duration::hours(5);
        assert_eq!(
            service().validate(&token.access_token, later),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn empty_token_is_absent() {
        assert_eq!(service().validate("", Utc::now()), Err(TokenError::Absent));
    }

    #[test]
    fn non_numeric_subject_is_invalid() {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: "ann".into(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(service().validate(&token, now), Err(TokenError::Invalid));
    }

    fn fake_env(
        pairs: &'static [(&'static str, &'static str)],
    ) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn secret_lookup_prefers_jwt_secret_and_skips_empty_values() {
        assert_eq!(
            secret_from_env(fake_env(&[("JWT_SECRET", "a"), ("AUTH_SECRET", "b")])),
            Some("a".into())
        );
        assert_eq!(
            secret_from_env(fake_env(&[("JWT_SECRET", ""), ("AUTH_SECRET", "b")])),
            Some("b".into())
        );
        assert_eq!(secret_from_env(fake_env(&[("JWT_SECRET", "")])), None);
        assert_eq!(secret_from_env(fake_env(&[])), None);
    }
}
