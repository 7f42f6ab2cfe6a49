//! JWT token issuance and validation
//!
//! Access and refresh tokens live in two signing domains. A domain is a
//! secret plus a lifetime; the domain a token belongs to is decided only by
//! which secret verifies it, so the two kinds can never be swapped.
//!
//! Tokens are HS256 compact JWS strings. Validation accepts that algorithm
//! and nothing else.

use crate::auth::error::AuthError;
use crate::core::config::{JwtConfig, MAX_TOKEN_LIFETIME_MINUTES};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The single MAC algorithm tokens are signed and verified with
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Which signing domain a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Expiration as unix seconds
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Access + refresh tokens minted together for one subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Secret and lifetime of one token kind
pub struct SigningDomain {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl SigningDomain {
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

impl fmt::Debug for SigningDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningDomain")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

/// Issues and validates tokens for both signing domains.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug)]
pub struct TokenService {
    access: SigningDomain,
    refresh: SigningDomain,
    validation: Validation,
    rotate_refresh_tokens: bool,
}

impl TokenService {
    pub fn new(access: SigningDomain, refresh: SigningDomain) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // Expiry is checked against an explicit instant in `validate_at`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            access,
            refresh,
            validation,
            rotate_refresh_tokens: false,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(
            SigningDomain::new(
                config.access_secret.as_bytes(),
                minutes(config.access_expiration_minutes),
            ),
            SigningDomain::new(
                config.refresh_secret.as_bytes(),
                minutes(config.refresh_expiration_minutes),
            ),
        )
        .with_refresh_rotation(config.rotate_refresh_tokens)
    }

    /// When set, the refresh flow hands out a new refresh token as well
    pub fn with_refresh_rotation(mut self, rotate: bool) -> Self {
        self.rotate_refresh_tokens = rotate;
        self
    }

    pub fn rotates_refresh_tokens(&self) -> bool {
        self.rotate_refresh_tokens
    }

    pub fn domain(&self, kind: TokenKind) -> &SigningDomain {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Sign a fresh token for `user_id` in the given domain
    pub fn issue(&self, user_id: &str, kind: TokenKind) -> Result<String, AuthError> {
        self.issue_at(user_id, kind, Utc::now())
    }

    /// Sign a token as if issued at `now`.
    ///
    /// The issuance instant is truncated to whole seconds, so the token
    /// expires exactly `lifetime` after `now.timestamp()`.
    pub fn issue_at(
        &self,
        user_id: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let domain = self.domain(kind);
        let exp = now
            .timestamp()
            .checked_add(domain.lifetime.num_seconds())
            .ok_or_else(|| AuthError::IssuanceFailure("expiration overflow".to_string()))?;

        let claims = Claims {
            user_id: user_id.to_string(),
            exp,
        };

        encode(&Header::new(TOKEN_ALGORITHM), &claims, &domain.encoding).map_err(|e| {
            AuthError::IssuanceFailure(format!("failed to sign {} token: {}", kind.as_str(), e))
        })
    }

    /// Issue an access token and a refresh token for the same subject
    pub fn issue_pair(&self, user_id: &str) -> Result<TokenPair, AuthError> {
        self.issue_pair_at(user_id, Utc::now())
    }

    pub fn issue_pair_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue_at(user_id, TokenKind::Access, now)?,
            refresh_token: self.issue_at(user_id, TokenKind::Refresh, now)?,
        })
    }

    /// Validate a token against the given domain at the current time
    pub fn validate(&self, token: &str, kind: TokenKind) -> Result<Claims, AuthError> {
        self.validate_at(token, kind, Utc::now())
    }

    /// Validate a token against the given domain as of `now`.
    ///
    /// Valid iff signed by this domain's secret with [`TOKEN_ALGORITHM`],
    /// well formed, and `now` is strictly before the expiration instant.
    pub fn validate_at(
        &self,
        token: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.domain(kind).decoding, &self.validation)
            .map_err(|e| classify(e.kind()))?;

        if now.timestamp() >= data.claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(data.claims)
    }
}

/// Lifetime from validated config; clamps to the cap `JwtConfig::validate` enforces
fn minutes(value: u64) -> Duration {
    Duration::minutes(value.min(MAX_TOKEN_LIFETIME_MINUTES) as i64)
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat => AuthError::TokenSignatureInvalid,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenMalformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::TimeZone;

    const ACCESS_SECRET: &[u8] = b"access-secret-that-is-at-least-32-chars";
    const REFRESH_SECRET: &[u8] = b"refresh-secret-that-is-at-least-32-chars";

    fn service() -> TokenService {
        TokenService::new(
            SigningDomain::new(ACCESS_SECRET, Duration::minutes(15)),
            SigningDomain::new(REFRESH_SECRET, Duration::days(7)),
        )
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_round_trip_both_domains() {
        let service = service();
        let now = issued_at();

        for kind in [TokenKind::Access, TokenKind::Refresh] {
            let token = service.issue_at("user-123", kind, now).expect("should issue");
            let claims = service
                .validate_at(&token, kind, now + Duration::seconds(1))
                .expect("should validate");

            assert_eq!(claims.user_id, "user-123");
            assert_eq!(
                claims.expires_at(),
                Some(now + service.domain(kind).lifetime())
            );
        }
    }

    #[test]
    fn test_cross_domain_rejected() {
        let service = service();
        let now = issued_at();

        let access = service.issue_at("user-1", TokenKind::Access, now).unwrap();
        let refresh = service.issue_at("user-1", TokenKind::Refresh, now).unwrap();

        assert_eq!(
            service.validate_at(&access, TokenKind::Refresh, now),
            Err(AuthError::TokenSignatureInvalid)
        );
        assert_eq!(
            service.validate_at(&refresh, TokenKind::Access, now),
            Err(AuthError::TokenSignatureInvalid)
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let service = service();
        let now = issued_at();
        let lifetime = service.domain(TokenKind::Access).lifetime();
        let token = service.issue_at("user-1", TokenKind::Access, now).unwrap();

        let just_before = now + lifetime - Duration::milliseconds(1);
        let at_expiry = now + lifetime;
        let just_after = now + lifetime + Duration::milliseconds(1);

        assert!(service.validate_at(&token, TokenKind::Access, just_before).is_ok());
        assert_eq!(
            service.validate_at(&token, TokenKind::Access, at_expiry),
            Err(AuthError::TokenExpired)
        );
        assert_eq!(
            service.validate_at(&token, TokenKind::Access, just_after),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn test_expired_but_forged_reports_signature() {
        let service = service();
        let other = TokenService::new(
            SigningDomain::new(b"someone-elses-secret", Duration::minutes(15)),
            SigningDomain::new(REFRESH_SECRET, Duration::days(7)),
        );
        let now = issued_at();
        let forged = other.issue_at("user-1", TokenKind::Access, now).unwrap();

        assert_eq!(
            service.validate_at(&forged, TokenKind::Access, now + Duration::days(30)),
            Err(AuthError::TokenSignatureInvalid)
        );
    }

    #[test]
    fn test_pair_tokens_differ_and_are_deterministic() {
        let service = service();
        let now = issued_at();

        let first = service.issue_pair_at("user-9", now).unwrap();
        let second = service.issue_pair_at("user-9", now).unwrap();

        assert_ne!(first.access_token, first.refresh_token);
        assert_eq!(first, second);
    }

    #[test]
    fn test_wall_clock_issue_and_validate() {
        let service = service();
        let pair = service.issue_pair("user-7").unwrap();

        assert_eq!(
            service.validate(&pair.access_token, TokenKind::Access).unwrap().user_id,
            "user-7"
        );
        assert_eq!(
            service.validate(&pair.refresh_token, TokenKind::Refresh).unwrap().user_id,
            "user-7"
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let service = service();
        let now = issued_at();

        for token in ["", "abc", "a.b", "not.a.token", "...", "a.b.c.d"] {
            let result = service.validate_at(token, TokenKind::Access, now);
            assert!(
                matches!(
                    result,
                    Err(AuthError::TokenMalformed) | Err(AuthError::TokenSignatureInvalid)
                ),
                "{:?} gave {:?}",
                token,
                result
            );
        }
    }

    #[test]
    fn test_truncated_token_rejected() {
        let service = service();
        let now = issued_at();
        let token = service.issue_at("user-1", TokenKind::Access, now).unwrap();

        let truncated = &token[..token.len() - 1];
        assert!(service.validate_at(truncated, TokenKind::Access, now).is_err());
    }

    #[test]
    fn test_alg_none_rejected() {
        let service = service();
        let now = issued_at();

        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            format!(r#"{{"userId":"user-1","exp":{}}}"#, now.timestamp() + 600).as_bytes(),
        );
        let unsigned = format!("{}.{}.", header, payload);

        assert!(service.validate_at(&unsigned, TokenKind::Access, now).is_err());
    }

    #[test]
    fn test_other_hmac_algorithm_rejected() {
        let service = service();
        let now = issued_at();
        let claims = Claims {
            user_id: "user-1".to_string(),
            exp: now.timestamp() + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(ACCESS_SECRET),
        )
        .unwrap();

        assert_eq!(
            service.validate_at(&token, TokenKind::Access, now),
            Err(AuthError::TokenSignatureInvalid)
        );
    }

    #[test]
    fn test_missing_exp_rejected() {
        let service = service();
        let now = issued_at();

        #[derive(Serialize)]
        struct NoExp<'a> {
            #[serde(rename = "userId")]
            user_id: &'a str,
        }

        let token = encode(
            &Header::new(TOKEN_ALGORITHM),
            &NoExp { user_id: "user-1" },
            &EncodingKey::from_secret(ACCESS_SECRET),
        )
        .unwrap();

        assert_eq!(
            service.validate_at(&token, TokenKind::Access, now),
            Err(AuthError::TokenMalformed)
        );
    }

    #[test]
    fn test_from_config_uses_lifetimes_and_rotation() {
        let config = JwtConfig {
            access_secret: "a".repeat(32),
            access_expiration_minutes: 30,
            refresh_secret: "r".repeat(32),
            refresh_expiration_minutes: 90,
            rotate_refresh_tokens: true,
        };
        let service = TokenService::from_config(&config);

        assert_eq!(service.domain(TokenKind::Access).lifetime(), Duration::minutes(30));
        assert_eq!(service.domain(TokenKind::Refresh).lifetime(), Duration::minutes(90));
        assert!(service.rotates_refresh_tokens());
    }

    #[test]
    fn test_debug_hides_keys() {
        let rendered = format!("{:?}", service());
        assert!(!rendered.contains("access-secret"));
    }
}
