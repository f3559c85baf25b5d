//! Credential codec: signed, time-limited identity tokens (HS256 JWT).
//!
//! Verification is a pure function of the token, the secret and the clock;
//! nothing is stored server-side. A token stays valid until it expires even
//! after the holder logs out.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use harvestgate_core::UserId;

use crate::claims::{TokenClaims, TokenError, validate_claims};
use crate::Role;

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("signing secret must not be empty")]
pub struct EmptySecret;

/// Server-held HMAC key, loaded once at startup.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, EmptySecret> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(EmptySecret);
        }
        Ok(Self(bytes))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningSecret(..)")
    }
}

/// A freshly issued token together with the claims it encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Issue and verify credential tokens.
///
/// The `*_at` methods take the clock explicitly so callers (and tests) can
/// pin time; the plain variants use the system clock.
pub trait TokenCodec: Send + Sync {
    fn issue_at(
        &self,
        subject: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError>;

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError>;

    fn issue(&self, subject: UserId, role: Role) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, role, Utc::now())
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }
}

/// HMAC-SHA256 JWT codec.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl Hs256TokenCodec {
    pub fn new(secret: SigningSecret) -> Self {
        Self::with_ttl(secret, Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
    }

    pub fn with_ttl(secret: SigningSecret, ttl: Duration) -> Self {
        // Expiry is checked against the caller's clock in `validate_claims`,
        // so the library's own wall-clock check stays off.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl core::fmt::Debug for Hs256TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec for Hs256TokenCodec {
    fn issue_at(
        &self,
        subject: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        // The wire format carries whole seconds; truncate so the returned
        // claims equal what `verify` will decode.
        let issued_at = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Encoding(format!("expiry out of range for ttl {}", self.ttl)))?;
        let claims = TokenClaims {
            sub: subject,
            role,
            issued_at,
            expires_at,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn codec(secret: &str) -> Hs256TokenCodec {
        Hs256TokenCodec::new(SigningSecret::new(secret).unwrap())
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 12, 30, 15).unwrap()
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert_eq!(SigningSecret::new("").unwrap_err(), EmptySecret);
    }

    #[test]
    fn secret_is_not_printed() {
        let secret = SigningSecret::new("hunter2").unwrap();
        assert!(!format!("{secret:?}").contains("hunter2"));
    }

    #[test]
    fn issued_token_expires_after_one_hour() {
        let codec = codec("test-secret");
        let issued = codec.issue_at(UserId::new(), Role::Admin, t0()).unwrap();
        assert_eq!(issued.claims.issued_at, t0());
        assert_eq!(issued.claims.expires_at, t0() + Duration::hours(1));
    }

    #[test]
    fn unrepresentable_expiry_is_an_error_not_a_panic() {
        let codec = Hs256TokenCodec::with_ttl(
            SigningSecret::new("test-secret").unwrap(),
            Duration::days(1_000_000_000),
        );
        assert!(matches!(
            codec.issue_at(UserId::new(), Role::Admin, t0()),
            Err(TokenError::Encoding(_))
        ));
    }

    #[test]
    fn issuing_is_deterministic_for_fixed_key_and_time() {
        let codec = codec("test-secret");
        let subject = UserId::new();
        let a = codec.issue_at(subject, Role::Operator, t0()).unwrap();
        let b = codec.issue_at(subject, Role::Operator, t0()).unwrap();
        assert_eq!(a.token, b.token);
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec("test-secret");
        let issued = codec.issue_at(UserId::new(), Role::Farmer, t0()).unwrap();
        let later = t0() + Duration::hours(1) + Duration::seconds(1);
        assert_eq!(codec.verify_at(&issued.token, later), Err(TokenError::Expired));
    }

    #[test]
    fn token_signed_with_other_key_has_invalid_signature() {
        let issued = codec("secret-a")
            .issue_at(UserId::new(), Role::Admin, t0())
            .unwrap();
        assert_eq!(
            codec("secret-b").verify_at(&issued.token, t0()),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn tampered_payload_has_invalid_signature() {
        let codec = codec("test-secret");
        let farmer = codec.issue_at(UserId::new(), Role::Farmer, t0()).unwrap();
        let admin = codec.issue_at(UserId::new(), Role::Admin, t0()).unwrap();

        // Splice the admin payload onto the farmer signature.
        let f: Vec<&str> = farmer.token.split('.').collect();
        let a: Vec<&str> = admin.token.split('.').collect();
        let forged = format!("{}.{}.{}", f[0], a[1], f[2]);

        assert_eq!(codec.verify_at(&forged, t0()), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed_not_a_panic() {
        let codec = codec("test-secret");
        for input in ["", "abc", "a.b", "a.b.c", "Bearer xyz", "...."] {
            assert_eq!(codec.verify_at(input, t0()), Err(TokenError::Malformed), "input {input:?}");
        }
    }

    #[test]
    fn unknown_role_claim_is_malformed() {
        let secret = "test-secret";
        let payload = serde_json::json!({
            "sub": UserId::new(),
            "role": "SUPERUSER",
            "iat": t0().timestamp(),
            "exp": t0().timestamp() + 3600,
        });
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(codec(secret).verify_at(&token, t0()), Err(TokenError::Malformed));
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn verify_returns_what_issue_encoded(
            role in any_role(),
            id in any::<u128>(),
            offset in 0i64..=DEFAULT_TOKEN_TTL_SECS,
        ) {
            let codec = codec("prop-secret");
            let subject = UserId::from_uuid(uuid::Uuid::from_u128(id));
            let issued = codec.issue_at(subject, role, t0()).unwrap();

            let claims = codec.verify_at(&issued.token, t0() + Duration::seconds(offset)).unwrap();
            prop_assert_eq!(claims.sub, subject);
            prop_assert_eq!(claims.role, role);
        }

        #[test]
        fn verify_never_succeeds_after_expiry(
            role in any_role(),
            past in 1i64..=10 * DEFAULT_TOKEN_TTL_SECS,
        ) {
            let codec = codec("prop-secret");
            let issued = codec.issue_at(UserId::new(), role, t0()).unwrap();
            let at = issued.claims.expires_at + Duration::seconds(past);
            prop_assert_eq!(codec.verify_at(&issued.token, at), Err(TokenError::Expired));
        }
    }
}
