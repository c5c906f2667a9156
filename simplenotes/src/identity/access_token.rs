use std::str::FromStr;
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::data::UserId;
use crate::identity::{AccessTokenKey, IdentityError, IdentityProvider};

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Deserialize, Serialize)]
struct AccessTokenClaims {
    sub: String,
    nbf: i64,
    exp: i64,
}

/// Accepts `Bearer` HS512 JWTs whose subject is the user id.
pub struct AccessTokenIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl AccessTokenIdentityProvider {
    pub fn new(key: &AccessTokenKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.set_required_spec_claims(&["sub", "nbf", "exp"]);
        validation.validate_nbf = true;
        validation.leeway = 0;
        AccessTokenIdentityProvider {
            key: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }

    fn decode_token(&self, token: &str) -> Option<UserId> {
        let data = jsonwebtoken::decode::<AccessTokenClaims>(
            token,
            &self.key,
            &self.validation,
        )
            .inspect_err(|e| warn!("rejected access token: {e}"))
            .ok()?;
        UserId::from_str(&data.claims.sub)
            .inspect_err(|e| warn!("rejected access token subject: {e}"))
            .ok()
    }
}

#[async_trait]
impl IdentityProvider for AccessTokenIdentityProvider {
    async fn identify(
        &self,
        authorization: Option<&str>,
    ) -> Result<Option<UserId>, IdentityError> {
        let Some(authorization) = authorization else {
            trace!("no authorization header");
            return Ok(None);
        };
        let Some(token) = authorization.strip_prefix(BEARER_PREFIX) else {
            warn!("unsupported authorization scheme");
            return Ok(None);
        };
        let user_id = self.decode_token(token.trim());
        if let Some(user_id) = &user_id {
            trace!("access token accepted for user \"{user_id}\"");
        }
        Ok(user_id)
    }
}

pub struct AccessTokenGenerator {
    key: EncodingKey,
}

impl AccessTokenGenerator {
    pub fn new(key: &AccessTokenKey) -> Self {
        AccessTokenGenerator {
            key: EncodingKey::from_secret(key.as_bytes()),
        }
    }

    pub fn generate_token(
        &self,
        user_id: &UserId,
        not_before: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Result<String, IdentityError> {
        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            nbf: not_before.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &self.key,
        )?;
        debug!(
            "access token generated with subject \"{user_id}\", \
                not_before {not_before}, \
                expires_at {expires_at}"
        );
        Ok(token)
    }
}
