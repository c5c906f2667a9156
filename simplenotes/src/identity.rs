use std::fmt::{Debug, Formatter};
use std::path::Path;
use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use rand::Rng;

use crate::data::UserId;
use crate::lib_constants::ACCESS_TOKEN_KEY_LEN;
use crate::rng::make_key;

mod access_token;
mod errors;

pub use access_token::{AccessTokenGenerator, AccessTokenIdentityProvider};
pub use errors::IdentityError;

/// Resolves the caller behind a request.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Takes the raw `Authorization` header value. `Ok(None)` means the
    /// caller is anonymous; errors are reserved for the provider itself
    /// failing.
    async fn identify(
        &self,
        authorization: Option<&str>,
    ) -> Result<Option<UserId>, IdentityError>;
}

/// Shared secret the access tokens are signed with. Stored on disk as
/// base64 text.
#[derive(Clone, Eq, PartialEq)]
pub struct AccessTokenKey([u8; ACCESS_TOKEN_KEY_LEN]);

impl AccessTokenKey {
    pub fn generate<R: Rng>(rng: &mut R) -> AccessTokenKey {
        AccessTokenKey(make_key(rng))
    }

    pub fn from_base64(encoded: &str) -> Result<AccessTokenKey, IdentityError> {
        let decoded = Base64::decode_vec(encoded.trim())?;
        let actual = decoded.len();
        decoded.try_into()
            .map(AccessTokenKey)
            .map_err(|_| IdentityError::KeyLength {
                expected: ACCESS_TOKEN_KEY_LEN,
                actual,
            })
    }

    pub fn from_file(
        path: impl AsRef<Path>,
    ) -> Result<AccessTokenKey, IdentityError> {
        Self::from_base64(&std::fs::read_to_string(path)?)
    }

    pub fn to_base64(&self) -> String {
        Base64::encode_string(&self.0)
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for AccessTokenKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessTokenKey(..)")
    }
}
