use jsonwebtoken::Algorithm;

/// Shared-secret token settings.
///
/// Rotating the secret invalidates every outstanding token at once; there
/// is no revocation list.
#[derive(Clone)]
pub struct SecurityConfig {
    /// HMAC secret used to sign and verify tokens
    pub jwt_secret: Vec<u8>,
    /// The single accepted algorithm (HS256)
    pub algorithm: Algorithm,
}

impl SecurityConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}
