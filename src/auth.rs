use std::fmt;

/// A Jenkins API token.
///
/// Wrapped so the raw value never appears in `Debug` output or log lines;
/// the token is only readable through [`ApiToken::as_str`] at the point the
/// request is signed.
#[derive(Clone)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ApiToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ApiToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}
