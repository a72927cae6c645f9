//! Bearer-token sources injected into [`ErpClient`](super::ErpClient).

use std::path::PathBuf;

use super::error::ErpError;

/// Supplies the bearer token attached to every backend request.
pub trait CredentialProvider: Send + Sync {
    /// `Ok(None)` means the request goes out unauthenticated.
    fn bearer_token(&self) -> Result<Option<String>, ErpError>;
}

/// No `Authorization` header.
pub struct Anonymous;

impl CredentialProvider for Anonymous {
    fn bearer_token(&self) -> Result<Option<String>, ErpError> {
        Ok(None)
    }
}

/// A token fixed at startup (config file or environment).
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Result<Option<String>, ErpError> {
        Ok(Some(self.0.clone()))
    }
}

/// Reads the token from a file on every request, so a login session
/// refreshed by another tool is picked up without a restart.
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for TokenFile {
    fn bearer_token(&self) -> Result<Option<String>, ErpError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            ErpError::Credentials(format!("cannot read {}: {e}", self.path.display()))
        })?;
        let token = contents.trim();
        if token.is_empty() {
            return Err(ErpError::Credentials(format!(
                "{} is empty",
                self.path.display()
            )));
        }
        Ok(Some(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn anonymous_and_static() {
        assert_eq!(Anonymous.bearer_token().unwrap(), None);
        assert_eq!(
            StaticToken::new("abc").bearer_token().unwrap().as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn token_file_is_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  tok-123  ").unwrap();
        let provider = TokenFile::new(file.path());
        assert_eq!(provider.bearer_token().unwrap().as_deref(), Some("tok-123"));
    }

    #[test]
    fn token_file_missing_or_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = TokenFile::new(dir.path().join("nope"));
        assert!(matches!(
            missing.bearer_token(),
            Err(ErpError::Credentials(_))
        ));

        let empty = dir.path().join("empty");
        std::fs::write(&empty, "\n").unwrap();
        assert!(matches!(
            TokenFile::new(empty).bearer_token(),
            Err(ErpError::Credentials(_))
        ));
    }
}
