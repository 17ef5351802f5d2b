//! AK/SK credentials.

use crate::error::{Error, Result};
use std::fmt;

/// Access-key/secret-key credential bound to a region, project and domain.
///
/// Immutable once built. The secret key is redacted from `Debug` output and
/// never appears in logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_key: String,
    secret_key: String,
    region: String,
    project_id: String,
    domain: String,
}

impl Credential {
    /// Create a credential from literal values.
    ///
    /// Construction never fails; emptiness is checked by [`Credential::validate`],
    /// which the signer runs before every signature.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hwcloud::Credential;
    ///
    /// let cred = Credential::new("AK", "SK", "cn-north-1", "project-id", "domain");
    /// assert_eq!(cred.region(), "cn-north-1");
    /// ```
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        region: impl Into<String>,
        project_id: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: region.into(),
            project_id: project_id.into(),
            domain: domain.into(),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub(crate) fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Check that every field is non-empty.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("access key", &self.access_key),
            ("secret key", &self.secret_key),
            ("region", &self.region),
            ("project id", &self.project_id),
            ("domain", &self.domain),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::Credential(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("project_id", &self.project_id)
            .field("domain", &self.domain)
            .finish()
    }
}
