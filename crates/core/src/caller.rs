//! Attested caller identity
//!
//! The host platform authenticates the submitter and hands the core a set of
//! certificate attributes. Missing attributes are modelled as `None`.

use serde::{Deserialize, Serialize};

/// Attributes carried by the caller's credential
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CallerAttributes {
    /// Certificate class (`app` for applications, `peer` for nodes)
    #[serde(default)]
    pub certificate_type: Option<String>,

    #[serde(default)]
    pub organization: Option<String>,

    #[serde(default)]
    pub department: Option<String>,

    #[serde(default)]
    pub role: Option<String>,

    /// Unique identifier of the credential (bound to a member as its public key)
    pub unique_id: String,

    /// Membership service provider that issued the credential
    #[serde(default)]
    pub msp_id: String,
}

impl CallerAttributes {
    /// Create attributes for an application-class caller
    pub fn application(
        organization: impl Into<String>,
        department: impl Into<String>,
        role: impl Into<String>,
        unique_id: impl Into<String>,
    ) -> Self {
        Self {
            certificate_type: Some("app".to_string()),
            organization: Some(organization.into()),
            department: Some(department.into()),
            role: Some(role.into()),
            unique_id: unique_id.into(),
            msp_id: String::new(),
        }
    }

    /// Set the MSP id
    pub fn with_msp_id(mut self, msp_id: impl Into<String>) -> Self {
        self.msp_id = msp_id.into();
        self
    }

    /// Override the certificate type
    pub fn with_certificate_type(mut self, certificate_type: impl Into<String>) -> Self {
        self.certificate_type = Some(certificate_type.into());
        self
    }

    /// The (organization, department, role) triple, if all three are present and non-empty
    pub fn triple(&self) -> Option<(&str, &str, &str)> {
        let org = non_empty(&self.organization)?;
        let dept = non_empty(&self.department)?;
        let role = non_empty(&self.role)?;
        Some((org, dept, role))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_complete() {
        let caller = CallerAttributes::application("HILTON", "Bangalore", "ADMIN", "x509::alice");
        assert_eq!(caller.triple(), Some(("HILTON", "Bangalore", "ADMIN")));
    }

    #[test]
    fn test_triple_missing_or_empty() {
        let mut caller = CallerAttributes::application("HILTON", "", "ADMIN", "x509::alice");
        assert_eq!(caller.triple(), None);

        caller.department = None;
        assert_eq!(caller.triple(), None);
    }

    #[test]
    fn test_deserialize_partial() {
        let json = r#"{ "unique_id": "x509::bob", "organization": "AIRLINE" }"#;
        let caller: CallerAttributes = serde_json::from_str(json).unwrap();
        assert_eq!(caller.certificate_type, None);
        assert_eq!(caller.organization.as_deref(), Some("AIRLINE"));
        assert!(caller.triple().is_none());
    }
}
