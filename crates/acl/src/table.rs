//! Loaded access-control table and the authorization check

use crate::policy::{AclTriple, PolicyDocument};
use loyalty_core::{CallerAttributes, Function};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Why a caller was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    /// Credential is not application-class
    CertificateType { found: Option<String> },

    /// Organization, department or role missing from the credential
    MissingAttributes,

    /// No policy entry for the function
    NoEntry { function: String },

    /// Entry exists but does not list the caller's triple
    NotGranted {
        function: String,
        org: String,
        dept: String,
        role: String,
    },
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::CertificateType { found } => write!(
                f,
                "certificate type {} is not allowed",
                found.as_deref().unwrap_or("<none>")
            ),
            DenialReason::MissingAttributes => {
                write!(f, "certificate lacks Org, Dept or Role attributes")
            }
            DenialReason::NoEntry { function } => write!(f, "no access policy for {}", function),
            DenialReason::NotGranted {
                function,
                org,
                dept,
                role,
            } => write!(f, "{}/{}/{} may not call {}", org, dept, role, function),
        }
    }
}

/// Outcome of an authorization check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied(DenialReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}

/// Function name → allowed triples.
///
/// Serializes as a JSON object keyed by function name, which is the form
/// persisted under `ACCESS_CONTROL_LIST`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessControlTable {
    entries: BTreeMap<String, Vec<AclTriple>>,
}

impl AccessControlTable {
    /// Empty table: every function is denied
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a validated policy document.
    ///
    /// A function listed twice keeps the later list.
    pub fn from_policy(document: &PolicyDocument) -> Self {
        let mut entries = BTreeMap::new();
        for entry in &document.entries {
            if entry.function_name.parse::<Function>().is_err() {
                debug!(function = %entry.function_name, "Policy names an unknown function");
            }
            entries.insert(entry.function_name.clone(), entry.conditions.clone());
        }
        Self { entries }
    }

    /// Check whether `caller` may run `function`
    pub fn authorize(
        &self,
        caller: &CallerAttributes,
        function: Function,
        application_certificate_type: &str,
    ) -> AccessDecision {
        let (org, dept, role) = match check_credential(caller, application_certificate_type) {
            Ok(triple) => triple,
            Err(reason) => return AccessDecision::Denied(reason),
        };

        let name = function.as_ref();
        let Some(conditions) = self.entries.get(name) else {
            return AccessDecision::Denied(DenialReason::NoEntry {
                function: name.to_string(),
            });
        };

        if conditions.iter().any(|triple| triple.matches(org, dept, role)) {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied(DenialReason::NotGranted {
                function: name.to_string(),
                org: org.to_string(),
                dept: dept.to_string(),
                role: role.to_string(),
            })
        }
    }

    /// Triples granted for `function` within organization `org`
    pub fn conditions_for(&self, function: &str, org: &str) -> Vec<AclTriple> {
        self.entries
            .get(function)
            .map(|conditions| {
                conditions
                    .iter()
                    .filter(|triple| triple.org == org)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The table-independent half of authorization: an application-class
/// certificate carrying a complete (organization, department, role) triple
pub fn check_credential<'c>(
    caller: &'c CallerAttributes,
    application_certificate_type: &str,
) -> Result<(&'c str, &'c str, &'c str), DenialReason> {
    if caller.certificate_type.as_deref() != Some(application_certificate_type) {
        return Err(DenialReason::CertificateType {
            found: caller.certificate_type.clone(),
        });
    }
    caller.triple().ok_or(DenialReason::MissingAttributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AccessControlTable {
        let document = PolicyDocument::default()
            .grant("requestRewardPoints", AclTriple::new("HILTON", "Bangalore", "ADMIN"))
            .grant("requestRewardPoints", AclTriple::new("AIRLINE", "Delhi", "ADMIN"))
            .grant("transferRewardPoints", AclTriple::new("HILTON", "Bangalore", "CASHIER"));
        AccessControlTable::from_policy(&document)
    }

    fn admin() -> CallerAttributes {
        CallerAttributes::application("HILTON", "Bangalore", "ADMIN", "x509::admin")
    }

    #[test]
    fn test_allowed() {
        let decision = table().authorize(&admin(), Function::RequestRewardPoints, "app");
        assert_eq!(decision, AccessDecision::Allowed);
    }

    #[test]
    fn test_peer_certificate_denied() {
        let caller = admin().with_certificate_type("peer");
        let decision = table().authorize(&caller, Function::RequestRewardPoints, "app");
        assert!(matches!(
            decision,
            AccessDecision::Denied(DenialReason::CertificateType { .. })
        ));
    }

    #[test]
    fn test_missing_attribute_denied() {
        let mut caller = admin();
        caller.role = None;
        let decision = table().authorize(&caller, Function::RequestRewardPoints, "app");
        assert_eq!(decision, AccessDecision::Denied(DenialReason::MissingAttributes));
    }

    #[test]
    fn test_check_credential() {
        assert_eq!(
            check_credential(&admin(), "app"),
            Ok(("HILTON", "Bangalore", "ADMIN"))
        );
        assert!(matches!(
            check_credential(&admin().with_certificate_type("peer"), "app"),
            Err(DenialReason::CertificateType { .. })
        ));
        assert_eq!(
            check_credential(&CallerAttributes::default().with_certificate_type("app"), "app"),
            Err(DenialReason::MissingAttributes)
        );
    }

    #[test]
    fn test_no_entry_denied_by_default() {
        let decision = table().authorize(&admin(), Function::BurnRewardPoints, "app");
        assert!(matches!(
            decision,
            AccessDecision::Denied(DenialReason::NoEntry { .. })
        ));
    }

    #[test]
    fn test_triple_must_match_exactly() {
        let caller = CallerAttributes::application("HILTON", "Bangalore", "CASHIER", "x509::c");
        assert!(!table()
            .authorize(&caller, Function::RequestRewardPoints, "app")
            .is_allowed());
        assert!(table()
            .authorize(&caller, Function::TransferRewardPoints, "app")
            .is_allowed());
    }

    #[test]
    fn test_conditions_for_filters_by_org() {
        let conditions = table().conditions_for("requestRewardPoints", "AIRLINE");
        assert_eq!(conditions, vec![AclTriple::new("AIRLINE", "Delhi", "ADMIN")]);
        assert!(table().conditions_for("burnRewardPoints", "AIRLINE").is_empty());
    }

    #[test]
    fn test_later_entry_replaces_earlier() {
        let document = PolicyDocument {
            entries: vec![
                crate::policy::FunctionConditions {
                    function_name: "getRewardPoints".to_string(),
                    conditions: vec![AclTriple::new("A", "B", "C")],
                },
                crate::policy::FunctionConditions {
                    function_name: "getRewardPoints".to_string(),
                    conditions: vec![AclTriple::new("X", "Y", "Z")],
                },
            ],
        };
        let table = AccessControlTable::from_policy(&document);
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.conditions_for("getRewardPoints", "X"),
            vec![AclTriple::new("X", "Y", "Z")]
        );
        assert!(table.conditions_for("getRewardPoints", "A").is_empty());
    }

    #[test]
    fn test_persisted_form_is_keyed_by_function() {
        let json = serde_json::to_value(table()).unwrap();
        assert_eq!(json["requestRewardPoints"][0]["Org"], "HILTON");

        let restored: AccessControlTable = serde_json::from_value(json).unwrap();
        assert_eq!(restored, table());
    }
}
