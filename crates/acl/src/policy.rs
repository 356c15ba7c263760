//! Policy document
//!
//! The wire format supplied at initialization:
//!
//! ```json
//! [
//!   {
//!     "FunctionName": "requestRewardPoints",
//!     "ConditionsList": [{ "Org": "HILTON", "Dept": "Bangalore", "Role": "ADMIN" }]
//!   }
//! ]
//! ```

use crate::error::{AclError, AclResult};
use serde::{Deserialize, Serialize};

/// An (organization, department, role) combination
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AclTriple {
    #[serde(rename = "Org")]
    pub org: String,

    #[serde(rename = "Dept")]
    pub dept: String,

    #[serde(rename = "Role")]
    pub role: String,
}

impl AclTriple {
    pub fn new(org: impl Into<String>, dept: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            dept: dept.into(),
            role: role.into(),
        }
    }

    /// Exact match on all three attributes
    pub fn matches(&self, org: &str, dept: &str, role: &str) -> bool {
        self.org == org && self.dept == dept && self.role == role
    }

    fn is_complete(&self) -> bool {
        !self.org.is_empty() && !self.dept.is_empty() && !self.role.is_empty()
    }
}

/// Triples granted for one function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionConditions {
    #[serde(rename = "FunctionName")]
    pub function_name: String,

    #[serde(rename = "ConditionsList", default)]
    pub conditions: Vec<AclTriple>,
}

/// Ordered list of per-function grants
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyDocument {
    pub entries: Vec<FunctionConditions>,
}

impl PolicyDocument {
    /// Parse and validate a JSON policy document
    pub fn from_json(json: &str) -> AclResult<Self> {
        let document: PolicyDocument = serde_json::from_str(json)?;
        document.validate()?;
        Ok(document)
    }

    /// Every entry names a function and every triple is complete
    pub fn validate(&self) -> AclResult<()> {
        for entry in &self.entries {
            if entry.function_name.trim().is_empty() {
                return Err(AclError::EmptyFunctionName);
            }
            if entry.conditions.iter().any(|triple| !triple.is_complete()) {
                return Err(AclError::IncompleteCondition {
                    function: entry.function_name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Add a grant
    pub fn grant(mut self, function: impl Into<String>, triple: AclTriple) -> Self {
        let function = function.into();
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.function_name == function)
        {
            Some(entry) => entry.conditions.push(triple),
            None => self.entries.push(FunctionConditions {
                function_name: function,
                conditions: vec![triple],
            }),
        }
        self
    }
}
