//! Endorsement policies for channel creation
//!
//! A [`PolicySpec`] pairs an ordered list of principals (role + organization)
//! with a [`PolicyExpression`] over their indices. Evaluation is pure set
//! arithmetic and involves no cryptography. When real signers are checked,
//! each distinct signer satisfies at most one `SignedBy` leaf.

mod descriptor;
pub mod expression;

pub use expression::PolicyExpression;

use crate::errors::{ChannelError, Result};
use crate::identifiers::{MspId, Role};
use crate::identity::Identity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// A principal a policy can require a signature from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyPrincipal {
    /// Required role
    pub role: Role,
    /// Required organization
    pub msp_id: MspId,
}

impl PolicyPrincipal {
    /// Create a principal
    pub fn new(role: Role, msp_id: impl Into<MspId>) -> Self {
        Self {
            role,
            msp_id: msp_id.into(),
        }
    }

    /// Whether a signer identity satisfies this principal
    pub fn matches(&self, identity: &Identity) -> bool {
        identity.msp_id == self.msp_id && identity.role.satisfies(self.role)
    }
}

/// Declared endorsement policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySpec {
    identities: Vec<PolicyPrincipal>,
    rule: PolicyExpression,
}

impl PolicySpec {
    /// Create a policy, checking the rule against the principal list
    pub fn new(identities: Vec<PolicyPrincipal>, rule: PolicyExpression) -> Result<Self> {
        rule.validate(identities.len())?;
        Ok(Self { identities, rule })
    }

    /// Policy satisfied by any signature set, including an empty one
    pub fn accept_all() -> Self {
        Self {
            identities: Vec::new(),
            rule: PolicyExpression::AcceptAll,
        }
    }

    /// Flat `k`-of-all policy over the given principals
    pub fn threshold(k: usize, identities: Vec<PolicyPrincipal>) -> Result<Self> {
        let rule = PolicyExpression::n_of(k, 0..identities.len());
        Self::new(identities, rule)
    }

    /// Parse a JSON descriptor value
    pub fn from_descriptor(descriptor: &Value) -> Result<Self> {
        let identities = match descriptor.get("identities") {
            Some(value) => descriptor::parse_identities(value)?,
            None => Vec::new(),
        };
        let policy = descriptor
            .get("policy")
            .ok_or_else(|| ChannelError::policy("descriptor has no 'policy'"))?;
        let rule = descriptor::parse_expression(policy)?;

        Self::new(identities, rule)
    }

    /// Parse a JSON descriptor from text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ChannelError::policy(format!("invalid policy descriptor: {e}")))?;
        Self::from_descriptor(&value)
    }

    /// Render as a JSON descriptor
    pub fn to_descriptor(&self) -> Value {
        serde_json::json!({
            "identities": descriptor::identities_to_value(&self.identities),
            "policy": descriptor::expression_to_value(&self.rule),
        })
    }

    /// Declared principals, in index order
    pub fn identities(&self) -> &[PolicyPrincipal] {
        &self.identities
    }

    /// Policy rule
    pub fn rule(&self) -> &PolicyExpression {
        &self.rule
    }

    /// Whether the policy holds with no signatures
    pub fn is_accept_all(&self) -> bool {
        self.rule.is_accept_all()
    }

    /// Evaluate against a set of satisfied principal indices
    pub fn evaluate(&self, signer_indices: &BTreeSet<usize>) -> bool {
        self.rule.evaluate(signer_indices)
    }

    /// Principal indices satisfied by the given signer identities
    pub fn satisfied_indices<'a>(
        &self,
        signers: impl IntoIterator<Item = &'a Identity>,
    ) -> BTreeSet<usize> {
        let signers: Vec<&Identity> = signers.into_iter().collect();
        self.identities
            .iter()
            .enumerate()
            .filter(|(_, principal)| signers.iter().any(|s| principal.matches(s)))
            .map(|(index, _)| index)
            .collect()
    }

    /// Whether the distinct `signers` satisfy the policy
    ///
    /// Repeated identities count once, and one signer never stands in for
    /// two principals at the same time.
    pub fn is_satisfied_by<'a>(&self, signers: impl IntoIterator<Item = &'a Identity>) -> bool {
        let mut distinct: Vec<&Identity> = Vec::new();
        for signer in signers {
            if !distinct.contains(&signer) {
                distinct.push(signer);
            }
        }

        let candidates: Vec<BTreeSet<usize>> = self
            .identities
            .iter()
            .map(|principal| {
                distinct
                    .iter()
                    .enumerate()
                    .filter(|(_, signer)| principal.matches(signer))
                    .map(|(position, _)| position)
                    .collect()
            })
            .collect();

        self.rule.is_satisfied_with(&candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::identity::Certificate;
    use serde_json::json;

    fn identity(msp: &str, role: Role) -> Identity {
        Identity::new(
            MspId::new(msp),
            role,
            Certificate::new(format!("{role}@{msp}"), [1u8; 32]),
        )
    }

    fn two_orgs_and_orderer() -> Value {
        json!({
            "identities": [
                { "role": { "name": "admin", "mspId": "Org1MSP" } },
                { "role": { "name": "admin", "mspId": "Org2MSP" } },
                { "role": { "name": "admin", "mspId": "OrdererMSP" } }
            ],
            "policy": {
                "2-of": [
                    { "1-of": [{ "signed-by": 0 }, { "signed-by": 1 }] },
                    { "signed-by": 2 }
                ]
            }
        })
    }

    #[test]
    fn test_descriptor_parses_nested_policy() {
        let policy = PolicySpec::from_descriptor(&two_orgs_and_orderer()).unwrap();
        assert_eq!(policy.identities().len(), 3);
        assert_eq!(policy.identities()[2].msp_id, MspId::new("OrdererMSP"));
        assert!(!policy.is_accept_all());

        let present: BTreeSet<usize> = [1, 2].into_iter().collect();
        assert!(policy.evaluate(&present));
    }

    #[test]
    fn test_descriptor_roundtrip() {
        let policy = PolicySpec::from_descriptor(&two_orgs_and_orderer()).unwrap();
        let again = PolicySpec::from_descriptor(&policy.to_descriptor()).unwrap();
        assert_eq!(policy, again);
    }

    #[test]
    fn test_accept_all_descriptor() {
        let policy =
            PolicySpec::from_json_str(r#"{ "identities": [], "policy": { "0-of": [] } }"#).unwrap();
        assert!(policy.is_accept_all());
        assert!(policy.evaluate(&BTreeSet::new()));
        assert_eq!(policy, PolicySpec::accept_all());
    }

    #[test]
    fn test_bad_descriptors_are_policy_errors() {
        let cases = [
            json!({ "identities": [] }),
            json!({ "identities": [], "policy": { "one-of": [] } }),
            json!({ "identities": [], "policy": { "1-of": [{ "signed-by": 0 }] } }),
            json!({ "identities": [{ "role": { "name": "root", "mspId": "A" } }], "policy": { "0-of": [] } }),
            json!({ "identities": [], "policy": { "1-of": [], "2-of": [] } }),
        ];
        for case in cases {
            let err = PolicySpec::from_descriptor(&case).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Policy, "{case}");
        }
    }

    #[test]
    fn test_signer_identities_map_to_principals() {
        let policy = PolicySpec::from_descriptor(&two_orgs_and_orderer()).unwrap();

        let org1_admin = identity("Org1MSP", Role::Admin);
        let org2_member = identity("Org2MSP", Role::Member);
        let orderer_admin = identity("OrdererMSP", Role::Admin);

        // a member cannot stand in for an admin principal
        assert!(!policy.is_satisfied_by([&org2_member, &orderer_admin]));
        assert!(policy.is_satisfied_by([&org1_admin, &orderer_admin]));
        assert_eq!(
            policy.satisfied_indices([&org1_admin, &org2_member]),
            [0].into_iter().collect()
        );
    }

    #[test]
    fn test_one_admin_cannot_fill_member_and_admin_slots() {
        let policy = PolicySpec::threshold(
            2,
            vec![
                PolicyPrincipal::new(Role::Member, "Org1MSP"),
                PolicyPrincipal::new(Role::Admin, "Org1MSP"),
            ],
        )
        .unwrap();
        let admin = identity("Org1MSP", Role::Admin);
        let member = identity("Org1MSP", Role::Member);

        // the admin matches both principals but is only one signature
        assert_eq!(policy.satisfied_indices([&admin]), [0, 1].into_iter().collect());
        assert!(!policy.is_satisfied_by([&admin]));
        assert!(!policy.is_satisfied_by([&admin, &admin]));
        assert!(!policy.is_satisfied_by([&member]));
        assert!(policy.is_satisfied_by([&admin, &member]));
        assert!(policy.is_satisfied_by([&member, &admin]));
    }

    #[test]
    fn test_repeated_signed_by_needs_two_signers() {
        let policy = PolicySpec::from_descriptor(&json!({
            "identities": [{ "role": { "name": "admin", "mspId": "Org1MSP" } }],
            "policy": { "2-of": [{ "signed-by": 0 }, { "signed-by": 0 }] }
        }))
        .unwrap();
        let first = identity("Org1MSP", Role::Admin);
        let second = Identity::new(
            MspId::new("Org1MSP"),
            Role::Admin,
            Certificate::new("Admin2@Org1MSP", [2u8; 32]),
        );

        assert!(!policy.is_satisfied_by([&first]));
        assert!(!policy.is_satisfied_by([&first, &first]));
        assert!(policy.is_satisfied_by([&first, &second]));
    }

    #[test]
    fn test_member_principal_accepts_admin() {
        let policy =
            PolicySpec::threshold(1, vec![PolicyPrincipal::new(Role::Member, "Org1MSP")]).unwrap();
        assert!(policy.is_satisfied_by([&identity("Org1MSP", Role::Admin)]));
        assert!(!policy.is_satisfied_by([&identity("Org2MSP", Role::Admin)]));
    }
}
