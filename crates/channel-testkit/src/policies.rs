//! Creation policy presets

use crate::identities::{ORDERER_MSP, ORG1_MSP, ORG2_MSP};
use channel_core::{PolicyPrincipal, PolicySpec, Role};

/// One peer admin plus the orderer admin
///
/// `2-of [1-of {Org1 admin, Org2 admin}, Orderer admin]`
pub fn nested_creation_policy() -> PolicySpec {
    PolicySpec::from_descriptor(&serde_json::json!({
        "identities": [
            { "role": { "name": "admin", "mspId": ORG1_MSP } },
            { "role": { "name": "admin", "mspId": ORG2_MSP } },
            { "role": { "name": "admin", "mspId": ORDERER_MSP } }
        ],
        "policy": {
            "2-of": [
                { "1-of": [{ "signed-by": 0 }, { "signed-by": 1 }] },
                { "signed-by": 2 }
            ]
        }
    }))
    .unwrap()
}

/// `k` admins out of Org1, Org2 and the orderer
pub fn admins_threshold(k: usize) -> PolicySpec {
    PolicySpec::threshold(
        k,
        vec![
            PolicyPrincipal::new(Role::Admin, ORG1_MSP),
            PolicyPrincipal::new(Role::Admin, ORG2_MSP),
            PolicyPrincipal::new(Role::Admin, ORDERER_MSP),
        ],
    )
    .unwrap()
}

/// Policy accepting any signature set
pub fn accept_all() -> PolicySpec {
    PolicySpec::accept_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identities::TestNetwork;

    #[test]
    fn test_nested_policy_with_standard_network() {
        let network = TestNetwork::standard();
        let policy = nested_creation_policy();

        assert!(policy.is_satisfied_by([network.org1.identity(), network.orderer.identity()]));
        assert!(policy.is_satisfied_by([network.org2.identity(), network.orderer.identity()]));
        assert!(!policy.is_satisfied_by([network.org1.identity(), network.org2.identity()]));
    }

    #[test]
    fn test_threshold_preset() {
        let network = TestNetwork::standard();
        assert!(admins_threshold(2).is_satisfied_by([network.org1.identity(), network.org2.identity()]));
        assert!(!admins_threshold(3).is_satisfied_by([network.org1.identity(), network.org2.identity()]));
    }
}
