//! JSON policy descriptors
//!
//! ```json
//! {
//!   "identities": [{ "role": { "name": "member", "mspId": "Org1MSP" } }],
//!   "policy": { "1-of": [{ "signed-by": 0 }] }
//! }
//! ```
//!
//! `"<k>-of"` nodes nest; `{"0-of": []}` accepts everything.

use super::expression::PolicyExpression;
use super::PolicyPrincipal;
use crate::errors::{ChannelError, Result};
use crate::identifiers::{MspId, Role};
use serde_json::{json, Map, Value};

const SIGNED_BY: &str = "signed-by";
const OF_SUFFIX: &str = "-of";

/// Parse the `identities` array of a descriptor
pub(super) fn parse_identities(value: &Value) -> Result<Vec<PolicyPrincipal>> {
    let entries = value
        .as_array()
        .ok_or_else(|| ChannelError::policy("'identities' must be an array"))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let role = entry
                .get("role")
                .ok_or_else(|| ChannelError::policy(format!("identity {i} has no 'role'")))?;
            let name = role
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| ChannelError::policy(format!("identity {i} has no role name")))?;
            let msp_id = role
                .get("mspId")
                .and_then(Value::as_str)
                .ok_or_else(|| ChannelError::policy(format!("identity {i} has no mspId")))?;

            Ok(PolicyPrincipal {
                role: name.parse::<Role>()?,
                msp_id: MspId::new(msp_id),
            })
        })
        .collect()
}

/// Parse a `policy` node
pub(super) fn parse_expression(value: &Value) -> Result<PolicyExpression> {
    let object = value
        .as_object()
        .ok_or_else(|| ChannelError::policy("policy node must be an object"))?;
    let (key, body) = single_entry(object)?;

    if key == SIGNED_BY {
        let index = body
            .as_u64()
            .ok_or_else(|| ChannelError::policy("'signed-by' must be a non-negative integer"))?;
        return Ok(PolicyExpression::SignedBy {
            index: index as usize,
        });
    }

    let n = key
        .strip_suffix(OF_SUFFIX)
        .and_then(|k| k.parse::<usize>().ok())
        .ok_or_else(|| ChannelError::policy(format!("unknown policy node '{key}'")))?;
    let children = body
        .as_array()
        .ok_or_else(|| ChannelError::policy(format!("'{key}' must hold an array")))?;

    if n == 0 && children.is_empty() {
        return Ok(PolicyExpression::AcceptAll);
    }

    Ok(PolicyExpression::Threshold {
        n,
        children: children
            .iter()
            .map(parse_expression)
            .collect::<Result<Vec<_>>>()?,
    })
}

fn single_entry(object: &Map<String, Value>) -> Result<(&str, &Value)> {
    let mut entries = object.iter();
    match (entries.next(), entries.next()) {
        (Some((key, value)), None) => Ok((key.as_str(), value)),
        _ => Err(ChannelError::policy(
            "policy node must have exactly one key",
        )),
    }
}

/// Render identities back to descriptor form
pub(super) fn identities_to_value(identities: &[PolicyPrincipal]) -> Value {
    Value::Array(
        identities
            .iter()
            .map(|p| json!({ "role": { "name": p.role.to_string(), "mspId": p.msp_id.as_str() } }))
            .collect(),
    )
}

/// Render an expression back to descriptor form
pub(super) fn expression_to_value(expr: &PolicyExpression) -> Value {
    match expr {
        PolicyExpression::AcceptAll => json!({ "0-of": [] }),
        PolicyExpression::SignedBy { index } => json!({ "signed-by": index }),
        PolicyExpression::Threshold { n, children } => {
            let mut object = Map::new();
            object.insert(
                format!("{n}{OF_SUFFIX}"),
                Value::Array(children.iter().map(expression_to_value).collect()),
            );
            Value::Object(object)
        }
    }
}
