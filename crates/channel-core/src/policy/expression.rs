//! Policy expression tree and its evaluation

use crate::errors::{ChannelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Boolean/threshold expression over principal indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyExpression {
    /// Satisfied when at least `n` children are satisfied
    Threshold {
        /// Required number of satisfied children
        n: usize,
        /// Sub-expressions, in declaration order
        children: Vec<PolicyExpression>,
    },
    /// Satisfied when the principal at `index` signed
    SignedBy {
        /// Index into the policy's identity list
        index: usize,
    },
    /// Always satisfied
    AcceptAll,
}

impl PolicyExpression {
    /// `n`-of-`indices` over plain signer leaves
    pub fn n_of(n: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        Self::Threshold {
            n,
            children: indices
                .into_iter()
                .map(|index| Self::SignedBy { index })
                .collect(),
        }
    }

    /// Evaluate against the set of principal indices that signed
    pub fn evaluate(&self, present: &BTreeSet<usize>) -> bool {
        match self {
            Self::AcceptAll => true,
            Self::SignedBy { index } => present.contains(index),
            Self::Threshold { n, children } => {
                // short-circuit once the threshold is met
                let mut satisfied = 0usize;
                for child in children {
                    if satisfied >= *n {
                        break;
                    }
                    if child.evaluate(present) {
                        satisfied += 1;
                    }
                }
                satisfied >= *n
            }
        }
    }

    /// Evaluate against concrete signers, each usable for at most one leaf
    ///
    /// `candidates[i]` holds the positions of the distinct signers matching
    /// principal `i`. A signer consumed by one `SignedBy` leaf is unavailable
    /// to every other leaf, so one signature never counts twice toward a
    /// threshold.
    pub fn is_satisfied_with(&self, candidates: &[BTreeSet<usize>]) -> bool {
        !self.consumptions(candidates).is_empty()
    }

    /// Every set of signer positions that satisfies the expression
    fn consumptions(&self, candidates: &[BTreeSet<usize>]) -> BTreeSet<BTreeSet<usize>> {
        match self {
            Self::AcceptAll => BTreeSet::from([BTreeSet::new()]),
            Self::SignedBy { index } => candidates
                .get(*index)
                .map(|signers| signers.iter().map(|s| BTreeSet::from([*s])).collect())
                .unwrap_or_default(),
            Self::Threshold { n, children } => {
                // (consumed signers, satisfied children) reachable so far
                let mut reachable: BTreeSet<(BTreeSet<usize>, usize)> =
                    BTreeSet::from([(BTreeSet::new(), 0)]);
                for child in children {
                    let options = child.consumptions(candidates);
                    let mut next = reachable.clone();
                    for (used, count) in reachable.iter().filter(|(_, count)| count < n) {
                        for option in options.iter().filter(|o| used.is_disjoint(o)) {
                            next.insert((used.union(option).copied().collect(), count + 1));
                        }
                    }
                    reachable = next;
                }
                reachable
                    .into_iter()
                    .filter(|(_, count)| count >= n)
                    .map(|(used, _)| used)
                    .collect()
            }
        }
    }

    /// Whether the expression holds with no signatures at all
    pub fn is_accept_all(&self) -> bool {
        self.evaluate(&BTreeSet::new())
    }

    /// Every principal index referenced by the expression
    pub fn referenced_indices(&self) -> BTreeSet<usize> {
        let mut out = BTreeSet::new();
        self.collect_indices(&mut out);
        out
    }

    fn collect_indices(&self, out: &mut BTreeSet<usize>) {
        match self {
            Self::AcceptAll => {}
            Self::SignedBy { index } => {
                out.insert(*index);
            }
            Self::Threshold { children, .. } => {
                for child in children {
                    child.collect_indices(out);
                }
            }
        }
    }

    /// Check structural soundness against the number of declared identities
    pub fn validate(&self, identity_count: usize) -> Result<()> {
        match self {
            Self::AcceptAll => Ok(()),
            Self::SignedBy { index } if *index >= identity_count => {
                Err(ChannelError::policy(format!(
                    "signed-by index {index} out of range for {identity_count} identities"
                )))
            }
            Self::SignedBy { .. } => Ok(()),
            Self::Threshold { n, children } => {
                if *n > children.len() {
                    return Err(ChannelError::policy(format!(
                        "threshold {n}-of cannot be met by {} children",
                        children.len()
                    )));
                }
                children
                    .iter()
                    .try_for_each(|child| child.validate(identity_count))
            }
        }
    }
}
