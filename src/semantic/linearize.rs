//! C3 linearization of contract inheritance.
//!
//! Solidity resolves bases right-to-left, so each contract's declared base
//! list is reversed before the merge. The result per contract is
//! `[contract, closest ancestor, ..., root]`; callers drop the head to get
//! the ancestor order. Names with no entry in the dependency map (missing
//! imports) are treated as leaves so the rest of the hierarchy still
//! linearizes.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinearizeError {
    #[error("could not find a consistent ancestor order for contract '{0}'")]
    Unresolvable(SmolStr),
    #[error("cyclic inheritance involving contract '{0}'")]
    Cycle(SmolStr),
}

/// Linearize every contract in the dependency map (contract name →
/// declared base names, source order, most-derived first). A genuine
/// conflict between independent branches is an error, never silently
/// resolved by picking an order.
pub fn linearize_all(
    dependencies: &IndexMap<SmolStr, Vec<SmolStr>>,
) -> Result<IndexMap<SmolStr, Vec<SmolStr>>, LinearizeError> {
    let mut memo: FxHashMap<SmolStr, Vec<SmolStr>> = FxHashMap::default();
    let mut result = IndexMap::new();
    for name in dependencies.keys() {
        let order = linearize_one(name, dependencies, &mut memo, &mut Vec::new())?;
        result.insert(name.clone(), order);
    }
    Ok(result)
}

fn linearize_one(
    name: &SmolStr,
    dependencies: &IndexMap<SmolStr, Vec<SmolStr>>,
    memo: &mut FxHashMap<SmolStr, Vec<SmolStr>>,
    visiting: &mut Vec<SmolStr>,
) -> Result<Vec<SmolStr>, LinearizeError> {
    if let Some(done) = memo.get(name) {
        return Ok(done.clone());
    }
    if visiting.contains(name) {
        return Err(LinearizeError::Cycle(name.clone()));
    }
    let bases = dependencies.get(name).cloned().unwrap_or_default();
    if bases.is_empty() {
        let order = vec![name.clone()];
        memo.insert(name.clone(), order.clone());
        return Ok(order);
    }

    visiting.push(name.clone());
    let reversed: Vec<SmolStr> = bases.iter().rev().cloned().collect();
    let mut sequences = Vec::with_capacity(reversed.len() + 1);
    for base in &reversed {
        sequences.push(linearize_one(base, dependencies, memo, visiting)?);
    }
    sequences.push(reversed);
    visiting.pop();

    let mut order = vec![name.clone()];
    order.extend(c3_merge(name, sequences)?);
    memo.insert(name.clone(), order.clone());
    Ok(order)
}

fn c3_merge(
    name: &SmolStr,
    mut sequences: Vec<Vec<SmolStr>>,
) -> Result<Vec<SmolStr>, LinearizeError> {
    let mut result = Vec::new();
    loop {
        sequences.retain(|sequence| !sequence.is_empty());
        if sequences.is_empty() {
            return Ok(result);
        }
        // A head is a good candidate iff it appears in no sequence tail.
        let candidate = sequences
            .iter()
            .map(|sequence| &sequence[0])
            .find(|head| {
                !sequences
                    .iter()
                    .any(|sequence| sequence[1..].contains(head))
            })
            .cloned();
        let Some(candidate) = candidate else {
            return Err(LinearizeError::Unresolvable(name.clone()));
        };
        for sequence in &mut sequences {
            if sequence.first() == Some(&candidate) {
                sequence.remove(0);
            }
        }
        result.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(entries: &[(&str, &[&str])]) -> IndexMap<SmolStr, Vec<SmolStr>> {
        entries
            .iter()
            .map(|(name, bases)| {
                (
                    SmolStr::new(name),
                    bases.iter().map(|b| SmolStr::new(b)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_simple_chain() {
        let orders = linearize_all(&deps(&[("A", &[]), ("B", &["A"]), ("C", &["A", "B"])]))
            .unwrap();
        assert_eq!(orders["C"], vec!["C", "B", "A"]);
        assert_eq!(orders["B"], vec!["B", "A"]);
    }

    #[test]
    fn test_unknown_base_is_leaf() {
        let orders = linearize_all(&deps(&[("C", &["Missing"])])).unwrap();
        assert_eq!(orders["C"], vec!["C", "Missing"]);
    }

    #[test]
    fn test_diamond_resolves() {
        let orders = linearize_all(&deps(&[
            ("Root", &[]),
            ("Left", &["Root"]),
            ("Right", &["Root"]),
            ("Bottom", &["Left", "Right"]),
        ]))
        .unwrap();
        assert_eq!(orders["Bottom"], vec!["Bottom", "Right", "Left", "Root"]);
    }

    #[test]
    fn test_genuine_conflict_errors() {
        let result = linearize_all(&deps(&[
            ("X", &[]),
            ("Y", &[]),
            ("A", &["X", "Y"]),
            ("B", &["Y", "X"]),
            ("C", &["A", "B"]),
        ]));
        assert!(matches!(result, Err(LinearizeError::Unresolvable(name)) if name == "C"));
    }

    #[test]
    fn test_cycle_errors() {
        let result = linearize_all(&deps(&[("A", &["B"]), ("B", &["A"])]));
        assert!(matches!(result, Err(LinearizeError::Cycle(_))));
    }
}
