//! # Canonical Key Ordering
//!
//! Total order over map keys used to emit generic maps deterministically.
//!
//! | Rank | Key | Order within the kind |
//! |------|-----|-----------------------|
//! | 0 | `Bool` | false < true |
//! | 1 | `Int` | numeric |
//! | 2 | `Uint` | numeric |
//! | 3 | `Float` | numeric, NaN is always an error |
//! | 4 | `String` | bytewise |
//! | 5 | `Bytes` | bytewise, lengths must match |
//! | 6 | `Array` | element-wise, lengths must match |

use crate::domain::values::{MapKey, Value};
use crate::errors::KeyOrderingError;
use std::cmp::Ordering;

const fn rank(key: &MapKey) -> u8 {
    match key {
        MapKey::Bool(_) => 0,
        MapKey::Int(_) => 1,
        MapKey::Uint(_) => 2,
        MapKey::Float(_) => 3,
        MapKey::String(_) => 4,
        MapKey::Bytes(_) => 5,
        MapKey::Array(_) => 6,
    }
}

/// Compares two keys under the canonical order.
pub fn compare_keys(left: &MapKey, right: &MapKey) -> Result<Ordering, KeyOrderingError> {
    let (left_rank, right_rank) = (rank(left), rank(right));
    if left_rank != right_rank {
        return Ok(left_rank.cmp(&right_rank));
    }

    match (left, right) {
        (MapKey::Bool(a), MapKey::Bool(b)) => Ok(a.cmp(b)),
        (MapKey::Int(a), MapKey::Int(b)) => Ok(a.cmp(b)),
        (MapKey::Uint(a), MapKey::Uint(b)) => Ok(a.cmp(b)),
        (MapKey::Float(a), MapKey::Float(b)) => a
            .partial_cmp(b)
            .ok_or_else(|| KeyOrderingError::Incomparable(format!("{a} and {b}"))),
        (MapKey::String(a), MapKey::String(b)) => Ok(a.as_bytes().cmp(b.as_bytes())),
        (MapKey::Bytes(a), MapKey::Bytes(b)) => {
            if a.len() != b.len() {
                return Err(KeyOrderingError::MismatchedLength {
                    left: a.len(),
                    right: b.len(),
                });
            }
            Ok(a.cmp(b))
        }
        (MapKey::Array(a), MapKey::Array(b)) => {
            if a.len() != b.len() {
                return Err(KeyOrderingError::MismatchedLength {
                    left: a.len(),
                    right: b.len(),
                });
            }
            for (x, y) in a.iter().zip(b) {
                match compare_keys(x, y)? {
                    Ordering::Equal => continue,
                    unequal => return Ok(unequal),
                }
            }
            Ok(Ordering::Equal)
        }
        _ => Err(KeyOrderingError::Incomparable(format!("{left} and {right}"))),
    }
}

fn has_nan(key: &MapKey) -> bool {
    match key {
        MapKey::Float(v) => v.is_nan(),
        MapKey::Array(items) => items.iter().any(has_nan),
        _ => false,
    }
}

/// Map entries in canonical key order.
///
/// Fails if any key holds a NaN, any pair of keys cannot be ordered or two
/// keys are equal.
pub fn sorted_entries(entries: &[(MapKey, Value)]) -> Result<Vec<&(MapKey, Value)>, KeyOrderingError> {
    if let Some((key, _)) = entries.iter().find(|(key, _)| has_nan(key)) {
        return Err(KeyOrderingError::Incomparable(format!("{key} is NaN")));
    }

    let mut sorted: Vec<&(MapKey, Value)> = entries.iter().collect();

    let mut failure = None;
    sorted.sort_by(|a, b| {
        compare_keys(&a.0, &b.0).unwrap_or_else(|err| {
            failure.get_or_insert(err);
            Ordering::Equal
        })
    });
    if let Some(err) = failure {
        return Err(err);
    }

    for pair in sorted.windows(2) {
        if compare_keys(&pair[0].0, &pair[1].0)? == Ordering::Equal {
            return Err(KeyOrderingError::DuplicateKey(pair[0].0.to_string()));
        }
    }

    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keys(entries: &[(MapKey, Value)]) -> Vec<MapKey> {
        sorted_entries(entries)
            .unwrap()
            .into_iter()
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn entry(key: MapKey) -> (MapKey, Value) {
        (key, Value::null())
    }

    #[test]
    fn test_cross_kind_precedence() {
        let entries = vec![
            entry(MapKey::Array(vec![MapKey::Uint(1)])),
            entry(MapKey::Bytes(vec![1])),
            entry(MapKey::from("s")),
            entry(MapKey::Float(1.5)),
            entry(MapKey::Uint(1)),
            entry(MapKey::Int(-1)),
            entry(MapKey::Bool(true)),
        ];
        let ranks: Vec<u8> = keys(&entries).iter().map(rank).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_natural_order_within_kind() {
        let entries = vec![entry(MapKey::from("foo")), entry(MapKey::from("bar"))];
        assert_eq!(keys(&entries), vec![MapKey::from("bar"), MapKey::from("foo")]);

        let entries = vec![entry(MapKey::Bool(true)), entry(MapKey::Bool(false))];
        assert_eq!(keys(&entries), vec![MapKey::Bool(false), MapKey::Bool(true)]);

        let entries = vec![entry(MapKey::Int(3)), entry(MapKey::Int(-7))];
        assert_eq!(keys(&entries), vec![MapKey::Int(-7), MapKey::Int(3)]);
    }

    #[test]
    fn test_arrays_compare_element_wise() {
        let a = MapKey::Array(vec![MapKey::Uint(1), MapKey::Uint(9)]);
        let b = MapKey::Array(vec![MapKey::Uint(2), MapKey::Uint(0)]);
        assert_eq!(compare_keys(&a, &b).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_mismatched_lengths() {
        let entries = vec![
            entry(MapKey::Bytes(vec![1, 2])),
            entry(MapKey::Bytes(vec![1, 2, 3])),
        ];
        assert!(matches!(
            sorted_entries(&entries),
            Err(KeyOrderingError::MismatchedLength { .. })
        ));
    }

    #[test]
    fn test_nan_is_incomparable() {
        let entries = vec![entry(MapKey::Float(f64::NAN)), entry(MapKey::Float(1.0))];
        assert!(matches!(
            sorted_entries(&entries),
            Err(KeyOrderingError::Incomparable(_))
        ));
    }

    #[test]
    fn test_nan_is_rejected_alone_and_nested() {
        assert!(matches!(
            sorted_entries(&[entry(MapKey::Float(f64::NAN))]),
            Err(KeyOrderingError::Incomparable(_))
        ));
        assert!(matches!(
            sorted_entries(&[entry(MapKey::Array(vec![MapKey::Float(f64::NAN)]))]),
            Err(KeyOrderingError::Incomparable(_))
        ));
    }

    #[test]
    fn test_duplicate_keys() {
        let entries = vec![entry(MapKey::from("a")), entry(MapKey::from("a"))];
        assert_eq!(
            sorted_entries(&entries).unwrap_err(),
            KeyOrderingError::DuplicateKey("\"a\"".to_string())
        );
    }

    proptest! {
        #[test]
        fn prop_order_ignores_insertion_order(raw in proptest::collection::btree_set(any::<i64>(), 0..32)) {
            let forward: Vec<_> = raw.iter().map(|v| entry(MapKey::Int(*v))).collect();
            let backward: Vec<_> = raw.iter().rev().map(|v| entry(MapKey::Int(*v))).collect();
            prop_assert_eq!(keys(&forward), keys(&backward));
        }
    }
}
