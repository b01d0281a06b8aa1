//! Canonical snapshot serialization.
//!
//! Two snapshots are "the same" when their canonical JSON text is equal.
//! Objects serialize through `serde_json::Value`, whose map is ordered by
//! key, so field and map insertion order do not matter.

use serde::Serialize;
use std::fmt::{self, Debug};
use tracing::warn;

/// Serialized, comparable form of a snapshot.
#[derive(Clone)]
pub struct CanonicalSnapshot {
    text: String,
    canonical: bool,
}

impl CanonicalSnapshot {
    /// Serialize a snapshot into its comparable form.
    ///
    /// If the value cannot be represented as JSON (for example a map with
    /// non-string keys), this falls back to its `Debug` text. The fallback
    /// is not canonical: two equal values may compare as different.
    pub fn of<S>(values: &S) -> Self
    where
        S: Serialize + Debug,
    {
        match serde_json::to_value(values).and_then(|value| serde_json::to_string(&value)) {
            Ok(text) => Self {
                text,
                canonical: true,
            },
            Err(err) => {
                warn!("Snapshot is not serializable, comparing Debug text: {}", err);
                Self {
                    text: format!("{:?}", values),
                    canonical: false,
                }
            }
        }
    }

    /// The serialized text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the text came from canonical JSON rather than the fallback.
    pub fn is_canonical(&self) -> bool {
        self.canonical
    }
}

impl PartialEq for CanonicalSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for CanonicalSnapshot {}

impl Debug for CanonicalSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.canonical {
            write!(f, "CanonicalSnapshot({})", self.text)
        } else {
            write!(f, "CanonicalSnapshot(~{})", self.text)
        }
    }
}

impl fmt::Display for CanonicalSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Serialize;
    use std::collections::HashMap;

    #[derive(Debug, Serialize)]
    struct Form {
        name: String,
        tags: Vec<String>,
    }

    #[test]
    fn test_equal_values_compare_equal() {
        let a = Form {
            name: "A".to_string(),
            tags: vec!["x".to_string()],
        };
        let b = Form {
            name: "A".to_string(),
            tags: vec!["x".to_string()],
        };
        assert_eq!(CanonicalSnapshot::of(&a), CanonicalSnapshot::of(&b));
        assert!(CanonicalSnapshot::of(&a).is_canonical());
    }

    #[test]
    fn test_different_values_compare_different() {
        let a = serde_json::json!({ "name": "A" });
        let b = serde_json::json!({ "name": "B" });
        assert_ne!(CanonicalSnapshot::of(&a), CanonicalSnapshot::of(&b));
    }

    #[test]
    fn test_non_string_keys_fall_back_to_debug() {
        let mut map = HashMap::new();
        map.insert((1u8, 2u8), "cell");
        let snapshot = CanonicalSnapshot::of(&map);
        assert!(!snapshot.is_canonical());
        assert!(snapshot.as_str().contains("cell"));
    }

    proptest! {
        #[test]
        fn prop_map_insertion_order_is_irrelevant(
            entries in proptest::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..16)
        ) {
            let forward: HashMap<_, _> = entries.iter().collect();
            let mut reversed = HashMap::with_capacity(entries.len());
            for (k, v) in entries.iter().rev() {
                reversed.insert(k, v);
            }
            prop_assert_eq!(CanonicalSnapshot::of(&forward), CanonicalSnapshot::of(&reversed));
        }
    }
}
