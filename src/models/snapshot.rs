//! Credential snapshot model

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// One fetch's worth of credentials: identifier mapped to display name.
///
/// The daemon guarantees identifier uniqueness within a snapshot, so the
/// UI does not re-validate it. Iteration order is the order the daemon
/// serialized the entries in, which is why this is backed by a vector
/// rather than a `HashMap`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSnapshot {
    entries: Vec<(String, String)>,
}

impl CredentialSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(identifier, display name)` pairs in wire order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }

    /// Look up a display name by identifier
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, name)| name.as_str())
    }
}

impl FromIterator<(String, String)> for CredentialSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for CredentialSnapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SnapshotVisitor;

        impl<'de> Visitor<'de> for SnapshotVisitor {
            type Value = CredentialSnapshot;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of credential identifiers to display names")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, String>()? {
                    entries.push(entry);
                }
                Ok(CredentialSnapshot { entries })
            }
        }

        deserializer.deserialize_map(SnapshotVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_preserves_wire_order() {
        // Keys deliberately not in identifier order
        let json = r#"{"zulu":"Zoe","alpha":"Alice","mike":"Mia"}"#;
        let snapshot: CredentialSnapshot = serde_json::from_str(json).unwrap();

        let ids: Vec<&str> = snapshot.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn test_deserialize_empty_object() {
        let snapshot: CredentialSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
    }

    #[test]
    fn test_get_by_identifier() {
        let snapshot: CredentialSnapshot =
            serde_json::from_str(r#"{"a":"Alice","b":"Bob"}"#).unwrap();

        assert_eq!(snapshot.get("a"), Some("Alice"));
        assert_eq!(snapshot.get("b"), Some("Bob"));
        assert_eq!(snapshot.get("c"), None);
    }
}
