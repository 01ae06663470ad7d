use serde::{Deserialize, Serialize};

/// Where snapshots live inside a record and inside the outgoing envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageLayout {
    /// JSON pointer of the object holding current step snapshots, keyed by step id.
    pub current_root: String,
    /// JSON pointer of the object holding legacy step snapshots, keyed by step id.
    pub legacy_root: String,
    /// Identifier key of embedded relation objects.
    pub entity_id_key: String,
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self {
            current_root: "/wizardState/steps".to_string(),
            legacy_root: "/wizardData".to_string(),
            entity_id_key: "id".to_string(),
        }
    }
}

impl StorageLayout {
    pub fn current_tokens(&self) -> Vec<String> {
        pointer_tokens(&self.current_root)
    }

    pub fn legacy_tokens(&self) -> Vec<String> {
        pointer_tokens(&self.legacy_root)
    }

    /// First-level record keys owned by the two snapshot roots.
    pub fn root_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = [self.current_tokens(), self.legacy_tokens()]
            .into_iter()
            .filter_map(|t| t.into_iter().next())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

/// Split a JSON pointer into unescaped reference tokens.
///
/// - `""` and `"/"` address the document root (no tokens)
/// - `~1` -> `/`, `~0` -> `~`
pub fn pointer_tokens(pointer: &str) -> Vec<String> {
    pointer
        .trim()
        .split('/')
        .filter(|t| !t.is_empty())
        .map(|t| t.replace("~1", "/").replace("~0", "~"))
        .collect()
}
