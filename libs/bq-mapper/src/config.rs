use serde::{Deserialize, Serialize};

/// Tag key read when none is configured.
pub const DEFAULT_TAG_KEY: &str = "bigquery";

// ════════════════════════════════════════════════════════════════
//  Squash Error Policy
// ════════════════════════════════════════════════════════════════

/// What the schema builder does when a squashed field fails to map.
///
/// The row builder always propagates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SquashErrorPolicy {
    /// Log the error and contribute no columns for the squashed field.
    #[default]
    Swallow,
    /// Abort the whole schema build.
    Propagate,
}

// ════════════════════════════════════════════════════════════════
//  Mapper Config
// ════════════════════════════════════════════════════════════════

/// Settings shared by the schema and row builders of one `Mapper`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Key under which field tags are looked up.
    pub tag_key: String,
    pub schema_squash_errors: SquashErrorPolicy,
    /// Classify the first element of a non-empty array and use its type for
    /// the REPEATED column. Off: repeated columns carry no type.
    pub infer_repeated_element_type: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            tag_key: DEFAULT_TAG_KEY.to_string(),
            schema_squash_errors: SquashErrorPolicy::default(),
            infer_repeated_element_type: false,
        }
    }
}

impl MapperConfig {
    pub fn with_tag_key(mut self, key: impl Into<String>) -> Self {
        self.tag_key = key.into();
        self
    }

    pub fn with_squash_errors(mut self, policy: SquashErrorPolicy) -> Self {
        self.schema_squash_errors = policy;
        self
    }

    pub fn with_repeated_element_inference(mut self, enabled: bool) -> Self {
        self.infer_repeated_element_type = enabled;
        self
    }
}
