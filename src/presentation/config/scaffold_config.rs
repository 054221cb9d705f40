use serde::Deserialize;

/// Runs the service on in-memory adapters with a deterministic embedder and a
/// canned completion client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    pub enabled: bool,
    pub embedding_dimension: usize,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            embedding_dimension: 256,
        }
    }
}
