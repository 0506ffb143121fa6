//! Model registry
//!
//! Fixed mapping from the model ids advertised to clients to the model ids
//! understood by DuckDuckGo. Read-only for the lifetime of the process.

/// Advertised id, upstream id
const MODELS: &[(&str, &str)] = &[
    ("gpt-4o-mini", "gpt-4o-mini"),
    ("claude-3-haiku-20240307", "claude-3-haiku-20240307"),
    (
        "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo",
        "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo",
    ),
    (
        "mistralai/Mixtral-8x7B-Instruct-v0.1",
        "mistralai/Mixtral-8x7B-Instruct-v0.1",
    ),
];

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    entries: Vec<(String, String)>,
}

impl ModelRegistry {
    /// Build a registry from explicit `(advertised, upstream)` pairs
    pub fn from_pairs<I, A, U>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, U)>,
        A: Into<String>,
        U: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(advertised, upstream)| (advertised.into(), upstream.into()))
                .collect(),
        }
    }

    /// Upstream model id for an advertised id
    pub fn resolve(&self, model: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(advertised, _)| advertised == model)
            .map(|(_, upstream)| upstream.as_str())
    }

    pub fn contains(&self, model: &str) -> bool {
        self.resolve(model).is_some()
    }

    /// Advertised ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(advertised, _)| advertised.as_str())
    }

    /// Advertised ids joined with `", "`, as shown in invalid-model errors
    pub fn id_list(&self) -> String {
        self.ids().collect::<Vec<_>>().join(", ")
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::from_pairs(MODELS.iter().copied())
    }
}
