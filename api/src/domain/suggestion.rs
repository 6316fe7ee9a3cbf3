use serde::{Deserialize, Serialize};

/// Structured review of one transaction, as returned by the reasoning service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub documentation: String,
    pub improvements: Vec<String>,
    pub security: Vec<String>,
    pub schema_updates: String,
    pub code_snippet: String,
}

impl Suggestion {
    /// Sentinel returned whenever analysis cannot produce a usable answer.
    pub fn fallback() -> Self {
        Self {
            documentation: String::from("Failed to generate documentation."),
            improvements: vec![String::from("Could not analyze request.")],
            security: vec![],
            schema_updates: String::from("N/A"),
            code_snippet: String::from("// Error generating snippet"),
        }
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }
}
