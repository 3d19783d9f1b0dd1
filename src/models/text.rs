use serde::Deserialize;

/// One element of the text-generation response array.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedText {
    #[serde(default)]
    pub generated_text: String,
}
