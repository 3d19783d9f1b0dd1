use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ModelCapability {
    Photorealism,
    Fast,
    Artistic,
}

/// One image-generation backend: name, endpoint, priority (lower is tried
/// first) and its tuned default parameter table. Static after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    pub endpoint: String,
    pub priority: i32,
    pub default_parameters: Map<String, Value>,
    pub capabilities: Vec<ModelCapability>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, priority: i32) -> Self {
        ModelDescriptor {
            name: name.into(),
            endpoint: endpoint.into(),
            priority,
            default_parameters: Map::new(),
            capabilities: Vec::new(),
        }
    }

    pub fn with_default(mut self, key: impl Into<String>, value: Value) -> Self {
        self.default_parameters.insert(key.into(), value);
        self
    }

    pub fn with_capability(mut self, capability: ModelCapability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn base_negative_prompt(&self) -> Option<&str> {
        self.default_parameters
            .get("negative_prompt")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}
