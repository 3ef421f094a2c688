use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GOOGLE_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

pub const GOOGLE_AI_API_KEY_ENV_VAR: &str = "GOOGLE_GENAI_API_KEY";
pub const OPENROUTER_API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";

#[derive(Clone, Debug)]
pub struct AvailableModel {
    pub model_name: &'static str,
    pub provider: ProviderKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    OpenRouter,
}

impl ProviderKind {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Google => GOOGLE_AI_BASE_URL,
            ProviderKind::OpenRouter => OPENROUTER_BASE_URL,
        }
    }

    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            ProviderKind::Google => GOOGLE_AI_API_KEY_ENV_VAR,
            ProviderKind::OpenRouter => OPENROUTER_API_KEY_ENV_VAR,
        }
    }

    /// First model listed for the provider in [`KNOWN_MODELS`].
    pub fn default_model(&self) -> &'static str {
        KNOWN_MODELS
            .iter()
            .find(|m| m.provider == *self)
            .map(|m| m.model_name)
            .unwrap_or("gemini-1.5-flash")
    }
}

pub const KNOWN_MODELS: &[AvailableModel] = &[
    AvailableModel {
        model_name: "gemini-1.5-flash",
        provider: ProviderKind::Google,
    },
    AvailableModel {
        model_name: "gemini-2.0-flash",
        provider: ProviderKind::Google,
    },
    AvailableModel {
        model_name: "google/gemini-flash-1.5",
        provider: ProviderKind::OpenRouter,
    },
];

/// Where chat completions are sent and with which credential.
///
/// The key is optional so a provider can be built before a credential is
/// known; calls made without one fail with `MissingApiKey`.
#[derive(Clone, Debug)]
pub enum Provider {
    GoogleAi {
        api_key: Option<String>,
        base_url: String,
    },
    OpenRouter {
        api_key: Option<String>,
        base_url: String,
    },
}

/// `"type"` of a schema node: one name, or a union such as `["integer", "null"]`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Union(Vec<String>),
}

impl Default for SchemaType {
    fn default() -> Self {
        SchemaType::Single("object".to_string())
    }
}

/// JSON schema node for `response_format`. Objects use `properties`,
/// arrays use `items`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct JsonSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "additionalProperties")]
    pub additional_properties: Option<bool>,
}

impl JsonSchema {
    pub fn scalar(schema_type: &str, description: &str) -> Self {
        Self {
            schema_type: SchemaType::Single(schema_type.to_string()),
            description: Some(description.to_string()),
            ..Default::default()
        }
    }

    /// A scalar that may also be `null`.
    pub fn nullable(schema_type: &str, description: &str) -> Self {
        Self {
            schema_type: SchemaType::Union(vec![schema_type.to_string(), "null".to_string()]),
            description: Some(description.to_string()),
            ..Default::default()
        }
    }

    pub fn array(items: JsonSchema, description: &str) -> Self {
        Self {
            schema_type: SchemaType::Single("array".to_string()),
            description: Some(description.to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// A closed object in strict form: every property is required and
    /// unknown keys are not allowed. Optional values use [`JsonSchema::nullable`].
    pub fn object(properties: Vec<(&str, JsonSchema)>) -> Self {
        let required = properties.iter().map(|(name, _)| name.to_string()).collect();
        Self {
            schema_type: SchemaType::Single("object".to_string()),
            properties: Some(
                properties
                    .into_iter()
                    .map(|(name, schema)| (name.to_string(), schema))
                    .collect(),
            ),
            required,
            additional_properties: Some(false),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JsonSchemaDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    pub schema: JsonSchema,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<JsonSchemaDefinition>,
}

impl ResponseFormat {
    pub fn json_schema(definition: JsonSchemaDefinition) -> Self {
        Self {
            format_type: "json_schema".to_string(),
            json_schema: Some(definition),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionResponseMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionChoice {
    pub message: ChatCompletionResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub index: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: Option<u32>,
    pub total_tokens: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub created: Option<u64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    pub usage: Option<ChatCompletionUsage>,
}
