pub mod connection;
pub mod endpoints;

pub use connection::{
    classify_api_error, ApiConnectionError, ApiErrorKind, ChatCompletionsClient, StructuredModel,
};
pub use endpoints::{JsonSchema, JsonSchemaDefinition, Provider, ProviderKind, SchemaType};
