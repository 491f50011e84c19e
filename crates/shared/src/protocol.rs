use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::ProductDraft;

pub const PRODUCT_PART: &str = "product";
pub const IMAGE_PART: &str = "imageFile";
pub const GENERATED_IMAGE_FILENAME: &str = "ai-generated-image.jpg";
pub const GENERATED_IMAGE_MIME: &str = "image/jpeg";

/// Product proposed by the backend from a free-text prompt. Every member is
/// optional and may arrive as a string or a JSON number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_available: Option<Value>,
}

impl GeneratedProduct {
    /// Missing members become empty text / `false`.
    pub fn into_draft(self) -> ProductDraft {
        ProductDraft {
            name: field_text(self.name),
            brand: field_text(self.brand),
            description: field_text(self.description),
            price: field_text(self.price),
            category: field_text(self.category),
            stock_quantity: field_text(self.stock_quantity),
            release_date: field_text(self.release_date),
            product_available: field_flag(self.product_available),
        }
    }
}

fn field_text(value: Option<Value>) -> String {
    match value {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

fn field_flag(value: Option<Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::String(text)) => text.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Whatever the backend echoes back after storing a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatedProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAskResponse {
    pub response: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatErrorEnvelope {
    #[serde(default)]
    pub error: Option<ChatErrorDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body shape used by the generation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}
