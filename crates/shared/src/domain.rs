use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Laptop,
    Headphone,
    Mobile,
    Electronics,
    Toys,
    Fashion,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Laptop,
        Category::Headphone,
        Category::Mobile,
        Category::Electronics,
        Category::Toys,
        Category::Fashion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Laptop => "Laptop",
            Category::Headphone => "Headphone",
            Category::Mobile => "Mobile",
            Category::Electronics => "Electronics",
            Category::Toys => "Toys",
            Category::Fashion => "Fashion",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| UnknownCategory(value.to_string()))
    }
}

/// Keys of the product form, spelled the way the backend reports field errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductField {
    Name,
    Brand,
    Description,
    Price,
    Category,
    StockQuantity,
    ReleaseDate,
    Image,
}

impl ProductField {
    pub fn key(self) -> &'static str {
        match self {
            ProductField::Name => "name",
            ProductField::Brand => "brand",
            ProductField::Description => "description",
            ProductField::Price => "price",
            ProductField::Category => "category",
            ProductField::StockQuantity => "stockQuantity",
            ProductField::ReleaseDate => "releaseDate",
            ProductField::Image => "image",
        }
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// In-progress product record. Values are kept as entered so the JSON sent to
/// the backend matches what the form holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub brand: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub stock_quantity: String,
    pub release_date: String,
    pub product_available: bool,
}

impl ProductDraft {
    pub fn field(&self, field: ProductField) -> Option<&str> {
        match field {
            ProductField::Name => Some(&self.name),
            ProductField::Brand => Some(&self.brand),
            ProductField::Description => Some(&self.description),
            ProductField::Price => Some(&self.price),
            ProductField::Category => Some(&self.category),
            ProductField::StockQuantity => Some(&self.stock_quantity),
            ProductField::ReleaseDate => Some(&self.release_date),
            ProductField::Image => None,
        }
    }

    /// Returns `false` for [`ProductField::Image`], which is not a text field.
    pub fn set_field(&mut self, field: ProductField, value: impl Into<String>) -> bool {
        let slot = match field {
            ProductField::Name => &mut self.name,
            ProductField::Brand => &mut self.brand,
            ProductField::Description => &mut self.description,
            ProductField::Price => &mut self.price,
            ProductField::Category => &mut self.category,
            ProductField::StockQuantity => &mut self.stock_quantity,
            ProductField::ReleaseDate => &mut self.release_date,
            ProductField::Image => return false,
        };
        *slot = value.into();
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatSender {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    Outgoing,
    Incoming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: ChatSender,
    pub direction: MessageDirection,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn from_user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: ChatSender::User,
            direction: MessageDirection::Outgoing,
            sent_at: Utc::now(),
        }
    }

    pub fn from_assistant(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: ChatSender::Assistant,
            direction: MessageDirection::Incoming,
            sent_at: Utc::now(),
        }
    }
}
