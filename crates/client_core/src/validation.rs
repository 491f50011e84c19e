use shared::{
    domain::{Category, ProductDraft, ProductField},
    error::FieldErrors,
};

use crate::image::{ImageSelection, UserFile};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const ACCEPTED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

pub const INVALID_IMAGE_TYPE: &str = "Please select a valid image file (JPEG or PNG)";
pub const IMAGE_TOO_LARGE: &str = "Image size should be less than 5MB";

/// Checks an uploaded file against the accepted types and size limit.
pub fn image_file_error(file: &UserFile) -> Option<&'static str> {
    if !ACCEPTED_IMAGE_TYPES.contains(&file.mime_type.as_str()) {
        Some(INVALID_IMAGE_TYPE)
    } else if file.size() > MAX_IMAGE_BYTES {
        Some(IMAGE_TOO_LARGE)
    } else {
        None
    }
}

/// Every problem that keeps the draft from being submitted. Empty iff the
/// form is submittable.
pub fn validate(draft: &ProductDraft, image: &ImageSelection) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if draft.name.trim().is_empty() {
        errors.insert(ProductField::Name, "Product name is required");
    }
    if draft.brand.trim().is_empty() {
        errors.insert(ProductField::Brand, "Brand is required");
    }

    if let Some(message) = price_error(&draft.price) {
        errors.insert(ProductField::Price, message);
    }

    // Category, price and stock are submitted as held; padded text is invalid.
    if draft.category.trim().is_empty() {
        errors.insert(ProductField::Category, "Please select a category");
    } else if draft.category.parse::<Category>().is_err() {
        errors.insert(ProductField::Category, "Please select a valid category");
    }

    if let Some(message) = stock_error(&draft.stock_quantity) {
        errors.insert(ProductField::StockQuantity, message);
    }

    if draft.release_date.trim().is_empty() {
        errors.insert(ProductField::ReleaseDate, "Release date is required");
    }

    // Generated images come from the backend and are always accepted.
    if let Some(message) = image.user_file().and_then(image_file_error) {
        errors.insert(ProductField::Image, message);
    }

    errors
}

fn price_error(raw: &str) -> Option<&'static str> {
    if raw.trim().is_empty() {
        return Some("Price is required");
    }
    match raw.parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => None,
        _ => Some("Price must be greater than zero"),
    }
}

fn stock_error(raw: &str) -> Option<&'static str> {
    if raw.trim().is_empty() {
        return Some("Stock quantity is required");
    }
    match raw.parse::<i64>() {
        Ok(quantity) if quantity < 0 => Some("Stock quantity cannot be negative"),
        Ok(_) => None,
        Err(_) => Some("Stock quantity must be a whole number"),
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
