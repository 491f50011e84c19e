//! Product form controller: owns the draft, the image selection and the
//! per-field errors, and drives the AI helpers and the final submission.
//!
//! Each backend action is split into `begin_*` (checks preconditions, raises
//! the busy flag, hands out a request ticket) and `complete_*` (applies the
//! result). The async wrappers simply run both around the API call, while a
//! host with its own event loop can run the request elsewhere and feed the
//! result back.

use shared::{
    domain::{ProductDraft, ProductField},
    error::FieldErrors,
    protocol::{CreatedProduct, GeneratedProduct},
};
use tracing::{debug, info, warn};

use crate::{
    error::ApiError,
    image::{GeneratedImage, ImageSelection, UserFile},
    validation, ProductSubmission, StorefrontApi,
};

pub const DESCRIPTION_PRECONDITION: &str = "Please enter product name and select a category first";
pub const IMAGE_PRECONDITION: &str = "Please enter product name, category, and description first";
pub const PROMPT_PRECONDITION: &str = "Please enter a product description";
pub const DESCRIPTION_FAILURE: &str = "Failed to generate description. Please try again.";
pub const IMAGE_FAILURE: &str = "Failed to generate image. Please try again.";
pub const PRODUCT_FAILURE: &str = "Error generating product. Please try again.";
pub const SUBMIT_FAILURE: &str = "Error adding product";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Transient, toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Notice(Notice),
    NavigateToListing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Local validation failed; errors are on the controller.
    Invalid,
    /// A submission is already waiting on the backend.
    InFlight,
    Created(CreatedProduct),
    Failed,
}

/// How a single input should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus<'a> {
    Unchecked,
    Valid,
    Invalid(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionRequest {
    generation: u64,
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    generation: u64,
    pub name: String,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRequest {
    generation: u64,
    pub query: String,
}

/// Per-target counters; a response whose ticket no longer matches was
/// overtaken by a newer request or a user edit and is dropped.
#[derive(Debug, Default)]
struct Generations {
    description: u64,
    image: u64,
    draft: u64,
}

#[derive(Debug, Default)]
pub struct FormController {
    draft: ProductDraft,
    image: ImageSelection,
    errors: FieldErrors,
    touched: bool,
    submission: SubmissionState,
    generating_description: bool,
    generating_image: bool,
    generating_product: bool,
    composer_open: bool,
    prompt: String,
    generations: Generations,
    events: Vec<FormEvent>,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    pub fn image(&self) -> &ImageSelection {
        &self.image
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.submission
    }

    /// Submit button busy flag. Stays raised after success because the view
    /// navigates away.
    pub fn is_submitting(&self) -> bool {
        matches!(
            self.submission,
            SubmissionState::Submitting | SubmissionState::Succeeded
        )
    }

    pub fn is_generating_description(&self) -> bool {
        self.generating_description
    }

    pub fn is_generating_image(&self) -> bool {
        self.generating_image
    }

    pub fn is_generating_product(&self) -> bool {
        self.generating_product
    }

    pub fn is_composer_open(&self) -> bool {
        self.composer_open
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn events(&self) -> &[FormEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<FormEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn field_status(&self, field: ProductField) -> FieldStatus<'_> {
        if !self.touched {
            return FieldStatus::Unchecked;
        }
        match self.errors.get(field) {
            Some(message) => FieldStatus::Invalid(message),
            None => FieldStatus::Valid,
        }
    }

    pub fn update_field(&mut self, field: ProductField, value: impl Into<String>) {
        if !self.draft.set_field(field, value) {
            warn!(%field, "image is not a text field; use select_image");
            return;
        }
        self.errors.remove(field);
        if field == ProductField::Description {
            self.generations.description += 1;
        }
    }

    pub fn set_available(&mut self, available: bool) {
        self.draft.product_available = available;
    }

    /// An invalid file is still kept as the selection so the error stays
    /// attached to it until it is replaced.
    pub fn select_image(&mut self, file: Option<UserFile>) {
        self.generations.image += 1;
        match file {
            Some(file) => {
                match validation::image_file_error(&file) {
                    Some(message) => self.errors.insert(ProductField::Image, message),
                    None => {
                        self.errors.remove(ProductField::Image);
                    }
                }
                debug!(filename = %file.filename, size = file.size(), "image file selected");
                self.image = ImageSelection::UserFile(file);
            }
            None => {
                self.image = ImageSelection::None;
                self.errors.remove(ProductField::Image);
            }
        }
    }

    pub fn clear_image(&mut self) {
        self.select_image(None);
    }

    pub fn validate(&self) -> FieldErrors {
        validation::validate(&self.draft, &self.image)
    }

    pub fn can_generate_description(&self) -> bool {
        !self.draft.name.trim().is_empty() && !self.draft.category.trim().is_empty()
    }

    pub fn can_generate_image(&self) -> bool {
        self.can_generate_description() && !self.draft.description.trim().is_empty()
    }

    pub fn begin_generate_description(&mut self) -> Option<DescriptionRequest> {
        if !self.can_generate_description() {
            self.notify(NoticeLevel::Warning, DESCRIPTION_PRECONDITION);
            return None;
        }
        if self.generating_description {
            debug!("description generation already in flight");
            return None;
        }
        self.generating_description = true;
        self.generations.description += 1;
        Some(DescriptionRequest {
            generation: self.generations.description,
            name: self.draft.name.clone(),
            category: self.draft.category.clone(),
        })
    }

    pub fn complete_generate_description(
        &mut self,
        request: DescriptionRequest,
        result: Result<String, ApiError>,
    ) {
        self.generating_description = false;
        if request.generation != self.generations.description {
            debug!(name = %request.name, "discarding stale description response");
            return;
        }
        match result {
            Ok(description) if description.is_empty() => {
                debug!("backend returned an empty description");
            }
            Ok(description) => {
                self.draft.description = description;
                self.errors.remove(ProductField::Description);
                info!(name = %request.name, "description generated");
                self.notify(NoticeLevel::Success, "Description generated successfully!");
            }
            Err(err) => {
                warn!(error = %err, "description generation failed");
                let message = err
                    .server_message()
                    .map(|m| format!("Error: {m}"))
                    .unwrap_or_else(|| DESCRIPTION_FAILURE.to_string());
                self.notify(NoticeLevel::Error, message);
            }
        }
    }

    pub async fn generate_description<A>(&mut self, api: &A)
    where
        A: StorefrontApi + ?Sized,
    {
        let Some(request) = self.begin_generate_description() else {
            return;
        };
        let result = api
            .generate_description(&request.name, &request.category)
            .await;
        self.complete_generate_description(request, result);
    }

    pub fn begin_generate_image(&mut self) -> Option<ImageRequest> {
        if !self.can_generate_image() {
            self.notify(NoticeLevel::Warning, IMAGE_PRECONDITION);
            return None;
        }
        if self.generating_image {
            debug!("image generation already in flight");
            return None;
        }
        self.generating_image = true;
        self.generations.image += 1;
        Some(ImageRequest {
            generation: self.generations.image,
            name: self.draft.name.clone(),
            category: self.draft.category.clone(),
            description: self.draft.description.clone(),
        })
    }

    pub fn complete_generate_image(
        &mut self,
        request: ImageRequest,
        result: Result<Vec<u8>, ApiError>,
    ) {
        self.generating_image = false;
        if request.generation != self.generations.image {
            debug!(name = %request.name, "discarding stale image response");
            return;
        }
        match result {
            Ok(bytes) if bytes.is_empty() => {
                warn!("image generation returned no bytes");
                self.notify(NoticeLevel::Error, IMAGE_FAILURE);
            }
            Ok(bytes) => {
                info!(name = %request.name, size = bytes.len(), "image generated");
                self.image = ImageSelection::Generated(GeneratedImage::from_bytes(bytes));
                self.errors.remove(ProductField::Image);
                self.notify(NoticeLevel::Success, "Image generated successfully!");
            }
            Err(err) => {
                warn!(error = %err, "image generation failed");
                let message = err
                    .body_text()
                    .map(|m| format!("Error: {m}"))
                    .unwrap_or_else(|| IMAGE_FAILURE.to_string());
                self.notify(NoticeLevel::Error, message);
            }
        }
    }

    pub async fn generate_image<A>(&mut self, api: &A)
    where
        A: StorefrontApi + ?Sized,
    {
        let Some(request) = self.begin_generate_image() else {
            return;
        };
        let result = api
            .generate_image(&request.name, &request.category, &request.description)
            .await;
        self.complete_generate_image(request, result);
    }

    pub fn open_composer(&mut self) {
        self.composer_open = true;
    }

    /// Ignored while a product is being generated.
    pub fn close_composer(&mut self) {
        if self.generating_product {
            return;
        }
        self.composer_open = false;
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        if self.generating_product {
            return;
        }
        self.prompt = prompt.into();
    }

    pub fn begin_generate_full_product(&mut self) -> Option<ProductRequest> {
        if self.prompt.trim().is_empty() {
            self.notify(NoticeLevel::Warning, PROMPT_PRECONDITION);
            return None;
        }
        if self.generating_product {
            debug!("product generation already in flight");
            return None;
        }
        self.generating_product = true;
        self.generations.draft += 1;
        Some(ProductRequest {
            generation: self.generations.draft,
            query: self.prompt.clone(),
        })
    }

    pub fn complete_generate_full_product(
        &mut self,
        request: ProductRequest,
        result: Result<GeneratedProduct, ApiError>,
    ) {
        self.generating_product = false;
        if request.generation != self.generations.draft {
            debug!("discarding stale generated product");
            return;
        }
        match result {
            Ok(generated) => {
                self.draft = generated.into_draft();
                // Pending description and image were asked for the old draft.
                self.generations.description += 1;
                self.generations.image += 1;
                info!(name = %self.draft.name, "draft replaced by generated product");
                self.notify(NoticeLevel::Success, "Product generated successfully!");
                self.composer_open = false;
                self.prompt.clear();
            }
            Err(err) => {
                warn!(error = %err, "product generation failed");
                self.notify(NoticeLevel::Error, PRODUCT_FAILURE);
            }
        }
    }

    pub async fn generate_full_product<A>(&mut self, api: &A)
    where
        A: StorefrontApi + ?Sized,
    {
        let Some(request) = self.begin_generate_full_product() else {
            return;
        };
        let result = api.generate_product(&request.query).await;
        self.complete_generate_full_product(request, result);
    }

    /// Validates and, when clean, moves to `Submitting` and returns the
    /// payload to send.
    pub fn begin_submit(&mut self) -> Result<ProductSubmission, SubmitOutcome> {
        if self.submission == SubmissionState::Submitting {
            debug!("submission already in flight");
            return Err(SubmitOutcome::InFlight);
        }

        self.submission = SubmissionState::Validating;
        self.touched = true;
        self.errors = self.validate();
        if !self.errors.is_empty() {
            debug!(fields = ?self.errors.keys().collect::<Vec<_>>(), "submission rejected locally");
            self.submission = SubmissionState::Idle;
            return Err(SubmitOutcome::Invalid);
        }

        self.submission = SubmissionState::Submitting;
        Ok(ProductSubmission {
            image: self.image.to_part(),
            product: self.draft.clone(),
        })
    }

    pub fn complete_submit(&mut self, result: Result<CreatedProduct, ApiError>) -> SubmitOutcome {
        match result {
            Ok(created) => {
                info!(product_id = ?created.id, "product added");
                self.reset();
                self.submission = SubmissionState::Succeeded;
                self.notify(NoticeLevel::Success, "Product added successfully");
                self.events.push(FormEvent::NavigateToListing);
                SubmitOutcome::Created(created)
            }
            Err(err) => {
                warn!(error = %err, "product submission failed");
                self.submission = SubmissionState::Idle;
                match err.field_errors() {
                    Some(errors) => self.errors = errors,
                    None => self.notify(NoticeLevel::Error, SUBMIT_FAILURE),
                }
                SubmitOutcome::Failed
            }
        }
    }

    pub async fn submit<A>(&mut self, api: &A) -> SubmitOutcome
    where
        A: StorefrontApi + ?Sized,
    {
        let submission = match self.begin_submit() {
            Ok(submission) => submission,
            Err(outcome) => return outcome,
        };
        let result = api.create_product(submission).await;
        self.complete_submit(result)
    }

    fn reset(&mut self) {
        self.draft = ProductDraft::default();
        self.image = ImageSelection::None;
        self.errors = FieldErrors::new();
        self.touched = false;
        self.generations.description += 1;
        self.generations.image += 1;
        self.generations.draft += 1;
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.events.push(FormEvent::Notice(Notice {
            level,
            message: message.into(),
        }));
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
