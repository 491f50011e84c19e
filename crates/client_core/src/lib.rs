use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder, Response,
};
use shared::{
    domain::ProductDraft,
    protocol::{
        ChatAskResponse, CreatedProduct, GeneratedProduct, IMAGE_PART, PRODUCT_PART,
    },
};
use tracing::{debug, warn};

pub mod chat;
pub mod config;
pub mod error;
pub mod form;
pub mod image;
pub mod validation;

pub use chat::{ChatSession, SendOutcome};
pub use config::{load_settings, ClientSettings};
pub use error::{ApiError, ClientError};
pub use form::{FormController, FormEvent, Notice, NoticeLevel, SubmissionState, SubmitOutcome};
pub use image::{GeneratedImage, ImageSelection, PreviewHandle, UserFile};

/// File part of a product submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePart {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Multipart payload for `POST /api/product`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSubmission {
    pub image: Option<ImagePart>,
    pub product: ProductDraft,
}

/// Backend calls made by the form and chat controllers.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    async fn create_product(&self, submission: ProductSubmission)
        -> Result<CreatedProduct, ApiError>;
    async fn generate_description(&self, name: &str, category: &str) -> Result<String, ApiError>;
    async fn generate_image(
        &self,
        name: &str,
        category: &str,
        description: &str,
    ) -> Result<Vec<u8>, ApiError>;
    async fn generate_product(&self, query: &str) -> Result<GeneratedProduct, ApiError>;
    async fn ask(&self, message: &str) -> Result<String, ApiError>;
}

pub struct HttpStorefrontApi {
    http: Client,
    base_url: String,
}

impl HttpStorefrontApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        let base_url = config::normalize_base_url(&settings.base_url)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .build()
            .map_err(|e| ClientError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn execute(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => {
                warn!(error = %err, status = status.as_u16(), "failed to read error body");
                Vec::new()
            }
        };
        Err(ApiError::status(status.as_u16(), body))
    }
}

#[async_trait]
impl StorefrontApi for HttpStorefrontApi {
    async fn create_product(
        &self,
        submission: ProductSubmission,
    ) -> Result<CreatedProduct, ApiError> {
        let product_json =
            serde_json::to_vec(&submission.product).map_err(|e| ApiError::Encode(e.to_string()))?;

        let mut form = Form::new();
        if let Some(image) = submission.image {
            let part = Part::bytes(image.bytes)
                .file_name(image.filename)
                .mime_str(&image.mime_type)
                .map_err(|e| ApiError::Encode(e.to_string()))?;
            form = form.part(IMAGE_PART, part);
        }
        let product_part = Part::bytes(product_json)
            .mime_str("application/json")
            .map_err(|e| ApiError::Encode(e.to_string()))?;
        form = form.part(PRODUCT_PART, product_part);

        debug!(base_url = %self.base_url, "posting product submission");
        let response =
            Self::execute(self.http.post(self.endpoint("/api/product")).multipart(form)).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if body.is_empty() {
            return Ok(CreatedProduct::default());
        }
        match serde_json::from_slice::<CreatedProduct>(&body) {
            Ok(created) => Ok(created),
            Err(err) => {
                // The product is stored either way; an odd echo is not a failure.
                warn!(error = %err, "product created but response body was not a product");
                Ok(CreatedProduct::default())
            }
        }
    }

    async fn generate_description(&self, name: &str, category: &str) -> Result<String, ApiError> {
        let response = Self::execute(
            self.http
                .post(self.endpoint("/api/product/generate-description"))
                .query(&[("name", name), ("category", category)]),
        )
        .await?;
        response
            .text()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn generate_image(
        &self,
        name: &str,
        category: &str,
        description: &str,
    ) -> Result<Vec<u8>, ApiError> {
        let response = Self::execute(
            self.http
                .post(self.endpoint("/api/product/generate-image"))
                .query(&[
                    ("name", name),
                    ("category", category),
                    ("description", description),
                ]),
        )
        .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn generate_product(&self, query: &str) -> Result<GeneratedProduct, ApiError> {
        let response = Self::execute(
            self.http
                .post(self.endpoint("/api/product/generate-product"))
                .query(&[("query", query)]),
        )
        .await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn ask(&self, message: &str) -> Result<String, ApiError> {
        let response = Self::execute(
            self.http
                .get(self.endpoint("/api/chat/ask"))
                .query(&[("message", message)]),
        )
        .await?;
        let body: ChatAskResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(body.response)
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
