use std::sync::Mutex;

use async_trait::async_trait;
use shared::protocol::{CreatedProduct, GeneratedProduct};

use crate::{ApiError, ProductSubmission, StorefrontApi};

/// In-memory backend returning canned results and recording every call.
pub struct ScriptedApi {
    pub create: Result<CreatedProduct, ApiError>,
    pub description: Result<String, ApiError>,
    pub image: Result<Vec<u8>, ApiError>,
    pub product: Result<GeneratedProduct, ApiError>,
    pub ask: Result<String, ApiError>,
    pub calls: Mutex<Vec<String>>,
    pub submissions: Mutex<Vec<ProductSubmission>>,
}

impl Default for ScriptedApi {
    fn default() -> Self {
        let unscripted = || ApiError::Transport("not scripted".into());
        Self {
            create: Err(unscripted()),
            description: Err(unscripted()),
            image: Err(unscripted()),
            product: Err(unscripted()),
            ask: Err(unscripted()),
            calls: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedApi {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn submissions(&self) -> Vec<ProductSubmission> {
        self.submissions.lock().expect("submissions lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl StorefrontApi for ScriptedApi {
    async fn create_product(
        &self,
        submission: ProductSubmission,
    ) -> Result<CreatedProduct, ApiError> {
        self.record("create_product".into());
        self.submissions
            .lock()
            .expect("submissions lock")
            .push(submission);
        self.create.clone()
    }

    async fn generate_description(&self, name: &str, category: &str) -> Result<String, ApiError> {
        self.record(format!("generate_description:{name}:{category}"));
        self.description.clone()
    }

    async fn generate_image(
        &self,
        name: &str,
        category: &str,
        description: &str,
    ) -> Result<Vec<u8>, ApiError> {
        self.record(format!("generate_image:{name}:{category}:{description}"));
        self.image.clone()
    }

    async fn generate_product(&self, query: &str) -> Result<GeneratedProduct, ApiError> {
        self.record(format!("generate_product:{query}"));
        self.product.clone()
    }

    async fn ask(&self, message: &str) -> Result<String, ApiError> {
        self.record(format!("ask:{message}"));
        self.ask.clone()
    }
}
