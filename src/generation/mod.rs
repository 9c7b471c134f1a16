//! Editor-facing generation operations.
//!
//! Every call goes through the shared [`Dispatcher`]; image operations use the
//! configured image model and land on the image lane, analysis and the
//! connection probe use the text model.

pub mod payload;

use crate::decode::{ResourceHandle, ResourceRegistry, decode_image, extract_text};
use crate::dispatch::Dispatcher;
use crate::error::DispatchError;
use crate::types::{FrameLayout, GenerateContentRequest, ImageAsset, ImageSize};

/// Frame generation, editing, refinement and asset analysis.
#[derive(Debug, Clone)]
pub struct GenerationService {
    dispatcher: Dispatcher,
    registry: ResourceRegistry,
}

impl GenerationService {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            registry: ResourceRegistry::new(),
        }
    }

    /// Share a registry with other parts of the host.
    pub fn with_registry(mut self, registry: ResourceRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Generate a frame from a prompt and optional reference images.
    pub async fn generate_frame(
        &self,
        prompt: &str,
        references: &[ImageAsset],
        layout: &FrameLayout,
    ) -> Result<Option<ResourceHandle>, DispatchError> {
        let request = payload::frame_request(prompt, references, layout)?;
        self.run_image(request).await
    }

    /// Edit an existing frame, optionally restricted to a mask.
    pub async fn edit_frame(
        &self,
        image: &ImageAsset,
        instruction: &str,
        mask: Option<&ImageAsset>,
    ) -> Result<Option<ResourceHandle>, DispatchError> {
        let request = payload::edit_request(image, instruction, mask)?;
        self.run_image(request).await
    }

    /// Re-render a frame at `target` resolution, keeping characters consistent.
    pub async fn refine_clarity(
        &self,
        image: &ImageAsset,
        characters: &[ImageAsset],
        target: ImageSize,
    ) -> Result<Option<ResourceHandle>, DispatchError> {
        self.run_image(payload::refine_request(image, characters, target))
            .await
    }

    /// Short text description of an asset.
    pub async fn analyze_asset(&self, image: &ImageAsset) -> Result<String, DispatchError> {
        let model = self.dispatcher.resolve_config().await.text_model;
        let response = self
            .dispatcher
            .generate_content(&model, &payload::analyze_request(image))
            .await?;
        Ok(extract_text(&response))
    }

    /// Minimal text call against the configured endpoint.
    ///
    /// `Ok(true)` when the upstream answers; failures are returned as errors so
    /// the caller can tell a bad key from an unreachable host.
    pub async fn test_connection(&self) -> Result<bool, DispatchError> {
        let model = self.dispatcher.resolve_config().await.text_model;
        self.dispatcher
            .generate_content(&model, &payload::connection_probe())
            .await?;
        tracing::info!(model = %model, "Connection test succeeded");
        Ok(true)
    }

    async fn run_image(
        &self,
        request: GenerateContentRequest,
    ) -> Result<Option<ResourceHandle>, DispatchError> {
        let model = self.dispatcher.resolve_config().await.image_model;
        let response = self.dispatcher.generate_content(&model, &request).await?;
        let handle = decode_image(&response, &self.registry)?;
        if handle.is_none() {
            tracing::warn!(model = %model, "Image request returned no image");
        }
        Ok(handle)
    }
}
