//! Static model registry.
//!
//! Maps Bedrock model ids to descriptors carrying the adapters that
//! implement each capability. The table is built once on first use and never
//! changes; several ids share an adapter type but keep their own parameters.

use crate::error::ModelError;
use crate::services::{
    claude, llama, nova, titan, AnthropicText, ConverseFeature, ConverseModality,
    ImageVariationModality, LlamaText, NovaText, TextModality, TextToImageModality, TitanImage,
    TitanText,
};
use crate::types::ModelFamily;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A capability a model may or may not offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    TextGeneration,
    Converse,
    /// Metadata only: no streaming call exists.
    ConverseStreaming,
    TextToImage,
    ImageVariation,
    ToolUse,
    Vision,
    Document,
    Video,
}

impl Capability {
    pub const ALL: [Capability; 9] = [
        Capability::TextGeneration,
        Capability::Converse,
        Capability::ConverseStreaming,
        Capability::TextToImage,
        Capability::ImageVariation,
        Capability::ToolUse,
        Capability::Vision,
        Capability::Document,
        Capability::Video,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::TextGeneration => "text generation",
            Capability::Converse => "converse",
            Capability::ConverseStreaming => "converse streaming",
            Capability::TextToImage => "text to image",
            Capability::ImageVariation => "image variation",
            Capability::ToolUse => "tool use",
            Capability::Vision => "vision",
            Capability::Document => "documents",
            Capability::Video => "video",
        }
    }

    fn feature(&self) -> Option<ConverseFeature> {
        match self {
            Capability::ToolUse => Some(ConverseFeature::ToolUse),
            Capability::Vision => Some(ConverseFeature::Vision),
            Capability::Document => Some(ConverseFeature::Document),
            Capability::Video => Some(ConverseFeature::Video),
            _ => None,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered model and its adapters.
#[derive(Clone)]
pub struct ModelDescriptor {
    id: &'static str,
    display_name: &'static str,
    family: ModelFamily,
    streaming: bool,
    text: Option<Arc<dyn TextModality>>,
    converse: Option<Arc<dyn ConverseModality>>,
    text_to_image: Option<Arc<dyn TextToImageModality>>,
    image_variation: Option<Arc<dyn ImageVariationModality>>,
}

impl ModelDescriptor {
    fn new(id: &'static str, display_name: &'static str, family: ModelFamily) -> Self {
        Self {
            id,
            display_name,
            family,
            streaming: false,
            text: None,
            converse: None,
            text_to_image: None,
            image_variation: None,
        }
    }

    /// Registers one adapter for both text completion and converse.
    fn chat<M>(mut self, adapter: M) -> Self
    where
        M: TextModality + ConverseModality + 'static,
    {
        let adapter = Arc::new(adapter);
        self.text = Some(adapter.clone());
        self.converse = Some(adapter);
        self.streaming = true;
        self
    }

    /// Registers one adapter for text-to-image and variation.
    fn image<M>(mut self, adapter: M) -> Self
    where
        M: TextToImageModality + ImageVariationModality + 'static,
    {
        let adapter = Arc::new(adapter);
        self.text_to_image = Some(adapter.clone());
        self.image_variation = Some(adapter);
        self
    }

    pub fn id(&self) -> &str {
        self.id
    }

    pub fn display_name(&self) -> &str {
        self.display_name
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    /// True when the capability is backed by an adapter.
    pub fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::TextGeneration => self.text.is_some(),
            Capability::Converse => self.converse.is_some(),
            Capability::ConverseStreaming => self.streaming && self.converse.is_some(),
            Capability::TextToImage => self.text_to_image.is_some(),
            Capability::ImageVariation => self.image_variation.is_some(),
            Capability::ToolUse | Capability::Vision | Capability::Document | Capability::Video => {
                match (&self.converse, capability.feature()) {
                    (Some(converse), Some(feature)) => converse.supports(feature),
                    _ => false,
                }
            }
        }
    }

    /// Capability set, derived from the adapters.
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .iter()
            .copied()
            .filter(|c| self.has_capability(*c))
            .collect()
    }

    /// Name of the first adapter, used in error messages.
    pub fn modality_name(&self) -> &str {
        if let Some(text) = &self.text {
            text.name()
        } else if let Some(image) = &self.text_to_image {
            image.name()
        } else if let Some(converse) = &self.converse {
            converse.name()
        } else {
            self.display_name
        }
    }

    pub fn text_modality(&self) -> Result<&dyn TextModality, ModelError> {
        self.text
            .as_deref()
            .ok_or_else(|| self.missing(Capability::TextGeneration))
    }

    pub fn converse_modality(&self) -> Result<&dyn ConverseModality, ModelError> {
        self.converse
            .as_deref()
            .ok_or_else(|| self.missing(Capability::Converse))
    }

    pub fn text_to_image_modality(&self) -> Result<&dyn TextToImageModality, ModelError> {
        self.text_to_image
            .as_deref()
            .ok_or_else(|| self.missing(Capability::TextToImage))
    }

    pub fn image_variation_modality(&self) -> Result<&dyn ImageVariationModality, ModelError> {
        self.image_variation
            .as_deref()
            .ok_or_else(|| self.missing(Capability::ImageVariation))
    }

    /// Fails with `InvalidModality` unless the capability is present.
    pub fn require(&self, capability: Capability) -> Result<(), ModelError> {
        if self.has_capability(capability) {
            Ok(())
        } else {
            Err(self.missing(capability))
        }
    }

    fn missing(&self, capability: Capability) -> ModelError {
        ModelError::InvalidModality {
            model_id: self.id.to_string(),
            modality: self.modality_name().to_string(),
            capability: capability.to_string(),
            message: format!("{} does not support {}", self.display_name, capability),
        }
    }
}

impl fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("family", &self.family)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

/// Immutable id → descriptor table.
#[derive(Debug)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ModelRegistry {
    fn from_descriptors(models: Vec<ModelDescriptor>) -> Self {
        let index = models
            .iter()
            .enumerate()
            .map(|(position, model)| (model.id, position))
            .collect();
        Self { models, index }
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, model_id: &str) -> Result<&ModelDescriptor, ModelError> {
        self.index
            .get(model_id)
            .map(|&position| &self.models[position])
            .ok_or_else(|| ModelError::NotFound {
                model_id: model_id.to_string(),
            })
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.index.contains_key(model_id)
    }

    /// False for unknown ids.
    pub fn has_capability(&self, model_id: &str, capability: Capability) -> bool {
        self.lookup(model_id)
            .map(|model| model.has_capability(capability))
            .unwrap_or(false)
    }

    /// Registered ids in table order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.models.iter().map(|model| model.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> + '_ {
        self.models.iter()
    }

    pub fn by_family(&self, family: ModelFamily) -> impl Iterator<Item = &ModelDescriptor> + '_ {
        self.models.iter().filter(move |model| model.family == family)
    }

    pub fn with_capability(
        &self,
        capability: Capability,
    ) -> impl Iterator<Item = &ModelDescriptor> + '_ {
        self.models
            .iter()
            .filter(move |model| model.has_capability(capability))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

static REGISTRY: Lazy<ModelRegistry> = Lazy::new(|| ModelRegistry::from_descriptors(builtin_models()));

/// The process-wide registry.
pub fn registry() -> &'static ModelRegistry {
    &REGISTRY
}

fn titan_text(id: &'static str, name: &'static str, max_tokens: u32) -> ModelDescriptor {
    ModelDescriptor::new(id, name, ModelFamily::Titan)
        .chat(TitanText::new(name, titan::text_parameters(max_tokens)))
}

fn titan_image(id: &'static str, name: &'static str, family: ModelFamily) -> ModelDescriptor {
    ModelDescriptor::new(id, name, family).image(TitanImage::new(name, titan::image_parameters()))
}

fn claude(id: &'static str, name: &'static str, max_tokens: u32) -> ModelDescriptor {
    ModelDescriptor::new(id, name, ModelFamily::Claude)
        .chat(AnthropicText::new(name, claude::text_parameters(Some(max_tokens))))
}

fn claude_legacy(id: &'static str, name: &'static str) -> ModelDescriptor {
    ModelDescriptor::new(id, name, ModelFamily::Claude)
        .chat(AnthropicText::legacy(name, claude::text_parameters(None)))
}

fn llama(id: &'static str, name: &'static str) -> ModelDescriptor {
    ModelDescriptor::new(id, name, ModelFamily::Llama)
        .chat(LlamaText::new(name, llama::text_parameters()))
}

fn builtin_models() -> Vec<ModelDescriptor> {
    vec![
        // Amazon Titan
        titan_text("amazon.titan-text-premier-v1:0", "Titan Text Premier", 3072),
        titan_text("amazon.titan-text-express-v1", "Titan Text Express", 8192),
        titan_text("amazon.titan-text-lite-v1", "Titan Text Lite", 4096),
        titan_image(
            "amazon.titan-image-generator-v1",
            "Titan Image Generator",
            ModelFamily::Titan,
        ),
        titan_image(
            "amazon.titan-image-generator-v2:0",
            "Titan Image Generator V2",
            ModelFamily::Titan,
        ),
        // Amazon Nova
        titan_image("amazon.nova-canvas-v1:0", "Nova Canvas", ModelFamily::Nova),
        ModelDescriptor::new("amazon.nova-micro-v1:0", "Nova Micro", ModelFamily::Nova)
            .chat(NovaText::micro("Nova Micro", nova::text_parameters())),
        ModelDescriptor::new("amazon.nova-lite-v1:0", "Nova Lite", ModelFamily::Nova)
            .chat(NovaText::multimodal("Nova Lite", nova::text_parameters())),
        ModelDescriptor::new("amazon.nova-pro-v1:0", "Nova Pro", ModelFamily::Nova)
            .chat(NovaText::multimodal("Nova Pro", nova::text_parameters())),
        // Anthropic
        claude_legacy("anthropic.claude-instant-v1", "Claude Instant"),
        claude_legacy("anthropic.claude-v2", "Claude V2"),
        claude_legacy("anthropic.claude-v2:1", "Claude V2.1"),
        claude("anthropic.claude-3-haiku-20240307-v1:0", "Claude 3 Haiku", 4096),
        claude("us.anthropic.claude-3-opus-20240229-v1:0", "Claude 3 Opus", 4096),
        claude("us.anthropic.claude-3-5-haiku-20241022-v1:0", "Claude 3.5 Haiku", 8192),
        claude("us.anthropic.claude-3-5-sonnet-20240620-v1:0", "Claude 3.5 Sonnet", 8192),
        claude("us.anthropic.claude-3-5-sonnet-20241022-v2:0", "Claude 3.5 Sonnet V2", 8192),
        claude("us.anthropic.claude-3-7-sonnet-20250219-v1:0", "Claude 3.7 Sonnet", 8192),
        // Meta
        llama("meta.llama3-8b-instruct-v1:0", "Llama 3 8B Instruct"),
        llama("meta.llama3-70b-instruct-v1:0", "Llama 3 70B Instruct"),
        llama("us.meta.llama3-1-8b-instruct-v1:0", "Llama 3.1 8B Instruct"),
        llama("us.meta.llama3-1-70b-instruct-v1:0", "Llama 3.1 70B Instruct"),
        llama("us.meta.llama3-2-1b-instruct-v1:0", "Llama 3.2 1B Instruct"),
        llama("us.meta.llama3-2-3b-instruct-v1:0", "Llama 3.2 3B Instruct"),
        llama("us.meta.llama3-3-70b-instruct-v1:0", "Llama 3.3 70B Instruct"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::error::BedrockError;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<&str> = registry().ids().collect();
        assert_eq!(ids.len(), registry().len());
    }

    #[test]
    fn test_lookup_is_exact() {
        assert!(registry().lookup("amazon.titan-text-express-v1").is_ok());

        let err = registry()
            .lookup("AMAZON.TITAN-TEXT-EXPRESS-V1")
            .unwrap_err();
        assert_eq!(BedrockError::from(err).kind(), ErrorKind::NotFound);
        assert!(!registry().has_capability("unknown-model", Capability::TextGeneration));
    }

    #[test]
    fn test_capabilities_follow_adapters() {
        let titan = registry().lookup("amazon.titan-text-express-v1").unwrap();
        assert_eq!(
            titan.capabilities(),
            vec![
                Capability::TextGeneration,
                Capability::Converse,
                Capability::ConverseStreaming,
                Capability::Document,
            ]
        );

        let canvas = registry().lookup("amazon.nova-canvas-v1:0").unwrap();
        assert_eq!(
            canvas.capabilities(),
            vec![Capability::TextToImage, Capability::ImageVariation]
        );
        assert_eq!(canvas.family(), ModelFamily::Nova);

        let lite = registry().lookup("amazon.nova-lite-v1:0").unwrap();
        assert!(lite.has_capability(Capability::Video));
        assert!(lite.has_capability(Capability::Vision));
    }

    #[test]
    fn test_missing_modality_error() {
        let image = registry().lookup("amazon.titan-image-generator-v1").unwrap();
        let err = image.text_modality().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidModality);
        assert!(err.to_string().contains("text generation"));
    }

    #[test]
    fn test_aliases_keep_their_own_parameters() {
        let haiku = registry()
            .lookup("anthropic.claude-3-haiku-20240307-v1:0")
            .unwrap()
            .text_modality()
            .unwrap();
        let sonnet = registry()
            .lookup("us.anthropic.claude-3-7-sonnet-20250219-v1:0")
            .unwrap()
            .text_modality()
            .unwrap();
        assert_eq!(haiku.text_parameters().max_tokens.maximum(), Some(4096));
        assert_eq!(sonnet.text_parameters().max_tokens.maximum(), Some(8192));
    }

    #[test]
    fn test_listing_helpers() {
        assert_eq!(registry().by_family(ModelFamily::Llama).count(), 7);
        assert!(registry()
            .with_capability(Capability::ToolUse)
            .all(|m| m.has_capability(Capability::Converse)));
        assert_eq!(registry().with_capability(Capability::Video).count(), 2);
    }
}
