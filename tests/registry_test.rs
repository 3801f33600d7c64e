//! Integration tests for the model registry and model listing.

use bedrock_modality::mocks::{MockTransport, RecordedCall};
use bedrock_modality::{
    registry, BedrockClient, BedrockClientImpl, BedrockConfig, Capability, ErrorKind,
    ModelFamily, ModelLifecycleStatus,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use test_case::test_case;

const LISTING: &str = r#"{
    "modelSummaries": [
        {
            "modelArn": "arn:aws:bedrock:eu-west-1::foundation-model/anthropic.claude-3-haiku-20240307-v1:0",
            "modelId": "anthropic.claude-3-haiku-20240307-v1:0",
            "modelName": "Claude 3 Haiku",
            "providerName": "Anthropic",
            "responseStreamingSupported": true,
            "modelLifecycle": {"status": "ACTIVE"}
        },
        {
            "modelArn": "arn:aws:bedrock:eu-west-1::foundation-model/mistral.mistral-7b-instruct-v0:2",
            "modelId": "mistral.mistral-7b-instruct-v0:2",
            "modelName": "Mistral 7B Instruct",
            "providerName": "Mistral AI",
            "modelLifecycle": {"status": "Legacy"}
        }
    ]
}"#;

fn create_test_client(transport: Arc<MockTransport>, region: &str) -> BedrockClientImpl {
    let config = BedrockConfig::builder().region(region).build().unwrap();
    BedrockClientImpl::new(config, transport)
}

#[tokio::test]
async fn test_list_models_marks_registered_entries() {
    let transport = Arc::new(MockTransport::with_responses(vec![LISTING]));
    let client = create_test_client(transport.clone(), "eu-west-1");

    let models = client.list_models().await.unwrap();
    assert_eq!(models.len(), 2);

    assert_eq!(models[0].model_id, "anthropic.claude-3-haiku-20240307-v1:0");
    assert_eq!(models[0].provider_name, "Anthropic");
    assert_eq!(models[0].lifecycle, ModelLifecycleStatus::Active);
    assert!(models[0].response_streaming_supported);
    assert!(models[0].registered);

    assert_eq!(models[1].lifecycle, ModelLifecycleStatus::Legacy);
    assert!(!models[1].response_streaming_supported);
    assert!(!models[1].registered);

    assert_eq!(
        transport.last_request(),
        Some(RecordedCall::ListFoundationModels {
            region: "eu-west-1".to_string()
        })
    );
}

#[test_case(r#"{}"#, ErrorKind::InvalidSdkResponse; "no summaries")]
#[test_case(r#"{"modelSummaries":[{"modelId":"x","modelName":"X","providerName":"P","modelLifecycle":{"status":"ACTIVE"}}]}"#, ErrorKind::NotFound; "missing arn")]
#[test_case(r#"{"modelSummaries":[{"modelArn":"a","modelId":"x","modelName":"X","providerName":"P","modelLifecycle":{"status":"RETIRED"}}]}"#, ErrorKind::NotSupported; "unknown lifecycle")]
#[test_case(r#"[1, 2]"#, ErrorKind::DecodingError; "not an object")]
#[tokio::test]
async fn test_list_models_rejects_bad_listing(body: &'static str, kind: ErrorKind) {
    let transport = Arc::new(MockTransport::with_responses(vec![body]));
    let client = create_test_client(transport, "us-east-1");

    let err = client.list_models().await.unwrap_err();
    assert_eq!(err.kind(), kind, "{}", err);
}

#[test_case("amazon.titan-text-premier-v1:0", ModelFamily::Titan; "titan premier")]
#[test_case("amazon.nova-pro-v1:0", ModelFamily::Nova; "nova pro")]
#[test_case("amazon.nova-canvas-v1:0", ModelFamily::Nova; "nova canvas")]
#[test_case("anthropic.claude-instant-v1", ModelFamily::Claude; "claude instant")]
#[test_case("us.meta.llama3-3-70b-instruct-v1:0", ModelFamily::Llama; "llama 3.3")]
fn test_lookup_family(model_id: &str, family: ModelFamily) {
    assert_eq!(registry().lookup(model_id).unwrap().family(), family);
}

#[test]
fn test_lookup_is_exact() {
    for id in [
        "amazon.titan-text-express",
        "AMAZON.TITAN-TEXT-EXPRESS-V1",
        " amazon.titan-text-express-v1",
        "",
    ] {
        let err = registry().lookup(id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

#[test]
fn test_capabilities_follow_modalities() {
    for model in registry().iter() {
        assert_eq!(
            model.has_capability(Capability::TextGeneration),
            model.text_modality().is_ok(),
            "{}",
            model.id()
        );
        assert_eq!(
            model.has_capability(Capability::Converse),
            model.converse_modality().is_ok(),
            "{}",
            model.id()
        );
        assert_eq!(
            model.has_capability(Capability::TextToImage),
            model.text_to_image_modality().is_ok(),
            "{}",
            model.id()
        );
        if model.has_capability(Capability::ToolUse) || model.has_capability(Capability::Vision) {
            assert!(model.has_capability(Capability::Converse), "{}", model.id());
        }
    }
}

#[test]
fn test_image_models_have_no_text_capabilities() {
    let image_models: Vec<&str> = registry()
        .with_capability(Capability::TextToImage)
        .map(|m| m.id())
        .collect();
    assert_eq!(image_models.len(), 3);

    for id in image_models {
        let model = registry().lookup(id).unwrap();
        assert!(model.has_capability(Capability::ImageVariation));
        assert!(!model.has_capability(Capability::Converse));
        let err = model.require(Capability::TextGeneration).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidModality);
    }
}

#[test]
fn test_tool_use_models() {
    assert!(registry().has_capability("anthropic.claude-3-haiku-20240307-v1:0", Capability::ToolUse));
    assert!(registry().has_capability("amazon.nova-micro-v1:0", Capability::ToolUse));
    assert!(!registry().has_capability("anthropic.claude-v2", Capability::ToolUse));
    assert!(!registry().has_capability("amazon.titan-text-lite-v1", Capability::ToolUse));
    assert!(!registry().has_capability("meta.llama3-8b-instruct-v1:0", Capability::ToolUse));
    assert!(!registry().has_capability("unknown-model", Capability::ToolUse));
}
