//! Image-to-prompt derivation via a generative vision endpoint.
//!
//! [`PromptSession`] owns the two-field result state (an English
//! generation prompt and an Arabic explanation) and exposes the two
//! operations: [`derive`](PromptSession::derive) from an image, and
//! [`refine`](PromptSession::refine) with a free-text change request.
//! Both fields are always replaced together; a failed call leaves the
//! existing state untouched. `&mut self` on both operations means a second
//! call cannot start while one is outstanding on the same session.
//!
//! The endpoint is reached through the [`GenerativeClient`] trait: one
//! method taking {optional image, instruction text, expected field names}
//! and returning the raw text payload, which must parse as JSON carrying
//! exactly those two string fields. No automatic retries anywhere; a retry
//! is the caller invoking the same operation again.

use crate::error::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

/// Model used for both derivation and refinement.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const ENDPOINT_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// The two result fields, replaced together on every successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptState {
    pub english_prompt: String,
    pub arabic_explanation: String,
}

/// One structured-output request to the endpoint.
pub struct GenerationRequest<'a> {
    /// Image bytes and mime type, for the derivation call.
    pub image: Option<(&'a [u8], &'a str)>,
    pub instructions: String,
    /// Names of the two string fields the JSON reply must carry.
    pub response_fields: [&'static str; 2],
}

/// Capability to run one structured generation call.
pub trait GenerativeClient {
    /// Returns the model reply's raw text payload.
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String>;
}

/// Production client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Generation(e.to_string()))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Build a client from the `GEMINI_API_KEY` environment variable.
    ///
    /// A missing key means the external collaborator is unavailable, which
    /// is reported as such rather than as a generation failure.
    pub fn from_env() -> Result<Self> {
        match std::env::var("GEMINI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Self::new(key, DEFAULT_MODEL),
            _ => Err(Error::MissingCapability(
                "GEMINI_API_KEY is not set; export it to use the prompt tool".into(),
            )),
        }
    }
}

impl GenerativeClient for GeminiClient {
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        let mut parts = Vec::new();
        if let Some((bytes, mime)) = request.image {
            parts.push(json!({
                "inline_data": { "mime_type": mime, "data": BASE64.encode(bytes) }
            }));
        }
        parts.push(json!({ "text": request.instructions }));

        let mut properties = serde_json::Map::new();
        for field in request.response_fields {
            properties.insert(field.to_string(), json!({ "type": "STRING" }));
        }
        let payload = json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": properties,
                    "required": request.response_fields,
                },
            },
        });

        let url = format!(
            "{ENDPOINT_BASE}/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .map_err(|e| Error::Generation(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Generation(format!(
                "endpoint returned {}",
                response.status()
            )));
        }

        let reply: Value = response
            .json()
            .map_err(|e| Error::Generation(e.to_string()))?;
        let text = reply
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .unwrap_or("");
        if text.is_empty() {
            return Err(Error::Generation("empty reply from the model".into()));
        }
        Ok(text.to_string())
    }
}

/// Mime type for an image file name, by extension.
pub fn image_mime_type(name: &str) -> Option<&'static str> {
    let ext = std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

const DERIVE_INSTRUCTIONS: &str = "\
Analyze the provided image deeply.

Task 1: Generate a highly detailed English prompt suitable for AI image \
generators (Midjourney/Stable Diffusion). Include details about subject, \
lighting, camera, style, and atmosphere.
Task 2: Provide a clear explanation in ARABIC describing the image and the \
key elements captured in the prompt.

Return the result in JSON format.";

fn refine_instructions(english_prompt: &str, change_request: &str) -> String {
    format!(
        "Current Image Prompt (English):\n\"{english_prompt}\"\n\n\
         User Request for Modification (Arabic):\n\"{change_request}\"\n\n\
         Task:\n\
         1. Understand the user's Arabic request to modify the image.\n\
         2. Rewrite the English prompt to incorporate these changes naturally \
         while maintaining the original artistic style and technical details \
         (lighting, camera, etc.) unless the user asked to change them.\n\
         3. Provide an updated Arabic explanation of what changed.\n\n\
         Return the result in JSON format."
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeriveReply {
    english_prompt: String,
    arabic_explanation: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefineReply {
    new_english_prompt: String,
    new_arabic_explanation: String,
}

/// One derivation/refinement cycle over a single image.
pub struct PromptSession<C> {
    client: C,
    state: Option<PromptState>,
}

impl<C: GenerativeClient> PromptSession<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: None,
        }
    }

    pub fn state(&self) -> Option<&PromptState> {
        self.state.as_ref()
    }

    /// Derive the initial prompt pair from an image.
    pub fn derive(&mut self, image: &[u8], mime: &str) -> Result<&PromptState> {
        let text = self.client.generate(&GenerationRequest {
            image: Some((image, mime)),
            instructions: DERIVE_INSTRUCTIONS.to_string(),
            response_fields: ["englishPrompt", "arabicExplanation"],
        })?;
        let reply: DeriveReply = parse_reply(&text)?;
        Ok(self.state.insert(PromptState {
            english_prompt: reply.english_prompt,
            arabic_explanation: reply.arabic_explanation,
        }))
    }

    /// Apply a natural-language change request to the current prompt.
    ///
    /// The reply carries field names distinct from `derive`'s but replaces
    /// the same two state fields. Any failure leaves the state as it was.
    pub fn refine(&mut self, change_request: &str) -> Result<&PromptState> {
        let current = self
            .state
            .as_ref()
            .ok_or_else(|| Error::Generation("no prompt to refine yet".into()))?;
        let instructions = refine_instructions(&current.english_prompt, change_request);

        let text = self.client.generate(&GenerationRequest {
            image: None,
            instructions,
            response_fields: ["newEnglishPrompt", "newArabicExplanation"],
        })?;
        let reply: RefineReply = parse_reply(&text)?;
        Ok(self.state.insert(PromptState {
            english_prompt: reply.new_english_prompt,
            arabic_explanation: reply.new_arabic_explanation,
        }))
    }
}

fn parse_reply<T: serde::de::DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| Error::Generation(format!("unparseable reply: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Owned snapshot of a request, for assertions.
    struct SeenRequest {
        has_image: bool,
        instructions: String,
        response_fields: [&'static str; 2],
    }

    #[derive(Default)]
    struct MockClient {
        replies: Mutex<VecDeque<Result<String>>>,
        seen: Mutex<Vec<SeenRequest>>,
    }

    impl MockClient {
        fn replying(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::default(),
            }
        }
    }

    impl GenerativeClient for MockClient {
        fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
            self.seen.lock().unwrap().push(SeenRequest {
                has_image: request.image.is_some(),
                instructions: request.instructions.clone(),
                response_fields: request.response_fields,
            });
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Generation("mock: no reply queued".into())))
        }
    }

    fn derive_reply(english: &str, arabic: &str) -> String {
        format!(r#"{{"englishPrompt":"{english}","arabicExplanation":"{arabic}"}}"#)
    }

    fn refine_reply(english: &str, arabic: &str) -> String {
        format!(r#"{{"newEnglishPrompt":"{english}","newArabicExplanation":"{arabic}"}}"#)
    }

    #[test]
    fn derive_sets_both_fields_from_the_reply() {
        let client = MockClient::replying(vec![Ok(derive_reply("a cat, studio light", "قطة"))]);
        let mut session = PromptSession::new(client);

        let state = session.derive(b"img", "image/png").unwrap();
        assert_eq!(state.english_prompt, "a cat, studio light");
        assert_eq!(state.arabic_explanation, "قطة");
    }

    #[test]
    fn derive_sends_image_and_expects_the_derive_fields() {
        let client = MockClient::replying(vec![Ok(derive_reply("p", "e"))]);
        let mut session = PromptSession::new(client);
        session.derive(b"img", "image/jpeg").unwrap();

        let seen = session.client.seen.lock().unwrap();
        assert!(seen[0].has_image);
        assert_eq!(
            seen[0].response_fields,
            ["englishPrompt", "arabicExplanation"]
        );
    }

    #[test]
    fn derive_unparseable_reply_is_generation_error() {
        let client = MockClient::replying(vec![Ok("not json at all".into())]);
        let mut session = PromptSession::new(client);
        let err = session.derive(b"img", "image/png").unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert!(session.state().is_none());
    }

    #[test]
    fn derive_reply_missing_a_field_is_generation_error() {
        let client = MockClient::replying(vec![Ok(r#"{"englishPrompt":"only one"}"#.into())]);
        let mut session = PromptSession::new(client);
        assert!(session.derive(b"img", "image/png").is_err());
        assert!(session.state().is_none());
    }

    #[test]
    fn refine_replaces_both_fields_atomically() {
        let client = MockClient::replying(vec![
            Ok(derive_reply("a cat", "قطة")),
            Ok(refine_reply("a red cat at night", "قطة حمراء ليلاً")),
        ]);
        let mut session = PromptSession::new(client);
        session.derive(b"img", "image/png").unwrap();

        let state = session.refine("اجعل القطة حمراء").unwrap();
        assert_eq!(state.english_prompt, "a red cat at night");
        assert_eq!(state.arabic_explanation, "قطة حمراء ليلاً");
    }

    #[test]
    fn refine_sends_current_prompt_and_change_request_without_image() {
        let client = MockClient::replying(vec![
            Ok(derive_reply("a cat", "قطة")),
            Ok(refine_reply("x", "y")),
        ]);
        let mut session = PromptSession::new(client);
        session.derive(b"img", "image/png").unwrap();
        session.refine("make it night").unwrap();

        let seen = session.client.seen.lock().unwrap();
        assert!(!seen[1].has_image);
        assert!(seen[1].instructions.contains("a cat"));
        assert!(seen[1].instructions.contains("make it night"));
        assert_eq!(
            seen[1].response_fields,
            ["newEnglishPrompt", "newArabicExplanation"]
        );
    }

    #[test]
    fn refine_failure_leaves_state_untouched() {
        let client = MockClient::replying(vec![
            Ok(derive_reply("a cat", "قطة")),
            Err(Error::Generation("endpoint down".into())),
        ]);
        let mut session = PromptSession::new(client);
        session.derive(b"img", "image/png").unwrap();
        let before = session.state().unwrap().clone();

        assert!(session.refine("change it").is_err());
        assert_eq!(session.state(), Some(&before));
    }

    #[test]
    fn refine_unparseable_reply_leaves_state_untouched() {
        let client = MockClient::replying(vec![
            Ok(derive_reply("a cat", "قطة")),
            Ok("{broken".into()),
        ]);
        let mut session = PromptSession::new(client);
        session.derive(b"img", "image/png").unwrap();
        let before = session.state().unwrap().clone();

        assert!(session.refine("change it").is_err());
        assert_eq!(session.state(), Some(&before));
    }

    #[test]
    fn refine_without_a_prior_prompt_is_an_error_and_skips_the_endpoint() {
        let client = MockClient::default();
        let mut session = PromptSession::new(client);
        assert!(session.refine("anything").is_err());
        assert!(session.client.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn sequential_refinements_chain_on_the_latest_prompt() {
        let client = MockClient::replying(vec![
            Ok(derive_reply("v1", "a")),
            Ok(refine_reply("v2", "b")),
            Ok(refine_reply("v3", "c")),
        ]);
        let mut session = PromptSession::new(client);
        session.derive(b"img", "image/png").unwrap();
        session.refine("first change").unwrap();
        session.refine("second change").unwrap();

        assert_eq!(session.state().unwrap().english_prompt, "v3");
        let seen = session.client.seen.lock().unwrap();
        assert!(seen[2].instructions.contains("v2"));
    }

    #[test]
    fn mime_type_from_extension() {
        assert_eq!(image_mime_type("a.jpg"), Some("image/jpeg"));
        assert_eq!(image_mime_type("a.JPEG"), Some("image/jpeg"));
        assert_eq!(image_mime_type("a.png"), Some("image/png"));
        assert_eq!(image_mime_type("a.webp"), Some("image/webp"));
        assert_eq!(image_mime_type("a.txt"), None);
        assert_eq!(image_mime_type("noext"), None);
    }
}
