//! Common types for model interactions

use serde::{Deserialize, Serialize};

/// Base64-encoded image payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    pub media_type: String,
    pub data: String,
}

/// A single-turn request to the model.
///
/// A request with neither text nor image cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmRequest {
    Text { prompt: String },
    TextWithImage { prompt: String, image: InlineImage },
    Image { image: InlineImage },
}

impl LlmRequest {
    /// Pick the request shape from the parts that are present.
    /// An empty prompt counts as absent.
    pub fn from_parts(prompt: Option<String>, image: Option<InlineImage>) -> Option<Self> {
        let prompt = prompt.filter(|p| !p.is_empty());
        match (prompt, image) {
            (Some(prompt), Some(image)) => Some(Self::TextWithImage { prompt, image }),
            (Some(prompt), None) => Some(Self::Text { prompt }),
            (None, Some(image)) => Some(Self::Image { image }),
            (None, None) => None,
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        match self {
            Self::Text { prompt } | Self::TextWithImage { prompt, .. } => Some(prompt),
            Self::Image { .. } => None,
        }
    }

    pub fn image(&self) -> Option<&InlineImage> {
        match self {
            Self::TextWithImage { image, .. } | Self::Image { image } => Some(image),
            Self::Text { .. } => None,
        }
    }

    /// Short label for logs
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::TextWithImage { .. } => "text+image",
            Self::Image { .. } => "image",
        }
    }
}

/// Model response
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Usage,
}

impl LlmResponse {
    #[cfg(test)]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: Usage::default(),
        }
    }
}

/// Usage statistics
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png() -> InlineImage {
        InlineImage {
            media_type: "image/png".to_string(),
            data: "AAAA".to_string(),
        }
    }

    #[test]
    fn shape_follows_present_parts() {
        let both = LlmRequest::from_parts(Some("hi".into()), Some(png())).unwrap();
        assert_eq!(both.shape(), "text+image");
        let text = LlmRequest::from_parts(Some("hi".into()), None).unwrap();
        assert_eq!(text.shape(), "text");
        let image = LlmRequest::from_parts(None, Some(png())).unwrap();
        assert_eq!(image.shape(), "image");
        assert_eq!(image.prompt(), None);
    }

    #[test]
    fn empty_prompt_counts_as_absent() {
        assert!(LlmRequest::from_parts(Some(String::new()), None).is_none());
        let image = LlmRequest::from_parts(Some(String::new()), Some(png())).unwrap();
        assert!(matches!(image, LlmRequest::Image { .. }));
    }
}
