//! URI-addressed UI resources wrapping raw HTML, and assembly of the weather
//! card resource from the current view state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    card,
    view::{Phase, ViewState},
};

/// Every weather resource variant shares this URI so viewers replace the
/// previous one in place.
pub const WEATHER_CARD_URI: &str = "ui://mcp-aharvard/weather-card";

const UI_SCHEME: &str = "ui://";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceError {
    #[error("Invalid resource URI '{0}': UI resources must use the ui:// scheme")]
    InvalidUri(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiResource {
    pub uri: String,
    pub content: ResourceContent,
    pub encoding: Encoding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResourceContent {
    #[serde(rename = "rawHtml")]
    RawHtml {
        #[serde(rename = "htmlString")]
        html_string: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Text,
}

impl UiResource {
    pub fn raw_html(uri: impl Into<String>, html: impl Into<String>) -> Result<Self, ResourceError> {
        let uri = uri.into();
        if !uri.starts_with(UI_SCHEME) {
            return Err(ResourceError::InvalidUri(uri));
        }

        Ok(Self {
            uri,
            content: ResourceContent::RawHtml {
                html_string: html.into(),
            },
            encoding: Encoding::Text,
        })
    }

    pub fn html(&self) -> &str {
        match &self.content {
            ResourceContent::RawHtml { html_string } => html_string,
        }
    }
}

/// Builds the resource for whatever the view is currently showing.
pub fn weather_resource(state: &ViewState) -> UiResource {
    let html = match state.phase() {
        Phase::Failed(message) => card::render_error(message),
        Phase::Loading => card::render_loading(state.place()),
        Phase::Ready(payload) => card::render_weather_card(payload),
    };

    weather_card(html)
}

fn weather_card(html: String) -> UiResource {
    UiResource {
        uri: WEATHER_CARD_URI.to_string(),
        content: ResourceContent::RawHtml { html_string: html },
        encoding: Encoding::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_html_requires_ui_scheme() {
        let err = UiResource::raw_html("https://example.com/card", "<p/>").unwrap_err();
        assert_eq!(
            err,
            ResourceError::InvalidUri("https://example.com/card".into())
        );

        let ok = UiResource::raw_html(WEATHER_CARD_URI, "<p/>").unwrap();
        assert_eq!(ok.html(), "<p/>");
    }

    #[test]
    fn serializes_to_descriptor_shape() {
        let resource = UiResource::raw_html(WEATHER_CARD_URI, "<p>hi</p>").unwrap();
        let value = serde_json::to_value(&resource).unwrap();

        assert_eq!(
            value,
            json!({
                "uri": "ui://mcp-aharvard/weather-card",
                "content": { "type": "rawHtml", "htmlString": "<p>hi</p>" },
                "encoding": "text",
            })
        );

        let back: UiResource = serde_json::from_value(value).unwrap();
        assert_eq!(back, resource);
    }
}
