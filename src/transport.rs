//! Delivery of completion requests to the server.

use crate::errors::CompletionError;
use crate::models::{CompleteActionRequest, CompleteActionResponse};
use crate::surface::Surface;
use reqwest::{Client, header::CONTENT_TYPE};
use std::future::Future;
use tracing::debug;

pub const COMPLETE_ACTION_PATH: &str = "/users/complete-action/";
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";
pub const CSRF_COOKIE: &str = "csrftoken";

/// Sends one completion request. Implementations must not retry.
///
/// `Ok` carries any reply with a successful HTTP status; whether the body
/// actually reports success is up to the caller.
pub trait CompletionTransport {
    fn complete(
        &self,
        request: &CompleteActionRequest,
        csrf_token: &str,
    ) -> impl Future<Output = Result<CompleteActionResponse, CompletionError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{COMPLETE_ACTION_PATH}", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl CompletionTransport for HttpTransport {
    async fn complete(
        &self,
        request: &CompleteActionRequest,
        csrf_token: &str,
    ) -> Result<CompleteActionResponse, CompletionError> {
        debug!(endpoint = %self.endpoint, action = %request.action_text, "sending completion");
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(CSRF_HEADER, csrf_token)
            .json(request)
            .send()
            .await
            .map_err(|err| CompletionError::Network(err.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| CompletionError::Network(err.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<CompleteActionResponse>(&bytes)
                .ok()
                .and_then(|body| body.error);
            return Err(CompletionError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|err| CompletionError::Decode(err.to_string()))
    }
}

/// Anti-forgery token for the page: the hidden form field wins over the
/// cookie; neither present yields an empty token.
pub fn csrf_token<S: Surface>(surface: &S) -> String {
    if let Some(value) = surface.input_value(CSRF_FIELD) {
        return value;
    }
    surface
        .cookie()
        .split("; ")
        .find_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            (name == CSRF_COOKIE).then(|| value.to_string())
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Document, Element};

    #[test]
    fn endpoint_joins_base_url() {
        assert_eq!(
            HttpTransport::new("http://localhost:8000/").endpoint(),
            "http://localhost:8000/users/complete-action/"
        );
    }

    #[test]
    fn csrf_prefers_form_field() {
        let mut doc = Document::new();
        doc.set_cookie("sessionid=abc; csrftoken=from-cookie");
        assert_eq!(csrf_token(&doc), "from-cookie");

        let body = doc.body();
        doc.append_child(
            body,
            Element::new("input")
                .with_attr("type", "hidden")
                .with_attr("name", CSRF_FIELD)
                .with_attr("value", "from-form"),
        );
        assert_eq!(csrf_token(&doc), "from-form");
    }

    #[test]
    fn csrf_missing_is_empty() {
        let mut doc = Document::new();
        doc.set_cookie("sessionid=abc");
        assert_eq!(csrf_token(&doc), "");
    }

    #[test]
    fn request_body_uses_wire_names() {
        let request = CompleteActionRequest {
            action_text: "Go for a 10 minute walk".into(),
            state_context: "moderate".into(),
            test_id: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["action_text"], "Go for a 10 minute walk");
        assert_eq!(value["state_context"], "moderate");
        assert!(value["test_id"].is_null());
    }
}
