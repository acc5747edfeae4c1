//! Outbound request and response types

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A call against an upstream API, built fluently
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub method: Method,
    pub url: String,
    /// Extra headers, sent after the client defaults
    pub headers: Vec<(String, String)>,
    /// Query string pairs, sent in order
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

/// Payload of a POST
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
    Json(Value),
}

impl ProviderRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// `Authorization: Bearer <token>`
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a batch of query pairs
    pub fn params(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }

    pub fn json(mut self, value: Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }
}

/// Status and raw body of an upstream reply
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: String,
}

impl ProviderResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }

    /// Body as JSON, or the raw text as a JSON string when it isn't JSON
    pub fn json_or_text(&self) -> Value {
        self.json::<Value>()
            .unwrap_or_else(|_| Value::String(self.body.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = ProviderRequest::get("https://api.example.com/v2/items")
            .bearer("abc")
            .param("b", "2")
            .params(vec![("a".to_string(), "1".to_string())]);

        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.headers,
            vec![("Authorization".to_string(), "Bearer abc".to_string())]
        );
        assert_eq!(
            request.query,
            vec![
                ("b".to_string(), "2".to_string()),
                ("a".to_string(), "1".to_string())
            ]
        );
        assert_eq!(request.body, None);
    }

    #[test]
    fn test_json_or_text() {
        let gateway = ProviderResponse {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert!(!gateway.is_success());
        assert_eq!(gateway.json_or_text(), json!("Bad Gateway"));

        let ok = ProviderResponse {
            status: 201,
            body: r#"{"id": 7}"#.to_string(),
        };
        assert!(ok.is_success());
        assert_eq!(ok.json_or_text(), json!({"id": 7}));
    }
}
