//! HTTP responses for the development server.

use anyhow::Result;
use serde::Serialize;
use tiny_http::{Header, Request, Response, StatusCode};

pub mod types {
    pub const JSON: &str = "application/json";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
}

/// A response that has been decided on but not yet sent
#[derive(Debug, Clone, PartialEq, Eq, fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct ApiResponse {
    #[fieldwork(get(copy))]
    status: u16,
    #[fieldwork(get(copy))]
    content_type: &'static str,
    body: String,
}

impl ApiResponse {
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: types::PLAIN,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &impl Serialize) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self {
                status,
                content_type: types::JSON,
                body,
            },
            Err(e) => Self::text(500, format!("Internal Server Error: {e}")),
        }
    }

    pub fn javascript(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: types::JAVASCRIPT,
            body: body.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::text(404, "Not Found")
    }

    pub fn method_not_allowed() -> Self {
        Self::text(405, "Method Not Allowed")
    }

    pub fn send(self, request: Request) -> Result<()> {
        let response = Response::from_string(self.body)
            .with_status_code(StatusCode(self.status))
            .with_header(make_header("Content-Type", self.content_type))
            .with_header(make_header("Cache-Control", "no-cache"));
        request.respond(response)?;
        Ok(())
    }
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}
