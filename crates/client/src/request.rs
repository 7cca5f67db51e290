//! Request and response shapes.
//!
//! An [`ApiRequest`] is plain owned data so it can be sent again after a
//! token refresh. Multipart bodies are kept as [`MultipartForm`] and only
//! turned into a reqwest form at send time, since reqwest forms are
//! consumed by the first send.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ClientError;

pub use reqwest::Method;

/// Identity of one logical call, shared by all of its replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short form is enough to correlate log lines
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

/// One outbound API call, relative to the client's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

// ── Multipart ───────────────────────────────────────────────────────

/// File attached to a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = guess_mime(&file_name).map(String::from);
        Self { file_name, mime, bytes }
    }

    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = std::fs::read(path)
            .map_err(|e| ClientError::Io(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self::new(file_name, bytes))
    }
}

fn guess_mime(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    Some(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => return None,
    })
}

#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    texts: Vec<(String, String)>,
    files: Vec<(String, FilePart)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.texts.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, name: impl Into<String>, part: FilePart) -> Self {
        self.files.push((name.into(), part));
        self
    }

    pub fn text_fields(&self) -> &[(String, String)] {
        &self.texts
    }

    pub fn file_fields(&self) -> &[(String, FilePart)] {
        &self.files
    }

    /// Build a fresh reqwest form for one send.
    pub(crate) fn to_reqwest(&self) -> Result<reqwest::blocking::multipart::Form, ClientError> {
        use reqwest::blocking::multipart::{Form, Part};

        let mut form = Form::new();
        for (name, value) in &self.texts {
            form = form.text(name.clone(), value.clone());
        }
        for (name, file) in &self.files {
            let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
            if let Some(ref mime) = file.mime {
                part = part
                    .mime_str(mime)
                    .map_err(|e| ClientError::Parse(format!("bad mime type {}: {}", mime, e)))?;
            }
            form = form.part(name.clone(), part);
        }
        Ok(form)
    }
}

// ── Response ────────────────────────────────────────────────────────

/// Decoded response. Non-JSON bodies are kept as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub(crate) fn from_reqwest(resp: reqwest::blocking::Response) -> Result<Self, ClientError> {
        let status = resp.status().as_u16();
        let text = resp.text()?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok(Self { status, body })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `status` field of the `{status, message, data}` envelope.
    pub fn envelope_status(&self) -> Option<&str> {
        self.body.get("status").and_then(Value::as_str)
    }

    pub fn is_success_envelope(&self) -> bool {
        self.status == 200 && self.envelope_status() == Some("success")
    }

    /// Best human-readable error text in the body.
    pub fn message(&self) -> String {
        let from_body = self
            .body
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| self.body.get("error").and_then(|e| e.get("message")).and_then(Value::as_str))
            .or_else(|| self.body.get("error").and_then(Value::as_str))
            .or_else(|| self.body.as_str());
        match from_body {
            Some(msg) if !msg.is_empty() => msg.to_string(),
            _ => format!("HTTP {}", self.status),
        }
    }

    /// Decode the value at a JSON pointer, e.g. `/data/users`.
    pub fn at<T: DeserializeOwned>(&self, pointer: &str) -> Result<T, ClientError> {
        let value = self
            .body
            .pointer(pointer)
            .ok_or_else(|| ClientError::Parse(format!("Missing {} in response", pointer)))?;
        T::deserialize(value).map_err(|e| ClientError::Parse(format!("{}: {}", pointer, e)))
    }

    /// Decode the envelope's `data` field.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        self.at("/data")
    }

    /// Like [`at`](Self::at), but a missing or null value yields `T::default()`.
    pub fn at_or_default<T: DeserializeOwned + Default>(&self, pointer: &str) -> Result<T, ClientError> {
        match self.body.pointer(pointer) {
            None | Some(Value::Null) => Ok(T::default()),
            Some(value) => T::deserialize(value).map_err(|e| ClientError::Parse(format!("{}: {}", pointer, e))),
        }
    }

    /// Turn a non-2xx response into the matching error.
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::from_status(self.status, self.message()))
        }
    }
}
