//! `/classes` endpoints.

use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::{Class, SelectOption};
use crate::request::ApiRequest;

impl ApiClient {
    pub fn create_class(&self, classname: &str) -> Result<Value, ClientError> {
        let req = ApiRequest::post("/classes").json(json!({ "classname": classname }));
        let result = self
            .request(&req)
            .and_then(|resp| resp.at_or_default::<Value>("/data"));
        self.announce(result, "Class created", "Failed to create new class")
    }

    pub fn list_classes(&self) -> Result<Vec<Class>, ClientError> {
        self.request(&ApiRequest::get("/classes"))?
            .at_or_default("/data/classes")
    }

    /// Classes as picker options (`id` → value, `name` → label).
    pub fn class_dropdown(&self) -> Result<Vec<SelectOption>, ClientError> {
        let classes: Vec<Class> = self
            .request(&ApiRequest::get("/classes/dropdown"))?
            .at_or_default("/data")?;
        Ok(classes
            .into_iter()
            .map(|c| SelectOption {
                value: Value::String(c.id),
                label: c.name,
            })
            .collect())
    }
}
