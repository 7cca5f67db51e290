//! `/blogs` endpoints (articles).

use serde::Serialize;

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::Article;
use crate::request::ApiRequest;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleInput {
    pub title: String,
    /// HTML from the rich-text editor
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArticlePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ApiClient {
    /// The backend answers 201; anything else counts as a failure.
    pub fn create_article(&self, article: &ArticleInput) -> Result<(), ClientError> {
        let req = ApiRequest::post("/blogs").json(serde_json::to_value(article)?);
        let result = self.request(&req).and_then(|resp| expect_status(resp.status, 201, "create blog"));
        self.announce(result, "Blog created successfully", "Failed to create blog. Please try again.")
    }

    pub fn list_articles(&self) -> Result<Vec<Article>, ClientError> {
        self.request(&ApiRequest::get("/blogs"))?.at_or_default("/data")
    }

    pub fn update_article(&self, id: u64, patch: &ArticlePatch) -> Result<(), ClientError> {
        let req = ApiRequest::put(format!("/blogs/{}", id)).json(serde_json::to_value(patch)?);
        let result = self.request(&req).and_then(|resp| expect_status(resp.status, 200, "update blog"));
        self.announce(result, "Blog updated successfully", "Failed to update blog. Please try again.")
    }

    pub fn delete_article(&self, id: u64) -> Result<(), ClientError> {
        let req = ApiRequest::delete(format!("/blogs/{}", id));
        let result = self.request(&req).and_then(|resp| expect_status(resp.status, 200, "delete article"));
        self.announce(result, "Article deleted successfully", "Failed to delete article, please try again.")
    }
}

fn expect_status(actual: u16, expected: u16, what: &str) -> Result<(), ClientError> {
    if actual == expected {
        Ok(())
    } else {
        Err(ClientError::Rejected(format!(
            "{}: expected HTTP {}, got {}",
            what, expected, actual
        )))
    }
}
