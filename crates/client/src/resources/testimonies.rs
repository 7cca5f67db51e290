//! `/testimonies` endpoints. Create and update are multipart so a photo
//! can ride along.

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::Testimony;
use crate::request::{ApiRequest, FilePart, MultipartForm};
use crate::resources::require_success_envelope;

#[derive(Debug, Clone, PartialEq)]
pub struct TestimonyInput {
    pub testimoner_name: String,
    pub testimoner_current_position: String,
    pub testimoner_previous_position: String,
    pub testimony_text: String,
    pub testimoner_photo: Option<FilePart>,
}

impl TestimonyInput {
    fn to_form(&self, testimony_id: Option<u64>) -> MultipartForm {
        let mut form = MultipartForm::new();
        if let Some(id) = testimony_id {
            form = form.text("testimony_id", id.to_string());
        }
        form = form
            .text("testimoner_name", self.testimoner_name.clone())
            .text("testimoner_current_position", self.testimoner_current_position.clone())
            .text("testimoner_previous_position", self.testimoner_previous_position.clone())
            .text("testimony_text", self.testimony_text.clone());
        if let Some(ref photo) = self.testimoner_photo {
            form = form.file("testimoner_photo", photo.clone());
        }
        form
    }
}

impl ApiClient {
    pub fn create_testimony(&self, input: &TestimonyInput) -> Result<(), ClientError> {
        let req = ApiRequest::post("/testimonies").multipart(input.to_form(None));
        let result = self.request(&req).and_then(require_success_envelope).map(|_| ());
        self.announce(result, "Testimony created successfully", "Failed to create testimony")
    }

    pub fn list_testimonies(&self) -> Result<Vec<Testimony>, ClientError> {
        self.request(&ApiRequest::get("/testimonies"))?
            .at_or_default("/data/testimonials")
    }

    pub fn update_testimony(&self, id: u64, input: &TestimonyInput) -> Result<(), ClientError> {
        let req = ApiRequest::put(format!("/testimonies/{}", id)).multipart(input.to_form(Some(id)));
        let result = self.request(&req).and_then(require_success_envelope).map(|_| ());
        self.announce(result, "Testimony updated successfully", "Failed to update testimony")
    }

    pub fn delete_testimony(&self, id: u64) -> Result<(), ClientError> {
        let req = ApiRequest::delete(format!("/testimonies/{}", id));
        let result = self.request(&req).and_then(require_success_envelope).map(|_| ());
        self.announce(result, "Testimony deleted successfully", "Failed to delete testimony")
    }
}
