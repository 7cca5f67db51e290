//! `/static-assets` endpoints and asset URL building.

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::StaticAsset;
use crate::request::{ApiRequest, FilePart, MultipartForm};
use crate::resources::require_success_envelope;

/// Public URL of a stored asset path.
pub fn asset_url(image_base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        image_base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

impl ApiClient {
    pub fn upload_static_asset(&self, asset: FilePart) -> Result<(), ClientError> {
        let form = MultipartForm::new().file("asset", asset);
        let req = ApiRequest::post("/static-assets").multipart(form);
        let result = self.request(&req).and_then(require_success_envelope).map(|_| ());
        self.announce(result, "Asset uploaded successfully", "Failed to upload asset")
    }

    pub fn list_static_assets(&self) -> Result<Vec<StaticAsset>, ClientError> {
        self.request(&ApiRequest::get("/static-assets"))?
            .at_or_default("/data")
    }

    pub fn delete_static_asset(&self, id: u64) -> Result<(), ClientError> {
        let req = ApiRequest::delete(format!("/static-assets/{}", id));
        let result = self.request(&req).and_then(require_success_envelope).map(|_| ());
        self.announce(result, "Asset deleted successfully", "Failed to delete asset")
    }
}
