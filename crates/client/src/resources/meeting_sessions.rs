//! `/meeting-sessions` endpoints, including the bulk routes the
//! editable grid syncs through.

use serde::Serialize;
use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::MeetingSession;
use crate::request::ApiRequest;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMeetingSession {
    pub student_id: u64,
    pub mentor_id: u64,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    /// Minutes
    pub duration: u32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Partial update; `None` fields are left out of the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeetingSessionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingSessionFilters {
    pub user: Option<String>,
    pub mentor: Option<String>,
    pub status: Option<String>,
}

impl MeetingSessionFilters {
    fn apply(&self, mut req: ApiRequest) -> ApiRequest {
        for (key, value) in [("user", &self.user), ("mentor", &self.mentor), ("status", &self.status)] {
            if let Some(v) = value {
                req = req.query(key, v.clone());
            }
        }
        req
    }
}

impl ApiClient {
    pub fn create_meeting_session(&self, session: &NewMeetingSession) -> Result<Value, ClientError> {
        let req = ApiRequest::post("/meeting-sessions").json(serde_json::to_value(session)?);
        let result = self.request(&req).map(|resp| resp.body);
        self.announce(result, "Meeting session created", "Failed to create meeting session")
    }

    pub fn bulk_create_meeting_sessions(
        &self,
        sessions: &[NewMeetingSession],
    ) -> Result<Value, ClientError> {
        let req = ApiRequest::post("/meeting-sessions/bulk").json(json!({ "sessions": sessions }));
        let result = self.request(&req).map(|resp| resp.body);
        self.announce(result, "Meeting sessions created", "Failed to create meeting sessions")
    }

    pub fn list_meeting_sessions(
        &self,
        filters: &MeetingSessionFilters,
    ) -> Result<Vec<MeetingSession>, ClientError> {
        let req = filters.apply(ApiRequest::get("/meeting-sessions"));
        self.request(&req)?.at_or_default("/data/sessions")
    }

    pub fn meeting_sessions_for_user(&self, user_id: &str) -> Result<Vec<MeetingSession>, ClientError> {
        let filters = MeetingSessionFilters {
            user: Some(user_id.to_string()),
            ..Default::default()
        };
        self.list_meeting_sessions(&filters)
    }

    pub fn update_meeting_session(
        &self,
        id: u64,
        patch: &MeetingSessionPatch,
    ) -> Result<Value, ClientError> {
        let req = ApiRequest::put(format!("/meeting-sessions/{}", id)).json(serde_json::to_value(patch)?);
        let result = self.request(&req).map(|resp| resp.body);
        self.announce(result, "Meeting session updated", "Failed to update meeting session")
    }

    /// Each row must carry `session_id`.
    pub fn bulk_update_meeting_sessions(&self, rows: &[Value]) -> Result<Value, ClientError> {
        let req = ApiRequest::put("/meeting-sessions/bulk").json(json!({ "sessions": rows }));
        let result = self.request(&req).map(|resp| resp.body);
        self.announce(result, "Meeting sessions updated", "Failed to bulk update meeting sessions")
    }

    pub fn complete_meeting_session(&self, id: u64) -> Result<Value, ClientError> {
        let req = ApiRequest::patch(format!("/meeting-sessions/{}/complete", id));
        let result = self.request(&req).map(|resp| resp.body);
        self.announce(result, "Meeting session completed", "Failed to complete meeting session")
    }

    pub fn cancel_meeting_session(&self, id: u64) -> Result<Value, ClientError> {
        let req = ApiRequest::patch(format!("/meeting-sessions/{}/cancel", id));
        let result = self.request(&req).map(|resp| resp.body);
        self.announce(result, "Meeting session cancelled", "Failed to cancel meeting session")
    }

    pub fn delete_meeting_session(&self, id: u64) -> Result<(), ClientError> {
        let req = ApiRequest::delete(format!("/meeting-sessions/{}", id));
        let result = self.request(&req).map(|_| ());
        self.announce(result, "Meeting session deleted", "Failed to delete meeting session")
    }
}
