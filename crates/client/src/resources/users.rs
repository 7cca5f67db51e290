//! `/users` endpoints.

use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::{User, UserCount};
use crate::request::ApiRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewUserRole {
    /// Student account, registered on `/users`
    Student,
    /// Registered on `/users/mentors`
    Mentor,
}

/// Registration form for a new account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: NewUserRole,
    pub classes: Vec<String>,
    /// Students only
    pub minimal_sessions: Option<u32>,
}

impl NewUser {
    pub fn endpoint(&self) -> &'static str {
        match self.role {
            NewUserRole::Student => "/users",
            NewUserRole::Mentor => "/users/mentors",
        }
    }

    /// Students carry a single `class`; mentors carry the `classes` list.
    pub fn payload(&self) -> Value {
        match self.role {
            NewUserRole::Student => {
                let mut body = json!({
                    "name": self.name,
                    "email": self.email,
                    "role": "user",
                    "class": self.classes.first(),
                });
                if let Some(n) = self.minimal_sessions {
                    body["minimal_sessions"] = json!(n);
                }
                body
            }
            NewUserRole::Mentor => json!({
                "name": self.name,
                "email": self.email,
                "role": "mentor",
                "classes": self.classes,
            }),
        }
    }
}

impl ApiClient {
    pub fn register_user(&self, user: &NewUser) -> Result<Value, ClientError> {
        let req = ApiRequest::post(user.endpoint()).json(user.payload());
        let result = self.request(&req).map(|resp| resp.body);
        self.announce(result, "User registered successfully", "Failed to register user")
    }

    pub fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.request(&ApiRequest::get("/users"))?.at("/data/users")
    }

    /// The logged-in account (`/users/me`).
    pub fn current_user(&self) -> Result<User, ClientError> {
        self.request(&ApiRequest::get("/users/me"))?.at("/data/user")
    }

    pub fn user_count(&self) -> Result<UserCount, ClientError> {
        self.request(&ApiRequest::get("/active-user"))?.at("/data/users")
    }

    pub fn student_dropdown(&self) -> Result<Vec<User>, ClientError> {
        self.request(&ApiRequest::get("/users/students/dropdown"))?
            .at_or_default("/data/users")
    }

    pub fn mentor_dropdown(&self) -> Result<Vec<User>, ClientError> {
        self.request(&ApiRequest::get("/users/mentors/dropdown"))?
            .at_or_default("/data/mentors")
    }

    pub fn force_activate_user(&self, user_id: u64) -> Result<Value, ClientError> {
        let req = ApiRequest::post(format!("/users/{}/force-activate", user_id));
        let result = self
            .request(&req)
            .and_then(|resp| resp.at_or_default::<Value>("/data"));
        self.announce(result, "Successfully activated user", "Failed to activate user")
    }

    pub fn delete_user(&self, user_id: u64) -> Result<(), ClientError> {
        let result = self
            .request(&ApiRequest::delete(format!("/users/{}", user_id)))
            .map(|_| ());
        self.announce(result, "User deleted successfully", "Failed to delete user")
    }
}
