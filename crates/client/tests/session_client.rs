//! Authorized request pipeline against a mock backend.

use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use httpmock::prelude::*;
use mentordesk_client::{
    ApiClient, ApiRequest, ClientError, FilePart, NewMeetingSession, Notice, Notifier,
    SessionStore, TestimonyInput,
};
use serde_json::json;

#[derive(Default)]
struct Recorder {
    notices: Mutex<Vec<Notice>>,
    redirects: Mutex<u32>,
}

impl Recorder {
    fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    fn redirects(&self) -> u32 {
        *self.redirects.lock().unwrap()
    }
}

impl Notifier for Recorder {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    fn redirect_to_login(&self) {
        *self.redirects.lock().unwrap() += 1;
    }
}

fn setup(server: &MockServer) -> (ApiClient, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let client = ApiClient::new(
        server.url("/api"),
        Arc::new(SessionStore::in_memory()),
        recorder.clone(),
    )
    .unwrap();
    (client, recorder)
}

fn signed_in(server: &MockServer) -> (ApiClient, Arc<Recorder>) {
    let (client, recorder) = setup(server);
    client.session().set_access_token("at1");
    client.session().set_refresh_token("rt1");
    (client, recorder)
}

// ── Token attachment ────────────────────────────────────────────────

#[test]
fn test_bearer_token_attached() {
    let server = MockServer::start();
    let users = server.mock(|when, then| {
        when.method(GET)
            .path("/api/users")
            .header("Authorization", "Bearer at1");
        then.status(200)
            .json_body(json!({"status": "success", "data": {"users": []}}));
    });

    let (client, recorder) = signed_in(&server);
    let list = client.list_users().unwrap();

    assert!(list.is_empty());
    users.assert_hits(1);
    assert!(recorder.notices().is_empty());
}

#[test]
fn test_no_token_sends_no_authorization() {
    let server = MockServer::start();
    let with_auth = server.mock(|when, then| {
        when.method(GET).path("/api/classes").header_exists("Authorization");
        then.status(500);
    });
    let anonymous = server.mock(|when, then| {
        when.method(GET).path("/api/classes");
        then.status(200)
            .json_body(json!({"data": {"classes": [{"id": 1, "name": "Batch A"}]}}));
    });

    let (client, _) = setup(&server);
    let classes = client.list_classes().unwrap();

    assert_eq!(classes[0].name, "Batch A");
    with_auth.assert_hits(0);
    anonymous.assert_hits(1);
}

// ── 401 recovery ────────────────────────────────────────────────────

#[test]
fn test_expired_token_refreshed_and_replayed() {
    let server = MockServer::start();
    let stale = server.mock(|when, then| {
        when.method(GET).path("/api/users").header("Authorization", "Bearer at1");
        then.status(401).json_body(json!({"message": "Token expired"}));
    });
    let refresh = server.mock(|when, then| {
        when.method(PUT)
            .path("/api/auth/refresh")
            .json_body(json!({"token": "rt1"}));
        then.status(200).json_body(json!({
            "status": "success",
            "data": {"access_token": "at2", "refresh_token": "rt2"}
        }));
    });
    let fresh = server.mock(|when, then| {
        when.method(GET).path("/api/users").header("Authorization", "Bearer at2");
        then.status(200).json_body(json!({"data": {"users": [
            {"id": 1, "name": "Ana", "email": "ana@example.com", "role": "mentor"}
        ]}}));
    });

    let (client, recorder) = signed_in(&server);
    let users = client.list_users().unwrap();

    assert_eq!(users.len(), 1);
    stale.assert_hits(1);
    refresh.assert_hits(1);
    fresh.assert_hits(1);
    assert_eq!(client.session().access_token().as_deref(), Some("at2"));
    assert_eq!(client.session().refresh_token().as_deref(), Some("rt2"));
    assert!(recorder.notices().is_empty());
    assert_eq!(client.pending_retry_entries(), 0);
}

#[test]
fn test_persistent_401_gives_up_after_two_refreshes() {
    let server = MockServer::start();
    let users = server.mock(|when, then| {
        when.method(GET).path("/api/users");
        then.status(401).json_body(json!({"message": "Unauthenticated"}));
    });
    let refresh = server.mock(|when, then| {
        when.method(PUT).path("/api/auth/refresh");
        then.status(200)
            .json_body(json!({"data": {"access_token": "at2", "refresh_token": "rt2"}}));
    });
    let logout = server.mock(|when, then| {
        when.method(DELETE).path("/api/auth/logout");
        then.status(200).json_body(json!({"status": "success"}));
    });

    let (client, recorder) = signed_in(&server);
    let err = client.list_users().unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized(ref m) if m == "Unauthenticated"));
    users.assert_hits(3);
    refresh.assert_hits(2);
    logout.assert_hits(1);
    assert!(!client.session().is_authenticated());
    assert_eq!(recorder.notices(), vec![Notice::SessionExpired]);
    assert_eq!(recorder.redirects(), 1);
    assert_eq!(client.pending_retry_entries(), 0);
}

#[test]
fn test_refresh_rejected_ends_session() {
    let server = MockServer::start();
    let users = server.mock(|when, then| {
        when.method(GET).path("/api/users");
        then.status(401);
    });
    let refresh = server.mock(|when, then| {
        when.method(PUT).path("/api/auth/refresh");
        then.status(401).json_body(json!({"message": "Refresh token revoked"}));
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/api/auth/logout");
        then.status(401);
    });

    let (client, recorder) = signed_in(&server);
    let err = client.list_users().unwrap_err();

    match err {
        ClientError::RefreshFailed(inner) => {
            assert!(matches!(*inner, ClientError::Unauthorized(ref m) if m == "Refresh token revoked"))
        }
        other => panic!("expected RefreshFailed, got {:?}", other),
    }
    users.assert_hits(1);
    refresh.assert_hits(1);
    assert!(client.session().access_token().is_none());
    assert!(client.session().refresh_token().is_none());
    assert_eq!(recorder.notices(), vec![Notice::SessionExpired]);
    assert_eq!(recorder.redirects(), 1);
}

#[test]
fn test_401_without_refresh_token_is_terminal() {
    let server = MockServer::start();
    let users = server.mock(|when, then| {
        when.method(GET).path("/api/users");
        then.status(401);
    });
    let refresh = server.mock(|when, then| {
        when.method(PUT).path("/api/auth/refresh");
        then.status(200);
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/api/auth/logout");
        then.status(200);
    });

    let (client, recorder) = setup(&server);
    client.session().set_access_token("at1");
    let err = client.list_users().unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized(_)));
    users.assert_hits(1);
    refresh.assert_hits(0);
    assert!(client.session().access_token().is_none());
    assert_eq!(recorder.notices(), vec![Notice::SessionExpired]);
    assert_eq!(recorder.redirects(), 1);
}

// ── Concurrent requests ─────────────────────────────────────────────

/// Runs `a` and `b` on two threads against one shared client, released
/// together.
fn run_pair<A, B, F, G>(client: &Arc<ApiClient>, a: F, b: G) -> (A, B)
where
    A: Send + 'static,
    B: Send + 'static,
    F: FnOnce(&ApiClient) -> A + Send + 'static,
    G: FnOnce(&ApiClient) -> B + Send + 'static,
{
    let barrier = Arc::new(Barrier::new(2));
    let first = {
        let client = client.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            barrier.wait();
            a(&client)
        })
    };
    let second = {
        let client = client.clone();
        thread::spawn(move || {
            barrier.wait();
            b(&client)
        })
    };
    (first.join().unwrap(), second.join().unwrap())
}

#[test]
fn test_overlapping_401s_each_get_their_own_refresh_budget() {
    let server = MockServer::start();
    let users = server.mock(|when, then| {
        when.method(GET).path("/api/users");
        then.status(401)
            .delay(Duration::from_millis(300))
            .json_body(json!({"message": "Unauthenticated"}));
    });
    let refresh = server.mock(|when, then| {
        when.method(PUT).path("/api/auth/refresh");
        then.status(200)
            .json_body(json!({"data": {"access_token": "at2", "refresh_token": "rt2"}}));
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/api/auth/logout");
        then.status(200).json_body(json!({"status": "success"}));
    });

    let (client, recorder) = signed_in(&server);
    let client = Arc::new(client);
    let (first, second) = run_pair(&client, |c| c.list_users(), |c| c.list_users());

    assert!(matches!(first, Err(ClientError::Unauthorized(_))));
    assert!(matches!(second, Err(ClientError::Unauthorized(_))));
    // Two refreshes per request, never a shared budget of two.
    refresh.assert_hits(4);
    users.assert_hits(6);
    assert_eq!(recorder.redirects(), 2);
    assert_eq!(client.pending_retry_entries(), 0);
}

#[test]
fn test_exhausted_request_does_not_spend_a_neighbours_budget() {
    let server = MockServer::start();
    let doomed = server.mock(|when, then| {
        when.method(GET).path("/api/doomed");
        then.status(401)
            .delay(Duration::from_millis(300))
            .json_body(json!({"message": "Unauthenticated"}));
    });
    let stale = server.mock(|when, then| {
        when.method(GET)
            .path("/api/users")
            .header("Authorization", "Bearer at1");
        then.status(401).delay(Duration::from_millis(50));
    });
    let fresh = server.mock(|when, then| {
        when.method(GET)
            .path("/api/users")
            .header("Authorization", "Bearer at2");
        then.status(200)
            .json_body(json!({"status": "success", "data": {"users": []}}));
    });
    let refresh = server.mock(|when, then| {
        when.method(PUT).path("/api/auth/refresh");
        then.status(200)
            .json_body(json!({"data": {"access_token": "at2", "refresh_token": "rt2"}}));
    });
    let logout = server.mock(|when, then| {
        when.method(DELETE).path("/api/auth/logout");
        then.status(200).json_body(json!({"status": "success"}));
    });

    let (client, recorder) = signed_in(&server);
    let client = Arc::new(client);
    let (doomed_result, users) = run_pair(
        &client,
        |c| c.request(&ApiRequest::get("/doomed")),
        |c| c.list_users(),
    );

    assert!(users.unwrap().is_empty());
    assert!(matches!(doomed_result, Err(ClientError::Unauthorized(_))));

    stale.assert_hits(1);
    fresh.assert_hits(1);
    doomed.assert_hits(3);
    refresh.assert_hits(3);
    logout.assert_hits(1);
    assert_eq!(recorder.redirects(), 1);
    assert_eq!(client.pending_retry_entries(), 0);
}

// ── Other statuses ──────────────────────────────────────────────────

#[test]
fn test_403_notifies_without_refresh() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE).path("/api/users/7");
        then.status(403).json_body(json!({"message": "Admins only"}));
    });
    let refresh = server.mock(|when, then| {
        when.method(PUT).path("/api/auth/refresh");
        then.status(200);
    });

    let (client, recorder) = signed_in(&server);
    let err = client.delete_user(7).unwrap_err();

    assert!(matches!(err, ClientError::Forbidden(ref m) if m == "Admins only"));
    refresh.assert_hits(0);
    // No second "Failed to delete user" notice on top of the 403 one
    assert_eq!(recorder.notices(), vec![Notice::PermissionDenied]);
    assert_eq!(recorder.redirects(), 0);
    assert_eq!(client.session().access_token().as_deref(), Some("at1"));
}

#[test]
fn test_server_error_propagates_unchanged() {
    let server = MockServer::start();
    let failing = server.mock(|when, then| {
        when.method(GET).path("/api/active-user");
        then.status(500).json_body(json!({"message": "database down"}));
    });

    let (client, recorder) = signed_in(&server);
    let err = client.request(&ApiRequest::get("/active-user")).unwrap_err();

    assert!(matches!(err, ClientError::Http(500, ref m) if m == "database down"));
    failing.assert_hits(1);
    assert!(recorder.notices().is_empty());
    assert!(client.session().is_authenticated());
}

#[test]
fn test_validation_error_announced_once() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/meeting-sessions");
        then.status(422).json_body(json!({"message": "mentor_id is required"}));
    });

    let (client, recorder) = signed_in(&server);
    let err = client
        .create_meeting_session(&NewMeetingSession {
            student_id: 1,
            mentor_id: 0,
            date: "2025-03-01".into(),
            time: "09:30".into(),
            duration: 60,
            description: "Intro".into(),
            note: None,
        })
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(
        recorder.notices(),
        vec![Notice::Failure("Failed to create meeting session".into())]
    );
}

// ── Session operations ──────────────────────────────────────────────

#[test]
fn test_login_stores_tokens() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method(POST)
            .path("/api/auth/login")
            .json_body(json!({"email": "admin@example.com", "password": "secret"}));
        then.status(200).json_body(json!({
            "status": "success",
            "data": {
                "access_token": "at1",
                "refresh_token": "rt1",
                "access_token_expiry": "2099-01-01T00:00:00Z"
            }
        }));
    });

    let (client, recorder) = setup(&server);
    client.login("admin@example.com", "secret").unwrap();

    login.assert_hits(1);
    assert_eq!(client.session().access_token().as_deref(), Some("at1"));
    assert_eq!(client.session().refresh_token().as_deref(), Some("rt1"));
    assert_eq!(recorder.notices(), vec![Notice::LoginSucceeded]);
}

#[test]
fn test_bad_credentials_do_not_trigger_refresh() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(401).json_body(json!({"message": "Invalid credentials"}));
    });
    let refresh = server.mock(|when, then| {
        when.method(PUT).path("/api/auth/refresh");
        then.status(200);
    });

    let (client, recorder) = setup(&server);
    client.session().set_refresh_token("rt-old");
    let err = client.login("admin@example.com", "wrong").unwrap_err();

    assert!(matches!(err, ClientError::AuthenticationFailed(ref m) if m.contains("Invalid credentials")));
    refresh.assert_hits(0);
    assert_eq!(recorder.redirects(), 0);
}

#[test]
fn test_logout_clears_even_when_server_fails() {
    let server = MockServer::start();
    let logout = server.mock(|when, then| {
        when.method(DELETE)
            .path("/api/auth/logout")
            .header("Authorization", "Bearer at1");
        then.status(500);
    });

    let (client, _) = signed_in(&server);
    assert!(client.logout().is_err());

    logout.assert_hits(1);
    assert!(!client.session().is_authenticated());
}

// ── Resource bodies ─────────────────────────────────────────────────

#[test]
fn test_testimony_update_is_multipart_with_id() {
    let server = MockServer::start();
    let update = server.mock(|when, then| {
        when.method(PUT)
            .path("/api/testimonies/4")
            .header_exists("content-type")
            .body_includes("name=\"testimony_id\"")
            .body_includes("name=\"testimoner_photo\"; filename=\"budi.png\"")
            .body_includes("Great mentors");
        then.status(200).json_body(json!({"status": "success"}));
    });

    let (client, recorder) = signed_in(&server);
    client
        .update_testimony(
            4,
            &TestimonyInput {
                testimoner_name: "Budi".into(),
                testimoner_current_position: "Engineer".into(),
                testimoner_previous_position: "Student".into(),
                testimony_text: "Great mentors".into(),
                testimoner_photo: Some(FilePart::new("budi.png", b"png".to_vec())),
            },
        )
        .unwrap();

    update.assert_hits(1);
    assert_eq!(
        recorder.notices(),
        vec![Notice::Success("Testimony updated successfully".into())]
    );
}

#[test]
fn test_non_success_envelope_is_rejected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE).path("/api/static-assets/2");
        then.status(200).json_body(json!({"status": "error", "message": "asset in use"}));
    });

    let (client, recorder) = signed_in(&server);
    let err = client.delete_static_asset(2).unwrap_err();

    assert!(matches!(err, ClientError::Rejected(ref m) if m == "asset in use"));
    assert_eq!(recorder.notices(), vec![Notice::Failure("Failed to delete asset".into())]);
}

#[test]
fn test_bulk_create_wraps_sessions() {
    let server = MockServer::start();
    let bulk = server.mock(|when, then| {
        when.method(POST).path("/api/meeting-sessions/bulk").json_body(json!({
            "sessions": [{
                "student_id": 3,
                "mentor_id": 4,
                "date": "2025-03-01",
                "time": "10:00",
                "duration": 45,
                "description": "Review",
                "note": "bring notes"
            }]
        }));
        then.status(201).json_body(json!({"status": "success"}));
    });

    let (client, _) = signed_in(&server);
    client
        .bulk_create_meeting_sessions(&[NewMeetingSession {
            student_id: 3,
            mentor_id: 4,
            date: "2025-03-01".into(),
            time: "10:00".into(),
            duration: 45,
            description: "Review".into(),
            note: Some("bring notes".into()),
        }])
        .unwrap();

    bulk.assert_hits(1);
}
