//! Test helpers for web integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, StatusCode};
use axum_test::TestServer;
use base64::Engine;

use mailroom::mail::{DeliveryOutcome, DeliveryRequest, DeliveryTransport};
use mailroom::template::TemplateLoader;
use mailroom::web::{create_router, AppState};
use mailroom::{Credentials, Database};

/// Public URL used by test servers.
pub const ROOT_URL: &str = "http://mailroom.test";

/// Password shared by test users.
pub const PASSWORD: &str = "password123";

/// One recorded delivery.
#[derive(Debug, Clone)]
pub struct DeliveryCall {
    pub address: String,
    pub login: String,
    pub request: DeliveryRequest,
}

/// Transport answering from a fixed address table.
///
/// Addresses missing from the table are unreachable.
#[derive(Default)]
pub struct MockTransport {
    statuses: HashMap<String, StatusCode>,
    calls: Mutex<Vec<DeliveryCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, status: StatusCode) -> Self {
        self.statuses.insert(address.to_string(), status);
        self
    }

    pub fn calls(&self) -> Vec<DeliveryCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryTransport for MockTransport {
    async fn deliver(
        &self,
        address: &str,
        request: &DeliveryRequest,
        credentials: &Credentials,
    ) -> DeliveryOutcome {
        self.calls.lock().unwrap().push(DeliveryCall {
            address: address.to_string(),
            login: credentials.login.clone(),
            request: request.clone(),
        });
        match self.statuses.get(address) {
            Some(status) => DeliveryOutcome::from_status(*status),
            None => DeliveryOutcome::Unreachable("connection refused".to_string()),
        }
    }
}

/// A test server over an in-memory database.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub transport: Arc<MockTransport>,
}

impl TestApp {
    pub async fn new(transport: MockTransport) -> Self {
        let db = Database::open_in_memory()
            .await
            .expect("Failed to create test database");
        let transport = Arc::new(transport);
        let templates = TemplateLoader::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"));

        let app_state = Arc::new(AppState::new(
            db.clone(),
            templates,
            transport.clone(),
            ROOT_URL,
        ));
        let router = create_router(app_state, &[]);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            db,
            transport,
        }
    }

    /// Register a user and return its Basic authorization header value.
    pub async fn register(&self, login: &str, name: &str) -> String {
        self.server
            .post("/users")
            .form(&[("login", login), ("password", PASSWORD), ("name", name)])
            .await
            .assert_status(StatusCode::CREATED);
        basic(login, PASSWORD)
    }

    /// Create a mailbox and return its id.
    pub async fn create_mailbox(&self, auth: &str, sender_name: &str) -> i64 {
        let response = self
            .server
            .post("/mailboxes")
            .add_header(AUTHORIZATION, auth.to_string())
            .form(&[("senderName", sender_name)])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        id_after(&location(&response), "/mailboxes/")
    }

    /// Create a draft and return its id.
    pub async fn create_draft(&self, auth: &str, mailbox_id: i64, subject: &str) -> i64 {
        let response = self
            .server
            .post(&format!("/mailboxes/{mailbox_id}/mails"))
            .add_header(AUTHORIZATION, auth.to_string())
            .form(&[("subject", subject), ("message", "Hello there")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        id_after(&location(&response), "/mails/")
    }

    /// Add a contact to a mailbox.
    pub async fn add_contact(&self, auth: &str, mailbox_id: i64, name: &str, address: &str) {
        self.server
            .post(&format!("/mailboxes/{mailbox_id}/contacts"))
            .add_header(AUTHORIZATION, auth.to_string())
            .form(&[("name", name), ("mailAddress", address)])
            .await
            .assert_status(StatusCode::SEE_OTHER);
    }
}

/// `Basic` authorization header value.
pub fn basic(login: &str, password: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{login}:{password}"));
    format!("Basic {encoded}")
}

/// Location header of a response.
pub fn location(response: &axum_test::TestResponse) -> String {
    response
        .header("location")
        .to_str()
        .expect("Location is not ASCII")
        .to_string()
}

/// Parse the id that follows `marker` in a path.
pub fn id_after(path: &str, marker: &str) -> i64 {
    let start = path.rfind(marker).expect("marker not in path") + marker.len();
    path[start..]
        .split('/')
        .next()
        .and_then(|s| s.parse().ok())
        .expect("no id after marker")
}
