//! Web Mail Tests
//!
//! Integration tests for the mail endpoints with a recording transport.

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use chrono::Utc;

use common::{basic, location, MockTransport, TestApp, ROOT_URL};
use mailroom::mail::{Mail, MailRepository, MailStatus};

const ALICE_BOX: &str = "http://a.example/mailboxes/1/mails";
const BOB_BOX: &str = "http://b.example/mailboxes/2/mails";

async fn load_mail(app: &TestApp, mailbox_id: i64, mail_id: i64) -> Option<Mail> {
    MailRepository::new(app.db.pool())
        .get_mail_by_id(mailbox_id, mail_id)
        .await
        .unwrap()
}

/// Alice with one mailbox, two contacts and a draft.
async fn setup(transport: MockTransport) -> (TestApp, String, i64, i64) {
    let app = TestApp::new(transport).await;
    let auth = app.register("alice", "Alice").await;
    let mailbox_id = app.create_mailbox(&auth, "Alice Liddell").await;
    app.add_contact(&auth, mailbox_id, "Ann", ALICE_BOX).await;
    app.add_contact(&auth, mailbox_id, "Bob", BOB_BOX).await;
    let mail_id = app.create_draft(&auth, mailbox_id, "Hello").await;
    (app, auth, mailbox_id, mail_id)
}

#[tokio::test]
async fn test_requires_credentials() {
    let (app, _, mailbox_id, mail_id) = setup(MockTransport::new()).await;
    let path = format!("/mailboxes/{mailbox_id}/mails/{mail_id}");

    let response = app.server.get(&path).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(response
        .header("www-authenticate")
        .to_str()
        .unwrap()
        .starts_with("Basic"));

    app.server
        .get(&path)
        .add_header(AUTHORIZATION, basic("alice", "not-the-password"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_foreign_mailbox_is_forbidden() {
    let (app, _, mailbox_id, mail_id) = setup(MockTransport::new()).await;
    let mallory = app.register("mallory", "Mallory").await;

    app.server
        .get(&format!("/mailboxes/{mailbox_id}/mails/{mail_id}"))
        .add_header(AUTHORIZATION, mallory.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .put(&format!("/mailboxes/{mailbox_id}/mails/{mail_id}"))
        .add_header(AUTHORIZATION, mallory)
        .form(&[("subject", "Owned")])
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let mail = load_mail(&app, mailbox_id, mail_id).await.unwrap();
    assert_eq!(mail.subject, "Hello");
}

#[tokio::test]
async fn test_unknown_mail_is_not_found() {
    let (app, auth, mailbox_id, _) = setup(MockTransport::new()).await;

    app.server
        .get(&format!("/mailboxes/{mailbox_id}/mails/999"))
        .add_header(AUTHORIZATION, auth.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .get("/mailboxes/999/mails/1")
        .add_header(AUTHORIZATION, auth)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_renders_status_template() {
    let (app, auth, mailbox_id, mail_id) = setup(MockTransport::new()).await;

    let response = app
        .server
        .get(&format!("/mailboxes/{mailbox_id}/mails/{mail_id}"))
        .add_header(AUTHORIZATION, auth)
        .await;
    response.assert_status_ok();

    let body = response.text();
    assert!(body.contains("<title>Draft: Hello</title>"));
    assert!(body.contains(BOB_BOX));
    assert!(body.contains("signed in as Alice"));
}

#[tokio::test]
async fn test_save_edits_redirects_to_self() {
    let (app, auth, mailbox_id, mail_id) = setup(MockTransport::new()).await;
    let path = format!("/mailboxes/{mailbox_id}/mails/{mail_id}");

    let response = app
        .server
        .put(&path)
        .add_header(AUTHORIZATION, auth)
        .form(&[
            ("status", "draft"),
            ("subject", "Quarterly report"),
            ("message", "See attached"),
            ("recipients", BOB_BOX),
            ("recipients", "http://c.example/mailboxes/9/mails"),
            ("tags", "work  urgent"),
        ])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), path);

    let mail = load_mail(&app, mailbox_id, mail_id).await.unwrap();
    assert_eq!(mail.status, MailStatus::Draft);
    assert_eq!(mail.subject, "Quarterly report");
    assert_eq!(mail.message, "See attached");
    assert_eq!(mail.tags, vec!["work", "urgent"]);

    let names: Vec<&str> = mail.recipients.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Bob", "http://c.example/mailboxes/9/mails"]);
    assert!(mail.recipients[0].id.is_some());
    assert!(mail.recipients[1].id.is_none());
    assert!(app.transport.calls().is_empty());
}

#[tokio::test]
async fn test_absent_fields_stay_unchanged() {
    let (app, auth, mailbox_id, mail_id) = setup(MockTransport::new()).await;
    let path = format!("/mailboxes/{mailbox_id}/mails/{mail_id}");

    app.server
        .put(&path)
        .add_header(AUTHORIZATION, auth.clone())
        .form(&[("recipients", BOB_BOX), ("tags", "keep")])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    app.server
        .put(&path)
        .add_header(AUTHORIZATION, auth)
        .form(&[("subject", "Renamed")])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let mail = load_mail(&app, mailbox_id, mail_id).await.unwrap();
    assert_eq!(mail.subject, "Renamed");
    assert_eq!(mail.message, "Hello there");
    assert_eq!(mail.tags, vec!["keep"]);
    assert_eq!(mail.recipients.len(), 1);
}

#[tokio::test]
async fn test_invalid_input_is_rejected() {
    let (app, auth, mailbox_id, mail_id) = setup(MockTransport::new()).await;
    let path = format!("/mailboxes/{mailbox_id}/mails/{mail_id}");

    app.server
        .put(&path)
        .add_header(AUTHORIZATION, auth)
        .form(&[("status", "shipped"), ("subject", "Changed")])
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let mail = load_mail(&app, mailbox_id, mail_id).await.unwrap();
    assert_eq!(mail.subject, "Hello");
    assert_eq!(mail.status, MailStatus::Draft);
}

#[tokio::test]
async fn test_long_subject_and_message_are_saved_exactly() {
    let (app, auth, mailbox_id, mail_id) = setup(MockTransport::new()).await;
    let path = format!("/mailboxes/{mailbox_id}/mails/{mail_id}");
    let subject = "x".repeat(300);
    let message = "y".repeat(25_000);

    app.server
        .put(&path)
        .add_header(AUTHORIZATION, auth)
        .form(&[("subject", subject.as_str()), ("message", message.as_str())])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let mail = load_mail(&app, mailbox_id, mail_id).await.unwrap();
    assert_eq!(mail.subject, subject);
    assert_eq!(mail.message, message);
}

#[tokio::test]
async fn test_send_to_all_recipients() {
    let transport = MockTransport::new()
        .with(ALICE_BOX, StatusCode::CREATED)
        .with(BOB_BOX, StatusCode::CREATED);
    let (app, auth, mailbox_id, mail_id) = setup(transport).await;
    let path = format!("/mailboxes/{mailbox_id}/mails/{mail_id}");

    let before = Utc::now();
    let response = app
        .server
        .put(&path)
        .add_header(AUTHORIZATION, auth)
        .form(&[
            ("status", "sending"),
            ("recipients", BOB_BOX),
            ("recipients", ALICE_BOX),
        ])
        .await;
    let after = Utc::now();

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), path);

    let mail = load_mail(&app, mailbox_id, mail_id).await.unwrap();
    assert_eq!(mail.status, MailStatus::Sent);
    let sending_date = mail.sending_date.expect("sending date not set");
    assert!(sending_date >= before - chrono::Duration::seconds(1));
    assert!(sending_date <= after + chrono::Duration::seconds(1));

    let calls = app.transport.calls();
    let addresses: Vec<&str> = calls.iter().map(|c| c.address.as_str()).collect();
    assert_eq!(addresses, vec![BOB_BOX, ALICE_BOX]);
    assert!(calls.iter().all(|c| c.login == "alice"));

    let request = &calls[0].request;
    assert_eq!(request.subject, "Hello");
    assert_eq!(request.sender_name, "Alice Liddell");
    assert_eq!(
        request.sender_address,
        format!("{}/mailboxes/{mailbox_id}", common::ROOT_URL)
    );
    assert_eq!(
        request.recipients,
        vec![format!("{BOB_BOX}$Bob"), format!("{ALICE_BOX}$Ann")]
    );
}

#[tokio::test]
async fn test_partial_failure_reports_failed_recipients() {
    let transport = MockTransport::new()
        .with(ALICE_BOX, StatusCode::CREATED)
        .with(BOB_BOX, StatusCode::NOT_FOUND);
    let (app, auth, mailbox_id, mail_id) = setup(transport).await;

    let response = app
        .server
        .put(&format!("/mailboxes/{mailbox_id}/mails/{mail_id}"))
        .add_header(AUTHORIZATION, auth)
        .form(&[
            ("status", "sending"),
            ("recipients", ALICE_BOX),
            ("recipients", BOB_BOX),
            ("recipients", "http://gone.example/mailboxes/3/mails"),
        ])
        .await;
    response.assert_status_ok();

    let body = response.text();
    assert!(body.contains("<title>Sending: Hello</title>"));
    assert!(body.contains("Bob\t404 Not Found"));
    assert!(body.contains("http://gone.example/mailboxes/3/mails\tunreachable: connection refused"));
    assert!(!body.contains("Ann\t"));

    let mail = load_mail(&app, mailbox_id, mail_id).await.unwrap();
    assert_eq!(mail.status, MailStatus::Sending);
    assert!(mail.sending_date.is_some());

    let calls = app.transport.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].address, ALICE_BOX);
}

#[tokio::test]
async fn test_sending_page_keeps_date_after_partial_failure() {
    let transport = MockTransport::new().with(BOB_BOX, StatusCode::NOT_FOUND);
    let (app, auth, mailbox_id, mail_id) = setup(transport).await;
    let path = format!("/mailboxes/{mailbox_id}/mails/{mail_id}");

    app.server
        .put(&path)
        .add_header(AUTHORIZATION, auth.clone())
        .form(&[("status", "sending"), ("recipients", BOB_BOX)])
        .await
        .assert_status_ok();

    let body = app
        .server
        .get(&path)
        .add_header(AUTHORIZATION, auth)
        .await
        .text();
    assert!(body.contains("<title>Sending: Hello</title>"));
    assert!(!body.contains("<p>Sending since </p>"));
}

#[tokio::test]
async fn test_retry_dispatches_to_every_recipient_again() {
    let transport = MockTransport::new()
        .with(ALICE_BOX, StatusCode::CREATED)
        .with(BOB_BOX, StatusCode::SERVICE_UNAVAILABLE);
    let (app, auth, mailbox_id, mail_id) = setup(transport).await;
    let path = format!("/mailboxes/{mailbox_id}/mails/{mail_id}");

    app.server
        .put(&path)
        .add_header(AUTHORIZATION, auth.clone())
        .form(&[
            ("status", "sending"),
            ("recipients", ALICE_BOX),
            ("recipients", BOB_BOX),
        ])
        .await
        .assert_status_ok();

    // Retry from the sending page: recipients are not resubmitted
    app.server
        .post(&path)
        .add_header(AUTHORIZATION, auth)
        .form(&[("status", "sending")])
        .await
        .assert_status_ok();

    let calls = app.transport.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[2].address, ALICE_BOX);
    assert_eq!(calls[3].address, BOB_BOX);
}

#[tokio::test]
async fn test_send_without_recipients_returns_to_draft() {
    let (app, auth, mailbox_id, mail_id) = setup(MockTransport::new()).await;
    let path = format!("/mailboxes/{mailbox_id}/mails/{mail_id}");

    let response = app
        .server
        .put(&path)
        .add_header(AUTHORIZATION, auth)
        .form(&[("status", "sending"), ("recipients", "")])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), path);

    let mail = load_mail(&app, mailbox_id, mail_id).await.unwrap();
    assert_eq!(mail.status, MailStatus::Draft);
    assert!(mail.recipients.is_empty());
    assert!(mail.sending_date.is_some());
    assert!(app.transport.calls().is_empty());
}

#[tokio::test]
async fn test_delete_redirects_to_collection() {
    let (app, auth, mailbox_id, mail_id) = setup(MockTransport::new()).await;

    let response = app
        .server
        .delete(&format!("/mailboxes/{mailbox_id}/mails/{mail_id}"))
        .add_header(AUTHORIZATION, auth.clone())
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/mailboxes/{mailbox_id}/mails"));
    assert!(load_mail(&app, mailbox_id, mail_id).await.is_none());

    app.server
        .delete(&format!("/mailboxes/{mailbox_id}/mails/{mail_id}"))
        .add_header(AUTHORIZATION, auth)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_through_form_post() {
    let (app, auth, mailbox_id, mail_id) = setup(MockTransport::new()).await;

    let response = app
        .server
        .post(&format!("/mailboxes/{mailbox_id}/mails/{mail_id}?method=delete"))
        .add_header(AUTHORIZATION, auth)
        .form(&[("confirm", "yes")])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/mailboxes/{mailbox_id}/mails"));
    assert!(load_mail(&app, mailbox_id, mail_id).await.is_none());
}

#[tokio::test]
async fn test_receive_delivered_copy() {
    let (app, alice, mailbox_id, _) = setup(MockTransport::new()).await;
    let bob = app.register("bob", "Bob").await;

    let response = app
        .server
        .post(&format!("/mailboxes/{mailbox_id}/mails"))
        .add_header(AUTHORIZATION, bob)
        .form(&[
            ("status", "receiving"),
            ("senderAddress", "http://b.example/mailboxes/2"),
            ("senderName", "Bob"),
            ("subject", "Lunch?"),
            ("message", "Noon at the usual place"),
            ("sendingDate", "2024-05-01T12:00:00.000Z"),
            ("recipient", "http://a.example/mailboxes/1/mails$Alice"),
        ])
        .await;
    response.assert_status(StatusCode::CREATED);
    let mail_id = common::id_after(&location(&response), "/mails/");

    let mail = load_mail(&app, mailbox_id, mail_id).await.unwrap();
    assert_eq!(mail.status, MailStatus::Receiving);
    assert_eq!(mail.subject, "Lunch?");
    assert_eq!(mail.sender_name.as_deref(), Some("Bob"));
    assert_eq!(mail.recipients.len(), 1);
    assert_eq!(mail.recipients[0].name, "Alice");

    let page = app
        .server
        .get(&format!("/mailboxes/{mailbox_id}/mails/{mail_id}"))
        .add_header(AUTHORIZATION, alice)
        .await;
    page.assert_status_ok();
    assert!(page.text().contains("Noon at the usual place"));
}

#[tokio::test]
async fn test_mail_list() {
    let (app, auth, mailbox_id, _) = setup(MockTransport::new()).await;
    app.create_draft(&auth, mailbox_id, "Second").await;

    let response = app
        .server
        .get(&format!("/mailboxes/{mailbox_id}/mails"))
        .add_header(AUTHORIZATION, auth)
        .await;
    response.assert_status_ok();

    let body = response.text();
    let second = body.find("Second").unwrap();
    let first = body.find(">Hello<").unwrap();
    assert!(second < first, "newest mail first");

    let address = format!("<code>{ROOT_URL}/mailboxes/{mailbox_id}/mails</code>");
    assert!(body.contains(&address));
}

#[tokio::test]
async fn test_register_returns_user() {
    let app = TestApp::new(MockTransport::new()).await;

    let response = app
        .server
        .post("/users")
        .form(&[("login", "carol"), ("password", "password123"), ("name", "Carol")])
        .await;
    response.assert_status(StatusCode::CREATED);

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["data"]["login"], "carol");
    assert_eq!(body["data"]["name"], "Carol");
    assert!(body["data"].get("password").is_none());

    let me = app
        .server
        .get("/users/me")
        .add_header(AUTHORIZATION, basic("carol", "password123"))
        .await;
    me.assert_status_ok();
    assert_eq!(me.json::<serde_json::Value>()["data"]["name"], "Carol");
}

#[tokio::test]
async fn test_register_rejects_duplicate_login() {
    let app = TestApp::new(MockTransport::new()).await;
    app.register("alice", "Alice").await;

    app.server
        .post("/users")
        .form(&[("login", "alice"), ("password", "password456"), ("name", "Other")])
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    app.server
        .post("/users")
        .form(&[("login", "short"), ("password", "tiny"), ("name", "Short")])
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_contact_address_must_be_http() {
    let app = TestApp::new(MockTransport::new()).await;
    let auth = app.register("alice", "Alice").await;
    let mailbox_id = app.create_mailbox(&auth, "").await;

    app.server
        .post(&format!("/mailboxes/{mailbox_id}/contacts"))
        .add_header(AUTHORIZATION, auth)
        .form(&[("name", "Bob"), ("mailAddress", "ftp://b.example/mails")])
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
