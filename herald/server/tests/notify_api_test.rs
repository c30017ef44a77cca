//! End-to-end dispatch tests against the public router, with every external
//! collaborator replaced by an in-memory fake.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::json;

use herald_core::model::OrgRole;
use herald_mail::{Error as MailError, MailTransport, OutgoingEmail};
use herald_server::{
    controller,
    directory::{self, OrgDirectory, Organization, Space, UserDirectory},
    postal::{
        strategies::StrategyDeps, IdGenerator, Mailer, Strategies, TemplateResolver, TokenLoader,
    },
    service::{self, ReceiptsRepo, TemplateRow, TemplateStore},
    ServiceState, TokenVerifier,
};

const TEST_SIGNING_KEY: &str = "token-signing-secret";

#[derive(Serialize)]
struct TestClaims {
    client_id: String,
    scope: Vec<String>,
    exp: i64,
}

fn bearer_token(client_id: &str, scopes: &[&str]) -> HeaderValue {
    let claims = TestClaims {
        client_id: client_id.to_string(),
        scope: scopes.iter().map(|s| (*s).to_string()).collect(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SIGNING_KEY.as_bytes()),
    )
    .expect("claims are encodable");

    HeaderValue::from_str(&format!("Bearer {token}")).expect("tokens are ascii")
}

struct SequentialIds {
    next: AtomicUsize,
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        format!("notification-{}", self.next.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Default)]
struct StubTokenLoader {
    loads: AtomicUsize,
}

#[async_trait]
impl TokenLoader for StubTokenLoader {
    async fn load(&self) -> Result<String, directory::Error> {
        let _ = self.loads.fetch_add(1, Ordering::SeqCst);
        Ok("service-token".to_string())
    }
}

#[derive(Default)]
struct StubUserDirectory {
    emails: HashMap<String, Vec<String>>,
    email_lookups: AtomicUsize,
}

#[async_trait]
impl UserDirectory for StubUserDirectory {
    async fn all_user_guids(&self, _token: &str) -> Result<Vec<String>, directory::Error> {
        Ok(self.emails.keys().cloned().collect())
    }

    async fn user_guids_with_scope(
        &self,
        _scope: &str,
        _token: &str,
    ) -> Result<Vec<String>, directory::Error> {
        Ok(Vec::new())
    }

    async fn user_emails(
        &self,
        user_guid: &str,
        _token: &str,
    ) -> Result<Vec<String>, directory::Error> {
        let _ = self.email_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.emails.get(user_guid).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct StubOrgDirectory {
    organizations: HashMap<String, Organization>,
    org_members: HashMap<(String, Option<OrgRole>), Vec<String>>,
}

#[async_trait]
impl OrgDirectory for StubOrgDirectory {
    async fn load_space(&self, _space_guid: &str, _token: &str) -> Result<Space, directory::Error> {
        Ok(Space::default())
    }

    async fn load_organization(
        &self,
        org_guid: &str,
        _token: &str,
    ) -> Result<Organization, directory::Error> {
        Ok(self.organizations.get(org_guid).cloned().unwrap_or_default())
    }

    async fn user_guids_in_space(
        &self,
        _space_guid: &str,
        _token: &str,
    ) -> Result<Vec<String>, directory::Error> {
        Ok(Vec::new())
    }

    async fn user_guids_in_organization(
        &self,
        org_guid: &str,
        role: Option<OrgRole>,
        _token: &str,
    ) -> Result<Vec<String>, directory::Error> {
        Ok(self.org_members.get(&(org_guid.to_string(), role)).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail_for: Vec<String>,
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.fail_for.iter().any(|address| address == &email.to) {
            return Err(herald_mail::build_message(&OutgoingEmail {
                to: "not an address".to_string(),
                ..email.clone()
            })
            .unwrap_err());
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingReceipts {
    rows: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl ReceiptsRepo for RecordingReceipts {
    async fn create(
        &self,
        client_id: &str,
        kind_id: &str,
        user_guids: &[String],
    ) -> Result<(), service::Error> {
        let mut rows = self.rows.lock().unwrap();
        for guid in user_guids {
            rows.push((client_id.to_string(), kind_id.to_string(), guid.clone()));
        }
        Ok(())
    }
}

struct StaticTemplates;

#[async_trait]
impl TemplateStore for StaticTemplates {
    async fn find_by_name(&self, name: &str) -> Result<Option<TemplateRow>, service::Error> {
        let defaults =
            ["user_body", "space_body", "organization_body", "everyone_body", "uaa_scope_body"];
        if defaults.contains(&name) {
            Ok(Some(TemplateRow {
                name: name.to_string(),
                subject: "Notification: {{subject}}".to_string(),
                text: "{{endorsement}}\n\n{{text}}".to_string(),
                html: "<p>{{endorsement}}</p>{{html}}".to_string(),
            }))
        } else {
            Ok(None)
        }
    }
}

struct Harness {
    server: TestServer,
    transport: Arc<RecordingTransport>,
    receipts: Arc<RecordingReceipts>,
    token_loader: Arc<StubTokenLoader>,
    email_lookups: Arc<StubUserDirectory>,
}

fn harness(users: StubUserDirectory, orgs: StubOrgDirectory, failing: Vec<String>) -> Harness {
    let users = Arc::new(users);
    let token_loader = Arc::new(StubTokenLoader::default());
    let transport =
        Arc::new(RecordingTransport { fail_for: failing, ..RecordingTransport::default() });
    let receipts = Arc::new(RecordingReceipts::default());

    let mailer = Arc::new(Mailer::new(
        Arc::clone(&users) as _,
        Arc::clone(&transport) as _,
        Arc::new(SequentialIds { next: AtomicUsize::new(0) }),
        "no-reply@notifications.example.com".to_string(),
        8,
    ));

    let deps = StrategyDeps {
        token_loader: Arc::clone(&token_loader) as _,
        users: Arc::clone(&users) as _,
        orgs: Arc::new(orgs),
        templates: TemplateResolver::new(Arc::new(StaticTemplates)),
        mailer,
        receipts: Arc::clone(&receipts) as _,
    };

    let service_state = ServiceState::new(
        Strategies::new(&deps),
        TokenVerifier::SharedSecret { key: TEST_SIGNING_KEY.to_string() },
    );

    let server =
        TestServer::new(controller::api_router(&service_state)).expect("router is serveable");

    Harness { server, transport, receipts, token_loader, email_lookups: users }
}

fn default_harness() -> Harness {
    harness(
        StubUserDirectory {
            emails: HashMap::from([(
                "user-123".to_string(),
                vec!["user-123@example.com".to_string()],
            )]),
            ..StubUserDirectory::default()
        },
        StubOrgDirectory::default(),
        Vec::new(),
    )
}

fn body() -> serde_json::Value {
    json!({
        "kind_id": "instance_down",
        "text": "This is the plain text body of the email",
        "html": "<p>This is the HTML body of the email</p>",
        "subject": "Your instance is down",
        "reply_to": "me@example.com",
    })
}

#[tokio::test]
async fn dispatch_to_a_user_returns_one_delivery_report_entry() {
    let h = default_harness();
    let token = bearer_token("mister-client", &["notifications.write"]);

    let response = h
        .server
        .post("/users/user-123")
        .add_header(header::AUTHORIZATION, token.clone())
        .json(&body())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let report: Vec<serde_json::Value> = response.json();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0]["status"], "delivered");
    assert_eq!(report[0]["recipient"], "user-123");
    assert_eq!(report[0]["notification_id"], "notification-0");
    assert!(report[0].get("email").is_none());

    let sent = h.transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "user-123@example.com");
    assert_eq!(sent[0].client_id, "mister-client");
    assert_eq!(sent[0].subject, "Notification: Your instance is down");

    let receipts = h.receipts.rows.lock().unwrap();
    assert_eq!(
        receipts.as_slice(),
        [("mister-client".to_string(), "instance_down".to_string(), "user-123".to_string())]
    );
}

#[tokio::test]
async fn organization_dispatch_honors_the_role_filter() {
    let h = harness(
        StubUserDirectory {
            emails: HashMap::from([
                ("member-1".to_string(), vec!["m1@example.com".to_string()]),
                ("manager-1".to_string(), vec!["mgr@example.com".to_string()]),
            ]),
            ..StubUserDirectory::default()
        },
        StubOrgDirectory {
            organizations: HashMap::from([("org-001".to_string(), Organization {
                guid: "org-001".to_string(),
                name: "the-org".to_string(),
            })]),
            org_members: HashMap::from([
                (
                    ("org-001".to_string(), None),
                    vec!["member-1".to_string(), "manager-1".to_string()],
                ),
                (("org-001".to_string(), Some(OrgRole::OrgManager)), vec!["manager-1".to_string()]),
            ]),
        },
        Vec::new(),
    );
    let token = bearer_token("mister-client", &["notifications.write"]);

    let mut request = body();
    request["role"] = json!("OrgManager");
    let response = h
        .server
        .post("/organizations/org-001")
        .add_header(header::AUTHORIZATION, token.clone())
        .json(&request)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let report: Vec<serde_json::Value> = response.json();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0]["recipient"], "manager-1");
}

#[tokio::test]
async fn unknown_organization_role_is_a_validation_error() {
    let h = default_harness();
    let token = bearer_token("mister-client", &["notifications.write"]);

    let mut request = body();
    request["role"] = json!("OrgUser");
    let response = h
        .server
        .post("/organizations/org-001")
        .add_header(header::AUTHORIZATION, token.clone())
        .json(&request)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn missing_required_fields_are_listed_by_name() {
    let h = default_harness();
    let token = bearer_token("mister-client", &["notifications.write"]);

    let response = h
        .server
        .post("/users/user-123")
        .add_header(header::AUTHORIZATION, token.clone())
        .json(&json!({}))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = response.json();
    let errors = body["error"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].as_str().unwrap().contains("\"kind_id\""));
    assert!(errors[1].as_str().unwrap().contains("\"text\" or \"html\""));
}

#[tokio::test]
async fn malformed_json_is_a_parse_error() {
    let h = default_harness();
    let token = bearer_token("mister-client", &["notifications.write"]);

    let response = h
        .server
        .post("/users/user-123")
        .add_header(header::AUTHORIZATION, token.clone())
        .text("this is not JSON")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let h = default_harness();

    let response = h.server.post("/users/user-123").json(&body()).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tokens_without_the_notify_scope_are_forbidden() {
    let h = default_harness();
    let token = bearer_token("mister-client", &["notifications.read"]);

    let response = h
        .server
        .post("/users/user-123")
        .add_header(header::AUTHORIZATION, token.clone())
        .json(&body())
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert!(h.transport.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn critical_dispatch_without_the_critical_scope_is_rejected_before_resolution() {
    let h = default_harness();
    let token = bearer_token("mister-client", &["notifications.write"]);

    let mut request = body();
    request["critical"] = json!(true);
    let response = h
        .server
        .post("/users/user-123")
        .add_header(header::AUTHORIZATION, token.clone())
        .json(&request)
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    // nothing downstream of the guard may have run
    assert_eq!(h.token_loader.loads.load(Ordering::SeqCst), 0);
    assert_eq!(h.email_lookups.email_lookups.load(Ordering::SeqCst), 0);
    assert!(h.transport.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn critical_dispatch_with_the_critical_scope_goes_through() {
    let h = default_harness();
    let token =
        bearer_token("mister-client", &["notifications.write", "critical_notifications.write"]);

    let mut request = body();
    request["critical"] = json!(true);
    let response = h
        .server
        .post("/users/user-123")
        .add_header(header::AUTHORIZATION, token.clone())
        .json(&request)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(h.transport.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn partial_transport_failure_still_returns_http_200_with_mixed_statuses() {
    let h = harness(
        StubUserDirectory {
            emails: HashMap::from([
                ("user-1".to_string(), vec!["one@example.com".to_string()]),
                ("user-2".to_string(), vec!["two@example.com".to_string()]),
                ("user-3".to_string(), vec!["three@example.com".to_string()]),
            ]),
            ..StubUserDirectory::default()
        },
        StubOrgDirectory::default(),
        vec!["two@example.com".to_string()],
    );
    let token = bearer_token("mister-client", &["notifications.write"]);

    let response = h
        .server
        .post("/everyone")
        .add_header(header::AUTHORIZATION, token.clone())
        .json(&body())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let report: Vec<serde_json::Value> = response.json();
    assert_eq!(report.len(), 3);
    let failed = report.iter().filter(|entry| entry["status"] == "failed").count();
    let delivered = report.iter().filter(|entry| entry["status"] == "delivered").count();
    assert_eq!(failed, 1);
    assert_eq!(delivered, 2);
}
