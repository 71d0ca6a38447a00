//! Shared test infrastructure.
//!
//! - In-process fakes for the wallet, the signer, the membership registry
//!   and the PDF exporter
//! - `Browser`: carries the session cookie and CSRF token between requests
//!   against an `actix_web::test` service

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::HeaderMap;
use actix_web::web::Bytes;
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;

use assemblea::chain::{MembershipError, MembershipPredicate};
use assemblea::config::AppConfig;
use assemblea::document::{
    AssemblyRequest, DocumentExporter, ExportError, ExportedFile, Preview, export_filename,
};
use assemblea::handlers;
use assemblea::identity::Address;
use assemblea::store::DraftStore;
use assemblea::wallet::{AccountSource, MessageSigner, Signature, WalletError};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const ALICE: &str = "0xa11ce00000000000000000000000000000000001";
pub const BOB: &str = "0xb0b0000000000000000000000000000000000002";
pub const REGISTRY: &str = "0x5eed000000000000000000000000000000000003";

pub fn addr(raw: &str) -> Address {
    Address::parse(raw).expect("valid test address")
}

pub fn sample_signature() -> Signature {
    Signature::parse(&format!("0x{}", "5a".repeat(65))).expect("valid test signature")
}

pub fn may_10() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 10).expect("valid date")
}

pub fn blank_form() -> AssemblyRequest {
    AssemblyRequest::new(may_10())
}

// ============================================================================
// FAKES
// ============================================================================

/// Membership registry answering from a fixed member list.
pub struct FakeRegistry {
    members: Vec<Address>,
    contract: Option<Address>,
    failing: bool,
    calls: AtomicUsize,
}

impl FakeRegistry {
    pub fn with_members(members: &[&str]) -> Self {
        Self {
            members: members.iter().map(|m| addr(m)).collect(),
            contract: Some(addr(REGISTRY)),
            failing: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails as if the RPC node were down.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::with_members(&[])
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            contract: None,
            ..Self::with_members(&[])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MembershipPredicate for FakeRegistry {
    fn contract(&self) -> Option<Address> {
        self.contract
    }

    async fn is_representative(&self, account: &Address) -> Result<bool, MembershipError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.contract.is_none() {
            return Err(MembershipError::NotConfigured);
        }
        if self.failing {
            return Err(MembershipError::Transport("connection refused".to_string()));
        }
        Ok(self.members.contains(account))
    }
}

/// Wallet with scripted answers.
pub struct FakeWallet {
    pub permissions: Result<(), WalletError>,
    pub requested: Result<Vec<Address>, WalletError>,
    pub listed: Result<Vec<Address>, WalletError>,
}

impl FakeWallet {
    pub fn with_accounts(accounts: &[&str]) -> Self {
        let accounts: Vec<Address> = accounts.iter().map(|a| addr(a)).collect();
        Self {
            permissions: Ok(()),
            requested: Ok(accounts.clone()),
            listed: Ok(accounts),
        }
    }

    pub fn rejecting() -> Self {
        let rejected = WalletError::Rejected("User rejected the request.".to_string());
        Self {
            permissions: Err(rejected.clone()),
            requested: Err(rejected),
            listed: Ok(Vec::new()),
        }
    }

    pub fn missing() -> Self {
        Self {
            permissions: Err(WalletError::Unavailable),
            requested: Err(WalletError::Unavailable),
            listed: Err(WalletError::Unavailable),
        }
    }
}

#[async_trait]
impl AccountSource for FakeWallet {
    async fn request_permissions(&self) -> Result<(), WalletError> {
        self.permissions.clone()
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.requested.clone()
    }

    async fn list_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.listed.clone()
    }
}

/// Signer that records what it was asked to sign.
pub struct FakeSigner {
    answer: Result<Signature, WalletError>,
    pub messages: Mutex<Vec<String>>,
}

impl FakeSigner {
    pub fn signing() -> Self {
        Self {
            answer: Ok(sample_signature()),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: WalletError) -> Self {
        Self {
            answer: Err(error),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn last_message(&self) -> Option<String> {
        self.messages.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl MessageSigner for FakeSigner {
    async fn sign_message(&self, message: &str) -> Result<Signature, WalletError> {
        self.messages.lock().unwrap().push(message.to_string());
        self.answer.clone()
    }
}

/// Exporter that keeps the preview it was given instead of drawing a PDF.
#[derive(Default)]
pub struct RecordingExporter {
    pub exported: Mutex<Vec<Preview>>,
}

impl DocumentExporter for RecordingExporter {
    fn export(&self, preview: &Preview, date: NaiveDate) -> Result<ExportedFile, ExportError> {
        self.exported.lock().unwrap().push(preview.clone());
        Ok(ExportedFile {
            filename: export_filename(date),
            content_type: "application/pdf",
            bytes: b"%PDF-fake".to_vec(),
        })
    }
}

// ============================================================================
// HTTP HARNESS
// ============================================================================

/// Builds the application with a fake registry and the real PDF exporter.
pub async fn init_app(
    registry: Arc<FakeRegistry>,
    drafts: DraftStore,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    let registry: Arc<dyn MembershipPredicate> = registry;
    let exporter: Arc<dyn DocumentExporter> =
        Arc::new(assemblea::document::PdfExporter::new("Liceo Galilei"));

    test::init_service(
        App::new()
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                    .cookie_secure(false)
                    .build(),
            )
            .app_data(web::Data::new(AppConfig::default()))
            .app_data(web::Data::from(registry))
            .app_data(web::Data::from(exporter))
            .app_data(web::Data::new(drafts))
            .configure(handlers::configure),
    )
    .await
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Reply {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response is JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }
}

/// One browser tab: remembers the session cookie and the page's CSRF token.
#[derive(Default)]
pub struct Browser {
    cookie: Option<Cookie<'static>>,
    pub csrf: String,
}

impl Browser {
    pub async fn send<S, B>(&mut self, app: &S, req: test::TestRequest) -> Reply
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = match &self.cookie {
            Some(cookie) => req.cookie(cookie.clone()),
            None => req,
        };
        let resp = test::call_service(app, req.to_request()).await;
        if let Some(cookie) = resp.response().cookies().find(|c| c.name() == "id") {
            self.cookie = Some(cookie.into_owned());
        }
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = test::read_body(resp).await;
        Reply {
            status,
            headers,
            body,
        }
    }

    /// Loads the dashboard and picks up its CSRF token.
    pub async fn open<S, B>(&mut self, app: &S) -> Reply
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let reply = self.send(app, test::TestRequest::get().uri("/")).await;
        let re = Regex::new(r#"name="csrf-token" content="([0-9a-f]{64})""#).unwrap();
        if let Some(caps) = re.captures(&reply.text()) {
            self.csrf = caps[1].to_string();
        }
        reply
    }

    pub async fn post_json<S, B>(&mut self, app: &S, uri: &str, body: serde_json::Value) -> Reply
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = test::TestRequest::post()
            .uri(uri)
            .insert_header(("X-CSRF-Token", self.csrf.clone()))
            .insert_header(("Accept", "application/json"))
            .set_json(body);
        self.send(app, req).await
    }

    pub async fn post_form<S, B>(&mut self, app: &S, uri: &str, fields: &[(&str, &str)]) -> Reply
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let mut pairs = vec![("csrf_token", self.csrf.as_str())];
        pairs.extend_from_slice(fields);
        let body = serde_urlencoded::to_string(&pairs).expect("encodable form");
        let req = test::TestRequest::post()
            .uri(uri)
            .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
            .set_payload(body);
        self.send(app, req).await
    }

    pub async fn get_json<S, B>(&mut self, app: &S, uri: &str) -> Reply
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(("Accept", "application/json"));
        self.send(app, req).await
    }

    /// Opens the page and resyncs with a wallet exposing `account`.
    pub async fn sign_in<S, B>(&mut self, app: &S, account: &str) -> Reply
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        self.open(app).await;
        self.post_json(app, "/wallet/resync", serde_json::json!({ "accounts": [account] }))
            .await
    }
}
