//! Shared fixtures for unit tests: users, a scripted transport and a wired
//! client/session pair.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::net::api::ApiClient;
use crate::net::transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use crate::net::types::{CompanyProfile, Role, StudentProfile, TeacherProfile, UserRecord};
use crate::session::token_store::TokenStore;
use crate::state::auth::AuthSession;
use crate::util::storage::MemoryStorage;

pub const BASE_URL: &str = "http://api.test";

fn user(id: i64, email: &str, role: Role) -> UserRecord {
    UserRecord {
        id,
        email: email.to_owned(),
        first_name: None,
        last_name: None,
        phone: None,
        is_active: true,
        created_at: None,
        must_change_password: false,
        role,
    }
}

pub fn student(id: i64) -> UserRecord {
    user(
        id,
        "a@b.com",
        Role::Student {
            student: Some(StudentProfile { master_option: Some("GL".to_owned()), student_number: None }),
        },
    )
}

pub fn teacher(id: i64) -> UserRecord {
    user(
        id,
        "t@univ.dz",
        Role::Teacher {
            teacher: Some(TeacherProfile { grade: Some("MCA".to_owned()), is_responsible: false, speciality: None }),
        },
    )
}

pub fn company(id: i64) -> UserRecord {
    user(
        id,
        "hr@corp.com",
        Role::Company { company: Some(CompanyProfile { name: Some("Corp".to_owned()), ..CompanyProfile::default() }) },
    )
}

pub fn admin(id: i64) -> UserRecord {
    user(id, "admin@univ.dz", Role::Administrator {})
}

/// `{ "user": ... }` body as served by `/profile`.
pub fn profile_body(user: &UserRecord) -> String {
    serde_json::json!({ "user": user }).to_string()
}

type Reply = Result<HttpResponse, TransportError>;

enum Scripted {
    Ready(Reply),
    Deferred(oneshot::Receiver<Reply>),
}

/// Transport answering from per-route queues and recording every request.
///
/// Unscripted routes fail with a [`TransportError`].
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Rc<RefCell<HashMap<(Method, String), VecDeque<Scripted>>>>,
    requests: Rc<RefCell<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) {
        self.routes
            .borrow_mut()
            .entry((method, format!("{BASE_URL}{path}")))
            .or_default()
            .push_back(scripted);
    }

    /// Queue an immediate response.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        self.push(method, path, Scripted::Ready(Ok(HttpResponse::new(status, body))));
    }

    /// Queue a network failure.
    pub fn fail(&self, method: Method, path: &str, reason: &str) {
        self.push(method, path, Scripted::Ready(Err(TransportError(reason.to_owned()))));
    }

    /// Queue a response the test resolves later through the returned sender.
    pub fn defer(&self, method: Method, path: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.push(method, path, Scripted::Deferred(rx));
        tx
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        let next = self
            .routes
            .borrow_mut()
            .get_mut(&(request.method, request.url.clone()))
            .and_then(VecDeque::pop_front);
        match next {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Deferred(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(TransportError("reply dropped".to_owned()))),
            None => Err(TransportError(format!(
                "no scripted reply for {} {}",
                request.method.as_str(),
                request.url
            ))),
        }
    }
}

/// Everything a session test needs, sharing one storage and one transport.
pub struct Harness {
    pub transport: MockTransport,
    pub storage: MemoryStorage,
    pub tokens: TokenStore,
    pub client: ApiClient,
    pub session: AuthSession,
}

impl Harness {
    pub fn new() -> Self {
        let transport = MockTransport::new();
        let storage = MemoryStorage::new();
        let tokens = TokenStore::new(storage.clone());
        let client = ApiClient::new(BASE_URL, Rc::new(transport.clone()), tokens.clone());
        Self { transport, storage, tokens, client, session: AuthSession::new() }
    }

    /// Subscribe the standard invalidation handler (teardown on `401`).
    pub fn install_teardown(&self) {
        let session = self.session.clone();
        let tokens = self.tokens.clone();
        self.client
            .events()
            .subscribe(move |_| crate::session::actions::teardown(&session, &tokens));
    }
}
