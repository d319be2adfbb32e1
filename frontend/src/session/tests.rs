use super::*;
use crate::error::ApiError;
use std::cell::RefCell;
use std::rc::Rc;

// =========================================================
// Shared Mock Components
// =========================================================

struct TestContext {
    /// Operation log to verify calling order
    log: RefCell<Vec<String>>,
    /// Persisted credential pair, if any
    stored: RefCell<Option<StoredCredentials>>,
    /// Tokens the gateway will accept on validate
    valid_tokens: RefCell<Vec<String>>,
    /// Simulate the backend being unreachable
    network_down: RefCell<bool>,
    /// Credentials the login endpoint accepts -> issued token
    accounts: RefCell<Vec<(String, String, String)>>,
}

impl TestContext {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            log: RefCell::new(Vec::new()),
            stored: RefCell::new(None),
            valid_tokens: RefCell::new(Vec::new()),
            network_down: RefCell::new(false),
            accounts: RefCell::new(Vec::new()),
        })
    }

    fn push_log(&self, msg: impl Into<String>) {
        self.log.borrow_mut().push(msg.into());
    }
}

struct TestStorage {
    ctx: Rc<TestContext>,
}

impl CredentialStorage for TestStorage {
    fn load(&self) -> Option<StoredCredentials> {
        self.ctx.push_log("storage:load");
        self.ctx.stored.borrow().clone()
    }

    fn save(&self, credentials: &StoredCredentials) {
        self.ctx
            .push_log(format!("storage:save:{}", credentials.email));
        *self.ctx.stored.borrow_mut() = Some(credentials.clone());
    }

    fn clear(&self) {
        self.ctx.push_log("storage:clear");
        *self.ctx.stored.borrow_mut() = None;
    }
}

struct TestGateway {
    ctx: Rc<TestContext>,
}

#[async_trait(?Send)]
impl AuthGateway for TestGateway {
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.ctx.push_log(format!("gateway:login:{}", request.email));
        if *self.ctx.network_down.borrow() {
            return Err(ApiError::network("connection refused"));
        }
        let accounts = self.ctx.accounts.borrow();
        accounts
            .iter()
            .find(|(email, password, _)| email == &request.email && password == &request.password)
            .map(|(_, _, token)| LoginResponse {
                token: token.clone(),
            })
            .ok_or_else(|| ApiError::from_response(401, Some("invalid credentials".into())))
    }

    async fn validate(&self, token: &str) -> ApiResult<()> {
        self.ctx.push_log("gateway:validate");
        if *self.ctx.network_down.borrow() {
            return Err(ApiError::network("connection refused"));
        }
        if self.ctx.valid_tokens.borrow().iter().any(|t| t == token) {
            Ok(())
        } else {
            Err(ApiError::from_response(401, None))
        }
    }
}

fn setup_env() -> (Rc<TestContext>, SessionManager<TestStorage, TestGateway>) {
    let ctx = TestContext::new();
    let storage = TestStorage { ctx: ctx.clone() };
    let gateway = TestGateway { ctx: ctx.clone() };
    let manager = SessionManager::new(storage, gateway);
    (ctx, manager)
}

// =========================================================
// Tests
// =========================================================

#[tokio::test]
async fn initialize_without_persisted_token_skips_the_network() {
    let (ctx, manager) = setup_env();

    let session = manager.initialize().await.unwrap();
    assert!(session.is_none());

    // 只允许读取存储；validate / login 都不应被调用
    let log = ctx.log.borrow();
    assert_eq!(log.as_slice(), ["storage:load"]);
}

#[tokio::test]
async fn initialize_with_accepted_token_restores_the_session() {
    let (ctx, manager) = setup_env();
    *ctx.stored.borrow_mut() = Some(StoredCredentials {
        token: "T".into(),
        email: "a@b.com".into(),
    });
    ctx.valid_tokens.borrow_mut().push("T".into());

    let session = manager.initialize().await.unwrap().unwrap();
    assert_eq!(session.email, "a@b.com");
    assert_eq!(session.token, "T");

    // 存储保持原样
    assert!(ctx.stored.borrow().is_some());
}

#[tokio::test]
async fn initialize_with_rejected_token_clears_storage() {
    let (ctx, manager) = setup_env();
    *ctx.stored.borrow_mut() = Some(StoredCredentials {
        token: "expired".into(),
        email: "a@b.com".into(),
    });

    let result = manager.initialize().await;
    assert!(result.is_err());
    assert!(ctx.stored.borrow().is_none());
    assert!(ctx.log.borrow().contains(&"storage:clear".to_string()));
}

#[tokio::test]
async fn initialize_with_unreachable_backend_also_clears_storage() {
    let (ctx, manager) = setup_env();
    *ctx.stored.borrow_mut() = Some(StoredCredentials {
        token: "T".into(),
        email: "a@b.com".into(),
    });
    ctx.valid_tokens.borrow_mut().push("T".into());
    *ctx.network_down.borrow_mut() = true;

    let err = manager.initialize().await.unwrap_err();
    assert!(err.is_network());
    assert!(ctx.stored.borrow().is_none());
}

#[tokio::test]
async fn login_persists_token_and_email_together() {
    let (ctx, manager) = setup_env();
    ctx.accounts
        .borrow_mut()
        .push(("a@b.com".into(), "x".into(), "T".into()));

    let session = manager
        .login(LoginRequest {
            email: "a@b.com".into(),
            password: "x".into(),
        })
        .await
        .unwrap();

    assert_eq!(session.token, "T");
    let stored = ctx.stored.borrow().clone().unwrap();
    assert_eq!(stored.token, "T");
    assert_eq!(stored.email, "a@b.com");
}

#[tokio::test]
async fn failed_login_leaves_stored_state_untouched() {
    let (ctx, manager) = setup_env();

    let err = manager
        .login(LoginRequest {
            email: "a@b.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert!(ctx.stored.borrow().is_none());
    // save 从未发生
    assert!(
        !ctx.log
            .borrow()
            .iter()
            .any(|entry| entry.starts_with("storage:save"))
    );
}

#[tokio::test]
async fn logout_then_initialize_finds_no_session() {
    let (ctx, manager) = setup_env();
    ctx.accounts
        .borrow_mut()
        .push(("a@b.com".into(), "x".into(), "T".into()));
    ctx.valid_tokens.borrow_mut().push("T".into());

    // 1. Login
    manager
        .login(LoginRequest {
            email: "a@b.com".into(),
            password: "x".into(),
        })
        .await
        .unwrap();
    assert!(ctx.stored.borrow().is_some());

    // 2. Logout (synchronous, no network)
    let calls_before = ctx.log.borrow().len();
    manager.logout();
    assert!(ctx.stored.borrow().is_none());
    let log = ctx.log.borrow();
    assert_eq!(log[calls_before..], ["storage:clear".to_string()]);
    drop(log);

    // 3. A fresh initialize sees no session and stays offline
    let session = manager.initialize().await.unwrap();
    assert!(session.is_none());
    assert_eq!(ctx.log.borrow().last().unwrap(), "storage:load");
}
