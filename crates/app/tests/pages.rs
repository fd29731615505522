use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use tenantgate_app::pages::{load_analytics, load_protected_resources};
use tenantgate_app::{AppConfig, AppContext, DEFAULT_APPLICATION_NAME, GuardOutcome, PageError, Route};
use tenantgate_auth::Principal;
use tenantgate_client::{DataSource, RequestError, TransportError};
use tenantgate_core::SubjectId;
use tenantgate_session::{ScopeSet, StaticIdentityProvider, TokenAcquisitionError, decode_id_token};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let app = Router::new()
            .route("/api/protected-resources", get(resources))
            .route("/api/tenant-info", get(tenant_info))
            .route("/api/user-analytics", get(analytics))
            .route("/api/v2/clients/:id", get(client_doc));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn resources() -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": [
            { "id": "1", "name": "Public notes", "description": "anyone signed in" },
            { "id": "2", "name": "Admin panel", "requiredRole": "admin" },
            { "id": "3", "name": "Acme ledger", "requiredTenantId": "acme" },
            { "id": "4", "name": "Globex admin", "requiredRole": "admin", "requiredTenantId": "globex" }
        ],
        "message": "Protected resources retrieved successfully"
    }))
}

async fn tenant_info() -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": { "id": "acme", "name": "Acme", "domain": "acme.test", "plan": "Enterprise", "userCount": 42 }
    }))
}

async fn analytics() -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": {
            "totalUsers": 200,
            "activeUsers": 150,
            "newUsersThisMonth": 12,
            "averageSessionDuration": "8m 02s",
            "topFeatures": [{ "name": "Dashboard", "usage": 90 }]
        }
    }))
}

async fn client_doc() -> Json<Value> {
    Json(json!({ "name": "Tenant Portal" }))
}

fn config(api_base: &str, provider_domain: &str, demo: bool) -> AppConfig {
    let api_base = api_base.to_string();
    let provider_domain = provider_domain.to_string();
    AppConfig::from_lookup(move |key| match key {
        "API_BASE_URL" => Some(api_base.clone()),
        "AUTH0_DOMAIN" => Some(provider_domain.clone()),
        "AUTH0_CLIENT_ID" => Some("client-abc".to_string()),
        "AUTH0_AUDIENCE" => Some("https://api.acme.test".to_string()),
        "DEMO_MODE" => Some(demo.to_string()),
        "REQUEST_TIMEOUT_SECS" => Some("5".to_string()),
        _ => None,
    })
    .expect("test config is valid")
}

fn user(roles: Value, tenant: &str) -> Principal {
    Principal::new(SubjectId::new("auth0|tester").unwrap())
        .with_name("Tester")
        .with_claim("https://myapp.com/roles", roles)
        .with_claim("https://myapp.com/tenant", json!(tenant))
}

async fn context(server: &TestServer, provider: StaticIdentityProvider) -> AppContext {
    let cfg = config(&format!("{}/api", server.base_url), &server.base_url, false);
    let ctx = AppContext::new(cfg, Arc::new(provider)).unwrap();
    ctx.session.establish().await.unwrap();
    ctx
}

fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn admin_in_acme_sees_decisions_per_resource() {
    let server = TestServer::spawn().await;
    let ctx = context(&server, StaticIdentityProvider::signed_in(user(json!(["admin"]), "acme"))).await;
    let cancel = CancellationToken::new();

    let (route, outcome) = ctx.navigate("/protected");
    assert_eq!(route, Route::Protected);
    assert!(matches!(outcome, GuardOutcome::Admitted(_)));

    let view = load_protected_resources(&ctx, &cancel).await.unwrap();
    assert_eq!(view.source, DataSource::Live);
    assert_eq!(view.tenant.user_count, 42);
    assert!(view.token_preview.ends_with("..."));
    assert_eq!(view.token_preview.len(), 23);

    let admitted: Vec<bool> = view.resources.iter().map(|r| r.decision.admitted).collect();
    assert_eq!(admitted, vec![true, true, true, false]);
    assert_eq!(view.admitted_count(), 3);

    let globex = &view.resources[3];
    assert!(globex.decision.role_satisfied);
    assert!(!globex.decision.tenant_satisfied);
    assert_eq!(globex.denial_summary().as_deref(), Some("tenant mismatch: need globex"));
    assert!(view.resources[2].decision.reasons.is_empty());
}

#[tokio::test]
async fn non_admin_gets_both_reasons_in_order() {
    let server = TestServer::spawn().await;
    let ctx = context(&server, StaticIdentityProvider::signed_in(user(json!(["user"]), "initech"))).await;

    let view = load_protected_resources(&ctx, &CancellationToken::new()).await.unwrap();
    let globex = &view.resources[3];
    assert_eq!(
        globex.decision.reasons,
        vec!["missing required role: admin", "tenant mismatch: need globex"]
    );
    assert_eq!(
        globex.denial_summary().as_deref(),
        Some("missing required role: admin | tenant mismatch: need globex")
    );
}

#[tokio::test]
async fn analytics_is_admin_only() {
    let server = TestServer::spawn().await;
    let ctx = context(&server, StaticIdentityProvider::signed_in(user(json!(["user"]), "acme"))).await;

    let (_, outcome) = ctx.navigate("/analytics");
    match outcome {
        GuardOutcome::Denied(decision) => {
            assert_eq!(decision.reasons, vec!["missing required role: admin"]);
        }
        other => panic!("expected denial, got {other:?}"),
    }

    let err = load_analytics(&ctx, &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, PageError::Denied(_)));
    assert_eq!(err.retry_hint(), None);
}

#[tokio::test]
async fn admin_loads_analytics() {
    let server = TestServer::spawn().await;
    let ctx = context(&server, StaticIdentityProvider::signed_in(user(json!(["admin"]), "acme"))).await;

    let view = load_analytics(&ctx, &CancellationToken::new()).await.unwrap();
    assert_eq!(view.analytics.total_users, 200);
    assert_eq!(view.active_share(), Some(75));
    assert_eq!(view.analytics.top_features[0].name, "Dashboard");
}

#[tokio::test]
async fn missing_consent_surfaces_as_token_error() {
    let server = TestServer::spawn().await;
    let provider = StaticIdentityProvider::signed_in(user(json!(["admin"]), "acme"))
        .with_granted_scopes(ScopeSet::parse("read:resources read:tenant"));
    let ctx = context(&server, provider).await;

    let err = load_analytics(&ctx, &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(
        err,
        PageError::Token(TokenAcquisitionError::InteractionRequired(_))
    ));
    assert_eq!(err.retry_hint(), Some("Sign in again"));
}

#[tokio::test]
async fn anonymous_visitor_is_sent_to_login() {
    let server = TestServer::spawn().await;
    let ctx = context(&server, StaticIdentityProvider::anonymous()).await;

    assert_eq!(
        ctx.navigate("/dashboard").1,
        GuardOutcome::LoginRequired { return_to: "/dashboard" }
    );
    assert!(matches!(ctx.navigate("/").1, GuardOutcome::Admitted(_)));

    let err = load_protected_resources(&ctx, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PageError::Token(TokenAcquisitionError::NotAuthenticated)));
    assert_eq!(err.retry_hint(), Some("Sign in again"));

    assert_eq!(ctx.application_name(&CancellationToken::new()).await, DEFAULT_APPLICATION_NAME);
}

#[tokio::test]
async fn nothing_is_decided_while_loading() {
    let server = TestServer::spawn().await;
    let cfg = config(&format!("{}/api", server.base_url), &server.base_url, false);
    let ctx = AppContext::new(
        cfg,
        Arc::new(StaticIdentityProvider::signed_in(user(json!(["admin"]), "acme"))),
    )
    .unwrap();

    for route in Route::ALL {
        assert_eq!(ctx.navigate(route.path()).1, GuardOutcome::Loading);
    }

    ctx.session.establish().await.unwrap();
    assert_eq!(ctx.navigate("/login").1, GuardOutcome::Redirect(Route::Dashboard));
    assert_eq!(ctx.navigate("/no-such-page").0, Route::Login);
}

#[tokio::test]
async fn application_name_comes_from_management_api() {
    let server = TestServer::spawn().await;
    let ctx = context(&server, StaticIdentityProvider::signed_in(user(json!(["admin"]), "acme"))).await;
    assert_eq!(ctx.application_name(&CancellationToken::new()).await, "Tenant Portal");
}

#[tokio::test]
async fn application_name_degrades_to_default() {
    let server = TestServer::spawn().await;
    let cfg = config(&format!("{}/api", server.base_url), &closed_port_url(), false);
    let ctx = AppContext::new(
        cfg,
        Arc::new(StaticIdentityProvider::signed_in(user(json!(["admin"]), "acme"))),
    )
    .unwrap();
    ctx.session.establish().await.unwrap();

    assert_eq!(ctx.application_name(&CancellationToken::new()).await, DEFAULT_APPLICATION_NAME);
}

#[tokio::test]
async fn application_name_gives_up_on_cancel_while_loading() {
    let server = TestServer::spawn().await;
    let cfg = config(&format!("{}/api", server.base_url), &server.base_url, false);
    let ctx = AppContext::new(
        cfg,
        Arc::new(StaticIdentityProvider::signed_in(user(json!(["admin"]), "acme"))),
    )
    .unwrap();
    assert!(ctx.session.is_loading());

    let cancel = CancellationToken::new();
    cancel.cancel();
    let name = tokio::time::timeout(Duration::from_secs(2), ctx.application_name(&cancel))
        .await
        .expect("cancellation must end the wait for a ready session");
    assert_eq!(name, DEFAULT_APPLICATION_NAME);
}

#[tokio::test]
async fn backend_outage_is_reported_unless_demo_mode() {
    let down = closed_port_url();
    let principal = user(json!(["admin"]), "acme");

    let strict = AppContext::new(
        config(&format!("{down}/api"), &down, false),
        Arc::new(StaticIdentityProvider::signed_in(principal.clone())),
    )
    .unwrap();
    strict.session.establish().await.unwrap();
    let err = load_protected_resources(&strict, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PageError::Request(RequestError::Transport(TransportError::Connect(_)))
    ));
    assert_eq!(err.retry_hint(), Some("Try Again"));

    let demo = AppContext::new(
        config(&format!("{down}/api"), &down, true),
        Arc::new(StaticIdentityProvider::signed_in(principal)),
    )
    .unwrap();
    demo.session.establish().await.unwrap();
    let view = load_protected_resources(&demo, &CancellationToken::new()).await.unwrap();
    assert!(view.source.is_demo());
    assert_eq!(view.tenant.name, "Acme Corporation");
    // canned data: one `user` resource, two `admin` resources
    assert_eq!(view.admitted_count(), 2);
}

#[tokio::test]
async fn cancelled_page_load_reports_cancellation() {
    let server = TestServer::spawn().await;
    let ctx = context(&server, StaticIdentityProvider::signed_in(user(json!(["admin"]), "acme"))).await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = load_protected_resources(&ctx, &cancel).await.unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn id_token_claims_drive_the_guard() {
    let server = TestServer::spawn().await;
    let raw = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({
            "sub": "auth0|from-token",
            "name": "Token User",
            "https://myapp.com/roles": ["admin"],
            "https://myapp.com/tenant": "acme"
        }),
        &EncodingKey::from_secret(b"provider-secret"),
    )
    .expect("failed to encode id token");

    let principal = decode_id_token(&raw).unwrap();
    let ctx = context(&server, StaticIdentityProvider::signed_in(principal)).await;

    match ctx.navigate("/analytics").1 {
        GuardOutcome::Admitted(claims) => {
            assert!(claims.is_admin());
            assert_eq!(claims.tenant.as_str(), "acme");
        }
        other => panic!("expected admission, got {other:?}"),
    }
}

#[tokio::test]
async fn backend_error_status_is_not_masked() {
    let app = Router::new().route(
        "/api/protected-resources",
        get(|| async { StatusCode::FORBIDDEN }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let ctx = AppContext::new(
        config(&format!("{base}/api"), &base, false),
        Arc::new(StaticIdentityProvider::signed_in(user(json!(["admin"]), "acme"))),
    )
    .unwrap();
    ctx.session.establish().await.unwrap();

    let err = load_protected_resources(&ctx, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PageError::Request(RequestError::Forbidden)));
    assert_eq!(err.retry_hint(), None);

    handle.abort();
}
