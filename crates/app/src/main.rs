use std::sync::Arc;

use anyhow::Context;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use tenantgate_app::pages::{DashboardView, load_analytics, load_protected_resources};
use tenantgate_app::{AppConfig, AppContext, GuardOutcome, Route};
use tenantgate_auth::{Principal, Role};
use tenantgate_core::SubjectId;
use tenantgate_session::{StaticIdentityProvider, decode_id_token};

/// Walk every page as the configured principal and print what each would show.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tenantgate_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let principal = demo_principal(&config)?;
    let provider = Arc::new(StaticIdentityProvider::signed_in(principal));
    let ctx = AppContext::new(config, provider).context("failed to build application context")?;

    ctx.session.establish().await.context("session could not be established")?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupted; cancelling in-flight work");
                cancel.cancel();
            }
        });
    }

    let locations: Vec<String> = std::env::args().skip(1).collect();
    let locations = if locations.is_empty() {
        Route::ALL.iter().map(|r| r.path().to_string()).collect()
    } else {
        locations
    };

    let application = ctx.application_name(&cancel).await;
    tracing::info!(application, "application name resolved");

    for location in &locations {
        let (route, outcome) = ctx.navigate(location);
        let page = render(&ctx, route, outcome, &cancel).await;
        println!("{}", serde_json::to_string_pretty(&json!({ "location": location, "route": route, "page": page }))?);
    }

    Ok(())
}

async fn render(ctx: &AppContext, route: Route, outcome: GuardOutcome, cancel: &CancellationToken) -> Value {
    match outcome {
        GuardOutcome::Loading => json!({ "state": "loading" }),
        GuardOutcome::LoginRequired { return_to } => match ctx.session.begin_login(return_to) {
            Ok(redirect) => json!({ "state": "login_required", "redirect": redirect.url.as_str() }),
            Err(err) => json!({ "state": "error", "message": err.to_string() }),
        },
        GuardOutcome::Redirect(target) => json!({ "state": "redirect", "to": target.path() }),
        GuardOutcome::Denied(decision) => json!({ "state": "denied", "decision": decision }),
        GuardOutcome::Admitted(_) => {
            let loaded = match route {
                Route::Login => Ok(json!({ "state": "login" })),
                Route::Dashboard => Ok(json!(DashboardView::from_snapshot(&ctx.session.snapshot()))),
                Route::Protected => load_protected_resources(ctx, cancel).await.map(|view| json!(view)),
                Route::Analytics => load_analytics(ctx, cancel).await.map(|view| json!(view)),
            };
            loaded.unwrap_or_else(|err| {
                json!({ "state": "error", "message": err.to_string(), "retry": err.retry_hint() })
            })
        }
    }
}

/// The principal from `DEMO_ID_TOKEN` when set, else a built-in admin of
/// tenant `acme`.
fn demo_principal(config: &AppConfig) -> anyhow::Result<Principal> {
    if let Ok(raw) = std::env::var("DEMO_ID_TOKEN") {
        return decode_id_token(raw.trim()).context("DEMO_ID_TOKEN could not be decoded");
    }

    tracing::warn!("DEMO_ID_TOKEN not set; using built-in demo principal");
    let ns = &config.claim_namespace;
    Ok(Principal::new(SubjectId::new("demo|admin")?)
        .with_name("Demo Admin")
        .with_email("admin@acme.example", true)
        .with_claim(ns.key("roles"), json!([Role::ADMIN, "user"]))
        .with_claim(ns.key("tenant"), json!("acme"))
        .with_claim(
            ns.key("permissions"),
            json!(["read:resources", "read:tenant", "read:analytics", "admin:dashboard"]),
        ))
}
