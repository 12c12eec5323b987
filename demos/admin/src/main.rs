//! Command-line admin demo
//!
//! Restores the session from `MEALDESK_TOKEN_PATH`, logs in when
//! `MEALDESK_EMAIL` and `MEALDESK_PASSWORD` are set, then prints every
//! recipe, meal and app user.
//!
//! ```bash
//! MEALDESK_API_BASE_URL=http://localhost:3000 \
//! MEALDESK_EMAIL=admin@example.com MEALDESK_PASSWORD=secret \
//!     cargo run -p mealdesk-admin
//! ```
//!
//! Set `MEALDESK_METRICS_ADDR` (e.g. `127.0.0.1:9000`) to expose cache
//! counters for Prometheus while the demo runs.

use mealdesk_core::environment::Navigator;
use mealdesk_core::{LoginCredentials, Route};
use mealdesk_runtime::AdminContext;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// There is no router in a terminal; routes are logged
struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &Route) {
        tracing::info!(%route, "Navigate");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mealdesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(addr) = env::var("MEALDESK_METRICS_ADDR") {
        let addr: SocketAddr = addr.parse()?;
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        tracing::info!(%addr, "Prometheus metrics exported");
    }

    let context = AdminContext::from_env(Arc::new(LogNavigator))?;

    match (env::var("MEALDESK_EMAIL"), env::var("MEALDESK_PASSWORD")) {
        (Ok(email), Ok(password)) => {
            context
                .auth
                .login(&LoginCredentials::new(email, password))
                .await?;
        },
        _ if !context.session.is_authenticated() => {
            tracing::warn!("No stored session; set MEALDESK_EMAIL and MEALDESK_PASSWORD to log in");
        },
        _ => {},
    }

    println!("Recipes:");
    for recipe in context.recipes.list().await? {
        println!(
            "  #{} {} ({} min, {} by {})",
            recipe.id, recipe.description, recipe.cooking_time, recipe.meal.name, recipe.user.name
        );
    }

    println!("Meals:");
    for meal in context.meals.list().await? {
        println!("  #{} {} [{}]", meal.id, meal.name, meal.meal_type);
    }

    println!("App users:");
    for user in context.app_users.list().await? {
        let status = if user.is_registered { "registered" } else { "pending" };
        println!("  #{} {} ({status})", user.id, user.user_name);
    }

    context.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
