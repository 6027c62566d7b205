// src/main.rs

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::{net::TcpListener, signal};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use painel_relatorios::{
    config::AppState,
    docs::ApiDoc,
    handlers::{auth, logistics, reports, sales, technicians, technology},
    middleware::auth::auth_guard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new()
        .await
        .context("Falha ao inicializar o estado da aplicação")?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas
    let public_routes = Router::new()
        .route("/api/health", get(reports::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    // Todo o resto exige Bearer token
    let protected_routes = Router::new()
        .route("/api/users/me", get(auth::get_me))
        // --- Vendas ---
        .route("/api/sales", get(sales::list_sales).post(sales::create_sale))
        .route("/api/sales/{id}", put(sales::update_sale).delete(sales::delete_sale))
        // --- Técnicos e metas ---
        .route(
            "/api/technicians",
            get(technicians::list_technicians).post(technicians::create_technician),
        )
        .route(
            "/api/technicians/{id}",
            put(technicians::update_technician).delete(technicians::remove_technician),
        )
        .route(
            "/api/technician-quotas",
            get(technicians::list_quotas)
                .post(technicians::create_quota)
                .put(technicians::upsert_quota),
        )
        .route(
            "/api/technician-quotas/{id}",
            put(technicians::update_quota).delete(technicians::delete_quota),
        )
        .route(
            "/api/factory-quotas",
            get(technicians::list_factory_quotas).put(technicians::upsert_factory_quota),
        )
        // --- Logística ---
        .route("/api/logistics", get(logistics::list_entries).post(logistics::create_entry))
        .route("/api/logistics/plates", get(logistics::list_plates))
        .route("/api/logistics/summary", get(logistics::summary))
        .route(
            "/api/logistics/{id}",
            put(logistics::update_entry).delete(logistics::delete_entry),
        )
        // --- Tecnologia ---
        .route("/api/technology/commission-rules", get(technology::commission_rules))
        .route("/api/technology/summary", get(technology::summary))
        .route(
            "/api/technology/vendors",
            get(technology::list_vendors).post(technology::create_vendor),
        )
        .route(
            "/api/technology/vendors/{id}",
            put(technology::update_vendor).delete(technology::remove_vendor),
        )
        .route(
            "/api/technology/vendor-quotas",
            get(technology::list_vendor_quotas).post(technology::create_vendor_quota),
        )
        .route(
            "/api/technology/vendor-quotas/{id}",
            put(technology::update_vendor_quota).delete(technology::delete_vendor_quota),
        )
        .route(
            "/api/technology/category-quotas",
            get(technology::list_category_quotas).post(technology::create_category_quota),
        )
        .route(
            "/api/technology/category-quotas/{id}",
            put(technology::update_category_quota).delete(technology::delete_category_quota),
        )
        // --- Relatórios ---
        .route("/api/reports/monthly", get(reports::monthly_report))
        .route("/api/reports/monthly/pdf", get(reports::monthly_report_pdf))
        .route("/api/analytics", get(reports::annual_analytics))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let bind_addr = app_state.config.bind_addr.clone();

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Falha ao escutar em {bind_addr}"))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Erro no servidor Axum")?;

    tracing::info!("👋 Servidor encerrado");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Falha ao instalar o handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Falha ao instalar o handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("🛑 Ctrl+C recebido, encerrando..."),
        _ = terminate => tracing::info!("🛑 SIGTERM recebido, encerrando..."),
    }
}
