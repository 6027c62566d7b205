// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{LogisticsRepository, SalesRepository, TechnicianRepository, TechnologyRepository, UserRepository},
    services::{
        analytics_service::AnalyticsService, auth::AuthService, document_service::DocumentService,
        logistics_service::LogisticsService, report_service::ReportService,
        sales_service::SalesService, technician_service::TechnicianService,
        technology_service::TechnologyService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_FONTS_DIR: &str = "./fonts";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub fonts_dir: String,
}

impl Config {
    /// Lê o `.env` (se existir) e as variáveis de ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {raw}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            max_connections,
            fonts_dir: lookup("PDF_FONTS_DIR").unwrap_or_else(|| DEFAULT_FONTS_DIR.to_string()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub auth_service: AuthService,
    pub sales_service: SalesService,
    pub technician_service: TechnicianService,
    pub logistics_service: LogisticsService,
    pub technology_service: TechnologyService,
    pub report_service: ReportService,
    pub analytics_service: AnalyticsService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, config: Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let sales_repo = SalesRepository::new(db_pool.clone());
        let technician_repo = TechnicianRepository::new(db_pool.clone());
        let logistics_repo = LogisticsRepository::new(db_pool.clone());
        let technology_repo = TechnologyRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, config.jwt_secret.clone(), db_pool.clone());
        let report_service = ReportService::new(
            sales_repo.clone(),
            technician_repo.clone(),
            logistics_repo.clone(),
        );
        let analytics_service = AnalyticsService::new(
            sales_repo.clone(),
            technician_repo.clone(),
            technology_repo.clone(),
            logistics_repo.clone(),
        );
        let document_service = DocumentService::new(report_service.clone(), config.fonts_dir.clone());

        Self {
            auth_service,
            sales_service: SalesService::new(sales_repo),
            technician_service: TechnicianService::new(technician_repo),
            logistics_service: LogisticsService::new(logistics_repo),
            technology_service: TechnologyService::new(technology_repo),
            report_service,
            analytics_service,
            document_service,
            db_pool,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_fill_optional_settings() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/painel"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.fonts_dir, "./fonts");
    }

    #[test]
    fn missing_secret_is_an_error() {
        let result = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/painel")]));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_pool_size_is_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/painel"),
            ("JWT_SECRET", "segredo"),
            ("DATABASE_MAX_CONNECTIONS", "muitas"),
        ]));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn state_wires_every_service() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/painel"),
            ("JWT_SECRET", "segredo"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();

        let state = AppState::with_pool(pool, config);
        assert_eq!(state.config.bind_addr, "127.0.0.1:8080");
        assert_eq!(state.technology_service.commission_rules().len(), 5);
    }
}
