// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::{handlers, models, views};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::reports::health,

        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Sales ---
        handlers::sales::list_sales,
        handlers::sales::create_sale,
        handlers::sales::update_sale,
        handlers::sales::delete_sale,

        // --- Technicians ---
        handlers::technicians::list_technicians,
        handlers::technicians::create_technician,
        handlers::technicians::update_technician,
        handlers::technicians::remove_technician,
        handlers::technicians::list_quotas,
        handlers::technicians::create_quota,
        handlers::technicians::upsert_quota,
        handlers::technicians::update_quota,
        handlers::technicians::delete_quota,
        handlers::technicians::list_factory_quotas,
        handlers::technicians::upsert_factory_quota,

        // --- Logistics ---
        handlers::logistics::list_entries,
        handlers::logistics::list_plates,
        handlers::logistics::summary,
        handlers::logistics::create_entry,
        handlers::logistics::update_entry,
        handlers::logistics::delete_entry,

        // --- Technology ---
        handlers::technology::commission_rules,
        handlers::technology::summary,
        handlers::technology::list_vendors,
        handlers::technology::create_vendor,
        handlers::technology::update_vendor,
        handlers::technology::remove_vendor,
        handlers::technology::list_vendor_quotas,
        handlers::technology::create_vendor_quota,
        handlers::technology::update_vendor_quota,
        handlers::technology::delete_vendor_quota,
        handlers::technology::list_category_quotas,
        handlers::technology::create_category_quota,
        handlers::technology::update_category_quota,
        handlers::technology::delete_category_quota,

        // --- Reports ---
        handlers::reports::monthly_report,
        handlers::reports::monthly_report_pdf,
        handlers::reports::annual_analytics,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Sales ---
            models::sales::SaleKind,
            models::sales::SalesRecord,
            models::sales::Technician,
            models::sales::TechnicianQuota,
            models::sales::FactoryQuota,
            models::sales::CreateSalePayload,
            models::sales::UpdateSalePayload,
            models::sales::CreateTechnicianPayload,
            models::sales::UpdateTechnicianPayload,
            models::sales::CreateQuotaPayload,
            models::sales::UpsertQuotaPayload,
            models::sales::UpdateAmountsPayload,
            models::sales::FactoryQuotaPayload,

            // --- Logistics ---
            models::logistics::LogisticsEntry,
            models::logistics::CreateLogisticsPayload,
            models::logistics::UpdateLogisticsPayload,

            // --- Technology ---
            models::technology::TechnologyVendor,
            models::technology::TechnologyVendorQuota,
            models::technology::TechnologyCategoryQuota,
            models::technology::CreateVendorPayload,
            models::technology::UpdateVendorPayload,
            models::technology::CreateVendorQuotaPayload,
            models::technology::CreateCategoryQuotaPayload,

            // --- Relatórios ---
            models::analytics::MonthlyPoint,
            models::analytics::RollingPoint,
            models::analytics::GrowthPoint,
            models::analytics::EntityTotals,
            models::analytics::EntityGroups,
            models::analytics::RankEntry,
            models::analytics::SalesTotals,
            models::analytics::LogisticsTotals,
            models::analytics::LogisticsMonthlyPoint,
            models::analytics::LogisticsSummary,
            models::analytics::CommissionRuleView,
            models::analytics::CategoryCommission,
            models::analytics::CommissionBreakdown,
            models::analytics::CategorySummary,
            models::analytics::TechnologySummary,
            models::analytics::SeasonalityPoint,
            models::analytics::AnalyticsKpis,
            models::analytics::AnnualAnalytics,
            models::report::MonthlyReport,
            models::report::ReportTotals,
            models::report::ReportVariations,
            models::report::TechnicianPerformance,
            models::report::ReportRankings,

            // --- Mutações ---
            views::ViewKind,
            views::MutationStatus,
        )
    ),
    tags(
        (name = "Health", description = "Verificação do servidor"),
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Sales", description = "Lançamentos de Vendas (serviços e tecnologia)"),
        (name = "Technicians", description = "Cadastro de Técnicos"),
        (name = "Technician Quotas", description = "Metas Mensais por Técnico"),
        (name = "Factory Quotas", description = "Metas Mensais da Fábrica"),
        (name = "Logistics", description = "Frota: Diesel, Manutenção e Quilometragem"),
        (name = "Technology", description = "Vendedores, Metas e Comissões de Tecnologia"),
        (name = "Reports", description = "Relatório Mensal, PDF e Análise Anual")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_report_routes_and_jwt_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/reports/monthly"));
        assert!(doc.paths.paths.contains_key("/api/technician-quotas/{id}"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
