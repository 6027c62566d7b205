// src/services/document_service.rs

use genpdf::{elements, style, Element};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::report::MonthlyReport,
    services::report_service::ReportService,
};

#[derive(Clone)]
pub struct DocumentService {
    report_service: ReportService,
    fonts_dir: String,
}

impl DocumentService {
    pub fn new(report_service: ReportService, fonts_dir: String) -> Self {
        Self { report_service, fonts_dir }
    }

    /// Relatório mensal em PDF, pronto para download.
    pub async fn monthly_report_pdf(
        &self,
        pool: &PgPool,
        year: i32,
        month: i32,
    ) -> Result<Vec<u8>, AppError> {
        let report = self.report_service.monthly_report(pool, year, month).await?;
        let fonts_dir = self.fonts_dir.clone();

        // Renderização é CPU pura; fica fora do runtime
        tokio::task::spawn_blocking(move || render_monthly_report(&report, &fonts_dir))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de renderização do PDF: {}", e))?
    }
}

fn money(value: Decimal) -> String {
    format!("R$ {:.2}", value)
}

fn percent(value: Decimal) -> String {
    format!("{:.1}%", value)
}

fn pdf_error(e: genpdf::error::Error) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

// Tabela com cabeçalho em negrito; pesos iguais por coluna
fn table(headers: &[&str], rows: Vec<Vec<String>>) -> Result<elements::TableLayout, AppError> {
    let mut table = elements::TableLayout::new(vec![1; headers.len()]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let bold = style::Style::new().bold();
    let mut header = table.row();
    for h in headers {
        header = header.element(elements::Paragraph::new(*h).styled(bold));
    }
    header.push().map_err(pdf_error)?;

    for row in rows {
        let mut line = table.row();
        for cell in row {
            line = line.element(elements::Paragraph::new(cell));
        }
        line.push().map_err(pdf_error)?;
    }
    Ok(table)
}

fn section(doc: &mut genpdf::Document, title: &str) {
    doc.push(elements::Break::new(1.5));
    doc.push(
        elements::Paragraph::new(title).styled(style::Style::new().bold().with_font_size(13)),
    );
    doc.push(elements::Break::new(0.5));
}

pub fn render_monthly_report(report: &MonthlyReport, fonts_dir: &str) -> Result<Vec<u8>, AppError> {
    let font_family = genpdf::fonts::from_files(fonts_dir, "Roboto", None)
        .map_err(|_| AppError::FontNotFound(fonts_dir.to_string()))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Relatório Mensal {}", report.period));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    doc.push(
        elements::Paragraph::new(format!("RELATÓRIO MENSAL - {}", report.period))
            .styled(style::Style::new().bold().with_font_size(18)),
    );

    // --- TOTAIS ---
    let t = &report.totals;
    section(&mut doc, "Resumo");
    doc.push(table(
        &["Indicador", "Valor"],
        vec![
            vec!["Previsto".into(), money(t.target)],
            vec!["Realizado".into(), money(t.actual)],
            vec!["Serviços".into(), format!("{} ({})", money(t.service_actual), percent(t.service_share_percent))],
            vec!["Tecnologia".into(), format!("{} ({})", money(t.technology_actual), percent(t.technology_share_percent))],
            vec!["Performance".into(), percent(t.attainment_percent)],
            vec!["Meta geral (80%)".into(), money(t.general_target)],
            vec!["Diferença p/ meta geral".into(), money(t.difference_to_general_target)],
            vec!["Ticket médio".into(), money(t.average_ticket)],
        ],
    )?);

    let v = &report.variations;
    section(&mut doc, "Variações");
    doc.push(table(
        &["Comparação", "Realizado", "Variação"],
        vec![
            vec!["Mês anterior".into(), money(v.prior_month_actual), percent(v.vs_prior_month_percent)],
            vec!["Mesmo mês do ano anterior".into(), money(v.prior_year_actual), percent(v.vs_prior_year_percent)],
        ],
    )?);

    // --- TÉCNICOS ---
    if !report.per_technician.is_empty() {
        section(&mut doc, "Desempenho por técnico");
        let rows = report
            .per_technician
            .iter()
            .map(|p| {
                vec![
                    p.label.clone(),
                    money(p.quota_target),
                    money(p.actual_sum),
                    percent(p.attainment_percent),
                ]
            })
            .collect();
        doc.push(table(&["Técnico", "Meta", "Realizado", "Atingimento"], rows)?);
    }

    // --- TECNOLOGIA ---
    if !report.commissions.categories.is_empty() {
        section(&mut doc, "Tecnologia e comissões");
        let rows = report
            .commissions
            .categories
            .iter()
            .map(|c| {
                vec![
                    c.category.clone(),
                    money(c.actual_amount),
                    percent(c.rate_percent),
                    money(c.commission),
                ]
            })
            .collect();
        doc.push(table(&["Categoria", "Realizado", "Taxa", "Comissão"], rows)?);

        let mut total = elements::Paragraph::new(format!(
            "TOTAL DE COMISSÕES: {}",
            money(report.commissions.total)
        ));
        total.set_alignment(genpdf::Alignment::Right);
        doc.push(total.styled(style::Style::new().bold()));
    }

    // --- LOGÍSTICA ---
    let l = &report.logistics;
    if l.totals.entry_count > 0 {
        section(&mut doc, "Logística");
        let mut rows: Vec<Vec<String>> = l
            .per_vehicle
            .iter()
            .map(|(plate, v)| {
                vec![
                    plate.clone(),
                    format!("{:.1}", v.km_driven),
                    money(v.diesel_cost + v.maintenance_cost),
                    format!("{:.2}", v.cost_per_km),
                    format!("{:.2}", v.efficiency_km_per_liter),
                ]
            })
            .collect();
        rows.push(vec![
            "TOTAL".into(),
            format!("{:.1}", l.totals.km_driven),
            money(l.totals.total_cost()),
            format!("{:.2}", l.totals.cost_per_km),
            format!("{:.2}", l.totals.efficiency_km_per_liter),
        ]);
        doc.push(table(&["Placa", "Km", "Custo", "R$/km", "Km/l"], rows)?);
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_error)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::report_service::{build_monthly_report, ReportInputs};

    #[test]
    fn missing_fonts_are_reported() {
        let report = build_monthly_report(2026, 3, &ReportInputs::default());
        let result = render_monthly_report(&report, "/caminho/inexistente");
        assert!(matches!(result, Err(AppError::FontNotFound(_))));
    }

    #[test]
    fn money_uses_two_decimals() {
        assert_eq!(money(Decimal::new(12345, 1)), "R$ 1234.50");
        assert_eq!(percent(Decimal::from(100)), "100.0%");
    }
}
