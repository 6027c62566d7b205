// src/views.rs
//
// Estado explícito das telas do painel: quais visões uma mutação invalida e
// qual resposta é a mais recente de cada visão.

use axum::http::HeaderMap;
use serde::Serialize;
use utoipa::ToSchema;

use crate::middleware::sequencing::{RequestSeq, REQUEST_SEQ_HEADER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ViewKind {
    Sales,
    Technicians,
    TechnicianQuotas,
    FactoryQuotas,
    Logistics,
    LogisticsSummary,
    Technology,
    MonthlyReport,
    Analytics,
}

/// Cadastros que podem ser alterados pela API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Sale,
    Technician,
    TechnicianQuota,
    FactoryQuota,
    LogisticsEntry,
    TechnologyVendor,
    TechnologyVendorQuota,
    TechnologyCategoryQuota,
}

impl Entity {
    /// Visões que precisam ser buscadas de novo depois de uma mutação.
    pub fn affected_views(self) -> Vec<ViewKind> {
        use ViewKind::*;
        match self {
            Entity::Sale => vec![Sales, MonthlyReport, Analytics],
            Entity::Technician => vec![Technicians, Sales, TechnicianQuotas, MonthlyReport, Analytics],
            Entity::TechnicianQuota => vec![TechnicianQuotas, MonthlyReport, Analytics],
            Entity::FactoryQuota => vec![FactoryQuotas, MonthlyReport],
            Entity::LogisticsEntry => vec![Logistics, LogisticsSummary, MonthlyReport, Analytics],
            Entity::TechnologyVendor | Entity::TechnologyVendorQuota => vec![Technology],
            Entity::TechnologyCategoryQuota => vec![Technology, Analytics],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum MutationStatus {
    Created,
    Updated,
    Deleted,
    Deactivated,
}

/// Resultado de toda escrita: a linha gravada (quando existe) e o que re-buscar.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Mutation<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub status: MutationStatus,
    pub invalidates: Vec<ViewKind>,
}

impl<T> Mutation<T> {
    pub fn new(entity: Entity, status: MutationStatus, data: Option<T>) -> Self {
        Self { data, status, invalidates: entity.affected_views() }
    }

    pub fn created(entity: Entity, data: T) -> Self {
        Self::new(entity, MutationStatus::Created, Some(data))
    }

    pub fn updated(entity: Entity, data: T) -> Self {
        Self::new(entity, MutationStatus::Updated, Some(data))
    }
}

impl Mutation<()> {
    pub fn removed(entity: Entity, status: MutationStatus) -> Self {
        Self::new(entity, status, None)
    }
}

/// Fase de uma visão do lado do cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Estado de uma visão, mantido pelo cliente do painel (o servidor não guarda
/// estado de tela). O cliente numera cada busca com `begin_fetch`, manda o
/// número em `x-request-seq` e aplica a resposta com `accept_echoed`, que lê o
/// número devolvido pelo servidor. Só a resposta da busca mais recente é
/// aceita: uma resposta atrasada nunca sobrescreve uma mais nova.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState<T> {
    pub kind: ViewKind,
    pub status: ViewStatus,
    pub data: Option<T>,
    pub error: Option<String>,
    latest_seq: u64,
}

impl<T> ViewState<T> {
    pub fn new(kind: ViewKind) -> Self {
        Self { kind, status: ViewStatus::Idle, data: None, error: None, latest_seq: 0 }
    }

    /// Inicia uma busca e devolve o número a mandar em `x-request-seq`.
    pub fn begin_fetch(&mut self) -> u64 {
        self.latest_seq += 1;
        self.status = ViewStatus::Loading;
        self.latest_seq
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Aplica a resposta se ela for da busca mais recente.
    pub fn accept(&mut self, seq: u64, data: T) -> bool {
        if seq != self.latest_seq {
            tracing::debug!(?self.kind, seq, latest = self.latest_seq, "Resposta obsoleta descartada");
            return false;
        }
        self.data = Some(data);
        self.error = None;
        self.status = ViewStatus::Ready;
        true
    }

    /// Aplica a resposta usando o número ecoado em `x-request-seq`.
    /// Sem número válido, a resposta é descartada.
    pub fn accept_echoed(&mut self, headers: &HeaderMap, data: T) -> bool {
        match RequestSeq::from_header(headers.get(&REQUEST_SEQ_HEADER)).0 {
            Some(seq) => self.accept(seq, data),
            None => false,
        }
    }

    /// Registra a falha; os dados anteriores continuam visíveis.
    pub fn fail(&mut self, seq: u64, message: impl Into<String>) -> bool {
        if seq != self.latest_seq {
            return false;
        }
        self.error = Some(message.into());
        self.status = ViewStatus::Failed;
        true
    }

    pub fn is_invalidated_by<U>(&self, mutation: &Mutation<U>) -> bool {
        mutation.invalidates.contains(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_response_never_overwrites_newer_one() {
        let mut view: ViewState<&str> = ViewState::new(ViewKind::MonthlyReport);
        let march = view.begin_fetch();
        let april = view.begin_fetch();

        assert!(view.accept(april, "abril"));
        assert!(!view.accept(march, "março"));
        assert_eq!(view.data, Some("abril"));
        assert_eq!(view.status, ViewStatus::Ready);
    }

    #[test]
    fn client_applies_only_the_latest_echoed_response() {
        use axum::Json;

        let mut view: ViewState<u32> = ViewState::new(ViewKind::Analytics);
        let first = view.begin_fetch();
        let second = view.begin_fetch();

        // o servidor responde fora de ordem
        let late = RequestSeq(Some(first)).echo(Json(1));
        let fresh = RequestSeq(Some(second)).echo(Json(2));
        assert!(view.accept_echoed(fresh.headers(), 2));
        assert!(!view.accept_echoed(late.headers(), 1));
        assert_eq!(view.data, Some(2));

        let unnumbered = RequestSeq(None).echo(Json(3));
        assert!(!view.accept_echoed(unnumbered.headers(), 3));
        assert_eq!(view.data, Some(2));
    }

    #[test]
    fn failure_keeps_previous_data() {
        let mut view: ViewState<u32> = ViewState::new(ViewKind::Sales);
        let first = view.begin_fetch();
        view.accept(first, 10);

        let second = view.begin_fetch();
        assert!(!view.fail(first, "atrasada"));
        assert!(view.fail(second, "falhou"));
        assert_eq!(view.data, Some(10));
        assert_eq!(view.status, ViewStatus::Failed);
    }

    #[test]
    fn sale_mutation_invalidates_report_views() {
        let mutation = Mutation::created(Entity::Sale, 1);
        assert_eq!(mutation.status, MutationStatus::Created);

        let report: ViewState<()> = ViewState::new(ViewKind::MonthlyReport);
        let technology: ViewState<()> = ViewState::new(ViewKind::Technology);
        assert!(report.is_invalidated_by(&mutation));
        assert!(!technology.is_invalidated_by(&mutation));
    }

    #[test]
    fn removal_serializes_without_data() {
        let mutation = Mutation::removed(Entity::Technician, MutationStatus::Deactivated);
        let json = serde_json::to_value(&mutation).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["status"], "deactivated");
        assert_eq!(json["invalidates"][0], "technicians");
    }
}
