//! Dashboard list of existing planting plans.
//!
//! Read-only companion to the plot wizard: the user's plans, each with crop,
//! plot, location, start date, and a status badge. A failure here degrades
//! only this panel — the plot selector keeps working.

use chrono::NaiveDate;
use safra_types::PlanoResumo;
use tracing::warn;

use crate::error::FetchError;

const EMPTY_NOTICE: &str = "Nenhum plano de plantio ainda. Selecione um terreno para começar.";
const LOAD_ERROR: &str = "Erro ao buscar planos.";

/// Style role of a plan status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanoStatusRole {
    /// Default: in progress.
    Andamento,
    Concluido,
    Cancelado,
}

impl PlanoStatusRole {
    pub fn from_status(status: &str) -> Self {
        match status {
            "Concluído" => PlanoStatusRole::Concluido,
            "Cancelado" => PlanoStatusRole::Cancelado,
            _ => PlanoStatusRole::Andamento,
        }
    }
}

/// Render-ready row of the plans list.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanoView {
    pub nome: String,
    pub cultivo: String,
    pub terreno: String,
    pub localizacao: String,
    pub inicio: String,
    pub status: String,
    pub role: PlanoStatusRole,
}

impl PlanoView {
    pub fn from_resumo(resumo: &PlanoResumo) -> Self {
        PlanoView {
            nome: resumo.nome.clone(),
            cultivo: resumo.produto_nome.clone(),
            terreno: resumo.terreno_nome.clone(),
            localizacao: resumo.localizacao_display.clone(),
            inicio: prettify_date(&resumo.data_inicio),
            status: resumo.status.clone(),
            role: PlanoStatusRole::from_status(&resumo.status),
        }
    }
}

/// ISO dates become `dd/mm/yyyy`; anything else passes through untouched.
fn prettify_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Status of the plans panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanosPanel {
    Loading,
    Ready(Vec<PlanoView>),
    /// Loaded fine, zero plans.
    Empty,
    Failed(String),
}

impl PlanosPanel {
    pub fn apply(result: Result<Vec<PlanoResumo>, FetchError>) -> Self {
        match result {
            Ok(planos) if planos.is_empty() => PlanosPanel::Empty,
            Ok(planos) => PlanosPanel::Ready(planos.iter().map(PlanoView::from_resumo).collect()),
            Err(e) => {
                warn!(error = %e, "failed to load plan list");
                let message = match e {
                    FetchError::Http { detail, .. } if !detail.is_empty() => {
                        format!("{} {}", LOAD_ERROR, detail)
                    }
                    _ => LOAD_ERROR.to_string(),
                };
                PlanosPanel::Failed(message)
            }
        }
    }

    pub fn empty_notice() -> &'static str {
        EMPTY_NOTICE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resumo(status: &str) -> PlanoResumo {
        PlanoResumo {
            id: 7,
            nome: "Plano em Rascunho para Sítio Norte (2026-08)".into(),
            produto_nome: "Milho".into(),
            terreno_nome: "Sítio Norte".into(),
            localizacao_display: "Bauru / SP".into(),
            data_inicio: "2026-08-06".into(),
            status: status.into(),
        }
    }

    #[test]
    fn status_roles_follow_the_badge_colors() {
        assert_eq!(PlanoStatusRole::from_status("Concluído"), PlanoStatusRole::Concluido);
        assert_eq!(PlanoStatusRole::from_status("Cancelado"), PlanoStatusRole::Cancelado);
        assert_eq!(PlanoStatusRole::from_status("Em Andamento"), PlanoStatusRole::Andamento);
        assert_eq!(PlanoStatusRole::from_status("RASCUNHO"), PlanoStatusRole::Andamento);
    }

    #[test]
    fn iso_dates_are_prettified_and_bad_dates_pass_through() {
        let view = PlanoView::from_resumo(&resumo("Em Andamento"));
        assert_eq!(view.inicio, "06/08/2026");
        let mut odd = resumo("Em Andamento");
        odd.data_inicio = "em breve".into();
        assert_eq!(PlanoView::from_resumo(&odd).inicio, "em breve");
    }

    #[test]
    fn panel_distinguishes_empty_from_failed() {
        assert_eq!(PlanosPanel::apply(Ok(vec![])), PlanosPanel::Empty);
        match PlanosPanel::apply(Err(FetchError::Http { status: 500, detail: "boom".into() })) {
            PlanosPanel::Failed(message) => assert!(message.contains("boom")),
            other => panic!("unexpected panel state: {:?}", other),
        }
        match PlanosPanel::apply(Ok(vec![resumo("Concluído")])) {
            PlanosPanel::Ready(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].role, PlanoStatusRole::Concluido);
            }
            other => panic!("unexpected panel state: {:?}", other),
        }
    }
}
