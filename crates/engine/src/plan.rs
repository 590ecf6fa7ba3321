//! Plot selection → plan submission wizard.
//!
//! The one genuinely multi-step flow in the client, kept as an explicit,
//! fully enumerable state machine: the plot list loads once, picking a plot
//! fills a read-only detail panel from the already-held list (no extra
//! fetch), and submission requires the anti-forgery token before any request
//! exists. A successful submission parks the wizard in `Redirecting` and
//! hands the front end a [`Redirect`] with the fixed human-perceptible delay
//! before navigation — the only irreversible side effect in the client.

use safra_types::{CriarPlanoResponse, Terreno};
use tracing::warn;

use crate::error::FetchError;

/// Pause between the success message and the navigation, in milliseconds.
pub const REDIRECT_DELAY_MS: u64 = 1500;

const NO_TERRENOS: &str = "Nenhum terreno cadastrado. Crie um terreno antes de iniciar um plano.";
const LOAD_ERROR: &str = "Erro ao carregar terrenos. Tente novamente.";
const SELECT_READY: &str = "Pronto para iniciar o plano.";
const SELECT_MISSING: &str = "Nenhum detalhe encontrado para o item selecionado.";
const MISSING_CSRF: &str = "Token de segurança ausente. Recarregue a sessão e tente novamente.";
const SUBMITTING: &str = "Enviando seleção...";
const SUBMIT_SUCCESS: &str = "Plano criado com sucesso.";
const SUBMIT_FAILED: &str = "Não foi possível iniciar o plano. Tente novamente.";
const SUBMIT_CONNECTION: &str = "Erro de conexão ao iniciar o plano. Tente novamente.";

/// User-visible status message with its severity flag.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

impl StatusLine {
    fn info(text: impl Into<String>) -> Self {
        StatusLine { text: text.into(), is_error: false }
    }

    fn error(text: impl Into<String>) -> Self {
        StatusLine { text: text.into(), is_error: true }
    }
}

/// Submission sub-state once the plot list is on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Idle,
    Submitting,
    Redirecting { next_url: String },
}

/// Wizard state while the plot list is available.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadyState {
    pub terrenos: Vec<Terreno>,
    pub selected: Option<usize>,
    pub submission: Submission,
    pub status: StatusLine,
}

/// Read-only detail panel contents for the chosen plot.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrenoDetail {
    pub nome: String,
    pub tamanho: String,
    pub localizacao: String,
}

/// Instruction to POST the chosen plot. Only [`PlanWizard::begin_submit`]
/// produces one, and only with a token in hand.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOrder {
    pub terreno_id: i64,
    pub csrf_token: String,
}

/// Instruction to navigate after the fixed delay.
#[derive(Debug, Clone, PartialEq)]
pub struct Redirect {
    pub next_url: String,
    pub delay_ms: u64,
}

/// The plot-selection wizard state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanWizard {
    Loading,
    LoadFailed { message: String },
    Ready(ReadyState),
}

impl Default for PlanWizard {
    fn default() -> Self {
        PlanWizard::Loading
    }
}

impl PlanWizard {
    pub fn ready(&self) -> Option<&ReadyState> {
        match self {
            PlanWizard::Ready(state) => Some(state),
            _ => None,
        }
    }

    /// `Loading → Ready | LoadFailed` from the plot-list fetch.
    pub fn apply_load(&mut self, result: Result<Vec<Terreno>, FetchError>) {
        *self = match result {
            Ok(terrenos) if terrenos.is_empty() => PlanWizard::Ready(ReadyState {
                terrenos,
                selected: None,
                submission: Submission::Idle,
                status: StatusLine::error(NO_TERRENOS),
            }),
            Ok(terrenos) => {
                let status = StatusLine::info(format!("Foram encontrados {} terreno(s).", terrenos.len()));
                PlanWizard::Ready(ReadyState {
                    terrenos,
                    selected: None,
                    submission: Submission::Idle,
                    status,
                })
            }
            Err(e) => {
                warn!(error = %e, "failed to load terrenos");
                let message = match e {
                    FetchError::Http { detail, .. } if !detail.is_empty() => detail,
                    _ => LOAD_ERROR.to_string(),
                };
                PlanWizard::LoadFailed { message }
            }
        };
    }

    /// `Ready → Selected`: pick a plot from the loaded list. An out-of-range
    /// index clears the selection, mirroring the original's missing-item
    /// branch.
    pub fn select(&mut self, index: usize) {
        let PlanWizard::Ready(state) = self else {
            return;
        };
        if !matches!(state.submission, Submission::Idle) {
            return;
        }
        if index < state.terrenos.len() {
            state.selected = Some(index);
            state.status = StatusLine::info(SELECT_READY);
        } else {
            state.selected = None;
            state.status = StatusLine::error(SELECT_MISSING);
        }
    }

    /// Detail panel contents for the current selection; placeholder values
    /// when nothing is selected.
    pub fn detail(&self) -> TerrenoDetail {
        let selected = self
            .ready()
            .and_then(|s| s.selected.map(|i| &s.terrenos[i]));
        match selected {
            Some(t) => TerrenoDetail {
                nome: t.nome.clone(),
                tamanho: format!("{} {}", t.area_total, t.unidade_area),
                localizacao: t.localizacao_display.clone(),
            },
            None => TerrenoDetail {
                nome: "N/A".into(),
                tamanho: "0 ha".into(),
                localizacao: "N/A".into(),
            },
        }
    }

    /// Whether the submit control is live.
    pub fn can_submit(&self) -> bool {
        self.ready().is_some_and(|s| {
            s.selected.is_some() && matches!(s.submission, Submission::Idle)
        })
    }

    /// `Selected → Submitting`, gated on the anti-forgery token.
    ///
    /// Without a token this is a local precondition failure: a visible
    /// security error, no request, and the wizard stays submittable once the
    /// token problem is fixed.
    pub fn begin_submit(&mut self, csrf_token: Option<&str>) -> Option<SubmitOrder> {
        if !self.can_submit() {
            return None;
        }
        let PlanWizard::Ready(state) = self else {
            return None;
        };
        let token = match csrf_token {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                state.status = StatusLine::error(MISSING_CSRF);
                return None;
            }
        };
        let index = state.selected?;
        let terreno_id = state.terrenos[index].id;
        state.submission = Submission::Submitting;
        state.status = StatusLine::info(SUBMITTING);
        Some(SubmitOrder { terreno_id, csrf_token: token })
    }

    /// `Submitting → Redirecting` on success, back to the selected state on
    /// logical failure or transport error.
    pub fn apply_submit_result(
        &mut self,
        result: Result<CriarPlanoResponse, FetchError>,
    ) -> Option<Redirect> {
        let PlanWizard::Ready(state) = self else {
            return None;
        };
        if !matches!(state.submission, Submission::Submitting) {
            return None;
        }
        match result {
            Ok(resp) if resp.success && resp.next_url.is_some() => {
                let next_url = resp.next_url.unwrap_or_default();
                state.status =
                    StatusLine::info(resp.message.unwrap_or_else(|| SUBMIT_SUCCESS.to_string()));
                state.submission = Submission::Redirecting { next_url: next_url.clone() };
                Some(Redirect {
                    next_url,
                    delay_ms: REDIRECT_DELAY_MS,
                })
            }
            Ok(resp) => {
                let message = resp
                    .error
                    .or(resp.message)
                    .unwrap_or_else(|| SUBMIT_FAILED.to_string());
                state.status = StatusLine::error(message);
                state.submission = Submission::Idle;
                None
            }
            Err(e) => {
                warn!(error = %e, "plan submission failed");
                state.status = StatusLine::error(SUBMIT_CONNECTION);
                state.submission = Submission::Idle;
                None
            }
        }
    }

    /// The delay elapsed; hand back the navigation target.
    pub fn complete_redirect(&self) -> Option<String> {
        match self.ready()?.submission {
            Submission::Redirecting { ref next_url } => Some(next_url.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terreno(id: i64, nome: &str) -> Terreno {
        Terreno {
            id,
            nome: nome.to_string(),
            area_total: "12.50".into(),
            unidade_area: "ha".into(),
            cidade_nome: "Bauru".into(),
            estado_sigla: "SP".into(),
            localizacao_display: "Bauru / SP".into(),
        }
    }

    fn loaded_wizard() -> PlanWizard {
        let mut wizard = PlanWizard::default();
        wizard.apply_load(Ok(vec![terreno(1, "Sítio Norte"), terreno(2, "Gleba Sul")]));
        wizard
    }

    #[test]
    fn empty_list_disables_submission_with_notice() {
        let mut wizard = PlanWizard::default();
        wizard.apply_load(Ok(vec![]));
        let state = wizard.ready().unwrap();
        assert!(state.status.is_error);
        assert_eq!(state.status.text, NO_TERRENOS);
        assert!(!wizard.can_submit());
    }

    #[test]
    fn load_failure_surfaces_server_detail() {
        let mut wizard = PlanWizard::default();
        wizard.apply_load(Err(FetchError::Http {
            status: 500,
            detail: "Erro interno ao listar terrenos".into(),
        }));
        assert_eq!(
            wizard,
            PlanWizard::LoadFailed { message: "Erro interno ao listar terrenos".into() }
        );
    }

    #[test]
    fn selection_fills_detail_from_held_list() {
        let mut wizard = loaded_wizard();
        assert_eq!(wizard.detail().nome, "N/A");

        wizard.select(0);
        let detail = wizard.detail();
        assert_eq!(detail.nome, "Sítio Norte");
        assert_eq!(detail.tamanho, "12.50 ha");
        assert_eq!(detail.localizacao, "Bauru / SP");
        assert!(wizard.can_submit());
    }

    #[test]
    fn out_of_range_selection_clears_detail() {
        let mut wizard = loaded_wizard();
        wizard.select(9);
        assert_eq!(wizard.detail().tamanho, "0 ha");
        assert!(!wizard.can_submit());
        assert!(wizard.ready().unwrap().status.is_error);
    }

    #[test]
    fn submit_without_token_issues_no_request() {
        let mut wizard = loaded_wizard();
        wizard.select(0);
        assert_eq!(wizard.begin_submit(None), None);
        let state = wizard.ready().unwrap();
        assert!(state.status.is_error);
        assert_eq!(state.submission, Submission::Idle);
        // Still resubmittable once the token exists.
        assert!(wizard.can_submit());
    }

    #[test]
    fn submit_with_token_transitions_to_submitting() {
        let mut wizard = loaded_wizard();
        wizard.select(1);
        let order = wizard.begin_submit(Some("tok")).unwrap();
        assert_eq!(order.terreno_id, 2);
        assert_eq!(order.csrf_token, "tok");
        assert!(!wizard.can_submit());
        // A second submit while in flight is rejected.
        assert_eq!(wizard.begin_submit(Some("tok")), None);
    }

    #[test]
    fn logical_failure_shows_server_message_and_allows_resubmit() {
        let mut wizard = loaded_wizard();
        wizard.select(0);
        wizard.begin_submit(Some("tok")).unwrap();

        let redirect = wizard.apply_submit_result(Ok(CriarPlanoResponse {
            success: false,
            error: Some("X".into()),
            ..Default::default()
        }));
        assert_eq!(redirect, None);
        let state = wizard.ready().unwrap();
        assert_eq!(state.status.text, "X");
        assert!(state.status.is_error);
        assert!(wizard.can_submit());
    }

    #[test]
    fn success_schedules_the_delayed_redirect() {
        let mut wizard = loaded_wizard();
        wizard.select(0);
        wizard.begin_submit(Some("tok")).unwrap();

        let redirect = wizard
            .apply_submit_result(Ok(CriarPlanoResponse {
                success: true,
                message: Some("Plano iniciado.".into()),
                next_url: Some("/plano/etapa1/7/".into()),
                ..Default::default()
            }))
            .unwrap();
        assert_eq!(redirect.next_url, "/plano/etapa1/7/");
        assert_eq!(redirect.delay_ms, REDIRECT_DELAY_MS);
        assert!(!wizard.can_submit());
        assert_eq!(wizard.complete_redirect().as_deref(), Some("/plano/etapa1/7/"));
    }

    #[test]
    fn success_without_next_url_is_a_logical_failure() {
        let mut wizard = loaded_wizard();
        wizard.select(0);
        wizard.begin_submit(Some("tok")).unwrap();
        let redirect = wizard.apply_submit_result(Ok(CriarPlanoResponse {
            success: true,
            ..Default::default()
        }));
        assert_eq!(redirect, None);
        assert!(wizard.can_submit());
    }

    #[test]
    fn transport_failure_returns_to_selected() {
        let mut wizard = loaded_wizard();
        wizard.select(0);
        wizard.begin_submit(Some("tok")).unwrap();
        let redirect =
            wizard.apply_submit_result(Err(FetchError::Transport("connection refused".into())));
        assert_eq!(redirect, None);
        let state = wizard.ready().unwrap();
        assert_eq!(state.status.text, SUBMIT_CONNECTION);
        assert!(wizard.can_submit());
    }
}
