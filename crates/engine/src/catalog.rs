//! Catalog of backend fetch operations.
//!
//! [`CatalogProvider`] is the seam between the front ends and the network:
//! the TUI and CLI only ever talk to this trait, and tests substitute an
//! in-memory implementation. [`HttpCatalog`] is the real thing, built from an
//! [`AgroClient`] and validated [`Endpoints`].
//!
//! Policy (uniform across operations): transport failures and non-success
//! statuses are logged with context and surfaced as [`FetchError`]; a 404 on
//! the technical-sheet fetch is the expected "no record for this selection"
//! outcome and is neither logged nor treated as a fault. Nothing is retried.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::warn;

use safra_api::AgroClient;
use safra_types::{
    CriarPlanoResponse, FichaTecnica, ItemId, PlanoResumo, PlanosResponse, SelectableItem, Terreno,
    TerrenosResponse,
};

use crate::endpoints::Endpoints;
use crate::error::FetchError;

/// Backend operations the front ends depend on.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn list_states(&self) -> Result<Vec<SelectableItem>, FetchError>;
    async fn list_cities(&self, state_id: &ItemId) -> Result<Vec<SelectableItem>, FetchError>;
    async fn list_products(&self, city_id: &ItemId) -> Result<Vec<SelectableItem>, FetchError>;
    async fn list_terrenos(&self) -> Result<Vec<Terreno>, FetchError>;
    async fn list_planos(&self) -> Result<Vec<PlanoResumo>, FetchError>;
    async fn fetch_ficha(&self, product_name: &str, city_id: &ItemId)
    -> Result<FichaTecnica, FetchError>;
    /// Issue the plan-creation mutation. The anti-forgery token is a required
    /// argument: callers enforce the precondition before a request exists.
    async fn criar_plano(&self, terreno_id: i64, csrf_token: &str)
    -> Result<CriarPlanoResponse, FetchError>;
}

/// [`CatalogProvider`] over the real backend.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: AgroClient,
    endpoints: Endpoints,
}

impl HttpCatalog {
    pub fn new(client: AgroClient, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    async fn get(&self, path: &str) -> Result<(u16, String), FetchError> {
        let resp = self
            .client
            .request(Method::GET, path)
            .send()
            .await
            .map_err(|e| {
                warn!(%path, error = %e, "request failed");
                FetchError::transport(e)
            })?;
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        Ok((status, text))
    }

    /// GET a list endpoint and decode its rows.
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, FetchError> {
        let (status, text) = self.get(path).await?;
        if !is_success(status) {
            warn!(%path, status, "list fetch returned error status");
            return Err(FetchError::Http {
                status,
                detail: error_detail(&text),
            });
        }
        serde_json::from_str(&text).map_err(FetchError::decode)
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalog {
    async fn list_states(&self) -> Result<Vec<SelectableItem>, FetchError> {
        self.get_list(&self.endpoints.states_path()).await
    }

    async fn list_cities(&self, state_id: &ItemId) -> Result<Vec<SelectableItem>, FetchError> {
        let path = self.endpoints.cities_path(&state_id.as_path_segment());
        self.get_list(&path).await
    }

    async fn list_products(&self, city_id: &ItemId) -> Result<Vec<SelectableItem>, FetchError> {
        let path = self.endpoints.products_path(&city_id.as_path_segment());
        self.get_list(&path).await
    }

    async fn list_terrenos(&self) -> Result<Vec<Terreno>, FetchError> {
        let path = self.endpoints.terrenos_path();
        let (status, text) = self.get(&path).await?;
        if !is_success(status) {
            warn!(%path, status, "terreno list returned error status");
            return Err(FetchError::Http {
                status,
                detail: error_detail(&text),
            });
        }
        let envelope: TerrenosResponse = serde_json::from_str(&text).map_err(FetchError::decode)?;
        Ok(envelope.terrenos)
    }

    async fn list_planos(&self) -> Result<Vec<PlanoResumo>, FetchError> {
        let path = self.endpoints.planos_path();
        let (status, text) = self.get(&path).await?;
        if !is_success(status) {
            warn!(%path, status, "plan list returned error status");
            return Err(FetchError::Http {
                status,
                detail: error_detail(&text),
            });
        }
        let envelope: PlanosResponse = serde_json::from_str(&text).map_err(FetchError::decode)?;
        Ok(envelope.planos)
    }

    async fn fetch_ficha(
        &self,
        product_name: &str,
        city_id: &ItemId,
    ) -> Result<FichaTecnica, FetchError> {
        let path = self
            .endpoints
            .ficha_path(product_name, &city_id.as_path_segment());
        let (status, text) = self.get(&path).await?;
        if status == 404 {
            return Err(FetchError::NotFound);
        }
        if !is_success(status) {
            warn!(%path, status, "ficha fetch returned error status");
            return Err(FetchError::Http {
                status,
                detail: error_detail(&text),
            });
        }
        serde_json::from_str(&text).map_err(FetchError::decode)
    }

    async fn criar_plano(
        &self,
        terreno_id: i64,
        csrf_token: &str,
    ) -> Result<CriarPlanoResponse, FetchError> {
        let path = self.endpoints.criar_plano_path();
        let resp = self
            .client
            .request(Method::POST, &path)
            .header("X-CSRFToken", csrf_token)
            .form(&[("terreno_id", terreno_id.to_string())])
            .send()
            .await
            .map_err(|e| {
                warn!(%path, error = %e, "plan creation request failed");
                FetchError::transport(e)
            })?;
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        interpret_criar_plano(status, &text)
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Best-effort extraction of the server's `{"error": "..."}` detail; falls
/// back to the raw body, truncated for logs and status lines.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(detail) = value.get("error").and_then(|e| e.as_str())
    {
        return detail.to_string();
    }
    let trimmed = body.trim();
    if trimmed.chars().count() <= 160 {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(157).collect();
    out.push_str("...");
    out
}

/// Fold the plan-creation response into the logical envelope.
///
/// The backend ships `{error: ...}` bodies with 4xx/5xx statuses; those are
/// logical failures the wizard shows verbatim, so a parseable envelope wins
/// over the status code. Only unparseable bodies surface as HTTP/decode
/// errors.
fn interpret_criar_plano(status: u16, body: &str) -> Result<CriarPlanoResponse, FetchError> {
    match serde_json::from_str::<CriarPlanoResponse>(body) {
        Ok(envelope) if is_success(status) || envelope.error.is_some() => Ok(envelope),
        Ok(_) => Err(FetchError::Http {
            status,
            detail: error_detail(body),
        }),
        Err(e) if is_success(status) => Err(FetchError::decode(e)),
        Err(_) => Err(FetchError::Http {
            status,
            detail: error_detail(body),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory provider standing in for the backend, exercised through the
    /// same trait object the front ends use.
    struct StaticCatalog;

    #[async_trait]
    impl CatalogProvider for StaticCatalog {
        async fn list_states(&self) -> Result<Vec<SelectableItem>, FetchError> {
            Ok(vec![SelectableItem::new(35, "SP")])
        }

        async fn list_cities(&self, state_id: &ItemId) -> Result<Vec<SelectableItem>, FetchError> {
            match state_id {
                ItemId::Num(35) => Ok(vec![SelectableItem::new(3550308, "São Paulo")]),
                _ => Ok(vec![]),
            }
        }

        async fn list_products(&self, _city_id: &ItemId) -> Result<Vec<SelectableItem>, FetchError> {
            Ok(vec![])
        }

        async fn list_terrenos(&self) -> Result<Vec<Terreno>, FetchError> {
            Ok(vec![])
        }

        async fn list_planos(&self) -> Result<Vec<PlanoResumo>, FetchError> {
            Ok(vec![])
        }

        async fn fetch_ficha(
            &self,
            _product_name: &str,
            _city_id: &ItemId,
        ) -> Result<FichaTecnica, FetchError> {
            Err(FetchError::NotFound)
        }

        async fn criar_plano(
            &self,
            _terreno_id: i64,
            _csrf_token: &str,
        ) -> Result<CriarPlanoResponse, FetchError> {
            Ok(CriarPlanoResponse::default())
        }
    }

    #[tokio::test]
    async fn provider_seam_works_through_a_trait_object() {
        let catalog: Box<dyn CatalogProvider> = Box::new(StaticCatalog);
        let states = catalog.list_states().await.unwrap();
        assert_eq!(states[0].label, "SP");

        let cities = catalog.list_cities(&states[0].id).await.unwrap();
        assert_eq!(cities.len(), 1);
        assert!(catalog.list_cities(&ItemId::Num(12)).await.unwrap().is_empty());

        let miss = catalog.fetch_ficha("Milho", &ItemId::Num(42)).await.unwrap_err();
        assert!(miss.is_not_found());
    }

    #[test]
    fn error_detail_prefers_json_error_field() {
        assert_eq!(error_detail(r#"{"error": "Erro interno ao listar terrenos"}"#), "Erro interno ao listar terrenos");
        assert_eq!(error_detail("plain text"), "plain text");
        let long = "x".repeat(200);
        assert_eq!(error_detail(&long).chars().count(), 160);
    }

    #[test]
    fn criar_plano_success_envelope_passes_through() {
        let resp = interpret_criar_plano(
            200,
            r#"{"success": true, "message": "Plano criado.", "next_url": "/plano/etapa1/7/"}"#,
        )
        .unwrap();
        assert!(resp.success);
        assert_eq!(resp.next_url.as_deref(), Some("/plano/etapa1/7/"));
    }

    #[test]
    fn criar_plano_logical_failure_wins_over_status() {
        let resp = interpret_criar_plano(400, r#"{"error": "Terreno inválido."}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("Terreno inválido."));
    }

    #[test]
    fn criar_plano_unparseable_body_maps_to_http_or_decode() {
        assert!(matches!(
            interpret_criar_plano(500, "<html>Server Error</html>"),
            Err(FetchError::Http { status: 500, .. })
        ));
        assert!(matches!(
            interpret_criar_plano(200, "not json"),
            Err(FetchError::Decode(_))
        ));
    }
}
