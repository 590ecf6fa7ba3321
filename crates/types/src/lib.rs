//! Shared data model for the Safra client.
//!
//! These types mirror the wire contracts of the farm-planning backend:
//! IBGE-style region/city lists, the agronomic technical sheet ("ficha
//! técnica"), the user's registered plots ("terrenos"), and the planting-plan
//! endpoints. Field names follow the backend's JSON exactly, so the structs
//! here deserialize server responses without any renaming layer.
//!
//! Everything is transient, client-held state: lists are rebuilt on every
//! parent-selection change and detail records are replaced on every fetch.
//! Nothing in this crate performs I/O.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of one selectable entry.
///
/// States, cities, and plots are keyed by numeric IBGE ids; products are
/// keyed by their *name* (the backend's product rows may not carry a numeric
/// id at all). The untagged representation accepts either form on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Num(i64),
    Text(String),
}

impl ItemId {
    /// Path-segment form of the id, as substituted into endpoint templates.
    pub fn as_path_segment(&self) -> String {
        match self {
            ItemId::Num(n) => n.to_string(),
            ItemId::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Num(n) => write!(f, "{}", n),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Num(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Text(s.to_string())
    }
}

/// One entry of a dropdown list: region, city, or crop.
///
/// Deserialized from backend rows shaped `{id, nome}`. Product rows sometimes
/// omit `id`, in which case the name doubles as the identifier — the same
/// fallback the original selector used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSelectableItem")]
pub struct SelectableItem {
    pub id: ItemId,
    pub label: String,
}

#[derive(Deserialize)]
struct RawSelectableItem {
    #[serde(default)]
    id: Option<ItemId>,
    nome: String,
}

impl From<RawSelectableItem> for SelectableItem {
    fn from(raw: RawSelectableItem) -> Self {
        let id = raw
            .id
            .unwrap_or_else(|| ItemId::Text(raw.nome.clone()));
        SelectableItem { id, label: raw.nome }
    }
}

impl SelectableItem {
    pub fn new(id: impl Into<ItemId>, label: impl Into<String>) -> Self {
        SelectableItem {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Flat technical-sheet record for one crop in one city.
///
/// Every field is optional: the backend stringifies decimals and maps absent
/// values to `""`, so consumers treat null and the empty string alike as
/// "missing". Values may arrive as JSON strings or numbers, hence the loose
/// [`Value`] typing; the presentation layer owns formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FichaTecnica {
    #[serde(default)]
    pub produto: Option<Value>,
    #[serde(default)]
    pub city_name: Option<Value>,
    #[serde(default)]
    pub tipo_solo: Option<Value>,
    #[serde(default)]
    pub ciclo_vida_dias: Option<Value>,
    #[serde(default)]
    pub temperatura_ideal_c: Option<Value>,
    #[serde(default)]
    pub precipitacao_min_mm: Option<Value>,
    #[serde(default)]
    pub altitude_media_m: Option<Value>,
    #[serde(default)]
    pub periodo_plantio_sugerido: Option<Value>,
    #[serde(default)]
    pub produtividade_media_kg_ha: Option<Value>,
    #[serde(default)]
    pub necessidade_hidrica_total_mm: Option<Value>,
    #[serde(default)]
    pub fertilizante_essencial: Option<Value>,
    #[serde(default)]
    pub tempo_colheita_meses: Option<Value>,
    #[serde(default)]
    pub vulnerabilidade_pragas: Option<Value>,
    #[serde(default)]
    pub condicao_ideal_colheita: Option<Value>,
    #[serde(default)]
    pub anos_estudo_local_ibge: Option<Value>,
    #[serde(default)]
    pub status_sustentabilidade: Option<Value>,
}

/// A registered plot of land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terreno {
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub area_total: String,
    #[serde(default)]
    pub unidade_area: String,
    #[serde(default)]
    pub cidade_nome: String,
    #[serde(default)]
    pub estado_sigla: String,
    #[serde(default)]
    pub localizacao_display: String,
}

/// Envelope of the plot-list endpoint: `{terrenos: [...]}` on success,
/// `{error: "..."}` with a non-2xx status otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TerrenosResponse {
    #[serde(default)]
    pub terrenos: Vec<Terreno>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Summary of an existing planting plan, as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanoResumo {
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub produto_nome: String,
    #[serde(default)]
    pub terreno_nome: String,
    #[serde(default)]
    pub localizacao_display: String,
    #[serde(default)]
    pub data_inicio: String,
    #[serde(default)]
    pub status: String,
}

/// Envelope of the plan-list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanosResponse {
    #[serde(default)]
    pub planos: Vec<PlanoResumo>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Result of the plan-creation mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriarPlanoResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub next_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_id_accepts_numbers_and_strings() {
        let num: ItemId = serde_json::from_value(json!(35)).unwrap();
        assert_eq!(num, ItemId::Num(35));
        let text: ItemId = serde_json::from_value(json!("Milho")).unwrap();
        assert_eq!(text, ItemId::Text("Milho".into()));
    }

    #[test]
    fn selectable_item_falls_back_to_nome_as_id() {
        let with_id: SelectableItem =
            serde_json::from_value(json!({"id": 3550308, "nome": "São Paulo"})).unwrap();
        assert_eq!(with_id.id, ItemId::Num(3550308));
        assert_eq!(with_id.label, "São Paulo");

        let product_row: SelectableItem =
            serde_json::from_value(json!({"nome": "Milho Verde"})).unwrap();
        assert_eq!(product_row.id, ItemId::Text("Milho Verde".into()));
    }

    #[test]
    fn ficha_tolerates_mixed_and_missing_fields() {
        let ficha: FichaTecnica = serde_json::from_value(json!({
            "produto": "Uva",
            "temperatura_ideal_c": 22.5,
            "ciclo_vida_dias": "150",
            "tipo_solo": ""
        }))
        .unwrap();
        assert_eq!(ficha.produto, Some(json!("Uva")));
        assert_eq!(ficha.temperatura_ideal_c, Some(json!(22.5)));
        assert_eq!(ficha.ciclo_vida_dias, Some(json!("150")));
        assert_eq!(ficha.tipo_solo, Some(json!("")));
        assert_eq!(ficha.altitude_media_m, None);
    }

    #[test]
    fn terrenos_envelope_defaults_to_empty() {
        let resp: TerrenosResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.terrenos.is_empty());
        assert!(resp.error.is_none());

        let resp: TerrenosResponse = serde_json::from_value(json!({
            "terrenos": [{
                "id": 1,
                "nome": "Sítio Norte",
                "area_total": "12.50",
                "unidade_area": "ha",
                "localizacao_display": "Bauru / SP"
            }]
        }))
        .unwrap();
        assert_eq!(resp.terrenos.len(), 1);
        assert_eq!(resp.terrenos[0].localizacao_display, "Bauru / SP");
    }

    #[test]
    fn criar_plano_response_defaults_success_false() {
        let resp: CriarPlanoResponse =
            serde_json::from_value(json!({"error": "Terreno inválido."})).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("Terreno inválido."));
    }
}
