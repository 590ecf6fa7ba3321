//! View model for the technical sheet.
//!
//! [`FichaView::from_ficha`] is a pure mapping from the wire record to a
//! fixed, render-ready layout: four titled sections of four labeled fields
//! each, in a constant order regardless of which fields the backend filled
//! in. Missing fields render their fallback placeholder instead of being
//! omitted, and unit-bearing fields keep their unit suffix even for the
//! fallback ("N/A °C") — a long-standing display quirk that is kept on
//! purpose; see DESIGN.md before "fixing" it.

use safra_types::FichaTecnica;
use serde_json::Value;

/// One labeled field of the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct FichaField {
    pub label: &'static str,
    pub value: String,
}

/// One titled group of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FichaSection {
    pub title: &'static str,
    pub fields: Vec<FichaField>,
}

/// Render-ready technical sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct FichaView {
    /// Heading: "<crop> em <city>".
    pub title: String,
    pub sections: Vec<FichaSection>,
}

impl FichaView {
    /// Map a wire record into the fixed section/field layout.
    pub fn from_ficha(ficha: &FichaTecnica) -> Self {
        let produto = text(&ficha.produto, "N/A");
        let cidade = text(&ficha.city_name, "N/A");

        let sections = vec![
            FichaSection {
                title: "Informações Básicas e Identificação",
                fields: vec![
                    field("Cultivo", produto.clone()),
                    field("Cidade/Estado", cidade.clone()),
                    field("Tipo de Solo Preferido", text(&ficha.tipo_solo, "Não especificado")),
                    field("Ciclo de Vida (Dias)", text(&ficha.ciclo_vida_dias, "N/A")),
                ],
            },
            FichaSection {
                title: "Dados Climáticos e de Cultivo",
                fields: vec![
                    field("Temperatura Ideal (Média)", with_unit(&ficha.temperatura_ideal_c, "°C")),
                    field("Precipitação Mínima", with_unit(&ficha.precipitacao_min_mm, "mm")),
                    field("Altitude Média Ideal", with_unit(&ficha.altitude_media_m, "m")),
                    field("Período de Plantio", text(&ficha.periodo_plantio_sugerido, "N/A")),
                ],
            },
            FichaSection {
                title: "Produtividade e Recursos",
                fields: vec![
                    field(
                        "Produtividade Média",
                        with_unit(&ficha.produtividade_media_kg_ha, "kg/ha"),
                    ),
                    field(
                        "Necessidade Hídrica Total",
                        with_unit(&ficha.necessidade_hidrica_total_mm, "mm"),
                    ),
                    field(
                        "Fertilizante Essencial",
                        text(&ficha.fertilizante_essencial, "Não especificado"),
                    ),
                    field("Tempo de Colheita", with_unit(&ficha.tempo_colheita_meses, "meses")),
                ],
            },
            FichaSection {
                title: "Condições Locais e Riscos",
                fields: vec![
                    field(
                        "Vulnerabilidade a Pragas",
                        text(&ficha.vulnerabilidade_pragas, "Não informado"),
                    ),
                    field(
                        "Condição Ideal de Colheita",
                        text(&ficha.condicao_ideal_colheita, "N/A"),
                    ),
                    field(
                        "Anos de Estudo Local (IBGE)",
                        text(&ficha.anos_estudo_local_ibge, "N/A"),
                    ),
                    field(
                        "Status de Sustentabilidade",
                        text(&ficha.status_sustentabilidade, "Não avaliado"),
                    ),
                ],
            },
        ];

        FichaView {
            title: format!("{} em {}", produto, cidade),
            sections,
        }
    }
}

fn field(label: &'static str, value: String) -> FichaField {
    FichaField { label, value }
}

/// Displayable form of a sheet value. Null, absent, and empty-string all
/// count as missing; numbers render bare.
fn display(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

fn text(value: &Option<Value>, fallback: &str) -> String {
    display(value).unwrap_or_else(|| fallback.to_string())
}

/// Unit suffix is appended unconditionally, fallback included.
fn with_unit(value: &Option<Value>, unit: &str) -> String {
    format!("{} {}", text(value, "N/A"), unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_is_total_over_an_empty_record() {
        let view = FichaView::from_ficha(&FichaTecnica::default());
        assert_eq!(view.title, "N/A em N/A");
        assert_eq!(view.sections.len(), 4);
        for section in &view.sections {
            assert_eq!(section.fields.len(), 4);
            for field in &section.fields {
                assert!(!field.value.is_empty(), "{} rendered empty", field.label);
            }
        }
    }

    #[test]
    fn unit_suffix_survives_missing_values() {
        let view = FichaView::from_ficha(&FichaTecnica::default());
        let climate = &view.sections[1];
        assert_eq!(climate.fields[0].value, "N/A °C");
        assert_eq!(climate.fields[1].value, "N/A mm");
        assert_eq!(climate.fields[2].value, "N/A m");
    }

    #[test]
    fn render_is_idempotent() {
        let ficha: FichaTecnica = serde_json::from_value(json!({
            "produto": "Uva",
            "city_name": "Bauru / SP",
            "temperatura_ideal_c": "22.5",
            "tipo_solo": "Drenado"
        }))
        .unwrap();
        assert_eq!(FichaView::from_ficha(&ficha), FichaView::from_ficha(&ficha));
    }

    #[test]
    fn present_values_render_with_units_and_labels_in_fixed_order() {
        let ficha: FichaTecnica = serde_json::from_value(json!({
            "produto": "Milho",
            "city_name": "Bauru / SP",
            "temperatura_ideal_c": 24,
            "produtividade_media_kg_ha": "6200",
            "status_sustentabilidade": "Alta"
        }))
        .unwrap();
        let view = FichaView::from_ficha(&ficha);
        assert_eq!(view.title, "Milho em Bauru / SP");
        assert_eq!(view.sections[0].fields[0].value, "Milho");
        assert_eq!(view.sections[1].fields[0].value, "24 °C");
        assert_eq!(view.sections[2].fields[0].value, "6200 kg/ha");
        assert_eq!(view.sections[3].fields[3].value, "Alta");
        assert_eq!(view.sections[0].fields[2].value, "Não especificado");
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let ficha: FichaTecnica =
            serde_json::from_value(json!({"tipo_solo": "", "ciclo_vida_dias": null})).unwrap();
        let view = FichaView::from_ficha(&ficha);
        assert_eq!(view.sections[0].fields[2].value, "Não especificado");
        assert_eq!(view.sections[0].fields[3].value, "N/A");
    }
}
