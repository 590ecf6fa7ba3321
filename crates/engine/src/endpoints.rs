//! Backend endpoint configuration.
//!
//! The original client scattered URL presence checks across every call site;
//! here every route template is resolved exactly once at startup into an
//! [`Endpoints`] value, and *all* problems are reported together in a single
//! aggregated error so a misconfigured deployment fails fast with the full
//! picture.

use safra_util::{fill_path, validate_template};
use thiserror::Error;
use tracing::debug;

/// One entry per backend route: environment override, default template, and
/// the placeholders the template must carry.
const ROUTES: &[(&str, &str, &[&str])] = &[
    ("SAFRA_STATES_URL", "/info/api/states/", &[]),
    ("SAFRA_CITIES_URL", "/info/api/cities/{state_id}/", &["state_id"]),
    ("SAFRA_PRODUCTS_URL", "/info/api/products/{city_id}/", &["city_id"]),
    (
        "SAFRA_FICHA_URL",
        "/info/api/ficha/{product_name}/{city_id}/",
        &["product_name", "city_id"],
    ),
    ("SAFRA_TERRENOS_URL", "/plano/api/terrenos/", &[]),
    ("SAFRA_PLANOS_URL", "/plano/api/planos/", &[]),
    ("SAFRA_CRIAR_PLANO_URL", "/plano/criar-plano-plantio/", &[]),
];

/// Aggregated endpoint configuration failure: every invalid template, in one
/// message.
#[derive(Debug, Clone, Error)]
#[error("invalid endpoint configuration: {0}")]
pub struct EndpointsError(pub String);

/// Validated route templates for every backend endpoint.
#[derive(Debug, Clone)]
pub struct Endpoints {
    states: String,
    cities: String,
    products: String,
    ficha: String,
    terrenos: String,
    planos: String,
    criar_plano: String,
}

impl Endpoints {
    /// Resolve all templates from the environment, falling back to the
    /// backend's default routes, and validate each one. Problems across all
    /// routes are collected into one [`EndpointsError`].
    pub fn from_env() -> Result<Self, EndpointsError> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EndpointsError> {
        let mut resolved = Vec::with_capacity(ROUTES.len());
        let mut problems = Vec::new();

        for (env_name, default, required) in ROUTES {
            let template = lookup(env_name).unwrap_or_else(|| (*default).to_string());
            if let Err(e) = validate_template(&template, required) {
                problems.push(format!("{}='{}': {}", env_name, template, e));
            }
            debug!(env = env_name, %template, "resolved endpoint template");
            resolved.push(template);
        }

        if !problems.is_empty() {
            return Err(EndpointsError(problems.join("; ")));
        }

        let mut it = resolved.into_iter();
        Ok(Self {
            states: it.next().unwrap_or_default(),
            cities: it.next().unwrap_or_default(),
            products: it.next().unwrap_or_default(),
            ficha: it.next().unwrap_or_default(),
            terrenos: it.next().unwrap_or_default(),
            planos: it.next().unwrap_or_default(),
            criar_plano: it.next().unwrap_or_default(),
        })
    }

    pub fn states_path(&self) -> String {
        self.states.clone()
    }

    pub fn cities_path(&self, state_id: &str) -> String {
        fill_path(&self.cities, &[("state_id", state_id)])
    }

    pub fn products_path(&self, city_id: &str) -> String {
        fill_path(&self.products, &[("city_id", city_id)])
    }

    /// Ficha route with the product name percent-encoded as a path segment.
    pub fn ficha_path(&self, product_name: &str, city_id: &str) -> String {
        fill_path(&self.ficha, &[("product_name", product_name), ("city_id", city_id)])
    }

    pub fn terrenos_path(&self) -> String {
        self.terrenos.clone()
    }

    pub fn planos_path(&self) -> String {
        self.planos.clone()
    }

    pub fn criar_plano_path(&self) -> String {
        self.criar_plano.clone()
    }
}
