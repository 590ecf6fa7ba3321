//! Endpoint path templating.
//!
//! Backend routes are configured as templates with `{key}` placeholders
//! (`/info/api/cities/{state_id}/`). [`fill_path`] substitutes values into a
//! template, percent-encoding each value so free-text identifiers such as
//! product names are safe as path segments. [`validate_template`] checks a
//! template once at startup so malformed configuration fails fast instead of
//! producing broken URLs per request.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;

/// A template failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("placeholder {{{0}}} is missing from the template")]
    MissingPlaceholder(String),
    #[error("template contains unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),
    #[error("template contains an unclosed '{{'")]
    Unclosed,
}

/// Replaces every `{key}` placeholder with its percent-encoded value.
///
/// Values are encoded with [`NON_ALPHANUMERIC`], so numeric ids pass through
/// unchanged while names with spaces or accents become valid path segments.
/// Placeholders without a matching pair are left intact; pairs without a
/// matching placeholder are ignored. Run [`validate_template`] at startup to
/// rule both out.
///
/// ```
/// use safra_util::fill_path;
///
/// let path = fill_path(
///     "/info/api/ficha/{product_name}/{city_id}/",
///     &[("product_name", "Milho Verde"), ("city_id", "3550308")],
/// );
/// assert_eq!(path, "/info/api/ficha/Milho%20Verde/3550308/");
/// ```
pub fn fill_path(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in params {
        let needle = format!("{{{}}}", key);
        let encoded = utf8_percent_encode(value, NON_ALPHANUMERIC).to_string();
        out = out.replace(&needle, &encoded);
    }
    out
}

/// Checks that a template contains exactly the given placeholders.
///
/// Every `required` key must appear at least once, and no placeholder outside
/// `required` may appear at all. Returns the first problem found.
pub fn validate_template(template: &str, required: &[&str]) -> Result<(), TemplateError> {
    let found = scan_placeholders(template)?;

    for key in required {
        if !found.iter().any(|f| f == key) {
            return Err(TemplateError::MissingPlaceholder(key.to_string()));
        }
    }
    for name in &found {
        if !required.contains(&name.as_str()) {
            return Err(TemplateError::UnknownPlaceholder(name.clone()));
        }
    }
    Ok(())
}

fn scan_placeholders(template: &str) -> Result<Vec<String>, TemplateError> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(TemplateError::Unclosed);
        };
        names.push(after[..close].to_string());
        rest = &after[close + 1..];
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_pass_through_unchanged() {
        let path = fill_path("/info/api/cities/{state_id}/", &[("state_id", "35")]);
        assert_eq!(path, "/info/api/cities/35/");
    }

    #[test]
    fn free_text_values_are_percent_encoded() {
        let path = fill_path(
            "/info/api/ficha/{product_name}/{city_id}/",
            &[("product_name", "Feijão (1ª safra)"), ("city_id", "42")],
        );
        assert_eq!(path, "/info/api/ficha/Feij%C3%A3o%20%281%C2%AA%20safra%29/42/");
    }

    #[test]
    fn unmatched_placeholders_are_left_intact() {
        let path = fill_path("/api/{a}/{b}/", &[("a", "1")]);
        assert_eq!(path, "/api/1/{b}/");
    }

    #[test]
    fn validate_accepts_exact_placeholder_set() {
        assert_eq!(
            validate_template("/info/api/ficha/{product_name}/{city_id}/", &["product_name", "city_id"]),
            Ok(())
        );
    }

    #[test]
    fn validate_flags_missing_and_unknown() {
        assert_eq!(
            validate_template("/info/api/cities/", &["state_id"]),
            Err(TemplateError::MissingPlaceholder("state_id".into()))
        );
        assert_eq!(
            validate_template("/info/api/cities/{uf}/", &["state_id"]),
            Err(TemplateError::MissingPlaceholder("state_id".into()))
        );
        assert_eq!(
            validate_template("/info/api/cities/{state_id}/{extra}/", &["state_id"]),
            Err(TemplateError::UnknownPlaceholder("extra".into()))
        );
        assert_eq!(validate_template("/api/{broken", &[]), Err(TemplateError::Unclosed));
    }
}
