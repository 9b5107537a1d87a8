//! Placeholder substitution for connection and table-name templates.
//!
//! A template is a plain string containing zero or more `{dotted.path}`
//! placeholders, resolved against a flattened attribute map (see
//! [`flatten`]). Substitution is total: every placeholder either resolves or
//! the whole bind fails with [`TenancyError::MissingTemplatePath`] — nothing
//! is ever left partially substituted.

mod flatten;

pub use flatten::flatten;

use crate::error::{Result, TenancyError};
use std::collections::BTreeMap;

/// Substitute every `{path}` placeholder in `template` from `attributes`.
///
/// A template containing neither `{` nor `}` is returned unchanged without
/// any map lookup. A placeholder whose path is absent from the map fails
/// with [`TenancyError::MissingTemplatePath`]; an unterminated `{` is a
/// configuration error. A stray `}` with no opening brace passes through
/// literally.
pub fn bind(template: &str, attributes: &BTreeMap<String, String>) -> Result<String> {
    if !template.contains(['{', '}']) {
        return Ok(template.to_string());
    }

    let mut out = String::with_capacity(template.len());
    let mut remainder = template;

    while let Some(start) = remainder.find('{') {
        out.push_str(&remainder[..start]);
        let after = &remainder[start + 1..];
        let end = after.find('}').ok_or_else(|| {
            TenancyError::Config(format!(
                "unterminated placeholder in template {:?}",
                template
            ))
        })?;
        let path = &after[..end];
        let value = attributes
            .get(path)
            .ok_or_else(|| TenancyError::missing_path(template, path))?;
        out.push_str(value);
        remainder = &after[end + 1..];
    }

    out.push_str(remainder);
    Ok(out)
}

/// [`bind`] lifted over optional templates: `None` passes through unchanged.
pub fn bind_opt(
    template: Option<&str>,
    attributes: &BTreeMap<String, String>,
) -> Result<Option<String>> {
    match template {
        Some(t) => bind(t, attributes).map(Some),
        None => Ok(None),
    }
}
