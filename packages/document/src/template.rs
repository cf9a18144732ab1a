//! `{Field Name}` placeholder rendering against static fields.

use std::sync::LazyLock;

use lineitem_record_models::StaticFields;
use regex::{Captures, Regex};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").unwrap_or_else(|_| unreachable!()));

/// A placeholder named a field that has not been resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unresolved field '{0}'")]
pub struct UnresolvedField(pub String);

/// Field names referenced by `template`, in order.
pub fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER_RE
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Replaces every `{Field}` in `template` with its value.
///
/// # Errors
///
/// Returns [`UnresolvedField`] for the first placeholder without a value.
pub fn render(template: &str, fields: &StaticFields) -> Result<String, UnresolvedField> {
    if let Some(missing) = placeholders(template).find(|name| !fields.contains(name)) {
        return Err(UnresolvedField(missing.to_owned()));
    }

    Ok(PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            fields.get(&caps[1]).unwrap_or_default().to_owned()
        })
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> StaticFields {
        [("Style No", "101"), ("HS Code", "6109.10")].into_iter().collect()
    }

    #[test]
    fn renders_placeholders() {
        assert_eq!(render("HS Code: {HS Code}", &fields()).unwrap(), "HS Code: 6109.10");
        assert_eq!(render("{Style No}", &fields()).unwrap(), "101");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(render("Total :", &fields()).unwrap(), "Total :");
        assert_eq!(
            render("Impress-Newtex\nComposite Textiles Ltd.", &StaticFields::new()).unwrap(),
            "Impress-Newtex\nComposite Textiles Ltd."
        );
    }

    #[test]
    fn unresolved_placeholder_is_reported() {
        assert_eq!(
            render("{Style No}/{Season}", &fields()),
            Err(UnresolvedField("Season".to_owned()))
        );
    }

    #[test]
    fn lists_placeholders_in_order() {
        let names: Vec<&str> = placeholders("{A} and {B C}").collect();
        assert_eq!(names, vec!["A", "B C"]);
    }
}
