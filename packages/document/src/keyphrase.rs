//! Document-level fields and page layout.
//!
//! Before any table is read, a document is scanned once to find its static
//! fields (purchase order number, style number, HS code, ...), the pages
//! that hold line items, the pages that hold the barcode catalog, and
//! whether it is the flagged variant of its family.

use std::ops::Range;

use lineitem_record_models::StaticFields;

use crate::DocumentError;
use crate::profile::{KeyphraseField, KeyphraseLayout, PageScope, TextStep, VariantMarker};
use crate::source::GridSource;
use crate::template::render;

/// What the pre-scan of a document found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentLayout {
    pub total_pages: usize,
    /// Pages with line-item tables (0-based).
    pub data_pages: Range<usize>,
    /// Pages with the barcode catalog (0-based).
    pub catalog_pages: Range<usize>,
    /// Whether the document is the flagged variant of its family.
    pub flagged: bool,
    pub fields: StaticFields,
}

/// Produces the [`DocumentLayout`] of a document.
pub trait StaticFieldExtractor {
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the source cannot be read.
    fn extract(&self, source: &dyn GridSource) -> Result<DocumentLayout, DocumentError>;
}

/// Every page is a data page; there are no document-level fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeDocument;

impl StaticFieldExtractor for WholeDocument {
    fn extract(&self, source: &dyn GridSource) -> Result<DocumentLayout, DocumentError> {
        let total_pages = source.page_count();
        Ok(DocumentLayout {
            total_pages,
            data_pages: 0..total_pages,
            catalog_pages: total_pages..total_pages,
            flagged: false,
            fields: StaticFields::new(),
        })
    }
}

/// Cuts fields out of page text around key phrases.
#[derive(Debug, Clone, Copy)]
pub struct KeyphraseFields<'a> {
    config: &'a KeyphraseLayout,
}

impl<'a> KeyphraseFields<'a> {
    #[must_use]
    pub const fn new(config: &'a KeyphraseLayout) -> Self {
        Self { config }
    }

    fn catalog_start(&self, texts: &[String]) -> usize {
        let total = texts.len();
        let Some(marker) = self.config.catalog_marker.as_deref() else {
            return total;
        };
        texts
            .iter()
            .position(|text| text.contains(marker))
            .unwrap_or_else(|| total.saturating_sub(1))
    }

    fn is_flagged(variant: &VariantMarker, texts: &[String], fields: &StaticFields) -> bool {
        let steps = [
            TextStep::After(variant.context_after.clone()),
            TextStep::Before(variant.context_before.clone()),
        ];
        texts.iter().take(variant.pages).any(|text| {
            apply_steps(text, &steps, fields).is_some_and(|context| {
                variant
                    .markers
                    .iter()
                    .any(|marker| context.contains(marker.as_str()))
            })
        })
    }
}

impl StaticFieldExtractor for KeyphraseFields<'_> {
    fn extract(&self, source: &dyn GridSource) -> Result<DocumentLayout, DocumentError> {
        let total_pages = source.page_count();
        let texts = (0..total_pages)
            .map(|page| source.page_text(page))
            .collect::<Result<Vec<_>, _>>()?;

        let catalog_start = self.catalog_start(&texts);
        let fields = extract_fields(&self.config.fields, &texts, source.label());
        let flagged = self
            .config
            .variant
            .as_ref()
            .is_some_and(|variant| Self::is_flagged(variant, &texts, &fields));

        log::debug!(
            "[{}] {total_pages} page(s), catalog from page {}, {} field(s), flagged={flagged}",
            source.label(),
            catalog_start + 1,
            fields.len()
        );

        Ok(DocumentLayout {
            total_pages,
            data_pages: 0..catalog_start,
            catalog_pages: catalog_start..total_pages,
            flagged,
            fields,
        })
    }
}

/// Extracts every field in order. Unresolved fields without a default are
/// left out so that templates referencing them fail loudly.
fn extract_fields(defs: &[KeyphraseField], texts: &[String], label: &str) -> StaticFields {
    let mut fields = StaticFields::new();

    for def in defs {
        let value = match def.scope {
            PageScope::FirstPage => texts
                .first()
                .and_then(|text| apply_steps(text, &def.steps, &fields)),
            PageScope::AnyPage => texts
                .iter()
                .find_map(|text| apply_steps(text, &def.steps, &fields)),
        };

        match value.or_else(|| def.default.clone()) {
            Some(value) => fields.insert(def.name.as_str(), value),
            None => log::warn!("[{label}] Couldn't find a value for '{}'", def.name),
        }
    }

    fields
}

/// Runs `steps` over `text`. Returns `None` when a step fails or a key
/// phrase references an unresolved field.
fn apply_steps(text: &str, steps: &[TextStep], fields: &StaticFields) -> Option<String> {
    let mut current = text.to_owned();
    for step in steps {
        current = match step {
            TextStep::After(phrase) => {
                let phrase = render(phrase, fields).ok()?;
                if phrase.is_empty() {
                    return None;
                }
                current.split(phrase.as_str()).nth(1)?.trim().to_owned()
            }
            TextStep::Before(phrase) => {
                let phrase = render(phrase, fields).ok()?;
                if phrase.is_empty() {
                    return None;
                }
                current
                    .split(phrase.as_str())
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_owned()
            }
            TextStep::Replace { from, to } => current.replace(from.as_str(), to),
        };
    }
    Some(current)
}
