//! The page-by-page extraction pipeline.
//!
//! A document moves through: static fields → barcode catalog → for every
//! data page (segment → realign → reconstruct) → output table. The only
//! state carried from one page to the next is a single pending segment: an
//! anchor row at the bottom of a page whose line items continue on the next
//! page.

use lineitem_grid::{SegmentError, segment};
use lineitem_grid_models::{Grid, Segment};
use lineitem_record::{BarcodeLookup, KeyedRowReconstructor, NoBarcodes, SizeMatrixReconstructor};
use lineitem_record_models::{OutputRecord, OutputTable, Reconstruction, StaticFields};

use crate::DocumentError;
use crate::catalog::BarcodeCatalog;
use crate::keyphrase::{DocumentLayout, KeyphraseFields, StaticFieldExtractor, WholeDocument};
use crate::labelled::LabelledCellFields;
use crate::profile::{DocumentProfile, LayoutConfig, RecordStrategy};
use crate::source::GridSource;
use crate::template::{UnresolvedField, render};

/// Per-document counters, logged when the document finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentReport {
    pub label: String,
    pub pages_processed: usize,
    /// Data pages with no table or no anchor row.
    pub pages_without_data: usize,
    pub segments: usize,
    /// Whole items left out (every size of an item, or a segment with no
    /// rows after its anchor).
    pub skipped_groups: usize,
    /// Single records left out.
    pub skipped_records: usize,
    pub barcode_misses: usize,
    /// Single-row segments that never found their continuation.
    pub orphaned_pending: usize,
    pub records: usize,
}

impl std::fmt::Display for DocumentReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} record(s) from {} segment(s) on {} page(s) ({} without data), \
             {} item(s) and {} record(s) skipped, {} barcode miss(es), {} orphaned",
            self.records,
            self.segments,
            self.pages_processed,
            self.pages_without_data,
            self.skipped_groups,
            self.skipped_records,
            self.barcode_misses,
            self.orphaned_pending
        )
    }
}

/// Output of one document.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub table: OutputTable,
    pub report: DocumentReport,
}

enum Reconstructor {
    SizeMatrix(SizeMatrixReconstructor),
    KeyedRows(KeyedRowReconstructor),
}

impl Reconstructor {
    fn new(strategy: &RecordStrategy, flagged: bool) -> Result<Self, DocumentError> {
        Ok(match strategy {
            RecordStrategy::SizeMatrix(hints) => {
                Self::SizeMatrix(SizeMatrixReconstructor::new(hints.clone(), flagged)?)
            }
            RecordStrategy::KeyedRows(hints) => {
                Self::KeyedRows(KeyedRowReconstructor::new(hints.clone())?)
            }
        })
    }

    fn reconstruct(
        &self,
        segment: &Segment,
        fields: &StaticFields,
        barcodes: &dyn BarcodeLookup,
    ) -> Reconstruction {
        match self {
            Self::SizeMatrix(reconstructor) => reconstructor.reconstruct(segment, fields, barcodes),
            Self::KeyedRows(reconstructor) => reconstructor.reconstruct(segment, fields),
        }
    }
}

/// Runs the layout pre-scan configured by `profile`.
///
/// # Errors
///
/// Returns [`DocumentError`] if page text cannot be read.
pub fn scan_layout(
    profile: &DocumentProfile,
    source: &dyn GridSource,
) -> Result<DocumentLayout, DocumentError> {
    match &profile.layout {
        LayoutConfig::WholeDocument => WholeDocument.extract(source),
        LayoutConfig::Keyphrase(config) => KeyphraseFields::new(config).extract(source),
    }
}

/// State of one document while its pages are processed.
pub struct DocumentRun<'a> {
    profile: &'a DocumentProfile,
    layout: DocumentLayout,
    anchor: String,
    terminator: String,
    reconstructor: Reconstructor,
    barcodes: Option<BarcodeCatalog>,
    pending: Option<Segment>,
    records: Vec<OutputRecord>,
    report: DocumentReport,
}

impl<'a> DocumentRun<'a> {
    /// Scans the document layout, resolves the anchor and terminator and
    /// reads the barcode catalog.
    ///
    /// # Errors
    ///
    /// * [`DocumentError::MissingStaticField`] if the anchor or terminator
    ///   references a field the document does not have
    /// * [`DocumentError::Source`] if a page cannot be read
    /// * [`DocumentError::Reconstruct`] if the profile hints are invalid
    pub fn start(
        profile: &'a DocumentProfile,
        source: &dyn GridSource,
    ) -> Result<Self, DocumentError> {
        let label = source.label().to_owned();
        let layout = scan_layout(profile, source)?;

        let missing = |UnresolvedField(field)| DocumentError::MissingStaticField {
            field,
            page: layout.data_pages.start + 1,
        };
        let anchor = render(&profile.segmentation.anchor, &layout.fields).map_err(missing)?;
        let terminator =
            render(&profile.segmentation.terminator, &layout.fields).map_err(missing)?;

        let barcodes = match &profile.catalog {
            Some(config) => {
                let grids = layout
                    .catalog_pages
                    .clone()
                    .map(|page| source.grid(page))
                    .collect::<Result<Vec<_>, _>>()?;
                Some(BarcodeCatalog::from_pages(grids, &config.header_label))
            }
            None => None,
        };

        let reconstructor = Reconstructor::new(&profile.records, layout.flagged)?;

        log::debug!(
            "[{label}] Anchor '{}' in column {}, terminator '{}'",
            anchor.escape_debug(),
            profile.segmentation.anchor_column,
            terminator.escape_debug()
        );

        Ok(Self {
            profile,
            layout,
            anchor,
            terminator,
            reconstructor,
            barcodes,
            pending: None,
            records: Vec::new(),
            report: DocumentReport {
                label,
                ..DocumentReport::default()
            },
        })
    }

    #[must_use]
    pub const fn layout(&self) -> &DocumentLayout {
        &self.layout
    }

    #[must_use]
    pub const fn report(&self) -> &DocumentReport {
        &self.report
    }

    /// Processes the grid of one data page (0-based `page`).
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::MissingStaticField`] if a required segment
    /// field is missing.
    pub fn process_page(&mut self, page: usize, mut grid: Grid) -> Result<(), DocumentError> {
        let label = self.report.label.clone();
        self.report.pages_processed += 1;

        if let Some(max_columns) = self.profile.segmentation.max_columns {
            grid.truncate_width(max_columns);
        }

        if grid.is_empty() {
            log::debug!("[{label}] Page {}: no table found", page + 1);
            self.report.pages_without_data += 1;
            return Ok(());
        }

        if let Some(pending) = self.pending.take() {
            log::debug!("[{label}] Page {}: joining carried-over anchor row", page + 1);
            let mut joined = pending.into_grid();
            joined.fit_to_width(grid.width());
            joined.extend(grid);
            grid = joined;
        }

        let height = grid.height();
        let segments = match segment(
            grid,
            self.profile.segmentation.anchor_column,
            &self.anchor,
            &self.terminator,
        ) {
            Ok(segments) => segments,
            Err(e @ SegmentError::NoAnchorFound { .. }) => {
                log::debug!("[{label}] Page {}: {e}", page + 1);
                self.report.pages_without_data += 1;
                return Ok(());
            }
        };

        log::debug!("[{label}] Page {}: {} segment(s)", page + 1, segments.len());

        let last = segments.len().saturating_sub(1);
        for (index, found) in segments.into_iter().enumerate() {
            self.report.segments += 1;
            let current = Segment::new(self.report.segments, found.first_row(), found.into_grid());

            if current.len() == 1 {
                // Only an anchor row running into the bottom of the page continues.
                if index == last && current.row_range().end == height {
                    self.pending = Some(current);
                } else {
                    log::debug!(
                        "[{label}] Page {}: segment {} has no rows after its anchor",
                        page + 1,
                        current.id()
                    );
                    self.report.skipped_groups += 1;
                }
                continue;
            }

            self.reconstruct(page, &current)?;
        }

        Ok(())
    }

    fn reconstruct(&mut self, page: usize, segment: &Segment) -> Result<(), DocumentError> {
        let labelled = LabelledCellFields::new(&self.profile.segment_fields);
        let fields = if labelled.is_empty() {
            self.layout.fields.clone()
        } else {
            self.layout
                .fields
                .merged_with(&labelled.extract(segment.grid(), page)?)
        };

        let out = match &self.barcodes {
            Some(catalog) => self.reconstructor.reconstruct(segment, &fields, catalog),
            None => self.reconstructor.reconstruct(segment, &fields, &NoBarcodes),
        };

        for skip in &out.skipped {
            log::debug!("[{}] Skipped: {skip}", self.report.label);
            if skip.is_group() {
                self.report.skipped_groups += 1;
            } else {
                self.report.skipped_records += 1;
            }
        }
        self.report.barcode_misses += out.barcode_misses;
        self.records.extend(out.records);

        Ok(())
    }

    /// Closes the document and builds its output table.
    #[must_use]
    pub fn finish(mut self) -> ProcessedDocument {
        if self.pending.take().is_some() {
            log::warn!(
                "[{}] Document ended with an unjoined anchor row",
                self.report.label
            );
            self.report.orphaned_pending += 1;
        }

        let table = OutputTable::new(self.profile.output.columns.clone(), self.records);
        self.report.records = table.len();

        log::info!("[{}] {}", self.report.label, self.report);

        ProcessedDocument {
            table,
            report: self.report,
        }
    }
}

/// Extracts every line item of `source` using `profile`.
///
/// # Errors
///
/// Returns [`DocumentError`] if the document cannot be read or a required
/// static field is missing.
pub fn process_document(
    profile: &DocumentProfile,
    source: &dyn GridSource,
) -> Result<ProcessedDocument, DocumentError> {
    let mut run = DocumentRun::start(profile, source)?;

    log::debug!(
        "[{}] Processing {} data page(s)",
        source.label(),
        run.layout().data_pages.len()
    );

    for page in run.layout().data_pages.clone() {
        let grid = source.grid(page)?;
        run.process_page(page, grid)?;
    }

    Ok(run.finish())
}
