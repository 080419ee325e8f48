//! Report construction.
//!
//! The builder walks a [`Container`] top-down. At each level it reads the
//! attributes the schema names, normalizes them and assembles the report
//! node. Within a level, frames attach to the page that precedes them.

use serde_json::Value;
use tracing::{debug, info};

use crate::error::BuildError;
use crate::schema::{PageKey, Schema, SchemaKey, SchemaSet};
use crate::source::{
    AttributeSource, Container, Frame, Level, Page, RawValue, Series, StructuralUnit,
};

use super::normalize::{hash_hex, normalize, normalize_tag_value, sampleformat_text};
use super::{
    FrameReport, LevelReport, Metadata, PageReport, Report, SeriesReport, TagRecord,
};

/// Builds reports against a fixed set of schemas.
#[derive(Debug, Clone, Copy)]
pub struct ReportBuilder<'s> {
    schemas: &'s SchemaSet,
}

impl<'s> ReportBuilder<'s> {
    pub fn new(schemas: &'s SchemaSet) -> Self {
        Self { schemas }
    }

    /// Build the report of a container.
    ///
    /// Either the whole report is built or an error is returned.
    pub fn build(&self, container: &Container) -> Result<Report, BuildError> {
        let metadata = extract(&container.attributes, &self.schemas.tiff)?;

        let series = container
            .series
            .iter()
            .enumerate()
            .map(|(i, series)| self.series_report(i, series))
            .collect::<Result<Vec<_>, _>>()?;

        let report = Report {
            metadata,
            shape: container.shape.clone(),
            dtype: container.dtype.map(|d| d.name().to_string()),
            series_count: container.series.len(),
            page_count: container.page_count,
            series,
        };
        debug_assert_eq!(report.series_count, report.series.len());

        info!(
            series = report.series_count,
            pages = report.page_count,
            "Built report"
        );

        Ok(report)
    }

    fn series_report(&self, index: usize, series: &Series) -> Result<SeriesReport, BuildError> {
        let metadata = extract(&series.attributes, &self.schemas.series)?;

        let levels = series
            .levels
            .iter()
            .enumerate()
            .map(|(j, level)| self.level_report(index, j, level))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(series = index, levels = levels.len(), "Built series report");

        Ok(SeriesReport {
            metadata,
            level_count: series.levels.len(),
            levels,
        })
    }

    fn level_report(
        &self,
        series_index: usize,
        level_index: usize,
        level: &Level,
    ) -> Result<LevelReport, BuildError> {
        let metadata = extract(&level.attributes, &self.schemas.level)?;

        let mut pages = Vec::new();
        let mut current: Option<PageReport> = None;

        for (unit_index, unit) in level.units.iter().enumerate() {
            match unit {
                StructuralUnit::Page(page) => {
                    if let Some(done) = current.take() {
                        pages.push(done);
                    }
                    current = Some(self.page_report(page)?);
                }
                StructuralUnit::Frame(frame) => {
                    let page = current.as_mut().ok_or(BuildError::OrphanFrame {
                        series: series_index,
                        level: level_index,
                        unit: unit_index,
                    })?;
                    page.frames.push(self.frame_report(frame)?);
                    page.frame_count = page.frames.len();
                }
            }
        }
        if let Some(done) = current {
            pages.push(done);
        }

        let tiffpage_count = level.units.iter().filter(|u| u.is_page()).count();
        let tiffframe_count = level.units.iter().filter(|u| u.is_frame()).count();
        debug_assert_eq!(tiffpage_count, pages.len());

        debug!(
            series = series_index,
            level = level_index,
            pages = tiffpage_count,
            frames = tiffframe_count,
            "Built level report"
        );

        Ok(LevelReport {
            metadata,
            page_count: level.units.len(),
            level_index,
            tiffpage_count,
            tiffframe_count,
            pages,
        })
    }

    fn page_report(&self, page: &Page) -> Result<PageReport, BuildError> {
        let mut metadata = extract(&page.attributes, &self.schemas.page)?;

        if self.schemas.page.contains(PageKey::Hash) {
            metadata.insert(
                PageKey::Hash.name().to_string(),
                Value::String(hash_hex(page.attributes.hash)),
            );
        }
        if self.schemas.page.contains(PageKey::SampleFormat) {
            metadata.insert(
                PageKey::SampleFormat.name().to_string(),
                Value::String(sampleformat_text(page.attributes.sampleformat as u64).to_string()),
            );
        }

        let tags = page
            .tags
            .iter()
            .map(|tag| TagRecord {
                name: tag.name.clone(),
                dtype: tag.field_type.name().to_string(),
                value_offset: tag.value_offset,
                count: tag.count,
                value: normalize_tag_value(&tag.value),
            })
            .collect();

        Ok(PageReport {
            metadata,
            tags,
            frames: Vec::new(),
            frame_count: 0,
        })
    }

    fn frame_report(&self, frame: &Frame) -> Result<FrameReport, BuildError> {
        Ok(FrameReport {
            metadata: extract(&frame.attributes, &self.schemas.frame)?,
        })
    }
}

/// Build a report with the given schemas.
pub fn build_report(container: &Container, schemas: &SchemaSet) -> Result<Report, BuildError> {
    ReportBuilder::new(schemas).build(container)
}

/// Read and normalize the attributes a schema names, in schema order.
///
/// Data types become their name and unit references their page index;
/// everything else goes through [`normalize`].
fn extract<S: AttributeSource>(source: &S, schema: &Schema<S::Key>) -> Result<Metadata, BuildError> {
    let mut metadata = Metadata::new();
    for &key in schema.keys() {
        let value = match source.attribute(key) {
            RawValue::DataType(dtype) => {
                dtype.map_or(Value::Null, |d| Value::String(d.name().to_string()))
            }
            RawValue::Unit(unit) => Value::from(unit.index),
            raw => normalize(&raw).map_err(|source| BuildError::Normalize {
                key: key.name(),
                source,
            })?,
        };
        metadata.insert(key.name().to_string(), value);
    }
    Ok(metadata)
}
