//! Open a container and build its report.

use std::path::Path;

use tracing::debug;

use crate::error::InspectError;
use crate::format::ContainerReader;
use crate::io::{FileRangeReader, RangeReader};
use crate::report::{Report, ReportBuilder};
use crate::schema::SchemaSet;

/// Read the container behind `reader` and build its report.
///
/// The container is read to completion before the report is built; the
/// returned report holds no reference to the reader.
pub async fn inspect<R>(reader: &R, schemas: &SchemaSet) -> Result<Report, InspectError>
where
    R: RangeReader + ?Sized,
{
    let container = ContainerReader::read(reader).await?;
    debug!(
        identifier = reader.identifier(),
        series = container.series.len(),
        "Container read"
    );

    Ok(ReportBuilder::new(schemas).build(&container)?)
}

/// Open the TIFF file at `path` and build its report.
pub async fn inspect_file(
    path: impl AsRef<Path>,
    schemas: &SchemaSet,
) -> Result<Report, InspectError> {
    let reader = FileRangeReader::open(path).await?;
    inspect(&reader, schemas).await
}
