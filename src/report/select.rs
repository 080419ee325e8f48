//! Sub-reports by series or level selection.
//!
//! Selectors follow Python indexing: a single index may be negative and
//! counts from the end, and a slice `start:stop:step` clamps its bounds to
//! the sequence and may run backwards.

use std::fmt;
use std::str::FromStr;

use crate::error::SelectError;

use super::{Report, SeriesReport};

// =============================================================================
// Selectors
// =============================================================================

/// A `start:stop:step` slice; missing parts take their defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceSpec {
    pub start: Option<isize>,
    pub stop: Option<isize>,
    pub step: Option<isize>,
}

impl SliceSpec {
    pub const fn new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Self {
        Self { start, stop, step }
    }

    /// The slice `::`, selecting everything.
    pub const fn full() -> Self {
        Self::new(None, None, None)
    }

    /// Positions selected from a sequence of `len` items, in selection order.
    pub fn indices(&self, len: usize) -> Result<Vec<usize>, SelectError> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(SelectError::ZeroStep);
        }

        let len = len as isize;
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |bound: isize| {
            if bound < 0 {
                (bound + len).max(lower)
            } else {
                bound.min(upper)
            }
        };

        let start = self
            .start
            .map_or(if step < 0 { upper } else { lower }, clamp);
        let stop = self
            .stop
            .map_or(if step < 0 { lower } else { upper }, clamp);

        let mut selected = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            selected.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
        Ok(selected)
    }
}

impl fmt::Display for SliceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |bound: Option<isize>| bound.map(|b| b.to_string()).unwrap_or_default();
        write!(f, "{}:{}", part(self.start), part(self.stop))?;
        if let Some(step) = self.step {
            write!(f, ":{}", step)?;
        }
        Ok(())
    }
}

/// Which series or levels to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Index(isize),
    Slice(SliceSpec),
}

impl Selector {
    /// Positions selected from a sequence of `len` items.
    pub fn resolve(&self, len: usize) -> Result<Vec<usize>, SelectError> {
        match *self {
            Selector::Index(index) => {
                let resolved = if index < 0 {
                    index + len as isize
                } else {
                    index
                };
                if resolved < 0 || resolved >= len as isize {
                    return Err(SelectError::IndexOutOfRange { index, len });
                }
                Ok(vec![resolved as usize])
            }
            Selector::Slice(slice) => slice.indices(len),
        }
    }
}

impl From<isize> for Selector {
    fn from(index: isize) -> Self {
        Selector::Index(index)
    }
}

impl From<SliceSpec> for Selector {
    fn from(slice: SliceSpec) -> Self {
        Selector::Slice(slice)
    }
}

impl FromStr for Selector {
    type Err = SelectError;

    /// Parse `"2"`, `"-1"`, `"1:3"` or `"::-1"`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || SelectError::InvalidSelector(text.to_string());
        let trimmed = text.trim();

        if !trimmed.contains(':') {
            return trimmed.parse().map(Selector::Index).map_err(|_| invalid());
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        if parts.len() > 3 {
            return Err(invalid());
        }
        let bound = |part: Option<&&str>| -> Result<Option<isize>, SelectError> {
            match part.map(|p| p.trim()) {
                None | Some("") => Ok(None),
                Some(p) => p.parse().map(Some).map_err(|_| invalid()),
            }
        };

        Ok(Selector::Slice(SliceSpec {
            start: bound(parts.first())?,
            stop: bound(parts.get(1))?,
            step: bound(parts.get(2))?,
        }))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Index(index) => write!(f, "{}", index),
            Selector::Slice(slice) => write!(f, "{}", slice),
        }
    }
}

// =============================================================================
// View Operations
// =============================================================================

/// A copy of `report` holding only the selected series.
pub fn select_series(report: &Report, selector: &Selector) -> Result<Report, SelectError> {
    let indices = selector.resolve(report.series.len())?;

    let series: Vec<_> = indices.iter().map(|&i| report.series[i].clone()).collect();
    Ok(Report {
        metadata: report.metadata.clone(),
        shape: report.shape.clone(),
        dtype: report.dtype.clone(),
        series_count: series.len(),
        page_count: report.page_count,
        series,
    })
}

/// A copy of `report` holding only the selected levels of each series.
///
/// Series left without levels are dropped. A single index must exist in
/// every series.
pub fn select_levels(report: &Report, selector: &Selector) -> Result<Report, SelectError> {
    let mut series = Vec::with_capacity(report.series.len());

    for source in &report.series {
        let indices = selector.resolve(source.levels.len())?;
        if indices.is_empty() {
            continue;
        }

        let levels: Vec<_> = indices.iter().map(|&j| source.levels[j].clone()).collect();
        series.push(SeriesReport {
            metadata: source.metadata.clone(),
            level_count: levels.len(),
            levels,
        });
    }

    Ok(Report {
        metadata: report.metadata.clone(),
        shape: report.shape.clone(),
        dtype: report.dtype.clone(),
        series_count: series.len(),
        page_count: report.page_count,
        series,
    })
}
