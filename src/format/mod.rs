//! Container format readers.
//!
//! The TIFF reader walks a file's IFD structure and produces the
//! [`crate::source::Container`] a report is built from. Format flags such as
//! SVS or OME are recognised by [`detect`].

pub mod detect;
pub mod tiff;

pub use detect::{detect_flags, is_tiff_header, FlagInputs};
pub use tiff::ContainerReader;
