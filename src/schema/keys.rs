//! Attribute keys of each structural level.

use std::fmt::Debug;
use std::hash::Hash;

use super::SchemaName;

/// A typed attribute key of one structural level.
///
/// The set of variants is the set of attributes the level exposes. Schema
/// documents are checked against it when they are loaded.
pub trait SchemaKey: Copy + Eq + Hash + Debug + 'static {
    /// The schema whose keys these are.
    const SCHEMA: SchemaName;

    /// Every key, in declaration order.
    const ALL: &'static [Self];

    /// Attribute name as written in schema documents and reports.
    fn name(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.name() == name)
    }
}

macro_rules! schema_keys {
    (
        $(#[$meta:meta])*
        $enum:ident for $schema:ident {
            $($variant:ident => $name:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $enum {
            $($variant,)+
        }

        impl SchemaKey for $enum {
            const SCHEMA: SchemaName = SchemaName::$schema;
            const ALL: &'static [Self] = &[$($enum::$variant,)+];

            fn name(self) -> &'static str {
                match self {
                    $($enum::$variant => $name,)+
                }
            }
        }
    };
}

schema_keys! {
    /// File-level attributes.
    TiffKey for Tiff {
        Filename => "filename",
        Filesize => "filesize",
        Byteorder => "byteorder",
        IsBigtiff => "is_bigtiff",
        Flags => "flags",
    }
}

schema_keys! {
    /// Series attributes.
    SeriesKey for Series {
        Index => "index",
        Name => "name",
        Kind => "kind",
        Shape => "shape",
        Axes => "axes",
        Dtype => "dtype",
        Keyframe => "keyframe",
        IsPyramidal => "is_pyramidal",
    }
}

schema_keys! {
    /// Resolution level attributes.
    LevelKey for Level {
        Name => "name",
        Shape => "shape",
        Axes => "axes",
        Dtype => "dtype",
    }
}

schema_keys! {
    /// Page attributes.
    PageKey for Page {
        Index => "index",
        Offset => "offset",
        Shape => "shape",
        Dtype => "dtype",
        Axes => "axes",
        ImageWidth => "imagewidth",
        ImageLength => "imagelength",
        TileWidth => "tilewidth",
        TileLength => "tilelength",
        BitsPerSample => "bitspersample",
        SamplesPerPixel => "samplesperpixel",
        SampleFormat => "sampleformat",
        Compression => "compression",
        Photometric => "photometric",
        PlanarConfig => "planarconfig",
        SubfileType => "subfiletype",
        IsTiled => "is_tiled",
        IsReduced => "is_reduced",
        Hash => "hash",
    }
}

schema_keys! {
    /// Frame attributes.
    FrameKey for Frame {
        Index => "index",
        Offset => "offset",
        Shape => "shape",
        ChunkCount => "chunk_count",
    }
}
