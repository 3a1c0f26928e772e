// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use crate::attributes::AttributeError;
use crate::geometry::GeometryError;
use crate::graph::GraphError;

pub mod compiler;
pub mod model;
pub mod speed;
pub mod xml;

pub use compiler::{compile_buffer, compile_file, Network};

/// Error which can occur while reading, parsing or compiling OSM data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] Arc<io::Error>),

    #[error("xml: {0}")]
    Xml(quick_xml::Error),

    #[error("duplicate OSM node id {0}")]
    DuplicateNode(i64),

    #[error("way {way} references missing node {node}")]
    MissingNode { way: i64, node: i64 },

    /// Internal inconsistency: the CSR row-pointer array does not line up
    /// with the number of emitted edges after the final pass.
    #[error("geometry row index holds {rows} entries but {edges} edges were emitted")]
    RowIndexMismatch { rows: usize, edges: usize },

    #[error("unknown file format: data does not look like .osm/.osm.gz/.osm.bz2")]
    UnknownFileFormat,

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(Arc::new(e))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        match e {
            quick_xml::Error::Io(ioe) => Error::Io(ioe),
            _ => Error::Xml(e),
        }
    }
}

/// Format of the input OSM file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content.
    Unknown,

    /// Uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML).
    Xml,

    /// OSM XML with [gzip](https://en.wikipedia.org/wiki/Gzip) compression.
    XmlGz,

    /// OSM XML with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression.
    XmlBz2,
}

impl FileFormat {
    /// Attempts to detect the file format based on the initial bytes of
    /// the file. At least 8 bytes should be provided.
    pub fn detect(b: &[u8]) -> FileFormat {
        if b.starts_with(b"<?xml") || b.starts_with(b"<osm") {
            FileFormat::Xml
        } else if b.starts_with(b"\x1F\x8B") {
            FileFormat::XmlGz // Gzip magic bytes
        } else if b.starts_with(b"BZh") {
            FileFormat::XmlBz2 // Bzip2 magic bytes
        } else {
            FileFormat::Unknown
        }
    }
}

/// Opens the file at `path` for one compiler pass, transparently
/// decompressing gzip and bzip2 inputs. The format is sniffed from the
/// file's magic bytes on every call, so each pass gets a fresh stream.
pub(crate) fn open_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn io::BufRead>, Error> {
    let f = File::open(path)?;
    let mut b = io::BufReader::new(f);

    match FileFormat::detect(b.fill_buf()?) {
        FileFormat::Xml => Ok(Box::new(b)),
        FileFormat::XmlGz => Ok(Box::new(io::BufReader::new(
            flate2::bufread::MultiGzDecoder::new(b),
        ))),
        FileFormat::XmlBz2 => Ok(Box::new(io::BufReader::new(
            bzip2::bufread::MultiBzDecoder::new(b),
        ))),
        FileFormat::Unknown => Err(Error::UnknownFileFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_format_detect() {
        assert_eq!(FileFormat::detect(b""), FileFormat::Unknown);
        assert_eq!(FileFormat::detect(b"lorem ipsum dolo"), FileFormat::Unknown);
        assert_eq!(FileFormat::detect(b"<?xml version='1"), FileFormat::Xml);
        assert_eq!(FileFormat::detect(b"<osm version='0."), FileFormat::Xml);
        assert_eq!(
            FileFormat::detect(b"\x1F\x8B\x08\x08\x84s\xCE^"),
            FileFormat::XmlGz,
        );
        assert_eq!(
            FileFormat::detect(b"BZh91AY&SY\x12\x10&X\x00\x04"),
            FileFormat::XmlBz2,
        );
    }
}
