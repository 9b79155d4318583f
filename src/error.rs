use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading maps or drawing through the sprite atlas.
#[derive(Debug, Error)]
pub enum MapError {
    /// The document is missing required structure (root element, layer data, ids...).
    #[error("malformed map: {0}")]
    MalformedMap(String),

    /// Layer data is not stored as a plain comma separated list of integers.
    #[error("layer '{layer}' uses unsupported encoding '{encoding}' (only csv is supported)")]
    UnsupportedEncoding {
        /// Name of the offending layer.
        layer: String,
        /// Encoding found in the document.
        encoding: String,
    },

    /// A draw was attempted with a sprite whose texture id was never registered.
    #[error("texture {0} was never registered")]
    UnregisteredTexture(u32),

    /// A sprite id outside the registry.
    #[error("sprite id {0} is out of range")]
    InvalidId(usize),

    /// File I/O error.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The TMX document is not well formed XML.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The JSON document (map or view config) could not be parsed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MapError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        MapError::MalformedMap(msg.into())
    }
}

impl From<quick_xml::events::attributes::AttrError> for MapError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        MapError::Xml(err.into())
    }
}
