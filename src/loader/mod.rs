//! Map file loading. TMX (XML) is the primary format; Tiled JSON is accepted too.
//!
//! Both parsers build the same [`TileMap`] and follow the same rules: tile data
//! must be plain comma separated gids, structural problems abort the load, and
//! loose numeric attributes default to zero.

pub mod json_loader;
pub mod xml_loader;

use std::path::Path;

use log::info;

use crate::error::MapError;
use crate::map::TileMap;
use crate::tile::Tile;

/// Serialization of a map file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFormat {
    /// Tiled XML (`.tmx`).
    Tmx,
    /// Tiled JSON (`.tmj` / `.json`).
    Json,
}

impl MapFormat {
    /// `json`/`tmj` extensions select JSON, everything else TMX.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("tmj") => {
                MapFormat::Json
            }
            _ => MapFormat::Tmx,
        }
    }
}

/// Reads and parses a map file, picking the format from its extension.
pub fn load_map(path: impl AsRef<Path>) -> Result<TileMap, MapError> {
    let path = path.as_ref();
    let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let map = load_map_from_str(&txt, MapFormat::from_path(path))?;
    let (w, h) = map.size();
    info!(
        "loaded map {} ({w}x{h} tiles, {} layers, {:?})",
        path.display(),
        map.layers().len(),
        map.orientation()
    );
    Ok(map)
}

/// Parses map text in the given format.
pub fn load_map_from_str(text: &str, format: MapFormat) -> Result<TileMap, MapError> {
    match format {
        MapFormat::Tmx => xml_loader::parse_tmx(text),
        MapFormat::Json => json_loader::parse_json(text),
    }
}

/// Checks a layer's declared data encoding. Only csv (or no encoding, for
/// formats whose default is a plain integer list) is accepted.
pub(crate) fn check_encoding(layer: &str, encoding: Option<&str>, default: &str) -> Result<(), MapError> {
    match encoding {
        Some("csv") => Ok(()),
        None if default == "csv" => Ok(()),
        other => Err(MapError::UnsupportedEncoding {
            layer: layer.to_owned(),
            encoding: other.unwrap_or(default).to_owned(),
        }),
    }
}

/// Decodes comma/newline separated raw gids.
pub(crate) fn parse_csv(layer: &str, text: &str) -> Result<Vec<Tile>, MapError> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<u32>().map(Tile::from_raw).map_err(|_| {
                MapError::malformed(format!("layer '{layer}': invalid tile value '{tok}'"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(MapFormat::from_path(Path::new("a/b.tmx")), MapFormat::Tmx);
        assert_eq!(MapFormat::from_path(Path::new("a/b.TMJ")), MapFormat::Json);
        assert_eq!(MapFormat::from_path(Path::new("b.json")), MapFormat::Json);
        assert_eq!(MapFormat::from_path(Path::new("noext")), MapFormat::Tmx);
    }

    #[test]
    fn csv_accepts_rows_and_trailing_commas() {
        let tiles = parse_csv("l", "1,2,\n0,2147483651\n").unwrap();
        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles[2].sprite_index, -1);
        assert_eq!(tiles[3].sprite_index, 2);
        assert!(tiles[3].flip_horizontal);
    }

    #[test]
    fn csv_rejects_garbage() {
        assert!(matches!(parse_csv("l", "1,x,3"), Err(MapError::MalformedMap(_))));
        assert!(matches!(parse_csv("l", "1,-1"), Err(MapError::MalformedMap(_))));
    }

    #[test]
    fn only_csv_encoding_passes() {
        assert!(check_encoding("l", Some("csv"), "xml").is_ok());
        assert!(check_encoding("l", None, "csv").is_ok());
        let err = check_encoding("ground", Some("base64"), "csv").unwrap_err();
        assert!(matches!(
            err,
            MapError::UnsupportedEncoding { ref layer, ref encoding } if layer == "ground" && encoding == "base64"
        ));
        assert!(matches!(
            check_encoding("l", None, "xml"),
            Err(MapError::UnsupportedEncoding { ref encoding, .. }) if encoding == "xml"
        ));
    }
}
