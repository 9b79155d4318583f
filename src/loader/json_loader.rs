//! Tiled JSON (`.tmj`) reader.
use log::debug;
use macroquad::prelude::*;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::MapError;
use crate::map::{
    Layer, LayerKind, ObjectLayer, ObjectShape, Orientation, TileLayer, TileMap, TileObject, TilesetRef,
};
use crate::properties::{Properties, Property};
use crate::tile::Tile;

use super::check_encoding;

#[derive(Deserialize)]
struct JsonMap {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    tilewidth: u32,
    #[serde(default)]
    tileheight: u32,
    #[serde(default)]
    orientation: Option<String>,
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonLayer {
    id: Option<u32>,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    data: Option<JsonValue>,
    encoding: Option<String>,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default = "one")]
    opacity: f32,
    #[serde(default)]
    offsetx: f32,
    #[serde(default)]
    offsety: f32,
    #[serde(default)]
    properties: Vec<JsonProperty>,
    #[serde(default)]
    objects: Vec<JsonObject>,
}

fn default_true() -> bool {
    true
}
fn one() -> f32 {
    1.0
}

#[derive(Deserialize)]
struct JsonTilesetRef {
    firstgid: Option<u32>,
    #[serde(default)]
    name: String,
    source: Option<String>,
    image: Option<String>,
    #[serde(default)]
    tilewidth: u32,
    #[serde(default)]
    tileheight: u32,
    #[serde(default)]
    tilecount: u32,
    #[serde(default)]
    columns: u32,
}

#[derive(Deserialize)]
struct JsonProperty {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    value: JsonValue,
}

#[derive(Deserialize)]
struct JsonObject {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    rotation: f32,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    point: bool,
    #[serde(default)]
    ellipse: bool,
    polygon: Option<Vec<JsonObjectPoint>>,
    polyline: Option<Vec<JsonObjectPoint>>,
    text: Option<JsonText>,
    #[serde(default)]
    gid: u32,
    template: Option<String>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonObjectPoint {
    x: f32,
    y: f32,
}

#[derive(Deserialize)]
struct JsonText {
    #[serde(default)]
    text: String,
}

fn properties_from_json(props: Vec<JsonProperty>) -> Properties {
    props
        .into_iter()
        .map(|p| {
            let raw = match p.value {
                JsonValue::String(s) => s,
                JsonValue::Null => String::new(),
                other => other.to_string(),
            };
            Property::new(p.name, p.kind.unwrap_or_default(), raw)
        })
        .collect()
}

fn points(pts: Vec<JsonObjectPoint>) -> Vec<Vec2> {
    pts.into_iter().map(|p| vec2(p.x, p.y)).collect()
}

fn object_from_json(obj: JsonObject) -> TileObject {
    // same precedence as the TMX reader
    let shape = if let Some(p) = obj.polygon {
        ObjectShape::Polygon(points(p))
    } else if let Some(p) = obj.polyline {
        ObjectShape::Polyline(points(p))
    } else if obj.ellipse {
        ObjectShape::Ellipse
    } else if let Some(t) = obj.text {
        ObjectShape::Text(t.text)
    } else if obj.point {
        ObjectShape::Point
    } else {
        ObjectShape::None
    };

    let kind = if !obj.kind.is_empty() {
        obj.kind
    } else {
        obj.class
    };

    TileObject {
        id: obj.id,
        name: obj.name,
        bounds: Rect::new(obj.x, obj.y, obj.width, obj.height),
        visible: obj.visible,
        kind,
        rotation: obj.rotation,
        gid: obj.gid,
        template: obj.template,
        shape,
        properties: properties_from_json(obj.properties),
    }
}

fn tiles_from_json(layer: &str, data: Option<JsonValue>, encoding: Option<&str>) -> Result<Vec<Tile>, MapError> {
    check_encoding(layer, encoding, "csv")?;
    match data {
        Some(JsonValue::Array(values)) => values
            .iter()
            .map(|v| {
                v.as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .map(Tile::from_raw)
                    .ok_or_else(|| {
                        MapError::malformed(format!("layer '{layer}': invalid tile value {v}"))
                    })
            })
            .collect(),
        // a string payload is base64, with or without an explicit encoding
        Some(JsonValue::String(_)) => Err(MapError::UnsupportedEncoding {
            layer: layer.to_owned(),
            encoding: "base64".to_owned(),
        }),
        Some(_) | None => Err(MapError::malformed(format!(
            "layer '{layer}' has no tile data array"
        ))),
    }
}

fn layer_from_json(l: JsonLayer, map_w: u32, map_h: u32, tile_size: Vec2) -> Result<Option<Layer>, MapError> {
    let kind = match l.kind.as_deref().unwrap_or("tilelayer") {
        "tilelayer" => LayerKind::Tiles(TileLayer {
            tile_size,
            tiles: tiles_from_json(&l.name, l.data, l.encoding.as_deref())?,
        }),
        "objectgroup" => LayerKind::Objects(ObjectLayer {
            objects: l.objects.into_iter().map(object_from_json).collect(),
        }),
        other => {
            debug!("skipping unsupported '{other}' layer '{}'", l.name);
            return Ok(None);
        }
    };

    let id = l
        .id
        .ok_or_else(|| MapError::malformed(format!("layer '{}' has no id", l.name)))?;

    Ok(Some(Layer {
        id,
        name: l.name,
        width: l.width.unwrap_or(map_w),
        height: l.height.unwrap_or(map_h),
        visible: l.visible,
        opacity: l.opacity,
        offset: vec2(l.offsetx, l.offsety),
        properties: properties_from_json(l.properties),
        kind,
    }))
}

/// Parses a Tiled JSON document.
pub fn parse_json(json: &str) -> Result<TileMap, MapError> {
    let j: JsonMap = serde_json::from_str(json)?;

    let orientation = Orientation::from_attr(j.orientation.as_deref());
    let tile_size = vec2(j.tilewidth as f32, j.tileheight as f32);
    let mut builder = TileMap::builder(orientation, j.width, j.height, j.tilewidth, j.tileheight);
    builder.properties(properties_from_json(j.properties));

    for ts in j.tilesets {
        let first_gid = ts
            .firstgid
            .ok_or_else(|| MapError::malformed("tileset without firstgid"))?;
        builder.tileset(TilesetRef {
            first_gid,
            name: ts.name,
            source: ts.source,
            image: ts.image,
            tile_width: ts.tilewidth,
            tile_height: ts.tileheight,
            tile_count: ts.tilecount,
            columns: ts.columns,
        });
    }

    for l in j.layers {
        if let Some(layer) = layer_from_json(l, j.width, j.height, tile_size)? {
            builder.push_layer(layer)?;
        }
    }
    Ok(builder.build())
}
