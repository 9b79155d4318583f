//! TMX reader: quick-xml events are folded into a small element tree, then interpreted.
use std::str::FromStr;

use log::{debug, warn};
use macroquad::prelude::*;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::MapError;
use crate::map::{
    Layer, LayerKind, ObjectLayer, ObjectShape, Orientation, TileLayer, TileMap, TileObject, TilesetRef,
};
use crate::properties::{Properties, Property};

use super::{check_encoding, parse_csv};

#[derive(Debug, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(e: &BytesStart) -> Result<Self, MapError> {
        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attrs.push((key, value));
        }
        Ok(Element {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            attrs,
            ..Default::default()
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Numeric attribute; absent or unparsable reads as zero.
    fn num<T: FromStr + Default>(&self, key: &str) -> T {
        self.attr(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_default()
    }

    /// Numeric attribute that structural references depend on.
    fn required<T: FromStr>(&self, key: &str) -> Result<T, MapError> {
        let raw = self.attr(key).ok_or_else(|| {
            MapError::malformed(format!("<{}> is missing required attribute '{key}'", self.name))
        })?;
        raw.trim().parse().map_err(|_| {
            MapError::malformed(format!("<{}> has invalid {key}='{raw}'", self.name))
        })
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(el),
        None => {
            if root.is_none() {
                *root = Some(el);
            }
        }
    }
}

fn parse_tree(xml: &str) -> Result<Element, MapError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => stack.push(Element::from_start(&e)?),
            Event::Empty(e) => {
                let el = Element::from_start(&e)?;
                attach(&mut stack, &mut root, el);
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| MapError::malformed("unbalanced closing tag"))?;
                attach(&mut stack, &mut root, el);
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(MapError::malformed(format!(
            "document ends inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| MapError::malformed("document has no root element"))
}

/// Parses a TMX document.
pub fn parse_tmx(xml: &str) -> Result<TileMap, MapError> {
    let root = parse_tree(xml)?;
    if root.name != "map" {
        return Err(MapError::malformed(format!(
            "root element is <{}>, expected <map>",
            root.name
        )));
    }

    let width: u32 = root.num("width");
    let height: u32 = root.num("height");
    let tile_width: u32 = root.num("tilewidth");
    let tile_height: u32 = root.num("tileheight");
    if tile_width == 0 || tile_height == 0 {
        warn!("map declares a zero tile size ({tile_width}x{tile_height})");
    }
    let orientation = Orientation::from_attr(root.attr("orientation"));
    let tile_size = vec2(tile_width as f32, tile_height as f32);

    let mut builder = TileMap::builder(orientation, width, height, tile_width, tile_height);
    for child in &root.children {
        match child.name.as_str() {
            "properties" => {
                builder.properties(read_properties(Some(child)));
            }
            "tileset" => {
                builder.tileset(read_tileset(child)?);
            }
            "layer" => {
                builder.push_layer(read_tile_layer(child, width, height, tile_size)?)?;
            }
            "objectgroup" => {
                builder.push_layer(read_object_layer(child, width, height)?)?;
            }
            other => debug!("skipping unsupported <{other}> element"),
        }
    }
    Ok(builder.build())
}

fn read_properties(el: Option<&Element>) -> Properties {
    let Some(el) = el else {
        return Properties::new();
    };
    el.children_named("property")
        .map(|p| {
            let raw = match p.attr("value") {
                Some(v) => v.to_owned(),
                None => p.text.clone(),
            };
            Property::new(
                p.attr("name").unwrap_or_default(),
                p.attr("type").unwrap_or_default(),
                raw,
            )
        })
        .collect()
}

fn read_tileset(el: &Element) -> Result<TilesetRef, MapError> {
    Ok(TilesetRef {
        first_gid: el.required("firstgid")?,
        name: el.attr("name").unwrap_or_default().to_owned(),
        source: el.attr("source").map(str::to_owned),
        image: el
            .child("image")
            .and_then(|i| i.attr("source"))
            .map(str::to_owned),
        tile_width: el.num("tilewidth"),
        tile_height: el.num("tileheight"),
        tile_count: el.num("tilecount"),
        columns: el.num("columns"),
    })
}

/// Layer fields shared by tile and object layers.
fn read_layer_base(el: &Element, map_w: u32, map_h: u32, kind: LayerKind) -> Result<Layer, MapError> {
    let dim = |key: &str, fallback: u32| {
        el.attr(key)
            .map_or(fallback, |v| v.trim().parse().unwrap_or(0))
    };
    Ok(Layer {
        id: el.required("id")?,
        name: el.attr("name").unwrap_or_default().to_owned(),
        width: dim("width", map_w),
        height: dim("height", map_h),
        visible: el.attr("visible") != Some("0"),
        opacity: el
            .attr("opacity")
            .map_or(1.0, |v| v.trim().parse().unwrap_or(0.0)),
        offset: vec2(el.num("offsetx"), el.num("offsety")),
        properties: read_properties(el.child("properties")),
        kind,
    })
}

fn read_tile_layer(el: &Element, map_w: u32, map_h: u32, tile_size: Vec2) -> Result<Layer, MapError> {
    let name = el.attr("name").unwrap_or_default();
    let data = el
        .child("data")
        .ok_or_else(|| MapError::malformed(format!("layer '{name}' has no <data> block")))?;
    // TMX without an encoding attribute stores one <tile> element per cell
    check_encoding(name, data.attr("encoding"), "xml")?;
    let tiles = parse_csv(name, &data.text)?;

    read_layer_base(
        el,
        map_w,
        map_h,
        LayerKind::Tiles(TileLayer { tile_size, tiles }),
    )
}

fn read_object_layer(el: &Element, map_w: u32, map_h: u32) -> Result<Layer, MapError> {
    let objects = el.children_named("object").map(read_object).collect();
    read_layer_base(el, map_w, map_h, LayerKind::Objects(ObjectLayer { objects }))
}

fn read_object(el: &Element) -> TileObject {
    // first matching shape element wins, in this order
    let shape = if let Some(p) = el.child("polygon") {
        ObjectShape::Polygon(parse_points(p.attr("points").unwrap_or_default()))
    } else if let Some(p) = el.child("polyline") {
        ObjectShape::Polyline(parse_points(p.attr("points").unwrap_or_default()))
    } else if el.child("ellipse").is_some() {
        ObjectShape::Ellipse
    } else if let Some(t) = el.child("text") {
        ObjectShape::Text(t.text.clone())
    } else if el.child("point").is_some() {
        ObjectShape::Point
    } else {
        ObjectShape::None
    };

    TileObject {
        id: el.num("id"),
        name: el.attr("name").unwrap_or_default().to_owned(),
        bounds: Rect::new(el.num("x"), el.num("y"), el.num("width"), el.num("height")),
        visible: el.attr("visible") != Some("0"),
        kind: el
            .attr("type")
            .or_else(|| el.attr("class"))
            .unwrap_or_default()
            .to_owned(),
        rotation: el.num("rotation"),
        gid: el.num("gid"),
        template: el.attr("template").map(str::to_owned),
        shape,
        properties: read_properties(el.child("properties")),
    }
}

/// `"x,y x,y ..."`; malformed coordinates read as zero.
fn parse_points(s: &str) -> Vec<Vec2> {
    s.split_whitespace()
        .map(|pair| {
            let (x, y) = pair.split_once(',').unwrap_or((pair, ""));
            vec2(x.trim().parse().unwrap_or(0.0), y.trim().parse().unwrap_or(0.0))
        })
        .collect()
}
