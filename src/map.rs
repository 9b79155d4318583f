//! Passive map data: layers, objects and the [`TileMap`] snapshot.

use std::collections::HashMap;

use macroquad::prelude::*;

use crate::error::MapError;
use crate::properties::Properties;
use crate::tile::Tile;

/// Layer identifier as written in the map file. Unique across all layers of a map.
pub type LayerId = u32;

/// Screen layout rule applied to grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Plain rectangular grid.
    Orthogonal,
    /// Diamond layout derived from the same grid.
    Isometric,
}

impl Orientation {
    /// `"orthogonal"` selects the grid layout, everything else (absent included) isometric.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("orthogonal") => Orientation::Orthogonal,
            _ => Orientation::Isometric,
        }
    }
}

/// A tileset declared by the map. Only the reference is kept; external files are not read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TilesetRef {
    /// Gid of the tileset's first tile.
    pub first_gid: u32,
    /// Tileset name, empty for external references.
    pub name: String,
    /// Path of the external `.tsx`/`.tsj`, if the tileset is not embedded.
    pub source: Option<String>,
    /// Atlas image path of an embedded tileset.
    pub image: Option<String>,
    /// Cell width in pixels.
    pub tile_width: u32,
    /// Cell height in pixels.
    pub tile_height: u32,
    /// Number of tiles.
    pub tile_count: u32,
    /// Number of columns in the atlas image.
    pub columns: u32,
}

/// Geometry attached to a [`TileObject`] on top of its bounds.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ObjectShape {
    /// Plain rectangle.
    #[default]
    None,
    /// Ellipse inscribed in the bounds.
    Ellipse,
    /// Single point at the object position.
    Point,
    /// Closed outline, points relative to the object position.
    Polygon(Vec<Vec2>),
    /// Open outline, points relative to the object position.
    Polyline(Vec<Vec2>),
    /// Text label.
    Text(String),
}

/// An entry of an object layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TileObject {
    /// Object id from the file (0 when absent).
    pub id: u32,
    /// Object name.
    pub name: String,
    /// Position and size in pixels.
    pub bounds: Rect,
    /// Hidden objects are not drawn; queries still return them.
    pub visible: bool,
    /// Free-form type tag used by [`TileMap::objects_by_type`].
    pub kind: String,
    /// Degrees, clockwise.
    pub rotation: f32,
    /// Raw gid of the tile this object displays, 0 when none.
    pub gid: u32,
    /// Template file the object was instantiated from.
    pub template: Option<String>,
    /// Subtype geometry.
    pub shape: ObjectShape,
    /// Custom properties.
    pub properties: Properties,
}

impl Default for TileObject {
    fn default() -> Self {
        TileObject {
            id: 0,
            name: String::new(),
            bounds: Rect::new(0.0, 0.0, 0.0, 0.0),
            visible: true,
            kind: String::new(),
            rotation: 0.0,
            gid: 0,
            template: None,
            shape: ObjectShape::None,
            properties: Properties::new(),
        }
    }
}

/// Grid content of a tile layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    /// Pixel size of one cell.
    pub tile_size: Vec2,
    /// Row-major, `width * height` cells.
    pub tiles: Vec<Tile>,
}

/// Object content of an object layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectLayer {
    /// Objects in declaration order.
    pub objects: Vec<TileObject>,
}

/// Variant content of a [`Layer`].
#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    /// Tile grid.
    Tiles(TileLayer),
    /// Free objects.
    Objects(ObjectLayer),
}

/// One entry of the map's draw-ordered layer list.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Unique id within the map.
    pub id: LayerId,
    /// Layer name.
    pub name: String,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Invisible layers are not drawn.
    pub visible: bool,
    /// Multiplies the tint alpha.
    pub opacity: f32,
    /// Pixel offset added to everything drawn by this layer.
    pub offset: Vec2,
    /// Custom properties.
    pub properties: Properties,
    /// Tile or object content.
    pub kind: LayerKind,
}

impl Layer {
    /// True for object layers.
    pub fn is_object_layer(&self) -> bool {
        matches!(self.kind, LayerKind::Objects(_))
    }

    /// Grid content, if this is a tile layer.
    pub fn as_tiles(&self) -> Option<&TileLayer> {
        match &self.kind {
            LayerKind::Tiles(t) => Some(t),
            LayerKind::Objects(_) => None,
        }
    }

    /// Objects, if this is an object layer.
    pub fn as_objects(&self) -> Option<&ObjectLayer> {
        match &self.kind {
            LayerKind::Objects(o) => Some(o),
            LayerKind::Tiles(_) => None,
        }
    }

    /// Cell at `(col, row)`; `None` outside the grid or on object layers.
    pub fn tile_at(&self, col: u32, row: u32) -> Option<Tile> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let idx = row as usize * self.width as usize + col as usize;
        self.as_tiles().and_then(|t| t.tiles.get(idx).copied())
    }

    /// Pixel extent of a tile layer, `None` for object layers.
    pub fn pixel_size(&self) -> Option<Vec2> {
        self.as_tiles()
            .map(|t| vec2(self.width as f32 * t.tile_size.x, self.height as f32 * t.tile_size.y))
    }
}

/// Immutable snapshot of a loaded map.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    orientation: Orientation,
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    layers: Vec<Layer>,
    tile_layers: HashMap<LayerId, usize>,
    object_layers: HashMap<LayerId, usize>,
    properties: Properties,
    tilesets: Vec<TilesetRef>,
}

impl TileMap {
    /// Starts a map of `width x height` tiles of `tile_width x tile_height` pixels.
    pub fn builder(
        orientation: Orientation,
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> TileMapBuilder {
        TileMapBuilder {
            map: TileMap {
                orientation,
                width,
                height,
                tile_width,
                tile_height,
                layers: Vec::new(),
                tile_layers: HashMap::new(),
                object_layers: HashMap::new(),
                properties: Properties::new(),
                tilesets: Vec::new(),
            },
        }
    }

    /// Projection used when drawing.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Map size in tiles.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel size of one tile.
    pub fn tile_size(&self) -> Vec2 {
        vec2(self.tile_width as f32, self.tile_height as f32)
    }

    /// Layers in file order, which is also draw order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Tile layer by id.
    pub fn tile_layer(&self, id: LayerId) -> Option<&Layer> {
        self.tile_layers.get(&id).map(|&i| &self.layers[i])
    }

    /// Object layer by id.
    pub fn object_layer(&self, id: LayerId) -> Option<&Layer> {
        self.object_layers.get(&id).map(|&i| &self.layers[i])
    }

    /// Map-level properties.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Tilesets in declaration order.
    pub fn tilesets(&self) -> &[TilesetRef] {
        &self.tilesets
    }

    /// Objects whose type tag equals `kind`, in layer order then declaration order.
    pub fn objects_by_type<'a, 'k>(&'a self, kind: &'k str) -> impl Iterator<Item = &'a TileObject> + 'k
    where
        'a: 'k,
    {
        self.layers
            .iter()
            .filter_map(Layer::as_objects)
            .flat_map(|l| l.objects.iter())
            .filter(move |o| o.kind == kind)
    }

    /// True when `p` lies inside the pixel extent of at least one tile layer.
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.layers.iter().filter_map(Layer::pixel_size).any(|size| {
            p.x >= 0.0 && p.y >= 0.0 && p.x < size.x && p.y < size.y
        })
    }
}

/// Assembles a [`TileMap`] while enforcing its invariants.
#[derive(Debug)]
pub struct TileMapBuilder {
    map: TileMap,
}

impl TileMapBuilder {
    /// Sets the map-level properties.
    pub fn properties(&mut self, properties: Properties) -> &mut Self {
        self.map.properties = properties;
        self
    }

    /// Records a tileset reference.
    pub fn tileset(&mut self, tileset: TilesetRef) -> &mut Self {
        self.map.tilesets.push(tileset);
        self
    }

    /// Appends a layer after checking id uniqueness and, for tile layers, the cell count.
    pub fn push_layer(&mut self, layer: Layer) -> Result<&mut Self, MapError> {
        if self.map.tile_layers.contains_key(&layer.id)
            || self.map.object_layers.contains_key(&layer.id)
        {
            return Err(MapError::malformed(format!(
                "duplicate layer id {} ('{}')",
                layer.id, layer.name
            )));
        }

        let idx = self.map.layers.len();
        match &layer.kind {
            LayerKind::Tiles(t) => {
                let expected = layer.width as usize * layer.height as usize;
                if t.tiles.len() != expected {
                    return Err(MapError::malformed(format!(
                        "layer '{}' has {} tiles, expected {}x{} = {}",
                        layer.name,
                        t.tiles.len(),
                        layer.width,
                        layer.height,
                        expected
                    )));
                }
                self.map.tile_layers.insert(layer.id, idx);
            }
            LayerKind::Objects(_) => {
                self.map.object_layers.insert(layer.id, idx);
            }
        }
        self.map.layers.push(layer);
        Ok(self)
    }

    /// Finishes the snapshot.
    pub fn build(self) -> TileMap {
        self.map
    }
}
