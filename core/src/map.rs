//! Parsed map grid consumed by the world.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::SpawnPointId;

/// Zero-based tile location on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Column that contains the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Row that contains the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Neighbour one step in `direction`, or `None` when it would underflow.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (column, row) = match direction {
            Direction::North => (Some(self.column), self.row.checked_sub(1)),
            Direction::South => (Some(self.column), self.row.checked_add(1)),
            Direction::West => (self.column.checked_sub(1), Some(self.row)),
            Direction::East => (self.column.checked_add(1), Some(self.row)),
        };
        Some(Self::new(column?, row?))
    }
}

/// Cardinal direction used by path markers and tower facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing rows.
    North,
    /// Toward increasing columns.
    East,
    /// Toward increasing rows.
    South,
    /// Toward decreasing columns.
    West,
}

/// Special flag carried by a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileMarker {
    /// Plain tile.
    #[default]
    None,
    /// Tile enemies are trying to reach.
    Goal,
    /// Origin of a path route.
    SpawnPoint(SpawnPointId),
}

/// Single map tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Terrain sprite identifier.
    pub terrain: u32,
    /// Optional decoration sprite identifier.
    pub decoration: Option<u32>,
    /// Direction enemies follow when standing on this tile.
    pub direction: Option<Direction>,
    /// Goal or spawn point flag.
    pub marker: TileMarker,
}

impl Tile {
    /// Reports whether enemies walk across or start from this tile.
    #[must_use]
    pub fn is_path(&self) -> bool {
        self.direction.is_some() || self.marker != TileMarker::None
    }
}

/// Rectangular grid of tiles stored row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMap {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
}

impl TileMap {
    /// Builds a map from rows of tiles.
    ///
    /// The width is taken from the first row; shorter rows are padded with
    /// default tiles and longer rows are truncated.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        let height = rows.len();
        let mut tiles = Vec::with_capacity(width * height);
        for mut row in rows {
            row.resize(width, Tile::default());
            tiles.extend(row);
        }

        Self {
            columns: u32::try_from(width).unwrap_or(u32::MAX),
            rows: u32::try_from(height).unwrap_or(u32::MAX),
            tiles,
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the coordinate lies within the map.
    #[must_use]
    pub const fn contains(&self, coord: TileCoord) -> bool {
        coord.column < self.columns && coord.row < self.rows
    }

    /// Looks up the tile stored at `coord`.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        if !self.contains(coord) {
            return None;
        }
        let index = coord.row as usize * self.columns as usize + coord.column as usize;
        self.tiles.get(index)
    }

    /// Iterates over every tile together with its coordinate in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, &Tile)> {
        let columns = self.columns.max(1);
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            (TileCoord::new(index % columns, index / columns), tile)
        })
    }

    /// Last goal tile in row-major order.
    #[must_use]
    pub fn goal(&self) -> Option<TileCoord> {
        self.iter()
            .filter(|(_, tile)| tile.marker == TileMarker::Goal)
            .map(|(coord, _)| coord)
            .last()
    }

    /// Spawn points sorted by identifier; a later tile repeating an identifier
    /// replaces the earlier one.
    #[must_use]
    pub fn spawn_points(&self) -> Vec<(SpawnPointId, TileCoord)> {
        let mut points: BTreeMap<SpawnPointId, TileCoord> = BTreeMap::new();
        for (coord, tile) in self.iter() {
            if let TileMarker::SpawnPoint(id) = tile.marker {
                let _ = points.insert(id, coord);
            }
        }
        points.into_iter().collect()
    }
}

/// Pixel-space geometry of the map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tile_size: f32,
}

impl TileGrid {
    /// Creates a grid description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, tile_size: f32) -> Self {
        Self {
            columns,
            rows,
            tile_size,
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Total width in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_size
    }

    /// Total height in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    /// World-space center of a tile.
    #[must_use]
    pub fn tile_center(&self, coord: TileCoord) -> Vec2 {
        Vec2::new(
            coord.column as f32 * self.tile_size + self.tile_size / 2.0,
            coord.row as f32 * self.tile_size + self.tile_size / 2.0,
        )
    }

    /// Reports whether the point lies inside the tile's rectangle, edges included.
    #[must_use]
    pub fn tile_contains(&self, coord: TileCoord, point: Vec2) -> bool {
        let left = coord.column as f32 * self.tile_size;
        let top = coord.row as f32 * self.tile_size;
        point.x >= left
            && point.x <= left + self.tile_size
            && point.y >= top
            && point.y <= top + self.tile_size
    }

    /// Reports whether the point lies inside the playable area.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width() && point.y <= self.height()
    }
}
