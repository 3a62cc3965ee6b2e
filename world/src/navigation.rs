//! Path routes baked from the map's direction markers.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use glam::Vec2;
use village_defence_core::{SpawnPointId, TileCoord, TileGrid, TileMap, TileMarker};

/// Immutable waypoint list shared by every enemy spawned at one spawn point.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Route {
    tiles: Vec<TileCoord>,
    points: Vec<Vec2>,
}

impl Route {
    /// Follows direction markers from `start`.
    ///
    /// The walk stops after recording a goal tile, and before leaving the map
    /// or revisiting a tile. A tile without a direction ends the route.
    pub(crate) fn follow(map: &TileMap, grid: &TileGrid, start: TileCoord) -> Self {
        let mut tiles = Vec::new();
        let mut visited = BTreeSet::new();
        let mut cursor = Some(start);

        while let Some(coord) = cursor {
            let Some(tile) = map.tile(coord) else {
                break;
            };
            if !visited.insert(coord) {
                break;
            }
            tiles.push(coord);
            if tile.marker == TileMarker::Goal {
                break;
            }
            cursor = tile.direction.and_then(|direction| coord.step(direction));
        }

        let points = tiles.iter().map(|coord| grid.tile_center(*coord)).collect();
        Self { tiles, points }
    }

    /// Tile coordinates in walking order.
    pub(crate) fn tiles(&self) -> &[TileCoord] {
        &self.tiles
    }

    /// Tile centers in walking order.
    pub(crate) fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub(crate) fn len(&self) -> usize {
        self.points.len()
    }
}

/// Builds one shared route per spawn point declared by the map.
pub(crate) fn build_routes(map: &TileMap, grid: &TileGrid) -> BTreeMap<SpawnPointId, Arc<Route>> {
    map.spawn_points()
        .into_iter()
        .map(|(id, start)| (id, Arc::new(Route::follow(map, grid, start))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use village_defence_core::{Direction, Tile};

    fn marker(direction: Option<Direction>, marker: TileMarker) -> Tile {
        Tile {
            direction,
            marker,
            ..Tile::default()
        }
    }

    fn grid_for(map: &TileMap) -> TileGrid {
        TileGrid::new(map.columns(), map.rows(), 48.0)
    }

    #[test]
    fn straight_chain_of_right_markers_ends_on_goal() {
        let east = marker(Some(Direction::East), TileMarker::None);
        let map = TileMap::from_rows(vec![vec![
            marker(Some(Direction::East), TileMarker::SpawnPoint(SpawnPointId::new(1))),
            east,
            east,
            east,
            marker(None, TileMarker::Goal),
        ]]);

        let route = Route::follow(&map, &grid_for(&map), TileCoord::new(0, 0));

        assert_eq!(route.len(), 5);
        assert_eq!(route.tiles().last(), Some(&TileCoord::new(4, 0)));
        assert_eq!(route.points()[0], Vec2::new(24.0, 24.0));
    }

    #[test]
    fn goal_tile_stops_the_walk_even_with_a_direction() {
        let map = TileMap::from_rows(vec![vec![
            marker(Some(Direction::East), TileMarker::None),
            marker(Some(Direction::East), TileMarker::Goal),
            marker(Some(Direction::East), TileMarker::None),
        ]]);

        let route = Route::follow(&map, &grid_for(&map), TileCoord::new(0, 0));

        assert_eq!(route.tiles(), &[TileCoord::new(0, 0), TileCoord::new(1, 0)]);
    }

    #[test]
    fn cycle_terminates_the_route() {
        let map = TileMap::from_rows(vec![
            vec![
                marker(Some(Direction::East), TileMarker::None),
                marker(Some(Direction::South), TileMarker::None),
            ],
            vec![
                marker(Some(Direction::North), TileMarker::None),
                marker(Some(Direction::West), TileMarker::None),
            ],
        ]);

        let route = Route::follow(&map, &grid_for(&map), TileCoord::new(0, 0));

        assert_eq!(route.len(), 4);
    }

    #[test]
    fn leaving_the_map_or_missing_direction_stops() {
        let off_edge = TileMap::from_rows(vec![vec![
            marker(Some(Direction::East), TileMarker::None),
            marker(Some(Direction::East), TileMarker::None),
        ]]);
        let dead_end = TileMap::from_rows(vec![vec![
            marker(Some(Direction::East), TileMarker::None),
            marker(None, TileMarker::None),
            marker(Some(Direction::East), TileMarker::None),
        ]]);

        let off_edge_route = Route::follow(&off_edge, &grid_for(&off_edge), TileCoord::new(0, 0));
        let dead_end_route = Route::follow(&dead_end, &grid_for(&dead_end), TileCoord::new(0, 0));

        assert_eq!(off_edge_route.len(), 2);
        assert_eq!(dead_end_route.len(), 2);
    }

    #[test]
    fn routes_are_built_per_spawn_point() {
        let map = TileMap::from_rows(vec![
            vec![
                marker(Some(Direction::South), TileMarker::SpawnPoint(SpawnPointId::new(1))),
                marker(Some(Direction::West), TileMarker::SpawnPoint(SpawnPointId::new(2))),
            ],
            vec![marker(None, TileMarker::Goal), Tile::default()],
        ]);

        let routes = build_routes(&map, &grid_for(&map));

        assert_eq!(routes.len(), 2);
        assert_eq!(routes[&SpawnPointId::new(1)].len(), 2);
        assert_eq!(routes[&SpawnPointId::new(2)].len(), 3);
    }
}
