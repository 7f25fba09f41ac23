#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spatial hash grid for broad-phase proximity queries.
//!
//! The grid is rebuilt wholesale each tick: cleared, refilled with the live
//! enemies and undestroyed obstacles, then queried by collision and AI code.
//! Queries are a broad phase only; callers perform the exact distance check
//! on the returned candidates.

use std::collections::HashMap;

use starbreak_core::EnemyId;

/// What a collider stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColliderBody {
    /// A live enemy.
    Enemy(EnemyId),
    /// An obstacle, by index into the zone's obstacle list.
    Obstacle(usize),
}

/// Circle registered in the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    /// What the circle stands for.
    pub body: ColliderBody,
    /// Centre position.
    pub x: f32,
    /// Centre position.
    pub y: f32,
    /// Collision radius.
    pub radius: f32,
}

/// Uniform spatial hash over world space.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i64, i64), Vec<Collider>>,
}

impl SpatialGrid {
    /// Creates an empty grid; `cell_size` must be positive.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            cells: HashMap::new(),
        }
    }

    /// Removes every collider, keeping the allocated cells for reuse.
    pub fn clear(&mut self) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
    }

    fn cell_of(&self, x: f32, y: f32) -> (i64, i64) {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    /// Registers a collider in the cell containing its centre.
    pub fn insert(&mut self, collider: Collider) {
        let key = self.cell_of(collider.x, collider.y);
        self.cells.entry(key).or_default().push(collider);
    }

    /// Broad-phase query: every collider in the cells overlapped by the
    /// query circle's bounding box, padded by one cell so colliders whose
    /// own radius reaches into the box are not missed.
    pub fn query(&self, x: f32, y: f32, radius: f32) -> impl Iterator<Item = &Collider> {
        let (min_cx, min_cy) = self.cell_of(x - radius, y - radius);
        let (max_cx, max_cy) = self.cell_of(x + radius, y + radius);
        (min_cx - 1..=max_cx + 1).flat_map(move |cx| {
            (min_cy - 1..=max_cy + 1)
                .filter_map(move |cy| self.cells.get(&(cx, cy)))
                .flatten()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Collider, ColliderBody, SpatialGrid};
    use starbreak_core::EnemyId;

    fn enemy_at(id: u32, x: f32, y: f32, radius: f32) -> Collider {
        Collider {
            body: ColliderBody::Enemy(EnemyId::new(id)),
            x,
            y,
            radius,
        }
    }

    #[test]
    fn query_finds_everything_within_radius() {
        let mut grid = SpatialGrid::new(64.0);
        let mut expected = Vec::new();
        for i in 0..100_u32 {
            let angle = i as f32 * 0.37;
            let dist = i as f32 * 3.5;
            let collider = enemy_at(i, 300.0 + dist * angle.cos(), 300.0 + dist * angle.sin(), 8.0);
            if ((collider.x - 300.0).hypot(collider.y - 300.0)) <= 150.0 {
                expected.push(collider.body);
            }
            grid.insert(collider);
        }
        let found: Vec<_> = grid
            .query(300.0, 300.0, 150.0)
            .filter(|c| (c.x - 300.0).hypot(c.y - 300.0) <= 150.0)
            .map(|c| c.body)
            .collect();
        for body in &expected {
            assert!(found.contains(body), "missing {body:?}");
        }
        assert_eq!(found.len(), expected.len());
    }

    #[test]
    fn over_approximation_is_bounded() {
        let cell = 64.0;
        let mut grid = SpatialGrid::new(cell);
        for i in 0..400_u32 {
            let x = (i % 20) as f32 * 50.0;
            let y = (i / 20) as f32 * 50.0;
            grid.insert(enemy_at(i, x, y, 4.0));
        }
        let radius = 120.0;
        for candidate in grid.query(500.0, 500.0, radius) {
            let dx = (candidate.x - 500.0).abs();
            let dy = (candidate.y - 500.0).abs();
            assert!(dx.max(dy) <= radius + 2.0 * cell);
        }
    }

    #[test]
    fn clear_empties_without_dropping_cells() {
        let mut grid = SpatialGrid::new(32.0);
        grid.insert(enemy_at(1, 10.0, 10.0, 5.0));
        grid.insert(Collider {
            body: ColliderBody::Obstacle(0),
            x: 40.0,
            y: 40.0,
            radius: 20.0,
        });
        assert_eq!(grid.query(25.0, 25.0, 50.0).count(), 2);
        grid.clear();
        assert_eq!(grid.query(25.0, 25.0, 50.0).count(), 0);
    }

    #[test]
    fn negative_coordinates_hash_correctly() {
        let mut grid = SpatialGrid::new(64.0);
        grid.insert(enemy_at(7, -100.0, -100.0, 6.0));
        let found: Vec<_> = grid.query(-90.0, -90.0, 30.0).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].body, ColliderBody::Enemy(EnemyId::new(7)));
    }
}
