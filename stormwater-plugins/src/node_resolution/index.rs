/*
This code is part of the Stormwater Tools library.
Created: 18/10/2026
Last Modified: 18/10/2026
License: MIT
*/

use super::pits::PitTable;
use rstar::primitives::GeomWithData;
use rstar::RTree;
use stormwater_common::structures::Point2D;

/// Nearest-pit lookup. Implementors return the position of the closest pit in
/// the `PitTable` they were built from, along with its planar distance.
pub trait NearestNeighborIndex {
    fn nearest(&self, point: &Point2D) -> Option<(usize, f64)>;
}

type PitLocation = GeomWithData<[f64; 2], usize>;

/// An R-tree over pit locations.
pub struct PitIndex {
    tree: RTree<PitLocation>,
}

impl PitIndex {
    pub fn new(table: &PitTable) -> PitIndex {
        let locations = table
            .iter()
            .enumerate()
            .map(|(i, pit)| PitLocation::new(pit.point.to_array(), i))
            .collect();
        PitIndex {
            tree: RTree::bulk_load(locations),
        }
    }

    pub fn size(&self) -> usize {
        self.tree.size()
    }
}

impl NearestNeighborIndex for PitIndex {
    /// Equidistant pits resolve to the one that comes first in the table,
    /// which is the lowest feature ID.
    fn nearest(&self, point: &Point2D) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for loc in self.tree.nearest_neighbor_iter(&point.to_array()) {
            let [x, y] = *loc.geom();
            let dist_sq = Point2D::new(x, y).distance_squared(point);
            match best {
                None => best = Some((loc.data, dist_sq)),
                Some((i, d)) => {
                    if dist_sq > d {
                        break;
                    }
                    if loc.data < i {
                        best = Some((loc.data, d));
                    }
                }
            }
        }
        best.map(|(i, d)| (i, d.sqrt()))
    }
}
