//! Boundary filter: keep candidates inside the true block outline.
//!
//! Containment is boundary-inclusive (see `geom2::BoundaryTest`). Ids and
//! metadata pass through untouched, so rows may end up with gaps.

use crate::geom2::{BoundaryTest, Ring};
use crate::points::PointCollection;

/// New collection holding the candidates contained in `boundary`.
pub fn filter_to_boundary(
    boundary: &Ring,
    candidates: &PointCollection,
    eps: f64,
) -> PointCollection {
    let test = BoundaryTest::new(boundary, eps);
    PointCollection {
        points: candidates
            .iter()
            .filter(|p| test.contains(p.pos))
            .cloned()
            .collect(),
        block_id: candidates.block_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Planar;
    use crate::geom2::rand::{draw_block_radial, BlockCfg, ReplayToken};
    use crate::geom2::GeomCfg;
    use crate::grid::{generate_grid, GridParams, RowFill};
    use crate::mabr::minimum_area_rectangle;
    use nalgebra::vector;

    #[test]
    fn grid_filtered_by_its_own_rectangle_is_unchanged() {
        for index in 0..8 {
            let ring = draw_block_radial(BlockCfg::default(), ReplayToken { seed: 5, index })
                .unwrap();
            let cfg = GeomCfg::default();
            let rect = minimum_area_rectangle(&ring, &cfg).unwrap();
            let grid =
                generate_grid(&rect, &GridParams::new(7.0, RowFill::Count(9)), &Planar).unwrap();
            assert!(!grid.is_empty());
            let kept = filter_to_boundary(&rect.to_ring().unwrap(), &grid, cfg.eps_contain);
            assert_eq!(kept, grid);
        }
    }

    #[test]
    fn concave_boundary_drops_notch_and_keeps_ids() {
        let l = Ring::from_xy(&[
            [0.0, 0.0],
            [10.0, 0.0],
            [10.0, 4.0],
            [4.0, 4.0],
            [4.0, 10.0],
            [0.0, 10.0],
        ])
        .unwrap();
        let sq = [
            vector![0.0, 0.0],
            vector![0.0, 10.0],
            vector![10.0, 10.0],
            vector![10.0, 0.0],
        ];
        let grid =
            crate::grid::generate_quad_grid(&sq, &GridParams::new(2.0, RowFill::Count(6)), &Planar)
                .unwrap();
        let kept = filter_to_boundary(&l, &grid, 1e-9);
        assert!(kept.len() < grid.len());
        assert!(kept.iter().all(|p| !(p.pos.x > 4.0 + 1e-9 && p.pos.y > 4.0 + 1e-9)));
        // Row 5 (y = 8) keeps x = 0, 2, 4: plant ids 1..3, no renumbering here.
        let row5: Vec<u32> = kept.row(5).map(|p| p.plant_id).collect();
        assert_eq!(row5, vec![1, 2, 3]);
        // Input untouched.
        assert_eq!(grid.len(), 30);
    }

    #[test]
    fn emptied_rows_leave_gaps() {
        // Bands y in [0, 1] and [3, 4] joined by a sliver at x in [7, 8]; the
        // grid columns sit at x = 0, 5, 10, so the row at y = 2 loses every point.
        let bands = Ring::from_xy(&[
            [0.0, 0.0],
            [10.0, 0.0],
            [10.0, 1.0],
            [8.0, 1.0],
            [8.0, 3.0],
            [10.0, 3.0],
            [10.0, 4.0],
            [0.0, 4.0],
            [0.0, 3.0],
            [7.0, 3.0],
            [7.0, 1.0],
            [0.0, 1.0],
        ])
        .unwrap();
        let sq = [
            vector![0.0, 0.0],
            vector![0.0, 10.0],
            vector![10.0, 10.0],
            vector![10.0, 0.0],
        ];
        let grid =
            crate::grid::generate_quad_grid(&sq, &GridParams::new(1.0, RowFill::Count(3)), &Planar)
                .unwrap();
        let kept = filter_to_boundary(&bands, &grid, 1e-9);
        assert_eq!(kept.row_ids(), vec![1, 2, 4, 5]);
        assert!(kept.row(4).all(|p| (p.pos.y - 3.0).abs() < 1e-9));

        let compacted = crate::renumber::compact_rows(&kept);
        assert_eq!(compacted.row_ids(), vec![1, 2, 3, 4]);
        assert!(compacted.row(3).all(|p| (p.pos.y - 3.0).abs() < 1e-9));
    }
}
