//! Deterministic row/plant renumbering.
//!
//! Points are grouped by `(block_id, row_id)`; inside a group the existing
//! `plant_id` order is kept (stable) and ids are reassigned `1..=n`. Groups
//! come out in ascending key order, so repeated runs agree byte for byte.

use std::collections::{BTreeMap, HashMap};

use crate::error::{LayoutError, Result};
use crate::points::{PlantPoint, PointCollection};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenumberCfg {
    /// Reject points without a `block_id` instead of grouping them together.
    pub require_block: bool,
}

/// Point attribute a cap's block label is compared against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CapKey {
    #[default]
    BlockId,
    BlockName,
}

/// Per-row "keep the first N" caps, keyed by `(block label, row_id)`.
///
/// Rows are still grouped by `(block_id, row_id)`; `key` only picks which
/// attribute of a group's points is looked up in `caps`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowCaps {
    pub caps: HashMap<(Option<String>, u32), usize>,
    pub key: CapKey,
    /// Drop rows that have no cap entry at all.
    pub drop_uncapped: bool,
}

impl RowCaps {
    pub fn insert(&mut self, block: Option<String>, row_id: u32, keep: usize) {
        self.caps.insert((block, row_id), keep);
    }

    fn lookup_key(
        &self,
        group: &(Option<String>, u32),
        members: &[PlantPoint],
    ) -> (Option<String>, u32) {
        match self.key {
            CapKey::BlockId => group.clone(),
            CapKey::BlockName => (
                members.first().and_then(|p| p.block_name.clone()),
                group.1,
            ),
        }
    }

    fn limit(&self, key: &(Option<String>, u32)) -> Option<usize> {
        match self.caps.get(key) {
            Some(n) => Some(*n),
            None if self.drop_uncapped => Some(0),
            None => None,
        }
    }
}

type Groups = BTreeMap<(Option<String>, u32), Vec<PlantPoint>>;

fn group(points: &PointCollection, cfg: &RenumberCfg) -> Result<Groups> {
    let mut groups = Groups::new();
    for (index, p) in points.iter().enumerate() {
        if p.row_id == 0 {
            return Err(LayoutError::MissingGroupKey {
                index,
                key: "row_id",
            });
        }
        if cfg.require_block && p.block_id.is_none() {
            return Err(LayoutError::MissingGroupKey {
                index,
                key: "block_id",
            });
        }
        groups
            .entry((p.block_id.clone(), p.row_id))
            .or_default()
            .push(p.clone());
    }
    for members in groups.values_mut() {
        members.sort_by_key(|p| p.plant_id);
    }
    Ok(groups)
}

fn reassign(groups: Groups, block_id: Option<String>) -> PointCollection {
    let mut out = Vec::with_capacity(groups.values().map(Vec::len).sum());
    for (_, members) in groups {
        out.extend(members.into_iter().zip(1u32..).map(|(mut p, id)| {
            p.plant_id = id;
            p
        }));
    }
    PointCollection {
        points: out,
        block_id,
    }
}

/// Renumber `plant_id` to `1..=n` within each `(block_id, row_id)` group.
pub fn renumber(points: &PointCollection, cfg: &RenumberCfg) -> Result<PointCollection> {
    let groups = group(points, cfg)?;
    tracing::debug!(groups = groups.len(), points = points.len(), "renumber");
    Ok(reassign(groups, points.block_id.clone()))
}

/// Like [`renumber`], truncating each group to its cap after sorting.
pub fn renumber_with_caps(
    points: &PointCollection,
    cfg: &RenumberCfg,
    caps: &RowCaps,
) -> Result<PointCollection> {
    let mut groups = group(points, cfg)?;
    groups.retain(|key, members| match caps.limit(&caps.lookup_key(key, members)) {
        Some(0) => false,
        Some(n) => {
            members.truncate(n);
            true
        }
        None => true,
    });
    Ok(reassign(groups, points.block_id.clone()))
}

/// Close row-id gaps: within each block, surviving row ids map to `1..=k`
/// in ascending order. Plant ids and point order are untouched.
pub fn compact_rows(points: &PointCollection) -> PointCollection {
    let mut rows: BTreeMap<Option<&str>, Vec<u32>> = BTreeMap::new();
    for p in points.iter() {
        rows.entry(p.block_id.as_deref()).or_default().push(p.row_id);
    }
    let remap: HashMap<(Option<&str>, u32), u32> = rows
        .into_iter()
        .flat_map(|(block, mut ids)| {
            ids.sort_unstable();
            ids.dedup();
            ids.into_iter()
                .zip(1u32..)
                .map(move |(old, new)| ((block, old), new))
        })
        .collect();
    let out = points
        .iter()
        .map(|p| {
            let mut q = p.clone();
            q.row_id = remap.get(&p.group_key()).copied().unwrap_or(p.row_id);
            q
        })
        .collect();
    PointCollection {
        points: out,
        block_id: points.block_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::BlockTag;
    use nalgebra::vector;
    use proptest::prelude::*;

    fn pt(row: u32, plant: u32) -> PlantPoint {
        PlantPoint::new(vector![f64::from(plant), f64::from(row)], row, plant)
    }

    fn ids(c: &PointCollection) -> Vec<(u32, u32)> {
        c.iter().map(|p| (p.row_id, p.plant_id)).collect()
    }

    #[test]
    fn closes_plant_gaps_in_order() {
        let input = PointCollection::new(vec![pt(1, 5), pt(1, 2), pt(2, 1)]);
        let out = renumber(&input, &RenumberCfg::default()).unwrap();
        assert_eq!(ids(&out), vec![(1, 1), (1, 2), (2, 1)]);
        // The old plant 2 comes first and keeps its position.
        assert_eq!(out.points[0].pos, vector![2.0, 1.0]);
        assert_eq!(out.points[1].pos, vector![5.0, 1.0]);
    }

    #[test]
    fn blocks_are_numbered_independently() {
        let a = BlockTag::new("A", "North");
        let b = BlockTag::new("B", "South");
        let input = PointCollection::new(vec![
            pt(1, 7).in_block(&b),
            pt(1, 3).in_block(&a),
            pt(1, 4).in_block(&b),
        ]);
        let out = renumber(&input, &RenumberCfg::default()).unwrap();
        let got: Vec<_> = out
            .iter()
            .map(|p| (p.block_id.as_deref(), p.plant_id, p.pos.x))
            .collect();
        assert_eq!(
            got,
            vec![(Some("A"), 1, 3.0), (Some("B"), 1, 4.0), (Some("B"), 2, 7.0)]
        );
    }

    #[test]
    fn untagged_row_is_rejected() {
        let input = PointCollection::new(vec![pt(1, 1), pt(0, 2)]);
        let err = renumber(&input, &RenumberCfg::default()).unwrap_err();
        assert_eq!(
            err,
            LayoutError::MissingGroupKey {
                index: 1,
                key: "row_id"
            }
        );
    }

    #[test]
    fn missing_block_only_fails_when_required() {
        let input = PointCollection::new(vec![pt(1, 1)]);
        assert!(renumber(&input, &RenumberCfg::default()).is_ok());
        let err = renumber(
            &input,
            &RenumberCfg {
                require_block: true,
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LayoutError::MissingGroupKey { key: "block_id", .. }
        ));
    }

    #[test]
    fn caps_truncate_after_sorting() {
        let input = PointCollection::new(vec![pt(1, 9), pt(1, 4), pt(1, 6), pt(2, 1), pt(2, 2)]);
        let mut caps = RowCaps::default();
        caps.insert(None, 1, 2);
        let out = renumber_with_caps(&input, &RenumberCfg::default(), &caps).unwrap();
        let xs: Vec<f64> = out.row(1).map(|p| p.pos.x).collect();
        assert_eq!(xs, vec![4.0, 6.0]);
        assert_eq!(out.row(2).count(), 2);

        caps.drop_uncapped = true;
        let out = renumber_with_caps(&input, &RenumberCfg::default(), &caps).unwrap();
        assert_eq!(out.row_ids(), vec![1]);
    }

    #[test]
    fn zero_cap_drops_row() {
        let input = PointCollection::new(vec![pt(1, 1), pt(2, 1)]);
        let mut caps = RowCaps::default();
        caps.insert(None, 2, 0);
        let out = renumber_with_caps(&input, &RenumberCfg::default(), &caps).unwrap();
        assert_eq!(ids(&out), vec![(1, 1)]);
    }

    #[test]
    fn caps_can_match_on_block_name() {
        let a = BlockTag::new("1", "21b");
        let b = BlockTag::new("2", "7");
        let input = PointCollection::new(vec![
            pt(1, 1).in_block(&a),
            pt(1, 2).in_block(&a),
            pt(1, 3).in_block(&a),
            pt(1, 1).in_block(&b),
        ]);
        let mut caps = RowCaps {
            key: CapKey::BlockName,
            drop_uncapped: true,
            ..RowCaps::default()
        };
        caps.insert(Some("21b".into()), 1, 2);
        let out = renumber_with_caps(&input, &RenumberCfg::default(), &caps).unwrap();
        let got: Vec<_> = out.iter().map(|p| (p.block_id.as_deref(), p.plant_id)).collect();
        assert_eq!(got, vec![(Some("1"), 1), (Some("1"), 2)]);

        caps.key = CapKey::BlockId;
        let out = renumber_with_caps(&input, &RenumberCfg::default(), &caps).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn compaction_is_per_block() {
        let a = BlockTag::new("A", "a");
        let b = BlockTag::new("B", "b");
        let input = PointCollection::new(vec![
            pt(3, 1).in_block(&a),
            pt(7, 1).in_block(&a),
            pt(7, 2).in_block(&a),
            pt(2, 1).in_block(&b),
        ]);
        let out = compact_rows(&input);
        let got: Vec<_> = out
            .iter()
            .map(|p| (p.block_id.as_deref(), p.row_id, p.plant_id))
            .collect();
        assert_eq!(
            got,
            vec![
                (Some("A"), 1, 1),
                (Some("A"), 2, 1),
                (Some("A"), 2, 2),
                (Some("B"), 1, 1)
            ]
        );
    }

    proptest! {
        #[test]
        fn renumber_is_idempotent(
            raw in prop::collection::vec((1u32..5, 1u32..40, 0u8..3), 0..60)
        ) {
            let input: PointCollection = raw
                .iter()
                .map(|&(row, plant, block)| {
                    let mut p = pt(row, plant);
                    if block > 0 {
                        p.block_id = Some(format!("B{block}"));
                    }
                    p
                })
                .collect();
            let once = renumber(&input, &RenumberCfg::default()).unwrap();
            let twice = renumber(&once, &RenumberCfg::default()).unwrap();
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(once.len(), input.len());
            for key in once.iter().map(|p| p.group_key()) {
                let mut got: Vec<u32> = once
                    .iter()
                    .filter(|p| p.group_key() == key)
                    .map(|p| p.plant_id)
                    .collect();
                got.sort_unstable();
                let want: Vec<u32> = (1..=got.len() as u32).collect();
                prop_assert_eq!(got, want);
            }
        }
    }
}
