//! Plant points and point collections.

use nalgebra::Vector2;

/// One generated plant position with its row/plant identity.
///
/// `row_id` and `plant_id` are 1-based. A `row_id` of 0 marks a point the
/// upstream step never tagged; renumbering rejects it.
#[derive(Clone, Debug, PartialEq)]
pub struct PlantPoint {
    pub pos: Vector2<f64>,
    pub row_id: u32,
    pub plant_id: u32,
    pub block_id: Option<String>,
    pub block_name: Option<String>,
}

impl PlantPoint {
    pub fn new(pos: Vector2<f64>, row_id: u32, plant_id: u32) -> Self {
        Self {
            pos,
            row_id,
            plant_id,
            block_id: None,
            block_name: None,
        }
    }

    /// Builder-style block tag.
    pub fn in_block(mut self, block: &BlockTag) -> Self {
        self.block_id = block.id.clone();
        self.block_name = block.name.clone();
        self
    }

    /// Grouping key used by renumbering.
    #[inline]
    pub fn group_key(&self) -> (Option<&str>, u32) {
        (self.block_id.as_deref(), self.row_id)
    }
}

/// Opaque external block identity, carried through every stage unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockTag {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl BlockTag {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
        }
    }
}

/// A set of plant points; iteration order carries no meaning downstream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCollection {
    pub points: Vec<PlantPoint>,
    /// Provenance tag for single-block collections.
    pub block_id: Option<String>,
}

impl PointCollection {
    pub fn new(points: Vec<PlantPoint>) -> Self {
        Self {
            points,
            block_id: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlantPoint> {
        self.points.iter()
    }

    /// Distinct row ids, ascending.
    pub fn row_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.points.iter().map(|p| p.row_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Points of one row, in collection order.
    pub fn row(&self, row_id: u32) -> impl Iterator<Item = &PlantPoint> + '_ {
        self.points.iter().filter(move |p| p.row_id == row_id)
    }

    /// Concatenate collections; provenance is kept only if all agree.
    pub fn merge(parts: impl IntoIterator<Item = PointCollection>) -> Self {
        let mut out = PointCollection::default();
        let mut tags: Option<Option<String>> = None;
        for part in parts {
            tags = match tags {
                None => Some(part.block_id.clone()),
                Some(t) if t == part.block_id => Some(t),
                Some(_) => Some(None),
            };
            out.points.extend(part.points);
        }
        out.block_id = tags.flatten();
        out
    }
}

impl IntoIterator for PointCollection {
    type Item = PlantPoint;
    type IntoIter = std::vec::IntoIter<PlantPoint>;
    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl FromIterator<PlantPoint> for PointCollection {
    fn from_iter<I: IntoIterator<Item = PlantPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn row_ids_are_sorted_and_distinct() {
        let c: PointCollection = [3, 1, 3, 2, 1]
            .into_iter()
            .map(|r| PlantPoint::new(vector![0.0, 0.0], r, 1))
            .collect();
        assert_eq!(c.row_ids(), vec![1, 2, 3]);
        assert_eq!(c.row(3).count(), 2);
    }

    #[test]
    fn merge_keeps_agreeing_provenance_only() {
        let tagged = |id: &str| PointCollection {
            points: vec![PlantPoint::new(vector![1.0, 2.0], 1, 1)],
            block_id: Some(id.to_string()),
        };
        let same = PointCollection::merge([tagged("F3"), tagged("F3")]);
        assert_eq!(same.len(), 2);
        assert_eq!(same.block_id.as_deref(), Some("F3"));
        let mixed = PointCollection::merge([tagged("F3"), tagged("F10")]);
        assert_eq!(mixed.block_id, None);
    }

    #[test]
    fn block_tag_is_carried_onto_points() {
        let tag = BlockTag::new("2", "Mayacamas_22d");
        let p = PlantPoint::new(vector![0.0, 0.0], 4, 9).in_block(&tag);
        assert_eq!(p.group_key(), (Some("2"), 4));
        assert_eq!(p.block_name.as_deref(), Some("Mayacamas_22d"));
    }
}
