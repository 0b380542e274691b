//! GeoJSON feature helpers on top of the `geojson` crate.
//!
//! Boundaries are Polygon/MultiPolygon, row lines LineString/MultiLineString,
//! plant points Point. Positions may carry a third (z) value; it is ignored.

use anyhow::{anyhow, bail, Context, Result};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Position, Value as GeoValue};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;
use vinerows::api::{ring_area, PlantPoint, PointCollection, Ring};
use vinerows::Vec2;

pub fn read(path: &Path) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    text.parse::<FeatureCollection>()
        .with_context(|| format!("parsing {}", path.display()))
}

pub fn write(fc: &FeatureCollection, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(fc)?)
        .with_context(|| format!("writing {}", path.display()))
}

pub fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

pub fn feature(value: GeoValue, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn prop<'a>(f: &'a Feature, key: &str) -> Option<&'a JsonValue> {
    f.property(key).filter(|v| !v.is_null())
}

/// First present key, as a number; numeric strings are accepted.
pub fn prop_f64(f: &Feature, keys: &[&str]) -> Result<Option<f64>> {
    for key in keys {
        let Some(v) = prop(f, key) else {
            continue;
        };
        let n = match v {
            JsonValue::Number(n) => n.as_f64().ok_or_else(|| anyhow!("{n} is not a float")),
            JsonValue::String(s) => s
                .trim()
                .parse()
                .with_context(|| format!("`{s}` is not a number")),
            other => Err(anyhow!("expected a number, got {other}")),
        };
        return n.map(Some).with_context(|| format!("property `{key}`"));
    }
    Ok(None)
}

/// Property as an opaque label: strings as-is, numbers printed.
pub fn prop_label(f: &Feature, key: &str) -> Option<String> {
    prop(f, key).map(|v| match v {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn xy(p: &[f64]) -> Result<Vec2<f64>> {
    match p {
        [x, y, ..] => Ok(Vec2::new(*x, *y)),
        _ => bail!("position needs 2 coordinates, got {}", p.len()),
    }
}

fn positions(ps: &[Position]) -> Result<Vec<Vec2<f64>>> {
    ps.iter().map(|p| xy(p)).collect()
}

fn outer_ring(rings: &[Vec<Position>]) -> Result<Ring> {
    let shell = rings.first().ok_or_else(|| anyhow!("polygon without rings"))?;
    Ok(Ring::new(positions(shell)?)?)
}

/// Outer ring of a Polygon. MultiPolygons yield their largest part.
pub fn boundary_ring(geometry: &Geometry) -> Result<Ring> {
    match &geometry.value {
        GeoValue::Polygon(rings) => outer_ring(rings),
        GeoValue::MultiPolygon(parts) => {
            let mut best: Option<(f64, Ring)> = None;
            for part in parts {
                let ring = outer_ring(part)?;
                let area = ring_area(&ring);
                if best.as_ref().map_or(true, |(a, _)| area > *a) {
                    best = Some((area, ring));
                }
            }
            if parts.len() > 1 {
                tracing::warn!(parts = parts.len(), "multipolygon: using largest part");
            }
            best.map(|(_, r)| r).ok_or_else(|| anyhow!("empty multipolygon"))
        }
        _ => bail!("expected a Polygon or MultiPolygon boundary"),
    }
}

/// Vertices of a row line; MultiLineString parts are concatenated.
pub fn line_vertices(geometry: &Geometry) -> Result<Vec<Vec2<f64>>> {
    match &geometry.value {
        GeoValue::LineString(line) => positions(line),
        GeoValue::MultiLineString(parts) => {
            let mut out = Vec::new();
            for part in parts {
                out.extend(positions(part)?);
            }
            Ok(out)
        }
        _ => bail!("expected a LineString or MultiLineString"),
    }
}

pub fn point_feature(p: &PlantPoint) -> Feature {
    let mut props = JsonObject::new();
    if let Some(name) = &p.block_name {
        props.insert("block_name".into(), JsonValue::from(name.as_str()));
    }
    if let Some(id) = &p.block_id {
        props.insert("block_id".into(), JsonValue::from(id.as_str()));
    }
    props.insert("row_id".into(), JsonValue::from(p.row_id));
    props.insert("plant_id".into(), JsonValue::from(p.plant_id));
    feature(GeoValue::Point(vec![p.pos.x, p.pos.y]), props)
}

pub fn points_to_collection(points: &PointCollection) -> FeatureCollection {
    collection(points.iter().map(point_feature).collect())
}

fn id_prop(f: &Feature, key: &str) -> Result<u32> {
    match prop_f64(f, &[key])? {
        Some(v) if v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) => Ok(v as u32),
        Some(v) => bail!("`{key}` must be a non-negative integer, got {v}"),
        None => Ok(0),
    }
}

/// Read plant points back. A missing `row_id` becomes 0 (untagged).
pub fn collection_to_points(fc: &FeatureCollection) -> Result<PointCollection> {
    let mut out = Vec::with_capacity(fc.features.len());
    for (i, f) in fc.features.iter().enumerate() {
        let p = (|| -> Result<PlantPoint> {
            let pos = match f.geometry.as_ref().map(|g| &g.value) {
                Some(GeoValue::Point(c)) => xy(c)?,
                Some(_) => bail!("expected a Point geometry"),
                None => bail!("feature has no geometry"),
            };
            let mut p = PlantPoint::new(pos, id_prop(f, "row_id")?, id_prop(f, "plant_id")?);
            p.block_id = prop_label(f, "block_id");
            p.block_name = prop_label(f, "block_name");
            Ok(p)
        })()
        .with_context(|| format!("feature {i}"))?;
        out.push(p);
    }
    Ok(PointCollection::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: JsonValue) -> FeatureCollection {
        v.to_string().parse().unwrap()
    }

    #[test]
    fn parses_polygon_with_z_and_null_properties() {
        let fc = parse(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": null,
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0, 5], [4, 0, 5], [4, 3, 5], [0, 0, 5]]]
                }
            }]
        }));
        let ring = boundary_ring(fc.features[0].geometry.as_ref().unwrap()).unwrap();
        assert_eq!(ring.vertices().len(), 3);
        assert_eq!(prop_label(&fc.features[0], "block_name"), None);
    }

    #[test]
    fn numeric_strings_and_aliases() {
        let fc = parse(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": null,
                "properties": {"row_space": "7.5", "block_id": 3, "vine_space": true}
            }]
        }));
        let f = &fc.features[0];
        assert_eq!(prop_f64(f, &["row_spacing", "row_space"]).unwrap(), Some(7.5));
        assert_eq!(prop_label(f, "block_id").as_deref(), Some("3"));
        assert!(prop_f64(f, &["vine_space"]).is_err());
    }

    #[test]
    fn multipolygon_uses_largest_part() {
        let small = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 1.0]];
        let big = vec![vec![5.0, 5.0], vec![9.0, 5.0], vec![9.0, 9.0], vec![5.0, 9.0]];
        let g = Geometry::new(GeoValue::MultiPolygon(vec![vec![small], vec![big]]));
        let ring = boundary_ring(&g).unwrap();
        assert_eq!(ring.vertices()[0], Vec2::new(5.0, 5.0));
    }

    #[test]
    fn multilinestring_parts_are_joined() {
        let g = Geometry::new(GeoValue::MultiLineString(vec![
            vec![vec![0.0, 0.0], vec![1.0, 0.0]],
            vec![vec![1.0, 1.0], vec![2.0, 1.0]],
        ]));
        assert_eq!(line_vertices(&g).unwrap().len(), 4);
        assert!(line_vertices(&Geometry::new(GeoValue::Point(vec![0.0, 0.0]))).is_err());
    }

    #[test]
    fn points_survive_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/points.geojson");
        let mut p = PlantPoint::new(Vec2::new(-122.3, 38.4), 4, 11);
        p.block_id = Some("2".into());
        p.block_name = Some("Mayacamas_21b".into());
        write(&points_to_collection(&PointCollection::new(vec![p.clone()])), &path).unwrap();
        assert_eq!(collection_to_points(&read(&path).unwrap()).unwrap().points, vec![p]);
    }

    #[test]
    fn missing_row_id_reads_as_untagged() {
        let fc = collection(vec![feature(GeoValue::Point(vec![1.0, 2.0]), JsonObject::new())]);
        let pts = collection_to_points(&fc).unwrap();
        assert_eq!(pts.points[0].row_id, 0);
    }

    #[test]
    fn fractional_ids_are_rejected() {
        let mut props = JsonObject::new();
        props.insert("row_id".into(), json!(1.5));
        let fc = collection(vec![feature(GeoValue::Point(vec![1.0, 2.0]), props)]);
        assert!(collection_to_points(&fc).is_err());
    }
}
