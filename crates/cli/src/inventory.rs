//! Vine-count inventory: per-row plant caps read from CSV with polars.
//!
//! Expected columns: `block_id`, `row_number`, `current_plant_count`. The
//! `block_id` column holds whatever block label the caps match on, which is a
//! point's `block_name` unless `CapKey::BlockId` is chosen.

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use std::path::Path;
use vinerows::api::{CapKey, RowCaps};

pub fn read_caps(path: &Path, drop_uncapped: bool, key: CapKey) -> Result<RowCaps> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(100))
        .finish()
        .with_context(|| format!("opening inventory {}", path.display()))?
        .select([
            col("block_id").cast(DataType::String),
            col("row_number").cast(DataType::UInt32),
            col("current_plant_count").cast(DataType::UInt32),
        ])
        .collect()
        .with_context(|| format!("reading inventory {}", path.display()))?;
    tracing::info!(rows = df.height(), path = %path.display(), "inventory");

    let blocks = df.column("block_id")?.str()?;
    let rows = df.column("row_number")?.u32()?;
    let counts = df.column("current_plant_count")?.u32()?;

    let mut caps = RowCaps {
        key,
        drop_uncapped,
        ..RowCaps::default()
    };
    for (i, ((block, row), count)) in blocks
        .into_iter()
        .zip(rows.into_iter())
        .zip(counts.into_iter())
        .enumerate()
    {
        let (Some(row), Some(count)) = (row, count) else {
            bail!("inventory line {}: missing row_number or current_plant_count", i + 1);
        };
        caps.insert(block.map(str::to_string), row, count as usize);
    }
    Ok(caps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_caps_keyed_by_block_and_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory.csv");
        fs::write(
            &path,
            "block_id,row_number,current_plant_count\n21b,1,40\n21b,2,38\n7,1,12\n",
        )
        .unwrap();
        let caps = read_caps(&path, true, CapKey::BlockName).unwrap();
        assert!(caps.drop_uncapped);
        assert_eq!(caps.key, CapKey::BlockName);
        assert_eq!(caps.caps.len(), 3);
        assert_eq!(caps.caps.get(&(Some("21b".to_string()), 2)), Some(&38));
        assert_eq!(caps.caps.get(&(Some("7".to_string()), 1)), Some(&12));
    }

    #[test]
    fn missing_column_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "block_id,row_number\nA,1\n").unwrap();
        assert!(read_caps(&path, false, CapKey::BlockId).is_err());
    }
}
