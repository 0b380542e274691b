use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;
use vinerows::api::{
    points_along_polyline, renumber, renumber_with_caps, run_block, BlockTag, CapKey,
    CoordSystem, LengthUnit, PipelineCfg, PointCollection, RectangleMode, RenumberCfg, RowFill,
};

mod features;
mod inventory;
mod provenance;

use geojson::{Feature, JsonObject, Position, Value as GeoValue};
use provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "vinerows")]
#[command(about = "Vineyard plant-point generation from block boundaries")]
struct Cmd {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Generate plant points for every boundary polygon
    Generate(GenerateArgs),
    /// Renumber plant ids 1..n within each (block_id, row_id)
    Renumber {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Fail on points without a block_id
        #[arg(long)]
        require_block: bool,
    },
    /// Keep the first N plants per row from a vine-count inventory CSV
    Cap {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        inventory: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Drop rows missing from the inventory
        #[arg(long)]
        drop_uncapped: bool,
        /// Point property the inventory's `block_id` column is matched against
        #[arg(long, value_enum, default_value_t = MatchOn::BlockName)]
        match_on: MatchOn,
    },
    /// Plant points along hand-drawn row lines
    LinePoints {
        #[arg(long)]
        lines: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        spacing: f64,
        #[command(flatten)]
        frame: FrameArgs,
    },
    /// Print a small provenance JSON block
    Report,
}

#[derive(Args, Clone, Copy)]
struct FrameArgs {
    /// Coordinate system of the input
    #[arg(long, value_enum, default_value_t = Coords::Geographic)]
    coords: Coords,
    /// Unit of spacing values (arguments and feature properties)
    #[arg(long, value_enum, default_value_t = Unit::Meters)]
    unit: Unit,
    /// Unit of planar input coordinates
    #[arg(long, value_enum, default_value_t = Unit::Meters)]
    planar_unit: Unit,
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long)]
    boundary: PathBuf,
    #[arg(long)]
    out: PathBuf,
    /// Also write the covering rectangles as polygons
    #[arg(long)]
    rect_out: Option<PathBuf>,
    /// Default row spacing (`row_spacing`/`row_space` properties override)
    #[arg(long)]
    row_spacing: Option<f64>,
    /// Default plant spacing (`vine_space` property overrides)
    #[arg(long, conflicts_with = "points_per_row")]
    vine_spacing: Option<f64>,
    /// Fixed number of points per row instead of a plant spacing
    #[arg(long)]
    points_per_row: Option<u32>,
    /// Default row bearing in degrees (`row_orient` property overrides);
    /// without one the minimum-area rectangle decides
    #[arg(long)]
    row_orient: Option<f64>,
    /// Renumber row ids 1..k after filtering
    #[arg(long)]
    compact_rows: bool,
    /// Renumber plant ids 1..n after filtering
    #[arg(long)]
    renumber: bool,
    /// Log and skip blocks that fail instead of aborting
    #[arg(long)]
    skip_failed: bool,
    #[command(flatten)]
    frame: FrameArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Coords {
    Geographic,
    Planar,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MatchOn {
    BlockName,
    BlockId,
}

impl From<MatchOn> for CapKey {
    fn from(m: MatchOn) -> Self {
        match m {
            MatchOn::BlockName => CapKey::BlockName,
            MatchOn::BlockId => CapKey::BlockId,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Unit {
    Meters,
    Feet,
}

impl From<Coords> for CoordSystem {
    fn from(c: Coords) -> Self {
        match c {
            Coords::Geographic => CoordSystem::Geographic,
            Coords::Planar => CoordSystem::Planar,
        }
    }
}

impl From<Unit> for LengthUnit {
    fn from(u: Unit) -> Self {
        match u {
            Unit::Meters => LengthUnit::Meters,
            Unit::Feet => LengthUnit::Feet,
        }
    }
}

impl FrameArgs {
    fn base_cfg(&self) -> PipelineCfg {
        let base = match self.coords {
            Coords::Geographic => PipelineCfg::geographic(),
            Coords::Planar => PipelineCfg::default(),
        };
        PipelineCfg {
            unit: self.unit.into(),
            planar_unit: self.planar_unit.into(),
            ..base
        }
    }

    fn to_json(self) -> serde_json::Value {
        json!({
            "coords": format!("{:?}", self.coords),
            "unit": format!("{:?}", self.unit),
            "planar_unit": format!("{:?}", self.planar_unit),
        })
    }
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = match cmd.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    match cmd.action {
        Action::Generate(args) => generate(&args),
        Action::Renumber {
            input,
            out,
            require_block,
        } => renumber_file(&input, &out, require_block),
        Action::Cap {
            input,
            inventory,
            out,
            drop_uncapped,
            match_on,
        } => cap(&input, &inventory, &out, drop_uncapped, match_on),
        Action::LinePoints {
            lines,
            out,
            spacing,
            frame,
        } => line_points(&lines, &out, spacing, frame),
        Action::Report => report(),
    }
}

/// Per-feature pipeline configuration; properties win over arguments.
fn block_cfg(args: &GenerateArgs, feature: &Feature) -> Result<PipelineCfg> {
    let row_spacing = match features::prop_f64(feature, &["row_spacing", "row_space"])? {
        Some(v) => v,
        None => args
            .row_spacing
            .context("no row spacing: set --row-spacing or a `row_spacing` property")?,
    };
    let vine_space = features::prop_f64(feature, &["vine_space"])?;
    let fill = match (vine_space, args.vine_spacing, args.points_per_row) {
        (Some(v), _, _) | (None, Some(v), _) => RowFill::Spacing(v),
        (None, None, Some(n)) => RowFill::Count(n),
        (None, None, None) => {
            bail!("no plant spacing: set --vine-spacing, --points-per-row or `vine_space`")
        }
    };
    let orientation = match features::prop_f64(feature, &["row_orient"])?.or(args.row_orient) {
        Some(b) => RectangleMode::FixedBearing(b),
        None => RectangleMode::MinimumArea,
    };
    Ok(PipelineCfg {
        row_spacing,
        fill,
        orientation,
        compact_rows: args.compact_rows,
        renumber: args.renumber.then(RenumberCfg::default),
        ..args.frame.base_cfg()
    })
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let boundaries = features::read(&args.boundary)?;
    tracing::info!(blocks = boundaries.features.len(), "generate");

    let mut parts = Vec::new();
    let mut rects = Vec::new();
    let mut failed = 0usize;
    for (i, feature) in boundaries.features.iter().enumerate() {
        let block = BlockTag {
            id: Some(
                features::prop_label(feature, "block_id")
                    .unwrap_or_else(|| (i + 1).to_string()),
            ),
            name: features::prop_label(feature, "block_name"),
        };
        let result = (|| -> Result<_> {
            let cfg = block_cfg(args, feature)?;
            let geometry = feature.geometry.as_ref().context("feature has no geometry")?;
            let ring = features::boundary_ring(geometry)?;
            Ok(run_block(&ring, &block, &cfg)?)
        })();
        match result {
            Ok(layout) => {
                tracing::info!(
                    block = ?block.id,
                    name = ?block.name,
                    points = layout.points.len(),
                    rows = layout.points.row_ids().len(),
                    "block done"
                );
                rects.push(rect_feature(&layout.rect.ring_coords(), &block));
                parts.push(layout.points);
            }
            Err(err) if args.skip_failed => {
                failed += 1;
                tracing::warn!(block = ?block.id, error = %format!("{err:#}"), "skipping block");
            }
            Err(err) => {
                return Err(err.context(format!("block {} (feature {i})", block.id.unwrap_or_default())))
            }
        }
    }

    let points = PointCollection::merge(parts);
    features::write(&features::points_to_collection(&points), &args.out)?;
    tracing::info!(points = points.len(), failed, out = %args.out.display(), "written");

    let params = json!({
        "row_spacing": args.row_spacing,
        "vine_spacing": args.vine_spacing,
        "points_per_row": args.points_per_row,
        "row_orient": args.row_orient,
        "compact_rows": args.compact_rows,
        "renumber": args.renumber,
        "skip_failed": args.skip_failed,
        "failed_blocks": failed,
        "frame": args.frame.to_json(),
    });
    write_sidecar(
        &args.out,
        Payload::new("generate", params.clone()).input(&args.boundary),
    )?;
    if let Some(rect_out) = &args.rect_out {
        features::write(&features::collection(rects), rect_out)?;
        write_sidecar(rect_out, Payload::new("generate", params).input(&args.boundary))?;
    }
    Ok(())
}

fn rect_feature(ring: &[vinerows::Vec2<f64>], block: &BlockTag) -> Feature {
    let coords: Vec<Position> = ring.iter().map(|c| vec![c.x, c.y]).collect();
    let mut props = JsonObject::new();
    props.insert("name".into(), json!("oriented_bounding_box"));
    props.insert("block_id".into(), json!(block.id));
    props.insert("block_name".into(), json!(block.name));
    features::feature(GeoValue::Polygon(vec![coords]), props)
}

fn renumber_file(input: &Path, out: &Path, require_block: bool) -> Result<()> {
    let points = features::collection_to_points(&features::read(input)?)
        .with_context(|| format!("reading points from {}", input.display()))?;
    let cfg = RenumberCfg { require_block };
    let renumbered = renumber(&points, &cfg)?;
    tracing::info!(points = renumbered.len(), "renumber");
    features::write(&features::points_to_collection(&renumbered), out)?;
    write_sidecar(
        out,
        Payload::new("renumber", json!({ "require_block": require_block })).input(input),
    )?;
    Ok(())
}

fn cap(
    input: &Path,
    inventory_csv: &Path,
    out: &Path,
    drop_uncapped: bool,
    match_on: MatchOn,
) -> Result<()> {
    let points = features::collection_to_points(&features::read(input)?)
        .with_context(|| format!("reading points from {}", input.display()))?;
    let caps = inventory::read_caps(inventory_csv, drop_uncapped, match_on.into())?;
    let kept = renumber_with_caps(&points, &RenumberCfg::default(), &caps)?;
    tracing::info!(before = points.len(), after = kept.len(), "cap");
    features::write(&features::points_to_collection(&kept), out)?;
    write_sidecar(
        out,
        Payload::new(
            "cap",
            json!({ "drop_uncapped": drop_uncapped, "match_on": format!("{match_on:?}") }),
        )
            .input(input)
            .input(inventory_csv),
    )?;
    Ok(())
}

fn line_points(lines: &Path, out: &Path, spacing: f64, frame: FrameArgs) -> Result<()> {
    let fc = features::read(lines)?;
    let cfg = frame.base_cfg();
    let step = match cfg.coords {
        CoordSystem::Planar => cfg.unit.convert(spacing, cfg.planar_unit),
        CoordSystem::Geographic => cfg.unit.to_meters(spacing),
    };
    let mut points = Vec::new();
    for (i, feature) in fc.features.iter().enumerate() {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        let line = match features::line_vertices(geometry) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(feature = i, error = %err, "skipping non-line feature");
                continue;
            }
        };
        let row_id = match features::prop_f64(feature, &["row_id"])? {
            Some(v) if v >= 1.0 && v.fract() == 0.0 => v as u32,
            Some(v) => bail!("feature {i}: `row_id` must be a positive integer, got {v}"),
            None => u32::try_from(i + 1)?,
        };
        let block = BlockTag {
            id: features::prop_label(feature, "block_id"),
            name: features::prop_label(feature, "block_name"),
        };
        let row = points_along_polyline(&line, step, row_id, &cfg.coords)
            .with_context(|| format!("feature {i}"))?;
        points.extend(row.into_iter().map(|p| p.in_block(&block)));
    }
    let points = PointCollection::new(points);
    tracing::info!(points = points.len(), "line-points");
    features::write(&features::points_to_collection(&points), out)?;
    write_sidecar(
        out,
        Payload::new("line-points", json!({ "spacing": spacing, "frame": frame.to_json() }))
            .input(lines),
    )?;
    Ok(())
}

fn report() -> Result<()> {
    let mut obj = provenance::header();
    obj["params"] = json!({});
    obj["outputs"] = json!([]);
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
