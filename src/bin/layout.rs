use std::path::PathBuf;

use clap::Parser;
use fishbone::diagram::{LayoutOptions, Snapshot, layout_fishbone};
use fishbone::fonts::{CosmicTextMeasure, FixedWidthMeasure, TextMeasure};
use fishbone::{Error, logging};

/// Print the computed fishbone layout as JSON
#[derive(Parser, Debug)]
#[command(name = "fishbone-layout")]
#[command(version)]
#[command(about = "Dump fishbone layout geometry as JSON", long_about = None)]
struct Args {
    /// Snapshot JSON file (use "-" for stdin)
    #[arg(value_name = "INPUT", required_unless_present = "demo")]
    input: Option<PathBuf>,

    /// Lay out the built-in example instead of reading INPUT
    #[arg(long, conflicts_with = "input")]
    demo: bool,

    /// Base font size in pixels, overriding the snapshot (12-60)
    #[arg(long, value_name = "PX")]
    font_size: Option<f32>,

    /// Omit the report header and footer bands
    #[arg(long)]
    no_report_band: bool,

    /// Include every drawing primitive, not just the category/cause/factor tree
    #[arg(long)]
    primitives: bool,

    /// Measure text with fixed per-character widths instead of system fonts
    #[arg(long)]
    fixed_metrics: bool,

    /// Log layout details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut snapshot = match &args.input {
        Some(path) if !args.demo => Snapshot::load(path)?,
        _ => Snapshot::demo(),
    };
    if let Some(size) = args.font_size {
        snapshot.base_font_size = size;
    }

    let options = LayoutOptions {
        report_band: !args.no_report_band,
        meta: snapshot.report_meta(None),
        ..LayoutOptions::default()
    };
    let measure: Box<dyn TextMeasure> = if args.fixed_metrics {
        Box::new(FixedWidthMeasure::default())
    } else {
        Box::new(CosmicTextMeasure::new())
    };

    let mut layout = layout_fishbone(
        &snapshot.rows,
        &snapshot.problem,
        snapshot.clamped_font_size(),
        &options,
        measure.as_ref(),
    );
    if !args.primitives {
        layout.canvas.primitives.clear();
    }

    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}
