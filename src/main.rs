use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use fishbone::diagram::{LayoutOptions, Snapshot, layout_fishbone, render_svg};
use fishbone::fonts::{CosmicTextMeasure, FixedWidthMeasure, TextMeasure};
use fishbone::theme::Theme;
use fishbone::{Error, export, logging};

/// Render a root cause analysis snapshot as a fishbone (Ishikawa) diagram
#[derive(Parser, Debug)]
#[command(name = "fishbone")]
#[command(version)]
#[command(about = "Render RCA fishbone diagrams to SVG, PNG or PDF", long_about = None)]
struct Args {
    /// Snapshot JSON file (use "-" for stdin)
    #[arg(value_name = "INPUT", required_unless_present_any = ["demo", "completions"])]
    input: Option<PathBuf>,

    /// Output file path (extension determines format: .svg, .png or .pdf)
    #[arg(short, long, value_name = "OUTPUT", required_unless_present = "completions")]
    output: Option<PathBuf>,

    /// Built-in theme name or path to a TOML/YAML theme file
    #[arg(short, long, value_name = "THEME", default_value = "classic")]
    theme: String,

    /// Base font size in pixels, overriding the snapshot (12-60)
    #[arg(long, value_name = "PX")]
    font_size: Option<f32>,

    /// Omit the report header and footer bands
    #[arg(long)]
    no_report_band: bool,

    /// Render the built-in example instead of reading INPUT
    #[arg(long, conflicts_with = "input")]
    demo: bool,

    /// Date shown in the footer (defaults to today)
    #[arg(long, value_name = "DATE")]
    date: Option<String>,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// Measure text with fixed per-character widths instead of system fonts
    #[arg(long)]
    fixed_metrics: bool,

    /// Also write the rendered snapshot as editor-compatible JSON (file or directory)
    #[arg(long, value_name = "PATH")]
    save_snapshot: Option<PathBuf>,

    /// Log layout details to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<clap_complete::Shell>,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    logging::init(args.verbose);

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "fishbone", &mut std::io::stdout());
        return Ok(());
    }

    let mut snapshot = match &args.input {
        Some(path) if !args.demo => Snapshot::load(path)?,
        _ => Snapshot::demo(),
    };
    if let Some(size) = args.font_size {
        snapshot.base_font_size = size;
    }

    let theme = Theme::resolve(&args.theme)?;
    let generated_on = args
        .date
        .clone()
        .unwrap_or_else(|| chrono::Local::now().format("%Y/%m/%d").to_string());
    let options = LayoutOptions {
        report_band: !args.no_report_band,
        meta: snapshot.report_meta(Some(generated_on)),
        theme,
    };

    let measure: Box<dyn TextMeasure> = if args.fixed_metrics {
        Box::new(FixedWidthMeasure::default())
    } else {
        Box::new(CosmicTextMeasure::new())
    };

    let layout = layout_fishbone(
        &snapshot.rows,
        &snapshot.problem,
        snapshot.clamped_font_size(),
        &options,
        measure.as_ref(),
    );
    let svg = render_svg(&layout.canvas, &options.theme);

    let output = args.output.as_deref().ok_or(Error::MissingOutput)?;
    let format = export::write_output(&svg, output, args.png_scale)?;
    eprintln!("{:?} saved to: {}", format, output.display());

    if let Some(path) = &args.save_snapshot {
        let written = snapshot.save(path, chrono::Utc::now())?;
        eprintln!("Snapshot saved to: {}", written.display());
    }

    Ok(())
}
