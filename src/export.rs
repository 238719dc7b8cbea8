use std::path::Path;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::error::{Error, Result};

/// Output formats chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }
}

/// Writes `svg` to `path`, converting according to the file extension.
pub fn write_output(svg: &str, path: &Path, png_scale: f32) -> Result<OutputFormat> {
    let format = OutputFormat::from_path(path)?;
    let bytes = match format {
        OutputFormat::Svg => svg.as_bytes().to_vec(),
        OutputFormat::Png => svg_to_png(svg, png_scale)?,
        OutputFormat::Pdf => svg_to_pdf(svg)?,
    };
    std::fs::write(path, bytes).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), ?format, "wrote diagram");
    Ok(format)
}

pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::render(format!("invalid PNG scale: {}", scale)));
    }

    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        fontdb.load_system_fonts();
        let local_fonts = Path::new("fonts");
        if local_fonts.is_dir() {
            fontdb.load_fonts_dir(local_fonts);
        }
        configure_font_fallbacks(fontdb);
    }

    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| Error::render(format!("failed to parse SVG: {}", e)))?;

    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| Error::render(format!("cannot allocate {}x{} pixmap", width, height)))?;

    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| Error::render(format!("failed to encode PNG: {}", e)))
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();
    let local_fonts = Path::new("fonts");
    if local_fonts.is_dir() {
        fontdb.load_fonts_dir(local_fonts);
    }
    configure_font_fallbacks_svg2pdf(&mut fontdb);

    let opts = svg2pdf::usvg::Options {
        fontdb: std::sync::Arc::new(fontdb),
        ..Default::default()
    };
    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| Error::render(format!("failed to parse SVG: {}", e)))?;

    // Text is converted to paths; embedding CJK and emoji faces is unreliable
    // across PDF viewers.
    let options = svg2pdf::ConversionOptions {
        embed_text: false,
        ..Default::default()
    };
    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(|e| Error::render(format!("failed to convert SVG to PDF: {}", e)))
}

/// Generic family choices picked from whatever fonts the host has.
#[derive(Debug, Default, PartialEq)]
struct FallbackFamilies {
    sans: Option<String>,
    mono: Option<String>,
    first: Option<String>,
}

impl FallbackFamilies {
    fn scan<'a>(families: impl IntoIterator<Item = &'a str>) -> Self {
        let mut found = Self::default();
        for family in families {
            if found.first.is_none() {
                found.first = Some(family.to_string());
            }
            let lower = family.to_ascii_lowercase();
            if found.sans.is_none() && lower.contains("sans") {
                found.sans = Some(family.to_string());
            }
            if found.mono.is_none() && (lower.contains("mono") || lower.contains("code")) {
                found.mono = Some(family.to_string());
            }
        }
        found
    }

    fn sans(&self) -> Option<&str> {
        self.sans.as_deref().or(self.first.as_deref())
    }

    fn mono(&self) -> Option<&str> {
        self.mono.as_deref().or_else(|| self.sans())
    }
}

// resvg and svg2pdf pin different fontdb versions, hence two near-identical
// functions.
fn configure_font_fallbacks(fontdb: &mut usvg::fontdb::Database) {
    let found = FallbackFamilies::scan(
        fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str())),
    );
    if let Some(family) = found.sans() {
        fontdb.set_sans_serif_family(family);
        fontdb.set_serif_family(family);
    }
    if let Some(family) = found.mono() {
        fontdb.set_monospace_family(family);
    }
}

fn configure_font_fallbacks_svg2pdf(fontdb: &mut svg2pdf::usvg::fontdb::Database) {
    let found = FallbackFamilies::scan(
        fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str())),
    );
    if let Some(family) = found.sans() {
        fontdb.set_sans_serif_family(family);
        fontdb.set_serif_family(family);
    }
    if let Some(family) = found.mono() {
        fontdb.set_monospace_family(family);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{FallbackFamilies, OutputFormat, svg_to_png};

    #[test]
    fn format_from_extension_is_case_insensitive() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out/RCA.SVG")).expect("svg"),
            OutputFormat::Svg
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("a.pdf")).expect("pdf"),
            OutputFormat::Pdf
        );
        let err = OutputFormat::from_path(Path::new("a.jpeg")).expect_err("jpeg");
        assert!(err.to_string().contains(".jpeg"));
        assert!(OutputFormat::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn fallback_prefers_sans_then_first_family() {
        let found = FallbackFamilies::scan(["Noto Serif", "Noto Sans CJK TC", "Fira Code"]);
        assert_eq!(found.sans(), Some("Noto Sans CJK TC"));
        assert_eq!(found.mono(), Some("Fira Code"));

        let found = FallbackFamilies::scan(["Garamond"]);
        assert_eq!(found.sans(), Some("Garamond"));
        assert_eq!(found.mono(), Some("Garamond"));

        assert_eq!(FallbackFamilies::scan(Vec::<&str>::new()).sans(), None);
    }

    #[test]
    fn png_scale_must_be_positive() {
        assert!(svg_to_png("<svg/>", 0.0).is_err());
        assert!(svg_to_png("<svg/>", f32::NAN).is_err());
    }
}
