use std::num::NonZeroUsize;
use std::path::Path;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Weight};
use lru::LruCache;
use parking_lot::Mutex;

/// Extra width added to every measurement so rendered labels are never clipped.
pub const TEXT_PADDING: f32 = 10.0;

const MEASURE_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::new(4096).unwrap();

/// Width oracle used by the layout engine.
///
/// Implementations report the advance width of a single line of bold
/// sans-serif text. Results only need to be self-consistent within one
/// process; different font stacks will disagree on exact numbers.
pub trait TextMeasure {
    fn advance_width(&self, text: &str, font_size: f32) -> f32;

    /// Advance width plus [`TEXT_PADDING`].
    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        self.advance_width(text, font_size) + TEXT_PADDING
    }
}

#[derive(Hash, PartialEq, Eq)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
}

struct MeasureState {
    font_system: Option<FontSystem>,
    cache: LruCache<MeasureKey, f32>,
}

/// Shapes text with cosmic-text against the system font database.
///
/// The font system is created on first use (loading system fonts is slow) and
/// reused afterwards. A local `fonts/` directory is loaded on top of the
/// system fonts when present, mirroring what the PNG/PDF exporters do.
pub struct CosmicTextMeasure {
    state: Mutex<MeasureState>,
}

impl CosmicTextMeasure {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MeasureState {
                font_system: None,
                cache: LruCache::new(MEASURE_CACHE_CAPACITY),
            }),
        }
    }
}

fn load_font_system() -> FontSystem {
    let mut font_system = FontSystem::new();
    let local_fonts = Path::new("fonts");
    if local_fonts.is_dir() {
        font_system.db_mut().load_fonts_dir(local_fonts);
    }
    tracing::debug!(
        faces = font_system.db().len(),
        "initialized font system for text measurement"
    );
    font_system
}

impl TextMeasure for CosmicTextMeasure {
    fn advance_width(&self, text: &str, font_size: f32) -> f32 {
        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
        };

        let mut state = self.state.lock();
        if let Some(cached) = state.cache.get(&key) {
            return *cached;
        }
        tracing::trace!(text, font_size, "text measurement cache miss");

        let cleaned = crate::xml::sanitize_xml_text(text);
        let font_system = state.font_system.get_or_insert_with(load_font_system);

        let mut buffer = Buffer::new(
            font_system,
            Metrics {
                font_size,
                line_height: font_size * 1.2,
            },
        );
        buffer.set_size(font_system, None, None);

        let attrs = Attrs::new().family(Family::SansSerif).weight(Weight::BOLD);
        buffer.set_text(font_system, &cleaned, &attrs, Shaping::Advanced, None);

        let width = buffer
            .layout_runs()
            .map(|run| run.line_w)
            .fold(0.0_f32, f32::max);

        state.cache.put(key, width);
        width
    }
}

impl Default for CosmicTextMeasure {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic measurement: every character is `char_width_factor * font_size` wide.
///
/// Used by tests and by `--fixed-metrics` when output must not depend on the
/// fonts installed on the host.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthMeasure {
    pub char_width_factor: f32,
}

impl Default for FixedWidthMeasure {
    fn default() -> Self {
        Self {
            char_width_factor: 0.6,
        }
    }
}

impl TextMeasure for FixedWidthMeasure {
    fn advance_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * self.char_width_factor * font_size
    }
}

#[cfg(test)]
mod tests {
    use super::{FixedWidthMeasure, TEXT_PADDING, TextMeasure};

    #[test]
    fn empty_text_measures_as_padding() {
        let measure = FixedWidthMeasure::default();
        assert_eq!(measure.measure_text("", 14.0), TEXT_PADDING);
    }

    #[test]
    fn fixed_width_counts_chars_not_bytes() {
        let measure = FixedWidthMeasure {
            char_width_factor: 1.0,
        };
        assert_eq!(measure.advance_width("熱水器", 10.0), 30.0);
        assert_eq!(measure.measure_text("ab", 10.0), 20.0 + TEXT_PADDING);
    }
}
