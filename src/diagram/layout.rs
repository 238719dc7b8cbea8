use serde::Serialize;

use crate::fonts::TextMeasure;
use crate::theme::Theme;

use super::canvas::{Canvas, PathCommand, Point, Shape, Stroke, Text, TextAnchor};
use super::group::{CauseGroup, group_rows};
use super::types::{FactorRecord, ReportMeta, Status};

/// Space above the tallest top bone and below the tallest bottom bone.
pub const VERTICAL_PADDING: f32 = 150.0;
pub const MIN_CANVAS_WIDTH: f32 = 1200.0;
pub const MIN_CANVAS_HEIGHT: f32 = 750.0;

const MIN_HEAD_WIDTH: f32 = 280.0;
const HEAD_HEIGHT: f32 = 140.0;
const HEAD_TEXT_MARGIN: f32 = 100.0;
const PROBLEM_FONT_SIZE: f32 = 24.0;
const SPINE_TAIL_OVERHANG: f32 = 150.0;
const RIGHT_MARGIN: f32 = 250.0;
const PAGE_MARGIN: f32 = 50.0;
const BONE_SLANT: f32 = 0.45;
const CATEGORY_PILL_MIN_WIDTH: f32 = 140.0;
const CATEGORY_PILL_HEIGHT: f32 = 34.0;

/// Geometry constants derived from the base font size.
///
/// Everything grows linearly once the font passes 14px so labels keep their
/// room as text gets bigger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutConfig {
    pub s: f32,
    pub font_growth: f32,
    pub font_size: f32,
    pub small_font_size: f32,
    pub category_spacing: f32,
    pub min_bone_length: f32,
    pub vertical_branch_gap: f32,
    pub problem_font_size: f32,
    pub head_scale: f32,
}

impl LayoutConfig {
    pub fn new(base_font_size: f32) -> Self {
        let font_growth = (base_font_size - 14.0).max(0.0);
        Self {
            s: 1.0 + font_growth * 0.01,
            font_growth,
            font_size: base_font_size,
            small_font_size: (base_font_size - 2.0).max(10.0),
            category_spacing: 350.0 + font_growth * 6.0,
            min_bone_length: 220.0 + font_growth * 2.0,
            vertical_branch_gap: 130.0 + font_growth * 3.5,
            problem_font_size: PROBLEM_FONT_SIZE,
            head_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Reserve and draw the report header (project title) and footer
    /// (date, owner, stage) bands.
    pub report_band: bool,
    pub meta: ReportMeta,
    pub theme: Theme,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            report_band: true,
            meta: ReportMeta::default(),
            theme: Theme::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorLayout {
    pub record: FactorRecord,
    pub label: String,
    pub icon: &'static str,
    /// Distance from the cause root along the cause line.
    pub x_offset: f32,
    /// Measured label width at the small font size.
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CauseLayout {
    pub name: String,
    pub factors: Vec<FactorLayout>,
    /// Branch length needed for both the factor ticks and the cause label.
    pub total_len: f32,
    /// Where the cause line leaves its bone.
    pub root: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryLayout {
    pub name: String,
    pub causes: Vec<CauseLayout>,
    pub bone_length: f32,
    pub is_top: bool,
    pub max_cause_len: f32,
    /// Bone attachment point on the spine.
    pub anchor: Point,
    /// Far end of the bone, where the category label sits.
    pub bone_end: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FishboneLayout {
    pub config: LayoutConfig,
    pub categories: Vec<CategoryLayout>,
    pub spine_y: f32,
    pub spine_start_x: f32,
    pub head_x: f32,
    pub head_width: f32,
    pub head_height: f32,
    pub canvas: Canvas,
}

/// Lays out one fishbone diagram. Holds no state between calls.
pub struct FishboneLayoutEngine<'a, T: TextMeasure + ?Sized> {
    measure: &'a T,
    config: LayoutConfig,
}

impl<'a, T: TextMeasure + ?Sized> FishboneLayoutEngine<'a, T> {
    pub fn new(measure: &'a T, base_font_size: f32) -> Self {
        Self {
            measure,
            config: LayoutConfig::new(base_font_size),
        }
    }

    fn measure(&self, text: &str, font_size: f32) -> f32 {
        self.measure.measure_text(text, font_size)
    }

    /// Packs factor ticks left to right, each slot proportional to its label.
    fn layout_cause(&self, cause: &CauseGroup<'_>) -> CauseLayout {
        let s = self.config.s;
        let mut cursor = 40.0 * s;

        let factors: Vec<FactorLayout> = cause
            .factors
            .iter()
            .map(|record| {
                let label = record.label();
                let width = self.measure(&label, self.config.small_font_size);
                let x_offset = cursor;
                cursor += width * 0.7 + 15.0 * s;
                FactorLayout {
                    record: (*record).clone(),
                    label,
                    icon: record.status.icon(),
                    x_offset,
                    width,
                }
            })
            .collect();

        let packed_len = cursor + 40.0 * s;
        let text_len = self.measure(cause.name, self.config.font_size) + 60.0 * s;

        CauseLayout {
            name: cause.name.to_string(),
            factors,
            total_len: packed_len.max(text_len),
            root: Point::default(),
        }
    }

    /// Sizes every category; positions are filled in by [`Self::layout`].
    pub fn measure_categories(&self, rows: &[FactorRecord]) -> Vec<CategoryLayout> {
        let cfg = &self.config;
        group_rows(rows)
            .iter()
            .enumerate()
            .map(|(index, group)| {
                let causes: Vec<CauseLayout> =
                    group.causes.iter().map(|c| self.layout_cause(c)).collect();
                let needed = causes.len() as f32 * cfg.vertical_branch_gap + 100.0 * cfg.s;
                let max_cause_len = causes.iter().map(|c| c.total_len).fold(0.0, f32::max);
                CategoryLayout {
                    name: group.name.to_string(),
                    causes,
                    bone_length: cfg.min_bone_length.max(needed),
                    is_top: index % 2 == 0,
                    max_cause_len,
                    anchor: Point::default(),
                    bone_end: Point::default(),
                }
            })
            .collect()
    }

    /// Horizontal room a category needs so its causes, which extend to the
    /// right, stay clear of the bone to its right.
    fn category_gap(&self, category: &CategoryLayout) -> f32 {
        self.config
            .category_spacing
            .max(category.max_cause_len + 80.0 * self.config.s)
    }

    pub fn layout(
        &self,
        rows: &[FactorRecord],
        problem: &str,
        options: &LayoutOptions,
    ) -> FishboneLayout {
        let cfg = self.config;
        let s = cfg.s;
        let theme = &options.theme;
        let mut categories = self.measure_categories(rows);

        // Vertical placement.
        let max_height = |top: bool| {
            categories
                .iter()
                .filter(|c| c.is_top == top)
                .map(|c| c.bone_length)
                .fold(0.0, f32::max)
        };
        let max_top_height = max_height(true);
        let max_bottom_height = max_height(false);
        let (header_height, footer_height) = if options.report_band {
            (100.0 * s, 60.0 * s)
        } else {
            (0.0, 0.0)
        };
        let spine_y = max_top_height + VERTICAL_PADDING + header_height;
        let total_height = spine_y + max_bottom_height + VERTICAL_PADDING + footer_height;

        // Horizontal placement, right (head) to left (tail).
        let head_width = MIN_HEAD_WIDTH
            .max(self.measure(problem, cfg.problem_font_size) + HEAD_TEXT_MARGIN)
            * cfg.head_scale;
        let head_height = HEAD_HEIGHT * cfg.head_scale;
        let first_max_cause = categories.first().map_or(0.0, |c| c.max_cause_len);
        let head_gap = (260.0 * s).max(first_max_cause + 100.0 * s);
        let all_gaps: f32 = categories.iter().map(|c| self.category_gap(c)).sum();
        let head_x = (100.0 + all_gaps + head_gap).max(200.0);

        let mut cursor_x = head_x - head_gap;
        for (index, category) in categories.iter_mut().enumerate() {
            if index > 0 {
                cursor_x -= self.category_gap(category);
            }
            let end_y = if category.is_top {
                spine_y - category.bone_length
            } else {
                spine_y + category.bone_length
            };
            category.anchor = Point::new(cursor_x, spine_y);
            category.bone_end = Point::new(cursor_x - category.bone_length * BONE_SLANT, end_y);

            let bone_len = category.anchor.distance(category.bone_end);
            let mut dist_from_spine = 70.0 * s;
            for cause in &mut category.causes {
                cause.root = category
                    .anchor
                    .lerp(category.bone_end, dist_from_spine / bone_len);
                dist_from_spine += cfg.vertical_branch_gap;
            }
        }

        let last_anchor_x = categories
            .last()
            .map_or(head_x - 200.0, |c| c.anchor.x);
        let spine_start_x = last_anchor_x - SPINE_TAIL_OVERHANG;
        let required_width = head_x + head_width + RIGHT_MARGIN;

        let mut canvas = Canvas {
            primitives: Vec::new(),
            width: required_width.max(MIN_CANVAS_WIDTH),
            height: total_height.max(MIN_CANVAS_HEIGHT),
        };

        if options.report_band {
            self.draw_header(&mut canvas, &options.meta, theme, required_width);
        }
        self.draw_spine(&mut canvas, theme, spine_start_x, spine_y, head_x);
        self.draw_head(&mut canvas, theme, problem, head_x, spine_y, head_width, head_height);
        for category in &categories {
            self.draw_category(&mut canvas, theme, category);
        }
        if options.report_band {
            self.draw_footer(&mut canvas, &options.meta, theme, required_width, total_height);
        }

        tracing::debug!(
            categories = categories.len(),
            rows = rows.len(),
            width = canvas.width,
            height = canvas.height,
            primitives = canvas.primitives.len(),
            "laid out fishbone diagram"
        );

        FishboneLayout {
            config: cfg,
            categories,
            spine_y,
            spine_start_x,
            head_x,
            head_width,
            head_height,
            canvas,
        }
    }

    fn text(
        &self,
        position: Point,
        content: String,
        font_size: f32,
        color: &str,
        bold: bool,
        anchor: TextAnchor,
    ) -> Text {
        let width = self.measure(&content, font_size);
        Text {
            position,
            content,
            font_size,
            color: color.to_string(),
            bold,
            strike_through: false,
            anchor,
            width,
        }
    }

    fn draw_header(&self, canvas: &mut Canvas, meta: &ReportMeta, theme: &Theme, width: f32) {
        let s = self.config.s;
        canvas.push(Shape::Text(self.text(
            Point::new(PAGE_MARGIN, 80.0 * s),
            meta.project_name.clone(),
            36.0 * s,
            &theme.header_text,
            true,
            TextAnchor::Start,
        )));
        canvas.push(Shape::Line {
            from: Point::new(PAGE_MARGIN, 100.0 * s),
            to: Point::new(width - PAGE_MARGIN, 100.0 * s),
            stroke: Stroke::new(&theme.rule, 2.0 * s),
        });
    }

    fn draw_footer(
        &self,
        canvas: &mut Canvas,
        meta: &ReportMeta,
        theme: &Theme,
        width: f32,
        total_height: f32,
    ) {
        let s = self.config.s;
        let footer_y = total_height - 20.0 * s;
        let font_size = 14.0 * s;

        canvas.push(Shape::Line {
            from: Point::new(PAGE_MARGIN, footer_y - 30.0 * s),
            to: Point::new(width - PAGE_MARGIN, footer_y - 30.0 * s),
            stroke: Stroke::new(&theme.rule, s),
        });
        canvas.push(Shape::Text(self.text(
            Point::new(PAGE_MARGIN, footer_y),
            format!("Generated: {}", meta.generated_on.as_deref().unwrap_or_default()),
            font_size,
            &theme.footer_text,
            false,
            TextAnchor::Start,
        )));
        if !meta.owner.is_empty() {
            canvas.push(Shape::Text(self.text(
                Point::new(width / 2.0, footer_y),
                format!("Owner: {}", meta.owner),
                font_size,
                &theme.footer_text,
                false,
                TextAnchor::Middle,
            )));
        }
        canvas.push(Shape::Text(self.text(
            Point::new(width - PAGE_MARGIN, footer_y),
            format!("{} Ver.", meta.stage),
            font_size,
            theme.stage_color(&meta.stage),
            true,
            TextAnchor::End,
        )));
    }

    fn draw_spine(&self, canvas: &mut Canvas, theme: &Theme, start_x: f32, y: f32, head_x: f32) {
        canvas.push(Shape::Path {
            commands: vec![
                PathCommand::MoveTo(Point::new(start_x, y)),
                PathCommand::LineTo(Point::new(start_x - 60.0, y - 50.0)),
                PathCommand::QuadTo {
                    ctrl: Point::new(start_x - 40.0, y),
                    to: Point::new(start_x - 60.0, y + 50.0),
                },
                PathCommand::Close,
            ],
            fill: theme.tail_fill.clone(),
            opacity: 0.8,
        });
        canvas.push(Shape::Line {
            from: Point::new(start_x, y),
            to: Point::new(head_x, y),
            stroke: Stroke::new(&theme.spine, 6.0 * self.config.s).round(),
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_head(
        &self,
        canvas: &mut Canvas,
        theme: &Theme,
        problem: &str,
        x: f32,
        spine_y: f32,
        width: f32,
        height: f32,
    ) {
        let top = spine_y - height / 2.0;
        let bottom = spine_y + height / 2.0;
        canvas.push(Shape::Path {
            commands: vec![
                PathCommand::MoveTo(Point::new(x, top)),
                PathCommand::QuadTo {
                    ctrl: Point::new(x + width / 2.0, top - 20.0),
                    to: Point::new(x + width, spine_y),
                },
                PathCommand::QuadTo {
                    ctrl: Point::new(x + width / 2.0, bottom + 20.0),
                    to: Point::new(x, bottom),
                },
                PathCommand::QuadTo {
                    ctrl: Point::new(x - 40.0, spine_y),
                    to: Point::new(x, top),
                },
                PathCommand::Close,
            ],
            fill: theme.head_fill.clone(),
            opacity: 1.0,
        });

        let eye = Point::new(x + width * 0.7, spine_y - 20.0);
        canvas.push(Shape::Circle {
            center: eye,
            radius: 10.0,
            fill: "#ffffff".to_string(),
        });
        canvas.push(Shape::Circle {
            center: eye,
            radius: 4.0,
            fill: "#000000".to_string(),
        });

        let font_size = self.config.problem_font_size;
        canvas.push(Shape::Text(self.text(
            Point::new(x + width / 2.0, spine_y + font_size / 3.0),
            problem.to_string(),
            font_size,
            &theme.head_text,
            true,
            TextAnchor::Middle,
        )));
    }

    fn draw_category(&self, canvas: &mut Canvas, theme: &Theme, category: &CategoryLayout) {
        let cfg = &self.config;
        let s = cfg.s;

        canvas.push(Shape::Line {
            from: category.anchor,
            to: category.bone_end,
            stroke: Stroke::new(&theme.bone, 4.0 * s).round(),
        });

        let label_y = if category.is_top {
            category.bone_end.y - 40.0
        } else {
            category.bone_end.y + 20.0
        };
        let label = self.text(
            Point::new(category.bone_end.x, label_y + 13.0),
            category.name.clone(),
            cfg.font_size,
            &theme.category_text,
            true,
            TextAnchor::Middle,
        );
        let pill_width = CATEGORY_PILL_MIN_WIDTH.max(label.width + 20.0);
        canvas.push(Shape::Rect {
            origin: Point::new(category.bone_end.x - pill_width / 2.0, label_y - 10.0),
            width: pill_width,
            height: CATEGORY_PILL_HEIGHT,
            corner_radius: CATEGORY_PILL_HEIGHT / 2.0,
            fill: theme.category_fill.clone(),
            stroke: Some(Stroke::new(&theme.category_border, 1.0)),
        });
        canvas.push(Shape::Text(label));

        for cause in &category.causes {
            self.draw_cause(canvas, theme, cause);
        }
    }

    fn draw_cause(&self, canvas: &mut Canvas, theme: &Theme, cause: &CauseLayout) {
        let cfg = &self.config;
        let s = cfg.s;
        let row_id = cause.factors.first().map(|f| f.record.id);
        let end = Point::new(cause.root.x + (160.0 * s).max(cause.total_len), cause.root.y);

        canvas.push_for_row(
            Shape::Line {
                from: cause.root,
                to: end,
                stroke: Stroke::new(&theme.cause_line, 3.0 * s).round(),
            },
            row_id,
        );
        canvas.push_for_row(
            Shape::Text(self.text(
                Point::new(end.x + 8.0, end.y + 5.0),
                cause.name.clone(),
                cfg.font_size,
                &theme.cause_text,
                true,
                TextAnchor::Start,
            )),
            row_id,
        );

        for (index, factor) in cause.factors.iter().enumerate() {
            self.draw_factor(canvas, theme, cause.root, index, factor);
        }
    }

    fn draw_factor(
        &self,
        canvas: &mut Canvas,
        theme: &Theme,
        cause_root: Point,
        index: usize,
        factor: &FactorLayout,
    ) {
        let cfg = &self.config;
        let s = cfg.s;
        let record = &factor.record;
        let row_id = Some(record.id);
        let is_up = index % 2 == 0;
        let is_exclude = record.status == Status::Exclude;

        let root = Point::new(cause_root.x + factor.x_offset, cause_root.y);
        let branch_len = if is_up { -30.0 * s } else { 30.0 * s };
        let tip = Point::new(root.x + 15.0 * s, root.y + branch_len);

        let (stroke_color, stroke_width) = if record.is_priority {
            (theme.priority_stroke.as_str(), 2.5)
        } else {
            (record.status.style().bone_color, 1.5)
        };
        let text_color = if record.is_priority {
            &theme.priority_text
        } else if is_exclude {
            &theme.excluded_text
        } else {
            &theme.factor_text
        };

        canvas.push_for_row(
            Shape::Circle {
                center: root,
                radius: 2.0 * s,
                fill: theme.factor_dot.clone(),
            },
            row_id,
        );
        canvas.push_for_row(
            Shape::Line {
                from: root,
                to: tip,
                stroke: Stroke::new(stroke_color, stroke_width),
            },
            row_id,
        );
        let text_y = if is_up { tip.y - 5.0 } else { tip.y + 14.0 };
        canvas.push_for_row(
            Shape::Text(Text {
                position: Point::new(tip.x - 5.0, text_y),
                content: factor.label.clone(),
                font_size: cfg.small_font_size,
                color: text_color.clone(),
                bold: record.is_priority,
                strike_through: is_exclude,
                anchor: TextAnchor::Start,
                width: factor.width,
            }),
            row_id,
        );
    }
}

/// Lays out `rows` as a fishbone diagram pointing at `problem`.
pub fn layout_fishbone<T: TextMeasure + ?Sized>(
    rows: &[FactorRecord],
    problem: &str,
    base_font_size: f32,
    options: &LayoutOptions,
    measure: &T,
) -> FishboneLayout {
    FishboneLayoutEngine::new(measure, base_font_size).layout(rows, problem, options)
}
