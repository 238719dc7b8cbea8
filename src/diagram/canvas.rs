use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point at parameter `t` on the segment `self -> other`.
    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub color: String,
    pub width: f32,
    pub round_cap: bool,
}

impl Stroke {
    pub fn new(color: &str, width: f32) -> Self {
        Self {
            color: color.to_string(),
            width,
            round_cap: false,
        }
    }

    pub fn round(mut self) -> Self {
        self.round_cap = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub position: Point,
    pub content: String,
    pub font_size: f32,
    pub color: String,
    pub bold: bool,
    pub strike_through: bool,
    pub anchor: TextAnchor,
    /// Measured width, used for hit-testing.
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
    Close,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Path {
        commands: Vec<PathCommand>,
        fill: String,
        opacity: f32,
    },
    Circle {
        center: Point,
        radius: f32,
        fill: String,
    },
    Rect {
        origin: Point,
        width: f32,
        height: f32,
        corner_radius: f32,
        fill: String,
        stroke: Option<Stroke>,
    },
    Text(Text),
}

/// A drawable shape, optionally linked back to the row it represents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Primitive {
    pub shape: Shape,
    pub row_id: Option<i64>,
}

/// Positioned primitives plus the overall drawing extent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Canvas {
    pub primitives: Vec<Primitive>,
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    pub fn push(&mut self, shape: Shape) {
        self.primitives.push(Primitive {
            shape,
            row_id: None,
        });
    }

    pub fn push_for_row(&mut self, shape: Shape, row_id: Option<i64>) {
        self.primitives.push(Primitive { shape, row_id });
    }

    /// Row id of the topmost linked primitive within `tolerance` of `(x, y)`.
    ///
    /// Primitives are drawn in order, so later ones are on top.
    pub fn hit_test(&self, x: f32, y: f32, tolerance: f32) -> Option<i64> {
        let p = Point::new(x, y);
        self.primitives
            .iter()
            .rev()
            .filter(|prim| prim.row_id.is_some())
            .find(|prim| shape_contains(&prim.shape, p, tolerance))
            .and_then(|prim| prim.row_id)
    }

    pub fn row_primitives(&self, row_id: i64) -> impl Iterator<Item = &Primitive> {
        self.primitives
            .iter()
            .filter(move |prim| prim.row_id == Some(row_id))
    }

    pub fn texts(&self) -> impl Iterator<Item = &Text> {
        self.primitives.iter().filter_map(|prim| match &prim.shape {
            Shape::Text(text) => Some(text),
            _ => None,
        })
    }
}

fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(a.lerp(b, t))
}

fn shape_contains(shape: &Shape, p: Point, tolerance: f32) -> bool {
    match shape {
        Shape::Line { from, to, stroke } => {
            segment_distance(p, *from, *to) <= tolerance + stroke.width / 2.0
        }
        Shape::Circle { center, radius, .. } => p.distance(*center) <= radius + tolerance,
        Shape::Rect {
            origin,
            width,
            height,
            ..
        } => {
            p.x >= origin.x - tolerance
                && p.x <= origin.x + width + tolerance
                && p.y >= origin.y - tolerance
                && p.y <= origin.y + height + tolerance
        }
        Shape::Text(text) => {
            let left = match text.anchor {
                TextAnchor::Start => text.position.x,
                TextAnchor::Middle => text.position.x - text.width / 2.0,
                TextAnchor::End => text.position.x - text.width,
            };
            let top = text.position.y - text.font_size;
            let bottom = text.position.y + text.font_size * 0.25;
            p.x >= left - tolerance
                && p.x <= left + text.width + tolerance
                && p.y >= top - tolerance
                && p.y <= bottom + tolerance
        }
        // Paths are decoration (head, tail) and never carry a row.
        Shape::Path { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x1: f32, y1: f32, x2: f32, y2: f32) -> Shape {
        Shape::Line {
            from: Point::new(x1, y1),
            to: Point::new(x2, y2),
            stroke: Stroke::new("#000", 2.0),
        }
    }

    #[test]
    fn hit_test_finds_nearby_line() {
        let mut canvas = Canvas::default();
        canvas.push_for_row(line(0.0, 0.0, 100.0, 0.0), Some(7));

        assert_eq!(canvas.hit_test(50.0, 3.0, 2.0), Some(7));
        assert_eq!(canvas.hit_test(50.0, 10.0, 2.0), None);
        assert_eq!(canvas.hit_test(110.0, 0.0, 2.0), None);
    }

    #[test]
    fn hit_test_prefers_topmost_and_skips_unlinked() {
        let mut canvas = Canvas::default();
        canvas.push_for_row(line(0.0, 0.0, 100.0, 0.0), Some(1));
        canvas.push_for_row(line(50.0, -50.0, 50.0, 50.0), Some(2));
        canvas.push(Shape::Circle {
            center: Point::new(50.0, 0.0),
            radius: 10.0,
            fill: "#fff".to_string(),
        });

        assert_eq!(canvas.hit_test(50.0, 0.0, 1.0), Some(2));
    }

    #[test]
    fn hit_test_text_respects_anchor() {
        let mut canvas = Canvas::default();
        canvas.push_for_row(
            Shape::Text(Text {
                position: Point::new(100.0, 100.0),
                content: "label".to_string(),
                font_size: 10.0,
                color: "#000".to_string(),
                bold: false,
                strike_through: false,
                anchor: TextAnchor::End,
                width: 40.0,
            }),
            Some(3),
        );

        assert_eq!(canvas.hit_test(80.0, 96.0, 0.0), Some(3));
        assert_eq!(canvas.hit_test(120.0, 96.0, 0.0), None);
    }

    #[test]
    fn lerp_and_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(30.0, 40.0);
        assert_eq!(a.distance(b), 50.0);
        assert_eq!(a.lerp(b, 0.5), Point::new(15.0, 20.0));
    }
}
