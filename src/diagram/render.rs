use std::fmt::Write as _;

use super::canvas::{Canvas, PathCommand, Primitive, Shape, Stroke, Text, TextAnchor};
use crate::theme::Theme;
use crate::xml::escape_xml;

/// Serializes a laid-out canvas as a standalone SVG document.
pub fn render_svg(canvas: &Canvas, theme: &Theme) -> String {
    let mut svg = String::with_capacity(256 + canvas.primitives.len() * 160);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.2}" height="{h:.2}" viewBox="0 0 {w:.2} {h:.2}" font-family="{font}">"#,
        w = canvas.width,
        h = canvas.height,
        font = escape_xml(&theme.font_family),
    );
    svg.push('\n');
    let _ = writeln!(
        svg,
        r#"<rect width="{:.2}" height="{:.2}" fill="{}"/>"#,
        canvas.width,
        canvas.height,
        escape_xml(&theme.background)
    );

    for primitive in &canvas.primitives {
        render_primitive(&mut svg, primitive);
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    svg
}

fn row_attr(row_id: Option<i64>) -> String {
    row_id
        .map(|id| format!(r#" data-row-id="{}""#, id))
        .unwrap_or_default()
}

fn stroke_attrs(stroke: &Stroke) -> String {
    let mut attrs = format!(
        r#"stroke="{}" stroke-width="{:.2}""#,
        escape_xml(&stroke.color),
        stroke.width
    );
    if stroke.round_cap {
        attrs.push_str(r#" stroke-linecap="round""#);
    }
    attrs
}

fn path_data(commands: &[PathCommand]) -> String {
    let mut d = String::new();
    for command in commands {
        if !d.is_empty() {
            d.push(' ');
        }
        let _ = match command {
            PathCommand::MoveTo(p) => write!(d, "M {:.2} {:.2}", p.x, p.y),
            PathCommand::LineTo(p) => write!(d, "L {:.2} {:.2}", p.x, p.y),
            PathCommand::QuadTo { ctrl, to } => {
                write!(d, "Q {:.2} {:.2} {:.2} {:.2}", ctrl.x, ctrl.y, to.x, to.y)
            }
            PathCommand::Close => write!(d, "Z"),
        };
    }
    d
}

fn render_text(svg: &mut String, text: &Text, row: &str) {
    let anchor = match text.anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    };
    let _ = write!(
        svg,
        r#"<text x="{:.2}" y="{:.2}" font-size="{:.1}" fill="{}" text-anchor="{}""#,
        text.position.x,
        text.position.y,
        text.font_size,
        escape_xml(&text.color),
        anchor
    );
    if text.bold {
        svg.push_str(r#" font-weight="bold""#);
    }
    if text.strike_through {
        svg.push_str(r#" text-decoration="line-through""#);
    }
    let _ = write!(svg, "{}>{}</text>", row, escape_xml(&text.content));
}

fn render_primitive(svg: &mut String, primitive: &Primitive) {
    let row = row_attr(primitive.row_id);
    let _ = match &primitive.shape {
        Shape::Line { from, to, stroke } => write!(
            svg,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" {}{} />"#,
            from.x,
            from.y,
            to.x,
            to.y,
            stroke_attrs(stroke),
            row
        ),
        Shape::Path {
            commands,
            fill,
            opacity,
        } => {
            let opacity = if *opacity < 1.0 {
                format!(r#" opacity="{:.2}""#, opacity)
            } else {
                String::new()
            };
            write!(
                svg,
                r#"<path d="{}" fill="{}"{}{} />"#,
                path_data(commands),
                escape_xml(fill),
                opacity,
                row
            )
        }
        Shape::Circle {
            center,
            radius,
            fill,
        } => write!(
            svg,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"{} />"#,
            center.x,
            center.y,
            radius,
            escape_xml(fill),
            row
        ),
        Shape::Rect {
            origin,
            width,
            height,
            corner_radius,
            fill,
            stroke,
        } => {
            let stroke = stroke
                .as_ref()
                .map(|s| format!(" {}", stroke_attrs(s)))
                .unwrap_or_default();
            write!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.2}" fill="{}"{}{} />"#,
                origin.x,
                origin.y,
                width,
                height,
                corner_radius,
                escape_xml(fill),
                stroke,
                row
            )
        }
        Shape::Text(text) => {
            render_text(svg, text, &row);
            Ok(())
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::canvas::Point;

    #[test]
    fn document_is_sized_to_canvas() {
        let canvas = Canvas {
            primitives: Vec::new(),
            width: 1200.0,
            height: 750.0,
        };
        let svg = render_svg(&canvas, &Theme::classic());

        assert!(svg.starts_with("<svg "));
        assert!(svg.contains(r#"viewBox="0 0 1200.00 750.00""#));
        assert!(svg.contains(r##"fill="#f8fafc""##));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn text_is_escaped_and_decorated() {
        let mut canvas = Canvas::default();
        canvas.push_for_row(
            Shape::Text(Text {
                position: Point::new(1.0, 2.0),
                content: "❌ R&D <lab>".to_string(),
                font_size: 12.0,
                color: "#cbd5e1".to_string(),
                bold: false,
                strike_through: true,
                anchor: TextAnchor::Start,
                width: 50.0,
            }),
            Some(21),
        );
        let svg = render_svg(&canvas, &Theme::classic());

        assert!(svg.contains("❌ R&amp;D &lt;lab&gt;</text>"));
        assert!(svg.contains(r#"text-decoration="line-through""#));
        assert!(svg.contains(r#"data-row-id="21""#));
        assert!(!svg.contains("font-weight"));
    }

    #[test]
    fn path_commands_serialize_in_order() {
        let d = path_data(&[
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::LineTo(Point::new(1.0, 2.0)),
            PathCommand::QuadTo {
                ctrl: Point::new(3.0, 4.0),
                to: Point::new(5.0, 6.0),
            },
            PathCommand::Close,
        ]);
        assert_eq!(d, "M 0.00 0.00 L 1.00 2.00 Q 3.00 4.00 5.00 6.00 Z");
    }

    #[test]
    fn round_caps_are_emitted() {
        let attrs = stroke_attrs(&Stroke::new("#475569", 6.0).round());
        assert_eq!(
            attrs,
            r##"stroke="#475569" stroke-width="6.00" stroke-linecap="round""##
        );
    }
}
