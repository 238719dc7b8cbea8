mod canvas;
mod group;
mod layout;
mod render;
mod snapshot;
mod types;

pub use canvas::{Canvas, PathCommand, Point, Primitive, Shape, Stroke, Text, TextAnchor};
pub use group::{CategoryGroup, CauseGroup, group_rows};
pub use layout::{
    CategoryLayout, CauseLayout, FactorLayout, FishboneLayout, FishboneLayoutEngine,
    LayoutConfig, LayoutOptions, MIN_CANVAS_HEIGHT, MIN_CANVAS_WIDTH, VERTICAL_PADDING,
    layout_fishbone,
};
pub use render::render_svg;
pub use snapshot::{MAX_FONT_SIZE, MIN_FONT_SIZE, SNAPSHOT_VERSION, Snapshot};
pub use types::{FactorRecord, ReportMeta, Status, StatusStyle, UNCATEGORIZED, UNSPECIFIED};
