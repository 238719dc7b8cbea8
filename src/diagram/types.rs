use serde::{Deserialize, Deserializer, Serialize};

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const UNSPECIFIED: &str = "Unspecified";

/// Verification status of a hypothesis row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    CantExecute,
    #[default]
    OnGoing,
    Finished,
    Exclude,
}

/// Display attributes attached to a [`Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub bone_color: &'static str,
}

const STATUS_STYLES: [StatusStyle; 4] = [
    StatusStyle {
        id: "CANT_EXECUTE",
        label: "⛔ Can't Execute",
        icon: "⛔",
        color: "#94a3b8",
        bone_color: "#94a3b8",
    },
    StatusStyle {
        id: "ON_GOING",
        label: "⏳ On Going",
        icon: "⏳",
        color: "#3b82f6",
        bone_color: "#60a5fa",
    },
    StatusStyle {
        id: "FINISHED",
        label: "✅ Finished",
        icon: "✅",
        color: "#16a34a",
        bone_color: "#22c55e",
    },
    StatusStyle {
        id: "EXCLUDE",
        label: "❌ Exclude",
        icon: "❌",
        color: "#cbd5e1",
        bone_color: "#94a3b8",
    },
];

impl Status {
    pub const ALL: [Status; 4] = [
        Status::CantExecute,
        Status::OnGoing,
        Status::Finished,
        Status::Exclude,
    ];

    pub fn style(self) -> &'static StatusStyle {
        &STATUS_STYLES[self as usize]
    }

    pub fn icon(self) -> &'static str {
        self.style().icon
    }

    /// Parses a status id; `None` for anything unrecognized.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.style().id == id)
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Accept any JSON value; only known ids map to their status.
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(match raw {
            serde_json::Value::Null => Status::OnGoing,
            serde_json::Value::String(id) => Status::from_id(&id).unwrap_or_else(|| {
                tracing::warn!(status = %id, "unknown status, using ON_GOING");
                Status::OnGoing
            }),
            other => {
                tracing::warn!(status = %other, "non-string status, using ON_GOING");
                Status::OnGoing
            }
        })
    }
}

/// One editable hypothesis row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorRecord {
    pub id: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub cause: String,
    #[serde(default)]
    pub factor: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub evidence: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub is_priority: bool,
}

impl FactorRecord {
    pub fn new(id: i64, category: &str, cause: &str, factor: &str) -> Self {
        Self {
            id,
            category: category.to_string(),
            cause: cause.to_string(),
            factor: factor.to_string(),
            method: String::new(),
            evidence: String::new(),
            status: Status::OnGoing,
            is_priority: false,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn priority(mut self, is_priority: bool) -> Self {
        self.is_priority = is_priority;
        self
    }

    pub fn category_name(&self) -> &str {
        if self.category.is_empty() {
            UNCATEGORIZED
        } else {
            &self.category
        }
    }

    pub fn cause_name(&self) -> &str {
        if self.cause.is_empty() {
            UNSPECIFIED
        } else {
            &self.cause
        }
    }

    /// Text drawn next to the factor tick: status icon, factor text, and a
    /// star for priority rows.
    pub fn label(&self) -> String {
        let mut label = format!("{} {}", self.status.icon(), self.factor);
        if self.is_priority {
            label.push_str(" ⭐");
        }
        label
    }
}

/// Report metadata shown in the header and footer bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub project_name: String,
    pub owner: String,
    /// Free-form; "Final" is highlighted, anything else is drawn as a draft.
    pub stage: String,
    /// Preformatted date for the "Generated:" footer entry.
    pub generated_on: Option<String>,
}

impl Default for ReportMeta {
    fn default() -> Self {
        Self {
            project_name: "Root Cause Analysis".to_string(),
            owner: String::new(),
            stage: "Draft".to_string(),
            generated_on: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table_is_indexed_by_variant() {
        for status in Status::ALL {
            assert_eq!(Status::from_id(status.style().id), Some(status));
        }
        assert_eq!(Status::Finished.icon(), "✅");
        assert_eq!(Status::Exclude.style().bone_color, "#94a3b8");
    }

    #[test]
    fn unknown_or_missing_status_falls_back_to_on_going() {
        let row: FactorRecord =
            serde_json::from_str(r#"{"id":1,"status":"BOGUS"}"#).expect("row with bad status");
        assert_eq!(row.status, Status::OnGoing);

        let row: FactorRecord = serde_json::from_str(r#"{"id":2}"#).expect("bare row");
        assert_eq!(row.status, Status::OnGoing);

        let row: FactorRecord =
            serde_json::from_str(r#"{"id":3,"status":null}"#).expect("null status");
        assert_eq!(row.status, Status::OnGoing);
    }

    #[test]
    fn non_string_status_is_absorbed_per_row() {
        let rows: Vec<FactorRecord> = serde_json::from_str(
            r#"[{"id":1,"status":3},{"id":2,"status":{"x":1}},{"id":3,"status":"FINISHED"}]"#,
        )
        .expect("rows with odd statuses");
        let statuses: Vec<Status> = rows.iter().map(|r| r.status).collect();
        assert_eq!(statuses, [Status::OnGoing, Status::OnGoing, Status::Finished]);
    }

    #[test]
    fn camel_case_fields_round_trip_through_json() {
        let row: FactorRecord = serde_json::from_str(
            r#"{"id":7,"category":"A","cause":"B","factor":"C","status":"EXCLUDE","isPriority":true}"#,
        )
        .expect("row");
        assert!(row.is_priority);
        assert_eq!(row.status, Status::Exclude);

        let json = serde_json::to_value(&row).expect("serialize");
        assert_eq!(json["isPriority"], true);
        assert_eq!(json["status"], "EXCLUDE");
    }

    #[test]
    fn empty_names_use_sentinels() {
        let row = FactorRecord::new(1, "", "", "x");
        assert_eq!(row.category_name(), UNCATEGORIZED);
        assert_eq!(row.cause_name(), UNSPECIFIED);
    }

    #[test]
    fn label_has_icon_and_priority_marker() {
        let row = FactorRecord::new(1, "A", "B", "電池沒電")
            .with_status(Status::Finished)
            .priority(true);
        assert_eq!(row.label(), "✅ 電池沒電 ⭐");
        assert_eq!(FactorRecord::new(2, "A", "B", "x").label(), "⏳ x");
    }
}
