use std::io::Read;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::types::{FactorRecord, ReportMeta, Status};
use crate::error::{Error, Result};

/// Format tag written into exported files.
pub const SNAPSHOT_VERSION: &str = "3.8-SaveConsistency";

pub const MIN_FONT_SIZE: f32 = 12.0;
pub const MAX_FONT_SIZE: f32 = 60.0;

/// Serializable editor state.
///
/// Field names follow the editor's JSON files. Missing fields take the same
/// defaults the editor starts with, so partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub problem: String,
    pub problem_desc: String,
    pub rows: Vec<FactorRecord>,
    pub notes: String,
    pub base_font_size: f32,
    pub project_name: String,
    pub owner: String,
    pub report_stage: String,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            problem: "Main Problem".to_string(),
            problem_desc: String::new(),
            rows: Vec::new(),
            notes: String::new(),
            base_font_size: 29.0,
            project_name: "Root Cause Analysis".to_string(),
            owner: String::new(),
            report_stage: "Draft".to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedSnapshot<'a> {
    #[serde(flatten)]
    snapshot: &'a Snapshot,
    version: &'static str,
    exported_at: String,
}

impl Snapshot {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reads a snapshot file; `-` reads standard input.
    pub fn load(path: &Path) -> Result<Self> {
        let content = if path.as_os_str() == "-" {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(Error::Stdin)?;
            buffer
        } else {
            std::fs::read_to_string(path).map_err(|source| Error::Read {
                path: path.to_path_buf(),
                source,
            })?
        };
        let snapshot = Self::from_json(&content)?;
        tracing::debug!(rows = snapshot.rows.len(), problem = %snapshot.problem, "loaded snapshot");
        Ok(snapshot)
    }

    /// Writes the export JSON to `path`, or into `path/<suggested name>` when
    /// `path` is a directory. Returns the file written.
    pub fn save(&self, path: &Path, exported_at: DateTime<Utc>) -> Result<std::path::PathBuf> {
        let target = if path.is_dir() {
            path.join(self.suggested_filename())
        } else {
            path.to_path_buf()
        };
        std::fs::write(&target, self.to_export_json(exported_at)?).map_err(|source| {
            Error::Write {
                path: target.clone(),
                source,
            }
        })?;
        Ok(target)
    }

    /// Pretty JSON with `version` and `exportedAt` stamped in.
    pub fn to_export_json(&self, exported_at: DateTime<Utc>) -> Result<String> {
        let exported = ExportedSnapshot {
            snapshot: self,
            version: SNAPSHOT_VERSION,
            exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        Ok(serde_json::to_string_pretty(&exported)?)
    }

    /// `RCA_<problem>.json`, with non-alphanumeric characters replaced and the
    /// stem cut to 20 characters.
    pub fn suggested_filename(&self) -> String {
        let stem: String = self
            .problem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .take(20)
            .collect();
        if stem.is_empty() {
            "RCA_export.json".to_string()
        } else {
            format!("RCA_{}.json", stem)
        }
    }

    /// Font size limited to the range the editor's slider allows.
    pub fn clamped_font_size(&self) -> f32 {
        let size = if self.base_font_size.is_finite() {
            self.base_font_size
        } else {
            Self::default().base_font_size
        };
        let clamped = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        if clamped != self.base_font_size {
            tracing::warn!(
                requested = self.base_font_size,
                used = clamped,
                "base font size out of range"
            );
        }
        clamped
    }

    pub fn report_meta(&self, generated_on: Option<String>) -> ReportMeta {
        ReportMeta {
            project_name: self.project_name.clone(),
            owner: self.owner.clone(),
            stage: self.report_stage.clone(),
            generated_on,
        }
    }

    /// The water heater example the editor opens with.
    pub fn demo() -> Self {
        let row = |id: i64,
                   category: &str,
                   cause: &str,
                   factor: &str,
                   method: &str,
                   evidence: &str,
                   status: Status,
                   priority: bool| {
            let mut row = FactorRecord::new(id, category, cause, factor)
                .with_status(status)
                .priority(priority);
            row.method = method.to_string();
            row.evidence = evidence.to_string();
            row
        };

        Self {
            problem: "熱水器不熱".to_string(),
            problem_desc: "熱水器完全沒有反應，有更換過電池".to_string(),
            rows: vec![
                row(
                    1,
                    "能源/電力",
                    "點火系統供電",
                    "電池沒電 (更換測試)",
                    "更換全新電池",
                    "成功點燃",
                    Status::Finished,
                    true,
                ),
                row(
                    2,
                    "能源/電力",
                    "點火系統供電",
                    "電池盒彈簧嚴重鏽蝕",
                    "目視檢查",
                    "正常",
                    Status::Exclude,
                    false,
                ),
                row(
                    21,
                    "能源/電力",
                    "點火系統供電",
                    "電池接點接觸不良",
                    "清潔接點",
                    "無效",
                    Status::Exclude,
                    false,
                ),
                row(
                    3,
                    "能源/電力",
                    "瓦斯供應異常",
                    "瓦斯桶沒氣",
                    "搖晃確認",
                    "有氣",
                    Status::Exclude,
                    false,
                ),
                row(
                    4,
                    "設備硬體",
                    "點火針故障",
                    "點火針積碳",
                    "清潔測試",
                    "無效",
                    Status::CantExecute,
                    false,
                ),
                row(
                    5,
                    "設備硬體",
                    "水盤異常",
                    "皮膜破裂",
                    "拆機",
                    "待確認",
                    Status::OnGoing,
                    true,
                ),
                row(
                    6,
                    "人為操作",
                    "模式設定錯誤",
                    "誤切到夏天模式",
                    "檢查面板",
                    "正常",
                    Status::Exclude,
                    false,
                ),
            ],
            notes: "<div>Notes...</div>".to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn partial_snapshot_takes_defaults() {
        let snapshot =
            Snapshot::from_json(r#"{"problem":"Leak","rows":[{"id":1,"factor":"seal"}]}"#)
                .expect("partial snapshot");
        assert_eq!(snapshot.problem, "Leak");
        assert_eq!(snapshot.base_font_size, 29.0);
        assert_eq!(snapshot.report_stage, "Draft");
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.rows[0].category_name(), "Uncategorized");
    }

    #[test]
    fn numeric_status_does_not_reject_the_snapshot() {
        let snapshot = Snapshot::from_json(
            r#"{"problem":"Leak","rows":[{"id":1,"status":3},{"id":2,"status":"EXCLUDE"}]}"#,
        )
        .expect("snapshot with numeric status");
        assert_eq!(snapshot.rows[0].status, Status::OnGoing);
        assert_eq!(snapshot.rows[1].status, Status::Exclude);
    }

    #[test]
    fn export_stamps_version_and_time() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).single().expect("valid time");
        let json = Snapshot::demo().to_export_json(at).expect("export");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse export");

        assert_eq!(value["version"], SNAPSHOT_VERSION);
        assert_eq!(value["exportedAt"], "2026-10-16T08:30:00.000Z");
        assert_eq!(value["baseFontSize"], 29.0);
        assert_eq!(value["rows"][0]["isPriority"], true);

        let reloaded = Snapshot::from_json(&json).expect("exported file loads back");
        assert_eq!(reloaded, Snapshot::demo());
    }

    #[test]
    fn suggested_filename_sanitizes_problem() {
        let mut snapshot = Snapshot::default();
        snapshot.problem = "Pump #3 overheats at night!".to_string();
        assert_eq!(snapshot.suggested_filename(), "RCA_Pump__3_overheats_at.json");

        snapshot.problem = "熱水器".to_string();
        assert_eq!(snapshot.suggested_filename(), "RCA____.json");

        snapshot.problem.clear();
        assert_eq!(snapshot.suggested_filename(), "RCA_export.json");
    }

    #[test]
    fn save_into_directory_uses_suggested_name() {
        let dir = std::env::temp_dir().join(format!("fishbone-save-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let mut snapshot = Snapshot::demo();
        snapshot.problem = "Heater cold".to_string();

        let written = snapshot.save(&dir, Utc::now()).expect("save");
        assert_eq!(written, dir.join("RCA_Heater_cold.json"));
        let loaded = Snapshot::load(&written).expect("load");
        assert_eq!(loaded, snapshot);

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Snapshot::load(Path::new("/definitely/not/here.json")).expect_err("missing");
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn font_size_is_clamped_to_slider_range() {
        let mut snapshot = Snapshot::default();
        snapshot.base_font_size = 4.0;
        assert_eq!(snapshot.clamped_font_size(), MIN_FONT_SIZE);
        snapshot.base_font_size = 99.0;
        assert_eq!(snapshot.clamped_font_size(), MAX_FONT_SIZE);
        snapshot.base_font_size = f32::NAN;
        assert_eq!(snapshot.clamped_font_size(), 29.0);
    }

    #[test]
    fn demo_ids_are_unique() {
        let demo = Snapshot::demo();
        let mut ids: Vec<i64> = demo.rows.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), demo.rows.len());
    }
}
