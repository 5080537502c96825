// Survey row domain model
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub String);

impl RowId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Readings that only exist for one kind of station.
///
/// A benchmark carries its known elevation, backsight and the derived
/// instrument height; a foresight only ever carries its rod reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RowKind {
    Benchmark {
        #[serde(rename = "knownElevation")]
        known_elevation: Option<f64>,
        bs: Option<f64>,
        hi: Option<f64>,
    },
    Foresight {
        fs: Option<f64>,
    },
}

impl RowKind {
    pub fn label(&self) -> &'static str {
        match self {
            RowKind::Benchmark { .. } => "BM",
            RowKind::Foresight { .. } => "FS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredRow")]
pub struct SurveyRow {
    pub id: RowId,
    pub row_number: u32,
    pub set_number: String,
    pub station_name: String,
    #[serde(flatten)]
    pub kind: RowKind,
    pub elevation: Option<f64>,
    pub note: String,
}

pub fn default_set_number() -> String {
    "SET-1".to_string()
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StationType {
    Benchmark,
    #[default]
    Foresight,
}

/// Row as found in a stored document: every reading on every row, and a
/// `type` that may be missing. Rows without a type are foresights.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRow {
    id: RowId,
    row_number: u32,
    #[serde(default = "default_set_number")]
    set_number: String,
    #[serde(default)]
    station_name: String,
    #[serde(rename = "type", default)]
    station_type: StationType,
    #[serde(default)]
    known_elevation: Option<f64>,
    #[serde(default)]
    bs: Option<f64>,
    #[serde(default)]
    hi: Option<f64>,
    #[serde(default)]
    fs: Option<f64>,
    #[serde(default)]
    elevation: Option<f64>,
    #[serde(default)]
    note: String,
}

impl From<StoredRow> for SurveyRow {
    fn from(stored: StoredRow) -> Self {
        let kind = match stored.station_type {
            StationType::Benchmark => RowKind::Benchmark {
                known_elevation: stored.known_elevation,
                bs: stored.bs,
                hi: stored.hi,
            },
            StationType::Foresight => RowKind::Foresight { fs: stored.fs },
        };

        Self {
            id: stored.id,
            row_number: stored.row_number,
            set_number: stored.set_number,
            station_name: stored.station_name,
            kind,
            elevation: stored.elevation,
            note: stored.note,
        }
    }
}

impl SurveyRow {
    pub fn benchmark(row_number: u32, set_number: String) -> Self {
        Self {
            id: RowId::generate(),
            row_number,
            set_number,
            station_name: String::new(),
            kind: RowKind::Benchmark {
                known_elevation: None,
                bs: None,
                hi: None,
            },
            elevation: None,
            note: String::new(),
        }
    }

    pub fn foresight(row_number: u32, set_number: String) -> Self {
        Self {
            id: RowId::generate(),
            row_number,
            set_number,
            station_name: String::new(),
            kind: RowKind::Foresight { fs: None },
            elevation: None,
            note: String::new(),
        }
    }

    pub fn is_benchmark(&self) -> bool {
        matches!(self.kind, RowKind::Benchmark { .. })
    }

    /// Instrument height derived for this row, if it is a benchmark that has one.
    pub fn hi(&self) -> Option<f64> {
        match self.kind {
            RowKind::Benchmark { hi, .. } => hi,
            RowKind::Foresight { .. } => None,
        }
    }

    pub fn known_elevation(&self) -> Option<f64> {
        match self.kind {
            RowKind::Benchmark { known_elevation, .. } => known_elevation,
            RowKind::Foresight { .. } => None,
        }
    }

    pub fn bs(&self) -> Option<f64> {
        match self.kind {
            RowKind::Benchmark { bs, .. } => bs,
            RowKind::Foresight { .. } => None,
        }
    }

    pub fn fs(&self) -> Option<f64> {
        match self.kind {
            RowKind::Foresight { fs } => fs,
            RowKind::Benchmark { .. } => None,
        }
    }

    /// Merge a partial edit into this row.
    ///
    /// Readings that do not belong to the row's kind are dropped; the kind
    /// itself never changes.
    pub fn apply(&mut self, patch: RowPatch) {
        if let Some(set_number) = patch.set_number {
            self.set_number = set_number;
        }
        if let Some(station_name) = patch.station_name {
            self.station_name = station_name;
        }
        if let Some(note) = patch.note {
            self.note = note;
        }

        match &mut self.kind {
            RowKind::Benchmark {
                known_elevation,
                bs,
                ..
            } => {
                if let Some(value) = patch.known_elevation {
                    *known_elevation = value;
                }
                if let Some(value) = patch.bs {
                    *bs = value;
                }
            }
            RowKind::Foresight { fs } => {
                if let Some(value) = patch.fs {
                    *fs = value;
                }
            }
        }
    }
}

/// Partial row edit. For the readings, a missing key leaves the value alone
/// while an explicit `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowPatch {
    pub set_number: Option<String>,
    pub station_name: Option<String>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub known_elevation: Option<Option<f64>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub bs: Option<Option<f64>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub fs: Option<Option<f64>>,
    pub note: Option<String>,
}
