// Survey session aggregate - owns the rows and keeps derived values current
use super::error::SurveyError;
use super::leveling::{self, Recalculation};
use super::survey_row::{default_set_number, RowId, RowPatch, SurveyRow};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySession {
    pub id: String,
    #[serde(default)]
    pub site_name: String,
    #[serde(default = "today")]
    pub date: NaiveDate,
    #[serde(default)]
    pub surveyor: String,
    #[serde(default)]
    pub rows: Vec<SurveyRow>,
    #[serde(rename = "currentHI", default)]
    pub current_hi: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Partial update of the session header fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadataPatch {
    pub site_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub surveyor: Option<String>,
}

impl Default for SurveySession {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl SurveySession {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            site_name: String::new(),
            date: now.date_naive(),
            surveyor: String::new(),
            rows: Vec::new(),
            current_hi: None,
            last_updated: Some(now),
        }
    }

    pub fn row(&self, id: &RowId) -> Option<&SurveyRow> {
        self.rows.iter().find(|r| &r.id == id)
    }

    /// True once any benchmark row has produced an instrument height.
    pub fn has_instrument_height(&self) -> bool {
        self.rows.iter().any(|r| r.hi().is_some())
    }

    pub fn update_metadata(&mut self, patch: SessionMetadataPatch, now: DateTime<Utc>) {
        if let Some(site_name) = patch.site_name {
            self.site_name = site_name;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(surveyor) = patch.surveyor {
            self.surveyor = surveyor;
        }
        self.last_updated = Some(now);
    }

    pub fn append_benchmark(&mut self, now: DateTime<Utc>) -> RowId {
        let setups = self.rows.iter().filter(|r| r.is_benchmark()).count();
        let row = SurveyRow::benchmark(self.next_row_number(), format!("SET-{}", setups + 1));
        let id = row.id.clone();
        self.rows.push(row);
        self.recalculate();
        self.last_updated = Some(now);
        id
    }

    /// Append a foresight row; refused until some benchmark has an HI.
    pub fn append_foresight(&mut self, now: DateTime<Utc>) -> Result<RowId, SurveyError> {
        if !self.has_instrument_height() {
            return Err(SurveyError::NoInstrumentHeight);
        }

        let set_number = self
            .rows
            .iter()
            .rev()
            .find(|r| r.is_benchmark())
            .map(|r| r.set_number.clone())
            .unwrap_or_else(default_set_number);
        let row = SurveyRow::foresight(self.next_row_number(), set_number);
        let id = row.id.clone();
        self.rows.push(row);
        self.recalculate();
        self.last_updated = Some(now);
        Ok(id)
    }

    pub fn update_row(
        &mut self,
        id: &RowId,
        patch: RowPatch,
        now: DateTime<Utc>,
    ) -> Result<(), SurveyError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| SurveyError::RowNotFound(id.clone()))?;
        row.apply(patch);
        self.recalculate();
        self.last_updated = Some(now);
        Ok(())
    }

    pub fn delete_row(&mut self, id: &RowId, now: DateTime<Utc>) -> Result<(), SurveyError> {
        let before = self.rows.len();
        self.rows.retain(|r| &r.id != id);
        if self.rows.len() == before {
            return Err(SurveyError::RowNotFound(id.clone()));
        }

        self.renumber();
        self.recalculate();
        self.last_updated = Some(now);
        Ok(())
    }

    /// Number rows 1..n in their current order.
    pub fn renumber(&mut self) {
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.row_number = index as u32 + 1;
        }
    }

    /// Advisory for a foresight reading against the HI currently in force.
    pub fn validate_foresight(&self, fs: f64) -> Option<String> {
        leveling::validate_foresight(fs, self.current_hi)
    }

    /// Rerun the engine over every row. Called after each mutation and on
    /// load, so stored derived values are never trusted.
    pub fn recalculate(&mut self) {
        let Recalculation { rows, current_hi } =
            leveling::recalculate(std::mem::take(&mut self.rows));
        self.rows = rows;
        self.current_hi = current_hi;
    }

    fn next_row_number(&self) -> u32 {
        self.rows.len() as u32 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 9, 30, 0).single().expect("valid timestamp")
    }

    fn set_benchmark(session: &mut SurveySession, id: &RowId, known: f64, bs: f64) {
        session
            .update_row(
                id,
                RowPatch {
                    known_elevation: Some(Some(known)),
                    bs: Some(Some(bs)),
                    ..Default::default()
                },
                now(),
            )
            .unwrap();
    }

    fn set_fs(session: &mut SurveySession, id: &RowId, fs: f64) {
        session
            .update_row(
                id,
                RowPatch {
                    fs: Some(Some(fs)),
                    ..Default::default()
                },
                now(),
            )
            .unwrap();
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = SurveySession::new(now());

        assert!(session.rows.is_empty());
        assert_eq!(session.current_hi, None);
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        assert_eq!(session.last_updated, Some(now()));
    }

    #[test]
    fn test_append_benchmark_numbers_setups() {
        let mut session = SurveySession::new(now());
        let first = session.append_benchmark(now());
        let second = session.append_benchmark(now());

        assert_eq!(session.row(&first).unwrap().set_number, "SET-1");
        assert_eq!(session.row(&second).unwrap().set_number, "SET-2");
        assert_eq!(session.row(&second).unwrap().row_number, 2);
    }

    #[test]
    fn test_append_foresight_requires_hi() {
        let mut session = SurveySession::new(now());
        assert_eq!(
            session.append_foresight(now()),
            Err(SurveyError::NoInstrumentHeight)
        );

        let bm = session.append_benchmark(now());
        assert_eq!(
            session.append_foresight(now()),
            Err(SurveyError::NoInstrumentHeight)
        );
        assert_eq!(session.rows.len(), 1);

        set_benchmark(&mut session, &bm, 100.0, 1.5);
        let fs = session.append_foresight(now()).unwrap();
        let row = session.row(&fs).unwrap();
        assert_eq!(row.row_number, 2);
        assert_eq!(row.set_number, "SET-1");
        assert_eq!(row.elevation, None);
    }

    #[test]
    fn test_foresight_inherits_latest_setup() {
        let mut session = SurveySession::new(now());
        let bm1 = session.append_benchmark(now());
        set_benchmark(&mut session, &bm1, 100.0, 1.5);
        let bm2 = session.append_benchmark(now());
        set_benchmark(&mut session, &bm2, 99.0, 1.2);

        let fs = session.append_foresight(now()).unwrap();
        assert_eq!(session.row(&fs).unwrap().set_number, "SET-2");
    }

    #[test]
    fn test_update_row_recalculates() {
        let mut session = SurveySession::new(now());
        let bm = session.append_benchmark(now());
        set_benchmark(&mut session, &bm, 100.0, 1.5);
        let fs = session.append_foresight(now()).unwrap();
        set_fs(&mut session, &fs, 1.234);

        assert_eq!(session.current_hi, Some(101.5));
        assert_eq!(session.row(&fs).unwrap().elevation, Some(100.266));

        set_benchmark(&mut session, &bm, 100.0, 2.0);
        assert_eq!(session.current_hi, Some(102.0));
        assert_eq!(session.row(&fs).unwrap().elevation, Some(100.766));
    }

    #[test]
    fn test_update_unknown_row() {
        let mut session = SurveySession::new(now());
        let missing = RowId("missing".to_string());

        assert_eq!(
            session.update_row(&missing, RowPatch::default(), now()),
            Err(SurveyError::RowNotFound(missing))
        );
    }

    #[test]
    fn test_delete_row_renumbers() {
        let mut session = SurveySession::new(now());
        let bm = session.append_benchmark(now());
        set_benchmark(&mut session, &bm, 100.0, 1.5);
        let a = session.append_foresight(now()).unwrap();
        let b = session.append_foresight(now()).unwrap();
        let c = session.append_foresight(now()).unwrap();

        session.delete_row(&a, now()).unwrap();

        let ids: Vec<&RowId> = session.rows.iter().map(|r| &r.id).collect();
        assert_eq!(ids, vec![&bm, &b, &c]);
        let numbers: Vec<u32> = session.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_renumber_closes_gaps() {
        let mut session = SurveySession::new(now());
        let bm = session.append_benchmark(now());
        set_benchmark(&mut session, &bm, 100.0, 1.5);
        session.append_foresight(now()).unwrap();
        session.append_foresight(now()).unwrap();
        session.rows[0].row_number = 3;
        session.rows[1].row_number = 7;
        session.rows[2].row_number = 7;

        session.renumber();

        let numbers: Vec<u32> = session.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_delete_benchmark_clears_downstream_elevations() {
        let mut session = SurveySession::new(now());
        let bm = session.append_benchmark(now());
        set_benchmark(&mut session, &bm, 100.0, 1.5);
        let fs = session.append_foresight(now()).unwrap();
        set_fs(&mut session, &fs, 1.0);

        session.delete_row(&bm, now()).unwrap();

        assert_eq!(session.current_hi, None);
        assert_eq!(session.rows[0].elevation, None);
        assert_eq!(session.rows[0].row_number, 1);
    }

    #[test]
    fn test_delete_unknown_row_leaves_rows() {
        let mut session = SurveySession::new(now());
        session.append_benchmark(now());
        let missing = RowId("missing".to_string());

        assert_eq!(
            session.delete_row(&missing, now()),
            Err(SurveyError::RowNotFound(missing))
        );
        assert_eq!(session.rows.len(), 1);
    }

    #[test]
    fn test_update_metadata() {
        let mut session = SurveySession::new(now());
        session.update_metadata(
            SessionMetadataPatch {
                site_name: Some("North Yard".to_string()),
                surveyor: Some("K. Sato".to_string()),
                ..Default::default()
            },
            now(),
        );

        assert_eq!(session.site_name, "North Yard");
        assert_eq!(session.surveyor, "K. Sato");
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
    }

    #[test]
    fn test_validate_foresight_uses_current_hi() {
        let mut session = SurveySession::new(now());
        assert_eq!(session.validate_foresight(5.0), None);

        let bm = session.append_benchmark(now());
        set_benchmark(&mut session, &bm, 100.0, 1.5);

        assert!(session.validate_foresight(102.0).is_some());
        assert_eq!(session.validate_foresight(1.0), None);
    }

    #[test]
    fn test_session_document_round_trip_keys() {
        let session = SurveySession::new(now());
        let json = serde_json::to_value(&session).unwrap();

        assert_eq!(json["date"], "2026-04-01");
        assert!(json.get("currentHI").is_some());
        assert!(json.get("siteName").is_some());
    }
}
