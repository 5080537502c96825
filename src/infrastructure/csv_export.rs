// CSV rendering of a survey session for download
use crate::domain::survey_session::SurveySession;
use crate::infrastructure::config::ExportSettings;
use anyhow::Context;

const HEADERS: [&str; 12] = [
    "Site",
    "Date",
    "Surveyor",
    "Setup",
    "Type",
    "Station",
    "Known Elevation",
    "BS",
    "FS",
    "HI",
    "Elevation",
    "Note",
];

const BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// Render the session as one header record plus one record per row.
pub fn export_session(
    session: &SurveySession,
    settings: &ExportSettings,
) -> anyhow::Result<CsvExport> {
    let mut buffer = Vec::new();
    if settings.include_bom {
        buffer.extend_from_slice(BOM);
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(settings.delimiter())
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(buffer);

    writer.write_record(HEADERS)?;

    let date = session.date.format("%Y-%m-%d").to_string();
    for row in &session.rows {
        let readings = [
            row.known_elevation(),
            row.bs(),
            row.fs(),
            row.hi(),
            row.elevation,
        ]
        .map(format_number);

        writer.write_record([
            session.site_name.as_str(),
            date.as_str(),
            session.surveyor.as_str(),
            row.set_number.as_str(),
            row.kind.label(),
            row.station_name.as_str(),
            readings[0].as_str(),
            readings[1].as_str(),
            readings[2].as_str(),
            readings[3].as_str(),
            readings[4].as_str(),
            row.note.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    let content = String::from_utf8(bytes).context("CSV output is not UTF-8")?;

    Ok(CsvExport {
        filename: export_filename(session),
        content,
    })
}

fn format_number(value: Option<f64>) -> String {
    value.map(|v| format!("{:.3}", v)).unwrap_or_default()
}

/// `level_note_<site>_<YYYYMMDD>.csv` with anything but letters, digits and
/// underscores in the site name replaced by `_`.
pub fn export_filename(session: &SurveySession) -> String {
    let site: String = session
        .site_name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    let site = if site.is_empty() { "Site".to_string() } else { site };

    format!("level_note_{}_{}.csv", site, session.date.format("%Y%m%d"))
}
