// Instrument-height leveling computations
use super::survey_row::{RowKind, SurveyRow};

/// Result of one recalculation pass over a session's rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Recalculation {
    pub rows: Vec<SurveyRow>,
    pub current_hi: Option<f64>,
}

/// Round to millimetre precision.
///
/// Works from the exact decimal expansion of the stored binary value, so
/// `1.0005` (really 1.000499...) goes down. Exact ties round away from zero.
/// Zero is always positive zero.
pub fn round_mm(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let magnitude = value.abs();
    let exact = format!("{:.40}", magnitude);
    let tie = exact
        .split_once('.')
        .is_some_and(|(_, frac)| frac[3..].starts_with('5') && frac[4..].bytes().all(|b| b == b'0'));

    let rounded = if tie {
        ((magnitude * 1000.0).floor() + 1.0) / 1000.0
    } else {
        format!("{:.3}", magnitude).parse().unwrap_or(magnitude)
    };

    let signed = if value < 0.0 { -rounded } else { rounded };
    if signed == 0.0 { 0.0 } else { signed }
}

/// Derive instrument heights and elevations for every row, in order.
///
/// The active HI only changes when a benchmark row has both its known
/// elevation and backsight; an incomplete benchmark leaves the previous HI
/// in force for the foresights that follow it.
pub fn recalculate(rows: Vec<SurveyRow>) -> Recalculation {
    let mut active_hi: Option<f64> = None;

    let rows = rows
        .into_iter()
        .map(|mut row| {
            match &mut row.kind {
                RowKind::Benchmark {
                    known_elevation,
                    bs,
                    hi,
                } => {
                    *hi = match (*known_elevation, *bs) {
                        (Some(known), Some(bs)) => {
                            let computed = round_mm(known + bs);
                            active_hi = Some(computed);
                            Some(computed)
                        }
                        _ => None,
                    };
                    row.elevation = *known_elevation;
                }
                RowKind::Foresight { fs } => {
                    row.elevation = match (active_hi, *fs) {
                        (Some(hi), Some(fs)) => Some(round_mm(hi - fs)),
                        _ => None,
                    };
                }
            }
            row
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        "Recalculated {} rows, current HI: {:?}",
        rows.len(),
        active_hi
    );

    Recalculation {
        rows,
        current_hi: active_hi,
    }
}

/// Advisory check for a foresight reading against the HI in force.
///
/// A reading larger than the HI would put the point below datum. This never
/// blocks the edit; the caller decides how to surface it.
pub fn validate_foresight(fs: f64, current_hi: Option<f64>) -> Option<String> {
    match current_hi {
        Some(hi) if fs > hi => Some(format!(
            "Warning: FS ({:.3}) is greater than HI ({:.3}); the elevation will be negative.",
            fs, hi
        )),
        _ => None,
    }
}
