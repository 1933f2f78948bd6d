//! Path file loader
//!
//! Path files are CSV with a single header line followed by one segment per line. Two layouts are
//! accepted, the twelve column form, which takes its reach tolerance and ramp flags from the
//! [`SegmentDefaults`], and an extended form which carries them per segment.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use csv::{ErrorKind, ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use serde::{de, Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{AccuracyThreshold, PathError, PathGraph, Segment, SegmentDefaults};
use crate::loc::Pose;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Column names of the twelve column path file.
pub const PATH_HEADER: [&str; 12] = [
    "id", "success", "fail", "targetx", "targety", "targeth", "xygain", "hgain", "xymax", "xymin",
    "hmax", "useh",
];

/// Column names of the extended path file.
pub const EXTENDED_PATH_HEADER: [&str; 17] = [
    "id", "success", "fail", "targetx", "targety", "targeth", "xygain", "hgain", "xymax", "xymin",
    "hmax", "useh", "accx", "accy", "accz", "rampup", "rampdown",
];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One line of a path file.
///
/// The extended columns are absent from twelve column files, and may be left empty in extended
/// files, in either case the [`SegmentDefaults`] fill them in.
#[derive(Debug, Deserialize)]
struct SegmentRow {
    id: String,
    success: String,
    fail: String,
    targetx: f64,
    targety: f64,
    targeth: f64,
    xygain: f64,
    hgain: f64,
    xymax: f64,
    xymin: f64,
    hmax: f64,
    useh: Flag,

    #[serde(default)]
    accx: Option<f64>,
    #[serde(default)]
    accy: Option<f64>,
    #[serde(default)]
    accz: Option<f64>,
    #[serde(default)]
    rampup: Option<Flag>,
    #[serde(default)]
    rampdown: Option<Flag>,
}

/// Boolean column, `true` or `false` in any case.
#[derive(Debug, Copy, Clone)]
struct Flag(bool);

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a path file into a graph ready for traversal.
pub fn load_path_file<P: AsRef<Path>>(
    path: P,
    defaults: &SegmentDefaults,
) -> Result<PathGraph, PathError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(PathError::Io)?;

    let segments = parse_segments(file, defaults)?;

    info!(
        "Loaded {} segments from {}",
        segments.len(),
        path.display()
    );

    PathGraph::with_name(&path.display().to_string(), segments)
}

/// Parse every segment in a path file.
///
/// Any problem with the header or any row fails the whole parse.
pub fn parse_segments<R: Read>(
    reader: R,
    defaults: &SegmentDefaults,
) -> Result<Vec<Segment>, PathError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    // Header names are matched without case, rows are then read against the canonical names
    let headers = canonical_header(reader.headers().map_err(PathError::Csv)?)?;

    let mut segments = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| row_error(e, &headers))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let row: SegmentRow = record
            .deserialize(Some(&headers))
            .map_err(|e| row_error(e, &headers))?;

        let segment = row
            .into_segment(defaults)
            .map_err(|reason| PathError::BadRow { line, reason })?;

        debug!("Parsed segment \"{}\" on line {}", segment.id, line);

        segments.push(segment);
    }

    Ok(segments)
}

/// Match the header row against the two layouts, giving the canonical column names.
fn canonical_header(header: &StringRecord) -> Result<StringRecord, PathError> {
    let matches = |expected: &[&str]| {
        header.len() == expected.len()
            && header
                .iter()
                .zip(expected.iter())
                .all(|(h, e)| h.eq_ignore_ascii_case(e))
    };

    if matches(&PATH_HEADER[..]) {
        Ok(StringRecord::from(&PATH_HEADER[..]))
    } else if matches(&EXTENDED_PATH_HEADER[..]) {
        Ok(StringRecord::from(&EXTENDED_PATH_HEADER[..]))
    } else {
        Err(PathError::BadHeader(
            header.iter().collect::<Vec<_>>().join(","),
        ))
    }
}

/// Turn a CSV error on a row into a `BadRow` naming the offending column.
fn row_error(e: csv::Error, headers: &StringRecord) -> PathError {
    let line = e.position().map(|p| p.line()).unwrap_or(0);

    match e.kind() {
        ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => PathError::BadRow {
            line,
            reason: format!("expected {} fields but found {}", expected_len, len),
        },
        ErrorKind::Deserialize { err, .. } => {
            let column = err
                .field()
                .and_then(|i| headers.get(i as usize))
                .unwrap_or("?");

            PathError::BadRow {
                line,
                reason: format!("{}: {}", column, err.kind()),
            }
        }
        _ => PathError::Csv(e),
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SegmentRow {
    fn into_segment(self, defaults: &SegmentDefaults) -> Result<Segment, String> {
        if self.id.is_empty() {
            return Err("segment id is empty".into());
        }

        Ok(Segment {
            id: self.id,
            success: self.success,
            fail: self.fail,
            target: Pose::planar(self.targetx, self.targety),
            orientation_target: self.targeth,
            nav_gain: self.xygain,
            steering_gain: self.hgain,
            max_power: self.xymax,
            min_power: self.xymin,
            orientation_max: self.hmax,
            use_orientation: self.useh.0,
            ramp_up: self.rampup.map_or(defaults.ramp_up, |f| f.0),
            ramp_down: self.rampdown.map_or(defaults.ramp_down, |f| f.0),
            accuracy: AccuracyThreshold {
                x: self.accx.unwrap_or(defaults.accuracy.x),
                y: self.accy.unwrap_or(defaults.accuracy.y),
                z: self.accz.unwrap_or(defaults.accuracy.z),
            },
        })
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let field = String::deserialize(deserializer)?;

        if field.eq_ignore_ascii_case("true") {
            Ok(Flag(true))
        } else if field.eq_ignore_ascii_case("false") {
            Ok(Flag(false))
        } else {
            Err(de::Error::custom(format!(
                "\"{}\" is not true or false",
                field
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
