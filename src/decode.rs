//! Graphite plaintext protocol decoding.
//!
//! Each non-blank line is one record, `<path> <value> <timestamp>`, with
//! fields separated by whitespace and the timestamp in epoch seconds. A
//! malformed line fails the whole input.

use crate::{DecodeError, DecodeErrorKind, Metric};
use chrono::{DateTime, Utc};
use std::io::Read;

/// Decode all records in `text`.
///
/// ```
/// use metricrule::parse_metrics;
///
/// let metrics = parse_metrics("local.random.diceroll 4 1623988183\n").unwrap();
/// assert_eq!(metrics[0].value, 4.0);
/// assert_eq!(metrics[0].timestamp.timestamp(), 1623988183);
/// ```
pub fn parse_metrics(text: &str) -> Result<Vec<Metric>, DecodeError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| decode_line(line).map_err(|kind| DecodeError::new(idx + 1, kind)))
        .collect()
}

/// Read a whole stream from `reader` and decode it.
pub fn read_metrics(mut reader: impl Read) -> crate::Result<Vec<Metric>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(parse_metrics(&text)?)
}

fn decode_line(line: &str) -> Result<Metric, DecodeErrorKind> {
    let Some(caps) = regex!(r"^\s*(\S+)\s+(\S+)\s+(\S+)\s*$").captures(line) else {
        return Err(DecodeErrorKind::FieldCount(line.split_whitespace().count()));
    };

    let value = &caps[2];
    let value: f64 = value.parse().map_err(|_| DecodeErrorKind::InvalidValue(value.to_string()))?;

    let timestamp = &caps[3];
    let timestamp = timestamp
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .ok_or_else(|| DecodeErrorKind::InvalidTimestamp(timestamp.to_string()))?;

    Ok(Metric::new(&caps[1], value, timestamp))
}
