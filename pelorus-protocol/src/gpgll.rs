//! GPGLL record classification and decoding
//!
//! `$GPGLL` carries geographic position and UTC time-of-fix:
//!
//! ```text
//! $GPGLL,<lat>,<N|S>,<lon>,<E|W>,<hhmmss.ss>,<A|V>,<mode>*<checksum>
//! ```
//!
//! Coordinates come in sexagesimal form, degrees concatenated with
//! decimal minutes (`4043.9620` is 40° 43.9620'). A receiver that has
//! not acquired a fix yet sends the sentence with empty coordinate
//! fields but a valid timestamp, so a partially filled record still
//! renders, with placeholders for whatever is missing. The checksum is
//! not validated; everything from the `*` on is ignored.

use core::fmt::{self, Write};

use heapless::String;

/// Sentence identifier the classifier accepts, trailing separator
/// included.
pub const GPGLL_PREFIX: &str = "$GPGLL,";

/// Hours added to UTC when rendering time-of-day (UTC+8).
pub const TIMEZONE_OFFSET_HOURS: i32 = 8;

/// Shown in place of a coordinate that has not been acquired yet.
const WAITING: &str = "Waiting for data...";

/// Shown in place of a missing or malformed time field.
const UNKNOWN_TIME: &str = "--:--:--";

/// Lat, N/S, lon, E/W, time, status, mode.
const MAX_FIELDS: usize = 7;

/// The composed report did not fit the caller's buffer.
///
/// This is the decoder's only hard failure; everything else degrades to
/// placeholder text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Truncated;

/// Field slices of one GPGLL sentence.
///
/// Borrowed from the sentence bytes; nothing persists between records.
/// Fields the sentence did not carry are empty strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpgllFix<'a> {
    pub latitude: &'a str,
    pub latitude_hemisphere: &'a str,
    pub longitude: &'a str,
    pub longitude_hemisphere: &'a str,
    pub utc_time: &'a str,
}

impl<'a> GpgllFix<'a> {
    /// Classify a record and slice out its fields.
    ///
    /// Returns `None` for anything that is not a GPGLL sentence: wrong
    /// prefix, or bytes that are not text at all. Missing trailing
    /// fields are legal and come back empty.
    pub fn parse(record: &'a [u8]) -> Option<Self> {
        let text = core::str::from_utf8(record).ok()?;
        let data = text.strip_prefix(GPGLL_PREFIX)?;
        // A `*` ends the data fields; the checksum after it is ignored.
        let data = match data.split_once('*') {
            Some((fields, _checksum)) => fields,
            None => data,
        };

        let mut fields = [""; MAX_FIELDS];
        for (slot, field) in fields.iter_mut().zip(data.split(',')) {
            *slot = field;
        }

        Some(Self {
            latitude: fields[0],
            latitude_hemisphere: fields[1],
            longitude: fields[2],
            longitude_hemisphere: fields[3],
            utc_time: fields[4],
        })
    }

    /// Render the fix as one report line:
    ///
    /// ```text
    /// HH:MM:SS | Lat: <decimal> deg, <N|S|-> | Long: <decimal> deg, <E|W|->
    /// ```
    ///
    /// Missing or malformed fields render as placeholders rather than
    /// failing the record; the one hard failure is output that does not
    /// fit `out`.
    pub fn render<const N: usize>(&self, out: &mut String<N>) -> Result<(), Truncated> {
        self.write_report(out).map_err(|_| Truncated)
    }

    fn write_report<const N: usize>(&self, out: &mut String<N>) -> fmt::Result {
        match local_time_of_day(self.utc_time) {
            Some((h, m, s)) => write!(out, "{:02}:{:02}:{:02}", h, m, s)?,
            None => out.write_str(UNKNOWN_TIME)?,
        }
        out.write_str(" | ")?;
        write_coordinate(out, "Lat", self.latitude, 2, ['N', 'S'], self.latitude_hemisphere)?;
        out.write_str(" | ")?;
        write_coordinate(out, "Long", self.longitude, 3, ['E', 'W'], self.longitude_hemisphere)
    }
}

/// `hhmmss(.ss)` → local (hour, minute, second).
///
/// Fractional seconds are ignored. The timezone shift wraps across the
/// day boundary; the date is not tracked, only time-of-day.
fn local_time_of_day(utc: &str) -> Option<(u32, u32, u32)> {
    let b = utc.as_bytes();
    if b.len() < 6 || !b[..6].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let two = |i: usize| (b[i] - b'0') as i32 * 10 + (b[i + 1] - b'0') as i32;
    let hour = (two(0) + TIMEZONE_OFFSET_HOURS).rem_euclid(24);
    Some((hour as u32, two(2) as u32, two(4) as u32))
}

/// `DDmm.mmmm` / `DDDmm.mmmm` → decimal degrees, magnitude only.
///
/// The hemisphere letter carries the sign information; this value is
/// always non-negative. `None` for a field that is empty, shorter than
/// its degree part, or not a decimal number.
fn coordinate_degrees(value: &str, deg_digits: usize) -> Option<f64> {
    if value.len() < deg_digits || !value.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    let degrees: u32 = value[..deg_digits].parse().ok()?;
    let minutes: f64 = if value.len() > deg_digits {
        value[deg_digits..].parse().ok()?
    } else {
        0.0
    };
    Some(degrees as f64 + minutes / 60.0)
}

fn write_coordinate<const N: usize>(
    out: &mut String<N>,
    label: &str,
    value: &str,
    deg_digits: usize,
    allowed: [char; 2],
    hemisphere_field: &str,
) -> fmt::Result {
    match coordinate_degrees(value, deg_digits) {
        Some(degrees) => {
            let hemisphere = match hemisphere_field.chars().next() {
                Some(c) if c == allowed[0] || c == allowed[1] => c,
                _ => '-',
            };
            write!(out, "{}: {:.6} deg, {}", label, degrees, hemisphere)
        }
        None => write!(out, "{}: {}, -", label, WAITING),
    }
}
