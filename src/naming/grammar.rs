//! Hand-written anchored grammars for file stems.
//!
//! Date grammar (whole stem, lazy prefix and suffix, earliest date wins):
//!
//! ```text
//! prefix  year[1-3]ddd  -?  mm  -?  dd  ( [-_ ]? HH [:.-]? MM ( [:.-]? SS )? )?  suffix
//! ```
//!
//! Marker grammar (suffix only, longest marker wins):
//!
//! ```text
//! unrelated  ( -[0-9a-f]{16} )?  ( -[0-9]{1,3} )?
//! ```
//!
//! Both are purely syntactic. Calendar validity is the date resolver's business.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::hash::DIGEST_LEN;

const HEX_LEN: usize = DIGEST_LEN * 2;
const MAX_COUNTER_DIGITS: usize = 3;

/// A date (and maybe time) found inside a stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch<'a> {
    pub prefix: &'a str,
    pub suffix: &'a str,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
}

impl DateMatch<'_> {
    /// The matched fields as a timestamp; missing time fields count as zero.
    /// `None` when the digits do not form a real calendar date or clock time.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day)?;
        let time = NaiveTime::from_hms_opt(
            self.hour.unwrap_or(0),
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
        )?;
        Some(date.and_time(time))
    }
}

/// Conflict marker recovered from the tail of a suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Marker {
    pub hash: bool,
    pub counter: Option<u32>,
}

impl Marker {
    /// Ordinal the marker encodes: `-hash-c` is c+1, `-hash` is 1, `-c` is c.
    pub fn ordinal(&self) -> u32 {
        match (self.hash, self.counter) {
            (true, Some(c)) => c + 1,
            (true, None) => 1,
            (false, Some(c)) => c,
            (false, None) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.hash && self.counter.is_none()
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    fn digits(&mut self, n: usize) -> Option<u32> {
        let end = self.pos + n;
        let chunk = self.bytes.get(self.pos..end)?;
        if !chunk.iter().all(u8::is_ascii_digit) {
            return None;
        }
        self.pos = end;
        Some(chunk.iter().fold(0, |acc, b| acc * 10 + u32::from(b - b'0')))
    }

    fn eat_any(&mut self, set: &[u8]) -> bool {
        match self.bytes.get(self.pos) {
            Some(b) if set.contains(b) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }
}

/// Try both branches of an optional separator, present first.
fn with_optional<T>(
    cur: &Cursor<'_>,
    set: &[u8],
    mut rest: impl FnMut(Cursor<'_>) -> Option<T>,
) -> Option<T> {
    let mut with = Cursor::new(cur.bytes, cur.pos);
    if with.eat_any(set)
        && let Some(found) = rest(with)
    {
        return Some(found);
    }
    rest(Cursor::new(cur.bytes, cur.pos))
}

type Clock = (u32, u32, Option<u32>, usize);

fn time_group(cur: &Cursor<'_>) -> Option<Clock> {
    with_optional(cur, b"-_ ", |mut c| {
        let hour = c.digits(2)?;
        with_optional(&c, b":.-", |mut c| {
            let minute = c.digits(2)?;
            let seconds = with_optional(&c, b":.-", |mut c| {
                let second = c.digits(2)?;
                Some((second, c.pos))
            });
            Some(match seconds {
                Some((second, end)) => (hour, minute, Some(second), end),
                None => (hour, minute, None, c.pos),
            })
        })
    })
}

fn date_at(stem: &str, start: usize) -> Option<DateMatch<'_>> {
    let bytes = stem.as_bytes();
    if !matches!(bytes.get(start), Some(b'1'..=b'3')) {
        return None;
    }
    let mut cur = Cursor::new(bytes, start);
    let year = cur.digits(4)? as i32;

    let (month, day, end) = with_optional(&cur, b"-", |mut c| {
        let month = c.digits(2)?;
        with_optional(&c, b"-", |mut c| {
            let day = c.digits(2)?;
            Some((month, day, c.pos))
        })
    })?;

    let clock = time_group(&Cursor::new(bytes, end));
    let end = clock.map_or(end, |(_, _, _, e)| e);

    Some(DateMatch {
        prefix: &stem[..start],
        suffix: &stem[end..],
        year,
        month,
        day,
        hour: clock.map(|c| c.0),
        minute: clock.map(|c| c.1),
        second: clock.and_then(|c| c.2),
    })
}

/// Find the earliest date in `stem`.
pub fn extract_date(stem: &str) -> Option<DateMatch<'_>> {
    (0..stem.len()).find_map(|start| date_at(stem, start))
}

fn marker_at(tail: &str) -> Option<Marker> {
    let bytes = tail.as_bytes();

    let counter = |from: usize| -> Option<Option<u32>> {
        if from == bytes.len() {
            return Some(None);
        }
        let rest = &bytes[from..];
        let digits = &rest[1..];
        if rest[0] == b'-'
            && (1..=MAX_COUNTER_DIGITS).contains(&digits.len())
            && digits.iter().all(u8::is_ascii_digit)
        {
            let n = digits.iter().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'));
            return Some(Some(n));
        }
        None
    };

    let hex_end = 1 + HEX_LEN;
    if bytes.len() >= hex_end
        && bytes[0] == b'-'
        && bytes[1..hex_end].iter().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        && let Some(c) = counter(hex_end)
    {
        return Some(Marker { hash: true, counter: c });
    }
    counter(0).map(|c| Marker { hash: false, counter: c })
}

/// Split `suffix` into the unrelated text and a trailing conflict marker.
pub fn split_marker(suffix: &str) -> (&str, Marker) {
    for (start, _) in suffix.char_indices() {
        if let Some(marker) = marker_at(&suffix[start..]) {
            return (&suffix[..start], marker);
        }
    }
    (suffix, Marker::default())
}
