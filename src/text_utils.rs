use std::ops::Index;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Parses a publication timestamp. Time and offset are optional: a bare
/// `YYYY-MM-DD` means midnight at +00:00.
pub fn parse_date_time(buf: &str) -> Result<DateTime<FixedOffset>, String> {
    lazy_static! {
        static ref DATE_TIME_REGEX: Regex = Regex::new(
            r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{1,2})(?::(\d{1,2})(?:\.\d{1,9})?)?)?(?: ?(Z|[+-]\d{2}:?\d{2}))?$"
        ).unwrap();
    }

    let buf = buf.trim();
    let Some(caps) = DATE_TIME_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date time {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);

    // We are using the regex approach to make it more flexible
    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;

    let (h, mn, s) = match caps.get(4) {
        Some(hour) => {
            let h = to_u32(hour.as_str())?;
            let mn = to_u32(caps.index(5))?;
            let s = match caps.get(6) {
                Some(sec) => to_u32(sec.as_str())?,
                None => 0,
            };
            (h, mn, s)
        }
        None => (0, 0, 0),
    };

    let offset = match caps.get(7) {
        Some(tz) => parse_offset(tz.as_str(), buf)?,
        None => utc_offset(),
    };

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid calendar date in {}", buf))?;
    let time = NaiveTime::from_hms_opt(h, mn, s)
        .ok_or_else(|| format!("Invalid time of day in {}", buf))?;

    offset.from_local_datetime(&NaiveDateTime::new(date, time))
        .single()
        .ok_or_else(|| format!("Invalid offset in {}", buf))
}

fn utc_offset() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn parse_offset(offset_str: &str, date_str: &str) -> Result<FixedOffset, String> {
    if offset_str == "Z" {
        return Ok(utc_offset());
    }

    let sign: i32 = if offset_str.starts_with('-') { -1 } else { 1 };
    let digits = offset_str[1..].replace(':', "");
    let h: i32 = to_int(&digits[0..2], date_str)?;
    let mn: i32 = to_int(&digits[2..4], date_str)?;

    FixedOffset::east_opt(sign * (h * 3600 + mn * 60))
        .ok_or_else(|| format!("Offset out of range in {}", date_str))
}

pub fn format_date_time(date_time: &DateTime<FixedOffset>) -> String {
    date_time.format("%Y-%m-%d %H:%M:%S %:z").to_string()
}

/// Derives the URL-safe slug from a document name. The markdown extension
/// and a leading `YYYY-MM-DD-` date prefix are dropped, the remainder is
/// transliterated to lowercase ASCII with hyphen separators.
pub fn slug_from_name(name: &str) -> String {
    lazy_static! {
        static ref DATE_PREFIX_REGEX: Regex = Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}-").unwrap();
    }

    let base = name
        .strip_suffix(".markdown")
        .or_else(|| name.strip_suffix(".md"))
        .unwrap_or(name);
    let base = DATE_PREFIX_REGEX.replace(base, "");

    let ascii = unidecode::unidecode(&base);
    let hyphenated: String = ascii.chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();

    let mut slug = String::new();
    let mut prev_char = None;

    for c in hyphenated.chars() {
        if c != '-' || (prev_char != Some('-') && !slug.is_empty()) {
            slug.push(c);
        }
        prev_char = Some(c);
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_time() {
        let date_time = parse_date_time("2017-09-10 10:42:32").unwrap();
        assert_eq!(format_date_time(&date_time), "2017-09-10 10:42:32 +00:00");

        let date_time = parse_date_time("2017-09-10").unwrap();
        assert_eq!(format_date_time(&date_time), "2017-09-10 00:00:00 +00:00");

        let date_time = parse_date_time("2017-09-10T10:42:32.123").unwrap();
        assert_eq!(format_date_time(&date_time), "2017-09-10 10:42:32 +00:00");

        let date_time = parse_date_time("2017-09-10 10:42").unwrap();
        assert_eq!(format_date_time(&date_time), "2017-09-10 10:42:00 +00:00");
    }

    #[test]
    fn test_parse_date_time_with_offset() {
        let date_time = parse_date_time("2017-09-10 10:42:32 +05:30").unwrap();
        assert_eq!(format_date_time(&date_time), "2017-09-10 10:42:32 +05:30");

        let date_time = parse_date_time("2017-09-10 10:42:32 -0800").unwrap();
        assert_eq!(format_date_time(&date_time), "2017-09-10 10:42:32 -08:00");

        let date_time = parse_date_time("2017-09-10T10:42:32Z").unwrap();
        assert_eq!(format_date_time(&date_time), "2017-09-10 10:42:32 +00:00");
    }

    #[test]
    fn test_parse_date_time_rejects_garbage() {
        assert!(parse_date_time("not a date").is_err());
        assert!(parse_date_time("2017-13-41").is_err());
        assert!(parse_date_time("2017-09-10 25:00:00").is_err());
        assert!(parse_date_time("2017-09-10 something").is_err());
    }

    #[test]
    fn test_slug_from_name() {
        assert_eq!(slug_from_name("2015-04-18-hello-world.md"), "hello-world");
        assert_eq!(slug_from_name("2021-12-01-point-free.markdown"), "point-free");
        assert_eq!(slug_from_name("My First Post.md"), "my-first-post");
        assert_eq!(slug_from_name("ábaco_notes"), "abaco-notes");
        assert_eq!(slug_from_name("20200522_how_to_write_a_code_review"), "20200522-how-to-write-a-code-review");
    }
}
