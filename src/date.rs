use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Bucket start as wall-clock time in the display offset.
pub fn to_display(ts: i64, offset: UtcOffset) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(ts)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
        .to_offset(offset)
}

/// RFC 3339 with the display offset, e.g. `2020-11-03T19:30:00-05:00`.
pub fn fmt_rfc3339(ts: i64, offset: UtcOffset) -> String {
    to_display(ts, offset).format(&Rfc3339).unwrap_or_else(|_| ts.to_string())
}

/// Short axis label, e.g. `11-03 19:30`.
pub fn fmt_axis_label(ts: i64, offset: UtcOffset) -> String {
    to_display(ts, offset)
        .format(format_description!("[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| ts.to_string())
}

/// Human label for an offset, e.g. `UTC-05:00`.
pub fn fmt_offset(offset: UtcOffset) -> String {
    let (h, m, _) = offset.as_hms();
    let sign = if offset.is_negative() { '-' } else { '+' };
    format!("UTC{}{:02}:{:02}", sign, h.unsigned_abs(), m.unsigned_abs())
}
