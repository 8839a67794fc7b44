use serde::Serializer;
use time::{
    format_description::{well_known::Rfc3339, FormatItem},
    macros::format_description,
    OffsetDateTime, PrimitiveDateTime, UtcOffset,
};

/// Wire format for timestamps: UTC, second precision.
const SECOND_PRECISION: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Accepts RFC 3339 (`2025-06-01T10:00:00+00:00`) or the wire format
/// itself (`2025-06-01 10:00:00`, assumed UTC).
pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    if let Ok(dt) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(dt);
    }
    PrimitiveDateTime::parse(value, SECOND_PRECISION)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

pub fn format_timestamp(dt: OffsetDateTime) -> String {
    dt.to_offset(UtcOffset::UTC)
        .format(SECOND_PRECISION)
        .expect("static format description")
}

pub fn serialize<S: Serializer>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(*dt))
}

pub fn serialize_option<S: Serializer>(
    dt: &Option<OffsetDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match dt {
        Some(dt) => serializer.serialize_some(&format_timestamp(*dt)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_and_wire_format_to_same_instant() {
        let a = parse_timestamp("2025-06-01T10:00:00+00:00").expect("rfc3339");
        let b = parse_timestamp("2025-06-01 10:00:00").expect("wire format");
        assert_eq!(a, b);
    }

    #[test]
    fn formats_in_utc_regardless_of_input_offset() {
        let dt = parse_timestamp("2025-06-01T12:00:00+02:00").expect("rfc3339 with offset");
        assert_eq!(format_timestamp(dt), "2025-06-01 10:00:00");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(parse_timestamp("2025-13-01 00:00:00").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn roundtrips_wire_format() {
        let dt = parse_timestamp("2025-06-03 09:00:00").expect("wire format");
        assert_eq!(format_timestamp(dt), "2025-06-03 09:00:00");
    }
}
