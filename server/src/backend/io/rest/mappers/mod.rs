pub mod entry_mapper;
pub mod member_mapper;
pub mod report_mapper;

use chrono::{DateTime, SecondsFormat, Utc};

/// Wire format for instants: RFC 3339, UTC, millisecond precision
pub(crate) fn timestamp_to_dto(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
