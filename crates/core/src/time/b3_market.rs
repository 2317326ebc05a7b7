use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

// B3 trades on Brasília time, UTC-3 year-round since DST was abolished in 2019.
const BRT_OFFSET_SECS: i32 = -3 * 3600;

fn brt() -> Option<FixedOffset> {
    FixedOffset::east_opt(BRT_OFFSET_SECS)
}

/// Parses the report timestamp. RFC 3339 strings keep their offset; naive timestamps
/// (the backend emits `datetime.now().isoformat()`) are taken as Brasília local time.
pub fn parse_report_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())?;

    brt()?
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `dd/mm/yyyy HH:MM` in Brasília time, or the raw string when it cannot be parsed.
pub fn format_report_timestamp(raw: &str) -> String {
    match (parse_report_timestamp(raw), brt()) {
        (Some(dt), Some(offset)) => dt.with_timezone(&offset).format("%d/%m/%Y %H:%M").to_string(),
        _ if raw.trim().is_empty() => crate::format::NOT_AVAILABLE.to_string(),
        _ => raw.trim().to_string(),
    }
}

/// Age of the report relative to `now`, if the timestamp parses.
pub fn report_age(raw: &str, now: DateTime<Utc>) -> Option<chrono::Duration> {
    parse_report_timestamp(raw).map(|generated| now - generated)
}
