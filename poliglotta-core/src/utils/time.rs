use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime, UtcOffset,
};

/// Formatta una durata in secondi come `m:ss` (es. 65.4 -> "1:05").
/// Valori negativi o non finiti diventano "0:00".
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 { seconds.floor() as u64 } else { 0 };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Epoch in secondi -> data/ora nel fuso di chi legge.
pub fn datetime_from_unix(secs: i64, offset: UtcOffset) -> Option<PrimitiveDateTime> {
    let dt = OffsetDateTime::from_unix_timestamp(secs).ok()?.to_offset(offset);
    Some(PrimitiveDateTime::new(dt.date(), dt.time()))
}

/// RFC3339 viene portato nel fuso di chi legge; un ISO senza offset
/// (con o senza frazioni di secondo) resta com'è.
pub fn datetime_from_text(text: &str, offset: UtcOffset) -> Option<PrimitiveDateTime> {
    if let Ok(dt) = OffsetDateTime::parse(text, &Rfc3339) {
        let local = dt.to_offset(offset);
        return Some(PrimitiveDateTime::new(local.date(), local.time()));
    }
    let with_fraction = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    let plain = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(text, with_fraction)
        .or_else(|_| PrimitiveDateTime::parse(text, plain))
        .ok()
}

/// Etichetta `HH:MM` per l'interfaccia.
pub fn clock_label(dt: PrimitiveDateTime) -> Option<String> {
    dt.format(format_description!("[hour]:[minute]")).ok()
}
