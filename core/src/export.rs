//! Flat per-juror projection for spreadsheets.

use std::io;

use serde::Serialize;

use crate::JuryState;

/// One CSV row. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub juror_id: u32,
    pub name: String,
    pub approved: bool,
    pub strike_type: &'static str,
    pub unread: bool,
    pub message_count: usize,
    pub last_message: String,
}

/// Rows for every live juror, in id order.
#[must_use]
pub fn export_rows(state: &JuryState) -> Vec<ExportRow> {
    state
        .live_jurors()
        .map(|record| ExportRow {
            juror_id: record.id.value(),
            name: record.name.clone(),
            approved: record.is_approved(),
            strike_type: record.strike.type_str(),
            unread: record.unread,
            message_count: record.messages.len(),
            last_message: record
                .last_message()
                .map(|message| message.text.as_str().to_string())
                .unwrap_or_default(),
        })
        .collect()
}

pub fn write_csv<W: io::Write>(state: &JuryState, writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    let rows = export_rows(state);
    if rows.is_empty() {
        writer.write_record([
            "juror_id",
            "name",
            "approved",
            "strike_type",
            "unread",
            "message_count",
            "last_message",
        ])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_csv_string(state: &JuryState) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    write_csv(state, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
