use std::path::Path;

use csv::ReaderBuilder;

use crate::contextual::roster::error::Result;
use crate::contextual::roster::io::{RosterBuilder, resolve_column};
use crate::contextual::roster::model::Roster;

/// Reads a comma-separated roster whose first row is the header.
///
/// Short rows are tolerated; a row without the email cell counts as blank.
pub fn read_roster(path: &Path, column: Option<&str>) -> Result<Roster> {
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();
    let index = resolve_column(&headers, column)?;
    let mut builder = RosterBuilder::new(headers[index].clone());

    for (offset, record) in reader.records().enumerate() {
        let record = record?;
        builder.push(offset + 2, record.get(index).unwrap_or_default());
    }

    Ok(builder.finish())
}
