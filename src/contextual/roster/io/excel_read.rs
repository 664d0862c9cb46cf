use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::contextual::roster::error::{Result, ToolError};
use crate::contextual::roster::io::{RosterBuilder, resolve_column};
use crate::contextual::roster::model::Roster;

/// Reads the roster from the first worksheet of an Excel export. The first row
/// holds the headers.
pub fn read_roster(path: &Path, column: Option<&str>) -> Result<Roster> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ToolError::InvalidWorkbook("workbook has no worksheets".into()))?
        .map_err(ToolError::from)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(first_row) => first_row
            .iter()
            .map(|cell| cell_to_string(Some(cell)))
            .collect(),
        None => Vec::new(),
    };

    let index = resolve_column(&headers, column)?;
    let mut builder = RosterBuilder::new(headers[index].clone());

    for (offset, row) in rows.enumerate() {
        builder.push(offset + 2, &cell_to_string(row.get(index)));
    }

    Ok(builder.finish())
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
