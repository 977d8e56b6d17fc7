use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use csv::{Terminator, WriterBuilder};
use std::io::Cursor;

use crate::error::{Result, SiaError};
use crate::models::ExtractionResult;

pub struct XlsxExtractor;

impl XlsxExtractor {
    /// Renders each sheet, in workbook order, as `Sheet: <name>` followed by
    /// its CSV and a blank line. The count covers the whole rendering.
    pub fn extract(bytes: &[u8]) -> Result<ExtractionResult> {
        let mut workbook =
            open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(Self::read_error)?;

        let mut text = String::new();

        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name).map_err(Self::read_error)?;
            let csv = Self::sheet_to_csv(&range)?;

            text.push_str(&format!("Sheet: {name}\n{csv}\n\n"));
        }

        Ok(ExtractionResult::new(text))
    }

    fn read_error(e: impl std::fmt::Display) -> SiaError {
        SiaError::Read(format!("Failed to read the XLSX file: {e}"))
    }

    /// The grid always starts at A1 so leading empty rows and columns survive.
    fn sheet_to_csv(range: &Range<Data>) -> Result<String> {
        let Some((last_row, last_col)) = range.end() else {
            return Ok(String::new());
        };

        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(Vec::new());

        for row in 0..=last_row {
            let record: Vec<String> = (0..=last_col)
                .map(|col| Self::format_cell_value(range.get_value((row, col))))
                .collect();
            writer.write_record(&record).map_err(Self::read_error)?;
        }

        let bytes = writer.into_inner().map_err(Self::read_error)?;
        let csv = String::from_utf8(bytes).map_err(Self::read_error)?;

        Ok(csv.strip_suffix('\n').unwrap_or(&csv).to_string())
    }

    fn format_cell_value(cell: Option<&Data>) -> String {
        match cell {
            Some(Data::String(s)) => s.clone(),
            Some(Data::Int(i)) => i.to_string(),
            Some(Data::Float(f)) => {
                let s = format!("{f}");
                if s.contains('.') {
                    s.trim_end_matches('0').trim_end_matches('.').to_string()
                } else {
                    s
                }
            }
            Some(Data::Bool(b)) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Some(Data::DateTime(dt)) => dt.to_string(),
            Some(Data::DateTimeIso(dt)) => dt.clone(),
            Some(Data::DurationIso(d)) => d.clone(),
            Some(Data::Error(e)) => e.to_string(),
            Some(Data::Empty) | None => String::new(),
        }
    }
}
