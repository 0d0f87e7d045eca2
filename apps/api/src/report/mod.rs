//! Report Builder: renders result rows into an `.xlsx` workbook in memory.
//!
//! One sheet, one header row, one row per uploaded file. Error rows leave
//! the candidate columns blank; success rows leave ERROR blank.

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;

use crate::models::candidate::{
    ResultRow, FIT_KEY, NAME_KEY, OVERFIT_KEY, STRENGTHS_KEY, SUMMARY_KEY, YEARS_KEY,
};

pub const REPORT_FILENAME: &str = "resume_analysis_results.xlsx";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const SHEET_NAME: &str = "Results";

/// Column order of the report.
pub const COLUMNS: [&str; 8] = [
    "FILENAME",
    "ERROR",
    NAME_KEY,
    YEARS_KEY,
    STRENGTHS_KEY,
    SUMMARY_KEY,
    FIT_KEY,
    OVERFIT_KEY,
];

const COLUMN_WIDTHS: [f64; 8] = [28.0, 30.0, 24.0, 12.0, 40.0, 60.0, 14.0, 12.0];
const STRENGTHS_SEPARATOR: &str = ", ";
/// Longest text an xlsx cell can hold, in characters.
const MAX_CELL_CHARS: usize = 32_767;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write spreadsheet: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Cell text for one row, in `COLUMNS` order. Missing values are empty and
/// over-long values are cut to the cell limit.
pub fn row_cells(row: &ResultRow) -> [String; 8] {
    let error = row.error().map(|e| e.to_string()).unwrap_or_default();
    let cells = match row.fields() {
        Some(record) => [
            row.filename.clone(),
            error,
            record.name.clone(),
            record.years_of_experience.clone(),
            record.key_strengths.join(STRENGTHS_SEPARATOR),
            record.summary.clone(),
            record.fit.clone(),
            record.overfit.clone(),
        ],
        None => [
            row.filename.clone(),
            error,
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
        ],
    };
    cells.map(fit_cell)
}

fn fit_cell(mut text: String) -> String {
    let cut = text.char_indices().nth(MAX_CELL_CHARS).map(|(index, _)| index);
    if let Some(cut) = cut {
        text.truncate(cut);
    }
    text
}

/// Renders the full workbook. Either the whole file is produced or an error
/// is returned; there is no partial output.
pub fn render_report(rows: &[ResultRow]) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, (title, width)) in COLUMNS.iter().zip(COLUMN_WIDTHS).enumerate() {
            let col = col as u16;
            sheet.write_string_with_format(0, col, *title, &header)?;
            sheet.set_column_width(col, width)?;
        }
        sheet.set_freeze_panes(1, 0)?;

        for (index, row) in rows.iter().enumerate() {
            let excel_row = index as u32 + 1;
            for (col, value) in row_cells(row).into_iter().enumerate() {
                if !value.is_empty() {
                    sheet.write_string(excel_row, col as u16, value)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
