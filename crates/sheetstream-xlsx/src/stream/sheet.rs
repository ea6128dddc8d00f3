//! Per-sheet stream state and sheet part XML

use sheetstream_core::{
    CellAddress, CellRange, CellType, ColumnMetadata, ResolvedCell, StyleRegistry, MAX_COLS,
    MAX_ROWS,
};

use super::SheetRegistration;
use crate::error::{XlsxError, XlsxResult};
use crate::escape::{escape_text, needs_preserve};

pub(crate) const SHEET_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheetData>"#;

/// Stream state of one registered sheet
#[derive(Debug)]
pub(crate) struct SheetState {
    registration: SheetRegistration,
    /// Row width, fixed by the first row written
    column_count: Option<usize>,
    /// Column letters for `0..column_count`
    column_letters: Vec<String>,
    rows_written: u32,
    merge_cells: Vec<CellRange>,
}

impl SheetState {
    pub(crate) fn new(registration: SheetRegistration) -> Self {
        Self {
            registration,
            column_count: None,
            column_letters: Vec::new(),
            rows_written: 0,
            merge_cells: Vec::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.registration.name()
    }

    pub(crate) fn column_count(&self) -> Option<usize> {
        self.column_count
    }

    pub(crate) fn rows_written(&self) -> u32 {
        self.rows_written
    }

    pub(crate) fn merge_cells(&self) -> &[CellRange] {
        &self.merge_cells
    }

    pub(crate) fn add_merge_cells(&mut self, range: CellRange) {
        self.merge_cells.push(range);
    }

    /// Written extent of a filtered sheet; `None` when unfiltered or nothing was written
    pub(crate) fn auto_filter_range(&self) -> Option<CellRange> {
        if !self.registration.has_auto_filter() {
            return None;
        }
        let columns = self.column_count.filter(|&n| n > 0)?;
        if self.rows_written == 0 {
            return None;
        }
        Some(CellRange::from_indices(
            0,
            0,
            self.rows_written - 1,
            (columns - 1) as u16,
        ))
    }

    /// Check a row's width and claim its row number (1-based).
    ///
    /// Nothing changes when the row is rejected.
    fn begin_row(&mut self, width: usize) -> XlsxResult<u32> {
        match self.column_count {
            Some(expected) if expected != width => {
                return Err(XlsxError::WrongColumnCount {
                    expected,
                    actual: width,
                });
            }
            Some(_) => {}
            None => {
                if width > MAX_COLS as usize {
                    return Err(sheetstream_core::Error::ColumnOutOfBounds(
                        (width - 1) as u32,
                        MAX_COLS - 1,
                    )
                    .into());
                }
            }
        }
        if self.rows_written >= MAX_ROWS {
            return Err(
                sheetstream_core::Error::RowOutOfBounds(self.rows_written, MAX_ROWS - 1).into(),
            );
        }

        if self.column_count.is_none() {
            self.column_count = Some(width);
            self.column_letters = (0..width)
                .map(|col| CellAddress::column_to_letters(col as u16))
                .collect();
        }
        self.rows_written += 1;
        Ok(self.rows_written)
    }

    /// Append one row's XML to `out`.
    ///
    /// Each cell carries an optional metadata override; cells without one resolve against the
    /// column's declaration.
    pub(crate) fn push_row<'v, I>(
        &mut self,
        cells: I,
        styles: &mut StyleRegistry,
        out: &mut String,
    ) -> XlsxResult<()>
    where
        I: ExactSizeIterator<Item = (&'v str, Option<&'v ColumnMetadata>)>,
    {
        let row_number = self.begin_row(cells.len())?.to_string();

        if self.column_letters.is_empty() {
            out.push_str(&format!("<row r=\"{}\"/>", row_number));
            return Ok(());
        }

        out.push_str(&format!("<row r=\"{}\">", row_number));
        for (col, (raw, cell_metadata)) in cells.enumerate() {
            let metadata: Option<&ColumnMetadata> = match cell_metadata {
                Some(metadata) => Some(metadata),
                None => self.registration.column(col),
            };
            let cell = ResolvedCell::resolve(raw, metadata);
            let style_id = match &cell.descriptor {
                Some(descriptor) => styles.ensure(descriptor),
                None => 0,
            };
            write_cell(out, &self.column_letters[col], &row_number, style_id, &cell);
        }
        out.push_str("</row>");
        Ok(())
    }

    /// Everything after the last row: filter range, merge ranges, closing tags
    pub(crate) fn part_footer(&self) -> String {
        let mut content = String::from("</sheetData>");

        if let Some(range) = self.auto_filter_range() {
            content.push_str(&format!("<autoFilter ref=\"{}\"/>", range));
        }

        if !self.merge_cells.is_empty() {
            content.push_str(&format!("<mergeCells count=\"{}\">", self.merge_cells.len()));
            for range in &self.merge_cells {
                // `from:to` even for a single cell
                content.push_str(&format!(
                    "<mergeCell ref=\"{}:{}\"/>",
                    range.start, range.end
                ));
            }
            content.push_str("</mergeCells>");
        }

        content.push_str("</worksheet>");
        content
    }
}

fn write_cell(out: &mut String, letters: &str, row: &str, style_id: u32, cell: &ResolvedCell<'_>) {
    out.push_str("<c r=\"");
    out.push_str(letters);
    out.push_str(row);
    out.push('"');
    if style_id != 0 {
        out.push_str(&format!(" s=\"{}\"", style_id));
    }

    match cell.cell_type {
        CellType::InlineString | CellType::String => {
            out.push_str(" t=\"inlineStr\"><is><t");
            if needs_preserve(&cell.value) {
                out.push_str(" xml:space=\"preserve\"");
            }
            out.push('>');
            out.push_str(&escape_text(&cell.value));
            out.push_str("</t></is></c>");
        }
        other => {
            if let Some(t) = other.xlsx_type() {
                out.push_str(&format!(" t=\"{}\"", t));
            }
            out.push_str("><v>");
            out.push_str(&escape_text(&cell.value));
            out.push_str("</v></c>");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(state: &mut SheetState, styles: &mut StyleRegistry, row: &[&str]) -> XlsxResult<String> {
        let mut out = String::new();
        state.push_row(row.iter().map(|v| (*v, None)), styles, &mut out)?;
        Ok(out)
    }

    #[test]
    fn test_first_row_fixes_width() {
        let mut state = SheetState::new(SheetRegistration::new("Sheet1"));
        let mut styles = StyleRegistry::new();

        render(&mut state, &mut styles, &["a", "b"]).unwrap();
        let err = render(&mut state, &mut styles, &["a", "b", "c"]).unwrap_err();
        assert!(matches!(
            err,
            XlsxError::WrongColumnCount {
                expected: 2,
                actual: 3
            }
        ));
        assert!(render(&mut state, &mut styles, &["a"]).is_err());
        assert_eq!(state.rows_written(), 1);
        assert_eq!(state.column_count(), Some(2));
    }

    #[test]
    fn test_empty_first_row() {
        let mut state = SheetState::new(SheetRegistration::new("Sheet1"));
        let mut styles = StyleRegistry::new();

        assert_eq!(render(&mut state, &mut styles, &[]).unwrap(), "<row r=\"1\"/>");
        assert_eq!(render(&mut state, &mut styles, &[]).unwrap(), "<row r=\"2\"/>");
        assert!(render(&mut state, &mut styles, &["late"]).is_err());
        assert_eq!(state.column_count(), Some(0));
    }

    #[test]
    fn test_cell_xml() {
        let registration = SheetRegistration::new("Sheet1").column_types(&[
            None,
            Some(CellType::Decimal),
            Some(CellType::Boolean),
        ]);
        let mut state = SheetState::new(registration);
        let mut styles = StyleRegistry::new();

        let xml = render(&mut state, &mut styles, &["1</v>", "300.0", "true"]).unwrap();
        assert_eq!(
            xml,
            concat!(
                "<row r=\"1\">",
                "<c r=\"A1\" t=\"inlineStr\"><is><t>1&lt;/v&gt;</t></is></c>",
                "<c r=\"B1\" s=\"1\"><v>300.00</v></c>",
                "<c r=\"C1\" s=\"2\" t=\"b\"><v>1</v></c>",
                "</row>"
            )
        );

        let xml = render(&mut state, &mut styles, &["  padded", "n/a", "0"]).unwrap();
        assert!(xml.contains("<c r=\"A2\" t=\"inlineStr\"><is><t xml:space=\"preserve\">  padded</t></is></c>"));
        assert!(xml.contains("<c r=\"B2\" t=\"inlineStr\"><is><t>n/a</t></is></c>"));
        assert!(xml.contains("<c r=\"C2\" s=\"2\" t=\"b\"><v>0</v></c>"));
        assert_eq!(styles.len(), 3);
    }

    #[test]
    fn test_auto_filter_extent() {
        let mut state = SheetState::new(SheetRegistration::new("Sheet1").auto_filter(true));
        let mut styles = StyleRegistry::new();
        assert_eq!(state.auto_filter_range(), None);

        for _ in 0..7 {
            render(&mut state, &mut styles, &["x", "y"]).unwrap();
        }
        assert_eq!(state.auto_filter_range().unwrap().to_string(), "A1:B7");
        assert!(state.part_footer().contains("<autoFilter ref=\"A1:B7\"/>"));
    }

    #[test]
    fn test_footer_merge_cells() {
        let mut state = SheetState::new(SheetRegistration::new("Sheet1"));
        state.add_merge_cells(CellRange::from_indices(1, 1, 2, 3));
        assert_eq!(
            state.part_footer(),
            "</sheetData><mergeCells count=\"1\"><mergeCell ref=\"B2:D3\"/></mergeCells></worksheet>"
        );
        assert_eq!(state.merge_cells().len(), 1);
    }

    #[test]
    fn test_single_cell_merge_keeps_both_corners() {
        let mut state = SheetState::new(SheetRegistration::new("Sheet1"));
        state.add_merge_cells(CellRange::from_indices(0, 0, 0, 0));
        assert!(state
            .part_footer()
            .contains("<mergeCell ref=\"A1:A1\"/>"));
    }
}
