//! Stream writer

use std::io::{Seek, Write};

use zip::ZipWriter;

use sheetstream_core::{CellRange, ColumnMetadata, StyleRegistry, MAX_COLS, MAX_ROWS};

use super::sheet::SHEET_HEADER;
use super::{SheetState, StreamCell, StreamRow};
use crate::error::{XlsxError, XlsxResult};
use crate::options::StreamOptions;
use crate::package::{sheet_part_name, PackageWriter};
use crate::styles::XlsxStyleTable;

/// Forward-only writer over the registered sheets.
///
/// Rows go to the current sheet, starting with the first registered one. The writer moves to
/// the next sheet with [`next_sheet`](Self::next_sheet) and never returns. Any error leaves the
/// document unusable; the sink must be discarded.
///
/// [`close`](Self::close) must be called to produce a valid document.
pub struct StreamWriter<W: Write + Seek> {
    /// `None` once closed
    zip: Option<ZipWriter<W>>,
    options: StreamOptions,
    sheets: Vec<SheetState>,
    current: usize,
    styles: StyleRegistry,
    /// Style table size recorded at close
    closed_style_count: Option<usize>,
    row_buf: String,
}

impl<W: Write + Seek> StreamWriter<W> {
    /// Open the package and the first sheet part
    pub(crate) fn start(
        sink: W,
        options: StreamOptions,
        sheets: Vec<SheetState>,
        styles: StyleRegistry,
    ) -> XlsxResult<Self> {
        let mut zip = ZipWriter::new(sink);
        Self::start_sheet(&mut zip, &options, &sheets, 0)?;

        Ok(Self {
            zip: Some(zip),
            options,
            sheets,
            current: 0,
            styles,
            closed_style_count: None,
            row_buf: String::new(),
        })
    }

    /// Write a row of raw values to the current sheet.
    ///
    /// The first row written to a sheet fixes its column count; every later row must match it.
    pub fn write<S: AsRef<str>>(&mut self, row: &[S]) -> XlsxResult<()> {
        self.push_row(row.iter().map(|value| (value.as_ref(), None)))
    }

    /// Write rows in order, stopping at the first error
    pub fn write_all<R>(&mut self, rows: R) -> XlsxResult<()>
    where
        R: IntoIterator,
        R::Item: StreamRow,
    {
        for row in rows {
            self.write(row.values())?;
        }
        Ok(())
    }

    /// Write a row whose cells may override their column's metadata
    pub fn write_cells(&mut self, row: &[StreamCell]) -> XlsxResult<()> {
        self.push_row(
            row.iter()
                .map(|cell| (cell.value.as_str(), cell.metadata.as_ref())),
        )
    }

    fn push_row<'v, I>(&mut self, cells: I) -> XlsxResult<()>
    where
        I: ExactSizeIterator<Item = (&'v str, Option<&'v ColumnMetadata>)>,
    {
        let zip = self.zip.as_mut().ok_or(XlsxError::AlreadyClosed)?;
        let sheet = &mut self.sheets[self.current];

        self.row_buf.clear();
        sheet.push_row(cells, &mut self.styles, &mut self.row_buf)?;
        zip.write_all(self.row_buf.as_bytes())?;
        Ok(())
    }

    /// Finish the current sheet and move to the next registered one
    pub fn next_sheet(&mut self) -> XlsxResult<()> {
        let zip = self.zip.as_mut().ok_or(XlsxError::AlreadyClosed)?;
        if self.current + 1 >= self.sheets.len() {
            return Err(XlsxError::AlreadyOnLastSheet);
        }

        Self::finish_sheet(zip, &self.sheets[self.current])?;
        self.current += 1;
        Self::start_sheet(zip, &self.options, &self.sheets, self.current)?;
        Ok(())
    }

    /// Merge a range of the current sheet (0-based, inclusive).
    ///
    /// The range is recorded as given; it may extend past the rows written.
    pub fn add_merge_cells(
        &mut self,
        row_from: u32,
        col_from: u16,
        row_to: u32,
        col_to: u16,
    ) -> XlsxResult<()> {
        if self.zip.is_none() {
            return Err(XlsxError::AlreadyClosed);
        }
        let range = CellRange::from_indices(row_from, col_from, row_to, col_to);
        if range.end.row >= MAX_ROWS {
            return Err(sheetstream_core::Error::RowOutOfBounds(range.end.row, MAX_ROWS - 1).into());
        }
        if range.end.col >= MAX_COLS {
            return Err(
                sheetstream_core::Error::ColumnOutOfBounds(range.end.col as u32, MAX_COLS - 1)
                    .into(),
            );
        }

        self.sheets[self.current].add_merge_cells(range);
        Ok(())
    }

    /// Finish every sheet, write the style table and package parts, and return the sink.
    ///
    /// Sheets never reached are written empty. A second call fails with
    /// [`XlsxError::AlreadyClosed`].
    pub fn close(&mut self) -> XlsxResult<W> {
        let mut zip = self.zip.take().ok_or(XlsxError::AlreadyClosed)?;

        Self::finish_sheet(&mut zip, &self.sheets[self.current])?;
        for index in self.current + 1..self.sheets.len() {
            Self::start_sheet(&mut zip, &self.options, &self.sheets, index)?;
            Self::finish_sheet(&mut zip, &self.sheets[index])?;
        }

        let style_table = XlsxStyleTable::new(std::mem::take(&mut self.styles).finalize());
        self.closed_style_count = Some(style_table.xf_count());
        PackageWriter::new(&self.sheets, &self.options).write_parts(&mut zip, &style_table)?;

        let mut sink = zip.finish()?;
        sink.flush()?;

        log::debug!(
            "closed workbook: {} sheets, {} styles",
            self.sheets.len(),
            style_table.xf_count()
        );
        Ok(sink)
    }

    /// Index of the sheet rows are written to
    pub fn current_sheet_index(&self) -> usize {
        self.current
    }

    /// Name of the sheet rows are written to
    pub fn current_sheet_name(&self) -> &str {
        self.sheets[self.current].name()
    }

    /// Number of registered sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Size of the style table, baseline included
    pub fn style_count(&self) -> usize {
        self.closed_style_count
            .unwrap_or_else(|| self.styles.len())
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.zip.is_none()
    }

    fn start_sheet(
        zip: &mut ZipWriter<W>,
        options: &StreamOptions,
        sheets: &[SheetState],
        index: usize,
    ) -> XlsxResult<()> {
        log::debug!("starting sheet {} '{}'", index + 1, sheets[index].name());
        zip.start_file(sheet_part_name(index), options.sheet_options())?;
        zip.write_all(SHEET_HEADER.as_bytes())?;
        Ok(())
    }

    fn finish_sheet(zip: &mut ZipWriter<W>, sheet: &SheetState) -> XlsxResult<()> {
        zip.write_all(sheet.part_footer().as_bytes())?;
        log::debug!(
            "finished sheet '{}': {} rows, {} columns, {} merged ranges",
            sheet.name(),
            sheet.rows_written(),
            sheet.column_count().unwrap_or(0),
            sheet.merge_cells().len()
        );
        Ok(())
    }
}

impl<W: Write + Seek> Drop for StreamWriter<W> {
    fn drop(&mut self) {
        if self.zip.is_some() {
            log::warn!("stream writer dropped before close; the document is incomplete");
        }
    }
}
