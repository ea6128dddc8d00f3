//! XLSX reader
//!
//! Reads back what a document holds per sheet (cell values with their types and style IDs,
//! merged ranges, the auto-filter range) without building a workbook model. It is the
//! verification side of the stream writer and also accepts shared-string documents written by
//! other applications.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::decode_escapes;
use crate::styles::read_styles_xml;
use sheetstream_core::{CellAddress, CellRange, CellType, NumberFormat};

/// A cell as stored in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCell {
    /// Stored text: the `<v>` content, or the string for text cells
    pub value: String,
    /// Effective type from the `t` attribute
    pub cell_type: CellType,
    /// Index into `cellXfs`
    pub style_id: u32,
}

impl Default for ReadCell {
    fn default() -> Self {
        Self {
            value: String::new(),
            cell_type: CellType::InlineString,
            style_id: 0,
        }
    }
}

/// One worksheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadSheet {
    /// Sheet name
    pub name: String,
    /// One entry per row; skipped rows and columns are filled with empty cells
    pub rows: Vec<Vec<ReadCell>>,
    /// Merged ranges in document order
    pub merged_cells: Vec<CellRange>,
    /// Auto-filter range
    pub auto_filter: Option<CellRange>,
}

impl ReadSheet {
    /// Cell values row by row
    pub fn values(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.value.clone()).collect())
            .collect()
    }

    /// Cell types row by row
    pub fn cell_types(&self) -> Vec<Vec<CellType>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.cell_type).collect())
            .collect()
    }
}

/// Contents of a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadWorkbook {
    /// Sheets in workbook order
    pub sheets: Vec<ReadSheet>,
    /// Number format of every `cellXfs` entry
    pub cell_formats: Vec<NumberFormat>,
    /// Workbook file-sharing flag
    pub read_only_recommended: bool,
}

impl ReadWorkbook {
    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    /// Find a sheet by name
    pub fn sheet(&self, name: &str) -> Option<&ReadSheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

/// Workbook-level data from workbook.xml
struct WorkbookInfo {
    /// (name, relationship id)
    sheets: Vec<(String, String)>,
    read_only_recommended: bool,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a document from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<ReadWorkbook> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a document from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<ReadWorkbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_formats = match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file)?,
            Err(_) => vec![NumberFormat::General],
        };
        let workbook_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut sheets = Vec::with_capacity(workbook_info.sheets.len());
        for (name, r_id) in workbook_info.sheets {
            let path = sheet_paths
                .get(&r_id)
                .ok_or_else(|| XlsxError::MissingPart(format!("relationship {}", r_id)))?;
            let mut sheet = Self::read_worksheet(&mut archive, path, &shared_strings)?;
            sheet.name = name;
            sheets.push(sheet);
        }

        Ok(ReadWorkbook {
            sheets,
            cell_formats,
            read_only_recommended: workbook_info.read_only_recommended,
        })
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"t" if in_si => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(decode_escapes(&current_string).into_owned());
                        in_si = false;
                    }
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current_string.push_str(&e.unescape()?);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names, rIds and the file-sharing flag
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<WorkbookInfo> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut info = WorkbookInfo {
            sheets: Vec::new(),
            read_only_recommended: false,
        };

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"sheet" => {
                        let mut name = None;
                        let mut r_id = None;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"name" => {
                                    name = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"r:id" => {
                                    r_id = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                _ => {}
                            }
                        }
                        if let (Some(name), Some(r_id)) = (name, r_id) {
                            info.sheets.push((name, r_id));
                        }
                    }
                    b"fileSharing" => {
                        info.read_only_recommended = attr_value(&e, b"readOnlyRecommended")
                            .map_or(false, |v| v == "1" || v == "true");
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(info)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    // Only include worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read a worksheet part
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        shared_strings: &[String],
    ) -> XlsxResult<ReadSheet> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        // Inline string whitespace is significant
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut sheet = ReadSheet::default();

        let mut current_row: Option<Vec<ReadCell>> = None;
        let mut current_cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"row" => {
                        Self::open_row(&mut sheet, &e);
                        current_row = Some(Vec::new());
                    }
                    b"c" => current_cell = Some(PendingCell::from_start(&e)),
                    b"v" if current_cell.is_some() => in_value = true,
                    b"t" if current_cell.is_some() => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"row" => {
                        Self::open_row(&mut sheet, &e);
                        sheet.rows.push(Vec::new());
                    }
                    b"c" => {
                        if let Some(row) = current_row.as_mut() {
                            PendingCell::from_start(&e).finish(row, shared_strings);
                        }
                    }
                    b"mergeCell" => {
                        if let Some(range) = attr_value(&e, b"ref") {
                            sheet.merged_cells.push(CellRange::parse(&range)?);
                        }
                    }
                    b"autoFilter" => {
                        if let Some(range) = attr_value(&e, b"ref") {
                            sheet.auto_filter = Some(CellRange::parse(&range)?);
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value || in_inline_text => {
                    if let Some(cell) = current_cell.as_mut() {
                        cell.text.push_str(&e.unescape()?);
                    }
                }
                Ok(Event::CData(e)) if in_value || in_inline_text => {
                    if let Some(cell) = current_cell.as_mut() {
                        cell.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"v" => in_value = false,
                    b"t" => in_inline_text = false,
                    b"c" => {
                        if let (Some(cell), Some(row)) = (current_cell.take(), current_row.as_mut())
                        {
                            cell.finish(row, shared_strings);
                        }
                    }
                    b"row" => {
                        if let Some(row) = current_row.take() {
                            sheet.rows.push(row);
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }

    /// Pad with empty rows up to a row's `r` attribute
    fn open_row(sheet: &mut ReadSheet, e: &BytesStart<'_>) {
        if let Some(r) = attr_value(e, b"r").and_then(|r| r.parse::<usize>().ok()) {
            while sheet.rows.len() + 1 < r {
                sheet.rows.push(Vec::new());
            }
        }
    }
}

/// A `<c>` element being read
struct PendingCell {
    column: Option<u16>,
    kind: Option<String>,
    style_id: u32,
    text: String,
}

impl PendingCell {
    fn from_start(e: &BytesStart<'_>) -> Self {
        let mut cell = Self {
            column: None,
            kind: None,
            style_id: 0,
            text: String::new(),
        };
        for attr in e.attributes().flatten() {
            let Ok(value) = attr.unescape_value() else {
                continue;
            };
            match attr.key.as_ref() {
                b"r" => cell.column = CellAddress::parse(&value).ok().map(|a| a.col),
                b"t" => cell.kind = Some(value.into_owned()),
                b"s" => cell.style_id = value.parse().unwrap_or(0),
                _ => {}
            }
        }
        cell
    }

    /// Append to `row`, padding skipped columns
    fn finish(self, row: &mut Vec<ReadCell>, shared_strings: &[String]) {
        if let Some(column) = self.column {
            while row.len() < column as usize {
                row.push(ReadCell::default());
            }
        }

        let kind = self.kind.as_deref();
        let value = match kind {
            Some("s") => self
                .text
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|index| shared_strings.get(index))
                .cloned()
                .unwrap_or_default(),
            Some("inlineStr") | Some("str") => decode_escapes(&self.text).into_owned(),
            _ => self.text,
        };

        row.push(ReadCell {
            value,
            cell_type: CellType::from_xlsx_type(kind),
            style_id: self.style_id,
        });
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn package(sheet_xml: &str, shared_strings: Option<&str>) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#).unwrap();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Data" sheetId="1" r:id="rId1"/></sheets></workbook>"#).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/data.xml"/></Relationships>"#).unwrap();

            zip.start_file("xl/worksheets/data.xml", options).unwrap();
            zip.write_all(sheet_xml.as_bytes()).unwrap();

            if let Some(sst) = shared_strings {
                zip.start_file("xl/sharedStrings.xml", options).unwrap();
                zip.write_all(sst.as_bytes()).unwrap();
            }

            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_read_shared_strings_and_gaps() {
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="C1"><v>42</v></c></row>
            <row r="3"><c r="B3" t="s" s="2"><v>1</v></c></row>
        </sheetData></worksheet>"#;
        let sst = r#"<sst><si><t>Hello</t></si><si><r><t>Wor</t></r><r><t>ld_x000D_</t></r></si></sst>"#;

        let workbook = XlsxReader::read(Cursor::new(package(sheet, Some(sst)))).unwrap();
        let data = &workbook.sheets[0];
        assert_eq!(data.name, "Data");
        assert_eq!(
            data.values(),
            vec![
                vec!["Hello".to_string(), String::new(), "42".to_string()],
                vec![],
                vec![String::new(), "World\r".to_string()],
            ]
        );
        assert_eq!(data.rows[2][1].style_id, 2);
        assert_eq!(data.rows[0][2].cell_type, CellType::Numeric);
        assert_eq!(workbook.cell_formats, vec![NumberFormat::General]);
    }

    #[test]
    fn test_read_inline_whitespace_and_metadata() {
        let sheet = r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t xml:space="preserve"> a &amp; b </t></is></c><c r="B1" t="b"><v>1</v></c><c r="C1" t="e"><v>#N/A</v></c></row><row r="2"/></sheetData><autoFilter ref="A1:C2"/><mergeCells count="1"><mergeCell ref="A2:C2"/></mergeCells></worksheet>"#;

        let workbook = XlsxReader::read(Cursor::new(package(sheet, None))).unwrap();
        let data = &workbook.sheets[0];
        assert_eq!(data.rows[0][0].value, " a & b ");
        assert_eq!(
            data.cell_types(),
            vec![
                vec![CellType::InlineString, CellType::Boolean, CellType::Error],
                vec![],
            ]
        );
        assert_eq!(data.auto_filter, Some(CellRange::parse("A1:C2").unwrap()));
        assert_eq!(data.merged_cells, vec![CellRange::parse("A2:C2").unwrap()]);
        assert!(!workbook.read_only_recommended);
    }

    #[test]
    fn test_missing_content_types() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("hello.txt", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"hi").unwrap();
            zip.finish().unwrap();
        }
        assert!(matches!(
            XlsxReader::read(Cursor::new(buf)),
            Err(XlsxError::InvalidFormat(_))
        ));
    }
}
