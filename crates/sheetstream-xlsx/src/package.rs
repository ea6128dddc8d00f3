//! Package parts written at close
//!
//! Sheet parts are streamed while rows arrive. Everything that depends on the whole document is
//! emitted here, once, after the last sheet part: the style table, the workbook, the document
//! properties, the relationships and the content-type manifest.

use std::io::{Seek, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::XlsxResult;
use crate::escape::{escape_attr, escape_text};
use crate::options::StreamOptions;
use crate::stream::SheetState;
use crate::styles::XlsxStyleTable;

/// Path of the n-th (0-based) worksheet part
pub(crate) fn sheet_part_name(index: usize) -> String {
    format!("xl/worksheets/sheet{}.xml", index + 1)
}

/// Writes the remaining parts of a document whose sheet parts are complete
pub(crate) struct PackageWriter<'a> {
    sheets: &'a [SheetState],
    options: &'a StreamOptions,
}

impl<'a> PackageWriter<'a> {
    pub(crate) fn new(sheets: &'a [SheetState], options: &'a StreamOptions) -> Self {
        Self { sheets, options }
    }

    /// Emit every closing part in package order
    pub(crate) fn write_parts<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        style_table: &XlsxStyleTable,
    ) -> XlsxResult<()> {
        let options = self.options.part_options();

        Self::write_part(zip, "xl/styles.xml", &style_table.to_styles_xml(), options)?;
        Self::write_part(zip, "xl/workbook.xml", &self.workbook_xml(), options)?;
        Self::write_part(
            zip,
            "xl/_rels/workbook.xml.rels",
            &self.workbook_rels_xml(),
            options,
        )?;
        Self::write_part(zip, "docProps/app.xml", &self.app_xml(), options)?;
        Self::write_part(zip, "docProps/core.xml", &core_xml(), options)?;
        Self::write_part(zip, "_rels/.rels", ROOT_RELS, options)?;
        Self::write_part(zip, "[Content_Types].xml", &self.content_types_xml(), options)?;
        Ok(())
    }

    fn write_part<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        name: &str,
        content: &str,
        options: SimpleFileOptions,
    ) -> XlsxResult<()> {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn content_types_xml(&self) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        for i in 0..self.sheets.len() {
            content.push_str(&format!(
                r#"
    <Override PartName="/{}" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                sheet_part_name(i)
            ));
        }

        content.push_str(
            r#"
    <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
    <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>"#,
        );
        content
    }

    fn workbook_xml(&self) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        if self.options.read_only_recommended {
            content.push_str("\n    <fileSharing readOnlyRecommended=\"1\"/>");
        }

        content.push_str("\n    <sheets>");
        for (i, sheet) in self.sheets.iter().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_attr(sheet.name()),
                i + 1,
                i + 1
            ));
        }
        content.push_str("\n    </sheets>");

        // Filtered sheets carry their range as a hidden, sheet-local name
        let filters: Vec<String> = self
            .sheets
            .iter()
            .enumerate()
            .filter_map(|(i, sheet)| {
                let range = sheet.auto_filter_range()?;
                let reference = format!(
                    "{}!{}",
                    quote_sheet_name(sheet.name()),
                    range.to_absolute_string()
                );
                Some(format!(
                    r#"
        <definedName name="_xlnm._FilterDatabase" localSheetId="{}" hidden="1">{}</definedName>"#,
                    i,
                    escape_text(&reference)
                ))
            })
            .collect();
        if !filters.is_empty() {
            content.push_str("\n    <definedNames>");
            for filter in filters {
                content.push_str(&filter);
            }
            content.push_str("\n    </definedNames>");
        }

        content.push_str("\n</workbook>");
        content
    }

    fn workbook_rels_xml(&self) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for i in 0..self.sheets.len() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }

        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#,
            self.sheets.len() + 1
        ));
        content
    }

    fn app_xml(&self) -> String {
        let mut titles = String::new();
        for sheet in self.sheets {
            titles.push_str(&format!("<vt:lpstr>{}</vt:lpstr>", escape_text(sheet.name())));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
    <Application>{app}</Application>
    <DocSecurity>0</DocSecurity>
    <ScaleCrop>false</ScaleCrop>
    <HeadingPairs><vt:vector size="2" baseType="variant"><vt:variant><vt:lpstr>Worksheets</vt:lpstr></vt:variant><vt:variant><vt:i4>{count}</vt:i4></vt:variant></vt:vector></HeadingPairs>
    <TitlesOfParts><vt:vector size="{count}" baseType="lpstr">{titles}</vt:vector></TitlesOfParts>
</Properties>"#,
            app = env!("CARGO_PKG_NAME"),
            count = self.sheets.len(),
            titles = titles
        )
    }
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#;

fn core_xml() -> String {
    let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created>
    <dcterms:modified xsi:type="dcterms:W3CDTF">{created}</dcterms:modified>
</cp:coreProperties>"#,
        created = created
    )
}

/// Sheet name as used in references: `'Sheet 1'`, with embedded quotes doubled
fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}
