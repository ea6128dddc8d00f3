//! XLSX styles (styles.xml) read/write helpers

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::escape_attr;
use sheetstream_core::{NumberFormat, StyleEntry, StyleRegistry};

// === Writing ===

/// The finalized style table.
///
/// `cellXfs` holds the built-in default at index 0 followed by one xf per registry entry, so the
/// xf index of every entry is exactly the style ID cells were written with.
#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    entries: Vec<StyleEntry>,
}

impl XlsxStyleTable {
    pub(crate) fn new(entries: Vec<StyleEntry>) -> Self {
        Self { entries }
    }

    /// Number of `cellXfs` entries
    pub(crate) fn xf_count(&self) -> usize {
        StyleRegistry::BASELINE as usize + self.entries.len()
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        // Custom number formats, deduplicated by code
        let mut numfmt_ids: HashMap<&str, u32> = HashMap::new();
        let mut numfmts: Vec<(u32, &str)> = Vec::new();
        let mut next_numfmt_id = NumberFormat::FIRST_CUSTOM_ID;

        let mut xf_numfmt_ids: Vec<u32> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let format = &entry.descriptor.number_format;
            let id = match format.builtin_id() {
                Some(id) => id,
                None => {
                    let code = format.format_string();
                    *numfmt_ids.entry(code).or_insert_with(|| {
                        let id = next_numfmt_id;
                        next_numfmt_id += 1;
                        numfmts.push((id, code));
                        id
                    })
                }
            };
            xf_numfmt_ids.push(id);
        }

        let mut xml = String::new();
        xml.push_str(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
            for (id, code) in &numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_attr(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        // Excel requires the first two fills to be none and gray125
        xml.push_str(
            r#"
  <fonts count="1">
    <font><sz val="11"/><name val="Calibri"/><family val="2"/></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.xf_count()));
        xml.push_str("\n    ");
        xml.push_str(&write_xf(0));
        for num_fmt_id in xf_numfmt_ids {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(num_fmt_id));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>
</styleSheet>"#,
        );
        xml
    }
}

fn write_xf(num_fmt_id: u32) -> String {
    let apply = if num_fmt_id != 0 {
        " applyNumberFormat=\"1\""
    } else {
        ""
    };
    format!(
        "<xf numFmtId=\"{}\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\"{}/>",
        num_fmt_id, apply
    )
}

// === Reading ===

/// Read the `cellXfs` table of a styles part, resolved to number formats
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<NumberFormat>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut numfmts: HashMap<u32, String> = HashMap::new();
    let mut xf_numfmt_ids: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"numFmt" => {
                    let mut id = None;
                    let mut code = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"numFmtId" => {
                                id = attr.unescape_value().ok().and_then(|s| s.parse().ok())
                            }
                            b"formatCode" => {
                                code = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(code)) = (id, code) {
                        numfmts.insert(id, code);
                    }
                }
                b"xf" if in_cell_xfs => {
                    let num_fmt_id = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.as_ref() == b"numFmtId")
                        .and_then(|attr| attr.unescape_value().ok()?.parse().ok())
                        .unwrap_or(0);
                    xf_numfmt_ids.push(num_fmt_id);
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"cellXfs" => {
                in_cell_xfs = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    let formats = xf_numfmt_ids
        .into_iter()
        .map(|id| match numfmts.get(&id) {
            Some(code) => NumberFormat::Custom(code.clone()),
            None => NumberFormat::from_id(id),
        })
        .collect();
    Ok(formats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetstream_core::{CellType, ColumnMetadata, StyleDescriptor};

    fn table(descriptors: &[StyleDescriptor]) -> XlsxStyleTable {
        let mut registry = StyleRegistry::new();
        for descriptor in descriptors {
            registry.ensure(descriptor);
        }
        XlsxStyleTable::new(registry.finalize())
    }

    #[test]
    fn test_baseline_only() {
        let xml = table(&[]).to_styles_xml();
        assert!(xml.contains(r#"<cellXfs count="1">"#));
        assert!(!xml.contains("<numFmts"));
    }

    #[test]
    fn test_xf_order_matches_registry() {
        let descriptors = [
            ColumnMetadata::decimal().descriptor().unwrap(),
            StyleDescriptor::inferred_numeric(),
            ColumnMetadata::date().descriptor().unwrap(),
        ];
        let xml = table(&descriptors).to_styles_xml();
        assert!(xml.contains(r#"<cellXfs count="4">"#));

        let formats = read_styles_xml(xml.as_bytes()).unwrap();
        assert_eq!(
            formats,
            vec![
                NumberFormat::General,
                NumberFormat::decimal(),
                NumberFormat::General,
                NumberFormat::date_short(),
            ]
        );
    }

    #[test]
    fn test_custom_formats_share_ids() {
        let code = NumberFormat::from_string("0.000");
        let descriptors = [
            StyleDescriptor::new(CellType::Decimal, code.clone()),
            StyleDescriptor::new(CellType::Numeric, code.clone()),
            StyleDescriptor::new(CellType::Date, NumberFormat::from_string("yyyy-mm-dd")),
        ];
        let xml = table(&descriptors).to_styles_xml();
        assert!(xml.contains(r#"<numFmts count="2">"#));
        assert!(xml.contains(r#"<numFmt numFmtId="164" formatCode="0.000"/>"#));
        assert!(xml.contains(r#"<numFmt numFmtId="165" formatCode="yyyy-mm-dd"/>"#));

        let formats = read_styles_xml(xml.as_bytes()).unwrap();
        assert_eq!(formats[1], code);
        assert_eq!(formats[2], code);
        assert_eq!(formats[3], NumberFormat::from_string("yyyy-mm-dd"));
    }

    #[test]
    fn test_format_code_is_escaped() {
        let descriptors = [StyleDescriptor::new(
            CellType::Numeric,
            NumberFormat::from_string("0.00\" <kg>\""),
        )];
        let xml = table(&descriptors).to_styles_xml();
        assert!(xml.contains("formatCode=\"0.00&quot; &lt;kg&gt;&quot;\""));
        let formats = read_styles_xml(xml.as_bytes()).unwrap();
        assert_eq!(formats[1].format_string(), "0.00\" <kg>\"");
    }
}
