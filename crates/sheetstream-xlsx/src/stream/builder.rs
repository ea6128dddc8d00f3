//! Stream builder

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use sheetstream_core::{CellType, ColumnMetadata, StyleRegistry};

use super::{SheetRegistration, SheetState, StreamWriter};
use crate::error::{XlsxError, XlsxResult};
use crate::escape::is_illegal;
use crate::options::StreamOptions;

/// Longest sheet name spreadsheet applications accept
const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters not allowed in sheet names
const INVALID_SHEET_NAME_CHARS: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

/// Collects sheet registrations and produces a [`StreamWriter`].
///
/// Registration writes nothing. [`build`](Self::build) is one-shot: afterwards every
/// registration and build fails with [`XlsxError::BuilderAlreadyBuilt`].
#[derive(Debug)]
pub struct StreamBuilder<W: Write + Seek> {
    /// Taken by `build`
    sink: Option<W>,
    options: StreamOptions,
    sheets: Vec<SheetRegistration>,
}

impl<W: Write + Seek> StreamBuilder<W> {
    /// Create a builder writing to `sink` with default options
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, StreamOptions::default())
    }

    /// Create a builder writing to `sink`
    pub fn with_options(sink: W, options: StreamOptions) -> Self {
        Self {
            sink: Some(sink),
            options,
            sheets: Vec::new(),
        }
    }

    /// Register a sheet with declared column types (`None` infers per cell)
    pub fn add_sheet<S: Into<String>>(
        &mut self,
        name: S,
        column_types: &[Option<CellType>],
    ) -> XlsxResult<()> {
        self.register(SheetRegistration::new(name).column_types(column_types))
    }

    /// Register a sheet with declared column metadata
    pub fn add_sheet_with_metadata<S: Into<String>>(
        &mut self,
        name: S,
        columns: Vec<Option<ColumnMetadata>>,
    ) -> XlsxResult<()> {
        self.register(SheetRegistration::new(name).columns(columns))
    }

    /// Register a sheet whose written extent gets an auto-filter
    pub fn add_sheet_with_auto_filter<S: Into<String>>(
        &mut self,
        name: S,
        column_types: &[Option<CellType>],
    ) -> XlsxResult<()> {
        self.register(
            SheetRegistration::new(name)
                .column_types(column_types)
                .auto_filter(true),
        )
    }

    /// Register a sheet.
    ///
    /// Fails if the builder was built, the name is not a valid sheet name, or a sheet with the
    /// same (case-sensitive) name is already registered.
    pub fn register(&mut self, registration: SheetRegistration) -> XlsxResult<()> {
        if self.is_built() {
            return Err(XlsxError::BuilderAlreadyBuilt);
        }
        validate_sheet_name(registration.name())?;
        if self.sheets.iter().any(|s| s.name() == registration.name()) {
            return Err(XlsxError::DuplicateSheetName(registration.name().to_string()));
        }

        log::debug!(
            "registered sheet '{}' ({} declared columns, auto-filter: {})",
            registration.name(),
            registration.declared_columns().len(),
            registration.has_auto_filter()
        );
        self.sheets.push(registration);
        Ok(())
    }

    /// Number of registered sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Whether [`build`](Self::build) has succeeded
    pub fn is_built(&self) -> bool {
        self.sink.is_none()
    }

    /// Lock the registrations and start streaming the first sheet.
    ///
    /// Declared column descriptors are registered in the style registry up front, in sheet
    /// order then column order.
    pub fn build(&mut self) -> XlsxResult<StreamWriter<W>> {
        if !self.is_built() && self.sheets.is_empty() {
            return Err(XlsxError::NoSheetsRegistered);
        }
        let sink = self.sink.take().ok_or(XlsxError::BuilderAlreadyBuilt)?;
        let registrations = std::mem::take(&mut self.sheets);

        let mut styles = StyleRegistry::new();
        for registration in &registrations {
            for descriptor in registration
                .declared_columns()
                .iter()
                .flatten()
                .filter_map(ColumnMetadata::descriptor)
            {
                styles.ensure(&descriptor);
            }
        }

        log::debug!(
            "building stream: {} sheets, {} declared styles",
            registrations.len(),
            styles.len()
        );

        let sheets = registrations.into_iter().map(SheetState::new).collect();
        StreamWriter::start(sink, self.options.clone(), sheets, styles)
    }
}

impl StreamBuilder<BufWriter<File>> {
    /// Create a builder writing to a new file (truncated if it exists)
    pub fn create<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        Self::create_with_options(path, StreamOptions::default())
    }

    /// Create a builder writing to a new file with the given options
    pub fn create_with_options<P: AsRef<Path>>(
        path: P,
        options: StreamOptions,
    ) -> XlsxResult<Self> {
        let file = File::create(path)?;
        Ok(Self::with_options(BufWriter::new(file), options))
    }
}

fn validate_sheet_name(name: &str) -> XlsxResult<()> {
    let valid = !name.is_empty()
        && name.chars().count() <= MAX_SHEET_NAME_LEN
        && !name
            .chars()
            .any(|c| INVALID_SHEET_NAME_CHARS.contains(&c) || is_illegal(c) || c.is_control())
        && !name.starts_with('\'')
        && !name.ends_with('\'');
    if valid {
        Ok(())
    } else {
        Err(XlsxError::InvalidSheetName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn builder() -> StreamBuilder<Cursor<Vec<u8>>> {
        StreamBuilder::new(Cursor::new(Vec::new()))
    }

    #[test]
    fn test_duplicate_names() {
        let mut builder = builder();
        builder.add_sheet("Sheet 1", &[]).unwrap();
        builder.add_sheet("Sheet 2", &[]).unwrap();
        builder.add_sheet("sheet 1", &[]).unwrap();

        let err = builder.add_sheet("Sheet 1", &[]).unwrap_err();
        assert_eq!(err.to_string(), "duplicate sheet name 'Sheet 1'.");
        assert_eq!(builder.sheet_count(), 3);
    }

    #[test]
    fn test_invalid_names() {
        let mut builder = builder();
        for name in [
            "",
            "a/b",
            "[x]",
            "'quoted'",
            "this name is far too long for a sheet",
            "a\u{1}b",
            "tab\there",
            "line\nbreak",
            "carriage\rreturn",
        ] {
            assert!(matches!(
                builder.add_sheet(name, &[]),
                Err(XlsxError::InvalidSheetName(_))
            ));
        }
        assert_eq!(builder.sheet_count(), 0);
    }

    #[test]
    fn test_control_characters_cannot_alias_a_name() {
        let mut builder = builder();
        builder.add_sheet("ab", &[]).unwrap();
        assert!(matches!(
            builder.add_sheet("a\u{1}b", &[]),
            Err(XlsxError::InvalidSheetName(name)) if name == "a\u{1}b"
        ));

        let mut writer = builder.build().unwrap();
        let bytes = writer.close().unwrap().into_inner();
        let workbook = crate::XlsxReader::read(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["ab"]);
    }

    #[test]
    fn test_build_without_sheets() {
        let mut builder = builder();
        assert!(matches!(builder.build(), Err(XlsxError::NoSheetsRegistered)));

        // the builder stays usable
        builder.add_sheet("Sheet1", &[]).unwrap();
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_build_is_one_shot() {
        let mut builder = builder();
        builder.add_sheet("Sheet1", &[]).unwrap();
        builder.add_sheet("Sheet2", &[]).unwrap();

        let _writer = builder.build().unwrap();
        assert!(builder.is_built());
        assert!(matches!(builder.build(), Err(XlsxError::BuilderAlreadyBuilt)));
        assert!(matches!(
            builder.add_sheet("Sheet3", &[]),
            Err(XlsxError::BuilderAlreadyBuilt)
        ));
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        std::fs::write(&path, vec![0xAB; 1 << 16]).unwrap();

        let mut builder = StreamBuilder::create(&path).unwrap();
        builder.add_sheet("Sheet1", &[]).unwrap();
        builder.build().unwrap().close().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() < 1 << 16);
    }

    #[test]
    fn test_declared_descriptors_registered_up_front() {
        let mut builder = builder();
        builder
            .add_sheet(
                "Sheet1",
                &[Some(CellType::String), Some(CellType::Decimal), None],
            )
            .unwrap();
        builder
            .add_sheet_with_metadata(
                "Sheet2",
                vec![Some(ColumnMetadata::integer()), Some(ColumnMetadata::decimal())],
            )
            .unwrap();

        let writer = builder.build().unwrap();
        // baseline + decimal + integer
        assert_eq!(writer.style_count(), 3);
    }
}
