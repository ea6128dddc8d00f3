//! Stream options

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// Options for streaming an XLSX document
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Compression of every part (default: deflate)
    pub compression: CompressionMethod,
    /// Compression level; `None` uses the method's default
    pub compression_level: Option<i64>,
    /// Write sheet parts with ZIP64 headers so they may exceed 4 GiB (default: on).
    ///
    /// Turning this off saves a few bytes per sheet, but a sheet part that outgrows 4 GiB then
    /// fails when the sheet is finished, after its rows were streamed.
    pub large_file: bool,
    /// Ask spreadsheet applications to open the workbook read-only
    pub read_only_recommended: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
            compression_level: None,
            large_file: true,
            read_only_recommended: false,
        }
    }
}

impl StreamOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression method
    pub fn compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    /// Set the compression level
    pub fn compression_level(mut self, level: Option<i64>) -> Self {
        self.compression_level = level;
        self
    }

    /// Enable or disable ZIP64 sheet parts
    pub fn large_file(mut self, large_file: bool) -> Self {
        self.large_file = large_file;
        self
    }

    /// Set the read-only-recommended flag
    pub fn read_only_recommended(mut self, recommended: bool) -> Self {
        self.read_only_recommended = recommended;
        self
    }

    /// Entry options for the small parts written at close
    pub(crate) fn part_options(&self) -> SimpleFileOptions {
        let options = SimpleFileOptions::default().compression_method(self.compression);
        match self.compression {
            // stored entries reject any level
            CompressionMethod::Stored => options,
            _ => options.compression_level(self.compression_level),
        }
    }

    /// Entry options for streamed sheet parts
    pub(crate) fn sheet_options(&self) -> SimpleFileOptions {
        self.part_options().large_file(self.large_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = StreamOptions::default();
        assert_eq!(options.compression, CompressionMethod::Deflated);
        assert_eq!(options.compression_level, None);
        assert!(options.large_file);
        assert!(!options.read_only_recommended);
    }

    #[test]
    fn test_setters() {
        let options = StreamOptions::new()
            .compression(CompressionMethod::Stored)
            .compression_level(Some(9))
            .large_file(false)
            .read_only_recommended(true);
        assert_eq!(options.compression, CompressionMethod::Stored);
        assert_eq!(options.compression_level, Some(9));
        assert!(!options.large_file);
        assert!(options.read_only_recommended);
    }
}
