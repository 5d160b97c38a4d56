//! CSV source implementation.

use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use super::DataSource;
use crate::core::Dataset;
use crate::error::{BiasError, Result};

const UTF8_BOM: char = '\u{feff}';

/// Options for configuring CSV reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Trim whitespace around headers and fields
    pub trim: bool,
    /// Comment prefix (lines starting with this are ignored)
    pub comment: Option<u8>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: false,
            comment: None,
        }
    }
}

impl CsvOptions {
    /// Tab-separated input.
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Sets the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to trim headers and fields.
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }
}

/// Where the CSV bytes come from.
#[derive(Debug, Clone)]
pub enum CsvInput {
    /// A file on disk.
    Path(PathBuf),
    /// An uploaded body held in memory.
    Bytes(Vec<u8>),
}

/// A CSV data source. The first row is always the header.
///
/// # Examples
///
/// ```rust,no_run
/// use cohort_bias::sources::{CsvOptions, CsvSource, DataSource};
///
/// # fn example() -> cohort_bias::Result<()> {
/// let source = CsvSource::from_path("cohort.tsv").with_options(CsvOptions::tsv());
/// let data = source.load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    input: CsvInput,
    options: CsvOptions,
}

impl CsvSource {
    /// Reads from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            input: CsvInput::Path(path.as_ref().to_path_buf()),
            options: CsvOptions::default(),
        }
    }

    /// Reads from bytes already in memory.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            input: CsvInput::Bytes(bytes.into()),
            options: CsvOptions::default(),
        }
    }

    /// Replaces the reader options.
    pub fn with_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }

    /// The reader options.
    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(true)
            .flexible(false)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .comment(self.options.comment)
            .trim(if self.options.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            });
        builder
    }

    fn decode<R: Read>(&self, reader: R) -> Result<Dataset> {
        let mut reader = self.reader_builder().from_reader(reader);

        let mut columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
            return Err(BiasError::malformed("CSV input has no header row"));
        }
        if let Some(first) = columns.first_mut() {
            if let Some(stripped) = first.strip_prefix(UTF8_BOM) {
                *first = stripped.to_string();
            }
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!(columns = columns.len(), rows = rows.len(), "decoded CSV");
        Dataset::new(columns, rows)
    }
}

impl DataSource for CsvSource {
    #[instrument(skip(self), fields(source = %self.description()))]
    fn load(&self) -> Result<Dataset> {
        let dataset = match &self.input {
            CsvInput::Path(path) => {
                let file = std::fs::File::open(path)?;
                self.decode(std::io::BufReader::new(file))?
            }
            CsvInput::Bytes(bytes) => self.decode(bytes.as_slice())?,
        };
        info!(rows = dataset.len(), "Loaded CSV dataset");
        Ok(dataset)
    }

    fn description(&self) -> String {
        match &self.input {
            CsvInput::Path(path) => format!("CSV file: {}", path.display()),
            CsvInput::Bytes(bytes) => format!("CSV upload ({} bytes)", bytes.len()),
        }
    }
}
