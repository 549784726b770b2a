//! One counter written through five file writing styles.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{debug, instrument};

use super::{Backend, CounterError, HitCounter, HitCounts, Modifier};

/// How a stream file is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum StreamStyle {
    /// Whole file written from a string.
    WriteAllText,
    /// Whole file written from a list of lines.
    WriteAllLines,
    /// Raw file handle.
    FileStream,
    /// Buffered writer over a newly created file.
    StreamWriter,
    /// Buffered writer over an explicitly opened handle.
    StreamWriterFileStream,
}

impl StreamStyle {
    /// File the style writes to.
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::WriteAllText => "fileFileWriteAllText.txt",
            Self::WriteAllLines => "fileFileWriteAllLines.txt",
            Self::FileStream => "fileFileStream.txt",
            Self::StreamWriter => "fileStreamWriter.txt",
            Self::StreamWriterFileStream => "fileStreamWriterFileStream.txt",
        }
    }

    fn write(self, path: &Path, hit_count: i32) -> Result<(), CounterError> {
        let text = hit_count.to_string();
        match self {
            Self::WriteAllText => std::fs::write(path, &text)?,
            Self::WriteAllLines => std::fs::write(path, format!("{}\n", text))?,
            Self::FileStream => File::create(path)?.write_all(text.as_bytes())?,
            Self::StreamWriter => {
                let mut writer = BufWriter::new(File::create(path)?);
                writeln!(writer, "{}", text)?;
                writer.flush()?;
            }
            Self::StreamWriterFileStream => {
                let file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)?;
                let mut writer = BufWriter::new(file);
                writeln!(writer, "{}", text)?;
                writer.flush()?;
            }
        }
        Ok(())
    }

    fn read(self, path: &Path) -> Result<Option<i32>, CounterError> {
        if !path.exists() {
            return Ok(None);
        }
        let mut first = String::new();
        BufReader::new(File::open(path)?).read_line(&mut first)?;
        let first = first.trim();
        if first.is_empty() {
            return Ok(None);
        }
        Ok(Some(first.parse()?))
    }
}

/// Single counter mirrored into five files, one per [`StreamStyle`].
///
/// Modifiers are not tracked: every click is unmodified. On startup the
/// first style with a non-empty file wins; a file that does not hold an
/// integer is an error.
#[derive(Debug, Clone)]
pub struct FileStreamCounter {
    dir: PathBuf,
    hit_count: i32,
}

impl FileStreamCounter {
    /// Creates a counter writing into `dir`.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, hit_count: 0 }
    }

    /// Path of the file written by `style`.
    pub fn path_for(&self, style: StreamStyle) -> PathBuf {
        self.dir.join(style.file_name())
    }

    /// Value currently stored by each style; `None` where nothing was written.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError`] if a file exists but does not hold an integer.
    pub fn stream_counts(&self) -> Result<Vec<(StreamStyle, Option<i32>)>, CounterError> {
        StreamStyle::iter()
            .map(|style| Ok((style, style.read(&self.path_for(style))?)))
            .collect()
    }
}

impl HitCounter for FileStreamCounter {
    fn backend(&self) -> Backend {
        Backend::FileStream
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn load_on_startup(&mut self) -> Result<(), CounterError> {
        for style in StreamStyle::iter() {
            if let Some(value) = style.read(&self.path_for(style))? {
                debug!(%style, value, "Count loaded");
                self.hit_count = value;
                return Ok(());
            }
        }
        Ok(())
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn on_interaction(&mut self, _modifier: Modifier) -> Result<(), CounterError> {
        self.hit_count += 1;
        std::fs::create_dir_all(&self.dir)?;
        for style in StreamStyle::iter() {
            style.write(&self.path_for(style), self.hit_count)?;
        }
        Ok(())
    }

    fn counts(&self) -> HitCounts {
        HitCounts {
            unmodified: self.hit_count,
            ..HitCounts::default()
        }
    }
}
