use std::fmt::{self, Display};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Write};

/// An open file owned by a script, produced by the `fopen` builtin.
/// Modes: `"r"` read, `"w"` truncate-write, `"a"` append.
#[derive(Debug)]
pub struct FileHandle {
    pub path: String,
    stream: Option<Stream>,
}

#[derive(Debug)]
enum Stream {
    Read(BufReader<File>),
    Write(File),
}

impl FileHandle {
    /// Opens a file in the given mode. Returns `None` if the mode is unknown
    /// or the file cannot be opened; `fopen` maps that to nil.
    pub fn open(path: &str, mode: &str) -> Option<FileHandle> {
        let stream = match mode {
            "r" => Stream::Read(BufReader::new(File::open(path).ok()?)),
            "w" => Stream::Write(File::create(path).ok()?),
            "a" => Stream::Write(OpenOptions::new().create(true).append(true).open(path).ok()?),
            _ => return None,
        };

        Some(FileHandle {
            path: path.to_string(),
            stream: Some(stream),
        })
    }

    /// Reads the rest of the file as a single string.
    pub fn read_all(&mut self) -> Result<String, String> {
        match &mut self.stream {
            Some(Stream::Read(reader)) => {
                let mut contents = String::new();
                reader.read_to_string(&mut contents).map_err(|error| error.to_string())?;
                Ok(contents)
            },
            Some(Stream::Write(_)) => Err(format!("File '{}' is not open for reading", self.path)),
            None => Err(format!("File '{}' is closed", self.path)),
        }
    }

    /// Reads one line with the trailing newline stripped. Returns `None` at
    /// end of file.
    pub fn read_line(&mut self) -> Result<Option<String>, String> {
        match &mut self.stream {
            Some(Stream::Read(reader)) => {
                let mut line = String::new();
                let count = reader.read_line(&mut line).map_err(|error| error.to_string())?;
                if count == 0 {
                    return Ok(None);
                }

                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }

                Ok(Some(line))
            },
            Some(Stream::Write(_)) => Err(format!("File '{}' is not open for reading", self.path)),
            None => Err(format!("File '{}' is closed", self.path)),
        }
    }

    /// Writes a string and returns the number of bytes written.
    pub fn write(&mut self, text: &str) -> Result<usize, String> {
        match &mut self.stream {
            Some(Stream::Write(file)) => {
                file.write_all(text.as_bytes()).map_err(|error| error.to_string())?;
                Ok(text.len())
            },
            Some(Stream::Read(_)) => Err(format!("File '{}' is not open for writing", self.path)),
            None => Err(format!("File '{}' is closed", self.path)),
        }
    }

    /// Closes the handle. Closing twice is fine.
    pub fn close(&mut self) {
        if let Some(Stream::Write(file)) = &mut self.stream {
            let _ = file.flush();
        }
        self.stream = None;
    }
}

impl Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<file {}>", self.path)
    }
}
