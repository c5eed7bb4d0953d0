//! Opening the relay's ends on duplicated standard descriptors
//!
//! The relay never owns the process's real stdin/stdout. It works on
//! duplicates, so dropping a relay stream closes only the duplicate.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};

/// How relay output reaches the underlying descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BufferMode {
    /// Every write is passed straight through
    #[default]
    Unbuffered,
    /// Writes are collected and forwarded in blocks, and on flush
    Block,
}

impl BufferMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BufferMode::Unbuffered => "unbuffered",
            BufferMode::Block => "block",
        }
    }
}

impl std::str::FromStr for BufferMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unbuffered" => Ok(BufferMode::Unbuffered),
            "block" => Ok(BufferMode::Block),
            other => Err(format!(
                "unknown buffering mode '{other}' (expected 'unbuffered' or 'block')"
            )),
        }
    }
}

/// Output end of a relay
pub enum RelayWriter<W: Write> {
    Unbuffered(W),
    Block(BufWriter<W>),
}

impl<W: Write> RelayWriter<W> {
    pub fn new(inner: W, mode: BufferMode) -> Self {
        match mode {
            BufferMode::Unbuffered => RelayWriter::Unbuffered(inner),
            BufferMode::Block => RelayWriter::Block(BufWriter::new(inner)),
        }
    }
}

#[cfg(test)]
impl<W: Write> RelayWriter<W> {
    fn mode(&self) -> BufferMode {
        match self {
            RelayWriter::Unbuffered(_) => BufferMode::Unbuffered,
            RelayWriter::Block(_) => BufferMode::Block,
        }
    }

    fn get_ref(&self) -> &W {
        match self {
            RelayWriter::Unbuffered(inner) => inner,
            RelayWriter::Block(inner) => inner.get_ref(),
        }
    }
}

impl<W: Write> Write for RelayWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            RelayWriter::Unbuffered(inner) => inner.write(buf),
            RelayWriter::Block(inner) => inner.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            RelayWriter::Unbuffered(inner) => inner.write_all(buf),
            RelayWriter::Block(inner) => inner.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            RelayWriter::Unbuffered(inner) => inner.flush(),
            RelayWriter::Block(inner) => inner.flush(),
        }
    }
}

/// Duplicate of the process's standard input
#[cfg(unix)]
pub fn duplicate_stdin() -> io::Result<File> {
    use std::os::fd::AsFd;
    Ok(File::from(io::stdin().as_fd().try_clone_to_owned()?))
}

/// Duplicate of the process's standard output
#[cfg(unix)]
pub fn duplicate_stdout() -> io::Result<File> {
    use std::os::fd::AsFd;
    Ok(File::from(io::stdout().as_fd().try_clone_to_owned()?))
}

/// Duplicate of the process's standard input
#[cfg(windows)]
pub fn duplicate_stdin() -> io::Result<File> {
    use std::os::windows::io::AsHandle;
    Ok(File::from(io::stdin().as_handle().try_clone_to_owned()?))
}

/// Duplicate of the process's standard output
#[cfg(windows)]
pub fn duplicate_stdout() -> io::Result<File> {
    use std::os::windows::io::AsHandle;
    Ok(File::from(io::stdout().as_handle().try_clone_to_owned()?))
}

/// Relay input on a duplicate of stdin
///
/// Reads go through a `BufReader`, so single-byte chunk reads stay cheap while
/// a refill still returns as soon as any data is available.
pub fn open_input() -> io::Result<BufReader<File>> {
    let file = duplicate_stdin()?;
    log::trace!("duplicated stdin for relay input");
    Ok(BufReader::new(file))
}

/// Relay output on a duplicate of stdout
pub fn open_output(mode: BufferMode) -> io::Result<RelayWriter<File>> {
    let file = duplicate_stdout()?;
    log::trace!("duplicated stdout for relay output ({})", mode.as_str());
    Ok(RelayWriter::new(file, mode))
}
