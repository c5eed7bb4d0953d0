//! Delimiter-counting pass-through of a byte stream
//!
//! The relay copies its input to its output untouched and reports one unit of
//! progress per delimiter-terminated segment. Matching happens chunk by chunk:
//! a delimiter that straddles two reads is not matched while streaming and is
//! only accounted for if it is still pending at end of input.

pub mod stream;

use std::io::{self, Read, Write};

/// Default chunk size in bytes when a custom delimiter is used
pub const DEFAULT_BUF_SIZE: usize = 256;

/// Default segment delimiter
pub const DEFAULT_DELIMITER: &[u8] = b"\n";

/// Totals reported by a completed relay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaySummary {
    /// Bytes written to the output
    pub bytes: u64,
    /// Units passed to the callback
    pub segments: u64,
}

/// Chunk size actually used for `delimiter`
///
/// A bare newline forces single-byte reads so that lines are forwarded as soon
/// as they are complete.
pub fn effective_chunk_size(delimiter: &[u8], chunk_size: usize) -> usize {
    if delimiter == DEFAULT_DELIMITER {
        1
    } else {
        chunk_size
    }
}

/// Copy `input` to `output`, calling `callback` once per delimited segment
///
/// Each segment is written with a single `write_all`. At end of input any
/// pending bytes are written and reported as `1 + occurrences of delimiter`
/// within them. Read and write errors are returned as-is.
pub fn relay<R, W, F>(
    mut input: R,
    mut output: W,
    delimiter: &[u8],
    chunk_size: usize,
    mut callback: F,
) -> io::Result<RelaySummary>
where
    R: Read,
    W: Write,
    F: FnMut(u64),
{
    if delimiter.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "delimiter must not be empty",
        ));
    }
    let chunk_size = effective_chunk_size(delimiter, chunk_size);
    if chunk_size == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "chunk size must be greater than 0",
        ));
    }

    log::debug!(
        "relaying with delimiter {:?} and chunk size {}",
        String::from_utf8_lossy(delimiter),
        chunk_size
    );

    let mut chunk = vec![0u8; chunk_size];
    let mut pending: Vec<u8> = Vec::new();
    let mut summary = RelaySummary::default();

    loop {
        let read = input.read(&mut chunk)?;

        if read == 0 {
            if !pending.is_empty() {
                output.write_all(&pending)?;
                let units = 1 + count_occurrences(&pending, delimiter);
                callback(units);
                summary.bytes += pending.len() as u64;
                summary.segments += units;
            }
            output.flush()?;
            log::debug!(
                "relay finished: {} bytes, {} segments",
                summary.bytes,
                summary.segments
            );
            return Ok(summary);
        }

        let data = &chunk[..read];
        let mut scan = 0;

        while let Some(offset) = find(&data[scan..], delimiter) {
            let end = scan + offset + delimiter.len();
            let segment_len = if pending.is_empty() {
                output.write_all(&data[scan..end])?;
                end - scan
            } else {
                pending.extend_from_slice(&data[scan..end]);
                output.write_all(&pending)?;
                let len = pending.len();
                pending.clear();
                len
            };
            callback(1);
            summary.bytes += segment_len as u64;
            summary.segments += 1;
            scan = end;
        }

        pending.extend_from_slice(&data[scan..]);
    }
}

/// Position of the first occurrence of `needle` in `haystack`
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    match needle {
        [byte] => haystack.iter().position(|b| b == byte),
        _ if needle.len() > haystack.len() => None,
        _ => haystack
            .windows(needle.len())
            .position(|window| window == needle),
    }
}

/// Non-overlapping occurrences of `needle` in `haystack`
fn count_occurrences(haystack: &[u8], needle: &[u8]) -> u64 {
    let mut count = 0;
    let mut rest = haystack;
    while let Some(offset) = find(rest, needle) {
        count += 1;
        rest = &rest[offset + needle.len()..];
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Writer that records every write call separately
    #[derive(Default)]
    struct RecordingWriter {
        writes: Vec<Vec<u8>>,
        flushes: usize,
    }

    impl Write for RecordingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    fn run(input: &[u8], delimiter: &[u8], chunk_size: usize) -> (RecordingWriter, Vec<u64>) {
        let mut writer = RecordingWriter::default();
        let mut calls = Vec::new();
        relay(
            Cursor::new(input.to_vec()),
            &mut writer,
            delimiter,
            chunk_size,
            |n| calls.push(n),
        )
        .unwrap();
        (writer, calls)
    }

    #[test]
    fn test_lines_with_trailing_fragment() {
        let (writer, calls) = run(b"a\nb\nc", b"\n", 1);
        assert_eq!(
            writer.writes,
            vec![b"a\n".to_vec(), b"b\n".to_vec(), b"c".to_vec()]
        );
        assert_eq!(calls, vec![1, 1, 1]);
    }

    #[test]
    fn test_newline_ignores_requested_chunk_size() {
        assert_eq!(effective_chunk_size(b"\n", 4096), 1);
        assert_eq!(effective_chunk_size(b"\r\n", 4096), 4096);
        assert_eq!(effective_chunk_size(b",", 16), 16);
    }

    #[test]
    fn test_empty_input() {
        let (writer, calls) = run(b"", b"\n", 1);
        assert!(writer.writes.is_empty());
        assert!(calls.is_empty());
        assert_eq!(writer.flushes, 1);
    }

    #[test]
    fn test_input_ending_with_delimiter_has_no_extra_flush() {
        let (writer, calls) = run(b"x,y,", b",", 64);
        assert_eq!(writer.writes, vec![b"x,".to_vec(), b"y,".to_vec()]);
        assert_eq!(calls, vec![1, 1]);
    }

    #[test]
    fn test_segment_spanning_chunks_is_written_once() {
        let (writer, calls) = run(b"abcdef,gh", b",", 2);
        assert_eq!(writer.writes, vec![b"abcdef,".to_vec(), b"gh".to_vec()]);
        assert_eq!(calls, vec![1, 1]);
    }

    #[test]
    fn test_multi_byte_delimiter() {
        let (writer, calls) = run(b"one::two::three", b"::", 64);
        assert_eq!(
            writer.writes,
            vec![b"one::".to_vec(), b"two::".to_vec(), b"three".to_vec()]
        );
        assert_eq!(calls, vec![1, 1, 1]);
    }

    #[test]
    fn test_straddling_delimiter_is_counted_at_flush() {
        // "::" is split across the two 3-byte reads and never matched in a chunk
        let (writer, calls) = run(b"ab::cd", b"::", 3);
        assert_eq!(writer.writes, vec![b"ab::cd".to_vec()]);
        assert_eq!(calls, vec![2]);
    }

    #[test]
    fn test_null_delimiter() {
        let (writer, calls) = run(b"a\0bb\0", b"\0", 256);
        assert_eq!(writer.writes.concat(), b"a\0bb\0".to_vec());
        assert_eq!(calls, vec![1, 1]);
    }

    #[test]
    fn test_summary_totals() {
        let summary = relay(Cursor::new(b"1\n2\n3".to_vec()), Vec::new(), b"\n", 1, |_| {}).unwrap();
        assert_eq!(
            summary,
            RelaySummary {
                bytes: 5,
                segments: 3
            }
        );
    }

    #[test]
    fn test_rejects_empty_delimiter_and_zero_chunk() {
        let err = relay(Cursor::new(b"x".to_vec()), Vec::new(), b"", 4, |_| {}).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let err = relay(Cursor::new(b"x".to_vec()), Vec::new(), b",", 0, |_| {}).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_read_error_propagates() {
        struct FailingReader;
        impl Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
        }

        let err = relay(FailingReader, Vec::new(), b"\n", 1, |_| {}).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_write_error_propagates() {
        struct FailingWriter;
        impl Write for FailingWriter {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut calls = 0;
        let err = relay(Cursor::new(b"a\nb".to_vec()), FailingWriter, b"\n", 1, |_| {
            calls += 1
        })
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_count_occurrences_is_non_overlapping() {
        assert_eq!(count_occurrences(b"aaaa", b"aa"), 2);
        assert_eq!(count_occurrences(b"", b","), 0);
        assert_eq!(count_occurrences(b"a,b,c", b","), 2);
    }
}
