//! Owned source buffers and the InvalidInput error family

use crate::config::compile_time::input::MAX_BUFFER_SIZE;
use crate::config::runtime::InputPreferences;
use crate::logging::codes;
use crate::utils::{Location, Position};
use crate::{log_debug, log_error};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

const BYTE_ORDER_MARK: &str = "\u{feff}";

/// Input rejected before scanning starts
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Source not found: {path}")]
    NotFound { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Source too large: {size} bytes (max: {max_size})")]
    TooLarge { size: usize, max_size: usize },

    #[error("Invalid UTF-8 at byte {offset} ({location})")]
    InvalidEncoding { offset: usize, location: Location },

    #[error("I/O error reading source: {message}")]
    Io { message: String },
}

impl InputError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            InputError::NotFound { .. } => codes::input::SOURCE_NOT_FOUND,
            InputError::PermissionDenied { .. } => codes::input::PERMISSION_DENIED,
            InputError::TooLarge { .. } => codes::input::BUFFER_TOO_LARGE,
            InputError::InvalidEncoding { .. } => codes::input::INVALID_ENCODING,
            InputError::Io { .. } => codes::input::IO_ERROR,
        }
    }

    /// Where in the source the problem is, when it is known
    pub fn location(&self) -> Option<Location> {
        match self {
            InputError::InvalidEncoding { location, .. } => Some(*location),
            _ => None,
        }
    }

    fn from_io(path: &Path, error: std::io::Error) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            ErrorKind::NotFound => InputError::NotFound { path },
            ErrorKind::PermissionDenied => InputError::PermissionDenied { path },
            _ => InputError::Io {
                message: format!("{}: {}", path, error),
            },
        }
    }
}

/// Validate a raw buffer and return the text the scanner should see.
///
/// Rejects buffers over `input.max_buffer_size` and invalid UTF-8. The error
/// for bad UTF-8 carries the byte offset and the line/column where the bad
/// sequence starts.
pub fn decode<'a>(bytes: &'a [u8], preferences: &InputPreferences) -> Result<&'a str, InputError> {
    if bytes.len() > MAX_BUFFER_SIZE {
        let error = InputError::TooLarge {
            size: bytes.len(),
            max_size: MAX_BUFFER_SIZE,
        };
        log_error!(error.error_code(), &error.to_string());
        return Err(error);
    }

    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(utf8_error) => {
            let offset = utf8_error.valid_up_to();
            // The valid prefix is guaranteed to decode
            let prefix = std::str::from_utf8(&bytes[..offset]).unwrap_or_default();
            let at = end_position(prefix);
            let error = InputError::InvalidEncoding {
                offset,
                location: Location::at(at),
            };
            log_error!(error.error_code(), "Source is not valid UTF-8",
                location = Location::at(at), "offset" => offset);
            return Err(error);
        }
    };

    if preferences.strip_byte_order_mark {
        if let Some(stripped) = text.strip_prefix(BYTE_ORDER_MARK) {
            log_debug!("Stripped UTF-8 byte-order mark");
            return Ok(stripped);
        }
    }

    Ok(text)
}

/// Position just past the end of `text`, using the scanner's column rules
fn end_position(text: &str) -> Position {
    let tab_width = crate::config::compile_time::lexical::TAB_WIDTH;
    let mut position = Position::start();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        position = match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                position.newline()
            }
            other => position.advance(other, tab_width),
        };
    }
    position
}

/// A named, owned input buffer. Scanners borrow from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    name: String,
    bytes: Vec<u8>,
}

impl SourceBuffer {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self::from_bytes(name, text.as_bytes())
    }

    /// Read a file, enforcing the buffer size limit before reading it
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| InputError::from_io(path, e))?;

        if metadata.len() > MAX_BUFFER_SIZE as u64 {
            let error = InputError::TooLarge {
                size: usize::try_from(metadata.len()).unwrap_or(usize::MAX),
                max_size: MAX_BUFFER_SIZE,
            };
            log_error!(error.error_code(), &error.to_string(), "path" => path.display());
            return Err(error);
        }

        let bytes = fs::read(path).map_err(|e| InputError::from_io(path, e))?;
        log_debug!("Read source file", "path" => path.display(), "bytes" => bytes.len());

        Ok(Self::from_bytes(path.display().to_string(), bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn prefs() -> InputPreferences {
        InputPreferences {
            strip_byte_order_mark: true,
        }
    }

    #[test]
    fn invalid_utf8_reports_offset_and_location() {
        let bytes = b"let a = 1;\nlet \xff = 2;";
        let err = decode(bytes, &prefs()).unwrap_err();

        assert_eq!(
            err,
            InputError::InvalidEncoding {
                offset: 15,
                location: Location::point(2, 5),
            }
        );
        assert_eq!(err.error_code(), codes::input::INVALID_ENCODING);
        assert_eq!(err.location(), Some(Location::point(2, 5)));
    }

    #[test]
    fn truncated_multibyte_sequence_is_rejected() {
        let bytes = [b'a', 0xE2, 0x82];
        assert_matches!(
            decode(&bytes, &prefs()),
            Err(InputError::InvalidEncoding { offset: 1, .. })
        );
    }

    #[test]
    fn byte_order_mark_is_optional() {
        let bytes = "\u{feff}let".as_bytes();
        assert_eq!(decode(bytes, &prefs()).unwrap(), "let");

        let keep = InputPreferences {
            strip_byte_order_mark: false,
        };
        assert_eq!(decode(bytes, &keep).unwrap(), "\u{feff}let");
    }

    #[test]
    fn buffer_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.src");
        fs::write(&path, "let x = 1;").unwrap();

        let buffer = SourceBuffer::from_path(&path).unwrap();
        assert_eq!(buffer.as_bytes(), b"let x = 1;");
        assert_eq!(buffer.len(), 10);
        assert!(buffer.name().ends_with("input.src"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = SourceBuffer::from_path(dir.path().join("missing.src"));
        assert_matches!(result, Err(InputError::NotFound { .. }));
    }

    #[test]
    fn end_position_counts_lines_and_tabs() {
        assert_eq!(end_position(""), Position::start());
        assert_eq!(end_position("ab\r\ncd"), Position::new(2, 3));
        assert_eq!(end_position("\t"), Position::new(1, 1 + TAB));
    }

    const TAB: u32 = crate::config::compile_time::lexical::TAB_WIDTH;
}
