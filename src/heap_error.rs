use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HeapError>;

/// Format an address the way the GC log prints them.
pub fn format_addr(addr: u64) -> String {
    format!("0x{:x}", addr)
}

/// Which stage of understanding the log broke down.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorLayer {
    /// The text itself is malformed: a bad address literal, an unknown color
    /// tag, a record outside of any section, an edge with no node to hang
    /// off of, or a line that is missing fields.
    Format,
    /// The text parsed but the graph it describes is inconsistent, like an
    /// edge or root pointing at an address that was never declared, or a node
    /// address declared twice.
    Referential,
    /// A node's type tag and details don't map onto any kind we know about.
    /// We never guess.
    Classification,
    /// Reading the log or writing out the result failed.
    Io,
}

impl fmt::Display for ErrorLayer {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let str = match self {
            ErrorLayer::Format => "format",
            ErrorLayer::Referential => "referential",
            ErrorLayer::Classification => "classification",
            ErrorLayer::Io => "I/O",
        };
        formatter.write_str(str)
    }
}

/// Details about what went wrong.
#[derive(Debug)]
pub struct ErrorDetails {
    pub layer: ErrorLayer,
    pub message: String,
}

/// Every error is fatal to the run; there is no skip-and-continue mode.
#[derive(Debug, Error)]
pub enum HeapError {
    /// A problem attributable to a specific (1-based) line of the log.
    #[error("{} error on line {lineno}: {}", .details.layer, .details.message)]
    AtLine { lineno: usize, details: ErrorDetails },
    /// A problem not tied to a line, like a dangling reference found while
    /// marking or emitting.
    #[error("{} error: {}", .0.layer, .0.message)]
    General(ErrorDetails),
}

impl HeapError {
    pub fn format(message: String) -> HeapError {
        HeapError::General(ErrorDetails {
            layer: ErrorLayer::Format,
            message,
        })
    }

    pub fn referential(message: String) -> HeapError {
        HeapError::General(ErrorDetails {
            layer: ErrorLayer::Referential,
            message,
        })
    }

    pub fn classification(message: String) -> HeapError {
        HeapError::General(ErrorDetails {
            layer: ErrorLayer::Classification,
            message,
        })
    }

    pub fn layer(&self) -> ErrorLayer {
        match self {
            HeapError::AtLine { details, .. } => details.layer,
            HeapError::General(details) => details.layer,
        }
    }

    /// Attach a line number to an error that was raised without one.  Errors
    /// that already know their line are left alone.
    pub fn at_line(self, lineno: usize) -> HeapError {
        match self {
            HeapError::General(details) => HeapError::AtLine { lineno, details },
            located => located,
        }
    }
}

impl From<std::io::Error> for HeapError {
    fn from(err: std::io::Error) -> HeapError {
        HeapError::General(ErrorDetails {
            layer: ErrorLayer::Io,
            message: err.to_string(),
        })
    }
}

impl From<serde_json::Error> for HeapError {
    fn from(err: serde_json::Error) -> HeapError {
        HeapError::General(ErrorDetails {
            layer: ErrorLayer::Io,
            message: err.to_string(),
        })
    }
}

#[test]
fn test_error_display() {
    let err = HeapError::format("Expected address: 12".to_string()).at_line(7);
    assert_eq!(err.layer(), ErrorLayer::Format);
    assert_eq!(err.to_string(), "format error on line 7: Expected address: 12");

    // Re-locating keeps the first line number.
    let err = err.at_line(9);
    assert_eq!(err.to_string(), "format error on line 7: Expected address: 12");

    let err = HeapError::referential(format!("Unknown edge target {}", format_addr(0xdead)));
    assert_eq!(err.to_string(), "referential error: Unknown edge target 0xdead");
}
