//! Tokenizers for the three input sources.
//!
//! - **Vector source**: whitespace-separated hexadecimal values, optional
//!   `0x` prefix. Reading stops at the first token that is not a 16-bit hex
//!   value, and everything read before it is kept.
//! - **Delay source**: whitespace-separated decimal service times. Any bad
//!   token is an error.
//! - **Trace**: one `KIND, operand` per line. Blank lines and lines starting
//!   with `#` are ignored; anything else that does not parse is reported as a
//!   malformed line and skipped.

use interrupt_core::{ErrorClass, Operation, OperationKind, TraceRecord, UnknownNameError};
use thiserror::Error;
use tracing::warn;

/// A source token that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedToken {
    /// 1-based line the token is on.
    pub line: usize,
    /// The token text.
    pub token: String,
}

/// Parsed vector source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VectorSource {
    /// Vector targets in source order.
    pub targets: Vec<u16>,
    /// Token that ended reading early, if any.
    pub rejected: Option<RejectedToken>,
}

/// Error in a table source that cannot be recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Delay token is not a non-negative decimal integer.
    #[error("invalid device delay '{token}' (expected a non-negative decimal integer)")]
    InvalidDelay {
        /// 1-based line of the token.
        line: usize,
        /// The token text.
        token: String,
    },
}

impl SourceError {
    /// Line the error was found on.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::InvalidDelay { line, .. } => *line,
        }
    }
}

/// Why a trace line produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecord {
    /// No comma between kind and operand.
    #[error("missing ',' between operation kind and operand")]
    MissingComma,
    /// Kind keyword is not recognized.
    #[error(transparent)]
    UnknownKind(#[from] UnknownNameError),
    /// Operand is not an integer of the kind's type.
    #[error("invalid {kind} operand '{operand}'")]
    InvalidOperand {
        /// Kind the operand belongs to.
        kind: OperationKind,
        /// The operand text.
        operand: String,
    },
}

impl MalformedRecord {
    /// Always [`ErrorClass::MalformedRecord`].
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::MalformedRecord
    }
}

/// One meaningful trace line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceLine {
    /// Line parsed into a record.
    Record(TraceRecord),
    /// Line skipped, with the reason.
    Malformed {
        /// 1-based line number.
        line: usize,
        /// Why it was skipped.
        reason: MalformedRecord,
    },
}

fn tokens(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .flat_map(|(index, line)| line.split_whitespace().map(move |token| (index + 1, token)))
}

fn parse_hex_u16(token: &str) -> Option<u16> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u16::from_str_radix(digits, 16).ok()
}

/// Parses the vector source.
#[must_use]
pub fn parse_vector_source(text: &str) -> VectorSource {
    let mut source = VectorSource::default();
    for (line, token) in tokens(text) {
        if let Some(target) = parse_hex_u16(token) {
            source.targets.push(target);
        } else {
            warn!(line, token, "vector source stopped at non-hex token");
            source.rejected = Some(RejectedToken {
                line,
                token: token.to_string(),
            });
            break;
        }
    }
    source
}

/// Parses the delay source.
///
/// # Errors
///
/// Returns [`SourceError::InvalidDelay`] for the first token that is not a
/// non-negative decimal integer.
pub fn parse_delay_source(text: &str) -> Result<Vec<u64>, SourceError> {
    tokens(text)
        .map(|(line, token)| {
            token.parse::<u64>().map_err(|_| SourceError::InvalidDelay {
                line,
                token: token.to_string(),
            })
        })
        .collect()
}

/// Parses a call or device number. Integers outside `i64` saturate so that
/// they still reach the table lookup and fail there.
fn parse_table_number(operand: &str) -> Option<i64> {
    if let Ok(number) = operand.parse() {
        return Some(number);
    }
    let (negative, digits) = operand.strip_prefix('-').map_or_else(
        || (false, operand.strip_prefix('+').unwrap_or(operand)),
        |digits| (true, digits),
    );
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

fn parse_operation(text: &str) -> Result<Operation, MalformedRecord> {
    let (kind, operand) = text.split_once(',').ok_or(MalformedRecord::MissingComma)?;
    let kind: OperationKind = kind.trim().parse()?;
    let operand = operand.trim();
    let invalid = || MalformedRecord::InvalidOperand {
        kind,
        operand: operand.to_string(),
    };
    match kind {
        OperationKind::Cpu => operand
            .parse()
            .map(|burst| Operation::Cpu { burst })
            .map_err(|_| invalid()),
        OperationKind::Syscall => parse_table_number(operand)
            .map(|call| Operation::Syscall { call })
            .ok_or_else(invalid),
        OperationKind::EndIo => parse_table_number(operand)
            .map(|device| Operation::EndIo { device })
            .ok_or_else(invalid),
    }
}

/// Parses one trace line. Returns `None` for blank and comment lines.
#[must_use]
pub fn parse_trace_line(line: usize, text: &str) -> Option<TraceLine> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    Some(match parse_operation(trimmed) {
        Ok(operation) => TraceLine::Record(TraceRecord::new(line, operation)),
        Err(reason) => TraceLine::Malformed { line, reason },
    })
}

/// Parses a whole trace.
#[must_use]
pub fn parse_trace(text: &str) -> Vec<TraceLine> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| parse_trace_line(index + 1, line))
        .collect()
}

#[cfg(test)]
mod tests {
    use interrupt_core::{Operation, OperationKind, TraceRecord};
    use rstest::rstest;

    use super::{
        parse_delay_source, parse_trace, parse_trace_line, parse_vector_source, MalformedRecord,
        RejectedToken, SourceError, TraceLine,
    };

    #[test]
    fn vector_source_reads_hex_with_and_without_prefix() {
        let source = parse_vector_source("0X01E3\n0x029C\n0695\n042b\n");
        assert_eq!(source.targets, vec![0x01E3, 0x029C, 0x0695, 0x042B]);
        assert!(source.rejected.is_none());
    }

    #[test]
    fn vector_source_stops_at_first_bad_token() {
        let source = parse_vector_source("0x01E3\n0x029C\nnot-hex\n0x0695\n");
        assert_eq!(source.targets, vec![0x01E3, 0x029C]);
        assert_eq!(
            source.rejected,
            Some(RejectedToken {
                line: 3,
                token: "not-hex".to_string(),
            })
        );
    }

    #[test]
    fn vector_source_rejects_values_wider_than_sixteen_bits() {
        let source = parse_vector_source("0x1FFFF");
        assert!(source.targets.is_empty());
        assert!(source.rejected.is_some());
    }

    #[test]
    fn delay_source_accepts_any_whitespace() {
        let delays = parse_delay_source("110\n150 40\r\n\n250\n").expect("valid delays");
        assert_eq!(delays, vec![110, 150, 40, 250]);
    }

    #[rstest]
    #[case("110\n-5\n", 2, "-5")]
    #[case("110\n150\nabc\n", 3, "abc")]
    #[case("0x10\n", 1, "0x10")]
    fn delay_source_reports_bad_token(
        #[case] text: &str,
        #[case] line: usize,
        #[case] token: &str,
    ) {
        let error = parse_delay_source(text).expect_err("bad delay");
        assert_eq!(
            error,
            SourceError::InvalidDelay {
                line,
                token: token.to_string(),
            }
        );
        assert_eq!(error.line(), line);
    }

    #[rstest]
    #[case("CPU, 500", Operation::Cpu { burst: 500 })]
    #[case("CPU,500", Operation::Cpu { burst: 500 })]
    #[case("  SYSCALL ,  7\r", Operation::Syscall { call: 7 })]
    #[case("END_IO, 12", Operation::EndIo { device: 12 })]
    #[case("END_IO, -1", Operation::EndIo { device: -1 })]
    #[case("SYSCALL, 0", Operation::Syscall { call: 0 })]
    #[case("SYSCALL, 99999999999999999999", Operation::Syscall { call: i64::MAX })]
    #[case("END_IO, +99999999999999999999", Operation::EndIo { device: i64::MAX })]
    #[case("END_IO, -99999999999999999999", Operation::EndIo { device: i64::MIN })]
    fn trace_lines_parse(#[case] text: &str, #[case] operation: Operation) {
        assert_eq!(
            parse_trace_line(4, text),
            Some(TraceLine::Record(TraceRecord::new(4, operation)))
        );
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        assert_eq!(parse_trace_line(1, ""), None);
        assert_eq!(parse_trace_line(1, "   \t"), None);
        assert_eq!(parse_trace_line(1, "# warm-up burst"), None);
    }

    #[test]
    fn unknown_kind_is_malformed() {
        let Some(TraceLine::Malformed { line, reason }) = parse_trace_line(9, "FORK, 3") else {
            panic!("FORK should be malformed");
        };
        assert_eq!(line, 9);
        assert!(matches!(reason, MalformedRecord::UnknownKind(_)));
        assert_eq!(
            reason.to_string(),
            "unknown operation kind 'FORK' (expected one of: CPU, SYSCALL, END_IO)"
        );
    }

    #[rstest]
    #[case("CPU 500", MalformedRecord::MissingComma)]
    #[case(
        "CPU, -5",
        MalformedRecord::InvalidOperand { kind: OperationKind::Cpu, operand: "-5".to_string() }
    )]
    #[case(
        "SYSCALL, seven",
        MalformedRecord::InvalidOperand { kind: OperationKind::Syscall, operand: "seven".to_string() }
    )]
    #[case(
        "SYSCALL, 9x9",
        MalformedRecord::InvalidOperand { kind: OperationKind::Syscall, operand: "9x9".to_string() }
    )]
    #[case(
        "END_IO, -",
        MalformedRecord::InvalidOperand { kind: OperationKind::EndIo, operand: "-".to_string() }
    )]
    #[case(
        "END_IO,",
        MalformedRecord::InvalidOperand { kind: OperationKind::EndIo, operand: String::new() }
    )]
    fn bad_lines_report_reason(#[case] text: &str, #[case] expected: MalformedRecord) {
        assert_eq!(
            parse_trace_line(2, text),
            Some(TraceLine::Malformed {
                line: 2,
                reason: expected,
            })
        );
    }

    #[test]
    fn trace_keeps_source_line_numbers() {
        let lines = parse_trace("CPU, 10\n\n# note\nSYSCALL, 2\nbogus\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            TraceLine::Record(TraceRecord::new(1, Operation::Cpu { burst: 10 }))
        );
        assert_eq!(
            lines[1],
            TraceLine::Record(TraceRecord::new(4, Operation::Syscall { call: 2 }))
        );
        assert!(matches!(lines[2], TraceLine::Malformed { line: 5, .. }));
    }
}
