//! Operation keywords and their usage lines.

use std::fmt;

/// An operation named on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayOp {
    /// `print <name>`
    Print,
    /// `free <name>`
    Free,
    /// `realloc <name> <size>`
    Realloc,
    /// `alloc <name> <size>`
    Alloc,
}

impl ArrayOp {
    /// Parse a keyword. Matching is exact and case-sensitive.
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "print" => Some(Self::Print),
            "free" => Some(Self::Free),
            "realloc" => Some(Self::Realloc),
            "alloc" => Some(Self::Alloc),
            _ => None,
        }
    }

    /// The keyword as typed.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Free => "free",
            Self::Realloc => "realloc",
            Self::Alloc => "alloc",
        }
    }

    /// Exact argument count, program name included.
    pub fn argc(self) -> usize {
        match self {
            Self::Print | Self::Free => 4,
            Self::Realloc | Self::Alloc => 5,
        }
    }

    /// Usage line for this operation.
    pub fn usage(self, prog: &str) -> String {
        match self {
            Self::Print | Self::Free => format!(
                "{op} array usage: {prog} <file_name> {op} <array_name>",
                op = self.keyword()
            ),
            Self::Realloc | Self::Alloc => format!(
                "{op} array usage: {prog} <file_name> {op} <array_name> <size>",
                op = self.keyword()
            ),
        }
    }
}

impl fmt::Display for ArrayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Usage line printed when no valid operation was given.
pub fn generic_usage(prog: &str) -> String {
    format!("usage: {prog} <file_name> <print|alloc|free|realloc> <array_name>")
}

/// Parse a `<size>` argument the way `strtol` reads a number.
///
/// Leading whitespace and a sign are accepted and parsing stops at the
/// first non-digit, so `"12abc"` is 12. Anything that does not yield a
/// positive integer comes back as 0, which the registry rejects as an
/// invalid size.
pub fn parse_size(arg: &str) -> u64 {
    let s = arg.trim_start();
    let sign = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign..].bytes().take_while(u8::is_ascii_digit).count();
    match s[..sign + digits].parse::<i64>() {
        Ok(n) if n > 0 => n as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip() {
        for op in [ArrayOp::Print, ArrayOp::Free, ArrayOp::Realloc, ArrayOp::Alloc] {
            assert_eq!(ArrayOp::parse(op.keyword()), Some(op));
        }
        assert_eq!(ArrayOp::parse("PRINT"), None);
        assert_eq!(ArrayOp::parse("dump"), None);
    }

    #[test]
    fn usage_lines() {
        assert_eq!(
            ArrayOp::Print.usage("./pmarray"),
            "print array usage: ./pmarray <file_name> print <array_name>"
        );
        assert_eq!(
            ArrayOp::Free.usage("p"),
            "free array usage: p <file_name> free <array_name>"
        );
        assert_eq!(
            ArrayOp::Realloc.usage("p"),
            "realloc array usage: p <file_name> realloc <array_name> <size>"
        );
        assert_eq!(
            ArrayOp::Alloc.usage("p"),
            "alloc array usage: p <file_name> alloc <array_name> <size>"
        );
        assert_eq!(
            generic_usage("p"),
            "usage: p <file_name> <print|alloc|free|realloc> <array_name>"
        );
    }

    #[test]
    fn sizes() {
        assert_eq!(parse_size("12"), 12);
        assert_eq!(parse_size("0"), 0);
        assert_eq!(parse_size("-3"), 0);
        assert_eq!(parse_size("ten"), 0);
        assert_eq!(parse_size(""), 0);
    }

    #[test]
    fn sizes_stop_at_first_non_digit() {
        assert_eq!(parse_size("12abc"), 12);
        assert_eq!(parse_size("  +7"), 7);
        assert_eq!(parse_size("3.9"), 3);
        assert_eq!(parse_size("-4x"), 0);
        assert_eq!(parse_size("+"), 0);
        assert_eq!(parse_size("99999999999999999999"), 0);
    }
}
