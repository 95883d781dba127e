//! Splitting one raw command line into an argument vector and a background
//! flag.

/// Upper bound, in bytes, for one command line including its terminator.
pub const MAX_LINE: usize = 80;

/// Upper bound for the number of arguments a single line can produce.
pub const MAX_ARGS: usize = MAX_LINE / 2 + 1;

/// Fixed-capacity byte buffer holding the line currently being interpreted.
///
/// The buffer is refilled at the start of every prompt iteration; the
/// argument slices produced by [`split_args`] borrow from it and must not be
/// retained past the next [`fill`](LineBuffer::fill).
pub struct LineBuffer {
    bytes: [u8; MAX_LINE],
    len: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            bytes: [0; MAX_LINE],
            len: 0,
        }
    }

    /// Store `line` followed by a newline terminator, silently dropping
    /// anything beyond the buffer capacity. Truncation never splits a UTF-8
    /// sequence.
    pub fn fill(&mut self, line: &str) {
        let mut cut = line.len().min(MAX_LINE - 1);
        while !line.is_char_boundary(cut) {
            cut -= 1;
        }
        self.bytes[..cut].copy_from_slice(&line.as_bytes()[..cut]);
        self.bytes[cut] = b'\n';
        self.len = cut + 1;
    }

    /// View of the stored line, terminator included.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or("")
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of splitting one line: borrowed argument slices plus the flag
/// telling the launcher not to wait for the command.
#[derive(Debug)]
pub struct SplitLine<'a> {
    /// Arguments in order; the first one, if present, is non-empty.
    pub argv: Vec<&'a str>,
    /// True iff an `&` appeared anywhere in the line.
    pub background: bool,
}

/// Split `line` into whitespace-delimited arguments.
///
/// Space and tab separate arguments and consecutive separators collapse so
/// no empty argument is ever emitted. A newline ends the scan; when none is
/// present the trailing argument is still closed. An `&` anywhere sets the
/// background flag, discards the argument in progress and contributes no
/// argument of its own. At most [`MAX_ARGS`] arguments are produced; excess
/// text is silently dropped.
pub fn split_args(line: &str) -> SplitLine<'_> {
    let bytes = line.as_bytes();
    let mut argv: Vec<&str> = Vec::new();
    let mut background = false;
    let mut start: Option<usize> = None;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b' ' | b'\t' => {
                if let Some(s) = start.take() {
                    if argv.len() < MAX_ARGS {
                        argv.push(&line[s..i]);
                    }
                }
            }
            b'\n' => {
                if let Some(s) = start.take() {
                    if argv.len() < MAX_ARGS {
                        argv.push(&line[s..i]);
                    }
                }
                break;
            }
            // `&` requests background execution wherever it appears; the
            // argument being scanned is abandoned, not emitted.
            b'&' => {
                background = true;
                start = None;
            }
            _ => {
                if start.is_none() {
                    start = Some(i);
                }
            }
        }
    }

    if let Some(s) = start {
        if argv.len() < MAX_ARGS {
            argv.push(&line[s..bytes.len()]);
        }
    }

    SplitLine { argv, background }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_collapses_between_arguments() {
        let split = split_args("ls   -l\t\tsrc\n");
        assert_eq!(split.argv, vec!["ls", "-l", "src"]);
        assert!(!split.background);
    }

    #[test]
    fn test_rejoining_reproduces_normalized_line() {
        let split = split_args("  echo   one \t two  \n");
        assert_eq!(split.argv.join(" "), "echo one two");
    }

    #[test]
    fn test_blank_line_yields_no_arguments() {
        assert!(split_args("\n").argv.is_empty());
        assert!(split_args("   \t  \n").argv.is_empty());
        assert!(split_args("").argv.is_empty());
    }

    #[test]
    fn test_missing_terminator_still_closes_last_argument() {
        let split = split_args("echo hi");
        assert_eq!(split.argv, vec!["echo", "hi"]);
    }

    #[test]
    fn test_trailing_ampersand_sets_background() {
        let split = split_args("sleep 2 &\n");
        assert_eq!(split.argv, vec!["sleep", "2"]);
        assert!(split.background);
    }

    #[test]
    fn test_ampersand_never_appears_as_argument() {
        let split = split_args("sleep 2 &\n");
        assert!(!split.argv.contains(&"&"));
    }

    #[test]
    fn test_ampersand_discards_argument_in_progress() {
        // `&` resets the scan without emitting what came before it.
        let split = split_args("ab&cd\n");
        assert_eq!(split.argv, vec!["cd"]);
        assert!(split.background);
    }

    #[test]
    fn test_ampersand_glued_to_command_drops_it() {
        let split = split_args("ls&\n");
        assert!(split.argv.is_empty());
        assert!(split.background);
    }

    #[test]
    fn test_argument_count_is_capped() {
        let line = "x ".repeat(MAX_ARGS + 10);
        let split = split_args(&line);
        assert_eq!(split.argv.len(), MAX_ARGS);
    }

    #[test]
    fn test_buffer_truncates_long_lines() {
        let mut buf = LineBuffer::new();
        let line = format!("{} tail", "a".repeat(100));
        buf.fill(&line);

        assert_eq!(buf.as_str().len(), MAX_LINE);
        assert!(buf.as_str().ends_with('\n'));

        let split = split_args(buf.as_str());
        assert_eq!(split.argv, vec!["a".repeat(79).as_str()]);
    }

    #[test]
    fn test_buffer_truncation_respects_char_boundaries() {
        // 'é' is two bytes; position 79 falls in the middle of one.
        let line = format!("{}é rest", "a".repeat(78));
        let mut buf = LineBuffer::new();
        buf.fill(&line);

        assert!(buf.as_str().ends_with('\n'));
        let split = split_args(buf.as_str());
        assert_eq!(split.argv, vec!["a".repeat(78).as_str()]);
    }

    #[test]
    fn test_buffer_is_overwritten_by_next_fill() {
        let mut buf = LineBuffer::new();
        buf.fill("first line with several words");
        buf.fill("second");
        assert_eq!(buf.as_str(), "second\n");
    }
}
