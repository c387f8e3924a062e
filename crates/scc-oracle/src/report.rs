//! The score protocol spoken to the fuzzing driver.
//!
//! Every line is preceded by a blank line:
//!
//! ```text
//!
//! FUZZ:HIT          (interesting reports only)
//!
//! FUZZ:SCORE:<n>
//!
//! FUZZ:MSG:<text>
//! ```
//!
//! Emitting a report is the last thing an oracle process does; see
//! [`terminate`].

use std::io::Write;

use serde::{Deserialize, Serialize};

pub const SCORE_PREFIX: &str = "FUZZ:SCORE:";
pub const MSG_PREFIX: &str = "FUZZ:MSG:";
pub const HIT_MARKER: &str = "FUZZ:HIT";
pub const DEAD_MARKER: &str = "FUZZ:DEAD";

/// Score carried by every interesting report.
pub const INTERESTING_SCORE: i64 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Score,
    Interesting,
    /// Scored, and the driver should stop mutating this candidate.
    DeadEnd,
}

/// The single terminal value an oracle process produces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutcomeReport {
    pub kind: OutcomeKind,
    pub value: i64,
    pub message: String,
}

impl OutcomeReport {
    pub fn score(message: impl Into<String>, value: i64) -> Self {
        Self {
            kind: OutcomeKind::Score,
            value,
            message: message.into(),
        }
    }

    pub fn interesting(message: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Interesting,
            value: INTERESTING_SCORE,
            message: message.into(),
        }
    }

    pub fn dead_end(message: impl Into<String>, value: i64) -> Self {
        Self {
            kind: OutcomeKind::DeadEnd,
            value,
            message: message.into(),
        }
    }

    /// The `FUZZ:SCORE:<n>` line, without surrounding newlines.
    pub fn score_line(&self) -> String {
        format!("{SCORE_PREFIX}{}", self.value)
    }

    /// Render the full protocol text exactly as written to stdout.
    pub fn render(&self) -> String {
        let mut out = String::new();
        match self.kind {
            OutcomeKind::Score => {}
            OutcomeKind::Interesting => push_line(&mut out, HIT_MARKER),
            OutcomeKind::DeadEnd => push_line(&mut out, DEAD_MARKER),
        }
        push_line(&mut out, &self.score_line());
        push_line(&mut out, &format!("{MSG_PREFIX}{}", self.message));
        out
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(self.render().as_bytes())?;
        out.flush()
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push('\n');
    out.push_str(line);
    out.push('\n');
}

/// Write `report` to stdout and exit the process with status 0.
///
/// Callers owning a scratch directory must tear it down first; prefer
/// [`crate::OracleContext::report`], which does both.
pub fn terminate(report: &OutcomeReport) -> ! {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    if let Err(e) = report.write_to(&mut lock) {
        eprintln!("failed to write oracle report: {e}");
        std::process::exit(1);
    }
    std::process::exit(0)
}

/// Oracle output as the driver interprets it.
///
/// The driver merges the oracle's stderr into stdout, so `output` may carry
/// arbitrary noise around the protocol lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feedback {
    /// A `FUZZ:HIT` line was present.
    pub hit: bool,
    /// `hit`, or the score line is missing or not an integer. The driver
    /// keeps such candidates so a broken oracle does not go unnoticed.
    pub interesting: bool,
    pub dead_end: bool,
    /// Raw text after `FUZZ:SCORE:`, up to end of line.
    pub score: Option<String>,
    pub message: Option<String>,
}

impl Feedback {
    pub fn parse(output: &str) -> Self {
        let hit = has_line(output, HIT_MARKER);
        let score = value_after(output, SCORE_PREFIX);
        let scored = score.as_deref().and_then(leading_integer).is_some();
        Self {
            hit,
            interesting: hit || !scored,
            dead_end: has_line(output, DEAD_MARKER),
            score,
            message: value_after(output, MSG_PREFIX),
        }
    }

    /// The score as the driver reads it: leading whitespace skipped, an
    /// optional sign, then decimal digits. Anything after the digits is
    /// ignored. `None` when there are no digits or the value overflows.
    pub fn score_value(&self) -> Option<i64> {
        self.score.as_deref().and_then(leading_integer)
    }
}

fn leading_integer(text: &str) -> Option<i64> {
    // C `isspace` also accepts vertical tab.
    let text = text.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b');
    let sign = usize::from(text.starts_with(['+', '-']));
    let digits = text[sign..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    text[..sign + digits].parse().ok()
}

/// Text following the first line that starts with `key`, up to end of line.
fn value_after(output: &str, key: &str) -> Option<String> {
    let haystack = format!("\n{output}");
    let needle = format!("\n{key}");
    let start = haystack.find(&needle)? + needle.len();
    let rest = &haystack[start..];
    Some(match rest.find('\n') {
        Some(end) => rest[..end].to_string(),
        None => rest.to_string(),
    })
}

/// Whether `key` appears as a whole line.
fn has_line(output: &str, key: &str) -> bool {
    format!("\n{output}\n").contains(&format!("\n{key}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_score() {
        let report = OutcomeReport::score("Failed to compile program", -30000005);
        assert_eq!(
            report.render(),
            "\nFUZZ:SCORE:-30000005\n\nFUZZ:MSG:Failed to compile program\n"
        );
    }

    #[test]
    fn test_render_interesting() {
        let report = OutcomeReport::interesting("miscompile");
        assert_eq!(report.value, 1);
        assert_eq!(
            report.render(),
            "\nFUZZ:HIT\n\nFUZZ:SCORE:1\n\nFUZZ:MSG:miscompile\n"
        );
    }

    #[test]
    fn test_render_dead_end() {
        let report = OutcomeReport::dead_end("no progress", -5);
        assert_eq!(
            report.render(),
            "\nFUZZ:DEAD\n\nFUZZ:SCORE:-5\n\nFUZZ:MSG:no progress\n"
        );
    }

    #[test]
    fn test_write_to_matches_render() {
        let report = OutcomeReport::score("ok", 42);
        let mut buf = Vec::new();
        report.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), report.render());
    }

    #[test]
    fn test_feedback_reads_own_reports() {
        let fb = Feedback::parse(&OutcomeReport::interesting("found it").render());
        assert!(fb.hit);
        assert!(fb.interesting);
        assert!(!fb.dead_end);
        assert_eq!(fb.score_value(), Some(1));
        assert_eq!(fb.message.as_deref(), Some("found it"));

        let fb = Feedback::parse(&OutcomeReport::score("meh", -3).render());
        assert!(!fb.interesting);
        assert_eq!(fb.score_value(), Some(-3));
    }

    #[test]
    fn test_feedback_value_after() {
        assert_eq!(value_after("KEY:A", "KEY:").as_deref(), Some("A"));
        assert_eq!(value_after("KEY:A\n", "KEY:").as_deref(), Some("A"));
        assert_eq!(value_after("\nKEY:A\n\n", "KEY:").as_deref(), Some("A"));
        assert_eq!(value_after("\nKEY:\nA\n\n", "KEY:").as_deref(), Some(""));
        assert_eq!(value_after("", "KEY:"), None);
        assert_eq!(value_after("NOTKEY:A\n", "KEY:"), None);
    }

    #[test]
    fn test_feedback_has_line() {
        assert!(!has_line("KEYA", "KEY"));
        assert!(!has_line("AKEY", "KEY"));
        assert!(has_line("KEY", "KEY"));
        assert!(has_line("a\nKEY", "KEY"));
        assert!(has_line("a\nKEY\nb", "KEY"));
        assert!(!has_line("a\naKEY\nb", "KEY"));
        assert!(!has_line("a\nKEYb\nb", "KEY"));
    }

    #[test]
    fn test_feedback_ignores_noise_and_takes_first_score() {
        let output = "warning: unused variable\n\nFUZZ:SCORE:7\n\nFUZZ:SCORE:9\n";
        let fb = Feedback::parse(output);
        assert_eq!(fb.score_value(), Some(7));
        assert_eq!(fb.message, None);
    }

    #[test]
    fn test_feedback_non_integer_score() {
        let fb = Feedback::parse("\nFUZZ:SCORE:lots\n");
        assert_eq!(fb.score.as_deref(), Some("lots"));
        assert_eq!(fb.score_value(), None);
        assert!(!fb.hit);
        assert!(fb.interesting);
    }

    #[test]
    fn test_feedback_missing_score_is_interesting() {
        let fb = Feedback::parse("Traceback: boom\n");
        assert_eq!(fb.score, None);
        assert!(!fb.hit);
        assert!(fb.interesting);
    }

    #[test]
    fn test_feedback_out_of_range_score_is_interesting() {
        let fb = Feedback::parse("\nFUZZ:SCORE:99999999999999999999\n");
        assert_eq!(fb.score_value(), None);
        assert!(fb.interesting);
    }

    #[test]
    fn test_feedback_score_skips_whitespace_and_trailing_text() {
        let fb = Feedback::parse("\nFUZZ:SCORE: 5\n");
        assert_eq!(fb.score_value(), Some(5));
        assert!(!fb.interesting);

        let fb = Feedback::parse("\r\nFUZZ:SCORE:12\r\n\r\nFUZZ:MSG:ok\r\n");
        assert_eq!(fb.score.as_deref(), Some("12\r"));
        assert_eq!(fb.score_value(), Some(12));
        assert!(!fb.interesting);

        assert_eq!(leading_integer("\t-30000005 points"), Some(-30000005));
        assert_eq!(leading_integer("+7"), Some(7));
        assert_eq!(leading_integer("-"), None);
        assert_eq!(leading_integer("- 3"), None);
        assert_eq!(leading_integer("x12"), None);
        assert_eq!(leading_integer(""), None);
    }
}
