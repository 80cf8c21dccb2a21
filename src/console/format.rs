//! Output formatting
//!
//! Length-bounded value rendering, terminal markup escaping, and the
//! windowed line-context report pinpointing which physical line of a
//! multi-line command failed.

/// Fixed-width rule bounding the context report.
const RULE: &str = "----------------------------------------";

/// Marker appended to the failing line of a context report.
const ERROR_MARKER: &str = "    <-- Error here!";

/// Length-bound a rendered representation, keeping its head and tail.
///
/// Representations longer than `limit` characters are cut to the first and
/// last `limit / 2` characters around `separator`.
pub fn shorten_repr(text: &str, limit: usize, separator: &str) -> String {
    let count = text.chars().count();
    if count <= limit {
        return text.to_string();
    }
    let split = limit / 2;
    let head: String = text.chars().take(split).collect();
    let tail: String = text.chars().skip(count - split).collect();
    format!("{head}{separator}{tail}")
}

/// Escape bracket pairs the terminal's markup layer would interpret.
pub fn escape_markup(text: &str) -> String {
    text.replace("[[", "&lsqb;&lsqb;").replace("]]", "&rsqb;&rsqb;")
}

/// Windowed, line-numbered context dump centered on the failing line.
///
/// `failing` is the 1-based physical line index. The window covers up to
/// `window` lines on each side, clipped to the command; numbers are
/// zero-padded to the width of the largest number shown.
pub fn context_report(lines: &[&str], failing: usize, window: usize) -> String {
    let total = lines.len();
    let first = failing.saturating_sub(window).max(1);
    let last = (failing + window).min(total);
    let width = digits(last);

    let mut report = format!("Error occurred at line {failing}:\n{RULE}\n");
    for number in first..=last {
        let line = lines[number - 1];
        if number == failing {
            report.push_str(&format!("{number:0width$}: {line}{ERROR_MARKER}\n"));
        } else {
            report.push_str(&format!("{number:0width$}: {line}\n"));
        }
    }
    report.push_str(RULE);
    report.push('\n');
    report
}

fn digits(n: usize) -> usize {
    n.to_string().len()
}
