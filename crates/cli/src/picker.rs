//! Minimal stdin-based list selection.
//!
//! Prints numbered lines and reads a selection like `1,3-5` or `all`.
//! Deliberately plain; batch mode bypasses it entirely.

use std::io::{BufRead, Write};

use anyhow::Result;

/// Shows the lines and returns the picked indices (0-based, in order).
pub fn pick(lines: &[String]) -> Result<Vec<usize>> {
    let stdin = std::io::stdin();
    let mut input = String::new();
    {
        let mut stdout = std::io::stdout().lock();
        for (i, line) in lines.iter().enumerate() {
            writeln!(stdout, "{:>4}  {line}", i + 1)?;
        }
        write!(stdout, "Selection (e.g. 1,3-5 or all, empty to cancel): ")?;
        stdout.flush()?;
    }
    stdin.lock().read_line(&mut input)?;
    Ok(parse_selection(input.trim(), lines.len()))
}

/// Parses `1,3-5`-style input into 0-based indices, silently dropping
/// anything out of range.
fn parse_selection(input: &str, len: usize) -> Vec<usize> {
    if input.is_empty() {
        return Vec::new();
    }
    if input.eq_ignore_ascii_case("all") || input == "*" {
        return (0..len).collect();
    }

    let mut picked = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        let (from, to) = match part.split_once('-') {
            Some((a, b)) => (a.trim().parse::<usize>(), b.trim().parse::<usize>()),
            None => (part.parse::<usize>(), part.parse::<usize>()),
        };
        if let (Ok(from), Ok(to)) = (from, to) {
            for n in from..=to {
                if n >= 1 && n <= len && !picked.contains(&(n - 1)) {
                    picked.push(n - 1);
                }
            }
        }
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_and_ranges() {
        assert_eq!(parse_selection("1,3-5", 10), vec![0, 2, 3, 4]);
        assert_eq!(parse_selection("2", 3), vec![1]);
    }

    #[test]
    fn test_parse_all_and_empty() {
        assert_eq!(parse_selection("all", 3), vec![0, 1, 2]);
        assert_eq!(parse_selection("", 3), Vec::<usize>::new());
    }

    #[test]
    fn test_out_of_range_and_junk_are_dropped() {
        assert_eq!(parse_selection("0,4,junk,2", 3), vec![1]);
        assert_eq!(parse_selection("2-99", 3), vec![1, 2]);
    }
}
