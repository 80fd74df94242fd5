use std::fmt::Write;

use super::ledger::Ledger;

const DIVERGENCE_MARKER: &str = "==> divergence <==";

/// First index where two stack-hash sequences disagree. When they agree over
/// their whole overlap, the overlap length is returned.
pub fn divergence_index(local: &[i32], remote: &[i32]) -> usize {
    local
        .iter()
        .zip(remote)
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| local.len().min(remote.len()))
}

/// Inclusive range of samples around a divergence point
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TraceWindow {
    pub start: usize,
    pub end: usize,
    pub highlight: usize,
}

impl TraceWindow {
    /// Window of `radius` samples on each side of `index`, clipped to `len`.
    /// Returns `None` when there are no samples at all.
    pub fn around(index: usize, len: usize, radius: usize) -> Option<Self> {
        let last = len.checked_sub(1)?;
        Some(Self {
            start: index.saturating_sub(radius).min(last),
            end: index.saturating_add(radius).min(last),
            highlight: index,
        })
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Offset of the highlight from the first sample in the window
    pub fn relative_highlight(&self) -> usize {
        self.highlight - self.start.min(self.highlight)
    }
}

/// Renders samples `start..=end` of a ledger, placing a marker line right
/// before `highlight`, or after the last line when the highlight lies past
/// the window.
///
/// Ledgers received from a peer carry only hashes, which are printed in
/// place of the missing samples.
pub fn format_trace_window(ledger: &Ledger, start: usize, end: usize, highlight: usize) -> String {
    let samples = ledger.stack_samples();
    let hashes = ledger.stack_hashes();
    let available = samples.len().max(hashes.len());
    let end = end.min(available.saturating_sub(1));

    let mut text = String::new();
    let mut marked = false;
    if available > 0 {
        for index in start..=end {
            if index == highlight {
                let _ = writeln!(text, "{}", DIVERGENCE_MARKER);
                marked = true;
            }
            match (samples.get(index), hashes.get(index)) {
                (Some(sample), _) => {
                    let _ = writeln!(text, "[{}] {}", index, sample.annotation);
                    for frame in sample.stack.lines() {
                        let _ = writeln!(text, "    {}", frame);
                    }
                }
                (None, Some(hash)) => {
                    let _ = writeln!(text, "[{}] hash {:08x}", index, hash);
                }
                (None, None) => {}
            }
        }
    }
    if !marked && highlight >= start {
        let _ = writeln!(text, "{}", DIVERGENCE_MARKER);
    }
    text
}

/// Locates the divergence between two ledgers and renders both sides' windows
pub fn divergence_window(local: &Ledger, remote: &Ledger, radius: usize) -> (String, usize) {
    let index = divergence_index(local.stack_hashes(), remote.stack_hashes());

    let mut text = String::new();
    for (label, ledger) in [("Local", local), ("Remote", remote)] {
        let _ = writeln!(
            text,
            "{} traces ({}, tick {}{})",
            label,
            ledger.username(),
            ledger.start_tick(),
            if ledger.is_provisional() { ", provisional" } else { "" }
        );
        let len = ledger.stack_samples().len().max(ledger.stack_hashes().len());
        match TraceWindow::around(index, len, radius) {
            Some(window) => text.push_str(&format_trace_window(
                ledger,
                window.start,
                window.end,
                window.highlight,
            )),
            None => text.push_str("(no samples)\n"),
        }
        text.push('\n');
    }

    (text, index)
}

#[cfg(test)]
mod tests {
    use lockstep_serde::{ByteReader, Serde};

    use super::*;

    fn sampled(count: usize, diverge_at: Option<usize>) -> Ledger {
        let mut ledger = Ledger::new_local(0, "ada");
        for i in 0..count {
            let annotation = match diverge_at {
                Some(at) if i >= at => format!("other {}", i),
                _ => format!("step {}", i),
            };
            ledger.push_checkpoint(annotation, String::new());
        }
        ledger
    }

    #[test]
    fn test_divergence_index() {
        assert_eq!(divergence_index(&[1, 2, 3], &[1, 9, 3]), 1);
        assert_eq!(divergence_index(&[1, 2, 3], &[1, 2]), 2);
        assert_eq!(divergence_index(&[], &[4]), 0);
        assert_eq!(divergence_index(&[5, 6], &[5, 6]), 2);
    }

    #[test]
    fn test_window_around_42_of_100() {
        let local = sampled(100, None);
        let remote = sampled(100, Some(42));
        let index = divergence_index(local.stack_hashes(), remote.stack_hashes());
        assert_eq!(index, 42);

        let window = TraceWindow::around(index, 100, 40).unwrap();
        assert_eq!((window.start, window.end), (2, 82));
        assert_eq!(window.len(), 81);
        assert_eq!(window.relative_highlight(), 40);
    }

    #[test]
    fn test_window_clipped_at_edges() {
        let window = TraceWindow::around(3, 10, 40).unwrap();
        assert_eq!((window.start, window.end), (0, 9));
        assert_eq!(window.relative_highlight(), 3);

        assert_eq!(TraceWindow::around(0, 0, 40), None);
    }

    #[test]
    fn test_marker_placed_before_highlight() {
        let ledger = sampled(100, None);
        let text = format_trace_window(&ledger, 2, 82, 42);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 82);
        assert_eq!(lines[0], "[2] step 2");
        assert_eq!(lines[40], DIVERGENCE_MARKER);
        assert_eq!(lines[41], "[42] step 42");
        assert_eq!(lines[81], "[82] step 82");
    }

    #[test]
    fn test_marker_after_last_sample() {
        let ledger = sampled(5, None);
        let text = format_trace_window(&ledger, 0, 4, 5);
        assert!(text.ends_with(&format!("[4] step 4\n{}\n", DIVERGENCE_MARKER)));
    }

    #[test]
    fn test_remote_window_shows_hashes() {
        let local = sampled(3, None);
        let mut remote = Ledger::new_local(0, "bob");
        remote.push_checkpoint("step 0", String::new());
        remote.push_checkpoint("x", String::new());
        let remote = Ledger::de(&mut ByteReader::new(remote.to_bytes())).unwrap();

        let (text, index) = divergence_window(&local, &remote, 40);
        assert_eq!(index, 1);
        assert!(text.contains("Remote traces (bob"));
        assert!(text.contains("[1] hash "));
        assert!(text.contains("[1] step 1"));
    }
}
