//! Splitting long reports into message-sized pieces.
//!
//! Reports are newline-terminated lines that each end in [`LINE_MARKER`]
//! (`... - Played 3 times\n`). A chunk is cut just after the last marker it
//! contains, so a line is never split across two messages unless it is
//! longer than a whole message on its own.

/// Token that ends every report line.
pub const LINE_MARKER: &str = "times";

/// Split `text` into pieces of at most `max_length` characters.
///
/// Joining the pieces in order gives back `text` exactly. Lengths are
/// counted in characters, which is what chat platforms limit. A window with
/// no marker in it is sent whole. A `max_length` of 0 is treated as 1.
#[must_use]
pub fn chunk(text: &str, max_length: usize) -> Vec<String> {
    let max_length = max_length.max(1);
    let chars: Vec<char> = text.chars().collect();

    let mut chunks = Vec::new();
    let mut leftover = String::new();
    let mut carried = 0;
    let mut pos = 0;

    while pos < chars.len() || carried > 0 {
        let take = max_length.saturating_sub(carried).min(chars.len() - pos);
        let mut window = std::mem::take(&mut leftover);
        window.extend(&chars[pos..pos + take]);
        pos += take;
        carried = 0;

        // The last window holds the rest of the text, so nothing is held back
        if pos < chars.len() {
            if let Some(idx) = window.rfind(LINE_MARKER) {
                leftover = window.split_off(idx + LINE_MARKER.len());
                carried = leftover.chars().count();
            }
        }

        if !window.is_empty() {
            chunks.push(window);
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(lines: usize) -> String {
        (1..=lines)
            .map(|i| format!("{i}. Song number {i} by Some Artist - Played {} times\n", i % 7 + 1))
            .collect()
    }

    fn assert_chunked(text: &str, max_length: usize) -> Vec<String> {
        let chunks = chunk(text, max_length);
        assert_eq!(chunks.concat(), text, "chunks must reassemble the input");
        for c in &chunks {
            assert!(!c.is_empty());
            assert!(
                c.chars().count() <= max_length,
                "chunk of {} chars exceeds {max_length}",
                c.chars().count()
            );
        }
        chunks
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let text = report(3);
        assert_eq!(chunk(&text, 2000), vec![text]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(chunk("", 2000).is_empty());
    }

    #[test]
    fn test_long_report_round_trips() {
        let text = report(200);
        assert!(text.len() > 2000);
        let chunks = assert_chunked(&text, 2000);
        assert!(chunks.len() > 1);
    }

    #[test]
    fn test_chunks_end_after_a_marker() {
        let text = report(120);
        let chunks = assert_chunked(&text, 500);
        for c in &chunks[..chunks.len() - 1] {
            assert!(c.ends_with(LINE_MARKER), "chunk cut mid-line: {c:?}");
        }
    }

    #[test]
    fn test_every_window_size_round_trips() {
        let text = report(40);
        for max_length in [5, 6, 17, 60, 61, 199, 1000, 5000] {
            assert_chunked(&text, max_length);
        }
    }

    #[test]
    fn test_line_longer_than_limit_is_sent_unsplit_by_marker() {
        let long_title = "x".repeat(300);
        let text = format!("1. {long_title} by A - Played 1 times\n2. Short by B - Played 2 times\n");
        let chunks = assert_chunked(&text, 100);
        assert_eq!(chunks[0].chars().count(), 100);
        assert!(!chunks[0].contains(LINE_MARKER));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "1. 日本語の歌 by 歌手 - Played 2 times\n".repeat(50);
        assert_chunked(&text, 100);
    }

    #[test]
    fn test_zero_limit_does_not_loop() {
        let chunks = chunk("ab", 0);
        assert_eq!(chunks, vec!["a", "b"]);
    }
}
