//! Fixed-capacity text helpers

use heapless::String;

/// Replace the contents of `slot` with `text`, truncating on a character
/// boundary if it does not fit
///
/// Returns true if the text was truncated.
pub fn assign_truncated<const N: usize>(slot: &mut String<N>, text: &str) -> bool {
    let mut end = text.len().min(N);
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    slot.clear();
    // Cannot fail: `end <= N`
    let _ = slot.push_str(&text[..end]);
    end < text.len()
}

/// Build a fixed-capacity string from `text`, truncating if needed
pub fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut s = String::new();
    assign_truncated(&mut s, text);
    s
}
