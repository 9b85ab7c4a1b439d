/// Byte cursor over the scanned region, tracking absolute buffer positions.
///
/// The scanner works on a slice of the note buffer; `base` is the absolute
/// offset of that slice, so spans produced during parsing line up with
/// annotation spans without further translation.
#[derive(Clone)]
pub struct Cursor<'a> {
    s: &'a str,
    base: usize,
    at: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str, base: usize) -> Self {
        Self { s, base, at: 0 }
    }

    /// Current absolute byte position (base + local index).
    pub fn pos(&self) -> usize {
        self.base + self.at
    }

    pub fn eof(&self) -> bool {
        self.at >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.at).copied()
    }

    /// The byte immediately before the current position, if any.
    ///
    /// Only sees the scanned slice; at the slice start this is `None`, which
    /// callers treat as a word boundary (the region is always extended to a
    /// whitespace boundary before scanning).
    pub fn prev(&self) -> Option<u8> {
        self.at
            .checked_sub(1)
            .and_then(|i| self.s.as_bytes().get(i).copied())
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.at += 1;
        Some(b)
    }

    /// The text between two absolute positions previously returned by
    /// [`Cursor::pos`].
    pub fn text(&self, start: usize, end: usize) -> &'a str {
        &self.s[start - self.base..end - self.base]
    }
}
