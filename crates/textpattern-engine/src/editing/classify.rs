//! Character classification for word boundary detection.

/// Class of a single character, used to find word boundaries.
///
/// A word is a maximal run of [`CharacterClass::Word`] characters; a class
/// change on either side terminates the run, so punctuation splits words
/// just like whitespace does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterClass {
    Whitespace,
    Word,
    Other,
}

/// Classify a character.
///
/// Letters, digits and `_` form identifier-like runs; whitespace is its own
/// class; everything else (punctuation, symbols) is [`CharacterClass::Other`].
pub fn classify(ch: char) -> CharacterClass {
    match ch {
        c if c.is_whitespace() => CharacterClass::Whitespace,
        c if c.is_alphanumeric() || c == '_' => CharacterClass::Word,
        _ => CharacterClass::Other,
    }
}
