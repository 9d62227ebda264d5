//! Splits text into pieces small enough for one speech request.
//!
//! Sentences are packed greedily up to the limit.  A sentence that is too
//! long on its own is split on whitespace and its words packed the same
//! way.  A single word longer than the limit is emitted whole.
//!
//! Lengths are counted in `char`s, not bytes, so Bengali or CJK text gets
//! the same budget as Latin text.

/// Upper bound on characters per speech request.
pub const MAX_CHARS_PER_REQUEST: usize = 170;

/// Split `text` into ordered chunks of at most `max_chars` characters,
/// breaking after any character in `sentence_enders` when possible.
pub fn chunk(text: &str, sentence_enders: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut packer = Packer::new(max_chars);

    for sentence in split_sentences(text, sentence_enders) {
        if char_len(&sentence) <= max_chars {
            packer.push(&sentence);
        } else {
            for word in sentence.split_whitespace() {
                packer.push(word);
            }
        }
    }

    packer.finish()
}

/// Split after each run of ender characters; sentences come back trimmed
/// and non-empty.
fn split_sentences(text: &str, enders: &str) -> Vec<String> {
    let is_ender = |c: char| enders.contains(c);
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = is_ender(c) && !chars.peek().copied().is_some_and(is_ender);
        if at_boundary {
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
    }
    push_trimmed(&mut sentences, &current);

    sentences
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

// ---------------------------------------------------------------------------
// Packer
// ---------------------------------------------------------------------------

/// Greedy accumulator joining pieces with a single space.
struct Packer {
    max_chars: usize,
    current: String,
    current_len: usize,
    chunks: Vec<String>,
}

impl Packer {
    fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            current: String::new(),
            current_len: 0,
            chunks: Vec::new(),
        }
    }

    fn push(&mut self, piece: &str) {
        let len = char_len(piece);
        if self.current_len > 0 && self.current_len + len + 1 > self.max_chars {
            self.flush();
        }
        if self.current_len > 0 {
            self.current.push(' ');
            self.current_len += 1;
        }
        self.current.push_str(piece);
        self.current_len += len;
    }

    fn flush(&mut self) {
        if self.current_len > 0 {
            self.chunks.push(std::mem::take(&mut self.current));
            self.current_len = 0;
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
