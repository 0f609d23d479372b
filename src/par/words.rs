use crate::par::charset::CharSet;
use crate::par::error::ParError;

/// Index of the list sentinel; also stands for "no word".
pub const NONE: u32 = 0;

/// A word is a view into one line's bytes plus its list links. Words
/// live in a vector with index links and a sentinel, so merging during
/// the sentence-break pass is pure relinking with no allocation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Word {
    pub line: u32,
    pub start: u32,
    pub len: u32,
    pub shifted: bool,
    pub prev: u32,
    pub next: u32,
}

/// The word sequence of one reformatted stretch, with a sentinel at
/// index 0. Unlinked (merged-away) entries stay allocated; only the
/// links define the sequence.
pub struct WordList {
    pub words: Vec<Word>,
    pub tail: u32,
}

impl WordList {
    pub fn new() -> Self {
        WordList {
            words: vec![Word::default()],
            tail: NONE,
        }
    }

    pub fn first(&self) -> u32 {
        self.words[0].next
    }

    fn push_back(&mut self, mut w: Word) -> u32 {
        let id = self.words.len() as u32;
        w.prev = self.tail;
        w.next = NONE;
        if self.tail == NONE {
            self.words[0].next = id;
        } else {
            self.words[self.tail as usize].next = id;
        }
        self.tail = id;
        self.words.push(w);
        id
    }

    /// The bytes a word views, borrowed from the owning line.
    pub fn bytes<'a>(&self, lines: &'a [Vec<u8>], id: u32) -> &'a [u8] {
        let w = self.words[id as usize];
        &lines[w.line as usize][w.start as usize..(w.start + w.len) as usize]
    }

    /// Words in list order; for tests and assembly walks.
    pub fn iter_ids(&self) -> impl Iterator<Item = u32> + '_ {
        let mut cur = self.first();
        std::iter::from_fn(move || {
            if cur == NONE {
                None
            } else {
                let id = cur;
                cur = self.words[cur as usize].next;
                Some(id)
            }
        })
    }
}

impl Default for WordList {
    fn default() -> Self {
        WordList::new()
    }
}

/// Split every line's body region on space runs.
pub fn tokenize(lines: &[Vec<u8>], prefix: usize, suffix: usize) -> WordList {
    let mut wl = WordList::new();
    for (li, ln) in lines.iter().enumerate() {
        let end = ln.len() - suffix;
        let mut i = prefix;
        while i < end {
            while i < end && ln[i] == b' ' {
                i += 1;
            }
            if i >= end {
                break;
            }
            let start = i;
            while i < end && ln[i] != b' ' {
                i += 1;
            }
            wl.push_back(Word {
                line: li as u32,
                start: start as u32,
                len: (i - start) as u32,
                ..Word::default()
            });
        }
    }
    wl
}

/// A word is curious when, scanning right to left, a sentence-terminal
/// character appears before the first alphanumeric does (so the word ends
/// in a terminal run backed by an alphanumeric).
fn is_curious(bytes: &[u8], terminal: &CharSet) -> bool {
    let mut seen_terminal = false;
    for &b in bytes.iter().rev() {
        if b.is_ascii_alphanumeric() {
            return seen_terminal;
        }
        if terminal.contains(b) {
            seen_terminal = true;
        }
    }
    false
}

/// A word is capital when its first alphanumeric is not lowercase.
fn is_capital(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|b| b.is_ascii_alphanumeric())
        .is_some_and(|b| !b.is_ascii_lowercase())
}

/// The sentence-break pass: a capital word following a curious word is
/// merged with it when the two were adjacent in the source (exactly one
/// space apart on one line), freezing the narrow gap; otherwise the later
/// word is marked shifted, asking for a wide gap in the output.
pub fn guess_pass(wl: &mut WordList, lines: &[Vec<u8>], cap: bool, terminal: &CharSet) {
    let mut w1 = wl.first();
    if w1 == NONE {
        return;
    }
    loop {
        let w2 = wl.words[w1 as usize].next;
        if w2 == NONE {
            break;
        }
        let curious = is_curious(wl.bytes(lines, w1), terminal);
        let capital = cap || is_capital(wl.bytes(lines, w2));
        if curious && capital {
            let a = wl.words[w1 as usize];
            let b = wl.words[w2 as usize];
            let adjacent = a.line == b.line && a.start + a.len + 1 == b.start;
            if adjacent {
                let merged = &mut wl.words[w2 as usize];
                merged.start = a.start;
                merged.len += a.len + 1;
                merged.shifted |= a.shifted;
                merged.prev = a.prev;
                wl.words[a.prev as usize].next = w2;
            } else {
                wl.words[w2 as usize].shifted = true;
            }
        }
        w1 = w2;
    }
}

/// Handle words wider than the body. With reporting on, the first one
/// aborts the paragraph; otherwise each is cut into limit-sized pieces,
/// the first keeping the original's shifted mark.
pub fn split_overlong(
    wl: &mut WordList,
    lines: &[Vec<u8>],
    limit: usize,
    report: bool,
) -> Result<(), ParError> {
    debug_assert!(limit >= 1);
    let mut w = wl.first();
    while w != NONE {
        if wl.words[w as usize].len as usize > limit {
            if report {
                return Err(ParError::word_too_long(wl.bytes(lines, w)));
            }
            while wl.words[w as usize].len as usize > limit {
                let cur = wl.words[w as usize];
                let tail = Word {
                    line: cur.line,
                    start: cur.start + limit as u32,
                    len: cur.len - limit as u32,
                    shifted: false,
                    prev: w,
                    next: cur.next,
                };
                let tid = wl.words.len() as u32;
                wl.words.push(tail);
                let head = &mut wl.words[w as usize];
                head.len = limit as u32;
                head.next = tid;
                if tail.next == NONE {
                    wl.tail = tid;
                } else {
                    wl.words[tail.next as usize].prev = tid;
                }
                w = tid;
            }
        }
        w = wl.words[w as usize].next;
    }
    Ok(())
}
