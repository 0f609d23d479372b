use crate::par::delimit::{comprelen, comsuflen};
use crate::par::lines::LineProp;
use crate::par::options::ParOptions;

/// Resolved affix picture for one reformatted stretch of lines.
///
/// `prefix`/`suffix` are the effective values (user-supplied or derived);
/// `afp` and `fs` are the first line's fallback affixes, used when output
/// extends past the input lines.
#[derive(Clone, Copy, Debug)]
pub struct Affixes {
    pub prefix: usize,
    pub suffix: usize,
    pub afp: usize,
    pub fs: usize,
}

/// Derive the affixes for `lines` (already delimited, `props` parallel).
///
/// The fallback prefix is the first line's; with a single quoted line it
/// is augmented across quotation characters. When more lines than `hang`
/// plus one are present, a secondary scan over `lines[hang..]` supplies
/// the defaults; otherwise the prefix falls back to the augmented first
/// line prefix and the suffix to zero (a lone line's trailing punctuation
/// is not a suffix).
pub fn resolve_affixes(lines: &[Vec<u8>], props: &[LineProp], opts: &ParOptions) -> Affixes {
    let n = lines.len();
    let fp = props[0].p;
    let fs = props[0].s;

    let mut afp = fp;
    if n == 1 && opts.quote {
        let ln = &lines[0];
        while afp < ln.len() && opts.quotechars.contains(ln[afp]) {
            afp += 1;
        }
    }

    let (pre2, suf2) = if n > opts.hang + 1 {
        let tail = &lines[opts.hang..];
        let p2 = comprelen(tail, 0, &opts.bodychars);
        let s2 = comsuflen(tail, p2, 0, &opts.bodychars);
        (p2, s2)
    } else {
        (afp, 0)
    };

    Affixes {
        prefix: opts.prefix.unwrap_or(pre2),
        suffix: opts.suffix.unwrap_or(suf2),
        afp,
        fs,
    }
}
