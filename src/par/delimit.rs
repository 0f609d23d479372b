use crate::par::charset::CharSet;
use crate::par::lines::LineProp;
use crate::par::options::ParOptions;

/// Length of the common prefix of all `lines`, grown from the lower bound
/// `lower` and truncated at the first body character.
pub fn comprelen(lines: &[Vec<u8>], lower: usize, bodychars: &CharSet) -> usize {
    let first = &lines[0];
    let mut limit = first.len();
    for ln in &lines[1..] {
        limit = limit.min(ln.len());
    }
    let mut pre = lower;
    'grow: while pre < limit {
        let b = first[pre];
        if bodychars.contains(b) {
            break;
        }
        for ln in &lines[1..] {
            if ln[pre] != b {
                break 'grow;
            }
        }
        pre += 1;
    }
    pre
}

/// Length of the common suffix of all `lines` past position `pre`, grown
/// from the lower bound `lower` over non-body characters only, then
/// shortened so the suffix keeps at most one leading padding space.
pub fn comsuflen(lines: &[Vec<u8>], pre: usize, lower: usize, bodychars: &CharSet) -> usize {
    let first = &lines[0];
    let mut limit = usize::MAX;
    for ln in lines {
        limit = limit.min(ln.len() - pre);
    }
    let mut suf = lower;
    'grow: while suf < limit {
        let b = first[first.len() - 1 - suf];
        if bodychars.contains(b) {
            break;
        }
        for ln in &lines[1..] {
            if ln[ln.len() - 1 - suf] != b {
                break 'grow;
            }
        }
        suf += 1;
    }
    // Collapse leading padding spaces out of the suffix, keeping one.
    while suf > lower
        && suf >= 2
        && first[first.len() - suf] == b' '
        && first[first.len() - suf + 1] == b' '
    {
        suf -= 1;
    }
    suf
}

/// Classify `lines` between the affixes: compute the common prefix and
/// suffix, mark bodiless lines, recurse on the stretches between them,
/// and on bodiless-free stretches assign the affix lengths and the
/// paragraph-start marks.
pub fn delimit(
    lines: &[Vec<u8>],
    props: &mut [LineProp],
    opts: &ParOptions,
    pre: usize,
    suf: usize,
) {
    if lines.is_empty() {
        return;
    }
    let pre = comprelen(lines, pre, &opts.bodychars);
    let suf = comsuflen(lines, pre, suf, &opts.bodychars);

    let mut any_bodiless = false;
    for (ln, prop) in lines.iter().zip(props.iter_mut()) {
        // A refined prefix can swallow a line's whole suffix region when
        // the line is nothing but affix characters; such a line has an
        // empty body and reads as vacant.
        let body: &[u8] = if pre + suf <= ln.len() {
            &ln[pre..ln.len() - suf]
        } else {
            &[]
        };
        let rc = body.first().copied().unwrap_or(b' ');
        let uniform = body.iter().all(|&b| b == rc);
        if uniform && (rc == b' ' || opts.repeat == 0 || body.len() >= opts.repeat) {
            any_bodiless = true;
            prop.bodiless = true;
            prop.rc = rc;
            prop.p = pre;
            prop.s = suf;
        }
    }

    if any_bodiless {
        // Refine each stretch between bodiless markers with the current
        // affixes as lower bounds.
        let mut i = 0;
        while i < lines.len() {
            if props[i].bodiless {
                i += 1;
                continue;
            }
            let mut j = i;
            while j < lines.len() && !props[j].bodiless {
                j += 1;
            }
            delimit(&lines[i..j], &mut props[i..j], opts, pre, suf);
            i = j;
        }
        return;
    }

    for prop in props.iter_mut() {
        prop.p = pre;
        prop.s = suf;
    }
    props[0].first = true;
    if opts.div {
        let mut prev_bit = lines[0][pre] == b' ';
        for (ln, prop) in lines.iter().zip(props.iter_mut()).skip(1) {
            let bit = ln[pre] == b' ';
            if bit != prev_bit {
                prop.first = true;
            }
            prev_bit = bit;
        }
    }
}

/// Mark superfluous vacant lines: all of them, then un-mark the one with
/// the fewest non-space bytes (leftmost on ties) in each run bounded by
/// non-vacant lines on both sides.
pub fn mark_superfluous(lines: &[Vec<u8>], props: &mut [LineProp]) {
    let vacant = |p: &LineProp| p.bodiless && p.rc == b' ';
    for prop in props.iter_mut() {
        if vacant(prop) {
            prop.superf = true;
        }
    }
    let n = props.len();
    let mut i = 0;
    while i < n {
        if !vacant(&props[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < n && vacant(&props[i]) {
            i += 1;
        }
        if start > 0 && i < n {
            let mut best = start;
            let mut best_count = usize::MAX;
            for k in start..i {
                let count = lines[k].iter().filter(|&&b| b != b' ').count();
                if count < best_count {
                    best = k;
                    best_count = count;
                }
            }
            props[best].superf = false;
        }
    }
}
