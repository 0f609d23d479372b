use crate::par::affix::Affixes;
use crate::par::error::ParError;
use crate::par::options::ParOptions;
use crate::par::words::{NONE, WordList, guess_pass, split_overlong, tokenize};

/// Score value marking "no feasible arrangement from here".
const INVALID: i64 = -1;

#[inline]
fn wlen(wl: &WordList, id: u32) -> i64 {
    wl.words[id as usize].len as i64
}

/// Inter-word gap cost before `id` when it is line-internal: one space,
/// two when the word is shifted.
#[inline]
fn gap(wl: &WordList, id: u32) -> i64 {
    1 + wl.words[id as usize].shifted as i64
}

/// Minimum length of the line holding `w1` through the word before
/// `w2_end` (NONE means through the tail).
fn line_len(wl: &WordList, w1: u32, w2_end: u32) -> i64 {
    let mut len = wlen(wl, w1);
    let mut w = wl.words[w1 as usize].next;
    while w != w2_end {
        len += gap(wl, w) + wlen(wl, w);
        w = wl.words[w as usize].next;
    }
    len
}

/// The max-min pass: compute, for every word assumed to start a line, the
/// best achievable length of the shortest line at width `target`, and
/// return it for the first word. Returns [`INVALID`] when no arrangement
/// fits. With `last` off, the trailing segment scores `target` so it
/// never binds the minimum.
fn simplebreaks(
    wl: &WordList,
    target: i64,
    last: bool,
    score: &mut [i64],
    nextline: &mut [u32],
) -> i64 {
    let first = wl.first();
    if first == NONE {
        return target;
    }

    // Words whose whole remainder fits on one line: terminal hypothesis.
    let mut w = wl.tail;
    let mut linelen = wlen(wl, w);
    while linelen <= target {
        score[w as usize] = if last { linelen } else { target };
        nextline[w as usize] = NONE;
        let p = wl.words[w as usize].prev;
        if p == NONE {
            return score[first as usize];
        }
        linelen += gap(wl, w) + wlen(wl, p);
        w = p;
    }

    // Earlier words: best min over every feasible break, preferring the
    // latest break on ties.
    loop {
        score[w as usize] = INVALID;
        let mut ll = wlen(wl, w);
        let mut w2 = wl.words[w as usize].next;
        while ll <= target && w2 != NONE {
            let s = score[w2 as usize].min(ll);
            if s >= score[w as usize] {
                score[w as usize] = s;
                nextline[w as usize] = w2;
            }
            ll += gap(wl, w2) + wlen(wl, w2);
            w2 = wl.words[w2 as usize].next;
        }
        let p = wl.words[w as usize].prev;
        if p == NONE {
            break;
        }
        w = p;
    }
    score[first as usize]
}

/// Ragged-mode optimizer: pick the target width (searching downward when
/// `fit` is on), then minimize the sum of squared shortfalls from the
/// target over a right-to-left pass, preferring later breaks on ties.
fn ragged_breaks(
    wl: &WordList,
    width: i64,
    fit: bool,
    last: bool,
    score: &mut [i64],
    nextline: &mut [u32],
) -> Result<(), ParError> {
    let mut target = width;
    if fit {
        let mut best_diff = i64::MAX;
        let mut trylen = width;
        while trylen >= 1 {
            let s = simplebreaks(wl, trylen, last, score, nextline);
            if s < 0 {
                break;
            }
            if trylen - s < best_diff {
                best_diff = trylen - s;
                target = trylen;
            }
            trylen -= 1;
        }
    }
    let shortest = simplebreaks(wl, target, last, score, nextline);
    if shortest < 0 {
        return Err(ParError::Impossibility);
    }

    let first = wl.first();
    let mut w = wl.tail;
    let mut linelen = wlen(wl, w);
    loop {
        if linelen > target {
            break;
        }
        if last {
            score[w as usize] = if linelen >= shortest {
                let extra = target - linelen;
                extra * extra
            } else {
                INVALID
            };
        } else {
            score[w as usize] = 0;
        }
        nextline[w as usize] = NONE;
        let p = wl.words[w as usize].prev;
        if p == NONE {
            break;
        }
        linelen += gap(wl, w) + wlen(wl, p);
        w = p;
    }

    if linelen > target {
        loop {
            score[w as usize] = INVALID;
            let mut ll = wlen(wl, w);
            let mut w2 = wl.words[w as usize].next;
            while ll <= target && w2 != NONE {
                if score[w2 as usize] >= 0 {
                    let extra = target - ll;
                    let try_score = score[w2 as usize] + extra * extra;
                    if score[w as usize] < 0 || try_score <= score[w as usize] {
                        score[w as usize] = try_score;
                        nextline[w as usize] = w2;
                    }
                }
                ll += gap(wl, w2) + wlen(wl, w2);
                w2 = wl.words[w2 as usize].next;
            }
            let p = wl.words[w as usize].prev;
            if p == NONE {
                break;
            }
            w = p;
        }
    }

    if score[first as usize] < 0 {
        return Err(ParError::Impossibility);
    }
    Ok(())
}

/// Gap size of a line with `extra` residual spaces over `ngaps` gaps;
/// a gapless line justifies only by luck, scored at full width.
#[inline]
fn gap_size(extra: i64, ngaps: i64, width: i64) -> i64 {
    if ngaps > 0 {
        (extra + ngaps - 1) / ngaps
    } else {
        width
    }
}

/// Sum of squared extra-space counts when `extra` spaces spread over
/// `ngaps` gaps: the remainder gaps carry one more space each.
#[inline]
fn square_cost(extra: i64, ngaps: i64) -> i64 {
    let q = extra / ngaps;
    let r = extra % ngaps;
    q * (extra + r) + r
}

/// Justified-mode optimizer: first minimize the largest inter-word gap,
/// then, holding that bound, minimize the sum of squared extra-space
/// counts. Both passes run right to left and prefer later breaks on
/// ties; with `last` off the trailing segment is exempt.
fn justify_breaks(
    wl: &WordList,
    width: i64,
    last: bool,
    score: &mut [i64],
    nextline: &mut [u32],
) -> Result<(), ParError> {
    let first = wl.first();

    // Pass 1: minimize the largest gap.
    let mut w = wl.tail;
    let mut linelen = wlen(wl, w);
    let mut ngaps: i64 = 0;
    let mut tail_region_end = NONE;
    loop {
        if linelen > width {
            tail_region_end = w;
            break;
        }
        score[w as usize] = if last {
            gap_size(width - linelen, ngaps, width)
        } else {
            0
        };
        nextline[w as usize] = NONE;
        let p = wl.words[w as usize].prev;
        if p == NONE {
            break;
        }
        linelen += gap(wl, w) + wlen(wl, p);
        ngaps += 1;
        w = p;
    }
    if tail_region_end != NONE {
        loop {
            score[w as usize] = i64::MAX;
            let mut ll = wlen(wl, w);
            let mut gaps_here: i64 = 0;
            let mut w2 = wl.words[w as usize].next;
            while ll <= width && w2 != NONE {
                let g = gap_size(width - ll, gaps_here, width);
                let cand = g.max(score[w2 as usize]);
                if cand <= score[w as usize] {
                    score[w as usize] = cand;
                    nextline[w as usize] = w2;
                }
                ll += gap(wl, w2) + wlen(wl, w2);
                gaps_here += 1;
                w2 = wl.words[w2 as usize].next;
            }
            let p = wl.words[w as usize].prev;
            if p == NONE {
                break;
            }
            w = p;
        }
    }
    let maxgap = score[first as usize];
    if maxgap >= width {
        return Err(ParError::CannotJustify);
    }

    // Pass 2: minimize the sum of squared extra-space counts under the
    // gap bound.
    let mut w = wl.tail;
    let mut linelen = wlen(wl, w);
    let mut ngaps: i64 = 0;
    loop {
        if linelen > width {
            break;
        }
        if last {
            let extra = width - linelen;
            score[w as usize] = if gap_size(extra, ngaps, width) <= maxgap {
                square_cost(extra, ngaps)
            } else {
                INVALID
            };
        } else {
            score[w as usize] = 0;
        }
        nextline[w as usize] = NONE;
        let p = wl.words[w as usize].prev;
        if p == NONE {
            break;
        }
        linelen += gap(wl, w) + wlen(wl, p);
        ngaps += 1;
        w = p;
    }
    if linelen > width {
        loop {
            score[w as usize] = INVALID;
            let mut ll = wlen(wl, w);
            let mut gaps_here: i64 = 0;
            let mut w2 = wl.words[w as usize].next;
            while ll <= width && w2 != NONE {
                if score[w2 as usize] >= 0 {
                    let extra = width - ll;
                    if gap_size(extra, gaps_here, width) <= maxgap {
                        let try_score = score[w2 as usize] + square_cost(extra, gaps_here);
                        if score[w as usize] < 0 || try_score <= score[w as usize] {
                            score[w as usize] = try_score;
                            nextline[w as usize] = w2;
                        }
                    }
                }
                ll += gap(wl, w2) + wlen(wl, w2);
                gaps_here += 1;
                w2 = wl.words[w2 as usize].next;
            }
            let p = wl.words[w as usize].prev;
            if p == NONE {
                break;
            }
            w = p;
        }
    }
    if score[first as usize] < 0 {
        return Err(ParError::Impossibility);
    }
    Ok(())
}

/// Reformat one stretch of lines into `out`.
///
/// Resolves the body width, checks the affix preconditions, tokenizes,
/// runs the sentence-break pass and over-long handling, breaks lines
/// under the requested policy, and reassembles output lines with their
/// prefixes and suffixes.
pub fn reflow_segment(
    lines: &[Vec<u8>],
    aff: &Affixes,
    opts: &ParOptions,
    out: &mut Vec<u8>,
) -> Result<(), ParError> {
    let prefix = aff.prefix;
    let suffix = aff.suffix;
    if opts.width <= prefix + suffix {
        return Err(ParError::WidthTooSmall {
            prefix,
            suffix,
            width: opts.width,
        });
    }
    for (idx, ln) in lines.iter().enumerate() {
        if ln.len() < prefix + suffix {
            return Err(ParError::LineTooShort {
                line: idx + 1,
                len: ln.len(),
                prefix,
                suffix,
            });
        }
    }
    let body_width = opts.width - prefix - suffix;

    let mut wl = tokenize(lines, prefix, suffix);
    if opts.guess {
        guess_pass(&mut wl, lines, opts.cap, &opts.terminalchars);
    }
    split_overlong(&mut wl, lines, body_width, opts.report)?;

    let arena = wl.words.len();
    let mut score = vec![0i64; arena];
    let mut nextline = vec![NONE; arena];
    if wl.first() != NONE {
        if opts.just {
            justify_breaks(&wl, body_width as i64, opts.last, &mut score, &mut nextline)?;
        } else {
            ragged_breaks(
                &wl,
                body_width as i64,
                opts.fit,
                opts.last,
                &mut score,
                &mut nextline,
            )?;
        }
    }

    assemble(lines, aff, opts, &wl, &nextline, body_width as i64, out);
    Ok(())
}

/// Reattach decorations and write the chosen lines.
fn assemble(
    lines: &[Vec<u8>],
    aff: &Affixes,
    opts: &ParOptions,
    wl: &WordList,
    nextline: &[u32],
    body_width: i64,
    out: &mut Vec<u8>,
) {
    let n = lines.len();
    let prefix = aff.prefix;
    let suffix = aff.suffix;

    // First word of each output line.
    let mut starts = Vec::new();
    let mut w = wl.first();
    while w != NONE {
        starts.push(w);
        w = nextline[w as usize];
    }

    // In touch mode the padding width hugs the longest produced line.
    let pad_width = if !opts.just && opts.touch_resolved() {
        starts
            .iter()
            .map(|&s| line_len(wl, s, nextline[s as usize]))
            .max()
            .unwrap_or(0)
    } else {
        body_width
    };

    let total = starts.len().max(opts.hang);
    for i in 0..total {
        let line_start = out.len();

        // Prefix bytes.
        if i < n {
            out.extend_from_slice(&lines[i][..prefix]);
        } else if n > opts.hang {
            out.extend_from_slice(&lines[n - 1][..prefix]);
        } else {
            let afp = aff.afp.min(prefix);
            out.extend_from_slice(&lines[n - 1][..afp]);
            out.resize(line_start + prefix, b' ');
        }
        let body_start = out.len();

        // Body.
        if i < starts.len() {
            let w1 = starts[i];
            let w_end = nextline[w1 as usize];
            let justify_this = opts.just && (w_end != NONE || opts.last);
            out.extend_from_slice(wl.bytes(lines, w1));
            if justify_this {
                let ll = line_len(wl, w1, w_end);
                let extra = body_width - ll;
                let mut ngaps: i64 = 0;
                let mut probe = wl.words[w1 as usize].next;
                while probe != w_end {
                    ngaps += 1;
                    probe = wl.words[probe as usize].next;
                }
                // Phase-balanced distribution: big gaps land symmetrically
                // around the middle of the line.
                let mut phase = ngaps / 2;
                let mut w2 = wl.words[w1 as usize].next;
                while w2 != w_end {
                    out.push(b' ');
                    if wl.words[w2 as usize].shifted {
                        out.push(b' ');
                    }
                    if ngaps > 0 {
                        phase += extra;
                        while phase >= ngaps {
                            out.push(b' ');
                            phase -= ngaps;
                        }
                    }
                    out.extend_from_slice(wl.bytes(lines, w2));
                    w2 = wl.words[w2 as usize].next;
                }
            } else {
                let mut w2 = wl.words[w1 as usize].next;
                while w2 != w_end {
                    out.push(b' ');
                    if wl.words[w2 as usize].shifted {
                        out.push(b' ');
                    }
                    out.extend_from_slice(wl.bytes(lines, w2));
                    w2 = wl.words[w2 as usize].next;
                }
            }
        }

        // Padding and suffix bytes. With no suffix a line simply ends at
        // its last body byte.
        if suffix > 0 {
            let target = if opts.just { body_width } else { pad_width };
            let body_len = (out.len() - body_start) as i64;
            for _ in body_len..target {
                out.push(b' ');
            }
            if i < n {
                out.extend_from_slice(&lines[i][lines[i].len() - suffix..]);
            } else if n > opts.hang {
                out.extend_from_slice(&lines[n - 1][lines[n - 1].len() - suffix..]);
            } else {
                let fs = aff.fs.min(suffix);
                for _ in 0..suffix - fs {
                    out.push(b' ');
                }
                out.extend_from_slice(&lines[n - 1][lines[n - 1].len() - fs..]);
            }
        }
        out.push(b'\n');
    }
}
