use crate::par::charset::CharSet;
use crate::par::options::ParOptions;

/// Per-line decoration facts. `p`/`s` and the classification bits are
/// filled in by the delimiter; the reader only sets `invis` on the vacant
/// lines it synthesizes for quotation gaps.
#[derive(Clone, Debug, Default)]
pub struct LineProp {
    pub p: usize,
    pub s: usize,
    pub rc: u8,
    pub bodiless: bool,
    pub invis: bool,
    pub first: bool,
    pub superf: bool,
}

/// Leading run of quote-set bytes with trailing spaces trimmed, and
/// whether the rest of the line is only spaces and quote bytes.
fn quote_scan(ln: &[u8], quotechars: &CharSet) -> (usize, bool) {
    let mut qpend = 0;
    while qpend < ln.len() && quotechars.contains(ln[qpend]) {
        qpend += 1;
    }
    while qpend > 0 && ln[qpend - 1] == b' ' {
        qpend -= 1;
    }
    let qsonly = ln[qpend..]
        .iter()
        .all(|&b| b == b' ' || quotechars.contains(b));
    (qpend, qsonly)
}

/// Read one input paragraph starting at `*pos`.
///
/// Lines are normalized on the way in: NULs are assumed gone already and
/// non-newline whitespace becomes a space. Reading stops at end of input,
/// at a blank line (its spaces are consumed, the newline is left for the
/// driver), or at a line whose first byte is a protect character (left in
/// place entirely).
///
/// With `quote` on, each line's quotation prefix is compared against the
/// previous line's bytes; a divergence inserts a vacant line holding the
/// common part, except that two adjacent skeleton-only lines are instead
/// truncated to the common part when the synthesized line would be
/// visible (`invis` off).
pub fn read_ip(data: &[u8], pos: &mut usize, opts: &ParOptions) -> (Vec<Vec<u8>>, Vec<LineProp>) {
    let mut lines: Vec<Vec<u8>> = Vec::new();
    let mut props: Vec<LineProp> = Vec::new();
    // Index of the previous real (non-synthesized) line, with its scan.
    let mut prev: Option<(usize, bool)> = None;

    while *pos < data.len() {
        let rest = &data[*pos..];
        let nl = memchr::memchr(b'\n', rest).map_or(data.len(), |o| *pos + o);
        let raw = &data[*pos..nl];

        if let Some(&b) = raw.first() {
            if opts.protectchars.contains(b) {
                // Whole line pushed back for the driver to copy verbatim.
                break;
            }
        }

        // Newlines cannot appear in `raw`; everything else isspace-like
        // (tab, vertical tab, form feed, carriage return) becomes a space.
        let mut ln: Vec<u8> = raw
            .iter()
            .map(|&b| {
                if b.is_ascii_whitespace() || b == 0x0B {
                    b' '
                } else {
                    b
                }
            })
            .collect();

        if ln.iter().all(|&b| b == b' ') {
            // Blank line: consume the spaces, push back the newline.
            *pos = nl;
            break;
        }
        *pos = if nl < data.len() { nl + 1 } else { data.len() };

        if opts.quote {
            let (qpend, qsonly) = quote_scan(&ln, &opts.quotechars);
            if let Some((prev_idx, oldqsonly)) = prev {
                let prev_line = &lines[prev_idx];
                let mut k = 0;
                while k < qpend && k < prev_line.len() && ln[k] == prev_line[k] {
                    k += 1;
                }
                if k < qpend {
                    if oldqsonly && qsonly && !opts.invis {
                        // Both skeleton-only: collapse instead of inserting.
                        lines[prev_idx].truncate(k);
                        ln.truncate(k);
                    } else {
                        let vacant = ln[..k].to_vec();
                        lines.push(vacant);
                        props.push(LineProp {
                            invis: opts.invis,
                            ..LineProp::default()
                        });
                    }
                }
            }
            lines.push(ln);
            props.push(LineProp::default());
            let cur = lines.len() - 1;
            let (_, qs) = quote_scan(&lines[cur], &opts.quotechars);
            prev = Some((cur, qs));
        } else {
            lines.push(ln);
            props.push(LineProp::default());
        }
    }

    (lines, props)
}
