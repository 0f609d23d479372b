use std::borrow::Cow;

use crate::par::affix::resolve_affixes;
use crate::par::delimit::{delimit, mark_superfluous};
use crate::par::error::ParError;
use crate::par::lines::{LineProp, read_ip};
use crate::par::options::ParOptions;
use crate::par::reflow::reflow_segment;

/// Reformat `data` into `out`.
///
/// Blank lines copy through as bare newlines, protected lines copy
/// verbatim, and everything else is gathered into input paragraphs which
/// are delimited, split into stretches at separator lines and paragraph
/// starts, and reflowed. The first error aborts the run; output already
/// in `out` is kept for the caller to flush.
pub fn par_data(data: &[u8], out: &mut Vec<u8>, opts: &ParOptions) -> Result<(), ParError> {
    // NULs are dropped globally, and a missing final newline is supplied.
    let data: Cow<[u8]> = if memchr::memchr(0, data).is_some()
        || data.last().is_some_and(|&b| b != b'\n')
    {
        let mut owned: Vec<u8> = data.iter().copied().filter(|&b| b != 0).collect();
        if owned.last().is_some_and(|&b| b != b'\n') {
            owned.push(b'\n');
        }
        Cow::Owned(owned)
    } else {
        Cow::Borrowed(data)
    };
    let data = data.as_ref();

    let mut pos = 0;
    while pos < data.len() {
        let b = data[pos];
        if b == b'\n' {
            out.push(b'\n');
            pos += 1;
            continue;
        }
        if opts.protectchars.contains(b) {
            let nl = memchr::memchr(b'\n', &data[pos..]).map_or(data.len(), |o| pos + o);
            out.extend_from_slice(&data[pos..nl]);
            out.push(b'\n');
            pos = (nl + 1).min(data.len());
            continue;
        }
        let (lines, mut props) = read_ip(data, &mut pos, opts);
        if lines.is_empty() {
            continue;
        }
        delimit(&lines, &mut props, opts, 0, 0);
        mark_superfluous(&lines, &mut props);
        emit_ip(&lines, &props, opts, out)?;
    }
    Ok(())
}

/// Walk one delimited paragraph: separators go straight out, stretches
/// between them (split again at paragraph-start marks) are reflowed.
fn emit_ip(
    lines: &[Vec<u8>],
    props: &[LineProp],
    opts: &ParOptions,
    out: &mut Vec<u8>,
) -> Result<(), ParError> {
    let mut i = 0;
    while i < lines.len() {
        if props[i].bodiless {
            emit_bodiless(&lines[i], &props[i], opts, out);
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < lines.len() && !props[j].bodiless && !props[j].first {
            j += 1;
        }
        let aff = resolve_affixes(&lines[i..j], &props[i..j], opts);
        reflow_segment(&lines[i..j], &aff, opts, out)?;
        i = j;
    }
    Ok(())
}

/// Emit one separator line: suppressed when it is an invisible quote-gap
/// line or a superfluous vacant under expel; re-rendered to the full
/// output width when a repeat count is in force; verbatim otherwise.
fn emit_bodiless(line: &[u8], prop: &LineProp, opts: &ParOptions, out: &mut Vec<u8>) {
    if prop.invis {
        return;
    }
    if opts.expel && prop.superf {
        return;
    }
    if prop.rc != b' ' && opts.repeat > 0 {
        out.extend_from_slice(&line[..prop.p]);
        let body = opts.width.saturating_sub(prop.p + prop.s);
        out.resize(out.len() + body, prop.rc);
        out.extend_from_slice(&line[line.len() - prop.s..]);
        out.push(b'\n');
    } else {
        out.extend_from_slice(line);
        out.push(b'\n');
    }
}
