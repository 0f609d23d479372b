use crate::par::charset::{CharSet, parse_charset};
use crate::par::error::ParError;

/// Largest value accepted for any numeric option argument.
const NUM_MAX: usize = 9999;

/// The full option state of one run.
///
/// Charsets come first, then the numeric knobs, then the boolean flags in
/// option-letter order. `prefix`/`suffix` are `None` when left to the
/// affix analysis; `touch` is `None` until the `t` option is given and
/// resolves to `fit | last`.
#[derive(Clone, Debug)]
pub struct ParOptions {
    pub bodychars: CharSet,
    pub protectchars: CharSet,
    pub quotechars: CharSet,
    pub terminalchars: CharSet,

    pub hang: usize,
    pub prefix: Option<usize>,
    pub repeat: usize,
    pub suffix: Option<usize>,
    pub width: usize,

    pub cap: bool,
    pub div: bool,
    pub err_out: bool,
    pub expel: bool,
    pub fit: bool,
    pub guess: bool,
    pub invis: bool,
    pub just: bool,
    pub last: bool,
    pub quote: bool,
    pub report: bool,
    pub touch: Option<bool>,
}

impl Default for ParOptions {
    fn default() -> Self {
        let mut bodychars = CharSet::new();
        for b in (b'0'..=b'9').chain(b'A'..=b'Z').chain(b'a'..=b'z') {
            bodychars.insert(b);
        }
        ParOptions {
            bodychars,
            protectchars: CharSet::new(),
            quotechars: CharSet::from_bytes(b"> "),
            terminalchars: CharSet::from_bytes(b".?!"),
            hang: 0,
            prefix: None,
            repeat: 0,
            suffix: None,
            width: 72,
            cap: false,
            div: false,
            err_out: false,
            expel: false,
            fit: false,
            guess: false,
            invis: false,
            just: false,
            last: false,
            quote: false,
            report: false,
            touch: None,
        }
    }
}

impl ParOptions {
    /// The effective `touch` value: `fit | last` unless set explicitly.
    pub fn touch_resolved(&self) -> bool {
        self.touch.unwrap_or(self.fit || self.last)
    }
}

/// What a single argument asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgOutcome {
    Parsed,
    Help,
    Version,
}

fn bad(arg: &[u8]) -> ParError {
    ParError::BadArgument(String::from_utf8_lossy(arg).into_owned())
}

/// Parse an optional decimal run at `arg[j..]`. Returns the value (None
/// when no digits follow) and the index after the run.
fn opt_num(arg: &[u8], mut j: usize) -> Result<(Option<usize>, usize), ParError> {
    let start = j;
    let mut v: usize = 0;
    while j < arg.len() && arg[j].is_ascii_digit() {
        v = v * 10 + (arg[j] - b'0') as usize;
        if v > NUM_MAX {
            return Err(bad(arg));
        }
        j += 1;
    }
    if j == start {
        Ok((None, j))
    } else {
        Ok((Some(v), j))
    }
}

/// Apply one command-line argument (or one PARINIT token) to `opts`.
///
/// An argument is a chain of options: `w60jl` is `w60` + `j` + `l`. A
/// charset option (`B`, `P`, `Q`) consumes the rest of the argument. A
/// bare number sets `prefix` when it is at most 8, `width` otherwise.
pub fn apply_arg(opts: &mut ParOptions, arg: &[u8]) -> Result<ArgOutcome, ParError> {
    if arg == b"help" {
        return Ok(ArgOutcome::Help);
    }
    if arg == b"version" {
        return Ok(ArgOutcome::Version);
    }

    let mut i = 0;
    while i < arg.len() {
        let c = arg[i];
        match c {
            b'B' | b'P' | b'Q' => {
                let op = *arg.get(i + 1).ok_or_else(|| bad(arg))?;
                if !matches!(op, b'=' | b'+' | b'-') {
                    return Err(bad(arg));
                }
                let set = parse_charset(&arg[i + 2..])?;
                let target = match c {
                    b'B' => &mut opts.bodychars,
                    b'P' => &mut opts.protectchars,
                    _ => &mut opts.quotechars,
                };
                match op {
                    b'=' => *target = set,
                    b'+' => target.union_with(&set),
                    _ => target.difference_with(&set),
                }
                // The charset literal runs to the end of the argument.
                return Ok(ArgOutcome::Parsed);
            }
            b'h' => {
                let (v, ni) = opt_num(arg, i + 1)?;
                opts.hang = v.unwrap_or(1);
                i = ni;
            }
            b'p' => {
                let (v, ni) = opt_num(arg, i + 1)?;
                opts.prefix = v;
                i = ni;
            }
            b'r' => {
                let (v, ni) = opt_num(arg, i + 1)?;
                opts.repeat = v.unwrap_or(3);
                i = ni;
            }
            b's' => {
                let (v, ni) = opt_num(arg, i + 1)?;
                opts.suffix = v;
                i = ni;
            }
            b'w' => {
                let (v, ni) = opt_num(arg, i + 1)?;
                opts.width = v.unwrap_or(72);
                i = ni;
            }
            b'c' | b'd' | b'E' | b'e' | b'f' | b'g' | b'i' | b'j' | b'l' | b'q' | b'R'
            | b't' => {
                let (v, ni) = opt_num(arg, i + 1)?;
                let on = match v {
                    None | Some(1) => true,
                    Some(0) => false,
                    Some(_) => return Err(bad(arg)),
                };
                match c {
                    b'c' => opts.cap = on,
                    b'd' => opts.div = on,
                    b'E' => opts.err_out = on,
                    b'e' => opts.expel = on,
                    b'f' => opts.fit = on,
                    b'g' => opts.guess = on,
                    b'i' => opts.invis = on,
                    b'j' => opts.just = on,
                    b'l' => opts.last = on,
                    b'q' => opts.quote = on,
                    b'R' => opts.report = on,
                    _ => opts.touch = Some(on),
                }
                i = ni;
            }
            b'0'..=b'9' => {
                let (v, ni) = opt_num(arg, i)?;
                let v = v.expect("digit run starts here");
                if v <= 8 {
                    opts.prefix = Some(v);
                } else {
                    opts.width = v;
                }
                i = ni;
            }
            _ => return Err(bad(arg)),
        }
    }
    Ok(ArgOutcome::Parsed)
}

/// Apply a whole argument list. Stops early on `help`/`version`.
pub fn apply_args<'a, I>(opts: &mut ParOptions, args: I) -> Result<ArgOutcome, ParError>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    for arg in args {
        match apply_arg(opts, arg)? {
            ArgOutcome::Parsed => {}
            other => return Ok(other),
        }
    }
    Ok(ArgOutcome::Parsed)
}
