use std::io::{self, BufWriter, Write};
use std::process;

use par_rs::common::io::read_stdin;
use par_rs::common::{io_error_msg, reset_sigpipe};
use par_rs::par::{ArgOutcome, ParError, ParOptions, apply_arg, par_data};
use par_rs::par::charset::parse_charset;

const USAGE: &str = "\
Usage: fpar [help] [version] [B<op><set>] [P<op><set>] [Q<op><set>]
            [h[<hang>]] [p[<prefix>]] [r[<repeat>]] [s[<suffix>]] [w[<width>]]
            [c[<cap>]] [d[<div>]] [E[<Err>]] [e[<expel>]] [f[<fit>]]
            [g[<guess>]] [i[<invis>]] [j[<just>]] [l[<last>]] [q[<quote>]]
            [R[<Report>]] [t[<touch>]]

<op> is '=' (replace), '+' (augment), or '-' (diminish). Numeric arguments
are at most 9999; a bare number sets the prefix when at most 8, the width
otherwise. Options may be chained within one argument, e.g. 'w60jl'.
Reads standard input, writes reformatted paragraphs to standard output.
";

/// Error messages go to stderr only when the Err option is on; the
/// default stream is stdout.
fn report(opts: &ParOptions, msg: &str) {
    if opts.err_out {
        eprintln!("par: {}", msg);
    } else {
        println!("par: {}", msg);
    }
}

fn fail(opts: &ParOptions, err: &ParError) -> ! {
    report(opts, &err.to_string());
    if matches!(err, ParError::BadArgument(_) | ParError::BadCharset(_)) {
        if opts.err_out {
            eprint!("{}", USAGE);
        } else {
            print!("{}", USAGE);
        }
    }
    process::exit(1);
}

fn handle_outcome(outcome: ArgOutcome) {
    match outcome {
        ArgOutcome::Parsed => {}
        ArgOutcome::Help => {
            print!("{}", USAGE);
            process::exit(0);
        }
        ArgOutcome::Version => {
            println!("par (fpar) {}", env!("CARGO_PKG_VERSION"));
            process::exit(0);
        }
    }
}

fn main() {
    reset_sigpipe();

    let mut opts = ParOptions::default();

    // Environment charsets replace the built-in defaults when present.
    let env_charset = |opts: &ParOptions, var: &str| -> Option<par_rs::par::CharSet> {
        let value = std::env::var_os(var)?;
        match parse_charset(value.as_encoded_bytes()) {
            Ok(set) => Some(set),
            Err(e) => fail(opts, &e),
        }
    };
    if let Some(set) = env_charset(&opts, "PARBODY") {
        opts.bodychars = set;
    }
    if let Some(set) = env_charset(&opts, "PARPROTECT") {
        opts.protectchars = set;
    }
    if let Some(set) = env_charset(&opts, "PARQUOTE") {
        opts.quotechars = set;
    }

    // PARINIT supplies a whitespace-separated argument prefix.
    if let Some(init) = std::env::var_os("PARINIT") {
        let bytes = init.as_encoded_bytes().to_vec();
        for tok in bytes.split(|b| b.is_ascii_whitespace()) {
            if tok.is_empty() {
                continue;
            }
            match apply_arg(&mut opts, tok) {
                Ok(outcome) => handle_outcome(outcome),
                Err(e) => fail(&opts, &e),
            }
        }
    }

    for arg in std::env::args_os().skip(1) {
        match apply_arg(&mut opts, arg.as_encoded_bytes()) {
            Ok(outcome) => handle_outcome(outcome),
            Err(e) => fail(&opts, &e),
        }
    }

    let data = match read_stdin() {
        Ok(d) => d,
        Err(e) => {
            report(&opts, &format!("standard input: {}", io_error_msg(&e)));
            process::exit(1);
        }
    };

    let mut formatted = Vec::with_capacity(data.len() + data.len() / 8 + 64);
    let result = par_data(&data, &mut formatted, &opts);

    // Emit whatever was produced before any failure, then the message.
    let stdout = io::stdout();
    let mut out = BufWriter::with_capacity(256 * 1024, stdout.lock());
    if let Err(e) = out.write_all(&formatted).and_then(|_| out.flush()) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            process::exit(0);
        }
        report(&opts, &format!("write error: {}", io_error_msg(&e)));
        process::exit(1);
    }
    drop(out);

    if let Err(e) = result {
        fail(&opts, &e);
    }
}
