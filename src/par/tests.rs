use super::core::par_data;
use super::error::ParError;
use super::options::{ArgOutcome, ParOptions, apply_arg};

/// Helper: build options from argument strings, run the filter over the
/// input, and return the output as a String.
fn run_par(input: &str, args: &[&str]) -> String {
    let mut opts = ParOptions::default();
    for a in args {
        assert_eq!(
            apply_arg(&mut opts, a.as_bytes()).expect("test args should parse"),
            ArgOutcome::Parsed
        );
    }
    let mut out = Vec::new();
    par_data(input.as_bytes(), &mut out, &opts).expect("reformat should succeed");
    String::from_utf8(out).expect("output should be UTF-8 for UTF-8 input")
}

/// Helper: like run_par but expecting a failure; returns the error and
/// whatever output was produced before it.
fn run_par_err(input: &str, args: &[&str]) -> (ParError, String) {
    let mut opts = ParOptions::default();
    for a in args {
        apply_arg(&mut opts, a.as_bytes()).expect("test args should parse");
    }
    let mut out = Vec::new();
    let err = par_data(input.as_bytes(), &mut out, &opts).expect_err("reformat should fail");
    (err, String::from_utf8(out).unwrap())
}

fn run_default(input: &str) -> String {
    run_par(input, &[])
}

// ===== test_simple_reflow =====

#[test]
fn test_simple_reflow() {
    let result = run_par("The quick brown fox jumps\nover the lazy dog.\n", &["w15"]);
    assert_eq!(result, "The quick brown\nfox jumps over\nthe lazy dog.\n");
}

#[test]
fn test_reflow_is_idempotent() {
    let once = run_par("The quick brown fox jumps\nover the lazy dog.\n", &["w15"]);
    let twice = run_par(&once, &["w15"]);
    assert_eq!(once, twice, "reflowing reflowed text should not change it");
}

#[test]
fn test_default_width_is_72() {
    let input = "word ".repeat(40) + "\n";
    let result = run_default(&input);
    for line in result.lines() {
        assert!(line.len() <= 72, "line exceeds 72: {:?}", line);
    }
    assert!(result.lines().count() > 1);
}

#[test]
fn test_empty_input() {
    assert_eq!(run_default(""), "");
}

#[test]
fn test_blank_lines_copy_through() {
    assert_eq!(run_default("aa\n\n\n\nbb\n"), "aa\n\n\n\nbb\n");
    // A line of spaces is blank; its spaces are not kept.
    assert_eq!(run_default("aa\n   \nbb\n"), "aa\n\nbb\n");
    assert_eq!(run_default("   \n"), "\n");
}

#[test]
fn test_missing_final_newline_is_supplied() {
    assert_eq!(run_default("hello there"), "hello there\n");
}

#[test]
fn test_nul_bytes_are_dropped() {
    assert_eq!(run_default("he\0llo wor\0ld\n"), "hello world\n");
}

// ===== test_justify =====

#[test]
fn test_justify_single_line_is_not_padded() {
    // The whole paragraph is the last line; without `l` it stays ragged.
    let result = run_par("one two three four\n", &["w20", "j"]);
    assert_eq!(result, "one two three four\n");
}

#[test]
fn test_justify_last_line_with_l() {
    // extra = 2 over 3 gaps; the phase accumulator starts at numgaps/2
    // and lands the extra spaces in the first and third gaps.
    let result = run_par("one two three four\n", &["w20", "j", "l"]);
    assert_eq!(result, "one  two three  four\n");
}

#[test]
fn test_justify_internal_lines_are_exact() {
    let result = run_par("one two three four five\n", &["w12", "j"]);
    assert_eq!(result, "one      two\nthree   four\nfive\n");
}

#[test]
fn test_justify_multi_line() {
    let result = run_par("aa bb cc dd ee\n", &["w8", "j"]);
    assert_eq!(result, "aa bb cc\ndd ee\n");
}

#[test]
fn test_justify_line_widths() {
    let input = "words to fill a justified paragraph nicely here\n";
    let result = run_par(input, &["w20", "j", "l"]);
    for line in result.lines() {
        assert_eq!(line.len(), 20, "justified line not exact: {:?}", line);
    }
}

#[test]
fn test_cannot_justify() {
    let (err, _) = run_par_err("aaaaaaaa bbbbbbbb\n", &["w9", "j", "l"]);
    assert_eq!(err, ParError::CannotJustify);
}

// ===== test_guess =====

#[test]
fn test_guess_merges_adjacent_sentence_break() {
    // "Hello." is curious and "World" capital and adjacent: they merge
    // into a 12-byte token, which then splits at the 10-byte body width.
    let result = run_par("Hello. World foo.\n", &["g", "w10"]);
    assert_eq!(result, "Hello. Wor\nld foo.\n");
}

#[test]
fn test_guess_shifted_break_gets_two_spaces() {
    let result = run_par("Stop.  Go on now please yes\n", &["g", "w15"]);
    assert_eq!(result, "Stop.  Go on\nnow please yes\n");
}

#[test]
fn test_guess_shifted_word_at_line_start_gets_no_extra() {
    let result = run_par("Ok.  Borrowing more words here\n", &["g", "w10"]);
    assert_eq!(result, "Ok.\nBorrowing\nmore words\nhere\n");
}

#[test]
fn test_guess_off_collapses_wide_breaks() {
    let result = run_par("Hello.  World foo\n", &["w72"]);
    assert_eq!(result, "Hello. World foo\n");
}

// ===== test_overlong_words =====

#[test]
fn test_word_too_long_reported() {
    let (err, _) = run_par_err("supercalifragilisticexpialidocious\n", &["w10", "R"]);
    let msg = err.to_string();
    assert!(msg.contains("Word too long"), "unexpected message {:?}", msg);
    assert!(msg.contains("supercalif"));
}

#[test]
fn test_word_too_long_split_without_report() {
    let result = run_par("supercalifragilisticexpialidocious\n", &["w10"]);
    assert_eq!(result, "supercalif\nragilistic\nexpialidoc\nious\n");
}

#[test]
fn test_error_keeps_earlier_output() {
    let input = "short words fit\n\nsupercalifragilisticexpialidocious\n";
    let (err, partial) = run_par_err(input, &["w15", "R"]);
    assert!(matches!(err, ParError::WordTooLong(_)));
    assert_eq!(partial, "short words fit\n\n");
}

// ===== test_bodiless =====

#[test]
fn test_bodiless_lines_pass_through() {
    let result = run_par("---\nfoo bar\n---\n", &["B=---"]);
    assert_eq!(result, "---\nfoo bar\n---\n");
}

#[test]
fn test_bodiless_separators_split_paragraphs() {
    let result = run_par("-----\nalpha beta gamma delta\n-----\n", &["B+-", "w10"]);
    assert_eq!(result, "-----\nalpha beta\ngamma\ndelta\n-----\n");
}

#[test]
fn test_bodiless_rendered_to_width_with_repeat() {
    let result = run_par("--\nfoo bar baz\n--\n", &["B+-", "r2", "w10"]);
    assert_eq!(result, "----------\nfoo bar\nbaz\n----------\n");
}

#[test]
fn test_repeat_threshold_excludes_short_runs() {
    // Two dashes fall short of repeat = 3, so the line is an ordinary
    // word and joins the paragraph.
    let result = run_par("-- foo bar\n", &["B+-", "r3", "w72"]);
    assert_eq!(result, "-- foo bar\n");
}

// ===== test_quote =====

#[test]
fn test_quote_gap_inserts_vacant_line() {
    let result = run_par("> A\n> > B\n", &["q"]);
    assert_eq!(result, "> A\n> \n> > B\n");
}

#[test]
fn test_quote_gap_invisible_lines_are_suppressed() {
    let result = run_par("> A\n> > B\n", &["q", "i"]);
    assert_eq!(result, "> A\n> > B\n");
}

#[test]
fn test_quoted_paragraph_keeps_prefix() {
    let result = run_par("> hello world this is text\n", &["q", "w12"]);
    assert_eq!(result, "> hello\n> world this\n> is text\n");
}

#[test]
fn test_expel_drops_extra_vacants() {
    let result = run_par("> one\n> \n> \n> two\n", &["e"]);
    assert_eq!(result, "> one\n> \n> two\n");
}

#[test]
fn test_without_expel_vacants_stay() {
    let result = run_par("> one\n> \n> \n> two\n", &[]);
    assert_eq!(result, "> one\n> \n> \n> two\n");
}

// ===== test_affixes =====

#[test]
fn test_user_prefix_and_suffix_reattach() {
    let result = run_par("# aa bb cc #\n# dd ee ff #\n", &["p2", "s2", "w16"]);
    assert_eq!(result, "# aa bb cc dd  #\n# ee ff        #\n");
}

#[test]
fn test_touch_pulls_suffix_to_text() {
    let result = run_par("# aa bb cc #\n# dd ee ff #\n", &["p2", "s2", "w16", "t"]);
    assert_eq!(result, "# aa bb cc dd #\n# ee ff       #\n");
}

#[test]
fn test_hanging_indent_from_secondary_scan() {
    let input = "* item one two\n  cont a b\n  cont c d\n";
    let result = run_par(input, &["h1", "w14"]);
    let lines: Vec<&str> = result.lines().collect();
    assert!(lines[0].starts_with("* "), "first line keeps its tag: {:?}", lines);
    for line in &lines[1..] {
        assert!(line.starts_with("  "), "continuation indented: {:?}", line);
        assert!(line.len() <= 14);
    }
    // Same words, new arrangement.
    let words: Vec<&str> = result.split_whitespace().collect();
    assert_eq!(words, ["*", "item", "one", "two", "cont", "a", "b", "cont", "c", "d"]);
}

#[test]
fn test_hang_extends_output() {
    let result = run_par("> item text\n", &["q", "h2", "w72"]);
    assert_eq!(result, "> item text\n> \n");
}

#[test]
fn test_line_too_short() {
    let (err, _) = run_par_err("abcdef\nxy\n", &["p3", "w20"]);
    match err {
        ParError::LineTooShort { line, len, prefix, suffix } => {
            assert_eq!(line, 2);
            assert_eq!(len, 2);
            assert_eq!(prefix, 3);
            assert_eq!(suffix, 0);
        }
        other => panic!("expected LineTooShort, got {other:?}"),
    }
}

#[test]
fn test_width_too_small() {
    let (err, _) = run_par_err("abcdefgh\n", &["p5", "s5", "w8"]);
    assert_eq!(
        err,
        ParError::WidthTooSmall {
            prefix: 5,
            suffix: 5,
            width: 8
        }
    );
}

// ===== test_div =====

#[test]
fn test_div_splits_at_indent_changes() {
    let input = "  aa bb\n  cc dd\nee ff\ngg hh\n";
    let result = run_par(input, &["d", "w72"]);
    assert_eq!(result, "  aa bb cc dd\nee ff gg hh\n");
}

#[test]
fn test_without_div_whole_ip_is_one_paragraph() {
    let input = "  aa bb\n  cc dd\nee ff\ngg hh\n";
    let result = run_par(input, &["w72"]);
    assert_eq!(result, "aa bb cc dd ee ff gg hh\n");
}

// ===== test_protect =====

#[test]
fn test_protected_lines_copy_verbatim() {
    let input = "text one\n#verbatim\ttabs kept\nmore text\n";
    let result = run_par(input, &["P=#"]);
    assert_eq!(result, "text one\n#verbatim\ttabs kept\nmore text\n");
}

#[test]
fn test_protected_line_first() {
    let result = run_par("#only this\n", &["P=#"]);
    assert_eq!(result, "#only this\n");
}

// ===== test_fit =====

#[test]
fn test_fit_respects_width() {
    let result = run_par("aaaa bb cc\n", &["w9", "f"]);
    assert_eq!(result, "aaaa bb\ncc\n");
}

#[test]
fn test_last_evens_out_the_last_line() {
    // With l, the last line participates in the cost and the shortest-line
    // bound; the three-line arrangement keeps lines near the same length.
    let result = run_par("aa bb cc dd ee ff\n", &["w8", "l"]);
    for line in result.lines() {
        assert!(line.len() <= 8);
        assert!(line.len() >= 5, "last-line balance violated: {:?}", result);
    }
}

// ===== test_tie_breaks =====

#[test]
fn test_ragged_prefers_latest_break_on_ties() {
    // Both arrangements cost 25; the later break must win.
    let result = run_par("alpha beta gamma delta\n", &["w10"]);
    assert_eq!(result, "alpha beta\ngamma\ndelta\n");
}

// ===== properties =====

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn produced_lines_fit_width(
            words in prop::collection::vec("[a-z]{1,8}", 2..40),
            width in 20usize..60,
        ) {
            let input = words.join(" ") + "\n";
            let out = run_par(&input, &[&format!("w{width}")]);
            for line in out.lines() {
                prop_assert!(line.len() <= width, "{:?} exceeds {}", line, width);
            }
        }

        #[test]
        fn word_multiset_is_preserved(
            words in prop::collection::vec("[a-z]{1,8}", 2..40),
            width in 20usize..60,
        ) {
            let input = words.join(" ") + "\n";
            let out = run_par(&input, &[&format!("w{width}")]);
            let mut before = words.clone();
            before.sort();
            let mut after: Vec<String> =
                out.split_whitespace().map(str::to_owned).collect();
            after.sort();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn huge_width_round_trips_to_one_line(
            words in prop::collection::vec("[a-z]{1,8}", 8..40),
        ) {
            // Whole chunks only, so no line ever holds a single word
            // (a lone repeated-letter word would read as a separator).
            let words = &words[..words.len() - words.len() % 4];
            let input: String = words
                .chunks(4)
                .map(|c| c.join(" ") + "\n")
                .collect();
            let out = run_par(&input, &["w9999"]);
            prop_assert_eq!(out.lines().count(), 1);
            prop_assert_eq!(out, words.join(" ") + "\n");
        }
    }
}

// ===== Integration tests via binary =====

#[cfg(test)]
mod integration {
    use std::process::Command;

    fn bin_path(name: &str) -> std::path::PathBuf {
        let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("target");
        if cfg!(debug_assertions) {
            path.push("debug");
        } else {
            path.push("release");
        }
        path.push(name);
        path
    }

    fn run_fpar(input: &[u8], args: &[&str], envs: &[(&str, &str)]) -> (Vec<u8>, Vec<u8>, i32) {
        let mut cmd = Command::new(bin_path("fpar"));
        cmd.args(args);
        for var in ["PARINIT", "PARBODY", "PARPROTECT", "PARQUOTE"] {
            cmd.env_remove(var);
        }
        for (k, v) in envs {
            cmd.env(k, v);
        }
        cmd.stdin(std::process::Stdio::piped());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());
        let mut child = cmd.spawn().expect("failed to spawn fpar");
        use std::io::Write;
        child.stdin.take().unwrap().write_all(input).unwrap();
        let output = child.wait_with_output().expect("failed to wait");
        (output.stdout, output.stderr, output.status.code().unwrap_or(-1))
    }

    #[test]
    fn test_fpar_stdin_default() {
        let (out, _, code) = run_fpar(b"The quick brown fox jumps\nover the lazy dog.\n", &["w15"], &[]);
        assert_eq!(code, 0);
        assert_eq!(out, b"The quick brown\nfox jumps over\nthe lazy dog.\n");
    }

    #[test]
    fn test_fpar_help() {
        let (out, _, code) = run_fpar(b"", &["help"], &[]);
        assert_eq!(code, 0);
        assert!(String::from_utf8(out).unwrap().contains("Usage"));
    }

    #[test]
    fn test_fpar_version() {
        let (out, _, code) = run_fpar(b"", &["version"], &[]);
        assert_eq!(code, 0);
        assert!(String::from_utf8(out).unwrap().starts_with("par (fpar)"));
    }

    #[test]
    fn test_fpar_bad_option_prints_usage() {
        let (out, _, code) = run_fpar(b"", &["zz"], &[]);
        assert_eq!(code, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("bad option"));
        assert!(text.contains("Usage"));
    }

    #[test]
    fn test_fpar_error_goes_to_stdout_by_default() {
        let (out, err, code) =
            run_fpar(b"supercalifragilisticexpialidocious\n", &["w10", "R"], &[]);
        assert_eq!(code, 1);
        assert!(String::from_utf8(out).unwrap().contains("Word too long"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_fpar_error_goes_to_stderr_with_big_e() {
        let (out, err, code) =
            run_fpar(b"supercalifragilisticexpialidocious\n", &["w10", "R", "E"], &[]);
        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert!(String::from_utf8(err).unwrap().contains("Word too long"));
    }

    #[test]
    fn test_fpar_parinit_environment() {
        let (out, _, code) = run_fpar(
            b"The quick brown fox jumps\nover the lazy dog.\n",
            &[],
            &[("PARINIT", "w15")],
        );
        assert_eq!(code, 0);
        assert_eq!(out, b"The quick brown\nfox jumps over\nthe lazy dog.\n");
    }

    #[test]
    fn test_fpar_command_line_overrides_parinit() {
        let (out, _, code) = run_fpar(
            b"The quick brown fox jumps\nover the lazy dog.\n",
            &["w72"],
            &[("PARINIT", "w15")],
        );
        assert_eq!(code, 0);
        assert_eq!(out, b"The quick brown fox jumps over the lazy dog.\n");
    }

    #[test]
    fn test_fpar_parprotect_environment() {
        let (out, _, code) = run_fpar(
            b"%keep this line\ntext to flow\n",
            &[],
            &[("PARPROTECT", "%")],
        );
        assert_eq!(code, 0);
        assert_eq!(out, b"%keep this line\ntext to flow\n");
    }
}
