//! Textual rewrites resolving LaTeX idioms the converter handles badly.
//!
//! Two rewrites run in order:
//!
//! 1. Apostrophe primes become explicit superscripts, so `f'''` is not read
//!    as three stacked superscript operators.
//! 2. The integrand after a bare integral and its limits is wrapped in a
//!    group, otherwise the equation object ends up with an empty body.
//!
//! Both leave no trigger behind, so normalizing twice changes nothing.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PRIME_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"'+").unwrap());

const INTEGRALS: &[&str] = &["int", "iint", "iiint", "oint"];

/// Prime mark the LaTeX parser accepts as a plain identifier.
const PRIME: &str = "′";

/// Apply every rewrite in order.
pub fn normalize(latex: &str) -> String {
    let primed = rewrite_primes(latex);
    rewrite_integral(&primed).into_owned()
}

/// Replace apostrophe primes with `^{′...}` superscripts.
///
/// Runs of two or more apostrophes always become a prime group of the same
/// length; a single apostrophe is rewritten only after a letter or `)`.
pub fn rewrite_primes(latex: &str) -> Cow<'_, str> {
    if !latex.contains('\'') {
        return Cow::Borrowed(latex);
    }

    PRIME_RUN.replace_all(latex, |caps: &Captures| {
        let run = &caps[0];
        let start = caps.get(0).map_or(0, |m| m.start());
        let after_base = latex[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == ')');

        if run.len() == 1 && !after_base {
            return run.to_string();
        }
        format!("^{{{}}}", PRIME.repeat(run.len()))
    })
}

/// Group the integrand following the first integral and its limits.
///
/// `\int_0^1 f(x)dx` becomes `\int_0^1 {f(x)dx}`. The integrand stops at the
/// end of the enclosing group, at `&`, `\\` or `\right`. Nothing changes when
/// the integrand is empty or already starts with a group.
pub fn rewrite_integral(latex: &str) -> Cow<'_, str> {
    let Some(token_end) = find_integral(latex) else {
        return Cow::Borrowed(latex);
    };

    let run_end = skip_limits(latex, token_end);
    let rest = &latex[run_end..];
    let body = rest[..integrand_end(rest)].trim_end();
    let integrand = body.trim_start();

    if integrand.is_empty() || integrand.starts_with('{') {
        return Cow::Borrowed(latex);
    }

    Cow::Owned(format!(
        "{} {{{}}}{}",
        &latex[..run_end],
        integrand,
        &rest[body.len()..]
    ))
}

/// Byte offset just past the first integral command name.
fn find_integral(latex: &str) -> Option<usize> {
    let bytes = latex.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'\\' {
            pos += 1;
            continue;
        }
        let name_end = command_end(bytes, pos + 1);
        if name_end == pos + 1 {
            // Control symbol such as `\{` or `\\`.
            pos += 2;
            continue;
        }
        if INTEGRALS.contains(&&latex[pos + 1..name_end]) {
            return Some(name_end);
        }
        pos = name_end;
    }
    None
}

fn command_end(bytes: &[u8], from: usize) -> usize {
    let mut end = from;
    while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
        end += 1;
    }
    end
}

/// Consume `\limits`, `\nolimits` and at most one `_` and one `^` script.
fn skip_limits(latex: &str, from: usize) -> usize {
    let bytes = latex.as_bytes();
    let mut end = from;
    let mut seen_sub = false;
    let mut seen_sup = false;

    loop {
        let mut pos = skip_spaces(bytes, end);
        match bytes.get(pos) {
            Some(b'\\') => {
                let name_end = command_end(bytes, pos + 1);
                match &latex[pos + 1..name_end] {
                    "limits" | "nolimits" => end = name_end,
                    _ => return end,
                }
            }
            Some(&marker @ (b'_' | b'^')) => {
                let seen = if marker == b'_' {
                    &mut seen_sub
                } else {
                    &mut seen_sup
                };
                if *seen {
                    return end;
                }
                *seen = true;
                pos = skip_spaces(bytes, pos + 1);
                match argument_end(latex, pos) {
                    Some(arg_end) => end = arg_end,
                    None => return end,
                }
            }
            _ => return end,
        }
    }
}

fn skip_spaces(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// End of a single script argument: a group, a command or one character.
fn argument_end(latex: &str, pos: usize) -> Option<usize> {
    let bytes = latex.as_bytes();
    match bytes.get(pos)? {
        b'{' => {
            let mut depth = 0usize;
            let mut i = pos;
            while i < bytes.len() {
                match bytes[i] {
                    b'\\' => i += 1,
                    b'{' => depth += 1,
                    b'}' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(i + 1);
                        }
                    }
                    _ => {}
                }
                i += 1;
            }
            None
        }
        b'\\' => {
            let name_end = command_end(bytes, pos + 1);
            if name_end > pos + 1 {
                Some(name_end)
            } else {
                latex[pos + 1..]
                    .chars()
                    .next()
                    .map(|c| pos + 1 + c.len_utf8())
            }
        }
        _ => latex[pos..].chars().next().map(|c| pos + c.len_utf8()),
    }
}

/// Length of the integrand within `rest`.
fn integrand_end(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                if depth == 0 {
                    return i;
                }
                depth -= 1;
            }
            b'&' if depth == 0 => return i,
            b'\\' => {
                let name_end = command_end(bytes, i + 1);
                if name_end == i + 1 {
                    if depth == 0 && bytes.get(i + 1) == Some(&b'\\') {
                        return i;
                    }
                    // Escaped character: `\{`, `\}`, `\&`, ...
                    i += 2;
                    continue;
                }
                if depth == 0 && &rest[i + 1..name_end] == "right" {
                    return i;
                }
                i = name_end;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}
