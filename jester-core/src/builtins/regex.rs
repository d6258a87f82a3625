// jester-core - Regular expression built-ins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Regular expression operations using Rust regex syntax.
//!
//! Note the differences from Java/Clojure patterns: no lookaround, named
//! groups are `(?P<name>...)`, and backreferences are unsupported.

use jester_reader::{JesterRegex, JesterVal};

use crate::builtins::expect_arity;
use crate::error::{Error, Result};
use crate::eval::make_native_fn;
use crate::namespace::Namespace;

pub(crate) fn register(ns: &Namespace) {
    ns.intern_with_value("regex?", make_native_fn("regex?", builtin_regex_p));
    ns.intern_with_value("re-pattern", make_native_fn("re-pattern", builtin_re_pattern));
    ns.intern_with_value("re-find", make_native_fn("re-find", builtin_re_find));
    ns.intern_with_value("re-matches", make_native_fn("re-matches", builtin_re_matches));
    ns.intern_with_value("re-seq", make_native_fn("re-seq", builtin_re_seq));
}

fn builtin_regex_p(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("regex?", args, 1)?;
    Ok(JesterVal::Bool(matches!(&args[0], JesterVal::Regex(_))))
}

fn builtin_re_pattern(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("re-pattern", args, 1)?;
    match &args[0] {
        JesterVal::String(s) => JesterVal::try_regex(s)
            .ok_or_else(|| Error::eval(format!("re-pattern: invalid regex pattern: {}", s))),
        JesterVal::Regex(r) => Ok(JesterVal::Regex(r.clone())),
        other => Err(Error::type_error_in(
            "re-pattern",
            "string or regex",
            other.type_name(),
        )),
    }
}

fn regex_and_string<'a>(
    name: &str,
    args: &'a [JesterVal],
) -> Result<(&'a JesterRegex, &'a str)> {
    expect_arity(name, args, 2)?;
    let JesterVal::Regex(re) = &args[0] else {
        return Err(Error::type_error_in(name, "regex", args[0].type_name()));
    };
    let JesterVal::String(s) = &args[1] else {
        return Err(Error::type_error_in(name, "string", args[1].type_name()));
    };
    Ok((re, s))
}

/// A match as a value: the whole match, or `[whole group...]` when the
/// pattern has capture groups.
fn match_value(re: &JesterRegex, caps: &regex::Captures<'_>) -> JesterVal {
    if re.regex().captures_len() == 1 {
        return JesterVal::string(caps.get(0).map_or("", |m| m.as_str()));
    }
    let groups: Vec<JesterVal> = (0..caps.len())
        .map(|i| match caps.get(i) {
            Some(m) => JesterVal::string(m.as_str()),
            None => JesterVal::Nil,
        })
        .collect();
    JesterVal::vector(groups)
}

fn builtin_re_find(args: &[JesterVal]) -> Result<JesterVal> {
    let (re, s) = regex_and_string("re-find", args)?;
    match re.regex().captures(s) {
        Some(caps) => Ok(match_value(re, &caps)),
        None => Ok(JesterVal::Nil),
    }
}

fn builtin_re_matches(args: &[JesterVal]) -> Result<JesterVal> {
    let (re, s) = regex_and_string("re-matches", args)?;
    match re.regex().captures(s) {
        Some(caps) if caps.get(0).map_or(false, |m| m.as_str() == s) => {
            Ok(match_value(re, &caps))
        }
        _ => Ok(JesterVal::Nil),
    }
}

fn builtin_re_seq(args: &[JesterVal]) -> Result<JesterVal> {
    let (re, s) = regex_and_string("re-seq", args)?;
    let matches: Vec<JesterVal> = re
        .regex()
        .captures_iter(s)
        .map(|caps| match_value(re, &caps))
        .collect();
    if matches.is_empty() {
        Ok(JesterVal::Nil)
    } else {
        Ok(JesterVal::list(matches))
    }
}
