// jester-reader - Reader
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The reader: turns tokens into values with source positions.
//!
//! End of input is signalled distinctly from a read error: `read` returns
//! `Ok(None)` at end of input and `Err` with a position and message on a
//! malformed form.
//!
//! Reader macros handled here: quote, deref, var-quote, discard, metadata,
//! set/regex/anonymous-function literals, syntax-quote with unquote,
//! unquote-splicing and auto-gensym, and `#?`/`#?@` conditionals against a
//! caller-supplied feature set. The reader never consults global state: the
//! feature set and current namespace arrive through the constructor.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::array_map::{ArrayMap, HASHMAP_THRESHOLD};
use crate::hash_map::PersistentHashMap;
use crate::intern::{intern, InternedStr};
use crate::keyword::Keyword;
use crate::lexer::{Lexer, LexerError, Token};
use crate::list::List;
use crate::set::PersistentSet;
use crate::symbol::Symbol;
use crate::value::{JesterVal, SourceInfo};

/// Read error with position information.
#[derive(Debug, Clone)]
pub struct ReadError {
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub file: Option<InternedStr>,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.file.as_ref().map_or("<file>", InternedStr::as_str);
        write!(
            f,
            "Read error at {}:{}:{}: {}",
            file, self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ReadError {}

impl From<LexerError> for ReadError {
    fn from(e: LexerError) -> Self {
        ReadError {
            message: e.message,
            line: e.line,
            column: e.column,
            file: None,
        }
    }
}

/// The reader consumes characters and produces values.
pub struct Reader<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// Start position of the current token.
    line: u32,
    column: u32,
    filename: Option<InternedStr>,
    features: HashSet<Keyword>,
    current_ns: String,
    gensym_counter: u32,
}

impl<'a> Reader<'a> {
    /// Create a reader over the given source. `filename` is recorded into
    /// the source positions of every composite form.
    pub fn new(source: &'a str, filename: Option<&str>) -> Result<Self, ReadError> {
        let filename = filename.map(intern);
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token().map_err(|e| {
            let mut err = ReadError::from(e);
            err.file = filename.clone();
            err
        })?;
        let line = lexer.token_line();
        let column = lexer.token_column();
        Ok(Reader {
            lexer,
            current,
            line,
            column,
            filename,
            features: HashSet::new(),
            current_ns: "user".to_string(),
            gensym_counter: 0,
        })
    }

    /// Set the feature set consulted by `#?` conditionals.
    #[must_use]
    pub fn with_features<I: IntoIterator<Item = Keyword>>(mut self, features: I) -> Self {
        self.features = features.into_iter().collect();
        self
    }

    /// Set the namespace used by `::keyword` resolution.
    pub fn set_current_ns(&mut self, ns: &str) {
        self.current_ns = ns.to_string();
    }

    /// Read one form. `Ok(None)` at end of input.
    pub fn read(&mut self) -> Result<Option<JesterVal>, ReadError> {
        self.read_next().map_err(|mut e| {
            if e.file.is_none() {
                e.file = self.filename.clone();
            }
            e
        })
    }

    fn read_next(&mut self) -> Result<Option<JesterVal>, ReadError> {
        loop {
            if self.current == Token::Eof {
                return Ok(None);
            }
            let mut out = Vec::with_capacity(1);
            self.read_into(&mut out)?;
            if let Some(form) = out.pop() {
                return Ok(Some(form));
            }
            // A discarded form or an unmatched reader conditional: keep
            // going.
        }
    }

    /// Read every remaining form.
    pub fn read_all(&mut self) -> Result<Vec<JesterVal>, ReadError> {
        let mut forms = Vec::new();
        while let Some(form) = self.read()? {
            forms.push(form);
        }
        Ok(forms)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn advance(&mut self) -> Result<Token, ReadError> {
        let prev = std::mem::replace(&mut self.current, Token::Eof);
        self.current = self.lexer.next_token()?;
        self.line = self.lexer.token_line();
        self.column = self.lexer.token_column();
        Ok(prev)
    }

    fn error(&self, message: impl Into<String>) -> ReadError {
        ReadError {
            message: message.into(),
            line: self.line,
            column: self.column,
            file: self.filename.clone(),
        }
    }

    fn info_from(&self, start_line: u32, start_column: u32) -> SourceInfo {
        SourceInfo {
            file: self.filename.clone(),
            start_line,
            start_column,
            end_line: self.lexer.line(),
            end_column: self.lexer.column(),
        }
    }

    /// Read exactly one form; error at end of input.
    fn read_one(&mut self) -> Result<JesterVal, ReadError> {
        let mut out = Vec::with_capacity(1);
        while out.is_empty() {
            if self.current == Token::Eof {
                return Err(self.error("Unexpected end of input"));
            }
            self.read_into(&mut out)?;
        }
        Ok(out.pop().expect("one form read"))
    }

    /// Read one source form into `out`: zero values for a discard or an
    /// unmatched conditional, several for a splicing conditional.
    fn read_into(&mut self, out: &mut Vec<JesterVal>) -> Result<(), ReadError> {
        match &self.current {
            Token::Discard => {
                self.advance()?;
                let _ = self.read_one()?;
                Ok(())
            }
            Token::ReaderCond => {
                self.advance()?;
                if let Some(form) = self.read_cond()? {
                    out.push(form);
                }
                Ok(())
            }
            Token::ReaderCondSplicing => {
                self.advance()?;
                if let Some(form) = self.read_cond()? {
                    match crate::seq::try_realized_elements(&form) {
                        Some(items) => out.extend(items),
                        None => {
                            return Err(
                                self.error("Splicing reader conditional needs a sequential form")
                            );
                        }
                    }
                }
                Ok(())
            }
            _ => {
                let form = self.read_form()?;
                out.push(form);
                Ok(())
            }
        }
    }

    fn read_form(&mut self) -> Result<JesterVal, ReadError> {
        let (start_line, start_column) = (self.line, self.column);
        match self.advance()? {
            Token::Nil => Ok(JesterVal::Nil),
            Token::True => Ok(JesterVal::Bool(true)),
            Token::False => Ok(JesterVal::Bool(false)),
            Token::Int(i) => Ok(JesterVal::Int(i)),
            Token::Float(f) => Ok(JesterVal::Double(f)),
            Token::BigInt(b) => Ok(JesterVal::bigint(b)),
            Token::BigFloat(b) => Ok(JesterVal::bigfloat(b)),
            Token::Ratio(n, d) => crate::num::make_ratio(n, d)
                .map_err(|_| self.error("Ratio with zero denominator")),
            Token::Char(c) => Ok(JesterVal::Char(c)),
            Token::String(s) => Ok(JesterVal::string(s)),
            Token::Keyword(name) => Ok(JesterVal::Keyword(Keyword::parse(&name))),
            Token::AutoKeyword(name) => Ok(JesterVal::Keyword(Keyword::with_namespace(
                &self.current_ns,
                &name,
            ))),
            Token::Symbol(name) => {
                let info = self.info_from(start_line, start_column);
                Ok(JesterVal::Symbol(Symbol::parse(&name), None).with_info(info))
            }
            Token::Regex(pattern) => JesterVal::try_regex(&pattern)
                .ok_or_else(|| self.error(format!("Invalid regex pattern: {}", pattern))),
            Token::LParen => {
                let items = self.read_forms_until(&Token::RParen, "list")?;
                let info = self.info_from(start_line, start_column);
                Ok(JesterVal::List(List::from_vec(items)).with_info(info))
            }
            Token::LBracket => {
                let items = self.read_forms_until(&Token::RBracket, "vector")?;
                let info = self.info_from(start_line, start_column);
                Ok(JesterVal::vector(items).with_info(info))
            }
            Token::LBrace => {
                let items = self.read_forms_until(&Token::RBrace, "map")?;
                if items.len() % 2 != 0 {
                    return Err(self.error("Map literal must contain an even number of forms"));
                }
                let info = self.info_from(start_line, start_column);
                Ok(map_from_flat(items).with_info(info))
            }
            Token::SetOpen => {
                let items = self.read_forms_until(&Token::RBrace, "set")?;
                let info = self.info_from(start_line, start_column);
                Ok(JesterVal::Set(PersistentSet::from_vec(items)).with_info(info))
            }
            Token::Quote => self.wrap_next("quote"),
            Token::Deref => self.wrap_next("deref"),
            Token::VarQuote => self.wrap_next("var"),
            Token::Unquote => self.wrap_next("unquote"),
            Token::UnquoteSplice => self.wrap_next("unquote-splicing"),
            Token::Meta => {
                let meta_form = self.read_one()?;
                let meta_map = meta_shorthand(meta_form)
                    .ok_or_else(|| self.error("Metadata must be a map, keyword, symbol or string"))?;
                let target = self.read_one()?;
                target
                    .with_meta(meta_map)
                    .ok_or_else(|| self.error("Target does not support metadata"))
            }
            Token::SyntaxQuote => {
                let template = self.read_one()?;
                let mut gensyms = HashMap::new();
                self.syntax_quote(&template, &mut gensyms)
            }
            Token::AnonFn => {
                let items = self.read_forms_until(&Token::RParen, "fn literal")?;
                self.expand_anon_fn(items)
            }
            Token::RParen | Token::RBracket | Token::RBrace => {
                Err(self.error("Unmatched delimiter"))
            }
            Token::Eof => Err(self.error("Unexpected end of input")),
            // Dispatch tokens are consumed by read_into before read_form.
            Token::Discard | Token::ReaderCond | Token::ReaderCondSplicing => {
                Err(self.error("Unexpected reader dispatch"))
            }
        }
    }

    fn read_forms_until(
        &mut self,
        closing: &Token,
        what: &str,
    ) -> Result<Vec<JesterVal>, ReadError> {
        let mut out = Vec::new();
        loop {
            if self.current == Token::Eof {
                return Err(self.error(format!("Unterminated {}", what)));
            }
            if self.current == *closing {
                self.advance()?;
                return Ok(out);
            }
            self.read_into(&mut out)?;
        }
    }

    /// Wrap the next form as `(sym <form>)`.
    fn wrap_next(&mut self, sym: &str) -> Result<JesterVal, ReadError> {
        let form = self.read_one()?;
        Ok(JesterVal::list(vec![JesterVal::symbol(sym), form]))
    }

    fn next_gensym(&mut self, prefix: &str) -> Symbol {
        self.gensym_counter += 1;
        Symbol::new(&format!("{}__{}__auto", prefix, self.gensym_counter))
    }

    // -----------------------------------------------------------------------
    // Reader conditionals
    // -----------------------------------------------------------------------

    fn read_cond(&mut self) -> Result<Option<JesterVal>, ReadError> {
        if self.current != Token::LParen {
            return Err(self.error("Reader conditional body must be a list"));
        }
        self.advance()?;
        let forms = self.read_forms_until(&Token::RParen, "reader conditional")?;
        if forms.len() % 2 != 0 {
            return Err(self.error("Reader conditional requires an even number of forms"));
        }
        let default = Keyword::new("default");
        let mut chosen = None;
        let mut it = forms.into_iter();
        while let (Some(feature), Some(form)) = (it.next(), it.next()) {
            let JesterVal::Keyword(kw) = feature else {
                return Err(self.error("Reader conditional features must be keywords"));
            };
            if chosen.is_none() && (kw == default || self.features.contains(&kw)) {
                chosen = Some(form);
            }
        }
        Ok(chosen)
    }

    // -----------------------------------------------------------------------
    // Syntax quote
    // -----------------------------------------------------------------------

    /// Expand a syntax-quote template into code that rebuilds the template
    /// with unquoted parts inserted: lists become
    /// `(seq (concat part ...))`, vectors `(vec ...)`, and so on. Symbols
    /// ending in `#` get one gensym per template.
    fn syntax_quote(
        &mut self,
        form: &JesterVal,
        gensyms: &mut HashMap<String, Symbol>,
    ) -> Result<JesterVal, ReadError> {
        if let Some(arg) = call_arg(form, "unquote") {
            return Ok(arg);
        }
        if call_arg(form, "unquote-splicing").is_some() {
            return Err(self.error("unquote-splicing outside of a sequence"));
        }
        match form {
            JesterVal::Symbol(sym, _) => {
                let sym = if !sym.has_namespace() && sym.name().ends_with('#') {
                    let base = sym.name().trim_end_matches('#').to_string();
                    gensyms
                        .entry(sym.name().to_string())
                        .or_insert_with(|| {
                            self.gensym_counter += 1;
                            Symbol::new(&format!("{}__{}__auto", base, self.gensym_counter))
                        })
                        .clone()
                } else {
                    sym.clone()
                };
                Ok(JesterVal::list(vec![
                    JesterVal::symbol("quote"),
                    JesterVal::Symbol(sym, None),
                ]))
            }
            JesterVal::List(l) => {
                if l.is_empty() {
                    return Ok(JesterVal::list(vec![
                        JesterVal::symbol("quote"),
                        JesterVal::List(List::new()),
                    ]));
                }
                let items: Vec<JesterVal> = l.iter().cloned().collect();
                let concat = self.syntax_quote_parts(&items, gensyms)?;
                Ok(JesterVal::list(vec![JesterVal::symbol("seq"), concat]))
            }
            JesterVal::Vector(v) => {
                let items: Vec<JesterVal> = v.iter().cloned().collect();
                let concat = self.syntax_quote_parts(&items, gensyms)?;
                Ok(JesterVal::list(vec![
                    JesterVal::symbol("vec"),
                    JesterVal::list(vec![JesterVal::symbol("seq"), concat]),
                ]))
            }
            JesterVal::ArrayMap(_) | JesterVal::HashMap(_) => {
                let mut flat = Vec::new();
                if let Some(entries) = crate::value::map_entries(form) {
                    for (k, v) in entries {
                        flat.push(k);
                        flat.push(v);
                    }
                }
                let concat = self.syntax_quote_parts(&flat, gensyms)?;
                Ok(JesterVal::list(vec![
                    JesterVal::symbol("apply"),
                    JesterVal::symbol("array-map"),
                    JesterVal::list(vec![JesterVal::symbol("seq"), concat]),
                ]))
            }
            JesterVal::Set(s) => {
                let concat = self.syntax_quote_parts(&s.elements(), gensyms)?;
                Ok(JesterVal::list(vec![
                    JesterVal::symbol("set"),
                    JesterVal::list(vec![JesterVal::symbol("seq"), concat]),
                ]))
            }
            other => Ok(other.clone()),
        }
    }

    fn syntax_quote_parts(
        &mut self,
        items: &[JesterVal],
        gensyms: &mut HashMap<String, Symbol>,
    ) -> Result<JesterVal, ReadError> {
        let mut parts = vec![JesterVal::symbol("concat")];
        for item in items {
            if let Some(spliced) = call_arg(item, "unquote-splicing") {
                parts.push(spliced);
            } else {
                let expanded = self.syntax_quote(item, gensyms)?;
                parts.push(JesterVal::list(vec![JesterVal::symbol("list"), expanded]));
            }
        }
        Ok(JesterVal::list(parts))
    }

    // -----------------------------------------------------------------------
    // Anonymous function literals
    // -----------------------------------------------------------------------

    /// Rewrite `#(...)` into `(fn* [p1 ...] (...))`, replacing `%`, `%N`
    /// and `%&` with generated parameters.
    fn expand_anon_fn(&mut self, body: Vec<JesterVal>) -> Result<JesterVal, ReadError> {
        let mut args = AnonArgs::default();
        let call = JesterVal::list(body);
        let replaced = self.replace_anon_args(&call, &mut args)?;

        let mut params = Vec::new();
        for i in 1..=args.max {
            params.push(JesterVal::Symbol(
                args.positional
                    .get(&i)
                    .cloned()
                    .unwrap_or_else(|| self.next_gensym(&format!("p{}", i))),
                None,
            ));
        }
        if let Some(rest) = args.rest {
            params.push(JesterVal::symbol("&"));
            params.push(JesterVal::Symbol(rest, None));
        }
        Ok(JesterVal::list(vec![
            JesterVal::symbol("fn*"),
            JesterVal::vector(params),
            replaced,
        ]))
    }

    fn replace_anon_args(
        &mut self,
        form: &JesterVal,
        args: &mut AnonArgs,
    ) -> Result<JesterVal, ReadError> {
        match form {
            JesterVal::Symbol(sym, _) if !sym.has_namespace() => {
                let name = sym.name();
                if name == "%" || name == "%1" {
                    args.max = args.max.max(1);
                    let sym = args
                        .positional
                        .entry(1)
                        .or_insert_with(|| {
                            self.gensym_counter += 1;
                            Symbol::new(&format!("p1__{}__auto", self.gensym_counter))
                        })
                        .clone();
                    Ok(JesterVal::Symbol(sym, None))
                } else if name == "%&" {
                    let sym = match &args.rest {
                        Some(sym) => sym.clone(),
                        None => {
                            let sym = self.next_gensym("rest");
                            args.rest = Some(sym.clone());
                            sym
                        }
                    };
                    Ok(JesterVal::Symbol(sym, None))
                } else if let Some(n) = name.strip_prefix('%').and_then(|n| n.parse::<usize>().ok())
                {
                    if n == 0 || n > 20 {
                        return Err(self.error(format!("Invalid parameter literal: {}", name)));
                    }
                    args.max = args.max.max(n);
                    let sym = args
                        .positional
                        .entry(n)
                        .or_insert_with(|| {
                            self.gensym_counter += 1;
                            Symbol::new(&format!("p{}__{}__auto", n, self.gensym_counter))
                        })
                        .clone();
                    Ok(JesterVal::Symbol(sym, None))
                } else {
                    Ok(form.clone())
                }
            }
            JesterVal::List(l) => {
                let mut items = Vec::with_capacity(l.count());
                for item in l.iter() {
                    items.push(self.replace_anon_args(item, args)?);
                }
                Ok(JesterVal::list(items))
            }
            JesterVal::Vector(v) => {
                let mut items = Vec::with_capacity(v.count());
                for item in v.iter() {
                    items.push(self.replace_anon_args(item, args)?);
                }
                Ok(JesterVal::vector(items))
            }
            JesterVal::ArrayMap(_) | JesterVal::HashMap(_) => {
                let mut flat = Vec::new();
                if let Some(entries) = crate::value::map_entries(form) {
                    for (k, v) in entries {
                        flat.push(self.replace_anon_args(&k, args)?);
                        flat.push(self.replace_anon_args(&v, args)?);
                    }
                }
                Ok(map_from_flat(flat))
            }
            JesterVal::Set(s) => {
                let mut items = Vec::new();
                for item in s.elements() {
                    items.push(self.replace_anon_args(&item, args)?);
                }
                Ok(JesterVal::Set(PersistentSet::from_vec(items)))
            }
            other => Ok(other.clone()),
        }
    }
}

#[derive(Default)]
struct AnonArgs {
    max: usize,
    rest: Option<Symbol>,
    positional: HashMap<usize, Symbol>,
}

/// Build a map literal: array map up to the threshold, hash map beyond it.
fn map_from_flat(flat: Vec<JesterVal>) -> JesterVal {
    if flat.len() / 2 > HASHMAP_THRESHOLD {
        let mut pairs = Vec::with_capacity(flat.len() / 2);
        let mut it = flat.into_iter();
        while let (Some(k), Some(v)) = (it.next(), it.next()) {
            pairs.push((k, v));
        }
        JesterVal::HashMap(PersistentHashMap::from_entries(pairs))
    } else {
        JesterVal::ArrayMap(ArrayMap::from_flat(flat))
    }
}

/// `^:kw`, `^sym`, `^"str"` metadata shorthand to a metadata map.
fn meta_shorthand(form: JesterVal) -> Option<JesterVal> {
    match &form {
        JesterVal::ArrayMap(_) | JesterVal::HashMap(_) => Some(form),
        JesterVal::Keyword(_) => Some(JesterVal::ArrayMap(ArrayMap::from_flat(vec![
            form,
            JesterVal::Bool(true),
        ]))),
        JesterVal::Symbol(..) | JesterVal::String(_) => {
            Some(JesterVal::ArrayMap(ArrayMap::from_flat(vec![
                JesterVal::keyword("tag"),
                form,
            ])))
        }
        _ => None,
    }
}

/// If `form` is `(name x)` for an unqualified symbol `name`, the argument.
fn call_arg(form: &JesterVal, name: &str) -> Option<JesterVal> {
    let JesterVal::List(l) = form else {
        return None;
    };
    let JesterVal::Symbol(sym, _) = l.first()? else {
        return None;
    };
    if sym.has_namespace() || sym.name() != name || l.count() != 2 {
        return None;
    }
    l.rest().first().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_one_str(source: &str) -> JesterVal {
        let mut reader = Reader::new(source, Some("test.clj")).expect("reader builds");
        reader.read().expect("reads cleanly").expect("one form")
    }

    fn read_all_str(source: &str) -> Vec<JesterVal> {
        let mut reader = Reader::new(source, None).expect("reader builds");
        reader.read_all().expect("reads cleanly")
    }

    #[test]
    fn test_read_literals() {
        assert_eq!(read_one_str("42"), JesterVal::Int(42));
        assert_eq!(read_one_str("nil"), JesterVal::Nil);
        assert_eq!(read_one_str("true"), JesterVal::Bool(true));
        assert_eq!(read_one_str("\"hi\""), JesterVal::string("hi"));
        assert_eq!(read_one_str(":k"), JesterVal::keyword("k"));
        assert_eq!(read_one_str("1/2"), JesterVal::ratio(1, 2));
    }

    #[test]
    fn test_read_collections() {
        assert_eq!(
            read_one_str("(1 2 3)"),
            JesterVal::list(vec![JesterVal::Int(1), JesterVal::Int(2), JesterVal::Int(3)])
        );
        assert_eq!(
            read_one_str("[1 2]"),
            JesterVal::vector(vec![JesterVal::Int(1), JesterVal::Int(2)])
        );
        let m = read_one_str("{:a 1}");
        assert_eq!(
            crate::value::map_get(&m, &JesterVal::keyword("a")),
            Some(JesterVal::Int(1))
        );
        let s = read_one_str("#{1 2}");
        assert!(matches!(&s, JesterVal::Set(set) if set.count() == 2));
    }

    #[test]
    fn test_positions_recorded() {
        let form = read_one_str("\n  (+ 1 2)");
        let info = form.get_info().expect("list carries a position");
        assert_eq!(info.start_line, 2);
        assert_eq!(info.start_column, 3);
        assert_eq!(info.filename(), "test.clj");
    }

    #[test]
    fn test_quote_and_var() {
        assert_eq!(
            read_one_str("'x"),
            JesterVal::list(vec![JesterVal::symbol("quote"), JesterVal::symbol("x")])
        );
        assert_eq!(
            read_one_str("#'x"),
            JesterVal::list(vec![JesterVal::symbol("var"), JesterVal::symbol("x")])
        );
        assert_eq!(
            read_one_str("@x"),
            JesterVal::list(vec![JesterVal::symbol("deref"), JesterVal::symbol("x")])
        );
    }

    #[test]
    fn test_discard() {
        assert_eq!(read_all_str("#_1 2"), vec![JesterVal::Int(2)]);
        assert_eq!(
            read_all_str("(1 #_2 3)"),
            vec![JesterVal::list(vec![JesterVal::Int(1), JesterVal::Int(3)])]
        );
    }

    #[test]
    fn test_metadata_shorthand() {
        let form = read_one_str("^:private x");
        let meta = form.get_meta().expect("symbol carries metadata");
        assert_eq!(
            crate::value::map_get(&meta, &JesterVal::keyword("private")),
            Some(JesterVal::Bool(true))
        );
    }

    #[test]
    fn test_reader_conditional() {
        let mut reader = Reader::new("#?(:cljs 1 :clj 2)", None).unwrap();
        let reader_features = vec![Keyword::new("clj")];
        reader = reader.with_features(reader_features);
        assert_eq!(reader.read().unwrap(), Some(JesterVal::Int(2)));

        // No matching feature: the whole form vanishes.
        let mut reader = Reader::new("#?(:cljs 1) 9", None).unwrap();
        assert_eq!(reader.read().unwrap(), Some(JesterVal::Int(9)));
    }

    #[test]
    fn test_reader_conditional_splicing() {
        let mut reader = Reader::new("[1 #?@(:clj [2 3]) 4]", None).unwrap();
        reader = reader.with_features(vec![Keyword::new("clj")]);
        assert_eq!(
            reader.read().unwrap().unwrap(),
            JesterVal::vector(vec![
                JesterVal::Int(1),
                JesterVal::Int(2),
                JesterVal::Int(3),
                JesterVal::Int(4)
            ])
        );
    }

    #[test]
    fn test_syntax_quote_plain_symbol() {
        assert_eq!(
            read_one_str("`x"),
            JesterVal::list(vec![JesterVal::symbol("quote"), JesterVal::symbol("x")])
        );
    }

    #[test]
    fn test_syntax_quote_unquote() {
        // `(a ~b) → (seq (concat (list 'a) (list b)))
        let form = read_one_str("`(a ~b)");
        let rendered = form.to_readable_string();
        assert!(rendered.starts_with("(seq (concat"), "got {}", rendered);
        assert!(rendered.contains("(quote a)"));
        assert!(rendered.contains("(list b)"));
    }

    #[test]
    fn test_syntax_quote_auto_gensym() {
        let form = read_one_str("`(x# x#)");
        let rendered = form.to_readable_string();
        // Both occurrences share one generated name.
        let first = rendered
            .split("x__")
            .nth(1)
            .and_then(|s| s.split("__auto").next())
            .expect("gensym present");
        assert_eq!(rendered.matches(&format!("x__{}__auto", first)).count(), 2);
    }

    #[test]
    fn test_anon_fn_literal() {
        let form = read_one_str("#(+ % %2)");
        let rendered = form.to_readable_string();
        assert!(rendered.starts_with("(fn* ["), "got {}", rendered);
        assert!(rendered.contains("(+ p1__"), "got {}", rendered);
    }

    #[test]
    fn test_errors_have_positions() {
        let mut reader = Reader::new("(1 2", None).unwrap();
        let err = reader.read().unwrap_err();
        assert!(err.message.contains("Unterminated"));
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_eof_vs_error() {
        let mut reader = Reader::new("  ; just a comment\n", None).unwrap();
        assert!(reader.read().unwrap().is_none());
    }

    #[test]
    fn test_map_literal_promotes() {
        let source: String = (0..20)
            .map(|i| format!(":k{} {} ", i, i))
            .collect::<String>();
        let form = read_one_str(&format!("{{{}}}", source));
        assert!(matches!(form, JesterVal::HashMap(_)));
    }
}
