// jester-core - Analyzer
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The analyzer: rewrites a value tree from the reader into an `Expr` tree
//! that labels every construct and resolves every symbol.
//!
//! Unqualified symbols resolve to either a local slot (a `(depth, index)`
//! pair into the frame chain) or a namespace var. Macro calls expand
//! eagerly: the macro's function is applied to the unevaluated argument
//! forms and the result is re-analyzed. `recur` is verified to sit in tail
//! position of its enclosing `loop` or `fn`, with a matching argument
//! count. In linter mode, resolution failures and unused bindings become
//! warnings instead of errors.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use jester_reader::{
    map_entries, map_get, type_by_name, JesterVal, SourceInfo, Symbol, Type,
};

use crate::error::{Error, Result};
use crate::eval;
use crate::runtime::with_runtime;

const MAX_MACRO_DEPTH: usize = 200;

/// An analyzed expression. Every node carries the source position of the
/// form it came from.
#[derive(Debug)]
pub enum Expr {
    Literal {
        info: Option<SourceInfo>,
        value: JesterVal,
    },
    VectorLit {
        info: Option<SourceInfo>,
        items: Vec<Expr>,
    },
    MapLit {
        info: Option<SourceInfo>,
        pairs: Vec<(Expr, Expr)>,
    },
    SetLit {
        info: Option<SourceInfo>,
        items: Vec<Expr>,
    },
    If {
        info: Option<SourceInfo>,
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Do {
        info: Option<SourceInfo>,
        body: Vec<Expr>,
    },
    Def {
        info: Option<SourceInfo>,
        var: jester_reader::JesterVar,
        name: Symbol,
        value: Option<Box<Expr>>,
        meta: Option<JesterVal>,
        is_macro: bool,
    },
    /// A resolved var in value position: dereferences.
    VarRef {
        info: Option<SourceInfo>,
        var: jester_reader::JesterVar,
    },
    /// `(var x)`: the var object itself.
    VarQuote {
        info: Option<SourceInfo>,
        var: jester_reader::JesterVar,
    },
    /// A local slot.
    BindingRef {
        info: Option<SourceInfo>,
        depth: usize,
        index: usize,
        name: Symbol,
    },
    Let {
        info: Option<SourceInfo>,
        names: Vec<Symbol>,
        inits: Vec<Expr>,
        body: Vec<Expr>,
    },
    Loop {
        info: Option<SourceInfo>,
        names: Vec<Symbol>,
        inits: Vec<Expr>,
        body: Vec<Expr>,
    },
    Recur {
        info: Option<SourceInfo>,
        args: Vec<Expr>,
    },
    Fn {
        info: Option<SourceInfo>,
        fn_expr: Rc<FnExpr>,
    },
    Call {
        info: Option<SourceInfo>,
        target: Box<Expr>,
        args: Vec<Expr>,
    },
    Throw {
        info: Option<SourceInfo>,
        value: Box<Expr>,
    },
    Try {
        info: Option<SourceInfo>,
        body: Vec<Expr>,
        catches: Vec<CatchClause>,
        finally: Option<Vec<Expr>>,
    },
    /// `(delay body...)`: a memoised thunk.
    Delay {
        info: Option<SourceInfo>,
        thunk: Rc<FnExpr>,
    },
    /// `(lazy-seq body...)`: a deferred sequence.
    LazySeq {
        info: Option<SourceInfo>,
        thunk: Rc<FnExpr>,
    },
    /// Evaluated metadata applied to an evaluated target.
    Meta {
        info: Option<SourceInfo>,
        meta: Box<Expr>,
        target: Box<Expr>,
    },
    /// `(ns name)`: switch the current namespace.
    Ns {
        info: Option<SourceInfo>,
        name: Symbol,
    },
}

/// A function expression: ordered fixed arities plus an optional variadic
/// arity with a rest binding.
#[derive(Debug)]
pub struct FnExpr {
    pub name: Option<Symbol>,
    pub arities: Vec<FnArity>,
    pub variadic: Option<FnArity>,
}

#[derive(Debug)]
pub struct FnArity {
    pub params: Vec<Symbol>,
    pub rest: Option<Symbol>,
    pub body: Vec<Expr>,
}

impl FnArity {
    /// Frame slot count: fixed params plus the rest slot.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.params.len() + usize::from(self.rest.is_some())
    }
}

/// One catch clause: a type tag, the binding for the thrown value, and a
/// body.
#[derive(Debug)]
pub struct CatchClause {
    pub tag: &'static Type,
    pub binding: Symbol,
    pub body: Vec<Expr>,
}

impl Expr {
    /// This node's source position.
    #[must_use]
    pub fn info(&self) -> Option<&SourceInfo> {
        match self {
            Expr::Literal { info, .. }
            | Expr::VectorLit { info, .. }
            | Expr::MapLit { info, .. }
            | Expr::SetLit { info, .. }
            | Expr::If { info, .. }
            | Expr::Do { info, .. }
            | Expr::Def { info, .. }
            | Expr::VarRef { info, .. }
            | Expr::VarQuote { info, .. }
            | Expr::BindingRef { info, .. }
            | Expr::Let { info, .. }
            | Expr::Loop { info, .. }
            | Expr::Recur { info, .. }
            | Expr::Fn { info, .. }
            | Expr::Call { info, .. }
            | Expr::Throw { info, .. }
            | Expr::Try { info, .. }
            | Expr::Delay { info, .. }
            | Expr::LazySeq { info, .. }
            | Expr::Meta { info, .. }
            | Expr::Ns { info, .. } => info.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis context
// ---------------------------------------------------------------------------

struct Binding {
    name: Symbol,
    info: Option<SourceInfo>,
    used: Cell<bool>,
    /// `_`-prefixed names and function self-names are exempt from the
    /// unused-binding analysis.
    exempt: bool,
}

struct Scope {
    bindings: Vec<Binding>,
}

/// Lexical analysis state threaded through one top-level form.
#[derive(Default)]
pub struct ParseContext {
    scopes: Vec<Scope>,
    /// Slot counts of enclosing `loop`/`fn` recur targets.
    recur_targets: Vec<usize>,
    macro_depth: usize,
}

impl ParseContext {
    #[must_use]
    pub fn new() -> Self {
        ParseContext::default()
    }

    fn push_scope(&mut self) {
        self.scopes.push(Scope {
            bindings: Vec::new(),
        });
    }

    fn add_binding(&mut self, name: Symbol, info: Option<SourceInfo>, exempt: bool) -> usize {
        let scope = self.scopes.last_mut().expect("a scope is open");
        scope.bindings.push(Binding {
            name,
            info,
            used: Cell::new(false),
            exempt,
        });
        scope.bindings.len() - 1
    }

    /// Close the innermost scope, reporting unused bindings in linter
    /// mode.
    fn pop_scope(&mut self) {
        let scope = self.scopes.pop().expect("a scope is open");
        with_runtime(|rt| {
            if !rt.linter_mode() {
                return;
            }
            for binding in &scope.bindings {
                if !binding.used.get() && !binding.exempt && !binding.name.name().starts_with('_')
                {
                    rt.add_warning(
                        format!("unused binding: {}", binding.name),
                        binding.info.clone(),
                    );
                }
            }
        });
    }

    /// Find a local binding, innermost scope first; marks it used.
    fn resolve_local(&self, sym: &Symbol) -> Option<(usize, usize)> {
        for (rev_depth, scope) in self.scopes.iter().rev().enumerate() {
            // Later bindings shadow earlier ones within a scope.
            if let Some(index) = scope
                .bindings
                .iter()
                .rposition(|b| b.name == *sym)
            {
                scope.bindings[index].used.set(true);
                return Some((rev_depth, index));
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Analyze one top-level form.
pub fn parse(form: &JesterVal, ctx: &mut ParseContext) -> Result<Expr> {
    parse_expr(form, ctx, false)
}

fn parse_expr(form: &JesterVal, ctx: &mut ParseContext, tail: bool) -> Result<Expr> {
    let info = form.get_info();
    match form {
        JesterVal::Symbol(sym, _) => parse_symbol(sym, info, ctx),
        JesterVal::List(l) => {
            if l.is_empty() {
                return Ok(Expr::Literal {
                    info,
                    value: form.clone(),
                });
            }
            let items: Vec<JesterVal> = l.iter().cloned().collect();
            parse_list(&items, info, ctx, tail)
        }
        // Macro expansion yields cons/concat results; a realised sequence
        // in call position analyzes like a list.
        JesterVal::Seq(_) => {
            let items = eval::seq_elements(form)?;
            if items.is_empty() {
                return Ok(Expr::Literal {
                    info,
                    value: JesterVal::List(jester_reader::List::new()),
                });
            }
            parse_list(&items, info, ctx, tail)
        }
        JesterVal::Vector(v) => {
            let items = v
                .iter()
                .map(|item| parse_expr(item, ctx, false))
                .collect::<Result<Vec<_>>>()?;
            wrap_meta(form, Expr::VectorLit { info, items }, ctx)
        }
        JesterVal::ArrayMap(_) | JesterVal::HashMap(_) => {
            let entries = map_entries(form).unwrap_or_default();
            let mut pairs = Vec::with_capacity(entries.len());
            for (k, v) in entries {
                pairs.push((parse_expr(&k, ctx, false)?, parse_expr(&v, ctx, false)?));
            }
            wrap_meta(form, Expr::MapLit { info, pairs }, ctx)
        }
        JesterVal::Set(s) => {
            let items = s
                .elements()
                .iter()
                .map(|item| parse_expr(item, ctx, false))
                .collect::<Result<Vec<_>>>()?;
            wrap_meta(form, Expr::SetLit { info, items }, ctx)
        }
        other => Ok(Expr::Literal {
            info,
            value: other.clone(),
        }),
    }
}

/// Collection literals with reader metadata evaluate the metadata map and
/// attach it to the built collection.
fn wrap_meta(form: &JesterVal, target: Expr, ctx: &mut ParseContext) -> Result<Expr> {
    match form.get_meta() {
        Some(meta) => {
            let info = form.get_info();
            let meta_expr = parse_expr(&meta, ctx, false)?;
            Ok(Expr::Meta {
                info,
                meta: Box::new(meta_expr),
                target: Box::new(target),
            })
        }
        None => Ok(target),
    }
}

fn parse_symbol(sym: &Symbol, info: Option<SourceInfo>, ctx: &mut ParseContext) -> Result<Expr> {
    if !sym.has_namespace() {
        if let Some((depth, index)) = ctx.resolve_local(sym) {
            return Ok(Expr::BindingRef {
                info,
                depth,
                index,
                name: sym.clone(),
            });
        }
    }
    match with_runtime(|rt| rt.registry().resolve(sym)) {
        Some(var) => Ok(Expr::VarRef { info, var }),
        None => with_runtime(|rt| {
            if rt.linter_mode() {
                rt.add_warning(format!("unable to resolve symbol: {}", sym), info.clone());
                Ok(Expr::Literal {
                    info,
                    value: JesterVal::Nil,
                })
            } else {
                Err(Error::undefined_symbol(sym, info))
            }
        }),
    }
}

fn head_symbol(form: &JesterVal) -> Option<&Symbol> {
    match form {
        JesterVal::Symbol(sym, _) => Some(sym),
        _ => None,
    }
}

fn parse_list(
    items: &[JesterVal],
    info: Option<SourceInfo>,
    ctx: &mut ParseContext,
    tail: bool,
) -> Result<Expr> {
    if let Some(sym) = head_symbol(&items[0]) {
        if !sym.has_namespace() {
            match sym.name() {
                "quote" => {
                    let value = items
                        .get(1)
                        .cloned()
                        .unwrap_or(JesterVal::Nil);
                    return Ok(Expr::Literal { info, value });
                }
                "if" => return parse_if(&items[1..], info, ctx, tail),
                "do" => {
                    let body = parse_body(&items[1..], ctx, tail)?;
                    return Ok(Expr::Do { info, body });
                }
                "def" => return parse_def(&items[1..], info, ctx, false),
                "defmacro" => return parse_defmacro(&items[1..], info, ctx),
                "let" | "let*" => return parse_let_like(&items[1..], info, ctx, tail, false),
                "loop" | "loop*" => return parse_let_like(&items[1..], info, ctx, tail, true),
                "recur" => return parse_recur(&items[1..], info, ctx, tail),
                "fn" | "fn*" => {
                    let fn_expr = parse_fn(&items[1..], info.clone(), ctx)?;
                    return Ok(Expr::Fn {
                        info,
                        fn_expr: Rc::new(fn_expr),
                    });
                }
                "throw" => {
                    if items.len() != 2 {
                        return Err(Error::syntax("throw", "expects one form", info));
                    }
                    let value = parse_expr(&items[1], ctx, false)?;
                    return Ok(Expr::Throw {
                        info,
                        value: Box::new(value),
                    });
                }
                "try" => return parse_try(&items[1..], info, ctx),
                "var" => return parse_var_quote(&items[1..], info, ctx),
                "delay" => {
                    let thunk = parse_thunk(&items[1..], ctx)?;
                    return Ok(Expr::Delay {
                        info,
                        thunk: Rc::new(thunk),
                    });
                }
                "lazy-seq" => {
                    let thunk = parse_thunk(&items[1..], ctx)?;
                    return Ok(Expr::LazySeq {
                        info,
                        thunk: Rc::new(thunk),
                    });
                }
                "ns" => return parse_ns(&items[1..], info),
                "catch" | "finally" => {
                    return Err(Error::syntax(
                        sym.name(),
                        "only allowed directly inside try",
                        info,
                    ));
                }
                _ => {}
            }
        }
        // Macro call: expand eagerly and re-analyze.
        let shadowed = !sym.has_namespace() && ctx.resolve_local_quiet(sym);
        if !shadowed {
            if let Some(var) = with_runtime(|rt| rt.registry().resolve(sym)) {
                if var.is_macro() {
                    if ctx.macro_depth >= MAX_MACRO_DEPTH {
                        return Err(Error::syntax(
                            sym.name(),
                            "macro expansion too deep",
                            info,
                        ));
                    }
                    let Some(macro_fn) = var.deref() else {
                        return Err(Error::syntax(sym.name(), "macro var is unbound", info));
                    };
                    let expanded = eval::apply(&macro_fn, items[1..].to_vec())?;
                    ctx.macro_depth += 1;
                    let result = parse_expr(&expanded, ctx, tail);
                    ctx.macro_depth -= 1;
                    return result;
                }
            }
        }
    }
    // Ordinary call.
    let target = parse_expr(&items[0], ctx, false)?;
    let args = items[1..]
        .iter()
        .map(|arg| parse_expr(arg, ctx, false))
        .collect::<Result<Vec<_>>>()?;
    Ok(Expr::Call {
        info,
        target: Box::new(target),
        args,
    })
}

impl ParseContext {
    /// Like `resolve_local` without marking the binding used: macro-call
    /// detection must not count as a use.
    fn resolve_local_quiet(&self, sym: &Symbol) -> bool {
        self.scopes
            .iter()
            .any(|scope| scope.bindings.iter().any(|b| b.name == *sym))
    }
}

fn parse_body(forms: &[JesterVal], ctx: &mut ParseContext, tail: bool) -> Result<Vec<Expr>> {
    let mut body = Vec::with_capacity(forms.len());
    for (i, form) in forms.iter().enumerate() {
        let is_last = i + 1 == forms.len();
        body.push(parse_expr(form, ctx, tail && is_last)?);
    }
    Ok(body)
}

fn parse_if(
    args: &[JesterVal],
    info: Option<SourceInfo>,
    ctx: &mut ParseContext,
    tail: bool,
) -> Result<Expr> {
    if args.len() < 2 || args.len() > 3 {
        return Err(Error::syntax(
            "if",
            format!("expects 2 or 3 forms, got {}", args.len()),
            info,
        ));
    }
    let cond = parse_expr(&args[0], ctx, false)?;
    let then = parse_expr(&args[1], ctx, tail)?;
    let otherwise = match args.get(2) {
        Some(form) => parse_expr(form, ctx, tail)?,
        None => Expr::Literal {
            info: None,
            value: JesterVal::Nil,
        },
    };
    Ok(Expr::If {
        info,
        cond: Box::new(cond),
        then: Box::new(then),
        otherwise: Box::new(otherwise),
    })
}

fn parse_def(
    args: &[JesterVal],
    info: Option<SourceInfo>,
    ctx: &mut ParseContext,
    is_macro: bool,
) -> Result<Expr> {
    let Some(JesterVal::Symbol(name, _)) = args.first() else {
        return Err(Error::syntax("def", "first form must be a symbol", info));
    };
    if name.has_namespace() {
        return Err(Error::syntax(
            "def",
            "can't def a qualified symbol",
            info,
        ));
    }
    // (def x), (def x init), (def x "doc" init)
    let (doc, value_form) = match args.len() {
        1 => (None, None),
        2 => (None, Some(&args[1])),
        3 => match &args[1] {
            JesterVal::String(s) => (Some(s.clone()), Some(&args[2])),
            _ => {
                return Err(Error::syntax(
                    "def",
                    "with three forms, the second must be a doc string",
                    info,
                ));
            }
        },
        n => {
            return Err(Error::syntax(
                "def",
                format!("expects 1 to 3 forms, got {}", n),
                info,
            ));
        }
    };

    // Interning happens at analysis time so later forms in the same unit
    // resolve the name.
    let var = with_runtime(|rt| rt.current_ns().intern(name.name()));
    if is_macro {
        var.set_macro(true);
    }

    // Metadata from the name symbol: ^:private and friends.
    let mut meta = args[0].get_meta();
    if let Some(m) = &meta {
        if map_get(m, &JesterVal::keyword("private"))
            .map_or(false, |v| v.is_truthy())
        {
            var.set_private(true);
        }
    }
    if let Some(doc) = doc {
        let base = meta.take().unwrap_or(JesterVal::Nil);
        meta = jester_reader::map_assoc(
            &base,
            JesterVal::keyword("doc"),
            JesterVal::String(doc),
        );
    }

    let value = match value_form {
        Some(form) => Some(Box::new(parse_expr(form, ctx, false)?)),
        None => None,
    };
    Ok(Expr::Def {
        info,
        var,
        name: name.clone(),
        value,
        meta,
        is_macro,
    })
}

fn parse_defmacro(
    args: &[JesterVal],
    info: Option<SourceInfo>,
    ctx: &mut ParseContext,
) -> Result<Expr> {
    if args.len() < 2 {
        return Err(Error::syntax(
            "defmacro",
            "expects a name and at least a params vector",
            info,
        ));
    }
    // (defmacro name [params] body...) = (def name (fn name [params] ...))
    // with the macro flag raised at analysis time.
    let mut fn_form = vec![JesterVal::symbol("fn*")];
    fn_form.extend_from_slice(args);
    let def_args = vec![args[0].clone(), JesterVal::list(fn_form)];
    parse_def(&def_args, info, ctx, true)
}

fn binding_symbol(form: &JesterVal) -> Option<(Symbol, Option<SourceInfo>)> {
    match form {
        JesterVal::Symbol(sym, _) => Some((sym.clone(), form.get_info())),
        _ => None,
    }
}

fn parse_let_like(
    args: &[JesterVal],
    info: Option<SourceInfo>,
    ctx: &mut ParseContext,
    tail: bool,
    is_loop: bool,
) -> Result<Expr> {
    let form_name = if is_loop { "loop" } else { "let" };
    let Some(JesterVal::Vector(bindings)) = args.first() else {
        return Err(Error::syntax(
            form_name,
            "first form must be a binding vector",
            info,
        ));
    };
    if bindings.count() % 2 != 0 {
        return Err(Error::syntax(
            form_name,
            "binding vector needs an even number of forms",
            info,
        ));
    }

    ctx.push_scope();
    let mut names = Vec::with_capacity(bindings.count() / 2);
    let mut inits = Vec::with_capacity(bindings.count() / 2);
    let result = (|| {
        let mut i = 0;
        while i < bindings.count() {
            let name_form = bindings.nth(i).expect("index below count");
            let init_form = bindings.nth(i + 1).expect("index below count");
            let Some((name, name_info)) = binding_symbol(name_form) else {
                return Err(Error::syntax(
                    form_name,
                    "binding names must be symbols",
                    name_form.get_info().or_else(|| info.clone()),
                ));
            };
            // The init sees every earlier binding of this scope.
            inits.push(parse_expr(init_form, ctx, false)?);
            ctx.add_binding(name.clone(), name_info, false);
            names.push(name);
            i += 2;
        }
        if is_loop {
            ctx.recur_targets.push(names.len());
        }
        let body = parse_body(&args[1..], ctx, tail || is_loop);
        if is_loop {
            ctx.recur_targets.pop();
        }
        let body = body?;
        Ok(if is_loop {
            Expr::Loop {
                info: info.clone(),
                names: names.clone(),
                inits: std::mem::take(&mut inits),
                body,
            }
        } else {
            Expr::Let {
                info: info.clone(),
                names: names.clone(),
                inits: std::mem::take(&mut inits),
                body,
            }
        })
    })();
    ctx.pop_scope();
    result
}

fn parse_recur(
    args: &[JesterVal],
    info: Option<SourceInfo>,
    ctx: &mut ParseContext,
    tail: bool,
) -> Result<Expr> {
    if !tail {
        return Err(Error::syntax(
            "recur",
            "can only appear in tail position",
            info,
        ));
    }
    let Some(&expected) = ctx.recur_targets.last() else {
        return Err(Error::syntax(
            "recur",
            "can only be used inside loop or fn",
            info,
        ));
    };
    if args.len() != expected {
        return Err(Error::syntax(
            "recur",
            format!(
                "argument count mismatch: expected {}, got {}",
                expected,
                args.len()
            ),
            info,
        ));
    }
    let args = args
        .iter()
        .map(|arg| parse_expr(arg, ctx, false))
        .collect::<Result<Vec<_>>>()?;
    Ok(Expr::Recur { info, args })
}

fn parse_fn(
    args: &[JesterVal],
    info: Option<SourceInfo>,
    ctx: &mut ParseContext,
) -> Result<FnExpr> {
    let (name, rest) = match args.first() {
        Some(JesterVal::Symbol(sym, _)) => (Some(sym.clone()), &args[1..]),
        _ => (None, args),
    };
    if rest.is_empty() {
        return Err(Error::syntax("fn", "missing params and body", info));
    }

    // A named fn sees itself through one extra frame under the arity
    // frames; the closure constructor creates the matching frame.
    if let Some(name) = &name {
        ctx.push_scope();
        ctx.add_binding(name.clone(), None, true);
    }

    let result = (|| {
        let mut arities: Vec<FnArity> = Vec::new();
        let mut variadic: Option<FnArity> = None;

        let single = matches!(rest.first(), Some(JesterVal::Vector(_)));
        let clauses: Vec<Vec<JesterVal>> = if single {
            vec![rest.to_vec()]
        } else {
            rest.iter()
                .map(|clause| match clause {
                    JesterVal::List(l) => Ok(l.iter().cloned().collect()),
                    other => Err(Error::syntax(
                        "fn",
                        "each arity must be a list",
                        other.get_info().or_else(|| info.clone()),
                    )),
                })
                .collect::<Result<Vec<_>>>()?
        };

        for clause in clauses {
            let arity = parse_fn_arity(&clause, info.clone(), ctx)?;
            if arity.rest.is_some() {
                if variadic.is_some() {
                    return Err(Error::syntax(
                        "fn",
                        "can't have more than one variadic arity",
                        info,
                    ));
                }
                variadic = Some(arity);
            } else {
                if arities.iter().any(|a| a.params.len() == arity.params.len()) {
                    return Err(Error::syntax(
                        "fn",
                        format!("duplicate arity of {} params", arity.params.len()),
                        info,
                    ));
                }
                arities.push(arity);
            }
        }
        if let Some(v) = &variadic {
            if arities.iter().any(|a| a.params.len() >= v.params.len() + 1) {
                return Err(Error::syntax(
                    "fn",
                    "fixed arity overlaps the variadic arity",
                    info,
                ));
            }
        }
        arities.sort_by_key(|a| a.params.len());
        Ok(FnExpr {
            name: name.clone(),
            arities,
            variadic,
        })
    })();
    if name.is_some() {
        ctx.pop_scope();
    }
    result
}

fn parse_fn_arity(
    clause: &[JesterVal],
    info: Option<SourceInfo>,
    ctx: &mut ParseContext,
) -> Result<FnArity> {
    let Some(JesterVal::Vector(params_vec)) = clause.first() else {
        return Err(Error::syntax("fn", "params must be a vector", info));
    };
    let mut params = Vec::new();
    let mut param_infos = Vec::new();
    let mut rest = None;
    let mut rest_info = None;
    let mut saw_amp = false;
    for param in params_vec.iter() {
        let Some((sym, sym_info)) = binding_symbol(param) else {
            return Err(Error::syntax(
                "fn",
                "params must be symbols",
                param.get_info().or_else(|| info.clone()),
            ));
        };
        if sym.name() == "&" {
            if saw_amp {
                return Err(Error::syntax("fn", "only one & allowed in params", info));
            }
            saw_amp = true;
        } else if saw_amp {
            if rest.is_some() {
                return Err(Error::syntax(
                    "fn",
                    "only one binding allowed after &",
                    info,
                ));
            }
            rest = Some(sym);
            rest_info = sym_info;
        } else {
            params.push(sym);
            param_infos.push(sym_info);
        }
    }
    if saw_amp && rest.is_none() {
        return Err(Error::syntax("fn", "missing binding after &", info));
    }

    ctx.push_scope();
    for (p, p_info) in params.iter().zip(param_infos) {
        ctx.add_binding(p.clone(), p_info, false);
    }
    if let Some(r) = &rest {
        ctx.add_binding(r.clone(), rest_info, false);
    }
    let slots = params.len() + usize::from(rest.is_some());
    ctx.recur_targets.push(slots);
    let body = parse_body(&clause[1..], ctx, true);
    ctx.recur_targets.pop();
    let body_result = body;
    ctx.pop_scope();
    Ok(FnArity {
        params,
        rest,
        body: body_result?,
    })
}

fn parse_thunk(body: &[JesterVal], ctx: &mut ParseContext) -> Result<FnExpr> {
    ctx.push_scope();
    ctx.recur_targets.push(0);
    let parsed = parse_body(body, ctx, true);
    ctx.recur_targets.pop();
    ctx.pop_scope();
    Ok(FnExpr {
        name: None,
        arities: vec![FnArity {
            params: Vec::new(),
            rest: None,
            body: parsed?,
        }],
        variadic: None,
    })
}

fn parse_try(
    args: &[JesterVal],
    info: Option<SourceInfo>,
    ctx: &mut ParseContext,
) -> Result<Expr> {
    let mut body_forms = Vec::new();
    let mut catches = Vec::new();
    let mut finally = None;

    for form in args {
        let clause_head = match form {
            JesterVal::List(l) => l.first().and_then(head_symbol).map(|s| s.name().to_string()),
            _ => None,
        };
        match clause_head.as_deref() {
            Some("catch") => {
                if finally.is_some() {
                    return Err(Error::syntax("try", "catch after finally", info));
                }
                let JesterVal::List(l) = form else {
                    unreachable!("clause head implies a list");
                };
                let items: Vec<JesterVal> = l.iter().cloned().collect();
                catches.push(parse_catch(&items[1..], form.get_info(), ctx)?);
            }
            Some("finally") => {
                if finally.is_some() {
                    return Err(Error::syntax("try", "more than one finally", info));
                }
                let JesterVal::List(l) = form else {
                    unreachable!("clause head implies a list");
                };
                let items: Vec<JesterVal> = l.iter().cloned().collect();
                finally = Some(parse_body(&items[1..], ctx, false)?);
            }
            _ => {
                if !catches.is_empty() || finally.is_some() {
                    return Err(Error::syntax(
                        "try",
                        "body forms must come before catch and finally",
                        form.get_info().or_else(|| info.clone()),
                    ));
                }
                body_forms.push(form.clone());
            }
        }
    }

    // The try body is never a tail position: finally must run after it.
    let body = parse_body(&body_forms, ctx, false)?;
    Ok(Expr::Try {
        info,
        body,
        catches,
        finally,
    })
}

fn parse_catch(
    args: &[JesterVal],
    info: Option<SourceInfo>,
    ctx: &mut ParseContext,
) -> Result<CatchClause> {
    let Some(JesterVal::Symbol(type_sym, _)) = args.first() else {
        return Err(Error::syntax("catch", "first form must be a type name", info));
    };
    let Some(tag) = type_by_name(type_sym.name()) else {
        return Err(Error::syntax(
            "catch",
            format!("unknown type: {}", type_sym),
            info,
        ));
    };
    let Some((binding, binding_info)) = args.get(1).and_then(binding_symbol) else {
        return Err(Error::syntax(
            "catch",
            "second form must be a binding symbol",
            info,
        ));
    };

    ctx.push_scope();
    ctx.add_binding(binding.clone(), binding_info, false);
    let body = parse_body(&args[2..], ctx, false);
    ctx.pop_scope();
    Ok(CatchClause {
        tag,
        binding,
        body: body?,
    })
}

fn parse_var_quote(
    args: &[JesterVal],
    info: Option<SourceInfo>,
    ctx: &mut ParseContext,
) -> Result<Expr> {
    let _ = ctx;
    let Some(JesterVal::Symbol(sym, _)) = args.first() else {
        return Err(Error::syntax("var", "expects a symbol", info));
    };
    match with_runtime(|rt| rt.registry().resolve(sym)) {
        Some(var) => Ok(Expr::VarQuote { info, var }),
        None => Err(Error::undefined_symbol(sym, info)),
    }
}

fn parse_ns(args: &[JesterVal], info: Option<SourceInfo>) -> Result<Expr> {
    let Some(JesterVal::Symbol(name, _)) = args.first() else {
        return Err(Error::syntax("ns", "expects a symbol", info));
    };
    // Switch at analysis time so the rest of the unit resolves against the
    // new namespace; evaluation performs the same switch.
    with_runtime(|rt| {
        let ns = rt.registry().set_current(name.name());
        ns.refer_all(&rt.registry().core_ns());
    });
    Ok(Expr::Ns {
        info,
        name: name.clone(),
    })
}

// ---------------------------------------------------------------------------
// Printing
// ---------------------------------------------------------------------------

fn write_body(f: &mut fmt::Formatter<'_>, body: &[Expr]) -> fmt::Result {
    for expr in body {
        write!(f, " {}", expr)?;
    }
    Ok(())
}

fn write_bindings(f: &mut fmt::Formatter<'_>, names: &[Symbol], inits: &[Expr]) -> fmt::Result {
    f.write_str("[")?;
    for (i, (name, init)) in names.iter().zip(inits).enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{} {}", name, init)?;
    }
    f.write_str("]")
}

impl fmt::Display for Expr {
    /// A deterministic, lisp-shaped rendering of the analyzed tree, shown
    /// by the PARSE phase.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal { value, .. } => write!(f, "{}", value.to_readable_string()),
            Expr::VectorLit { items, .. } => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Expr::MapLit { pairs, .. } => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} {}", k, v)?;
                }
                f.write_str("}")
            }
            Expr::SetLit { items, .. } => {
                f.write_str("#{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("}")
            }
            Expr::If {
                cond,
                then,
                otherwise,
                ..
            } => write!(f, "(if {} {} {})", cond, then, otherwise),
            Expr::Do { body, .. } => {
                f.write_str("(do")?;
                write_body(f, body)?;
                f.write_str(")")
            }
            Expr::Def {
                var, value, is_macro, ..
            } => {
                let head = if *is_macro { "defmacro" } else { "def" };
                match value {
                    Some(value) => write!(f, "({} {} {})", head, var.qualified_name(), value),
                    None => write!(f, "({} {})", head, var.qualified_name()),
                }
            }
            Expr::VarRef { var, .. } => write!(f, "{}", var.qualified_name()),
            Expr::VarQuote { var, .. } => write!(f, "(var {})", var.qualified_name()),
            Expr::BindingRef { name, .. } => write!(f, "{}", name),
            Expr::Let {
                names, inits, body, ..
            } => {
                f.write_str("(let* ")?;
                write_bindings(f, names, inits)?;
                write_body(f, body)?;
                f.write_str(")")
            }
            Expr::Loop {
                names, inits, body, ..
            } => {
                f.write_str("(loop* ")?;
                write_bindings(f, names, inits)?;
                write_body(f, body)?;
                f.write_str(")")
            }
            Expr::Recur { args, .. } => {
                f.write_str("(recur")?;
                write_body(f, args)?;
                f.write_str(")")
            }
            Expr::Fn { fn_expr, .. } => {
                f.write_str("(fn*")?;
                if let Some(name) = &fn_expr.name {
                    write!(f, " {}", name)?;
                }
                let mut write_arity = |f: &mut fmt::Formatter<'_>, a: &FnArity| -> fmt::Result {
                    f.write_str(" ([")?;
                    for (i, p) in a.params.iter().enumerate() {
                        if i > 0 {
                            f.write_str(" ")?;
                        }
                        write!(f, "{}", p)?;
                    }
                    if let Some(rest) = &a.rest {
                        if a.params.is_empty() {
                            write!(f, "& {}", rest)?;
                        } else {
                            write!(f, " & {}", rest)?;
                        }
                    }
                    f.write_str("]")?;
                    write_body(f, &a.body)?;
                    f.write_str(")")
                };
                for a in &fn_expr.arities {
                    write_arity(f, a)?;
                }
                if let Some(v) = &fn_expr.variadic {
                    write_arity(f, v)?;
                }
                f.write_str(")")
            }
            Expr::Call { target, args, .. } => {
                write!(f, "({}", target)?;
                write_body(f, args)?;
                f.write_str(")")
            }
            Expr::Throw { value, .. } => write!(f, "(throw {})", value),
            Expr::Try {
                body,
                catches,
                finally,
                ..
            } => {
                f.write_str("(try")?;
                write_body(f, body)?;
                for c in catches {
                    write!(f, " (catch {} {}", c.tag.name(), c.binding)?;
                    write_body(f, &c.body)?;
                    f.write_str(")")?;
                }
                if let Some(finally) = finally {
                    f.write_str(" (finally")?;
                    write_body(f, finally)?;
                    f.write_str(")")?;
                }
                f.write_str(")")
            }
            Expr::Delay { thunk, .. } => {
                f.write_str("(delay")?;
                write_body(f, &thunk.arities[0].body)?;
                f.write_str(")")
            }
            Expr::LazySeq { thunk, .. } => {
                f.write_str("(lazy-seq")?;
                write_body(f, &thunk.arities[0].body)?;
                f.write_str(")")
            }
            Expr::Meta { meta, target, .. } => write!(f, "(with-meta {} {})", target, meta),
            Expr::Ns { name, .. } => write!(f, "(ns {})", name),
        }
    }
}
