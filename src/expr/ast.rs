//! Syntax tree for attribute expressions.
//!
//! These variants are the whole allow-list: anything the parser cannot map
//! onto one of them is rejected before a tree exists.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use strum_macros::Display as StrumDisplay;

use crate::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub(crate) enum BoolOp {
    #[strum(serialize = "and")]
    And,
    #[strum(serialize = "or")]
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub(crate) enum CompareOp {
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    NotEq,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    LtE,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    GtE,
    #[strum(serialize = "in")]
    In,
    #[strum(serialize = "not in")]
    NotIn,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    /// `a and b and ...` / `a or b or ...`, at least two operands.
    BoolOp { op: BoolOp, operands: Vec<Expr> },
    Not(Box<Expr>),
    /// `left op1 e1 op2 e2 ...`, at least one link.
    Compare {
        left: Box<Expr>,
        chain: Vec<(CompareOp, Expr)>,
    },
    Name(String),
    /// String, number, `True`, `False` or `None`.
    Constant(Value),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Map(Vec<(Expr, Expr)>),
    Subscript { target: Box<Expr>, index: Box<Expr> },
}

impl Expr {
    /// Every variable name referenced anywhere in the tree.
    pub fn names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Name(name) => {
                names.insert(name.as_str());
            }
            Expr::Constant(_) => {}
            Expr::Not(inner) => inner.collect_names(names),
            Expr::BoolOp { operands, .. } | Expr::List(operands) | Expr::Tuple(operands) => {
                for operand in operands {
                    operand.collect_names(names);
                }
            }
            Expr::Compare { left, chain } => {
                left.collect_names(names);
                for (_, right) in chain {
                    right.collect_names(names);
                }
            }
            Expr::Map(entries) => {
                for (key, value) in entries {
                    key.collect_names(names);
                    value.collect_names(names);
                }
            }
            Expr::Subscript { target, index } => {
                target.collect_names(names);
                index.collect_names(names);
            }
        }
    }
}

/// Fully parenthesised rendering, used when logging a parsed tree.
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Expr::BoolOp { op, operands } => {
                write!(f, "({})", operands.iter().join(&format!(" {op} ")))
            }
            Expr::Not(inner) => write!(f, "(not {inner})"),
            Expr::Compare { left, chain } => {
                write!(f, "({left}")?;
                for (op, right) in chain {
                    write!(f, " {op} {right}")?;
                }
                write!(f, ")")
            }
            Expr::Name(name) => write!(f, "{name}"),
            Expr::Constant(value) => write!(f, "{value}"),
            Expr::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Expr::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0]),
            Expr::Tuple(items) => write!(f, "({})", items.iter().join(", ")),
            Expr::Map(entries) => write!(
                f,
                "{{{}}}",
                entries.iter().map(|(k, v)| format!("{k}: {v}")).join(", ")
            ),
            Expr::Subscript { target, index } => write!(f, "{target}[{index}]"),
        }
    }
}
