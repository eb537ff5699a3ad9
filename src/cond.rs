//! 条件表达式：比较映射（`Eq`/`Lt`/`Like` ...）与布尔组合（`And`/`Or`）。
//!
//! 映射类条件以 `BTreeMap` 保存，渲染顺序即列名的字典序；多个条目之间以 ` AND ` 连接且不加括号。

use crate::placeholder::placeholders;
use crate::sqlizer::{Arg, BuildError, IntoSqlizer, SqlResult, Sqlizer, sqlizer_arg};
use crate::value::SqlValue;
use std::collections::BTreeMap;
use std::collections::btree_map;

macro_rules! column_map {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default)]
            pub struct $name(pub BTreeMap<String, Arg>);

            impl $name {
                pub fn new() -> Self {
                    Self::default()
                }

                /// 追加一个 `列 => 值` 条目（同名列会被覆盖）。
                pub fn with(mut self, column: impl Into<String>, value: impl Into<Arg>) -> Self {
                    self.0.insert(column.into(), value.into());
                    self
                }

                pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Arg>) {
                    self.0.insert(column.into(), value.into());
                }

                pub fn len(&self) -> usize {
                    self.0.len()
                }

                pub fn is_empty(&self) -> bool {
                    self.0.is_empty()
                }
            }

            impl<K: Into<String>, V: Into<Arg>> FromIterator<(K, V)> for $name {
                fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
                }
            }

            impl IntoIterator for $name {
                type Item = (String, Arg);
                type IntoIter = btree_map::IntoIter<String, Arg>;

                fn into_iter(self) -> Self::IntoIter {
                    self.0.into_iter()
                }
            }

            sqlizer_arg!($name);
        )+
    };
}

column_map!(
    /// `col = ?`；`NULL` 渲染为 `IS NULL`，列表渲染为 `IN (...)`，空列表为 `(1=0)`。
    Eq,
    /// `col <> ?`；`NULL` 渲染为 `IS NOT NULL`，列表渲染为 `NOT IN (...)`，空列表为 `(1=1)`。
    NotEq,
    /// `col < ?`
    Lt,
    /// `col <= ?`
    LtOrEq,
    /// `col > ?`
    Gt,
    /// `col >= ?`
    GtOrEq,
    /// `col LIKE ?`
    Like,
    /// `col NOT LIKE ?`
    NotLike,
    /// `col ILIKE ?`
    ILike,
    /// `col NOT ILIKE ?`
    NotILike,
);

fn equality_sql(map: &BTreeMap<String, Arg>, negate: bool) -> SqlResult {
    let (eq_op, null_op, in_op, empty_list) = if negate {
        ("<>", "IS NOT", "NOT IN", "(1=1)")
    } else {
        ("=", "IS", "IN", "(1=0)")
    };

    let mut exprs = Vec::with_capacity(map.len());
    let mut args = Vec::new();
    for (col, value) in map {
        match value {
            Arg::Value(SqlValue::Null) => exprs.push(format!("{col} {null_op} NULL")),
            Arg::Value(v) => {
                exprs.push(format!("{col} {eq_op} ?"));
                args.push(v.clone());
            }
            Arg::List(vs) if vs.is_empty() => exprs.push(empty_list.to_string()),
            Arg::List(vs) => {
                exprs.push(format!("{col} {in_op} ({})", placeholders(vs.len())));
                args.extend(vs.iter().cloned());
            }
            Arg::Sqlizer(s) => {
                let (sql, a) = s.to_sql_raw()?;
                exprs.push(format!("{col} {eq_op} {sql}"));
                args.extend(a);
            }
        }
    }
    Ok((exprs.join(" AND "), args))
}

fn operator_sql(map: &BTreeMap<String, Arg>, op: &'static str) -> SqlResult {
    let mut exprs = Vec::with_capacity(map.len());
    let mut args = Vec::new();
    for (col, value) in map {
        match value {
            Arg::Value(SqlValue::Null) => return Err(BuildError::NullComparison { op }),
            Arg::List(_) => return Err(BuildError::ListComparison { op }),
            Arg::Value(v) => {
                exprs.push(format!("{col} {op} ?"));
                args.push(v.clone());
            }
            Arg::Sqlizer(s) => {
                let (sql, a) = s.to_sql_raw()?;
                exprs.push(format!("{col} {op} {sql}"));
                args.extend(a);
            }
        }
    }
    Ok((exprs.join(" AND "), args))
}

impl Sqlizer for Eq {
    fn to_sql_raw(&self) -> SqlResult {
        equality_sql(&self.0, false)
    }
}

impl Sqlizer for NotEq {
    fn to_sql_raw(&self) -> SqlResult {
        equality_sql(&self.0, true)
    }
}

macro_rules! operator_map {
    ($($name:ident => $op:literal),+ $(,)?) => {
        $(impl Sqlizer for $name {
            fn to_sql_raw(&self) -> SqlResult {
                operator_sql(&self.0, $op)
            }
        })+
    };
}

operator_map!(
    Lt => "<",
    LtOrEq => "<=",
    Gt => ">",
    GtOrEq => ">=",
    Like => "LIKE",
    NotLike => "NOT LIKE",
    ILike => "ILIKE",
    NotILike => "NOT ILIKE",
);

macro_rules! conjunction {
    ($($(#[$meta:meta])* $name:ident => ($sep:literal, $empty:literal)),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default)]
            pub struct $name(pub Vec<Box<dyn Sqlizer>>);

            impl $name {
                pub fn new() -> Self {
                    Self::default()
                }

                pub fn push(mut self, pred: impl IntoSqlizer) -> Self {
                    self.0.push(pred.into_sqlizer());
                    self
                }
            }

            impl<S: IntoSqlizer> FromIterator<S> for $name {
                fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
                    Self(iter.into_iter().map(IntoSqlizer::into_sqlizer).collect())
                }
            }

            impl Sqlizer for $name {
                fn to_sql_raw(&self) -> SqlResult {
                    let mut args = Vec::new();
                    let sql = crate::sqlizer::join_sqlizers(&self.0, $sep, &mut args)?;
                    if sql.is_empty() {
                        return Ok(($empty.to_string(), args));
                    }
                    Ok((format!("({sql})"), args))
                }
            }

            sqlizer_arg!($name);
        )+
    };
}

conjunction!(
    /// `(a AND b)`；没有非空子句时渲染为 `(1=1)`。
    And => (" AND ", "(1=1)"),
    /// `(a OR b)`；没有非空子句时渲染为 `(1=0)`。
    Or => (" OR ", "(1=0)"),
);
