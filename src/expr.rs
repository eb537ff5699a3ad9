//! 原始 SQL 表达式、拼接表达式与别名。

use crate::sqlizer::{Arg, BuildError, IntoSqlizer, SqlResult, Sqlizer, arg_sql, sqlizer_arg};
use crate::value::SqlValue;

/// 一段原始 SQL 及其参数。
///
/// 参数全部是普通值时，文本原样输出，不校验 `?` 数量。否则 `?` 个数必须与参数个数一致，
/// 从左到右扫描文本：嵌套表达式在对应的 `?` 处内联，列表展开为 `?,?`，`??` 保留给最终的占位符改写。
#[derive(Debug, Clone)]
pub struct Expr {
    sql: String,
    args: Vec<Arg>,
}

impl Expr {
    pub fn new(sql: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// 不带参数的原始 SQL。
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    fn is_simple(&self) -> bool {
        self.args.iter().all(|a| matches!(a, Arg::Value(_)))
    }
}

/// 构造 [`Expr`]。
pub fn expr(sql: impl Into<String>, args: Vec<Arg>) -> Expr {
    Expr::new(sql, args)
}

impl Sqlizer for Expr {
    fn to_sql_raw(&self) -> SqlResult {
        let mut args: Vec<SqlValue> = Vec::with_capacity(self.args.len());

        if self.is_simple() {
            for a in &self.args {
                if let Arg::Value(v) = a {
                    args.push(v.clone());
                }
            }
            return Ok((self.sql.clone(), args));
        }

        let placeholders = count_placeholders(&self.sql);
        if placeholders != self.args.len() {
            return Err(BuildError::ArgCount {
                placeholders,
                args: self.args.len(),
            });
        }

        let mut out = String::with_capacity(self.sql.len());
        let mut rest = self.sql.as_str();
        let mut pending = self.args.iter();

        while let Some(p) = rest.find('?') {
            if rest[p + 1..].starts_with('?') {
                out.push_str(&rest[..p + 2]);
                rest = &rest[p + 2..];
                continue;
            }
            let Some(arg) = pending.next() else {
                break;
            };
            out.push_str(&rest[..p]);
            out.push_str(&arg_sql(arg, &mut args)?);
            rest = &rest[p + 1..];
        }
        out.push_str(rest);

        Ok((out, args))
    }
}

/// 未转义的 `?` 个数（`??` 不计）。
fn count_placeholders(sql: &str) -> usize {
    let mut n = 0;
    let mut rest = sql;
    while let Some(p) = rest.find('?') {
        if rest[p + 1..].starts_with('?') {
            rest = &rest[p + 2..];
        } else {
            n += 1;
            rest = &rest[p + 1..];
        }
    }
    n
}

/// 把多个片段直接拼接（不加分隔符）。
#[derive(Debug, Clone, Default)]
pub struct ConcatExpr(Vec<Box<dyn Sqlizer>>);

/// 拼接字符串与表达式，例如 `concat_expr(["COALESCE(a, ", expr("?", args![1]), ")"])`。
pub fn concat_expr<I>(parts: I) -> ConcatExpr
where
    I: IntoIterator,
    I::Item: IntoSqlizer,
{
    ConcatExpr(parts.into_iter().map(IntoSqlizer::into_sqlizer).collect())
}

impl ConcatExpr {
    pub fn push(mut self, part: impl IntoSqlizer) -> Self {
        self.0.push(part.into_sqlizer());
        self
    }
}

impl Sqlizer for ConcatExpr {
    fn to_sql_raw(&self) -> SqlResult {
        let mut sql = String::new();
        let mut args = Vec::new();
        for part in &self.0 {
            let (s, a) = part.to_sql_raw()?;
            sql.push_str(&s);
            args.extend(a);
        }
        Ok((sql, args))
    }
}

/// `(expr) AS alias`。
#[derive(Debug, Clone)]
pub struct Alias {
    expr: Box<dyn Sqlizer>,
    alias: String,
}

pub fn alias(expr: impl IntoSqlizer, alias: impl Into<String>) -> Alias {
    Alias {
        expr: expr.into_sqlizer(),
        alias: alias.into(),
    }
}

impl Sqlizer for Alias {
    fn to_sql_raw(&self) -> SqlResult {
        let (sql, args) = self.expr.to_sql_raw()?;
        Ok((format!("({sql}) AS {}", self.alias), args))
    }
}

sqlizer_arg!(Expr, ConcatExpr, Alias);
