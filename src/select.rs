//! SelectBuilder：构建 SELECT 语句。

use crate::expr::{Expr, alias};
use crate::macros::{IntoStrings, collect_into_strings};
use crate::placeholder::PlaceholderFormat;
use crate::sqlizer::{
    Arg, BuildError, IntoSqlizer, SqlResult, Sqlizer, join_sqlizers, write_clause,
};
use crate::statement::{StatementParts, statement_common};
use crate::string_builder::StringBuilder;

/// SELECT 语句 builder。所有方法都返回新的 builder，原值不受影响。
#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    parts: StatementParts,
    options: Vec<String>,
    columns: Vec<Box<dyn Sqlizer>>,
    from: Option<Box<dyn Sqlizer>>,
    joins: Vec<Box<dyn Sqlizer>>,
    where_parts: Vec<Box<dyn Sqlizer>>,
    group_bys: Vec<String>,
    having_parts: Vec<Box<dyn Sqlizer>>,
    order_by_parts: Vec<Box<dyn Sqlizer>>,
    limit: Option<u64>,
    offset: Option<u64>,
}

statement_common!(SelectBuilder);

fn raw_parts(items: impl IntoStrings) -> impl Iterator<Item = Box<dyn Sqlizer>> {
    collect_into_strings(items)
        .into_iter()
        .map(|s| Box::new(Expr::raw(s)) as Box<dyn Sqlizer>)
}

impl SelectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_template(
        placeholder: PlaceholderFormat,
        where_parts: Vec<Box<dyn Sqlizer>>,
    ) -> Self {
        Self {
            parts: StatementParts::with_placeholder(placeholder),
            where_parts,
            ..Self::default()
        }
    }

    /// `SELECT DISTINCT ...`
    pub fn distinct(self) -> Self {
        self.options("DISTINCT")
    }

    /// 在 `SELECT` 与列之间追加关键字，例如 `SQL_NO_CACHE`。
    pub fn options(mut self, options: impl IntoStrings) -> Self {
        self.options.extend(collect_into_strings(options));
        self
    }

    pub fn columns(mut self, columns: impl IntoStrings) -> Self {
        self.columns.extend(raw_parts(columns));
        self
    }

    /// 追加一个结果列表达式，例如子查询或 `CASE`。
    pub fn column(mut self, column: impl IntoSqlizer) -> Self {
        self.columns.push(column.into_sqlizer());
        self
    }

    pub fn column_expr(self, sql: impl Into<String>, args: Vec<Arg>) -> Self {
        self.column(Expr::new(sql, args))
    }

    pub fn remove_columns(mut self) -> Self {
        self.columns.clear();
        self
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(Box::new(Expr::raw(from)));
        self
    }

    /// `FROM (subquery) AS alias`。
    pub fn from_select(mut self, from: SelectBuilder, alias_name: impl Into<String>) -> Self {
        self.from = Some(Box::new(alias(from, alias_name)));
        self
    }

    /// 追加一个完整的 JOIN 子句。
    pub fn join_clause(mut self, join: impl IntoSqlizer) -> Self {
        self.joins.push(join.into_sqlizer());
        self
    }

    pub fn join(self, join: impl AsRef<str>) -> Self {
        self.join_keyword("JOIN", join.as_ref())
    }

    pub fn left_join(self, join: impl AsRef<str>) -> Self {
        self.join_keyword("LEFT JOIN", join.as_ref())
    }

    pub fn right_join(self, join: impl AsRef<str>) -> Self {
        self.join_keyword("RIGHT JOIN", join.as_ref())
    }

    pub fn inner_join(self, join: impl AsRef<str>) -> Self {
        self.join_keyword("INNER JOIN", join.as_ref())
    }

    pub fn cross_join(self, join: impl AsRef<str>) -> Self {
        self.join_keyword("CROSS JOIN", join.as_ref())
    }

    fn join_keyword(self, keyword: &str, join: &str) -> Self {
        self.join_clause(Expr::raw(format!("{keyword} {join}")))
    }

    /// 追加 WHERE 条件，多次调用以 ` AND ` 连接。
    pub fn where_(mut self, pred: impl IntoSqlizer) -> Self {
        self.where_parts.push(pred.into_sqlizer());
        self
    }

    pub fn where_expr(self, sql: impl Into<String>, args: Vec<Arg>) -> Self {
        self.where_(Expr::new(sql, args))
    }

    pub fn group_by(mut self, group_bys: impl IntoStrings) -> Self {
        self.group_bys.extend(collect_into_strings(group_bys));
        self
    }

    pub fn having(mut self, pred: impl IntoSqlizer) -> Self {
        self.having_parts.push(pred.into_sqlizer());
        self
    }

    pub fn having_expr(self, sql: impl Into<String>, args: Vec<Arg>) -> Self {
        self.having(Expr::new(sql, args))
    }

    pub fn order_by(mut self, order_bys: impl IntoStrings) -> Self {
        self.order_by_parts.extend(raw_parts(order_bys));
        self
    }

    /// 追加带参数的排序子句，例如 `expr("id = ? DESC", args![1])`。
    pub fn order_by_clause(mut self, clause: impl IntoSqlizer) -> Self {
        self.order_by_parts.push(clause.into_sqlizer());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn remove_limit(mut self) -> Self {
        self.limit = None;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn remove_offset(mut self) -> Self {
        self.offset = None;
        self
    }

    fn render(&self) -> SqlResult {
        if self.columns.is_empty() {
            return Err(BuildError::MissingColumns);
        }

        let mut sb = StringBuilder::new();
        let mut args = Vec::new();

        self.parts.write_prefixes(&mut sb, &mut args)?;

        sb.write_str("SELECT ");
        if !self.options.is_empty() {
            sb.write_strings(&self.options, " ");
            sb.write_char(' ');
        }
        sb.write_str(&join_sqlizers(&self.columns, ", ", &mut args)?);

        if let Some(from) = &self.from {
            let (sql, a) = from.to_sql_raw()?;
            sb.write_str(" FROM ");
            sb.write_str(&sql);
            args.extend(a);
        }

        write_clause(&mut sb, " ", &self.joins, " ", &mut args)?;
        write_clause(&mut sb, " WHERE ", &self.where_parts, " AND ", &mut args)?;

        if !self.group_bys.is_empty() {
            sb.write_str(" GROUP BY ");
            sb.write_strings(&self.group_bys, ", ");
        }

        write_clause(&mut sb, " HAVING ", &self.having_parts, " AND ", &mut args)?;
        write_clause(&mut sb, " ORDER BY ", &self.order_by_parts, ", ", &mut args)?;

        if let Some(limit) = self.limit {
            sb.write_str(" LIMIT ");
            sb.write_str(&limit.to_string());
        }
        if let Some(offset) = self.offset {
            sb.write_str(" OFFSET ");
            sb.write_str(&offset.to_string());
        }

        self.parts.write_suffixes(&mut sb, &mut args)?;

        Ok((sb.into_string(), args))
    }
}
