//! UpdateBuilder：构建 UPDATE 语句。

use crate::expr::{Expr, alias};
use crate::macros::{IntoStrings, collect_into_strings};
use crate::placeholder::PlaceholderFormat;
use crate::select::SelectBuilder;
use crate::sqlizer::{Arg, BuildError, IntoSqlizer, SqlResult, Sqlizer, value_sql, write_clause};
use crate::statement::{StatementParts, statement_common};
use crate::string_builder::StringBuilder;

#[derive(Debug, Clone, Default)]
pub struct UpdateBuilder {
    parts: StatementParts,
    table: String,
    set_clauses: Vec<(String, Arg)>,
    from: Option<Box<dyn Sqlizer>>,
    where_parts: Vec<Box<dyn Sqlizer>>,
    order_bys: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

statement_common!(UpdateBuilder);

impl UpdateBuilder {
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

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// 追加 `column = value`；值可以是普通参数或表达式。
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.set_clauses.push((column.into(), value.into()));
        self
    }

    /// 按列名字典序追加多个赋值。
    pub fn set_map<K, V>(self, clauses: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Arg>,
    {
        let mut pairs: Vec<(String, Arg)> = clauses
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs.into_iter().fold(self, |b, (k, v)| b.set(k, v))
    }

    /// `UPDATE t SET ... FROM other`（PostgreSQL）。
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(Box::new(Expr::raw(from)));
        self
    }

    pub fn from_select(mut self, from: SelectBuilder, alias_name: impl Into<String>) -> Self {
        self.from = Some(Box::new(alias(from, alias_name)));
        self
    }

    pub fn where_(mut self, pred: impl IntoSqlizer) -> Self {
        self.where_parts.push(pred.into_sqlizer());
        self
    }

    pub fn where_expr(self, sql: impl Into<String>, args: Vec<Arg>) -> Self {
        self.where_(Expr::new(sql, args))
    }

    pub fn order_by(mut self, order_bys: impl IntoStrings) -> Self {
        self.order_bys.extend(collect_into_strings(order_bys));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    fn render(&self) -> SqlResult {
        if self.table.is_empty() {
            return Err(BuildError::MissingTable {
                statement: "update",
            });
        }
        if self.set_clauses.is_empty() {
            return Err(BuildError::MissingAssignments);
        }

        let mut sb = StringBuilder::new();
        let mut args = Vec::new();

        self.parts.write_prefixes(&mut sb, &mut args)?;

        sb.write_str("UPDATE ");
        sb.write_str(&self.table);
        sb.write_str(" SET ");

        let mut sets = Vec::with_capacity(self.set_clauses.len());
        for (col, value) in &self.set_clauses {
            sets.push(format!("{col} = {}", value_sql(col, value, &mut args)?));
        }
        sb.write_strings(&sets, ", ");

        if let Some(from) = &self.from {
            let (sql, a) = from.to_sql_raw()?;
            sb.write_str(" FROM ");
            sb.write_str(&sql);
            args.extend(a);
        }

        write_clause(&mut sb, " WHERE ", &self.where_parts, " AND ", &mut args)?;

        if !self.order_bys.is_empty() {
            sb.write_str(" ORDER BY ");
            sb.write_strings(&self.order_bys, ", ");
        }
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
