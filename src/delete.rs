//! DeleteBuilder：构建 DELETE 语句。

use crate::expr::Expr;
use crate::macros::{IntoStrings, collect_into_strings};
use crate::placeholder::PlaceholderFormat;
use crate::sqlizer::{Arg, BuildError, IntoSqlizer, SqlResult, Sqlizer, write_clause};
use crate::statement::{StatementParts, statement_common};
use crate::string_builder::StringBuilder;

#[derive(Debug, Clone, Default)]
pub struct DeleteBuilder {
    parts: StatementParts,
    from: Vec<String>,
    using: Vec<String>,
    where_parts: Vec<Box<dyn Sqlizer>>,
    order_bys: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

statement_common!(DeleteBuilder);

impl DeleteBuilder {
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

    /// 追加要删除的表，空表名被忽略。
    pub fn from(mut self, tables: impl IntoStrings) -> Self {
        self.from.extend(
            collect_into_strings(tables)
                .into_iter()
                .filter(|t| !t.is_empty()),
        );
        self
    }

    /// `DELETE FROM t USING other`（PostgreSQL）。
    pub fn using(mut self, tables: impl IntoStrings) -> Self {
        self.using.extend(collect_into_strings(tables));
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
        if self.from.is_empty() {
            return Err(BuildError::MissingFrom);
        }

        let mut sb = StringBuilder::new();
        let mut args = Vec::new();

        self.parts.write_prefixes(&mut sb, &mut args)?;

        sb.write_str("DELETE FROM ");
        sb.write_strings(&self.from, ", ");

        if !self.using.is_empty() {
            sb.write_str(" USING ");
            sb.write_strings(&self.using, ", ");
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
