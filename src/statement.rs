//! 语句 builder 的公共部分与 `StatementBuilder` 模板。

use crate::delete::DeleteBuilder;
use crate::expr::Expr;
use crate::insert::InsertBuilder;
use crate::macros::IntoStrings;
use crate::placeholder::PlaceholderFormat;
use crate::select::SelectBuilder;
use crate::sqlizer::{Arg, BuildError, IntoSqlizer, Sqlizer, join_sqlizers};
use crate::string_builder::StringBuilder;
use crate::update::UpdateBuilder;
use crate::value::SqlValue;

/// 各类语句共享的字段：占位符格式、前缀与后缀。
#[derive(Debug, Clone, Default)]
pub(crate) struct StatementParts {
    pub(crate) placeholder: PlaceholderFormat,
    pub(crate) prefixes: Vec<Box<dyn Sqlizer>>,
    pub(crate) suffixes: Vec<Box<dyn Sqlizer>>,
}

impl StatementParts {
    pub(crate) fn with_placeholder(placeholder: PlaceholderFormat) -> Self {
        Self {
            placeholder,
            ..Self::default()
        }
    }

    pub(crate) fn write_prefixes(
        &self,
        sb: &mut StringBuilder,
        args: &mut Vec<SqlValue>,
    ) -> Result<(), BuildError> {
        let sql = join_sqlizers(&self.prefixes, " ", args)?;
        if !sql.is_empty() {
            sb.write_str(&sql);
            sb.write_char(' ');
        }
        Ok(())
    }

    pub(crate) fn write_suffixes(
        &self,
        sb: &mut StringBuilder,
        args: &mut Vec<SqlValue>,
    ) -> Result<(), BuildError> {
        let sql = join_sqlizers(&self.suffixes, " ", args)?;
        if !sql.is_empty() {
            sb.write_leading(&sql);
        }
        Ok(())
    }
}

/// 为语句 builder 生成 `Sqlizer` 实现以及前缀、后缀、占位符格式等公共方法。
///
/// 目标类型需要有 `parts: StatementParts` 字段和 `fn render(&self) -> SqlResult`。
macro_rules! statement_common {
    ($ty:ty) => {
        impl $ty {
            /// 设置占位符格式（只影响该语句作为最外层渲染时的输出）。
            pub fn placeholder_format(mut self, format: $crate::placeholder::PlaceholderFormat) -> Self {
                self.parts.placeholder = format;
                self
            }

            /// 在语句最前面追加一段 SQL。
            pub fn prefix(self, sql: impl Into<String>, args: Vec<$crate::sqlizer::Arg>) -> Self {
                self.prefix_expr($crate::expr::Expr::new(sql, args))
            }

            pub fn prefix_expr(mut self, expr: impl $crate::sqlizer::IntoSqlizer) -> Self {
                self.parts.prefixes.push(expr.into_sqlizer());
                self
            }

            /// 在语句最后追加一段 SQL。
            pub fn suffix(self, sql: impl Into<String>, args: Vec<$crate::sqlizer::Arg>) -> Self {
                self.suffix_expr($crate::expr::Expr::new(sql, args))
            }

            pub fn suffix_expr(mut self, expr: impl $crate::sqlizer::IntoSqlizer) -> Self {
                self.parts.suffixes.push(expr.into_sqlizer());
                self
            }

            /// 同 `to_sql`，但出错时 panic。
            pub fn must_sql(&self) -> (String, Vec<$crate::value::SqlValue>) {
                match $crate::sqlizer::Sqlizer::to_sql(self) {
                    Ok(v) => v,
                    Err(e) => panic!("{e}"),
                }
            }
        }

        impl $crate::sqlizer::Sqlizer for $ty {
            fn to_sql_raw(&self) -> $crate::sqlizer::SqlResult {
                self.render()
            }

            fn to_sql(&self) -> $crate::sqlizer::SqlResult {
                let (sql, args) = self.render()?;
                Ok((self.parts.placeholder.replace_placeholders(&sql), args))
            }
        }

        $crate::sqlizer::sqlizer_arg!($ty);
    };
}

pub(crate) use statement_common;

/// 语句模板：携带默认的占位符格式和默认 WHERE 条件。
///
/// ```ignore
/// let psql = StatementBuilder::new().placeholder_format(PlaceholderFormat::Dollar);
/// let (sql, _) = psql.select("*").from("t").where_(eq! {"id" => 1}).to_sql()?;
/// assert_eq!(sql, "SELECT * FROM t WHERE id = $1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatementBuilder {
    placeholder: PlaceholderFormat,
    where_parts: Vec<Box<dyn Sqlizer>>,
}

impl StatementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placeholder_format(mut self, format: PlaceholderFormat) -> Self {
        self.placeholder = format;
        self
    }

    /// 追加默认 WHERE 条件，SELECT/UPDATE/DELETE 会继承。
    pub fn where_(mut self, pred: impl IntoSqlizer) -> Self {
        self.where_parts.push(pred.into_sqlizer());
        self
    }

    pub fn where_expr(self, sql: impl Into<String>, args: Vec<Arg>) -> Self {
        self.where_(Expr::new(sql, args))
    }

    pub fn select(&self, columns: impl IntoStrings) -> SelectBuilder {
        SelectBuilder::with_template(self.placeholder, self.where_parts.clone()).columns(columns)
    }

    pub fn insert(&self, table: impl Into<String>) -> InsertBuilder {
        InsertBuilder::with_template(self.placeholder, "INSERT").into_table(table)
    }

    pub fn replace(&self, table: impl Into<String>) -> InsertBuilder {
        InsertBuilder::with_template(self.placeholder, "REPLACE").into_table(table)
    }

    pub fn update(&self, table: impl Into<String>) -> UpdateBuilder {
        UpdateBuilder::with_template(self.placeholder, self.where_parts.clone()).table(table)
    }

    pub fn delete(&self, tables: impl IntoStrings) -> DeleteBuilder {
        DeleteBuilder::with_template(self.placeholder, self.where_parts.clone()).from(tables)
    }
}

/// `SELECT columns`。
pub fn select(columns: impl IntoStrings) -> SelectBuilder {
    StatementBuilder::new().select(columns)
}

/// `INSERT INTO table`。
pub fn insert(table: impl Into<String>) -> InsertBuilder {
    StatementBuilder::new().insert(table)
}

/// `REPLACE INTO table`（MySQL/SQLite）。
pub fn replace(table: impl Into<String>) -> InsertBuilder {
    StatementBuilder::new().replace(table)
}

/// `UPDATE table`。
pub fn update(table: impl Into<String>) -> UpdateBuilder {
    StatementBuilder::new().update(table)
}

/// `DELETE FROM tables`。
pub fn delete(tables: impl IntoStrings) -> DeleteBuilder {
    StatementBuilder::new().delete(tables)
}
