//! InsertBuilder：构建 INSERT / REPLACE 语句，支持 `ON CONFLICT` 与 `RETURNING`。

use crate::macros::{IntoStrings, collect_into_strings};
use crate::mapper::mapper;
use crate::placeholder::PlaceholderFormat;
use crate::select::SelectBuilder;
use crate::sqlizer::{Arg, BuildError, SqlResult, Sqlizer, value_sql};
use crate::statement::{StatementParts, statement_common};
use crate::string_builder::StringBuilder;
use crate::structs::SqlStruct;

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    parts: StatementParts,
    keyword: &'static str,
    options: Vec<String>,
    into: String,
    columns: Vec<String>,
    values: Vec<Vec<Arg>>,
    select: Option<Box<SelectBuilder>>,
    conflict_keys: Vec<String>,
    update_columns: Vec<String>,
    do_nothing: bool,
    returning: Vec<String>,
}

statement_common!(InsertBuilder);

impl Default for InsertBuilder {
    fn default() -> Self {
        Self::with_template(PlaceholderFormat::default(), "INSERT")
    }
}

impl InsertBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_template(placeholder: PlaceholderFormat, keyword: &'static str) -> Self {
        Self {
            parts: StatementParts::with_placeholder(placeholder),
            keyword,
            options: Vec::new(),
            into: String::new(),
            columns: Vec::new(),
            values: Vec::new(),
            select: None,
            conflict_keys: Vec::new(),
            update_columns: Vec::new(),
            do_nothing: false,
            returning: Vec::new(),
        }
    }

    /// 在 `INTO` 之前追加关键字，例如 `IGNORE`。
    pub fn options(mut self, options: impl IntoStrings) -> Self {
        self.options.extend(collect_into_strings(options));
        self
    }

    pub fn into_table(mut self, table: impl Into<String>) -> Self {
        self.into = table.into();
        self
    }

    pub fn columns(mut self, columns: impl IntoStrings) -> Self {
        self.columns.extend(collect_into_strings(columns));
        self
    }

    /// 追加一行值。每个值可以是普通参数或表达式（表达式原样内联）。
    pub fn values(mut self, values: Vec<Arg>) -> Self {
        self.values.push(values);
        self
    }

    /// 用 `列 => 值` 映射替换全部列与值；列按字典序排列。
    pub fn set_map<K, V>(mut self, clauses: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Arg>,
    {
        let mut pairs: Vec<(String, Arg)> = clauses
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        let (columns, values) = pairs.into_iter().unzip();
        self.columns = columns;
        self.values = vec![values];
        self
    }

    /// `INSERT INTO t (...) SELECT ...`；同时设置了 VALUES 时以 SELECT 为准。
    pub fn select(mut self, select: SelectBuilder) -> Self {
        self.select = Some(Box::new(select));
        self
    }

    /// `ON CONFLICT (keys)`，需配合 `do_nothing` 或 `update_columns`。
    pub fn on_conflict(mut self, keys: impl IntoStrings) -> Self {
        self.conflict_keys.extend(collect_into_strings(keys));
        self
    }

    pub fn do_nothing(mut self) -> Self {
        self.do_nothing = true;
        self
    }

    /// `DO UPDATE SET col = EXCLUDED.col, ...`
    pub fn update_columns(mut self, columns: impl IntoStrings) -> Self {
        self.update_columns.extend(collect_into_strings(columns));
        self
    }

    pub fn returning(mut self, columns: impl IntoStrings) -> Self {
        self.returning.extend(collect_into_strings(columns));
        self
    }

    /// 按已设置的列，从结构体中取出一行值。
    ///
    /// # Panics
    ///
    /// 列在结构体中没有对应的 `sq` 映射时 panic。
    pub fn struct_values<T: SqlStruct + 'static>(self, data: &T) -> Self {
        let lookup = mapper().field_map(data);
        let row = self
            .columns
            .iter()
            .map(|col| match lookup.get(col) {
                Some(v) => Arg::Value(v.clone()),
                None => panic!("missing column `{col}` in struct. Is it tagged with `sq:\"{col}\"`?"),
            })
            .collect();
        self.values(row)
    }

    /// 用结构体的全部映射列（按声明顺序）追加列与一行值。
    pub fn struct_<T: SqlStruct + 'static>(self, data: &T) -> Self {
        let (columns, values): (Vec<String>, Vec<Arg>) = mapper()
            .field_map(data)
            .into_iter()
            .map(|(col, v)| (col, Arg::Value(v)))
            .unzip();
        self.columns(columns).values(values)
    }

    fn render(&self) -> SqlResult {
        if self.into.is_empty() {
            return Err(BuildError::MissingTable {
                statement: "insert",
            });
        }
        if self.values.is_empty() && self.select.is_none() {
            return Err(BuildError::MissingValues);
        }

        let mut sb = StringBuilder::new();
        let mut args = Vec::new();

        self.parts.write_prefixes(&mut sb, &mut args)?;

        sb.write_str(self.keyword);
        sb.write_char(' ');
        if !self.options.is_empty() {
            sb.write_strings(&self.options, " ");
            sb.write_char(' ');
        }

        sb.write_str("INTO ");
        sb.write_str(&self.into);
        sb.write_char(' ');

        if !self.columns.is_empty() {
            sb.write_char('(');
            sb.write_strings(&self.columns, ",");
            sb.write_str(") ");
        }

        if let Some(select) = &self.select {
            let (sql, a) = select.to_sql_raw()?;
            sb.write_str(&sql);
            args.extend(a);
        } else {
            sb.write_str("VALUES ");
            let mut rows = Vec::with_capacity(self.values.len());
            for row in &self.values {
                let mut cells = Vec::with_capacity(row.len());
                for (i, v) in row.iter().enumerate() {
                    let column = match self.columns.get(i) {
                        Some(c) => c.clone(),
                        None => format!("#{}", i + 1),
                    };
                    cells.push(value_sql(&column, v, &mut args)?);
                }
                rows.push(format!("({})", cells.join(",")));
            }
            sb.write_str(&rows.join(","));
        }

        if !self.conflict_keys.is_empty() {
            sb.write_str(" ON CONFLICT (");
            sb.write_strings(&self.conflict_keys, ",");
            sb.write_char(')');

            match (self.do_nothing, self.update_columns.is_empty()) {
                (true, false) => return Err(BuildError::ConflictActionAmbiguous),
                (true, true) => sb.write_str(" DO NOTHING"),
                (false, true) => return Err(BuildError::ConflictWithoutAction),
                (false, false) => {
                    sb.write_str(" DO UPDATE SET");
                    for (idx, col) in self.update_columns.iter().enumerate() {
                        if idx != 0 {
                            sb.write_char(',');
                        }
                        sb.write_str(&format!(" {col} = EXCLUDED.{col}"));
                    }
                }
            }
        }

        if !self.returning.is_empty() {
            sb.write_str(" RETURNING ");
            sb.write_strings(&self.returning, ",");
        }

        self.parts.write_suffixes(&mut sb, &mut args)?;

        Ok((sb.into_string(), args))
    }
}
