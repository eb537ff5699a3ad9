//! CASE 表达式。

use crate::sqlizer::{BuildError, IntoSqlizer, SqlResult, Sqlizer, sqlizer_arg};

/// `CASE [value] WHEN ... THEN ... [ELSE ...] END`。
///
/// 各部分可以是原始 SQL 字符串或任意表达式；需要绑定参数时用 `expr("?", args![v])`。
#[derive(Debug, Clone, Default)]
pub struct CaseBuilder {
    what: Option<Box<dyn Sqlizer>>,
    when_parts: Vec<(Box<dyn Sqlizer>, Box<dyn Sqlizer>)>,
    else_part: Option<Box<dyn Sqlizer>>,
}

/// 不带比较值的 `CASE WHEN cond THEN ...`。
pub fn case() -> CaseBuilder {
    CaseBuilder::default()
}

/// 带比较值的 `CASE value WHEN ... THEN ...`。
pub fn case_value(value: impl IntoSqlizer) -> CaseBuilder {
    CaseBuilder {
        what: Some(value.into_sqlizer()),
        ..CaseBuilder::default()
    }
}

impl CaseBuilder {
    pub fn when(mut self, when: impl IntoSqlizer, then: impl IntoSqlizer) -> Self {
        self.when_parts
            .push((when.into_sqlizer(), then.into_sqlizer()));
        self
    }

    pub fn else_(mut self, value: impl IntoSqlizer) -> Self {
        self.else_part = Some(value.into_sqlizer());
        self
    }
}

impl Sqlizer for CaseBuilder {
    fn to_sql_raw(&self) -> SqlResult {
        if self.when_parts.is_empty() {
            return Err(BuildError::EmptyCase);
        }

        let mut sql = String::from("CASE");
        let mut args = Vec::new();
        let mut write = |part: &dyn Sqlizer, keyword: &str, sql: &mut String| -> Result<(), BuildError> {
            let (s, a) = part.to_sql_raw()?;
            sql.push_str(keyword);
            sql.push_str(&s);
            args.extend(a);
            Ok(())
        };

        if let Some(what) = &self.what {
            write(&**what, " ", &mut sql)?;
        }
        for (when, then) in &self.when_parts {
            write(&**when, " WHEN ", &mut sql)?;
            write(&**then, " THEN ", &mut sql)?;
        }
        if let Some(e) = &self.else_part {
            write(&**e, " ELSE ", &mut sql)?;
        }
        sql.push_str(" END");

        Ok((sql, args))
    }
}

sqlizer_arg!(CaseBuilder);
