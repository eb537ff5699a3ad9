//! `Sqlizer` 约定、参数类型与构建错误。
//!
//! 所有表达式和语句 builder 都实现 [`Sqlizer`]：渲染为 `(sql, args)` 或返回 [`BuildError`]。
//! 嵌套时统一使用 `to_sql_raw`（中性 `?` 占位符），只有最外层语句在 `to_sql` 中改写占位符。

use crate::expr::Expr;
use crate::placeholder::placeholders;
use crate::string_builder::StringBuilder;
use crate::value::SqlValue;
use dyn_clone::DynClone;
use std::fmt;

/// 渲染结果。
pub type SqlResult = Result<(String, Vec<SqlValue>), BuildError>;

/// 构建 SQL 时的错误（在 `to_sql` 时才会暴露）。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("{statement} statements must specify a table")]
    MissingTable { statement: &'static str },
    #[error("insert statements must have at least one set of values or select clause")]
    MissingValues,
    #[error("insert statements with OnConflict set must have at least one column to be updated")]
    ConflictWithoutAction,
    #[error("insert statements with OnConflict can't use both UpdateColumns and DoNothing")]
    ConflictActionAmbiguous,
    #[error("update statements must have at least one Set clause")]
    MissingAssignments,
    #[error("delete statements must specify a From table")]
    MissingFrom,
    #[error("select statements must have at least one result column")]
    MissingColumns,
    #[error("cannot use null with {op} operator")]
    NullComparison { op: &'static str },
    #[error("cannot use array or slice with {op} operator")]
    ListComparison { op: &'static str },
    #[error("case expression must contain at least one WHEN clause")]
    EmptyCase,
    #[error("expression has {placeholders} placeholders but {args} args")]
    ArgCount { placeholders: usize, args: usize },
    #[error("cannot use array or slice as the value of column {column}")]
    ListValue { column: String },
}

/// 可渲染为 SQL 片段的值。
pub trait Sqlizer: DynClone + fmt::Debug + Send + Sync {
    /// 以中性 `?` 占位符渲染（`??` 原样保留），供嵌套使用。
    fn to_sql_raw(&self) -> SqlResult;

    /// 最终渲染。表达式默认与 `to_sql_raw` 相同；语句 builder 会在这里改写占位符。
    fn to_sql(&self) -> SqlResult {
        self.to_sql_raw()
    }
}

dyn_clone::clone_trait_object!(Sqlizer);

impl Sqlizer for Box<dyn Sqlizer> {
    fn to_sql_raw(&self) -> SqlResult {
        (**self).to_sql_raw()
    }

    fn to_sql(&self) -> SqlResult {
        (**self).to_sql()
    }
}

/// 转换为 `Box<dyn Sqlizer>`：字符串视为不带参数的原始 SQL。
pub trait IntoSqlizer {
    fn into_sqlizer(self) -> Box<dyn Sqlizer>;
}

impl<S: Sqlizer + 'static> IntoSqlizer for S {
    fn into_sqlizer(self) -> Box<dyn Sqlizer> {
        Box::new(self)
    }
}

impl IntoSqlizer for &str {
    fn into_sqlizer(self) -> Box<dyn Sqlizer> {
        Box::new(Expr::new(self, Vec::new()))
    }
}

impl IntoSqlizer for String {
    fn into_sqlizer(self) -> Box<dyn Sqlizer> {
        Box::new(Expr::new(self, Vec::new()))
    }
}

/// 调用方可以放进参数位置的值。
#[derive(Debug, Clone)]
pub enum Arg {
    /// 单个绑定参数，渲染为 `?`。
    Value(SqlValue),
    /// 值列表：相等比较中渲染为 `IN (?,?)`，其他位置展开为 `?,?`。
    List(Vec<SqlValue>),
    /// 嵌套表达式：在该位置内联其 SQL 与参数。
    Sqlizer(Box<dyn Sqlizer>),
}

impl Arg {
    /// 用任意 `Sqlizer` 构造参数（适用于自定义表达式类型）。
    pub fn sqlizer(s: impl Sqlizer + 'static) -> Self {
        Self::Sqlizer(Box::new(s))
    }

    pub fn list<T: Into<SqlValue>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(SqlValue::Null))
    }
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl From<SqlValue> for Arg {
    fn from(v: SqlValue) -> Self {
        Self::Value(v)
    }
}

impl From<Box<dyn Sqlizer>> for Arg {
    fn from(v: Box<dyn Sqlizer>) -> Self {
        Self::Sqlizer(v)
    }
}

impl From<u8> for Arg {
    fn from(v: u8) -> Self {
        SqlValue::from(v).into()
    }
}

impl From<Vec<u8>> for Arg {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v).into()
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        SqlValue::from_option(v).into()
    }
}

macro_rules! arg_scalar {
    ($($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for Arg {
                fn from(v: $t) -> Self {
                    Self::Value(SqlValue::from(v))
                }
            }

            impl From<Vec<$t>> for Arg {
                fn from(v: Vec<$t>) -> Self {
                    Self::list(v)
                }
            }

            impl<const N: usize> From<[$t; N]> for Arg {
                fn from(v: [$t; N]) -> Self {
                    Self::list(v)
                }
            }

            impl From<&[$t]> for Arg {
                fn from(v: &[$t]) -> Self {
                    Self::list(v.iter().cloned())
                }
            }
        )+
    };
}

arg_scalar!(
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    String,
    &'static str,
    time::OffsetDateTime,
);

/// 为表达式/语句类型实现 `From<T> for Arg`。
macro_rules! sqlizer_arg {
    ($($t:ty),+ $(,)?) => {
        $(impl From<$t> for $crate::sqlizer::Arg {
            fn from(v: $t) -> Self {
                $crate::sqlizer::Arg::Sqlizer(Box::new(v))
            }
        })+
    };
}

pub(crate) use sqlizer_arg;

/// 渲染单个参数位置，返回其 SQL 文本。
pub(crate) fn arg_sql(arg: &Arg, args: &mut Vec<SqlValue>) -> Result<String, BuildError> {
    match arg {
        Arg::Value(v) => {
            args.push(v.clone());
            Ok("?".to_string())
        }
        Arg::List(vs) => {
            args.extend(vs.iter().cloned());
            Ok(placeholders(vs.len()))
        }
        Arg::Sqlizer(s) => {
            let (sql, a) = s.to_sql_raw()?;
            args.extend(a);
            Ok(sql)
        }
    }
}

/// 渲染 SET / VALUES 中的单值位置；列表在这里没有合法写法。
pub(crate) fn value_sql(
    column: &str,
    arg: &Arg,
    args: &mut Vec<SqlValue>,
) -> Result<String, BuildError> {
    if let Arg::List(_) = arg {
        return Err(BuildError::ListValue {
            column: column.to_string(),
        });
    }
    arg_sql(arg, args)
}

/// 依次渲染各部分并以 `sep` 连接；渲染为空串的部分被跳过。
pub(crate) fn join_sqlizers(
    parts: &[Box<dyn Sqlizer>],
    sep: &str,
    args: &mut Vec<SqlValue>,
) -> Result<String, BuildError> {
    let mut sb = StringBuilder::new();
    for p in parts {
        let (sql, a) = p.to_sql_raw()?;
        if sql.is_empty() {
            continue;
        }
        if !sb.is_empty() {
            sb.write_str(sep);
        }
        sb.write_str(&sql);
        args.extend(a);
    }
    Ok(sb.into_string())
}

/// 写入 `keyword` 加连接后的子句；全部为空时什么都不写。
pub(crate) fn write_clause(
    sb: &mut StringBuilder,
    keyword: &str,
    parts: &[Box<dyn Sqlizer>],
    sep: &str,
    args: &mut Vec<SqlValue>,
) -> Result<(), BuildError> {
    let sql = join_sqlizers(parts, sep, args)?;
    if !sql.is_empty() {
        sb.write_str(keyword);
        sb.write_str(&sql);
    }
    Ok(())
}
