//! Scan：把结果行写入目标（标量、结构体、`Vec`、按键分组的 `HashMap`）。
//!
//! 结构体目标按列名查找字段路径，任何一列找不到对应字段都会整体失败；
//! 标量目标要求结果集恰好只有一列。

use crate::mapper::{Traversal, leaf_mut, mapper};
use crate::structs::SqlStruct;
use crate::value::SqlValue;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;
use time::format_description::FormatItem;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, PrimitiveDateTime};

/// 扫描错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("missing destination name {column} in {type_name}")]
    MissingDestination {
        column: String,
        type_name: &'static str,
    },
    #[error("no rows in result set")]
    NoRows,
    #[error("trying to scan multiple rows into a single struct")]
    MultipleRows,
    #[error("expected {expected} column(s), got {found}")]
    ColumnCount { expected: usize, found: usize },
    #[error("cannot scan {found} value into {expected}")]
    Convert {
        expected: &'static str,
        found: &'static str,
    },
    #[error("binding does not match destination {type_name}")]
    BindingMismatch { type_name: &'static str },
    #[error("missing key column {column} in result set")]
    MissingKeyColumn { column: String },
}

fn convert_err(expected: &'static str, found: &SqlValue) -> ScanError {
    ScanError::Convert {
        expected,
        found: found.kind(),
    }
}

/// 从 `SqlValue` 写入自身。
pub trait FromSqlValue {
    fn scan_value(&mut self, value: SqlValue) -> Result<(), ScanError>;
}

fn to_i128(value: &SqlValue, expected: &'static str) -> Result<i128, ScanError> {
    match value {
        SqlValue::I64(n) => Ok(i128::from(*n)),
        SqlValue::U64(n) => Ok(i128::from(*n)),
        SqlValue::Bool(b) => Ok(i128::from(*b)),
        SqlValue::String(s) => s.trim().parse().map_err(|_| convert_err(expected, value)),
        _ => Err(convert_err(expected, value)),
    }
}

macro_rules! scan_int {
    ($($t:ty),+ $(,)?) => {
        $(impl FromSqlValue for $t {
            fn scan_value(&mut self, value: SqlValue) -> Result<(), ScanError> {
                let n = to_i128(&value, stringify!($t))?;
                *self = <$t>::try_from(n).map_err(|_| convert_err(stringify!($t), &value))?;
                Ok(())
            }
        })+
    };
}

scan_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromSqlValue for f64 {
    fn scan_value(&mut self, value: SqlValue) -> Result<(), ScanError> {
        *self = match &value {
            SqlValue::F64(v) => *v,
            SqlValue::I64(v) => *v as f64,
            SqlValue::U64(v) => *v as f64,
            SqlValue::String(s) => s.trim().parse().map_err(|_| convert_err("f64", &value))?,
            _ => return Err(convert_err("f64", &value)),
        };
        Ok(())
    }
}

impl FromSqlValue for f32 {
    fn scan_value(&mut self, value: SqlValue) -> Result<(), ScanError> {
        let mut v = 0_f64;
        v.scan_value(value)?;
        *self = v as f32;
        Ok(())
    }
}

impl FromSqlValue for bool {
    fn scan_value(&mut self, value: SqlValue) -> Result<(), ScanError> {
        *self = match &value {
            SqlValue::Bool(b) => *b,
            SqlValue::I64(n) => *n != 0,
            SqlValue::U64(n) => *n != 0,
            SqlValue::String(s) => match s.as_ref() {
                "true" | "TRUE" | "1" => true,
                "false" | "FALSE" | "0" => false,
                _ => return Err(convert_err("bool", &value)),
            },
            _ => return Err(convert_err("bool", &value)),
        };
        Ok(())
    }
}

impl FromSqlValue for String {
    fn scan_value(&mut self, value: SqlValue) -> Result<(), ScanError> {
        *self = match value {
            SqlValue::String(s) => s.into_owned(),
            SqlValue::Bytes(b) => {
                String::from_utf8(b).map_err(|_| ScanError::Convert {
                    expected: "String",
                    found: "bytes",
                })?
            }
            SqlValue::DateTime(dt) => dt
                .format(&Rfc3339)
                .map_err(|_| ScanError::Convert {
                    expected: "String",
                    found: "datetime",
                })?,
            SqlValue::Null => return Err(convert_err("String", &SqlValue::Null)),
            other => other.to_string(),
        };
        Ok(())
    }
}

impl FromSqlValue for Vec<u8> {
    fn scan_value(&mut self, value: SqlValue) -> Result<(), ScanError> {
        *self = match value {
            SqlValue::Bytes(b) => b,
            SqlValue::String(s) => s.into_owned().into_bytes(),
            other => return Err(convert_err("Vec<u8>", &other)),
        };
        Ok(())
    }
}

const SQL_DATETIME: &[FormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

impl FromSqlValue for OffsetDateTime {
    fn scan_value(&mut self, value: SqlValue) -> Result<(), ScanError> {
        let err = || convert_err("OffsetDateTime", &value);
        *self = match &value {
            SqlValue::DateTime(dt) => *dt,
            SqlValue::I64(ts) => OffsetDateTime::from_unix_timestamp(*ts).map_err(|_| err())?,
            SqlValue::String(s) => OffsetDateTime::parse(s, &Rfc3339)
                .or_else(|_| PrimitiveDateTime::parse(s, SQL_DATETIME).map(|p| p.assume_utc()))
                .map_err(|_| err())?,
            _ => return Err(err()),
        };
        Ok(())
    }
}

impl FromSqlValue for SqlValue {
    fn scan_value(&mut self, value: SqlValue) -> Result<(), ScanError> {
        *self = value;
        Ok(())
    }
}

// `NULL` 写入 `None`；其余值先写入初始值再包成 `Some`。
macro_rules! scan_option {
    ($($t:ty => $init:expr),+ $(,)?) => {
        $(impl FromSqlValue for Option<$t> {
            fn scan_value(&mut self, value: SqlValue) -> Result<(), ScanError> {
                if value.is_null() {
                    *self = None;
                    return Ok(());
                }
                let mut v: $t = $init;
                v.scan_value(value)?;
                *self = Some(v);
                Ok(())
            }
        })+
    };
}

scan_option!(
    i8 => 0,
    i16 => 0,
    i32 => 0,
    i64 => 0,
    isize => 0,
    u8 => 0,
    u16 => 0,
    u32 => 0,
    u64 => 0,
    usize => 0,
    f32 => 0.0,
    f64 => 0.0,
    bool => false,
    String => String::new(),
    Vec<u8> => Vec::new(),
    OffsetDateTime => OffsetDateTime::UNIX_EPOCH,
);

/// 列到目标的绑定，在扫描第一行之前按列名计算一次。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// 单列写入标量。
    Column,
    /// 每列对应的字段路径。
    Fields(Vec<Traversal>),
}

/// 可以接收一整行的目标。
pub trait Scan {
    fn bind(columns: &[String]) -> Result<Binding, ScanError>
    where
        Self: Sized;

    fn scan_row(&mut self, binding: &Binding, row: Vec<SqlValue>) -> Result<(), ScanError>;
}

fn bind_single(columns: &[String]) -> Result<Binding, ScanError> {
    if columns.len() != 1 {
        return Err(ScanError::ColumnCount {
            expected: 1,
            found: columns.len(),
        });
    }
    Ok(Binding::Column)
}

fn scan_single(dest: &mut dyn FromSqlValue, row: Vec<SqlValue>) -> Result<(), ScanError> {
    let found = row.len();
    let mut it = row.into_iter();
    match (it.next(), it.next()) {
        (Some(v), None) => dest.scan_value(v),
        _ => Err(ScanError::ColumnCount { expected: 1, found }),
    }
}

/// 结构体目标的绑定：每个列都必须能找到字段。
pub fn bind_struct<T: SqlStruct + 'static>(columns: &[String]) -> Result<Binding, ScanError> {
    let traversals = mapper().traversals_by_name::<T>(columns);
    if let Some(idx) = traversals.iter().position(|t| t.is_empty()) {
        return Err(ScanError::MissingDestination {
            column: columns[idx].clone(),
            type_name: T::NAME,
        });
    }
    Ok(Binding::Fields(traversals))
}

pub fn scan_struct<T: SqlStruct>(
    dest: &mut T,
    binding: &Binding,
    row: Vec<SqlValue>,
) -> Result<(), ScanError> {
    let Binding::Fields(traversals) = binding else {
        return Err(ScanError::BindingMismatch { type_name: T::NAME });
    };
    if traversals.len() != row.len() {
        return Err(ScanError::ColumnCount {
            expected: traversals.len(),
            found: row.len(),
        });
    }
    for (path, value) in traversals.iter().zip(row) {
        let field = leaf_mut(&mut *dest, path)
            .ok_or(ScanError::BindingMismatch { type_name: T::NAME })?;
        field.scan_value(value)?;
    }
    Ok(())
}

macro_rules! scan_scalar {
    ($($t:ty),+ $(,)?) => {
        $(
            impl Scan for $t {
                fn bind(columns: &[String]) -> Result<Binding, ScanError> {
                    bind_single(columns)
                }

                fn scan_row(&mut self, _binding: &Binding, row: Vec<SqlValue>) -> Result<(), ScanError> {
                    scan_single(self, row)
                }
            }
        )+
    };
}

macro_rules! map_entry_scalar {
    ($($t:ty),+ $(,)?) => {
        $(impl MapEntry for $t {
            type Row = Self;

            fn from_row(row: Self) -> Self {
                row
            }

            fn push_row(&mut self, row: Self) {
                *self = row;
            }
        })+
    };
}

scan_scalar!(
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    bool,
    String,
    Vec<u8>,
    OffsetDateTime,
    SqlValue,
);

// `Vec<u8>` 作为 `HashMap` 值时按 `Vec<T>` 规则逐行追加；时间类型请用 `Option<OffsetDateTime>`。
map_entry_scalar!(
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    bool,
    String,
    SqlValue,
);

impl<T> Scan for Option<T>
where
    Option<T>: FromSqlValue,
{
    fn bind(columns: &[String]) -> Result<Binding, ScanError> {
        bind_single(columns)
    }

    fn scan_row(&mut self, _binding: &Binding, row: Vec<SqlValue>) -> Result<(), ScanError> {
        scan_single(self, row)
    }
}

impl<T: Scan> Scan for Box<T> {
    fn bind(columns: &[String]) -> Result<Binding, ScanError> {
        T::bind(columns)
    }

    fn scan_row(&mut self, binding: &Binding, row: Vec<SqlValue>) -> Result<(), ScanError> {
        (**self).scan_row(binding, row)
    }
}

/// `HashMap` 的值类型：单条记录（后出现的覆盖先出现的）或 `Vec`（追加）。
pub trait MapEntry: Sized {
    type Row: Scan + Default;

    fn from_row(row: Self::Row) -> Self;

    fn push_row(&mut self, row: Self::Row);
}

impl<T: Scan + Default> MapEntry for Vec<T> {
    type Row = T;

    fn from_row(row: T) -> Self {
        vec![row]
    }

    fn push_row(&mut self, row: T) {
        self.push(row);
    }
}

impl<T: MapEntry> MapEntry for Box<T> {
    type Row = T::Row;

    fn from_row(row: T::Row) -> Self {
        Box::new(T::from_row(row))
    }

    fn push_row(&mut self, row: T::Row) {
        (**self).push_row(row);
    }
}

impl<T> MapEntry for Option<T>
where
    Option<T>: FromSqlValue,
{
    type Row = Self;

    fn from_row(row: Self) -> Self {
        row
    }

    fn push_row(&mut self, row: Self) {
        *self = row;
    }
}

/// 把结果集写入单个目标：没有行时返回 `NoRows`，多于一行时返回 `MultipleRows`。
pub fn scan_one<T: Scan + Default>(
    columns: &[String],
    rows: impl IntoIterator<Item = Vec<SqlValue>>,
) -> Result<T, ScanError> {
    let mut rows = rows.into_iter();
    let Some(first) = rows.next() else {
        return Err(ScanError::NoRows);
    };
    let binding = T::bind(columns)?;
    let mut dest = T::default();
    dest.scan_row(&binding, first)?;
    if rows.next().is_some() {
        return Err(ScanError::MultipleRows);
    }
    Ok(dest)
}

/// 每行生成一个新元素。
pub fn scan_all<T: Scan + Default>(
    columns: &[String],
    rows: impl IntoIterator<Item = Vec<SqlValue>>,
) -> Result<Vec<T>, ScanError> {
    let binding = T::bind(columns)?;
    rows.into_iter()
        .map(|row| {
            let mut dest = T::default();
            dest.scan_row(&binding, row)?;
            Ok(dest)
        })
        .collect()
}

/// 以 `key_column` 的值为键组装 `HashMap`。
pub fn scan_map<K, V>(
    columns: &[String],
    rows: impl IntoIterator<Item = Vec<SqlValue>>,
    key_column: &str,
) -> Result<HashMap<K, V>, ScanError>
where
    K: FromSqlValue + Default + Eq + Hash,
    V: MapEntry,
{
    let key_idx = columns
        .iter()
        .position(|c| c == key_column)
        .ok_or_else(|| ScanError::MissingKeyColumn {
            column: key_column.to_string(),
        })?;
    let binding = V::Row::bind(columns)?;

    let mut out: HashMap<K, V> = HashMap::new();
    for row in rows {
        let mut key = K::default();
        let raw = row.get(key_idx).cloned().ok_or(ScanError::ColumnCount {
            expected: columns.len(),
            found: row.len(),
        })?;
        key.scan_value(raw)?;

        let mut item = V::Row::default();
        item.scan_row(&binding, row)?;

        match out.entry(key) {
            Entry::Occupied(mut e) => e.get_mut().push_row(item),
            Entry::Vacant(e) => {
                e.insert(V::from_row(item));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{FromSqlValue, ScanError, scan_all, scan_map, scan_one};
    use std::collections::HashMap;
    use crate::value::SqlValue;
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn integers_accept_text_and_reject_overflow() {
        let mut n = 0_i32;
        n.scan_value(SqlValue::from("42")).unwrap();
        assert_eq!(n, 42);

        let mut small = 0_u8;
        assert_eq!(
            small.scan_value(SqlValue::I64(300)),
            Err(ScanError::Convert {
                expected: "u8",
                found: "integer"
            })
        );
    }

    #[test]
    fn null_only_fits_option() {
        let mut s = String::new();
        assert!(s.scan_value(SqlValue::Null).is_err());

        let mut o = Some(1_i64);
        o.scan_value(SqlValue::Null).unwrap();
        assert_eq!(o, None);
    }

    #[test]
    fn datetime_from_sqlite_text() {
        let mut t = time::OffsetDateTime::UNIX_EPOCH;
        t.scan_value(SqlValue::from("2024-03-01 08:09:10")).unwrap();
        assert_eq!(t, datetime!(2024-03-01 08:09:10 UTC));
    }

    #[test]
    fn scan_one_counts_rows() {
        let c = cols(&["n"]);
        assert_eq!(scan_one::<i64>(&c, Vec::new()), Err(ScanError::NoRows));
        assert_eq!(
            scan_one::<i64>(&c, vec![vec![SqlValue::I64(1)], vec![SqlValue::I64(2)]]),
            Err(ScanError::MultipleRows)
        );
        assert_eq!(scan_one::<i64>(&c, vec![vec![SqlValue::I64(5)]]), Ok(5));
    }

    #[test]
    fn scalar_requires_single_column() {
        let c = cols(&["a", "b"]);
        assert_eq!(
            scan_all::<String>(&c, Vec::new()),
            Err(ScanError::ColumnCount {
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn raw_values_as_destinations() {
        let c = cols(&["v"]);
        let v: SqlValue = scan_one(&c, vec![vec![SqlValue::from("x")]]).unwrap();
        assert_eq!(v, SqlValue::from("x"));

        let all: Vec<SqlValue> =
            scan_all(&c, vec![vec![SqlValue::Null], vec![SqlValue::I64(2)]]).unwrap();
        assert_eq!(all, vec![SqlValue::Null, SqlValue::I64(2)]);
    }

    #[test]
    fn scan_map_with_scalar_values() {
        let c = cols(&["k", "v"]);
        let rows = vec![
            vec![SqlValue::I64(1), SqlValue::from("a")],
            vec![SqlValue::I64(2), SqlValue::from("b")],
        ];
        let c1 = cols(&["k"]);
        let keys: HashMap<i64, SqlValue> =
            scan_map(&c1, vec![vec![SqlValue::I64(1)], vec![SqlValue::I64(2)]], "k").unwrap();
        assert_eq!(keys[&2], SqlValue::I64(2));
        assert_eq!(
            scan_map::<i64, String>(&c, rows, "k"),
            Err(ScanError::ColumnCount {
                expected: 1,
                found: 2
            })
        );
    }
}
