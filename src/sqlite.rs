//! 基于 rusqlite 的内置驱动，注册名为 `sqlite` 与 `sqlite3`。

use crate::db::{Conn, DbError, Driver, ExecResult, Rows};
use crate::value::SqlValue;
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, params_from_iter};
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    /// `source` 可以是文件路径或 URI（如 `file::memory:`）。
    fn open(&self, source: &str) -> Result<Box<dyn Conn>, DbError> {
        Ok(Box::new(SqliteConn::open(source)?))
    }
}

#[derive(Debug)]
pub struct SqliteConn {
    conn: Connection,
}

impl SqliteConn {
    pub fn open(source: &str) -> Result<Self, DbError> {
        Ok(Self {
            conn: Connection::open(source)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Conn for SqliteConn {
    fn exec(&mut self, sql: &str, args: &[SqlValue]) -> Result<ExecResult, DbError> {
        let before = self.conn.last_insert_rowid();
        let mut stmt = self.conn.prepare(sql)?;
        let n = stmt.execute(params_from_iter(args.iter()))?;
        let after = self.conn.last_insert_rowid();
        Ok(ExecResult {
            rows_affected: n as u64,
            last_insert_id: (n > 0 && after != before).then_some(after),
        })
    }

    fn query(&mut self, sql: &str, args: &[SqlValue]) -> Result<Rows, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let mut out = Vec::new();
        let mut rows = stmt.query(params_from_iter(args.iter()))?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(from_value_ref(row.get_ref(i)?));
            }
            out.push(values);
        }
        Ok(Rows::new(columns, out))
    }
}

fn from_value_ref(v: ValueRef<'_>) -> SqlValue {
    match v {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(n) => SqlValue::I64(n),
        ValueRef::Real(f) => SqlValue::F64(f),
        ValueRef::Text(t) => match std::str::from_utf8(t) {
            Ok(text) => SqlValue::from(text.to_string()),
            Err(_) => SqlValue::Bytes(t.to_vec()),
        },
        ValueRef::Blob(b) => SqlValue::Bytes(b.to_vec()),
    }
}

fn conversion_failure(e: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(e))
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Bool(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
            SqlValue::I64(n) => ToSqlOutput::Owned(Value::Integer(*n)),
            SqlValue::U64(n) => {
                ToSqlOutput::Owned(Value::Integer(i64::try_from(*n).map_err(conversion_failure)?))
            }
            SqlValue::F64(f) => ToSqlOutput::Owned(Value::Real(*f)),
            SqlValue::String(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlValue::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            SqlValue::DateTime(dt) => {
                ToSqlOutput::Owned(Value::Text(dt.format(&Rfc3339).map_err(conversion_failure)?))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteConn;
    use crate::db::Conn;
    use crate::value::SqlValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn values_round_trip_through_sqlite() {
        let mut conn = SqliteConn::open_in_memory().unwrap();
        let rows = conn
            .query(
                "SELECT ?, ?, ?, ?",
                &[
                    SqlValue::Bool(true),
                    SqlValue::U64(7),
                    SqlValue::from("x"),
                    SqlValue::Null,
                ],
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        let row: Vec<Vec<SqlValue>> = rows.collect();
        assert_eq!(
            row[0],
            vec![
                SqlValue::I64(1),
                SqlValue::I64(7),
                SqlValue::from("x"),
                SqlValue::Null
            ]
        );
    }

    #[test]
    fn unsigned_overflow_is_rejected() {
        let mut conn = SqliteConn::open_in_memory().unwrap();
        assert!(conn.query("SELECT ?", &[SqlValue::U64(u64::MAX)]).is_err());
    }

    #[test]
    fn invalid_utf8_text_comes_back_as_bytes() {
        let mut conn = SqliteConn::open_in_memory().unwrap();
        let rows: Vec<Vec<SqlValue>> = conn
            .query("SELECT CAST(X'FF61' AS TEXT), 'ok'", &[])
            .unwrap()
            .collect();
        assert_eq!(
            rows[0],
            vec![SqlValue::Bytes(vec![0xff, 0x61]), SqlValue::from("ok")]
        );
    }

    #[test]
    fn insert_id_only_reported_for_inserts() {
        let mut conn = SqliteConn::open_in_memory().unwrap();
        conn.exec("CREATE TABLE t (id INTEGER PRIMARY KEY, n INTEGER)", &[])
            .unwrap();

        let res = conn
            .exec("INSERT INTO t (n) VALUES (?)", &[SqlValue::I64(5)])
            .unwrap();
        assert_eq!(res.last_insert_id, Some(1));

        let res = conn
            .exec("UPDATE t SET n = ? WHERE id = ?", &[SqlValue::I64(6), SqlValue::I64(1)])
            .unwrap();
        assert_eq!(res.rows_affected, 1);
        assert_eq!(res.last_insert_id, None);

        let res = conn.exec("DELETE FROM t", &[]).unwrap();
        assert_eq!(res.rows_affected, 1);
        assert_eq!(res.last_insert_id, None);
    }
}
