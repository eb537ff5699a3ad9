//! 执行适配层：按驱动名打开连接，执行 builder 生成的语句并把结果扫描进目标。
//!
//! 驱动通过 [`register_driver`] 注册；启用 `sqlite` feature 时预置 `sqlite`/`sqlite3`。
//! [`Db`] 与 [`Tx`] 都实现 [`Executor`]，因此同一段代码可以在事务内外复用。

use crate::scan::{self, FromSqlValue, MapEntry, Scan, ScanError};
use crate::sqlizer::{BuildError, Sqlizer};
use crate::value::SqlValue;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, RwLock};

/// 执行层错误。
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("sql: unknown driver {0:?} (forgotten import?)")]
    UnknownDriver(String),
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("{0}")]
    Driver(String),
}

/// 非查询语句的执行结果。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// 本次执行新插入行的 id；UPDATE、DELETE 等未插入行的语句为 `None`。
    pub last_insert_id: Option<i64>,
}

/// 已全部读出的结果集。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    columns: Vec<String>,
    rows: VecDeque<Vec<SqlValue>>,
}

impl Rows {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            columns,
            rows: rows.into(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 恰好一行写入 `T`。
    pub fn scan_one<T: Scan + Default>(self) -> Result<T, ScanError> {
        let Self { columns, rows } = self;
        scan::scan_one(&columns, rows)
    }

    pub fn scan_all<T: Scan + Default>(self) -> Result<Vec<T>, ScanError> {
        let Self { columns, rows } = self;
        scan::scan_all(&columns, rows)
    }
}

impl Iterator for Rows {
    type Item = Vec<SqlValue>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.pop_front()
    }
}

/// `query_row` 的结果：错误延迟到 `scan` 时返回。
#[derive(Debug)]
pub struct Row {
    result: Result<Rows, DbError>,
}

impl Row {
    /// 写入第一行，多余的行被忽略；没有行时返回 `NoRows`。
    pub fn scan<T: Scan + Default>(self) -> Result<T, DbError> {
        let mut rows = self.result?;
        let first = rows.next().ok_or(ScanError::NoRows)?;
        let binding = T::bind(rows.columns())?;
        let mut dest = T::default();
        dest.scan_row(&binding, first)?;
        Ok(dest)
    }
}

/// 一条数据库连接。
pub trait Conn: Send {
    fn exec(&mut self, sql: &str, args: &[SqlValue]) -> Result<ExecResult, DbError>;

    fn query(&mut self, sql: &str, args: &[SqlValue]) -> Result<Rows, DbError>;

    fn begin(&mut self) -> Result<(), DbError> {
        self.exec("BEGIN", &[]).map(|_| ())
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.exec("COMMIT", &[]).map(|_| ())
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        self.exec("ROLLBACK", &[]).map(|_| ())
    }
}

/// 按数据源字符串打开连接。
pub trait Driver: Send + Sync {
    fn open(&self, source: &str) -> Result<Box<dyn Conn>, DbError>;
}

type Registry = RwLock<HashMap<String, Arc<dyn Driver>>>;

static DRIVERS: OnceLock<Registry> = OnceLock::new();

fn drivers() -> &'static Registry {
    DRIVERS.get_or_init(|| {
        #[allow(unused_mut)]
        let mut m: HashMap<String, Arc<dyn Driver>> = HashMap::new();
        #[cfg(feature = "sqlite")]
        {
            let sqlite: Arc<dyn Driver> = Arc::new(crate::sqlite::SqliteDriver);
            m.insert("sqlite".to_string(), sqlite.clone());
            m.insert("sqlite3".to_string(), sqlite);
        }
        RwLock::new(m)
    })
}

/// 注册驱动，同名驱动会被替换。
pub fn register_driver(name: impl Into<String>, driver: impl Driver + 'static) {
    let name = name.into();
    tracing::debug!(driver = %name, "register driver");
    drivers()
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .insert(name, Arc::new(driver));
}

/// 用驱动名与数据源打开数据库，例如 `open("sqlite", "file::memory:")`。
pub fn open(driver: &str, source: &str) -> Result<Db, DbError> {
    let d = drivers()
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .get(driver)
        .cloned()
        .ok_or_else(|| DbError::UnknownDriver(driver.to_string()))?;
    tracing::debug!(driver, "open database");
    Ok(Db::from_boxed(d.open(source)?))
}

/// 执行语句的入口，由 [`Db`] 与 [`Tx`] 实现。
pub trait Executor {
    /// 在底层连接上运行 `f`。
    fn run<R>(&self, f: impl FnOnce(&mut dyn Conn) -> Result<R, DbError>) -> Result<R, DbError>;

    fn exec(&self, query: &(impl Sqlizer + ?Sized)) -> Result<ExecResult, DbError> {
        let (sql, args) = query.to_sql()?;
        tracing::debug!(sql = %sql, args = args.len(), "exec");
        self.run(|conn| conn.exec(&sql, &args))
    }

    fn query(&self, query: &(impl Sqlizer + ?Sized)) -> Result<Rows, DbError> {
        let (sql, args) = query.to_sql()?;
        tracing::debug!(sql = %sql, args = args.len(), "query");
        self.run(|conn| conn.query(&sql, &args))
    }

    /// 查询单行。构建失败会 panic，执行错误延迟到 [`Row::scan`]。
    fn query_row(&self, query: &(impl Sqlizer + ?Sized)) -> Row {
        let (sql, args) = match query.to_sql() {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        };
        tracing::debug!(sql = %sql, args = args.len(), "query row");
        Row {
            result: self.run(|conn| conn.query(&sql, &args)),
        }
    }

    /// 查询恰好一行并写入 `T`（标量或 `sq_struct!` 声明的结构体）。
    fn get<T: Scan + Default>(&self, query: &(impl Sqlizer + ?Sized)) -> Result<T, DbError> {
        Ok(self.query(query)?.scan_one()?)
    }

    /// 每行写入一个新的 `T`。
    fn get_all<T: Scan + Default>(
        &self,
        query: &(impl Sqlizer + ?Sized),
    ) -> Result<Vec<T>, DbError> {
        Ok(self.query(query)?.scan_all()?)
    }
}

/// 以 `key_column` 的值为键收集结果。
///
/// `V` 为单条记录时同键的后一行覆盖前一行；`V` 为 `Vec<_>` 时同键的行按顺序追加。
pub fn get_map<K, V>(
    db: &impl Executor,
    query: &(impl Sqlizer + ?Sized),
    key_column: &str,
) -> Result<HashMap<K, V>, DbError>
where
    K: FromSqlValue + Default + Eq + Hash,
    V: MapEntry,
{
    let Rows { columns, rows } = db.query(query)?;
    Ok(scan::scan_map(&columns, rows, key_column)?)
}

/// 数据库句柄，内部串行化对连接的访问。
pub struct Db {
    conn: Mutex<Box<dyn Conn>>,
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db").finish_non_exhaustive()
    }
}

impl Db {
    pub fn from_conn(conn: impl Conn + 'static) -> Self {
        Self::from_boxed(Box::new(conn))
    }

    fn from_boxed(conn: Box<dyn Conn>) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// 直接访问底层连接（用于执行建表等原始 SQL）。
    pub fn conn(&self) -> MutexGuard<'_, Box<dyn Conn>> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 开启事务。事务存活期间持有连接，在同一线程上通过 `Db` 执行会死锁。
    pub fn begin(&self) -> Result<Tx<'_>, DbError> {
        let mut conn = self.conn();
        conn.begin()?;
        tracing::trace!("transaction begin");
        Ok(Tx {
            conn: RefCell::new(conn),
            finished: false,
        })
    }

    /// 在事务中运行 `f`：返回 `Ok` 时提交，返回 `Err` 时回滚并原样返回错误。
    ///
    /// 闭包内只能通过传入的 `Tx` 执行，使用外层 `Db` 会死锁。
    pub fn with_tx<T>(
        &self,
        f: impl FnOnce(&Tx<'_>) -> Result<T, DbError>,
    ) -> Result<T, DbError> {
        let tx = self.begin()?;
        match f(&tx) {
            Ok(v) => {
                tx.commit()?;
                Ok(v)
            }
            Err(e) => {
                if let Err(re) = tx.rollback() {
                    tracing::warn!(error = %re, "rollback failed");
                }
                Err(e)
            }
        }
    }
}

impl Executor for Db {
    fn run<R>(&self, f: impl FnOnce(&mut dyn Conn) -> Result<R, DbError>) -> Result<R, DbError> {
        let mut conn = self.conn();
        f(&mut **conn)
    }
}

/// 进行中的事务；未提交就被丢弃时自动回滚。
pub struct Tx<'a> {
    conn: RefCell<MutexGuard<'a, Box<dyn Conn>>>,
    finished: bool,
}

impl std::fmt::Debug for Tx<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tx")
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl Tx<'_> {
    pub fn commit(mut self) -> Result<(), DbError> {
        let res = self.conn.get_mut().commit();
        // 提交失败时交给 Drop 回滚
        self.finished = res.is_ok();
        tracing::trace!(ok = res.is_ok(), "transaction commit");
        res
    }

    pub fn rollback(mut self) -> Result<(), DbError> {
        self.finished = true;
        tracing::trace!("transaction rollback");
        self.conn.get_mut().rollback()
    }
}

impl Executor for Tx<'_> {
    fn run<R>(&self, f: impl FnOnce(&mut dyn Conn) -> Result<R, DbError>) -> Result<R, DbError> {
        let mut conn = self.conn.borrow_mut();
        f(&mut ***conn)
    }
}

impl Drop for Tx<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::trace!("transaction dropped, rolling back");
        if let Err(e) = self.conn.get_mut().rollback() {
            tracing::warn!(error = %e, "rollback on drop failed");
        }
    }
}
