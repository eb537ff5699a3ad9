//! halo-sq：不可变链式 SQL 生成器。
//!
//! - 语句 builder：[`select`]、[`insert`]、[`replace`]、[`update`]、[`delete`]，以及携带默认配置的 [`StatementBuilder`]；
//! - 表达式：[`Expr`]、[`Eq`] 等比较映射、[`And`]/[`Or`]、[`CaseBuilder`]；
//! - 占位符：[`PlaceholderFormat`]，`??` 表示字面量 `?`；
//! - 结构体映射：[`sq_struct!`] 声明列，[`mapper`] 缓存字段路径；
//! - 执行：[`open`] 打开数据库，[`Executor`] 提供 `exec`/`query`/`get`/`get_all`，[`get_map`] 按键分组。
//!
//! ```ignore
//! use halo_sq::{PlaceholderFormat, Sqlizer, eq, select};
//!
//! let (sql, args) = select(["id", "name"])
//!     .from("users")
//!     .where_(eq! {"id" => 1})
//!     .placeholder_format(PlaceholderFormat::Dollar)
//!     .to_sql()?;
//! assert_eq!(sql, "SELECT id, name FROM users WHERE id = $1");
//! ```

pub mod case;
pub mod cond;
#[cfg(test)]
mod cond_tests;
pub mod db;
pub mod debug;
pub mod delete;
pub mod expr;
pub mod insert;
#[cfg(test)]
mod insert_tests;
pub mod macros;
pub mod mapper;
pub mod placeholder;
pub mod scan;
pub mod select;
pub mod sqlizer;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod statement;
mod string_builder;
pub mod structs;
pub mod update;
#[cfg(test)]
mod update_delete_tests;
pub mod value;

pub use crate::case::{CaseBuilder, case, case_value};
pub use crate::cond::{
    And, Eq, Gt, GtOrEq, ILike, Like, Lt, LtOrEq, NotEq, NotILike, NotLike, Or,
};
pub use crate::db::{
    Conn, Db, DbError, Driver, ExecResult, Executor, Row, Rows, Tx, get_map, open,
    register_driver,
};
pub use crate::debug::debug_sqlizer;
pub use crate::delete::DeleteBuilder;
pub use crate::expr::{Alias, ConcatExpr, Expr, alias, concat_expr, expr};
pub use crate::insert::InsertBuilder;
pub use crate::macros::IntoStrings;
pub use crate::mapper::{FieldMap, Mapper, StructMap, Traversal, mapper};
pub use crate::placeholder::{PlaceholderFormat, placeholders};
pub use crate::scan::{Binding, FromSqlValue, MapEntry, Scan, ScanError};
pub use crate::select::SelectBuilder;
pub use crate::sqlizer::{Arg, BuildError, IntoSqlizer, SqlResult, Sqlizer};
#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteConn, SqliteDriver};
pub use crate::statement::{StatementBuilder, delete, insert, replace, select, update};
pub use crate::structs::{FieldKind, FieldMeta, Fields, SqlStruct};
pub use crate::update::UpdateBuilder;
pub use crate::value::SqlValue;
