//! 结构体与列之间的映射声明。
//!
//! Rust 没有运行时反射；这里通过 `macro_rules!`（[`sq_struct!`](crate::sq_struct)）为 struct 生成
//! 字段元数据与按下标访问字段的代码，效果等同于在字段上标注 `sq:"column"` 标签：
//!
//! - `columns { field: "column" }`：普通列，未声明的字段会被忽略；
//! - `embed { field: Type }`：嵌入结构体，其列直接提升到外层（不加前缀）；
//! - `nested { field: Type => "tag" }`：嵌套结构体，其列名加上 `tag.` 前缀。

use crate::scan::FromSqlValue;
use crate::value::SqlValue;

/// 字段的种类。
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Column,
    /// 嵌入结构体，携带其字段表。
    Embedded(fn() -> &'static [FieldMeta]),
    /// 带标签的嵌套结构体，携带其字段表。
    Nested(fn() -> &'static [FieldMeta]),
}

/// 单个字段的元数据，下标即其在 `FIELDS` 中的位置。
#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    /// Rust 字段名
    pub rust: &'static str,
    /// 列名；嵌套结构体为前缀标签，嵌入结构体为空串。
    pub db: &'static str,
    pub kind: FieldKind,
}

/// 读取到的字段。
pub enum Field<'a> {
    Value(SqlValue),
    Struct(&'a dyn Fields),
}

/// 可写入的字段。
pub enum FieldMut<'a> {
    Value(&'a mut dyn FromSqlValue),
    Struct(&'a mut dyn Fields),
}

/// 按下标访问字段（对象安全，供遍历嵌套路径使用）。
pub trait Fields {
    fn field(&self, index: usize) -> Option<Field<'_>>;

    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>>;
}

/// 由 [`sq_struct!`](crate::sq_struct) 为业务 struct 实现。
pub trait SqlStruct: Fields + Sized {
    /// 类型名，用于错误信息。
    const NAME: &'static str;
    const FIELDS: &'static [FieldMeta];

    fn fields() -> &'static [FieldMeta] {
        Self::FIELDS
    }
}

/// 声明 struct 的列映射，并生成 `SqlStruct`、`Fields`、`Scan`、`MapEntry` 实现。
///
/// ```ignore
/// #[derive(Debug, Default, Clone, PartialEq)]
/// struct Person {
///     id: i64,
///     name: String,
///     base: Audit,
///     address: Address,
///     cache: Vec<u8>, // 未声明，忽略
/// }
///
/// sq_struct! {
///     impl Person {
///         columns { id: "id", name: "name" }
///         embed { base: Audit }
///         nested { address: Address => "addr" }
///     }
/// }
/// ```
///
/// 结构体需要实现 `Default`；列字段的类型需要实现 `Clone + Into<SqlValue> + FromSqlValue`。
#[macro_export]
macro_rules! sq_struct {
    (
        impl $ty:ident {
            $(columns { $($col:ident : $db:literal),* $(,)? })?
            $(embed { $($emb:ident : $emb_ty:ty),* $(,)? })?
            $(nested { $($nest:ident : $nest_ty:ty => $tag:literal),* $(,)? })?
        }
    ) => {
        impl $crate::structs::SqlStruct for $ty {
            const NAME: &'static str = stringify!($ty);
            const FIELDS: &'static [$crate::structs::FieldMeta] = &[
                $($(
                    $crate::structs::FieldMeta {
                        rust: stringify!($col),
                        db: $db,
                        kind: $crate::structs::FieldKind::Column,
                    },
                )*)?
                $($(
                    $crate::structs::FieldMeta {
                        rust: stringify!($emb),
                        db: "",
                        kind: $crate::structs::FieldKind::Embedded(
                            <$emb_ty as $crate::structs::SqlStruct>::fields,
                        ),
                    },
                )*)?
                $($(
                    $crate::structs::FieldMeta {
                        rust: stringify!($nest),
                        db: $tag,
                        kind: $crate::structs::FieldKind::Nested(
                            <$nest_ty as $crate::structs::SqlStruct>::fields,
                        ),
                    },
                )*)?
            ];
        }

        impl $crate::structs::Fields for $ty {
            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field(&self, index: usize) -> Option<$crate::structs::Field<'_>> {
                let mut i = 0usize;
                $($(
                    if index == i {
                        return Some($crate::structs::Field::Value(
                            $crate::value::SqlValue::from(self.$col.clone()),
                        ));
                    }
                    i += 1;
                )*)?
                $($(
                    if index == i {
                        return Some($crate::structs::Field::Struct(&self.$emb));
                    }
                    i += 1;
                )*)?
                $($(
                    if index == i {
                        return Some($crate::structs::Field::Struct(&self.$nest));
                    }
                    i += 1;
                )*)?
                None
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field_mut(&mut self, index: usize) -> Option<$crate::structs::FieldMut<'_>> {
                let mut i = 0usize;
                $($(
                    if index == i {
                        return Some($crate::structs::FieldMut::Value(&mut self.$col));
                    }
                    i += 1;
                )*)?
                $($(
                    if index == i {
                        return Some($crate::structs::FieldMut::Struct(&mut self.$emb));
                    }
                    i += 1;
                )*)?
                $($(
                    if index == i {
                        return Some($crate::structs::FieldMut::Struct(&mut self.$nest));
                    }
                    i += 1;
                )*)?
                None
            }
        }

        impl $crate::scan::Scan for $ty {
            fn bind(columns: &[String]) -> Result<$crate::scan::Binding, $crate::scan::ScanError> {
                $crate::scan::bind_struct::<Self>(columns)
            }

            fn scan_row(
                &mut self,
                binding: &$crate::scan::Binding,
                row: Vec<$crate::value::SqlValue>,
            ) -> Result<(), $crate::scan::ScanError> {
                $crate::scan::scan_struct(self, binding, row)
            }
        }

        impl $crate::scan::MapEntry for $ty {
            type Row = Self;

            fn from_row(row: Self) -> Self {
                row
            }

            fn push_row(&mut self, row: Self) {
                *self = row;
            }
        }
    };
}
