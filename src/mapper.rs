//! 列名与字段路径之间的映射，以及进程级缓存。

use crate::scan::FromSqlValue;
use crate::structs::{Field, FieldKind, FieldMeta, FieldMut, Fields, SqlStruct};
use crate::value::SqlValue;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// 从根结构体到叶子字段的下标路径；空路径表示未找到。
pub type Traversal = Vec<usize>;

/// 某个结构体类型的全部列映射（按声明顺序）。
#[derive(Debug, Default)]
pub struct StructMap {
    columns: Vec<(String, Traversal)>,
    index: HashMap<String, usize>,
}

impl StructMap {
    fn build(fields: &'static [FieldMeta]) -> Self {
        let mut map = Self::default();
        map.walk(fields, "", &mut Vec::new());
        map
    }

    fn walk(&mut self, fields: &'static [FieldMeta], prefix: &str, path: &mut Vec<usize>) {
        for (i, meta) in fields.iter().enumerate() {
            path.push(i);
            match meta.kind {
                FieldKind::Column => self.add(format!("{prefix}{}", meta.db), path.clone()),
                FieldKind::Embedded(inner) => self.walk(inner(), prefix, path),
                FieldKind::Nested(inner) => {
                    let nested = format!("{prefix}{}.", meta.db);
                    self.walk(inner(), &nested, path);
                }
            }
            path.pop();
        }
    }

    // 同名列取路径最短（层级最浅）的字段。
    fn add(&mut self, column: String, path: Traversal) {
        match self.index.get(&column) {
            Some(&i) if self.columns[i].1.len() <= path.len() => {}
            Some(&i) => self.columns[i].1 = path,
            None => {
                self.index.insert(column.clone(), self.columns.len());
                self.columns.push((column, path));
            }
        }
    }

    pub fn traversal(&self, column: &str) -> Option<&Traversal> {
        self.index.get(column).map(|&i| &self.columns[i].1)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// 列名到字段当前值的有序映射。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap(Vec<(String, SqlValue)>);

impl FieldMap {
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.0.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, SqlValue);
    type IntoIter = std::vec::IntoIter<(String, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// 按类型缓存 `StructMap` 的映射器。
#[derive(Debug, Default)]
pub struct Mapper {
    cache: RwLock<HashMap<TypeId, Arc<StructMap>>>,
}

static MAPPER: OnceLock<Mapper> = OnceLock::new();

/// 进程级唯一的映射器，首次使用时创建，缓存从不失效。
pub fn mapper() -> &'static Mapper {
    MAPPER.get_or_init(Mapper::default)
}

impl Mapper {
    pub fn type_map<T: SqlStruct + 'static>(&self) -> Arc<StructMap> {
        let id = TypeId::of::<T>();
        if let Some(m) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
        {
            return m.clone();
        }

        // 并发首次访问时可能重复计算，只保留先写入的结果。
        let built = Arc::new(StructMap::build(T::FIELDS));
        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(id)
            .or_insert(built)
            .clone()
    }

    /// 每个列名对应的字段路径，找不到的列得到空路径。
    pub fn traversals_by_name<T: SqlStruct + 'static>(
        &self,
        columns: &[impl AsRef<str>],
    ) -> Vec<Traversal> {
        let map = self.type_map::<T>();
        columns
            .iter()
            .map(|c| map.traversal(c.as_ref()).cloned().unwrap_or_default())
            .collect()
    }

    /// 取出结构体全部映射列的当前值。
    pub fn field_map<T: SqlStruct + 'static>(&self, value: &T) -> FieldMap {
        let map = self.type_map::<T>();
        FieldMap(
            map.columns
                .iter()
                .filter_map(|(col, path)| leaf(value, path).map(|v| (col.clone(), v)))
                .collect(),
        )
    }
}

/// 沿路径读取叶子字段的值。
pub(crate) fn leaf(root: &dyn Fields, path: &[usize]) -> Option<SqlValue> {
    let (&last, parents) = path.split_last()?;
    let mut cur = root;
    for &i in parents {
        match cur.field(i)? {
            Field::Struct(s) => cur = s,
            Field::Value(_) => return None,
        }
    }
    match cur.field(last)? {
        Field::Value(v) => Some(v),
        Field::Struct(_) => None,
    }
}

/// 沿路径取得叶子字段的可写引用。
pub(crate) fn leaf_mut<'a>(
    root: &'a mut dyn Fields,
    path: &[usize],
) -> Option<&'a mut dyn FromSqlValue> {
    let (&last, parents) = path.split_last()?;
    let mut cur = root;
    for &i in parents {
        cur = match cur.field_mut(i)? {
            FieldMut::Struct(s) => s,
            FieldMut::Value(_) => return None,
        };
    }
    match cur.field_mut(last)? {
        FieldMut::Value(v) => Some(v),
        FieldMut::Struct(_) => None,
    }
}
