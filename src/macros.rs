//! 宏集合：参数列表、条件映射与布尔组合的简写。
//!
//! 列名等字符串参数统一通过 [`IntoStrings`] 接收，因此 `"a"`、`["a", "b"]`、`Vec<String>` 都可以直接传入。

/// 构造 `Vec<Arg>`：`args![1, "x", expr("NOW()", args![])]`。
#[macro_export]
macro_rules! args {
    () => {
        Vec::<$crate::Arg>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::Arg::from($value)),+]
    };
}

/// 构造 [`Expr`](crate::Expr)：`expr!("a = ? OR b = ?", 1, 2)`。
#[macro_export]
macro_rules! expr {
    ($sql:expr $(, $value:expr)* $(,)?) => {
        $crate::Expr::new($sql, $crate::args![$($value),*])
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __column_map {
    ($ty:ident; $($column:expr => $value:expr),* $(,)?) => {
        $crate::$ty::new()$(.with($column, $value))*
    };
}

/// `eq! {"a" => 1, "b" => vec![1, 2]}`
#[macro_export]
macro_rules! eq {
    ($($body:tt)*) => {
        $crate::__column_map!(Eq; $($body)*)
    };
}

/// `not_eq! {"a" => 1}`
#[macro_export]
macro_rules! not_eq {
    ($($body:tt)*) => {
        $crate::__column_map!(NotEq; $($body)*)
    };
}

#[macro_export]
macro_rules! lt {
    ($($body:tt)*) => {
        $crate::__column_map!(Lt; $($body)*)
    };
}

#[macro_export]
macro_rules! lt_or_eq {
    ($($body:tt)*) => {
        $crate::__column_map!(LtOrEq; $($body)*)
    };
}

#[macro_export]
macro_rules! gt {
    ($($body:tt)*) => {
        $crate::__column_map!(Gt; $($body)*)
    };
}

#[macro_export]
macro_rules! gt_or_eq {
    ($($body:tt)*) => {
        $crate::__column_map!(GtOrEq; $($body)*)
    };
}

#[macro_export]
macro_rules! like {
    ($($body:tt)*) => {
        $crate::__column_map!(Like; $($body)*)
    };
}

#[macro_export]
macro_rules! not_like {
    ($($body:tt)*) => {
        $crate::__column_map!(NotLike; $($body)*)
    };
}

/// `ilike! {"name" => "sq%"}`
#[macro_export]
macro_rules! ilike {
    ($($body:tt)*) => {
        $crate::__column_map!(ILike; $($body)*)
    };
}

#[macro_export]
macro_rules! not_ilike {
    ($($body:tt)*) => {
        $crate::__column_map!(NotILike; $($body)*)
    };
}

/// `and![eq! {"a" => 1}, "b IS NOT NULL"]`：元素可以是任意表达式或原始 SQL 字符串。
#[macro_export]
macro_rules! and {
    ($($pred:expr),* $(,)?) => {
        $crate::And(vec![$($crate::IntoSqlizer::into_sqlizer($pred)),*])
    };
}

#[macro_export]
macro_rules! or {
    ($($pred:expr),* $(,)?) => {
        $crate::Or(vec![$($crate::IntoSqlizer::into_sqlizer($pred)),*])
    };
}

pub trait IntoStrings {
    fn extend_into_strings(self, dst: &mut Vec<String>);
}

impl IntoStrings for String {
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.push(self);
    }
}

impl IntoStrings for &str {
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.push(self.to_string());
    }
}

impl<const N: usize, T> IntoStrings for [T; N]
where
    T: Into<String>,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.extend(self.into_iter().map(Into::into));
    }
}

impl<T> IntoStrings for &[T]
where
    T: Into<String> + Clone,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        for item in self {
            dst.push(item.clone().into());
        }
    }
}

impl<T> IntoStrings for &Vec<T>
where
    T: Into<String> + Clone,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        self.as_slice().extend_into_strings(dst);
    }
}

impl<T> IntoStrings for Vec<T>
where
    T: Into<String>,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.extend(self.into_iter().map(Into::into));
    }
}

#[doc(hidden)]
pub fn collect_into_strings<T>(value: T) -> Vec<String>
where
    T: IntoStrings,
{
    let mut dst = Vec::new();
    value.extend_into_strings(&mut dst);
    dst
}
