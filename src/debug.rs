//! 调试输出：把参数直接代入 SQL 文本。
//!
//! 安全警告：结果只用于日志与排查问题，值没有任何转义，绝不能拿去执行。

use crate::sqlizer::Sqlizer;

/// 渲染 `s` 并把每个 `?` 替换为 `'值'`，`??` 还原为 `?`。
///
/// 不会返回错误，出错时返回以 `[ToSql error: ` 或 `[DebugSqlizer error: ` 开头的文本。
/// 始终使用中性占位符渲染，因此与语句的占位符格式无关。
pub fn debug_sqlizer(s: &dyn Sqlizer) -> String {
    let (sql, args) = match s.to_sql_raw() {
        Ok(v) => v,
        Err(e) => return format!("[ToSql error: {e}]"),
    };

    let mut out = String::with_capacity(sql.len() + args.len() * 8);
    let mut rest = sql.as_str();
    let mut i = 0usize;

    while let Some(p) = rest.find('?') {
        out.push_str(&rest[..p]);
        if rest[p..].starts_with("??") {
            out.push('?');
            rest = &rest[p + 2..];
            continue;
        }
        let Some(arg) = args.get(i) else {
            return format!(
                "[DebugSqlizer error: too many placeholders in {rest:?} for {} args]",
                args.len()
            );
        };
        out.push('\'');
        out.push_str(&arg.to_string());
        out.push('\'');
        rest = &rest[p + 1..];
        i += 1;
    }

    if i < args.len() {
        return format!(
            "[DebugSqlizer error: not enough placeholders in {rest:?} for {} args]",
            args.len()
        );
    }
    out.push_str(rest);
    out
}
