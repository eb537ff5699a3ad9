//! 占位符格式：把中性的 `?` 改写为目标数据库的占位符语法。

use std::fmt;

/// 占位符风格。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaceholderFormat {
    /// `?`（MySQL/SQLite）。
    #[default]
    Question,
    /// `$1, $2, ...`（PostgreSQL）。
    Dollar,
    /// `:1, :2, ...`（Oracle）。
    Colon,
    /// `@p1, @p2, ...`（SQL Server）。
    AtP,
}

impl PlaceholderFormat {
    fn write_placeholder(self, index_1_based: usize, out: &mut String) {
        let prefix = match self {
            Self::Question => {
                out.push('?');
                return;
            }
            Self::Dollar => "$",
            Self::Colon => ":",
            Self::AtP => "@p",
        };
        out.push_str(prefix);
        out.push_str(&index_1_based.to_string());
    }

    /// 从左到右改写占位符。
    ///
    /// `??` 输出为字面量 `?` 且不占用参数序号；其余每个 `?` 依次替换为第 N 个占位符。
    pub fn replace_placeholders(self, sql: &str) -> String {
        let mut out = String::with_capacity(sql.len() + 8);
        let mut n = 0;
        let mut rest = sql;

        while let Some(p) = rest.find('?') {
            out.push_str(&rest[..p]);
            if rest[p + 1..].starts_with('?') {
                out.push('?');
                rest = &rest[p + 2..];
            } else {
                n += 1;
                self.write_placeholder(n, &mut out);
                rest = &rest[p + 1..];
            }
        }

        out.push_str(rest);
        out
    }
}

impl fmt::Display for PlaceholderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Question => "Question",
            Self::Dollar => "Dollar",
            Self::Colon => "Colon",
            Self::AtP => "AtP",
        };
        f.write_str(s)
    }
}

/// 生成 `count` 个以逗号分隔的 `?`，例如 `?,?,?`。
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}

#[cfg(test)]
mod tests {
    use super::{PlaceholderFormat, placeholders};
    use pretty_assertions::assert_eq;

    const SQL: &str = "x = ? AND y = ? AND z = ?";

    #[test]
    fn question_keeps_markers() {
        assert_eq!(PlaceholderFormat::Question.replace_placeholders(SQL), SQL);
    }

    #[test]
    fn numbered_formats() {
        assert_eq!(
            PlaceholderFormat::Dollar.replace_placeholders(SQL),
            "x = $1 AND y = $2 AND z = $3"
        );
        assert_eq!(
            PlaceholderFormat::Colon.replace_placeholders(SQL),
            "x = :1 AND y = :2 AND z = :3"
        );
        assert_eq!(
            PlaceholderFormat::AtP.replace_placeholders(SQL),
            "x = @p1 AND y = @p2 AND z = @p3"
        );
    }

    #[test]
    fn escaped_question_mark_consumes_no_index() {
        let sql = "SELECT '??' AS q, ? FROM t WHERE a ?? b AND c = ?";
        assert_eq!(
            PlaceholderFormat::Dollar.replace_placeholders(sql),
            "SELECT '?' AS q, $1 FROM t WHERE a ? b AND c = $2"
        );
        assert_eq!(
            PlaceholderFormat::Question.replace_placeholders("a ?? b ?"),
            "a ? b ?"
        );
    }

    #[test]
    fn trailing_question_mark() {
        assert_eq!(PlaceholderFormat::Colon.replace_placeholders("?"), ":1");
        assert_eq!(PlaceholderFormat::Colon.replace_placeholders(""), "");
    }

    #[test]
    fn numbered_output_maps_back_to_neutral_text() {
        let out = PlaceholderFormat::Dollar.replace_placeholders(SQL);
        let back = (1..=3).rev().fold(out, |acc, i| acc.replace(&format!("${i}"), "?"));
        assert_eq!(back, SQL);
    }

    #[test]
    fn rewriting_question_output_matches_direct_rewrite() {
        for format in [
            PlaceholderFormat::Dollar,
            PlaceholderFormat::Colon,
            PlaceholderFormat::AtP,
        ] {
            let twice = format.replace_placeholders(&PlaceholderFormat::Question.replace_placeholders(SQL));
            assert_eq!(twice, format.replace_placeholders(SQL), "{format}");
        }
    }

    #[test]
    fn escapes_are_spent_by_the_first_rewrite() {
        let sql = "x ?? y AND z = ?";
        let question = PlaceholderFormat::Question.replace_placeholders(sql);
        assert_eq!(question, "x ? y AND z = ?");
        assert_eq!(
            PlaceholderFormat::Dollar.replace_placeholders(&question),
            "x $1 y AND z = $2"
        );
        assert_eq!(
            PlaceholderFormat::Dollar.replace_placeholders(sql),
            "x ? y AND z = $1"
        );
    }

    #[test]
    fn placeholders_list() {
        assert_eq!(placeholders(0), "");
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?,?,?");
    }
}
