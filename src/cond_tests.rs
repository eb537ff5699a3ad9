#[cfg(test)]
mod tests {
    use crate::{
        And, BuildError, Eq, ILike, NotEq, NotILike, NotLike, Or, SqlValue, Sqlizer, and, args,
        eq, expr, gt, gt_or_eq, ilike, like, lt, lt_or_eq, not_eq, not_ilike, not_like, or,
        select,
    };
    use pretty_assertions::assert_eq;

    fn render(s: &dyn Sqlizer) -> (String, Vec<SqlValue>) {
        s.to_sql().unwrap()
    }

    #[test]
    fn eq_orders_columns() {
        let (sql, args) = render(&eq! {"b" => 2, "a" => 1});
        assert_eq!(sql, "a = ? AND b = ?");
        assert_eq!(args, vec![SqlValue::I64(1), SqlValue::I64(2)]);
    }

    #[test]
    fn eq_null_and_lists() {
        let (sql, args) = render(&eq! {
            "a" => SqlValue::Null,
            "b" => None::<i64>,
            "c" => vec![1, 2, 3],
            "d" => Vec::<i64>::new(),
        });
        assert_eq!(sql, "a IS NULL AND b IS NULL AND c IN (?,?,?) AND (1=0)");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn not_eq_null_and_lists() {
        let (sql, args) = render(&not_eq! {
            "a" => SqlValue::Null,
            "b" => [1, 2],
            "c" => Vec::<String>::new(),
            "d" => "x",
        });
        assert_eq!(sql, "a IS NOT NULL AND b NOT IN (?,?) AND (1=1) AND d <> ?");
        assert_eq!(
            args,
            vec![SqlValue::I64(1), SqlValue::I64(2), SqlValue::from("x")]
        );
    }

    #[test]
    fn eq_with_expression_value() {
        let (sql, args) = render(&eq! {"a" => expr!("NOW()"), "b" => expr!("LOWER(?)", "X")});
        assert_eq!(sql, "a = NOW() AND b = LOWER(?)");
        assert_eq!(args, vec![SqlValue::from("X")]);
    }

    #[test]
    fn ordering_operators() {
        assert_eq!(render(&lt! {"a" => 1}).0, "a < ?");
        assert_eq!(render(&lt_or_eq! {"a" => 1}).0, "a <= ?");
        assert_eq!(render(&gt! {"a" => 1}).0, "a > ?");
        assert_eq!(render(&gt_or_eq! {"a" => 1, "b" => 2}).0, "a >= ? AND b >= ?");
    }

    #[test]
    fn ordering_operators_reject_null_and_lists() {
        assert_eq!(
            lt! {"a" => SqlValue::Null}.to_sql().unwrap_err(),
            BuildError::NullComparison { op: "<" }
        );
        assert_eq!(
            gt_or_eq! {"a" => vec![1, 2]}.to_sql().unwrap_err(),
            BuildError::ListComparison { op: ">=" }
        );
        assert_eq!(
            lt! {"a" => SqlValue::Null}.to_sql().unwrap_err().to_string(),
            "cannot use null with < operator"
        );
    }

    #[test]
    fn like_family() {
        assert_eq!(render(&like! {"name" => "%irrel"}).0, "name LIKE ?");
        assert_eq!(
            render(&NotLike::new().with("name", "%irrel")).0,
            "name NOT LIKE ?"
        );
        assert_eq!(render(&ILike::new().with("name", "sq%")).0, "name ILIKE ?");
        assert_eq!(
            render(&NotILike::new().with("name", "sq%")).0,
            "name NOT ILIKE ?"
        );
        assert_eq!(render(&not_like! {"name" => "%irrel"}).0, "name NOT LIKE ?");
        assert_eq!(render(&ilike! {"name" => "sq%"}).0, "name ILIKE ?");
        assert_eq!(
            render(&not_ilike! {"b" => "x%", "a" => "y%"}).0,
            "a NOT ILIKE ? AND b NOT ILIKE ?"
        );
        assert_eq!(
            NotLike::new().with("name", vec!["a", "b"]).to_sql().unwrap_err(),
            BuildError::ListComparison { op: "NOT LIKE" }
        );
    }

    #[test]
    fn conjunctions() {
        let (sql, args) = render(&or![
            eq! {"a" => 1},
            and![gt! {"b" => 2}, "c IS NOT NULL"],
            expr!("d = ?", 3),
        ]);
        assert_eq!(sql, "(a = ? OR (b > ? AND c IS NOT NULL) OR d = ?)");
        assert_eq!(
            args,
            vec![SqlValue::I64(1), SqlValue::I64(2), SqlValue::I64(3)]
        );
    }

    #[test]
    fn empty_conjunctions() {
        assert_eq!(render(&And::new()).0, "(1=1)");
        assert_eq!(render(&Or::new()).0, "(1=0)");
        assert_eq!(render(&and![Eq::new(), NotEq::new()]).0, "(1=1)");
    }

    #[test]
    fn conjunction_skips_empty_parts() {
        let (sql, _) = render(&and![Eq::new(), eq! {"a" => 1}]);
        assert_eq!(sql, "(a = ?)");
    }

    #[test]
    fn maps_collect_from_iterators() {
        let m: Eq = [("y", 2), ("x", 1)].into_iter().collect();
        assert_eq!(m.len(), 2);
        assert_eq!(render(&m).0, "x = ? AND y = ?");

        let mut m = m;
        m.insert("z", SqlValue::Null);
        assert_eq!(render(&m).0, "x = ? AND y = ? AND z IS NULL");
    }

    #[test]
    fn conditions_inside_statements() {
        let (sql, args) = select("*")
            .from("t")
            .where_(or![eq! {"a" => 1}, eq! {"b" => vec![2, 3]}])
            .where_expr("c = ?", args![4])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE (a = ? OR b IN (?,?)) AND c = ?");
        assert_eq!(args.len(), 4);
    }
}
