#[cfg(test)]
mod tests {
    use crate::{
        BuildError, PlaceholderFormat, SqlValue, Sqlizer, and, args, case, case_value, delete, eq,
        expr, select, update,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn update_all_clauses() {
        let b = update("")
            .prefix("WITH prefix AS ?", args![0])
            .table("a")
            .set("b", expr!("? + 1", 1))
            .set_map(eq! {"c" => 2})
            .set("c1", case_value("status").when("1", "2").when("2", "1"))
            .set(
                "c2",
                case()
                    .when("a = 2", expr!("?", "foo"))
                    .when("a = 3", expr!("?", "bar")),
            )
            .set("c3", expr!("(?)", select("a").from("b")))
            .where_expr("d = ?", args![3])
            .order_by("e")
            .limit(4)
            .offset(5)
            .suffix("RETURNING ?", args![6]);

        let (sql, args) = b.to_sql().unwrap();
        assert_eq!(
            sql,
            "WITH prefix AS ? \
             UPDATE a SET b = ? + 1, c = ?, \
             c1 = CASE status WHEN 1 THEN 2 WHEN 2 THEN 1 END, \
             c2 = CASE WHEN a = 2 THEN ? WHEN a = 3 THEN ? END, \
             c3 = (SELECT a FROM b) \
             WHERE d = ? \
             ORDER BY e LIMIT 4 OFFSET 5 \
             RETURNING ?"
        );
        assert_eq!(
            args,
            vec![
                SqlValue::I64(0),
                SqlValue::I64(1),
                SqlValue::I64(2),
                SqlValue::from("foo"),
                SqlValue::from("bar"),
                SqlValue::I64(3),
                SqlValue::I64(6),
            ]
        );
    }

    #[test]
    fn update_errors() {
        assert_eq!(
            update("").set("x", 1).to_sql().unwrap_err(),
            BuildError::MissingTable {
                statement: "update"
            }
        );
        let err = update("x").to_sql().unwrap_err();
        assert_eq!(err, BuildError::MissingAssignments);
        assert_eq!(
            err.to_string(),
            "update statements must have at least one Set clause"
        );
    }

    #[test]
    fn update_placeholders() {
        let b = update("test").set("x", 1).set("y", 2);
        let (sql, _) = b.clone().to_sql().unwrap();
        assert_eq!(sql, "UPDATE test SET x = ?, y = ?");

        let (sql, _) = b.placeholder_format(PlaceholderFormat::Dollar).to_sql().unwrap();
        assert_eq!(sql, "UPDATE test SET x = $1, y = $2");
    }

    #[test]
    fn update_set_map_appends_in_key_order() {
        let (sql, args) = update("t")
            .set("a", 0)
            .set_map(eq! {"z" => 2, "m" => 1})
            .to_sql()
            .unwrap();
        assert_eq!(sql, "UPDATE t SET a = ?, m = ?, z = ?");
        assert_eq!(
            args,
            vec![SqlValue::I64(0), SqlValue::I64(1), SqlValue::I64(2)]
        );
    }

    #[test]
    fn update_from() {
        let (sql, args) = update("employees")
            .set("sales_count", expr!("sales_count + 1"))
            .from("accounts")
            .where_expr("accounts.name = ?", args!["ACME"])
            .where_("employees.id = accounts.sales_person")
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE employees SET sales_count = sales_count + 1 FROM accounts \
             WHERE accounts.name = ? AND employees.id = accounts.sales_person"
        );
        assert_eq!(args, vec![SqlValue::from("ACME")]);
    }

    #[test]
    fn update_from_subquery() {
        let (sql, _) = update("employees")
            .set("sales_count", 100)
            .from_select(select("id").from("accounts").where_(eq! {"name" => "ACME"}), "subquery")
            .where_("employees.account_id = subquery.id")
            .placeholder_format(PlaceholderFormat::Dollar)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE employees SET sales_count = $1 \
             FROM (SELECT id FROM accounts WHERE name = $2) AS subquery \
             WHERE employees.account_id = subquery.id"
        );
    }

    #[test]
    fn delete_all_clauses() {
        let b = delete("")
            .prefix("WITH prefix AS ?", args![0])
            .from("a")
            .where_expr("b = ?", args![1])
            .order_by("c")
            .limit(2)
            .offset(3)
            .suffix("RETURNING ?", args![4]);

        let (sql, args) = b.to_sql().unwrap();
        assert_eq!(
            sql,
            "WITH prefix AS ? DELETE FROM a WHERE b = ? ORDER BY c LIMIT 2 OFFSET 3 RETURNING ?"
        );
        assert_eq!(
            args,
            vec![SqlValue::I64(0), SqlValue::I64(1), SqlValue::I64(4)]
        );
    }

    #[test]
    fn delete_without_table_fails() {
        let err = delete("").to_sql().unwrap_err();
        assert_eq!(err, BuildError::MissingFrom);
        assert_eq!(err.to_string(), "delete statements must specify a From table");
    }

    #[test]
    fn delete_using_and_placeholders() {
        let (sql, args) = delete("films")
            .using("producers")
            .where_("producer_id = producers.id")
            .where_(and![eq! {"producers.name" => "foo"}])
            .placeholder_format(PlaceholderFormat::AtP)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "DELETE FROM films USING producers \
             WHERE producer_id = producers.id AND (producers.name = @p1)"
        );
        assert_eq!(args, vec![SqlValue::from("foo")]);
    }

    #[test]
    fn update_rejects_list_value() {
        let err = update("t").set("tags", vec![1, 2]).to_sql().unwrap_err();
        assert_eq!(
            err,
            BuildError::ListValue {
                column: "tags".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "cannot use array or slice as the value of column tags"
        );
    }

    #[test]
    fn delete_with_grouped_conditions() {
        let (sql, args) = delete("t")
            .where_(and![eq! {"c" => "v"}, eq! {"o" => 1}])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "DELETE FROM t WHERE (c = ? AND o = ?)");
        assert_eq!(args, vec![SqlValue::from("v"), SqlValue::I64(1)]);
    }
}
