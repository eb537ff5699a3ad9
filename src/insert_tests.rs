#[cfg(test)]
mod tests {
    use crate::{
        BuildError, PlaceholderFormat, SqlValue, Sqlizer, args, eq, expr, insert, replace, select,
    };
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Record {
        pk: i64,
        comment: String,
    }

    crate::sq_struct! {
        impl Record {
            columns { pk: "pk", comment: "comment" }
        }
    }

    #[allow(dead_code)]
    #[derive(Debug, Default, Clone, PartialEq)]
    struct PartlyTagged {
        pk: i64,
        comment: String,
    }

    crate::sq_struct! {
        impl PartlyTagged {
            columns { pk: "pk" }
        }
    }

    #[test]
    fn insert_all_clauses() {
        let b = insert("")
            .prefix("WITH prefix AS ?", args![0])
            .into_table("a")
            .options(["DELAYED", "IGNORE"])
            .columns(["b", "c"])
            .values(args![1, 2])
            .values(args![3, expr!("? + 1", 4)])
            .suffix("RETURNING ?", args![5]);

        let (sql, args) = b.to_sql().unwrap();
        assert_eq!(
            sql,
            "WITH prefix AS ? \
             INSERT DELAYED IGNORE INTO a (b,c) VALUES (?,?),(?,? + 1) \
             RETURNING ?"
        );
        let expected: Vec<SqlValue> = (0..=5).map(SqlValue::from).collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn insert_errors() {
        assert_eq!(
            insert("").values(args![1]).to_sql().unwrap_err(),
            BuildError::MissingTable {
                statement: "insert"
            }
        );
        assert_eq!(
            insert("x").to_sql().unwrap_err(),
            BuildError::MissingValues
        );
    }

    #[test]
    #[should_panic]
    fn must_sql_panics() {
        insert("").must_sql();
    }

    #[test]
    fn insert_placeholders() {
        let b = insert("test").values(args![1, 2]);
        let (sql, _) = b
            .clone()
            .placeholder_format(PlaceholderFormat::Question)
            .to_sql()
            .unwrap();
        assert_eq!(sql, "INSERT INTO test VALUES (?,?)");

        let (sql, _) = b.placeholder_format(PlaceholderFormat::Dollar).to_sql().unwrap();
        assert_eq!(sql, "INSERT INTO test VALUES ($1,$2)");
    }

    #[test]
    fn set_map_sorts_columns() {
        let (sql, args) = insert("table")
            .set_map(eq! {"field3" => 3, "field1" => 1, "field2" => 2})
            .to_sql()
            .unwrap();
        assert_eq!(sql, "INSERT INTO table (field1,field2,field3) VALUES (?,?,?)");
        assert_eq!(
            args,
            vec![SqlValue::I64(1), SqlValue::I64(2), SqlValue::I64(3)]
        );
    }

    #[test]
    fn insert_from_select() {
        let sb = select("field1").from("table1").where_(eq! {"field1" => 1});
        let (sql, args) = insert("table2")
            .columns("field1")
            .select(sb)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO table2 (field1) SELECT field1 FROM table1 WHERE field1 = ?"
        );
        assert_eq!(args, vec![SqlValue::I64(1)]);
    }

    #[test]
    fn replace_keyword() {
        let (sql, _) = replace("table").values(args![1]).to_sql().unwrap();
        assert_eq!(sql, "REPLACE INTO table VALUES (?)");
    }

    #[test]
    fn on_conflict_update_columns() {
        let (sql, _) = insert("table")
            .columns(["field1", "field2", "field3"])
            .values(args!["one", "two", "three"])
            .on_conflict("field1")
            .update_columns(["field2", "field3"])
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO table (field1,field2,field3) VALUES (?,?,?) ON CONFLICT (field1) \
             DO UPDATE SET field2 = EXCLUDED.field2, field3 = EXCLUDED.field3"
        );
    }

    #[test]
    fn on_conflict_do_nothing_with_returning() {
        let (sql, _) = insert("t")
            .columns(["a", "b"])
            .values(args![1, 2])
            .on_conflict(["a", "b"])
            .do_nothing()
            .returning(["a", "b"])
            .placeholder_format(PlaceholderFormat::Dollar)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO t (a,b) VALUES ($1,$2) ON CONFLICT (a,b) DO NOTHING RETURNING a,b"
        );
    }

    #[test]
    fn on_conflict_needs_exactly_one_action() {
        let base = insert("t").values(args![1]).on_conflict("a");
        assert_eq!(
            base.clone().to_sql().unwrap_err(),
            BuildError::ConflictWithoutAction
        );
        assert_eq!(
            base.do_nothing().update_columns("b").to_sql().unwrap_err(),
            BuildError::ConflictActionAmbiguous
        );
    }

    #[test]
    fn struct_values_follow_columns() {
        let record = Record {
            pk: 1,
            comment: "foo".into(),
        };
        let (sql, args) = insert("table")
            .columns(["comment", "pk"])
            .struct_values(&record)
            .to_sql()
            .unwrap();
        assert_eq!(sql, "INSERT INTO table (comment,pk) VALUES (?,?)");
        assert_eq!(args, vec![SqlValue::from("foo"), SqlValue::I64(1)]);
    }

    #[test]
    #[should_panic(expected = "missing column `comment` in struct. Is it tagged with `sq:\"comment\"`?")]
    fn struct_values_panics_on_unmapped_column() {
        let record = PartlyTagged {
            pk: 1,
            comment: "foo".into(),
        };
        insert("table")
            .columns(["pk", "comment"])
            .struct_values(&record);
    }

    #[test]
    fn struct_uses_all_mapped_columns() {
        let record = Record {
            pk: 1,
            comment: "foo".into(),
        };
        let (sql, args) = insert("table").struct_(&record).to_sql().unwrap();
        assert_eq!(sql, "INSERT INTO table (pk,comment) VALUES (?,?)");
        assert_eq!(args, vec![SqlValue::I64(1), SqlValue::from("foo")]);
    }

    #[test]
    fn struct_matches_explicit_columns() {
        let record = Record {
            pk: 9,
            comment: "bar".into(),
        };
        let implicit = insert("table").struct_(&record).to_sql().unwrap();
        let explicit = insert("table")
            .columns(["pk", "comment"])
            .struct_values(&record)
            .to_sql()
            .unwrap();
        assert_eq!(implicit, explicit);
    }

    #[test]
    fn values_reject_list_cell() {
        assert_eq!(
            insert("t")
                .columns(["a", "tags"])
                .values(args![1, vec![2, 3]])
                .to_sql()
                .unwrap_err(),
            BuildError::ListValue {
                column: "tags".into()
            }
        );
        assert_eq!(
            insert("t").values(args![vec![1]]).to_sql().unwrap_err(),
            BuildError::ListValue {
                column: "#1".into()
            }
        );
    }
}
