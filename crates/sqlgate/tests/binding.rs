mod common;

use common::{setup, setup_with};
use sqlgate::query::{self, SqlQuery};
use sqlgate::{DbConfig, GateError, Record, ValidationReason, Value, WhereSpec};

#[tokio::test]
async fn select_binds_where_then_limit() {
    let (conn, db) = setup();

    query::select("users")
        .eq("id", 7)
        .eq("email", "a@x.io")
        .limit((0u64, 5u64))
        .execute(&db)
        .await
        .unwrap();

    let last = conn.last().unwrap();
    assert_eq!(
        last.sql,
        "SELECT * FROM `users` WHERE `id` = ? AND `email` = ? LIMIT ?, ?"
    );
    assert_eq!(last.types, "isii");
    assert_eq!(
        last.params,
        vec![
            Value::Int(7),
            Value::from("a@x.io"),
            Value::UInt(0),
            Value::UInt(5)
        ]
    );
}

#[tokio::test]
async fn aliases_resolve_to_joined_tables() {
    let (conn, db) = setup();

    query::select("users u")
        .columns(&["u.id", "o.total"])
        .inner_join("orders o", "o.user_id = u.id")
        .filter(WhereSpec::new().expr("o.total > 10.5"))
        .eq("u.id", 3)
        .execute(&db)
        .await
        .unwrap();

    let last = conn.last().unwrap();
    assert_eq!(last.types, "fi");
    assert_eq!(last.params, vec![Value::from("10.5"), Value::Int(3)]);
    // users and orders, each loaded once
    assert_eq!(conn.catalog_calls(), 2);
}

#[tokio::test]
async fn insert_binds_column_types() {
    let (conn, db) = setup();

    let row = Record::new()
        .with("email", "a@x.io")
        .with("score", "12.50")
        .with("avatar", vec![0u8, 1, 2]);
    query::insert("users").values(&row).execute(&db).await.unwrap();

    let last = conn.last().unwrap();
    assert_eq!(
        last.sql,
        "INSERT INTO `users` (`email`, `score`, `avatar`) VALUES (?, ?, ?)"
    );
    assert_eq!(last.types, "sfb");
}

#[tokio::test]
async fn update_binds_set_values_before_where_values() {
    let (conn, db) = setup();

    query::update("order_items")
        .set("qty", 3)
        .filter(Record::from([("order_id", 1), ("line_no", 2)]))
        .execute(&db)
        .await
        .unwrap();

    let last = conn.last().unwrap();
    assert_eq!(
        last.sql,
        "UPDATE `order_items` SET `qty` = ? WHERE `order_id` = ? AND `line_no` = ?"
    );
    assert_eq!(last.types, "iii");
    assert_eq!(last.params, vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
}

#[tokio::test]
async fn written_values_are_validated() {
    let (conn, db) = setup();

    let err = query::update("order_items")
        .set("qty", 256)
        .filter(Record::from([("order_id", 1), ("line_no", 2)]))
        .execute(&db)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GateError::ValidationFailed {
            column: "qty".to_string(),
            reason: ValidationReason::TooHigh,
            value: "256".to_string(),
        }
    );

    let long = "x".repeat(65);
    let err = query::insert("users")
        .values(&Record::from([("email", long.as_str())]))
        .execute(&db)
        .await
        .unwrap_err();
    assert_eq!(err.validation_reason(), Some(ValidationReason::TooLong));

    assert!(conn.executed().is_empty());
}

#[tokio::test]
async fn where_values_are_not_validated() {
    let (conn, db) = setup();

    query::select("users")
        .eq("id", "abc")
        .execute(&db)
        .await
        .unwrap();
    assert_eq!(conn.last().unwrap().types, "s");
}

#[tokio::test]
async fn huge_unsigned_values_bind_as_strings() {
    let (conn, db) = setup();

    query::delete("orders")
        .eq("id", u64::MAX)
        .execute(&db)
        .await
        .unwrap();
    let last = conn.last().unwrap();
    assert_eq!(last.types, "s");
    assert_eq!(last.params, vec![Value::UInt(u64::MAX)]);
}

#[tokio::test]
async fn unknown_column_fails_after_one_refresh() {
    let (conn, db) = setup();

    let err = query::select("users")
        .eq("nope", 1)
        .execute(&db)
        .await
        .unwrap_err();
    assert!(matches!(err, GateError::ColumnNotFound { ref column, .. } if column == "nope"));
    assert_eq!(conn.catalog_calls(), 2);
    assert!(conn.executed().is_empty());
}

#[tokio::test]
async fn build_errors_surface_before_any_io() {
    let (conn, db) = setup();

    let err = query::delete("users").execute(&db).await.unwrap_err();
    assert_eq!(err, GateError::MissingWhere("DELETE".to_string()));
    assert_eq!(conn.catalog_calls(), 0);
}

#[tokio::test]
async fn compact_mode_drops_spaces_around_commas() {
    let (conn, db) = setup_with(DbConfig::new().with_schema("shop").compact_sql(true));

    query::select("users")
        .columns(&["id", "email"])
        .limit((10u64, 20u64))
        .execute(&db)
        .await
        .unwrap();
    assert_eq!(
        conn.last().unwrap().sql,
        "SELECT `id`,`email` FROM `users` LIMIT ?,?"
    );
}

#[tokio::test]
async fn placeholders_match_bound_values() {
    let (conn, db) = setup();

    query::select("users u")
        .left_join("orders o", [("o.user_id", "u.id")])
        .filter(
            WhereSpec::new()
                .in_list("u.id", [1, 2, 3])
                .group(WhereSpec::new().expr("u.status = 'active'").expr("o.total >= 100")),
        )
        .order_by("u.id", "DESC")
        .limit(10)
        .execute(&db)
        .await
        .unwrap();

    let last = conn.last().unwrap();
    assert_eq!(last.sql.matches('?').count(), last.params.len());
    assert_eq!(last.params.len(), last.types.len());
    assert_eq!(last.types, "iiisfi");
}
