use super::*;
use crate::error::GateError;
use crate::name::NameRef;
use crate::value::{Record, Value};

fn sql(spec: &WhereSpec) -> String {
    WhereClause::build(spec).unwrap().to_sql()
}

fn prepared_names(spec: &WhereSpec) -> Vec<String> {
    WhereClause::build(spec)
        .unwrap()
        .prepared()
        .iter()
        .map(|p| p.name.qualified())
        .collect()
}

#[test]
fn test_named_equality() {
    let spec = WhereSpec::new().eq("status", "active");
    let clause = WhereClause::build(&spec).unwrap();
    assert_eq!(clause.to_sql(), "WHERE `status` = ?");
    assert_eq!(
        clause.prepared(),
        &[PreparedColumn::new(NameRef::new(None, "status"), "active")]
    );
}

#[test]
fn test_empty_spec_renders_nothing() {
    let clause = WhereClause::build(&WhereSpec::new()).unwrap();
    assert!(clause.is_empty());
    assert_eq!(clause.to_sql(), "");
}

#[test]
fn test_positional_strings_are_or_joined() {
    let spec = WhereSpec::new().expr("a = 1").expr("b = 2");
    assert_eq!(sql(&spec), "WHERE `a` = ? OR `b` = ?");
}

#[test]
fn test_named_entry_forces_and() {
    let spec = WhereSpec::new().eq("a", 1).expr("b > 2");
    assert_eq!(sql(&spec), "WHERE `a` = ? AND `b` > ?");

    let spec = WhereSpec::new().expr("a = 1").eq("b", 2).expr("c = 3");
    assert_eq!(sql(&spec), "WHERE `a` = ? AND `b` = ? AND `c` = ?");
}

#[test]
fn test_group_is_parenthesized_when_it_has_several_entries() {
    let spec = WhereSpec::new()
        .eq("status", "active")
        .group(WhereSpec::new().expr("age > 18").expr("vip = 1"));
    assert_eq!(sql(&spec), "WHERE `status` = ? AND (`age` > ? OR `vip` = ?)");
    assert_eq!(prepared_names(&spec), vec!["status", "age", "vip"]);
}

#[test]
fn test_single_entry_group_has_no_parentheses() {
    let spec = WhereSpec::new().group(WhereSpec::new().eq("a", 1));
    assert_eq!(sql(&spec), "WHERE `a` = ?");
}

#[test]
fn test_sibling_groups_are_or_joined() {
    let spec = WhereSpec::new()
        .group(WhereSpec::new().eq("a", 1).eq("b", 2))
        .group(WhereSpec::new().eq("c", 3).eq("d", 4));
    assert_eq!(
        sql(&spec),
        "WHERE (`a` = ? AND `b` = ?) OR (`c` = ? AND `d` = ?)"
    );
}

#[test]
fn test_group_between_positional_strings() {
    let spec = WhereSpec::new()
        .expr("a = 1")
        .group(WhereSpec::new().expr("x = 1").expr("y = 2"))
        .expr("c = 3");
    assert_eq!(sql(&spec), "WHERE `a` = ? OR (`x` = ? OR `y` = ?) OR `c` = ?");
}

#[test]
fn test_named_then_group_is_and_joined() {
    let spec = WhereSpec::new()
        .eq("a", 1)
        .group(WhereSpec::new().expr("x = 1").expr("y = 2"));
    assert_eq!(sql(&spec), "WHERE `a` = ? AND (`x` = ? OR `y` = ?)");
}

#[test]
fn test_deep_nesting() {
    let spec = WhereSpec::new().eq("a", 1).group(
        WhereSpec::new()
            .expr("b = 2")
            .group(WhereSpec::new().eq("c", 3).eq("d", 4)),
    );
    assert_eq!(
        sql(&spec),
        "WHERE `a` = ? AND (`b` = ? OR (`c` = ? AND `d` = ?))"
    );
    assert_eq!(prepared_names(&spec), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_empty_groups_are_skipped() {
    let spec = WhereSpec::new()
        .eq("a", 1)
        .group(WhereSpec::new())
        .eq("b", 2);
    assert_eq!(sql(&spec), "WHERE `a` = ? AND `b` = ?");
}

#[test]
fn test_string_with_several_triples_is_and_joined() {
    let spec = WhereSpec::new().expr("a = 1 b <= 2");
    assert_eq!(sql(&spec), "WHERE `a` = ? AND `b` <= ?");
    let clause = WhereClause::build(&spec).unwrap();
    assert_eq!(clause.prepared()[0].value, Value::Int(1));
    assert_eq!(clause.prepared()[1].value, Value::Int(2));
}

#[test]
fn test_column_reference_binds_nothing() {
    let spec = WhereSpec::new().expr("u.id = o.user_id");
    let clause = WhereClause::build(&spec).unwrap();
    assert_eq!(clause.to_sql(), "WHERE `u`.`id` = `o`.`user_id`");
    assert!(clause.prepared().is_empty());
}

#[test]
fn test_quoted_literal_keeps_spaces() {
    let spec = WhereSpec::new().expr("name = 'John Smith'");
    let clause = WhereClause::build(&spec).unwrap();
    assert_eq!(clause.to_sql(), "WHERE `name` = ?");
    assert_eq!(clause.prepared()[0].value, Value::from("John Smith"));
}

#[test]
fn test_operator_is_uppercased() {
    let spec = WhereSpec::new().expr("name like 'a%'");
    assert_eq!(sql(&spec), "WHERE `name` LIKE ?");
}

#[test]
fn test_null_comparisons() {
    let spec = WhereSpec::new().eq("deleted_at", Value::Null);
    let clause = WhereClause::build(&spec).unwrap();
    assert_eq!(clause.to_sql(), "WHERE `deleted_at` IS NULL");
    assert!(clause.prepared().is_empty());

    assert_eq!(
        sql(&WhereSpec::new().expr("a != NULL")),
        "WHERE `a` IS NOT NULL"
    );
}

#[test]
fn test_membership() {
    let spec = WhereSpec::new().in_list("id", [1, 2, 3]);
    let clause = WhereClause::build(&spec).unwrap();
    assert_eq!(clause.to_sql(), "WHERE `id` IN (?, ?, ?)");
    assert_eq!(clause.prepared().len(), 3);

    let empty = WhereSpec::new().in_list("id", Vec::<i64>::new());
    assert_eq!(sql(&empty), "WHERE 1=0");
}

#[test]
fn test_function_column_binds_inner_name() {
    let spec = WhereSpec::new().eq("lower(u.email)", "a@b.c");
    assert_eq!(sql(&spec), "WHERE LOWER(`u`.`email`) = ?");
    assert_eq!(prepared_names(&spec), vec!["u.email"]);
}

#[test]
fn test_malformed_conditions() {
    for bad in ["a =", "a = 1 b", "a ~ 1", "name = 'open"] {
        let err = WhereClause::build(&WhereSpec::new().expr(bad)).unwrap_err();
        assert!(
            matches!(err, GateError::MalformedCondition(_)),
            "{bad:?} gave {err:?}"
        );
    }
}

#[test]
fn test_from_record_is_all_named() {
    let spec = WhereSpec::from(Record::new().with("a", 1).with("b", "x"));
    assert_eq!(sql(&spec), "WHERE `a` = ? AND `b` = ?");
}

#[test]
fn test_placeholder_count_matches_prepared() {
    let specs = vec![
        WhereSpec::new().eq("a", 1).in_list("b", [1, 2]).expr("c = 3 d = 4"),
        WhereSpec::new()
            .expr("x.a = y.b")
            .group(WhereSpec::new().eq("n", Value::Null).expr("m > 1"))
            .in_list("z", Vec::<i64>::new()),
        WhereSpec::new().group(
            WhereSpec::new()
                .group(WhereSpec::new().expr("a = 'x y'").expr("b = 2"))
                .eq("c", 3),
        ),
    ];
    for spec in &specs {
        let clause = WhereClause::build(spec).unwrap();
        let markers = clause.to_sql().matches('?').count();
        assert_eq!(markers, clause.prepared().len(), "{}", clause.to_sql());
    }
}

#[test]
fn test_disjunction_flag() {
    let or = ConditionNode::compile(&WhereSpec::new().expr("a = 1").expr("b = 2")).unwrap();
    assert!(or.is_disjunction());
    let and = ConditionNode::compile(&WhereSpec::new().eq("a", 1).eq("b", 2)).unwrap();
    assert!(!and.is_disjunction());
}

#[test]
fn test_join_flag_phrases() {
    assert_eq!(JoinFlags::from(["LEFT", "OUTER"]).phrase(), "LEFT OUTER JOIN");
    assert_eq!(JoinFlags::from(["NATURAL", "RIGHT"]).phrase(), "NATURAL RIGHT JOIN");
    assert_eq!(JoinFlags::from(["LEFT", "RIGHT"]).phrase(), "RIGHT JOIN");
    assert_eq!(JoinFlags::from(["CROSS", "INNER"]).phrase(), "INNER JOIN");
    assert_eq!(JoinFlags::from(["CROSS"]).phrase(), "CROSS JOIN");
    assert_eq!(
        JoinFlags::from(["STRAIGHT_JOIN", "LEFT", "INNER"]).phrase(),
        "STRAIGHT_JOIN"
    );
    assert_eq!(JoinFlags::from(["OUTER"]).phrase(), "JOIN");
    assert_eq!(JoinFlags::parse("left outer").phrase(), "LEFT OUTER JOIN");
    assert_eq!(JoinFlags::parse("bogus").phrase(), "JOIN");
}

#[test]
fn test_join_with_column_pairs() {
    let mut joins = JoinClause::new();
    joins
        .join("orders o", [("o.user_id", "u.id")], "left")
        .unwrap();
    assert_eq!(
        joins.to_sql(),
        "LEFT JOIN `orders` AS `o` ON `o`.`user_id` = `u`.`id`"
    );
    assert_eq!(joins.aliases().collect::<Vec<_>>(), vec![("o", "orders")]);
}

#[test]
fn test_join_items_with_type_override() {
    let mut joins = JoinClause::new();
    joins
        .join(
            "orders",
            vec![
                OnItem::Compare("orders.user_id = users.id".to_string()),
                OnItem::Compare("orders.state = 1".to_string()),
                OnItem::Flags(JoinFlags::inner()),
            ],
            JoinFlags::none(),
        )
        .unwrap();
    assert_eq!(
        joins.to_sql(),
        "INNER JOIN `orders` ON `orders`.`user_id` = `users`.`id` AND `orders`.`state` = 1"
    );
}

#[test]
fn test_natural_join_has_no_on() {
    let mut joins = JoinClause::new();
    joins
        .join("profiles", JoinOn::None, ["NATURAL", "LEFT"])
        .unwrap();
    joins.join("tags t", "t.id = p.tag_id", "").unwrap();
    assert_eq!(
        joins.to_sql(),
        "NATURAL LEFT JOIN `profiles` JOIN `tags` AS `t` ON `t`.`id` = `p`.`tag_id`"
    );
}

#[test]
fn test_join_rejects_bad_predicates() {
    let mut joins = JoinClause::new();
    assert!(joins.join("orders", "a.x ~ b.y", "").is_err());
    assert!(joins.join("orders", "a.x = 'lit'", "").is_err());
    assert!(joins.join("orders", "a.x =", "").is_err());
    assert!(joins.is_empty());
}

#[test]
fn test_order_by() {
    let spec = OrderSpec::new().by("created_at", "desc").column("id");
    assert_eq!(
        OrderByClause::build(&spec).unwrap().to_sql(),
        "ORDER BY `created_at` DESC, `id`"
    );

    let spec = OrderSpec::new().by("a", "AsC");
    assert_eq!(OrderByClause::build(&spec).unwrap().to_sql(), "ORDER BY `a` ASC");
}

#[test]
fn test_order_by_rejects_unknown_direction() {
    let err = OrderByClause::build(&OrderSpec::new().by("a", "sideways")).unwrap_err();
    assert_eq!(err, GateError::InvalidOrderDirection("sideways".to_string()));
}

#[test]
fn test_limit() {
    let count = Limit::from(10);
    assert_eq!(count.to_sql(), "LIMIT ?");
    assert_eq!(count.params(), vec![Value::UInt(10)]);
    assert_eq!(count.types(), "i");

    let range = Limit::from((20, 10));
    assert_eq!(range.to_sql(), "LIMIT ?, ?");
    assert_eq!(range.params(), vec![Value::UInt(20), Value::UInt(10)]);
    assert_eq!(range.types(), "ii");
}
