#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::error::Error;
    use crate::expression::interpreter::apply_update;
    use crate::model::value::{AttributeValue, Item};

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    fn n(value: &str) -> AttributeValue {
        AttributeValue::N(value.to_string())
    }

    fn item_with(pairs: &[(&str, AttributeValue)]) -> Item {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn values_with(pairs: &[(&str, AttributeValue)]) -> HashMap<String, AttributeValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    // ============================================================
    // SET
    // ============================================================

    #[test]
    fn test_set_with_placeholder() {
        let item = item_with(&[("ID", s("x")), ("Email", s("old"))]);
        let values = values_with(&[(":e", s("new"))]);

        let updated = apply_update(&item, "SET Email = :e", &values).unwrap();
        assert_eq!(updated.get("Email"), Some(&s("new")));
        assert_eq!(updated.get("ID"), Some(&s("x")));
    }

    #[test]
    fn test_set_quoted_string_literal() {
        let item = item_with(&[("ID", s("x"))]);
        let updated = apply_update(&item, "SET Name = \"Alice\"", &HashMap::new()).unwrap();
        assert_eq!(updated.get("Name"), Some(&s("Alice")));
    }

    #[test]
    fn test_set_number_literal_is_canonicalized() {
        let item = item_with(&[("ID", s("x"))]);
        let updated = apply_update(&item, "SET Age = 5.0", &HashMap::new()).unwrap();
        assert_eq!(updated.get("Age"), Some(&n("5")));
    }

    #[test]
    fn test_set_bool_literal() {
        let item = item_with(&[("ID", s("x"))]);
        let updated = apply_update(&item, "SET Active = true", &HashMap::new()).unwrap();
        assert_eq!(updated.get("Active"), Some(&AttributeValue::BOOL(true)));
    }

    #[test]
    fn test_set_bare_word_falls_back_to_string() {
        let item = item_with(&[("ID", s("x"))]);
        let updated = apply_update(&item, "SET Status = pending", &HashMap::new()).unwrap();
        assert_eq!(updated.get("Status"), Some(&s("pending")));
    }

    #[test]
    fn test_set_unresolved_placeholder_errors() {
        let item = item_with(&[("ID", s("x"))]);
        let err = apply_update(&item, "SET Email = :missing", &HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidExpression(_)));
    }

    #[test]
    fn test_set_without_equals_errors() {
        let item = item_with(&[("ID", s("x"))]);
        let err = apply_update(&item, "SET Email :e", &HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidExpression(_)));
    }

    // ============================================================
    // REMOVE
    // ============================================================

    #[test]
    fn test_remove_multiple_attributes() {
        let item = item_with(&[("ID", s("x")), ("A", s("1")), ("B", s("2"))]);
        let updated = apply_update(&item, "REMOVE A B", &HashMap::new()).unwrap();
        assert!(!updated.contains_key("A"));
        assert!(!updated.contains_key("B"));
        assert!(updated.contains_key("ID"));
    }

    #[test]
    fn test_remove_missing_attribute_is_noop() {
        let item = item_with(&[("ID", s("x"))]);
        let updated = apply_update(&item, "REMOVE Nothing", &HashMap::new()).unwrap();
        assert_eq!(updated, item);
    }

    #[test]
    fn test_remove_without_names_errors() {
        let item = item_with(&[("ID", s("x"))]);
        let err = apply_update(&item, "REMOVE", &HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidExpression(_)));
    }

    // ============================================================
    // ADD
    // ============================================================

    #[test]
    fn test_add_integers() {
        let item = item_with(&[("ID", s("x")), ("Age", n("30"))]);
        let values = values_with(&[(":i", n("5"))]);

        let updated = apply_update(&item, "ADD Age :i", &values).unwrap();
        assert_eq!(updated.get("Age"), Some(&n("35")));
    }

    #[test]
    fn test_add_floats_shortest_roundtrip() {
        let item = item_with(&[("ID", s("x")), ("Score", n("1.5"))]);
        let values = values_with(&[(":d", n("2.25"))]);

        let updated = apply_update(&item, "ADD Score :d", &values).unwrap();
        assert_eq!(updated.get("Score"), Some(&n("3.75")));
    }

    #[test]
    fn test_add_literal_operand() {
        let item = item_with(&[("Count", n("7"))]);
        let updated = apply_update(&item, "ADD Count 3", &HashMap::new()).unwrap();
        assert_eq!(updated.get("Count"), Some(&n("10")));
    }

    #[test]
    fn test_add_missing_attribute_errors() {
        let item = item_with(&[("ID", s("x"))]);
        let values = values_with(&[(":i", n("5"))]);
        let err = apply_update(&item, "ADD Age :i", &values).unwrap_err();
        assert!(matches!(err, Error::InvalidExpression(_)));
    }

    #[test]
    fn test_add_non_number_target_errors() {
        let item = item_with(&[("Age", s("thirty"))]);
        let values = values_with(&[(":i", n("5"))]);
        let err = apply_update(&item, "ADD Age :i", &values).unwrap_err();
        assert!(matches!(err, Error::InvalidExpression(_)));
    }

    #[test]
    fn test_add_non_number_operand_errors() {
        let item = item_with(&[("Age", n("30"))]);
        let values = values_with(&[(":i", AttributeValue::BOOL(true))]);
        let err = apply_update(&item, "ADD Age :i", &values).unwrap_err();
        assert!(matches!(err, Error::InvalidExpression(_)));
    }

    // ============================================================
    // DELETE
    // ============================================================

    #[test]
    fn test_delete_scalar_removes_attribute() {
        let item = item_with(&[("ID", s("x")), ("Tmp", s("v"))]);
        let updated = apply_update(&item, "DELETE Tmp", &HashMap::new()).unwrap();
        assert!(!updated.contains_key("Tmp"));
    }

    #[test]
    fn test_delete_elements_from_string_set() {
        let item = item_with(&[(
            "Tags",
            AttributeValue::SS(vec!["a".to_string(), "b".to_string(), "c".to_string()]),
        )]);
        let values = values_with(&[(
            ":t",
            AttributeValue::SS(vec!["a".to_string(), "c".to_string()]),
        )]);

        let updated = apply_update(&item, "DELETE Tags :t", &values).unwrap();
        assert_eq!(
            updated.get("Tags"),
            Some(&AttributeValue::SS(vec!["b".to_string()]))
        );
    }

    #[test]
    fn test_delete_elements_from_number_set() {
        let item = item_with(&[(
            "Nums",
            AttributeValue::NS(vec!["1".to_string(), "2".to_string()]),
        )]);
        let values = values_with(&[(":n", AttributeValue::NS(vec!["2".to_string()]))]);

        let updated = apply_update(&item, "DELETE Nums :n", &values).unwrap();
        assert_eq!(
            updated.get("Nums"),
            Some(&AttributeValue::NS(vec!["1".to_string()]))
        );
    }

    #[test]
    fn test_delete_mismatched_set_types_removes_attribute() {
        let item = item_with(&[("Tags", AttributeValue::SS(vec!["a".to_string()]))]);
        let values = values_with(&[(":n", AttributeValue::NS(vec!["1".to_string()]))]);

        let updated = apply_update(&item, "DELETE Tags :n", &values).unwrap();
        assert!(!updated.contains_key("Tags"));
    }

    #[test]
    fn test_delete_missing_attribute_is_noop() {
        let item = item_with(&[("ID", s("x"))]);
        let values = values_with(&[(":t", AttributeValue::SS(vec!["a".to_string()]))]);
        let updated = apply_update(&item, "DELETE Tags :t", &values).unwrap();
        assert_eq!(updated, item);
    }

    #[test]
    fn test_delete_unresolved_placeholder_errors() {
        let item = item_with(&[("Tags", AttributeValue::SS(vec!["a".to_string()]))]);
        let err = apply_update(&item, "DELETE Tags :missing", &HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidExpression(_)));
    }

    // ============================================================
    // CLAUSE HANDLING
    // ============================================================

    #[test]
    fn test_combined_clauses() {
        let item = item_with(&[("ID", s("x")), ("Email", s("old")), ("Age", n("30"))]);
        let values = values_with(&[(":e", s("new"))]);

        let updated = apply_update(&item, "SET Email = :e REMOVE Age", &values).unwrap();
        assert_eq!(updated.get("Email"), Some(&s("new")));
        assert!(!updated.contains_key("Age"));
    }

    #[test]
    fn test_clauses_apply_left_to_right() {
        let item = item_with(&[("ID", s("x"))]);
        let values = values_with(&[(":a", s("first")), (":b", s("second"))]);

        let updated = apply_update(&item, "SET V = :a SET V = :b", &values).unwrap();
        assert_eq!(updated.get("V"), Some(&s("second")));
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let item = item_with(&[("ID", s("x")), ("Tmp", s("v"))]);
        let values = values_with(&[(":e", s("new"))]);

        let updated = apply_update(&item, "set Email = :e remove Tmp", &values).unwrap();
        assert_eq!(updated.get("Email"), Some(&s("new")));
        assert!(!updated.contains_key("Tmp"));
    }

    #[test]
    fn test_unknown_action_errors() {
        let item = item_with(&[("ID", s("x"))]);
        let err = apply_update(&item, "MERGE A B", &HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidExpression(_)));
    }

    #[test]
    fn test_empty_expression_errors() {
        let item = item_with(&[("ID", s("x"))]);
        assert!(matches!(
            apply_update(&item, "", &HashMap::new()),
            Err(Error::InvalidExpression(_))
        ));
        assert!(matches!(
            apply_update(&item, "   ", &HashMap::new()),
            Err(Error::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_original_item_is_untouched_on_failure() {
        let item = item_with(&[("ID", s("x")), ("Age", n("30"))]);
        let values = values_with(&[(":e", s("new"))]);

        // Second clause fails; caller's item must be unchanged.
        let err = apply_update(&item, "SET Email = :e ADD Missing :e", &values).unwrap_err();
        assert!(matches!(err, Error::InvalidExpression(_)));
        assert!(!item.contains_key("Email"));
        assert_eq!(item.get("Age"), Some(&n("30")));
    }
}
