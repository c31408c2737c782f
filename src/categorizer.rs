use crate::models::{Transaction, DEFAULT_CATEGORY};
use crate::rules::RuleSet;

pub struct CategorizeSummary {
    pub matched: usize,
    pub unmatched: usize,
}

/// Assign Category/Subcategory to every row. Rules run in set order and a
/// later match overwrites an earlier one; rows no rule matches keep
/// "other"/"other". Zero matches is not an error.
pub fn categorize(rows: &mut [Transaction], rules: &RuleSet) -> CategorizeSummary {
    for txn in rows.iter_mut() {
        txn.category = DEFAULT_CATEGORY.to_string();
        txn.subcategory = DEFAULT_CATEGORY.to_string();
        txn.is_manual = false;
    }

    let mut hit = vec![false; rows.len()];
    for rule in rules.iter() {
        for (txn, hit) in rows.iter_mut().zip(hit.iter_mut()) {
            if rule.matches(&txn.details) {
                txn.subcategory = rule.subcategory.clone();
                txn.category = rule.main_category.clone();
                *hit = true;
            }
        }
    }

    let matched = hit.iter().filter(|&&h| h).count();
    CategorizeSummary {
        matched,
        unmatched: rows.len() - matched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::CategoryRule;

    fn txn(details: &str) -> Transaction {
        Transaction::new(None, details.to_string(), -10.0)
    }

    fn rule(subcategory: &str, main_category: &str, patterns: &[&str]) -> CategoryRule {
        CategoryRule::new(
            subcategory,
            main_category,
            patterns.iter().map(|p| p.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_uber_eats_lands_in_restaurants() {
        let rules = RuleSet::from_rules(vec![rule(
            "restaurants",
            "food",
            &["UBER EATS", "DELIVEROO"],
        )]);
        let mut rows = vec![txn("UBER EATS PARIS")];
        let summary = categorize(&mut rows, &rules);
        assert_eq!(rows[0].category, "food");
        assert_eq!(rows[0].subcategory, "restaurants");
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.unmatched, 0);
    }

    #[test]
    fn test_unmatched_rows_stay_other() {
        let rules = RuleSet::from_rules(vec![rule("restaurants", "food", &["DELIVEROO"])]);
        let mut rows = vec![txn("PHARMACIE LAFAYETTE")];
        let summary = categorize(&mut rows, &rules);
        assert_eq!(rows[0].category, "other");
        assert_eq!(rows[0].subcategory, "other");
        assert!(!rows[0].is_manual);
        assert_eq!(summary.unmatched, 1);
    }

    #[test]
    fn test_later_rule_overwrites_earlier_match() {
        let rules = RuleSet::from_rules(vec![
            rule("shopping", "leisure", &["AMAZON"]),
            rule("subscriptions", "services", &["AMAZON PRIME"]),
        ]);
        let mut rows = vec![txn("AMAZON PRIME FR"), txn("AMAZON MARKETPLACE")];
        categorize(&mut rows, &rules);
        assert_eq!(rows[0].subcategory, "subscriptions");
        assert_eq!(rows[0].category, "services");
        assert_eq!(rows[1].subcategory, "shopping");
    }

    #[test]
    fn test_categorize_is_deterministic() {
        let rules = RuleSet::from_rules(vec![
            rule("restaurants", "food", &["UBER EATS"]),
            rule("transport", "travel", &["UBER"]),
        ]);
        let mut first = vec![txn("UBER EATS PARIS")];
        let mut second = vec![txn("UBER EATS PARIS")];
        categorize(&mut first, &rules);
        categorize(&mut second, &rules);
        // "UBER" also matches and runs later, so it wins both times.
        assert_eq!(first[0].subcategory, "transport");
        assert_eq!(first[0].subcategory, second[0].subcategory);
        assert_eq!(first[0].category, second[0].category);
    }

    #[test]
    fn test_empty_rule_set_is_a_noop() {
        let rules = RuleSet::default();
        let mut rows = vec![txn("ANYTHING")];
        let summary = categorize(&mut rows, &rules);
        assert_eq!(summary.matched, 0);
        assert_eq!(rows[0].category, "other");
    }
}
