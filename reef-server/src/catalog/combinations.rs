//! Variant combination expansion and SKU derivation
//!
//! Pure functions: the Cartesian product over attribute-value selections, the
//! SKU derived from a combination, and the reconcile plan against the
//! existing variant set.
//!
//! SKU derivation is order-sensitive by contract: axes are crossed in request
//! order and value names concatenated in that order, so reordering attributes
//! in a request produces different SKUs for otherwise-identical variant sets
//! (and will orphan previously generated variants).

/// One selected attribute value inside a combination
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub attribute_id: String,
    pub attribute_name: String,
    pub value_idx: i64,
    pub value_name: String,
}

/// Cross the axes in input order, producing N1×N2×…×Nk combinations.
///
/// Starts from one empty combination; an axis with no values therefore
/// collapses the whole product to zero combinations.
pub fn expand_combinations(axes: &[Vec<Selection>]) -> Vec<Vec<Selection>> {
    let mut combinations: Vec<Vec<Selection>> = vec![vec![]];

    for axis in axes {
        let mut next = Vec::with_capacity(combinations.len() * axis.len());
        for combination in &combinations {
            for selection in axis {
                let mut extended = combination.clone();
                extended.push(selection.clone());
                next.push(extended);
            }
        }
        combinations = next;
    }

    combinations
}

/// `"SKU-" + join("-", value names in combination order)`
pub fn sku_for(combination: &[Selection]) -> String {
    let parts: Vec<&str> = combination.iter().map(|s| s.value_name.as_str()).collect();
    format!("SKU-{}", parts.join("-"))
}

/// Reconcile plan: what to create, update and delete to make the existing
/// variant set match the generated one.
#[derive(Debug, Clone, Default)]
pub struct ReconcilePlan {
    /// Generated SKUs that already exist (update stock/price in place)
    pub update: Vec<String>,
    /// Generated SKUs that do not exist yet, with their combinations
    pub create: Vec<(String, Vec<Selection>)>,
    /// Existing SKUs absent from the generated set (delete)
    pub delete: Vec<String>,
}

/// Plan the reconciliation of `existing` SKUs against the generated
/// combinations. Duplicate generated SKUs (identical value names across
/// combinations) are collapsed to their first occurrence.
pub fn plan_reconcile(existing: &[String], combinations: &[Vec<Selection>]) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();
    let mut generated: Vec<String> = Vec::with_capacity(combinations.len());

    for combination in combinations {
        let sku = sku_for(combination);
        if generated.contains(&sku) {
            continue;
        }
        generated.push(sku.clone());

        if existing.contains(&sku) {
            plan.update.push(sku);
        } else {
            plan.create.push((sku, combination.clone()));
        }
    }

    for sku in existing {
        if !generated.contains(sku) {
            plan.delete.push(sku.clone());
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(attribute: &str, values: &[&str]) -> Vec<Selection> {
        values
            .iter()
            .enumerate()
            .map(|(idx, name)| Selection {
                attribute_id: format!("attribute:{}", attribute.to_lowercase()),
                attribute_name: attribute.to_string(),
                value_idx: idx as i64,
                value_name: name.to_string(),
            })
            .collect()
    }

    fn skus(combinations: &[Vec<Selection>]) -> Vec<String> {
        combinations.iter().map(|c| sku_for(c)).collect()
    }

    #[test]
    fn test_two_by_two_expansion() {
        let axes = vec![axis("Color", &["Red", "Blue"]), axis("Size", &["S", "M"])];
        let combos = expand_combinations(&axes);

        assert_eq!(combos.len(), 4);
        assert_eq!(
            skus(&combos),
            vec!["SKU-Red-S", "SKU-Red-M", "SKU-Blue-S", "SKU-Blue-M"]
        );
    }

    #[test]
    fn test_three_axis_count() {
        let axes = vec![
            axis("Color", &["Red", "Blue"]),
            axis("Size", &["S", "M", "L"]),
            axis("Material", &["Cotton", "Wool"]),
        ];
        assert_eq!(expand_combinations(&axes).len(), 12);
    }

    #[test]
    fn test_single_axis() {
        let axes = vec![axis("Size", &["S", "M"])];
        assert_eq!(skus(&expand_combinations(&axes)), vec!["SKU-S", "SKU-M"]);
    }

    #[test]
    fn test_empty_axis_collapses_product() {
        let axes = vec![axis("Color", &["Red", "Blue"]), axis("Size", &[])];
        assert!(expand_combinations(&axes).is_empty());
    }

    #[test]
    fn test_sku_is_input_order_sensitive() {
        let color_first = vec![axis("Color", &["Red"]), axis("Size", &["S"])];
        let size_first = vec![axis("Size", &["S"]), axis("Color", &["Red"])];

        assert_eq!(skus(&expand_combinations(&color_first)), vec!["SKU-Red-S"]);
        assert_eq!(skus(&expand_combinations(&size_first)), vec!["SKU-S-Red"]);
    }

    #[test]
    fn test_plan_all_new() {
        let axes = vec![axis("Color", &["Red", "Blue"]), axis("Size", &["S", "M"])];
        let plan = plan_reconcile(&[], &expand_combinations(&axes));

        assert_eq!(plan.create.len(), 4);
        assert!(plan.update.is_empty());
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn test_plan_rerun_is_idempotent() {
        let axes = vec![axis("Color", &["Red", "Blue"]), axis("Size", &["S", "M"])];
        let combos = expand_combinations(&axes);

        let existing: Vec<String> = combos.iter().map(|c| sku_for(c)).collect();
        let plan = plan_reconcile(&existing, &combos);

        assert!(plan.create.is_empty());
        assert!(plan.delete.is_empty());
        assert_eq!(plan.update.len(), 4);
    }

    #[test]
    fn test_plan_dropping_a_value_deletes_its_skus() {
        let before = vec![axis("Color", &["Red", "Blue"]), axis("Size", &["S", "M"])];
        let existing: Vec<String> = expand_combinations(&before)
            .iter()
            .map(|c| sku_for(c))
            .collect();

        // Blue removed from the request
        let after = vec![axis("Color", &["Red"]), axis("Size", &["S", "M"])];
        let plan = plan_reconcile(&existing, &expand_combinations(&after));

        assert_eq!(plan.update, vec!["SKU-Red-S", "SKU-Red-M"]);
        assert!(plan.create.is_empty());
        let mut deleted = plan.delete.clone();
        deleted.sort();
        assert_eq!(deleted, vec!["SKU-Blue-M", "SKU-Blue-S"]);
    }

    #[test]
    fn test_plan_empty_generation_deletes_everything() {
        let existing = vec!["SKU-Red-S".to_string(), "SKU-Red-M".to_string()];
        let plan = plan_reconcile(&existing, &[]);

        assert!(plan.create.is_empty());
        assert!(plan.update.is_empty());
        assert_eq!(plan.delete.len(), 2);
    }

    #[test]
    fn test_duplicate_generated_skus_collapse() {
        // Two axes with the same value name generate colliding SKUs
        let axes = vec![axis("Finish", &["Matte", "Matte"])];
        let plan = plan_reconcile(&[], &expand_combinations(&axes));
        assert_eq!(plan.create.len(), 1);
        assert_eq!(plan.create[0].0, "SKU-Matte");
    }
}
