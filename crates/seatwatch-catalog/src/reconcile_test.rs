use std::collections::HashSet;

use seatwatch_core::{FeedConfig, MatchingMode, ReferenceVariant};

use super::*;

fn live(id: Option<&str>, label: &str, available: Option<bool>) -> RawVariantObservation {
    RawVariantObservation {
        source_id: "live-0".to_string(),
        tier: FeedTier::Live,
        external_id: id.map(str::to_string),
        raw_label: label.to_string(),
        reported_available: available,
        inventory_count: None,
        inventory_policy: None,
    }
}

fn structural(id: Option<&str>, label: &str) -> RawVariantObservation {
    RawVariantObservation {
        source_id: "structural-1".to_string(),
        tier: FeedTier::Structural,
        external_id: id.map(str::to_string),
        raw_label: label.to_string(),
        reported_available: None,
        inventory_count: None,
        inventory_policy: None,
    }
}

fn with_inventory(
    mut obs: RawVariantObservation,
    policy: InventoryPolicy,
    count: i64,
) -> RawVariantObservation {
    obs.inventory_policy = Some(policy);
    obs.inventory_count = Some(count);
    obs
}

fn seat_reference() -> Vec<ReferenceVariant> {
    [
        ("Black Basketweave Cloth", vec!["black", "basketweave"]),
        ("Grey Rodeo Plaid Cloth", vec!["grey", "rodeo"]),
        ("Real Leather", vec!["leather"]),
    ]
    .into_iter()
    .map(|(name, keywords)| ReferenceVariant {
        name: name.to_string(),
        keywords: keywords.into_iter().map(str::to_string).collect(),
    })
    .collect()
}

fn group(reference: Vec<ReferenceVariant>) -> GroupConfig {
    GroupConfig {
        name: "Vario F".to_string(),
        link: "https://shop.example/vario-f".to_string(),
        feeds: vec![FeedConfig {
            id: Some("live-0".to_string()),
            tier: FeedTier::Live,
            url: "https://store.example/products/vario-f.js".to_string(),
            format: None,
            handle: None,
        }],
        reference,
    }
}

fn reconciler(matching: MatchingMode, duplicates: DuplicatePolicy) -> Reconciler {
    let settings = CatalogSettings {
        matching,
        duplicates,
        ..CatalogSettings::default()
    };
    Reconciler::new(&settings, &group(seat_reference())).unwrap()
}

fn keyword_reconciler() -> Reconciler {
    reconciler(MatchingMode::Keywords, DuplicatePolicy::BestStatus)
}

fn record<'a>(result: &'a Reconciliation, key: &str) -> &'a ReconciledRecord {
    result
        .records
        .iter()
        .find(|r| r.variant.match_key == key)
        .unwrap_or_else(|| panic!("no record with key {key:?}: {:?}", result.records))
}

// -----------------------------------------------------------------------
// Scenarios
// -----------------------------------------------------------------------

#[test]
fn live_available_variant_matches_reference_and_is_in_stock() {
    for matching in [MatchingMode::Keywords, MatchingMode::Substring] {
        let r = reconciler(matching, DuplicatePolicy::BestStatus);
        let result = r.reconcile(&[live(Some("1"), "Black / Black Basketweave", Some(true))]);

        let matching_rows: Vec<_> = result
            .records
            .iter()
            .filter(|rec| rec.variant.display_name == "Black Basketweave")
            .collect();
        assert_eq!(matching_rows.len(), 1, "{matching:?}: {:?}", result.records);
        assert_eq!(matching_rows[0].status, StockStatus::InStock);
        assert_eq!(
            matching_rows[0].source_of_truth,
            SourceOfTruth::Feed("live-0".to_string())
        );
        assert_eq!(result.records.len(), 3, "{matching:?}: no extra rows expected");
    }
}

#[test]
fn unreported_reference_variant_is_out_of_stock() {
    let result = keyword_reconciler().reconcile(&[]);
    let rec = record(&result, "Grey Rodeo Plaid Cloth");
    assert_eq!(rec.status, StockStatus::OutOfStock);
    assert_eq!(rec.source_of_truth, SourceOfTruth::AbsentFromLive);
    assert_eq!(rec.variant.display_name, "Grey Rodeo Plaid Cloth");
}

#[test]
fn production_annotation_means_pre_order() {
    let result = keyword_reconciler().reconcile(&[live(
        Some("7"),
        "Real Leather - CURRENTLY IN PRODUCTION",
        Some(true),
    )]);
    let rec = record(&result, "Real Leather");
    assert_eq!(rec.variant.display_name, "Real Leather");
    assert_eq!(rec.status, StockStatus::PreOrder);
}

#[test]
fn continue_policy_without_stock_means_pre_order() {
    let obs = with_inventory(
        live(Some("9"), "Grey / Grey Rodeo Plaid", Some(true)),
        InventoryPolicy::Continue,
        0,
    );
    let result = keyword_reconciler().reconcile(&[obs]);
    assert_eq!(
        record(&result, "Grey Rodeo Plaid Cloth").status,
        StockStatus::PreOrder
    );
}

#[test]
fn absence_from_live_feed_beats_structural_presence() {
    let observations = vec![
        live(Some("1"), "Black / Black Basketweave", Some(true)),
        structural(Some("1"), "Black / Black Basketweave"),
        structural(Some("2"), "Tan / Tan Canvas"),
    ];
    let result = keyword_reconciler().reconcile(&observations);
    let rec = record(&result, "Tan Canvas");
    assert_eq!(rec.status, StockStatus::OutOfStock);
    assert_eq!(rec.source_of_truth, SourceOfTruth::AbsentFromLive);
    assert_eq!(rec.external_ids, vec!["2".to_string()]);
}

// -----------------------------------------------------------------------
// Status refinement
// -----------------------------------------------------------------------

#[test]
fn pre_order_phrase_is_case_insensitive() {
    let result = keyword_reconciler().reconcile(&[live(
        Some("3"),
        "Black Basketweave (pre-order)",
        Some(true),
    )]);
    assert_eq!(
        record(&result, "Black Basketweave Cloth").status,
        StockStatus::PreOrder
    );
}

#[test]
fn unavailable_live_variant_is_out_of_stock_despite_phrase() {
    let result = keyword_reconciler().reconcile(&[live(
        Some("7"),
        "Real Leather - CURRENTLY IN PRODUCTION",
        Some(false),
    )]);
    let rec = record(&result, "Real Leather");
    assert_eq!(rec.status, StockStatus::OutOfStock);
    assert_eq!(rec.source_of_truth, SourceOfTruth::Feed("live-0".to_string()));
}

#[test]
fn continue_policy_with_stock_is_in_stock() {
    let obs = with_inventory(
        live(Some("9"), "Real Leather", Some(true)),
        InventoryPolicy::Continue,
        4,
    );
    let result = keyword_reconciler().reconcile(&[obs]);
    assert_eq!(record(&result, "Real Leather").status, StockStatus::InStock);
}

#[test]
fn deny_policy_without_stock_keeps_live_verdict() {
    let obs = with_inventory(
        live(Some("9"), "Real Leather", Some(true)),
        InventoryPolicy::Deny,
        0,
    );
    let result = keyword_reconciler().reconcile(&[obs]);
    assert_eq!(record(&result, "Real Leather").status, StockStatus::InStock);
}

#[test]
fn structural_inventory_refines_live_sighting_with_same_id() {
    let observations = vec![
        live(Some("9"), "Black / Real Leather", Some(true)),
        with_inventory(
            structural(Some("9"), "Black / Real Leather"),
            InventoryPolicy::Continue,
            -2,
        ),
    ];
    let result = keyword_reconciler().reconcile(&observations);
    assert_eq!(record(&result, "Real Leather").status, StockStatus::PreOrder);
}

#[test]
fn missing_live_flag_falls_back_to_inventory() {
    let in_stock = with_inventory(live(Some("1"), "Real Leather", None), InventoryPolicy::Deny, 3);
    let result = keyword_reconciler().reconcile(&[in_stock]);
    assert_eq!(record(&result, "Real Leather").status, StockStatus::InStock);

    let unknown = live(Some("1"), "Real Leather", None);
    let result = keyword_reconciler().reconcile(&[unknown]);
    assert_eq!(record(&result, "Real Leather").status, StockStatus::OutOfStock);
}

#[test]
fn structural_availability_flag_is_ignored() {
    let mut obs = structural(Some("5"), "Real Leather");
    obs.reported_available = Some(true);
    let result = keyword_reconciler().reconcile(&[obs]);
    let rec = record(&result, "Real Leather");
    assert_eq!(rec.status, StockStatus::OutOfStock);
    assert_eq!(rec.source_of_truth, SourceOfTruth::AbsentFromLive);
}

// -----------------------------------------------------------------------
// Identity, duplicates and ordering
// -----------------------------------------------------------------------

#[test]
fn external_id_links_relabelled_variant() {
    // Structural feed still carries the old label; the id ties them together.
    let observations = vec![
        structural(Some("42"), "Olive Canvas"),
        live(Some("42"), "Olive Canvas Mk2", Some(true)),
    ];
    let result = keyword_reconciler().reconcile(&observations);
    let rec = record(&result, "Olive Canvas");
    assert_eq!(rec.status, StockStatus::InStock);
    assert_eq!(rec.variant.display_name, "Olive Canvas Mk2");
    assert_eq!(result.records.len(), 4);
}

#[test]
fn best_status_collapses_live_batches() {
    let observations = vec![
        live(Some("10"), "Black Basketweave - SOLD OUT", Some(false)),
        live(Some("11"), "Black Basketweave - PRE-ORDER", Some(true)),
        live(Some("12"), "Black Basketweave", Some(true)),
        live(Some("13"), "Black Basketweave", Some(false)),
    ];
    let result = keyword_reconciler().reconcile(&observations);
    let rows: Vec<_> = result
        .records
        .iter()
        .filter(|r| r.variant.match_key == "Black Basketweave Cloth")
        .collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, StockStatus::InStock);
    assert_eq!(rows[0].external_ids, vec!["10", "11", "12", "13"]);
}

#[test]
fn keep_all_keeps_live_batches_adjacent() {
    let r = reconciler(MatchingMode::Keywords, DuplicatePolicy::KeepAll);
    let observations = vec![
        live(Some("10"), "Black Basketweave", Some(false)),
        live(Some("11"), "Black Basketweave - PRE-ORDER", Some(true)),
        structural(Some("10"), "Black Basketweave"),
    ];
    let result = r.reconcile(&observations);
    let keys: Vec<&str> = result
        .records
        .iter()
        .map(|r| r.variant.match_key.as_str())
        .collect();
    assert_eq!(
        keys,
        vec![
            "Black Basketweave Cloth",
            "Black Basketweave Cloth",
            "Grey Rodeo Plaid Cloth",
            "Real Leather",
        ]
    );
    assert_eq!(result.records[0].status, StockStatus::OutOfStock);
    assert_eq!(result.records[0].external_ids, vec!["10"]);
    assert_eq!(result.records[1].status, StockStatus::PreOrder);
    assert_eq!(result.records[1].external_ids, vec!["11"]);
}

#[test]
fn live_wins_display_name_over_structural() {
    let observations = vec![
        structural(Some("1"), "Black / Black Basketweave Cloth (2023)"),
        live(Some("1"), "Black / Black Basketweave", Some(true)),
    ];
    let result = keyword_reconciler().reconcile(&observations);
    assert_eq!(
        record(&result, "Black Basketweave Cloth").variant.display_name,
        "Black Basketweave"
    );
}

#[test]
fn reference_order_then_first_appearance() {
    let observations = vec![
        live(Some("5"), "Tan Canvas", Some(true)),
        live(Some("1"), "Real Leather", Some(true)),
        structural(Some("6"), "Brown Canvas"),
    ];
    let result = keyword_reconciler().reconcile(&observations);
    let names: Vec<&str> = result
        .records
        .iter()
        .map(|r| r.variant.match_key.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "Black Basketweave Cloth",
            "Grey Rodeo Plaid Cloth",
            "Real Leather",
            "Tan Canvas",
            "Brown Canvas",
        ]
    );
}

#[test]
fn no_reference_uses_insertion_order() {
    let settings = CatalogSettings::default();
    let r = Reconciler::new(&settings, &group(vec![])).unwrap();
    let result = r.reconcile(&[
        structural(None, "Grey Canvas"),
        live(None, "Black Canvas", Some(true)),
    ]);
    let names: Vec<&str> = result
        .records
        .iter()
        .map(|r| r.variant.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["Grey Canvas", "Black Canvas"]);
}

#[test]
fn substring_policy_first_match_wins() {
    let r = reconciler(MatchingMode::Substring, DuplicatePolicy::BestStatus);
    // "Leather" is contained in the "Real Leather" reference key.
    let result = r.reconcile(&[live(None, "Leather", Some(true))]);
    assert_eq!(result.records.len(), 3);
    let rec = record(&result, "Real Leather");
    assert_eq!(rec.variant.display_name, "Leather");
    assert_eq!(rec.status, StockStatus::InStock);
}

#[test]
fn duplicate_reference_entries_collapse() {
    let mut reference = seat_reference();
    reference.push(reference[0].clone());
    let r = Reconciler::new(&CatalogSettings::default(), &group(reference)).unwrap();
    assert_eq!(r.reference().len(), 3);
}

#[test]
fn blank_labels_are_skipped_and_counted() {
    let observations = vec![
        live(Some("1"), "   ", Some(true)),
        structural(Some("2"), ""),
        live(Some("3"), "Real Leather", Some(true)),
    ];
    let result = keyword_reconciler().reconcile(&observations);
    assert_eq!(result.skipped, 2);
    assert_eq!(result.records.len(), 3);
    assert_eq!(record(&result, "Real Leather").status, StockStatus::InStock);
}

#[test]
fn swatch_follows_record_display_name() {
    let result = keyword_reconciler().reconcile(&[live(
        Some("1"),
        "Black / Real Leather",
        Some(true),
    )]);
    assert_eq!(record(&result, "Real Leather").variant.color_hint, "#5C4033");
}

// -----------------------------------------------------------------------
// Properties
// -----------------------------------------------------------------------

fn mixed_observations() -> Vec<RawVariantObservation> {
    vec![
        live(Some("1"), "Black / Black Basketweave", Some(true)),
        live(Some("2"), "Black / Black Basketweave - PRE-ORDER", Some(true)),
        live(Some("3"), "Grey / Tan Canvas", Some(false)),
        with_inventory(
            live(Some("4"), "Real Leather", Some(true)),
            InventoryPolicy::Continue,
            0,
        ),
        structural(Some("1"), "Black / Black Basketweave"),
        structural(Some("5"), "Grey / Grey Rodeo Plaid"),
        structural(Some("6"), "Brown / Brown Canvas"),
        structural(None, "Tan Canvas"),
    ]
}

#[test]
fn best_status_keys_are_unique() {
    for matching in [MatchingMode::Keywords, MatchingMode::Substring] {
        let r = reconciler(matching, DuplicatePolicy::BestStatus);
        let result = r.reconcile(&mixed_observations());
        let mut seen = HashSet::new();
        for rec in &result.records {
            assert!(
                seen.insert(rec.variant.match_key.clone()),
                "{matching:?}: duplicate key {:?}",
                rec.variant.match_key
            );
        }
    }
}

#[test]
fn reconciliation_is_deterministic() {
    let r = keyword_reconciler();
    let observations = mixed_observations();
    assert_eq!(r.reconcile(&observations), r.reconcile(&observations));
}

#[test]
fn variants_absent_from_live_are_out_of_stock() {
    let result = keyword_reconciler().reconcile(&mixed_observations());
    assert_eq!(
        record(&result, "Grey Rodeo Plaid Cloth").status,
        StockStatus::OutOfStock
    );
    assert_eq!(record(&result, "Brown Canvas").status, StockStatus::OutOfStock);
    assert_eq!(record(&result, "Real Leather").status, StockStatus::PreOrder);
    assert_eq!(
        record(&result, "Black Basketweave Cloth").status,
        StockStatus::InStock
    );
}
