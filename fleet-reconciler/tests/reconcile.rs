//! End-to-end reconciliation from raw registry text and inventory YAML.

use fleet_reconciler::engine::{reconcile, ReconcileInput};
use fleet_reconciler::inventory::{flatten, parse_inventory};
use fleet_reconciler::registry::{parse_registry, RegistryFormat};
use fleet_reconciler::report::{ReportContext, ReportRenderer};
use fleet_reconciler::summary::summarize;
use fleet_reconciler::{Clock, HtmlRenderer, MockClock, ReconcileConfig, Reconciliation, TableRenderer, TextRenderer};
use fleet_schema::{Discrepancy, DiscrepancyKind};

fn run(registry: &str, inventory: &str) -> Reconciliation {
    let config = ReconcileConfig::default();
    let registry = parse_registry::<fn(&str, &str)>(registry, &config.registry_format, None);
    let document = parse_inventory(inventory).expect("inventory parses");
    let flat = flatten(&document.root, &config);
    reconcile(&ReconcileInput::new(&registry, &flat, &config))
}

const BALANCED_INVENTORY: &str = r#"
all:
  children:
    region:
      children:
        l_aja_cnhk01:
          hosts:
            lcnhk01efs01:
              cells: [cell1]
            lcnhk01efs02:
              cells: [cell1]
    servertype_dev:
      hosts:
        lcnhk01efs01:
    servertype_prod:
      hosts:
        lcnhk01efs02:
    controlgroup_a:
      hosts:
        lcnhk01efs01:
        lcnhk01efs02:
"#;

const BALANCED_REGISTRY: &str = "lcnhk01efs01,cell1,dev\nlcnhk01efs02,cell1,prod\n";

// ===========================================
// Scenario Tests
// ===========================================

#[test]
fn test_clean_fleet_end_to_end() {
    let result = run(BALANCED_REGISTRY, BALANCED_INVENTORY);
    assert!(result.is_clean(), "{:?}", result.discrepancies());
}

#[test]
fn test_partial_cell_mismatch() {
    let registry = "serverA,cell1,other\nserverA,cell2,other\n";
    let inventory = "all:\n  children:\n    l_aja_test01:\n      hosts:\n        serverA:\n          cells: [cell1]\n";
    let result = run(registry, inventory);

    let mismatches: Vec<_> = result.of_kind(DiscrepancyKind::CellMismatch).collect();
    assert_eq!(mismatches.len(), 1);
    match mismatches[0] {
        Discrepancy::CellMismatch { server, missing, extra, .. } => {
            assert_eq!(server, "serverA");
            assert_eq!(missing.iter().collect::<Vec<_>>(), vec!["cell2"]);
            assert!(extra.is_empty());
        }
        other => panic!("unexpected record {other:?}"),
    }
}

#[test]
fn test_control_group_site_imbalance() {
    let registry = "\
a1,cell1,dev
a2,cell1,dev
a3,cell1,prod
b1,cell1,dev
b2,cell1,prod
";
    let inventory = r#"
all:
  children:
    controlgroup_a:
      hosts:
        a1:
        a2:
        a3:
    controlgroup_b:
      hosts:
        b1:
        b2:
"#;
    let result = run(registry, inventory);
    let imbalances: Vec<_> = result.of_kind(DiscrepancyKind::ControlGroupImbalance).collect();

    assert_eq!(imbalances.len(), 1);
    assert!(matches!(
        imbalances[0],
        Discrepancy::ControlGroupImbalance { site, control_group, dev_count: 2, prod_count: 1, .. }
            if site == "cell1" && control_group == "controlgroup_a"
    ));
}

#[test]
fn test_new_server_gets_suggested_group() {
    let registry = format!("{BALANCED_REGISTRY}lkrkr0pefs03,cell1,prod\n");
    let result = run(&registry, BALANCED_INVENTORY);
    let missing: Vec<_> = result.of_kind(DiscrepancyKind::MissingInInventory).collect();

    assert_eq!(missing.len(), 1);
    assert!(matches!(
        missing[0],
        Discrepancy::MissingInInventory { server, suggested_group, .. }
            if server == "lkrkr0pefs03" && suggested_group == "l_aja_kray01sr1"
    ));
}

#[test]
fn test_unknown_name_suggests_unknown() {
    let registry = format!("{BALANCED_REGISTRY}xyz123,cell1,dev\n");
    let result = run(&registry, BALANCED_INVENTORY);
    assert!(result.discrepancies().iter().any(|d| matches!(
        d,
        Discrepancy::MissingInInventory { server, suggested_group, .. }
            if server == "xyz123" && suggested_group == "Unknown"
    )));
}

#[test]
fn test_missing_inventory_root_is_fatal() {
    assert!(parse_inventory("children: {}\n").is_err());
}

// ===========================================
// Property Tests
// ===========================================

#[test]
fn test_registry_record_order_does_not_matter() {
    let lines = [
        "lcnhk01efs02,cell1,prod",
        "lcnhk01efs01,cell1,dev",
        "lcnhk01efs01,cell2,dev",
        "lsgsg01efs01,cell7,prod",
    ];
    let forward = run(&lines.join("\n"), BALANCED_INVENTORY);
    let reversed: Vec<_> = lines.iter().rev().copied().collect();
    let backward = run(&reversed.join("\n"), BALANCED_INVENTORY);
    assert_eq!(forward, backward);
}

#[test]
fn test_reconcile_twice_is_identical() {
    let registry = format!("{BALANCED_REGISTRY}lkrkr0pefs03,cell1,prod\nzz01,cell9,dev\n");
    assert_eq!(run(&registry, BALANCED_INVENTORY), run(&registry, BALANCED_INVENTORY));
}

#[test]
fn test_tab_separated_registry() {
    let config = ReconcileConfig::default().with_registry_format(RegistryFormat::tab());
    let registry = parse_registry::<fn(&str, &str)>(
        "lcnhk01efs01\tcell1\tdev\nlcnhk01efs02\tcell1\tprod\n",
        &config.registry_format,
        None,
    );
    let document = parse_inventory(BALANCED_INVENTORY).unwrap();
    let flat = flatten(&document.root, &config);
    assert!(reconcile(&ReconcileInput::new(&registry, &flat, &config)).is_clean());
}

// ===========================================
// Output Tests
// ===========================================

#[test]
fn test_every_renderer_reports_drift() {
    let registry = format!("{BALANCED_REGISTRY}lkrkr0pefs03,cell1,prod\n");
    let result = run(&registry, BALANCED_INVENTORY);
    let ctx = ReportContext::new(&result, "reg", "inv", MockClock::from_unix(0).now());

    let renderers: [&dyn ReportRenderer; 3] = [&TextRenderer, &HtmlRenderer, &TableRenderer];
    for renderer in renderers {
        let out = renderer.render(&ctx);
        assert!(out.contains("lkrkr0pefs03"), "{} output lacks server", renderer.name());
        assert!(out.contains("DRIFT"), "{} output lacks verdict", renderer.name());
    }

    let summary = summarize(&ctx);
    assert!(!summary.clean);
    assert_eq!(summary.counts[&DiscrepancyKind::MissingInInventory], 1);
}
