use super::*;
use crate::graph::types::{ApiEdge, ApiNode, GraphPayload};
use crate::graph::simulation::SimulationPhase;

const WALLET: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

fn app() -> FraudCheckerApp {
    FraudCheckerApp::with_settings(Settings {
        // Discard port so a stray request fails fast
        api_base_url: "http://127.0.0.1:9".into(),
        ..Settings::default()
    })
}

fn result(probability: f64, edges: &[(&str, &str)]) -> ClassificationResult {
    ClassificationResult {
        fraud_probability: probability,
        graph: GraphPayload {
            nodes: ["A", "B"]
                .iter()
                .map(|id| ApiNode {
                    id: id.to_string(),
                    label: id.to_string(),
                })
                .collect(),
            edges: edges
                .iter()
                .map(|(s, t)| ApiEdge {
                    source: s.to_string(),
                    target: t.to_string(),
                    value: 5.0,
                    timestamp: "t1".into(),
                })
                .collect(),
        },
    }
}

#[test]
fn wallet_address_validation() {
    assert!(is_valid_wallet_address(WALLET));
    assert!(is_valid_wallet_address("0x0000000000000000000000000000000000000000"));
    assert!(!is_valid_wallet_address(""));
    assert!(!is_valid_wallet_address("0x123"));
    assert!(!is_valid_wallet_address("52908400098527886E0F7030069857D2E4169EE7"));
    assert!(!is_valid_wallet_address("0x52908400098527886E0F7030069857D2E4169EEG"));
    assert!(!is_valid_wallet_address("0X52908400098527886E0F7030069857D2E4169EE7"));
    assert!(!is_valid_wallet_address("0x52908400098527886E0F7030069857D2E4169EE7a"));
}

#[test]
fn submit_requires_valid_address() {
    let mut app = app();
    assert!(!app.can_submit());
    assert!(!app.submit());

    app.address = "0xnothex".into();
    assert!(!app.submit());
    assert!(!app.is_pending());
}

#[test]
fn successful_result_shows_probability_and_graph() {
    let mut app = app();
    app.apply_result(Ok(result(0.83, &[("A", "B")])));

    assert!(!app.is_pending());
    assert!(app.error.is_none());
    assert_eq!(
        app.result.as_ref().map(|r| r.probability_label()),
        Some("83.00%".to_string())
    );
    assert_eq!(app.viewer.scene().markers().len(), 2);
    assert_eq!(app.viewer.scene().lines().len(), 1);
    assert_eq!(app.viewer.phase(), Some(SimulationPhase::Initializing));
}

#[test]
fn transport_failure_shows_generic_error() {
    let mut app = app();
    app.apply_result(Ok(result(0.5, &[("A", "B")])));
    app.apply_result(Err(anyhow::anyhow!("connection refused")));

    assert_eq!(app.error.as_deref(), Some(CLASSIFY_ERROR));
    assert!(app.result.is_none());
    assert!(!app.viewer.has_graph());
    assert!(app.viewer.scene().is_empty());
}

#[test]
fn malformed_graph_is_never_rendered() {
    let mut app = app();
    app.apply_result(Ok(result(0.9, &[("A", "B"), ("B", "Z")])));

    assert_eq!(app.error.as_deref(), Some(CLASSIFY_ERROR));
    assert!(app.result.is_none());
    assert!(app.viewer.scene().is_empty());
}

#[test]
fn submit_clears_previous_state_and_disables_button() {
    let mut app = app();
    app.apply_result(Ok(result(0.2, &[("A", "B")])));
    app.error = Some("old".into());
    let stale = app.viewer.schedule_tick();
    assert!(stale.is_some());

    app.address = format!("  {WALLET} ");
    assert!(app.submit());

    assert!(app.is_pending());
    assert!(!app.can_submit());
    assert!(app.result.is_none());
    assert!(app.error.is_none());
    assert!(app.viewer.scene().is_empty());
    assert!(!app.viewer.has_graph());
    assert!(!app.viewer.needs_tick());
}

#[test]
fn poll_applies_channel_result() {
    let mut app = app();
    let (tx, rx) = mpsc::channel();
    app.pending = Some(rx);

    assert!(app.poll_pending());
    tx.send(Ok(result(0.83, &[("A", "B")]))).unwrap();
    assert!(!app.poll_pending());
    assert!(!app.is_pending());
    assert!(app.result.is_some());
}

#[test]
fn dropped_worker_surfaces_error() {
    let mut app = app();
    let (tx, rx) = mpsc::channel::<ClassifyOutcome>();
    app.pending = Some(rx);
    drop(tx);

    assert!(!app.poll_pending());
    assert!(!app.is_pending());
    assert_eq!(app.error.as_deref(), Some(CLASSIFY_ERROR));
}

#[test]
fn physics_changes_reach_viewer() {
    let mut app = app();
    app.apply_result(Ok(result(0.4, &[("A", "B")])));
    while app.viewer.frame() {}

    app.settings.charge_strength = 0.0;
    app.settings.link_distance = 250.0;
    app.apply_physics();

    assert!(app.settings_dirty);
    assert!(app.viewer.needs_tick());

    let mut frames = 0;
    while app.viewer.frame() {
        frames += 1;
        assert!(frames < 1000);
    }
    let markers = app.viewer.scene().markers();
    let d = markers[0].center.distance(markers[1].center);
    assert!((d - 250.0).abs() < 1.0, "distance {d}");
}
