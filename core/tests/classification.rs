use std::fs;
use std::path::PathBuf;

use alloy_primitives::Address;
use stakinghub_core::{
    describe_history, pending_request, pending_source, user_action, Addresses,
    HistoryTransaction, MultisigTransaction, Page, RequestLabel, UserAction,
};

fn fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read fixture: {:?}", path))
}

fn pending_page() -> Page<MultisigTransaction> {
    serde_json::from_str(&fixture("pending.json")).expect("pending fixture deserializes")
}

fn history_page() -> Page<HistoryTransaction> {
    serde_json::from_str(&fixture("history.json")).expect("history fixture deserializes")
}

#[test]
fn pending_fixture_classifies_end_to_end() {
    let book = Addresses::default();
    let page = pending_page();
    assert_eq!(page.results.len(), 3);

    let labels: Vec<RequestLabel> = page
        .results
        .iter()
        .map(|tx| pending_request(tx, None, &[], &book))
        .collect();

    assert_eq!(labels[0], RequestLabel::WrapToWxHopr);
    assert_eq!(labels[1], RequestLabel::Rejection);
    assert_eq!(labels[2], RequestLabel::CouldNotDecode);
}

#[test]
fn pending_fixture_actions_per_owner() {
    let page = pending_page();
    let signer: Address = "0xAAaA11112222333344445555666677778888BbBB".parse().unwrap();
    let other: Address = "0x1212121212121212121212121212121212121212".parse().unwrap();

    // Wrap tx: 2 required, 1 collected. The signer waits, anyone else
    // can sign-and-execute.
    assert_eq!(user_action(&page.results[0], Some(signer)), None);
    assert_eq!(
        user_action(&page.results[0], Some(other)),
        Some(UserAction::Execute)
    );

    // Rejection placeholder: nothing collected, two still needed.
    assert_eq!(user_action(&page.results[1], Some(other)), Some(UserAction::Sign));

    // Third tx already met its threshold.
    assert_eq!(
        user_action(&page.results[2], Some(signer)),
        Some(UserAction::Execute)
    );
}

#[test]
fn pending_fixture_sources() {
    let page = pending_page();
    let source = pending_source(&page.results[0]).to_lowercase();
    assert!(source.starts_with("0xaaaa"));
    assert_eq!(pending_source(&page.results[1]), "-");
}

#[test]
fn pending_fixture_validates() {
    for tx in pending_page().results {
        assert!(tx.validate().is_ok(), "fixture row failed validation: {tx:?}");
    }
}

#[test]
fn history_fixture_describes_all_rows() {
    let page = history_page();
    let views: Vec<_> = page.results.iter().map(describe_history).collect();

    assert_eq!(views[0].request, "Received");
    assert_eq!(views[0].currency, "USDT");
    assert_eq!(views[0].value, "1.0");

    assert_eq!(views[1].request, "Sent");
    assert_eq!(views[1].currency, "xDai");
    assert_eq!(views[1].value, "5.0");
    assert_eq!(
        views[1].source.to_lowercase(),
        "0xaaaa11112222333344445555666677778888bbbb"
    );

    assert_eq!(views[2].source, "-");
    assert_eq!(views[2].currency, "wxHOPR");
    assert_eq!(views[2].value, "0.25");
    assert!(views[2].request.to_lowercase().starts_with("0x683d"));
}
