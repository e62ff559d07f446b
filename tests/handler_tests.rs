mod common;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use event_unfurl_lambda_rust::dataset::Snapshot;
use event_unfurl_lambda_rust::handler::{App, Request, SlackEvent, process};
use event_unfurl_lambda_rust::links::{LinkExtractor, LinkMatcher, Unfurler};
use event_unfurl_lambda_rust::model::event::{Event, columns};
use event_unfurl_lambda_rust::model::preview::Preview;
use event_unfurl_lambda_rust::store::EventStore;

use common::raw_row;

/// Collects delivered previews; clones share one list.
#[derive(Clone, Default)]
struct Outbox {
    sent: Arc<Mutex<Vec<BTreeMap<String, Preview>>>>,
    fail: bool,
}

impl Unfurler for Outbox {
    type Error = String;

    fn unfurl(&self, _channel: &str, _message_ts: &str, previews: &BTreeMap<String, Preview>) -> Result<(), String> {
        if self.fail {
            return Err("channel_not_found".to_string());
        }
        self.sent.lock().expect("outbox lock").push(previews.clone());
        Ok(())
    }
}

fn app(outbox: Outbox) -> Arc<App<Outbox>> {
    let store = EventStore::new();
    let event = Event::from_row(&raw_row(&[(columns::GAME_ID, "RPG25ND274324"), (columns::TITLE, "Test Game")]))
        .expect("fixture row should parse");
    store.publish(Snapshot::from_events([event]));
    let extractor = LinkExtractor::new(LinkMatcher::new("gencon.com").expect("valid host"), store);
    Arc::new(App::new(extractor, outbox))
}

fn envelope(urls: &[&str]) -> Request {
    let links: Vec<_> = urls.iter().map(|u| serde_json::json!({ "url": u, "domain": "gencon.com" })).collect();
    serde_json::from_value(serde_json::json!({
        "token": "ignored",
        "team_id": "T123",
        "type": "event_callback",
        "event": {
            "type": "link_shared",
            "channel": "C123",
            "user": "U123",
            "message_ts": "1723650000.000100",
            "links": links
        }
    }))
    .expect("envelope should deserialize")
}

#[test]
fn deserializes_link_shared_envelope() {
    let request = envelope(&["https://www.gencon.com/events/274324"]);
    let SlackEvent::LinkShared(event) = request.event else {
        panic!("expected a link_shared event");
    };
    assert_eq!(event.channel, "C123");
    assert_eq!(event.message_ts, "1723650000.000100");
    assert_eq!(event.links.len(), 1);
    assert_eq!(event.links[0].domain.as_deref(), Some("gencon.com"));
}

#[test]
fn other_event_types_and_missing_links_are_accepted() {
    let request: Request = serde_json::from_value(serde_json::json!({
        "type": "event_callback",
        "event": { "type": "app_mention", "channel": "C123", "text": "hi" }
    }))
    .expect("unsupported events still deserialize");
    assert!(matches!(request.event, SlackEvent::Unsupported));

    let request: Request = serde_json::from_value(serde_json::json!({
        "event": { "type": "link_shared", "channel": "C123", "message_ts": "1.2" }
    }))
    .expect("links default to empty");
    let SlackEvent::LinkShared(event) = request.event else {
        panic!("expected a link_shared event");
    };
    assert!(event.links.is_empty());
}

#[tokio::test]
async fn process_unfurls_known_event() {
    let outbox = Outbox::default();
    let response = process(app(outbox.clone()), envelope(&["https://www.gencon.com/events/274324"])).await;

    assert_eq!(response.unfurled, 1, "response was: {:?}", response);
    let sent = outbox.sent.lock().expect("outbox lock");
    assert_eq!(sent.len(), 1);
    let preview = sent[0].get("https://www.gencon.com/events/274324").expect("preview for url");
    assert!(preview.title.contains("Test Game"));
}

#[tokio::test]
async fn process_sends_nothing_for_unknown_event() {
    let outbox = Outbox::default();
    let response = process(app(outbox.clone()), envelope(&["https://www.gencon.com/events/999999"])).await;

    assert_eq!(response.unfurled, 0);
    assert!(outbox.sent.lock().expect("outbox lock").is_empty());
}

#[tokio::test]
async fn delivery_failure_is_reported_not_raised() {
    let outbox = Outbox { fail: true, ..Outbox::default() };
    let response = process(app(outbox), envelope(&["https://www.gencon.com/events/274324"])).await;

    assert_eq!(response.unfurled, 0);
    assert!(response.message.contains("channel_not_found"), "message was: {}", response.message);
}
