use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use tracing::{debug, info, instrument, warn};

use crate::model::link_shared::{LinkSharedEvent, SharedLink};
use crate::model::preview::Preview;
use crate::store::EventStore;

/// Recognises event page links for one host, e.g. `https://www.gencon.com/events/274324/`.
/// Anything after the id's `/`, `?` or `#` (a title slug, tracking params) is ignored.
#[derive(Debug, Clone)]
pub struct LinkMatcher {
    shape: Regex,
    id: Regex,
}

impl LinkMatcher {
    pub fn new(host: &str) -> Result<Self, regex::Error> {
        let shape = RegexBuilder::new(&format!(
            r"^https?://(?:www\.)?{}/events/\d+(?:[/?#].*)?$",
            regex::escape(host)
        ))
        .case_insensitive(true)
        .build()?;
        let id = Regex::new(r"/events/(\d+)")?;
        Ok(Self { shape, id })
    }

    pub fn is_match(&self, url: &str) -> bool {
        self.shape.is_match(url)
    }

    /// The numeric id of a matching link; `None` for anything else.
    pub fn event_id<'a>(&self, url: &'a str) -> Option<&'a str> {
        if !self.is_match(url) {
            return None;
        }
        self.id.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str())
    }
}

/// Receives the previews built for one shared message.
pub trait Unfurler: Send + Sync {
    type Error: std::fmt::Display;

    fn unfurl(
        &self,
        channel: &str,
        message_ts: &str,
        previews: &BTreeMap<String, Preview>,
    ) -> Result<(), Self::Error>;
}

/// Turns shared links into event previews using the published snapshot.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    matcher: LinkMatcher,
    store: EventStore,
}

impl LinkExtractor {
    pub fn new(matcher: LinkMatcher, store: EventStore) -> Self {
        Self { matcher, store }
    }

    /// Previews for every link that is an event page with a known id.
    /// Other links are skipped.
    pub fn previews(&self, links: &[SharedLink]) -> BTreeMap<String, Preview> {
        // One snapshot for the whole batch.
        let snapshot = self.store.snapshot();
        let mut previews = BTreeMap::new();

        for link in links {
            let url = link.url.as_str();
            let Some(event_id) = self.matcher.event_id(url) else {
                debug!(url, "Skipping link that is not an event page");
                continue;
            };
            let Some(event) = snapshot.get(event_id) else {
                warn!(url, event_id, "Event id not found in events snapshot");
                continue;
            };
            info!(url, event_id, "Resolved event for link");
            previews.insert(url.to_string(), Preview::new(url, event));
        }

        previews
    }

    /// Build previews for a `link_shared` event and hand them to `unfurler` in a single call.
    /// Nothing is sent when no link resolved. Returns how many previews were sent.
    #[instrument(level = "info", skip_all, fields(channel = %event.channel, links = event.links.len()))]
    pub fn unfurl<U: Unfurler + ?Sized>(&self, event: &LinkSharedEvent, unfurler: &U) -> Result<usize, U::Error> {
        let previews = self.previews(&event.links);
        if previews.is_empty() {
            info!("No event links resolved; nothing to unfurl");
            return Ok(0);
        }
        unfurler.unfurl(&event.channel, &event.message_ts, &previews)?;
        Ok(previews.len())
    }
}
