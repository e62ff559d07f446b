use serde::Serialize;

use crate::model::event::Event;

/// Renderable summary of an event for a shared link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub url: String,
    pub event_id: String,
    pub title: String,
    pub start: String,
    pub duration: String,
    pub cost: String,
}

impl Preview {
    pub fn new(url: impl Into<String>, event: &Event) -> Self {
        Self {
            url: url.into(),
            event_id: event.event_id.clone(),
            title: event.title.clone().unwrap_or_default(),
            start: event.start_datetime.clone(),
            duration: event.duration.clone(),
            cost: event.cost.clone(),
        }
    }
}
