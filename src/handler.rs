use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::links::{LinkExtractor, Unfurler};
use crate::model::link_shared::LinkSharedEvent;

/// Inner event of a Slack `event_callback` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEvent {
    LinkShared(LinkSharedEvent),
    #[serde(other)]
    Unsupported,
}

/// Slack Events API envelope, forwarded to the function as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub event: SlackEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
    pub unfurled: usize,
}

/// Everything an invocation needs; shared across invocations.
#[derive(Debug)]
pub struct App<U> {
    extractor: LinkExtractor,
    unfurler: U,
}

impl<U: Unfurler> App<U> {
    pub fn new(extractor: LinkExtractor, unfurler: U) -> Self {
        Self { extractor, unfurler }
    }
}

#[instrument(skip_all)]
pub async fn handler<U>(app: Arc<App<U>>, event: LambdaEvent<Request>) -> Result<Response, Error>
where
    U: Unfurler + 'static,
{
    Ok(process(app, event.payload).await)
}

/// Unfurl the links of one request. Delivery failures are reported in the response, not raised.
pub async fn process<U>(app: Arc<App<U>>, request: Request) -> Response
where
    U: Unfurler + 'static,
{
    let SlackEvent::LinkShared(link_shared) = request.event else {
        info!("Ignoring unsupported Slack event");
        return Response { message: "Ignored unsupported event".to_string(), unfurled: 0 };
    };

    // The Slack client is blocking, same as the download path.
    let task = tokio::task::spawn_blocking(move || {
        app.extractor
            .unfurl(&link_shared, &app.unfurler)
            .map_err(|e| e.to_string())
    });

    match task.await {
        Ok(Ok(0)) => Response { message: "No event links to unfurl".to_string(), unfurled: 0 },
        Ok(Ok(unfurled)) => Response { message: format!("Unfurled {} event link(s)", unfurled), unfurled },
        Ok(Err(e)) => {
            error!(error = %e, "Failed to deliver unfurls");
            Response { message: format!("Unfurl delivery failed: {}", e), unfurled: 0 }
        }
        Err(e) => {
            error!(error = %e, "Unfurl task join error");
            Response { message: format!("Unfurl task join error: {}", e), unfurled: 0 }
        }
    }
}
