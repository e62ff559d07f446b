//! Slack link unfurling for convention event pages.
//!
//! A background [`refresher::Refresher`] downloads the events workbook on a fixed
//! interval, [`dataset::load_snapshot`] parses it into an immutable snapshot, and
//! [`store::EventStore`] publishes it by swapping one `Arc`. Incoming `link_shared`
//! events go through [`links::LinkExtractor`], which resolves event links against the
//! current snapshot and sends the previews in one `chat.unfurl` call.

pub mod config;
pub mod dataset;
pub mod handler;
pub mod links;
pub mod model;
pub mod refresher;
pub mod slack;
pub mod source;
pub mod store;
