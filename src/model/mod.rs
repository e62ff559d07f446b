pub mod event;
pub mod link_shared;
pub mod preview;
pub mod row;
