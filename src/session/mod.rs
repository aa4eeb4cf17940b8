//! Session-oriented API: the owned canonical scene, its event log, and the single-writer server.

pub(crate) mod events;
pub(crate) mod scene_session;
pub(crate) mod server;
