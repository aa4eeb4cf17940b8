use crate::foundation::error::{SceneError, SceneResult};
use crate::session::events::SessionEvent;
use crate::session::scene_session::{SceneSession, SceneUpdate, UpstreamModel};
use serde_json::Value;
use std::sync::mpsc;
use std::thread::JoinHandle;

/// Upstream model usable from the writer thread.
pub type SharedModel = Box<dyn UpstreamModel + Send>;

enum Request {
    Utterance {
        utterance: String,
        reply: mpsc::Sender<SessionEvent>,
    },
    ModelOutput {
        utterance: String,
        raw: String,
        reply: mpsc::Sender<SessionEvent>,
    },
    Envelope {
        utterance: String,
        envelope: Value,
        reply: mpsc::Sender<SessionEvent>,
    },
    Reset {
        reply: mpsc::Sender<SessionEvent>,
    },
    Snapshot {
        reply: mpsc::Sender<SceneUpdate>,
    },
    Subscribe {
        updates: mpsc::Sender<SceneUpdate>,
    },
    Shutdown,
}

/// Single writer for a [`SceneSession`].
///
/// The session lives on one dedicated thread and handles requests strictly in arrival order, so
/// the reducer never needs locking. After every recorded event each subscriber receives a full
/// [`SceneUpdate`]; subscribers whose receiver is gone are dropped.
pub struct SceneServer {
    handle: SceneHandle,
    worker: Option<JoinHandle<SceneSession>>,
}

/// Cloneable client of a [`SceneServer`].
#[derive(Clone)]
pub struct SceneHandle {
    tx: mpsc::Sender<Request>,
}

impl SceneServer {
    /// Start the writer thread that owns `session`.
    pub fn spawn(session: SceneSession, model: SharedModel) -> SceneResult<Self> {
        let (tx, rx) = mpsc::channel::<Request>();
        let worker = std::thread::Builder::new()
            .name("scene-writer".to_string())
            .spawn(move || serve(session, model, rx))
            .map_err(|e| SceneError::session(format!("failed to start scene writer thread: {e}")))?;
        Ok(Self {
            handle: SceneHandle { tx },
            worker: Some(worker),
        })
    }

    pub fn handle(&self) -> SceneHandle {
        self.handle.clone()
    }

    /// Stop accepting requests and hand back the session once queued requests are drained.
    pub fn shutdown(mut self) -> SceneResult<SceneSession> {
        // A writer that already exited still reports through `join`.
        let _ = self.handle.tx.send(Request::Shutdown);
        let worker = self
            .worker
            .take()
            .ok_or_else(|| SceneError::session("scene writer already joined"))?;
        worker
            .join()
            .map_err(|_| SceneError::session("scene writer thread panicked"))
    }
}

impl Drop for SceneServer {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.handle.tx.send(Request::Shutdown);
            let _ = worker.join();
        }
    }
}

impl SceneHandle {
    /// Ask the upstream model, then run its output through the pipeline.
    pub fn submit_utterance(&self, utterance: impl Into<String>) -> SceneResult<SessionEvent> {
        let utterance = utterance.into();
        self.call(|reply| Request::Utterance { utterance, reply })
    }

    /// Process raw model text produced elsewhere.
    pub fn submit_model_output(
        &self,
        utterance: impl Into<String>,
        raw: impl Into<String>,
    ) -> SceneResult<SessionEvent> {
        let (utterance, raw) = (utterance.into(), raw.into());
        self.call(|reply| Request::ModelOutput {
            utterance,
            raw,
            reply,
        })
    }

    /// Apply a hand-written envelope.
    pub fn apply_envelope(
        &self,
        utterance: impl Into<String>,
        envelope: Value,
    ) -> SceneResult<SessionEvent> {
        let utterance = utterance.into();
        self.call(|reply| Request::Envelope {
            utterance,
            envelope,
            reply,
        })
    }

    pub fn reset(&self) -> SceneResult<SessionEvent> {
        self.call(|reply| Request::Reset { reply })
    }

    pub fn snapshot(&self) -> SceneResult<SceneUpdate> {
        self.call(|reply| Request::Snapshot { reply })
    }

    /// Receive a [`SceneUpdate`] after every future recorded event.
    pub fn subscribe(&self) -> SceneResult<mpsc::Receiver<SceneUpdate>> {
        let (updates, rx) = mpsc::channel();
        self.send(Request::Subscribe { updates })?;
        Ok(rx)
    }

    fn call<T>(&self, make: impl FnOnce(mpsc::Sender<T>) -> Request) -> SceneResult<T> {
        let (reply, rx) = mpsc::channel();
        self.send(make(reply))?;
        rx.recv()
            .map_err(|_| SceneError::session("scene writer dropped the request"))
    }

    fn send(&self, req: Request) -> SceneResult<()> {
        self.tx
            .send(req)
            .map_err(|_| SceneError::session("scene writer is not accepting requests"))
    }
}

fn serve(mut session: SceneSession, model: SharedModel, rx: mpsc::Receiver<Request>) -> SceneSession {
    let mut subscribers: Vec<mpsc::Sender<SceneUpdate>> = Vec::new();
    tracing::debug!("scene writer started");

    for req in rx {
        let (event, reply) = match req {
            Request::Utterance { utterance, reply } => {
                (session.submit_utterance(&utterance, model.as_ref()), reply)
            }
            Request::ModelOutput {
                utterance,
                raw,
                reply,
            } => (session.submit_model_output(&utterance, &raw), reply),
            Request::Envelope {
                utterance,
                envelope,
                reply,
            } => (session.apply_envelope(&utterance, envelope), reply),
            Request::Reset { reply } => (session.reset(), reply),
            Request::Snapshot { reply } => {
                let _ = reply.send(session.snapshot());
                continue;
            }
            Request::Subscribe { updates } => {
                subscribers.push(updates);
                continue;
            }
            Request::Shutdown => break,
        };

        if !subscribers.is_empty() {
            let update = session.snapshot();
            subscribers.retain(|s| s.send(update.clone()).is_ok());
        }
        // The caller may have given up waiting; the event is recorded regardless.
        let _ = reply.send(event);
    }

    tracing::debug!(revision = session.revision(), "scene writer stopped");
    session
}

#[cfg(test)]
#[path = "../../tests/unit/session/server.rs"]
mod tests;
