use crate::foundation::config::PipelineConfig;
use crate::foundation::error::{SceneError, SceneResult};
use crate::pipeline::process::{Outcome, Pipeline, Processed};
use crate::reduce::reducer::apply_with_limit;
use crate::scene::model::SceneGraph;
use crate::session::events::{EventLog, EventStatus, SessionEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Black-box generative model: turns an utterance (and the current scene) into raw text that is
/// believed to hold a JSON command envelope.
pub trait UpstreamModel {
    fn complete(&self, utterance: &str, scene: &SceneGraph) -> SceneResult<String>;
}

impl<F> UpstreamModel for F
where
    F: Fn(&str, &SceneGraph) -> SceneResult<String>,
{
    fn complete(&self, utterance: &str, scene: &SceneGraph) -> SceneResult<String> {
        self(utterance, scene)
    }
}

/// Full snapshot broadcast to viewers after every recorded event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "scene_update", rename_all = "camelCase")]
pub struct SceneUpdate {
    pub scene_graph: SceneGraph,
    /// Oldest first, at most the configured log capacity.
    pub session_events: Vec<SessionEvent>,
    pub active_preview_ids: Vec<String>,
    pub revision: u64,
}

/// Owner of the canonical scene.
///
/// Every mutating call runs the pipeline, applies the result, appends one event to the bounded log
/// and bumps the revision. Nothing here locks; callers that share a session go through
/// [`SceneServer`](crate::SceneServer).
#[derive(Debug)]
pub struct SceneSession {
    pipeline: Pipeline,
    scene: SceneGraph,
    log: EventLog,
    revision: u64,
}

impl SceneSession {
    /// Empty scene.
    pub fn new(config: PipelineConfig) -> Self {
        let log = EventLog::new(config.limits.event_log_capacity);
        Self {
            pipeline: Pipeline::new(config),
            scene: SceneGraph::new(),
            log,
            revision: 0,
        }
    }

    /// Start from an existing scene; rejects scenes whose `order` is not a permutation of its
    /// object ids.
    pub fn with_scene(config: PipelineConfig, scene: SceneGraph) -> SceneResult<Self> {
        if !scene.is_consistent() {
            return Err(SceneError::validation(
                "scene order must list every object id exactly once",
            ));
        }
        let mut session = Self::new(config);
        session.scene = scene;
        Ok(session)
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn events(&self) -> impl Iterator<Item = &SessionEvent> {
        self.log.iter()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Ask `model` for commands, then process its output; a model failure is recorded as an
    /// `error` event and leaves the scene untouched.
    #[tracing::instrument(skip(self, model))]
    pub fn submit_utterance(&mut self, utterance: &str, model: &dyn UpstreamModel) -> SessionEvent {
        let started = Instant::now();
        let mut event = match model.complete(utterance, &self.scene) {
            Ok(raw) => self.process(utterance, |p, scene| p.process_raw(&raw, utterance, scene)),
            Err(e) => {
                tracing::warn!(error = %e, "upstream model failed");
                SessionEvent::new(
                    utterance,
                    Vec::new(),
                    EventStatus::Error,
                    Some(format!("upstream model failed: {e}")),
                )
            }
        };
        event.latency_ms = Some(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX));
        self.record(event)
    }

    /// Process raw model text produced elsewhere.
    pub fn submit_model_output(&mut self, utterance: &str, raw: &str) -> SessionEvent {
        let event = self.process(utterance, |p, scene| p.process_raw(raw, utterance, scene));
        self.record(event)
    }

    /// Apply a hand-written envelope; it goes through the same stages as model output, with
    /// `utterance` authorizing any destructive or converting commands.
    pub fn apply_envelope(&mut self, utterance: &str, envelope: Value) -> SessionEvent {
        let event = self.process(utterance, |p, scene| {
            p.process_value(envelope, utterance, scene)
        });
        self.record(event)
    }

    /// Clear the scene. The reset itself is logged and bumps the revision.
    pub fn reset(&mut self) -> SessionEvent {
        self.scene = SceneGraph::new();
        let mut event = SessionEvent::new(
            "reset",
            Vec::new(),
            EventStatus::Applied,
            Some("scene reset".to_string()),
        );
        event.diff_summary = Some("cleared the scene".to_string());
        self.record(event)
    }

    /// Current state as a viewer message.
    pub fn snapshot(&self) -> SceneUpdate {
        SceneUpdate {
            scene_graph: self.scene.clone(),
            session_events: self.log.iter().cloned().collect(),
            active_preview_ids: self.scene.active_preview_ids(),
            revision: self.revision,
        }
    }

    fn process(
        &mut self,
        utterance: &str,
        run: impl FnOnce(&Pipeline, &SceneGraph) -> Processed,
    ) -> SessionEvent {
        let Processed {
            envelope, outcome, ..
        } = run(&self.pipeline, &self.scene);
        let status = match outcome {
            Outcome::Accepted => EventStatus::Applied,
            Outcome::ParseFailed(_) | Outcome::SchemaFailed(_) => EventStatus::Rejected,
            Outcome::Refused => EventStatus::Refused,
        };
        if status == EventStatus::Applied {
            let max_shapes = self.pipeline.config().limits.max_shapes_per_object;
            self.scene = apply_with_limit(&self.scene, &envelope.commands, max_shapes);
        }
        SessionEvent::new(utterance, envelope.commands, status, envelope.notes)
    }

    fn record(&mut self, event: SessionEvent) -> SessionEvent {
        self.revision += 1;
        tracing::info!(
            revision = self.revision,
            status = ?event.status,
            objects = self.scene.objects.len(),
            "recorded session event"
        );
        self.log.push(event.clone());
        event
    }
}

/// Parse a scene graph from JSON text.
pub fn parse_scene(json: &str) -> SceneResult<SceneGraph> {
    serde_json::from_str(json).map_err(|e| SceneError::parse(format!("scene graph JSON: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/scene_session.rs"]
mod tests;
