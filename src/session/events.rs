use crate::scene::command::{DrawingCommand, PatchField};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Outcome recorded for one processed utterance or envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Commands reached the reducer.
    Applied,
    /// Unparseable or schema-invalid input.
    Rejected,
    /// The upstream model declined.
    Refused,
    /// The upstream model could not be reached.
    Error,
}

/// One entry of the session history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub utterance: String,
    /// Commands as handed to the reducer (empty unless applied).
    pub commands: Vec<DrawingCommand>,
    pub status: EventStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl SessionEvent {
    /// New event stamped with a fresh id and the current time; `diff_summary` is derived from
    /// `commands`.
    pub fn new(
        utterance: impl Into<String>,
        commands: Vec<DrawingCommand>,
        status: EventStatus,
        notes: Option<String>,
    ) -> Self {
        let diff_summary = diff_summary(&commands);
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            utterance: utterance.into(),
            commands,
            status,
            notes,
            latency_ms: None,
            diff_summary,
        }
    }
}

/// Human-readable account of what `commands` do, e.g. `added preview "tree-1" (tree); deleted "sun"`.
///
/// Best effort and derived from the commands only; no-op commands are still described.
pub fn diff_summary(commands: &[DrawingCommand]) -> Option<String> {
    let mut parts = Vec::new();
    describe(commands, &mut parts);
    (!parts.is_empty()).then(|| parts.join("; "))
}

fn describe(commands: &[DrawingCommand], out: &mut Vec<String>) {
    for cmd in commands {
        let line = match cmd {
            DrawingCommand::SetSceneIntent { intent: Some(i) } => {
                format!("set intent \"{}\"", i.summary)
            }
            DrawingCommand::SetSceneIntent { intent: None } => "cleared intent".to_string(),
            DrawingCommand::AddPreviewObject { object } => match &object.semantic_tag {
                Some(tag) => format!("added preview \"{}\" ({tag})", object.id),
                None => format!("added preview \"{}\"", object.id),
            },
            DrawingCommand::AddObject { object } => match &object.semantic_tag {
                Some(tag) => format!("added \"{}\" ({tag})", object.id),
                None => format!("added \"{}\"", object.id),
            },
            DrawingCommand::UpdatePreviewObject { id, patch }
            | DrawingCommand::UpdateObject { id, patch } => {
                let fields: Vec<&str> = patch
                    .fields()
                    .map(|f| match f {
                        PatchField::Layer(_) => "layer",
                        PatchField::Status(_) => "status",
                        PatchField::Transform(_) => "transform",
                        PatchField::SemanticTag(_) => "semanticTag",
                        PatchField::Shapes(_) => "shapes",
                    })
                    .collect();
                if fields.is_empty() {
                    format!("updated \"{id}\"")
                } else {
                    format!("updated \"{id}\" ({})", fields.join(", "))
                }
            }
            DrawingCommand::CommitPreviewObject { id } => format!("committed \"{id}\""),
            DrawingCommand::CancelPreviewObject { id } => format!("cancelled \"{id}\""),
            DrawingCommand::DeleteObject { id } => format!("deleted \"{id}\""),
            DrawingCommand::SetBackgroundGradient { stops } => {
                format!("set background gradient ({} stops)", stops.0.len())
            }
            DrawingCommand::SetGroundFill { fill } => format!("set ground fill {fill}"),
            DrawingCommand::SetPath { id, shape_id, .. } => {
                format!("set path \"{shape_id}\" on \"{id}\"")
            }
            DrawingCommand::Batch { commands } => {
                describe(commands, out);
                continue;
            }
        };
        out.push(line);
    }
}

/// Bounded history; the oldest events are trimmed first.
#[derive(Clone, Debug)]
pub struct EventLog {
    events: VecDeque<SessionEvent>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: SessionEvent) {
        while self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SessionEvent> {
        self.events.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/events.rs"]
mod tests;
