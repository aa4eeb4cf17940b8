use crate::foundation::core::TransformPatch;
use crate::scene::model::{GradientStops, Layer, ObjectStatus, SceneIntent, SceneObject, VectorShape};
use serde::{Deserialize, Serialize};

/// Refusal reason attached when the raw text held no parseable JSON.
pub const REFUSAL_JSON_PARSE_FAILED: &str = "json_parse_failed";
/// Refusal reason attached when parsed JSON did not match the command grammar.
pub const REFUSAL_SCHEMA_VALIDATION_FAILED: &str = "schema_validation_failed";

/// Mutable subset of a [`SceneObject`] carried by update commands.
///
/// There is deliberately no `id` or `type` member: identity cannot be patched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<Layer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ObjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shapes: Option<Vec<VectorShape>>,
}

/// One populated field of an [`ObjectPatch`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PatchField<'a> {
    Layer(Layer),
    Status(ObjectStatus),
    Transform(&'a TransformPatch),
    SemanticTag(&'a str),
    Shapes(&'a [VectorShape]),
}

impl ObjectPatch {
    /// Populated fields in application order.
    pub fn fields(&self) -> impl Iterator<Item = PatchField<'_>> {
        [
            self.layer.map(PatchField::Layer),
            self.status.map(PatchField::Status),
            self.transform.as_ref().map(PatchField::Transform),
            self.semantic_tag.as_deref().map(PatchField::SemanticTag),
            self.shapes.as_deref().map(PatchField::Shapes),
        ]
        .into_iter()
        .flatten()
    }

    /// Return `true` when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }
}

/// Closed set of scene mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawingCommand {
    /// Replace the scene intent wholesale; `null` clears it.
    SetSceneIntent {
        #[serde(default)]
        intent: Option<SceneIntent>,
    },
    AddPreviewObject {
        object: SceneObject,
    },
    UpdatePreviewObject {
        id: String,
        patch: ObjectPatch,
    },
    CommitPreviewObject {
        id: String,
    },
    CancelPreviewObject {
        id: String,
    },
    AddObject {
        object: SceneObject,
    },
    UpdateObject {
        id: String,
        patch: ObjectPatch,
    },
    DeleteObject {
        id: String,
    },
    /// Upsert the sky backdrop with a vertical linear gradient.
    SetBackgroundGradient {
        stops: GradientStops,
    },
    /// Upsert the ground backdrop with a solid fill.
    SetGroundFill {
        fill: String,
    },
    /// Replace (or append) one path shape of an object.
    SetPath {
        id: String,
        #[serde(rename = "shapeId")]
        shape_id: String,
        d: String,
    },
    /// Apply inner commands sequentially.
    Batch {
        commands: Vec<DrawingCommand>,
    },
}

impl DrawingCommand {
    /// Wire discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetSceneIntent { .. } => "set_scene_intent",
            Self::AddPreviewObject { .. } => "add_preview_object",
            Self::UpdatePreviewObject { .. } => "update_preview_object",
            Self::CommitPreviewObject { .. } => "commit_preview_object",
            Self::CancelPreviewObject { .. } => "cancel_preview_object",
            Self::AddObject { .. } => "add_object",
            Self::UpdateObject { .. } => "update_object",
            Self::DeleteObject { .. } => "delete_object",
            Self::SetBackgroundGradient { .. } => "set_background_gradient",
            Self::SetGroundFill { .. } => "set_ground_fill",
            Self::SetPath { .. } => "set_path",
            Self::Batch { .. } => "batch",
        }
    }

    /// Id of the object this command targets, if any.
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Self::AddPreviewObject { object } | Self::AddObject { object } => Some(&object.id),
            Self::UpdatePreviewObject { id, .. }
            | Self::CommitPreviewObject { id }
            | Self::CancelPreviewObject { id }
            | Self::UpdateObject { id, .. }
            | Self::DeleteObject { id }
            | Self::SetPath { id, .. } => Some(id),
            Self::SetSceneIntent { .. }
            | Self::SetBackgroundGradient { .. }
            | Self::SetGroundFill { .. }
            | Self::Batch { .. } => None,
        }
    }

    /// Return `true` for commands that remove an object.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Self::DeleteObject { .. } | Self::CancelPreviewObject { .. }
        )
    }
}

/// Top-level container for a batch of drawing commands plus refusal metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandEnvelope {
    #[serde(default)]
    pub commands: Vec<DrawingCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub refused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal_reason: Option<String>,
}

impl CommandEnvelope {
    /// Accepted envelope carrying `commands`.
    pub fn with_commands(commands: Vec<DrawingCommand>) -> Self {
        Self {
            commands,
            ..Self::default()
        }
    }

    /// Refused envelope; always carries an empty command list.
    pub fn refused(reason: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            commands: Vec::new(),
            notes: Some(notes.into()),
            refused: true,
            refusal_reason: Some(reason.into()),
        }
    }

    /// Append a human-readable note, keeping earlier notes.
    pub fn push_note(&mut self, note: impl AsRef<str>) {
        let note = note.as_ref();
        if note.is_empty() {
            return;
        }
        match &mut self.notes {
            Some(existing) if !existing.is_empty() => {
                existing.push_str("; ");
                existing.push_str(note);
            }
            _ => self.notes = Some(note.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/command.rs"]
mod tests;
