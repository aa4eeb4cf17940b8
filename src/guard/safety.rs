use crate::scene::command::{CommandEnvelope, DrawingCommand};
use regex::Regex;
use std::sync::OnceLock;

fn destructive_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(delet(e|es|ed|ing)|remov(e|es|ed|ing|al)|eras(e|es|ed|ing)|clear(s|ed|ing)?|discard(s|ed|ing)?|wip(e|es|ed|ing)|cancel(s|led|ed|ling|ing)?|undo(es|ing|ne)?|get rid of)\b",
        )
        .expect("destructive vocabulary regex")
    })
}

fn conversion_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(turn(s|ed|ing)?\b.{0,40}?\binto|convert(s|ed|ing)?|transform(s|ed|ing)?|chang(e|es|ed|ing)\b.{0,40}?\binto|make\s+(it|this|that|them)\s+into)\b",
        )
        .expect("conversion vocabulary regex")
    })
}

/// Return `true` when the utterance explicitly asks to remove something.
pub fn authorizes_destruction(utterance: &str) -> bool {
    destructive_re().is_match(utterance)
}

/// Return `true` when the utterance explicitly asks to turn one thing into another.
pub fn authorizes_conversion(utterance: &str) -> bool {
    conversion_re().is_match(utterance)
}

/// What the guard suppressed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardReport {
    /// `kind "id"` of each stripped delete/cancel command.
    pub suppressed_destructive: Vec<String>,
    /// Ids of objects whose update patch lost its `semanticTag`.
    pub stripped_tags: Vec<String>,
}

impl GuardReport {
    /// Return `true` when nothing was suppressed.
    pub fn is_empty(&self) -> bool {
        self.suppressed_destructive.is_empty() && self.stripped_tags.is_empty()
    }

    /// Human-readable summary, or `None` when nothing was suppressed.
    pub fn note(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.suppressed_destructive.is_empty() {
            parts.push(format!(
                "safety guard suppressed {} destructive command(s) ({}) because the utterance did not ask to delete or remove anything",
                self.suppressed_destructive.len(),
                self.suppressed_destructive.join(", ")
            ));
        }
        if !self.stripped_tags.is_empty() {
            parts.push(format!(
                "safety guard kept the semantic tag of {} object(s) ({}) because the utterance did not ask to convert anything",
                self.stripped_tags.len(),
                self.stripped_tags.join(", ")
            ));
        }
        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

/// Strip unauthorized destructive commands and semantic-tag rewrites from `commands`.
pub fn guard_commands(
    commands: Vec<DrawingCommand>,
    utterance: &str,
) -> (Vec<DrawingCommand>, GuardReport) {
    let policy = Policy {
        destruction: authorizes_destruction(utterance),
        conversion: authorizes_conversion(utterance),
    };
    let mut report = GuardReport::default();
    let kept = guard_list(commands, policy, &mut report);
    (kept, report)
}

/// Guard a validated envelope in place, appending a note that summarizes anything suppressed.
#[tracing::instrument(skip_all, fields(commands = envelope.commands.len()))]
pub fn apply_safety_guard(envelope: &mut CommandEnvelope, utterance: &str) -> GuardReport {
    let commands = std::mem::take(&mut envelope.commands);
    let (kept, report) = guard_commands(commands, utterance);
    envelope.commands = kept;
    if let Some(note) = report.note() {
        tracing::warn!(%note, "suppressed unauthorized commands");
        envelope.push_note(note);
    }
    report
}

#[derive(Clone, Copy)]
struct Policy {
    destruction: bool,
    conversion: bool,
}

fn guard_list(
    commands: Vec<DrawingCommand>,
    policy: Policy,
    report: &mut GuardReport,
) -> Vec<DrawingCommand> {
    commands
        .into_iter()
        .filter_map(|cmd| guard_one(cmd, policy, report))
        .collect()
}

fn guard_one(
    cmd: DrawingCommand,
    policy: Policy,
    report: &mut GuardReport,
) -> Option<DrawingCommand> {
    match cmd {
        DrawingCommand::DeleteObject { ref id } | DrawingCommand::CancelPreviewObject { ref id }
            if !policy.destruction =>
        {
            report
                .suppressed_destructive
                .push(format!("{} \"{id}\"", cmd.kind()));
            None
        }
        DrawingCommand::UpdatePreviewObject { id, mut patch } => {
            if !policy.conversion && patch.semantic_tag.take().is_some() {
                report.stripped_tags.push(id.clone());
            }
            Some(DrawingCommand::UpdatePreviewObject { id, patch })
        }
        DrawingCommand::UpdateObject { id, mut patch } => {
            if !policy.conversion && patch.semantic_tag.take().is_some() {
                report.stripped_tags.push(id.clone());
            }
            Some(DrawingCommand::UpdateObject { id, patch })
        }
        DrawingCommand::Batch { commands } => Some(DrawingCommand::Batch {
            commands: guard_list(commands, policy, report),
        }),
        other => Some(other),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/guard/safety.rs"]
mod tests;
