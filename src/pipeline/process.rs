use crate::enrich::enrich_envelope;
use crate::foundation::config::PipelineConfig;
use crate::guard::safety::apply_safety_guard;
use crate::normalize::extract::parse_raw_json;
use crate::normalize::pass::{Repair, normalize_envelope};
use crate::scene::command::{
    CommandEnvelope, REFUSAL_JSON_PARSE_FAILED, REFUSAL_SCHEMA_VALIDATION_FAILED,
};
use crate::scene::model::SceneGraph;
use crate::schema::validate::{SchemaError, validate_envelope};
use crate::stabilize::stabilize_envelope;
use serde_json::Value;

/// How an input fared in the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Safe to hand to the reducer.
    Accepted,
    /// No parseable JSON in the raw text.
    ParseFailed(String),
    /// JSON that does not match the command grammar.
    SchemaFailed(SchemaError),
    /// The upstream model declined (`refused: true`).
    Refused,
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Result of running one input through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    /// Envelope for the reducer; refused envelopes always carry no commands.
    pub envelope: CommandEnvelope,
    pub outcome: Outcome,
    /// Syntactic repairs applied before validation.
    pub repairs: Vec<Repair>,
}

/// The synchronous stage chain, parameterized by [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run raw upstream text (possibly fenced, possibly with prose) through every stage.
    #[tracing::instrument(skip_all, fields(raw_len = raw.len()))]
    pub fn process_raw(&self, raw: &str, utterance: &str, scene: &SceneGraph) -> Processed {
        match parse_raw_json(raw) {
            Ok(value) => self.process_value(value, utterance, scene),
            Err(e) => {
                tracing::warn!(error = %e, "model output is not JSON");
                Processed {
                    envelope: CommandEnvelope::refused(
                        REFUSAL_JSON_PARSE_FAILED,
                        format!("could not parse model output: {e}"),
                    ),
                    outcome: Outcome::ParseFailed(e),
                    repairs: Vec::new(),
                }
            }
        }
    }

    /// Run an already-parsed JSON value through normalization and every later stage.
    #[tracing::instrument(skip_all)]
    pub fn process_value(&self, value: Value, utterance: &str, scene: &SceneGraph) -> Processed {
        let normalized = normalize_envelope(value);
        if !normalized.repairs.is_empty() {
            tracing::debug!(repairs = ?normalized.repairs, "normalized upstream JSON");
        }

        let mut envelope = match validate_envelope(&normalized.value, &self.config.limits) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(error = %e, "envelope failed validation");
                return Processed {
                    envelope: CommandEnvelope::refused(
                        REFUSAL_SCHEMA_VALIDATION_FAILED,
                        format!("envelope failed validation: {e}"),
                    ),
                    outcome: Outcome::SchemaFailed(e),
                    repairs: normalized.repairs,
                };
            }
        };

        if envelope.refused {
            tracing::warn!(reason = ?envelope.refusal_reason, "model refused");
            return Processed {
                envelope,
                outcome: Outcome::Refused,
                repairs: normalized.repairs,
            };
        }

        apply_safety_guard(&mut envelope, utterance);
        stabilize_envelope(&mut envelope, scene, utterance, &self.config.stabilizer);
        enrich_envelope(
            &mut envelope,
            utterance,
            &self.config.enrichment,
            self.config.limits.max_shapes_per_object,
        );

        Processed {
            envelope,
            outcome: Outcome::Accepted,
            repairs: normalized.repairs,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/process.rs"]
mod tests;
