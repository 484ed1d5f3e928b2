//! The staged modifier chain.
//!
//! A chain is bound to exactly one event instance: modifiers are
//! registered into named stages, then `execute` threads the event
//! through every stage in the configured order and every modifier in
//! registration order. Executing consumes the chain - it models one
//! event's journey and carries no cross-execution state.

use crate::core::{EngineError, ModifierSource};

use super::stage::Stage;

/// A modifier reads and mutates the in-flight event.
///
/// Modifiers at the same stage run in registration order and must not
/// assume anything about each other beyond additive/appending effects.
pub type Modifier<E> = Box<dyn FnOnce(&mut E) -> Result<(), EngineError>>;

struct Slot<E> {
    source: ModifierSource,
    run: Modifier<E>,
}

struct StageSlots<E> {
    stage: Stage,
    slots: Vec<Slot<E>>,
}

/// A chain execution failure.
///
/// Carries the event as it stood when execution aborted, alongside the
/// failing stage and modifier source (absent when the failure happened
/// before any modifier ran, e.g. a chain handler error).
#[derive(Debug)]
pub struct ChainError<E> {
    /// The partial event.
    pub event: E,
    /// Stage that was executing when the failure surfaced.
    pub stage: Option<Stage>,
    /// Source of the failing modifier.
    pub source: Option<ModifierSource>,
    /// The underlying error.
    pub error: EngineError,
}

impl<E> std::fmt::Display for ChainError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.stage, &self.source) {
            (Some(stage), Some(source)) => {
                write!(f, "chain aborted in stage `{stage}` by {source}: {}", self.error)
            }
            _ => write!(f, "chain aborted before execution: {}", self.error),
        }
    }
}

impl<E: std::fmt::Debug> std::error::Error for ChainError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// A single-use, ordered pipeline for one event instance.
pub struct Chain<E> {
    stages: Vec<StageSlots<E>>,
}

impl<E> Chain<E> {
    /// Construct a chain with a fixed ordered stage list.
    ///
    /// The order given here is the order `execute` visits, regardless of
    /// the order modifiers are later registered. Duplicate stage names
    /// are an [`EngineError::InvalidArgument`].
    pub fn new(stages: &[Stage]) -> Result<Self, EngineError> {
        for (i, stage) in stages.iter().enumerate() {
            if stages[..i].contains(stage) {
                return Err(EngineError::InvalidArgument(format!(
                    "duplicate stage `{stage}` in chain schedule"
                )));
            }
        }

        Ok(Self {
            stages: stages
                .iter()
                .map(|&stage| StageSlots {
                    stage,
                    slots: Vec::new(),
                })
                .collect(),
        })
    }

    /// Register a modifier at a stage.
    ///
    /// Appends to the stage's slot list; same-stage modifiers execute in
    /// registration order. Fails immediately with
    /// [`EngineError::InvalidArgument`] if the stage is not part of this
    /// chain's schedule.
    pub fn add(
        &mut self,
        stage: Stage,
        source: ModifierSource,
        modifier: impl FnOnce(&mut E) -> Result<(), EngineError> + 'static,
    ) -> Result<(), EngineError> {
        let Some(staged) = self.stages.iter_mut().find(|s| s.stage == stage) else {
            return Err(EngineError::InvalidArgument(format!(
                "stage `{stage}` is not in this chain's schedule"
            )));
        };

        tracing::trace!(stage = %stage, source = %source, "modifier registered");
        staged.slots.push(Slot {
            source,
            run: Box::new(modifier),
        });
        Ok(())
    }

    /// The configured stage order.
    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.stages.iter().map(|s| s.stage)
    }

    /// Total registered modifiers across all stages.
    #[must_use]
    pub fn modifier_count(&self) -> usize {
        self.stages.iter().map(|s| s.slots.len()).sum()
    }

    /// Whether no modifiers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modifier_count() == 0
    }

    /// Run every stage in order, threading the event forward.
    ///
    /// Within each stage, modifiers run in registration order. The first
    /// modifier failure aborts the remaining stages and surfaces the
    /// partial event alongside the error (fail-fast).
    pub fn execute(self, mut event: E) -> Result<E, ChainError<E>> {
        for StageSlots { stage, slots } in self.stages {
            for slot in slots {
                tracing::trace!(stage = %stage, source = %slot.source, "applying modifier");
                if let Err(error) = (slot.run)(&mut event) {
                    return Err(ChainError {
                        event,
                        stage: Some(stage),
                        source: Some(slot.source),
                        error,
                    });
                }
            }
        }
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::stage::{BASE, COMBAT_STAGES, CONDITIONS, FEATURES, FINAL};

    fn source(name: &str) -> ModifierSource {
        ModifierSource::new(name, "test")
    }

    #[test]
    fn test_duplicate_stage_rejected() {
        let result = Chain::<i32>::new(&[BASE, CONDITIONS, BASE]);
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
    }

    #[test]
    fn test_add_unknown_stage_fails() {
        let mut chain = Chain::<i32>::new(&[BASE, FINAL]).unwrap();
        let result = chain.add(FEATURES, source("x"), |_| Ok(()));
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
        assert!(chain.is_empty());
    }

    #[test]
    fn test_stage_order_beats_registration_order() {
        // Register against stages in reverse schedule order.
        let mut chain = Chain::<Vec<&'static str>>::new(&COMBAT_STAGES).unwrap();
        chain
            .add(FINAL, source("final"), |log| {
                log.push("final");
                Ok(())
            })
            .unwrap();
        chain
            .add(CONDITIONS, source("conditions"), |log| {
                log.push("conditions");
                Ok(())
            })
            .unwrap();
        chain
            .add(BASE, source("base"), |log| {
                log.push("base");
                Ok(())
            })
            .unwrap();

        let log = chain.execute(Vec::new()).unwrap();
        assert_eq!(log, vec!["base", "conditions", "final"]);
    }

    #[test]
    fn test_same_stage_registration_order() {
        let mut chain = Chain::<Vec<u32>>::new(&[BASE]).unwrap();
        for i in 0..5 {
            chain
                .add(BASE, source("n"), move |log| {
                    log.push(i);
                    Ok(())
                })
                .unwrap();
        }

        let log = chain.execute(Vec::new()).unwrap();
        assert_eq!(log, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_failure_aborts_and_surfaces_partial_event() {
        let mut chain = Chain::<i32>::new(&COMBAT_STAGES).unwrap();
        chain
            .add(BASE, source("base"), |n| {
                *n += 10;
                Ok(())
            })
            .unwrap();
        chain
            .add(CONDITIONS, source("broken"), |_| {
                Err(EngineError::Internal("unrecognized event shape".to_string()))
            })
            .unwrap();
        chain
            .add(FEATURES, source("never-runs"), |n| {
                *n += 100;
                Ok(())
            })
            .unwrap();

        let err = chain.execute(0).unwrap_err();
        assert_eq!(err.event, 10);
        assert_eq!(err.stage, Some(CONDITIONS));
        assert_eq!(err.source.unwrap().name, "broken");
        assert!(matches!(err.error, EngineError::Internal(_)));
    }

    #[test]
    fn test_empty_chain_passes_event_through() {
        let chain = Chain::<i32>::new(&COMBAT_STAGES).unwrap();
        assert_eq!(chain.execute(7).unwrap(), 7);
    }
}
