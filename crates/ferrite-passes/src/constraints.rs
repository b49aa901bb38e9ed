//! Static check of a built pipeline against the declared pass ordering rules.

use std::collections::HashMap;

use tracing::debug;

use crate::error::OrderingViolation;
use crate::pass::PassId;
use crate::pipeline::Pipeline;

/// First and last position of every scheduled pass.
fn occurrences(passes: &[PassId]) -> HashMap<PassId, (usize, usize)> {
    let mut spans: HashMap<PassId, (usize, usize)> = HashMap::new();
    for (at, &id) in passes.iter().enumerate() {
        spans
            .entry(id)
            .and_modify(|(_, last)| *last = at)
            .or_insert((at, at));
    }
    spans
}

/// Every declared `(before, after)` pair.
fn ordering_pairs() -> Vec<(PassId, PassId)> {
    let mut pairs = Vec::new();
    for &id in PassId::ALL {
        let info = id.info();
        pairs.extend(info.runs_before.iter().map(|&later| (id, later)));
        pairs.extend(info.runs_after.iter().map(|&earlier| (earlier, id)));
    }
    pairs
}

/// Check `pipeline` against every ordering and non-idempotence rule.
///
/// Positions in the reported violations are indices into
/// [`Pipeline::passes`].
pub fn verify_pipeline(pipeline: &Pipeline) -> Result<(), Vec<OrderingViolation>> {
    let passes = pipeline.passes();
    let spans = occurrences(&passes);
    let mut violations = Vec::new();

    for (before, after) in ordering_pairs() {
        let (Some(&(_, last_before)), Some(&(first_after, _))) =
            (spans.get(&before), spans.get(&after))
        else {
            continue;
        };
        if first_after < last_before {
            violations.push(OrderingViolation::OutOfOrder {
                before,
                after,
                before_at: last_before,
                after_at: first_after,
            });
        }
    }

    for &pass in PassId::ALL.iter().filter(|id| !id.info().idempotent) {
        let count = pipeline.count_of(pass);
        if count != 1 {
            violations.push(OrderingViolation::NonIdempotentCount { pass, count });
        }
    }

    for stage in &pipeline.stages {
        let mut specialized = false;
        for entry in &stage.entries {
            let info = entry.pass.id().info();
            if info.after_stage_diagnostics {
                specialized = true;
            } else if specialized && info.emits_diagnostics {
                violations.push(OrderingViolation::DiagnosticsAfterLayerSpecialization {
                    stage: stage.name,
                    pass: info.id,
                });
            }
        }
    }

    debug!(
        passes = passes.len(),
        violations = violations.len(),
        "pipeline ordering verified"
    );
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::Pass;
    use crate::pipeline::{Stage, StageName};
    use crate::scope::Scope;

    fn pipeline_of(passes: Vec<Pass>) -> Pipeline {
        let mut stage = Stage::new(StageName::HighToMid);
        for pass in passes {
            stage.add(Scope::CIRCUIT, pass);
        }
        let mut pipeline = Pipeline::new();
        pipeline.push_stage(stage);
        pipeline
    }

    #[test]
    fn reversed_dce_is_reported() {
        let pipeline = pipeline_of(vec![
            Pass::InnerSymbolDce,
            Pass::SymbolDce,
            Pass::InjectDutHierarchy,
        ]);
        assert_eq!(
            verify_pipeline(&pipeline),
            Err(vec![OrderingViolation::OutOfOrder {
                before: PassId::SymbolDce,
                after: PassId::InnerSymbolDce,
                before_at: 1,
                after_at: 0,
            }])
        );
    }

    #[test]
    fn every_occurrence_must_precede() {
        // The second canonicalize is fine; the first one runs too early.
        let pipeline = pipeline_of(vec![
            Pass::Canonicalize,
            Pass::RandomizeRegisterInit,
            Pass::Canonicalize,
            Pass::InjectDutHierarchy,
        ]);
        let violations = verify_pipeline(&pipeline).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations[0],
            OrderingViolation::OutOfOrder {
                before: PassId::RandomizeRegisterInit,
                after: PassId::Canonicalize,
                ..
            }
        ));
    }

    #[test]
    fn repeated_hierarchy_injection_is_reported() {
        let pipeline = pipeline_of(vec![Pass::InjectDutHierarchy, Pass::InjectDutHierarchy]);
        assert_eq!(
            verify_pipeline(&pipeline),
            Err(vec![OrderingViolation::NonIdempotentCount {
                pass: PassId::InjectDutHierarchy,
                count: 2,
            }])
        );
    }

    #[test]
    fn missing_hierarchy_injection_is_reported() {
        let pipeline = pipeline_of(vec![Pass::SymbolDce, Pass::InnerSymbolDce]);
        assert_eq!(
            verify_pipeline(&pipeline),
            Err(vec![OrderingViolation::NonIdempotentCount {
                pass: PassId::InjectDutHierarchy,
                count: 0,
            }])
        );
    }

    #[test]
    fn diagnostics_after_layer_specialization_are_reported() {
        let pipeline = pipeline_of(vec![
            Pass::InjectDutHierarchy,
            Pass::SpecializeLayers,
            Pass::CheckCombLoops,
        ]);
        assert_eq!(
            verify_pipeline(&pipeline),
            Err(vec![
                OrderingViolation::DiagnosticsAfterLayerSpecialization {
                    stage: StageName::HighToMid,
                    pass: PassId::CheckCombLoops,
                }
            ])
        );
    }

    #[test]
    fn absent_passes_impose_nothing() {
        // `lower-xmr` is scheduled without `layer-sink`.
        let pipeline = pipeline_of(vec![
            Pass::InjectDutHierarchy,
            Pass::ExtractInstances,
            Pass::LowerXmr,
        ]);
        assert_eq!(verify_pipeline(&pipeline), Ok(()));
    }
}
