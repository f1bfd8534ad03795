//! Root move ordering: captures by MVV-LVA, quiet moves by a shallow static eval.

use std::cmp::Reverse;

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::eval::Evaluator;
use crate::engine::oracle::GamePosition;

use super::types::MoveKind;

/// A root move tagged with its generation index.
#[derive(Clone, Debug)]
pub(super) struct RootMove<M> {
    pub(super) index: usize,
    pub(super) mv: M,
    pub(super) kind: MoveKind,
}

pub(super) fn classify<P: GamePosition>(pos: &P, mv: &P::Move) -> MoveKind {
    if pos.is_capture(mv) {
        MoveKind::Capture
    } else if pos.is_castling(mv) {
        MoveKind::Castle
    } else {
        MoveKind::Quiet
    }
}

/// Split a batch into captures and everything else, keeping generation order.
pub(super) fn partition<M>(batch: Vec<RootMove<M>>) -> (Vec<RootMove<M>>, Vec<RootMove<M>>) {
    batch
        .into_iter()
        .partition(|root| root.kind == MoveKind::Capture)
}

/// Captures in descending MVV-LVA order; ties keep generation order.
pub(super) fn order_captures<P: GamePosition>(pos: &P, captures: &mut [RootMove<P::Move>]) {
    captures.sort_by_key(|root| Reverse(pos.order_hint(&root.mv)));
}

/// Quiet moves paired with their successors, best static score for the
/// mover first. One evaluator call scores every successor of the batch.
pub(super) fn order_quiet<P, E>(
    pos: &P,
    quiet: Vec<RootMove<P::Move>>,
    evaluator: &E,
) -> EngineResult<Vec<(RootMove<P::Move>, P)>>
where
    P: GamePosition,
    E: Evaluator<P>,
{
    if quiet.is_empty() {
        return Ok(Vec::new());
    }

    let children = quiet
        .iter()
        .map(|root| pos.apply(&root.mv))
        .collect::<EngineResult<Vec<P>>>()?;
    let static_scores = evaluator.evaluate(&children)?;
    if static_scores.len() != children.len() {
        return Err(EngineError::EvaluatorOutput {
            expected: children.len(),
            actual: static_scores.len(),
        });
    }

    let mut scored: Vec<(i32, RootMove<P::Move>, P)> = static_scores
        .into_iter()
        .zip(quiet)
        .zip(children)
        .map(|((score, root), child)| (-score, root, child))
        .collect();
    scored.sort_by_key(|(score, _, _)| Reverse(*score));

    Ok(scored.into_iter().map(|(_, root, child)| (root, child)).collect())
}
