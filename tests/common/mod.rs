//! Test support: synthetic game trees and a counting evaluator.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Position};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use ares_chess::engine::{EngineError, EngineResult, Evaluator, GamePosition, Score};

pub fn from_fen(fen: &str) -> Chess {
    let f: Fen = fen.parse().unwrap();
    f.into_position(CastlingMode::Standard).unwrap()
}

/// Position reached by `plies` random legal moves from the start.
/// Stops early if the game ends.
pub fn random_playout(rng: &mut StdRng, plies: usize) -> Chess {
    let mut pos = Chess::default();
    for _ in 0..plies {
        let moves = Position::legal_moves(&pos);
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())].clone();
        pos = pos.play(&mv).unwrap();
    }
    pos
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub target: usize,
    pub capture: bool,
    pub castle: bool,
    pub hint: i32,
}

#[derive(Clone, Debug, Default)]
pub struct Node {
    /// Static score for the side to move at this node.
    pub value: Score,
    pub edges: Vec<Edge>,
    pub checkmate: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn node(&mut self, value: Score) -> usize {
        self.nodes.push(Node {
            value,
            ..Node::default()
        });
        self.nodes.len() - 1
    }

    pub fn quiet(&mut self, from: usize, to: usize) {
        self.push_edge(from, to, false, 0);
    }

    pub fn capture(&mut self, from: usize, to: usize, hint: i32) {
        self.push_edge(from, to, true, hint);
    }

    fn push_edge(&mut self, from: usize, to: usize, capture: bool, hint: i32) {
        self.nodes[from].edges.push(Edge {
            target: to,
            capture,
            castle: false,
            hint,
        });
    }

    pub fn root(self) -> TreePosition {
        TreePosition {
            tree: Arc::new(self),
            node: 0,
        }
    }

    /// Uniform random tree. Nodes of the same level may be shared
    /// between parents, which gives transpositions.
    pub fn random(seed: u64, branching: usize, levels: usize) -> Tree {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tree = Tree::default();
        let root = tree.node(rng.gen_range(-500..=500));
        let mut level = vec![root];

        for _ in 0..levels {
            let mut next: Vec<usize> = Vec::new();
            for &parent in &level {
                for _ in 0..branching {
                    let child = if !next.is_empty() && rng.gen_bool(0.2) {
                        next[rng.gen_range(0..next.len())]
                    } else {
                        let id = tree.node(rng.gen_range(-500..=500));
                        next.push(id);
                        id
                    };
                    if tree.nodes[parent].edges.iter().any(|e| e.target == child) {
                        continue;
                    }
                    if rng.gen_bool(0.3) {
                        let hint = rng.gen_range(0..100);
                        tree.capture(parent, child, hint);
                    } else {
                        tree.quiet(parent, child);
                    }
                }
            }
            level = next;
        }
        tree
    }
}

/// A position in a [`Tree`]; moves are target node ids.
#[derive(Clone, Debug)]
pub struct TreePosition {
    pub tree: Arc<Tree>,
    pub node: usize,
}

impl TreePosition {
    pub fn at(&self, node: usize) -> TreePosition {
        TreePosition {
            tree: Arc::clone(&self.tree),
            node,
        }
    }

    fn edge(&self, mv: &usize) -> Option<&Edge> {
        self.tree.nodes[self.node].edges.iter().find(|e| e.target == *mv)
    }

    pub fn value(&self) -> Score {
        self.tree.nodes[self.node].value
    }
}

impl GamePosition for TreePosition {
    type Move = usize;
    type Key = usize;

    fn legal_moves(&self) -> Vec<usize> {
        self.tree.nodes[self.node].edges.iter().map(|e| e.target).collect()
    }

    fn apply(&self, mv: &usize) -> EngineResult<Self> {
        match self.edge(mv) {
            Some(edge) => Ok(self.at(edge.target)),
            None => Err(EngineError::InvalidMove(mv.to_string())),
        }
    }

    fn is_capture(&self, mv: &usize) -> bool {
        self.edge(mv).is_some_and(|e| e.capture)
    }

    fn is_castling(&self, mv: &usize) -> bool {
        self.edge(mv).is_some_and(|e| e.castle)
    }

    fn is_terminal(&self) -> bool {
        self.tree.nodes[self.node].edges.is_empty()
    }

    fn is_checkmate(&self) -> bool {
        self.tree.nodes[self.node].checkmate
    }

    fn canonical_key(&self) -> usize {
        self.node
    }

    fn order_hint(&self, mv: &usize) -> i32 {
        self.edge(mv).map_or(0, |e| e.hint)
    }
}

/// Plain negamax without pruning or caching.
pub fn negamax(pos: &TreePosition, depth: u32) -> Score {
    let moves = pos.legal_moves();
    if depth == 0 || moves.is_empty() {
        return pos.value();
    }
    moves
        .iter()
        .map(|mv| -negamax(&pos.apply(mv).unwrap(), depth - 1))
        .max()
        .unwrap()
}

/// Returns each node's static value, counts the positions it scored and
/// logs the node ids of every call in order.
#[derive(Default)]
pub struct CountingEvaluator {
    positions: AtomicUsize,
    calls: AtomicUsize,
    log: Mutex<Vec<Vec<usize>>>,
    failing: bool,
}

impl CountingEvaluator {
    pub fn failing() -> Self {
        CountingEvaluator {
            failing: true,
            ..Self::default()
        }
    }

    pub fn positions(&self) -> usize {
        self.positions.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Node ids passed to each `evaluate` call, oldest first.
    pub fn log(&self) -> Vec<Vec<usize>> {
        self.log.lock().unwrap().clone()
    }

    pub fn reset(&self) {
        self.positions.store(0, Ordering::SeqCst);
        self.calls.store(0, Ordering::SeqCst);
        self.log.lock().unwrap().clear();
    }
}

impl Evaluator<TreePosition> for CountingEvaluator {
    fn evaluate(&self, positions: &[TreePosition]) -> EngineResult<Vec<Score>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(EngineError::EvaluatorUnavailable);
        }
        self.positions.fetch_add(positions.len(), Ordering::SeqCst);
        self.log
            .lock()
            .unwrap()
            .push(positions.iter().map(|p| p.node).collect());
        Ok(positions.iter().map(TreePosition::value).collect())
    }
}
