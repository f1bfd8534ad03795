mod common;

use rand::SeedableRng;
use rand::rngs::StdRng;
use shakmaty::{Chess, Position, Square};
use std::collections::HashSet;
use std::sync::Arc;

use ares_chess::engine::search::MoveKind;
use ares_chess::engine::{
    BatchEvaluator, CacheMode, EngineError, GamePosition, RankParams, Ranker, Score,
    TranspositionCache,
};
use common::{CountingEvaluator, Tree, TreePosition, from_fen, negamax, random_playout};

fn chess_ranker() -> Ranker<Chess, BatchEvaluator> {
    Ranker::new(
        Arc::new(BatchEvaluator::with_default_network(32)),
        Arc::new(TranspositionCache::new(CacheMode::DepthTagged)),
    )
}

fn tree_ranker() -> Ranker<TreePosition, CountingEvaluator> {
    Ranker::new(
        Arc::new(CountingEvaluator::default()),
        Arc::new(TranspositionCache::new(CacheMode::DepthTagged)),
    )
}

fn params(num_results: usize, batch_size: usize, depth: u32, parallelism: usize) -> RankParams {
    RankParams {
        num_results,
        batch_size,
        depth,
        parallelism,
    }
}

/// Ranking computed with plain negamax: captures searched one ply less
/// than `depth`, quiet moves two, then the top moves averaged with a
/// one-ply-less search.
fn reference_ranking(root: &TreePosition, depth: u32, n: usize) -> Vec<(usize, Score)> {
    let refine = |mv: &usize| -negamax(&root.apply(mv).unwrap(), depth.saturating_sub(1));

    let mut first: Vec<(usize, usize, Score)> = root
        .legal_moves()
        .into_iter()
        .enumerate()
        .map(|(index, mv)| {
            let child = root.apply(&mv).unwrap();
            let d = if root.is_capture(&mv) {
                depth.saturating_sub(1)
            } else {
                depth.saturating_sub(2)
            };
            (index, mv, -negamax(&child, d))
        })
        .collect();
    first.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
    first.truncate(n);

    let mut refined: Vec<(usize, usize, Score)> = first
        .into_iter()
        .map(|(index, mv, score)| (index, mv, (score + refine(&mv)).div_euclid(2)))
        .collect();
    refined.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
    refined.into_iter().map(|(_, mv, score)| (mv, score)).collect()
}

#[test]
fn test_rank_matches_reference_on_random_trees() {
    for seed in 0..12 {
        let root = Tree::random(seed, 6, 4).root();
        for depth in 1..=4 {
            for (n, batch, threads) in [(1, 1, 1), (3, 2, 4), (10, 100, 2), (4, 3, 3)] {
                let ranked = tree_ranker()
                    .rank(&root, &params(n, batch, depth, threads))
                    .unwrap();
                let got: Vec<(usize, Score)> = ranked.iter().map(|r| (r.mv, r.score)).collect();
                assert_eq!(
                    got,
                    reference_ranking(&root, depth, n),
                    "seed {seed} depth {depth} n {n} batch {batch} threads {threads}"
                );
            }
        }
    }
}

#[test]
fn test_refinement_averages_both_passes() {
    // Two quiet moves at depth 2: first pass is the static eval of the
    // child, the refinement searches one ply deeper.
    let mut tree = Tree::default();
    let root = tree.node(0);
    let a = tree.node(-40);
    let b = tree.node(-10);
    let a1 = tree.node(-5);
    let b1 = tree.node(-101);
    tree.quiet(root, a);
    tree.quiet(root, b);
    tree.quiet(a, a1);
    tree.quiet(b, b1);
    let root = tree.root();

    let ranked = tree_ranker().rank(&root, &params(2, 8, 2, 1)).unwrap();
    // a: (40 + -5).div_euclid(2) = 17; b: (10 + -101).div_euclid(2) = -46
    assert_eq!(ranked.len(), 2);
    assert_eq!((ranked[0].mv, ranked[0].score), (a, 17));
    assert_eq!((ranked[1].mv, ranked[1].score), (b, -46));
}

#[test]
fn test_ties_keep_generation_order() {
    let mut tree = Tree::default();
    let root = tree.node(0);
    let children: Vec<usize> = (0..5).map(|_| tree.node(7)).collect();
    for &child in &children {
        tree.quiet(root, child);
    }
    let root = tree.root();

    let ranked = tree_ranker().rank(&root, &params(5, 2, 1, 3)).unwrap();
    let order: Vec<usize> = ranked.iter().map(|r| r.mv).collect();
    assert_eq!(order, children);
    assert!(ranked.iter().all(|r| r.score == -7 && r.kind == MoveKind::Quiet));
}

#[test]
fn test_batch_searches_captures_then_quiet_by_static_score() {
    // Generation order mixes captures and quiet moves. All children are
    // leaves, so every search at depth 1 scores them one at a time.
    let mut tree = Tree::default();
    let root = tree.node(0);
    let c1 = tree.node(0);
    let q1 = tree.node(30);
    let c2 = tree.node(0);
    let q2 = tree.node(-20);
    let c3 = tree.node(0);
    let q3 = tree.node(30);
    let q4 = tree.node(5);
    tree.capture(root, c1, 10);
    tree.quiet(root, q1);
    tree.capture(root, c2, 50);
    tree.quiet(root, q2);
    tree.capture(root, c3, 50);
    tree.quiet(root, q3);
    tree.quiet(root, q4);
    let root = tree.root();

    let ranker = tree_ranker();
    ranker.rank(&root, &params(1, 16, 1, 1)).unwrap();

    let expected = vec![
        // captures by descending hint, the tie in generation order
        vec![c2],
        vec![c3],
        vec![c1],
        // one static pass over the quiet moves
        vec![q1, q2, q3, q4],
        // best for the mover first: lowest child value, ties in generation order
        vec![q2],
        vec![q4],
        vec![q1],
        vec![q3],
    ];
    // The refinement of the single result is answered by the cache.
    assert_eq!(ranker.evaluator().log(), expected);
}

#[test]
fn test_rank_startpos() {
    let pos = Chess::default();
    let ranked = chess_ranker().rank(&pos, &params(3, 20, 2, 1)).unwrap();

    assert_eq!(ranked.len(), 3);
    let legal = Position::legal_moves(&pos);
    for rm in &ranked {
        assert!(legal.contains(&rm.mv));
    }
    let distinct: HashSet<String> = ranked.iter().map(|r| format!("{:?}", r.mv)).collect();
    assert_eq!(distinct.len(), 3);
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_rank_returns_all_moves_when_fewer_than_requested() {
    let pos = Chess::default();
    let ranked = chess_ranker().rank(&pos, &params(64, 7, 1, 2)).unwrap();
    assert_eq!(ranked.len(), 20);
}

#[test]
fn test_rank_single_legal_move() {
    // Only Kxg2 gets out of check.
    let pos = from_fen("7k/8/8/8/8/8/6q1/7K w - - 0 1");
    let ranked = chess_ranker().rank(&pos, &params(3, 4, 2, 2)).unwrap();

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].kind, MoveKind::Capture);
    assert_eq!(ranked[0].mv.to(), Square::G2);
}

#[test]
fn test_rank_checkmate_and_stalemate_are_empty() {
    let mate = from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
    let stalemate = from_fen("7k/8/8/8/8/8/5q2/7K w - - 0 1");
    let ranker = chess_ranker();

    assert!(ranker.rank(&mate, &RankParams::default()).unwrap().is_empty());
    assert!(ranker.rank(&stalemate, &RankParams::default()).unwrap().is_empty());
}

#[test]
fn test_rank_wins_hanging_queen() {
    let pos = from_fen("4k3/8/8/3q4/8/8/8/3QK3 w - - 0 1");
    let ranked = chess_ranker().rank(&pos, &params(3, 4, 2, 2)).unwrap();

    let best = &ranked[0];
    assert_eq!(best.kind, MoveKind::Capture);
    assert_eq!(best.mv.to(), Square::D5);
    assert!(best.score > 500, "score {}", best.score);
}

#[test]
fn test_castling_is_classified() {
    let pos = from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
    let ranked = chess_ranker().rank(&pos, &params(64, 8, 1, 2)).unwrap();

    let castles = ranked.iter().filter(|r| r.kind == MoveKind::Castle).count();
    assert_eq!(castles, 2);
    assert!(ranked.iter().all(|r| (r.kind == MoveKind::Castle) == r.mv.is_castle()));
}

#[test]
fn test_rank_is_deterministic_across_parallelism() {
    let mut rng = StdRng::seed_from_u64(0xA5E5);
    for _ in 0..4 {
        let pos = random_playout(&mut rng, 12);
        let serial = chess_ranker().rank(&pos, &params(5, 5, 2, 1)).unwrap();
        let parallel = chess_ranker().rank(&pos, &params(5, 5, 2, 4)).unwrap();
        let again = chess_ranker().rank(&pos, &params(5, 5, 2, 4)).unwrap();
        assert_eq!(serial, parallel);
        assert_eq!(parallel, again);
    }
}

#[test]
fn test_rank_reuses_session_cache() {
    let ranker = chess_ranker();
    let pos = Chess::default();
    let first = ranker.rank(&pos, &params(3, 20, 2, 2)).unwrap();
    let entries = ranker.cache().len();
    assert!(entries > 0);

    let (second, stats) = ranker.rank_with_stats(&pos, &params(3, 20, 2, 2)).unwrap();
    assert_eq!(first, second);
    assert_eq!(stats.leaf_evals, 0);
    assert_eq!(ranker.cache().len(), entries);
}

#[test]
fn test_rank_with_unloaded_evaluator_fails() {
    let ranker: Ranker<Chess, BatchEvaluator> = Ranker::new(
        Arc::new(BatchEvaluator::unloaded(32)),
        Arc::new(TranspositionCache::default()),
    );
    let result = ranker.rank(&Chess::default(), &RankParams::default());
    assert!(matches!(result, Err(EngineError::EvaluatorUnavailable)));
}

#[test]
fn test_rank_normalizes_zero_params() {
    let pos = Chess::default();
    let ranked = chess_ranker().rank(&pos, &params(0, 0, 0, 0)).unwrap();
    assert_eq!(ranked.len(), 1);
}
