use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use duplinha_core::{CardId, GameState, MatchEngine, PairId, ShuffledCardGenerator};

/// Pair up card ids from the snapshot, first sighting with second.
fn plan_pairs(state: &GameState) -> Vec<(CardId, CardId)> {
    let mut first_seen: HashMap<PairId, CardId> = HashMap::new();
    let mut plan = Vec::with_capacity(usize::from(state.total_pairs()));
    for card in state.cards() {
        match first_seen.entry(card.pair()) {
            Entry::Occupied(partner) => plan.push((*partner.get(), card.id())),
            Entry::Vacant(slot) => {
                slot.insert(card.id());
            }
        }
    }
    plan
}

fn full_game(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime");

    let mut group = c.benchmark_group("full_game");
    for grid_size in [4u8, 6, 8] {
        group.bench_function(format!("grid_{grid_size}"), |b| {
            b.iter(|| {
                runtime.block_on(async {
                    let mut engine = MatchEngine::new(ShuffledCardGenerator::new(0x1234))
                        .with_reveal_delay(Duration::ZERO);
                    engine.start_new_game(grid_size).await.expect("deal");

                    let plan = plan_pairs(engine.game_state().expect("session"));
                    for (first, second) in plan {
                        engine.try_flip_card(first).await.expect("flip");
                        engine.try_flip_card(second).await.expect("flip");
                    }
                    assert!(engine.game_state().expect("session").is_completed());
                });
            });
        });
    }
    group.finish();
}

criterion_group!(benches, full_game);
criterion_main!(benches);
