use criterion::{black_box, criterion_group, criterion_main, Criterion};

use calcutta_core::bracket::{BracketGame, Topology};
use calcutta_core::constants::default_scoring_rules;
use calcutta_core::prediction::generate_matchups;
use calcutta_core::probability::ModelProvider;
use calcutta_core::round::Round;
use calcutta_core::simulation::{simulate, SimulationConfig};
use calcutta_core::team::Team;
use calcutta_core::values::generate_tournament_values;
use calcutta_core::win_prob::WinProbModel;

fn full_field() -> Vec<Team> {
    let regions = ["East", "Midwest", "South", "West"];
    let mut teams = Vec::with_capacity(68);
    for (r, region) in regions.iter().enumerate() {
        for seed in 1..=16u8 {
            let rating = 34.0 - 2.0 * seed as f64 - 0.4 * r as f64;
            teams.push(Team::new(format!("{}-{}", region, seed), seed, *region, rating));
            if seed == 16 {
                teams.push(Team::new(
                    format!("{}-{}b", region, seed),
                    seed,
                    *region,
                    rating - 1.0,
                ));
            }
        }
    }
    teams
}

/// 64-team knockout topology: six rounds of linked games.
fn bracket_64() -> (Topology, Vec<Team>) {
    let mut teams = Vec::with_capacity(64);
    for i in 0..64u32 {
        teams.push(Team::new(
            format!("team-{:02}", i),
            (i % 16 + 1) as u8,
            "Bench",
            32.0 - (i as f64) / 2.0,
        ));
    }

    let mut games = Vec::new();
    let mut level_size = 32usize;
    let mut round_number = 1u8;
    let mut game_index = 0usize;
    let mut previous_level: Vec<String> = Vec::new();
    while level_size >= 1 {
        let round = Round::from_number(round_number).unwrap();
        let mut level_ids = Vec::with_capacity(level_size);
        for slot in 0..level_size {
            let id = format!("g{}", game_index);
            game_index += 1;
            let mut game = BracketGame::new(id.clone(), round, "Bench", slot as u32);
            if round_number == 1 {
                game.team1 = Some(teams[slot * 2].id.clone());
                game.team2 = Some(teams[slot * 2 + 1].id.clone());
            }
            games.push(game);
            level_ids.push(id);
        }
        for (i, prev) in previous_level.iter().enumerate() {
            let position = games.iter().position(|g| &g.id == prev).unwrap();
            games[position].next = Some(calcutta_core::bracket::SlotLink {
                game_id: level_ids[i / 2].clone(),
                slot: (i % 2 + 1) as u8,
            });
        }
        previous_level = level_ids;
        if level_size == 1 {
            break;
        }
        level_size /= 2;
        round_number += 1;
    }

    (Topology::new(games).unwrap(), teams)
}

fn bench_win_prob(c: &mut Criterion) {
    let model = WinProbModel::default();
    c.bench_function("win_prob", |b| {
        b.iter(|| model.win_prob(black_box(25.0), black_box(12.0)))
    });
}

fn bench_generate_matchups(c: &mut Criterion) {
    let field = full_field();
    let model = WinProbModel::default();
    c.bench_function("generate_matchups_full_field", |b| {
        b.iter(|| generate_matchups(black_box(&field), 0, &model).unwrap())
    });
}

fn bench_tournament_values(c: &mut Criterion) {
    let field = full_field();
    let model = WinProbModel::default();
    let matchups = generate_matchups(&field, 0, &model).unwrap();
    let rules = default_scoring_rules();
    c.bench_function("generate_tournament_values_full_field", |b| {
        b.iter(|| generate_tournament_values(black_box(&matchups), &rules))
    });
}

fn bench_monte_carlo(c: &mut Criterion) {
    let (topology, teams) = bracket_64();
    let provider = ModelProvider::from_teams(&teams, WinProbModel::default());

    c.bench_function("simulate_64_teams_1000_sims", |b| {
        b.iter(|| {
            simulate(
                black_box(&topology),
                &teams,
                &provider,
                &SimulationConfig { n_sims: 1000, seed: 42, workers: 0 },
            )
            .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_win_prob,
    bench_generate_matchups,
    bench_tournament_values,
    bench_monte_carlo,
);
criterion_main!(benches);
