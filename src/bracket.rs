use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::round::Round;

/// Pointer from a game to the slot its winner fills in a later game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLink {
    pub game_id: String,
    /// Destination slot, 1 or 2.
    pub slot: u8,
}

/// One game of the bracket. Each slot either names a team up front or is
/// left empty to be filled by the winner of an earlier game linking here.
/// The final game has no outgoing link.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BracketGame {
    pub id: String,
    pub round: Round,
    pub region: String,
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub next: Option<SlotLink>,
    /// Stable key for deterministic traversal within a round.
    pub sort_order: u32,
}

impl BracketGame {
    pub fn new(id: impl Into<String>, round: Round, region: impl Into<String>, sort_order: u32) -> Self {
        BracketGame {
            id: id.into(),
            round,
            region: region.into(),
            team1: None,
            team2: None,
            next: None,
            sort_order,
        }
    }

    pub fn with_teams(mut self, team1: impl Into<String>, team2: impl Into<String>) -> Self {
        self.team1 = Some(team1.into());
        self.team2 = Some(team2.into());
        self
    }

    pub fn feeding(mut self, game_id: impl Into<String>, slot: u8) -> Self {
        self.next = Some(SlotLink {
            game_id: game_id.into(),
            slot,
        });
        self
    }
}

/// Validated, immutable bracket topology.
///
/// Games form a forest converging on a single final; validation rejects
/// empty input, duplicate ids, dangling or backwards slot links, and bad
/// slot numbers. Traversal order is fixed as (round, sort_order, id) so
/// winner propagation into dependent games is well-defined.
#[derive(Clone, Debug)]
pub struct Topology {
    games: Vec<BracketGame>,
    /// Indices into `games`, in traversal order.
    order: Vec<usize>,
    index: HashMap<String, usize>,
}

impl Topology {
    pub fn new(games: Vec<BracketGame>) -> Result<Self, EngineError> {
        if games.is_empty() {
            return Err(EngineError::EmptyTopology);
        }

        let mut index = HashMap::with_capacity(games.len());
        for (i, game) in games.iter().enumerate() {
            if index.insert(game.id.clone(), i).is_some() {
                return Err(EngineError::MalformedTopology(format!(
                    "duplicate game id {:?}",
                    game.id
                )));
            }
        }

        for game in &games {
            if let Some(link) = &game.next {
                if link.slot != 1 && link.slot != 2 {
                    return Err(EngineError::MalformedTopology(format!(
                        "game {:?} links to slot {}, expected 1 or 2",
                        game.id, link.slot
                    )));
                }
                let target = index.get(&link.game_id).ok_or_else(|| {
                    EngineError::MalformedTopology(format!(
                        "game {:?} links to unknown game {:?}",
                        game.id, link.game_id
                    ))
                })?;
                // Links must move strictly forward in round order, which
                // also rules out cycles.
                if games[*target].round <= game.round {
                    return Err(EngineError::MalformedTopology(format!(
                        "game {:?} links backwards into {:?}",
                        game.id, link.game_id
                    )));
                }
            }
        }

        let mut order: Vec<usize> = (0..games.len()).collect();
        order.sort_by(|&a, &b| {
            let ga = &games[a];
            let gb = &games[b];
            ga.round
                .cmp(&gb.round)
                .then(ga.sort_order.cmp(&gb.sort_order))
                .then(ga.id.cmp(&gb.id))
        });

        Ok(Topology { games, order, index })
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Games in fixed traversal order: round, then sort key, then id.
    pub fn games_in_order(&self) -> impl Iterator<Item = &BracketGame> {
        self.order.iter().map(move |&i| &self.games[i])
    }

    /// Storage index of a game id, used by the simulator to propagate
    /// winners into dependent games.
    pub fn position(&self, game_id: &str) -> Option<usize> {
        self.index.get(game_id).copied()
    }

    pub fn game_at(&self, position: usize) -> &BracketGame {
        &self.games[position]
    }

    /// Ids of every team named in the topology, sorted and deduplicated.
    pub fn team_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .games
            .iter()
            .flat_map(|game| game.team1.iter().chain(game.team2.iter()))
            .cloned()
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Baseline byes for a team: 1 if its earliest appearance is at a
    /// round other than the play-in round, else 0. Teams absent from the
    /// topology get no baseline bye from it.
    pub fn baseline_byes(&self, team_id: &str) -> u32 {
        let earliest = self
            .games
            .iter()
            .filter(|game| {
                game.team1.as_deref() == Some(team_id) || game.team2.as_deref() == Some(team_id)
            })
            .map(|game| game.round)
            .min();
        match earliest {
            Some(Round::FirstFour) | None => 0,
            Some(_) => 1,
        }
    }
}
