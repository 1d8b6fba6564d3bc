pub mod builder;
mod config;
pub mod manual;
mod presenter;

use log::{debug, info};

use std::collections::HashSet;

pub use crate::config::*;
pub use crate::presenter::*;

/// Finds the provisional winners of a ballot and the candidates that need a
/// tie-break.
///
/// Arguments:
/// * `candidates` the current content of every vote input, in form order
/// * `ballot` the ballot being filled in
///
/// If any vote count is incomplete, nothing is computed and
/// [Resolution::Incomplete] is returned.
pub fn resolve_winners(
    candidates: &[CandidateResult],
    ballot: &BallotContext,
) -> Result<Resolution, ResolverErrors> {
    checks(candidates, ballot)?;

    let mut counts: Vec<u64> = Vec::new();
    for cr in candidates.iter() {
        match cr.votes {
            VoteEntry::Count(c) => counts.push(c),
            VoteEntry::Incomplete => {
                debug!("resolve_winners: candidate {} is incomplete", cr.id);
                return Ok(Resolution::Incomplete);
            }
        }
    }

    // The top values, ties included: [10, 10, 3] with 1 seat gives [10].
    counts.sort_unstable();
    let winning_counts = &counts[counts.len() - ballot.winner_count() as usize..];
    // The slice is sorted, the first element is the lowest winning count.
    let lowest_winning = winning_counts[0];
    debug!(
        "resolve_winners: winning counts: {:?} lowest: {}",
        winning_counts, lowest_winning
    );

    let mut winners: Vec<CandidateResult> = candidates
        .iter()
        .filter(|cr| matches!(cr.votes, VoteEntry::Count(c) if winning_counts.contains(&c)))
        .cloned()
        .collect();
    // Stable sort: equal counts keep the form order.
    winners.sort_by_key(|cr| std::cmp::Reverse(cr.votes.count()));

    if winners.len() == ballot.winner_count() as usize {
        info!(
            "{} winner(s), no tie-break needed: {:?}",
            winners.len(),
            winner_names(&winners)
        );
        return Ok(Resolution::Complete(ResolutionResult {
            winners,
            tied_for_lowest_winning_seat: Vec::new(),
            contested_count: None,
        }));
    }

    let tied: Vec<CandidateResult> = winners
        .iter()
        .filter(|cr| cr.votes == VoteEntry::Count(lowest_winning))
        .cloned()
        .collect();
    info!(
        "{} winner(s) for {} seat(s), tied at {} votes: {:?}",
        winners.len(),
        ballot.winner_count(),
        lowest_winning,
        winner_names(&tied)
    );
    Ok(Resolution::Complete(ResolutionResult {
        winners,
        tied_for_lowest_winning_seat: tied,
        contested_count: Some(lowest_winning),
    }))
}

fn checks(candidates: &[CandidateResult], ballot: &BallotContext) -> Result<(), ResolverErrors> {
    if candidates.len() < ballot.winner_count() as usize {
        return Err(ResolverErrors::NotEnoughCandidates {
            winner_count: ballot.winner_count(),
            candidates: candidates.len(),
        });
    }
    let mut seen: HashSet<&CandidateId> = HashSet::new();
    for cr in candidates.iter() {
        if !seen.insert(&cr.id) {
            return Err(ResolverErrors::DuplicateCandidate(cr.id.clone()));
        }
    }
    Ok(())
}

fn winner_names(results: &[CandidateResult]) -> Vec<String> {
    results.iter().map(|cr| cr.id.0.clone()).collect()
}
