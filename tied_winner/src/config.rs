// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The identifier of a candidate on the results form.
///
/// It is opaque to the resolver: only equality matters.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn new(s: &str) -> CandidateId {
        CandidateId(s.to_string())
    }
}

impl Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The content of a vote count input.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum VoteEntry {
    /// A complete, non-negative vote count.
    Count(u64),
    /// The input is empty, or contains something that is not a vote count.
    /// This is not an error: the user has not finished typing.
    Incomplete,
}

impl VoteEntry {
    pub fn count(&self) -> Option<u64> {
        match self {
            VoteEntry::Count(c) => Some(*c),
            VoteEntry::Incomplete => None,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CandidateResult {
    pub id: CandidateId,
    pub votes: VoteEntry,
}

/// The ballot being filled in.
///
/// The winner count is always at least 1 once constructed.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct BallotContext {
    winner_count: u32,
}

impl BallotContext {
    pub fn new(winner_count: u32) -> Result<BallotContext, ResolverErrors> {
        if winner_count == 0 {
            return Err(ResolverErrors::ZeroWinnerCount);
        }
        Ok(BallotContext { winner_count })
    }

    /// Reads the winner count from the text of a data attribute.
    pub fn from_attribute(attr: &str) -> Result<BallotContext, ResolverErrors> {
        match attr.trim().parse::<u32>() {
            Ok(x) => BallotContext::new(x),
            Err(_) => Err(ResolverErrors::InvalidWinnerCount(attr.to_string())),
        }
    }

    pub fn winner_count(&self) -> u32 {
        self.winner_count
    }
}

// ******** Output data structures *********

/// The provisional winners of a ballot with complete vote counts.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResolutionResult {
    /// Sorted by decreasing number of votes. Candidates with the same number of
    /// votes keep the order of the form.
    pub winners: Vec<CandidateResult>,
    /// The winners that share the lowest winning vote count, when there are more
    /// winners than seats. Empty otherwise.
    pub tied_for_lowest_winning_seat: Vec<CandidateResult>,
    /// The lowest winning vote count, only set when a tie-break is needed.
    pub contested_count: Option<u64>,
}

impl ResolutionResult {
    pub fn needs_tie_break(&self) -> bool {
        !self.tied_for_lowest_winning_seat.is_empty()
    }

    pub fn is_tied(&self, id: &CandidateId) -> bool {
        self.tied_for_lowest_winning_seat
            .iter()
            .any(|cr| cr.id == *id)
    }

    pub fn is_winner(&self, id: &CandidateId) -> bool {
        self.winners.iter().any(|cr| cr.id == *id)
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Resolution {
    /// At least one vote count is missing. Nothing was computed.
    Incomplete,
    Complete(ResolutionResult),
}

impl Resolution {
    pub fn result(&self) -> Option<&ResolutionResult> {
        match self {
            Resolution::Incomplete => None,
            Resolution::Complete(r) => Some(r),
        }
    }
}

/// Configuration defects that prevent the resolver from running.
///
/// Incomplete vote counts are not errors, see [VoteEntry::Incomplete].
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ResolverErrors {
    /// The winner count attribute is missing or not a number.
    InvalidWinnerCount(String),
    ZeroWinnerCount,
    /// More seats than candidates on the form.
    NotEnoughCandidates { winner_count: u32, candidates: usize },
    DuplicateCandidate(CandidateId),
}

impl Error for ResolverErrors {}

impl Display for ResolverErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolverErrors::InvalidWinnerCount(s) => {
                write!(f, "invalid winner count: {:?}", s)
            }
            ResolverErrors::ZeroWinnerCount => write!(f, "the winner count must be at least 1"),
            ResolverErrors::NotEnoughCandidates {
                winner_count,
                candidates,
            } => write!(
                f,
                "{} seats to fill but only {} candidates",
                winner_count, candidates
            ),
            ResolverErrors::DuplicateCandidate(cid) => {
                write!(f, "candidate {} appears more than once", cid)
            }
        }
    }
}
