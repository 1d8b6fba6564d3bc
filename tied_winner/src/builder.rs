pub use crate::config::*;

use log::debug;

/// A builder for assembling the candidate results from the raw content of the
/// vote inputs.
///
/// ```
/// pub use tied_winner::builder::Builder;
/// pub use tied_winner::BallotContext;
/// # use tied_winner::ResolverErrors;
///
/// let ballot = BallotContext::new(1)?;
/// let mut builder = Builder::new(&ballot);
/// builder.candidate("15", "10")?;
/// builder.candidate("16", "")?;
///
/// let resolution = builder.resolve()?;
/// assert!(resolution.result().is_none());
///
/// # Ok::<(), ResolverErrors>(())
/// ```
pub struct Builder {
    pub(crate) _ballot: BallotContext,
    pub(crate) _candidates: Vec<CandidateResult>,
}

impl Builder {
    pub fn new(ballot: &BallotContext) -> Builder {
        Builder {
            _ballot: *ballot,
            _candidates: Vec::new(),
        }
    }

    /// Adds all the candidates at once, as (candidate id, input text) pairs.
    pub fn candidates(mut self, inputs: &[(String, String)]) -> Result<Builder, ResolverErrors> {
        for (cid, raw) in inputs {
            self.candidate(cid, raw)?;
        }
        Ok(self)
    }

    /// Adds the content of one vote input.
    ///
    /// The content does not need to be a number: anything that is not a whole,
    /// non-negative number is recorded as incomplete.
    pub fn candidate(&mut self, cid: &str, raw: &str) -> Result<(), ResolverErrors> {
        let votes = parse_vote_entry(raw);
        debug!("candidate {}: {:?} -> {:?}", cid, raw, votes);
        self.add_result(&CandidateResult {
            id: CandidateId::new(cid),
            votes,
        })
    }

    pub fn add_result(&mut self, result: &CandidateResult) -> Result<(), ResolverErrors> {
        if self._candidates.iter().any(|cr| cr.id == result.id) {
            return Err(ResolverErrors::DuplicateCandidate(result.id.clone()));
        }
        self._candidates.push(result.clone());
        Ok(())
    }

    pub fn build(self) -> Vec<CandidateResult> {
        self._candidates
    }

    pub fn resolve(&self) -> Result<Resolution, ResolverErrors> {
        crate::resolve_winners(&self._candidates, &self._ballot)
    }
}

/// Reads the text of a vote input.
pub fn parse_vote_entry(raw: &str) -> VoteEntry {
    match raw.trim().parse::<u64>() {
        Ok(c) => VoteEntry::Count(c),
        Err(_) => VoteEntry::Incomplete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_entries() {
        assert_eq!(parse_vote_entry("12"), VoteEntry::Count(12));
        assert_eq!(parse_vote_entry(" 7 "), VoteEntry::Count(7));
        assert_eq!(parse_vote_entry("0"), VoteEntry::Count(0));
        assert_eq!(parse_vote_entry(""), VoteEntry::Incomplete);
        assert_eq!(parse_vote_entry("abc"), VoteEntry::Incomplete);
        assert_eq!(parse_vote_entry("-3"), VoteEntry::Incomplete);
        assert_eq!(parse_vote_entry("12.0"), VoteEntry::Incomplete);
    }

    #[test]
    fn duplicate_candidate() {
        let ballot = BallotContext::new(1).unwrap();
        let mut builder = Builder::new(&ballot);
        builder.candidate("15", "3").unwrap();
        assert_eq!(
            builder.candidate("15", "4"),
            Err(ResolverErrors::DuplicateCandidate(CandidateId::new("15")))
        );
    }

    #[test]
    fn candidates_in_bulk() {
        let ballot = BallotContext::new(1).unwrap();
        let inputs = vec![
            ("a".to_string(), "10".to_string()),
            ("b".to_string(), "10".to_string()),
        ];
        let builder = Builder::new(&ballot).candidates(&inputs).unwrap();
        let res = builder.resolve().unwrap();
        let r = res.result().unwrap();
        assert_eq!(r.contested_count, Some(10));
        assert_eq!(builder.build().len(), 2);
    }
}
