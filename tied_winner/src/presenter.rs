// The seams between the resolver and the page that hosts it.

use log::{debug, warn};

use std::collections::BTreeMap;

use crate::builder::Builder;
use crate::config::*;

/// Read access to a results entry form.
pub trait ResultsForm {
    /// The raw text of the winner count attribute attached to the form, if any.
    fn winner_count_attribute(&self) -> Option<String>;

    /// The current content of every vote input, as (candidate id, text) pairs
    /// in the order of the form.
    fn vote_inputs(&self) -> Vec<(String, String)>;
}

/// Shows and hides the tie-break (coin toss) control of each candidate.
pub trait TieBreakPresenter {
    /// Makes the control visible. Its checked state is left untouched.
    fn reveal_tie_break(&mut self, cid: &CandidateId);

    /// Hides the control and unchecks it.
    fn hide_tie_break(&mut self, cid: &CandidateId);
}

/// The tie-break widget attached to one results form.
///
/// ```
/// use tied_winner::*;
///
/// struct Form(Vec<(String, String)>);
///
/// impl ResultsForm for Form {
///     fn winner_count_attribute(&self) -> Option<String> {
///         Some("1".to_string())
///     }
///     fn vote_inputs(&self) -> Vec<(String, String)> {
///         self.0.clone()
///     }
/// }
///
/// let form = Form(vec![
///     ("15".to_string(), "10".to_string()),
///     ("16".to_string(), "10".to_string()),
///     ("17".to_string(), "3".to_string()),
/// ]);
/// let widget = TieBreakWidget::attach(&form)?;
/// let mut controls = TieBreakControls::new();
/// widget.refresh(&form, &mut controls)?;
///
/// assert!(controls.is_visible(&CandidateId::new("15")));
/// assert!(controls.is_visible(&CandidateId::new("16")));
/// assert!(!controls.is_visible(&CandidateId::new("17")));
/// # Ok::<(), ResolverErrors>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TieBreakWidget {
    ballot: BallotContext,
}

impl TieBreakWidget {
    /// Validates the configuration of the form.
    ///
    /// A form that fails here should be left alone: the server validates the
    /// results on submission anyway.
    pub fn attach<F: ResultsForm>(form: &F) -> Result<TieBreakWidget, ResolverErrors> {
        let attr = form
            .winner_count_attribute()
            .ok_or_else(|| ResolverErrors::InvalidWinnerCount("".to_string()))?;
        let ballot = BallotContext::from_attribute(&attr)?;
        let num_inputs = form.vote_inputs().len();
        if num_inputs < ballot.winner_count() as usize {
            return Err(ResolverErrors::NotEnoughCandidates {
                winner_count: ballot.winner_count(),
                candidates: num_inputs,
            });
        }
        debug!(
            "attach: {} seat(s), {} vote input(s)",
            ballot.winner_count(),
            num_inputs
        );
        Ok(TieBreakWidget { ballot })
    }

    /// Attaches with a known ballot, bypassing the form attribute.
    pub fn with_ballot(ballot: &BallotContext) -> TieBreakWidget {
        TieBreakWidget { ballot: *ballot }
    }

    pub fn ballot(&self) -> &BallotContext {
        &self.ballot
    }

    /// Recomputes the winners from the current content of the form and updates
    /// every tie-break control.
    ///
    /// To be called once when the page is loaded, and after every change.
    pub fn refresh<F: ResultsForm, P: TieBreakPresenter>(
        &self,
        form: &F,
        presenter: &mut P,
    ) -> Result<Resolution, ResolverErrors> {
        let builder = Builder::new(&self.ballot).candidates(&form.vote_inputs())?;
        let resolution = builder.resolve()?;
        let candidates = builder.build();
        match resolution.result() {
            Some(r) => {
                for cr in candidates.iter() {
                    if r.is_tied(&cr.id) {
                        presenter.reveal_tie_break(&cr.id);
                    } else {
                        presenter.hide_tie_break(&cr.id);
                    }
                }
            }
            None => {
                for cr in candidates.iter() {
                    presenter.hide_tie_break(&cr.id);
                }
            }
        }
        Ok(resolution)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct ControlState {
    pub visible: bool,
    pub checked: bool,
}

/// An in-memory set of tie-break controls.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TieBreakControls {
    controls: BTreeMap<CandidateId, ControlState>,
}

impl TieBreakControls {
    pub fn new() -> TieBreakControls {
        TieBreakControls::default()
    }

    /// Declares a control with its state as rendered by the server.
    pub fn insert(&mut self, cid: &CandidateId, state: ControlState) {
        self.controls.insert(cid.clone(), state);
    }

    /// The user ticks or unticks a control.
    ///
    /// Hidden controls cannot be clicked: the change is ignored.
    pub fn set_checked(&mut self, cid: &CandidateId, checked: bool) {
        let state = self.controls.entry(cid.clone()).or_default();
        if state.visible {
            state.checked = checked;
        } else {
            warn!("ignoring a click on hidden tie-break control {}", cid);
        }
    }

    pub fn state(&self, cid: &CandidateId) -> ControlState {
        self.controls.get(cid).cloned().unwrap_or_default()
    }

    pub fn is_visible(&self, cid: &CandidateId) -> bool {
        self.state(cid).visible
    }

    pub fn is_checked(&self, cid: &CandidateId) -> bool {
        self.state(cid).checked
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CandidateId, &ControlState)> {
        self.controls.iter()
    }
}

impl TieBreakPresenter for TieBreakControls {
    fn reveal_tie_break(&mut self, cid: &CandidateId) {
        self.controls.entry(cid.clone()).or_default().visible = true;
    }

    fn hide_tie_break(&mut self, cid: &CandidateId) {
        self.controls.insert(cid.clone(), ControlState::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestForm {
        winner_count: Option<String>,
        inputs: Vec<(String, String)>,
    }

    impl TestForm {
        fn new(winner_count: &str, inputs: &[&str]) -> TestForm {
            TestForm {
                winner_count: Some(winner_count.to_string()),
                inputs: inputs
                    .iter()
                    .enumerate()
                    .map(|(idx, s)| (format!("c{}", idx), s.to_string()))
                    .collect(),
            }
        }

        fn set(&mut self, idx: usize, value: &str) {
            self.inputs[idx].1 = value.to_string();
        }
    }

    impl ResultsForm for TestForm {
        fn winner_count_attribute(&self) -> Option<String> {
            self.winner_count.clone()
        }

        fn vote_inputs(&self) -> Vec<(String, String)> {
            self.inputs.clone()
        }
    }

    fn cid(idx: usize) -> CandidateId {
        CandidateId(format!("c{}", idx))
    }

    fn visible(controls: &TieBreakControls, n: usize) -> Vec<bool> {
        (0..n).map(|idx| controls.is_visible(&cid(idx))).collect()
    }

    #[test]
    fn attach_rejects_bad_winner_counts() {
        let form = TestForm::new("abc", &["1", "2"]);
        assert_eq!(
            TieBreakWidget::attach(&form),
            Err(ResolverErrors::InvalidWinnerCount("abc".to_string()))
        );
        let form = TestForm::new("0", &["1", "2"]);
        assert_eq!(
            TieBreakWidget::attach(&form),
            Err(ResolverErrors::ZeroWinnerCount)
        );
        let form = TestForm::new("-1", &["1", "2"]);
        assert!(TieBreakWidget::attach(&form).is_err());
        let form = TestForm::new("3", &["1", "2"]);
        assert_eq!(
            TieBreakWidget::attach(&form),
            Err(ResolverErrors::NotEnoughCandidates {
                winner_count: 3,
                candidates: 2
            })
        );
        let form = TestForm {
            winner_count: None,
            inputs: vec![],
        };
        assert!(TieBreakWidget::attach(&form).is_err());
    }

    #[test]
    fn reveal_tied_controls() {
        let form = TestForm::new("2", &["10", "10", "10", "3"]);
        let widget = TieBreakWidget::attach(&form).unwrap();
        let mut controls = TieBreakControls::new();
        widget.refresh(&form, &mut controls).unwrap();
        assert_eq!(visible(&controls, 4), vec![true, true, true, false]);
    }

    #[test]
    fn incomplete_hides_everything() {
        let mut form = TestForm::new("1", &["10", "10", "3"]);
        let widget = TieBreakWidget::attach(&form).unwrap();
        let mut controls = TieBreakControls::new();
        widget.refresh(&form, &mut controls).unwrap();
        controls.set_checked(&cid(0), true);
        assert!(controls.is_checked(&cid(0)));

        form.set(2, "");
        let res = widget.refresh(&form, &mut controls).unwrap();
        assert_eq!(res, Resolution::Incomplete);
        assert_eq!(visible(&controls, 3), vec![false, false, false]);
        assert!(!controls.is_checked(&cid(0)));

        form.set(2, "x3");
        widget.refresh(&form, &mut controls).unwrap();
        assert_eq!(visible(&controls, 3), vec![false, false, false]);
    }

    #[test]
    fn revealed_controls_keep_their_checked_state() {
        let form = TestForm::new("1", &["10", "10", "3"]);
        let widget = TieBreakWidget::attach(&form).unwrap();
        let mut controls = TieBreakControls::new();
        // Redisplayed after a server-side validation error.
        controls.insert(
            &cid(1),
            ControlState {
                visible: false,
                checked: true,
            },
        );
        widget.refresh(&form, &mut controls).unwrap();
        assert!(controls.is_visible(&cid(1)));
        assert!(controls.is_checked(&cid(1)));
        assert!(!controls.is_checked(&cid(0)));
    }

    #[test]
    fn resolving_the_tie_hides_the_controls() {
        let mut form = TestForm::new("1", &["10", "10", "3"]);
        let widget = TieBreakWidget::attach(&form).unwrap();
        let mut controls = TieBreakControls::new();
        widget.refresh(&form, &mut controls).unwrap();
        controls.set_checked(&cid(1), true);

        form.set(0, "11");
        widget.refresh(&form, &mut controls).unwrap();
        assert_eq!(visible(&controls, 3), vec![false, false, false]);
        assert!(!controls.is_checked(&cid(1)));
    }

    #[test]
    fn refresh_is_idempotent() {
        let form = TestForm::new("2", &["7", "10", "3", "7"]);
        let widget = TieBreakWidget::attach(&form).unwrap();
        let mut controls = TieBreakControls::new();
        let first = widget.refresh(&form, &mut controls).unwrap();
        let snapshot = controls.clone();
        let second = widget.refresh(&form, &mut controls).unwrap();
        assert_eq!(first, second);
        assert_eq!(snapshot, controls);
        assert_eq!(visible(&controls, 4), vec![true, false, false, true]);
    }

    #[test]
    fn known_ballot() {
        // No winner count attribute on the form.
        let form = TestForm {
            winner_count: None,
            inputs: vec![("a".to_string(), "4".to_string()), ("b".to_string(), "4".to_string())],
        };
        let widget = TieBreakWidget::with_ballot(&BallotContext::new(2).unwrap());
        assert_eq!(widget.ballot().winner_count(), 2);
        let mut controls = TieBreakControls::new();
        let res = widget.refresh(&form, &mut controls).unwrap();
        assert!(!res.result().unwrap().needs_tie_break());
        assert_eq!(controls.iter().count(), 2);
        assert!(controls.iter().all(|(_, s)| !s.visible));
    }

    #[test]
    fn hidden_controls_ignore_clicks() {
        let mut controls = TieBreakControls::new();
        controls.set_checked(&cid(0), true);
        assert!(!controls.is_checked(&cid(0)));
    }
}
