// Reading form snapshots, and the naming convention of the results form fields.

use std::collections::BTreeMap;
use std::fs;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use tied_winner::*;

use crate::form::*;

const VOTE_PREFIX: &str = "memberships_";
const TIE_BREAK_PREFIX: &str = "tied_vote_memberships_";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FormData {
    /// A string in the rendered page, but hand-written snapshots may use a number.
    #[serde(rename = "winnerCount")]
    pub winner_count: Option<JSValue>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub name: String,
    pub value: Option<String>,
    pub checked: Option<bool>,
    pub visible: Option<bool>,
}

/// A user edit on one field.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FieldChange {
    pub name: String,
    pub value: Option<String>,
    pub checked: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FormSnapshot {
    #[serde(rename = "formId")]
    pub form_id: Option<String>,
    pub data: FormData,
    pub fields: Vec<FieldSnapshot>,
    #[serde(default)]
    pub changes: Vec<FieldChange>,
}

pub fn read_snapshot(path: &str) -> FormResult<FormSnapshot> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let snapshot: FormSnapshot =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_snapshot: {:?}", snapshot);
    Ok(snapshot)
}

/// What a field is, according to its name.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FieldKind {
    VoteInput(CandidateId),
    TieBreak(CandidateId),
    Other,
}

pub fn classify_field(name: &str) -> FieldKind {
    // The tie-break prefix contains the vote prefix: check it first.
    if let Some(pid) = name.strip_prefix(TIE_BREAK_PREFIX) {
        if !pid.is_empty() {
            return FieldKind::TieBreak(CandidateId::new(pid));
        }
    } else if let Some(pid) = name.strip_prefix(VOTE_PREFIX) {
        if !pid.is_empty() {
            return FieldKind::VoteInput(CandidateId::new(pid));
        }
    }
    FieldKind::Other
}

pub fn tie_break_field_name(cid: &CandidateId) -> String {
    format!("{}{}", TIE_BREAK_PREFIX, cid)
}

/// The live state of a results form: vote inputs and tie-break controls.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResultsPage {
    winner_count: Option<String>,
    // In form order.
    inputs: Vec<(CandidateId, String)>,
    pub controls: TieBreakControls,
}

impl ResultsPage {
    pub fn from_snapshot(
        snapshot: &FormSnapshot,
        winner_count_override: Option<u32>,
    ) -> FormResult<ResultsPage> {
        let winner_count = match winner_count_override {
            Some(x) => Some(x.to_string()),
            None => match &snapshot.data.winner_count {
                Some(JSValue::String(s)) => Some(s.clone()),
                Some(JSValue::Number(n)) => Some(n.to_string()),
                Some(x) => {
                    warn!("Ignoring winner count {:?}", x);
                    None
                }
                None => None,
            },
        };

        let mut inputs: Vec<(CandidateId, String)> = Vec::new();
        let mut declared: BTreeMap<CandidateId, ControlState> = BTreeMap::new();
        for field in snapshot.fields.iter() {
            match classify_field(&field.name) {
                FieldKind::VoteInput(cid) => {
                    ensure!(
                        !inputs.iter().any(|(c, _)| *c == cid),
                        DuplicateFieldSnafu { name: &field.name }
                    );
                    inputs.push((cid, field.value.clone().unwrap_or_default()));
                }
                FieldKind::TieBreak(cid) => {
                    ensure!(
                        !declared.contains_key(&cid),
                        DuplicateFieldSnafu { name: &field.name }
                    );
                    let state = ControlState {
                        visible: field.visible.unwrap_or(false),
                        checked: field.checked.unwrap_or(false),
                    };
                    declared.insert(cid, state);
                }
                FieldKind::Other => {
                    debug!("from_snapshot: skipping field {:?}", field.name);
                }
            }
        }

        let mut controls = TieBreakControls::new();
        for (cid, state) in declared.iter() {
            ensure!(
                inputs.iter().any(|(c, _)| c == cid),
                OrphanTieBreakSnafu {
                    name: tie_break_field_name(cid)
                }
            );
            controls.insert(cid, *state);
        }
        for (cid, _) in inputs.iter() {
            if !declared.contains_key(cid) {
                controls.insert(cid, ControlState::default());
            }
        }

        Ok(ResultsPage {
            winner_count,
            inputs,
            controls,
        })
    }

    pub fn apply_change(&mut self, change: &FieldChange) -> FormResult<()> {
        match classify_field(&change.name) {
            FieldKind::VoteInput(cid) => {
                let input = self
                    .inputs
                    .iter_mut()
                    .find(|(c, _)| *c == cid)
                    .context(UnknownFieldSnafu { name: &change.name })?;
                if let Some(value) = &change.value {
                    input.1 = value.clone();
                }
            }
            FieldKind::TieBreak(cid) => {
                ensure!(
                    self.inputs.iter().any(|(c, _)| *c == cid),
                    UnknownFieldSnafu { name: &change.name }
                );
                if let Some(checked) = change.checked {
                    self.controls.set_checked(&cid, checked);
                }
            }
            FieldKind::Other => {
                debug!("apply_change: change on field {:?}", change.name);
            }
        }
        Ok(())
    }

    pub fn winner_count(&self) -> Option<u32> {
        self.winner_count
            .as_ref()
            .and_then(|s| s.trim().parse::<u32>().ok())
    }
}

impl ResultsForm for ResultsPage {
    fn winner_count_attribute(&self) -> Option<String> {
        self.winner_count.clone()
    }

    fn vote_inputs(&self) -> Vec<(String, String)> {
        self.inputs
            .iter()
            .map(|(cid, value)| (cid.0.clone(), value.clone()))
            .collect()
    }
}
