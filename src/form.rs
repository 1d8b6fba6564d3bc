use log::{debug, info, warn};

use snafu::{prelude::*, ErrorCompat, Snafu};
use tied_winner::*;

use std::collections::BTreeMap;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod snapshot;

use crate::form::snapshot::*;

#[derive(Debug, Snafu)]
pub enum FormError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    SerializingSummary { source: serde_json::Error },
    #[snafu(display("Field {name} appears more than once"))]
    DuplicateField { name: String },
    #[snafu(display("Tie-break field {name} has no vote input"))]
    OrphanTieBreak { name: String },
    #[snafu(display("Change on unknown field {name}"))]
    UnknownField { name: String },
    #[snafu(display("Resolver error: {source}"))]
    Resolver { source: ResolverErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type FormResult<T> = Result<T, FormError>;

/// The outcome of one run of the widget.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StepSummary {
    pub step: u32,
    /// "load" for the initial run, otherwise the name of the changed field.
    pub trigger: String,
    /// One of "disabled", "incomplete", "decided", "tied".
    pub status: String,
    pub winners: Vec<String>,
    #[serde(rename = "tiedForLowestWinningSeat")]
    pub tied_for_lowest_winning_seat: Vec<String>,
    #[serde(rename = "contestedCount")]
    pub contested_count: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(rename = "formId")]
    pub form_id: Option<String>,
    #[serde(rename = "winnerCount")]
    pub winner_count: Option<u32>,
}

fn ids(crs: &[CandidateResult]) -> Vec<String> {
    crs.iter().map(|cr| cr.id.0.clone()).collect()
}

fn step_summary(step: u32, trigger: &str, resolution: Option<&Resolution>) -> StepSummary {
    let (status, winners, tied, contested_count) = match resolution {
        None => ("disabled", vec![], vec![], None),
        Some(Resolution::Incomplete) => ("incomplete", vec![], vec![], None),
        Some(Resolution::Complete(r)) => (
            if r.needs_tie_break() { "tied" } else { "decided" },
            ids(&r.winners),
            ids(&r.tied_for_lowest_winning_seat),
            r.contested_count,
        ),
    };
    StepSummary {
        step,
        trigger: trigger.to_string(),
        status: status.to_string(),
        winners,
        tied_for_lowest_winning_seat: tied,
        contested_count,
    }
}

/// Runs the widget on the snapshot: once for the page load, then once after
/// every change.
pub fn replay(
    snapshot: &FormSnapshot,
    winner_count_override: Option<u32>,
) -> FormResult<(ResultsPage, Vec<StepSummary>)> {
    let mut page = ResultsPage::from_snapshot(snapshot, winner_count_override)?;
    let widget = match TieBreakWidget::attach(&page) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!(
                "Tie-break widget disabled for form {:?}: {}",
                snapshot.form_id, e
            );
            None
        }
    };

    let mut steps: Vec<StepSummary> = Vec::new();
    let mut trigger = "load".to_string();
    let mut pending = snapshot.changes.iter();
    loop {
        let step = steps.len() as u32;
        let resolution = match &widget {
            Some(w) => {
                // The controls are part of the page: detach them while the form is read.
                let mut controls = std::mem::take(&mut page.controls);
                let res = w.refresh(&page, &mut controls);
                page.controls = controls;
                Some(res.context(ResolverSnafu {})?)
            }
            None => None,
        };
        let s = step_summary(step, &trigger, resolution.as_ref());
        info!("Step {}: {} -> {}", step, s.trigger, s.status);
        steps.push(s);

        match pending.next() {
            Some(change) => {
                debug!("replay: applying {:?}", change);
                page.apply_change(change)?;
                trigger = change.name.clone();
            }
            None => break,
        }
    }
    Ok((page, steps))
}

fn build_summary_js(
    snapshot: &FormSnapshot,
    page: &ResultsPage,
    steps: &[StepSummary],
) -> FormResult<JSValue> {
    let c = OutputConfig {
        form_id: snapshot.form_id.clone(),
        winner_count: page.winner_count(),
    };
    let mut controls: BTreeMap<String, JSValue> = BTreeMap::new();
    for (cid, state) in page.controls.iter() {
        controls.insert(
            tie_break_field_name(cid),
            json!({"visible": state.visible, "checked": state.checked}),
        );
    }
    Ok(json!({
        "config": serde_json::to_value(&c).context(SerializingSummarySnafu {})?,
        "steps": serde_json::to_value(steps).context(SerializingSummarySnafu {})?,
        "controls": controls,
    }))
}

pub fn read_summary(path: &str) -> FormResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_summary: {:?}", js);
    Ok(js)
}

/// Replays a form snapshot and writes the summary.
///
/// * `out` a file path, or `stdout` (the default)
/// * `check_summary_path` if provided, the summary must match this reference
pub fn run_form(
    config_path: &str,
    check_summary_path: Option<&str>,
    out: Option<&str>,
    winner_count_override: Option<u32>,
) -> FormResult<()> {
    let snapshot = read_snapshot(config_path)?;
    info!(
        "form {:?}: {} field(s), {} change(s)",
        snapshot.form_id,
        snapshot.fields.len(),
        snapshot.changes.len()
    );

    let (page, steps) = replay(&snapshot, winner_count_override)?;
    let result_js = build_summary_js(&snapshot, &page, &steps)?;
    let pretty_js_stats =
        serde_json::to_string_pretty(&result_js).context(SerializingSummarySnafu {})?;

    match out {
        None | Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => {
            info!("Writing summary to {}", path);
            fs::write(path, &pretty_js_stats).context(WritingSummarySnafu { path })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p)?;
        if summary_ref != result_js {
            let pretty_js_summary_ref =
                serde_json::to_string_pretty(&summary_ref).context(SerializingSummarySnafu {})?;
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_str(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}

pub fn print_error(e: &FormError) {
    eprintln!("An error occured: {}", e);
    if let Some(bt) = ErrorCompat::backtrace(e) {
        eprintln!("trace: {}", bt);
    }
}

#[cfg(test)]
fn run_form_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> FormResult<()> {
    let test_dir = option_env!("TIEBREAK_TEST_DIR")
        .unwrap_or(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata"));
    info!("Running test {}", test_name);
    let res = run_form(
        format!("{}/{}/{}", test_dir, test_name, config_lpath).as_str(),
        Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath).as_str()),
        None,
        None,
    );
    if let Err(e) = &res {
        print_error(e);
    }
    res
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    let res = run_form_test(
        test_name,
        format!("{}_form.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    );
    assert!(res.is_ok(), "test {} failed", test_name);
}
