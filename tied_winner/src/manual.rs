/*!

This is the long-form manual for `tied_winner` and `tiebreak`.

## The results form

Results for a ballot are entered in a form with one vote input per candidate.
Next to each vote input sits a checkbox labelled "Coin toss winner?". The
checkbox is hidden by default. It only needs to be shown when candidates
share the lowest number of votes that still wins a seat, and there are more
of them than seats left.

The form carries the number of seats to fill in a `winnerCount` data
attribute.

### Naming convention

* a vote input is named `memberships_<person id>`
* its checkbox is named `tied_vote_memberships_<person id>`

Any other field (turnout, spoilt ballots, source) is ignored.

## How winners are found

All the vote counts are sorted, and the `winnerCount` highest values are the
winning counts. Every candidate whose count is one of the winning counts is a
provisional winner. For example, with two seats and the counts
`10, 10, 10, 3`, the winning counts are `10, 10` and the three candidates with
10 votes are provisional winners.

When there are exactly as many provisional winners as seats, no coin toss is
needed and every checkbox is hidden and unticked. Otherwise the lowest winning
count is contested and the checkbox of every candidate with that count is
shown. Candidates above the contested count keep their seat.

While any vote input is empty or does not contain a whole number, nothing is
computed and every checkbox is hidden and unticked.

A checkbox that is revealed keeps its ticked state. This matters when the
server sends the form back with an error: the coin toss results already
entered are shown again.

## Configuration errors

A missing or non numeric `winnerCount`, a count of zero, or more seats than
candidates prevents the widget from running. The form is still usable and the
server validates the results on submission.

## The `tiebreak` program

`tiebreak` replays the widget on a JSON snapshot of a form:

```json
{
  "formId": "ballot_paper_results_form",
  "data": { "winnerCount": "1" },
  "fields": [
    { "name": "memberships_15", "value": "10" },
    { "name": "tied_vote_memberships_15", "checked": false, "visible": false },
    { "name": "memberships_16", "value": "10" },
    { "name": "source", "value": "Council website" }
  ],
  "changes": [
    { "name": "memberships_16", "value": "9" }
  ]
}
```

The widget runs once for the page load, then once after each change. The
summary lists the outcome of every step and the final state of the
checkboxes:

```bash
tiebreak --config form.json --out summary.json
```

With `--reference expected.json`, the summary is compared with an expected
summary and the differences are printed.

*/
