/*!

This is the long-form manual for `seat_allocation` and `seatcalc`.

## Allocation rules

The seats of a district are allocated in four steps:

1. **Qualification.** A party takes part in the allocation if it received strictly
   more than 5% (`thresholdPercent`) of the *total* votes of the district, rejected
   votes included. With 1000 votes cast, 50 votes are not enough and 51 votes are.
2. **Bonus seat.** The party with the most votes receives one extra seat. When
   several parties share the highest count, each of them receives a bonus seat.
   If there are more tied leaders than seats, no bonus seat is given.
3. **First round.** The remaining seats are divided into the valid votes of the
   qualified parties (valid votes minus the votes of the disqualified parties) to get
   a number of votes per seat. Parties are taken in order of votes, and every party
   with at least that many votes left takes one seat, again and again, until no party
   can take a whole seat or no seat is left.
4. **Second round.** The seats still available go to the parties with the largest
   remaining votes, one each. If there are more seats than parties, the distribution
   starts again from the top of the list.

Example, 5 seats and 1000 valid votes:

| party | votes | bonus | first round | second round | seats |
|-------|-------|-------|-------------|--------------|-------|
| A     | 600   | 1     | 2           | 1            | 4     |
| B     | 300   | 0     | 1           | 0            | 1     |
| C     | 100   | 0     | 0           | 0            | 0     |

After the bonus seat, 4 seats are left, hence 250 votes per seat. A keeps 100 votes,
B keeps 50 and C keeps 100. The last seat goes to A: when remainders are equal, the
party with more votes is served first, then the party listed first.

## Election file

`seatcalc --config election.json` reads a JSON description of the election:

```json
{
  "outputSettings": { "electionName": "General election", "electionDate": "2026-08-01" },
  "rules": { "thresholdPercent": 5, "bonusSeat": true, "islandSeats": 29 },
  "provinces": [ { "id": "P1", "name": "Western" } ],
  "districts": [
    { "id": "D1", "name": "Colombo", "provinceId": "P1",
      "seatCount": 19, "totalVotes": 1200000, "rejectedVotes": 32000 }
  ],
  "parties": [
    { "id": "D1-A", "name": "Party A", "districtId": "D1", "votes": 640000 }
  ],
  "voteFileSources": [
    { "provider": "csv", "filePath": "votes.csv", "firstDataRowIndex": 2,
      "districtColumnIndex": 1, "partyIdColumnIndex": 2,
      "partyNameColumnIndex": 3, "votesColumnIndex": 4 }
  ]
}
```

All the sections except `outputSettings` and `districts` are optional.
`rules.islandSeats` adds an island-wide allocation over the merged votes of all
the districts.

## Vote files

The following providers are supported:
* `csv` Comma Separated Values
* `xlsx` Excel spreadsheets

Each row holds the votes of one party in one district:

```text
district,party_id,party,votes
D1,D1-A,Party A,640000
D1,D1-B,Party B,410000
```

Column indexes start at 1 and may also be given as spreadsheet letters (`"A"`, `"B"`).
`partyIdColumnIndex` is optional: without it, an identifier is generated from the
file name and the line number. `firstDataRowIndex` defaults to 2 (one header row).
For Excel files, `excelWorksheetName` selects the worksheet (the first one by default).

Vote counts must be non-negative integers. Negative counts are rejected.

## Output

The summary is written in JSON. Counts are written as strings, percentages with one
decimal. Parties are merged across districts by name, ignoring case and surrounding
spaces, for the province and island sections. Colours are assigned by decreasing
island-wide votes and are the same for a party everywhere in the summary.

 */
