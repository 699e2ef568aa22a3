/*!

This is the long-form manual for `pivot_report` and `evalpivot`.

## Input

The input is the evaluation export of the training platform, as an Excel
workbook (`.xlsx`, `.xls`, `.xlsm`) or an OpenDocument spreadsheet (`.ods`).
The export starts with a banner of 12 rows. The records are in the worksheet
named `Hoja`, and the row right after the banner holds the column names.

The following columns are required. Their names are compared after removing
surrounding whitespace:

| column                 | role                                  |
|------------------------|---------------------------------------|
| `Número de Documento`  | identity of the person                |
| `Nombre`               | first name                            |
| `Apellidos`            | last name                             |
| `Estado`               | status of the person in the training  |
| `Competencia`          | the evaluated competency              |
| `Juicio de Evaluación` | the outcome of the evaluation         |

Other columns are ignored and copied unchanged to the output workbook.

## Output

Only the records with the status `EN FORMACION` and a judgment of
`NO APROBADO` or `POR EVALUAR` are counted. The pivot table has one row per
person (document number, first name, last name) and one column per status and
competency, named `<status> <competency>`. Every cell holds the number of
matching evaluations, 0 included. The last column, `Total General`, is the sum
of the row.

The output workbook has two sheets:
* `Hoja`: the table as read from the input
* `Hoja2`: the pivot table, with the three identity columns first

## Configuration

The names of the columns, the filtering values, the worksheet, the number of
banner rows and the output sheet names can be changed with a JSON file passed
with `--config`. All the keys are optional:

```json
{
  "worksheetName": "Hoja",
  "skipRows": 12,
  "originalSheetName": "Hoja",
  "pivotSheetName": "Hoja2",
  "columns": {
    "documentId": "Número de Documento",
    "firstName": "Nombre",
    "lastName": "Apellidos",
    "status": "Estado",
    "competency": "Competencia",
    "evaluationJudgment": "Juicio de Evaluación"
  },
  "acceptedJudgments": ["NO APROBADO", "POR EVALUAR"],
  "inTrainingStatus": "EN FORMACION",
  "totalLabel": "Total General",
  "keyOrder": "firstSeen"
}
```

The options passed on the command line take precedence over the file.

## Ordering

By default (`firstSeen`), the people and the columns appear in the order in
which they are first found in the input. With `sorted` (or `--sorted`), they
are sorted by value: blank cells first, then booleans, numbers, dates and
text.

## Summary

`--summary` writes the pivot table as JSON. Combined with `--reference`, the
summary is compared with a previously saved one, which is useful to check
that a new export gives the expected counts.
*/
