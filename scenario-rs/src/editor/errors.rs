use indexmap::IndexMap;
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use crate::data::AgeGroup;

/// Column messages of one row, column name -> message, in the order they
/// were reported.
pub type RowErrors = IndexMap<String, String>;

/// Validation errors of the age group table, row index -> column -> message.
pub type FieldErrors = BTreeMap<usize, RowErrors>;

/// A validation error located on the table.
///
/// The age group comes from the row index through the canonical age group
/// ordering, not from the row itself. Indices past the last age group have no
/// age group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    pub column: String,
    pub age_group: Option<AgeGroup>,
    pub message: String,
}

impl Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = self.age_group.map(AgeGroup::label).unwrap_or("undefined");
        write!(f, "Column \"{}\", row \"{}\": {}", self.column, row, self.message)
    }
}

/// Flatten nested field errors into located messages, by row index and then
/// in the order the columns were reported.
pub fn error_messages(errors: &FieldErrors) -> Vec<ErrorMessage> {
    errors
        .iter()
        .flat_map(|(&index, row)| {
            let age_group = AgeGroup::from_index(index);
            row.iter().map(move |(column, message)| ErrorMessage {
                column: column.clone(),
                age_group,
                message: message.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(json: &str) -> FieldErrors {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn row_index_maps_to_age_group() {
        let msgs = error_messages(&errors(r#"{"2": {"severe": "too high"}}"#));
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].column, "severe");
        assert_eq!(msgs[0].age_group, Some(AgeGroup::Age20To29));
        assert_eq!(msgs[0].to_string(), r#"Column "severe", row "20-29": too high"#);
    }

    #[test]
    fn out_of_range_index_has_no_age_group() {
        let msgs = error_messages(&errors(r#"{"12": {"fatal": "must be a number"}}"#));
        assert_eq!(msgs[0].age_group, None);
        assert_eq!(
            msgs[0].to_string(),
            r#"Column "fatal", row "undefined": must be a number"#
        );
    }

    #[test]
    fn empty_rows_are_skipped_and_rows_are_ordered() {
        let msgs = error_messages(&errors(
            r#"{"10": {"a": "x"}, "1": {}, "0": {"severe": "s", "confirmed": "c"}}"#,
        ));
        let text: Vec<String> = msgs.iter().map(|m| m.to_string()).collect();
        assert_eq!(
            text,
            vec![
                r#"Column "severe", row "0-9": s"#,
                r#"Column "confirmed", row "0-9": c"#,
                r#"Column "a", row "undefined": x"#,
            ]
        );
    }

    #[test]
    fn columns_keep_reporting_order() {
        let mut row = RowErrors::new();
        row.insert("population".into(), "p".into());
        row.insert("isolated".into(), "i".into());
        row.insert("fatal".into(), "f".into());
        let mut errors = FieldErrors::new();
        errors.insert(4, row);
        let columns: Vec<String> = error_messages(&errors)
            .into_iter()
            .map(|m| m.column)
            .collect();
        assert_eq!(columns, vec!["population", "isolated", "fatal"]);
    }
}
