use super::{AgeGroupRecord, FieldErrors, RowErrors};
use crate::prelude::Real;

const PERCENTAGE: &str = "must be a percentage between 0 and 100";
const NON_NEGATIVE: &str = "must be a non-negative number";

fn check_percentage(errors: &mut RowErrors, column: &str, value: Real) {
    if !(value.is_finite() && (0.0..=100.0).contains(&value)) {
        errors.insert(column.to_string(), PERCENTAGE.to_string());
    }
}

/// Check the editable columns of every record and collect the violations by
/// row index. Rows without violations do not appear in the result.
pub fn validate_records(records: &[AgeGroupRecord]) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (i, record) in records.iter().enumerate() {
        let mut row = RowErrors::new();
        if !(record.population().is_finite() && record.population() >= 0.0) {
            row.insert("population".to_string(), NON_NEGATIVE.to_string());
        }
        check_percentage(&mut row, "confirmed", record.confirmed());
        check_percentage(&mut row, "severe", record.severe());
        check_percentage(&mut row, "critical", record.critical());
        check_percentage(&mut row, "fatal", record.fatal());
        check_percentage(&mut row, "isolated", record.isolated());
        if !row.is_empty() {
            errors.insert(i, row);
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AgeDistributionDatum, AgeGroup, SeverityDistributionDatum};

    fn record(age_group: AgeGroup, population: Real, severe: Real) -> AgeGroupRecord {
        AgeGroupRecord::join(
            &SeverityDistributionDatum {
                age_group,
                confirmed: 10.0,
                severe,
                critical: 10.0,
                fatal: 10.0,
                isolated: 0.0,
            },
            &AgeDistributionDatum {
                age_group,
                population,
            },
        )
    }

    #[test]
    fn valid_records_have_no_errors() {
        let records = vec![
            record(AgeGroup::Age0To9, 100.0, 0.0),
            record(AgeGroup::Age10To19, 0.0, 100.0),
        ];
        assert!(validate_records(&records).is_empty());
    }

    #[test]
    fn violations_are_keyed_by_row_index() {
        let records = vec![
            record(AgeGroup::Age0To9, 100.0, 5.0),
            record(AgeGroup::Age10To19, -1.0, 120.0),
            record(AgeGroup::Age20To29, 100.0, Real::NAN),
        ];
        let errors = validate_records(&records);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[&1]["population"], NON_NEGATIVE);
        assert_eq!(errors[&1]["severe"], PERCENTAGE);
        assert_eq!(errors[&2].len(), 1);
        assert!(errors[&2].contains_key("severe"));
    }
}
