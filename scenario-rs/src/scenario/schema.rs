use serde_json::Value;

use super::{
    types::{parse_date, MitigationInterval, NumericRange},
    Section,
};
use crate::error::DecodeError;

/// JSON shape expected for a scenario field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Number,
    Text,
    NumericRange,
    DateRange,
    Intervals,
}

impl Kind {
    fn expected(self) -> &'static str {
        match self {
            Kind::Number => "a number",
            Kind::Text => "a string",
            Kind::NumericRange => "a numeric range {begin, end}",
            Kind::DateRange => "a date range {begin, end} of YYYY-MM-DD dates",
            Kind::Intervals => "a list of mitigation intervals",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Kind::Number => value.is_number(),
            Kind::Text => value.is_string(),
            Kind::NumericRange => serde_json::from_value::<NumericRange>(value.clone()).is_ok(),
            Kind::DateRange => is_date_range(value),
            Kind::Intervals => match serde_json::from_value::<Vec<MitigationInterval>>(value.clone())
            {
                Ok(_) => value
                    .as_array()
                    .map(|items| items.iter().all(|i| is_date_range(&i["timeRange"])))
                    .unwrap_or(false),
                Err(_) => false,
            },
        }
    }
}

fn is_date_range(value: &Value) -> bool {
    ["begin", "end"].iter().all(|bound| {
        value
            .get(*bound)
            .and_then(Value::as_str)
            .and_then(parse_date)
            .is_some()
    })
}

/// A field that a section must (or may) define.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: Kind,
    pub required: bool,
}

const fn req(name: &'static str, kind: Kind) -> FieldRule {
    FieldRule {
        name,
        kind,
        required: true,
    }
}

const fn opt(name: &'static str, kind: Kind) -> FieldRule {
    FieldRule {
        name,
        kind,
        required: false,
    }
}

pub const POPULATION: &[FieldRule] = &[
    req("ageDistributionName", Kind::Text),
    req("caseCountsName", Kind::Text),
    req("hospitalBeds", Kind::Number),
    req("icuBeds", Kind::Number),
    req("importsPerDay", Kind::Number),
    req("initialNumberOfCases", Kind::Number),
    req("populationServed", Kind::Number),
];

pub const EPIDEMIOLOGICAL: &[FieldRule] = &[
    req("hospitalStayDays", Kind::Number),
    req("icuStayDays", Kind::Number),
    req("infectiousPeriodDays", Kind::Number),
    req("latencyDays", Kind::Number),
    req("overflowSeverity", Kind::Number),
    req("peakMonth", Kind::Number),
    req("r0", Kind::NumericRange),
    opt("seasonalForcing", Kind::Number),
];

pub const SIMULATION: &[FieldRule] = &[
    req("numberStochasticRuns", Kind::Number),
    req("simulationTimeRange", Kind::DateRange),
];

pub const MITIGATION: &[FieldRule] = &[req("mitigationIntervals", Kind::Intervals)];

/// Check that a section defines the given fields with the right shapes.
/// Fields not listed in `fields` are accepted as they are.
pub fn check_section(
    section_name: &str,
    section: &Section,
    fields: &[FieldRule],
) -> Result<(), DecodeError> {
    for field in fields {
        let path = format!("{}.{}", section_name, field.name);
        match section.get(field.name) {
            Some(value) if field.kind.accepts(value) => {}
            None if !field.required => {}
            _ => return Err(DecodeError::schema(path, field.kind.expected())),
        }
    }
    Ok(())
}
