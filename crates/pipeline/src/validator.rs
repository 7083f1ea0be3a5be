use crate::error::ValidationError;
use crate::schema::{ParamKind, ParamRole, ParamSpec, QuerySchema};
use core_types::{DateRange, ParamValue, RequestParameters, ValidatedQuery};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

// ASCII digits only; `\d` would also accept other Unicode digits.
static DATE_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern is valid"));

/// Checks `params` against `schema` and produces the validated query.
///
/// Checks run in a fixed order and the first failure is returned: unknown
/// keys, missing keys, allow-lists, date form, boolean form, entity count.
///
/// The date check is syntactic. `2021-02-30` passes and is left for the store
/// to reject.
pub fn validate(
    params: &RequestParameters,
    schema: &QuerySchema,
) -> Result<ValidatedQuery, ValidationError> {
    check_unknown(params, schema)?;
    check_missing(params, schema)?;
    check_allowed_values(params, schema)?;
    check_dates(params, schema)?;
    check_booleans(params, schema)?;
    check_cardinality(params, schema)?;
    Ok(assemble(params, schema))
}

/// Rejects every key the schema does not declare, listing all of them.
pub fn check_unknown(
    params: &RequestParameters,
    schema: &QuerySchema,
) -> Result<(), ValidationError> {
    let unknown: Vec<String> = params
        .keys()
        .filter(|key| schema.param(key).is_none())
        .map(str::to_string)
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::UnknownParameter(unknown))
    }
}

fn check_missing(params: &RequestParameters, schema: &QuerySchema) -> Result<(), ValidationError> {
    let missing: Vec<String> = schema
        .params
        .iter()
        .filter(|spec| spec.required)
        .filter(|spec| params.get(spec.name).is_none_or(ParamValue::is_null))
        .map(|spec| spec.name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingParameter(missing))
    }
}

fn check_allowed_values(
    params: &RequestParameters,
    schema: &QuerySchema,
) -> Result<(), ValidationError> {
    for spec in schema.params {
        let Some(allowed) = spec.allowed_values else {
            continue;
        };
        for value in supplied(params, spec) {
            if !allowed.contains(&value) {
                return Err(ValidationError::InvalidEnumValue {
                    param: spec.name.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn check_dates(params: &RequestParameters, schema: &QuerySchema) -> Result<(), ValidationError> {
    for spec in schema.params.iter().filter(|s| s.kind == ParamKind::Date) {
        for value in supplied(params, spec) {
            if !DATE_FORM.is_match(value) {
                return Err(ValidationError::MalformedDate {
                    param: spec.name.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn check_booleans(params: &RequestParameters, schema: &QuerySchema) -> Result<(), ValidationError> {
    for spec in schema.params.iter().filter(|s| s.kind == ParamKind::Boolean) {
        for value in supplied(params, spec) {
            if parse_bool(value).is_none() {
                return Err(ValidationError::InvalidBoolean {
                    param: spec.name.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn check_cardinality(
    params: &RequestParameters,
    schema: &QuerySchema,
) -> Result<(), ValidationError> {
    let lists = schema
        .params
        .iter()
        .filter(|s| s.kind == ParamKind::List && s.role == ParamRole::Entity);
    for spec in lists {
        if distinct(supplied(params, spec)).len() < schema.min_entities {
            return Err(ValidationError::InsufficientEntities {
                param: spec.name.to_string(),
                min: schema.min_entities,
            });
        }
    }
    Ok(())
}

/// Reads the checked parameters into a `ValidatedQuery`. Only called once every
/// check has passed, so each required field is present.
fn assemble(params: &RequestParameters, schema: &QuerySchema) -> ValidatedQuery {
    let mut entities = Vec::new();
    let mut start = String::new();
    let mut end = String::new();
    let mut metric = None;
    let mut flags = BTreeMap::new();

    for spec in schema.params {
        let values = supplied(params, spec);
        let Some(first) = values.first().copied() else {
            continue;
        };
        match spec.role {
            ParamRole::Entity => entities = distinct(values),
            ParamRole::Start => start = first.to_string(),
            ParamRole::End => end = first.to_string(),
            ParamRole::Metric => metric = Some(first.to_string()),
            ParamRole::Flag => {
                flags.insert(spec.name.to_string(), parse_bool(first).unwrap_or(false));
            }
        }
    }

    ValidatedQuery {
        query: schema.query,
        entities,
        date_range: DateRange { start, end },
        metric,
        flags,
    }
}

/// The values a parameter contributes: every value for lists, the first one
/// for anything else.
fn supplied<'a>(params: &'a RequestParameters, spec: &ParamSpec) -> Vec<&'a str> {
    match params.get(spec.name) {
        Some(value) if spec.kind == ParamKind::List => value.values(),
        Some(value) => value.first().into_iter().collect(),
        None => Vec::new(),
    }
}

/// Drops repeated values, keeping first-seen order. Linear in the number of
/// values.
fn distinct(values: Vec<&str>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .into_iter()
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::schema_for;
    use core_types::LogicalQuery;

    fn hospital_params() -> RequestParameters {
        RequestParameters::from_pairs([
            ("country", "Italy"),
            ("start", "2021-01-01"),
            ("end", "2021-06-30"),
            ("indicator", "Daily ICU occupancy"),
            ("per_million", "TRUE"),
        ])
    }

    fn compare_params(countries: &[&str]) -> RequestParameters {
        let mut params = RequestParameters::new();
        for country in countries {
            params.push("countries", *country);
        }
        params.push("start", "2021-01-01");
        params.push("end", "2021-01-31");
        params
    }

    #[test]
    fn valid_request_produces_a_validated_query() {
        let validated =
            validate(&hospital_params(), schema_for(LogicalQuery::Hospitalizations)).unwrap();

        assert_eq!(validated.query, LogicalQuery::Hospitalizations);
        assert_eq!(validated.entities, vec!["Italy"]);
        assert_eq!(validated.date_range.start, "2021-01-01");
        assert_eq!(validated.date_range.end, "2021-06-30");
        assert_eq!(validated.metric.as_deref(), Some("Daily ICU occupancy"));
        assert!(validated.flag("per_million"));
    }

    #[test]
    fn unknown_parameters_are_all_listed() {
        let mut params = hospital_params();
        params.push("page", "2");
        params.push("format", "csv");

        let err = validate(&params, schema_for(LogicalQuery::Hospitalizations)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownParameter(vec!["page".to_string(), "format".to_string()])
        );
        assert_eq!(err.to_string(), "Unknown parameters: page, format");
    }

    #[test]
    fn missing_parameters_are_all_listed() {
        let params = RequestParameters::from_pairs([("country", "Italy")]);

        let err = validate(&params, schema_for(LogicalQuery::Testing)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingParameter(vec![
                "start".to_string(),
                "end".to_string(),
                "metric".to_string()
            ])
        );
    }

    #[test]
    fn missing_check_runs_before_value_checks() {
        let params = RequestParameters::from_pairs([
            ("country", "Italy"),
            ("start", "yesterday"),
            ("metric", "t_made_up"),
        ]);

        let err = validate(&params, schema_for(LogicalQuery::Testing)).unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter(vec!["end".to_string()]));
    }

    #[test]
    fn unknown_check_runs_before_missing_check() {
        let params = RequestParameters::from_pairs([("nation", "Italy")]);

        let err = validate(&params, schema_for(LogicalQuery::Cases)).unwrap_err();
        assert_eq!(err, ValidationError::UnknownParameter(vec!["nation".to_string()]));
    }

    #[test]
    fn empty_country_list_counts_as_missing() {
        let mut params = compare_params(&[]);
        params.set_list("countries", Vec::new());

        let err = validate(&params, schema_for(LogicalQuery::CompareCases)).unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter(vec!["countries".to_string()]));
    }

    #[test]
    fn out_of_list_metric_is_rejected() {
        let params = RequestParameters::from_pairs([
            ("country", "Italy"),
            ("start", "2021-01-01"),
            ("end", "2021-01-31"),
            ("metric", "t_cumulative_total; DROP TABLE testing"),
        ]);

        let err = validate(&params, schema_for(LogicalQuery::Testing)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidEnumValue {
                param: "metric".to_string(),
                value: "t_cumulative_total; DROP TABLE testing".to_string(),
            }
        );
    }

    #[test]
    fn indicator_must_match_exactly() {
        let mut params = hospital_params();
        params.set_list("indicator", vec!["daily icu occupancy".to_string()]);

        let err = validate(&params, schema_for(LogicalQuery::Hospitalizations)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEnumValue { .. }));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for bad in ["2021-1-01", "21-01-01", "2021/01/01", "2021-01-01T00:00", "", "２０２１-01-01"] {
            let params = RequestParameters::from_pairs([
                ("country", "Italy"),
                ("start", bad),
                ("end", "2021-01-31"),
            ]);
            let err = validate(&params, schema_for(LogicalQuery::Cases)).unwrap_err();
            assert_eq!(
                err,
                ValidationError::MalformedDate {
                    param: "start".to_string(),
                    value: bad.to_string(),
                },
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn date_check_is_syntactic_only() {
        for impossible in ["2021-02-30", "2021-13-40"] {
            let params = RequestParameters::from_pairs([
                ("country", "Italy"),
                ("start", "2021-01-01"),
                ("end", impossible),
            ]);
            let validated = validate(&params, schema_for(LogicalQuery::Cases)).unwrap();
            assert_eq!(validated.date_range.end, impossible);
        }
    }

    #[test]
    fn booleans_are_case_insensitive() {
        for (raw, expected) in [("true", true), ("True", true), ("FALSE", false), ("false", false)] {
            let mut params = hospital_params();
            params.set_list("per_million", vec![raw.to_string()]);
            let validated = validate(&params, schema_for(LogicalQuery::Hospitalizations)).unwrap();
            assert_eq!(validated.flag("per_million"), expected);
        }
    }

    #[test]
    fn non_boolean_flag_is_rejected() {
        for raw in ["yes", "1", "t", ""] {
            let mut params = hospital_params();
            params.set_list("per_million", vec![raw.to_string()]);
            let err = validate(&params, schema_for(LogicalQuery::Hospitalizations)).unwrap_err();
            assert_eq!(
                err,
                ValidationError::InvalidBoolean {
                    param: "per_million".to_string()
                }
            );
        }
    }

    #[test]
    fn one_country_is_not_a_comparison() {
        let err =
            validate(&compare_params(&["Kenya"]), schema_for(LogicalQuery::CompareCases))
                .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InsufficientEntities {
                param: "countries".to_string(),
                min: 2,
            }
        );
    }

    #[test]
    fn the_same_country_twice_is_not_a_comparison() {
        let err = validate(
            &compare_params(&["Kenya", "Kenya"]),
            schema_for(LogicalQuery::CompareCases),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InsufficientEntities { .. }));
    }

    #[test]
    fn two_countries_proceed_in_request_order() {
        let validated = validate(
            &compare_params(&["Kenya", "Ghana", "Kenya", "Chad"]),
            schema_for(LogicalQuery::CompareCases),
        )
        .unwrap();
        assert_eq!(validated.entities, vec!["Kenya", "Ghana", "Chad"]);
    }

    #[test]
    fn scalar_parameters_use_the_first_value() {
        let mut params = RequestParameters::from_pairs([
            ("country", "Italy"),
            ("country", "Spain"),
            ("start", "2021-01-01"),
            ("end", "2021-01-31"),
        ]);
        params.push("end", "not-a-date");

        let validated = validate(&params, schema_for(LogicalQuery::Cases)).unwrap();
        assert_eq!(validated.entities, vec!["Italy"]);
        assert_eq!(validated.date_range.end, "2021-01-31");
    }

    #[test]
    fn repeated_countries_collapse_in_first_seen_order() {
        let mut countries = Vec::new();
        for _ in 0..500 {
            countries.extend(["Peru", "Chile", "Peru"]);
        }
        let validated = validate(
            &compare_params(&countries),
            schema_for(LogicalQuery::CompareCases),
        )
        .unwrap();

        assert_eq!(validated.entities, vec!["Peru", "Chile"]);
    }
}
