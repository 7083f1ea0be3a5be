use crate::error::BuildError;
use crate::schema::PER_MILLION;
use crate::templates::QueryTemplate;
use core_types::{SqlFragment, ValidatedQuery};

const PER_MILLION_SUFFIX: &str = " per million";

/// Collects bind values and hands out the matching `$n` placeholder, so the
/// argument order always follows the order placeholders appear in the text.
#[derive(Default)]
struct Binds {
    args: Vec<String>,
}

impl Binds {
    fn push(&mut self, value: impl Into<String>) -> String {
        self.args.push(value.into());
        format!("${}", self.args.len())
    }
}

/// Renders `validated` through `template`.
///
/// Grouped templates get one placeholder per entity in their `IN (...)` list
/// and an `ORDER BY entity, date`, which `shape_grouped` relies on.
pub fn build(validated: &ValidatedQuery, template: &QueryTemplate) -> Result<SqlFragment, BuildError> {
    let mut binds = Binds::default();

    let mut columns = vec![format!(
        "TO_CHAR({}, 'YYYY-MM-DD') AS formatted_date",
        template.date_column
    )];
    if template.grouped {
        columns.push(template.entity_column.to_string());
    }
    columns.extend(template.value_columns.iter().map(|column| column.to_string()));
    if let Some(table) = template.metric_columns {
        let metric = validated.metric.as_deref().ok_or(BuildError::MissingMetric)?;
        columns.push(safe_identifier(table, metric)?.to_string());
    }

    let mut conditions = Vec::new();
    if template.grouped {
        let placeholders: Vec<String> = validated
            .entities
            .iter()
            .map(|entity| binds.push(entity.as_str()))
            .collect();
        conditions.push(format!(
            "{} IN ({})",
            template.entity_column,
            placeholders.join(", ")
        ));
    } else {
        let [entity] = validated.entities.as_slice() else {
            return Err(BuildError::EntityArity(validated.entities.len()));
        };
        conditions.push(format!("{} = {}", template.entity_column, binds.push(entity.as_str())));
    }

    if let Some(filter) = &template.indicator {
        let indicator = validated.metric.as_deref().ok_or(BuildError::MissingMetric)?;
        if !filter.allowed.contains(&indicator) {
            return Err(BuildError::UnlistedIdentifier(indicator.to_string()));
        }
        let value = full_indicator(indicator, validated.flag(PER_MILLION));
        conditions.push(format!("{} = {}", filter.column, binds.push(value)));
    }

    let start = binds.push(validated.date_range.start.as_str());
    let end = binds.push(validated.date_range.end.as_str());
    conditions.push(format!(
        "{} BETWEEN CAST({} AS DATE) AND CAST({} AS DATE)",
        template.date_column, start, end
    ));

    let mut text = format!(
        "SELECT {} FROM {} WHERE {}",
        columns.join(", "),
        template.source,
        conditions.join(" AND ")
    );
    if template.grouped {
        text.push_str(&format!(" ORDER BY {}, formatted_date", template.entity_column));
    }

    Ok(SqlFragment::new(text, binds.args))
}

/// The indicator value stored for per-million figures is the plain indicator
/// name with a fixed suffix.
pub fn full_indicator(indicator: &str, per_million: bool) -> String {
    if per_million {
        format!("{indicator}{PER_MILLION_SUFFIX}")
    } else {
        indicator.to_string()
    }
}

/// Maps a validated metric name to the identifier stored in the template table.
/// The returned string is the table's, never the caller's.
fn safe_identifier(
    table: &'static [(&'static str, &'static str)],
    metric: &str,
) -> Result<&'static str, BuildError> {
    table
        .iter()
        .find(|(name, _)| *name == metric)
        .map(|(_, identifier)| *identifier)
        .ok_or_else(|| BuildError::UnlistedIdentifier(metric.to_string()))
}
