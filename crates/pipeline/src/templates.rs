use crate::schema::HOSPITAL_INDICATORS;
use core_types::{LogicalQuery, SqlFragment};

/// Static description of one logical query's SQL.
///
/// Every string in here is a fixed identifier or expression. Caller-supplied
/// text never ends up in a template; it is bound through placeholders.
#[derive(Debug, PartialEq, Eq)]
pub struct QueryTemplate {
    /// `FROM` target, including any join.
    pub source: &'static str,
    pub date_column: &'static str,
    pub entity_column: &'static str,
    /// Fixed value columns projected after the date (and entity, when grouped).
    pub value_columns: &'static [&'static str],
    /// Allow-list mapping the `metric` parameter to the column it projects.
    pub metric_columns: Option<&'static [(&'static str, &'static str)]>,
    /// Column filtered by the bound indicator value, and the values it may take.
    pub indicator: Option<IndicatorFilter>,
    /// Multi-entity: `IN (...)` filter plus `ORDER BY entity, date`.
    pub grouped: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub struct IndicatorFilter {
    pub column: &'static str,
    pub allowed: &'static [&'static str],
}

pub const TESTING_COLUMNS: &[(&str, &str)] = &[
    ("t_cumulative_total", "t_cumulative_total"),
    ("t_daily_change_ct", "t_daily_change_ct"),
    ("t_ct_per_thousand", "t_ct_per_thousand"),
    ("t_daily_change_ct_per_thousand", "t_daily_change_ct_per_thousand"),
    ("t_short_term_positive_rate", "t_short_term_positive_rate"),
    ("t_short_term_tests_per_case", "t_short_term_tests_per_case"),
];

pub const VACCINATION_COLUMNS: &[(&str, &str)] = &[
    ("v_total_vaccinations", "v_total_vaccinations"),
    ("v_people_fully_vaccinated", "v_people_fully_vaccinated"),
    ("v_total_boosters", "v_total_boosters"),
    ("v_daily_vaccinations", "v_daily_vaccinations"),
    (
        "v_people_fully_vaccinated_per_hundred",
        "v_people_fully_vaccinated_per_hundred",
    ),
    ("v_total_boosters_per_hundred", "v_total_boosters_per_hundred"),
];

const COUNTRIES_SQL: &str = "SELECT l_nationname FROM location ORDER BY l_nationname";

const CASES_SOURCE: &str = "cases JOIN location ON l_nationkey = c_nationkey";
const DEATHS_SOURCE: &str = "deaths JOIN location ON l_nationkey = d_nationkey";
const TESTING_SOURCE: &str = "testing JOIN location ON l_nationkey = t_nationkey";
const TESTING_ENTITY: &str = "split_part(t_entity, ' - ', 2) AS metric_value";

const fn cases(grouped: bool) -> QueryTemplate {
    QueryTemplate {
        source: CASES_SOURCE,
        date_column: "c_date",
        entity_column: "l_nationname",
        value_columns: &["c_cases"],
        metric_columns: None,
        indicator: None,
        grouped,
    }
}

const fn deaths(grouped: bool) -> QueryTemplate {
    QueryTemplate {
        source: DEATHS_SOURCE,
        date_column: "d_date",
        entity_column: "l_nationname",
        value_columns: &["d_death"],
        metric_columns: None,
        indicator: None,
        grouped,
    }
}

const fn testing(grouped: bool) -> QueryTemplate {
    QueryTemplate {
        source: TESTING_SOURCE,
        date_column: "t_date",
        entity_column: "l_nationname",
        value_columns: &[TESTING_ENTITY],
        metric_columns: Some(TESTING_COLUMNS),
        indicator: None,
        grouped,
    }
}

const fn hospitalizations(grouped: bool) -> QueryTemplate {
    QueryTemplate {
        source: "hospitalizations",
        date_column: "h_date",
        entity_column: "h_nationname",
        value_columns: &["h_indicator", "h_value"],
        metric_columns: None,
        indicator: Some(IndicatorFilter {
            column: "h_indicator",
            allowed: HOSPITAL_INDICATORS,
        }),
        grouped,
    }
}

const fn vaccinations(grouped: bool) -> QueryTemplate {
    QueryTemplate {
        source: "vaccinations",
        date_column: "v_date",
        entity_column: "v_nationname",
        value_columns: &[],
        metric_columns: Some(VACCINATION_COLUMNS),
        indicator: None,
        grouped,
    }
}

static CASES: QueryTemplate = cases(false);
static DEATHS: QueryTemplate = deaths(false);
static TESTING: QueryTemplate = testing(false);
static HOSPITALIZATIONS: QueryTemplate = hospitalizations(false);
static VACCINATIONS: QueryTemplate = vaccinations(false);
static COMPARE_CASES: QueryTemplate = cases(true);
static COMPARE_DEATHS: QueryTemplate = deaths(true);
static COMPARE_TESTING: QueryTemplate = testing(true);
static COMPARE_HOSPITALIZATIONS: QueryTemplate = hospitalizations(true);
static COMPARE_VACCINATIONS: QueryTemplate = vaccinations(true);

/// The template of `query`, or `None` for the entity listing, which runs a
/// fixed statement instead.
pub fn template_for(query: LogicalQuery) -> Option<&'static QueryTemplate> {
    let template = match query {
        LogicalQuery::Countries => return None,
        LogicalQuery::Cases => &CASES,
        LogicalQuery::Deaths => &DEATHS,
        LogicalQuery::Testing => &TESTING,
        LogicalQuery::Hospitalizations => &HOSPITALIZATIONS,
        LogicalQuery::Vaccinations => &VACCINATIONS,
        LogicalQuery::CompareCases => &COMPARE_CASES,
        LogicalQuery::CompareDeaths => &COMPARE_DEATHS,
        LogicalQuery::CompareTesting => &COMPARE_TESTING,
        LogicalQuery::CompareHospitalizations => &COMPARE_HOSPITALIZATIONS,
        LogicalQuery::CompareVaccinations => &COMPARE_VACCINATIONS,
    };
    Some(template)
}

/// Lists every known entity name.
pub fn countries_fragment() -> SqlFragment {
    SqlFragment::new(COUNTRIES_SQL, Vec::new())
}
