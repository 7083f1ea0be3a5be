use core_types::{CoreError, LogicalQuery};

/// How a parameter's raw value is read and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Scalar,
    /// Repeated keys, e.g. `countries=A&countries=B`.
    List,
    /// `true` or `false`, case-insensitive.
    Boolean,
    /// `YYYY-MM-DD`, checked by form only.
    Date,
}

/// Which field of the validated query a parameter feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRole {
    Entity,
    Start,
    End,
    Metric,
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub required: bool,
    pub kind: ParamKind,
    pub role: ParamRole,
    pub allowed_values: Option<&'static [&'static str]>,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind, role: ParamRole) -> Self {
        Self {
            name,
            required: true,
            kind,
            role,
            allowed_values: None,
        }
    }

    pub const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed_values = Some(allowed);
        self
    }
}

/// The accepted parameters of one logical query.
#[derive(Debug, PartialEq, Eq)]
pub struct QuerySchema {
    pub query: LogicalQuery,
    pub params: &'static [ParamSpec],
    /// Minimum number of distinct entities for list-kind entity parameters.
    pub min_entities: usize,
}

impl QuerySchema {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|spec| spec.name == name)
    }
}

// ==============================================================================
// Allow-lists
// ==============================================================================

pub const TESTING_METRICS: &[&str] = &[
    "t_cumulative_total",
    "t_daily_change_ct",
    "t_ct_per_thousand",
    "t_daily_change_ct_per_thousand",
    "t_short_term_positive_rate",
    "t_short_term_tests_per_case",
];

pub const VACCINATION_METRICS: &[&str] = &[
    "v_total_vaccinations",
    "v_people_fully_vaccinated",
    "v_total_boosters",
    "v_daily_vaccinations",
    "v_people_fully_vaccinated_per_hundred",
    "v_total_boosters_per_hundred",
];

pub const HOSPITAL_INDICATORS: &[&str] = &[
    "Daily hospital occupancy",
    "Daily ICU occupancy",
    "Weekly new hospital admissions",
    "Weekly new ICU admissions",
];

/// Name of the flag that switches hospitalization indicators to per-million figures.
pub const PER_MILLION: &str = "per_million";

// ==============================================================================
// Registry
// ==============================================================================

const COUNTRY: ParamSpec = ParamSpec::required("country", ParamKind::Scalar, ParamRole::Entity);
const COUNTRIES: ParamSpec = ParamSpec::required("countries", ParamKind::List, ParamRole::Entity);
const START: ParamSpec = ParamSpec::required("start", ParamKind::Date, ParamRole::Start);
const END: ParamSpec = ParamSpec::required("end", ParamKind::Date, ParamRole::End);
const TESTING_METRIC: ParamSpec =
    ParamSpec::required("metric", ParamKind::Scalar, ParamRole::Metric).one_of(TESTING_METRICS);
const VACCINATION_METRIC: ParamSpec =
    ParamSpec::required("metric", ParamKind::Scalar, ParamRole::Metric)
        .one_of(VACCINATION_METRICS);
const INDICATOR: ParamSpec =
    ParamSpec::required("indicator", ParamKind::Scalar, ParamRole::Metric)
        .one_of(HOSPITAL_INDICATORS);
const PER_MILLION_FLAG: ParamSpec =
    ParamSpec::required(PER_MILLION, ParamKind::Boolean, ParamRole::Flag);

const fn single(query: LogicalQuery, params: &'static [ParamSpec]) -> QuerySchema {
    QuerySchema {
        query,
        params,
        min_entities: 1,
    }
}

const fn comparison(query: LogicalQuery, params: &'static [ParamSpec]) -> QuerySchema {
    QuerySchema {
        query,
        params,
        min_entities: 2,
    }
}

static COUNTRIES_SCHEMA: QuerySchema = QuerySchema {
    query: LogicalQuery::Countries,
    params: &[],
    min_entities: 0,
};
static CASES: QuerySchema = single(LogicalQuery::Cases, &[COUNTRY, START, END]);
static DEATHS: QuerySchema = single(LogicalQuery::Deaths, &[COUNTRY, START, END]);
static TESTING: QuerySchema =
    single(LogicalQuery::Testing, &[COUNTRY, START, END, TESTING_METRIC]);
static HOSPITALIZATIONS: QuerySchema = single(
    LogicalQuery::Hospitalizations,
    &[COUNTRY, START, END, INDICATOR, PER_MILLION_FLAG],
);
static VACCINATIONS: QuerySchema = single(
    LogicalQuery::Vaccinations,
    &[COUNTRY, START, END, VACCINATION_METRIC],
);
static COMPARE_CASES: QuerySchema =
    comparison(LogicalQuery::CompareCases, &[COUNTRIES, START, END]);
static COMPARE_DEATHS: QuerySchema =
    comparison(LogicalQuery::CompareDeaths, &[COUNTRIES, START, END]);
static COMPARE_TESTING: QuerySchema = comparison(
    LogicalQuery::CompareTesting,
    &[COUNTRIES, START, END, TESTING_METRIC],
);
static COMPARE_HOSPITALIZATIONS: QuerySchema = comparison(
    LogicalQuery::CompareHospitalizations,
    &[COUNTRIES, START, END, INDICATOR, PER_MILLION_FLAG],
);
static COMPARE_VACCINATIONS: QuerySchema = comparison(
    LogicalQuery::CompareVaccinations,
    &[COUNTRIES, START, END, VACCINATION_METRIC],
);

/// The parameter schema of `query`. Every logical query is registered, so this
/// lookup cannot fail.
pub fn schema_for(query: LogicalQuery) -> &'static QuerySchema {
    match query {
        LogicalQuery::Countries => &COUNTRIES_SCHEMA,
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
    }
}

/// Looks a schema up by route name. Only reachable from outside the router,
/// where the name is free text.
pub fn schema_for_route(route: &str) -> Result<&'static QuerySchema, CoreError> {
    let query: LogicalQuery = route.parse()?;
    Ok(schema_for(query))
}
