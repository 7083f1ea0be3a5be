use crate::error::CoreError;
use std::fmt;
use std::str::FromStr;

/// One named data-retrieval operation. Each variant owns exactly one parameter
/// schema and, apart from `Countries`, one query template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalQuery {
    Countries,
    Cases,
    Deaths,
    Testing,
    Hospitalizations,
    Vaccinations,
    CompareCases,
    CompareDeaths,
    CompareTesting,
    CompareHospitalizations,
    CompareVaccinations,
}

impl LogicalQuery {
    pub const ALL: [LogicalQuery; 11] = [
        LogicalQuery::Countries,
        LogicalQuery::Cases,
        LogicalQuery::Deaths,
        LogicalQuery::Testing,
        LogicalQuery::Hospitalizations,
        LogicalQuery::Vaccinations,
        LogicalQuery::CompareCases,
        LogicalQuery::CompareDeaths,
        LogicalQuery::CompareTesting,
        LogicalQuery::CompareHospitalizations,
        LogicalQuery::CompareVaccinations,
    ];

    /// The route name, without the `/api/` prefix.
    pub fn name(&self) -> &'static str {
        match self {
            LogicalQuery::Countries => "get-countries",
            LogicalQuery::Cases => "cases-by-country",
            LogicalQuery::Deaths => "deaths-by-country",
            LogicalQuery::Testing => "testing-by-country",
            LogicalQuery::Hospitalizations => "hospitalizations-by-country",
            LogicalQuery::Vaccinations => "vaccinations-by-country",
            LogicalQuery::CompareCases => "compare-cases-by-country",
            LogicalQuery::CompareDeaths => "compare-deaths-by-country",
            LogicalQuery::CompareTesting => "compare-testing-by-country",
            LogicalQuery::CompareHospitalizations => "compare-hospitalizations-by-country",
            LogicalQuery::CompareVaccinations => "compare-vaccinations-by-country",
        }
    }

    /// The HTTP path this query is served on.
    pub fn route(&self) -> String {
        format!("/api/{}", self.name())
    }

    /// Comparison queries take a list of entities and return grouped results.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            LogicalQuery::CompareCases
                | LogicalQuery::CompareDeaths
                | LogicalQuery::CompareTesting
                | LogicalQuery::CompareHospitalizations
                | LogicalQuery::CompareVaccinations
        )
    }
}

impl fmt::Display for LogicalQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogicalQuery {
    type Err = CoreError;

    /// Accepts either the bare route name or the full `/api/...` path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches("/api/");
        LogicalQuery::ALL
            .into_iter()
            .find(|query| query.name() == name)
            .ok_or_else(|| CoreError::UnknownEndpoint(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_names_and_full_routes() {
        assert_eq!("cases-by-country".parse(), Ok(LogicalQuery::Cases));
        assert_eq!(
            "/api/compare-testing-by-country".parse(),
            Ok(LogicalQuery::CompareTesting)
        );
    }

    #[test]
    fn unknown_route_is_rejected() {
        assert_eq!(
            "flu-by-country".parse::<LogicalQuery>(),
            Err(CoreError::UnknownEndpoint("flu-by-country".to_string()))
        );
    }

    #[test]
    fn only_compare_routes_are_comparisons() {
        let comparisons: Vec<_> = LogicalQuery::ALL
            .into_iter()
            .filter(LogicalQuery::is_comparison)
            .collect();
        assert_eq!(comparisons.len(), 5);
        assert!(comparisons.iter().all(|q| q.name().starts_with("compare-")));
    }
}
