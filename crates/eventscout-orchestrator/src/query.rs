//! Base-query construction and query-variation expansion (spec §4.11 steps
//! 3-4): match a weighted template to the request when one applies, fall
//! back to a generic composition otherwise, then widen into four literal
//! query variants before discovery.

use eventscout_core::{SearchParams, UserProfile, WeightedTemplate};

/// Picks the template whose industry label appears in the user's text or in
/// one of their profile's industry terms, and folds its weighted knobs
/// (negative filters, geographic coverage) into the query text. Falls back
/// to a generic, industry-agnostic composition when nothing matches.
///
/// Returns `(query_text, industry_label)`.
pub fn build_base_query(
    params: &SearchParams,
    profile: &UserProfile,
    templates: &[WeightedTemplate],
    default_industry: &str,
) -> (String, String) {
    let text = params.trimmed_user_text().to_lowercase();

    let matched = templates.iter().find(|t| {
        let industry = t.industry.to_lowercase();
        text.contains(&industry)
            || profile
                .industry_terms
                .iter()
                .any(|term| term.to_lowercase() == industry)
    });

    match matched {
        Some(template) => {
            let mut parts = vec![params.trimmed_user_text().to_string(), template.industry.clone()];

            if template.geographic_coverage > 0 {
                if let Some(location) = &params.location {
                    parts.push(location.clone());
                } else if let Some(city) = template.cities.first() {
                    parts.push(city.clone());
                } else if let Some(region) = template.regions.first() {
                    parts.push(region.clone());
                }
            }

            if template.cross_industry_prevention > 0 {
                let mut filters: Vec<&eventscout_core::WeightedTerm> =
                    template.negative_filters.iter().collect();
                filters.sort_by(|a, b| b.weight.cmp(&a.weight));
                parts.extend(filters.iter().take(2).map(|f| format!("-{}", f.term)));
            }

            (parts.join(" "), template.industry.clone())
        }
        None => {
            let mut parts = vec![params.trimmed_user_text().to_string()];
            parts.extend(profile.industry_terms.iter().take(2).cloned());
            if let Some(icp) = profile.icp_terms.first() {
                parts.push(icp.clone());
            }
            if let Some(location) = &params.location {
                parts.push(location.clone());
            } else if let Some(country) = &params.country {
                parts.push(country.clone());
            }
            (parts.join(" "), default_industry.to_string())
        }
    }
}

/// The four literal variants discovery fans out over.
pub fn query_variations(base: &str) -> [String; 4] {
    [
        base.to_string(),
        format!("{base} conference"),
        format!("{base} summit"),
        format!("{base} event"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(text: &str) -> SearchParams {
        SearchParams {
            user_text: text.to_string(),
            country: Some("DE".to_string()),
            date_from: "2026-01-01".to_string(),
            date_to: "2026-12-31".to_string(),
            location: None,
            timeframe: None,
            locale: None,
        }
    }

    fn template() -> WeightedTemplate {
        WeightedTemplate {
            industry: "fintech".to_string(),
            industry_specific_query: 8,
            cross_industry_prevention: 5,
            geographic_coverage: 3,
            quality_requirements: 6,
            event_type_specificity: 4,
            negative_filters: vec![
                eventscout_core::WeightedTerm { term: "webinar".to_string(), weight: 9 },
                eventscout_core::WeightedTerm { term: "course".to_string(), weight: 2 },
            ],
            cities: vec!["Berlin".to_string()],
            regions: vec!["DACH".to_string()],
            quality_threshold: 0.5,
        }
    }

    #[test]
    fn matching_template_folds_in_city_and_top_negative_filters() {
        let (query, industry) =
            build_base_query(&params("fintech events in Berlin"), &UserProfile::default(), &[template()], "general events");
        assert!(query.contains("fintech"));
        assert!(query.contains("Berlin"));
        assert!(query.contains("-webinar"));
        assert_eq!(industry, "fintech");
    }

    #[test]
    fn no_match_falls_back_to_generic_composition() {
        let (query, industry) =
            build_base_query(&params("logistics trade shows"), &UserProfile::default(), &[], "general events");
        assert!(query.starts_with("logistics trade shows"));
        assert_eq!(industry, "general events");
    }

    #[test]
    fn variations_contain_four_literal_suffixes() {
        let variations = query_variations("fintech summit query");
        assert_eq!(variations.len(), 4);
        assert_eq!(variations[0], "fintech summit query");
        assert_eq!(variations[1], "fintech summit query conference");
        assert_eq!(variations[3], "fintech summit query event");
    }
}
