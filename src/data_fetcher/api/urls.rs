//! URL building utilities for API endpoints

/// Builds the match query URL for one organization and season.
///
/// The query selects the compact response mode, the season, the
/// organization and every game day.
///
/// # Example
/// ```
/// use bsm_structure::data_fetcher::api::build_matches_url;
///
/// let url = build_matches_url("https://api.example.com", 2025, "42");
/// assert_eq!(
///     url,
///     "https://api.example.com/matches.json?compact=true&filters%5Bseasons%5D%5B%5D=2025&filters%5Borganizations%5D%5B%5D=42&filters%5Bgamedays%5D%5B%5D=any"
/// );
/// ```
pub fn build_matches_url(api_domain: &str, season: i32, organization_id: &str) -> String {
    let api_domain = api_domain.trim_end_matches('/');
    format!(
        "{api_domain}/matches.json?compact=true\
         &filters%5Bseasons%5D%5B%5D={season}\
         &filters%5Borganizations%5D%5B%5D={organization_id}\
         &filters%5Bgamedays%5D%5B%5D=any"
    )
}
