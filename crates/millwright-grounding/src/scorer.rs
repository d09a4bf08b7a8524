//! Citation matching and grounding-score computation

use millwright_domain::{Citation, Claim, GroundingResult};

/// Confidence in [0, 1] that `citation` supports `claim`.
///
/// Token overlap between the claim text and the citation excerpt, weighted
/// toward numeric agreement: a claim that states numbers is only well
/// supported by a citation carrying the same numbers.
pub fn match_confidence(claim: &Claim, citation: &Citation) -> f64 {
    let claim_tokens = tokenize(&claim.text);
    let excerpt_tokens = tokenize(&citation.excerpt);

    if claim_tokens.is_empty() || excerpt_tokens.is_empty() {
        return 0.0;
    }

    let overlap = claim_tokens
        .iter()
        .filter(|t| excerpt_tokens.contains(*t))
        .count() as f64
        / claim_tokens.len() as f64;

    let claim_numbers = numbers(&claim.text);
    if claim_numbers.is_empty() {
        return overlap.clamp(0.0, 1.0);
    }

    let excerpt_numbers = numbers(&citation.excerpt);
    let matched = claim_numbers
        .iter()
        .filter(|n| excerpt_numbers.iter().any(|e| approx_eq(**n, *e)))
        .count() as f64
        / claim_numbers.len() as f64;

    (0.4 * overlap + 0.6 * matched).clamp(0.0, 1.0)
}

/// Compute the aggregate grounding score for a set of claims against the
/// available citations.
///
/// `score = (sum of best-matching-citation confidence over groundable
/// claims) / (count of groundable claims)`; zero groundable claims scores
/// 1.0 by convention. Claims whose best confidence falls below
/// `ungrounded_threshold` are reported as ungrounded.
pub fn score(
    claims: &[Claim],
    citations: &[Citation],
    ungrounded_threshold: f64,
) -> GroundingResult {
    let groundable: Vec<&Claim> = claims.iter().filter(|c| c.requires_grounding).collect();
    if groundable.is_empty() {
        return GroundingResult::nothing_to_verify();
    }

    let mut total = 0.0;
    let mut ungrounded = Vec::new();

    for claim in &groundable {
        let best = citations
            .iter()
            .map(|citation| match_confidence(claim, citation))
            .fold(0.0, f64::max);

        total += best;
        if best < ungrounded_threshold {
            ungrounded.push(claim.text.clone());
        }
    }

    GroundingResult::new(total / groundable.len() as f64, ungrounded)
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '.')
        .map(|t| t.trim_matches('.'))
        .filter(|t| t.len() >= 2)
        .map(str::to_string)
        .collect()
}

fn numbers(text: &str) -> Vec<f64> {
    text.split(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .filter_map(|t| t.trim_matches('.').parse::<f64>().ok())
        .collect()
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 0.05 * a.abs().max(b.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use millwright_domain::ClaimKind;

    fn claim(text: &str) -> Claim {
        Claim::new(text, ClaimKind::Factual)
    }

    fn citation(excerpt: &str) -> Citation {
        Citation::for_query("query:test", 0, excerpt)
    }

    #[test]
    fn test_zero_groundable_claims_scores_one() {
        let claims = vec![Claim::new("This suggests a trend.", ClaimKind::Inference)];
        let result = score(&claims, &[], 0.5);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_groundable_claims_with_no_citations_score_zero() {
        let claims = vec![claim("Output was 847 units.")];
        let result = score(&claims, &[], 0.5);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.ungrounded_claims.len(), 1);
    }

    #[test]
    fn test_matching_numbers_ground_a_claim() {
        let c = claim("Grinder 5 produced 847 of 900 units.");
        let cit = citation("Grinder 5 produced 847 of 900, variance -53 (-5.9%)");

        let confidence = match_confidence(&c, &cit);
        assert!(confidence > 0.8, "confidence was {}", confidence);
    }

    #[test]
    fn test_wrong_numbers_weaken_a_claim() {
        let c = claim("Output reached 999 units.");
        let cit = citation("Grinder 5 produced 847 of 900");

        let confidence = match_confidence(&c, &cit);
        assert!(confidence < 0.3, "confidence was {}", confidence);
    }

    #[test]
    fn test_best_citation_wins() {
        let claims = vec![claim("Downtime totalled 152 minutes.")];
        let citations = vec![
            citation("asset metadata for Grinder 5"),
            citation("4 downtime reasons totalling 152 minutes"),
        ];

        let result = score(&claims, &citations, 0.5);
        assert!(result.score > 0.6);
        assert!(result.ungrounded_claims.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn prop_confidence_stays_in_unit_interval(
            claim_text in "[a-zA-Z0-9 .%-]{0,80}",
            excerpt in "[a-zA-Z0-9 .%-]{0,80}",
        ) {
            let confidence = match_confidence(&claim(&claim_text), &citation(&excerpt));
            proptest::prop_assert!((0.0..=1.0).contains(&confidence));
        }
    }

    #[test]
    fn test_score_is_mean_over_groundable_claims() {
        let claims = vec![
            claim("Downtime totalled 152 minutes."),
            claim("Scrap rate was 44.2 percent."),
        ];
        let citations = vec![citation("downtime totalled 152 minutes")];

        let result = score(&claims, &citations, 0.5);
        // One well-grounded claim, one unsupported claim
        assert!(result.score > 0.3 && result.score < 0.7);
        assert_eq!(result.ungrounded_claims.len(), 1);
        assert!(result.ungrounded_claims[0].contains("Scrap"));
    }
}
