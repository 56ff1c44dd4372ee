use crate::models::search::PlaceCandidate;

/// Score a search candidate 0–100 from its rating, review volume,
/// family-friendliness, and content completeness. Pure: same candidate in,
/// same score out, no I/O.
pub fn score_candidate(candidate: &PlaceCandidate) -> u8 {
    let mut score: u32 = 0;

    // Rating contribution (max 40)
    let rating = candidate.external_rating.unwrap_or(0.0);
    if rating >= 4.5 {
        score += 40;
    } else if rating >= 4.0 {
        score += 30;
    } else if rating >= 3.5 {
        score += 20;
    } else if rating >= 3.0 {
        score += 10;
    }

    // Review-count contribution (max 20)
    let reviews = candidate.external_review_count.unwrap_or(0);
    if reviews >= 1000 {
        score += 20;
    } else if reviews >= 500 {
        score += 15;
    } else if reviews >= 100 {
        score += 10;
    } else if reviews >= 50 {
        score += 5;
    }

    // Family-friendliness contribution (max 20)
    let tags = candidate.types.join(" ").to_lowercase();
    let category = candidate.resolved_category();
    if tags.contains("family") || tags.contains("child") {
        score += 20;
    } else if tags.contains("tourist_attraction") {
        score += 15;
    } else if category == "sightseeing" || category == "food" {
        score += 10;
    }

    // Completeness contribution (max 20)
    if candidate.description.as_deref().is_some_and(|d| !d.is_empty()) {
        score += 10;
    }
    if candidate
        .primary_image_url
        .as_deref()
        .is_some_and(|u| !u.is_empty())
    {
        score += 5;
    }
    if candidate.address.as_deref().is_some_and(|a| !a.is_empty())
        || candidate
            .location_name
            .as_deref()
            .is_some_and(|l| !l.is_empty())
    {
        score += 5;
    }

    score.min(100) as u8
}
