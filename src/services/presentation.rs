use crate::models::analysis_types::RankedProbability;
use std::collections::HashMap;

/// Build the display ranking from a probability mapping: descending by raw
/// probability, percentages rounded to one decimal. The sort is stable, so
/// ties keep the map's enumeration order; that order is unspecified for a
/// hash map, which is acceptable for equal scores.
pub fn rank_probabilities(probabilities: &HashMap<String, f64>) -> Vec<RankedProbability> {
    let mut ranking: Vec<RankedProbability> = probabilities
        .iter()
        .map(|(label, &probability)| RankedProbability {
            label: label.clone(),
            probability,
            percentage: (probability * 1000.0).round() / 10.0,
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranking
}
