use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::trace;

use crate::{map_data::point::GeoPoint, rules::DetectionRules};

use super::{
    extractor::{StreetPair, StreetPairLocations},
    similarity::NameSimilarity,
    DuplicateIntersection,
};

/// The farthest-apart pair of locations whose distance lies in the band.
/// On equal distances the first combination found is kept.
pub fn farthest_in_band(
    locations: &[GeoPoint],
    rules: &DetectionRules,
) -> Option<(f64, GeoPoint, GeoPoint)> {
    if locations.len() < 2 {
        return None;
    }

    locations
        .iter()
        .enumerate()
        .flat_map(|(idx, location_a)| {
            locations[idx + 1..].iter().map(move |location_b| {
                (
                    location_a.distance_to(location_b),
                    *location_a,
                    *location_b,
                )
            })
        })
        .filter(|(distance, _, _)| rules.distance_in_band(*distance))
        .fold(None, |best, candidate| match best {
            Some(best) if best.0 >= candidate.0 => Some(best),
            _ => Some(candidate),
        })
}

fn select_for_pair(
    pair: &StreetPair,
    locations: &[GeoPoint],
    rules: &DetectionRules,
    similarity: &NameSimilarity,
) -> Option<DuplicateIntersection> {
    if similarity.are_similar(pair.first(), pair.second()) {
        trace!(pair = %pair, "Skipping similar street names");
        return None;
    }

    farthest_in_band(locations, rules).map(|(distance, location1, location2)| {
        DuplicateIntersection {
            street1: pair.first().to_string(),
            street2: pair.second().to_string(),
            distance,
            location1,
            location2,
        }
    })
}

/// One record per qualifying street pair, sorted by distance, farthest first.
pub fn select_duplicates(
    pair_locations: &StreetPairLocations,
    rules: &DetectionRules,
) -> Vec<DuplicateIntersection> {
    let similarity = NameSimilarity::new(&rules.similarity);

    let mut duplicates = pair_locations
        .par_iter()
        .filter_map(|(pair, locations)| select_for_pair(pair, locations, rules, &similarity))
        .collect::<Vec<_>>();

    duplicates.sort_by(|a, b| b.distance.total_cmp(&a.distance));

    duplicates
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn rules(min_distance_m: f64, max_distance_m: Option<f64>) -> DetectionRules {
        DetectionRules {
            min_distance_m,
            max_distance_m,
            ..DetectionRules::default()
        }
    }

    fn three_locations() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0., 0.),
            GeoPoint::new(0.01, 0.),
            GeoPoint::new(0.02, 0.),
        ]
    }

    #[test]
    fn single_location_yields_nothing() {
        assert_eq!(
            farthest_in_band(&[GeoPoint::new(0., 0.)], &rules(0., None)),
            None
        );
        assert_eq!(farthest_in_band(&[], &rules(0., None)), None);
    }

    #[test]
    fn keeps_farthest_combination() {
        let locations = three_locations();
        let (distance, location1, location2) =
            farthest_in_band(&locations, &rules(500., None)).unwrap();

        assert!((distance - 2223.9).abs() < 0.1, "got {distance}");
        assert_eq!(location1, locations[0]);
        assert_eq!(location2, locations[2]);
    }

    #[test]
    fn max_distance_limits_band() {
        let locations = three_locations();
        let (distance, location1, location2) =
            farthest_in_band(&locations, &rules(500., Some(1500.))).unwrap();

        assert!((distance - 1111.95).abs() < 0.1, "got {distance}");
        // the first of the two equal-distance combinations wins
        assert_eq!(location1, locations[0]);
        assert_eq!(location2, locations[1]);

        assert_eq!(farthest_in_band(&locations, &rules(500., Some(1000.))), None);
    }

    #[test]
    fn min_distance_above_all_yields_nothing() {
        assert_eq!(farthest_in_band(&three_locations(), &rules(3000., None)), None);
    }

    #[test]
    fn similar_pairs_are_skipped() {
        let mut pair_locations: StreetPairLocations = BTreeMap::new();
        pair_locations.insert(
            StreetPair::new("רחוב הרצל", "הרצל").unwrap(),
            three_locations(),
        );
        pair_locations.insert(StreetPair::new("הרצל", "ויצמן").unwrap(), three_locations());

        let duplicates = select_duplicates(&pair_locations, &rules(150., None));

        assert_eq!(duplicates.len(), 1);
        let duplicate = duplicates.first().unwrap();
        assert_eq!(duplicate.street1, "הרצל");
        assert_eq!(duplicate.street2, "ויצמן");
    }

    #[test]
    fn sorted_farthest_first() {
        let mut pair_locations: StreetPairLocations = BTreeMap::new();
        pair_locations.insert(
            StreetPair::new("Alpha", "Beta").unwrap(),
            vec![GeoPoint::new(0., 0.), GeoPoint::new(0.01, 0.)],
        );
        pair_locations.insert(
            StreetPair::new("Gamma", "Delta").unwrap(),
            vec![GeoPoint::new(0., 0.), GeoPoint::new(0.03, 0.)],
        );
        pair_locations.insert(
            StreetPair::new("Epsilon", "Zeta").unwrap(),
            vec![GeoPoint::new(0., 0.), GeoPoint::new(0.02, 0.)],
        );

        let duplicates = select_duplicates(&pair_locations, &rules(150., None));

        assert_eq!(
            duplicates
                .iter()
                .map(|d| (d.street1.as_str(), d.street2.as_str()))
                .collect::<Vec<_>>(),
            vec![("Delta", "Gamma"), ("Epsilon", "Zeta"), ("Alpha", "Beta")]
        );
    }

    #[test]
    fn raising_min_distance_never_adds_results() {
        let mut pair_locations: StreetPairLocations = BTreeMap::new();
        pair_locations.insert(StreetPair::new("Alpha", "Beta").unwrap(), three_locations());
        pair_locations.insert(
            StreetPair::new("Gamma", "Delta").unwrap(),
            vec![GeoPoint::new(0., 0.), GeoPoint::new(0.005, 0.)],
        );

        let unbounded = select_duplicates(&pair_locations, &rules(0., None));
        let mut previous_count = unbounded.len();
        for min_distance_m in [100., 600., 1200., 2500.] {
            let duplicates = select_duplicates(&pair_locations, &rules(min_distance_m, None));
            assert!(duplicates.len() <= previous_count);
            for duplicate in &duplicates {
                assert!(duplicate.distance >= min_distance_m);
                let unbounded_distance = unbounded
                    .iter()
                    .find(|d| d.street1 == duplicate.street1 && d.street2 == duplicate.street2)
                    .map(|d| d.distance)
                    .unwrap();
                // without an upper bound the farthest combination always wins
                assert!((duplicate.distance - unbounded_distance).abs() < 1e-9);
            }
            previous_count = duplicates.len();
        }
        assert_eq!(previous_count, 0);
    }
}
