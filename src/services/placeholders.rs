//! Placeholder metadata used to backfill movies that were indexed from disk.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Genres a freshly indexed movie can be tagged with.
pub const GENRE_VOCABULARY: &[&str] = &[
    "Action", "Drama", "Sci-Fi", "Thriller", "Comedy", "Romance", "Horror", "Mystery",
];

pub const MIN_RATING: f64 = 7.0;
pub const MAX_RATING: f64 = 9.9;
pub const MIN_RELEASE_YEAR: i32 = 2010;
pub const MAX_RELEASE_YEAR: i32 = 2025;
pub const MIN_MATCH_SCORE: i32 = 80;
pub const MAX_MATCH_SCORE: i32 = 99;
pub const MAX_GENRES: usize = 3;

/// Prefix of the description text the catalog seeder writes for placeholder titles.
/// Descriptions starting with it are considered unset by the library sync.
pub const SEEDED_DESCRIPTION_PREFIX: &str = "Description for";

pub fn description_for_file(file_name: &str) -> String {
    format!(
        "An exciting local production featuring stunning visuals and gripping storytelling. \
         This file was automatically indexed from your local library ({}).",
        file_name
    )
}

/// Title derived from a file stem: `the-long-night` becomes `the long night`
pub fn title_from_file_stem(stem: &str) -> String {
    stem.replace('-', " ").trim().to_string()
}

/// Uniform in [7.0, 9.9], rounded to one decimal
pub fn random_rating<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let raw = MIN_RATING + rng.random::<f64>() * (MAX_RATING - MIN_RATING);
    ((raw * 10.0).round() / 10.0).clamp(MIN_RATING, MAX_RATING)
}

pub fn random_release_year<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.random_range(MIN_RELEASE_YEAR..=MAX_RELEASE_YEAR)
}

pub fn random_match_score<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.random_range(MIN_MATCH_SCORE..=MAX_MATCH_SCORE)
}

/// Running time between 1h 30m and 2h 59m
pub fn random_duration<R: Rng + ?Sized>(rng: &mut R) -> String {
    format_duration(90 + rng.random_range(0..90))
}

pub fn format_duration(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// One to three distinct genres from [`GENRE_VOCABULARY`]
pub fn random_genres<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    let count = rng.random_range(1..=MAX_GENRES);
    GENRE_VOCABULARY
        .choose_multiple(rng, count)
        .map(|genre| genre.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(90), "1h 30m");
        assert_eq!(format_duration(120), "2h 0m");
        assert_eq!(format_duration(179), "2h 59m");
    }

    #[test]
    fn test_title_from_file_stem() {
        assert_eq!(title_from_file_stem("the-long-night"), "the long night");
        assert_eq!(title_from_file_stem("Big_Buck-Bunny"), "Big_Buck Bunny");
    }

    #[test]
    fn test_description_mentions_file() {
        let description = description_for_file("ocean-deep.webp");
        assert!(description.contains("(ocean-deep.webp)"));
        assert!(!description.starts_with(SEEDED_DESCRIPTION_PREFIX));
    }

    #[test]
    fn test_random_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let rating = random_rating(&mut rng);
            assert!((MIN_RATING..=MAX_RATING).contains(&rating), "rating {rating}");

            let year = random_release_year(&mut rng);
            assert!((MIN_RELEASE_YEAR..=MAX_RELEASE_YEAR).contains(&year));

            let score = random_match_score(&mut rng);
            assert!((MIN_MATCH_SCORE..=MAX_MATCH_SCORE).contains(&score));

            let duration = random_duration(&mut rng);
            assert!(duration.starts_with("1h ") || duration.starts_with("2h "));
        }
    }

    #[test]
    fn test_random_genres_are_distinct() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen_counts = HashSet::new();
        for _ in 0..500 {
            let genres = random_genres(&mut rng);
            assert!((1..=MAX_GENRES).contains(&genres.len()));

            let unique: HashSet<&String> = genres.iter().collect();
            assert_eq!(unique.len(), genres.len());
            assert!(
                genres
                    .iter()
                    .all(|g| GENRE_VOCABULARY.contains(&g.as_str()))
            );
            seen_counts.insert(genres.len());
        }
        assert_eq!(seen_counts.len(), MAX_GENRES);
    }
}
