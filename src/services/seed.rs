use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use color_eyre::Result;
use tracing::instrument;

use crate::config::Config;
use crate::database::{Database, MovieDraft};

/// Genres that always exist after seeding
pub const DEFAULT_GENRES: &[&str] = &["Action", "Comedy", "Horror"];

#[derive(Debug, Clone)]
pub struct SeedSettings {
    /// Cycled through for thumbnail URLs
    pub image_urls: Vec<String>,
    pub default_video_url: String,
    pub min_catalog_size: u64,
    pub placeholder_count: usize,
}

impl SeedSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            image_urls: config.bundled_image_urls(),
            default_video_url: config.default_video_url.clone(),
            min_catalog_size: config.seed.min_catalog_size,
            placeholder_count: config.seed.placeholder_count,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Existing movies that received a video or thumbnail URL
    pub backfilled: usize,
    /// Catalog titles inserted or changed
    pub upserted: usize,
}

enum Artwork {
    /// Index into the bundled image URLs
    Bundled(usize),
    /// picsum.photos seed used for poster and backdrop
    Picsum(&'static str),
}

struct FeaturedTitle {
    title: &'static str,
    description: &'static str,
    rating: Option<f64>,
    release_year: Option<i32>,
    duration: &'static str,
    maturity_rating: Option<&'static str>,
    match_score: i32,
    genres: &'static [&'static str],
    artwork: Artwork,
}

const FEATURED_TITLES: &[FeaturedTitle] = &[
    FeaturedTitle {
        title: "Stranger Things",
        description: "When a young boy disappears, his mother, a police chief and his friends must confront terrifying supernatural forces in order to get him back.",
        rating: Some(8.7),
        release_year: Some(2016),
        duration: "50m",
        maturity_rating: Some("U/A 16+"),
        match_score: 98,
        genres: &["Action", "Horror"],
        artwork: Artwork::Bundled(0),
    },
    FeaturedTitle {
        title: "Big Buck Bunny",
        description: "A large and lovable rabbit ends up with three annoying rodents, Frank, Rinky, and Gamera.",
        rating: None,
        release_year: None,
        duration: "10m",
        maturity_rating: Some("U"),
        match_score: 95,
        genres: &["Comedy", "Action"],
        artwork: Artwork::Bundled(1),
    },
    FeaturedTitle {
        title: "Inception",
        description: "A thief who steals corporate secrets through the use of dream-sharing technology is given the inverse task of planting an idea into the mind of a C.E.O.",
        rating: Some(8.8),
        release_year: Some(2010),
        duration: "2h 28m",
        maturity_rating: None,
        match_score: 98,
        genres: &["Sci-Fi", "Action"],
        artwork: Artwork::Picsum("inception"),
    },
    FeaturedTitle {
        title: "The Dark Knight",
        description: "When the menace known as the Joker wreaks havoc and chaos on the people of Gotham, Batman must accept one of the greatest psychological and physical tests of his ability to fight injustice.",
        rating: Some(9.0),
        release_year: Some(2008),
        duration: "2h 32m",
        maturity_rating: None,
        match_score: 99,
        genres: &["Action", "Crime"],
        artwork: Artwork::Picsum("darkknight"),
    },
    FeaturedTitle {
        title: "Interstellar",
        description: "A team of explorers travel through a wormhole in space in an attempt to ensure humanity's survival.",
        rating: Some(8.6),
        release_year: Some(2014),
        duration: "2h 49m",
        maturity_rating: None,
        match_score: 95,
        genres: &["Sci-Fi", "Drama"],
        artwork: Artwork::Picsum("interstellar"),
    },
    FeaturedTitle {
        title: "The Crown",
        description: "Follows the political rivalries and romance of Queen Elizabeth II's reign and the events that shaped the second half of the twentieth century.",
        rating: Some(8.6),
        release_year: Some(2016),
        duration: "58m",
        maturity_rating: None,
        match_score: 92,
        genres: &["Drama", "History"],
        artwork: Artwork::Picsum("crown"),
    },
    FeaturedTitle {
        title: "Avatar: The Way of Water",
        description: "Jake Sully lives with his newfound family formed on the extrasolar moon Pandora.",
        rating: Some(7.6),
        release_year: Some(2022),
        duration: "3h 12m",
        maturity_rating: None,
        match_score: 90,
        genres: &["Sci-Fi", "Action"],
        artwork: Artwork::Picsum("avatar"),
    },
    FeaturedTitle {
        title: "Wednesday",
        description: "Follows Wednesday Addams' years as a student, when she attempts to master her emerging psychic ability, thwart a killing spree, and solve the mystery that embroiled her parents.",
        rating: Some(8.1),
        release_year: Some(2022),
        duration: "45m",
        maturity_rating: None,
        match_score: 96,
        genres: &["Comedy", "Fantasy"],
        artwork: Artwork::Picsum("wednesday"),
    },
    FeaturedTitle {
        title: "Breaking Bad",
        description: "A chemistry teacher diagnosed with inoperable lung cancer turns to manufacturing and selling methamphetamine with a former student in order to secure his family's future.",
        rating: Some(9.5),
        release_year: Some(2008),
        duration: "49m",
        maturity_rating: None,
        match_score: 99,
        genres: &["Crime", "Drama"],
        artwork: Artwork::Picsum("breakingbad"),
    },
    FeaturedTitle {
        title: "The Mandalorian",
        description: "The travels of a lone bounty hunter in the outer reaches of the galaxy, far from the authority of the New Republic.",
        rating: Some(8.7),
        release_year: Some(2019),
        duration: "40m",
        maturity_rating: None,
        match_score: 94,
        genres: &["Sci-Fi", "Action"],
        artwork: Artwork::Picsum("mandalorian"),
    },
    FeaturedTitle {
        title: "Squid Game",
        description: "Hundreds of cash-strapped players accept a strange invitation to compete in children's games. Inside, a tempting prize awaits with deadly high stakes.",
        rating: Some(8.0),
        release_year: Some(2021),
        duration: "55m",
        maturity_rating: None,
        match_score: 93,
        genres: &["Thriller", "Drama"],
        artwork: Artwork::Picsum("squidgame"),
    },
    FeaturedTitle {
        title: "The Queen's Gambit",
        description: "Orphaned at the tender age of nine, prodigious introvert Beth Harmon discovers and masters the game of chess in 1960s USA. But child stardom comes at a price.",
        rating: Some(8.6),
        release_year: Some(2020),
        duration: "1h",
        maturity_rating: None,
        match_score: 95,
        genres: &["Drama"],
        artwork: Artwork::Picsum("queensgambit"),
    },
    FeaturedTitle {
        title: "Black Mirror",
        description: "An anthology series exploring a twisted, high-tech multiverse where humanity's greatest innovations and darkest instincts collide.",
        rating: Some(8.8),
        release_year: Some(2011),
        duration: "1h",
        maturity_rating: None,
        match_score: 91,
        genres: &["Sci-Fi", "Thriller"],
        artwork: Artwork::Picsum("blackmirror"),
    },
];

/// Values a catalog title is forced to on every upsert
#[derive(Debug, Default)]
struct CatalogEntry {
    title: String,
    description: String,
    rating: Option<f64>,
    release_year: Option<i32>,
    duration: String,
    maturity_rating: Option<String>,
    match_score: i32,
    genres: Vec<String>,
    thumbnail_url: Option<String>,
    poster_url: Option<String>,
    backdrop_url: Option<String>,
}

pub struct CatalogSeeder {
    db: Arc<Database>,
    settings: SeedSettings,
}

impl CatalogSeeder {
    pub fn new(db: Arc<Database>, settings: SeedSettings) -> Self {
        Self { db, settings }
    }

    fn image_url(&self, index: usize) -> Option<String> {
        if self.settings.image_urls.is_empty() {
            return None;
        }
        Some(self.settings.image_urls[index % self.settings.image_urls.len()].clone())
    }

    /// Make sure the default and featured genres exist, backfill URLs on existing movies and, while the
    /// catalog is small, upsert the placeholder and featured titles. Safe to run repeatedly.
    #[instrument(skip(self))]
    pub async fn ensure_seeded(&self) -> Result<SeedReport> {
        let featured_genres = FEATURED_TITLES.iter().flat_map(|title| title.genres.iter());
        for name in DEFAULT_GENRES.iter().chain(featured_genres) {
            self.db.find_or_create_genre(name).await?;
        }

        let mut report = SeedReport {
            backfilled: self.backfill_existing().await?,
            ..SeedReport::default()
        };

        let count = self.db.count_movies().await?;
        if count < self.settings.min_catalog_size {
            log::info!(
                "Catalog has {} movies (minimum {}), seeding titles",
                count,
                self.settings.min_catalog_size
            );
            report.upserted = self.upsert_catalog(Utc::now().date_naive()).await?;
        }

        log::info!(
            "Seeding finished: {} backfilled, {} upserted",
            report.backfilled,
            report.upserted
        );
        Ok(report)
    }

    async fn backfill_existing(&self) -> Result<usize> {
        let mut saved = 0;
        for (index, movie) in self.db.list_movies().await?.into_iter().enumerate() {
            let original = MovieDraft::from(movie);
            let mut draft = original.clone();
            draft.video_url = Some(self.settings.default_video_url.clone());
            if draft.thumbnail_url.is_none() {
                draft.thumbnail_url = self.image_url(index);
            }

            if draft != original {
                self.db.save_movie(&draft).await?;
                saved += 1;
            }
        }
        Ok(saved)
    }

    async fn upsert_catalog(&self, today: NaiveDate) -> Result<usize> {
        let mut upserted = 0;

        for i in 1..=self.settings.placeholder_count {
            let genre = if i % 3 == 0 {
                "Comedy"
            } else if i % 2 == 0 {
                "Action"
            } else {
                "Horror"
            };
            let entry = CatalogEntry {
                title: format!("Movie Title {}", i),
                description: format!("Description for movie {}. Exciting plot details here.", i),
                duration: "2h".to_string(),
                maturity_rating: Some("U/A 13+".to_string()),
                match_score: 90 + (i % 10) as i32,
                genres: vec![genre.to_string()],
                thumbnail_url: self.image_url(i),
                ..CatalogEntry::default()
            };
            if self.upsert(entry, today).await? {
                upserted += 1;
            }
        }

        for featured in FEATURED_TITLES {
            let (thumbnail_url, poster_url, backdrop_url) = match featured.artwork {
                Artwork::Bundled(index) => (self.image_url(index), None, None),
                Artwork::Picsum(slug) => {
                    let backdrop = format!("https://picsum.photos/seed/{}/1280/720", slug);
                    (
                        Some(backdrop.clone()),
                        Some(format!("https://picsum.photos/seed/{}/500/750", slug)),
                        Some(backdrop),
                    )
                }
            };
            let entry = CatalogEntry {
                title: featured.title.to_string(),
                description: featured.description.to_string(),
                rating: featured.rating,
                release_year: featured.release_year,
                duration: featured.duration.to_string(),
                maturity_rating: featured.maturity_rating.map(str::to_string),
                match_score: featured.match_score,
                genres: featured.genres.iter().map(|g| g.to_string()).collect(),
                thumbnail_url,
                poster_url,
                backdrop_url,
            };
            if self.upsert(entry, today).await? {
                upserted += 1;
            }
        }

        Ok(upserted)
    }

    /// Insert the title or bring the existing row in line with `entry`.
    /// Returns `false` when the stored row already matched.
    async fn upsert(&self, entry: CatalogEntry, today: NaiveDate) -> Result<bool> {
        let original = self
            .db
            .get_movie_by_title(&entry.title)
            .await?
            .map(MovieDraft::from);

        let mut draft = original.clone().unwrap_or_default();
        draft.title = entry.title;
        draft.description = Some(entry.description);
        draft.duration = Some(entry.duration);
        draft.maturity_rating = entry.maturity_rating;
        draft.match_score = Some(entry.match_score);
        draft.thumbnail_url = entry.thumbnail_url;
        draft.video_url = Some(self.settings.default_video_url.clone());
        if entry.rating.is_some() {
            draft.rating = entry.rating;
        }
        if entry.release_year.is_some() {
            draft.release_year = entry.release_year;
        }
        if entry.poster_url.is_some() {
            draft.poster_url = entry.poster_url;
        }
        if entry.backdrop_url.is_some() {
            draft.backdrop_url = entry.backdrop_url;
        }
        if draft.release_date.is_none() {
            draft.release_date = Some(today);
        }

        // Stored genres come back sorted by name
        let mut genres = entry.genres;
        genres.sort();
        genres.dedup();
        draft.genres = genres;

        if original.as_ref() == Some(&draft) {
            return Ok(false);
        }

        let movie = self.db.save_movie(&draft).await?;
        log::debug!("Seeded movie: '{}' (ID: {})", movie.title, movie.id);
        Ok(true)
    }
}
