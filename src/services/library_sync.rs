use std::path::{Path, PathBuf};
use std::sync::Arc;

use color_eyre::{Result, eyre::eyre};
use rand::Rng;
use tracing::instrument;
use walkdir::WalkDir;

use crate::database::{Database, Movie, MovieDraft};
use crate::services::placeholders;

/// Counts from one pass over the images directory
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub scanned: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Indexes image files from a local directory as movies, backfilling missing metadata
pub struct LibrarySync {
    db: Arc<Database>,
    directory: PathBuf,
    url_prefix: String,
    extensions: Vec<String>,
}

impl LibrarySync {
    pub fn new(
        db: Arc<Database>,
        directory: PathBuf,
        url_prefix: &str,
        extensions: &[String],
    ) -> Self {
        Self {
            db,
            directory,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            extensions: extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    /// Matching files directly inside the directory, sorted by name.
    /// `None` when the directory does not exist.
    pub fn media_files(&self) -> Option<Vec<PathBuf>> {
        if !self.directory.is_dir() {
            return None;
        }

        Some(
            WalkDir::new(&self.directory)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        log::warn!("Skipping unreadable entry in {}: {}", self.directory.display(), e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file() && self.matches_extension(entry.path()))
                .map(|entry| entry.into_path())
                .collect(),
        )
    }

    /// Scan the directory once. Failures on individual files are logged and counted,
    /// never propagated.
    #[instrument(skip(self, rng), fields(directory = %self.directory.display()))]
    pub async fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> SyncReport {
        let mut report = SyncReport::default();

        let Some(files) = self.media_files() else {
            log::warn!("Images path not found: {}", self.directory.display());
            return report;
        };

        for path in files {
            report.scanned += 1;
            match self.sync_file(&path, rng).await {
                Ok(FileOutcome::Created) => report.created += 1,
                Ok(FileOutcome::Updated) => report.updated += 1,
                Ok(FileOutcome::Unchanged) => report.unchanged += 1,
                Err(e) => {
                    report.failed += 1;
                    log::error!("Failed to index {}: {:?}", path.display(), e);
                }
            }
        }

        log::info!(
            "Library sync finished: {} scanned, {} created, {} updated, {} unchanged, {} failed",
            report.scanned,
            report.created,
            report.updated,
            report.unchanged,
            report.failed
        );
        report
    }

    /// Pick the row or title a file without a row of its own is indexed under.
    ///
    /// A row with the derived title that no file owns yet is adopted. When another file
    /// already owns that title, the full file name is used as the title instead.
    async fn claim_title(&self, file_name: &str, title: String) -> Result<(Option<Movie>, String)> {
        for candidate in [title, file_name.to_string()] {
            match self.db.get_movie_by_title(&candidate).await? {
                None => return Ok((None, candidate)),
                Some(movie) if movie.file_name.is_none() => return Ok((Some(movie), candidate)),
                Some(movie) => log::debug!(
                    "Title '{}' already belongs to {}",
                    candidate,
                    movie.file_name.as_deref().unwrap_or_default()
                ),
            }
        }
        Err(eyre!("No free title for {}", file_name))
    }

    async fn sync_file<R: Rng + ?Sized>(&self, path: &Path, rng: &mut R) -> Result<FileOutcome> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| eyre!("File name is not valid UTF-8: {}", path.display()))?
            .to_string();
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&file_name);
        let title = placeholders::title_from_file_stem(stem);

        let (existing, title) = match self.db.get_movie_by_file_name(&file_name).await? {
            Some(movie) => (Some(movie), title),
            None => self.claim_title(&file_name, title).await?,
        };

        let is_new = existing.is_none();
        let mut draft = match existing {
            Some(movie) => MovieDraft::from(movie),
            None => MovieDraft {
                title,
                ..MovieDraft::default()
            },
        };

        let mut changed = is_new;
        if draft.file_name.as_deref() != Some(file_name.as_str()) {
            draft.file_name = Some(file_name.clone());
            changed = true;
        }

        changed |= backfill_placeholders(&mut draft, &file_name, &self.url_prefix, rng);

        if draft.thumbnail.is_none() {
            match tokio::fs::read(path).await {
                Ok(bytes) => {
                    draft.thumbnail = Some(bytes);
                    changed = true;
                }
                Err(e) => log::warn!("Could not read image bytes for {}: {}", file_name, e),
            }
        }

        if !changed {
            return Ok(FileOutcome::Unchanged);
        }

        let saved = self.db.save_movie(&draft).await?;
        if is_new {
            log::info!("Indexed local movie: '{}' (ID: {})", saved.title, saved.id);
            Ok(FileOutcome::Created)
        } else {
            log::info!("Updated local movie: '{}' (ID: {})", saved.title, saved.id);
            Ok(FileOutcome::Updated)
        }
    }
}

/// Fill every unset metadata field of a file-backed movie. Returns whether anything changed.
pub fn backfill_placeholders<R: Rng + ?Sized>(
    draft: &mut MovieDraft,
    file_name: &str,
    url_prefix: &str,
    rng: &mut R,
) -> bool {
    let mut changed = false;

    let description_unset = draft
        .description
        .as_deref()
        .map(|d| d.starts_with(placeholders::SEEDED_DESCRIPTION_PREFIX))
        .unwrap_or(true);
    if description_unset {
        draft.description = Some(placeholders::description_for_file(file_name));
        changed = true;
    }
    if draft.rating.is_none() {
        draft.rating = Some(placeholders::random_rating(rng));
        changed = true;
    }
    if draft.release_year.is_none() {
        draft.release_year = Some(placeholders::random_release_year(rng));
        changed = true;
    }
    if draft.duration.is_none() {
        draft.duration = Some(placeholders::random_duration(rng));
        changed = true;
    }
    if draft.genres.is_empty() {
        draft.genres = placeholders::random_genres(rng);
        changed = true;
    }
    if draft.match_score.is_none() {
        draft.match_score = Some(placeholders::random_match_score(rng));
        changed = true;
    }

    let image_url = format!("{}/{}", url_prefix.trim_end_matches('/'), file_name);
    if draft.poster_url.is_none() {
        draft.poster_url = Some(image_url.clone());
        changed = true;
    }
    if draft.backdrop_url.is_none() {
        draft.backdrop_url = Some(image_url);
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::test_utils::{movie_draft, test_db};

    fn write_image(dir: &Path, name: &str, bytes: &[u8]) {
        std::fs::write(dir.join(name), bytes).unwrap();
    }

    fn sync_for(db: Arc<Database>, dir: &Path) -> LibrarySync {
        LibrarySync::new(db, dir.to_path_buf(), "/images/", &["webp".to_string()])
    }

    #[tokio::test]
    async fn test_indexes_matching_files_with_placeholders() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "ocean-deep.webp", b"ocean");
        write_image(dir.path(), "city_lights.WEBP", b"city");
        write_image(dir.path(), "notes.txt", b"ignored");

        let mut rng = StdRng::seed_from_u64(42);
        let report = sync_for(db.clone(), dir.path()).run(&mut rng).await;

        assert_eq!(report.scanned, 2);
        assert_eq!(report.created, 2);
        assert_eq!(report.failed, 0);

        let movies = db.list_movies().await.unwrap();
        assert_eq!(movies.len(), 2);

        let ocean = db.get_movie_by_title("ocean deep").await.unwrap().unwrap();
        assert_eq!(ocean.file_name.as_deref(), Some("ocean-deep.webp"));
        assert_eq!(ocean.poster_url.as_deref(), Some("/images/ocean-deep.webp"));
        assert_eq!(ocean.backdrop_url.as_deref(), Some("/images/ocean-deep.webp"));
        assert_eq!(ocean.thumbnail.as_deref(), Some(&b"ocean"[..]));
        assert!(ocean.description.unwrap().contains("ocean-deep.webp"));

        for movie in movies {
            let rating = movie.rating.unwrap();
            assert!((7.0..=9.9).contains(&rating));
            assert!((2010..=2025).contains(&movie.release_year.unwrap()));
            assert!((80..=99).contains(&movie.match_score.unwrap()));
            assert!((1..=3).contains(&movie.genres.len()));
            let distinct: HashSet<_> = movie.genres.iter().map(|g| g.name.clone()).collect();
            assert_eq!(distinct.len(), movie.genres.len());
        }
    }

    #[tokio::test]
    async fn test_second_pass_changes_nothing() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.webp", b"a");
        write_image(dir.path(), "b.webp", b"b");

        let sync = sync_for(db.clone(), dir.path());
        let mut rng = StdRng::seed_from_u64(1);
        sync.run(&mut rng).await;
        let before = db.list_movies().await.unwrap();

        let report = sync.run(&mut rng).await;
        let after = db.list_movies().await.unwrap();

        assert_eq!(report.unchanged, 2);
        assert_eq!(report.created + report.updated, 0);
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_existing_values_are_kept() {
        let db = test_db().await;
        db.save_movie(&MovieDraft {
            file_name: Some("kept.webp".to_string()),
            rating: Some(5.5),
            description: Some("Description for movie 1. Exciting plot details here.".to_string()),
            ..movie_draft("Kept", &["Drama"])
        })
        .await
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "kept.webp", b"kept");

        let mut rng = StdRng::seed_from_u64(3);
        let report = sync_for(db.clone(), dir.path()).run(&mut rng).await;
        assert_eq!(report.updated, 1);

        let movie = db.get_movie_by_title("Kept").await.unwrap().unwrap();
        assert_eq!(movie.rating, Some(5.5));
        assert_eq!(movie.genres.len(), 1);
        assert_eq!(movie.genres[0].name, "Drama");
        assert!(movie.description.unwrap().contains("kept.webp"));
    }

    #[tokio::test]
    async fn test_title_collision_adopts_existing_row() {
        let db = test_db().await;
        db.save_movie(&movie_draft("Stranger Things", &["Horror"]))
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "Stranger-Things.webp", b"st");

        let mut rng = StdRng::seed_from_u64(5);
        let report = sync_for(db.clone(), dir.path()).run(&mut rng).await;

        assert_eq!(report.created, 0);
        assert_eq!(report.updated, 1);
        assert_eq!(db.count_movies().await.unwrap(), 1);
        let movie = db.get_movie_by_title("Stranger Things").await.unwrap().unwrap();
        assert_eq!(movie.file_name.as_deref(), Some("Stranger-Things.webp"));
    }

    #[tokio::test]
    async fn test_files_sharing_a_title_keep_their_own_rows() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "the-night.webp", b"dash");
        write_image(dir.path(), "the night.webp", b"space");
        write_image(dir.path(), "x.webp", b"lower");
        write_image(dir.path(), "x.WEBP", b"upper");

        let sync = sync_for(db.clone(), dir.path());
        let mut rng = StdRng::seed_from_u64(11);
        let first = sync.run(&mut rng).await;
        assert_eq!(first.created, 4);
        assert_eq!(db.count_movies().await.unwrap(), 4);

        let before = db.list_movies().await.unwrap();
        for _ in 0..2 {
            let report = sync.run(&mut rng).await;
            assert_eq!(report.unchanged, 4);
            assert_eq!(report.created + report.updated + report.failed, 0);
        }
        assert_eq!(db.list_movies().await.unwrap(), before);

        for file_name in ["the-night.webp", "the night.webp", "x.webp", "x.WEBP"] {
            let movie = db.get_movie_by_file_name(file_name).await.unwrap().unwrap();
            assert_eq!(movie.file_name.as_deref(), Some(file_name));
        }
        assert!(db.get_movie_by_title("the night").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_missing_directory_yields_empty_report() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let mut rng = StdRng::seed_from_u64(0);
        let report = sync_for(db.clone(), &missing).run(&mut rng).await;

        assert_eq!(report, SyncReport::default());
        assert_eq!(db.count_movies().await.unwrap(), 0);
    }

    #[test]
    fn test_backfill_leaves_complete_draft_alone() {
        let mut draft = MovieDraft {
            description: Some("A heist inside dreams".to_string()),
            rating: Some(8.8),
            release_year: Some(2010),
            duration: Some("2h 28m".to_string()),
            match_score: Some(98),
            poster_url: Some("https://cdn/poster.jpg".to_string()),
            backdrop_url: Some("https://cdn/backdrop.jpg".to_string()),
            ..movie_draft("Inception", &["Sci-Fi"])
        };
        let original = draft.clone();

        let mut rng = StdRng::seed_from_u64(9);
        assert!(!backfill_placeholders(&mut draft, "inception.webp", "/images", &mut rng));
        assert_eq!(draft, original);
    }
}
