//! Loading catalog and rating data from JSON Lines files.
//!
//! Both files carry one JSON record per line:
//! - movies:  `{"id": 1, "title": "...", "genres": ["Drama"], "synopsis": "..."}`
//! - ratings: `{"user_id": 1, "movie_id": 1, "score": 4.5, "timestamp": 978300760}`
//!
//! The loader validates as it goes and reports the offending line on failure.

use crate::error::{CatalogError, Result};
use crate::types::*;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// On-disk shape of a movie record
#[derive(Debug, Deserialize)]
struct MovieRecord {
    id: MovieId,
    title: String,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    synopsis: String,
}

/// On-disk shape of a rating record
#[derive(Debug, Deserialize)]
struct RatingRecord {
    user_id: UserId,
    movie_id: MovieId,
    score: f32,
    #[serde(default)]
    timestamp: i64,
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path).map_err(|_| CatalogError::FileNotFound {
        path: path.display().to_string(),
    })?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content.lines().map(|l| l.to_string()).collect())
}

/// Load the movie catalog from a JSON Lines file.
///
/// Genre tags are deduplicated (first occurrence kept). Duplicate movie ids
/// and empty titles are rejected.
pub fn load_catalog(path: &Path) -> Result<CatalogStore> {
    let file_name = path.display().to_string();
    let mut store = CatalogStore::new();

    for (idx, line) in read_lines(path)?.iter().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record: MovieRecord =
            serde_json::from_str(trimmed).map_err(|e| CatalogError::MalformedRecord {
                file: file_name.clone(),
                line: line_no,
                reason: e.to_string(),
            })?;

        if record.title.trim().is_empty() {
            return Err(CatalogError::InvalidValue {
                field: "title".to_string(),
                value: format!("(empty, movie id {})", record.id),
            });
        }
        if store.get_movie(record.id).is_some() {
            return Err(CatalogError::ValidationError(format!(
                "duplicate movie id {} at line {}",
                record.id, line_no
            )));
        }

        // Dedup genre tags, keeping first occurrence order
        let mut genres: Vec<String> = Vec::with_capacity(record.genres.len());
        for genre in record.genres {
            if !genres.contains(&genre) {
                genres.push(genre);
            }
        }

        store.insert_movie(Movie {
            id: record.id,
            title: record.title,
            genres,
            synopsis: record.synopsis,
        });
    }

    Ok(store)
}

/// Load the rating log from a JSON Lines file.
///
/// Scores outside the rating scale are rejected; duplicate (user, movie)
/// observations are kept as-is (the store resolves them on read).
pub fn load_ratings(path: &Path) -> Result<RatingStore> {
    let file_name = path.display().to_string();
    let mut store = RatingStore::new();

    for (idx, line) in read_lines(path)?.iter().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record: RatingRecord =
            serde_json::from_str(trimmed).map_err(|e| CatalogError::MalformedRecord {
                file: file_name.clone(),
                line: line_no,
                reason: e.to_string(),
            })?;

        if !(RATING_MIN..=RATING_MAX).contains(&record.score) {
            return Err(CatalogError::InvalidValue {
                field: "score".to_string(),
                value: format!("{} at line {}", record.score, line_no),
            });
        }

        store.insert_rating(Rating {
            user_id: record.user_id,
            movie_id: record.movie_id,
            score: record.score,
            timestamp: record.timestamp,
        });
    }

    Ok(store)
}
