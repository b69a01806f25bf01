//! Content similarity index over the movie catalog.
//!
//! Builds one TF-IDF weighted term vector per movie from its synopsis and
//! genre text, then a full pairwise cosine similarity matrix. The matrix is
//! rebuilt from scratch whenever the catalog changes; there is no
//! incremental update path.
//!
//! ## Algorithm
//! 1. Tokenize each movie's content text
//! 2. Assign vocabulary columns in sorted term order
//! 3. Weight terms by tf x smoothed idf, l2-normalize each vector
//! 4. Compute all pairwise dot products (cosine on unit vectors)
//!
//! Build cost is O(M^2 x V) for M movies and vocabulary size V. That is
//! acceptable while the catalog stays moderate; a larger catalog would need
//! an approximate nearest-neighbor structure instead of the full matrix.

use crate::text::Tokenizer;
use catalog::{CatalogStore, MovieId};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Sparse TF-IDF vector: (vocabulary column, weight), sorted by column
type SparseVector = Vec<(usize, f32)>;

/// Precomputed content similarity for the whole catalog.
///
/// Row order follows ascending movie id, so the same catalog always
/// produces the same matrix. Duplicate titles map to one canonical row
/// (first seen in row order, i.e. the lowest movie id).
#[derive(Debug)]
pub struct ContentIndex {
    /// Row index -> movie id, ascending
    ids: Vec<MovieId>,
    /// Movie id -> row index
    row_of: HashMap<MovieId, usize>,
    /// Lowercased title -> canonical row index
    title_rows: HashMap<String, usize>,
    /// Vocabulary size at build time
    vocab_size: usize,
    /// Full similarity row per movie, in row order
    rows: Vec<Vec<(MovieId, f32)>>,
}

impl ContentIndex {
    /// Build the index with the default tokenizer.
    pub fn build(catalog: &CatalogStore) -> Self {
        Self::build_with(catalog, &Tokenizer::default())
    }

    /// Build the index with a custom tokenizer.
    pub fn build_with(catalog: &CatalogStore, tokenizer: &Tokenizer) -> Self {
        let movies = catalog.list_movies();
        let ids: Vec<MovieId> = movies.iter().map(|m| m.id).collect();
        let row_of: HashMap<MovieId, usize> =
            ids.iter().enumerate().map(|(row, &id)| (id, row)).collect();

        // Canonical row per title: first seen wins, and rows are in
        // ascending id order, so the lowest id claims the title.
        let mut title_rows: HashMap<String, usize> = HashMap::new();
        for (row, movie) in movies.iter().enumerate() {
            title_rows.entry(movie.title.to_lowercase()).or_insert(row);
        }

        let documents: Vec<Vec<String>> = movies
            .par_iter()
            .map(|movie| tokenizer.tokenize(&movie.content_text()))
            .collect();

        // Vocabulary columns in sorted term order for a stable layout
        let terms: BTreeSet<&String> = documents.iter().flatten().collect();
        let vocab: HashMap<&String, usize> = terms
            .iter()
            .enumerate()
            .map(|(column, term)| (*term, column))
            .collect();
        let vocab_size = vocab.len();

        let idf = compute_idf(&documents, &vocab);
        let vectors: Vec<SparseVector> = documents
            .par_iter()
            .map(|doc| weigh_document(doc, &vocab, &idf))
            .collect();

        debug!(
            "Vectorized {} movies over a vocabulary of {} terms",
            ids.len(),
            vocab_size
        );

        // Full pairwise matrix. Unit vectors make the dot product a cosine;
        // the diagonal is pinned to 1.0 so an empty-text movie still has
        // maximal self-similarity.
        let rows: Vec<Vec<(MovieId, f32)>> = (0..ids.len())
            .into_par_iter()
            .map(|i| {
                (0..ids.len())
                    .map(|j| {
                        let score = if i == j {
                            1.0
                        } else {
                            // Clamp float drift so the diagonal stays the row max
                            sparse_dot(&vectors[i], &vectors[j]).min(1.0)
                        };
                        (ids[j], score)
                    })
                    .collect()
            })
            .collect();

        info!(
            "Built content index: {} movies, {} terms",
            ids.len(),
            vocab_size
        );

        Self {
            ids,
            row_of,
            title_rows,
            vocab_size,
            rows,
        }
    }

    /// Full similarity row for a movie: (movie id, score) for every catalog
    /// movie, in row order. `None` for ids not in the index.
    pub fn similar_row(&self, movie_id: MovieId) -> Option<&[(MovieId, f32)]> {
        self.row_of
            .get(&movie_id)
            .map(|&row| self.rows[row].as_slice())
    }

    /// Similarity between two movies, if both are indexed
    pub fn similarity(&self, a: MovieId, b: MovieId) -> Option<f32> {
        let row = *self.row_of.get(&a)?;
        let column = *self.row_of.get(&b)?;
        Some(self.rows[row][column].1)
    }

    /// The `n` most similar movies to `movie_id`, excluding itself,
    /// ordered by (score desc, movie id asc).
    pub fn most_similar(&self, movie_id: MovieId, n: usize) -> Vec<(MovieId, f32)> {
        let Some(row) = self.similar_row(movie_id) else {
            return Vec::new();
        };

        let mut neighbors: Vec<(MovieId, f32)> = row
            .iter()
            .filter(|(id, _)| *id != movie_id)
            .copied()
            .collect();
        neighbors.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        neighbors.truncate(n);
        neighbors
    }

    /// Canonical movie id for a title (case-insensitive, first-seen wins)
    pub fn canonical_for_title(&self, title: &str) -> Option<MovieId> {
        self.title_rows
            .get(&title.to_lowercase())
            .map(|&row| self.ids[row])
    }

    /// Whether a movie id is indexed
    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.row_of.contains_key(&movie_id)
    }

    /// Indexed movie ids in row (ascending id) order
    pub fn movie_ids(&self) -> &[MovieId] {
        &self.ids
    }

    /// Number of indexed movies
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the index holds no movies
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Vocabulary size at the last build
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }
}

/// Smoothed inverse document frequency per vocabulary column:
/// `ln((1 + N) / (1 + df)) + 1`, never zero.
fn compute_idf(documents: &[Vec<String>], vocab: &HashMap<&String, usize>) -> Vec<f32> {
    let mut df = vec![0u32; vocab.len()];
    for doc in documents {
        let unique: BTreeSet<usize> = doc.iter().filter_map(|t| vocab.get(t).copied()).collect();
        for column in unique {
            df[column] += 1;
        }
    }

    let doc_count = documents.len() as f32;
    df.iter()
        .map(|&d| ((1.0 + doc_count) / (1.0 + d as f32)).ln() + 1.0)
        .collect()
}

/// TF-IDF weigh one document and l2-normalize it.
fn weigh_document(
    doc: &[String],
    vocab: &HashMap<&String, usize>,
    idf: &[f32],
) -> SparseVector {
    let mut counts: HashMap<usize, f32> = HashMap::new();
    for term in doc {
        if let Some(&column) = vocab.get(term) {
            *counts.entry(column).or_insert(0.0) += 1.0;
        }
    }

    let mut weighted: SparseVector = counts
        .into_iter()
        .map(|(column, tf)| (column, tf * idf[column]))
        .collect();
    weighted.sort_unstable_by_key(|&(column, _)| column);

    let norm: f32 = weighted.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, w) in &mut weighted {
            *w /= norm;
        }
    }
    weighted
}

/// Dot product of two column-sorted sparse vectors.
fn sparse_dot(a: &SparseVector, b: &SparseVector) -> f32 {
    let mut sum = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Movie;

    fn movie(id: MovieId, title: &str, synopsis: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            genres: Vec::new(),
            synopsis: synopsis.to_string(),
        }
    }

    fn create_test_catalog() -> CatalogStore {
        let mut store = CatalogStore::new();
        store.insert_movie(movie(1, "Movie A", "space war robots"));
        store.insert_movie(movie(2, "Movie B", "robot war in space"));
        store.insert_movie(movie(3, "Movie C", "romantic drama"));
        store
    }

    #[test]
    fn test_shared_terms_raise_similarity() {
        let index = ContentIndex::build(&create_test_catalog());

        let ab = index.similarity(1, 2).unwrap();
        let ac = index.similarity(1, 3).unwrap();
        let bc = index.similarity(2, 3).unwrap();

        assert!(ab > ac, "A-B ({}) should exceed A-C ({})", ab, ac);
        assert!(ab > bc, "A-B ({}) should exceed B-C ({})", ab, bc);
        assert_eq!(ac, 0.0);
    }

    #[test]
    fn test_matrix_is_symmetric_with_max_diagonal() {
        let index = ContentIndex::build(&create_test_catalog());

        for &a in &[1, 2, 3] {
            for &b in &[1, 2, 3] {
                assert_eq!(index.similarity(a, b), index.similarity(b, a));
            }
            let row = index.similar_row(a).unwrap();
            let self_sim = index.similarity(a, a).unwrap();
            assert_eq!(self_sim, 1.0);
            for &(_, score) in row {
                assert!(score <= self_sim);
            }
        }
    }

    #[test]
    fn test_empty_text_movie_is_isolated() {
        let mut store = create_test_catalog();
        store.insert_movie(movie(4, "Silent", ""));
        let index = ContentIndex::build(&store);

        assert_eq!(index.similarity(4, 4), Some(1.0));
        for &other in &[1, 2, 3] {
            assert_eq!(index.similarity(4, other), Some(0.0));
        }
    }

    #[test]
    fn test_genres_contribute_to_vectors() {
        let mut store = CatalogStore::new();
        store.insert_movie(Movie {
            id: 1,
            title: "Tagged".to_string(),
            genres: vec!["Western".to_string()],
            synopsis: String::new(),
        });
        store.insert_movie(Movie {
            id: 2,
            title: "Also Tagged".to_string(),
            genres: vec!["Western".to_string()],
            synopsis: String::new(),
        });
        let index = ContentIndex::build(&store);

        assert!(index.similarity(1, 2).unwrap() > 0.0);
    }

    #[test]
    fn test_duplicate_titles_resolve_first_seen() {
        let mut store = CatalogStore::new();
        store.insert_movie(movie(7, "Remake", "new cut"));
        store.insert_movie(movie(3, "Remake", "original cut"));
        let index = ContentIndex::build(&store);

        // Rows are in ascending id order, so id 3 claims the title
        assert_eq!(index.canonical_for_title("remake"), Some(3));
        assert_eq!(index.canonical_for_title("REMAKE"), Some(3));
        assert_eq!(index.canonical_for_title("unknown"), None);
    }

    #[test]
    fn test_empty_catalog() {
        let index = ContentIndex::build(&CatalogStore::new());
        assert!(index.is_empty());
        assert_eq!(index.vocab_size(), 0);
        assert!(index.similar_row(1).is_none());
    }

    #[test]
    fn test_most_similar_excludes_self() {
        let index = ContentIndex::build(&create_test_catalog());
        let neighbors = index.most_similar(1, 2);

        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].0, 2);
        assert!(neighbors.iter().all(|&(id, _)| id != 1));
    }

    #[test]
    fn test_unknown_movie_row_is_none() {
        let index = ContentIndex::build(&create_test_catalog());
        assert!(index.similar_row(99).is_none());
        assert!(index.most_similar(99, 5).is_empty());
    }
}
