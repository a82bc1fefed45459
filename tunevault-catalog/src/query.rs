//! Search and chart filter construction
//!
//! A raw search string becomes an OR of case-sensitive substring predicates,
//! two per whitespace-delimited token (title and artist). A genre becomes an
//! exact-equality filter. Both render into parameterised SQL; user text is
//! always bound, never spliced into the statement.

use sqlx::{QueryBuilder, Sqlite};

use crate::error::{CatalogError, CatalogResult};

/// Recording column a predicate applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Artist,
}

impl Field {
    fn column(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Artist => "artist",
        }
    }
}

/// `field` contains `needle` (case-sensitive)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: Field,
    pub needle: String,
}

/// OR of substring predicates; never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    predicates: Vec<Predicate>,
}

impl SearchFilter {
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Number of tokens that produced this filter
    pub fn token_count(&self) -> usize {
        self.predicates.len() / 2
    }

    /// Append `(<p1> OR <p2> ...)` to a statement under construction
    pub fn push_sql(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder.push("(");
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            // instr() is case-sensitive, unlike LIKE
            builder
                .push("instr(")
                .push(predicate.field.column())
                .push(", ")
                .push_bind(predicate.needle.clone())
                .push(") > 0");
        }
        builder.push(")");
    }
}

/// Exact genre match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreFilter {
    pub genre: String,
}

impl GenreFilter {
    pub fn push_sql(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder.push("genre = ").push_bind(self.genre.clone());
    }
}

/// Build the search filter for a raw query string
///
/// Fails when the query is absent or contains no non-empty token.
pub fn build_search_filter(raw_query: Option<&str>) -> CatalogResult<SearchFilter> {
    let raw_query =
        raw_query.ok_or_else(|| CatalogError::InvalidInput("missing search query".to_string()))?;

    let predicates: Vec<Predicate> = raw_query
        .split_whitespace()
        .flat_map(|token| {
            [
                Predicate {
                    field: Field::Title,
                    needle: token.to_string(),
                },
                Predicate {
                    field: Field::Artist,
                    needle: token.to_string(),
                },
            ]
        })
        .collect();

    if predicates.is_empty() {
        return Err(CatalogError::InvalidInput(
            "search query has no terms".to_string(),
        ));
    }

    Ok(SearchFilter { predicates })
}

/// Build the chart filter for a genre
pub fn build_genre_filter(genre: Option<&str>) -> CatalogResult<GenreFilter> {
    let genre = genre.ok_or_else(|| CatalogError::InvalidInput("missing genre".to_string()))?;
    Ok(GenreFilter {
        genre: genre.to_string(),
    })
}
