use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::MovieId;

/// A movie as stored by the Movies API.
///
/// `name` is unique across movies; the server enforces it, not this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub name: String,
    pub year: i32,
    pub rating: f64,
}

impl Movie {
    /// Attach a server-assigned identifier to a draft.
    pub fn from_draft(id: MovieId, draft: MovieDraft) -> Self {
        Self {
            id,
            name: draft.name,
            year: draft.year,
            rating: draft.rating,
        }
    }

    /// The draft this movie would have been created from.
    pub fn to_draft(&self) -> MovieDraft {
        MovieDraft {
            name: self.name.clone(),
            year: self.year,
            rating: self.rating,
        }
    }
}

/// Creation payload: a movie without an identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDraft {
    pub name: String,
    pub year: i32,
    pub rating: f64,
}

impl MovieDraft {
    pub fn new(name: impl Into<String>, year: i32, rating: f64) -> DomainResult<Self> {
        let draft = Self {
            name: name.into(),
            year,
            rating,
        };
        draft.validate()?;
        Ok(draft)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("movie name cannot be empty"));
        }
        if !self.rating.is_finite() {
            return Err(DomainError::validation("movie rating must be a finite number"));
        }
        Ok(())
    }
}

/// Partial update of a movie.
///
/// There is deliberately no `id` field: an update can never rewrite the
/// identifier. Absent fields are left out of the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl MovieUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.year.is_none() && self.rating.is_none()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("movie name cannot be empty"));
            }
        }
        if let Some(rating) = self.rating {
            if !rating.is_finite() {
                return Err(DomainError::validation("movie rating must be a finite number"));
            }
        }
        Ok(())
    }

    /// Overwrite exactly the supplied fields of `movie`.
    pub fn apply_to(&self, movie: &mut Movie) {
        if let Some(name) = &self.name {
            movie.name = name.clone();
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(rating) = self.rating {
            movie.rating = rating;
        }
    }
}
