//! Category, genre and title bodies

use super::common::double_option;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use yamdb_core::{
    validation, validation_error, Taxon, Title, TitleDraft, TitleFilter, TitleId, YamdbResult,
};

/// Category or genre as shown to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaxonResponse {
    #[schema(example = "Films")]
    pub name: String,
    #[schema(example = "films")]
    pub slug: String,
}

impl From<Taxon> for TaxonResponse {
    fn from(taxon: Taxon) -> Self {
        Self {
            name: taxon.name,
            slug: taxon.slug,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTaxonRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl CreateTaxonRequest {
    pub fn validate(&self) -> YamdbResult<()> {
        validation::validate_taxon_name(&self.name)?;
        validation::validate_slug(&self.slug)
    }
}

/// Title read shape
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TitleResponse {
    pub id: TitleId,
    pub name: String,
    pub year: i32,
    /// Rounded mean review score; `null` without reviews
    pub rating: Option<i32>,
    pub description: String,
    pub genre: Vec<TaxonResponse>,
    pub category: Option<TaxonResponse>,
}

impl From<Title> for TitleResponse {
    fn from(title: Title) -> Self {
        Self {
            id: title.id,
            name: title.name,
            year: title.year,
            rating: title.rating,
            description: title.description,
            genre: title.genres.into_iter().map(TaxonResponse::from).collect(),
            category: title.category.map(TaxonResponse::from),
        }
    }
}

fn validate_draft(draft: &TitleDraft) -> YamdbResult<()> {
    validation::validate_title_name(&draft.name)?;
    validation::validate_year(draft.year)
}

/// Full title write shape; taxonomies by slug
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TitleRequest {
    #[serde(default)]
    pub name: String,
    pub year: Option<i32>,
    #[serde(default)]
    pub description: String,
    /// Genre slugs
    #[serde(default)]
    pub genre: Vec<String>,
    /// Category slug
    pub category: Option<String>,
}

impl TitleRequest {
    pub fn into_draft(self) -> YamdbResult<TitleDraft> {
        let year = self
            .year
            .ok_or_else(|| validation_error!("This field is required.", "year"))?;
        let draft = TitleDraft {
            name: self.name,
            year,
            description: self.description,
            category: self.category,
            genres: self.genre,
        };
        validate_draft(&draft)?;
        Ok(draft)
    }
}

/// Partial title update; `"category": null` clears the category
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TitlePatchRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
}

impl TitlePatchRequest {
    /// Merge onto the stored title
    pub fn apply(self, current: &Title) -> YamdbResult<TitleDraft> {
        let draft = TitleDraft {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            year: self.year.unwrap_or(current.year),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            category: self
                .category
                .unwrap_or_else(|| current.category.as_ref().map(|c| c.slug.clone())),
            genres: self
                .genre
                .unwrap_or_else(|| current.genres.iter().map(|g| g.slug.clone()).collect()),
        };
        validate_draft(&draft)?;
        Ok(draft)
    }
}

/// Title list filters. At most one applies, in field order.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TitleFilterQuery {
    /// Category slug
    pub category: Option<String>,
    /// Genre slug
    pub genre: Option<String>,
    /// Exact release year
    pub year: Option<String>,
    /// Exact title name
    pub name: Option<String>,
}

impl TitleFilterQuery {
    pub fn into_filter(self) -> YamdbResult<TitleFilter> {
        if let Some(category) = self.category {
            return Ok(TitleFilter::Category(category));
        }
        if let Some(genre) = self.genre {
            return Ok(TitleFilter::Genre(genre));
        }
        if let Some(year) = self.year {
            let year = year
                .trim()
                .parse()
                .map_err(|_| validation_error!("Enter a whole number.", "year"))?;
            return Ok(TitleFilter::Year(year));
        }
        if let Some(name) = self.name {
            return Ok(TitleFilter::Name(name));
        }
        Ok(TitleFilter::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(category: Option<&str>, genre: Option<&str>, year: Option<&str>, name: Option<&str>) -> TitleFilterQuery {
        TitleFilterQuery {
            category: category.map(str::to_string),
            genre: genre.map(str::to_string),
            year: year.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_filter_precedence() {
        assert_eq!(
            query(Some("films"), Some("drama"), Some("1995"), Some("Heat")).into_filter().unwrap(),
            TitleFilter::Category("films".to_string())
        );
        assert_eq!(
            query(None, Some("drama"), Some("1995"), None).into_filter().unwrap(),
            TitleFilter::Genre("drama".to_string())
        );
        assert_eq!(
            query(None, None, Some("1995"), Some("Heat")).into_filter().unwrap(),
            TitleFilter::Year(1995)
        );
        assert_eq!(
            query(None, None, None, Some("Heat")).into_filter().unwrap(),
            TitleFilter::Name("Heat".to_string())
        );
        assert_eq!(query(None, None, None, None).into_filter().unwrap(), TitleFilter::All);
    }

    #[test]
    fn test_non_numeric_year_is_rejected() {
        let err = query(None, None, Some("last year"), None).into_filter().unwrap_err();
        assert_eq!(err.field(), Some("year"));
    }

    #[test]
    fn test_year_is_required_on_full_write() {
        let request: TitleRequest = serde_json::from_str(r#"{"name": "Heat"}"#).unwrap();
        assert_eq!(request.into_draft().unwrap_err().field(), Some("year"));
    }

    #[test]
    fn test_future_year_is_rejected() {
        let request: TitleRequest =
            serde_json::from_str(r#"{"name": "Sequel", "year": 9999}"#).unwrap();
        assert_eq!(request.into_draft().unwrap_err().field(), Some("year"));
    }

    #[test]
    fn test_patch_merges_onto_current() {
        let current = Title {
            id: 1,
            name: "Heat".to_string(),
            year: 1995,
            description: "Crime".to_string(),
            category: Some(Taxon {
                id: 1,
                name: "Films".to_string(),
                slug: "films".to_string(),
            }),
            genres: vec![Taxon {
                id: 2,
                name: "Drama".to_string(),
                slug: "drama".to_string(),
            }],
            rating: None,
        };

        let patch: TitlePatchRequest = serde_json::from_str(r#"{"year": 1996}"#).unwrap();
        let draft = patch.apply(&current).unwrap();
        assert_eq!(draft.year, 1996);
        assert_eq!(draft.category.as_deref(), Some("films"));
        assert_eq!(draft.genres, vec!["drama".to_string()]);

        let patch: TitlePatchRequest = serde_json::from_str(r#"{"category": null}"#).unwrap();
        assert_eq!(patch.apply(&current).unwrap().category, None);
    }
}
