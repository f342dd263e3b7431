//! Categories, genres and titles

use super::{contains_pattern, query_error, unique_violation, Database};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use std::collections::HashMap;
use tracing::{debug, info};
use yamdb_core::{
    conflict_error, not_found_error, validation_error, Taxon, Taxonomy, Title, TitleDraft,
    TitleFilter, TitleId, YamdbError, YamdbResult,
};

fn table(taxonomy: Taxonomy) -> &'static str {
    match taxonomy {
        Taxonomy::Category => "categories",
        Taxonomy::Genre => "genres",
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TaxonRecord {
    id: i64,
    name: String,
    slug: String,
}

impl From<TaxonRecord> for Taxon {
    fn from(record: TaxonRecord) -> Self {
        Taxon {
            id: record.id,
            name: record.name,
            slug: record.slug,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TitleRecord {
    id: i64,
    name: String,
    year: i32,
    description: String,
    category_id: Option<i64>,
    category_name: Option<String>,
    category_slug: Option<String>,
    rating: Option<i64>,
}

#[derive(Debug, sqlx::FromRow)]
struct GenreLinkRecord {
    title_id: i64,
    id: i64,
    name: String,
    slug: String,
}

/// Titles joined with their category and the rounded mean review score.
/// Callers append a WHERE clause and must finish with `GROUP BY t.id`.
const TITLE_SELECT: &str = "SELECT t.id, t.name, t.year, t.description, \
     c.id AS category_id, c.name AS category_name, c.slug AS category_slug, \
     CAST(ROUND(AVG(r.score)) AS INTEGER) AS rating \
     FROM titles t \
     LEFT JOIN categories c ON c.id = t.category_id \
     LEFT JOIN reviews r ON r.title_id = t.id";

fn taxon_write_error(taxonomy: Taxonomy) -> impl FnOnce(sqlx::Error) -> YamdbError {
    move |err| {
        let name_column = format!("{}.name", table(taxonomy));
        let slug_column = format!("{}.slug", table(taxonomy));
        match unique_violation(&err) {
            Some(columns) if columns.contains(&slug_column) => conflict_error!(
                format!("A {} with this slug already exists.", taxonomy.label()),
                "slug"
            ),
            Some(columns) if columns.contains(&name_column) => conflict_error!(
                format!("A {} with this name already exists.", taxonomy.label()),
                "name"
            ),
            _ => query_error("Saving taxon")(err),
        }
    }
}

async fn resolve_category(
    conn: &mut SqliteConnection,
    slug: Option<&str>,
) -> YamdbResult<Option<i64>> {
    let Some(slug) = slug else {
        return Ok(None);
    };
    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE slug = ?")
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await
        .map_err(query_error("Resolving category"))?;
    id.map(Some).ok_or_else(|| {
        validation_error!(
            format!("Object with slug={} does not exist.", slug),
            "category"
        )
    })
}

async fn resolve_genres(conn: &mut SqliteConnection, slugs: &[String]) -> YamdbResult<Vec<i64>> {
    let mut ids = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM genres WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&mut *conn)
            .await
            .map_err(query_error("Resolving genre"))?;
        match id {
            Some(id) if !ids.contains(&id) => ids.push(id),
            Some(_) => {}
            None => {
                return Err(validation_error!(
                    format!("Object with slug={} does not exist.", slug),
                    "genre"
                ))
            }
        }
    }
    Ok(ids)
}

async fn link_genres(
    conn: &mut SqliteConnection,
    title_id: TitleId,
    genre_ids: &[i64],
) -> YamdbResult<()> {
    sqlx::query("DELETE FROM genre_title WHERE title_id = ?")
        .bind(title_id)
        .execute(&mut *conn)
        .await
        .map_err(query_error("Unlinking genres"))?;

    for genre_id in genre_ids {
        sqlx::query("INSERT INTO genre_title (genre_id, title_id) VALUES (?, ?)")
            .bind(genre_id)
            .bind(title_id)
            .execute(&mut *conn)
            .await
            .map_err(query_error("Linking genre"))?;
    }
    Ok(())
}

impl Database {
    /// Categories or genres ordered by name, optionally filtered by name substring
    pub async fn list_taxa(
        &self,
        taxonomy: Taxonomy,
        search: Option<&str>,
    ) -> YamdbResult<Vec<Taxon>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT id, name, slug FROM {}",
            table(taxonomy)
        ));
        if let Some(needle) = search.filter(|s| !s.is_empty()) {
            qb.push(" WHERE name LIKE ");
            qb.push_bind(contains_pattern(needle));
            qb.push(" ESCAPE '\\'");
        }
        qb.push(" ORDER BY name");

        let records = qb
            .build_query_as::<TaxonRecord>()
            .fetch_all(self.pool())
            .await
            .map_err(query_error("Listing taxa"))?;
        Ok(records.into_iter().map(Taxon::from).collect())
    }

    pub async fn taxon_by_slug(&self, taxonomy: Taxonomy, slug: &str) -> YamdbResult<Option<Taxon>> {
        let sql = format!("SELECT id, name, slug FROM {} WHERE slug = ?", table(taxonomy));
        let record = sqlx::query_as::<_, TaxonRecord>(&sql)
            .bind(slug)
            .fetch_optional(self.pool())
            .await
            .map_err(query_error("Loading taxon"))?;
        Ok(record.map(Taxon::from))
    }

    pub async fn create_taxon(&self, taxonomy: Taxonomy, name: &str, slug: &str) -> YamdbResult<Taxon> {
        let sql = format!("INSERT INTO {} (name, slug) VALUES (?, ?)", table(taxonomy));
        let result = sqlx::query(&sql)
            .bind(name)
            .bind(slug)
            .execute(self.pool())
            .await
            .map_err(taxon_write_error(taxonomy))?;

        info!("🏷️  Created {} {}", taxonomy.label(), slug);
        Ok(Taxon {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            slug: slug.to_string(),
        })
    }

    /// Deleting a category nulls `titles.category_id`; deleting a genre drops its links
    pub async fn delete_taxon(&self, taxonomy: Taxonomy, slug: &str) -> YamdbResult<bool> {
        let sql = format!("DELETE FROM {} WHERE slug = ?", table(taxonomy));
        let result = sqlx::query(&sql)
            .bind(slug)
            .execute(self.pool())
            .await
            .map_err(query_error("Deleting taxon"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn genres_for(&self, title_ids: &[TitleId]) -> YamdbResult<HashMap<TitleId, Vec<Taxon>>> {
        let mut by_title: HashMap<TitleId, Vec<Taxon>> = HashMap::new();
        if title_ids.is_empty() {
            return Ok(by_title);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT gt.title_id, g.id, g.name, g.slug FROM genre_title gt \
             JOIN genres g ON g.id = gt.genre_id WHERE gt.title_id IN (",
        );
        let mut ids = qb.separated(", ");
        for id in title_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY g.name");

        let links = qb
            .build_query_as::<GenreLinkRecord>()
            .fetch_all(self.pool())
            .await
            .map_err(query_error("Loading title genres"))?;

        for link in links {
            by_title.entry(link.title_id).or_default().push(Taxon {
                id: link.id,
                name: link.name,
                slug: link.slug,
            });
        }
        Ok(by_title)
    }

    async fn assemble_titles(&self, records: Vec<TitleRecord>) -> YamdbResult<Vec<Title>> {
        let ids: Vec<TitleId> = records.iter().map(|r| r.id).collect();
        let mut genres = self.genres_for(&ids).await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let category = match (record.category_id, record.category_name, record.category_slug) {
                    (Some(id), Some(name), Some(slug)) => Some(Taxon { id, name, slug }),
                    _ => None,
                };
                Title {
                    id: record.id,
                    genres: genres.remove(&record.id).unwrap_or_default(),
                    name: record.name,
                    year: record.year,
                    description: record.description,
                    category,
                    rating: record.rating.map(|r| r as i32),
                }
            })
            .collect())
    }

    /// Titles matching a single filter dimension, ordered by id
    pub async fn list_titles(&self, filter: &TitleFilter) -> YamdbResult<Vec<Title>> {
        let mut qb = QueryBuilder::<Sqlite>::new(TITLE_SELECT);
        match filter {
            TitleFilter::All => {}
            TitleFilter::Category(slug) => {
                qb.push(" WHERE c.slug = ");
                qb.push_bind(slug.as_str());
            }
            TitleFilter::Genre(slug) => {
                qb.push(
                    " WHERE t.id IN (SELECT gt.title_id FROM genre_title gt \
                     JOIN genres g ON g.id = gt.genre_id WHERE g.slug = ",
                );
                qb.push_bind(slug.as_str());
                qb.push(")");
            }
            TitleFilter::Year(year) => {
                qb.push(" WHERE t.year = ");
                qb.push_bind(*year);
            }
            TitleFilter::Name(name) => {
                qb.push(" WHERE t.name = ");
                qb.push_bind(name.as_str());
            }
        }
        qb.push(" GROUP BY t.id ORDER BY t.id");

        debug!("Listing titles with filter {:?}", filter);
        let records = qb
            .build_query_as::<TitleRecord>()
            .fetch_all(self.pool())
            .await
            .map_err(query_error("Listing titles"))?;
        self.assemble_titles(records).await
    }

    pub async fn title_by_id(&self, id: TitleId) -> YamdbResult<Option<Title>> {
        let sql = format!("{} WHERE t.id = ? GROUP BY t.id", TITLE_SELECT);
        let record = sqlx::query_as::<_, TitleRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(query_error("Loading title"))?;

        match record {
            Some(record) => Ok(self.assemble_titles(vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    pub async fn title_exists(&self, id: TitleId) -> YamdbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM titles WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(query_error("Checking title"))?;
        Ok(found.is_some())
    }

    /// Insert a title and its genre links in one transaction
    pub async fn create_title(&self, draft: &TitleDraft) -> YamdbResult<Title> {
        let mut tx = self.pool().begin().await.map_err(query_error("Opening transaction"))?;

        let category_id = resolve_category(&mut tx, draft.category.as_deref()).await?;
        let genre_ids = resolve_genres(&mut tx, &draft.genres).await?;

        let result = sqlx::query(
            "INSERT INTO titles (name, year, description, category_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&draft.name)
        .bind(draft.year)
        .bind(&draft.description)
        .bind(category_id)
        .execute(&mut *tx)
        .await
        .map_err(query_error("Inserting title"))?;
        let id = result.last_insert_rowid();

        link_genres(&mut tx, id, &genre_ids).await?;
        tx.commit().await.map_err(query_error("Committing title"))?;

        info!("🎬 Created title {} (id {})", draft.name, id);
        self.title_by_id(id)
            .await?
            .ok_or_else(|| YamdbError::internal("Title vanished after insert"))
    }

    /// Replace every column and the genre set of an existing title
    pub async fn update_title(&self, id: TitleId, draft: &TitleDraft) -> YamdbResult<Title> {
        let mut tx = self.pool().begin().await.map_err(query_error("Opening transaction"))?;

        let category_id = resolve_category(&mut tx, draft.category.as_deref()).await?;
        let genre_ids = resolve_genres(&mut tx, &draft.genres).await?;

        let result = sqlx::query(
            "UPDATE titles SET name = ?, year = ?, description = ?, category_id = ? WHERE id = ?",
        )
        .bind(&draft.name)
        .bind(draft.year)
        .bind(&draft.description)
        .bind(category_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(query_error("Updating title"))?;
        if result.rows_affected() == 0 {
            return Err(not_found_error!(format!("title {}", id)));
        }

        link_genres(&mut tx, id, &genre_ids).await?;
        tx.commit().await.map_err(query_error("Committing title"))?;

        debug!("Updated title {}", id);
        self.title_by_id(id)
            .await?
            .ok_or_else(|| not_found_error!(format!("title {}", id)))
    }

    /// Reviews, their comments and genre links cascade
    pub async fn delete_title(&self, id: TitleId) -> YamdbResult<bool> {
        let result = sqlx::query("DELETE FROM titles WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(query_error("Deleting title"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.create_taxon(Taxonomy::Category, "Films", "films").await.unwrap();
        db.create_taxon(Taxonomy::Category, "Books", "books").await.unwrap();
        db.create_taxon(Taxonomy::Genre, "Drama", "drama").await.unwrap();
        db.create_taxon(Taxonomy::Genre, "Comedy", "comedy").await.unwrap();
        db
    }

    fn draft(name: &str, year: i32, category: Option<&str>, genres: &[&str]) -> TitleDraft {
        TitleDraft {
            name: name.to_string(),
            year,
            description: String::new(),
            category: category.map(str::to_string),
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_conflict() {
        let db = seeded().await;
        let err = db
            .create_taxon(Taxonomy::Genre, "Another drama", "drama")
            .await
            .unwrap_err();
        assert!(matches!(err, YamdbError::Conflict { .. }));
        assert_eq!(err.field(), Some("slug"));

        let err = db
            .create_taxon(Taxonomy::Genre, "Drama", "drama-2")
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("name"));
    }

    #[tokio::test]
    async fn test_search_taxa_by_name() {
        let db = seeded().await;
        let found = db.list_taxa(Taxonomy::Genre, Some("dram")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].slug, "drama");
        assert_eq!(db.list_taxa(Taxonomy::Category, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_title_resolves_slugs() {
        let db = seeded().await;
        let title = db
            .create_title(&draft("Heat", 1995, Some("films"), &["drama", "comedy", "drama"]))
            .await
            .unwrap();

        assert_eq!(title.category.as_ref().map(|c| c.slug.as_str()), Some("films"));
        let slugs: Vec<&str> = title.genres.iter().map(|g| g.slug.as_str()).collect();
        assert_eq!(slugs, vec!["comedy", "drama"]);
        assert_eq!(title.rating, None);
    }

    #[tokio::test]
    async fn test_unknown_slug_rejects_whole_write() {
        let db = seeded().await;
        let err = db
            .create_title(&draft("Heat", 1995, Some("films"), &["noir"]))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("genre"));
        assert!(db.list_titles(&TitleFilter::All).await.unwrap().is_empty());

        let err = db
            .create_title(&draft("Heat", 1995, Some("games"), &[]))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("category"));
    }

    #[tokio::test]
    async fn test_each_filter_dimension() {
        let db = seeded().await;
        db.create_title(&draft("Heat", 1995, Some("films"), &["drama"])).await.unwrap();
        db.create_title(&draft("Emma", 1815, Some("books"), &["comedy"])).await.unwrap();
        db.create_title(&draft("Clue", 1985, None, &["comedy"])).await.unwrap();

        let names = |titles: Vec<Title>| titles.into_iter().map(|t| t.name).collect::<Vec<_>>();

        assert_eq!(names(db.list_titles(&TitleFilter::All).await.unwrap()).len(), 3);
        assert_eq!(
            names(db.list_titles(&TitleFilter::Category("books".into())).await.unwrap()),
            vec!["Emma"]
        );
        assert_eq!(
            names(db.list_titles(&TitleFilter::Genre("comedy".into())).await.unwrap()),
            vec!["Emma", "Clue"]
        );
        assert_eq!(
            names(db.list_titles(&TitleFilter::Year(1985)).await.unwrap()),
            vec!["Clue"]
        );
        assert_eq!(
            names(db.list_titles(&TitleFilter::Name("Heat".into())).await.unwrap()),
            vec!["Heat"]
        );
    }

    #[tokio::test]
    async fn test_deleting_category_nulls_reference() {
        let db = seeded().await;
        let title = db.create_title(&draft("Heat", 1995, Some("films"), &[])).await.unwrap();

        assert!(db.delete_taxon(Taxonomy::Category, "films").await.unwrap());
        let reloaded = db.title_by_id(title.id).await.unwrap().unwrap();
        assert_eq!(reloaded.category, None);
    }

    #[tokio::test]
    async fn test_deleting_genre_drops_links_only() {
        let db = seeded().await;
        let title = db
            .create_title(&draft("Heat", 1995, None, &["drama", "comedy"]))
            .await
            .unwrap();

        assert!(db.delete_taxon(Taxonomy::Genre, "drama").await.unwrap());
        let reloaded = db.title_by_id(title.id).await.unwrap().unwrap();
        assert_eq!(reloaded.genres.len(), 1);
        assert_eq!(reloaded.genres[0].slug, "comedy");
    }

    #[tokio::test]
    async fn test_update_replaces_genres() {
        let db = seeded().await;
        let title = db.create_title(&draft("Heat", 1995, None, &["drama"])).await.unwrap();

        let updated = db
            .update_title(title.id, &draft("Heat (1995)", 1995, Some("films"), &["comedy"]))
            .await
            .unwrap();
        assert_eq!(updated.name, "Heat (1995)");
        assert_eq!(updated.genres.len(), 1);
        assert_eq!(updated.genres[0].slug, "comedy");

        let err = db.update_title(999, &draft("x", 2000, None, &[])).await.unwrap_err();
        assert!(matches!(err, YamdbError::NotFound { .. }));
    }
}
