use crate::utils::listing;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use ulid::Ulid;

#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "hasAlcohol")]
    pub has_alcohol: bool,
    pub image: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

pub struct CreateIngredientPayload {
    pub name: String,
    pub description: String,
    pub has_alcohol: bool,
    pub image: String,
}

pub struct UpdateIngredientPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub has_alcohol: Option<bool>,
    pub image: Option<String>,
}

pub enum Error {
    UnexpectedError,
}

#[derive(Deserialize, Clone)]
pub struct Filters {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(rename = "hasAlcohol")]
    pub has_alcohol: Option<bool>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

// Sort keys are interpolated into the query and must come from this table,
// never from raw input. Unknown keys fall back to the default.
fn sort_column(key: Option<&str>) -> &'static str {
    match key {
        Some("description") => "description",
        Some("image") => "image",
        Some("hasAlcohol") => "has_alcohol",
        Some("created_at") => "created_at",
        _ => "name",
    }
}

pub async fn create<'e, E: PgExecutor<'e>>(
    e: E,
    payload: CreateIngredientPayload,
) -> Result<Ingredient, Error> {
    sqlx::query_as::<_, Ingredient>(
        "
        INSERT INTO ingredients
        (id, name, description, has_alcohol, image)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.has_alcohol)
    .bind(payload.image)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to create an ingredient: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<Option<Ingredient>, Error> {
    sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients WHERE id = $1")
        .bind(id.clone())
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while fetching ingredient with id {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
}

pub async fn find_many<'e, E: PgExecutor<'e>>(
    e: E,
    filters: Filters,
) -> Result<Vec<Ingredient>, Error> {
    let query = format!(
        "
        SELECT * FROM ingredients
        WHERE
            name ILIKE $1
            AND description ILIKE $2
            AND image ILIKE $3
            AND ($4::boolean IS NULL OR has_alcohol = $4)
        ORDER BY {} {}
        ",
        sort_column(filters.sort_by.as_deref()),
        listing::sort_direction(filters.sort_order.as_deref()),
    );

    sqlx::query_as::<_, Ingredient>(query.as_str())
        .bind(listing::like_pattern(&filters.name))
        .bind(listing::like_pattern(&filters.description))
        .bind(listing::like_pattern(&filters.image))
        .bind(filters.has_alcohol)
        .fetch_all(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to fetch many ingredients: {}",
                err
            );
            Error::UnexpectedError
        })
}

pub async fn update_by_id<'e, E: PgExecutor<'e>>(
    e: E,
    id: String,
    payload: UpdateIngredientPayload,
) -> Result<Option<Ingredient>, Error> {
    sqlx::query_as::<_, Ingredient>(
        "
        UPDATE ingredients SET
            name = COALESCE($1, name),
            description = COALESCE($2, description),
            has_alcohol = COALESCE($3, has_alcohol),
            image = COALESCE($4, image),
            updated_at = NOW()
        WHERE
            id = $5
        RETURNING *
        ",
    )
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.has_alcohol)
    .bind(payload.image)
    .bind(id.clone())
    .fetch_optional(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to update an ingredient by id {}: {}",
            id,
            err
        );
        Error::UnexpectedError
    })
}

pub async fn delete_by_id<'e, E: PgExecutor<'e>>(
    e: E,
    id: String,
) -> Result<Option<Ingredient>, Error> {
    sqlx::query_as::<_, Ingredient>("DELETE FROM ingredients WHERE id = $1 RETURNING *")
        .bind(id.clone())
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to delete an ingredient by id {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sort_column_falls_back_to_name() {
        assert_eq!(sort_column(None), "name");
        assert_eq!(sort_column(Some("name")), "name");
        assert_eq!(sort_column(Some("id; DROP TABLE ingredients")), "name");
    }

    #[test]
    fn sort_column_accepts_known_keys() {
        assert_eq!(sort_column(Some("description")), "description");
        assert_eq!(sort_column(Some("image")), "image");
        assert_eq!(sort_column(Some("hasAlcohol")), "has_alcohol");
    }

    #[test]
    fn filters_default_to_match_everything() {
        let filters: Filters = serde_json::from_value(json!({})).unwrap();
        assert_eq!(filters.name, "");
        assert_eq!(filters.description, "");
        assert_eq!(filters.image, "");
        assert!(filters.has_alcohol.is_none());
        assert!(filters.sort_by.is_none());
        assert!(filters.sort_order.is_none());
    }

    #[test]
    fn filters_accept_non_alcoholic() {
        let filters: Filters = serde_json::from_value(json!({ "hasAlcohol": false })).unwrap();
        assert_eq!(filters.has_alcohol, Some(false));
    }
}
