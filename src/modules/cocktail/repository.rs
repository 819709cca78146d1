use crate::utils::listing;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgExecutor};
use ulid::Ulid;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CocktailIngredient {
    #[serde(rename = "ingredientId")]
    pub ingredient_id: String,
    pub amount: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Cocktail {
    pub id: String,
    pub name: String,
    pub category: String,
    pub instruction: String,
    pub ingredients: Json<Vec<CocktailIngredient>>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

pub struct CreateCocktailPayload {
    pub name: String,
    pub category: String,
    pub instruction: String,
    pub ingredients: Vec<CocktailIngredient>,
}

pub struct UpdateCocktailPayload {
    pub name: Option<String>,
    pub category: Option<String>,
    pub instruction: Option<String>,
    pub ingredients: Option<Vec<CocktailIngredient>>,
}

pub enum Error {
    UnexpectedError,
}

#[derive(Deserialize, Clone)]
pub struct Filters {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub instruction: String,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

// Sort keys are interpolated into the query and must come from this table,
// never from raw input. Unknown keys fall back to the default.
fn sort_column(key: Option<&str>) -> &'static str {
    match key {
        Some("category") => "category",
        Some("instruction") => "instruction",
        Some("created_at") => "created_at",
        _ => "name",
    }
}

pub async fn create<'e, E: PgExecutor<'e>>(
    e: E,
    payload: CreateCocktailPayload,
) -> Result<Cocktail, Error> {
    sqlx::query_as::<_, Cocktail>(
        "
        INSERT INTO cocktails
        (id, name, category, instruction, ingredients)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.name)
    .bind(payload.category)
    .bind(payload.instruction)
    .bind(Json(payload.ingredients))
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to create a cocktail: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<Option<Cocktail>, Error> {
    sqlx::query_as::<_, Cocktail>("SELECT * FROM cocktails WHERE id = $1")
        .bind(id.clone())
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while fetching cocktail with id {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
}

pub async fn find_many<'e, E: PgExecutor<'e>>(
    e: E,
    filters: Filters,
) -> Result<Vec<Cocktail>, Error> {
    let query = format!(
        "
        SELECT * FROM cocktails
        WHERE
            name ILIKE $1
            AND category ILIKE $2
            AND instruction ILIKE $3
        ORDER BY {} {}
        ",
        sort_column(filters.sort_by.as_deref()),
        listing::sort_direction(filters.sort_order.as_deref()),
    );

    sqlx::query_as::<_, Cocktail>(query.as_str())
        .bind(listing::like_pattern(&filters.name))
        .bind(listing::like_pattern(&filters.category))
        .bind(listing::like_pattern(&filters.instruction))
        .fetch_all(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to fetch many cocktails: {}",
                err
            );
            Error::UnexpectedError
        })
}

pub async fn update_by_id<'e, E: PgExecutor<'e>>(
    e: E,
    id: String,
    payload: UpdateCocktailPayload,
) -> Result<Option<Cocktail>, Error> {
    sqlx::query_as::<_, Cocktail>(
        "
        UPDATE cocktails SET
            name = COALESCE($1, name),
            category = COALESCE($2, category),
            instruction = COALESCE($3, instruction),
            ingredients = COALESCE($4, ingredients),
            updated_at = NOW()
        WHERE
            id = $5
        RETURNING *
        ",
    )
    .bind(payload.name)
    .bind(payload.category)
    .bind(payload.instruction)
    .bind(payload.ingredients.map(Json))
    .bind(id.clone())
    .fetch_optional(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to update a cocktail by id {}: {}",
            id,
            err
        );
        Error::UnexpectedError
    })
}

pub async fn delete_by_id<'e, E: PgExecutor<'e>>(
    e: E,
    id: String,
) -> Result<Option<Cocktail>, Error> {
    sqlx::query_as::<_, Cocktail>("DELETE FROM cocktails WHERE id = $1 RETURNING *")
        .bind(id.clone())
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to delete a cocktail by id {}: {}",
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
        assert_eq!(sort_column(Some("ingredients")), "name");
        assert_eq!(sort_column(Some("id; DROP TABLE cocktails")), "name");
    }

    #[test]
    fn sort_column_accepts_known_keys() {
        assert_eq!(sort_column(Some("category")), "category");
        assert_eq!(sort_column(Some("instruction")), "instruction");
    }

    #[test]
    fn cocktail_ingredient_uses_wire_names() {
        let entry: CocktailIngredient = serde_json::from_value(json!({
            "ingredientId": "01ARZ3NDEKTSV4RRFFQ69G5FAV",
            "amount": "2 cl"
        }))
        .unwrap();

        assert_eq!(entry.ingredient_id, "01ARZ3NDEKTSV4RRFFQ69G5FAV");
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({ "ingredientId": "01ARZ3NDEKTSV4RRFFQ69G5FAV", "amount": "2 cl" })
        );
    }
}
