use std::sync::Arc;

use super::repository;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use ulid::Ulid;
use validator::Validate;

use crate::{modules::ingredient, types::Context, utils};

#[derive(Deserialize, Validate, Clone)]
pub struct IngredientEntryPayload {
    #[serde(rename = "ingredientId")]
    #[validate(length(min = 1))]
    pub ingredient_id: String,
    #[validate(length(min = 1, max = 100))]
    pub amount: String,
}

impl From<IngredientEntryPayload> for repository::CocktailIngredient {
    fn from(entry: IngredientEntryPayload) -> Self {
        Self {
            ingredient_id: entry.ingredient_id,
            amount: entry.amount,
        }
    }
}

fn duplicated_later(entries: &[IngredientEntryPayload], index: usize) -> bool {
    entries[index + 1..]
        .iter()
        .any(|later| later.ingredient_id == entries[index].ingredient_id)
}

// Entries are checked in order: identifier shape first, then duplicates
// among the remaining entries, then a store lookup. Nothing is persisted
// until every entry has passed.
async fn validate_entries(
    pool: &PgPool,
    entries: &[IngredientEntryPayload],
) -> Result<(), (StatusCode, Json<serde_json::Value>)> {
    for (index, entry) in entries.iter().enumerate() {
        if Ulid::from_string(entry.ingredient_id.as_str()).is_err() {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Invalid ingredientId: {}", entry.ingredient_id) })),
            ));
        }

        if duplicated_later(entries, index) {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(
                    json!({ "error": format!("Duplicate ingredientId: {}", entry.ingredient_id) }),
                ),
            ));
        }

        match ingredient::repository::find_by_id(pool, entry.ingredient_id.clone()).await {
            Ok(Some(_)) => (),
            Ok(None) => {
                return Err((
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": format!("Ingredient not found: {}", entry.ingredient_id)
                    })),
                ))
            }
            Err(_) => {
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to fetch ingredient" })),
                ))
            }
        }
    }

    Ok(())
}

#[derive(Deserialize, Validate)]
pub struct CreateCocktailPayload {
    #[validate(length(min = 1, max = 25))]
    pub name: String,
    #[validate(length(min = 1, max = 25))]
    pub category: String,
    #[validate(length(min = 1, max = 500))]
    pub instruction: String,
    #[validate(nested)]
    pub ingredients: Vec<IngredientEntryPayload>,
}

async fn create_cocktail(
    State(ctx): State<Arc<Context>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let payload = match serde_json::from_value::<CreateCocktailPayload>(body) {
        Ok(payload) => payload,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": err.to_string() })),
            )
        }
    };

    if let Err(errors) = payload.validate() {
        return utils::validation::into_response(errors);
    }

    if let Err(response) = validate_entries(&ctx.db_conn.pool, &payload.ingredients).await {
        return response;
    }

    match repository::create(
        &ctx.db_conn.pool,
        repository::CreateCocktailPayload {
            name: payload.name,
            category: payload.category,
            instruction: payload.instruction,
            ingredients: payload.ingredients.into_iter().map(Into::into).collect(),
        },
    )
    .await
    {
        Ok(cocktail) => (StatusCode::CREATED, Json(json!(cocktail))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Cocktail creation failed" })),
        ),
    }
}

async fn get_cocktails(
    State(ctx): State<Arc<Context>>,
    Query(filters): Query<repository::Filters>,
) -> impl IntoResponse {
    match repository::find_many(&ctx.db_conn.pool, filters).await {
        Ok(cocktails) => (StatusCode::OK, Json(json!(cocktails))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch cocktails" })),
        ),
    }
}

async fn get_by_id(Path(id): Path<String>, State(ctx): State<Arc<Context>>) -> impl IntoResponse {
    match repository::find_by_id(&ctx.db_conn.pool, id).await {
        Ok(Some(cocktail)) => (StatusCode::OK, Json(json!(cocktail))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Cocktail not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch cocktail" })),
        ),
    }
}

#[derive(Deserialize, Validate)]
pub struct UpdateCocktailPayload {
    #[validate(length(min = 1, max = 25))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 25))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub instruction: Option<String>,
    #[validate(nested)]
    pub ingredients: Option<Vec<IngredientEntryPayload>>,
}

impl UpdateCocktailPayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.instruction.is_none()
            && self.ingredients.is_none()
    }
}

async fn update_by_id(
    Path(id): Path<String>,
    State(ctx): State<Arc<Context>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let payload = match serde_json::from_value::<UpdateCocktailPayload>(body) {
        Ok(payload) => payload,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": err.to_string() })),
            )
        }
    };

    if payload.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No fields to update" })),
        );
    }

    if let Err(errors) = payload.validate() {
        return utils::validation::into_response(errors);
    }

    match repository::find_by_id(&ctx.db_conn.pool, id.clone()).await {
        Ok(Some(_)) => (),
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Cocktail not found" })),
            )
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch cocktail" })),
            )
        }
    }

    // A replacement ingredient list goes through the same checks as create.
    if let Some(entries) = payload.ingredients.as_deref() {
        if let Err(response) = validate_entries(&ctx.db_conn.pool, entries).await {
            return response;
        }
    }

    match repository::update_by_id(
        &ctx.db_conn.pool,
        id,
        repository::UpdateCocktailPayload {
            name: payload.name,
            category: payload.category,
            instruction: payload.instruction,
            ingredients: payload
                .ingredients
                .map(|entries| entries.into_iter().map(Into::into).collect()),
        },
    )
    .await
    {
        Ok(Some(cocktail)) => (StatusCode::OK, Json(json!(cocktail))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Cocktail not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update cocktail" })),
        ),
    }
}

async fn delete_by_id(Path(id): Path<String>, State(ctx): State<Arc<Context>>) -> impl IntoResponse {
    match repository::delete_by_id(&ctx.db_conn.pool, id).await {
        Ok(Some(cocktail)) => (StatusCode::OK, Json(json!(cocktail))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Cocktail not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to delete cocktail" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_cocktails).post(create_cocktail))
        .route(
            "/:id",
            get(get_by_id).post(update_by_id).delete(delete_by_id),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ingredient_id: &str, amount: &str) -> IngredientEntryPayload {
        IngredientEntryPayload {
            ingredient_id: ingredient_id.to_string(),
            amount: amount.to_string(),
        }
    }

    #[test]
    fn duplicate_detection_ignores_amounts() {
        let entries = vec![
            entry("01ARZ3NDEKTSV4RRFFQ69G5FAV", "2 cl"),
            entry("01BX5ZZKBKACTAV9WEVGEMMVRZ", "1 dash"),
            entry("01ARZ3NDEKTSV4RRFFQ69G5FAV", "4 cl"),
        ];

        assert!(duplicated_later(&entries, 0));
        assert!(!duplicated_later(&entries, 1));
        assert!(!duplicated_later(&entries, 2));
    }

    #[test]
    fn distinct_entries_have_no_duplicates() {
        let entries = vec![
            entry("01ARZ3NDEKTSV4RRFFQ69G5FAV", "2 cl"),
            entry("01BX5ZZKBKACTAV9WEVGEMMVRZ", "1 dash"),
        ];

        assert!(!duplicated_later(&entries, 0));
        assert!(!duplicated_later(&entries, 1));
    }

    #[test]
    fn malformed_identifiers_are_rejected_by_shape() {
        assert!(Ulid::from_string("not-a-valid-id").is_err());
        assert!(Ulid::from_string("01ARZ3NDEKTSV4RRFFQ69G5FAV").is_ok());
    }

    #[test]
    fn create_requires_ingredients_field() {
        let result = serde_json::from_value::<CreateCocktailPayload>(json!({
            "name": "Mojito",
            "category": "Classic",
            "instruction": "Muddle and shake"
        }));

        assert!(result.is_err());
    }

    #[test]
    fn create_rejects_non_array_ingredients() {
        let result = serde_json::from_value::<CreateCocktailPayload>(json!({
            "name": "Mojito",
            "category": "Classic",
            "instruction": "Muddle and shake",
            "ingredients": "rum"
        }));

        assert!(result.is_err());
    }

    #[test]
    fn create_accepts_empty_ingredient_list() {
        let payload = serde_json::from_value::<CreateCocktailPayload>(json!({
            "name": "Mojito",
            "category": "Classic",
            "instruction": "Muddle and shake",
            "ingredients": []
        }))
        .unwrap();

        assert!(payload.ingredients.is_empty());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn entries_require_both_fields() {
        let result = serde_json::from_value::<IngredientEntryPayload>(json!({
            "ingredientId": "01ARZ3NDEKTSV4RRFFQ69G5FAV"
        }));

        assert!(result.is_err());
    }

    #[test]
    fn over_length_amount_fails_validation() {
        let payload = serde_json::from_value::<IngredientEntryPayload>(json!({
            "ingredientId": "01ARZ3NDEKTSV4RRFFQ69G5FAV",
            "amount": "x".repeat(101)
        }))
        .unwrap();

        assert!(payload.validate().is_err());
    }

    #[test]
    fn update_requires_at_least_one_field() {
        let payload = serde_json::from_value::<UpdateCocktailPayload>(json!({})).unwrap();

        assert!(payload.is_empty());
    }

    #[test]
    fn update_with_only_ingredients_is_not_empty() {
        let payload = serde_json::from_value::<UpdateCocktailPayload>(json!({
            "ingredients": [
                { "ingredientId": "01ARZ3NDEKTSV4RRFFQ69G5FAV", "amount": "2 cl" }
            ]
        }))
        .unwrap();

        assert!(!payload.is_empty());
        assert!(payload.validate().is_ok());
    }
}
