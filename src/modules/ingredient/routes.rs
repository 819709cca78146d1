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
use validator::Validate;

use crate::{types::Context, utils};

#[derive(Deserialize, Validate)]
pub struct CreateIngredientPayload {
    #[validate(length(min = 1, max = 25))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub description: String,
    #[serde(rename = "hasAlcohol")]
    pub has_alcohol: bool,
    #[validate(length(min = 1))]
    pub image: String,
}

async fn create_ingredient(
    State(ctx): State<Arc<Context>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let payload = match serde_json::from_value::<CreateIngredientPayload>(body) {
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

    match repository::create(
        &ctx.db_conn.pool,
        repository::CreateIngredientPayload {
            name: payload.name,
            description: payload.description,
            has_alcohol: payload.has_alcohol,
            image: payload.image,
        },
    )
    .await
    {
        Ok(ingredient) => (StatusCode::CREATED, Json(json!(ingredient))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Ingredient creation failed" })),
        ),
    }
}

async fn get_ingredients(
    State(ctx): State<Arc<Context>>,
    Query(filters): Query<repository::Filters>,
) -> impl IntoResponse {
    match repository::find_many(&ctx.db_conn.pool, filters).await {
        Ok(ingredients) => (StatusCode::OK, Json(json!(ingredients))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch ingredients" })),
        ),
    }
}

async fn get_by_id(Path(id): Path<String>, State(ctx): State<Arc<Context>>) -> impl IntoResponse {
    match repository::find_by_id(&ctx.db_conn.pool, id).await {
        Ok(Some(ingredient)) => (StatusCode::OK, Json(json!(ingredient))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Ingredient not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch ingredient" })),
        ),
    }
}

#[derive(Deserialize, Validate)]
pub struct UpdateIngredientPayload {
    #[validate(length(min = 1, max = 25))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub description: Option<String>,
    #[serde(rename = "hasAlcohol")]
    pub has_alcohol: Option<bool>,
    #[validate(length(min = 1))]
    pub image: Option<String>,
}

impl UpdateIngredientPayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.has_alcohol.is_none()
            && self.image.is_none()
    }
}

async fn update_by_id(
    Path(id): Path<String>,
    State(ctx): State<Arc<Context>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let payload = match serde_json::from_value::<UpdateIngredientPayload>(body) {
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

    match repository::update_by_id(
        &ctx.db_conn.pool,
        id,
        repository::UpdateIngredientPayload {
            name: payload.name,
            description: payload.description,
            has_alcohol: payload.has_alcohol,
            image: payload.image,
        },
    )
    .await
    {
        Ok(Some(ingredient)) => (StatusCode::OK, Json(json!(ingredient))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Ingredient not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update ingredient" })),
        ),
    }
}

async fn delete_by_id(Path(id): Path<String>, State(ctx): State<Arc<Context>>) -> impl IntoResponse {
    match repository::delete_by_id(&ctx.db_conn.pool, id).await {
        Ok(Some(ingredient)) => (StatusCode::OK, Json(json!(ingredient))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Ingredient not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to delete ingredient" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_ingredients).post(create_ingredient))
        .route(
            "/:id",
            get(get_by_id).post(update_by_id).delete(delete_by_id),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_accepts_non_alcoholic() {
        let payload = serde_json::from_value::<CreateIngredientPayload>(json!({
            "name": "Lime",
            "description": "Citrus",
            "hasAlcohol": false,
            "image": "url"
        }))
        .unwrap();

        assert!(!payload.has_alcohol);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn create_rejects_missing_fields() {
        let result = serde_json::from_value::<CreateIngredientPayload>(json!({
            "name": "Lime",
            "description": "Citrus",
            "image": "url"
        }));

        assert!(result.is_err());
    }

    #[test]
    fn create_rejects_over_length_name() {
        let payload = serde_json::from_value::<CreateIngredientPayload>(json!({
            "name": "a".repeat(26),
            "description": "Citrus",
            "hasAlcohol": true,
            "image": "url"
        }))
        .unwrap();

        assert!(payload.validate().is_err());
    }

    #[test]
    fn update_requires_at_least_one_field() {
        let payload = serde_json::from_value::<UpdateIngredientPayload>(json!({})).unwrap();

        assert!(payload.is_empty());
    }

    #[test]
    fn update_with_only_has_alcohol_is_not_empty() {
        let payload =
            serde_json::from_value::<UpdateIngredientPayload>(json!({ "hasAlcohol": false }))
                .unwrap();

        assert!(!payload.is_empty());
        assert!(payload.validate().is_ok());
    }
}
