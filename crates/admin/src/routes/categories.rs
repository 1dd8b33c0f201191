//! Category route handlers.

use std::collections::HashMap;

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::instrument;

use shopdesk_core::CategoryId;

use super::views::{
    BulkForm, FormTemplate, IndexTemplate, Shell, ShowTemplate, found, see_other, unprocessable,
};
use crate::components::{
    FormInput, FormMode, ListParams, TableView, ValidationErrors, data_table::parse_ids,
};
use crate::db::CategoryRepository;
use crate::error::AppError;
use crate::models::CategorySort;
use crate::resources::categories;
use crate::services::{self, SubmitError};
use crate::state::AppState;

const PATH: &str = "/categories";

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let params = ListParams::new(query);
    let paged = CategoryRepository::new(state.pool())
        .list(
            &categories::filter(&params),
            params.sort(),
            params.page(state.config().page_size),
        )
        .await?;
    let rows = paged.items.iter().map(categories::row).collect();

    Ok(IndexTemplate {
        shell: Shell::load(&state, PATH).await?,
        table: TableView::build::<_, CategorySort>(
            categories::table_config(),
            &params,
            &paged,
            rows,
        ),
    })
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<impl IntoResponse, AppError> {
    let category = found(CategoryRepository::new(state.pool()).get(id).await?, "category")?;
    Ok(ShowTemplate {
        shell: Shell::load(&state, PATH).await?,
        title: category.name.clone(),
        base_path: PATH.to_string(),
        id: id.as_i64(),
        rows: categories::detail(&category),
        items: Vec::new(),
        related: None,
    })
}

#[instrument(skip(state))]
pub async fn new(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let schema = categories::form_schema();
    Ok(FormTemplate::new(
        Shell::load(&state, PATH).await?,
        "Create category",
        PATH,
        PATH,
        &schema,
        &schema.defaults(),
        &ValidationErrors::new(),
    ))
}

#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let raw = FormInput::from_pairs(form);
    match services::categories::create(state.pool(), &raw).await {
        Ok(category) => Ok(see_other(&format!("{PATH}/{}", category.id))),
        Err(SubmitError::Invalid(errors)) => {
            let schema = categories::form_schema();
            let input = schema.prepare(&raw, FormMode::Create);
            let shell = Shell::load(&state, PATH).await?;
            Ok(unprocessable(FormTemplate::new(
                shell,
                "Create category",
                PATH,
                PATH,
                &schema,
                &input,
                &errors,
            )))
        }
        Err(err) => Err(err.into()),
    }
}

#[instrument(skip(state))]
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<impl IntoResponse, AppError> {
    let category = found(CategoryRepository::new(state.pool()).get(id).await?, "category")?;
    Ok(FormTemplate::new(
        Shell::load(&state, PATH).await?,
        format!("Edit {}", category.name),
        format!("{PATH}/{id}"),
        format!("{PATH}/{id}"),
        &categories::form_schema(),
        &categories::form_values(&category),
        &ValidationErrors::new(),
    ))
}

#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let raw = FormInput::from_pairs(form);
    match services::categories::update(state.pool(), id, &raw).await {
        Ok(category) => Ok(see_other(&format!("{PATH}/{}", category.id))),
        Err(SubmitError::Invalid(errors)) => {
            let schema = categories::form_schema();
            let input = schema.prepare(&raw, FormMode::Edit);
            let shell = Shell::load(&state, PATH).await?;
            Ok(unprocessable(FormTemplate::new(
                shell,
                "Edit category",
                format!("{PATH}/{id}"),
                format!("{PATH}/{id}"),
                &schema,
                &input,
                &errors,
            )))
        }
        Err(err) => Err(err.into()),
    }
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Response, AppError> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    tracing::info!(%id, "category deleted");
    Ok(see_other(PATH))
}

#[instrument(skip(state))]
pub async fn restore(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Response, AppError> {
    CategoryRepository::new(state.pool()).restore(id).await?;
    tracing::info!(%id, "category restored");
    Ok(see_other(&format!("{PATH}/{id}")))
}

#[instrument(skip(state))]
pub async fn bulk_delete(
    State(state): State<AppState>,
    Form(form): Form<BulkForm>,
) -> Result<Response, AppError> {
    let ids: Vec<CategoryId> = parse_ids(&form.ids);
    if ids.is_empty() {
        return Err(AppError::BadRequest("no categories selected".to_string()));
    }
    let deleted = CategoryRepository::new(state.pool()).delete_many(&ids).await?;
    tracing::info!(deleted, "categories bulk deleted");
    Ok(see_other(PATH))
}

/// Create the category routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/new", get(new))
        .route("/bulk-delete", post(bulk_delete))
        .route("/{id}", get(show).post(update))
        .route("/{id}/edit", get(edit))
        .route("/{id}/delete", post(delete))
        .route("/{id}/restore", post(restore))
}
