//! Product route handlers.

use std::collections::HashMap;

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::instrument;

use shopdesk_core::ProductId;

use super::views::{
    BulkForm, FormTemplate, IndexTemplate, Shell, ShowTemplate, found, see_other, unprocessable,
};
use crate::components::{
    FormInput, FormMode, ListParams, TableView, ValidationErrors, data_table::parse_ids,
};
use crate::db::{BrandRepository, ProductRepository};
use crate::error::AppError;
use crate::models::ProductSort;
use crate::resources::products;
use crate::services::{self, SubmitError};
use crate::state::AppState;

const PATH: &str = "/products";

/// Product listing with visibility, featured and brand filters.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let params = ListParams::new(query);
    let paged = ProductRepository::new(state.pool())
        .list(
            &products::filter(&params),
            params.sort(),
            params.page(state.config().page_size),
        )
        .await?;
    let rows = paged.items.iter().map(products::row).collect();
    let brands = BrandRepository::new(state.pool()).options().await?;

    Ok(IndexTemplate {
        shell: Shell::load(&state, PATH).await?,
        table: TableView::build::<_, ProductSort>(
            products::table_config(&brands),
            &params,
            &paged,
            rows,
        ),
    })
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse, AppError> {
    let product = found(ProductRepository::new(state.pool()).get(id).await?, "product")?;
    Ok(ShowTemplate {
        shell: Shell::load(&state, PATH).await?,
        title: product.name.clone(),
        base_path: PATH.to_string(),
        id: id.as_i64(),
        rows: products::detail(&product),
        items: Vec::new(),
        related: None,
    })
}

#[instrument(skip(state))]
pub async fn new(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let schema = services::products::load_schema(state.pool()).await?;
    Ok(FormTemplate::new(
        Shell::load(&state, PATH).await?,
        "Create product",
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
    match services::products::create(state.pool(), &raw).await {
        Ok(product) => Ok(see_other(&format!("{PATH}/{}", product.id))),
        Err(SubmitError::Invalid(errors)) => {
            let schema = services::products::load_schema(state.pool()).await?;
            let input = schema.prepare(&raw, FormMode::Create);
            let shell = Shell::load(&state, PATH).await?;
            Ok(unprocessable(FormTemplate::new(
                shell,
                "Create product",
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
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse, AppError> {
    let product = found(ProductRepository::new(state.pool()).get(id).await?, "product")?;
    let schema = services::products::load_schema(state.pool()).await?;
    Ok(FormTemplate::new(
        Shell::load(&state, PATH).await?,
        format!("Edit {}", product.name),
        format!("{PATH}/{id}"),
        format!("{PATH}/{id}"),
        &schema,
        &products::form_values(&product),
        &ValidationErrors::new(),
    ))
}

#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let raw = FormInput::from_pairs(form);
    match services::products::update(state.pool(), id, &raw).await {
        Ok(product) => Ok(see_other(&format!("{PATH}/{}", product.id))),
        Err(SubmitError::Invalid(errors)) => {
            let product = found(ProductRepository::new(state.pool()).get(id).await?, "product")?;
            let schema = services::products::load_schema(state.pool()).await?;
            let mut input = schema.prepare(&raw, FormMode::Edit);
            input.set("slug", product.slug.as_str());
            let shell = Shell::load(&state, PATH).await?;
            Ok(unprocessable(FormTemplate::new(
                shell,
                format!("Edit {}", product.name),
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
    Path(id): Path<ProductId>,
) -> Result<Response, AppError> {
    ProductRepository::new(state.pool()).delete(id).await?;
    tracing::info!(%id, "product deleted");
    Ok(see_other(PATH))
}

#[instrument(skip(state))]
pub async fn restore(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Response, AppError> {
    ProductRepository::new(state.pool()).restore(id).await?;
    tracing::info!(%id, "product restored");
    Ok(see_other(&format!("{PATH}/{id}")))
}

#[instrument(skip(state))]
pub async fn bulk_delete(
    State(state): State<AppState>,
    Form(form): Form<BulkForm>,
) -> Result<Response, AppError> {
    let ids: Vec<ProductId> = parse_ids(&form.ids);
    if ids.is_empty() {
        return Err(AppError::BadRequest("no products selected".to_string()));
    }
    let deleted = ProductRepository::new(state.pool()).delete_many(&ids).await?;
    tracing::info!(deleted, "products bulk deleted");
    Ok(see_other(PATH))
}

/// Create the product routes router.
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
