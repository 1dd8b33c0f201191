//! Brand route handlers.

use std::collections::HashMap;

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::instrument;

use shopdesk_core::BrandId;

use super::views::{
    BulkForm, FormTemplate, IndexTemplate, Related, Shell, ShowTemplate, found, see_other,
    unprocessable,
};
use crate::components::{
    FormInput, FormMode, ListParams, TableView, ValidationErrors, data_table::parse_ids,
};
use crate::db::{BrandRepository, ProductRepository};
use crate::error::AppError;
use crate::models::{BrandSort, ProductSort};
use crate::resources::{brands, products};
use crate::services::{self, SubmitError};
use crate::state::AppState;

const PATH: &str = "/brands";

/// Brand listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let params = ListParams::new(query);
    let paged = BrandRepository::new(state.pool())
        .list(
            &brands::filter(&params),
            params.sort(),
            params.page(state.config().page_size),
        )
        .await?;
    let rows = paged.items.iter().map(brands::row).collect();

    Ok(IndexTemplate {
        shell: Shell::load(&state, PATH).await?,
        table: TableView::build::<_, BrandSort>(brands::table_config(), &params, &paged, rows),
    })
}

/// Brand detail with its products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
) -> Result<impl IntoResponse, AppError> {
    let brand = found(BrandRepository::new(state.pool()).get(id).await?, "brand")?;

    let params = ListParams::new(HashMap::from([("brand_id".to_string(), id.to_string())]));
    let paged = ProductRepository::new(state.pool())
        .list(
            &products::filter(&params),
            params.sort(),
            params.page(state.config().page_size),
        )
        .await?;
    let rows = paged.items.iter().map(products::row).collect();
    let table =
        TableView::build::<_, ProductSort>(products::table_config(&[]), &params, &paged, rows);

    Ok(ShowTemplate {
        shell: Shell::load(&state, PATH).await?,
        title: brand.name.clone(),
        base_path: PATH.to_string(),
        id: id.as_i64(),
        rows: brands::detail(&brand),
        items: Vec::new(),
        related: Some(Related {
            title: "Products".to_string(),
            table,
            new_href: format!("{PATH}/{id}/products/new"),
            new_label: "New product".to_string(),
        }),
    })
}

/// Empty create form.
#[instrument(skip(state))]
pub async fn new(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let schema = brands::form_schema();
    Ok(FormTemplate::new(
        Shell::load(&state, PATH).await?,
        "Create brand",
        PATH,
        PATH,
        &schema,
        &schema.defaults(),
        &ValidationErrors::new(),
    ))
}

/// Create a brand.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let raw = FormInput::from_pairs(form);
    match services::brands::create(state.pool(), &raw).await {
        Ok(brand) => Ok(see_other(&format!("{PATH}/{}", brand.id))),
        Err(SubmitError::Invalid(errors)) => {
            let schema = brands::form_schema();
            let input = schema.prepare(&raw, FormMode::Create);
            let shell = Shell::load(&state, PATH).await?;
            Ok(unprocessable(FormTemplate::new(
                shell,
                "Create brand",
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

/// Edit form with stored values.
#[instrument(skip(state))]
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
) -> Result<impl IntoResponse, AppError> {
    let brand = found(BrandRepository::new(state.pool()).get(id).await?, "brand")?;
    Ok(FormTemplate::new(
        Shell::load(&state, PATH).await?,
        format!("Edit {}", brand.name),
        format!("{PATH}/{id}"),
        format!("{PATH}/{id}"),
        &brands::form_schema(),
        &brands::form_values(&brand),
        &ValidationErrors::new(),
    ))
}

/// Update a brand.
#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let raw = FormInput::from_pairs(form);
    match services::brands::update(state.pool(), id, &raw).await {
        Ok(brand) => Ok(see_other(&format!("{PATH}/{}", brand.id))),
        Err(SubmitError::Invalid(errors)) => {
            let brand = found(BrandRepository::new(state.pool()).get(id).await?, "brand")?;
            let schema = brands::form_schema();
            let mut input = schema.prepare(&raw, FormMode::Edit);
            input.set("slug", brand.slug.as_str());
            let shell = Shell::load(&state, PATH).await?;
            Ok(unprocessable(FormTemplate::new(
                shell,
                format!("Edit {}", brand.name),
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

/// Product create form with this brand pre-selected.
#[instrument(skip(state))]
pub async fn new_product(
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
) -> Result<impl IntoResponse, AppError> {
    let brand = found(BrandRepository::new(state.pool()).get(id).await?, "brand")?;
    let schema = services::products::load_schema(state.pool()).await?;
    let mut input = schema.defaults();
    input.set("brand_id", brand.id.to_string());

    Ok(FormTemplate::new(
        Shell::load(&state, "/products").await?,
        format!("New {} product", brand.name),
        "/products",
        format!("{PATH}/{id}"),
        &schema,
        &input,
        &ValidationErrors::new(),
    ))
}

/// Soft delete a brand.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
) -> Result<Response, AppError> {
    BrandRepository::new(state.pool()).delete(id).await?;
    tracing::info!(%id, "brand deleted");
    Ok(see_other(PATH))
}

/// Undo a soft delete.
#[instrument(skip(state))]
pub async fn restore(
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
) -> Result<Response, AppError> {
    BrandRepository::new(state.pool()).restore(id).await?;
    tracing::info!(%id, "brand restored");
    Ok(see_other(&format!("{PATH}/{id}")))
}

/// Soft delete the selected brands.
#[instrument(skip(state))]
pub async fn bulk_delete(
    State(state): State<AppState>,
    Form(form): Form<BulkForm>,
) -> Result<Response, AppError> {
    let ids: Vec<BrandId> = parse_ids(&form.ids);
    if ids.is_empty() {
        return Err(AppError::BadRequest("no brands selected".to_string()));
    }
    let deleted = BrandRepository::new(state.pool()).delete_many(&ids).await?;
    tracing::info!(deleted, "brands bulk deleted");
    Ok(see_other(PATH))
}

/// Create the brand routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/new", get(new))
        .route("/bulk-delete", post(bulk_delete))
        .route("/{id}", get(show).post(update))
        .route("/{id}/edit", get(edit))
        .route("/{id}/delete", post(delete))
        .route("/{id}/restore", post(restore))
        .route("/{id}/products/new", get(new_product))
}
