//! Customer route handlers.

use std::collections::HashMap;

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::instrument;

use shopdesk_core::CustomerId;

use super::views::{
    BulkForm, FormTemplate, IndexTemplate, Shell, ShowTemplate, found, see_other, unprocessable,
};
use crate::components::{
    FormInput, FormMode, ListParams, TableView, ValidationErrors, data_table::parse_ids,
};
use crate::db::CustomerRepository;
use crate::error::AppError;
use crate::models::CustomerSort;
use crate::resources::customers;
use crate::services::{self, SubmitError};
use crate::state::AppState;

const PATH: &str = "/customers";

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let params = ListParams::new(query);
    let paged = CustomerRepository::new(state.pool())
        .list(
            &customers::filter(&params),
            params.sort(),
            params.page(state.config().page_size),
        )
        .await?;
    let rows = paged.items.iter().map(customers::row).collect();

    Ok(IndexTemplate {
        shell: Shell::load(&state, PATH).await?,
        table: TableView::build::<_, CustomerSort>(
            customers::table_config(),
            &params,
            &paged,
            rows,
        ),
    })
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> Result<impl IntoResponse, AppError> {
    let customer = found(CustomerRepository::new(state.pool()).get(id).await?, "customer")?;
    Ok(ShowTemplate {
        shell: Shell::load(&state, PATH).await?,
        title: customer.name.clone(),
        base_path: PATH.to_string(),
        id: id.as_i64(),
        rows: customers::detail(&customer),
        items: Vec::new(),
        related: None,
    })
}

#[instrument(skip(state))]
pub async fn new(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let schema = customers::form_schema();
    Ok(FormTemplate::new(
        Shell::load(&state, PATH).await?,
        "Create customer",
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
    match services::customers::create(state.pool(), &raw).await {
        Ok(customer) => Ok(see_other(&format!("{PATH}/{}", customer.id))),
        Err(SubmitError::Invalid(errors)) => {
            let schema = customers::form_schema();
            let input = schema.prepare(&raw, FormMode::Create);
            let shell = Shell::load(&state, PATH).await?;
            Ok(unprocessable(FormTemplate::new(
                shell,
                "Create customer",
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
    Path(id): Path<CustomerId>,
) -> Result<impl IntoResponse, AppError> {
    let customer = found(CustomerRepository::new(state.pool()).get(id).await?, "customer")?;
    Ok(FormTemplate::new(
        Shell::load(&state, PATH).await?,
        format!("Edit {}", customer.name),
        format!("{PATH}/{id}"),
        format!("{PATH}/{id}"),
        &customers::form_schema(),
        &customers::form_values(&customer),
        &ValidationErrors::new(),
    ))
}

#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let raw = FormInput::from_pairs(form);
    match services::customers::update(state.pool(), id, &raw).await {
        Ok(customer) => Ok(see_other(&format!("{PATH}/{}", customer.id))),
        Err(SubmitError::Invalid(errors)) => {
            let schema = customers::form_schema();
            let input = schema.prepare(&raw, FormMode::Edit);
            let shell = Shell::load(&state, PATH).await?;
            Ok(unprocessable(FormTemplate::new(
                shell,
                "Edit customer",
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
    Path(id): Path<CustomerId>,
) -> Result<Response, AppError> {
    CustomerRepository::new(state.pool()).delete(id).await?;
    tracing::info!(%id, "customer deleted");
    Ok(see_other(PATH))
}

#[instrument(skip(state))]
pub async fn restore(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> Result<Response, AppError> {
    CustomerRepository::new(state.pool()).restore(id).await?;
    tracing::info!(%id, "customer restored");
    Ok(see_other(&format!("{PATH}/{id}")))
}

#[instrument(skip(state))]
pub async fn bulk_delete(
    State(state): State<AppState>,
    Form(form): Form<BulkForm>,
) -> Result<Response, AppError> {
    let ids: Vec<CustomerId> = parse_ids(&form.ids);
    if ids.is_empty() {
        return Err(AppError::BadRequest("no customers selected".to_string()));
    }
    let deleted = CustomerRepository::new(state.pool()).delete_many(&ids).await?;
    tracing::info!(deleted, "customers bulk deleted");
    Ok(see_other(PATH))
}

/// Create the customer routes router.
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
