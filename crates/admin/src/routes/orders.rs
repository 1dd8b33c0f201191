//! Order route handlers.

use std::collections::HashMap;

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::instrument;

use shopdesk_core::OrderId;

use super::views::{
    BulkForm, FormTemplate, IndexTemplate, Repeater, Shell, ShowTemplate, found, see_other,
    unprocessable,
};
use crate::components::{
    FormInput, FormMode, ListParams, TableView, ValidationErrors, data_table::parse_ids,
};
use crate::db::OrderRepository;
use crate::error::AppError;
use crate::models::OrderSort;
use crate::resources::orders::{self, ItemDraft, item_drafts, item_rows_view};
use crate::services::orders::OrderForm;
use crate::services::{self, SubmitError};
use crate::state::AppState;

const PATH: &str = "/orders";

fn repeater(form: &OrderForm, drafts: &[ItemDraft], errors: &ValidationErrors) -> Repeater {
    Repeater::new(
        item_rows_view(drafts, &form.products, &form.stored, errors),
        &form.products,
    )
}

/// Order listing with status filter and export.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let params = ListParams::new(query);
    let paged = OrderRepository::new(state.pool())
        .list(
            &orders::filter(&params),
            params.sort(),
            params.page(state.config().page_size),
        )
        .await?;
    let rows = paged.items.iter().map(orders::row).collect();

    Ok(IndexTemplate {
        shell: Shell::load(&state, PATH).await?,
        table: TableView::build::<_, OrderSort>(orders::table_config(), &params, &paged, rows),
    })
}

/// Order detail with line totals.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse, AppError> {
    let order = found(OrderRepository::new(state.pool()).get(id).await?, "order")?;
    Ok(ShowTemplate {
        shell: Shell::load(&state, PATH).await?,
        title: format!("Order {}", order.number),
        base_path: PATH.to_string(),
        id: id.as_i64(),
        rows: orders::detail(&order),
        items: order.items,
        related: None,
    })
}

#[instrument(skip(state))]
pub async fn new(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let form = OrderForm::load(state.pool(), None).await?;
    let errors = ValidationErrors::new();
    let template = FormTemplate::new(
        Shell::load(&state, PATH).await?,
        "Create order",
        PATH,
        PATH,
        &form.schema,
        &form.schema.defaults(),
        &errors,
    );
    Ok(template.with_repeater(repeater(&form, &[], &errors)))
}

#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let raw = FormInput::from_pairs(form);
    match services::orders::create(state.pool(), &raw).await {
        Ok(order) => Ok(see_other(&format!("{PATH}/{}", order.id))),
        Err(SubmitError::Invalid(errors)) => {
            let form = OrderForm::load(state.pool(), None).await?;
            let input = form.schema.prepare(&raw, FormMode::Create);
            let template = FormTemplate::new(
                Shell::load(&state, PATH).await?,
                "Create order",
                PATH,
                PATH,
                &form.schema,
                &input,
                &errors,
            );
            Ok(unprocessable(template.with_repeater(repeater(
                &form,
                &item_drafts(&raw),
                &errors,
            ))))
        }
        Err(err) => Err(err.into()),
    }
}

#[instrument(skip(state))]
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse, AppError> {
    let order = found(OrderRepository::new(state.pool()).get(id).await?, "order")?;
    let form = OrderForm::load(state.pool(), Some(&order)).await?;
    let input = orders::form_values(&order);
    let errors = ValidationErrors::new();
    let template = FormTemplate::new(
        Shell::load(&state, PATH).await?,
        format!("Edit order {}", order.number),
        format!("{PATH}/{id}"),
        format!("{PATH}/{id}"),
        &form.schema,
        &input,
        &errors,
    );
    Ok(template.with_repeater(repeater(&form, &item_drafts(&input), &errors)))
}

#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let raw = FormInput::from_pairs(form);
    match services::orders::update(state.pool(), id, &raw).await {
        Ok(order) => Ok(see_other(&format!("{PATH}/{}", order.id))),
        Err(SubmitError::Invalid(errors)) => {
            let order = found(OrderRepository::new(state.pool()).get(id).await?, "order")?;
            let form = OrderForm::load(state.pool(), Some(&order)).await?;
            let input = form.schema.prepare(&raw, FormMode::Edit);
            let template = FormTemplate::new(
                Shell::load(&state, PATH).await?,
                format!("Edit order {}", order.number),
                format!("{PATH}/{id}"),
                format!("{PATH}/{id}"),
                &form.schema,
                &input,
                &errors,
            );
            Ok(unprocessable(template.with_repeater(repeater(
                &form,
                &item_drafts(&raw),
                &errors,
            ))))
        }
        Err(err) => Err(err.into()),
    }
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Response, AppError> {
    OrderRepository::new(state.pool()).delete(id).await?;
    tracing::info!(%id, "order deleted");
    Ok(see_other(PATH))
}

#[instrument(skip(state))]
pub async fn restore(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Response, AppError> {
    OrderRepository::new(state.pool()).restore(id).await?;
    tracing::info!(%id, "order restored");
    Ok(see_other(&format!("{PATH}/{id}")))
}

#[instrument(skip(state))]
pub async fn bulk_delete(
    State(state): State<AppState>,
    Form(form): Form<BulkForm>,
) -> Result<Response, AppError> {
    let ids: Vec<OrderId> = parse_ids(&form.ids);
    if ids.is_empty() {
        return Err(AppError::BadRequest("no orders selected".to_string()));
    }
    let deleted = OrderRepository::new(state.pool()).delete_many(&ids).await?;
    tracing::info!(deleted, "orders bulk deleted");
    Ok(see_other(PATH))
}

/// Create the order routes router.
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
