use axum::{
    Extension, Router,
    extract::{Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use tracing::warn;

use gramsetu_db::models::NewProduct;
use gramsetu_types::forms::MarketQuery;

use crate::error::AppError;
use crate::middleware::RequestContext;
use crate::uploads::{self, INVALID_TYPE_NOTICE, UploadError, UploadPurpose};
use crate::{AppState, flash, pages, render_page};

pub fn public_router() -> Router<AppState> {
    Router::new().route("/marketplace", get(list_products))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/marketplace/new", get(new_product_page).post(new_product_submit))
}

pub async fn list_products(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<MarketQuery>,
) -> Result<Response, AppError> {
    // Empty inputs from the filter form mean "no filter".
    let category = query.category.filter(|c| !c.is_empty());
    let search = query.search.filter(|s| !s.is_empty());

    let db = state.clone();
    let (cat, term) = (category.clone(), search.clone());
    let products =
        tokio::task::spawn_blocking(move || db.db.list_products(cat.as_deref(), term.as_deref()))
            .await??;

    let body = pages::market_body(&products, category.as_deref(), search.as_deref());
    Ok(render_page(&state, &ctx, "Marketplace", body).await)
}

pub async fn new_product_page(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    render_page(&state, &ctx, "List a Product", pages::new_product_body()).await
}

pub async fn new_product_submit(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let Some(user) = ctx.user.clone() else {
        return Ok(Redirect::to("/login").into_response());
    };

    let form = uploads::read_form(multipart).await?;
    let name = form.field("name").to_string();
    let description = form.field("description").to_string();
    let price = form.field("price").to_string();
    let location = form.field("location").to_string();
    let contact = form.field("contact").to_string();
    let category = form.field("category").to_string();

    if name.is_empty() || price.is_empty() || contact.is_empty() {
        flash(&state, &ctx, "Product name, price and contact information are required!").await;
        return Ok(render_page(&state, &ctx, "List a Product", pages::new_product_body()).await);
    }

    let mut image = None;
    if let Some(file) = form.file("image") {
        match state
            .uploads
            .store(&user.username, UploadPurpose::Product, &file.filename, &file.bytes)
            .await
        {
            Ok(stored) => image = Some(stored),
            Err(UploadError::InvalidExtension(_)) => {
                flash(&state, &ctx, INVALID_TYPE_NOTICE).await;
                return Ok(
                    render_page(&state, &ctx, "List a Product", pages::new_product_body()).await,
                );
            }
            Err(e) => {
                warn!("product image upload failed: {}", e);
                flash(&state, &ctx, "Error uploading image. Please try again later.").await;
            }
        }
    }

    let db = state.clone();
    tokio::task::spawn_blocking(move || {
        db.db.insert_product(&NewProduct {
            name: &name,
            description: &description,
            price: &price,
            location: &location,
            contact: &contact,
            category: &category,
            image: image.as_deref(),
            user_id: user.id,
        })
    })
    .await??;

    flash(&state, &ctx, "Product listed successfully!").await;
    Ok(Redirect::to("/marketplace").into_response())
}
