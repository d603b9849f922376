mod extractors;
mod into_responses;
mod middleware;

use crate::domain::auth_guard::AuthGuard;
use crate::domain::auth_model::AuthPayload;
use crate::domain::auth_model::Permission;
use crate::domain::drink_model::CreateDrinkInput;
use crate::domain::drink_model::DeleteDrinkOutput;
use crate::domain::drink_model::DrinkView;
use crate::domain::drink_model::DrinksOutput;
use crate::domain::drink_model::LongDrink;
use crate::domain::drink_model::Projection;
use crate::domain::drink_model::UpdateDrinkInput;
use crate::domain::drink_store::DrinkStore;
use crate::domain::drink_store::DrinkStoreError;
use crate::http::extractors::DrinkId;
use crate::http::extractors::JsonBody;
use crate::http::into_responses::ApiError;
use crate::http::middleware::require_permission;
use crate::http::middleware::RequiredPermission;
use axum::handler::Handler;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::patch;
use axum::Extension;
use axum::Router;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::Any as AnyOrigin;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppContext {
    pub guard: Arc<AuthGuard>,
    pub drinks: Arc<DrinkStore>,
}

impl AppContext {
    pub fn new(guard: AuthGuard, drinks: DrinkStore) -> Self {
        Self {
            guard: Arc::new(guard),
            drinks: Arc::new(drinks),
        }
    }
}

async fn list_drinks(
    Extension(drink_store): Extension<Arc<DrinkStore>>,
) -> Result<DrinksOutput<Vec<DrinkView>>, DrinkStoreError> {
    let drinks = drink_store.list_all(Projection::Short).await?;

    Ok(DrinksOutput::new(drinks))
}

async fn list_drinks_detail(
    Extension(_payload): Extension<AuthPayload>,
    Extension(drink_store): Extension<Arc<DrinkStore>>,
) -> Result<DrinksOutput<Vec<DrinkView>>, DrinkStoreError> {
    let drinks = drink_store.list_all(Projection::Long).await?;

    Ok(DrinksOutput::new(drinks))
}

async fn create_drink(
    Extension(_payload): Extension<AuthPayload>,
    Extension(drink_store): Extension<Arc<DrinkStore>>,
    JsonBody(input): JsonBody<CreateDrinkInput>,
) -> Result<DrinksOutput<LongDrink>, DrinkStoreError> {
    let drink = drink_store.create(input).await?;

    Ok(DrinksOutput::new(drink))
}

async fn update_drink(
    Extension(_payload): Extension<AuthPayload>,
    Extension(drink_store): Extension<Arc<DrinkStore>>,
    DrinkId(id): DrinkId,
    JsonBody(input): JsonBody<UpdateDrinkInput>,
) -> Result<DrinksOutput<Vec<LongDrink>>, DrinkStoreError> {
    let drink = drink_store.update(id, input).await?;

    Ok(DrinksOutput::new(vec![drink]))
}

async fn delete_drink(
    Extension(_payload): Extension<AuthPayload>,
    Extension(drink_store): Extension<Arc<DrinkStore>>,
    DrinkId(id): DrinkId,
) -> Result<DeleteDrinkOutput, DrinkStoreError> {
    let id = drink_store.delete(id).await?;

    Ok(DeleteDrinkOutput {
        success: true,
        delete: id,
    })
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn internal_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let reason = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    log::error!("handler panicked: {}", reason);

    ApiError::Internal.into_response()
}

pub fn drinks_route(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    Router::new()
        .route(
            "/drinks",
            get(list_drinks)
                .post(create_drink.layer(from_fn_with_state(
                    RequiredPermission::new(&ctx.guard, Permission::POST_DRINKS),
                    require_permission,
                )))
                .fallback(method_not_allowed),
        )
        .route(
            "/drinks-detail",
            get(list_drinks_detail.layer(from_fn_with_state(
                RequiredPermission::new(&ctx.guard, Permission::GET_DRINKS_DETAIL),
                require_permission,
            )))
            .fallback(method_not_allowed),
        )
        .route(
            "/drinks/:id",
            patch(update_drink.layer(from_fn_with_state(
                RequiredPermission::new(&ctx.guard, Permission::PATCH_DRINKS),
                require_permission,
            )))
            .delete(delete_drink.layer(from_fn_with_state(
                RequiredPermission::new(&ctx.guard, Permission::DELETE_DRINKS),
                require_permission,
            )))
            .fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(Extension(ctx.drinks.clone()))
        .layer(CatchPanicLayer::custom(internal_error))
        .layer(cors)
}
