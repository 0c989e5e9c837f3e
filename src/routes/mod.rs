pub mod authors;
pub mod books;
pub mod login;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::auth::{page, CurrentUser, Flash};
use crate::error::AppError;
use crate::render;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/books", get(books::list_books))
        .route("/book/:id", get(books::show_book))
        .route("/add_book/:id", get(books::edit_book_form).post(books::save_book))
        .route("/edit_book/:id", get(books::edit_book_form).post(books::save_book))
        .route("/delete_book/:id", post(books::delete_book))
        .route("/authors", get(authors::list_authors))
        .route("/author/:id", get(authors::show_author))
        .route(
            "/add_author/:id",
            get(authors::edit_author_form).post(authors::save_author),
        )
        .route(
            "/edit_author/:id",
            get(authors::edit_author_form).post(authors::save_author),
        )
        .route("/delete_author/:id", post(authors::delete_author))
        .route("/login", get(login::login_page).post(login::start_login))
        .route("/logout", get(login::logout))
        .fallback(not_found)
}

/// GET / - Index page
async fn index(user: CurrentUser, flash: Flash) -> Response {
    page(render::index(user.0.as_ref(), flash.0.as_deref()), &flash)
}

async fn not_found(user: CurrentUser) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(render::not_found(user.0.as_ref())),
    )
        .into_response()
}

/// The add/edit routes share handlers: the literal id `new` means create,
/// anything numeric means edit. Junk ids fall out as 404.
pub(crate) fn parse_target(id: &str) -> Result<Option<i64>, AppError> {
    if id == "new" {
        return Ok(None);
    }
    id.parse::<i64>().map(Some).map_err(|_| AppError::NotFound)
}

pub(crate) fn parse_id(id: &str) -> Result<i64, AppError> {
    id.parse::<i64>().map_err(|_| AppError::NotFound)
}
