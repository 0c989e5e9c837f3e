/// Book pages: list, detail, add/edit, delete
use axum::extract::{Path, State};
use axum::response::Response;
use axum_extra::extract::Form;
use sqlx::SqlitePool;

use crate::auth::{page, redirect_with_flash, CurrentUser, Flash, RequireUser};
use crate::error::AppError;
use crate::forms::BookForm;
use crate::models::Book;
use crate::render;
use crate::services::{author_service, book_service};

use super::{parse_id, parse_target};

/// GET /books - All books ordered by title
pub async fn list_books(
    State(pool): State<SqlitePool>,
    user: CurrentUser,
    flash: Flash,
) -> Result<Response, AppError> {
    let books = book_service::list_books(&pool).await?;
    Ok(page(
        render::book_list(&books, user.0.as_ref(), flash.0.as_deref()),
        &flash,
    ))
}

/// GET /book/:id - Book detail with its authors, 404 if missing
pub async fn show_book(
    State(pool): State<SqlitePool>,
    user: CurrentUser,
    flash: Flash,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let book = book_service::get_book(&pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let authors = book_service::authors_of_book(&pool, id).await?;
    Ok(page(
        render::book_detail(&book, &authors, user.0.as_ref(), flash.0.as_deref()),
        &flash,
    ))
}

/// GET /add_book/new and /edit_book/:id - Render the book form
pub async fn edit_book_form(
    State(pool): State<SqlitePool>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let (book, title, selected) = match parse_target(&id)? {
        None => (None, String::new(), Vec::new()),
        Some(id) => {
            let book = book_service::get_book(&pool, id)
                .await?
                .ok_or(AppError::NotFound)?;
            let selected: Vec<i64> = book_service::authors_of_book(&pool, id)
                .await?
                .iter()
                .map(|a| a.id)
                .collect();
            let title = book.title.clone();
            (Some(book), title, selected)
        }
    };
    let all_authors = author_service::list_authors(&pool).await?;
    Ok(page(
        render::edit_book(
            book.as_ref(),
            &title,
            &all_authors,
            &selected,
            &[],
            Some(&user),
        ),
        &Flash(None),
    ))
}

/// POST /add_book/new and /edit_book/:id - Create or update a book
pub async fn save_book(
    State(pool): State<SqlitePool>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Form(form): Form<BookForm>,
) -> Result<Response, AppError> {
    let target = parse_target(&id)?;
    let book: Option<Book> = match target {
        None => None,
        Some(id) => Some(
            book_service::get_book(&pool, id)
                .await?
                .ok_or(AppError::NotFound)?,
        ),
    };

    let errors = form.validate();
    if !errors.is_empty() {
        let all_authors = author_service::list_authors(&pool).await?;
        return Ok(page(
            render::edit_book(
                book.as_ref(),
                &form.title,
                &all_authors,
                &form.authors,
                &errors,
                Some(&user),
            ),
            &Flash(None),
        ));
    }

    let title = form.title.trim();
    match book {
        None => {
            let book = book_service::create_book(&pool, title, &form.authors).await?;
            Ok(redirect_with_flash(
                &format!("/book/{}", book.id),
                "Book was successfully added",
            ))
        }
        Some(book) => {
            book_service::update_book(&pool, book.id, title, &form.authors).await?;
            Ok(redirect_with_flash(
                &format!("/book/{}", book.id),
                "Book was successfully updated",
            ))
        }
    }
}

/// POST /delete_book/:id - Delete a book, 404 if missing
pub async fn delete_book(
    State(pool): State<SqlitePool>,
    RequireUser(_user): RequireUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    book_service::get_book(&pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    book_service::delete_book(&pool, id).await?;
    Ok(redirect_with_flash("/books", "Book was successfully deleted"))
}
