/// Author pages: list, detail, add/edit, delete
use axum::extract::{Path, State};
use axum::response::Response;
use axum_extra::extract::Form;
use sqlx::SqlitePool;

use crate::auth::{page, redirect_with_flash, CurrentUser, Flash, RequireUser};
use crate::error::AppError;
use crate::forms::{AuthorForm, FormError};
use crate::models::Author;
use crate::render;
use crate::services::{author_service, book_service};

use super::{parse_id, parse_target};

/// GET /authors - All authors ordered by name
pub async fn list_authors(
    State(pool): State<SqlitePool>,
    user: CurrentUser,
    flash: Flash,
) -> Result<Response, AppError> {
    let authors = author_service::list_authors(&pool).await?;
    Ok(page(
        render::author_list(&authors, user.0.as_ref(), flash.0.as_deref()),
        &flash,
    ))
}

/// GET /author/:id - Author detail with their books, 404 if missing
pub async fn show_author(
    State(pool): State<SqlitePool>,
    user: CurrentUser,
    flash: Flash,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let author = author_service::get_author(&pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let books = author_service::books_of_author(&pool, id).await?;
    Ok(page(
        render::author_detail(&author, &books, user.0.as_ref(), flash.0.as_deref()),
        &flash,
    ))
}

/// GET /add_author/new and /edit_author/:id - Render the author form
pub async fn edit_author_form(
    State(pool): State<SqlitePool>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let (author, name, selected) = match parse_target(&id)? {
        None => (None, String::new(), Vec::new()),
        Some(id) => {
            let author = author_service::get_author(&pool, id)
                .await?
                .ok_or(AppError::NotFound)?;
            let selected: Vec<i64> = author_service::books_of_author(&pool, id)
                .await?
                .iter()
                .map(|b| b.id)
                .collect();
            let name = author.name.clone();
            (Some(author), name, selected)
        }
    };
    let all_books = book_service::list_books(&pool).await?;
    Ok(page(
        render::edit_author(
            author.as_ref(),
            &name,
            &all_books,
            &selected,
            &[],
            Some(&user),
        ),
        &Flash(None),
    ))
}

/// POST /add_author/new and /edit_author/:id - Create or update an author
pub async fn save_author(
    State(pool): State<SqlitePool>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Form(form): Form<AuthorForm>,
) -> Result<Response, AppError> {
    let target = parse_target(&id)?;
    let author: Option<Author> = match target {
        None => None,
        Some(id) => Some(
            author_service::get_author(&pool, id)
                .await?
                .ok_or(AppError::NotFound)?,
        ),
    };

    let mut errors = form.validate();
    let name = form.name.trim();
    if errors.is_empty()
        && author_service::name_taken(&pool, name, author.as_ref().map(|a| a.id)).await?
    {
        errors.push(FormError {
            field: "name",
            message: "An author with this name already exists.",
        });
    }
    if !errors.is_empty() {
        let all_books = book_service::list_books(&pool).await?;
        return Ok(page(
            render::edit_author(
                author.as_ref(),
                &form.name,
                &all_books,
                &form.books,
                &errors,
                Some(&user),
            ),
            &Flash(None),
        ));
    }

    match author {
        None => {
            let author = author_service::create_author(&pool, name, &form.books).await?;
            Ok(redirect_with_flash(
                &format!("/author/{}", author.id),
                "Author was successfully added",
            ))
        }
        Some(author) => {
            author_service::update_author(&pool, author.id, name, &form.books).await?;
            Ok(redirect_with_flash(
                &format!("/author/{}", author.id),
                "Author info was successfully updated",
            ))
        }
    }
}

/// POST /delete_author/:id - Delete an author, 404 if missing
pub async fn delete_author(
    State(pool): State<SqlitePool>,
    RequireUser(_user): RequireUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    author_service::get_author(&pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    author_service::delete_author(&pool, id).await?;
    Ok(redirect_with_flash(
        "/authors",
        "Author was successfully deleted",
    ))
}
