/// Author catalog service
use anyhow::Result;
use sqlx::SqlitePool;

use crate::models::{Author, Book};

/// All authors, ordered by name.
pub async fn list_authors(pool: &SqlitePool) -> Result<Vec<Author>> {
    let authors = sqlx::query_as::<_, Author>("SELECT id, name FROM authors ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(authors)
}

pub async fn get_author(pool: &SqlitePool, id: i64) -> Result<Option<Author>> {
    let author = sqlx::query_as::<_, Author>("SELECT id, name FROM authors WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(author)
}

/// Books by one author, ordered by title.
pub async fn books_of_author(pool: &SqlitePool, author_id: i64) -> Result<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>(
        r#"
        SELECT b.id, b.title FROM books b
        JOIN book_authors ba ON ba.book_id = b.id
        WHERE ba.author_id = ?
        ORDER BY b.title
        "#,
    )
    .bind(author_id)
    .fetch_all(pool)
    .await?;
    Ok(books)
}

/// Author names are unique; the form pre-checks so the user gets a field
/// message instead of a constraint error.
pub async fn name_taken(pool: &SqlitePool, name: &str, exclude_id: Option<i64>) -> Result<bool> {
    let existing = sqlx::query_as::<_, Author>("SELECT id, name FROM authors WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(match existing {
        Some(author) => exclude_id != Some(author.id),
        None => false,
    })
}

/// Insert an author and link the given books. Unknown book ids are ignored.
pub async fn create_author(pool: &SqlitePool, name: &str, book_ids: &[i64]) -> Result<Author> {
    let mut tx = pool.begin().await?;
    let res = sqlx::query("INSERT INTO authors (name) VALUES (?)")
        .bind(name)
        .execute(&mut *tx)
        .await?;
    let id = res.last_insert_rowid();
    link_books(&mut tx, id, book_ids).await?;
    tx.commit().await?;

    tracing::info!(author_id = id, name, "author created");
    Ok(Author {
        id,
        name: name.to_string(),
    })
}

/// Update the name and replace the book set.
pub async fn update_author(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    book_ids: &[i64],
) -> Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE authors SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM book_authors WHERE author_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    link_books(&mut tx, id, book_ids).await?;
    tx.commit().await?;

    tracing::info!(author_id = id, name, "author updated");
    Ok(())
}

/// Delete an author and its join rows; the books themselves stay.
pub async fn delete_author(pool: &SqlitePool, id: i64) -> Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM book_authors WHERE author_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM authors WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(author_id = id, "author deleted");
    Ok(())
}

async fn link_books(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    author_id: i64,
    book_ids: &[i64],
) -> Result<()> {
    for book_id in book_ids {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO book_authors (author_id, book_id)
            SELECT ?, b.id FROM books b WHERE b.id = ?
            "#,
        )
        .bind(author_id)
        .bind(book_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
