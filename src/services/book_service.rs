/// Book catalog service
use anyhow::Result;
use sqlx::SqlitePool;

use crate::models::{Author, Book};

/// All books, ordered by title.
pub async fn list_books(pool: &SqlitePool) -> Result<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>("SELECT id, title FROM books ORDER BY title")
        .fetch_all(pool)
        .await?;
    Ok(books)
}

pub async fn get_book(pool: &SqlitePool, id: i64) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT id, title FROM books WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(book)
}

/// Authors of one book, ordered by name.
pub async fn authors_of_book(pool: &SqlitePool, book_id: i64) -> Result<Vec<Author>> {
    let authors = sqlx::query_as::<_, Author>(
        r#"
        SELECT a.id, a.name FROM authors a
        JOIN book_authors ba ON ba.author_id = a.id
        WHERE ba.book_id = ?
        ORDER BY a.name
        "#,
    )
    .bind(book_id)
    .fetch_all(pool)
    .await?;
    Ok(authors)
}

/// Insert a book and link the given authors. Unknown author ids are ignored.
pub async fn create_book(pool: &SqlitePool, title: &str, author_ids: &[i64]) -> Result<Book> {
    let mut tx = pool.begin().await?;
    let res = sqlx::query("INSERT INTO books (title) VALUES (?)")
        .bind(title)
        .execute(&mut *tx)
        .await?;
    let id = res.last_insert_rowid();
    link_authors(&mut tx, id, author_ids).await?;
    tx.commit().await?;

    tracing::info!(book_id = id, title, "book created");
    Ok(Book {
        id,
        title: title.to_string(),
    })
}

/// Update the title and replace the author set.
pub async fn update_book(
    pool: &SqlitePool,
    id: i64,
    title: &str,
    author_ids: &[i64],
) -> Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE books SET title = ? WHERE id = ?")
        .bind(title)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM book_authors WHERE book_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    link_authors(&mut tx, id, author_ids).await?;
    tx.commit().await?;

    tracing::info!(book_id = id, title, "book updated");
    Ok(())
}

pub async fn delete_book(pool: &SqlitePool, id: i64) -> Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM book_authors WHERE book_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(book_id = id, "book deleted");
    Ok(())
}

// The SELECT guard drops ids that do not reference an existing author.
async fn link_authors(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    book_id: i64,
    author_ids: &[i64],
) -> Result<()> {
    for author_id in author_ids {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO book_authors (author_id, book_id)
            SELECT a.id, ? FROM authors a WHERE a.id = ?
            "#,
        )
        .bind(book_id)
        .bind(author_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
