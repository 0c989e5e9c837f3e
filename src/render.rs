//! Server-rendered pages. Every page goes through `layout`; all interpolated
//! text is escaped with `escape`.

use std::fmt::Write;

use crate::forms::FormError;
use crate::models::{Author, Book, User};
use crate::oauth::Provider;

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, user: Option<&User>, flash: Option<&str>, body: &str) -> String {
    let nav_auth = match user {
        Some(user) => format!(
            r#"<span>Hi, {}!</span> <a href="/logout">Sign out</a>"#,
            escape(&user.nickname)
        ),
        None => r#"<a href="/login">Sign in</a>"#.to_string(),
    };
    let flash_html = match flash {
        Some(message) => format!(r#"<p class="flash">{}</p>"#, escape(message)),
        None => String::new(),
    };
    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>{title} - Library</title>
</head>
<body>
<nav><a href="/">Library</a> | <a href="/books">Books</a> | <a href="/authors">Authors</a> | {nav_auth}</nav>
{flash_html}
{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn index(user: Option<&User>, flash: Option<&str>) -> String {
    let greeting = match user {
        Some(user) => format!("<p>Welcome back, {}!</p>", escape(&user.nickname)),
        None => "<p>Browse the catalog, or sign in to edit it.</p>".to_string(),
    };
    layout("Library", user, flash, &format!("<h1>Library</h1>\n{greeting}"))
}

pub fn book_list(books: &[Book], user: Option<&User>, flash: Option<&str>) -> String {
    let mut body = String::from("<h1>Books</h1>\n<ul>\n");
    for book in books {
        let _ = writeln!(
            body,
            r#"<li><a href="/book/{}">{}</a></li>"#,
            book.id,
            escape(&book.title)
        );
    }
    body.push_str("</ul>\n");
    if user.is_some() {
        body.push_str(r#"<p><a href="/add_book/new">Add book</a></p>"#);
    }
    layout("Books", user, flash, &body)
}

pub fn book_detail(
    book: &Book,
    authors: &[Author],
    user: Option<&User>,
    flash: Option<&str>,
) -> String {
    let mut body = format!("<h1>{}</h1>\n<h2>Authors</h2>\n<ul>\n", escape(&book.title));
    for author in authors {
        let _ = writeln!(
            body,
            r#"<li><a href="/author/{}">{}</a></li>"#,
            author.id,
            escape(&author.name)
        );
    }
    body.push_str("</ul>\n");
    if user.is_some() {
        let _ = write!(
            body,
            r#"<p><a href="/edit_book/{id}">Edit</a></p>
<form method="post" action="/delete_book/{id}"><button type="submit">Delete</button></form>"#,
            id = book.id
        );
    }
    layout(&book.title, user, flash, &body)
}

/// Shared by the add and edit pages; `book` is None when adding.
pub fn edit_book(
    book: Option<&Book>,
    title_value: &str,
    all_authors: &[Author],
    selected: &[i64],
    errors: &[FormError],
    user: Option<&User>,
) -> String {
    let (heading, action) = match book {
        Some(book) => ("Edit book", format!("/edit_book/{}", book.id)),
        None => ("Add book", "/add_book/new".to_string()),
    };
    let mut body = format!("<h1>{heading}</h1>\n<form method=\"post\" action=\"{action}\">\n");
    let _ = writeln!(
        body,
        r#"<p><label>Title <input type="text" name="title" value="{}"></label>{}</p>"#,
        escape(title_value),
        field_errors(errors, "title")
    );
    body.push_str("<fieldset><legend>Authors</legend>\n");
    for author in all_authors {
        let checked = if selected.contains(&author.id) {
            " checked"
        } else {
            ""
        };
        let _ = writeln!(
            body,
            r#"<label><input type="checkbox" name="authors" value="{}"{}> {}</label><br>"#,
            author.id,
            checked,
            escape(&author.name)
        );
    }
    body.push_str("</fieldset>\n<p><button type=\"submit\">Save</button></p>\n</form>");
    layout(heading, user, None, &body)
}

pub fn author_list(authors: &[Author], user: Option<&User>, flash: Option<&str>) -> String {
    let mut body = String::from("<h1>Authors</h1>\n<ul>\n");
    for author in authors {
        let _ = writeln!(
            body,
            r#"<li><a href="/author/{}">{}</a></li>"#,
            author.id,
            escape(&author.name)
        );
    }
    body.push_str("</ul>\n");
    if user.is_some() {
        body.push_str(r#"<p><a href="/add_author/new">Add author</a></p>"#);
    }
    layout("Authors", user, flash, &body)
}

pub fn author_detail(
    author: &Author,
    books: &[Book],
    user: Option<&User>,
    flash: Option<&str>,
) -> String {
    let mut body = format!("<h1>{}</h1>\n<h2>Books</h2>\n<ul>\n", escape(&author.name));
    for book in books {
        let _ = writeln!(
            body,
            r#"<li><a href="/book/{}">{}</a></li>"#,
            book.id,
            escape(&book.title)
        );
    }
    body.push_str("</ul>\n");
    if user.is_some() {
        let _ = write!(
            body,
            r#"<p><a href="/edit_author/{id}">Edit</a></p>
<form method="post" action="/delete_author/{id}"><button type="submit">Delete</button></form>"#,
            id = author.id
        );
    }
    layout(&author.name, user, flash, &body)
}

/// Shared by the add and edit pages; `author` is None when adding.
pub fn edit_author(
    author: Option<&Author>,
    name_value: &str,
    all_books: &[Book],
    selected: &[i64],
    errors: &[FormError],
    user: Option<&User>,
) -> String {
    let (heading, action) = match author {
        Some(author) => ("Edit author", format!("/edit_author/{}", author.id)),
        None => ("Add author", "/add_author/new".to_string()),
    };
    let mut body = format!("<h1>{heading}</h1>\n<form method=\"post\" action=\"{action}\">\n");
    let _ = writeln!(
        body,
        r#"<p><label>Name <input type="text" name="name" value="{}"></label>{}</p>"#,
        escape(name_value),
        field_errors(errors, "name")
    );
    body.push_str("<fieldset><legend>Books</legend>\n");
    for book in all_books {
        let checked = if selected.contains(&book.id) {
            " checked"
        } else {
            ""
        };
        let _ = writeln!(
            body,
            r#"<label><input type="checkbox" name="books" value="{}"{}> {}</label><br>"#,
            book.id,
            checked,
            escape(&book.title)
        );
    }
    body.push_str("</fieldset>\n<p><button type=\"submit\">Save</button></p>\n</form>");
    layout(heading, user, None, &body)
}

pub fn login(
    provider_value: &str,
    next: Option<&str>,
    errors: &[FormError],
    message: Option<&str>,
    flash: Option<&str>,
) -> String {
    let mut body = String::from("<h1>Sign In</h1>\n");
    if let Some(message) = message {
        let _ = writeln!(body, r#"<p class="error">{}</p>"#, escape(message));
    }
    body.push_str("<form method=\"post\" action=\"/login\">\n");
    let _ = writeln!(
        body,
        r#"<p><label>Provider <input type="text" name="provider" value="{}"></label>{}</p>"#,
        escape(provider_value),
        field_errors(errors, "provider")
    );
    body.push_str(
        r#"<p><label><input type="checkbox" name="remember_me"> Remember me</label></p>
"#,
    );
    if let Some(next) = next {
        let _ = writeln!(
            body,
            r#"<input type="hidden" name="next" value="{}">"#,
            escape(next)
        );
    }
    body.push_str("<p><button type=\"submit\">Sign in</button></p>\n</form>\n<p>Sign in with:");
    for provider in Provider::KNOWN {
        let _ = write!(
            body,
            r#" <a href="/login?provider={}">{}</a>"#,
            provider.as_str(),
            provider.display_name()
        );
    }
    body.push_str("</p>");
    layout("Sign In", None, flash, &body)
}

pub fn not_found(user: Option<&User>) -> String {
    layout(
        "Not Found",
        user,
        None,
        "<h1>Not Found</h1>\n<p>The page or record you asked for does not exist.</p>",
    )
}

pub fn internal_error() -> String {
    layout(
        "Error",
        None,
        None,
        "<h1>Something went wrong</h1>\n<p>Please try again later.</p>",
    )
}

fn field_errors(errors: &[FormError], field: &str) -> String {
    let mut out = String::new();
    for error in errors.iter().filter(|e| e.field == field) {
        let _ = write!(out, r#" <span class="error">{}</span>"#, escape(error.message));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html_metacharacters() {
        assert_eq!(
            escape(r#"<b>"Dune" & 'more'</b>"#),
            "&lt;b&gt;&quot;Dune&quot; &amp; &#39;more&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn book_titles_are_escaped_in_listings() {
        let books = vec![Book {
            id: 1,
            title: "<script>alert(1)</script>".into(),
        }];
        let html = book_list(&books, None, None);
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn edit_form_preselects_authors() {
        let authors = vec![
            Author { id: 1, name: "Frank Herbert".into() },
            Author { id: 2, name: "Ursula K. Le Guin".into() },
        ];
        let html = edit_book(None, "", &authors, &[2], &[], None);
        assert!(html.contains(r#"value="2" checked"#));
        assert!(!html.contains(r#"value="1" checked"#));
    }
}
