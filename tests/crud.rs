mod common;

use axum::http::StatusCode;

use common::*;

#[tokio::test]
async fn created_book_appears_in_listing_and_detail() {
    let (app, pool) = setup().await;
    let cookie = signed_in_cookie(&pool).await;

    let resp = post_form(&app, "/add_author/new", Some(&cookie), "name=Frank+Herbert").await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/author/1");

    let resp = post_form(&app, "/add_book/new", Some(&cookie), "title=Dune&authors=1").await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/book/1");

    let listing = body_text(get(&app, "/books").await).await;
    assert!(listing.contains("Dune"));

    let detail = body_text(get(&app, "/book/1").await).await;
    assert!(detail.contains("Dune"));
    assert!(detail.contains("Frank Herbert"));
}

#[tokio::test]
async fn blank_title_re_renders_the_form() {
    let (app, pool) = setup().await;
    let cookie = signed_in_cookie(&pool).await;

    let resp = post_form(&app, "/add_book/new", Some(&cookie), "title=").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("This field is required."));

    let listing = body_text(get(&app, "/books").await).await;
    assert!(!listing.contains("<li>"));
}

#[tokio::test]
async fn deleted_book_disappears_and_detail_404s() {
    let (app, pool) = setup().await;
    let cookie = signed_in_cookie(&pool).await;

    post_form(&app, "/add_book/new", Some(&cookie), "title=Dune").await;

    let resp = post_form(&app, "/delete_book/1", Some(&cookie), "").await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/books");

    let listing = body_text(get(&app, "/books").await).await;
    assert!(!listing.contains("Dune"));

    let resp = get(&app, "/book/1").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_author_names_are_rejected_with_a_message() {
    let (app, pool) = setup().await;
    let cookie = signed_in_cookie(&pool).await;

    let resp = post_form(&app, "/add_author/new", Some(&cookie), "name=Frank+Herbert").await;
    assert!(resp.status().is_redirection());

    let resp = post_form(&app, "/add_author/new", Some(&cookie), "name=Frank+Herbert").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("An author with this name already exists."));

    // Renaming an author onto itself stays allowed.
    let resp = post_form(&app, "/edit_author/1", Some(&cookie), "name=Frank+Herbert").await;
    assert!(resp.status().is_redirection());
}

#[tokio::test]
async fn editing_a_book_replaces_its_author_set() {
    let (app, pool) = setup().await;
    let cookie = signed_in_cookie(&pool).await;

    post_form(&app, "/add_author/new", Some(&cookie), "name=Frank+Herbert").await;
    post_form(&app, "/add_author/new", Some(&cookie), "name=Ursula+K.+Le+Guin").await;
    post_form(&app, "/add_book/new", Some(&cookie), "title=Dune&authors=1").await;

    let resp = post_form(&app, "/edit_book/1", Some(&cookie), "title=Dune&authors=2").await;
    assert!(resp.status().is_redirection());

    let detail = body_text(get(&app, "/book/1").await).await;
    assert!(detail.contains("Ursula K. Le Guin"));
    assert!(!detail.contains("Frank Herbert"));
}

#[tokio::test]
async fn deleting_an_author_keeps_the_books() {
    let (app, pool) = setup().await;
    let cookie = signed_in_cookie(&pool).await;

    post_form(&app, "/add_author/new", Some(&cookie), "name=Frank+Herbert").await;
    post_form(&app, "/add_book/new", Some(&cookie), "title=Dune&authors=1").await;

    let resp = post_form(&app, "/delete_author/1", Some(&cookie), "").await;
    assert!(resp.status().is_redirection());

    let detail = body_text(get(&app, "/book/1").await).await;
    assert!(detail.contains("Dune"));
    assert!(!detail.contains("Frank Herbert"));
}

#[tokio::test]
async fn unknown_author_ids_in_the_form_are_ignored() {
    let (app, pool) = setup().await;
    let cookie = signed_in_cookie(&pool).await;

    let resp = post_form(
        &app,
        "/add_book/new",
        Some(&cookie),
        "title=Dune&authors=7&authors=99",
    )
    .await;
    assert!(resp.status().is_redirection());

    let detail = body_text(get(&app, "/book/1").await).await;
    assert!(detail.contains("Dune"));
}

#[tokio::test]
async fn unauthenticated_mutations_redirect_to_login() {
    let (app, _pool) = setup().await;

    let resp = post_form(&app, "/add_book/new", None, "title=Dune").await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/login?next=%2Fadd_book%2Fnew");

    let resp = get(&app, "/edit_author/1").await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/login?next=%2Fedit_author%2F1");

    let resp = post_form(&app, "/delete_book/1", None, "").await;
    assert!(resp.status().is_redirection());
    assert!(location(&resp).starts_with("/login?next="));
}

#[tokio::test]
async fn missing_records_and_unknown_routes_404() {
    let (app, pool) = setup().await;
    let cookie = signed_in_cookie(&pool).await;

    assert_eq!(get(&app, "/book/999").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/author/999").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/nothing_here").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        get(&app, "/book/not-a-number").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        get_with_cookie(&app, "/edit_book/999", &cookie).await.status(),
        StatusCode::NOT_FOUND
    );
    // Deletes are POST-only.
    assert_eq!(
        get_with_cookie(&app, "/delete_book/1", &cookie).await.status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
}

#[tokio::test]
async fn flash_message_shows_once_after_redirect() {
    let (app, pool) = setup().await;
    let cookie = signed_in_cookie(&pool).await;

    let resp = post_form(&app, "/add_book/new", Some(&cookie), "title=Dune").await;
    let flash = set_cookies(&resp)
        .into_iter()
        .find(|c| c.starts_with("librarium_flash="))
        .expect("flash cookie");

    let both = format!("{}; {}", cookie, flash.split(';').next().unwrap_or_default());
    let resp = get_with_cookie(&app, "/book/1", &both).await;
    let clears = set_cookies(&resp);
    let body = body_text(resp).await;
    assert!(body.contains("Book was successfully added"));
    assert!(clears.iter().any(|c| c.contains("librarium_flash=;")));
}
