//! HTML pages

use axum::http::StatusCode;

use crate::models::{
    book::{Book, CheckoutOutcome},
    user::{User, UserSummary},
    volume::CatalogEntry,
};

use super::encode_segment;

/// Minimal HTML escaping for text and attribute values
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Capitalize the first letter of each word, lowercase the rest
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_is_letter = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

fn layout(title: &str, user: Option<&User>, flash: Option<&str>, body: &str) -> String {
    let nav = match user {
        Some(user) => {
            let admin = if user.is_admin() {
                r#"<a href="/admin/users">Users</a> "#
            } else {
                ""
            };
            format!(
                r#"<a href="/">Search</a> <a href="/collection">My books</a> {}<span class="who">{}</span> <a href="/logout">Log out</a>"#,
                admin,
                escape(&user.name)
            )
        }
        None => r#"<a href="/">Home</a> <a href="/login">Log in</a> <a href="/register">Sign up</a>"#
            .to_string(),
    };
    let flash = flash
        .map(|m| format!(r#"<p class="flash">{}</p>"#, escape(m)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{} | Bookshelf</title>
</head>
<body>
<nav>{}</nav>
<main>
{}
{}
</main>
</body>
</html>"#,
        escape(title),
        nav,
        flash,
        body
    )
}

fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}</li>", escape(e)))
        .collect();
    format!(r#"<ul class="errors">{}</ul>"#, items)
}

pub fn landing(flash: Option<&str>) -> String {
    layout(
        "Welcome",
        None,
        flash,
        r#"<h1>Your personal library</h1>
<p>Search millions of books and keep the ones you check out on your own shelf.</p>
<p><a href="/register">Sign up</a> or <a href="/login">log in</a> to get started.</p>"#,
    )
}

pub fn search_form(user: &User, flash: Option<&str>, errors: &[String]) -> String {
    let body = format!(
        r#"<h1>Find a book</h1>
{}
<form method="post" action="/">
<label>Search <input type="text" name="title" required></label>
<button type="submit">Search</button>
</form>"#,
        error_list(errors)
    );
    layout("Search", Some(user), flash, &body)
}

pub fn register_form(flash: Option<&str>, errors: &[String], email: &str, name: &str) -> String {
    let body = format!(
        r#"<h1>Register</h1>
{}
<form method="post" action="/register">
<label>Email <input type="email" name="email" value="{}" required></label>
<label>Password <input type="password" name="password" required></label>
<label>Name <input type="text" name="name" value="{}" required></label>
<button type="submit">Sign Up!</button>
</form>"#,
        error_list(errors),
        escape(email),
        escape(name)
    );
    layout("Register", None, flash, &body)
}

pub fn login_form(flash: Option<&str>) -> String {
    layout(
        "Log in",
        None,
        flash,
        r#"<h1>Log in</h1>
<form method="post" action="/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Let Me In!</button>
</form>"#,
    )
}

pub fn search_results(user: &User, heading: &str, entries: &[CatalogEntry]) -> String {
    let cards: String = if entries.is_empty() {
        "<p>No books matched your search.</p>".to_string()
    } else {
        entries
            .iter()
            .map(|entry| {
                let volume = &entry.volume;
                let cover = volume
                    .thumbnail()
                    .map(|url| format!(r#"<img src="{}" alt="">"#, escape(url)))
                    .unwrap_or_default();
                format!(
                    r#"<article class="book" style="background-color: {}">
{}
<h2>{}</h2>
<p class="authors">{}</p>
<form method="post" action="/checkout/{}"><button type="submit">Check out</button></form>
</article>"#,
                    entry.color,
                    cover,
                    escape(volume.title()),
                    escape(&volume.authors()),
                    encode_segment(&volume.id)
                )
            })
            .collect()
    };

    let body = format!(r#"<h1>{}</h1><section class="results">{}</section>"#, escape(heading), cards);
    layout(heading, Some(user), None, &body)
}

fn book_card(book: &Book) -> String {
    let ebook = book
        .ebook
        .as_deref()
        .map(|url| format!(r#"<a href="{}">Read preview</a>"#, escape(url)))
        .unwrap_or_default();
    format!(
        r#"<article class="book"><img src="{}" alt=""><h2>{}</h2><p class="authors">{}</p>{}</article>"#,
        escape(&book.img_url),
        escape(&book.title),
        escape(&book.author),
        ebook
    )
}

pub fn checkout_confirmation(user: &User, outcome: &CheckoutOutcome) -> String {
    let book = outcome.book();
    let headline = match outcome {
        CheckoutOutcome::CheckedOut(_) => "Enjoy your book!",
        CheckoutOutcome::AlreadyCheckedOut(book) if book.user_id == Some(user.id) => {
            "This book is already in your collection."
        }
        CheckoutOutcome::AlreadyCheckedOut(_) => "This book is already checked out.",
    };
    let body = format!("<h1>{}</h1>{}", headline, book_card(book));
    layout("Checkout", Some(user), None, &body)
}

pub fn collection(user: &User, flash: Option<&str>, books: &[Book]) -> String {
    let content: String = if books.is_empty() {
        r#"<p>You have not checked out any books yet. <a href="/">Find one</a>.</p>"#.to_string()
    } else {
        books.iter().map(book_card).collect()
    };
    let body = format!(r#"<h1>My books</h1><section class="results">{}</section>"#, content);
    layout("My books", Some(user), flash, &body)
}

pub fn admin_users(admin: &User, users: &[UserSummary]) -> String {
    let rows: String = users
        .iter()
        .map(|u| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                u.id,
                escape(&u.name),
                escape(&u.email),
                u.role,
                u.nb_books
            )
        })
        .collect();
    let body = format!(
        r#"<h1>Users</h1>
<table><thead><tr><th>#</th><th>Name</th><th>Email</th><th>Role</th><th>Books</th></tr></thead>
<tbody>{}</tbody></table>"#,
        rows
    );
    layout("Users", Some(admin), None, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let heading = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"<h1>{}</h1><p>{}</p><p><a href="/">Back to home</a></p>"#,
        escape(heading),
        escape(message)
    );
    layout(heading, None, None, &body)
}
