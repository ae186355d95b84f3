//! Server-rendered HTML pages.
//!
//! Every value that came from a user goes through [`escape`] before it is
//! interpolated.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use feedback_db::models::{FeedbackRow, UserRow};
use feedback_types::api::{FeedbackForm, FieldError, LoginForm, RegisterForm};
use feedback_types::models::{Feedback, User};

// ── Row → view ────────────────────────────────────────────────────────

pub fn user_view(row: UserRow) -> User {
    let created_at = parse_timestamp(&row.created_at);
    User {
        username: row.username,
        email: row.email,
        first_name: row.first_name,
        last_name: row.last_name,
        created_at,
    }
}

pub fn feedback_view(row: FeedbackRow) -> Feedback {
    let created_at = parse_timestamp(&row.created_at);
    Feedback {
        id: row.id,
        title: row.title,
        content: row.content,
        username: row.username,
        created_at,
    }
}

/// SQLite's `datetime('now')` is "YYYY-MM-DD HH:MM:SS" in UTC with no zone.
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

// ── Pages ─────────────────────────────────────────────────────────────

pub fn register_page(form: &RegisterForm, error: Option<&FieldError>, flash: Option<&str>) -> String {
    let body = format!(
        r#"<h1>Register</h1>
  <form method="POST" action="/register">
    {username}
    {password}
    {email}
    {first_name}
    {last_name}
    <button type="submit" class="btn btn-primary">Register</button>
  </form>
  <div class="link">Already registered? <a href="/login">Log in</a></div>"#,
        username = input("username", "Username", "text", &form.username, error),
        password = input("password", "Password", "password", "", error),
        email = input("email", "Email", "email", &form.email, error),
        first_name = input("first_name", "First name", "text", &form.first_name, error),
        last_name = input("last_name", "Last name", "text", &form.last_name, error),
    );
    layout("Register", flash, &body)
}

pub fn login_page(form: &LoginForm, error: Option<&FieldError>, flash: Option<&str>) -> String {
    let body = format!(
        r#"<h1>Log in</h1>
  <form method="POST" action="/login">
    {username}
    {password}
    <button type="submit" class="btn btn-primary">Log in</button>
  </form>
  <div class="link">No account? <a href="/register">Register</a></div>"#,
        username = input("username", "Username", "text", &form.username, error),
        password = input("password", "Password", "password", "", error),
    );
    layout("Log in", flash, &body)
}

/// `viewer` is the logged-in username; owner-only controls are hidden from
/// everyone else.
pub fn user_page(user: &User, feedback: &[Feedback], viewer: &str, flash: Option<&str>) -> String {
    let is_owner = user.username == viewer;
    let username = escape(&user.username);

    let items: String = feedback
        .iter()
        .map(|f| {
            let controls = if is_owner {
                format!(
                    r#"<div class="controls">
        <a class="btn btn-secondary" href="/users/feedback/{id}/update">Edit</a>
        <form method="POST" action="/users/feedback/{id}/delete">
          <button type="submit" class="btn btn-danger">Delete</button>
        </form>
      </div>"#,
                    id = f.id,
                )
            } else {
                String::new()
            };
            format!(
                r#"
    <li class="feedback">
      <h3>{title}</h3>
      <p>{content}</p>
      <small>{created}</small>
      {controls}
    </li>"#,
                title = escape(&f.title),
                content = escape(&f.content),
                created = f.created_at.format("%Y-%m-%d %H:%M"),
            )
        })
        .collect();

    let list = if feedback.is_empty() {
        r#"<p class="empty">No feedback yet.</p>"#.to_string()
    } else {
        format!(r#"<ul class="feedback-list">{items}
  </ul>"#)
    };

    let owner_links = if is_owner {
        format!(
            r#"<div class="actions">
    <a class="btn btn-primary" href="/users/{username}/feedback/add">Add feedback</a>
    <a class="btn btn-danger" href="/users/{username}/delete">Delete account</a>
  </div>"#
        )
    } else {
        String::new()
    };

    let body = format!(
        r#"<h1>{username}</h1>
  <dl class="profile">
    <dt>Name</dt><dd>{name}</dd>
    <dt>Email</dt><dd>{email}</dd>
    <dt>Member since</dt><dd>{since}</dd>
  </dl>
  {owner_links}
  <h2>Feedback</h2>
  {list}
  <div class="link">Logged in as {viewer} · <a href="/logout">Log out</a></div>"#,
        name = escape(&user.full_name()),
        email = escape(&user.email),
        since = user.created_at.format("%Y-%m-%d"),
        viewer = escape(viewer),
    );
    layout(&user.username, flash, &body)
}

/// Shared by the add and edit feedback forms.
pub fn feedback_form_page(
    heading: &str,
    action: &str,
    owner: &str,
    form: &FeedbackForm,
    error: Option<&FieldError>,
) -> String {
    let content_error = field_error("content", error);
    let body = format!(
        r#"<h1>{heading}</h1>
  <form method="POST" action="{action}">
    {title}
    <div class="form-group">
      <label for="content">Content</label>
      <textarea id="content" name="content" rows="6" required>{content}</textarea>
      {content_error}
    </div>
    <button type="submit" class="btn btn-primary">Save</button>
  </form>
  <div class="link"><a href="/users/{owner}">Back</a></div>"#,
        heading = escape(heading),
        action = escape(action),
        title = input("title", "Title", "text", &form.title, error),
        content = escape(&form.content),
        owner = escape(owner),
    );
    layout(heading, None, &body)
}

pub fn not_found() -> String {
    layout(
        "Not found",
        None,
        r#"<h1>404</h1>
  <p>That page does not exist.</p>
  <div class="link"><a href="/">Home</a></div>"#,
    )
}

pub fn server_error() -> String {
    layout(
        "Error",
        None,
        r#"<h1>Something went wrong</h1>
  <p>Please try again later.</p>"#,
    )
}

// ── Building blocks ───────────────────────────────────────────────────

fn layout(title: &str, flash: Option<&str>, body: &str) -> String {
    let flash_html = flash
        .map(|f| format!(r#"<div class="flash">{}</div>"#, escape(f)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>Feedback - {title}</title>
<style>{style}</style>
</head><body>
<div class="card">
  {flash_html}
  {body}
</div>
</body></html>"#,
        title = escape(title),
        style = base_style(),
    )
}

fn input(name: &str, label: &str, kind: &str, value: &str, error: Option<&FieldError>) -> String {
    format!(
        r#"<div class="form-group">
      <label for="{name}">{label}</label>
      <input id="{name}" type="{kind}" name="{name}" value="{value}" required>
      {error}
    </div>"#,
        value = escape(value),
        error = field_error(name, error),
    )
}

fn field_error(name: &str, error: Option<&FieldError>) -> String {
    match error {
        Some(e) if e.field == name => format!(r#"<div class="error">{}</div>"#, escape(&e.message)),
        _ => String::new(),
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn base_style() -> &'static str {
    r#"
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body {
        font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
        background: #f5f5f5; color: #333;
        display: flex; justify-content: center; padding: 40px 20px;
    }
    .card {
        background: #fff; border-radius: 16px; padding: 32px;
        max-width: 560px; width: 100%; box-shadow: 0 4px 24px rgba(0,0,0,0.08);
    }
    h1 { font-size: 26px; color: #1a1a2e; margin-bottom: 20px; }
    h2 { font-size: 18px; margin: 24px 0 12px; }
    .form-group { margin-bottom: 16px; }
    .form-group label { display: block; font-size: 14px; font-weight: 500; margin-bottom: 6px; color: #444; }
    .form-group input, .form-group textarea {
        width: 100%; padding: 12px 14px; border: 1.5px solid #ddd;
        border-radius: 10px; font-size: 16px; outline: none; font-family: inherit;
    }
    .form-group input:focus, .form-group textarea:focus { border-color: #4a6cf7; }
    .btn {
        display: inline-block; padding: 10px 16px; border: none; border-radius: 10px;
        font-size: 15px; font-weight: 600; cursor: pointer; text-decoration: none;
    }
    .btn-primary { background: #4a6cf7; color: #fff; }
    .btn-secondary { background: #e8e8e8; color: #333; }
    .btn-danger { background: #d32f2f; color: #fff; }
    .error { color: #d32f2f; font-size: 13px; margin-top: 6px; }
    .flash { background: #fff8e1; color: #8a6d00; padding: 10px 14px; border-radius: 8px; font-size: 14px; margin-bottom: 16px; }
    .link { text-align: center; margin-top: 20px; font-size: 14px; color: #666; }
    .link a { color: #4a6cf7; text-decoration: none; }
    .profile { display: grid; grid-template-columns: max-content 1fr; gap: 6px 16px; font-size: 14px; }
    .profile dt { color: #888; }
    .actions { display: flex; gap: 8px; margin-top: 16px; }
    .feedback-list { list-style: none; }
    .feedback { border-top: 1px solid #eee; padding: 12px 0; }
    .feedback p { white-space: pre-wrap; margin: 6px 0; }
    .feedback small { color: #999; }
    .controls { display: flex; gap: 8px; margin-top: 8px; }
    .empty { color: #999; font-size: 14px; }
    "#
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            username: "alice".into(),
            email: "alice@example.com".into(),
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            created_at: DateTime::default(),
        }
    }

    fn note(id: i64, title: &str, content: &str) -> Feedback {
        Feedback {
            id,
            title: title.into(),
            content: content.into(),
            username: "alice".into(),
            created_at: DateTime::default(),
        }
    }

    #[test]
    fn escape_html() {
        assert_eq!(
            escape(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#x27;y&#x27;)&lt;/script&gt;"
        );
        assert_eq!(escape("plain text"), "plain text");
    }

    #[test]
    fn sqlite_timestamps_parse_as_utc() {
        let ts = parse_timestamp("2024-05-01 12:30:00");
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2024-05-01 12:30");
        assert_eq!(parse_timestamp("garbage"), DateTime::<Utc>::default());
    }

    #[test]
    fn user_content_is_escaped() {
        let page = user_page(&alice(), &[note(1, "<b>hi</b>", "a & b")], "alice", None);
        assert!(page.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(page.contains("a &amp; b"));
        assert!(!page.contains("<b>hi</b>"));
    }

    #[test]
    fn owner_controls_only_for_owner() {
        let feedback = [note(7, "hello", "world")];

        let own = user_page(&alice(), &feedback, "alice", None);
        assert!(own.contains("/users/feedback/7/update"));
        assert!(own.contains("/users/alice/delete"));

        let other = user_page(&alice(), &feedback, "bob", None);
        assert!(other.contains("hello"));
        assert!(!other.contains("/users/feedback/7/update"));
        assert!(!other.contains("/users/alice/delete"));
    }

    #[test]
    fn form_errors_render_next_to_their_field() {
        let form = RegisterForm {
            username: "alice".into(),
            password: "secret-pw".into(),
            ..Default::default()
        };
        let error = FieldError::new("username", "Username unavailable");
        let page = register_page(&form, Some(&error), None);

        assert!(page.contains("Username unavailable"));
        assert!(page.contains(r#"value="alice""#));
        assert!(!page.contains("secret-pw"));
    }

    #[test]
    fn flash_is_rendered() {
        let page = login_page(&LoginForm::default(), None, Some("Please log in or register"));
        assert!(page.contains("Please log in or register"));
    }
}
