//! HTML pages for the account flows

use crate::models::SessionIdentity;

/// Escape text for HTML element and attribute content
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn base_style() -> &'static str {
    r#"
body{font-family:system-ui,-apple-system,sans-serif;background:#f4f5f7;margin:0;display:flex;justify-content:center;padding-top:64px}
.card{background:#fff;border-radius:8px;box-shadow:0 1px 4px rgba(0,0,0,.1);padding:32px;width:340px}
h1{font-size:1.4em;margin:0 0 16px}
nav a{margin-right:12px}
.flash{background:#eef4ff;border:1px solid #c7d7fe;border-radius:4px;padding:8px 12px;margin-bottom:12px}
.form-group{margin-bottom:12px}
label{display:block;font-size:.9em;margin-bottom:4px}
input{width:100%;box-sizing:border-box;padding:8px;border:1px solid #ccc;border-radius:4px}
button{width:100%;padding:10px;border:0;border-radius:4px;background:#2563eb;color:#fff;font-size:1em;cursor:pointer}
"#
}

fn render_flashes(flashes: &[String]) -> String {
    flashes
        .iter()
        .map(|msg| format!(r#"<div class="flash">{}</div>"#, escape_html(msg)))
        .collect::<Vec<_>>()
        .join("\n  ")
}

fn layout(title: &str, flashes: &[String], body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head><body>
<div class="card">
  {flashes}
  {body}
</div>
</body></html>"#,
        title = escape_html(title),
        style = base_style(),
        flashes = render_flashes(flashes),
    )
}

fn credentials_form(action: &str, submit: &str, password_autocomplete: &str) -> String {
    format!(
        r#"<form method="POST" action="{action}">
    <div class="form-group">
      <label for="username">Username</label>
      <input type="text" id="username" name="username" required autocomplete="username">
    </div>
    <div class="form-group">
      <label for="password">Password</label>
      <input type="password" id="password" name="password" required autocomplete="{password_autocomplete}">
    </div>
    <button type="submit">{submit}</button>
  </form>"#
    )
}

/// Home page, showing who is logged in
pub fn render_index(identity: Option<&SessionIdentity>, flashes: &[String]) -> String {
    let body = match identity {
        Some(identity) => format!(
            r#"<h1>Welcome, {}!</h1>
  <nav><a href="/logout">Logout</a></nav>"#,
            escape_html(&identity.username)
        ),
        None => r#"<h1>Welcome</h1>
  <nav><a href="/login">Login</a><a href="/register">Register</a></nav>"#
            .to_string(),
    };

    layout("Home", flashes, &body)
}

/// Registration form
pub fn render_register(flashes: &[String]) -> String {
    let body = format!(
        r#"<h1>Register</h1>
  {form}
  <nav><a href="/login">Already have an account? Login</a></nav>"#,
        form = credentials_form("/register", "Register", "new-password"),
    );

    layout("Register", flashes, &body)
}

/// Login form
pub fn render_login(flashes: &[String]) -> String {
    let body = format!(
        r#"<h1>Login</h1>
  {form}
  <nav><a href="/register">No account? Register</a></nav>"#,
        form = credentials_form("/login", "Login", "current-password"),
    );

    layout("Login", flashes, &body)
}
