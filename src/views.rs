// SPDX-License-Identifier: MIT

//! Minimal HTML views.
//!
//! Pure functions from handler data to markup. No template engine; the
//! pages are small enough that `format!` with escaping keeps the view
//! layer a thin function of its inputs.

use crate::conversation::{Role, Turn};

/// Escape text for safe interpolation into HTML content.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
         <title>{title} - Companion Chat</title></head>\n\
         <body>\n{body}\n</body></html>",
        title = escape(title),
        body = body
    )
}

fn flash(message: Option<&str>) -> String {
    match message {
        Some(msg) => format!("<p class=\"flash\">{}</p>", escape(msg)),
        None => String::new(),
    }
}

pub fn landing_page() -> String {
    page(
        "Welcome",
        "<h1>Companion Chat</h1>\
         <p>A friendly companion to talk to.</p>\
         <p><a href=\"/login\">Log in</a> or <a href=\"/register\">register</a>.</p>",
    )
}

pub fn login_page(error: Option<&str>) -> String {
    let body = format!(
        "<h1>Log in</h1>{flash}\
         <form method=\"post\" action=\"/login\">\
         <label>Email <input type=\"email\" name=\"email\"></label><br>\
         <label>Password <input type=\"password\" name=\"pswd\"></label><br>\
         <button type=\"submit\">Log in</button>\
         </form>\
         <p><a href=\"/register\">Need an account?</a></p>",
        flash = flash(error)
    );
    page("Log in", &body)
}

pub fn register_page(error: Option<&str>) -> String {
    let body = format!(
        "<h1>Register</h1>{flash}\
         <form method=\"post\" action=\"/register\">\
         <label>Name <input type=\"text\" name=\"name\"></label><br>\
         <label>Email <input type=\"email\" name=\"email\"></label><br>\
         <label>Password <input type=\"password\" name=\"pswd\"></label><br>\
         <label>Confirm password <input type=\"password\" name=\"confirm_pswd\"></label><br>\
         <button type=\"submit\">Register</button>\
         </form>",
        flash = flash(error)
    );
    page("Register", &body)
}

pub fn choose_page(name: &str) -> String {
    let body = format!(
        "<h1>Hello, {name}</h1>\
         <ul>\
         <li><a href=\"/chatbox\">Open the chatbox</a></li>\
         <li><a href=\"/logout\">Log out</a></li>\
         </ul>",
        name = escape(name)
    );
    page("Choose", &body)
}

/// Render the chatbox with the user-visible turn history.
///
/// The caller is expected to have stripped the hidden seed turn already;
/// any system turn that slips through is skipped here as well.
pub fn chatbox_page(name: &str, history: &[Turn]) -> String {
    let mut messages = String::new();
    for turn in history {
        let who = match turn.role {
            Role::User => "You",
            Role::Model => "Companion",
            Role::System => continue,
        };
        messages.push_str(&format!(
            "<li><strong>{who}:</strong> {text}</li>",
            who = who,
            text = escape(&turn.text)
        ));
    }

    let body = format!(
        "<h1>Chatbox</h1>\
         <p>Chatting as {name}. Type <code>clear</code> to start over.</p>\
         <ul class=\"history\">{messages}</ul>\
         <form method=\"post\" action=\"/chatbox\">\
         <input type=\"text\" name=\"msg\" autofocus>\
         <button type=\"submit\">Send</button>\
         </form>\
         <p><a href=\"/choose\">Back</a></p>",
        name = escape(name),
        messages = messages
    );
    page("Chatbox", &body)
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        "<h1>Sorry</h1><p>{}</p><p><a href=\"/\">Home</a></p>",
        escape(message)
    );
    page("Error", &body)
}
