//! Server-rendered HTML views
//!
//! Plain string rendering; every user-supplied value goes through
//! [`escape_html`].

use std::fmt::{Display, Write};

use crate::store::UserRecord;

/// Which form is being rendered
pub enum FormKind {
    Add,
    /// Carries the id as it appeared in the path, which may be malformed
    Edit(String),
}

/// Values shown in the add/edit form, possibly after a failed submit
pub struct FormView<'a> {
    pub kind: FormKind,
    pub name: &'a str,
    pub email: &'a str,
    pub error: Option<&'a str>,
}

impl<'a> FormView<'a> {
    pub const fn add(name: &'a str, email: &'a str, error: Option<&'a str>) -> Self {
        Self {
            kind: FormKind::Add,
            name,
            email,
            error,
        }
    }

    pub fn edit(id: impl Display, name: &'a str, email: &'a str, error: Option<&'a str>) -> Self {
        Self {
            kind: FormKind::Edit(id.to_string()),
            name,
            email,
            error,
        }
    }
}

/// Escape the five HTML-significant characters
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n</head>\n<body>\n<h1>{}</h1>\n{body}\n</body>\n</html>\n",
        escape_html(title),
        escape_html(title),
    )
}

/// `GET /` - table of users with edit/delete actions
pub fn render_user_list(users: &[UserRecord], allow_reset: bool) -> String {
    let mut body = String::from("<p><a href=\"/add\">Add user</a></p>\n");

    if users.is_empty() {
        body.push_str("<p>No users yet.</p>\n");
    } else {
        body.push_str("<table>\n<tr><th>ID</th><th>Name</th><th>Email</th><th></th></tr>\n");
        for user in users {
            let _ = writeln!(
                body,
                "<tr><td>{id}</td><td>{name}</td><td>{email}</td><td>\
                 <a href=\"/edit/{id}\">Edit</a> \
                 <form method=\"post\" action=\"/delete/{id}\" style=\"display:inline\">\
                 <button type=\"submit\">Delete</button></form></td></tr>",
                id = user.id,
                name = escape_html(&user.name),
                email = escape_html(&user.email),
            );
        }
        body.push_str("</table>\n");
    }

    if allow_reset {
        body.push_str(
            "<form method=\"post\" action=\"/reset\">\
             <button type=\"submit\">Reset sample data</button></form>\n",
        );
    }

    page("Users", &body)
}

/// `GET /add`, `GET /edit/:id`, and re-rendering after a failed submit
pub fn render_user_form(view: &FormView<'_>) -> String {
    let (title, action) = match &view.kind {
        FormKind::Add => ("Add user".to_string(), "/add".to_string()),
        FormKind::Edit(id) => (format!("Edit user {id}"), format!("/edit/{}", escape_html(id))),
    };

    let mut body = String::new();
    if let Some(error) = view.error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape_html(error));
    }
    let _ = write!(
        body,
        "<form method=\"post\" action=\"{action}\">\n\
         <label>Name <input type=\"text\" name=\"name\" value=\"{name}\" required></label>\n\
         <label>Email <input type=\"email\" name=\"email\" value=\"{email}\" required></label>\n\
         <button type=\"submit\">Save</button>\n\
         </form>\n<p><a href=\"/\">Back</a></p>",
        name = escape_html(view.name),
        email = escape_html(view.email),
    );

    page(&title, &body)
}

pub fn render_error(message: &str) -> String {
    page(
        "Error",
        &format!(
            "<p class=\"error\">{}</p>\n<p><a href=\"/\">Back to users</a></p>",
            escape_html(message)
        ),
    )
}
