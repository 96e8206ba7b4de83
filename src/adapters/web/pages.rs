//! Server-rendered HTML for the dashboard.

use std::fmt::Write;

use crate::domain::request::RequestGroup;
use crate::ports::approval_service::PendingOverview;

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:2em auto;padding:0 1em}\
table{border-collapse:collapse;width:100%;margin:.5em 0}\
th,td{border:1px solid #ccc;padding:.3em .6em;text-align:left}\
.panel{border:1px solid #ddd;border-radius:6px;padding:1em;margin:1em 0}\
.caption{color:#666}.notice{background:#eef6ee;padding:.5em}\
.error{background:#fbeaea;padding:.5em}\
.approve{background:#2e7d32;color:#fff}.reject{background:#c62828;color:#fff}";

/// Escapes text for use in element content and quoted attribute values.
///
/// ```
/// use license_approval::adapters::web::pages::escape_html;
/// assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Result of the last operator action, carried through the post-action redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Approved { rows: usize },
    Rejected { rows: usize },
    AlreadyResolved,
}

impl Notice {
    /// Query string for the redirect back to the dashboard.
    pub fn to_query(self) -> String {
        match self {
            Notice::Approved { rows } => format!("outcome=approved&rows={rows}"),
            Notice::Rejected { rows } => format!("outcome=rejected&rows={rows}"),
            Notice::AlreadyResolved => "outcome=already".to_string(),
        }
    }

    pub fn from_query(outcome: Option<&str>, rows: Option<usize>) -> Option<Self> {
        let rows = rows.unwrap_or(0);
        match outcome? {
            "approved" => Some(Notice::Approved { rows }),
            "rejected" => Some(Notice::Rejected { rows }),
            "already" => Some(Notice::AlreadyResolved),
            _ => None,
        }
    }

    fn message(self) -> String {
        match self {
            Notice::Approved { rows } => format!("Approved {rows} request row(s)."),
            Notice::Rejected { rows } => format!("Rejected {rows} request row(s)."),
            Notice::AlreadyResolved => {
                "That request was already resolved; nothing was changed.".to_string()
            }
        }
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
<title>{}</title><style>{STYLE}</style></head><body>{body}</body></html>",
        escape_html(title)
    )
}

pub fn render_login(failed: bool) -> String {
    let mut body = String::from("<h1>License approval</h1>");
    if failed {
        body.push_str("<p class=\"error\">Wrong password.</p>");
    }
    body.push_str(
        "<form method=\"post\" action=\"/login\">\
<label>Password <input type=\"password\" name=\"password\" autofocus></label> \
<button type=\"submit\">Log in</button></form>",
    );
    page("Log in", &body)
}

pub fn render_error(message: &str) -> String {
    let body = format!(
        "<h1>License approval</h1><p class=\"error\">{}</p><p><a href=\"/\">Back to the dashboard</a></p>",
        escape_html(message)
    );
    page("Error", &body)
}

fn render_group(out: &mut String, group: &RequestGroup) {
    let _ = write!(
        out,
        "<div class=\"panel\"><h3>Request from {}</h3><p class=\"caption\">Requested at: {}</p>",
        escape_html(group.sender()),
        escape_html(group.requested_at())
    );

    out.push_str(
        "<table><thead><tr><th>Name</th><th>Primary affiliation</th>\
<th>Secondary affiliation</th><th>Machine ID</th></tr></thead><tbody>",
    );
    for row in &group.rows {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&row.name),
            escape_html(&row.primary_affiliation),
            escape_html(&row.secondary_affiliation),
            escape_html(&row.machine_id)
        );
    }
    out.push_str("</tbody></table>");

    let _ = write!(
        out,
        "<form method=\"post\" action=\"/resolve\">\
<input type=\"hidden\" name=\"group_id\" value=\"{}\">\
<button class=\"approve\" type=\"submit\" name=\"decision\" value=\"approve\">Approve</button> \
<button class=\"reject\" type=\"submit\" name=\"decision\" value=\"reject\">Reject</button>\
</form></div>",
        escape_html(&group.group_id)
    );
}

pub fn render_dashboard(
    overview: &PendingOverview,
    notice: Option<Notice>,
    show_logout: bool,
) -> String {
    let mut body = String::from("<h1>License approval</h1><p><a href=\"/\">Refresh</a>");
    if show_logout {
        body.push_str(
            " <form method=\"post\" action=\"/logout\" style=\"display:inline\">\
<button type=\"submit\">Log out</button></form>",
        );
    }
    body.push_str("</p>");

    if let Some(notice) = notice {
        let _ = write!(body, "<p class=\"notice\">{}</p>", escape_html(&notice.message()));
    }

    let _ = write!(
        body,
        "<p class=\"caption\">Loaded {}</p>",
        overview.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if overview.has_no_data() {
        body.push_str("<p>The sheet has no request data.</p>");
    } else if overview.groups.is_empty() {
        body.push_str("<p>No pending requests.</p>");
    } else {
        let _ = write!(body, "<h2>Pending requests ({})</h2>", overview.groups.len());
        for group in &overview.groups {
            render_group(&mut body, group);
        }
    }

    page("License approval", &body)
}
