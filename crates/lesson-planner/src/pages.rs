//! Server-rendered HTML pages.
//!
//! Three pages mirror the navigation surface: the landing page, the login
//! form, and the lesson planner itself. The planner page drives the JSON API
//! with a small inline script and reloads itself after each action.

use std::fmt::Write;

use lesson_export::render::render_html;

use crate::content::{ContentPhase, ContentStore};
use crate::form::FormData;
use crate::gate::View;
use crate::session::SessionFlag;

/// Product name shown in the navigation bar.
pub const BRAND: &str = "EduBlueprint";

/// Tagline on the landing page.
pub const TAGLINE: &str = "AI-Powered Lesson Planning for Modern Educators.";

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;background:#f3f4f6;color:#111}\
nav{display:flex;justify-content:space-between;align-items:center;padding:12px 24px;border-bottom:1px solid #d1d5db;background:#fff}\
nav a{color:inherit;text-decoration:none;font-weight:600}\
.avatar{display:inline-block;width:32px;height:32px;border-radius:50%;background:#4f46e5;color:#fff;text-align:center;line-height:32px;margin-right:8px}\
main{max-width:56rem;margin:24px auto;padding:0 16px}\
.card{background:#fff;border:1px solid #111;border-radius:6px;padding:24px}\
label{display:block;font-weight:600;margin-top:12px}\
textarea,input{width:100%;box-sizing:border-box;padding:8px;margin-top:4px}\
button,.button{display:inline-block;padding:8px 16px;margin-top:12px;border:0;border-radius:4px;background:#4f46e5;color:#fff;cursor:pointer;text-decoration:none}\
.secondary{background:#374151}\
.error{color:#dc2626}\
.row{display:flex;justify-content:space-between;gap:12px}";

const PLANNER_SCRIPT: &str = r#"
async function call(method, url, body) {
  const options = { method, headers: { "content-type": "application/json" } };
  if (body !== undefined) options.body = JSON.stringify(body);
  const response = await fetch(url, options);
  if (response.status === 401) { window.location.href = "/login"; }
  return response;
}
function formValues() {
  const values = {};
  document.querySelectorAll("textarea[data-field]").forEach((el) => { values[el.dataset.field] = el.value; });
  return values;
}
async function pushEdits() {
  const editor = document.getElementById("editable");
  if (editor) await call("PUT", "/api/content/text", { text: editor.value });
}
async function generatePlan() {
  document.getElementById("status").textContent = "Generating...";
  await call("PUT", "/api/form", formValues());
  await call("POST", "/api/generate");
  window.location.reload();
}
async function toggleEdit() { await pushEdits(); await call("POST", "/api/content/toggle-edit"); window.location.reload(); }
async function saveEdits() { await pushEdits(); await call("POST", "/api/content/save"); window.location.reload(); }
async function cancelEdits() { await pushEdits(); await call("POST", "/api/content/cancel"); window.location.reload(); }
"#;

/// Escapes text for HTML element content and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Wraps a page body in the document shell and navigation bar.
fn layout(title: &str, flag: &SessionFlag, show_brand: bool, body: &str) -> String {
    let mut html = String::with_capacity(body.len() + 2048);

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<nav>\n",
        escape_html(title)
    );

    if show_brand {
        let _ = writeln!(html, "<a href=\"/\">{BRAND}</a>");
    } else {
        let _ = writeln!(html, "<span></span>");
    }

    if flag.is_authenticated {
        let _ = writeln!(
            html,
            "<form method=\"post\" action=\"/logout\"><span class=\"avatar\">{}</span>\
             <button type=\"submit\" class=\"secondary\">Log Out</button></form>",
            escape_html(&flag.initial().to_string())
        );
    } else {
        let _ = writeln!(html, "<a href=\"/login\">Login</a>");
    }

    let _ = write!(html, "</nav>\n<main>\n{body}\n</main>\n</body>\n</html>\n");
    html
}

/// Landing page with the call to action.
#[must_use]
pub fn landing_page(flag: &SessionFlag) -> String {
    let body = format!(
        "<div class=\"card\" style=\"text-align:center\">\n<h1>{BRAND}</h1>\n<p>{TAGLINE}</p>\n\
         <a class=\"button\" href=\"/lesson-planner\">Try Lesson Planner</a>\n</div>"
    );
    layout(BRAND, flag, false, &body)
}

/// Login form, with the inline error when a previous attempt failed.
#[must_use]
pub fn login_page(error: Option<&str>) -> String {
    let mut body = String::from(
        "<div class=\"card\" style=\"max-width:24rem;margin:auto\">\n<h2 style=\"text-align:center\">Login</h2>\n\
         <form method=\"post\" action=\"/login\">\n\
         <label for=\"email\">Email</label>\n\
         <input id=\"email\" name=\"email\" type=\"text\" placeholder=\"Enter email\">\n\
         <label for=\"password\">Password</label>\n\
         <input id=\"password\" name=\"password\" type=\"password\" placeholder=\"Enter password\">\n",
    );
    if let Some(error) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape_html(error));
    }
    body.push_str("<button type=\"submit\" style=\"width:100%\">Login</button>\n</form>\n</div>");

    layout("Login", &SessionFlag::signed_out(), true, &body)
}

// ============================================================================
// Planner Page
// ============================================================================

/// Everything the planner page shows.
#[derive(Debug, Clone, Default)]
pub struct PlannerProps {
    /// Current session, for the navigation bar.
    pub flag: SessionFlag,
    /// Form values.
    pub form: FormData,
    /// Generated and editable content.
    pub content: ContentStore,
}

/// The lesson planner page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlannerView;

impl View for PlannerView {
    type Props = PlannerProps;
    type Output = String;

    fn render(&self, props: &PlannerProps) -> String {
        let mut body = String::with_capacity(4096);

        body.push_str("<div class=\"card\">\n<h1 style=\"text-align:center\">Lesson Planner</h1>\n");
        for (field, value) in props.form.entries() {
            let _ = writeln!(
                body,
                "<label for=\"{id}\">{label}</label>\n\
                 <textarea id=\"{id}\" name=\"{id}\" data-field=\"{id}\" placeholder=\"Enter {label}\">{value}</textarea>",
                id = field.id(),
                label = escape_html(field.label()),
                value = escape_html(value),
            );
        }
        body.push_str(
            "<button type=\"button\" style=\"width:100%\" onclick=\"generatePlan()\">Generate Lesson Plan</button>\n\
             <p id=\"status\"></p>\n",
        );

        write_content(&mut body, &props.content);

        let _ = write!(body, "</div>\n<script>{PLANNER_SCRIPT}</script>");
        layout("Lesson Planner", &props.flag, true, &body)
    }
}

fn write_content(body: &mut String, content: &ContentStore) {
    match content.phase {
        ContentPhase::Empty => return,
        ContentPhase::Editing => {
            let _ = writeln!(
                body,
                "<section id=\"lesson-plan\">\n<textarea id=\"editable\" rows=\"16\">{}</textarea>\n\
                 <div class=\"row\" style=\"justify-content:flex-end\">\
                 <button type=\"button\" onclick=\"saveEdits()\">Save</button>\
                 <button type=\"button\" class=\"secondary\" onclick=\"cancelEdits()\">Cancel</button></div>",
                escape_html(&content.editable)
            );
        }
        ContentPhase::Generated => {
            body.push_str("<section id=\"lesson-plan\">\n<details open>\n<summary>Generated Lesson Plan</summary>\n");
            if content.failed {
                let _ = writeln!(body, "<p class=\"error\">{}</p>", escape_html(&content.generated));
            } else {
                body.push_str("<div class=\"prose\">\n");
                body.push_str(&render_html(&content.editable));
                body.push_str("</div>\n");
            }
            body.push_str("</details>\n");
        }
    }

    let toggle_label = if content.is_editing() {
        "Cancel Edit"
    } else {
        "Edit"
    };
    let _ = writeln!(
        body,
        "<div class=\"row\">\
         <button type=\"button\" class=\"secondary\" onclick=\"toggleEdit()\">{toggle_label}</button>\
         <span><a class=\"button\" href=\"/api/export\">Print / Save as PDF</a> \
         <a class=\"button secondary\" href=\"/api/export?format=markdown\">Markdown</a> \
         <a class=\"button secondary\" href=\"/api/export?format=json\">JSON</a></span>\
         </div>\n</section>"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormField;

    fn signed_in_props() -> PlannerProps {
        PlannerProps {
            flag: SessionFlag::signed_in("demouser"),
            ..PlannerProps::default()
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_landing_page_has_call_to_action() {
        let html = landing_page(&SessionFlag::signed_out());
        assert!(html.contains(TAGLINE));
        assert!(html.contains("href=\"/lesson-planner\">Try Lesson Planner</a>"));
        assert!(html.contains("href=\"/login\">Login</a>"));
    }

    #[test]
    fn test_login_page_shows_inline_error() {
        assert!(!login_page(None).contains("class=\"error\""));

        let html = login_page(Some("Invalid credentials"));
        assert!(html.contains("<p class=\"error\">Invalid credentials</p>"));
        assert!(html.contains("action=\"/login\""));
    }

    #[test]
    fn test_planner_page_lists_all_fields() {
        let html = PlannerView.render(&signed_in_props());

        for field in FormField::ALL {
            assert!(html.contains(&format!("data-field=\"{}\"", field.id())));
            assert!(html.contains(&escape_html(field.label())));
        }
        assert!(html.contains("Generate Lesson Plan"));
        assert!(html.contains("<span class=\"avatar\">D</span>"));
        assert!(!html.contains("id=\"lesson-plan\""));
    }

    #[test]
    fn test_planner_page_escapes_form_values() {
        let mut props = signed_in_props();
        props.form.set(FormField::Topic, "</textarea><script>x</script>");

        let html = PlannerView.render(&props);
        assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;x&lt;/script&gt;"));
    }

    #[test]
    fn test_planner_page_renders_generated_markdown() {
        let mut props = signed_in_props();
        props.content.complete_generation("## Activities\n\n- Sorting game");

        let html = PlannerView.render(&props);

        assert!(html.contains("<summary>Generated Lesson Plan</summary>"));
        assert!(html.contains("<h2>Activities</h2>"));
        assert!(html.contains("<li>Sorting game</li>"));
        assert!(html.contains(">Edit</button>"));
        assert!(html.contains("Print / Save as PDF"));
    }

    #[test]
    fn test_planner_page_shows_generation_error() {
        let mut props = signed_in_props();
        props.content.fail_generation();

        let html = PlannerView.render(&props);
        assert!(html.contains("<p class=\"error\">Error fetching lesson plan.</p>"));
    }

    #[test]
    fn test_planner_page_shows_cleared_edit_as_empty_plan() {
        let mut props = signed_in_props();
        props.content.complete_generation("## Original plan");
        props.content.toggle_edit().ok();
        props.content.set_editable("").ok();
        props.content.save().ok();

        let html = PlannerView.render(&props);

        assert!(html.contains("<summary>Generated Lesson Plan</summary>"));
        assert!(!html.contains("class=\"error\""));
        assert!(!html.contains("Original plan"));
    }

    #[test]
    fn test_planner_page_editing_shows_editor() {
        let mut props = signed_in_props();
        props.content.complete_generation("# Plan");
        props.content.toggle_edit().ok();

        let html = PlannerView.render(&props);

        assert!(html.contains("<textarea id=\"editable\" rows=\"16\"># Plan</textarea>"));
        assert!(html.contains(">Save</button>"));
        assert!(html.contains(">Cancel</button>"));
        assert!(html.contains(">Cancel Edit</button>"));
        assert!(!html.contains("<summary>"));
    }
}
