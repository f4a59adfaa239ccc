//! Server-rendered HTML: the public home page, the sign-in page and the
//! admin shell.
//!
//! The home page reads only the collections its visible sections need. In
//! maintenance mode it reads nothing beyond site content.

use std::fmt::Write as _;

use atelier_api::catalog::{ProjectRow, project_rows};
use atelier_core::{
  client::StoreClient,
  content::{HomePage, SectionKind, compose},
  entity::{GalleryCategory, GalleryImage, Project, ProjectCategory, Testimonial},
  record::{Collection, Stored},
  rules::Access,
  site::{SectionText, SiteContent},
  store::DocumentStore,
};
use axum::{extract::State, response::Html};

use crate::{AppState, error::Error};

// ─── Escaping ────────────────────────────────────────────────────────────────

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}

/// Typing this fragment on any public page opens the sign-in page. It is a
/// convenience, not an access control.
const HIDDEN_DOOR: &str = r##"<script>
(function () {
  function door() { if (window.location.hash === "#pkadmin") { window.location.replace("/login"); } }
  door();
  window.addEventListener("hashchange", door);
})();
</script>"##;

/// Shows only the figures whose `data-category` matches the pressed button.
const GALLERY_SCRIPT: &str = r#"<script>
(function () {
  var gallery = document.getElementById("gallery");
  if (!gallery) return;
  gallery.querySelectorAll("button[data-filter]").forEach(function (button) {
    button.addEventListener("click", function () {
      var filter = button.dataset.filter;
      gallery.querySelectorAll("figure[data-category]").forEach(function (figure) {
        figure.hidden = filter !== "all" && figure.dataset.category !== filter;
      });
    });
  });
})();
</script>"#;

const CONTACT_SCRIPT: &str = r#"<script>
(function () {
  var form = document.getElementById("contact-form");
  if (!form) return;
  var status = document.getElementById("contact-status");
  function post(url, body) {
    return fetch(url, { method: "POST", headers: { "Content-Type": "application/json" }, body: body });
  }
  form.addEventListener("submit", async function (e) {
    e.preventDefault();
    var body = JSON.stringify(Object.fromEntries(new FormData(form)));
    var res = await post("/api/contact", body);
    if (res.status >= 500) res = await post("/api/contact/fallback", body);
    if (res.ok) { form.reset(); status.textContent = "Thanks! Your message has been sent."; return; }
    var data = await res.json().catch(function () { return {}; });
    status.textContent = data.errors ? Object.values(data.errors).join(" ") : "Something went wrong.";
  });
})();
</script>"#;

// ─── Home page ───────────────────────────────────────────────────────────────

/// The collections a rendered home page draws on.
#[derive(Debug, Default)]
pub struct PageData {
  pub projects:           Vec<ProjectRow>,
  pub gallery:            Vec<Stored<GalleryImage>>,
  pub gallery_categories: Vec<Stored<GalleryCategory>>,
  pub testimonials:       Vec<Stored<Testimonial>>,
}

impl PageData {
  async fn load<S>(client: &StoreClient<S>, page: &HomePage) -> Result<Self, Error>
  where
    S: DocumentStore + 'static,
  {
    let mut data = Self::default();
    if page.needs(Collection::Projects) {
      let projects = client.list::<Project>().await?;
      let categories = client.list::<ProjectCategory>().await?;
      data.projects = project_rows(projects, &categories);
    }
    if page.needs(Collection::GalleryImages) {
      data.gallery = client.list::<GalleryImage>().await?;
      data.gallery_categories = client.list::<GalleryCategory>().await?;
    }
    if page.needs(Collection::Testimonials) {
      data.testimonials = client.list::<Testimonial>().await?;
    }
    Ok(data)
  }
}

/// `GET /`
pub async fn home<S>(State(state): State<AppState<S>>) -> Result<Html<String>, Error>
where
  S: DocumentStore + 'static,
{
  let client = state.client.with_access(Access::Public);
  let content = atelier_api::site::load(&client).await?;
  let page = compose(&content);
  let data = PageData::load(&client, &page).await?;
  Ok(Html(render_home(&content, &page, &data)))
}

fn heading(out: &mut String, id: &str, text: &SectionText) {
  let _ = write!(out, r#"<section id="{id}"><h2>{}</h2>"#, escape(&text.title));
  if !text.description.is_empty() {
    let _ = write!(out, "<p>{}</p>", escape(&text.description));
  }
}

pub fn render_home(content: &SiteContent, page: &HomePage, data: &PageData) -> String {
  let mut out = String::new();
  let _ = write!(
    out,
    r#"<!doctype html><html lang="en" class="{theme}" data-animations="{animations}"><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>{title}</title></head><body>"#,
    theme = content.theme.as_str(),
    animations = if content.animations_enabled() { "on" } else { "off" },
    title = escape(&content.hero.title),
  );

  match page {
    HomePage::Maintenance { message } => {
      let _ = write!(out, r#"<main class="maintenance"><p>{}</p></main>"#, escape(message));
    }
    HomePage::Live { sections } => {
      out.push_str("<main>");
      for section in sections {
        render_section(&mut out, *section, content, data);
      }
      out.push_str("</main>");
      render_footer(&mut out, content);
      out.push_str(CONTACT_SCRIPT);
    }
  }

  out.push_str(HIDDEN_DOOR);
  out.push_str("</body></html>");
  out
}

fn render_section(out: &mut String, section: SectionKind, content: &SiteContent, data: &PageData) {
  let copy = &content.sections;
  match section {
    SectionKind::Hero => {
      let hero = &content.hero;
      let _ = write!(
        out,
        r#"<section id="hero"><h1>{}</h1><p>{}</p>"#,
        escape(&hero.title),
        escape(&hero.subtitle)
      );
      if !hero.cta_text.is_empty() {
        let _ = write!(
          out,
          r#"<a class="cta" href="{}">{}</a>"#,
          escape(&hero.cta_link),
          escape(&hero.cta_text)
        );
      }
    }
    SectionKind::About => {
      heading(out, "about", &copy.about);
      if !content.about.image_url.is_empty() {
        let _ = write!(out, r#"<img src="{}" alt="">"#, escape(&content.about.image_url));
      }
      let _ = write!(out, "<p>{}</p>", escape(&content.about.bio));
    }
    SectionKind::Stats => {
      heading(out, "stats", &copy.stats);
      out.push_str("<dl>");
      for stat in &content.stats {
        let _ = write!(out, "<dt>{}</dt><dd>{}</dd>", escape(&stat.value), escape(&stat.label));
      }
      out.push_str("</dl>");
    }
    SectionKind::Portfolio => {
      heading(out, "portfolio", &copy.portfolio);
      for row in &data.projects {
        let project = &row.project.data;
        let _ = write!(
          out,
          r#"<article class="project" data-id="{id}"><img src="{img}" alt="{title}"><h3>{title}</h3><span class="category">{category}</span><p>{description}</p>"#,
          id = escape(&row.project.id),
          img = escape(&project.image_url),
          title = escape(&project.title),
          category = escape(&row.category_name),
          description = escape(&project.description),
        );
        let tools: Vec<String> = project.tools().map(escape).collect();
        if !tools.is_empty() {
          let _ = write!(out, r#"<p class="tools">{}</p>"#, tools.join(" · "));
        }
        out.push_str("</article>");
      }
    }
    SectionKind::Gallery => {
      heading(out, "gallery", &copy.gallery);
      out.push_str(r#"<nav class="filters"><button data-filter="all">All</button>"#);
      for category in &data.gallery_categories {
        let _ = write!(
          out,
          r#"<button data-filter="{}">{}</button>"#,
          escape(&category.id),
          escape(&category.data.name)
        );
      }
      out.push_str("</nav>");
      for image in &data.gallery {
        let _ = write!(
          out,
          r#"<figure data-category="{}"><img src="{}" alt="{title}"><figcaption>{title}</figcaption></figure>"#,
          escape(&image.data.gallery_category_id),
          escape(&image.data.image_url),
          title = escape(&image.data.title),
        );
      }
      out.push_str(GALLERY_SCRIPT);
    }
    SectionKind::Skills => {
      heading(out, "skills", &copy.skills);
      out.push_str("<ul>");
      for skill in &content.skills {
        let _ = write!(out, "<li>{}</li>", escape(skill));
      }
      out.push_str("</ul>");
    }
    SectionKind::Tools => {
      heading(out, "tools", &copy.tools);
      out.push_str("<ul>");
      for tool in &content.tools {
        let _ = write!(
          out,
          r#"<li><img src="{}" alt="">{}</li>"#,
          escape(&tool.icon_url),
          escape(&tool.name)
        );
      }
      out.push_str("</ul>");
    }
    SectionKind::Testimonials => {
      heading(out, "testimonials", &copy.testimonials);
      for t in &data.testimonials {
        let t = &t.data;
        let role = match &t.company {
          Some(company) => format!("{}, {}", t.role, company),
          None => t.role.clone(),
        };
        let _ = write!(
          out,
          "<blockquote><p>{}</p><footer>{} · {}</footer></blockquote>",
          escape(&t.content),
          escape(&t.name),
          escape(&role)
        );
      }
    }
    SectionKind::Contact => {
      heading(out, "contact", &copy.contact);
      out.push_str(
        r#"<form id="contact-form"><input name="name" placeholder="Name"><input name="email" type="email" placeholder="Email"><textarea name="message" placeholder="Message"></textarea><button type="submit">Send</button></form><p id="contact-status" role="status"></p>"#,
      );
    }
  }
  out.push_str("</section>");
}

fn render_footer(out: &mut String, content: &SiteContent) {
  out.push_str("<footer><nav>");
  for (platform, url) in content.social_links.iter() {
    let _ = write!(out, r#"<a href="{}" rel="noopener">{platform}</a>"#, escape(url));
  }
  out.push_str("</nav></footer>");
}

// ─── Sign-in and admin shell ─────────────────────────────────────────────────

const LOGIN_PAGE: &str = r#"<!doctype html><html lang="en"><head><meta charset="utf-8"><title>Sign in</title></head><body>
<main><h1>Sign in</h1>
<form id="login"><input name="email" type="email" placeholder="Email" required><input name="password" type="password" placeholder="Password" required><button type="submit">Sign in</button></form>
<p id="login-status" role="status"></p></main>
<script>
document.getElementById("login").addEventListener("submit", async function (e) {
  e.preventDefault();
  var res = await fetch("/api/auth/login", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify(Object.fromEntries(new FormData(e.target))),
  });
  if (res.ok) { window.location.assign("/admin"); return; }
  var data = await res.json().catch(function () { return {}; });
  document.getElementById("login-status").textContent = data.error || "Sign-in failed.";
});
</script></body></html>"#;

/// `GET /login`
pub async fn login() -> Html<&'static str> { Html(LOGIN_PAGE) }

const ADMIN_SECTIONS: [(&str, &str); 8] = [
  ("Dashboard", "/admin"),
  ("Projects", "/admin/projects"),
  ("Project categories", "/admin/project-categories"),
  ("Gallery", "/admin/gallery"),
  ("Gallery categories", "/admin/gallery-categories"),
  ("Testimonials", "/admin/testimonials"),
  ("Messages", "/admin/messages"),
  ("Site content", "/admin/site-content"),
];

/// `GET /admin`, `GET /admin/*`. The console itself drives `/api/admin`.
pub async fn admin_shell() -> Html<String> {
  let mut out = String::from(
    r#"<!doctype html><html lang="en"><head><meta charset="utf-8"><title>Admin</title></head><body><nav>"#,
  );
  for (label, href) in ADMIN_SECTIONS {
    let _ = write!(out, r#"<a href="{href}">{label}</a>"#);
  }
  out.push_str(
    r#"<button id="logout">Sign out</button></nav><main id="console" data-api="/api/admin"></main>
<script>
document.getElementById("logout").addEventListener("click", async function () {
  await fetch("/api/auth/logout", { method: "POST" });
  window.location.assign("/login");
});
var toasts = new EventSource("/api/admin/events");
toasts.addEventListener("toast", function (e) {
  var t = JSON.parse(e.data);
  console.warn(t.title + ": " + t.description);
});
</script></body></html>"#,
  );
  Html(out)
}

#[cfg(test)]
mod tests {
  use atelier_core::site::SectionVisibility;
  use chrono::Utc;

  use super::*;

  fn project_row(title: &str, category_name: &str) -> ProjectRow {
    let now = Utc::now();
    ProjectRow {
      project:       Stored {
        id:         "p1".into(),
        data:       Project {
          title:               title.into(),
          description:         "desc".into(),
          project_category_id: "gone".into(),
          image_url:           "https://example.com/p.png".into(),
          project_images:      vec![],
          tools_used:          "Figma, Blender".into(),
          order:               1,
          problem:             None,
          solution:            None,
          outcome:             None,
        },
        created_at: now,
        updated_at: now,
      },
      category_name: category_name.into(),
    }
  }

  #[test]
  fn escape_covers_markup_and_quotes() {
    assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
  }

  #[test]
  fn maintenance_renders_only_the_notice() {
    let mut content = SiteContent::default();
    content.is_maintenance_mode_enabled = true;
    content.hero.subtitle = "Welcome".into();
    let page = compose(&content);
    let html = render_home(&content, &page, &PageData::default());
    assert!(html.contains("scheduled maintenance"));
    assert!(!html.contains("Welcome"));
    assert!(!html.contains("contact-form"));
    assert!(html.contains("#pkadmin"));
  }

  #[test]
  fn hidden_sections_are_not_rendered() {
    let content = SiteContent {
      visibility: SectionVisibility { gallery: Some(false), ..Default::default() },
      ..Default::default()
    };
    let page = compose(&content);
    let html = render_home(&content, &page, &PageData::default());
    assert!(!html.contains(r#"id="gallery""#));
    assert!(html.contains(r#"id="portfolio""#));
    assert!(html.contains(r#"id="contact""#));
  }

  #[test]
  fn gallery_filter_buttons_have_a_script() {
    let now = Utc::now();
    let content = SiteContent::default();
    let page = compose(&content);
    let data = PageData {
      gallery_categories: vec![Stored {
        id:         "c1".into(),
        data:       GalleryCategory { name: "Posters".into(), order: 1 },
        created_at: now,
        updated_at: now,
      }],
      gallery: vec![Stored {
        id:         "g1".into(),
        data:       GalleryImage {
          title:               "Night poster".into(),
          image_url:           "https://example.com/g.png".into(),
          gallery_category_id: "c1".into(),
          order:               1,
        },
        created_at: now,
        updated_at: now,
      }],
      ..Default::default()
    };
    let html = render_home(&content, &page, &data);
    assert!(html.contains(r#"<button data-filter="c1">Posters</button>"#));
    assert!(html.contains(r#"<figure data-category="c1">"#));
    assert!(html.contains(GALLERY_SCRIPT));
    assert!(html.contains(HIDDEN_DOOR));
  }

  #[test]
  fn projects_show_category_and_escaped_text() {
    let content = SiteContent::default();
    let page = compose(&content);
    let data = PageData { projects: vec![project_row("<Aura>", "N/A")], ..Default::default() };
    let html = render_home(&content, &page, &data);
    assert!(html.contains("&lt;Aura&gt;"));
    assert!(!html.contains("<Aura>"));
    assert!(html.contains(r#"<span class="category">N/A</span>"#));
    assert!(html.contains("Figma · Blender"));
  }
}
