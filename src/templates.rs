// src/templates.rs
//! Server-rendered HTML pages.

use crate::storage::{CollectionEntry, FileEntry, StoredFile};

/// URL submission form.
pub fn render_input() -> String {
    let content = r#"<div class="container">
<h2>Scrape a page</h2>
<form method="post" action="/input">
    <input type="text" name="url" placeholder="https://example.com/article" autofocus>
    <button type="submit">Scrape</button>
</form>
<p class="hint">Leave the field empty to add files or text by hand.</p>
</div>"#;

    build_page("Input", content)
}

/// Manual capture form; `directory` pre-fills the collection name.
pub fn render_manual_input(directory: &str) -> String {
    let content = format!(
        r#"<div class="container">
<h2>Manual input</h2>
<form method="post" action="/manual_input/{action}" enctype="multipart/form-data">
    <label>Collection<input type="text" name="directory" value="{dir}" required></label>
    <label>Files<input type="file" name="files" multiple></label>
    <label>Text<textarea name="manual_text" rows="12"></textarea></label>
    <button type="submit">Save</button>
</form>
</div>"#,
        action = html_escape(directory),
        dir = html_escape(directory),
    );

    build_page("Manual input", &content)
}

/// Dashboard listing every collection.
pub fn render_dashboard(collections: &[CollectionEntry]) -> String {
    let mut rows = String::new();

    if collections.is_empty() {
        rows.push_str(r#"<p class="empty">Nothing collected yet. <a href="/input">Scrape a page</a> to get started.</p>"#);
    }

    for c in collections {
        rows.push_str(&format!(
            r#"<li><a href="/data/{name}">{name}</a><span class="meta">{modified}</span> <a class="minor" href="/manual_input/{name}">add</a></li>"#,
            name = html_escape(&c.name),
            modified = html_escape(c.modified.as_deref().unwrap_or("")),
        ));
    }

    let content = format!(
        r#"<div class="container"><h2>Collections</h2><ul class="listing">{rows}</ul></div>"#
    );

    build_page("Dashboard", &content)
}

/// Files of one collection, in the order given (newest first).
pub fn render_data(collection: &str, files: &[FileEntry]) -> String {
    let mut rows = String::new();

    if files.is_empty() {
        rows.push_str(r#"<p class="empty">This collection is empty.</p>"#);
    }

    for f in files {
        rows.push_str(&format!(
            r#"<li><a href="/data/{dir}/{file}">{file}</a><span class="meta">{size} bytes · {modified}</span></li>"#,
            dir = html_escape(collection),
            file = html_escape(&f.name),
            size = f.size_bytes,
            modified = html_escape(f.modified.as_deref().unwrap_or("")),
        ));
    }

    let content = format!(
        r#"<div class="container">
<h2>{dir}</h2>
<p><a href="/manual_input/{dir}">Add files or text</a></p>
<ul class="listing">{rows}</ul>
</div>"#,
        dir = html_escape(collection),
    );

    build_page(collection, &content)
}

/// Raw content of one stored file.
pub fn render_view(file: &StoredFile) -> String {
    let content = format!(
        r#"<div class="container">
<p><a href="/data/{dir}">&larr; {dir}</a></p>
<h2>{name}</h2>
<pre>{body}</pre>
</div>"#,
        dir = html_escape(&file.collection),
        name = html_escape(&file.name),
        body = html_escape(&file.content),
    );

    build_page(&file.name, &content)
}

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · scrapestash</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#fafafa;}}
.header{{background:#1a1a1a;color:#fff;padding:12px 24px;display:flex;align-items:center;justify-content:space-between;}}
.header h1{{font-size:18px;font-weight:600;}}
.header nav a{{color:#ccc;text-decoration:none;margin-left:20px;font-size:14px;}}
.header nav a:hover{{color:#fff;}}
.container{{max-width:960px;margin:0 auto;padding:24px;}}
h2{{margin-bottom:16px;}}
form label{{display:block;margin-bottom:12px;font-size:14px;}}
form input[type=text],form textarea{{display:block;width:100%;padding:8px;margin-top:4px;border:1px solid #ccc;border-radius:4px;font:inherit;}}
button{{padding:8px 16px;border:none;border-radius:4px;background:#1a1a1a;color:#fff;cursor:pointer;}}
.listing{{list-style:none;}}
.listing li{{background:#fff;border:1px solid #e0e0e0;border-radius:6px;padding:10px 14px;margin-bottom:8px;}}
.listing a{{color:#0066cc;text-decoration:none;}}
.meta{{float:right;font-size:12px;color:#888;}}
.minor{{font-size:12px;margin-left:8px;}}
.empty,.hint{{color:#888;padding:16px 0;}}
pre{{background:#fff;border:1px solid #e0e0e0;border-radius:6px;padding:16px;white-space:pre-wrap;word-break:break-word;font-size:13px;}}
</style>
</head>
<body>
<div class="header">
<h1>scrapestash</h1>
<nav><a href="/dash">Dashboard</a><a href="/input">Scrape</a><a href="/manual_input/">Manual</a></nav>
</div>
{content}
</body>
</html>"#,
        title = html_escape(title),
    )
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
