//! Server-rendered HTML pages.

use crate::models::ClassificationResult;

const STYLE: &str = "body{font-family:sans-serif;max-width:46rem;margin:2rem auto;padding:0 1rem}\
nav a{margin-right:1rem}textarea{width:100%;min-height:12rem}\
.error{color:#a40000}table{border-collapse:collapse}td,th{padding:.3rem .8rem;text-align:left}";

/// Escapes text for use inside HTML element content and attribute values.
pub fn escape(text: &str) -> String {
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

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} | Speech Classifier</title>
<style>{STYLE}</style>
</head>
<body>
<nav><a href="/index">Home</a><a href="/about">About</a><a href="/predict">Predict</a></nav>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn index_page() -> String {
    layout(
        "Home",
        r#"<h1>Which party gave this speech?</h1>
<p>Paste the text of a UK political speech and a pre-trained classifier will
predict which party it most likely came from.</p>
<p><a href="/predict">Classify a speech</a></p>"#,
    )
}

pub fn about_page() -> String {
    layout(
        "About",
        r#"<h1>About</h1>
<p>The classifier was trained offline on transcribed parliamentary speeches.
It reads the words of a speech and reports the party it considers most likely,
together with its confidence in every party.</p>
<p>Predictions are not stored.</p>"#,
    )
}

/// The prediction form, with an optional validation message above it.
pub fn predict_form(error: Option<&str>) -> String {
    let message = error
        .map(|e| format!(r#"<p class="error" role="alert">{}</p>"#, escape(e)))
        .unwrap_or_default();
    layout(
        "Predict",
        &format!(
            r#"<h1>Classify a speech</h1>
{message}
{FORM}"#
        ),
    )
}

const FORM: &str = r#"<form method="post" action="/predict">
<label for="speech_body">Speech</label>
<textarea id="speech_body" name="speech_body" required></textarea>
<button type="submit">Predict</button>
</form>"#;

pub fn predict_result(result: &ClassificationResult) -> String {
    let rows: String = result
        .class_probabilities
        .iter()
        .map(|class| {
            format!(
                concat!(
                    r#"<tr><th>{label}</th>"#,
                    r#"<td class="probability" data-label="{label}">{percent:.1}%</td></tr>"#,
                    "\n",
                ),
                label = escape(&class.label),
                percent = class.percent,
            )
        })
        .collect();

    layout(
        "Predict",
        &format!(
            r#"<h1>Prediction</h1>
<p>This speech was most likely given by: <strong id="predicted-label">{label}</strong></p>
<table>
<thead><tr><th>Party</th><th>Probability</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
<h2>Classify another speech</h2>
{FORM}"#,
            label = escape(&result.predicted_label),
        ),
    )
}

pub fn error_page(message: &str) -> String {
    layout(
        "Error",
        &format!(
            r#"<h1>Error</h1>
<p class="error">{}</p>
<p><a href="/predict">Try again</a></p>"#,
            escape(message)
        ),
    )
}
