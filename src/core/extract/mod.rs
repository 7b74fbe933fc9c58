use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::core::http;
use crate::models::MovieRecord;
use crate::utils::{Error, Result};

// One named rule per field keeps a site-layout change contained: when the
// markup moves, the selector to fix is next to the field it feeds.

static TITLE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1.entry-title, h1.post-title, h1").unwrap());
static OG_TITLE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());

// Metadata rows look like <p><b>DVD ID:</b> <a ...>SONE-763</a></p>.
static LABEL_B_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("p > b, div > b, li > b").unwrap());
static B_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("b").unwrap());
static ANCHOR_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

static GENRE_TAG_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"a[rel="tag"], .genres a, .post-categories a, .tags a"#).unwrap()
});
static IDOL_LINK_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"a[href*="/idols/"], a[href*="/actresses/"], a[href*="/actors/"], a[href*="/stars/"], a[href*="/people/"]"#,
    )
    .unwrap()
});

static GALLERY_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("div.row.g-3").unwrap());
static PREVIEW_ANCHOR_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[data-image-src]").unwrap());

// Last-resort identifier patterns scanned over the whole page text.
static DVD_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{2,}-?\d{2,}-?\d{1,}\b").unwrap());
static CONTENT_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-z]{2,}\d{4,}\b").unwrap());

/// Fetch a detail page and extract its metadata.
pub async fn extract(client: &reqwest::Client, url: &str) -> Result<MovieRecord> {
    info!(target: "javmeta::extract", url = %url, "Fetching detail page");
    let body = http::fetch_text(client, url).await?;
    parse_detail(&body, url)
}

/// Structural extraction against the current javdatabase.com markup.
/// Fragile by nature; a site redesign breaks individual rules, not the
/// whole traversal.
pub fn parse_detail(html: &str, page_url: &str) -> Result<MovieRecord> {
    let doc = Html::parse_document(html);

    let title = title(&doc).ok_or(Error::MalformedPage("title"))?;

    let dvd_id = labeled_value(&doc, "DVD ID", "dvd_id")?
        .or_else(|| text_fallback(&doc, &DVD_ID_RE))
        .ok_or(Error::MalformedPage("dvd_id"))?;
    let content_id = labeled_value(&doc, "Content ID", "content_id")?
        .or_else(|| text_fallback(&doc, &CONTENT_ID_RE))
        .ok_or(Error::MalformedPage("content_id"))?;
    let release_date =
        labeled_value(&doc, "Release Date", "release_date")?.ok_or(Error::MalformedPage("release_date"))?;
    let studio = labeled_value(&doc, "Studio", "studio")?.ok_or(Error::MalformedPage("studio"))?;

    let jav_series = labeled_value(&doc, "JAV Series", "jav_series")?;
    let runtime = labeled_value(&doc, "Runtime", "runtime")?;
    let director = labeled_value(&doc, "Director", "director")?;

    let genres = genres(&doc);
    let actresses = actresses(&doc);
    let preview_images = preview_images(&doc, page_url)?;
    debug!(
        target: "javmeta::extract",
        dvd_id = %dvd_id,
        previews = preview_images.len(),
        "Extraction complete"
    );

    Ok(MovieRecord {
        link: page_url.to_string(),
        title,
        jav_series,
        dvd_id,
        content_id,
        release_date,
        runtime,
        studio,
        director,
        genres,
        actresses,
        preview_images,
    })
}

fn title(doc: &Html) -> Option<String> {
    doc.select(&TITLE_SEL)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            doc.select(&OG_TITLE_SEL)
                .next()
                .and_then(|m| m.value().attr("content"))
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
        })
}

/// Rows whose `<b>` label contains `label` (case-insensitive).
fn labeled_rows<'a>(doc: &'a Html, label: &str) -> Vec<ElementRef<'a>> {
    let needle = label.to_lowercase();
    doc.select(&LABEL_B_SEL)
        .filter(|b| element_text(*b).to_lowercase().contains(&needle))
        .filter_map(|b| b.parent().and_then(ElementRef::wrap))
        .collect()
}

/// Single value for a labeled row: first anchor text, else the text that
/// follows the label. A label matching several rows with *distinct* values
/// is ambiguous and treated as a malformed page rather than guessed at.
fn labeled_value(doc: &Html, label: &str, field: &'static str) -> Result<Option<String>> {
    let mut values = Vec::new();
    for row in labeled_rows(doc, label) {
        let value = row
            .select(&ANCHOR_SEL)
            .next()
            .map(element_text)
            .filter(|v| !v.is_empty())
            .or_else(|| text_after_label(row));
        if let Some(v) = value {
            values.push(v);
        }
    }
    if values.windows(2).any(|w| w[0] != w[1]) {
        return Err(Error::MalformedPage(field));
    }
    Ok(values.into_iter().next())
}

/// All anchor texts under rows carrying the label, in document order,
/// duplicates kept.
fn labeled_values(doc: &Html, label: &str) -> Vec<String> {
    labeled_rows(doc, label)
        .into_iter()
        .flat_map(|row| row.select(&ANCHOR_SEL).map(element_text))
        .filter(|v| !v.is_empty())
        .collect()
}

/// Text content after the `<b>` label, with label punctuation stripped.
fn text_after_label(row: ElementRef) -> Option<String> {
    let b = row.select(&B_SEL).next()?;
    let mut node = b.next_sibling();
    while let Some(n) = node {
        if let Some(text) = n.value().as_text() {
            let v = text.trim_matches(|c: char| c.is_whitespace() || c == ':');
            if !v.is_empty() {
                return Some(v.to_string());
            }
        } else if let Some(el) = ElementRef::wrap(n) {
            let v = element_text(el);
            if !v.is_empty() {
                return Some(v);
            }
        }
        node = n.next_sibling();
    }
    None
}

fn genres(doc: &Html) -> Vec<String> {
    let labeled = labeled_values(doc, "Genre(s)");
    if !labeled.is_empty() {
        return labeled;
    }
    doc.select(&GENRE_TAG_SEL)
        .map(element_text)
        .filter(|v| !v.is_empty())
        .collect()
}

fn actresses(doc: &Html) -> Vec<String> {
    let labeled = labeled_values(doc, "Idol(s)/Actress(es)");
    if !labeled.is_empty() {
        return labeled;
    }
    doc.select(&IDOL_LINK_SEL)
        .map(element_text)
        .filter(|v| !v.is_empty())
        .collect()
}

/// Gallery anchors in document order; the full-size URL is preferred over
/// the inline preview. Relative URLs are resolved against the page URL.
fn preview_images(doc: &Html, page_url: &str) -> Result<Vec<String>> {
    let base = Url::parse(page_url)?;
    let gallery = doc.select(&GALLERY_SEL).next();

    let anchors: Vec<ElementRef> = match gallery {
        Some(g) => g.select(&PREVIEW_ANCHOR_SEL).collect(),
        None => doc.select(&PREVIEW_ANCHOR_SEL).collect(),
    };

    let mut images = Vec::new();
    for a in anchors {
        let raw = a
            .value()
            .attr("data-image-href")
            .or_else(|| a.value().attr("data-image-src"));
        if let Some(raw) = raw {
            images.push(base.join(raw)?.to_string());
        }
    }
    Ok(images)
}

fn text_fallback(doc: &Html, re: &Regex) -> Option<String> {
    let text = doc.root_element().text().collect::<Vec<_>>().join(" ");
    re.find(&text).map(|m| m.as_str().to_string())
}

fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}
