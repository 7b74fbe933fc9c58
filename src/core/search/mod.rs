use std::io::Write;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::config::SiteConfig;
use crate::core::http;
use crate::models::SearchHit;
use crate::utils::{Error, Result};

static CARD_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".card.borderlesscard, .card.h-100.borderlesscard").unwrap());
static CODE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.pcard a, p.display-6.pcard a").unwrap());
static TITLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".mt-auto a").unwrap());
static CARD_META_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".mt-auto").unwrap());
static STUDIO_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.btn a, span.btn-primary a").unwrap());

static RELEASE_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

/// What the resolver was asked to resolve.
#[derive(Debug, Clone)]
pub enum Target {
    /// Free-text search query, e.g. "SONE-763".
    Query(String),
    /// Direct detail-page URL; passed through untouched.
    Link(String),
}

/// Decides between multiple search hits. Injected so the resolver is
/// testable without a terminal.
pub trait CandidatePicker {
    /// Returns a 0-based index into `hits`.
    fn pick(&self, hits: &[SearchHit]) -> Result<usize>;
}

/// Interactive picker: lists the hits on stdout and reads one selection
/// from stdin. A non-numeric or out-of-range answer is a hard error.
pub struct StdinPicker;

impl CandidatePicker for StdinPicker {
    fn pick(&self, hits: &[SearchHit]) -> Result<usize> {
        println!("Found {} results:", hits.len());
        for (i, hit) in hits.iter().enumerate() {
            let code = hit.dvd_code.as_deref().unwrap_or("N/A");
            let title = hit.title.as_deref().unwrap_or("");
            let short = if title.chars().count() > 100 {
                format!("{}...", title.chars().take(100).collect::<String>())
            } else {
                title.to_string()
            };
            println!("{}) {} - {}", i + 1, code, short);
        }
        print!("Enter the number of the item to select (1-{}): ", hits.len());
        std::io::stdout().flush()?;

        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        let choice = line.trim();

        let idx: usize = choice
            .parse()
            .map_err(|_| Error::InvalidSelection(format!("'{choice}' is not a number")))?;
        if idx == 0 || idx > hits.len() {
            return Err(Error::InvalidSelection(format!(
                "{idx} is out of range 1-{}",
                hits.len()
            )));
        }
        Ok(idx - 1)
    }
}

pub fn search_url(config: &SiteConfig, query: &str) -> String {
    format!(
        "{}/?post_type=movies%2Cuncensored&s={}",
        config.base_url.trim_end_matches('/'),
        urlencoding::encode(query)
    )
}

/// Parse the search-results listing into one hit per result card.
/// Cards without a detail link are useless downstream and are skipped.
pub fn parse_search(html: &str, config: &SiteConfig) -> Vec<SearchHit> {
    let doc = Html::parse_document(html);
    let mut hits = Vec::new();

    for card in doc.select(&CARD_SEL) {
        let code_a = card.select(&CODE_SEL).next();
        let link = match code_a.and_then(|a| a.value().attr("href")) {
            Some(href) => absolutize(href, config),
            None => continue,
        };
        let dvd_code = code_a.map(element_text).filter(|s| !s.is_empty());

        let title = card
            .select(&TITLE_SEL)
            .next()
            .map(element_text)
            .filter(|s| !s.is_empty());

        let release_date = card.select(&CARD_META_SEL).next().and_then(|meta| {
            let text = meta.text().collect::<Vec<_>>().join(" ");
            RELEASE_DATE_RE.find(&text).map(|m| m.as_str().to_string())
        });

        let studio = card
            .select(&STUDIO_SEL)
            .next()
            .map(element_text)
            .filter(|s| !s.is_empty());

        hits.push(SearchHit {
            dvd_code,
            title,
            link,
            release_date,
            studio,
        });
    }

    hits
}

/// Pure selection step: zero hits fails, one hit auto-selects, more than
/// one defers to the picker.
pub fn select_hit<'a>(
    query: &str,
    hits: &'a [SearchHit],
    picker: &dyn CandidatePicker,
) -> Result<&'a SearchHit> {
    match hits.len() {
        0 => Err(Error::NotFound(query.to_string())),
        1 => Ok(&hits[0]),
        _ => {
            let idx = picker.pick(hits)?;
            hits.get(idx).ok_or_else(|| {
                Error::InvalidSelection(format!("{} is out of range 1-{}", idx + 1, hits.len()))
            })
        }
    }
}

/// Resolve a query or direct link to a detail-page URL.
/// One network request for queries, none for links.
pub async fn resolve(
    client: &reqwest::Client,
    config: &SiteConfig,
    target: &Target,
    picker: &dyn CandidatePicker,
) -> Result<String> {
    match target {
        Target::Link(link) => Ok(link.clone()),
        Target::Query(query) => {
            let url = search_url(config, query);
            info!(target: "javmeta::search", query = %query, "Searching");
            let body = http::fetch_text(client, &url).await?;
            let hits = parse_search(&body, config);
            debug!(target: "javmeta::search", hits = hits.len(), "Parsed search results");
            let hit = select_hit(query, &hits, picker)?;
            Ok(hit.link.clone())
        }
    }
}

fn element_text(el: scraper::ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn absolutize(href: &str, config: &SiteConfig) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            href.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPicker(usize);

    impl CandidatePicker for FixedPicker {
        fn pick(&self, _hits: &[SearchHit]) -> Result<usize> {
            Ok(self.0)
        }
    }

    struct RefusingPicker;

    impl CandidatePicker for RefusingPicker {
        fn pick(&self, _hits: &[SearchHit]) -> Result<usize> {
            Err(Error::InvalidSelection("'x' is not a number".to_string()))
        }
    }

    const SEARCH_PAGE: &str = r#"
        <html><body>
          <div class="card h-100 borderlesscard">
            <p class="display-6 pcard"><a href="/movies/sone00763/">SONE-763</a></p>
            <div class="mt-auto">
              <a href="/movies/sone00763/">A longer descriptive title</a>
              released 2025-06-10
            </div>
            <span class="btn btn-primary"><a href="/studios/s1/">S1 NO.1 STYLE</a></span>
          </div>
          <div class="card borderlesscard">
            <p class="pcard"><a href="https://www.javdatabase.com/movies/sone00999/">SONE-999</a></p>
            <div class="mt-auto"><a href="/movies/sone00999/">Another title</a></div>
          </div>
          <div class="card borderlesscard">
            <p class="pcard">no link here</p>
          </div>
        </body></html>"#;

    fn config() -> crate::config::SiteConfig {
        crate::config::SiteConfig::default()
    }

    #[test]
    fn parses_result_cards_in_order() {
        let hits = parse_search(SEARCH_PAGE, &config());
        assert_eq!(hits.len(), 2);

        assert_eq!(hits[0].dvd_code.as_deref(), Some("SONE-763"));
        assert_eq!(hits[0].title.as_deref(), Some("A longer descriptive title"));
        assert_eq!(
            hits[0].link,
            "https://www.javdatabase.com/movies/sone00763/"
        );
        assert_eq!(hits[0].release_date.as_deref(), Some("2025-06-10"));
        assert_eq!(hits[0].studio.as_deref(), Some("S1 NO.1 STYLE"));

        // absolute hrefs pass through, missing card bits stay None
        assert_eq!(
            hits[1].link,
            "https://www.javdatabase.com/movies/sone00999/"
        );
        assert_eq!(hits[1].studio, None);
        assert_eq!(hits[1].release_date, None);
    }

    #[test]
    fn zero_hits_is_not_found() {
        let err = select_hit("SONE-1", &[], &FixedPicker(0)).unwrap_err();
        assert!(matches!(err, Error::NotFound(q) if q == "SONE-1"));
    }

    #[test]
    fn single_hit_skips_the_picker() {
        let hits = parse_search(SEARCH_PAGE, &config());
        let single = &hits[..1];
        // RefusingPicker would fail if consulted
        let hit = select_hit("SONE-763", single, &RefusingPicker).unwrap();
        assert_eq!(hit.dvd_code.as_deref(), Some("SONE-763"));
    }

    #[test]
    fn multiple_hits_use_the_picker() {
        let hits = parse_search(SEARCH_PAGE, &config());
        let hit = select_hit("SONE", &hits, &FixedPicker(1)).unwrap();
        assert_eq!(hit.dvd_code.as_deref(), Some("SONE-999"));
    }

    #[test]
    fn bad_pick_is_invalid_selection() {
        let hits = parse_search(SEARCH_PAGE, &config());
        let err = select_hit("SONE", &hits, &RefusingPicker).unwrap_err();
        assert!(matches!(err, Error::InvalidSelection(_)));

        let err = select_hit("SONE", &hits, &FixedPicker(7)).unwrap_err();
        assert!(matches!(err, Error::InvalidSelection(_)));
    }

    #[test]
    fn search_url_encodes_the_query() {
        let url = search_url(&config(), "SONE 763");
        assert_eq!(
            url,
            "https://www.javdatabase.com/?post_type=movies%2Cuncensored&s=SONE%20763"
        );
    }
}
