//! Downloads images, following HTML pages to the image they describe.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, COOKIE, HeaderValue, LOCATION, REFERER, SET_COOKIE};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use url::Url;

use crate::domain::entities::{MediaType, accept_header};
use crate::domain::errors::{FetchImageError, HttpError};
use crate::domain::ports::{HttpPort, HttpRequest, HttpResponse};

const DEFAULT_SELECTORS: [&str; 14] = [
    r#"meta[name="sataniabot_image" i]"#,
    r#"meta[property="sataniabot_image" i]"#,
    r#"meta[name="twitter:image" i]"#,
    r#"meta[property="og:image:secure_url" i]"#,
    r#"meta[property="og:image:url" i]"#,
    r#"meta[property="og:image" i]"#,
    r#"meta[property="twitter:image" i]"#,
    r#"meta[name="og:image:secure_url" i]"#,
    r#"meta[name="og:image:url" i]"#,
    r#"meta[name="og:image" i]"#,
    r#"link[rel="image_src" i]"#,
    "body > img:only-child",
    ".ProfileAvatar-container",
    ".postContainer.opContainer .fileThumb",
];

fn default_attributes() -> Vec<String> {
    ["content", "href", "src"].map(String::from).to_vec()
}

/// Where to look for an image URL in an HTML page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionRule {
    /// CSS selector of candidate elements.
    pub selector: String,
    /// Attributes holding the URL, first present wins.
    #[serde(default = "default_attributes")]
    pub attributes: Vec<String>,
}

impl ExtractionRule {
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            attributes: default_attributes(),
        }
    }
}

/// Tuning of a fetch chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchOptions {
    /// Total requests one chain may make.
    pub max_fetch: u32,
    /// Redirects followed per request; they do not count against `max_fetch`.
    pub max_redirects: u32,
    /// Fail with `ImageExpected` instead of reading HTML pages.
    pub expect_image: bool,
    /// Extraction rules, highest priority first.
    pub rules: Vec<ExtractionRule>,
    /// Formats returned as images; anything else is read as a page.
    pub accepted: Vec<MediaType>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_fetch: 4,
            max_redirects: 10,
            expect_image: false,
            rules: DEFAULT_SELECTORS.into_iter().map(ExtractionRule::new).collect(),
            accepted: MediaType::ALL.to_vec(),
        }
    }
}

struct CompiledRule {
    selector: Selector,
    attributes: Vec<String>,
}

/// Outcome of one step, with the budget left for the rest of the chain.
type Step = (u32, Result<Bytes, FetchImageError>);

/// Image fetcher over an [`HttpPort`].
pub struct ImageFetcher {
    http: Arc<dyn HttpPort>,
    options: FetchOptions,
    rules: Vec<CompiledRule>,
    accept: HeaderValue,
}

impl ImageFetcher {
    /// Creates a fetcher; rules whose selector does not parse are skipped.
    #[must_use]
    pub fn new(http: Arc<dyn HttpPort>, options: FetchOptions) -> Self {
        let rules = options
            .rules
            .iter()
            .filter_map(|rule| match Selector::parse(&rule.selector) {
                Ok(selector) => Some(CompiledRule {
                    selector,
                    attributes: rule.attributes.clone(),
                }),
                Err(e) => {
                    warn!(selector = %rule.selector, error = %e, "Skipping invalid selector");
                    None
                }
            })
            .collect();
        let accept = HeaderValue::from_str(&accept_header(&options.accepted))
            .unwrap_or_else(|_| HeaderValue::from_static("*/*"));

        Self {
            http,
            options,
            rules,
            accept,
        }
    }

    /// Fetches an image from `url`.
    ///
    /// # Errors
    ///
    /// See [`ImageFetcher::fetch_first`].
    pub async fn fetch(&self, url: &str) -> Result<Bytes, FetchImageError> {
        self.fetch_first([url]).await
    }

    /// Fetches the first image any of `urls` leads to.
    ///
    /// The URLs share one request budget and a fresh cookie jar.
    ///
    /// # Errors
    ///
    /// Returns the first error met along the chain, or `NoImagesFound` when
    /// every page was read without finding an image.
    pub async fn fetch_first<I, S>(&self, urls: I) -> Result<Bytes, FetchImageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let jar = Jar::default();
        self.fetch_first_with_jar(urls, &jar).await
    }

    /// Like [`ImageFetcher::fetch_first`], reusing a caller's cookie jar.
    ///
    /// # Errors
    ///
    /// See [`ImageFetcher::fetch_first`].
    pub async fn fetch_first_with_jar<I, S>(
        &self,
        urls: I,
        jar: &Jar,
    ) -> Result<Bytes, FetchImageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut invalid = None;
        let urls: Vec<Url> = urls
            .into_iter()
            .filter_map(|url| {
                let url = url.as_ref();
                Url::parse(url)
                    .inspect_err(|_| {
                        invalid.get_or_insert_with(|| HttpError::invalid_url(url));
                    })
                    .ok()
            })
            .collect();

        let (budget, result) = self
            .fetch_any(urls, None, self.options.max_fetch, jar)
            .await;
        debug!(
            used = self.options.max_fetch - budget,
            ok = result.is_ok(),
            "Fetch chain finished"
        );

        match (result, invalid) {
            (Err(FetchImageError::NoImagesFound), Some(invalid)) => Err(invalid.into()),
            (result, _) => result,
        }
    }

    /// Tries `urls` in order until one yields an image or the budget runs out.
    fn fetch_any<'s>(
        &'s self,
        urls: Vec<Url>,
        referer: Option<Url>,
        budget: u32,
        jar: &'s Jar,
    ) -> BoxFuture<'s, Step> {
        Box::pin(async move {
            let mut budget = budget;
            let mut first_error = None;

            for url in urls {
                if budget == 0 {
                    debug!(url = %url, "Fetch budget exhausted");
                    break;
                }

                let (left, result) = self
                    .fetch_single(url.clone(), referer.as_ref(), budget - 1, jar)
                    .await;
                budget = left;

                match result {
                    Ok(bytes) => return (budget, Ok(bytes)),
                    Err(e) => {
                        debug!(url = %url, error = %e, "Candidate failed");
                        first_error.get_or_insert(e);
                    }
                }
            }

            (
                budget,
                Err(first_error.unwrap_or(FetchImageError::NoImagesFound)),
            )
        })
    }

    async fn fetch_single(
        &self,
        url: Url,
        referer: Option<&Url>,
        budget: u32,
        jar: &Jar,
    ) -> Step {
        debug!(url = %url, budget, "Fetching");

        let response = match self.get(url, referer, jar).await {
            Ok(response) => response,
            Err(e) => return (budget, Err(e.into())),
        };

        if !response.is_ok() {
            return (
                budget,
                Err(FetchImageError::NotOk {
                    status: response.status,
                }),
            );
        }

        match MediaType::sniff(&response.body) {
            Some(media) if self.options.accepted.contains(&media) => {
                debug!(url = %response.url, media = %media, bytes = response.body.len(), "Found image");
                return (budget, Ok(response.body));
            }
            Some(media) => debug!(url = %response.url, media = %media, "Format not accepted"),
            None => {}
        }

        if self.options.expect_image {
            return (budget, Err(FetchImageError::ImageExpected));
        }

        let links = self.find_images(&response.body, &response.url);
        trace!(page = %response.url, links = links.len(), "Following page");

        self.fetch_any(links, Some(response.url), budget, jar).await
    }

    /// GET with the chain's cookies, following redirects hop by hop so
    /// every hop's `Set-Cookie` lands in the jar.
    async fn get(
        &self,
        url: Url,
        referer: Option<&Url>,
        jar: &Jar,
    ) -> Result<HttpResponse, HttpError> {
        let mut url = url;

        for _ in 0..=self.options.max_redirects {
            let mut request = HttpRequest::new(url).with_header(ACCEPT, self.accept.clone());

            if let Some(value) = referer.and_then(|page| HeaderValue::from_str(page.as_str()).ok())
            {
                request = request.with_header(REFERER, value);
            }
            if let Some(cookies) = jar.cookies(&request.url) {
                request = request.with_header(COOKIE, cookies);
            }

            let response = self.http.get(request).await?;
            let mut set_cookies = response.headers.get_all(SET_COOKIE).iter();
            jar.set_cookies(&mut set_cookies, &response.url);

            match redirect_target(&response) {
                Some(next) => {
                    trace!(from = %response.url, to = %next, "Following redirect");
                    url = next;
                }
                None => return Ok(response),
            }
        }

        Err(HttpError::redirect(format!(
            "more than {} redirects",
            self.options.max_redirects
        )))
    }

    /// Image URLs an HTML page points at, by rule priority, without repeats.
    fn find_images(&self, body: &[u8], base: &Url) -> Vec<Url> {
        let text = String::from_utf8_lossy(body);
        let document = Html::parse_document(&text);
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for rule in &self.rules {
            for element in document.select(&rule.selector) {
                let element = element.value();
                let Some(href) = rule
                    .attributes
                    .iter()
                    .find_map(|attribute| element.attr(attribute))
                else {
                    continue;
                };

                match base.join(href.trim()) {
                    Ok(url) if seen.insert(url.clone()) => found.push(url),
                    Ok(_) => {}
                    Err(e) => trace!(href, error = %e, "Skipping unparseable image URL"),
                }
            }
        }

        found
    }
}

fn redirect_target(response: &HttpResponse) -> Option<Url> {
    if !matches!(response.status, 301 | 302 | 303 | 307 | 308) {
        return None;
    }

    let location = response.headers.get(LOCATION)?.to_str().ok()?;
    response.url.join(location.trim()).ok()
}

impl std::fmt::Debug for ImageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFetcher")
            .field("options", &self.options)
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}
