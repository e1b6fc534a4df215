//! URL origin and domain extraction for feed requests.

/// Extracts the scheme+host origin from a feed URL, sent as `Referer`.
///
/// Given `"https://www.scheel-mann.com/products/vario-f.js"`, returns
/// `"https://www.scheel-mann.com"`.
#[must_use]
pub fn extract_store_origin(feed_url: &str) -> String {
    reqwest::Url::parse(feed_url).map_or_else(
        |_| {
            feed_url
                .trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/")
        },
        |u| u.origin().ascii_serialization(),
    )
}

/// Hostname of a feed URL for error messages; the full string if it does not parse.
pub(super) fn extract_domain(feed_url: &str) -> String {
    reqwest::Url::parse(feed_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| feed_url.to_owned())
}
