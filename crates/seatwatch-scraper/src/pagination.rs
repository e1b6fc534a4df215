//! Storefront listing pagination via the `Link` response header.
//!
//! Shopify storefronts advertise adjacent pages in the `Link` header of each
//! `/products.json` response. The full next URL is followed as-is, so both
//! `page=N` and cursor (`page_info=...`) stores work.
//!
//! ## Header format
//!
//! Single next link:
//! ```text
//! <https://shop.com/products.json?limit=250&page_info=CURSOR>; rel="next"
//! ```
//!
//! Combined previous and next:
//! ```text
//! <https://shop.com/products.json?limit=250&page_info=PREV>; rel="previous",
//! <https://shop.com/products.json?limit=250&page_info=NEXT>; rel="next"
//! ```

/// Returns the URL of the `rel="next"` link, if any.
#[must_use]
pub fn next_page_url(link_header: Option<&str>) -> Option<String> {
    let header = link_header?;

    header
        .split(',')
        .map(str::trim)
        .find(|segment| is_next(segment))
        .and_then(extract_angle_bracket_url)
        .map(str::to_owned)
}

fn is_next(segment: &str) -> bool {
    segment
        .split(';')
        .skip(1)
        .map(str::trim)
        .any(|param| param == r#"rel="next""# || param == "rel=next")
}

/// Extracts the URL between `<` and `>` in a link directive segment.
fn extract_angle_bracket_url(segment: &str) -> Option<&str> {
    let start = segment.find('<')? + 1;
    let end = segment.find('>')?;
    if start >= end {
        return None;
    }
    Some(&segment[start..end])
}
