use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not compile {what} pattern: {source}")]
    Pattern {
        what: &'static str,
        #[source]
        source: regex::Error,
    },
}
