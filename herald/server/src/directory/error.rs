use snafu::Snafu;

/// Errors raised by the directory clients. Resolvers hand these to callers
/// unchanged; only the web boundary maps them onto HTTP statuses.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to build HTTP client: {source}"))]
    BuildClient { source: reqwest::Error },

    #[snafu(display("Request to `{url}` failed: {source}"))]
    Request { url: String, source: reqwest::Error },

    #[snafu(display("`{url}` answered with unexpected status {status}"))]
    UnexpectedStatus { url: String, status: u16 },

    #[snafu(display("Failed to decode response from `{url}`: {source}"))]
    DecodeResponse { url: String, source: reqwest::Error },
}
