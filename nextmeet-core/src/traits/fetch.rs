//! Text fetch trait

use core::future::Future;

use crate::error::FetchError;

/// HTTP-style GET over the board's network link
///
/// Fetches block the caller until they complete or fail; there is no
/// timeout beyond what the transport provides.
pub trait Fetcher {
    /// GET `url` and copy the response body into `buf`
    ///
    /// Returns the number of body bytes written.
    fn fetch(
        &mut self,
        url: &str,
        buf: &mut [u8],
    ) -> impl Future<Output = Result<usize, FetchError>>;

    /// Re-establish the network link after a failure
    fn reconnect(&mut self) -> impl Future<Output = Result<(), FetchError>>;
}

/// GET `url` and view the body as UTF-8 text
pub async fn fetch_text<'b, F: Fetcher>(
    fetcher: &mut F,
    url: &str,
    buf: &'b mut [u8],
) -> Result<&'b str, FetchError> {
    let len = fetcher.fetch(url, buf).await?;
    let body = buf.get(..len).ok_or(FetchError::BufferTooSmall)?;
    core::str::from_utf8(body).map_err(|_| FetchError::InvalidUtf8)
}
