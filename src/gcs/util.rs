use crate::error::{ApiError, BoxError};
use anyhow::Context as _;
use reqwest::blocking::{Body, Client, Response};
use tame_gcs::{self as tgcs, http};

/// Converts a vanilla `http::Request` into a `reqwest::blocking::Request`. The
/// body is streamed rather than buffered, so the request must declare its
/// content length.
pub(crate) fn convert_request<B>(
    req: http::Request<B>,
    client: &Client,
) -> anyhow::Result<reqwest::blocking::Request>
where
    B: std::io::Read + Send + 'static,
{
    let (parts, body) = req.into_parts();

    let uri = parts.uri.to_string();

    // Object inserts are the only requests built by tame-gcs
    let builder = match parts.method {
        http::Method::POST => client.post(&uri),
        method => anyhow::bail!("'{method}' not implemented"),
    };

    let content_len = tgcs::util::get_content_length(&parts.headers)
        .context("request has no content length")?;

    Ok(builder
        .headers(parts.headers)
        .body(Body::sized(body, content_len as u64))
        .build()?)
}

/// Converts a `reqwest::blocking::Response` into a vanilla `http::Response`,
/// copying the entire response body into a single buffer
pub(crate) fn convert_response(res: Response) -> anyhow::Result<http::Response<bytes::Bytes>> {
    let mut builder = http::Response::builder()
        .status(res.status())
        .version(res.version());

    let headers = builder
        .headers_mut()
        .context("failed to convert response headers")?;

    headers.extend(
        res.headers()
            .into_iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );

    let body = res.bytes().context("failed to receive body")?;

    Ok(builder.body(body)?)
}

/// Executes a GCS request and returns the parsed response/API error
pub(crate) fn execute<B, R>(client: &Client, req: http::Request<B>) -> Result<R, BoxError>
where
    R: tgcs::ApiResponse<bytes::Bytes>,
    B: std::io::Read + Send + 'static,
{
    let request = convert_request(req, client)?;
    log::debug!("{} {}", request.method(), request.url());

    let response = client.execute(request)?;
    let response = convert_response(response)?;

    let status = response.status();
    log::debug!("-> {status}");

    // Some failures, notably from the load balancer, aren't JSON
    if !status.is_success() {
        if let Some(ct) = response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|hv| hv.to_str().ok())
        {
            if ct.starts_with("text/plain") {
                return Err(ApiError {
                    status,
                    body: String::from_utf8_lossy(response.body()).into_owned(),
                }
                .into());
            }
        }
    }

    Ok(R::try_from_parts(response)?)
}

/// Maps a non-success JSON API response to an [`ApiError`]
pub(crate) fn check_status(res: Response) -> Result<Response, BoxError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res
        .text()
        .unwrap_or_else(|_| format!("failed to retrieve error for {status}"));
    Err(ApiError { status, body }.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: http::Method) -> http::Request<std::io::Cursor<Vec<u8>>> {
        http::Request::builder()
            .method(method)
            .uri("https://storage.googleapis.com/upload/storage/v1/b/my-bucket/o")
            .header(http::header::CONTENT_LENGTH, 2)
            .body(std::io::Cursor::new(b"hi".to_vec()))
            .unwrap()
    }

    #[test]
    fn converts_inserts() {
        let req = convert_request(request(http::Method::POST), &Client::new()).unwrap();
        assert_eq!(req.method(), reqwest::Method::POST);
    }

    #[test]
    fn rejects_other_methods() {
        let err = convert_request(request(http::Method::PUT), &Client::new()).unwrap_err();
        assert!(err.to_string().contains("'PUT' not implemented"), "{err}");
    }
}
