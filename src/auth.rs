use crate::error::{ApiError, BoxError, Error};
use tame_oauth::gcp::{self, TokenOrRequest, TokenProvider};

/// Sends the token request tame-oauth built for us and hands back the raw
/// response for it to parse
fn send_token_request(
    client: &reqwest::blocking::Client,
    request: http::Request<Vec<u8>>,
) -> Result<http::Response<bytes::Bytes>, BoxError> {
    let (parts, body) = request.into_parts();

    let res = client
        .request(parts.method, parts.uri.to_string())
        .headers(parts.headers)
        .body(body)
        .send()?;

    let status = res.status();

    let mut builder = http::Response::builder()
        .status(status)
        .version(res.version());

    let headers = builder
        .headers_mut()
        .ok_or("failed to convert response headers")?;

    headers.extend(
        res.headers()
            .into_iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );

    let buffer = res.bytes()?;

    if !status.is_success() {
        return Err(ApiError {
            status,
            body: String::from_utf8(buffer.into())
                .unwrap_or_else(|_| format!("failed to retrieve error for {status}")),
        }
        .into());
    }

    Ok(builder.body(buffer)?)
}

/// Gets a bearer token for the default credentials on the system, the gcloud
/// user credentials, `GOOGLE_APPLICATION_CREDENTIALS`, or the metadata server
pub fn bearer_token(scopes: &[&str]) -> Result<http::HeaderValue, Error> {
    let tp = gcp::TokenProviderWrapper::get_default_provider()
        .map_err(|e| Error::Auth(e.into()))?
        .ok_or_else(|| Error::Auth("unable to determine default credentials".into()))?;

    let token = match tp.get_token(scopes).map_err(|e| Error::Auth(e.into()))? {
        TokenOrRequest::Token(tok) => tok,
        TokenOrRequest::Request {
            request,
            scope_hash,
            ..
        } => {
            let client = crate::gcs::client_builder()
                .build()
                .map_err(|e| Error::Auth(e.into()))?;
            let response = send_token_request(&client, request).map_err(Error::Auth)?;

            tp.parse_token_response(scope_hash, response)
                .map_err(|e| Error::Auth(e.into()))?
        }
    };

    log::debug!("acquired bearer token for {scopes:?}");

    TryInto::<http::HeaderValue>::try_into(token).map_err(|e| Error::Auth(e.into()))
}
