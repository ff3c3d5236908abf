use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    ("Referrer-Policy", "strict-origin-when-cross-origin"),
    (
        "Content-Security-Policy",
        "default-src 'self'; img-src 'self' data:",
    ),
    ("Permissions-Policy", "geolocation=(), microphone=()"),
];

/// Attach baseline security headers to every response
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        if let (Ok(header_name), Ok(header_value)) =
            (HeaderName::try_from(*name), HeaderValue::try_from(*value))
        {
            headers.insert(header_name, header_value);
        }
    }

    response
}
