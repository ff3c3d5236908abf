use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::QuantaClock, middleware::NoOpMiddleware, state::keyed::DashMapStateStore, Quota,
    RateLimiter,
};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

/// Per-IP limiter guarding the login route against credential stuffing.
pub struct IpRateLimiter {
    limiter: RateLimiter<IpAddr, DashMapStateStore<IpAddr>, QuantaClock, NoOpMiddleware>,
}

impl IpRateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        let burst = NonZeroU32::new(requests_per_minute)
            .unwrap_or_else(|| NonZeroU32::new(10).unwrap());
        let quota = Quota::with_period(Duration::from_secs(60))
            .unwrap()
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    pub fn check_ip(&self, ip: IpAddr) -> bool {
        self.limiter.check_key(&ip).is_ok()
    }
}

/// Extract client IP from proxy headers
fn extract_client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                    return Some(ip);
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            if let Ok(ip) = ip_str.parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }

    None
}

/// Proxy headers first, then the peer address of the connection. Only a
/// request with neither (e.g. an in-process test client) lands in the
/// shared localhost bucket.
fn client_ip(request: &Request) -> IpAddr {
    extract_client_ip(request.headers())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// IP-based rate limiting middleware
pub async fn ip_rate_limit_middleware(
    State(ip_limiter): State<Arc<IpRateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let client_ip = client_ip(&request);

    if ip_limiter.check_ip(client_ip) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Rate limit exceeded for IP: {}", client_ip);
        Err(StatusCode::TOO_MANY_REQUESTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_rate_limiter() {
        let limiter = IpRateLimiter::new(2);

        let ip1: IpAddr = "192.168.1.1".parse().unwrap();
        let ip2: IpAddr = "192.168.1.2".parse().unwrap();

        assert!(limiter.check_ip(ip1));
        assert!(limiter.check_ip(ip1));
        assert!(!limiter.check_ip(ip1));

        // A different IP has its own budget
        assert!(limiter.check_ip(ip2));
        assert!(limiter.check_ip(ip2));
        assert!(!limiter.check_ip(ip2));
    }

    #[test]
    fn test_extract_client_ip() {
        let mut headers = HeaderMap::new();

        headers.insert("x-forwarded-for", "192.168.1.1, 10.0.0.1".parse().unwrap());
        assert_eq!(
            extract_client_ip(&headers),
            Some("192.168.1.1".parse().unwrap())
        );

        headers.clear();
        headers.insert("x-real-ip", "192.168.1.2".parse().unwrap());
        assert_eq!(
            extract_client_ip(&headers),
            Some("192.168.1.2".parse().unwrap())
        );

        headers.clear();
        assert_eq!(extract_client_ip(&headers), None);
    }

    #[test]
    fn test_client_ip_falls_back_to_peer_address() {
        let mut request = Request::builder()
            .uri("/api/auth/login")
            .body(axum::body::Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([203, 0, 113, 9], 41234))));

        assert_eq!(client_ip(&request), "203.0.113.9".parse::<IpAddr>().unwrap());

        // A proxy header wins over the peer address
        request
            .headers_mut()
            .insert("x-forwarded-for", "198.51.100.2".parse().unwrap());
        assert_eq!(client_ip(&request), "198.51.100.2".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_client_ip_without_any_source_is_localhost() {
        let request = Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request), IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
}
