//! Outbound URL checks for image downloads
//!
//! Image URLs come straight from the request body, so before fetching we make sure
//! the target is a public http(s) host:
//! - host literal checks (private ranges, loopback, internal names)
//! - optional host allow-list (exact host or any subdomain)
//! - DNS resolution with every resolved address checked as well
//!
//! [`PublicOnlyResolver`] repeats the address check inside the HTTP client, so the
//! addresses it connects to (redirect hops included) are the ones that were checked.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::Url;
use tokio::net::lookup_host;

/// Check a parsed URL before any request is sent.
pub async fn validate_remote_url(
    url: &Url,
    allow_private: bool,
    allowlist: Option<&[String]>,
) -> Result<(), String> {
    let host = check_url_target(url, allow_private, allowlist)?;

    if allow_private {
        return Ok(());
    }

    let port = url.port_or_known_default().unwrap_or(80);
    match lookup_host((host.as_str(), port)).await {
        Ok(addrs) => {
            for addr in addrs {
                if is_private_ip(&addr.ip()) {
                    return Err(format!("{} resolves to internal address {}", host, addr.ip()));
                }
            }
        }
        Err(e) => {
            // The request itself will fail on an unresolvable host
            tracing::warn!(host = %host, error = %e, "Failed to resolve image host");
        }
    }

    Ok(())
}

/// Synchronous part of the check, also applied to every redirect hop.
///
/// Returns the normalized host on success.
pub fn check_url_target(
    url: &Url,
    allow_private: bool,
    allowlist: Option<&[String]>,
) -> Result<String, String> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("scheme '{}' is not allowed", url.scheme()));
    }

    let host = url
        .host_str()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_lowercase())
        .filter(|h| !h.is_empty())
        .ok_or_else(|| "URL has no host".to_string())?;

    if let Some(allowed) = allowlist {
        if !host_is_allowed(&host, allowed) {
            return Err(format!("host '{}' is not in the allow-list", host));
        }
    }

    if allow_private {
        return Ok(host);
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(format!("internal address {} is not allowed", ip));
        }
    } else if is_internal_hostname(&host) {
        return Err(format!("internal host '{}' is not allowed", host));
    }

    Ok(host)
}

/// DNS resolver for the image client that refuses internal addresses
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicOnlyResolver;

impl Resolve for PublicOnlyResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let addrs: Addrs = Box::new(resolve_public(name.as_str()).await?.into_iter());
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(addrs)
        })
    }
}

/// Resolve `host` and fail if any address is internal.
///
/// The port is left at 0; the client fills in the one from the URL.
pub async fn resolve_public(host: &str) -> io::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = lookup_host((host, 0)).await?.collect();

    if let Some(addr) = addrs.iter().find(|a| is_private_ip(&a.ip())) {
        tracing::warn!(host = %host, address = %addr.ip(), "Refusing to connect to internal address");
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("{} resolves to internal address {}", host, addr.ip()),
        ));
    }
    if addrs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} did not resolve", host),
        ));
    }

    Ok(addrs)
}

fn host_is_allowed(host: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|entry| {
        let entry = entry.trim().to_lowercase();
        !entry.is_empty() && (host == entry || host.ends_with(&format!(".{}", entry)))
    })
}

fn is_internal_hostname(host: &str) -> bool {
    host == "localhost"
        || host.ends_with(".localhost")
        || host.ends_with(".local")
        || host.ends_with(".internal")
        || host.contains(".internal.")
        || host.ends_with(".corp")
}

/// Loopback, private, link-local, multicast, unspecified and unique-local ranges
pub fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_private_v4(&v4),
            None => is_private_v6(v6),
        },
    }
}

fn is_private_v4(ip: &Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_multicast()
        || ip.is_broadcast()
        || a == 0
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (64..=127).contains(&b))
}

fn is_private_v6(ip: &Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        || first & 0xffc0 == 0xfe80
        || first & 0xfe00 == 0xfc00
}
