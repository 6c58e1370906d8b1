//! SSRF protection for user-supplied URLs.
//!
//! [`is_blocked_target`] rejects URLs by scheme and literal host.
//! [`PublicResolver`] covers names that only reveal a private address once
//! resolved, for the first request and every redirect alike.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use url::{Host, Url};

/// Check if a URL targets a potentially dangerous resource.
pub fn is_blocked_target(url: &Url) -> bool {
    // Block non-HTTP schemes
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    match url.host() {
        Some(Host::Ipv4(v4)) => is_private_ip(&IpAddr::V4(v4)),
        Some(Host::Ipv6(v6)) => is_private_ip(&IpAddr::V6(v6)),
        Some(Host::Domain(host)) => {
            let host = host.trim_end_matches('.').to_ascii_lowercase();
            host == "localhost"
                || host.ends_with(".localhost")
                || host.ends_with(".local")
                || host.ends_with(".internal")
        }
        None => true,
    }
}

/// DNS resolver that refuses names resolving to any private or reserved address.
#[derive(Debug, Default, Clone, Copy)]
pub struct PublicResolver;

impl Resolve for PublicResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let resolved = tokio::net::lookup_host((name.as_str(), 0)).await?;
            let public = public_addrs(name.as_str(), resolved)?;
            let addrs: Addrs = Box::new(public.into_iter());
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(addrs)
        })
    }
}

/// All of `addrs`, provided none is private. An empty set is refused too.
fn public_addrs(
    host: &str,
    addrs: impl IntoIterator<Item = SocketAddr>,
) -> Result<Vec<SocketAddr>, String> {
    let addrs: Vec<SocketAddr> = addrs.into_iter().collect();
    if addrs.is_empty() {
        return Err(format!("{host} did not resolve to any address"));
    }
    if let Some(private) = addrs.iter().find(|a| is_private_ip(&a.ip())) {
        tracing::warn!(host, addr = %private.ip(), "SSRF protection: name resolves to private address");
        return Err(format!("{host} resolves to private address {}", private.ip()));
    }
    Ok(addrs)
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_private_v4(&mapped);
            }
            is_private_v6(v6)
        }
    }
}

fn is_private_v4(v4: &Ipv4Addr) -> bool {
    let octets = v4.octets();
    v4.is_loopback()
        || v4.is_private()
        || v4.is_link_local()
        || v4.is_broadcast()
        || v4.is_unspecified()
        // 100.64.0.0/10 (Carrier-grade NAT)
        || (octets[0] == 100 && (octets[1] & 0xC0) == 64)
        // 192.0.0.0/24
        || (octets[0] == 192 && octets[1] == 0 && octets[2] == 0)
}

fn is_private_v6(v6: &Ipv6Addr) -> bool {
    let first = v6.segments()[0];
    v6.is_loopback()
        || v6.is_unspecified()
        // fc00::/7 (unique local)
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 (link local)
        || (first & 0xffc0) == 0xfe80
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocked(url: &str) -> bool {
        is_blocked_target(&Url::parse(url).unwrap())
    }

    #[test]
    fn blocks_non_http_schemes() {
        assert!(blocked("file:///etc/passwd"));
        assert!(blocked("ftp://example.com/file"));
    }

    #[test]
    fn blocks_private_ipv4() {
        assert!(blocked("http://192.168.1.1/admin"));
        assert!(blocked("http://10.0.0.1/"));
        assert!(blocked("http://127.0.0.1:8080/"));
        assert!(blocked("http://169.254.169.254/latest/meta-data"));
        assert!(blocked("http://100.64.1.1/"));
    }

    #[test]
    fn blocks_private_ipv6() {
        assert!(blocked("http://[::1]:3000/"));
        assert!(blocked("http://[fd00::1]/"));
        assert!(blocked("http://[fe80::1]/"));
        assert!(blocked("http://[::ffff:127.0.0.1]/"));
    }

    #[test]
    fn blocks_local_hostnames() {
        assert!(blocked("http://localhost:3000/api"));
        assert!(blocked("http://localhost.:3000/api"));
        assert!(blocked("http://LOCALHOST/"));
        assert!(blocked("http://printer.local/"));
        assert!(blocked("http://metadata.google.internal/"));
    }

    #[test]
    fn allows_public_targets() {
        assert!(!blocked("https://example.com/page"));
        assert!(!blocked("http://93.184.216.34/"));
        assert!(!blocked("https://[2606:4700::1111]/"));
    }

    fn addr(s: &str) -> SocketAddr {
        SocketAddr::new(s.parse().unwrap(), 0)
    }

    #[test]
    fn public_addrs_require_every_address_public() {
        let ok = public_addrs("example.com", [addr("93.184.216.34")]).unwrap();
        assert_eq!(ok.len(), 1);

        let err = public_addrs("rebind.example", [addr("93.184.216.34"), addr("127.0.0.1")])
            .unwrap_err();
        assert!(err.contains("127.0.0.1"));

        assert!(public_addrs("v6.example", [addr("::1")]).is_err());
        assert!(public_addrs("nothing.example", []).is_err());
    }

    #[tokio::test]
    async fn resolver_refuses_names_pointing_at_loopback() {
        let name: Name = match "localhost".parse() {
            Ok(name) => name,
            Err(_) => panic!("localhost is a valid name"),
        };
        let result = PublicResolver.resolve(name).await;
        let err = result.err().expect("loopback name must be refused");
        assert!(err.to_string().contains("private"), "{err}");
    }
}
