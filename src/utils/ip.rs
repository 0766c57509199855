//! 客户端 IP 提取（限流标识）
//!
//! 支持：
//! - 可信代理配置（trusted_proxies，IP 或 CIDR）
//! - 私有 IP 自动检测（未配置可信代理时）

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::debug;

/// 无法确定客户端地址时使用的限流标识
pub const ANONYMOUS_CLIENT: &str = "anonymous";

/// 检查 IP 是否为私有地址或 localhost
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10
        }
    }
}

/// 解析 `ip` 或 `ip:port`
fn parse_ip(addr: &str) -> Option<IpAddr> {
    addr.parse::<SocketAddr>()
        .map(|s| s.ip())
        .or_else(|_| addr.parse::<IpAddr>())
        .ok()
}

/// 检查 IP 是否在可信代理列表中
pub fn is_trusted_proxy(ip: &str, trusted_proxies: &[String]) -> bool {
    let Some(ip_addr) = parse_ip(ip) else {
        return false;
    };

    trusted_proxies.iter().any(|proxy| {
        if proxy.contains('/') {
            ip_in_cidr(&ip_addr, proxy)
        } else {
            proxy.parse::<IpAddr>().is_ok_and(|p| p == ip_addr)
        }
    })
}

/// CIDR 检查
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };

    let Ok(prefix_len): Result<u8, _> = prefix_len.parse() else {
        return false;
    };

    let Ok(network_addr) = network.parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            if prefix_len > 32 {
                return false;
            }
            let mask = u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0);
            (u32::from_be_bytes(ip.octets()) & mask) == (u32::from_be_bytes(net.octets()) & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            if prefix_len > 128 {
                return false;
            }
            let mask = u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0);
            (u128::from_be_bytes(ip.octets()) & mask) == (u128::from_be_bytes(net.octets()) & mask)
        }
        _ => false, // IPv4 vs IPv6 不匹配
    }
}

/// 从请求头提取转发的 IP（X-Real-IP 优先，其次 X-Forwarded-For 第一个）
pub fn forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').next())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// 根据连接地址与转发头决定客户端 IP
///
/// 策略（按优先级）：
/// 1. 显式配置 trusted_proxies 且连接来自其中 → 使用转发头
/// 2. 显式配置但不匹配 → 使用连接 IP（防止伪造）
/// 3. 未配置且连接来自私有 IP → 假设有反向代理，使用转发头
/// 4. 默认 → 连接 IP
pub fn resolve_client_ip(
    peer_addr: Option<&str>,
    forwarded: Option<String>,
    trusted_proxies: &[String],
) -> Option<String> {
    let Some(peer) = peer_addr else {
        // 无连接信息（测试或特殊传输层），只能依赖转发头
        return forwarded;
    };
    let peer_ip = parse_ip(peer).map(|ip| ip.to_string()).unwrap_or_else(|| peer.to_string());

    if !trusted_proxies.is_empty() {
        if is_trusted_proxy(peer, trusted_proxies) {
            let real_ip = forwarded.unwrap_or_else(|| peer_ip.clone());
            debug!("Trusted proxy (explicit): {} -> {}", peer_ip, real_ip);
            return Some(real_ip);
        }
        return Some(peer_ip);
    }

    if parse_ip(peer).is_some_and(|ip| is_private_or_local(&ip))
        && let Some(real_ip) = forwarded
    {
        debug!("Auto-detect proxy (private IP {}): using {}", peer_ip, real_ip);
        return Some(real_ip);
    }

    Some(peer_ip)
}

/// 从 HttpRequest 提取限流标识
pub fn client_identifier(req: &HttpRequest, trusted_proxies: &[String]) -> String {
    let peer = req.peer_addr().map(|addr| addr.to_string());
    resolve_client_ip(
        peer.as_deref(),
        forwarded_ip_from_headers(req.headers()),
        trusted_proxies,
    )
    .unwrap_or_else(|| ANONYMOUS_CLIENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_is_private_or_local() {
        assert!(is_private_or_local(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"192.168.1.1".parse().unwrap()));
        assert!(is_private_or_local(&"127.0.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"::1".parse().unwrap()));
        assert!(is_private_or_local(&"fd00::1".parse().unwrap()));
        assert!(!is_private_or_local(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_or_local(&"2001:4860:4860::8888".parse().unwrap()));
    }

    #[test]
    fn test_ip_in_cidr() {
        let ip: IpAddr = "192.168.1.100".parse().unwrap();
        assert!(ip_in_cidr(&ip, "192.168.1.0/24"));
        assert!(!ip_in_cidr(&ip, "192.168.2.0/24"));
        assert!(!ip_in_cidr(&ip, "192.168.1.0/40"));
        let ip: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(ip_in_cidr(&ip, "2001:db8::/32"));
    }

    #[test]
    fn test_is_trusted_proxy() {
        let proxies = vec!["127.0.0.1".to_string(), "10.1.0.0/16".to_string()];
        assert!(is_trusted_proxy("127.0.0.1:8080", &proxies));
        assert!(is_trusted_proxy("10.1.2.3", &proxies));
        assert!(!is_trusted_proxy("8.8.8.8", &proxies));
        assert!(!is_trusted_proxy("garbage", &proxies));
    }

    #[test]
    fn test_resolve_client_ip_strategies() {
        let forwarded = || Some("203.0.113.9".to_string());

        // 公网直连：忽略转发头
        assert_eq!(
            resolve_client_ip(Some("198.51.100.1:443"), forwarded(), &[]),
            Some("198.51.100.1".to_string())
        );
        // 私有地址：自动识别代理
        assert_eq!(
            resolve_client_ip(Some("10.0.0.2:5000"), forwarded(), &[]),
            Some("203.0.113.9".to_string())
        );
        // 显式可信代理但不匹配
        let proxies = vec!["172.16.0.1".to_string()];
        assert_eq!(
            resolve_client_ip(Some("10.0.0.2:5000"), forwarded(), &proxies),
            Some("10.0.0.2".to_string())
        );
        // 无连接信息
        assert_eq!(resolve_client_ip(None, None, &[]), None);
    }

    #[test]
    fn test_header_preference() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", "203.0.113.1, 10.0.0.1"))
            .insert_header(("x-real-ip", "203.0.113.2"))
            .to_http_request();
        assert_eq!(
            forwarded_ip_from_headers(req.headers()),
            Some("203.0.113.2".to_string())
        );

        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", "203.0.113.1, 10.0.0.1"))
            .to_http_request();
        assert_eq!(
            forwarded_ip_from_headers(req.headers()),
            Some("203.0.113.1".to_string())
        );
    }

    #[test]
    fn test_client_identifier_fallback() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(client_identifier(&req, &[]), ANONYMOUS_CLIENT);
    }
}
