//! 客户端 IP 处理
//!
//! - 真实客户端 IP 解析（可信代理 / 私有地址自动检测）
//! - 加盐哈希，点击记录只保存哈希值

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::debug;
use xxhash_rust::xxh64::xxh64;

use crate::config::get_config;

/// 无法确定客户端地址时使用的占位值
pub const UNKNOWN_IP: &str = "unknown";

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

/// 解析 "ip" 或 "ip:port"
fn parse_peer(ip: &str) -> Option<IpAddr> {
    ip.parse::<SocketAddr>()
        .map(|s| s.ip())
        .or_else(|_| ip.parse::<IpAddr>())
        .ok()
}

/// 检查 IP 是否在可信代理列表中（支持单 IP 与 CIDR）
pub fn is_trusted_proxy(ip: &str, trusted_proxies: &[String]) -> bool {
    let Some(ip_addr) = parse_peer(ip) else {
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
    let Ok(prefix_len) = prefix_len.parse::<u32>() else {
        return false;
    };
    let Ok(network_addr) = network.parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) if prefix_len <= 32 => {
            let mask = u32::MAX.checked_shl(32 - prefix_len).unwrap_or(0);
            (u32::from(*ip) & mask) == (u32::from(net) & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) if prefix_len <= 128 => {
            let mask = u128::MAX.checked_shl(128 - prefix_len).unwrap_or(0);
            (u128::from(*ip) & mask) == (u128::from(net) & mask)
        }
        _ => false,
    }
}

/// 从请求头提取转发的 IP（X-Forwarded-For 第一个，其次 X-Real-IP）
pub fn forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// 解析真实客户端 IP
///
/// 1. 配置了 trusted_proxies：仅当 peer 命中时采用转发头
/// 2. 未配置：peer 为私有地址/localhost 时视为反向代理，采用转发头
/// 3. 否则使用 peer 地址
///
/// 都拿不到时返回 `unknown`。
pub fn resolve_client_ip(
    peer: Option<&str>,
    forwarded: Option<String>,
    trusted_proxies: &[String],
) -> String {
    let Some(peer) = peer else {
        return forwarded.unwrap_or_else(|| UNKNOWN_IP.to_string());
    };

    let peer_ip = parse_peer(peer)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| peer.to_string());

    let behind_proxy = if trusted_proxies.is_empty() {
        parse_peer(peer).is_some_and(|ip| is_private_or_local(&ip))
    } else {
        is_trusted_proxy(peer, trusted_proxies)
    };

    match forwarded {
        Some(real_ip) if behind_proxy => {
            debug!("Client IP via proxy {}: {}", peer_ip, real_ip);
            real_ip
        }
        _ => peer_ip,
    }
}

/// 从 HttpRequest 提取真实客户端 IP
pub fn extract_client_ip(req: &HttpRequest) -> String {
    let config = get_config();
    let conn_info = req.connection_info();
    resolve_client_ip(
        conn_info.peer_addr(),
        forwarded_ip_from_headers(req.headers()),
        &config.auth.trusted_proxies,
    )
}

/// 对 IP 加盐哈希，输出 16 位小写十六进制
pub fn hash_ip(ip: &str, salt: &str) -> String {
    format!("{:016x}", xxh64(format!("{}:{}", salt, ip).as_bytes(), 0))
}
