//! Gateway trust boundary.
//!
//! The gateway reverse proxy authenticates users itself and forwards their
//! identity as headers. Those headers may only be honoured when the request
//! provably came through the gateway. That decision is modelled as an
//! injected [`GatewayTrust`] predicate so it can be tested and replaced
//! independently of header naming.

use std::sync::Arc;

use axum::http::HeaderName;
use ipnetwork::IpNetwork;

use crate::config::{ConfigError, GatewayConfig};
use crate::credentials::{InboundRequest, parse_header_name};

/// Decides whether a request arrived through a trusted network hop.
pub trait GatewayTrust: Send + Sync {
    /// Returns `true` if gateway identity headers on this request may be honoured.
    fn is_trusted_hop(&self, request: &InboundRequest<'_>) -> bool;
}

/// Trusts requests carrying the gateway marker header set to `true`.
///
/// Only sound when the deployment guarantees untrusted clients cannot reach
/// the service without passing through the gateway, which strips the marker.
#[derive(Debug, Clone)]
pub struct MarkerHeaderTrust {
    marker_header: HeaderName,
}

impl MarkerHeaderTrust {
    /// Creates a marker-header predicate.
    #[must_use]
    pub fn new(marker_header: HeaderName) -> Self {
        Self { marker_header }
    }
}

impl GatewayTrust for MarkerHeaderTrust {
    fn is_trusted_hop(&self, request: &InboundRequest<'_>) -> bool {
        request
            .header_str(&self.marker_header)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// Trusts requests carrying the marker header that also come from a
/// configured gateway network.
#[derive(Debug, Clone)]
pub struct NetworkGatewayTrust {
    marker: MarkerHeaderTrust,
    networks: Vec<IpNetwork>,
}

impl NetworkGatewayTrust {
    /// Creates a network-restricted predicate.
    #[must_use]
    pub fn new(marker: MarkerHeaderTrust, networks: Vec<IpNetwork>) -> Self {
        Self { marker, networks }
    }
}

impl GatewayTrust for NetworkGatewayTrust {
    fn is_trusted_hop(&self, request: &InboundRequest<'_>) -> bool {
        if !self.marker.is_trusted_hop(request) {
            return false;
        }

        // Unknown peer cannot be placed inside a gateway network.
        let Some(peer) = request.peer_addr() else {
            return false;
        };

        let ip = peer.ip().to_canonical();
        self.networks.iter().any(|net| net.contains(ip))
    }
}

/// Never trusts gateway headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverTrust;

impl GatewayTrust for NeverTrust {
    fn is_trusted_hop(&self, _request: &InboundRequest<'_>) -> bool {
        false
    }
}

/// Builds the trust predicate described by the gateway configuration.
///
/// - gateway disabled: [`NeverTrust`]
/// - no trusted proxy networks: [`MarkerHeaderTrust`]
/// - otherwise: [`NetworkGatewayTrust`]
///
/// # Errors
///
/// Returns an error if the marker header name is invalid.
pub fn gateway_trust_from_config(
    config: &GatewayConfig,
) -> Result<Arc<dyn GatewayTrust>, ConfigError> {
    if !config.enabled {
        return Ok(Arc::new(NeverTrust));
    }

    let marker = MarkerHeaderTrust::new(parse_header_name(
        "gateway.marker_header",
        &config.marker_header,
    )?);

    if config.trusted_proxies.is_empty() {
        tracing::debug!("Gateway trust: marker header only");
        Ok(Arc::new(marker))
    } else {
        tracing::debug!(
            networks = config.trusted_proxies.len(),
            "Gateway trust: marker header from trusted networks"
        );
        Ok(Arc::new(NetworkGatewayTrust::new(
            marker,
            config.trusted_proxies.clone(),
        )))
    }
}
