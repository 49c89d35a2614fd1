//! Built-in probe types.

pub mod http;
pub mod ows;

use crate::registry::Registry;

/// Register every built-in probe type under its dotted identifier.
pub fn register_builtins(registry: &mut Registry) {
    registry.register_probe::<http::HttpGet>("http.get");
    registry.register_probe::<http::HttpPost>("http.post");
    registry.register_probe::<ows::WmsGetCapabilities>("ows.wms_get_capabilities");
    registry.register_probe::<ows::WfsGetCapabilities>("ows.wfs_get_capabilities");
}
