//! Probe types for OGC Web Services (OWS).
//!
//! A GetCapabilities round trip is the canonical liveness signal for an
//! OWS endpoint: cheap for the server, and the response advertises the
//! service name, so checks can verify the right service answered.

use async_trait::async_trait;

use crate::probe::{Probe, ProbeSpec, RequestMethod};

const XML_ACCEPT: &[(&str, &str)] = &[("Accept", "text/xml, application/xml")];

static WMS_GET_CAPABILITIES: ProbeSpec = ProbeSpec {
    name: "WMS GetCapabilities",
    description: "GetCapabilities request against a Web Map Service",
    resource_type: "OGC:WMS",
    method: RequestMethod::Get,
    request_template: "SERVICE=WMS&VERSION={version}&REQUEST=GetCapabilities",
    request_headers: XML_ACCEPT,
    param_defaults: &[("version", "1.3.0")],
};

#[derive(Debug, Default)]
pub struct WmsGetCapabilities;

#[async_trait]
impl Probe for WmsGetCapabilities {
    fn spec(&self) -> &ProbeSpec {
        &WMS_GET_CAPABILITIES
    }
}

static WFS_GET_CAPABILITIES: ProbeSpec = ProbeSpec {
    name: "WFS GetCapabilities",
    description: "GetCapabilities request against a Web Feature Service",
    resource_type: "OGC:WFS",
    method: RequestMethod::Get,
    request_template: "SERVICE=WFS&VERSION={version}&REQUEST=GetCapabilities",
    request_headers: XML_ACCEPT,
    param_defaults: &[("version", "2.0.0")],
};

#[derive(Debug, Default)]
pub struct WfsGetCapabilities;

#[async_trait]
impl Probe for WfsGetCapabilities {
    fn spec(&self) -> &ProbeSpec {
        &WFS_GET_CAPABILITIES
    }
}
