//! Plain HTTP probe types, usable against any resource.

use async_trait::async_trait;

use crate::probe::{Probe, ProbeSpec, RequestMethod};

static HTTP_GET: ProbeSpec = ProbeSpec {
    name: "HTTP GET",
    description: "Plain GET of the resource URL",
    resource_type: "*",
    method: RequestMethod::Get,
    request_template: "",
    request_headers: &[],
    param_defaults: &[],
};

#[derive(Debug, Default)]
pub struct HttpGet;

#[async_trait]
impl Probe for HttpGet {
    fn spec(&self) -> &ProbeSpec {
        &HTTP_GET
    }
}

static HTTP_POST: ProbeSpec = ProbeSpec {
    name: "HTTP POST",
    description: "POST the configured body to the resource URL",
    resource_type: "*",
    method: RequestMethod::Post,
    request_template: "{body}",
    request_headers: &[],
    param_defaults: &[],
};

/// POST probe. The request body comes from the required `body` parameter.
#[derive(Debug, Default)]
pub struct HttpPost;

#[async_trait]
impl Probe for HttpPost {
    fn spec(&self) -> &ProbeSpec {
        &HTTP_POST
    }
}
