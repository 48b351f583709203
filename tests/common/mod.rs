//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use vatcheck::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Fake transport that replays scripted replies in order and records every
/// request it receives.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(self: &Arc<Self>, status: u16, body: impl Into<String>) -> Arc<Self> {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
        self.clone()
    }

    pub fn fail(self: &Arc<Self>, err: TransportError) -> Arc<Self> {
        self.replies.lock().unwrap().push_back(Err(err));
        self.clone()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpTransport for FakeTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("no scripted reply".into())))
    }
}

/// A VIES `checkVatResponse` as sent by the live service.
pub fn vies_response(country: &str, number: &str, valid: bool) -> String {
    format!(
        r#"<env:Envelope xmlns:env="http://schemas.xmlsoap.org/soap/envelope/"><env:Header/><env:Body><ns2:checkVatResponse xmlns:ns2="urn:ec.europa.eu:taxud:vies:services:checkVat:types"><ns2:countryCode>{country}</ns2:countryCode><ns2:vatNumber>{number}</ns2:vatNumber><ns2:requestDate>2024-06-15+02:00</ns2:requestDate><ns2:valid>{valid}</ns2:valid><ns2:name>ACME NV</ns2:name><ns2:address>RUE DE LA LOI 1
1000 BRUXELLES</ns2:address></ns2:checkVatResponse></env:Body></env:Envelope>"#
    )
}

/// A VIES SOAP fault carrying `faultstring`.
pub fn vies_fault(faultstring: &str) -> String {
    format!(
        r#"<env:Envelope xmlns:env="http://schemas.xmlsoap.org/soap/envelope/"><env:Header/><env:Body><env:Fault><faultcode>env:Server</faultcode><faultstring>{faultstring}</faultstring></env:Fault></env:Body></env:Envelope>"#
    )
}

/// An HMRC OAuth token response.
pub fn token_response(token: &str, expires_in: i64) -> String {
    format!(
        r#"{{"access_token":"{token}","scope":"read:vat","expires_in":{expires_in},"token_type":"bearer"}}"#
    )
}

/// An HMRC lookup success body.
pub const HMRC_FOUND: &str = r#"{"target":{"name":"ACME LTD","vatNumber":"123456789","address":{"line1":"1 HIGH STREET","postcode":"SW1A 1AA","countryCode":"GB"}},"processingDate":"2024-06-15T10:00:00+01:00"}"#;
