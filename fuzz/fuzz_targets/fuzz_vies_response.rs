#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use vatcheck::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use vatcheck::{ValidatorOptions, Validator};

struct Echo(String);

impl HttpTransport for Echo {
    fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse::new(200, self.0.clone()))
    }
}

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let v = Validator::new(Arc::new(Echo(s.to_string())));
        let _ = v.validate_exists("BE0472429986", &ValidatorOptions::new());
    }
});
