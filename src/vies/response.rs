//! Interpretation of raw `checkVat` responses.
//!
//! VIES has no structured error codes: outages and bad input only show up as
//! marker strings inside a SOAP fault. Markers are scanned for on the raw body
//! first, and only then is the body parsed as a `checkVatResponse`.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::{LookupResult, UnavailableCause, VatError};

const INVALID_INPUT: &str = "INVALID_INPUT";
const UNAVAILABLE_MARKERS: &[&str] = &["MS_UNAVAILABLE", "MS_MAX_CONCURRENT_REQ"];

/// Map a response body to a lookup result.
///
/// Returns the result whatever its `valid` flag; the caller decides what an
/// invalid number means.
pub(crate) fn interpret(body: &str) -> Result<LookupResult, VatError> {
    if body.contains(INVALID_INPUT) {
        return Err(VatError::format(INVALID_INPUT));
    }
    if let Some(marker) = UNAVAILABLE_MARKERS.iter().find(|m| body.contains(*m)) {
        return Err(UnavailableCause::MemberStateUnavailable((*marker).into()).into());
    }
    parse_check_vat_response(body).map_err(VatError::from)
}

#[derive(Default)]
struct Parsed {
    seen_envelope: bool,
    seen_response: bool,
    fault: Option<String>,
    country_code: Option<String>,
    vat_number: Option<String>,
    request_date: Option<String>,
    valid: Option<String>,
    name: Option<String>,
    address: Option<String>,
}

impl Parsed {
    fn handle_text(&mut self, path: &[String], text: &str) {
        match path {
            [env, body, resp, field] if env == "Envelope" && body == "Body" && resp == "checkVatResponse" => {
                let slot = match field.as_str() {
                    "countryCode" => &mut self.country_code,
                    "vatNumber" => &mut self.vat_number,
                    "requestDate" => &mut self.request_date,
                    "valid" => &mut self.valid,
                    "name" => &mut self.name,
                    "address" => &mut self.address,
                    _ => return,
                };
                slot.get_or_insert_with(String::new).push_str(text);
            }
            [.., fault, leaf] if fault == "Fault" && leaf == "faultstring" => {
                self.fault.get_or_insert_with(String::new).push_str(text);
            }
            _ => {}
        }
    }

    fn into_result(self) -> Result<LookupResult, UnavailableCause> {
        if !self.seen_envelope {
            return Err(malformed("missing SOAP Envelope"));
        }
        if !self.seen_response {
            return Err(match self.fault {
                Some(fault) => UnavailableCause::Fault(fault),
                None => malformed("missing checkVatResponse"),
            });
        }
        let valid = match self.valid.as_deref().map(str::trim) {
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => return Err(malformed(&format!("invalid boolean '{other}'"))),
            None => return Err(malformed("missing valid flag")),
        };
        Ok(LookupResult {
            valid,
            country_code: self.country_code.unwrap_or_default(),
            number: self.vat_number.unwrap_or_default(),
            request_date: self.request_date.unwrap_or_default(),
            name: self.name.filter(|n| is_disclosed(n)),
            address: self.address.filter(|a| is_disclosed(a)),
        })
    }
}

/// VIES sends `---` when a member state withholds trader details.
fn is_disclosed(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty() && v != "---"
}

fn malformed(reason: &str) -> UnavailableCause {
    UnavailableCause::MalformedResponse(reason.to_string())
}

fn parse_check_vat_response(xml: &str) -> Result<LookupResult, UnavailableCause> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut p = Parsed::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = std::str::from_utf8(e.local_name().as_ref())
                    .unwrap_or("")
                    .to_string();
                match (path.len(), name.as_str()) {
                    (0, "Envelope") => p.seen_envelope = true,
                    (2, "checkVatResponse") if path[1] == "Body" => p.seen_response = true,
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| malformed(&format!("XML parse error: {e}")))?;
                if !text.is_empty() {
                    p.handle_text(&path, &text);
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                p.handle_text(&path, &text);
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(&format!("XML parse error: {e}"))),
            _ => {}
        }
    }

    p.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"<env:Envelope xmlns:env="http://schemas.xmlsoap.org/soap/envelope/"><env:Header/><env:Body><ns2:checkVatResponse xmlns:ns2="urn:ec.europa.eu:taxud:vies:services:checkVat:types"><ns2:countryCode>BE</ns2:countryCode><ns2:vatNumber>0472429986</ns2:vatNumber><ns2:requestDate>2024-06-15+02:00</ns2:requestDate><ns2:valid>true</ns2:valid><ns2:name>NV ACME &amp; CO</ns2:name><ns2:address>RUE 1
1000 BRUXELLES</ns2:address></ns2:checkVatResponse></env:Body></env:Envelope>"#;

    #[test]
    fn parses_prefixed_response() {
        let r = interpret(VALID).unwrap();
        assert!(r.valid);
        assert_eq!(r.country_code, "BE");
        assert_eq!(r.number, "0472429986");
        assert_eq!(r.request_date, "2024-06-15+02:00");
        assert_eq!(r.name.as_deref(), Some("NV ACME & CO"));
        assert_eq!(r.address.as_deref(), Some("RUE 1\n1000 BRUXELLES"));
    }

    #[test]
    fn invalid_input_wins_over_everything() {
        let body = format!("{VALID}<!-- INVALID_INPUT MS_UNAVAILABLE -->");
        assert!(matches!(interpret(&body), Err(VatError::Format { .. })));
    }

    #[test]
    fn max_concurrent_is_unavailable() {
        let body = "<soap:Fault><faultstring>MS_MAX_CONCURRENT_REQ</faultstring></soap:Fault>";
        match interpret(body) {
            Err(VatError::ServiceUnavailable(UnavailableCause::MemberStateUnavailable(m))) => {
                assert_eq!(m, "MS_MAX_CONCURRENT_REQ")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn other_fault_is_reported() {
        let body = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><soap:Fault><faultcode>soap:Server</faultcode><faultstring>TIMEOUT</faultstring></soap:Fault></soap:Body></soap:Envelope>"#;
        match interpret(body) {
            Err(VatError::ServiceUnavailable(UnavailableCause::Fault(f))) => assert_eq!(f, "TIMEOUT"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn garbage_is_malformed() {
        for body in ["", "not xml at all", "<html><body>502 Bad Gateway</body></html>", "<Envelope><Body>"] {
            assert!(
                matches!(
                    interpret(body),
                    Err(VatError::ServiceUnavailable(UnavailableCause::MalformedResponse(_)))
                ),
                "body {body:?}"
            );
        }
    }

    #[test]
    fn dashes_become_none() {
        let body = VALID
            .replace("NV ACME &amp; CO", "---")
            .replace("RUE 1\n1000 BRUXELLES", "---");
        let r = interpret(&body).unwrap();
        assert!(r.name.is_none());
        assert!(r.address.is_none());
    }

    #[test]
    fn bad_boolean_is_malformed() {
        let body = VALID.replace("<ns2:valid>true", "<ns2:valid>maybe");
        assert!(matches!(
            interpret(&body),
            Err(VatError::ServiceUnavailable(UnavailableCause::MalformedResponse(_)))
        ));
    }
}
