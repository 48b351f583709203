use quick_xml::escape::escape;

use crate::core::VatNumber;

const TEMPLATE: &str = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
<soapenv:Header/>
<soapenv:Body>
  <checkVat xmlns="urn:ec.europa.eu:taxud:vies:services:checkVat:types">
    <countryCode>{countryCode}</countryCode>
    <vatNumber>{vatNumber}</vatNumber>
  </checkVat>
</soapenv:Body>
</soapenv:Envelope>"#;

/// Render the `checkVat` SOAP request for a number.
pub(crate) fn check_vat_envelope(number: &VatNumber) -> String {
    TEMPLATE
        .replacen("{countryCode}", &escape(number.prefix()), 1)
        .replacen("{vatNumber}", &escape(number.local_part()), 1)
}
