use std::fmt::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use framework::exception;
use framework::exception::CoreRsResult;
use framework::http::HttpMethod;
use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;

/// Storage account Shared Key credential, signs requests for the Authorization header.
pub(super) struct SharedKey {
    account: String,
    key: Vec<u8>,
}

impl SharedKey {
    pub(super) fn new(account: &str, account_key: &str) -> CoreRsResult<Self> {
        let key = STANDARD.decode(account_key.trim()).map_err(|err| {
            exception!(
                message = format!("account key must be base64, account={account}"),
                source = err
            )
        })?;
        Ok(Self {
            account: account.to_owned(),
            key,
        })
    }

    pub(super) fn authorization(
        &self,
        method: HttpMethod,
        ms_headers: &[(&str, &str)],
        url_path: &str,
    ) -> CoreRsResult<String> {
        let value = string_to_sign(method, ms_headers, &self.account, url_path);
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .map_err(|err| exception!(message = format!("invalid account key, error={err}")))?;
        mac.update(value.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());
        Ok(format!("SharedKey {}:{signature}", self.account))
    }
}

// requests here carry no body and no standard headers,
// so all 11 standard header lines after the verb stay empty
fn string_to_sign(method: HttpMethod, ms_headers: &[(&str, &str)], account: &str, url_path: &str) -> String {
    let mut value = String::new();
    value.push_str(method.as_str());
    value.push_str(&"\n".repeat(12));

    let mut headers: Vec<(String, &str)> = ms_headers
        .iter()
        .map(|(name, header_value)| (name.to_ascii_lowercase(), header_value.trim()))
        .collect();
    headers.sort_by(|(a, _), (b, _)| a.cmp(b));
    for (name, header_value) in headers {
        writeln!(value, "{name}:{header_value}").unwrap();
    }

    write!(value, "/{account}{url_path}").unwrap();
    value
}

#[cfg(test)]
mod tests {
    use framework::http::HttpMethod;

    use super::SharedKey;
    use super::string_to_sign;

    #[test]
    fn string_to_sign_layout() {
        let value = string_to_sign(
            HttpMethod::DELETE,
            &[
                ("x-ms-version", "2023-11-03"),
                ("x-ms-date", "Fri, 16 Oct 2026 08:00:00 GMT"),
            ],
            "acct",
            "/myshare/a/x.txt",
        );

        assert_eq!(
            value,
            "DELETE\n\n\n\n\n\n\n\n\n\n\n\nx-ms-date:Fri, 16 Oct 2026 08:00:00 GMT\nx-ms-version:2023-11-03\n/acct/myshare/a/x.txt"
        );
    }

    #[test]
    fn authorization_header() {
        let key = SharedKey::new("acct", "c2VjcmV0").unwrap();
        let headers = [("x-ms-date", "Fri, 16 Oct 2026 08:00:00 GMT"), ("x-ms-version", "2023-11-03")];

        let authorization = key.authorization(HttpMethod::DELETE, &headers, "/myshare/x.txt").unwrap();
        let signature = authorization.strip_prefix("SharedKey acct:").unwrap();
        // base64 of a 32 byte HMAC-SHA256 digest
        assert_eq!(signature.len(), 44);
        assert_eq!(
            key.authorization(HttpMethod::DELETE, &headers, "/myshare/x.txt").unwrap(),
            authorization
        );
        assert_ne!(
            key.authorization(HttpMethod::DELETE, &headers, "/myshare/y.txt").unwrap(),
            authorization
        );
    }
}
