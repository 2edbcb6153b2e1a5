use async_trait::async_trait;
use chrono::Utc;
use framework::exception;
use framework::exception::CoreRsResult;
use framework::http::HeaderName;
use framework::http::HttpClient;
use framework::http::HttpMethod::DELETE;
use framework::http::HttpRequest;
use framework::http::HttpResponse;
use framework::http::header;
use tracing::Instrument;
use tracing::debug;
use tracing::debug_span;

use crate::file_share::shared_key::SharedKey;

mod shared_key;

const API_VERSION: &str = "2023-11-03";

/// Directory within a share, `path` is relative to the share root and empty for the root itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareDirectory {
    path: String,
}

impl ShareDirectory {
    pub fn file(&self, name: &str) -> ShareFile {
        ShareFile {
            directory: self.path.clone(),
            name: name.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareFile {
    directory: String,
    name: String,
}

impl ShareFile {
    pub fn path(&self) -> String {
        if self.directory.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.directory, self.name)
        }
    }
}

#[async_trait]
pub trait FileShare: Send + Sync {
    fn directory(&self, path: &str) -> ShareDirectory {
        ShareDirectory {
            path: path.trim_matches('/').to_owned(),
        }
    }

    /// Returns whether the file existed, deleting an absent file is not an error.
    async fn delete_if_exists(&self, file: &ShareFile) -> CoreRsResult<bool>;
}

pub struct AzureFileShare {
    endpoint: String,
    share: String,
    key: SharedKey,
    client: HttpClient,
}

impl AzureFileShare {
    pub fn new(account: &str, account_key: &str, share: &str) -> CoreRsResult<Self> {
        Ok(Self {
            endpoint: format!("https://{account}.file.core.windows.net"),
            share: share.to_owned(),
            key: SharedKey::new(account, account_key)?,
            client: HttpClient::default(),
        })
    }

    fn url_path(&self, file: &ShareFile) -> String {
        let mut path = format!("/{}", urlencoding::encode(&self.share));
        for segment in file.path().split('/').filter(|segment| !segment.is_empty()) {
            path.push('/');
            path.push_str(&urlencoding::encode(segment));
        }
        path
    }
}

#[async_trait]
impl FileShare for AzureFileShare {
    async fn delete_if_exists(&self, file: &ShareFile) -> CoreRsResult<bool> {
        let span = debug_span!("file_share", file = file.path());
        async {
            let url_path = self.url_path(file);
            let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
            let ms_headers = [("x-ms-date", date.as_str()), ("x-ms-version", API_VERSION)];
            let authorization = self.key.authorization(DELETE, &ms_headers, &url_path)?;

            let mut request = HttpRequest::new(DELETE, format!("{}{url_path}", self.endpoint));
            for (name, value) in ms_headers {
                request.header(HeaderName::from_static(name), value);
            }
            request.header(header::AUTHORIZATION, authorization);
            let response = self.client.execute(request).await?;
            delete_result(&response, file)
        }
        .instrument(span)
        .await
    }
}

fn delete_result(response: &HttpResponse, file: &ShareFile) -> CoreRsResult<bool> {
    let error_code = response.header("x-ms-error-code");
    debug!(status = response.status, error_code, "delete file");
    match (response.status, error_code) {
        (200..=299, _) => Ok(true),
        (404, Some("ResourceNotFound" | "ParentNotFound")) => Ok(false),
        (status, error_code) => Err(exception!(
            message = format!(
                "failed to delete file, path={}, status={status}, error_code={}",
                file.path(),
                error_code.unwrap_or("unknown")
            )
        )),
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use framework::http::HeaderName;
    use framework::http::HttpResponse;

    use super::AzureFileShare;
    use super::FileShare;
    use super::delete_result;

    fn response(status: u16, error_code: Option<&str>) -> HttpResponse {
        let mut headers = HashMap::new();
        if let Some(error_code) = error_code {
            headers.insert(HeaderName::from_static("x-ms-error-code"), error_code.to_owned());
        }
        HttpResponse {
            status,
            headers,
            body: String::new(),
        }
    }

    fn share() -> AzureFileShare {
        AzureFileShare::new("acct", "c2VjcmV0", "my share").unwrap()
    }

    #[test]
    fn directory_handle() {
        let share = share();
        assert_eq!(share.directory("").file("a.txt").path(), "a.txt");
        assert_eq!(share.directory("/dirA/dirB/").file("a.txt").path(), "dirA/dirB/a.txt");
    }

    #[test]
    fn url_path_is_encoded() {
        let share = share();
        let file = share.directory("Docs Q3").file("report final.txt");
        assert_eq!(share.url_path(&file), "/my%20share/Docs%20Q3/report%20final.txt");

        let file = share.directory("").file("x.txt");
        assert_eq!(share.url_path(&file), "/my%20share/x.txt");
    }

    #[test]
    fn classify_delete_response() {
        let file = share().directory("a").file("x.txt");

        assert!(delete_result(&response(202, None), &file).unwrap());
        assert!(!delete_result(&response(404, Some("ResourceNotFound")), &file).unwrap());
        assert!(!delete_result(&response(404, Some("ParentNotFound")), &file).unwrap());

        let error = delete_result(&response(404, Some("ShareNotFound")), &file).unwrap_err();
        assert!(error.message.contains("error_code=ShareNotFound"));
        let error = delete_result(&response(403, Some("AuthenticationFailed")), &file).unwrap_err();
        assert!(error.message.contains("path=a/x.txt, status=403"));
    }

    #[test]
    fn account_key_must_be_base64() {
        assert!(AzureFileShare::new("acct", "not base64!", "share").is_err());
    }
}
