use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadEvent {
    pub resource_uri: String,
}

// "operationName" must precede "uri" within the record, and "." does not cross a line break,
// so one log line is the lookahead window
static DOWNLOAD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)"operationName":\s*"GetFile".*?"uri":\s*"([^"]+)""#).unwrap());

/// Lazily yields a download event for every `GetFile` record in `log_text`, in document order.
pub fn extract_download_events(log_text: &str) -> DownloadEvents<'_> {
    DownloadEvents {
        log_text,
        position: 0,
    }
}

pub struct DownloadEvents<'a> {
    log_text: &'a str,
    position: usize,
}

impl Iterator for DownloadEvents<'_> {
    type Item = DownloadEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let captures = DOWNLOAD_REGEX.captures_at(self.log_text, self.position)?;
        let matched = captures.get(0)?;
        self.position = matched.end();
        let uri = captures.get(1)?;
        Some(DownloadEvent {
            resource_uri: uri.as_str().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::DownloadEvent;
    use super::extract_download_events;

    fn uris(log_text: &str) -> Vec<String> {
        extract_download_events(log_text)
            .map(|event| event.resource_uri)
            .collect()
    }

    #[test]
    fn extract_in_document_order() {
        let log_text = r#"{"time": "2026-10-16T08:00:01Z", "operationName": "GetFile", "statusCode": 200, "uri": "https://acct.file.core.windows.net/myshare/a/x.txt"}
{"time": "2026-10-16T08:00:02Z", "operationName": "ListFiles", "uri": "https://acct.file.core.windows.net/myshare/a?restype=directory"}
{"time": "2026-10-16T08:00:03Z", "operationName": "GetFile", "uri": "https://acct.file.core.windows.net/myshare/b/y.txt"}
{"time": "2026-10-16T08:00:04Z", "operationName":"GetFile","uri":"https://acct.file.core.windows.net/myshare/z.txt"}"#;

        assert_eq!(
            uris(log_text),
            vec![
                "https://acct.file.core.windows.net/myshare/a/x.txt",
                "https://acct.file.core.windows.net/myshare/b/y.txt",
                "https://acct.file.core.windows.net/myshare/z.txt",
            ]
        );
    }

    #[test]
    fn concatenated_records_on_one_line() {
        let log_text = r#"{"operationName": "GetFile", "uri": "https://h/s/1.txt"}{"operationName": "GetFile", "uri": "https://h/s/2.txt"}"#;

        assert_eq!(uris(log_text), vec!["https://h/s/1.txt", "https://h/s/2.txt"]);
    }

    #[test]
    fn match_is_case_insensitive() {
        let log_text = r#"{"OperationName": "getfile", "URI": "https://h/s/report.pdf"}"#;

        assert_eq!(
            extract_download_events(log_text).collect::<Vec<_>>(),
            vec![DownloadEvent {
                resource_uri: "https://h/s/report.pdf".to_owned()
            }]
        );
    }

    #[test]
    fn no_match() {
        assert_eq!(extract_download_events("").count(), 0);
        assert_eq!(
            extract_download_events(r#"{"operationName": "PutRange", "uri": "https://h/s/a.txt"}"#).count(),
            0
        );
        assert_eq!(extract_download_events("not a log at all").count(), 0);
    }

    #[test]
    fn uri_before_operation_name_is_not_matched() {
        let log_text = r#"{"uri": "https://h/s/a.txt", "operationName": "GetFile"}"#;

        assert_eq!(extract_download_events(log_text).count(), 0);
    }

    #[test]
    fn record_does_not_borrow_uri_from_next_line() {
        let log_text = "{\"operationName\": \"GetFile\", \"statusCode\": 404}\n{\"operationName\": \"GetFileProperties\", \"uri\": \"https://h/s/a.txt\"}";

        assert_eq!(extract_download_events(log_text).count(), 0);
    }

    #[test]
    fn duplicates_are_kept() {
        let record = r#"{"operationName": "GetFile", "uri": "https://h/s/a.txt"}"#;
        let log_text = format!("{record}\n{record}");

        assert_eq!(uris(&log_text), vec!["https://h/s/a.txt", "https://h/s/a.txt"]);
    }
}
