use framework::exception;
use framework::exception::CoreRsResult;
use framework::exception::Severity;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// `None` when the share name does not occur in the uri or nothing follows it, `Some("")` for the share root
    pub folder_path: Option<String>,
    pub file_name: String,
}

/// Maps a logged resource uri to a (folder, file) pair relative to the share root.
pub fn resolve(resource_uri: &str, share_name: &str) -> CoreRsResult<ResolvedFile> {
    Ok(ResolvedFile {
        folder_path: folder_path(resource_uri, share_name),
        file_name: file_name(resource_uri)?,
    })
}

fn file_name(resource_uri: &str) -> CoreRsResult<String> {
    let url = Url::parse(resource_uri).map_err(|err| {
        exception!(
            severity = Severity::Warn,
            message = format!("invalid resource uri, uri={resource_uri}"),
            source = err
        )
    })?;
    let path = unescape(url.path());
    Ok(path.rsplit('/').next().unwrap_or_default().to_owned())
}

fn folder_path(resource_uri: &str, share_name: &str) -> Option<String> {
    if share_name.is_empty() {
        return None;
    }
    // ascii lowercasing keeps byte offsets valid for `resource_uri`
    let index = resource_uri
        .to_ascii_lowercase()
        .find(&share_name.to_ascii_lowercase())?;
    let sub_path = resource_uri.get(index + share_name.len()..)?;
    let sub_path = sub_path.split(['?', '#']).next().unwrap_or_default();
    // uri ends at the share name, no file segment follows it
    let (folder, _) = sub_path.rsplit_once('/')?;
    Some(unescape(folder.strip_prefix('/').unwrap_or(folder)))
}

fn unescape(value: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(value.as_bytes())).into_owned()
}
