use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

pub const FILE_ID_PREFIX: &str = "files/";

/// Longest file name the Files API issues after the `files/` prefix.
const MAX_FILE_NAME_LEN: usize = 40;

/// Remote files expire on their own this long after upload.
pub const REMOTE_FILE_TTL_HOURS: i64 = 48;

/// Reference to a document held by the remote file service.
///
/// Only the `id` crosses request boundaries; every later use re-resolves the
/// handle by id instead of carrying this value around.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFileHandle {
    pub id: String,
    pub display_name: String,
    pub media_type: String,
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl RemoteFileHandle {
    pub fn new_pdf(id: impl Into<String>, display_name: impl Into<String>, uri: impl Into<String>) -> Self {
        RemoteFileHandle {
            id: id.into(),
            display_name: display_name.into(),
            media_type: PDF_MEDIA_TYPE.to_string(),
            uri: uri.into(),
            expires_at: Some(Utc::now() + Duration::hours(REMOTE_FILE_TTL_HOURS)),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Whether `id` is a Files API resource name: `files/` followed by lowercase
/// alphanumerics or dashes, not starting or ending with a dash.
///
/// Anything else is another kind of resource, or a path, and must not be
/// used to build a request URL.
pub fn is_file_resource_id(id: &str) -> bool {
    id.strip_prefix(FILE_ID_PREFIX).is_some_and(|name| {
        !name.is_empty()
            && name.len() <= MAX_FILE_NAME_LEN
            && !name.starts_with('-')
            && !name.ends_with('-')
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    })
}
