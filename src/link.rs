use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Everything that isn't the id: path prefixes, the query string and the type word.
static ID_NOISE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)(.+/)|(\?.*)|(playlist|track|album)").expect("valid regex"));

static TYPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(playlist|track|album)").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Track,
    Album,
    Playlist,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Track => "track",
            LinkKind::Album => "album",
            LinkKind::Playlist => "playlist",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLink {
    pub kind: LinkKind,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("No track, album or playlist found in link")]
    MissingType,
    #[error("No id found in link")]
    MissingId,
    #[error("`{0}` is not a valid Spotify id")]
    InvalidId(String),
}

/// First `track`/`album`/`playlist` word anywhere in the link, case-insensitive.
pub fn detect_kind(link: &str) -> Option<LinkKind> {
    let found = TYPE_REGEX.find(link)?;
    match found.as_str().to_ascii_lowercase().as_str() {
        "track" => Some(LinkKind::Track),
        "album" => Some(LinkKind::Album),
        "playlist" => Some(LinkKind::Playlist),
        _ => None,
    }
}

/// Whatever is left of the link once prefixes, query and type words are stripped.
pub fn extract_id(link: &str) -> String {
    ID_NOISE_REGEX.replace_all(link, "").into_owned()
}

/// Line shown under the link input, e.g. `TRACK - 4uLU6hMCjMI75M1A2tKUQC`.
///
/// Purely cosmetic: it never consults the backend, so it can disagree with
/// what the link actually resolves to.
pub fn detected_label(link: &str) -> String {
    let kind = detect_kind(link)
        .map(|kind| kind.as_str().to_ascii_uppercase())
        .unwrap_or_else(|| "Invalid type".to_string());
    let id = extract_id(link);
    let id = if id.is_empty() {
        "No ID found".to_string()
    } else {
        id
    };
    format!("{kind} - {id}")
}

/// Parse a web link (`https://open.spotify.com/album/...`) or URI (`spotify:album:...`).
pub fn parse_link(link: &str) -> Result<ParsedLink, LinkError> {
    let link = link.trim();

    if let Some(rest) = link.strip_prefix("spotify:") {
        let mut parts = rest.split(':');
        let kind = parts
            .next()
            .and_then(detect_kind)
            .ok_or(LinkError::MissingType)?;
        let id = parts.next().unwrap_or_default().to_string();
        return validate(kind, id);
    }

    let kind = detect_kind(link).ok_or(LinkError::MissingType)?;
    validate(kind, extract_id(link))
}

fn validate(kind: LinkKind, id: String) -> Result<ParsedLink, LinkError> {
    if id.is_empty() {
        return Err(LinkError::MissingId);
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(LinkError::InvalidId(id));
    }
    Ok(ParsedLink { kind, id })
}
