//! Identifier derivation and syntax checks for folder pathnames and tag names.
//!
//! Folders, tags and notes share one id space in the store. Each id carries a
//! type prefix so the three kinds never collide and view selectors can filter
//! notes with a prefix test.

use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

pub const FOLDER_ID_PREFIX: &str = "folder:";
pub const TAG_ID_PREFIX: &str = "tag:";
pub const NOTE_ID_PREFIX: &str = "note:";
pub const DESIGN_ID_PREFIX: &str = "_design/";

pub const ROOT_PATHNAME: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Folder,
    Tag,
    Note,
    Design,
}

static FOLDER_SEGMENT_FORBIDDEN: OnceLock<Regex> = OnceLock::new();
static TAG_NAME_FORBIDDEN: OnceLock<Regex> = OnceLock::new();

fn folder_segment_forbidden() -> &'static Regex {
    FOLDER_SEGMENT_FORBIDDEN.get_or_init(|| {
        Regex::new(r#"[\x00-\x1f\x7f\\:*?"<>|]"#).expect("folder segment pattern is valid")
    })
}

fn tag_name_forbidden() -> &'static Regex {
    TAG_NAME_FORBIDDEN
        .get_or_init(|| Regex::new(r"[\x00-\x1f\x7f/\\]").expect("tag name pattern is valid"))
}

pub fn folder_id(pathname: &str) -> String {
    format!("{}{}", FOLDER_ID_PREFIX, pathname)
}

pub fn tag_id(tag_name: &str) -> String {
    format!("{}{}", TAG_ID_PREFIX, tag_name)
}

pub fn generate_note_id() -> String {
    format!("{}{}", NOTE_ID_PREFIX, Uuid::new_v4().simple())
}

pub fn document_kind(id: &str) -> Option<DocumentKind> {
    if id.starts_with(FOLDER_ID_PREFIX) {
        Some(DocumentKind::Folder)
    } else if id.starts_with(TAG_ID_PREFIX) {
        Some(DocumentKind::Tag)
    } else if id.starts_with(NOTE_ID_PREFIX) {
        Some(DocumentKind::Note)
    } else if id.starts_with(DESIGN_ID_PREFIX) {
        Some(DocumentKind::Design)
    } else {
        None
    }
}

/// `/` alone, or `/`-separated non-empty segments with no trailing slash.
pub fn is_folder_pathname_valid(pathname: &str) -> bool {
    if pathname == ROOT_PATHNAME {
        return true;
    }
    let Some(rest) = pathname.strip_prefix('/') else {
        return false;
    };
    rest.split('/').all(|segment| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && !folder_segment_forbidden().is_match(segment)
    })
}

pub fn is_tag_name_valid(tag_name: &str) -> bool {
    !tag_name.trim().is_empty() && !tag_name_forbidden().is_match(tag_name)
}

/// Parent of a valid pathname; `None` for the root.
pub fn parent_folder_pathname(pathname: &str) -> Option<String> {
    if pathname == ROOT_PATHNAME {
        return None;
    }
    match pathname.rfind('/') {
        Some(0) => Some(ROOT_PATHNAME.to_string()),
        Some(idx) => Some(pathname[..idx].to_string()),
        None => None,
    }
}
