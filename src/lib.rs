#![warn(warnings)]
#![deny(clippy::all)]

//! Typed access layer for a note-taking domain kept in a generic document
//! store: a folder tree, a flat tag namespace and notes referencing both.

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod folder;
pub mod index;
pub mod note;
pub mod pathname;
pub mod storage;
pub mod tag;

pub use client::NoteClient;
pub use config::{ClientConfig, StorageConfig};
pub use document::{DocumentMap, FolderData, FolderProps, NoteData, NoteProps, TagData, TagProps};
pub use error::{ClientError, ClientResult, StorageError, StorageResult};
pub use storage::{OpendalStore, StorageClient};
