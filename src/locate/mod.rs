//! Repository location resolution.

mod location;
mod resolve;

pub use location::{LocationParts, PageLocation, RepoRef, ViewKind};
pub use resolve::{
    Locator, LocatorOptions, ShowIn, RESERVED_REPO_NAMES, RESERVED_USER_NAMES,
};
