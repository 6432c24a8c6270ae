//! Model layer
//!
//! Plain data types shared by the connection layer and the export pipeline.

pub mod resource_kind;

pub use resource_kind::{
    POD_KIND, RawResource, RawResourceList, ResourceKindDescriptor, split_group_version,
};
