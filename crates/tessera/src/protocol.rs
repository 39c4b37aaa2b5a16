//! DAG encoding protocol
//!
//! A node is written as a small constellation of blocks hanging off a root
//!  link set:
//!
//! ```text
//!                      root (link set)
//!          +-----------+-----+------+-----------+
//!          |           |            |           |
//!      metadata    skeleton     children    userland
//!                 (dirs only)  (dirs only)  (file bytes, or the
//!                                            directory's own links)
//! ```
//!
//! Every sub-block is referenced by CID only, so an unchanged sub-block is
//!  never re-encoded: writing a directory after touching one child reuses
//!  the blocks of all its siblings as-is. Whether blocks are encrypted is
//!  decided by the [`Blocks`] handle, never here.

use ipld_core::ipld::Ipld;
use serde::de::DeserializeOwned;

use crate::blocks::Blocks;
use crate::error::FsError;
use crate::link::{self, Link, Links};
use crate::linked_data::{BlockEncoded, Cid, DagCborCodec};
use crate::types::{
    check, Children, FileInfo, Metadata, NodeInfo, PutDetails, Skeleton, TreeInfo,
};

pub const METADATA: &str = "metadata";
pub const SKELETON: &str = "skeleton";
pub const CHILDREN: &str = "children";
pub const USERLAND: &str = "userland";

/// Where to look up a named header value: an already fetched
///  link set, or the CID of one
#[derive(Debug, Clone, Copy)]
pub enum HeaderSource<'a> {
    Links(&'a Links),
    Cid(&'a Cid),
}

impl<'a> From<&'a Links> for HeaderSource<'a> {
    fn from(links: &'a Links) -> Self {
        HeaderSource::Links(links)
    }
}

impl<'a> From<&'a Cid> for HeaderSource<'a> {
    fn from(cid: &'a Cid) -> Self {
        HeaderSource::Cid(cid)
    }
}

/// Write a link set as a single block
pub async fn put_links(blocks: &Blocks, links: &Links) -> Result<(Cid, u64), FsError> {
    blocks.put_encoded(links).await
}

/// Read back a link set written with [`put_links`]
pub async fn get_links(blocks: &Blocks, cid: &Cid) -> Result<Links, FsError> {
    blocks.get_decoded(cid).await
}

pub async fn put_and_make_link<T: BlockEncoded<DagCborCodec>>(
    blocks: &Blocks,
    name: &str,
    value: &T,
) -> Result<Link, FsError> {
    let (cid, size) = blocks.put_encoded(value).await?;
    Ok(link::make(name, cid, true, size))
}

pub async fn put_tree(
    blocks: &Blocks,
    links: &Links,
    skeleton: &Skeleton,
    children: &Children,
    metadata: &Metadata,
) -> Result<PutDetails, FsError> {
    // the root embeds the userland cid, so it has to land first
    let (userland_cid, userland_size) = put_links(blocks, links).await?;
    let userland = link::make(USERLAND, userland_cid, true, userland_size);

    let (metadata, skeleton, children) = tokio::try_join!(
        put_and_make_link(blocks, METADATA, metadata),
        put_and_make_link(blocks, SKELETON, skeleton),
        put_and_make_link(blocks, CHILDREN, children),
    )?;

    let details = put_root(blocks, userland, metadata, Some((skeleton, children))).await?;
    tracing::debug!("put tree {} ({} entries)", details.cid, links.len());
    Ok(details)
}

pub async fn put_file(
    blocks: &Blocks,
    content: &[u8],
    metadata: &Metadata,
) -> Result<PutDetails, FsError> {
    let (userland_cid, userland_size) = blocks.put_raw(content.to_vec()).await?;
    let userland = link::make(USERLAND, userland_cid, true, userland_size);
    let metadata = put_and_make_link(blocks, METADATA, metadata).await?;

    let details = put_root(blocks, userland, metadata, None).await?;
    tracing::debug!("put file {} ({} bytes)", details.cid, content.len());
    Ok(details)
}

async fn put_root(
    blocks: &Blocks,
    userland: Link,
    metadata: Link,
    dir: Option<(Link, Link)>,
) -> Result<PutDetails, FsError> {
    let userland_cid = userland.cid;
    let metadata_cid = metadata.cid;

    let mut internal = Links::new();
    internal.insert(USERLAND.to_string(), userland);
    internal.insert(METADATA.to_string(), metadata);
    if let Some((skeleton, children)) = dir {
        internal.insert(SKELETON.to_string(), skeleton);
        internal.insert(CHILDREN.to_string(), children);
    }

    let (cid, size) = put_links(blocks, &internal).await?;
    Ok(PutDetails {
        cid,
        userland: userland_cid,
        metadata: metadata_cid,
        size,
    })
}

/// Fetch and validate the header of the node rooted at `cid`
pub async fn get(blocks: &Blocks, cid: &Cid) -> Result<NodeInfo, FsError> {
    let links = get_links(blocks, cid).await?;
    let metadata: Metadata =
        get_required_value(blocks, (&links).into(), METADATA, check::is_metadata).await?;

    let dir = if !metadata.is_file {
        let (skeleton, children, size) = tokio::try_join!(
            get_required_value(blocks, (&links).into(), SKELETON, check::is_skeleton),
            get_required_value(blocks, (&links).into(), CHILDREN, check::is_children),
            blocks.size(cid),
        )?;
        Some((skeleton, children, size))
    } else {
        None
    };

    let userland = links
        .get(USERLAND)
        .map(|link| link.cid)
        .ok_or_else(|| FsError::MissingHeaderValue(USERLAND.to_string()))?;

    Ok(match dir {
        Some((skeleton, children, size)) => NodeInfo::Tree(TreeInfo {
            userland,
            metadata,
            skeleton,
            children,
            size,
        }),
        None => NodeInfo::File(FileInfo { userland, metadata }),
    })
}

/// Look up and decode a named sub-block.
///  `None` if the source has no link under `name`
pub async fn get_value(
    blocks: &Blocks,
    source: HeaderSource<'_>,
    name: &str,
) -> Result<Option<Ipld>, FsError> {
    let cid = match source {
        HeaderSource::Links(links) => links.get(name).map(|link| link.cid),
        HeaderSource::Cid(cid) => get_links(blocks, cid).await?.get(name).map(|link| link.cid),
    };
    match cid {
        Some(cid) => Ok(Some(blocks.get_decoded::<Ipld>(&cid).await?)),
        None => Ok(None),
    }
}

pub async fn get_and_check_value<T, F>(
    blocks: &Blocks,
    source: HeaderSource<'_>,
    name: &str,
    check_fn: F,
    can_be_null: bool,
) -> Result<Option<T>, FsError>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let value = get_value(blocks, source, name).await?;
    check_value(value, name, check_fn, can_be_null)
}

async fn get_required_value<T, F>(
    blocks: &Blocks,
    source: HeaderSource<'_>,
    name: &str,
    check_fn: F,
) -> Result<T, FsError>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    get_and_check_value(blocks, source, name, check_fn, false)
        .await?
        .ok_or_else(|| FsError::MissingHeaderValue(name.to_string()))
}

/// Validate a decoded header value.
///
/// An absent value (or an explicit null) is `Ok(None)` only when
///  `can_be_null` is set and a [`FsError::MissingHeaderValue`] otherwise.
///  A present value that does not have the shape of `T`, or that
///  `check_fn` rejects, is a [`FsError::MalformedHeaderValue`].
pub fn check_value<T, F>(
    value: Option<Ipld>,
    name: &str,
    check_fn: F,
    can_be_null: bool,
) -> Result<Option<T>, FsError>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let value = match value {
        None | Some(Ipld::Null) => {
            if can_be_null {
                return Ok(None);
            }
            return Err(FsError::MissingHeaderValue(name.to_string()));
        }
        Some(value) => value,
    };

    match ipld_core::serde::from_ipld::<T>(value) {
        Ok(typed) if check_fn(&typed) => Ok(Some(typed)),
        _ => Err(FsError::MalformedHeaderValue(name.to_string())),
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryBlockStore;
    use crate::types::SemVer;

    fn blocks() -> Blocks {
        Blocks::public(Arc::new(MemoryBlockStore::new()))
    }

    #[test]
    fn test_check_value_null_handling() {
        let absent: Result<Option<Metadata>, _> = check_value(None, "metadata", |_| true, true);
        assert!(matches!(absent, Ok(None)));

        let null: Result<Option<Metadata>, _> =
            check_value(Some(Ipld::Null), "metadata", |_| true, false);
        assert!(matches!(null, Err(FsError::MissingHeaderValue(name)) if name == "metadata"));
    }

    #[test]
    fn test_check_value_shape_and_predicate() {
        let wrong_shape: Result<Option<Metadata>, _> =
            check_value(Some(Ipld::Integer(3)), "metadata", |_| true, false);
        assert!(matches!(wrong_shape, Err(FsError::MalformedHeaderValue(_))));

        let metadata = Metadata::empty(true, SemVer::V1);
        let ipld = ipld_core::serde::to_ipld(&metadata).unwrap();
        let rejected: Result<Option<Metadata>, _> =
            check_value(Some(ipld.clone()), "metadata", |_| false, false);
        assert!(matches!(rejected, Err(FsError::MalformedHeaderValue(_))));

        let accepted: Option<Metadata> = check_value(Some(ipld), "metadata", |_| true, false).unwrap();
        assert_eq!(accepted, Some(metadata));
    }

    #[tokio::test]
    async fn test_get_value_by_links_or_cid() {
        let blocks = blocks();
        let metadata = Metadata::empty(false, SemVer::V1);
        let link = put_and_make_link(&blocks, METADATA, &metadata).await.unwrap();

        let mut links = Links::new();
        links.insert(METADATA.to_string(), link);
        let (cid, _) = put_links(&blocks, &links).await.unwrap();

        let by_links = get_value(&blocks, (&links).into(), METADATA).await.unwrap();
        let by_cid = get_value(&blocks, (&cid).into(), METADATA).await.unwrap();
        assert!(by_links.is_some());
        assert_eq!(by_links, by_cid);
        assert_eq!(get_value(&blocks, (&cid).into(), SKELETON).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_has_no_skeleton_or_children() {
        let blocks = blocks();
        let metadata = Metadata::empty(true, SemVer::V1);
        let details = put_file(&blocks, b"content", &metadata).await.unwrap();

        let root = get_links(&blocks, &details.cid).await.unwrap();
        let names: Vec<_> = root.keys().cloned().collect();
        assert_eq!(names, vec![METADATA.to_string(), USERLAND.to_string()]);
        assert_eq!(details.metadata, root[METADATA].cid);
        assert_eq!(details.userland, root[USERLAND].cid);
    }

    #[tokio::test]
    async fn test_tree_root_links() {
        let blocks = blocks();
        let metadata = Metadata::empty(false, SemVer::V1);
        let details = put_tree(
            &blocks,
            &Links::new(),
            &Skeleton::new(),
            &Children::new(),
            &metadata,
        )
        .await
        .unwrap();

        let root = get_links(&blocks, &details.cid).await.unwrap();
        assert_eq!(root.len(), 4);
        assert_eq!(blocks.size(&details.cid).await.unwrap(), details.size);
        for (name, link) in &root {
            assert_eq!(name, &link.name);
            assert_eq!(blocks.size(&link.cid).await.unwrap(), link.size);
        }
    }

    #[tokio::test]
    async fn test_missing_userland() {
        let blocks = blocks();
        let metadata = Metadata::empty(true, SemVer::V1);
        let link = put_and_make_link(&blocks, METADATA, &metadata).await.unwrap();
        let root: Links = BTreeMap::from([(METADATA.to_string(), link)]);
        let (cid, _) = put_links(&blocks, &root).await.unwrap();

        let result = get(&blocks, &cid).await;
        assert!(matches!(result, Err(FsError::MissingHeaderValue(name)) if name == USERLAND));
    }

    #[tokio::test]
    async fn test_ctime_after_mtime_reads_back() {
        let blocks = blocks();
        let mut metadata = Metadata::empty(true, SemVer::V1).with_name("skewed.txt");
        metadata.ctime = metadata.mtime + 1;
        let details = put_file(&blocks, b"content", &metadata).await.unwrap();

        match get(&blocks, &details.cid).await.unwrap() {
            NodeInfo::File(info) => {
                assert_eq!(info.metadata, metadata);
                assert_eq!(info.userland, details.userland);
            }
            NodeInfo::Tree(_) => panic!("expected a file header"),
        }
    }
}
