// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slash-delimited scene paths.
//!
//! A path names a node by its position in the scene tree: a leading
//! *selector* segment naming the root, followed by child indices, e.g.
//! `"body/0/2"`. The registry derives every non-root path by appending the
//! child index to its parent's path, so paths produced by the registry never
//! carry a trailing slash. The functions here tolerate one anyway.
//!
//! Depth counts separators, not segments: `depth("0/2/1") == 2` and a root
//! path such as `"body"` has depth 0.

use alloc::format;
use alloc::string::String;
use core::fmt;
use core::str::Split;

/// One segment of a path, as returned by [`index_at_depth`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Segment<'a> {
    /// A numeric child index.
    Index(usize),
    /// A segment that is not a number (typically the root selector).
    Raw(&'a str),
}

impl<'a> From<&'a str> for Segment<'a> {
    fn from(segment: &'a str) -> Self {
        match segment.parse() {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Raw(segment),
        }
    }
}

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

/// Returns `true` if the last character of `path` is `/`.
#[inline]
#[must_use]
pub fn has_trailing_slash(path: &str) -> bool {
    path.ends_with('/')
}

/// Strips one trailing slash, if present.
#[inline]
fn trimmed(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// Returns the number of `/` separators in `path`, ignoring a trailing slash.
#[must_use]
pub fn depth(path: &str) -> usize {
    trimmed(path).bytes().filter(|&b| b == b'/').count()
}

/// Returns `true` if `path` names a root (a single selector segment).
#[inline]
#[must_use]
pub fn is_root(path: &str) -> bool {
    depth(path) == 0
}

/// Returns the numeric value of the final segment, i.e. the node's position
/// among its siblings.
///
/// Returns `None` if the final segment is not a number.
#[must_use]
pub fn index(path: &str) -> Option<usize> {
    let path = trimmed(path);
    let last = match path.rfind('/') {
        Some(sep) => &path[sep + 1..],
        None => path,
    };
    last.parse().ok()
}

/// Returns the segment at `depth` (0 is the first segment).
///
/// The selector at depth 0 is always [`Segment::Raw`], even when it is
/// numeric. Deeper segments are parsed as child indices.
///
/// Returns `None` if the path has fewer than `depth + 1` segments.
#[must_use]
pub fn index_at_depth(path: &str, depth: usize) -> Option<Segment<'_>> {
    let segment = segments(path).nth(depth)?;
    Some(if depth == 0 {
        Segment::Raw(segment)
    } else {
        Segment::from(segment)
    })
}

/// Returns the parent path: everything before the final separator.
///
/// A root path has no separator and yields the empty string.
#[must_use]
pub fn parent(path: &str) -> &str {
    let path = trimmed(path);
    match path.rfind('/') {
        Some(sep) => &path[..sep],
        None => "",
    }
}

/// Returns `true` if `child` lies under `parent`.
///
/// Both paths are compared as if they ended with a slash, so `"0/20"` is not
/// considered to be under `"0/2"`. Any deeper descendant also matches, and a
/// path is considered to be under itself.
#[must_use]
pub fn is_child_of(child: &str, parent: &str) -> bool {
    let child = trimmed(child);
    let parent = trimmed(parent);
    child.starts_with(parent)
        && (child.len() == parent.len() || child.as_bytes()[parent.len()] == b'/')
}

/// Returns the first segment of `path`: the selector naming its root.
#[must_use]
pub fn selector(path: &str) -> &str {
    match path.find('/') {
        Some(sep) => &path[..sep],
        None => path,
    }
}

/// Builds the path of child `index` under `path`.
#[must_use]
pub fn child(path: &str, index: usize) -> String {
    format!("{}/{index}", trimmed(path))
}

/// Returns an iterator over the segments of `path`, ignoring a trailing slash.
#[must_use]
pub fn segments(path: &str) -> Segments<'_> {
    Segments {
        inner: trimmed(path).split('/'),
    }
}

/// An iterator over the segments of a path.
///
/// Created by [`segments`].
#[derive(Clone, Debug)]
pub struct Segments<'a> {
    inner: Split<'a, char>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    #[inline]
    fn next(&mut self) -> Option<&'a str> {
        self.inner.next()
    }
}
