//! Local git repository adapter.

use crate::error::{Error, Result};
use crate::scan::RevisionSource;
use git2::{Diff, DiffFormat, DiffOptions, Repository};
use std::path::Path;

/// Read-only access to a local repository's history and remote identity.
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(GitRepo {
            repo: Repository::discover(path)?,
        })
    }

    /// The `owner/name` slug of the `origin` remote, falling back to the
    /// first configured remote.
    pub fn slug(&self) -> Result<String> {
        let remote = match self.repo.find_remote("origin") {
            Ok(remote) => remote,
            Err(_) => {
                let remotes = self.repo.remotes()?;
                let name = remotes
                    .get(0)
                    .ok_or_else(|| Error::RemoteUrl("no remote configured".to_string()))?;
                self.repo.find_remote(name)?
            }
        };
        let url = remote
            .url()
            .ok_or_else(|| Error::RemoteUrl("remote url is not valid utf-8".to_string()))?;
        parse_slug(url)
    }

    /// Abbreviated object id of `revision`.
    pub fn short_sha(&self, revision: &str) -> Result<String> {
        let object = self.repo.revparse_single(revision)?;
        let buf = object.short_id()?;
        Ok(buf.as_str().unwrap_or_default().to_string())
    }

    /// Unified diff text between two revisions, in `git diff` format.
    pub fn diff_text(&self, before: &str, after: &str) -> Result<String> {
        let old_tree = self.repo.revparse_single(before)?.peel_to_tree()?;
        let new_tree = self.repo.revparse_single(after)?.peel_to_tree()?;
        let mut options = DiffOptions::new();
        let diff =
            self.repo
                .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut options))?;
        render_patch(&diff)
    }
}

impl RevisionSource for GitRepo {
    fn read_file(&self, revision: &str, path: &str) -> Result<String> {
        let tree = self.repo.revparse_single(revision)?.peel_to_tree()?;
        let entry = tree.get_path(Path::new(path)).map_err(|err| {
            if err.code() == git2::ErrorCode::NotFound {
                Error::NotFound {
                    revision: revision.to_string(),
                    path: path.to_string(),
                }
            } else {
                Error::Git(err)
            }
        })?;
        let object = entry.to_object(&self.repo)?;
        let blob = object.peel_to_blob()?;
        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    }
}

/// Reassemble the patch text from libgit2's line callback.
fn render_patch(diff: &Diff) -> Result<String> {
    let mut text = Vec::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        match line.origin() {
            '+' | '-' | ' ' => text.push(line.origin() as u8),
            _ => {}
        }
        text.extend_from_slice(line.content());
        true
    })?;
    Ok(String::from_utf8_lossy(&text).into_owned())
}

/// Extract `owner/name` from an HTTPS or SSH GitHub remote URL.
fn parse_slug(url: &str) -> Result<String> {
    let trimmed = url.trim();
    let path = trimmed
        .strip_prefix("https://github.com/")
        .or_else(|| trimmed.strip_prefix("http://github.com/"))
        .or_else(|| trimmed.strip_prefix("git@github.com:"))
        .or_else(|| trimmed.strip_prefix("ssh://git@github.com/"))
        .ok_or_else(|| Error::RemoteUrl(format!("unrecognized remote url {url}")))?;
    let slug = path.strip_suffix(".git").unwrap_or(path);
    let slug = slug.trim_end_matches('/');
    let mut parts = slug.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
            Ok(format!("{owner}/{name}"))
        }
        _ => Err(Error::RemoteUrl(format!("unrecognized remote url {url}"))),
    }
}
