//! Resolution of human-typed paths against a current location.

use url::Url;

use crate::error::{PathError, PathResult};

/// Resolve `input` relative to `current` inside the pod rooted at `base`.
///
/// - `/x` is relative to the base URL.
/// - `..` and `../` name the parent of `current`, clamped to the base.
/// - Anything else is a relative reference resolved *inside* `current`
///   (a missing trailing `/` on `current` is added first).
/// - An empty input names `current` itself.
///
/// The resolver does not validate names; the protocol handler does that.
/// It does refuse to hand back a URL outside the base.
///
/// # Examples
///
/// ```
/// use pod_path::{normalize_base, resolve_user_path};
///
/// let base = normalize_base("https://pod.example/").unwrap();
/// let cur = "https://pod.example/notes/";
/// assert_eq!(resolve_user_path("a.txt", cur, &base).unwrap(), "https://pod.example/notes/a.txt");
/// assert_eq!(resolve_user_path("/a.txt", cur, &base).unwrap(), "https://pod.example/a.txt");
/// assert_eq!(resolve_user_path("..", cur, &base).unwrap(), "https://pod.example/");
/// ```
pub fn resolve_user_path(input: &str, current: &str, base: &Url) -> PathResult<String> {
    let input = input.trim();
    let current = as_container(current)?;

    let resolved = if input.is_empty() {
        current
    } else if let Some(rest) = input.strip_prefix('/') {
        join(base, rest)?
    } else if input == ".." || input == "../" {
        let parent = join(&current, "..")?;
        if parent.as_str().starts_with(base.as_str()) {
            parent
        } else {
            base.clone()
        }
    } else {
        join(&current, input)?
    };

    if !resolved.as_str().starts_with(base.as_str()) {
        return Err(PathError::OutsidePod {
            url: resolved.to_string(),
        });
    }
    Ok(resolved.into())
}

fn as_container(current: &str) -> PathResult<Url> {
    let mut url = Url::parse(current).map_err(|_| PathError::InvalidUrl {
        input: current.to_string(),
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn join(url: &Url, reference: &str) -> PathResult<Url> {
    url.join(reference).map_err(|_| PathError::InvalidUrl {
        input: reference.to_string(),
    })
}
