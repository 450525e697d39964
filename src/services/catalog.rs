//! Catalog building: turns a raw store listing into client-facing entries.

use crate::{
    models::{catalog::CatalogEntry, image::ImageObject},
    services::store::{ObjectStore, StoreResult, validate_key},
};
use tracing::debug;

/// Recognized image extension, compared case-insensitively.
const IMAGE_EXTENSION: &str = ".iso";

/// Ordered (fragment, canonical name) pairs. The first fragment found in
/// the lowercased file stem wins, so order decides overlapping matches.
const DISTRO_NAMES: &[(&str, &str)] = &[
    ("ubuntu", "Ubuntu"),
    ("debian", "Debian"),
    ("centos", "CentOS"),
    ("fedora", "Fedora"),
    ("opensuse", "openSUSE"),
    ("mint", "Linux Mint"),
    ("manjaro", "Manjaro"),
    ("arch", "Arch Linux"),
    ("kali", "Kali Linux"),
    ("alpine", "Alpine Linux"),
    ("tinycore", "Tiny Core Linux"),
    ("dsl", "Damn Small Linux"),
    ("puppy", "Puppy Linux"),
];

/// List the whole store and describe every image in it.
///
/// Entries keep the order in which the store listed them. Keys the blob
/// endpoint would refuse (nested paths and the like) are left out, so every
/// `fileName` in the catalog can be fetched.
pub async fn build_catalog(store: &dyn ObjectStore) -> StoreResult<Vec<CatalogEntry>> {
    let objects = store.list_objects(None).await?;
    let listed = objects.len();

    let entries: Vec<CatalogEntry> = objects
        .into_iter()
        .filter(|obj| is_image_key(&obj.key) && validate_key(&obj.key).is_ok())
        .map(catalog_entry)
        .collect();

    debug!(listed, retained = entries.len(), "built catalog");
    Ok(entries)
}

/// Derive the catalog entry for one image object.
pub fn catalog_entry(object: ImageObject) -> CatalogEntry {
    CatalogEntry {
        id: catalog_id(&object.key),
        name: display_name(&object.key),
        size: object.size,
        modified: object.uploaded_at,
        file_name: object.key,
    }
}

/// True when `key` ends with `.iso`, ignoring ASCII case.
pub fn is_image_key(key: &str) -> bool {
    let key = key.as_bytes();
    key.len() >= IMAGE_EXTENSION.len()
        && key[key.len() - IMAGE_EXTENSION.len()..]
            .eq_ignore_ascii_case(IMAGE_EXTENSION.as_bytes())
}

/// Replace every character outside `[A-Za-z0-9]` with `_`.
pub fn catalog_id(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Friendly name for a key: a known distribution name when one of the
/// table fragments appears in the stem, otherwise the title-cased stem.
pub fn display_name(key: &str) -> String {
    let stem = file_stem(key);
    let lowered = stem.to_lowercase();

    DISTRO_NAMES
        .iter()
        .find(|(fragment, _)| lowered.contains(fragment))
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| title_case(stem))
}

fn file_stem(key: &str) -> &str {
    if is_image_key(key) {
        &key[..key.len() - IMAGE_EXTENSION.len()]
    } else {
        key
    }
}

/// `-`/`_` become spaces, each run of ASCII alphanumerics gets an upper-case
/// first letter, whitespace is collapsed and trimmed.
fn title_case(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut in_word = false;
    for c in stem.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        if c.is_ascii_alphanumeric() {
            if in_word {
                out.push(c);
            } else {
                out.push(c.to_ascii_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
