//! Local path assignment for a whole module set.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::path::{url_to_local_path, with_digest_suffix};

/// Assigns a distinct local path to every URL.
///
/// URLs claim their mapped path in sorted order; a URL whose mapped path is
/// already taken gets a digest-suffixed name instead. The result depends only
/// on the set of URLs, never on the order they were loaded in.
pub fn plan_layout<'u, I>(urls: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'u str>,
{
    let sorted: BTreeSet<&str> = urls.into_iter().collect();
    let mut owners: HashMap<String, &str> = HashMap::with_capacity(sorted.len());
    let mut layout = BTreeMap::new();

    for url in sorted {
        let mapped = url_to_local_path(url);
        let path = match owners.get(&mapped).copied() {
            Some(owner) => {
                let alt = free_alternative(&mapped, url, &owners);
                tracing::warn!(
                    url,
                    owner,
                    path = mapped.as_str(),
                    alt = alt.as_str(),
                    "local path already used by another module; using digest-suffixed name"
                );
                alt
            }
            None => mapped,
        };
        owners.insert(path.clone(), url);
        layout.insert(url.to_string(), path);
    }
    layout
}

fn free_alternative(mapped: &str, url: &str, owners: &HashMap<String, &str>) -> String {
    let mut seed = url.to_string();
    loop {
        let alt = with_digest_suffix(mapped, &seed);
        if !owners.contains_key(&alt) {
            return alt;
        }
        seed.push('#');
    }
}
