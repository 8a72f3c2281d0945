//! Set reconciliation of a project's children against their stored pages.
//!
//! The desired list replaces the stored set: entries whose id matches a
//! stored page update it, the rest are created, and stored pages missing
//! from the list are archived. Positions in the list become the `Order`.

use std::collections::HashSet;

use futures::future::try_join_all;
use shared::notion::normalize_id;
use shared::{Error, NotionApi, Page, PropertyMap, Result};

/// An incoming child record that may refer to an existing page.
pub trait Desired {
    fn id(&self) -> Option<&str>;
}

/// Every write a reconciliation will issue.
#[derive(Debug, Default, PartialEq)]
pub struct Mutations {
    pub creates: Vec<PropertyMap>,
    pub updates: Vec<(String, PropertyMap)>,
    pub archives: Vec<String>,
}

/// Pages written by an applied reconciliation.
#[derive(Debug, Default)]
pub struct Outcome {
    pub created: Vec<Page>,
    pub updated: Vec<Page>,
    pub archived: usize,
}

impl Outcome {
    /// Created and updated pages, i.e. the stored set after the save.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.created.iter().chain(self.updated.iter())
    }
}

/// Diff `desired` against the `existing` pages by id.
///
/// `create` builds the properties of a new page and `update` those of a
/// kept page; both get the 1-based position. Every property map is built
/// before anything is sent, so a bad entry fails the save without writes.
pub fn plan<T, C, U>(existing: &[Page], desired: &[T], create: C, update: U) -> Result<Mutations>
where
    T: Desired,
    C: Fn(&T, u32) -> Result<PropertyMap>,
    U: Fn(&T, u32) -> Result<PropertyMap>,
{
    let mut mutations = Mutations::default();
    let mut kept: HashSet<String> = HashSet::new();

    for (index, item) in desired.iter().enumerate() {
        let order = u32::try_from(index + 1)
            .map_err(|_| Error::validation("too many entries"))?;

        let matched = item.id().and_then(|id| {
            let key = normalize_id(id);
            existing
                .iter()
                .find(|page| normalize_id(&page.id) == key)
                .map(|page| (key, page.id.clone()))
        });

        match matched {
            Some((key, page_id)) => {
                if !kept.insert(key) {
                    return Err(Error::validation(format!("duplicate id in list: {}", page_id)));
                }
                mutations.updates.push((page_id, update(item, order)?));
            }
            None => mutations.creates.push(create(item, order)?),
        }
    }

    mutations.archives = existing
        .iter()
        .filter(|page| !kept.contains(&normalize_id(&page.id)))
        .map(|page| page.id.clone())
        .collect();

    Ok(mutations)
}

/// Issue every mutation concurrently and wait for all of them.
///
/// The first failure fails the whole save.
pub async fn apply<A>(api: &A, database_id: &str, mutations: Mutations) -> Result<Outcome>
where
    A: NotionApi + ?Sized,
{
    let Mutations {
        creates,
        updates,
        archives,
    } = mutations;

    let creating = try_join_all(
        creates
            .into_iter()
            .map(|properties| api.create_page(database_id, properties)),
    );
    let updating = try_join_all(
        updates
            .into_iter()
            .map(|(page_id, properties)| async move { api.update_page(&page_id, properties).await }),
    );
    let archiving = try_join_all(archives.iter().map(|page_id| api.archive_page(page_id)));

    let (created, updated, archived) = futures::try_join!(creating, updating, archiving)?;

    Ok(Outcome {
        created,
        updated,
        archived: archived.len(),
    })
}
