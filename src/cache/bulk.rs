//! Bulk loader
//!
//! Resolves many items with one store query per `(user, quality)` group.
//! Duplicate requests for the same component are resolved once and the result
//! is copied to every destination.

use crate::cache::engine::{CacheState, IconCache, Prefetch};
use crate::cache::logic::ActivityCachingLogic;
use crate::cache::store::StoredRow;
use crate::model::{ComponentName, EntityKey, IconQuality, IconRequestInfo, UserHandle};
use crate::platform::PackageCatalog;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Outcome of one group's range query
struct GroupRows {
    rows: HashMap<String, StoredRow>,
    /// The query succeeded and every returned row decoded, so a missing
    /// component has no stored row
    complete: bool,
}

impl GroupRows {
    fn take(&mut self, component: &str) -> Prefetch {
        match self.rows.remove(component) {
            Some(row) => Prefetch::Row(row),
            None if self.complete => Prefetch::Absent,
            None => Prefetch::NotQueried,
        }
    }
}

/// Requests sharing one component within a group
struct Duplicates<'r, 'a> {
    component: ComponentName,
    requests: Vec<&'r mut IconRequestInfo<'a>>,
}

impl IconCache {
    /// Fill in every request's item, batching store reads.
    ///
    /// Storage faults never abort the batch; affected components are resolved
    /// one by one instead.
    pub fn get_titles_and_icons_in_bulk(&self, mut requests: Vec<IconRequestInfo<'_>>) {
        let mut state = self.lock();

        let mut groups: Vec<((UserHandle, IconQuality), Vec<&mut IconRequestInfo<'_>>)> =
            Vec::new();
        for request in requests.iter_mut() {
            if request.item.target_component().is_none() {
                info!("Item has no target component, using default icon");
                request.item.bitmap = Some(self.factory.default_icon(request.item.user));
                request.item.title.clear();
                request.item.content_description.clear();
                continue;
            }

            let group_key = (request.item.user, request.quality);
            match groups.iter_mut().find(|(key, _)| *key == group_key) {
                Some((_, members)) => members.push(request),
                None => groups.push((group_key, vec![request])),
            }
        }

        for ((user, quality), members) in groups {
            self.load_group_locked(&mut state, user, quality, members);
        }
    }

    fn load_group_locked<'r, 'a>(
        &self,
        state: &mut CacheState,
        user: UserHandle,
        quality: IconQuality,
        members: Vec<&'r mut IconRequestInfo<'a>>,
    ) {
        let mut by_component: Vec<Duplicates<'r, 'a>> = Vec::new();
        let mut index: HashMap<ComponentName, usize> = HashMap::new();
        for request in members {
            let Some(component) = request.item.target_component().cloned() else {
                continue;
            };
            match index.get(&component) {
                Some(&i) => by_component[i].requests.push(request),
                None => {
                    index.insert(component.clone(), by_component.len());
                    by_component.push(Duplicates {
                        component,
                        requests: vec![request],
                    });
                }
            }
        }

        let flattened: Vec<String> = by_component.iter().map(|d| d.component.flatten()).collect();
        let mut rows = self.query_group_locked(state, &flattened, user, quality);
        debug!(
            "Bulk load for user {}: {} component(s), {} stored row(s)",
            user,
            flattened.len(),
            rows.rows.len()
        );

        for (mut duplicates, flat) in by_component.into_iter().zip(flattened) {
            let key = EntityKey::new(duplicates.component, user);
            let hint = duplicates
                .requests
                .first_mut()
                .and_then(|request| request.activity_info.take());
            let prefetched = rows.take(&flat);

            let entry = self.cache_locked(
                state,
                &key,
                &ActivityCachingLogic,
                || hint.or_else(|| self.catalog.resolve_activity(&key.component, user)),
                false,
                quality,
                prefetched,
            );

            for request in duplicates.requests.iter_mut() {
                self.apply_cache_entry(&entry, request.item);
            }
        }
    }

    /// One range query for a group, keyed by flattened component.
    ///
    /// A failed query or an unreadable row leaves the result incomplete;
    /// components without a row then go through the single-lookup path.
    fn query_group_locked(
        &self,
        state: &CacheState,
        components: &[String],
        user: UserHandle,
        quality: IconQuality,
    ) -> GroupRows {
        let serial = self.catalog.user_serial(user);
        let results = match state.store.query_bulk(components, serial, quality.into()) {
            Ok(results) => results,
            Err(e) => {
                warn!("Bulk icon query failed for user {}: {}", user, e);
                return GroupRows {
                    rows: HashMap::new(),
                    complete: false,
                };
            }
        };

        let mut group = GroupRows {
            rows: HashMap::with_capacity(results.len()),
            complete: true,
        };
        for result in results {
            match result {
                Ok(row) => {
                    group.rows.insert(row.component.clone(), row);
                }
                Err(e) => {
                    warn!("Skipping unreadable icon row: {}", e);
                    group.complete = false;
                }
            }
        }
        group
    }
}
