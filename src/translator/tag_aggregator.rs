//! Deferred tag resolution.
//!
//! While entries are assembled, every tag list is represented by a
//! [`TagTargetId`] and only the *names* of its tags are recorded here. Once the
//! result set is final, the names are resolved in one bulk store lookup and
//! written back onto every object carrying that id.

use icu::collator::Collator;
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;

use crate::{
    database::{DictionaryDatabase, DictionaryDatabaseTag, GenericQueryRequest},
    dictionary::{DictionaryTag, TermDefinition},
    errors::DBError,
};

use super::Translator;

/// Stable handle of a tag list inside one lookup.
pub type TagTargetId = usize;

/// The tag names one dictionary contributed to a tag list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagGroup {
    pub dictionary: String,
    pub tag_names: Vec<String>,
}

/// Request scoped bookkeeping of which tag lists want which tags.
#[derive(Clone, Debug, Default)]
pub struct TagAggregator {
    next_id: TagTargetId,
    tag_expansion_target_map: IndexMap<TagTargetId, Vec<TagGroup>>,
}

impl TagAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out a fresh, still empty tag list.
    pub fn new_target(&mut self) -> TagTargetId {
        self.next_id += 1;
        self.next_id
    }

    pub fn add_tags(&mut self, target: TagTargetId, dictionary: &str, tag_names: &[String]) {
        if tag_names.is_empty() {
            return;
        }
        let tag_groups = self.tag_expansion_target_map.entry(target).or_default();
        let tag_group = get_or_create_tag_group(tag_groups, dictionary);
        add_unique_tags(tag_group, tag_names);
    }

    /// Copies every pending tag of `source` onto `target`.
    pub fn merge_tags(&mut self, target: TagTargetId, source: TagTargetId) {
        let Some(new_tag_groups) = self.tag_expansion_target_map.get(&source).cloned() else {
            return;
        };
        let tag_groups = self.tag_expansion_target_map.entry(target).or_default();
        for TagGroup {
            dictionary,
            tag_names,
        } in &new_tag_groups
        {
            let tag_group = get_or_create_tag_group(tag_groups, dictionary);
            add_unique_tags(tag_group, tag_names);
        }
    }

    /// Drops the pending groups of `target` that came from an excluded dictionary.
    pub fn remove_dictionaries(&mut self, target: TagTargetId, excluded: &IndexSet<String>) {
        if let Some(tag_groups) = self.tag_expansion_target_map.get_mut(&target) {
            tag_groups.retain(|group| !excluded.contains(&group.dictionary));
        }
    }

    pub fn tag_groups(&self, target: TagTargetId) -> &[TagGroup] {
        self.tag_expansion_target_map
            .get(&target)
            .map_or(&[], Vec::as_slice)
    }

    pub fn get_tag_expansion_targets(&self) -> impl Iterator<Item = (TagTargetId, &[TagGroup])> {
        self.tag_expansion_target_map
            .iter()
            .map(|(id, groups)| (*id, groups.as_slice()))
    }
}

fn get_or_create_tag_group<'a>(tag_groups: &'a mut Vec<TagGroup>, dictionary: &str) -> &'a mut TagGroup {
    match tag_groups.iter().position(|group| group.dictionary == dictionary) {
        Some(pos) => &mut tag_groups[pos],
        None => {
            tag_groups.push(TagGroup {
                dictionary: dictionary.to_string(),
                tag_names: Vec::new(),
            });
            let last = tag_groups.len() - 1;
            &mut tag_groups[last]
        }
    }
}

fn add_unique_tags(tag_group: &mut TagGroup, new_tag_names: &[String]) {
    for tag_name in new_tag_names {
        if !tag_group.tag_names.contains(tag_name) {
            tag_group.tag_names.push(tag_name.clone());
        }
    }
}

/// Tag metadata already fetched from the store, by dictionary then by name.
///
/// A `None` slot records that the store had no such tag. The cache outlives
/// single lookups and must be cleared when the installed dictionaries change.
#[derive(Debug, Default)]
pub struct TagCache {
    inner: RwLock<IndexMap<String, IndexMap<String, Option<DictionaryDatabaseTag>>>>,
}

impl TagCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, dictionary: &str, query: &str) -> Option<Option<DictionaryDatabaseTag>> {
        self.inner
            .read()
            .get(dictionary)
            .and_then(|tags| tags.get(query))
            .cloned()
    }

    pub fn insert(&self, dictionary: &str, query: &str, tag: Option<DictionaryDatabaseTag>) {
        self.inner
            .write()
            .entry(dictionary.to_string())
            .or_default()
            .insert(query.to_string(), tag);
    }

    /// Number of cached (dictionary, name) slots.
    pub fn len(&self) -> usize {
        self.inner.read().values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

/// The part of a tag name before the first `:`, which is what tag banks store.
pub fn get_name_base(name: &str) -> &str {
    match name.find(':') {
        Some(pos) => &name[..pos],
        None => name,
    }
}

/// Resolved tags of every expansion target.
pub type ExpandedTags = IndexMap<TagTargetId, Vec<DictionaryTag>>;

struct TagExpansionItem<'a> {
    query: String,
    dictionary: &'a str,
    tag_name: &'a str,
    database_tag: Option<DictionaryDatabaseTag>,
    targets: Vec<TagTargetId>,
}

impl<D: DictionaryDatabase> Translator<D> {
    /// Looks tag metadata up through the shared cache. Slots are only written
    /// once the store call for them has returned.
    pub(crate) fn find_tag_meta_cached(
        &self,
        queries: &[GenericQueryRequest],
    ) -> Result<Vec<Option<DictionaryDatabaseTag>>, DBError> {
        let mut results: Vec<Option<DictionaryDatabaseTag>> = Vec::with_capacity(queries.len());
        let mut missing: Vec<usize> = Vec::new();
        for (i, item) in queries.iter().enumerate() {
            match self.tag_cache.get(&item.dictionary, &item.query) {
                Some(tag) => results.push(tag),
                None => {
                    results.push(None);
                    missing.push(i);
                }
            }
        }
        if missing.is_empty() {
            return Ok(results);
        }

        let requests: Vec<GenericQueryRequest> =
            missing.iter().map(|&i| queries[i].clone()).collect();
        let database_tags = self.db.find_tag_meta_bulk(&requests)?;
        for (slot, &i) in missing.iter().enumerate() {
            let database_tag = database_tags.get(slot).cloned().flatten();
            if database_tag.is_none() {
                log::warn!(
                    "no tag metadata for {:?} in {}",
                    queries[i].query,
                    queries[i].dictionary
                );
            }
            self.tag_cache
                .insert(&queries[i].dictionary, &queries[i].query, database_tag.clone());
            results[i] = database_tag;
        }
        Ok(results)
    }

    /// Resolves every pending tag name, then merges and sorts each list.
    pub(crate) fn expand_tag_groups_and_group(
        &self,
        tag_aggregator: &TagAggregator,
    ) -> Result<ExpandedTags, DBError> {
        let mut expanded = self.expand_tag_groups(tag_aggregator)?;
        group_tags(&mut expanded, &self.string_comparer);
        Ok(expanded)
    }

    fn expand_tag_groups(&self, tag_aggregator: &TagAggregator) -> Result<ExpandedTags, DBError> {
        let mut items: IndexMap<(&str, &str), TagExpansionItem> = IndexMap::new();
        for (target, tag_groups) in tag_aggregator.get_tag_expansion_targets() {
            for TagGroup {
                dictionary,
                tag_names,
            } in tag_groups
            {
                for tag_name in tag_names {
                    let item = items
                        .entry((dictionary.as_str(), tag_name.as_str()))
                        .or_insert_with(|| TagExpansionItem {
                            query: get_name_base(tag_name).to_string(),
                            dictionary,
                            tag_name,
                            database_tag: None,
                            targets: Vec::new(),
                        });
                    item.targets.push(target);
                }
            }
        }

        let queries: Vec<GenericQueryRequest> = items
            .values()
            .map(|item| GenericQueryRequest {
                query: item.query.clone(),
                dictionary: item.dictionary.to_string(),
            })
            .collect();
        let database_tags = self.find_tag_meta_cached(&queries)?;
        for (item, database_tag) in items.values_mut().zip(database_tags) {
            item.database_tag = database_tag;
        }

        let mut expanded = ExpandedTags::new();
        for item in items.values() {
            let tag = create_tag(item.database_tag.as_ref(), item.tag_name, item.dictionary);
            for target in &item.targets {
                expanded.entry(*target).or_default().push(tag.clone());
            }
        }
        Ok(expanded)
    }
}

pub fn create_tag(
    database_tag: Option<&DictionaryDatabaseTag>,
    name: &str,
    dictionary: &str,
) -> DictionaryTag {
    let (category, notes, order, score) = match database_tag {
        Some(tag) => (tag.category.as_str(), tag.notes.as_str(), tag.order, tag.score),
        None => ("", "", 0, 0),
    };
    DictionaryTag {
        name: name.to_string(),
        category: if category.is_empty() {
            "default".to_string()
        } else {
            category.to_string()
        },
        order,
        score,
        content: if notes.is_empty() {
            Vec::new()
        } else {
            vec![notes.to_string()]
        },
        dictionaries: vec![dictionary.to_string()],
        redundant: false,
    }
}

fn group_tags(expanded: &mut ExpandedTags, collator: &Collator) {
    for tags in expanded.values_mut() {
        if tags.len() <= 1 {
            continue;
        }
        merge_similar_tags(tags);
        tags.sort_by(|v1, v2| {
            v1.order
                .cmp(&v2.order)
                .then_with(|| collator.compare(&v1.name, &v2.name))
        });
    }
}

/// Folds tags sharing a name and category into the first occurrence.
fn merge_similar_tags(tags: &mut Vec<DictionaryTag>) {
    let mut i = 0;
    while i < tags.len() {
        let mut j = i + 1;
        while j < tags.len() {
            if tags[j].name != tags[i].name || tags[j].category != tags[i].category {
                j += 1;
                continue;
            }
            let tag2 = tags.remove(j);
            let tag1 = &mut tags[i];
            tag1.order = tag1.order.min(tag2.order);
            tag1.score = tag1.score.max(tag2.score);
            tag1.dictionaries.extend(tag2.dictionaries);
            for content in tag2.content {
                if !tag1.content.contains(&content) {
                    tag1.content.push(content);
                }
            }
        }
        i += 1;
    }
}

fn get_tag_names_with_category(tags: &[DictionaryTag], category: &str) -> Vec<String> {
    let mut results: Vec<String> = tags
        .iter()
        .filter(|tag| tag.category == category)
        .map(|tag| tag.name.clone())
        .collect();
    results.sort();
    results
}

/// Marks part of speech tags that repeat those of the previous definition of
/// the same dictionary.
pub fn flag_redundant_definition_tags(definitions: &mut [TermDefinition]) {
    let mut last_dictionary: Option<String> = None;
    let mut last_part_of_speech: Vec<String> = Vec::new();

    for definition in definitions.iter_mut() {
        let part_of_speech = get_tag_names_with_category(&definition.tags, "partOfSpeech");

        if last_dictionary.as_deref() != Some(definition.dictionary.as_str()) {
            last_dictionary = Some(definition.dictionary.clone());
            last_part_of_speech = Vec::new();
        }

        if last_part_of_speech == part_of_speech {
            for tag in &mut definition.tags {
                if tag.category == "partOfSpeech" {
                    tag.redundant = true;
                }
            }
        } else {
            last_part_of_speech = part_of_speech;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tag(name: &str, category: &str, order: i64, dictionary: &str) -> DictionaryTag {
        DictionaryTag {
            name: name.into(),
            category: category.into(),
            order,
            score: 0,
            content: Vec::new(),
            dictionaries: vec![dictionary.into()],
            redundant: false,
        }
    }

    #[test]
    fn aggregator_merges_unique_names() {
        let mut aggregator = TagAggregator::new();
        let a = aggregator.new_target();
        let b = aggregator.new_target();
        assert_ne!(a, b);
        aggregator.add_tags(a, "JMdict", &["n".into(), "vs".into()]);
        aggregator.add_tags(b, "JMdict", &["vs".into(), "P".into()]);
        aggregator.add_tags(b, "Other", &[]);
        aggregator.merge_tags(a, b);
        assert_eq!(
            aggregator.tag_groups(a),
            &[TagGroup {
                dictionary: "JMdict".into(),
                tag_names: vec!["n".into(), "vs".into(), "P".into()],
            }]
        );
        // empty name lists never create a group
        assert_eq!(aggregator.tag_groups(b).len(), 1);
    }

    #[test]
    fn excluded_dictionary_groups_are_dropped() {
        let mut aggregator = TagAggregator::new();
        let a = aggregator.new_target();
        aggregator.add_tags(a, "JMdict", &["n".into()]);
        aggregator.add_tags(a, "Other", &["n".into()]);
        aggregator.remove_dictionaries(a, &IndexSet::from(["JMdict".to_string()]));
        let dictionaries: Vec<&str> = aggregator
            .tag_groups(a)
            .iter()
            .map(|g| g.dictionary.as_str())
            .collect();
        assert_eq!(dictionaries, vec!["Other"]);
    }

    #[test]
    fn similar_tags_fold() {
        let mut tags = vec![
            tag("n", "partOfSpeech", 2, "A"),
            tag("P", "popular", 1, "A"),
            tag("n", "partOfSpeech", 0, "B"),
        ];
        tags[0].content = vec!["noun".into()];
        tags[2].content = vec!["noun".into(), "common noun".into()];
        merge_similar_tags(&mut tags);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].order, 0);
        assert_eq!(tags[0].dictionaries, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(tags[0].content, vec!["noun".to_string(), "common noun".to_string()]);
    }

    #[test]
    fn name_base() {
        assert_eq!(get_name_base("freq:12"), "freq");
        assert_eq!(get_name_base("n"), "n");
    }

    #[test]
    fn missing_tag_defaults() {
        let tag = create_tag(None, "xyz", "A");
        assert_eq!(tag.category, "default");
        assert!(tag.content.is_empty());
    }

    #[test]
    fn cache_clear() {
        let cache = TagCache::new();
        cache.insert("A", "n", None);
        assert_eq!(cache.get("A", "n"), Some(None));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("A", "n"), None);
    }
}
