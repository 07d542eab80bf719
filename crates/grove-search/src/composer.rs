use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use grove_store::{AccessMode, GraphStore, Node, StoreHandle};
use grove_types::{terms, ResourceId, Status, User};
use tracing::debug;

use crate::algebra;
use crate::error::ComposerResult;
use crate::model::{
    LogicalRelation, SearchElement, SearchPair, SearchQuery, SearchResult, SortCriterion,
    SortOrder,
};
use crate::security::{SecurityFilter, TargetKind};

/// Tuning knobs for query evaluation.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Operation-level bound on each store-native query. Exceeding it
    /// fails the search; there are no partial results.
    pub query_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(100),
        }
    }
}

/// What one search targets: the graph type, an optional enclosing
/// container, and an optional lifecycle status constraint.
#[derive(Clone, Debug)]
pub struct SearchScope {
    pub kind: TargetKind,
    pub container: Option<ResourceId>,
    pub status: Option<Status>,
}

impl SearchScope {
    pub fn new(kind: TargetKind) -> Self {
        Self {
            kind,
            container: None,
            status: None,
        }
    }

    /// Restrict results to members of one container.
    pub fn in_container(mut self, container: ResourceId) -> Self {
        self.container = Some(container);
        self
    }

    /// Restrict results to one lifecycle status.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }
}

/// Evaluates boolean queries against a store, merging in the caller's
/// security filter.
pub struct QueryComposer {
    store: Arc<dyn GraphStore>,
    config: SearchConfig,
}

struct Eval<'a> {
    handle: &'a dyn StoreHandle,
    filter: &'a SecurityFilter,
    scope: &'a SearchScope,
    sort: Option<&'a SortCriterion>,
}

impl QueryComposer {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self::with_config(store, SearchConfig::default())
    }

    pub fn with_config(store: Arc<dyn GraphStore>, config: SearchConfig) -> Self {
        Self { store, config }
    }

    /// Evaluate `query` over the whole store.
    ///
    /// An empty query degrades to a security-filtered scan of every
    /// object of the scoped type.
    pub fn search(
        &self,
        query: &SearchQuery,
        sort: Option<&SortCriterion>,
        user: Option<&User>,
        scope: &SearchScope,
    ) -> ComposerResult<SearchResult> {
        let filter = SecurityFilter::build(user, &scope.kind, scope.status);
        if filter.is_deny_all() {
            return Ok(SearchResult {
                ids: Vec::new(),
                sort: sort.cloned(),
            });
        }

        let handle = self.store.open(AccessMode::Read)?;
        let eval = Eval {
            handle: handle.as_ref(),
            filter: &filter,
            scope,
            sort,
        };
        let entries = if query.is_empty() {
            self.full_scan(&eval)?
        } else {
            self.evaluate(&eval, query, None)?
        };
        debug!(count = entries.len(), "search evaluated");
        Ok(finish(entries, sort))
    }

    /// Evaluate `query` seeded from `candidates` instead of the whole
    /// store; used to re-filter a previously computed result.
    pub fn search_in(
        &self,
        candidates: &[ResourceId],
        query: &SearchQuery,
        sort: Option<&SortCriterion>,
        user: Option<&User>,
        scope: &SearchScope,
    ) -> ComposerResult<SearchResult> {
        let filter = SecurityFilter::build(user, &scope.kind, scope.status);
        if filter.is_deny_all() {
            return Ok(SearchResult {
                ids: Vec::new(),
                sort: sort.cloned(),
            });
        }

        let handle = self.store.open(AccessMode::Read)?;
        let eval = Eval {
            handle: handle.as_ref(),
            filter: &filter,
            scope,
            sort,
        };
        let mut seed = Vec::with_capacity(candidates.len());
        for id in candidates {
            if eval.admits(id)? {
                seed.push(eval.entry(id)?);
            }
        }
        let entries = self.evaluate(&eval, query, Some(seed))?;
        Ok(finish(entries, sort))
    }

    /// Left-to-right evaluation with a pending relation defaulting to
    /// `And`.
    ///
    /// The first non-relation element seeds the running result without
    /// combination, so a leading relation is deliberately a no-op: a
    /// query starting `[Or, Pair(a)]` behaves exactly like `[Pair(a)]`.
    /// Dependent query strings rely on this.
    fn evaluate(
        &self,
        eval: &Eval<'_>,
        query: &SearchQuery,
        seed: Option<Vec<String>>,
    ) -> ComposerResult<Vec<String>> {
        let mut running = seed;
        let mut pending = LogicalRelation::And;
        for element in &query.elements {
            let sub = match element {
                SearchElement::Relation(rel) => {
                    pending = *rel;
                    continue;
                }
                SearchElement::Pair(pair) => self.evaluate_pair(eval, pair)?,
                SearchElement::Group(group) => self.evaluate(eval, group, None)?,
            };
            running = Some(match running {
                None => sub,
                Some(acc) => match pending {
                    LogicalRelation::And => algebra::intersection(acc, sub),
                    LogicalRelation::Or => algebra::union(acc, sub),
                },
            });
        }
        Ok(running.unwrap_or_default())
    }

    fn evaluate_pair(&self, eval: &Eval<'_>, pair: &SearchPair) -> ComposerResult<Vec<String>> {
        let matched = eval.handle.select(
            &pair.predicate,
            pair.operator,
            &pair.value,
            pair.not,
            self.config.query_timeout,
        )?;
        let mut entries = Vec::new();
        for id in matched {
            if eval.admits(&id)? {
                entries.push(eval.entry(&id)?);
            }
        }
        Ok(entries)
    }

    fn full_scan(&self, eval: &Eval<'_>) -> ComposerResult<Vec<String>> {
        let mut entries = Vec::new();
        for id in eval.handle.subjects()? {
            if eval.admits(&id)? {
                entries.push(eval.entry(&id)?);
            }
        }
        Ok(entries)
    }
}

impl Eval<'_> {
    /// Scope and security gate for one candidate.
    fn admits(&self, id: &ResourceId) -> ComposerResult<bool> {
        if id.type_segment() != self.scope.kind.segment() {
            return Ok(false);
        }
        if let Some(container) = &self.scope.container {
            let member = match self.handle.object_of(id, terms::CONTAINER)? {
                Some(Node::Resource(c)) => &c == container,
                _ => false,
            };
            if !member {
                return Ok(false);
            }
        }
        self.filter.allows(self.handle, id)
    }

    /// Render the candidate as a result entry, tagged with its sort key
    /// when a sort was requested.
    fn entry(&self, id: &ResourceId) -> ComposerResult<String> {
        if let Some(sort) = self.sort {
            if let Some(Node::Literal(value)) = self.handle.object_of(id, &sort.predicate)? {
                return Ok(algebra::tag(id.as_str(), &value.render()));
            }
        }
        Ok(id.as_str().to_string())
    }
}

fn finish(mut entries: Vec<String>, sort: Option<&SortCriterion>) -> SearchResult {
    if let Some(sort) = sort {
        // Entries without a sort key always sort last; stable sort keeps
        // the evaluation order within ties.
        entries.sort_by(|a, b| match (algebra::sort_key(a), algebra::sort_key(b)) {
            (Some(ka), Some(kb)) => {
                let ord = ka.cmp(kb);
                match sort.order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        for entry in &mut entries {
            *entry = algebra::strip(entry).to_string();
        }
    }
    SearchResult {
        ids: entries,
        sort: sort.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use grove_store::{Edge, MemoryGraphStore, StoreError};
    use grove_types::{Grant, GrantRight, SearchOperator, Value};

    use super::*;
    use crate::error::SearchError;

    const TITLE: &str = "http://grove.org/terms/title";
    const COLOR: &str = "http://grove.org/terms/color";
    const YEAR: &str = "http://grove.org/terms/year";

    const ITEMS: TargetKind = TargetKind::Item {
        segment: "item",
        container_segment: "collection",
    };

    fn item(n: usize) -> ResourceId {
        ResourceId::parse(&format!("http://grove.org/item/{n}")).unwrap()
    }

    fn collection() -> ResourceId {
        ResourceId::parse("http://grove.org/collection/c").unwrap()
    }

    /// Four items in one container: titles tag 1-3 as "a", colors tag
    /// 2-4 as "b", years run 2001..=2004.
    fn seed(status: Status) -> Arc<MemoryGraphStore> {
        let store = Arc::new(MemoryGraphStore::new());
        let mut handle = store.open(AccessMode::Write).unwrap();
        for n in 1..=4usize {
            let id = item(n);
            if n <= 3 {
                handle
                    .add(Edge::literal(id.clone(), TITLE, Value::String("a".into())))
                    .unwrap();
            }
            if n >= 2 {
                handle
                    .add(Edge::literal(id.clone(), COLOR, Value::String("b".into())))
                    .unwrap();
            }
            handle
                .add(Edge::literal(
                    id.clone(),
                    YEAR,
                    Value::Integer(2000 + n as i64),
                ))
                .unwrap();
            handle
                .add(Edge::literal(
                    id.clone(),
                    terms::STATUS,
                    Value::Uri(status.uri().to_string()),
                ))
                .unwrap();
            handle
                .add(Edge::link(id, terms::CONTAINER, collection()))
                .unwrap();
        }
        handle.commit().unwrap();
        store
    }

    fn title_is_a() -> SearchPair {
        SearchPair::new(TITLE, SearchOperator::Equals, Value::String("a".into()))
    }

    fn color_is_b() -> SearchPair {
        SearchPair::new(COLOR, SearchOperator::Equals, Value::String("b".into()))
    }

    fn items_of(result: &SearchResult) -> Vec<String> {
        result.ids.clone()
    }

    // ----------------------------------------------------------------
    // logical composition
    // ----------------------------------------------------------------

    #[test]
    fn and_intersects_or_unions() {
        let composer = QueryComposer::new(seed(Status::Released));
        let scope = SearchScope::new(ITEMS);

        let anded = SearchQuery::from(title_is_a()).and(color_is_b());
        let got = composer.search(&anded, None, None, &scope).unwrap();
        assert_eq!(
            items_of(&got),
            vec![item(2).as_str().to_string(), item(3).as_str().to_string()]
        );

        let ored = SearchQuery::from(title_is_a()).or(color_is_b());
        let got = composer.search(&ored, None, None, &scope).unwrap();
        assert_eq!(
            items_of(&got),
            (1..=4)
                .map(|n| item(n).as_str().to_string())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn leading_relation_is_a_no_op() {
        let composer = QueryComposer::new(seed(Status::Released));
        let scope = SearchScope::new(ITEMS);

        let plain = SearchQuery::from(title_is_a());
        let with_leading_or = SearchQuery::new()
            .with(SearchElement::Relation(LogicalRelation::Or))
            .with(SearchElement::Pair(title_is_a()));
        let with_leading_and = SearchQuery::new()
            .with(SearchElement::Relation(LogicalRelation::And))
            .with(SearchElement::Pair(title_is_a()));

        let expect = composer.search(&plain, None, None, &scope).unwrap();
        let or = composer.search(&with_leading_or, None, None, &scope).unwrap();
        let and = composer
            .search(&with_leading_and, None, None, &scope)
            .unwrap();
        assert_eq!(or, expect);
        assert_eq!(and, expect);
    }

    #[test]
    fn groups_nest() {
        let composer = QueryComposer::new(seed(Status::Released));
        let scope = SearchScope::new(ITEMS);

        // title=a AND (year=2002 OR year=2004) -> {2}
        let group = SearchQuery::from(SearchPair::new(
            YEAR,
            SearchOperator::Equals,
            Value::Integer(2002),
        ))
        .or(SearchPair::new(
            YEAR,
            SearchOperator::Equals,
            Value::Integer(2004),
        ));
        let query = SearchQuery::from(title_is_a())
            .with(SearchElement::Relation(LogicalRelation::And))
            .with(SearchElement::Group(group));

        let got = composer.search(&query, None, None, &scope).unwrap();
        assert_eq!(items_of(&got), vec![item(2).as_str().to_string()]);
    }

    #[test]
    fn empty_query_scans_visible_objects() {
        let composer = QueryComposer::new(seed(Status::Released));
        let scope = SearchScope::new(ITEMS);
        let got = composer
            .search(&SearchQuery::new(), None, None, &scope)
            .unwrap();
        assert_eq!(got.len(), 4);
    }

    // ----------------------------------------------------------------
    // sorting
    // ----------------------------------------------------------------

    #[test]
    fn sort_orders_and_strips_tags() {
        let composer = QueryComposer::new(seed(Status::Released));
        let scope = SearchScope::new(ITEMS);
        let query = SearchQuery::from(title_is_a());

        let asc = composer
            .search(&query, Some(&SortCriterion::ascending(YEAR)), None, &scope)
            .unwrap();
        assert_eq!(
            items_of(&asc),
            vec![
                item(1).as_str().to_string(),
                item(2).as_str().to_string(),
                item(3).as_str().to_string()
            ]
        );

        let desc = composer
            .search(&query, Some(&SortCriterion::descending(YEAR)), None, &scope)
            .unwrap();
        assert_eq!(
            items_of(&desc),
            vec![
                item(3).as_str().to_string(),
                item(2).as_str().to_string(),
                item(1).as_str().to_string()
            ]
        );

        // No private token leaks into the result.
        assert!(asc.ids.iter().all(|id| !id.contains(algebra::SORT_TOKEN)));
    }

    // ----------------------------------------------------------------
    // subset re-filtering
    // ----------------------------------------------------------------

    #[test]
    fn search_in_refilters_a_candidate_set() {
        let composer = QueryComposer::new(seed(Status::Released));
        let scope = SearchScope::new(ITEMS);

        let candidates = vec![item(1), item(2), item(3)];
        let got = composer
            .search_in(
                &candidates,
                &SearchQuery::from(color_is_b()),
                None,
                None,
                &scope,
            )
            .unwrap();
        assert_eq!(
            items_of(&got),
            vec![item(2).as_str().to_string(), item(3).as_str().to_string()]
        );
    }

    // ----------------------------------------------------------------
    // container scoping
    // ----------------------------------------------------------------

    #[test]
    fn container_scope_excludes_outsiders() {
        let store = seed(Status::Released);
        {
            let mut handle = store.open(AccessMode::Write).unwrap();
            let outsider = ResourceId::parse("http://grove.org/item/out").unwrap();
            handle
                .add(Edge::literal(
                    outsider.clone(),
                    TITLE,
                    Value::String("a".into()),
                ))
                .unwrap();
            handle
                .add(Edge::literal(
                    outsider,
                    terms::STATUS,
                    Value::Uri(Status::Released.uri().to_string()),
                ))
                .unwrap();
            handle.commit().unwrap();
        }

        let composer = QueryComposer::new(store);
        let scoped = SearchScope::new(ITEMS).in_container(collection());
        let got = composer
            .search(&SearchQuery::from(title_is_a()), None, None, &scoped)
            .unwrap();
        assert_eq!(got.len(), 3);
        assert!(!got.contains("http://grove.org/item/out"));
    }

    // ----------------------------------------------------------------
    // security scenarios
    // ----------------------------------------------------------------

    #[test]
    fn pending_objects_hide_from_anonymous_and_grantless() {
        let composer = QueryComposer::new(seed(Status::Pending));
        let scope = SearchScope::new(ITEMS);
        let query = SearchQuery::from(title_is_a());

        let anonymous = composer.search(&query, None, None, &scope).unwrap();
        assert!(anonymous.is_empty());

        let grantless = User::new(
            ResourceId::parse("http://grove.org/user/u1").unwrap(),
            "u1@grove.org",
        );
        let got = composer.search(&query, None, Some(&grantless), &scope).unwrap();
        assert!(got.is_empty());
    }

    #[test]
    fn container_grant_reveals_pending_members() {
        let composer = QueryComposer::new(seed(Status::Pending));
        let scope = SearchScope::new(ITEMS);
        let query = SearchQuery::from(title_is_a());

        let reader = User::new(
            ResourceId::parse("http://grove.org/user/u1").unwrap(),
            "u1@grove.org",
        )
        .with_grant(Grant::new(GrantRight::Read, collection()));

        let got = composer.search(&query, None, Some(&reader), &scope).unwrap();
        assert_eq!(got.len(), 3);
    }

    #[test]
    fn release_makes_objects_visible_to_everyone() {
        let composer = QueryComposer::new(seed(Status::Released));
        let scope = SearchScope::new(ITEMS);
        let query = SearchQuery::from(title_is_a());

        let anonymous = composer.search(&query, None, None, &scope).unwrap();
        assert_eq!(anonymous.len(), 3);

        let grantless = User::new(
            ResourceId::parse("http://grove.org/user/u1").unwrap(),
            "u1@grove.org",
        );
        let got = composer.search(&query, None, Some(&grantless), &scope).unwrap();
        assert_eq!(got.len(), 3);
    }

    // ----------------------------------------------------------------
    // timeouts
    // ----------------------------------------------------------------

    #[test]
    fn exceeded_timeout_fails_the_search() {
        let composer = QueryComposer::with_config(
            seed(Status::Released),
            SearchConfig {
                query_timeout: Duration::ZERO,
            },
        );
        let scope = SearchScope::new(ITEMS);
        let err = composer
            .search(&SearchQuery::from(title_is_a()), None, None, &scope)
            .unwrap_err();
        assert!(matches!(
            err,
            SearchError::Store(StoreError::QueryTimeout { .. })
        ));
    }
}
