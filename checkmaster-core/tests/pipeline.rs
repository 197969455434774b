//! End-to-end scenarios for the moderation pipeline: paging, review decisions,
//! failure folding, completion order and snapshot mirroring.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use checkmaster_core::snapshot::SNAPSHOT_KEY;
use checkmaster_core::store::review::{approve, reject};
use checkmaster_core::store::selectors::{pending_products, reviewed_products};
use checkmaster_core::store::StoreOptions;
use checkmaster_core::{
    Action, FetchKind, InMemorySlot, Paginator, Product, ProductId, ProductSource, ProductStore,
    ReviewStatus, SnapshotSlot, SnapshotStore, SourceError, StaticProductSource,
};

fn ids(products: &[Product]) -> Vec<u64> {
    products.iter().map(|p| p.id.0).collect()
}

fn store_with(source: Arc<StaticProductSource>) -> ProductStore {
    ProductStore::new(source)
}

fn memory_snapshot() -> SnapshotStore {
    SnapshotStore::new(Box::new(InMemorySlot::new())).unwrap()
}

#[tokio::test]
async fn first_page_holds_ten_pending_products() {
    let mut store = store_with(Arc::new(StaticProductSource::numbered(100)));
    let mut paginator = Paginator::default();

    store.dispatch(paginator.initial_request());
    assert!(store.state().loading);

    let reports = store.settle().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome.as_ref().ok(), Some(&10));

    let state = store.state();
    assert!(!state.loading);
    assert_eq!(ids(&state.products), (1..=10).collect::<Vec<_>>());
    assert!(state
        .products
        .iter()
        .all(|p| p.status == ReviewStatus::Pending));
}

#[tokio::test]
async fn load_more_appends_next_page_and_advances_offset() {
    let mut store = store_with(Arc::new(StaticProductSource::numbered(100)));
    let mut paginator = Paginator::default();

    store.dispatch(paginator.initial_request());
    store.settle().await;

    assert_eq!(paginator.offset(), 10);
    store.dispatch(paginator.advance());
    assert_eq!(paginator.offset(), 17);
    assert!(store.state().loading_more);

    store.settle().await;
    let state = store.state();
    assert!(!state.loading_more);
    assert_eq!(ids(&state.products), (1..=17).collect::<Vec<_>>());
}

#[tokio::test]
async fn approving_moves_product_into_reviewed_view() {
    let mut store = store_with(Arc::new(StaticProductSource::numbered(100)));
    store.dispatch(Paginator::default().initial_request());
    store.settle().await;

    let first = store.state().products[0].clone();
    store.dispatch(approve(&first, true));

    let state = store.state();
    assert_eq!(state.products[0].status, ReviewStatus::Approved);
    assert_eq!(
        reviewed_products(state)
            .iter()
            .map(|p| p.id.0)
            .collect::<Vec<_>>(),
        vec![1]
    );
    // The default list view still shows everything
    assert_eq!(pending_products(state).len(), 10);

    // Unchecking returns it to pending
    store.dispatch(approve(&first, false));
    assert!(reviewed_products(store.state()).is_empty());
}

#[tokio::test]
async fn deleting_removes_only_that_product() {
    let mut store = store_with(Arc::new(StaticProductSource::numbered(2)));
    store.dispatch(Paginator::default().initial_request());
    store.settle().await;
    assert_eq!(ids(&store.state().products), vec![1, 2]);

    store.dispatch(Action::DeleteRequested { id: ProductId(1) });
    assert_eq!(ids(&store.state().products), vec![2]);

    store.dispatch(Action::DeleteRequested { id: ProductId(99) });
    assert_eq!(ids(&store.state().products), vec![2]);
}

#[tokio::test]
async fn failed_fetch_folds_empty_page_and_reports_the_error() {
    let source = Arc::new(StaticProductSource::numbered(100));
    let mut store = store_with(source.clone());
    let mut paginator = Paginator::default();

    store.dispatch(paginator.initial_request());
    store.settle().await;

    source.set_failing(true);
    store.dispatch(paginator.advance());
    let reports = store.settle().await;

    assert_eq!(reports.len(), 1);
    assert!(reports[0].is_failure());
    assert_eq!(reports[0].request.kind, FetchKind::More);
    assert!(matches!(
        reports[0].outcome,
        Err(SourceError::Unavailable)
    ));

    let state = store.state();
    assert!(!state.loading_more);
    assert_eq!(state.products.len(), 10);

    // The offset moved past the failed page, leaving a gap
    source.set_failing(false);
    store.dispatch(paginator.advance());
    store.settle().await;
    let listed = ids(&store.state().products);
    assert_eq!(&listed[10..], &(18..=24).collect::<Vec<_>>()[..]);
}

#[tokio::test]
async fn failed_initial_load_replaces_list_with_empty() {
    let source = Arc::new(StaticProductSource::numbered(100));
    let mut store = store_with(source.clone());

    store.dispatch(Paginator::default().initial_request());
    store.settle().await;
    assert_eq!(store.state().products.len(), 10);

    source.set_failing(true);
    store.dispatch(Paginator::default().initial_request());
    let reports = store.settle().await;

    assert!(reports[0].is_failure());
    assert!(store.state().products.is_empty());
    assert!(!store.state().loading);
}

#[tokio::test]
async fn duplicate_load_more_appends_twice_without_dedupe() {
    let source = Arc::new(StaticProductSource::numbered(100));
    let mut store = store_with(source.clone());
    store.dispatch(Paginator::default().initial_request());
    store.settle().await;

    let request = Action::LoadMoreRequested {
        limit: 7,
        offset: 10,
    };
    store.dispatch(request.clone());
    store.dispatch(request);
    assert_eq!(store.in_flight(), 2);

    store.settle().await;
    assert_eq!(store.state().products.len(), 24);
    assert_eq!(source.request_count(), 3);
}

#[tokio::test]
async fn dedupe_skips_identical_in_flight_fetch() {
    let source = Arc::new(StaticProductSource::numbered(100));
    let mut store = store_with(source.clone()).with_options(StoreOptions {
        dedupe_in_flight: true,
        ..StoreOptions::default()
    });
    store.dispatch(Paginator::default().initial_request());
    store.settle().await;

    let request = Action::LoadMoreRequested {
        limit: 7,
        offset: 10,
    };
    store.dispatch(request.clone());
    store.dispatch(request);
    assert_eq!(store.in_flight(), 1);
    assert!(store.state().loading_more);

    store.settle().await;
    assert_eq!(ids(&store.state().products), (1..=17).collect::<Vec<_>>());
    assert!(!store.state().loading_more);
    assert_eq!(source.request_count(), 2);
}

#[tokio::test]
async fn completions_fold_in_arrival_order() {
    let source = Arc::new(
        StaticProductSource::numbered(100).with_delay(10, Duration::from_millis(200)),
    );
    let mut store = store_with(source);
    let mut paginator = Paginator::default();

    store.dispatch(paginator.initial_request());
    store.settle().await;

    // The page at offset 10 is slow, so the page at 17 lands first
    store.dispatch(paginator.advance());
    store.dispatch(paginator.advance());

    let reports = store.settle().await;
    let offsets: Vec<usize> = reports.iter().map(|r| r.request.offset).collect();
    assert_eq!(offsets, vec![17, 10]);

    let listed = ids(&store.state().products);
    assert_eq!(&listed[10..17], &(18..=24).collect::<Vec<_>>()[..]);
    assert_eq!(&listed[17..], &(11..=17).collect::<Vec<_>>()[..]);
}

struct PanickingSource;

#[async_trait]
impl ProductSource for PanickingSource {
    async fn fetch(&self, _limit: usize, _offset: usize) -> Result<Vec<Product>, SourceError> {
        panic!("source exploded");
    }
}

#[tokio::test]
async fn panicked_fetch_still_settles_loading() {
    let mut store = ProductStore::new(Arc::new(PanickingSource));
    store.dispatch(Paginator::default().initial_request());

    let reports = store.settle().await;
    assert_eq!(reports.len(), 1);
    assert!(matches!(reports[0].outcome, Err(SourceError::Task { .. })));
    assert!(!store.state().loading);
    assert_eq!(store.in_flight(), 0);
}

#[tokio::test]
async fn subscribers_see_every_dispatch() {
    let mut store = store_with(Arc::new(StaticProductSource::numbered(100)));
    let mut updates = store.subscribe();

    store.dispatch(Paginator::default().initial_request());
    assert!(updates.has_changed().unwrap());
    assert!(updates.borrow_and_update().loading);

    store.settle().await;
    assert!(updates.has_changed().unwrap());
    let latest = updates.borrow_and_update().clone();
    assert!(!latest.loading);
    assert_eq!(latest, *store.state());
}

#[tokio::test]
async fn snapshot_mirrors_list_changes() {
    let mut store =
        store_with(Arc::new(StaticProductSource::numbered(100))).with_snapshot(memory_snapshot());
    let mut paginator = Paginator::default();

    store.dispatch(paginator.initial_request());
    store.settle().await;
    store.dispatch(paginator.advance());
    store.settle().await;

    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.list().unwrap(), store.state().products);

    let third = store.state().products[2].clone();
    store.dispatch(reject(&third, true));
    store.dispatch(Action::DeleteRequested { id: ProductId(1) });

    let cached = store.snapshot().unwrap().list().unwrap();
    assert_eq!(cached, store.state().products);
    assert_eq!(cached[1].id, ProductId(3));
    assert_eq!(cached[1].status, ReviewStatus::Rejected);
}

#[tokio::test]
async fn snapshot_untouched_when_sync_disabled() {
    let mut store = store_with(Arc::new(StaticProductSource::numbered(100)))
        .with_snapshot(memory_snapshot())
        .with_options(StoreOptions {
            sync_snapshot: false,
            ..StoreOptions::default()
        });

    store.dispatch(Paginator::default().initial_request());
    store.settle().await;

    assert_eq!(store.state().products.len(), 10);
    assert!(store.snapshot().unwrap().list().unwrap().is_empty());
}

#[tokio::test]
async fn snapshot_quota_failure_keeps_state_authoritative() {
    let snapshot = SnapshotStore::new(Box::new(InMemorySlot::with_quota(64))).unwrap();
    let mut store =
        store_with(Arc::new(StaticProductSource::numbered(100))).with_snapshot(snapshot);

    store.dispatch(Paginator::default().initial_request());
    let reports = store.settle().await;

    assert!(!reports[0].is_failure());
    assert_eq!(store.state().products.len(), 10);
    assert!(store.snapshot().unwrap().list().unwrap().is_empty());
}

#[tokio::test]
async fn restore_resumes_from_cached_snapshot() {
    let mut first_session =
        store_with(Arc::new(StaticProductSource::numbered(100))).with_snapshot(memory_snapshot());
    first_session.dispatch(Paginator::default().initial_request());
    first_session.settle().await;
    let approved = first_session.state().products[4].clone();
    first_session.dispatch(approve(&approved, true));
    let cached = first_session.snapshot().unwrap().list().unwrap();

    let restored_snapshot = memory_snapshot();
    restored_snapshot.save(&cached).unwrap();
    let mut second_session = store_with(Arc::new(StaticProductSource::numbered(100)))
        .with_snapshot(restored_snapshot);

    assert_eq!(second_session.restore_from_snapshot(), 10);
    assert_eq!(second_session.state().products, cached);
    assert_eq!(
        second_session.state().products[4].status,
        ReviewStatus::Approved
    );

    let mut paginator = Paginator::default();
    paginator.resume_after(second_session.state().products.len());
    second_session.dispatch(paginator.advance());
    second_session.settle().await;
    assert_eq!(
        ids(&second_session.state().products),
        (1..=17).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn restore_resets_corrupted_snapshot() {
    let slot = InMemorySlot::new();
    slot.write(SNAPSHOT_KEY, "[{\"id\": ").unwrap();
    let snapshot = SnapshotStore::new(Box::new(slot)).unwrap();

    let mut store =
        store_with(Arc::new(StaticProductSource::numbered(100))).with_snapshot(snapshot);
    assert_eq!(store.restore_from_snapshot(), 0);
    assert!(store.state().products.is_empty());
    assert!(store.snapshot().unwrap().list().unwrap().is_empty());
}
