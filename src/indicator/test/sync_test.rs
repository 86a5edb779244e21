use crate::{
    indicator::sync::{DiscreteLevel, SelectionSync},
    provider::{mock::MockBrightnessProvider, BrightnessProvider, ProviderError},
};

fn level(index: u8) -> DiscreteLevel {
    DiscreteLevel::new(index).expect("invalid level in test")
}

#[test]
fn test_nearest_level_rounding() {
    // Ties round away from zero, everything clamps into the menu range.
    for (raw, expected) in [
        (0, 0),
        (4, 0),
        (5, 1),
        (24, 2),
        (25, 3),
        (47, 5),
        (81, 8),
        (94, 9),
        (95, 10),
        (100, 10),
        (110, 10),
        (250, 10),
    ] {
        assert_eq!(
            DiscreteLevel::nearest(raw),
            level(expected),
            "nearest({}) should be level {}",
            raw,
            expected
        );
    }
}

#[test]
fn test_level_raw_and_labels() {
    assert_eq!(level(0).raw(), 0);
    assert_eq!(level(10).raw(), 100);
    assert_eq!(level(5).to_string(), "50%");
    assert_eq!(DiscreteLevel::new(11), None);
    assert_eq!(DiscreteLevel::all().count(), 11);
}

#[tokio::test]
async fn test_initialize_makes_no_provider_calls() {
    let provider = MockBrightnessProvider::new(47);
    let (mut sync, selection) = SelectionSync::new(provider.clone());
    assert_eq!(*selection.borrow(), None);

    sync.initialize(47);
    assert_eq!(sync.selected(), Some(level(5)));
    assert_eq!(*selection.borrow(), Some(level(5)));
    assert_eq!(provider.get_calls(), 0);
    assert_eq!(provider.set_calls(), 0);
}

#[tokio::test]
async fn test_user_select_writes_once() {
    let provider = MockBrightnessProvider::new(50);
    let (mut sync, selection) = SelectionSync::new(provider.clone());
    sync.initialize(50);

    sync.on_user_select(level(8)).await.expect("select failed");
    assert_eq!(sync.selected(), Some(level(8)));
    assert_eq!(*selection.borrow(), Some(level(8)));
    assert_eq!(provider.brightness(), 80);
    assert_eq!(provider.set_calls(), 1);
}

#[tokio::test]
async fn test_reselecting_the_active_level_is_a_no_op() {
    let provider = MockBrightnessProvider::new(50);
    let (mut sync, _selection) = SelectionSync::new(provider.clone());
    sync.initialize(50);

    sync.on_user_select(level(5)).await.expect("select failed");
    sync.on_user_select(level(8)).await.expect("select failed");
    sync.on_user_select(level(8)).await.expect("select failed");
    assert_eq!(provider.set_calls(), 1);
}

#[tokio::test]
async fn test_notifications_never_write_back() {
    let provider = MockBrightnessProvider::new(80);
    let (mut sync, selection) = SelectionSync::new(provider.clone());
    sync.initialize(80);

    // Within rounding tolerance of the active level: nothing happens.
    sync.on_provider_notify(81);
    assert_eq!(sync.selected(), Some(level(8)));

    // A real change moves the selection, but must not produce a set.
    sync.on_provider_notify(95);
    assert_eq!(sync.selected(), Some(level(10)));
    assert_eq!(*selection.borrow(), Some(level(10)));
    assert_eq!(provider.set_calls(), 0);
}

#[tokio::test]
async fn test_failed_write_falls_back_to_no_selection() {
    let provider = MockBrightnessProvider::new(50);
    let (mut sync, selection) = SelectionSync::new(provider.clone());
    sync.initialize(50);

    provider.set_failure_mode(true);
    let error = sync
        .on_user_select(level(8))
        .await
        .expect_err("select succeeded on a failing provider");
    assert!(matches!(error, ProviderError::PermissionDenied(_)));
    assert_eq!(sync.selected(), None);
    assert_eq!(*selection.borrow(), None);
    assert_eq!(provider.set_calls(), 1);

    // The next working selection recovers from the sentinel state.
    provider.set_failure_mode(false);
    sync.on_user_select(level(8)).await.expect("select failed");
    assert_eq!(sync.selected(), Some(level(8)));
}

#[tokio::test]
async fn test_start_reads_once_and_subscribes() {
    let provider = MockBrightnessProvider::new(47);
    let (mut sync, selection) = SelectionSync::new(provider.clone());

    sync.start().await.expect("start failed");
    assert_eq!(sync.selected(), Some(level(5)));
    assert_eq!(*selection.borrow(), Some(level(5)));
    assert_eq!(provider.get_calls(), 1);
    assert_eq!(provider.set_calls(), 0);
    assert!(provider.is_subscribed());

    provider.emit(93);
    assert_eq!(sync.next_notification().await, Some(93));
}

#[tokio::test]
async fn test_start_on_an_unreachable_provider_keeps_the_sentinel() {
    let provider = MockBrightnessProvider::new(47);
    provider.set_failure_mode(true);
    let (mut sync, selection) = SelectionSync::new(provider.clone());

    let error = sync
        .start()
        .await
        .expect_err("start succeeded on a failing provider");
    assert!(matches!(error, ProviderError::Unavailable(_)));
    assert_eq!(sync.selected(), None);
    assert_eq!(*selection.borrow(), None);

    // Teardown after a failed start must still be fine.
    sync.teardown();
}

#[tokio::test]
async fn test_start_with_the_subscription_slot_taken() {
    let provider = MockBrightnessProvider::new(47);
    let _outside = provider.subscribe().await.expect("subscribe failed");
    let (mut sync, _selection) = SelectionSync::new(provider.clone());

    let error = sync
        .start()
        .await
        .expect_err("start succeeded without a free subscription slot");
    assert!(matches!(error, ProviderError::AlreadySubscribed));
    // The initial value was still adopted; only notifications are missing.
    assert_eq!(sync.selected(), Some(level(5)));
    assert_eq!(sync.next_notification().await, None);
}

#[tokio::test]
async fn test_teardown_is_idempotent() {
    let provider = MockBrightnessProvider::new(50);
    let (mut sync, _selection) = SelectionSync::new(provider.clone());
    sync.start().await.expect("start failed");

    sync.teardown();
    sync.teardown();
    assert_eq!(sync.next_notification().await, None);

    // Never-started synchronizers can be torn down too.
    let (mut fresh, _selection) = SelectionSync::new(provider);
    fresh.teardown();
}
