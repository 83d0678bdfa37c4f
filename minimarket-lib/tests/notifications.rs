use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use minimarket_lib::notify::{
    DismissReason, NotificationAction, NotificationConfig, NotificationEvent, NotificationId,
    NotificationKind, NotificationQueue, NotificationSpec, NotificationUpdate,
};
use minimarket_lib::scheduler::ManualScheduler;

fn setup() -> (NotificationQueue, ManualScheduler) {
    let scheduler = ManualScheduler::new();
    let queue = NotificationQueue::new(NotificationConfig::default(), Arc::new(scheduler.clone()));
    (queue, scheduler)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn counting_close(counter: &Arc<AtomicUsize>, message: &str) -> NotificationSpec {
    let counter = Arc::clone(counter);
    NotificationSpec::new(message).on_close(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

fn messages(queue: &NotificationQueue) -> Vec<String> {
    queue
        .snapshot()
        .into_iter()
        .map(|v| v.notification.message)
        .collect()
}

fn record_events(queue: &NotificationQueue) -> Arc<Mutex<Vec<NotificationEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    queue.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
    events
}

// ============================================================================
// Capacity
// ============================================================================

#[test]
fn test_capacity_evicts_oldest_non_persistent() {
    let (queue, _) = setup();
    let events = record_events(&queue);

    queue.show(NotificationSpec::new("a").persistent());
    let b = queue.show("b");
    for m in ["c", "d", "e"] {
        queue.show(m);
    }
    assert_eq!(queue.len(), 5);

    queue.show("f");
    assert_eq!(queue.len(), 5);
    assert_eq!(messages(&queue), vec!["a", "c", "d", "e", "f"]);
    assert!(events.lock().unwrap().contains(&NotificationEvent::Removed {
        id: b,
        reason: DismissReason::Eviction,
    }));
}

#[test]
fn test_capacity_evicts_oldest_when_all_persistent() {
    let (queue, _) = setup();
    for m in ["p1", "p2", "p3", "p4", "p5"] {
        queue.show(NotificationSpec::new(m).persistent());
    }
    queue.show("x");
    assert_eq!(messages(&queue), vec!["p2", "p3", "p4", "p5", "x"]);
}

#[test]
fn test_eviction_runs_on_close_and_cancels_timer() {
    let (queue, scheduler) = setup();
    let closed = Arc::new(AtomicUsize::new(0));
    queue.show(counting_close(&closed, "first"));
    for m in ["b", "c", "d", "e"] {
        queue.show(NotificationSpec::new(m).persistent());
    }
    assert_eq!(scheduler.pending_count(), 1);

    queue.show(NotificationSpec::new("f").persistent());
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert_eq!(scheduler.pending_count(), 0);
}

#[test]
fn test_smaller_capacity() {
    let scheduler = ManualScheduler::new();
    let config = NotificationConfig {
        max_notifications: 2,
        ..NotificationConfig::default()
    };
    let queue = NotificationQueue::new(config, Arc::new(scheduler));
    for m in ["1", "2", "3", "4"] {
        queue.show(m);
    }
    assert_eq!(messages(&queue), vec!["3", "4"]);
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn test_remove_is_idempotent() {
    let (queue, _) = setup();
    let closed = Arc::new(AtomicUsize::new(0));
    let id = queue.show(counting_close(&closed, "hola"));

    assert!(queue.remove(&id));
    assert!(!queue.remove(&id));
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert!(queue.is_empty());
}

#[test]
fn test_remove_unknown_id_is_noop() {
    let (queue, _) = setup();
    queue.show("hola");
    assert!(!queue.remove(&NotificationId::from("notification_missing")));
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_removed_entry_timer_never_fires() {
    let (queue, scheduler) = setup();
    let closed = Arc::new(AtomicUsize::new(0));
    let events = record_events(&queue);
    let id = queue.show(counting_close(&closed, "hola"));

    scheduler.advance(ms(1000));
    queue.remove(&id);
    assert_eq!(scheduler.pending_count(), 0);
    scheduler.advance(ms(10_000));

    assert_eq!(closed.load(Ordering::SeqCst), 1);
    let removed: Vec<_> = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, NotificationEvent::Removed { .. }))
        .cloned()
        .collect();
    assert_eq!(
        removed,
        vec![NotificationEvent::Removed {
            id,
            reason: DismissReason::User
        }]
    );
}

#[test]
fn test_on_close_sees_entry_still_queued() {
    let (queue, _) = setup();
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let handle = queue.clone();
    let id = queue.show(NotificationSpec::new("hola").on_close(move |n| {
        // Re-entrant calls are safe; the entry is closing, not gone.
        let queued = handle.contains(&n.id);
        let removed_again = handle.remove(&n.id);
        *sink.lock().unwrap() = Some((queued, removed_again));
    }));

    queue.remove(&id);
    assert_eq!(*seen.lock().unwrap(), Some((true, false)));
    assert!(!queue.contains(&id));
}

#[test]
fn test_timer_removes_with_reason() {
    let (queue, scheduler) = setup();
    let events = record_events(&queue);
    let id = queue.warning("Stock bajo");
    scheduler.advance(ms(4000));
    assert!(queue.is_empty());
    assert_eq!(
        events.lock().unwrap().last(),
        Some(&NotificationEvent::Removed {
            id,
            reason: DismissReason::Timer
        })
    );
}

#[test]
fn test_clear_closes_everything() {
    let (queue, scheduler) = setup();
    let closed = Arc::new(AtomicUsize::new(0));
    let events = record_events(&queue);
    queue.show(counting_close(&closed, "a"));
    queue.show(counting_close(&closed, "b").persistent());
    queue.show(counting_close(&closed, "c"));

    queue.clear();
    assert!(queue.is_empty());
    assert_eq!(closed.load(Ordering::SeqCst), 3);
    assert_eq!(scheduler.pending_count(), 0);
    let cleared = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| {
            matches!(
                e,
                NotificationEvent::Removed {
                    reason: DismissReason::Cleared,
                    ..
                }
            )
        })
        .count();
    assert_eq!(cleared, 3);
}

// ============================================================================
// Updates
// ============================================================================

#[test]
fn test_update_without_duration_keeps_timer() {
    let (queue, scheduler) = setup();
    let id = queue.info("Subiendo");
    scheduler.advance(ms(3000));
    assert!(queue.update(&id, NotificationUpdate::new().message("Casi listo")));
    scheduler.advance(ms(1000));
    assert!(!queue.contains(&id));
}

#[test]
fn test_update_with_duration_reschedules_from_now() {
    let (queue, scheduler) = setup();
    let id = queue.info("Subiendo");
    scheduler.advance(ms(3000));
    queue.update(&id, NotificationUpdate::new().duration(ms(4000)));

    scheduler.advance(ms(1000));
    assert!(queue.contains(&id), "stale timer must not fire");
    scheduler.advance(ms(2999));
    assert!(queue.contains(&id));
    scheduler.advance(ms(1));
    assert!(!queue.contains(&id));
}

#[test]
fn test_update_persistent_cancels_timer() {
    let (queue, scheduler) = setup();
    let id = queue.info("Hola");
    queue.update(&id, NotificationUpdate::new().persistent(true));
    assert_eq!(scheduler.pending_count(), 0);
    scheduler.advance(ms(60_000));
    assert!(queue.contains(&id));
}

#[test]
fn test_loading_then_success() {
    let (queue, scheduler) = setup();
    let id = queue.loading("Guardando venta");
    let n = queue.get(&id).unwrap();
    assert!(n.persistent);
    assert_eq!(n.title.as_deref(), Some("Cargando..."));

    queue.update(
        &id,
        NotificationUpdate::new()
            .kind(NotificationKind::Success)
            .message("Venta guardada")
            .persistent(false)
            .duration(ms(2000)),
    );
    assert_eq!(queue.get(&id).unwrap().kind, NotificationKind::Success);
    scheduler.advance(ms(2000));
    assert!(!queue.contains(&id));
}

#[test]
fn test_update_unknown_id() {
    let (queue, _) = setup();
    assert!(!queue.update(&NotificationId::from("nope"), NotificationUpdate::new().message("x")));
}

// ============================================================================
// Interaction
// ============================================================================

#[test]
fn test_confirm_action() {
    let (queue, scheduler) = setup();
    let confirmed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&confirmed);
    let id = queue.confirm_action("¿Eliminar producto?", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let n = queue.get(&id).unwrap();
    assert_eq!(n.kind, NotificationKind::Warning);
    assert_eq!(n.title.as_deref(), Some("Confirmar acción"));
    assert_eq!(n.actions.len(), 2);
    scheduler.advance(ms(60_000));
    assert!(queue.contains(&id));

    assert!(!queue.trigger_action(&id, "missing"));
    assert!(queue.trigger_action(&id, "confirm"));
    assert_eq!(confirmed.load(Ordering::SeqCst), 1);
    assert!(!queue.contains(&id));
}

#[test]
fn test_action_can_keep_notification_open() {
    let (queue, _) = setup();
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let id = queue.show(
        NotificationSpec::new("Nueva versión")
            .persistent()
            .action(
                NotificationAction::new("details", "Detalles")
                    .keep_open()
                    .handler(move |_| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }),
            ),
    );
    assert!(queue.trigger_action(&id, "details"));
    assert!(queue.trigger_action(&id, "details"));
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert!(queue.contains(&id));
}

#[test]
fn test_click_runs_handler_and_closes() {
    let (queue, _) = setup();
    let clicked = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&clicked);
    let id = queue.show(NotificationSpec::new("Ver pedido").on_click(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    assert!(queue.click(&id));
    assert_eq!(clicked.load(Ordering::SeqCst), 1);
    assert!(!queue.contains(&id));
    assert!(!queue.click(&id));
}

#[test]
fn test_click_without_close_on_click() {
    let scheduler = ManualScheduler::new();
    let config = NotificationConfig {
        close_on_click: false,
        ..NotificationConfig::default()
    };
    let queue = NotificationQueue::new(config, Arc::new(scheduler));
    let id = queue.info("Hola");
    assert!(queue.click(&id));
    assert!(queue.contains(&id));
}

#[test]
fn test_created_at_uses_scheduler_clock() {
    let (queue, scheduler) = setup();
    scheduler.advance(ms(1500));
    let id = queue.info("Hola");
    assert_eq!(queue.get(&id).unwrap().created_at, ms(1500));
    assert_eq!(queue.snapshot()[0].remaining, Some(ms(4000)));
}
