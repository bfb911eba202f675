//! Delivery-order and replay semantics of the message coordinator.

mod common;

use std::sync::Arc;

use parking_lot::Mutex;

use common::{init_tracing, ItemEvent, ItemRenamed};
use viewbind::{BusError, BusHandle, MessageCoordinator};

#[test]
fn late_subscriber_replays_in_publish_order_including_upcasts() {
    init_tracing();
    let bus = MessageCoordinator::new();

    bus.publish(ItemEvent { id: 1 }).unwrap();
    bus.publish(ItemRenamed {
        base: ItemEvent { id: 2 },
        name: "two".to_string(),
    })
    .unwrap();
    bus.publish(ItemEvent { id: 3 }).unwrap();

    // Base-type subscription sees the renamed message through its upcast,
    // interleaved at its original log position.
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    bus.subscribe::<ItemEvent, _>(move |event| {
        sink.lock().push(event.id);
        Ok(())
    })
    .unwrap();

    assert_eq!(*seen.lock(), vec![1, 2, 3]);
}

#[test]
fn specific_subscriber_never_receives_the_base_type() {
    init_tracing();
    let bus = MessageCoordinator::new();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    bus.subscribe::<ItemRenamed, _>(move |renamed| {
        sink.lock().push(renamed.name.clone());
        Ok(())
    })
    .unwrap();

    bus.publish(ItemEvent { id: 7 }).unwrap();
    bus.publish(ItemRenamed {
        base: ItemEvent { id: 8 },
        name: "eight".to_string(),
    })
    .unwrap();

    assert_eq!(*seen.lock(), vec!["eight"]);
}

#[test]
fn subscriber_failure_stops_dispatch_but_the_message_stays_logged() {
    init_tracing();
    let bus = MessageCoordinator::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    bus.subscribe::<ItemEvent, _>(move |event| {
        sink.lock().push(format!("first {}", event.id));
        Ok(())
    })
    .unwrap();
    bus.subscribe::<ItemEvent, _>(|_| Err("handler broke".into()))
        .unwrap();
    let sink = Arc::clone(&seen);
    bus.subscribe::<ItemEvent, _>(move |event| {
        sink.lock().push(format!("third {}", event.id));
        Ok(())
    })
    .unwrap();

    let result = bus.publish(ItemEvent { id: 1 });
    assert!(matches!(result, Err(BusError::Subscriber { .. })));
    // Dispatch stopped at the failing subscriber.
    assert_eq!(*seen.lock(), vec!["first 1"]);

    // The failed publish is still in the log and replays to a newcomer.
    let sink = Arc::clone(&seen);
    bus.subscribe::<ItemEvent, _>(move |event| {
        sink.lock().push(format!("late {}", event.id));
        Ok(())
    })
    .unwrap();
    assert_eq!(*seen.lock(), vec!["first 1", "late 1"]);
}

#[test]
fn failed_replay_leaves_the_subscriber_unregistered() {
    init_tracing();
    let bus = MessageCoordinator::new();
    bus.publish(ItemEvent { id: 1 }).unwrap();

    let calls = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&calls);
    let result = bus.subscribe::<ItemEvent, _>(move |_| {
        *counter.lock() += 1;
        Err("replay rejected".into())
    });
    assert!(matches!(result, Err(BusError::Subscriber { .. })));
    assert_eq!(*calls.lock(), 1);

    // Not registered: a later publish never reaches the callback.
    bus.publish(ItemEvent { id: 2 }).unwrap();
    assert_eq!(*calls.lock(), 1);
}

#[test]
fn subscriber_added_mid_dispatch_replays_the_in_flight_message_once() {
    init_tracing();
    let bus = Arc::new(MessageCoordinator::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let inner_bus = Arc::clone(&bus);
    let sink = Arc::clone(&seen);
    bus.subscribe::<ItemEvent, _>(move |event| {
        if event.id == 1 {
            // Registered while id 1 is being dispatched: not on the live
            // snapshot, but replay hands it the logged message.
            let sink = Arc::clone(&sink);
            inner_bus.subscribe::<ItemEvent, _>(move |event| {
                sink.lock().push(event.id);
                Ok(())
            })?;
        }
        Ok(())
    })
    .unwrap();

    bus.publish(ItemEvent { id: 1 }).unwrap();
    assert_eq!(*seen.lock(), vec![1]);

    bus.publish(ItemEvent { id: 2 }).unwrap();
    assert_eq!(*seen.lock(), vec![1, 2]);
}

#[test]
fn handle_shares_state_with_its_coordinator() {
    init_tracing();
    let coordinator = Arc::new(MessageCoordinator::new());
    let handle = BusHandle::new(Arc::clone(&coordinator));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    handle
        .subscribe::<ItemEvent, _>(move |event| {
            sink.lock().push(event.id);
            Ok(())
        })
        .unwrap();

    coordinator.publish(ItemEvent { id: 4 }).unwrap();
    assert_eq!(*seen.lock(), vec![4]);

    handle.close();
    assert!(!coordinator.is_open());
    assert!(matches!(
        handle.publish(ItemEvent { id: 5 }),
        Err(BusError::Closed)
    ));
}
