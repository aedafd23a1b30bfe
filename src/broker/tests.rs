use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::Instant;

use super::endpoint::Endpoint;
use super::message::Message;
use super::queues::{End, QueueKind, QueueRegistry, QueueSizes};
use super::store::ItemStore;
use super::topic::Topic;
use super::{Broker, BrokerOptions, TopicRegistry};
use crate::utils::error::{BrokerError, DeliveryError};

/// Records every message it is handed.
struct Recorder {
    id: String,
    received: Mutex<Vec<Arc<Message>>>,
}

impl Recorder {
    fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            received: Mutex::new(Vec::new()),
        })
    }

    fn payloads(&self) -> Vec<Bytes> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.payload.clone())
            .collect()
    }
}

#[async_trait]
impl Endpoint for Recorder {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send(&self, message: Arc<Message>) -> Result<(), DeliveryError> {
        self.received.lock().unwrap().push(message);
        Ok(())
    }
}

/// Behaves like a connection that has already closed.
struct Broken(String);

#[async_trait]
impl Endpoint for Broken {
    fn id(&self) -> &str {
        &self.0
    }

    async fn send(&self, _message: Arc<Message>) -> Result<(), DeliveryError> {
        Err(DeliveryError::Closed)
    }
}

/// Never finishes a send.
struct Stalled(String);

#[async_trait]
impl Endpoint for Stalled {
    fn id(&self) -> &str {
        &self.0
    }

    async fn send(&self, _message: Arc<Message>) -> Result<(), DeliveryError> {
        std::future::pending().await
    }
}

fn as_endpoint<E: Endpoint + 'static>(endpoint: &Arc<E>) -> Arc<dyn Endpoint> {
    endpoint.clone()
}

fn fast_broker() -> Broker {
    Broker::new(BrokerOptions {
        delivery_timeout: Duration::from_millis(50),
        ..BrokerOptions::default()
    })
}

#[test]
fn test_topic_new() {
    let topic = Topic::new("test_topic");
    assert_eq!(topic.name(), "test_topic");
    assert!(topic.is_empty());
}

#[test]
fn test_topic_subscribe_is_idempotent() {
    let topic = Topic::new("test_topic");
    let client = as_endpoint(&Recorder::new("client1"));

    let first = topic.subscribe(&client);
    let second = topic.subscribe(&client);
    assert_eq!(first, second);
    assert_eq!(topic.len(), 1);
}

#[test]
fn test_topic_unsubscribe_needs_matching_handle() {
    let topic = Topic::new("test_topic");
    let client = as_endpoint(&Recorder::new("client1"));
    let handle = topic.subscribe(&client);

    assert!(!topic.unsubscribe("client1", super::SubscriptionId::new()));
    assert_eq!(topic.len(), 1);
    assert!(topic.unsubscribe("client1", handle));
    assert!(topic.is_empty());
}

#[test]
fn test_registry_creates_and_prunes_topics() {
    let registry = TopicRegistry::new();
    let client = as_endpoint(&Recorder::new("client1"));

    let handle = registry.subscribe("news", &client);
    assert_eq!(registry.list_topics(), vec!["news".to_string()]);
    assert_eq!(registry.subscription_count(), 1);

    assert!(registry.unsubscribe(handle));
    assert!(!registry.unsubscribe(handle));
    assert_eq!(registry.topic_count(), 0);
    assert_eq!(registry.subscription_count(), 0);
}

#[test]
fn test_subscribers_of_returns_a_snapshot() {
    let registry = TopicRegistry::new();
    let a = as_endpoint(&Recorder::new("a"));
    let b = as_endpoint(&Recorder::new("b"));
    let handle_a = registry.subscribe("news", &a);
    registry.subscribe("news", &b);

    let snapshot = registry.subscribers_of("news");
    registry.unsubscribe(handle_a);

    assert_eq!(snapshot.len(), 2);
    let live: Vec<_> = registry
        .subscribers_of("news")
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(live, vec!["b".to_string()]);
    assert!(registry.subscribers_of("missing").is_empty());
}

#[test]
fn test_unsubscribe_all_clears_every_topic() {
    let registry = TopicRegistry::new();
    let client = as_endpoint(&Recorder::new("client1"));
    let other = as_endpoint(&Recorder::new("client2"));
    for topic in ["a", "b", "c"] {
        registry.subscribe(topic, &client);
    }
    registry.subscribe("b", &other);

    assert_eq!(registry.unsubscribe_all("client1"), 3);
    assert_eq!(registry.list_topics(), vec!["b".to_string()]);
    assert_eq!(registry.subscription_count(), 1);
}

#[test]
fn test_resubscribe_replaces_dead_handle_in_index() {
    let registry = TopicRegistry::new();
    let first = Recorder::new("client1");
    let stale = registry.subscribe("news", &as_endpoint(&first));
    drop(first);

    let second = as_endpoint(&Recorder::new("client1"));
    let fresh = registry.subscribe("news", &second);
    assert_ne!(stale, fresh);
    assert_eq!(registry.subscription_count(), 1);
    assert!(!registry.unsubscribe(stale));
    assert!(registry.unsubscribe(fresh));
    assert_eq!(registry.topic_count(), 0);
}

#[test]
fn test_subscription_index_tracks_topics_under_contention() {
    const ROUNDS: usize = 20_000;
    let registry = Arc::new(TopicRegistry::new());
    let client = as_endpoint(&Recorder::new("client1"));

    let resubscriber = {
        let registry = Arc::clone(&registry);
        let client = Arc::clone(&client);
        std::thread::spawn(move || {
            for _ in 0..ROUNDS {
                registry.subscribe("t", &client);
            }
        })
    };
    let churner = {
        let registry = Arc::clone(&registry);
        let client = Arc::clone(&client);
        std::thread::spawn(move || {
            for _ in 0..ROUNDS {
                let handle = registry.subscribe("t", &client);
                registry.unsubscribe(handle);
            }
        })
    };
    resubscriber.join().unwrap();
    churner.join().unwrap();

    assert_eq!(
        registry.subscription_count(),
        registry.subscribers_of("t").len()
    );

    let handle = registry.subscribe("t", &client);
    assert_eq!(registry.subscription_count(), 1);
    assert!(registry.unsubscribe(handle));
    assert_eq!(registry.subscription_count(), 0);
    assert_eq!(registry.topic_count(), 0);
}

#[tokio::test]
async fn test_news_scenario() {
    let broker = Broker::default();
    let e1 = Recorder::new("e1");
    let e2 = Recorder::new("e2");
    let h1 = broker.subscribe("news", &as_endpoint(&e1)).unwrap();
    broker.subscribe("news", &as_endpoint(&e2)).unwrap();

    assert_eq!(broker.publish("news", Bytes::from("hello")).await, Ok(2));
    assert!(broker.unsubscribe(h1));
    assert_eq!(broker.publish("news", Bytes::from("bye")).await, Ok(1));

    assert_eq!(e1.payloads(), vec![Bytes::from("hello")]);
    assert_eq!(e2.payloads(), vec![Bytes::from("hello"), Bytes::from("bye")]);
}

#[tokio::test]
async fn test_published_message_carries_topic() {
    let broker = Broker::default();
    let client = Recorder::new("client1");
    broker.subscribe("sensors", &as_endpoint(&client)).unwrap();
    broker.publish("sensors", Bytes::from("25")).await.unwrap();

    let received = client.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].topic, "sensors");
    assert!(received[0].timestamp > 0);
}

#[tokio::test]
async fn test_publish_to_topic_without_subscribers() {
    let broker = Broker::default();
    assert_eq!(broker.publish("nobody", Bytes::from("hello")).await, Ok(0));

    let stats = broker.stats();
    assert_eq!(stats.published, 1);
    assert_eq!(stats.delivered, 0);
    assert_eq!(stats.topics, 0);
}

#[tokio::test]
async fn test_failed_delivery_removes_only_that_subscriber() {
    let broker = Broker::default();
    let healthy = Recorder::new("healthy");
    let broken = Arc::new(Broken("broken".into()));
    broker.subscribe("news", &as_endpoint(&broken)).unwrap();
    broker.subscribe("news", &as_endpoint(&healthy)).unwrap();

    assert_eq!(broker.publish("news", Bytes::from("one")).await, Ok(1));
    assert_eq!(broker.publish("news", Bytes::from("two")).await, Ok(1));

    let ids: Vec<_> = broker
        .topics()
        .subscribers_of("news")
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec!["healthy".to_string()]);
    assert_eq!(healthy.payloads().len(), 2);
    assert_eq!(broker.stats().dropped, 1);
}

#[tokio::test]
async fn test_stalled_subscriber_cannot_hold_up_the_topic() {
    let broker = fast_broker();
    let healthy = Recorder::new("healthy");
    let stalled = Arc::new(Stalled("stalled".into()));
    broker.subscribe("news", &as_endpoint(&stalled)).unwrap();
    broker.subscribe("news", &as_endpoint(&healthy)).unwrap();

    let delivered = tokio::time::timeout(
        Duration::from_secs(2),
        broker.publish("news", Bytes::from("hello")),
    )
    .await
    .expect("publish should finish within the delivery timeout");

    assert_eq!(delivered, Ok(1));
    assert_eq!(healthy.payloads(), vec![Bytes::from("hello")]);
    assert_eq!(broker.topics().subscribers_of("news").len(), 1);
}

#[tokio::test]
async fn test_dropped_endpoint_is_pruned_on_publish() {
    let broker = Broker::default();
    let client = Recorder::new("gone");
    broker.subscribe("news", &as_endpoint(&client)).unwrap();
    drop(client);

    assert_eq!(broker.publish("news", Bytes::from("hello")).await, Ok(0));
    assert_eq!(broker.stats().topics, 0);
    assert_eq!(broker.stats().subscriptions, 0);
}

#[tokio::test]
async fn test_disconnect_stops_delivery() {
    let broker = Broker::default();
    let client = Recorder::new("client1");
    broker.subscribe("a", &as_endpoint(&client)).unwrap();
    broker.subscribe("b", &as_endpoint(&client)).unwrap();

    assert_eq!(broker.disconnect("client1"), 2);
    assert_eq!(broker.publish("a", Bytes::from("x")).await, Ok(0));
    assert!(client.payloads().is_empty());
}

#[tokio::test]
async fn test_concurrent_publish_and_unsubscribe() {
    let broker = Arc::new(Broker::default());
    let clients: Vec<_> = (0..32).map(|i| Recorder::new(&format!("c{i}"))).collect();
    let handles: Vec<_> = clients
        .iter()
        .map(|c| broker.subscribe("busy", &as_endpoint(c)).unwrap())
        .collect();

    let publisher = {
        let broker = Arc::clone(&broker);
        tokio::spawn(async move {
            for i in 0..100 {
                broker
                    .publish("busy", Bytes::from(i.to_string()))
                    .await
                    .unwrap();
            }
        })
    };
    for handle in handles {
        broker.unsubscribe(handle);
        tokio::task::yield_now().await;
    }
    publisher.await.unwrap();

    assert_eq!(broker.stats().subscriptions, 0);
    for client in &clients {
        let mut seen = client.payloads();
        let before = seen.len();
        seen.dedup();
        assert_eq!(seen.len(), before, "no payload delivered twice");
    }
}

#[test]
fn test_empty_topic_name_is_rejected() {
    let broker = Broker::default();
    let client = as_endpoint(&Recorder::new("client1"));
    assert_eq!(broker.subscribe("", &client), Err(BrokerError::InvalidTopic));
}

#[test]
fn test_queue_and_list_scenarios() {
    let broker = Broker::default();
    for item in ["a", "b", "c"] {
        broker.enqueue("queue", None, Bytes::from(item)).unwrap();
        broker.enqueue("list", None, Bytes::from(item)).unwrap();
    }

    let from_queue: Vec<_> = (0..3)
        .map(|_| broker.dequeue("queue", None, 0).unwrap().unwrap())
        .collect();
    let from_list: Vec<_> = (0..3)
        .map(|_| broker.dequeue("list", None, 0).unwrap().unwrap())
        .collect();

    assert_eq!(from_queue, vec!["a", "b", "c"]);
    assert_eq!(from_list, vec!["c", "b", "a"]);
    assert_eq!(broker.dequeue("queue", None, 0), Ok(None));
}

#[test]
fn test_unknown_queue_type_is_a_client_error() {
    let broker = Broker::default();
    let err = broker
        .enqueue("Queue", None, Bytes::from("x"))
        .unwrap_err();
    assert_eq!(err, BrokerError::UnknownType("Queue".into()));
    assert!(err.is_client_error());
    assert!(broker.dequeue("stack", None, 0).is_err());
}

#[test]
fn test_oversized_payload_is_rejected() {
    let broker = Broker::new(BrokerOptions {
        max_payload_bytes: 4,
        ..BrokerOptions::default()
    });
    assert_eq!(
        broker.enqueue("deque", None, Bytes::from("12345")),
        Err(BrokerError::PayloadTooLarge { size: 5, limit: 4 })
    );
    assert_eq!(broker.stats().queues.deque, 0);
}

#[tokio::test]
async fn test_fill_inserts_synthetic_items() {
    let broker = Broker::default();
    assert_eq!(broker.fill("deque", 25).await, Ok(25));
    assert_eq!(broker.stats().queues.deque, 25);

    let item = broker.dequeue("deque", None, 0).unwrap().unwrap();
    let value: u16 = std::str::from_utf8(&item).unwrap().parse().unwrap();
    assert!(value <= 1024);
}

#[tokio::test]
async fn test_fill_over_limit_is_rejected_untouched() {
    let broker = Broker::new(BrokerOptions {
        max_fill: 10,
        ..BrokerOptions::default()
    });
    let err = broker.fill("list", 11).await.unwrap_err();
    assert_eq!(err, BrokerError::FillTooLarge { count: 11, limit: 10 });
    assert!(err.is_client_error());
    assert_eq!(broker.stats().queues.list, 0);
    assert_eq!(broker.fill("list", 10).await, Ok(10));
}

#[tokio::test]
async fn test_large_fill_lets_other_tasks_run() {
    const COUNT: usize = 20_000;
    let broker = Arc::new(Broker::default());

    // On the single-threaded test runtime this task can only run once fill
    // yields.
    let observer = {
        let broker = Arc::clone(&broker);
        tokio::spawn(async move { broker.queues().store(QueueKind::List).len() })
    };
    assert_eq!(broker.fill("list", COUNT).await, Ok(COUNT));

    let seen_mid_fill = observer.await.unwrap();
    assert!(seen_mid_fill > 0);
    assert!(seen_mid_fill < COUNT);
}

#[tokio::test]
async fn test_dequeue_wait_is_capped() {
    let broker = Broker::new(BrokerOptions {
        max_wait: Duration::from_millis(20),
        ..BrokerOptions::default()
    });
    let result = tokio::time::timeout(
        Duration::from_secs(2),
        broker.dequeue_wait("queue", None, 0, Duration::from_secs(60)),
    )
    .await
    .expect("wait should be capped");
    assert_eq!(result, Ok(None));
}

// Item stores

fn drain<T>(store: &ItemStore<T>, end: Option<End>) -> Vec<T> {
    let mut out = Vec::new();
    while let Some(item) = store.remove(end).unwrap() {
        out.push(item);
    }
    out
}

#[test]
fn test_queue_is_fifo() {
    let store = ItemStore::new(QueueKind::Queue);
    for item in ["a", "b", "c"] {
        store.insert(None, item).unwrap();
    }
    assert_eq!(drain(&store, None), vec!["a", "b", "c"]);
}

#[test]
fn test_list_is_lifo() {
    let store = ItemStore::new(QueueKind::List);
    for item in ["a", "b", "c"] {
        store.insert(None, item).unwrap();
    }
    assert_eq!(drain(&store, None), vec!["c", "b", "a"]);
}

#[test]
fn test_deque_opposite_ends_preserve_fifo() {
    let store = ItemStore::new(QueueKind::Deque);
    for item in [1, 2, 3] {
        store.insert(Some(End::Head), item).unwrap();
    }
    assert_eq!(drain(&store, Some(End::Tail)), vec![1, 2, 3]);

    for item in [4, 5, 6] {
        store.insert(Some(End::Tail), item).unwrap();
    }
    assert_eq!(drain(&store, Some(End::Head)), vec![4, 5, 6]);
}

#[test]
fn test_deque_same_end_is_lifo() {
    let store = ItemStore::new(QueueKind::Deque);
    for item in [1, 2, 3] {
        store.insert(Some(End::Head), item).unwrap();
    }
    assert_eq!(drain(&store, Some(End::Head)), vec![3, 2, 1]);

    for item in [4, 5, 6] {
        store.insert(Some(End::Tail), item).unwrap();
    }
    assert_eq!(drain(&store, Some(End::Tail)), vec![6, 5, 4]);
}

#[test]
fn test_remove_from_empty_returns_none() {
    for kind in QueueKind::ALL {
        let store: ItemStore<u8> = ItemStore::new(kind);
        assert_eq!(store.remove(None), Ok(None));
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }
}

#[test]
fn test_wrong_end_is_rejected_without_side_effects() {
    let store = ItemStore::new(QueueKind::Queue);
    store.insert(None, "a").unwrap();
    assert!(store.insert(Some(End::Head), "b").is_err());
    assert!(store.remove(Some(End::Tail)).is_err());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_offset_counts_from_the_removal_end() {
    let list = ItemStore::new(QueueKind::List);
    for item in ["a", "b", "c", "d"] {
        list.insert(None, item).unwrap();
    }
    assert_eq!(list.remove_at(None, 1), Ok(Some("c")));
    assert_eq!(list.remove_at(None, 5), Ok(None));
    assert_eq!(drain(&list, None), vec!["d", "b", "a"]);

    let deque = ItemStore::new(QueueKind::Deque);
    for item in ["a", "b", "c", "d"] {
        deque.insert(None, item).unwrap();
    }
    assert_eq!(deque.remove_at(Some(End::Head), 2), Ok(Some("c")));
    assert_eq!(deque.remove_at(Some(End::Tail), 2), Ok(Some("a")));
    assert_eq!(drain(&deque, None), vec!["b", "d"]);
}

#[test]
fn test_queue_rejects_offsets() {
    let store = ItemStore::new(QueueKind::Queue);
    store.insert(None, 1).unwrap();
    assert_eq!(
        store.remove_at(None, 1),
        Err(BrokerError::OffsetUnsupported(QueueKind::Queue))
    );
    assert_eq!(store.remove_at(None, 0), Ok(Some(1)));
}

#[test]
fn test_concurrent_producers_and_consumers_lose_nothing() {
    const PRODUCERS: usize = 8;
    const PER_PRODUCER: usize = 1_000;

    for kind in QueueKind::ALL {
        let store = Arc::new(ItemStore::new(kind));

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..PER_PRODUCER {
                        store.insert(None, p * PER_PRODUCER + i).unwrap();
                    }
                })
            })
            .collect();

        let consumers: Vec<_> = (0..PRODUCERS)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let mut got = Vec::new();
                    for _ in 0..PER_PRODUCER {
                        if let Some(item) = store.remove(None).unwrap() {
                            got.push(item);
                        }
                    }
                    got
                })
            })
            .collect();

        for handle in producers {
            handle.join().unwrap();
        }
        let mut seen: Vec<usize> = consumers
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        seen.extend(drain(&store, None));

        assert_eq!(seen.len(), PRODUCERS * PER_PRODUCER, "{kind}");
        let unique: HashSet<_> = seen.iter().copied().collect();
        assert_eq!(unique.len(), seen.len(), "{kind} delivered an item twice");
    }
}

#[test]
fn test_single_item_is_removed_once() {
    let store = Arc::new(ItemStore::new(QueueKind::Queue));
    store.insert(None, "only").unwrap();

    let winners: usize = (0..16)
        .map(|_| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.remove(None).unwrap().is_some())
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap() as usize)
        .sum();

    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_remove_wait_returns_item_inserted_later() {
    let store = Arc::new(ItemStore::new(QueueKind::Queue));

    let producer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            store.insert(None, "late").unwrap();
        })
    };

    let got = store
        .remove_wait(None, 0, Duration::from_secs(5))
        .await
        .unwrap();
    producer.await.unwrap();
    assert_eq!(got, Some("late"));
}

#[tokio::test]
async fn test_remove_wait_times_out_empty() {
    let store: ItemStore<u8> = ItemStore::new(QueueKind::List);
    let started = Instant::now();
    let got = store
        .remove_wait(None, 0, Duration::from_millis(30))
        .await
        .unwrap();
    assert_eq!(got, None);
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[tokio::test]
async fn test_cancelled_wait_leaves_store_usable() {
    let store = ItemStore::new(QueueKind::Queue);
    let wait = store.remove_wait(None, 0, Duration::from_secs(10));
    let _ = tokio::time::timeout(Duration::from_millis(10), wait).await;

    store.insert(None, 7).unwrap();
    assert_eq!(store.remove(None), Ok(Some(7)));
}

// Queue kinds and registry

#[test]
fn test_parses_exactly_the_three_kinds() {
    assert_eq!("list".parse::<QueueKind>(), Ok(QueueKind::List));
    assert_eq!("queue".parse::<QueueKind>(), Ok(QueueKind::Queue));
    assert_eq!("deque".parse::<QueueKind>(), Ok(QueueKind::Deque));

    for bad in ["List", "QUEUE", "stack", "", " deque"] {
        assert_eq!(
            bad.parse::<QueueKind>(),
            Err(BrokerError::UnknownType(bad.to_string()))
        );
    }
}

#[test]
fn test_list_and_queue_only_insert_at_tail() {
    assert_eq!(QueueKind::List.insert_end(None), Ok(End::Tail));
    assert_eq!(QueueKind::Queue.insert_end(Some(End::Tail)), Ok(End::Tail));
    assert!(QueueKind::List.insert_end(Some(End::Head)).is_err());
    assert!(QueueKind::Queue.insert_end(Some(End::Head)).is_err());
    assert_eq!(QueueKind::Deque.insert_end(Some(End::Head)), Ok(End::Head));
    assert_eq!(QueueKind::Deque.insert_end(None), Ok(End::Tail));
}

#[test]
fn test_remove_ends_follow_discipline() {
    assert_eq!(QueueKind::List.remove_end(None), Ok(End::Tail));
    assert_eq!(QueueKind::Queue.remove_end(None), Ok(End::Head));
    assert_eq!(QueueKind::Deque.remove_end(None), Ok(End::Head));
    assert_eq!(QueueKind::Deque.remove_end(Some(End::Tail)), Ok(End::Tail));
    assert_eq!(
        QueueKind::Queue.remove_end(Some(End::Tail)),
        Err(BrokerError::InvalidEnd {
            kind: QueueKind::Queue,
            end: End::Tail
        })
    );
    assert!(QueueKind::List.remove_end(Some(End::Head)).is_err());
}

#[test]
fn test_registry_resolves_one_store_per_kind() {
    let registry: QueueRegistry<&str> = QueueRegistry::new();
    for kind in QueueKind::ALL {
        let store = registry.resolve(kind.as_str()).unwrap();
        assert_eq!(store.kind(), kind);
        assert!(std::ptr::eq(store, registry.store(kind)));
    }
    assert!(matches!(
        registry.resolve("topic"),
        Err(BrokerError::UnknownType(_))
    ));
}

#[test]
fn test_stores_do_not_share_items() {
    let registry: QueueRegistry<&str> = QueueRegistry::new();
    registry.store(QueueKind::List).insert(None, "a").unwrap();
    registry.store(QueueKind::Deque).insert(None, "b").unwrap();
    registry.store(QueueKind::Deque).insert(None, "c").unwrap();

    assert_eq!(
        registry.sizes(),
        QueueSizes {
            list: 1,
            queue: 0,
            deque: 2
        }
    );
    assert_eq!(registry.store(QueueKind::Queue).remove(None), Ok(None));
}
