use std::time::Duration;

use rand::{SeedableRng, rngs::StdRng};

use namethatsong::{error::GameError, game::PlaybackQueue, types::QueueEntry};

fn entries(n: usize) -> Vec<QueueEntry> {
    (0..n)
        .map(|i| QueueEntry::new(format!("t{i}"), "al1", "ar1"))
        .collect()
}

fn sorted_ids(queue: &PlaybackQueue) -> Vec<String> {
    let mut ids: Vec<String> = queue.entries().iter().map(|e| e.track_id.clone()).collect();
    ids.sort();
    ids
}

#[test]
fn test_add_to_queue_appends() {
    let mut queue = PlaybackQueue::new();
    queue.add_to_queue(entries(2));
    queue.add_to_queue(vec![QueueEntry::new("x", "al2", "ar2")]);

    assert_eq!(queue.len(), 3);
    assert_eq!(queue.entries()[2].track_id, "x");
    assert_eq!(queue.cursor(), 0);
    assert_eq!(queue.current().map(|e| e.track_id.as_str()), Some("t0"));
    assert_eq!(queue.remaining(), 2);
}

#[test]
fn test_shuffle_preserves_entries_and_resets_cursor() {
    let mut queue = PlaybackQueue::new();
    queue.add_to_queue(entries(20));
    let before = sorted_ids(&queue);

    queue.next_in_queue().unwrap();
    queue.next_in_queue().unwrap();
    assert_eq!(queue.cursor(), 2);

    queue.shuffle_with(&mut StdRng::seed_from_u64(7));

    assert_eq!(queue.cursor(), 0);
    assert_eq!(sorted_ids(&queue), before);

    queue.shuffle();
    assert_eq!(queue.cursor(), 0);
    assert_eq!(sorted_ids(&queue), before);
}

#[test]
fn test_next_in_queue_until_exhausted() {
    let mut queue = PlaybackQueue::new();
    queue.add_to_queue(entries(3));

    assert_eq!(queue.next_in_queue().unwrap().track_id, "t1");
    assert_eq!(queue.next_in_queue().unwrap().track_id, "t2");
    assert_eq!(queue.cursor(), 2);
    assert_eq!(queue.remaining(), 0);

    assert!(matches!(
        queue.next_in_queue(),
        Err(GameError::QueueExhausted)
    ));
    assert_eq!(queue.cursor(), 2);
}

#[test]
fn test_next_in_empty_queue() {
    let mut queue = PlaybackQueue::new();

    assert!(matches!(
        queue.next_in_queue(),
        Err(GameError::QueueExhausted)
    ));
    assert_eq!(queue.cursor(), 0);
    assert!(queue.current().is_none());
}

#[test]
fn test_clear_queue() {
    let mut queue = PlaybackQueue::new();
    queue.add_to_queue(entries(3));
    queue.next_in_queue().unwrap();
    queue.start_track(Duration::from_secs(60));
    assert!(queue.is_playing());

    queue.clear_queue();

    assert!(queue.is_empty());
    assert_eq!(queue.cursor(), 0);
    assert!(!queue.is_playing());
    assert!(!queue.song_over());
    assert_eq!(queue.elapsed(), Duration::ZERO);
}

#[test]
fn test_song_over() {
    let mut queue = PlaybackQueue::new();
    queue.add_to_queue(entries(2));

    // no timer yet
    assert!(!queue.song_over());

    queue.start_track(Duration::from_secs(300));
    assert!(!queue.song_over());
    assert_eq!(queue.duration(), Duration::from_secs(300));

    queue.start_track(Duration::ZERO);
    assert!(queue.song_over());

    // the predicate never moves the queue
    assert_eq!(queue.cursor(), 0);
}
