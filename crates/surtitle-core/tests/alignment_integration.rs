//! End-to-end alignment over a short scene.

use std::sync::Arc;

use surtitle_core::{Evaluation, SkipReason, Tracker, normalize};
use surtitle_types::{AlignmentConfig, CueCause, Script, ScriptLine};

fn scene() -> Script {
    Script::new(vec![
        ScriptLine::new("1", "Who's there?").with_speaker("BERNARDO"),
        ScriptLine::new("2", "Nay, answer me. Stand and unfold yourself.")
            .with_speaker("FRANCISCO"),
        ScriptLine::new("3", "Long live the king!").with_speaker("BERNARDO"),
        ScriptLine::new("4", "Bernardo?").with_speaker("FRANCISCO"),
        ScriptLine::new("5", "He.").with_speaker("BERNARDO"),
        ScriptLine::new("6", "You come most carefully upon your hour.").with_speaker("FRANCISCO"),
    ])
    .unwrap()
}

#[test]
fn follows_a_performance() {
    let tracker = Tracker::default();
    tracker.load(scene());
    tracker.set_listening(true);

    // Partial, growing utterances as a recognizer would revise them.
    let fragments = [
        "who's",
        "who's there",
        "nay",
        "nay answer me",    // entry of line 2 → advance to 1
        "stand and unfold", // exit of line 2 → advance to 2
        "stand and unfold yourself",
        "long live",        // one exit-zone token of line 3 → hold
    ];
    let advanced: Vec<_> = fragments
        .iter()
        .map(|f| tracker.ingest(f))
        .filter_map(|e| match e {
            Evaluation::Advanced { to, .. } => Some(to),
            _ => None,
        })
        .collect();

    assert_eq!(advanced, [1, 2]);
    assert_eq!(tracker.snapshot().current_line.unwrap().id, "3");
}

#[test]
fn last_line_is_terminal() {
    let tracker = Tracker::default();
    tracker.load(scene());
    tracker.set_listening(true);
    tracker.jump_to(5);

    for fragment in ["you come most carefully upon your hour", "who's there", "nay answer"] {
        assert_eq!(tracker.ingest(fragment), Evaluation::Skipped(SkipReason::AtLastLine));
    }
    assert_eq!(tracker.cursor(), Some(5));
}

#[test]
fn jump_then_stale_exit_words_do_not_skip() {
    let tracker = Tracker::default();
    tracker.load(Script::from_texts([
        "The king is dead, long live the king",
        "Bring forth the crown",
        "The crown is heavy on his brow tonight",
        "Sound the trumpets",
    ]));
    tracker.set_listening(true);

    tracker.jump_to(1);
    // Exit words of line 0 mean nothing for line 1 → 2.
    assert_eq!(tracker.ingest("long live the king"), Evaluation::Held);
    assert_eq!(tracker.cursor(), Some(1));
}

#[test]
fn custom_config_changes_window() {
    let config = AlignmentConfig {
        window_tokens: 2,
        ..AlignmentConfig::default()
    };
    let tracker = Tracker::new(config);
    tracker.load(Script::from_texts(["one two three four five", "six seven eight"]));
    tracker.set_listening(true);

    // "six seven" is pushed out of a two-token window.
    assert_eq!(tracker.ingest("six seven nine ten"), Evaluation::Held);
    assert_eq!(tracker.window_len(), 2);
    assert!(tracker.ingest("six seven").is_advanced());
}

#[test]
fn concurrent_ingest_and_navigation_keep_cursor_in_bounds() {
    let tracker = Arc::new(Tracker::default());
    let lines: Vec<String> = (0..50)
        .map(|i| format!("alpha{i} beta{i} gamma{i} delta{i}"))
        .collect();
    tracker.load(Script::from_texts(lines));
    tracker.set_listening(true);

    let speaker = {
        let tracker = Arc::clone(&tracker);
        std::thread::spawn(move || {
            for i in 0..500 {
                let n = i % 50;
                tracker.ingest(&format!("alpha{n} beta{n}"));
            }
        })
    };
    let operator = {
        let tracker = Arc::clone(&tracker);
        std::thread::spawn(move || {
            for i in 0..200isize {
                tracker.jump_to(i % 60 - 5);
            }
        })
    };
    speaker.join().unwrap();
    operator.join().unwrap();

    let snap = tracker.snapshot();
    assert!(snap.cursor.is_none_or(|c| c < 50));
    assert_eq!(snap.total_lines, 50);
}

#[tokio::test]
async fn renderer_observes_changes_in_order() {
    let tracker = Arc::new(Tracker::default());
    let mut cues = tracker.subscribe_cues();
    let mut snapshots = tracker.subscribe();

    tracker.load(scene());
    tracker.set_listening(true);
    tracker.ingest("nay answer");
    tracker.advance();
    tracker.jump_to(-1);

    let mut seen = Vec::new();
    while let Ok(cue) = cues.try_recv() {
        seen.push((cue.to, cue.cause));
    }
    assert_eq!(seen.len(), 4);
    assert_eq!(seen[0], (Some(0), CueCause::Loaded));
    assert!(matches!(seen[1], (Some(1), CueCause::Auto { .. })));
    assert_eq!(seen[2], (Some(2), CueCause::Manual));
    assert_eq!(seen[3], (None, CueCause::Manual));

    snapshots.changed().await.unwrap();
    let snap = snapshots.borrow_and_update().clone();
    assert_eq!(snap.position(), -1);
    assert!(snap.listening);
    assert_eq!(snap.last_recognized, "nay answer");
}

#[test]
fn normalization_agrees_between_script_and_speech() {
    let line = "Nay, answer me. Stand and unfold yourself.";
    let heard = "nay answer me stand and unfold yourself";
    assert_eq!(normalize(line), normalize(heard));
}
