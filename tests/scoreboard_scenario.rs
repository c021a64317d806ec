use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use koth_terminal::config::Config;
use koth_terminal::queue::RoleEvent;
use koth_terminal::scoreboard::{Scoreboard, ScoreboardObserver, Snapshot};
use koth_terminal::timer::TimerState;

#[derive(Default)]
struct Recorded {
    snapshots: Vec<Snapshot>,
    events: Vec<RoleEvent>,
}

struct Recorder(Rc<RefCell<Recorded>>);

impl ScoreboardObserver for Recorder {
    fn state_changed(&mut self, snapshot: &Snapshot) {
        self.0.borrow_mut().snapshots.push(snapshot.clone());
    }

    fn role_event(&mut self, event: &RoleEvent) {
        self.0.borrow_mut().events.push(event.clone());
    }
}

fn board_with_recorder(names: &[&str]) -> (Scoreboard, Rc<RefCell<Recorded>>) {
    let mut board = Scoreboard::from_names(names.iter().copied(), 600, Instant::now());
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    board.add_observer(Box::new(Recorder(recorded.clone())));
    (board, recorded)
}

#[test]
fn alice_bob_carol_dave() {
    let (mut board, recorded) = board_with_recorder(&["Alice", "Bob", "Carol", "Dave"]);

    board.adjust_king_score(1).unwrap();
    board.adjust_challenger_score(1).unwrap();
    board.adjust_challenger_score(1).unwrap();
    board.rotate_king_to_queue().unwrap();

    let snap = board.snapshot();
    let order: Vec<&str> = board
        .queue()
        .contestants()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(order, vec!["Bob", "Carol", "Dave", "Alice"]);
    assert_eq!(snap.king.as_ref().map(|c| (c.name.as_str(), c.score)), Some(("Bob", 2)));
    assert_eq!(
        snap.challenger.as_ref().map(|c| (c.name.as_str(), c.score)),
        Some(("Carol", 0))
    );

    let ranking: Vec<(usize, &str, i64)> = snap
        .ranking
        .iter()
        .map(|e| (e.position, e.contestant.name.as_str(), e.contestant.score))
        .collect();
    assert_eq!(
        ranking,
        vec![(1, "Bob", 2), (2, "Alice", 1), (3, "Carol", 0), (3, "Dave", 0)]
    );

    let recorded = recorded.borrow();
    assert_eq!(recorded.events.len(), 4);
    assert_eq!(recorded.snapshots.len(), 4);
    assert_eq!(recorded.snapshots.last(), Some(&snap));
}

#[test]
fn rejected_operations_notify_nobody() {
    let (mut board, recorded) = board_with_recorder(&["Solo"]);
    assert!(board.adjust_king_score(1).is_err());
    assert!(board.promote_challenger_to_king().is_err());
    assert!(recorded.borrow().events.is_empty());
    assert!(recorded.borrow().snapshots.is_empty());
    assert_eq!(board.queue().king().map(|c| c.score), Some(0));
}

#[test]
fn boundary_navigation_does_not_notify() {
    let (mut board, recorded) = board_with_recorder(&["A", "B", "C", "D"]);
    board.select(2).unwrap();
    let after_select = recorded.borrow().snapshots.len();
    assert_eq!(after_select, 1);
    assert!(!board.move_selection_up().unwrap().changed());
    assert_eq!(recorded.borrow().snapshots.len(), after_select);
    assert!(board.move_selection_down().unwrap().changed());
    assert_eq!(recorded.borrow().snapshots.len(), after_select + 1);
}

#[test]
fn waiting_moves_are_logged_and_published() {
    let (mut board, recorded) = board_with_recorder(&["A", "B", "C", "D"]);
    board.select(2).unwrap();
    assert!(board.move_selection_down().unwrap().changed());

    assert_eq!(
        recorded.borrow().events,
        vec![RoleEvent::Reordered {
            name: "C".to_string(),
            from: 2,
            to: 3,
        }]
    );
    assert_eq!(
        board.logs().back().map(String::as_str),
        Some("[INFO] C moved from slot 2 to 3")
    );

    let logged = board.logs().len();
    assert!(!board.move_selection_down().unwrap().changed());
    assert_eq!(recorded.borrow().events.len(), 1);
    assert_eq!(board.logs().len(), logged);
}

#[test]
fn backward_nudge_with_extreme_step_leaves_clock_alone() {
    let mut board =
        Scoreboard::from_names(["A", "B"], 90, Instant::now()).with_timer_step(i64::MIN);
    board.nudge_timer(false);
    assert_eq!(board.timer().remaining_secs(), 90);
    board.nudge_timer(true);
    assert_eq!(board.timer().remaining_secs(), 90);
}

#[test]
fn board_from_config_reports_unusable_audit_log() {
    let dir = std::env::temp_dir().join(format!("koth-board-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let blocker = dir.join("not-a-dir");
    fs::write(&blocker, "").expect("blocker file");

    let mut cfg = Config::parse(r#"contestants = ["Ann", "Ben", "Ann"]"#, Path::new("."))
        .expect("config should parse");
    cfg.audit_log = Some(blocker.join("audit.jsonl"));
    let mut board = Scoreboard::from_config(&cfg, Instant::now());

    let logs: Vec<&str> = board.logs().iter().map(String::as_str).collect();
    assert_eq!(logs.len(), 3, "{logs:?}");
    assert!(logs[0].contains("Ann"), "{logs:?}");
    assert!(logs[1].starts_with("[WARN] Audit log disabled"), "{logs:?}");
    assert_eq!(logs[2], "[INFO] 3 contestants, clock 100:00");

    board.adjust_king_score(1).unwrap();
    assert!(!blocker.join("audit.jsonl").exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn board_from_config_writes_audit_records() {
    let dir = std::env::temp_dir().join(format!("koth-board-audit-{}", std::process::id()));
    let path = dir.join("nested").join("audit.jsonl");
    let mut cfg = Config::parse(r#"contestants = ["Ann", "Ben", "Cy"]"#, Path::new("."))
        .expect("config should parse");
    cfg.audit_log = Some(path.clone());
    let mut board = Scoreboard::from_config(&cfg, Instant::now());
    assert!(board.logs().iter().any(|l| l.starts_with("[INFO] Audit log: ")));

    board.rotate_king_to_queue().unwrap();
    let written = fs::read_to_string(&path).expect("audit file");
    assert_eq!(written.lines().count(), 1);
    assert!(written.contains("\"kind\":\"king_to_queue\""), "{written}");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn timer_ticks_reach_observers() {
    let t0 = Instant::now();
    let mut board = Scoreboard::from_names(["A", "B"], 3, t0).with_timer_step(30);
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    board.add_observer(Box::new(Recorder(recorded.clone())));

    assert_eq!(board.toggle_timer(t0), TimerState::Running);
    assert!(!board.poll_timer(t0 + Duration::from_millis(400)));
    assert!(board.poll_timer(t0 + Duration::from_secs(3)));
    assert_eq!(board.timer().remaining_secs(), 0);
    assert!(board.logs().iter().any(|l| l == "[INFO] Time is up"));

    board.nudge_timer(true);
    assert_eq!(board.timer().remaining_secs(), 30);
    board.nudge_timer(false);
    board.adjust_timer(-1);
    assert_eq!(board.timer().remaining_secs(), -1);

    let last = recorded.borrow().snapshots.last().cloned().expect("snapshots recorded");
    assert_eq!(last.timer.clock, "-00:01");
    assert_eq!(last.timer.state, TimerState::Running);
}
