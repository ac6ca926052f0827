mod common;

use common::{pump, pump_until, SimHost};
use quickcast::queue::CastRequest;
use quickcast::sequencer::{Sequencer, State};
use quickcast::timing::Timings;

fn request(skill_id: u16, now: u64) -> CastRequest {
    CastRequest {
        trigger_key: 0x74,
        skill_id,
        requested_at: now,
    }
}

#[test]
fn burst_of_distinct_skills_casts_each_once_then_idles() {
    let mut seq = Sequencer::new(Timings::default());
    let mut host = SimHost {
        selection: Some(1),
        ..SimHost::default()
    };
    let mut clock = 0;

    seq.submit(&mut host, request(10, 0), 0);
    seq.submit(&mut host, request(11, 0), 0);
    seq.submit(&mut host, request(12, 0), 0);

    pump(&mut seq, &mut host, &mut clock, 10_000);

    // Every skill selected exactly once, in order, then the original
    // selection re-issued for the restore.
    assert_eq!(host.set_calls, vec![10, 11, 12, 1]);
    assert_eq!(host.downs.len(), 3);
    assert_eq!(host.ups.len(), 3);
    assert_eq!(host.selection, Some(1));
    assert_eq!(seq.state(), State::Idle);
    assert!(seq.snapshot().is_none());
    assert!(seq.next_wake().is_none());
}

#[test]
fn single_cast_walks_select_confirm_click_restore() {
    let timings = Timings::default();
    let mut seq = Sequencer::new(timings);
    let mut host = SimHost {
        selection: Some(5),
        ..SimHost::default()
    };
    let mut clock = 0;

    seq.submit(&mut host, request(10, 0), 0);
    assert_eq!(host.set_calls, vec![10]);
    assert_eq!(seq.state(), State::Casting);

    // Confirm poll lands, the click goes out at the observed pointer.
    pump_until(&mut seq, &mut host, &mut clock, timings.confirm_poll_ms);
    assert_eq!(host.downs, vec![host.pointer]);
    assert_eq!(host.ups, vec![host.pointer]);

    // Settle delay passes; the queue is empty so the restore wait begins
    // with the pre-burst selection snapshotted.
    pump_until(&mut seq, &mut host, &mut clock, 100);
    assert_eq!(seq.state(), State::WaitRestore);
    assert_eq!(seq.snapshot().unwrap().skill_id, 5);

    // First restore check re-issues the original selection.
    pump_until(&mut seq, &mut host, &mut clock, 300);
    assert_eq!(host.set_calls, vec![10, 5]);
    assert_eq!(host.selection, Some(5));

    pump(&mut seq, &mut host, &mut clock, 10_000);
    assert_eq!(seq.state(), State::Idle);
    assert!(seq.snapshot().is_none());
}

#[test]
fn duplicate_submission_keeps_one_queue_entry() {
    let mut seq = Sequencer::new(Timings::default());
    let mut host = SimHost::default();

    seq.submit(&mut host, request(10, 0), 0);
    assert!(seq.is_runner_active());

    seq.submit(&mut host, request(11, 1), 1);
    seq.submit(&mut host, request(11, 2), 2);
    assert_eq!(seq.queue_len(), 1);
}

#[test]
fn same_skill_as_in_flight_runs_again_but_skips_reselection() {
    let mut seq = Sequencer::new(Timings::default());
    let mut host = SimHost {
        selection: Some(1),
        ..SimHost::default()
    };
    let mut clock = 0;

    seq.submit(&mut host, request(10, 0), 0);
    // Arrives while skill 10 is still in flight; queued, not merged into
    // the running cast.
    seq.submit(&mut host, request(10, 1), 1);
    assert_eq!(seq.queue_len(), 1);

    pump(&mut seq, &mut host, &mut clock, 10_000);

    // The second run found the skill already current and only clicked.
    assert_eq!(host.set_calls, vec![10, 1]);
    assert_eq!(host.downs.len(), 2);
    assert_eq!(seq.state(), State::Idle);
}

#[test]
fn unconfirmed_cast_is_abandoned_and_the_next_one_runs() {
    let mut seq = Sequencer::new(Timings::default());
    let mut host = SimHost {
        selection: Some(1),
        apply_selection: false,
        ..SimHost::default()
    };
    let mut clock = 0;

    seq.submit(&mut host, request(9, 0), 0);
    seq.submit(&mut host, request(11, 0), 0);
    pump(&mut seq, &mut host, &mut clock, 10_000);

    // Both casts ran their confirm budget out: selections were requested
    // but nothing was ever clicked, and the machine still drained the
    // queue and wound down normally.
    assert_eq!(host.set_calls, vec![9, 11]);
    assert!(host.downs.is_empty());
    assert_eq!(seq.state(), State::Idle);
    assert!(seq.snapshot().is_none());
}

#[test]
fn unknown_selection_skips_snapshot_and_restore() {
    let mut seq = Sequencer::new(Timings::default());
    let mut host = SimHost {
        selection: None,
        ..SimHost::default()
    };
    let mut clock = 0;

    seq.submit(&mut host, request(10, 0), 0);
    assert!(seq.snapshot().is_none());

    pump(&mut seq, &mut host, &mut clock, 10_000);

    // Nothing to restore: the machine falls straight back to idle after
    // the cast instead of entering the restore wait.
    assert_eq!(seq.state(), State::Idle);
    assert_eq!(host.set_calls, vec![10]);
    assert_eq!(host.downs.len(), 1);
}
