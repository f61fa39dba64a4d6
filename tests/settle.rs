//! Window-manager drag settle tests
//!
//! Titlebar drags report only window moves; reattachment is evaluated once
//! the window has been still for the debounce interval.

mod common;

use std::time::{Duration, Instant};

use common::*;
use dockyard::geometry::Point;
use dockyard::messages::Msg;
use dockyard::model::{AttachState, DragState, ModuleInput, ModuleKind};
use dockyard::update::update;

const SETTLE: Duration = Duration::from_millis(300);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_native_drag_detaches_attached_module() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);

    send(&mut model, a, ModuleInput::NativeDragStarted);

    let module = model.module(a).unwrap();
    assert_eq!(module.attach_state(), AttachState::Free);
    assert_eq!(module.drag_state(), DragState::TitlebarDragging);
    assert!(model.slots.get(0).unwrap().is_empty());
}

#[test]
fn test_burst_of_drag_ends_reattaches_once() {
    let t0 = Instant::now();
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let _b = spawn(&mut model, ModuleKind::Example);
    let over_slot_2 = slot_rect(&model, 2).center();

    send(&mut model, a, ModuleInput::NativeDragStarted);
    send(
        &mut model,
        a,
        ModuleInput::WindowMoved {
            pointer: Some(over_slot_2),
            at: t0,
        },
    );
    for i in 0..5 {
        send(
            &mut model,
            a,
            ModuleInput::NativeDragEnded {
                pointer: None,
                at: t0 + ms(20 * i),
            },
        );
    }
    let last_end = t0 + ms(80);

    // One interval after the first end, but not after the last
    update(&mut model, Msg::tick(t0 + SETTLE + ms(10)));
    assert_eq!(slot_of(&model, a), None);

    update(&mut model, Msg::tick(last_end + SETTLE));
    assert_eq!(slot_of(&model, a), Some(2));
    assert_frame_on(&model, a, slot_rect(&model, 2));

    // Nothing left pending
    assert!(model.module(a).unwrap().settle_deadline().is_none());
    update(&mut model, Msg::tick(last_end + SETTLE * 3));
    assert_eq!(slot_of(&model, a), Some(2));
}

#[test]
fn test_settle_far_from_board_stays_free() {
    let t0 = Instant::now();
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);

    send(&mut model, a, ModuleInput::NativeDragStarted);
    send(
        &mut model,
        a,
        ModuleInput::NativeDragEnded {
            pointer: Some(Point::new(3000.0, 40.0)),
            at: t0,
        },
    );
    update(&mut model, Msg::tick(t0 + SETTLE));

    assert_eq!(model.module(a).unwrap().attach_state(), AttachState::Free);
}

#[test]
fn test_moves_keep_postponing_settle() {
    let t0 = Instant::now();
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let target = slot_rect(&model, 1).center();

    send(&mut model, a, ModuleInput::NativeDragStarted);
    for i in 0..4 {
        send(
            &mut model,
            a,
            ModuleInput::WindowMoved {
                pointer: Some(target),
                at: t0 + ms(200 * i),
            },
        );
        update(&mut model, Msg::tick(t0 + ms(200 * i + 100)));
        assert_eq!(slot_of(&model, a), None, "still dragging");
    }

    send(
        &mut model,
        a,
        ModuleInput::NativeDragEnded {
            pointer: None,
            at: t0 + ms(700),
        },
    );
    update(&mut model, Msg::tick(t0 + ms(700) + SETTLE));
    assert_eq!(slot_of(&model, a), Some(1));
}

#[test]
fn test_drag_hover_highlights_target_slot() {
    let t0 = Instant::now();
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);

    let over_slot_2 = slot_rect(&model, 2).center();

    send(&mut model, a, ModuleInput::NativeDragStarted);
    send(
        &mut model,
        a,
        ModuleInput::WindowMoved {
            pointer: Some(over_slot_2),
            at: t0,
        },
    );
    assert!(model.slots.get(2).unwrap().is_highlighted());

    send(
        &mut model,
        a,
        ModuleInput::NativeDragEnded {
            pointer: None,
            at: t0,
        },
    );
    assert!(model.slots.iter().all(|s| !s.is_highlighted()));
}

#[test]
fn test_next_deadline_tracks_pending_settle() {
    let t0 = Instant::now();
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let idle_deadline = model.next_deadline();

    send(&mut model, a, ModuleInput::NativeDragStarted);
    send(
        &mut model,
        a,
        ModuleInput::NativeDragEnded {
            pointer: None,
            at: t0,
        },
    );

    assert_eq!(model.next_deadline(), (t0 + SETTLE).min(idle_deadline));
}
