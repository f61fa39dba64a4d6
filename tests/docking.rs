//! Docking coordinator tests
//!
//! Creation, detach/reattach by dragging, close flows and the slot
//! occupancy invariants they must preserve.

mod common;

use common::*;
use dockyard::geometry::Point;
use dockyard::messages::{DockMsg, Msg};
use dockyard::model::{AttachState, ModuleInput, ModuleKind};
use dockyard::update::update;
use dockyard::{Cmd, DockConfig};

// ========================================================================
// Creation
// ========================================================================

#[test]
fn test_modules_fill_slots_in_order() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let b = spawn(&mut model, ModuleKind::Calculator);

    assert_eq!(slot_of(&model, a), Some(0));
    assert_eq!(slot_of(&model, b), Some(1));
    assert_frame_on(&model, a, slot_rect(&model, 0));
    assert_frame_on(&model, b, slot_rect(&model, 1));
    assert!(model.verify_occupancy().is_ok());
}

#[test]
fn test_attached_module_loses_decorations() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let module = model.module(a).unwrap();
    assert_eq!(module.attach_state(), AttachState::Attached);
    assert!(!module.window().is_decorated());
}

#[test]
fn test_creation_keeps_minimum_free_slots() {
    let mut model = test_model(1);
    for _ in 0..5 {
        spawn(&mut model, ModuleKind::TextEditor);
        assert!(model.slots.free_count() >= 1);
    }
    assert_eq!(model.module_count(), 5);
    assert_eq!(model.slots.len(), 6);
}

#[test]
fn test_larger_minimum_free_is_honoured() {
    let config = DockConfig {
        initial_slots: 2,
        minimum_free_slots: 3,
        ..DockConfig::default()
    };
    let mut model = model_with(config, Box::new(dockyard::perf::NullProbe), std::time::Instant::now());
    assert_eq!(model.slots.free_count(), 3);

    spawn(&mut model, ModuleKind::Example);
    assert_eq!(model.slots.free_count(), 3);
    assert_eq!(model.slots.len(), 4);
}

#[test]
fn test_titles_are_unique() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let b = spawn(&mut model, ModuleKind::Example);
    let title_a = model.module(a).unwrap().title().to_string();
    let title_b = model.module(b).unwrap().title().to_string();
    assert!(title_a.starts_with("Example"));
    assert_ne!(title_a, title_b);
    assert_eq!(model.count_by_kind(ModuleKind::Example), 2);
}

// ========================================================================
// Detach and reattach
// ========================================================================

#[test]
fn test_drop_on_empty_slot_lands_there() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let b = spawn(&mut model, ModuleKind::Example);

    let target = slot_rect(&model, 2).center();
    drag_to(&mut model, a, target);

    assert_eq!(slot_of(&model, a), Some(2), "not the first empty slot 0");
    assert_eq!(slot_of(&model, b), Some(1));
    assert!(model.slots.get(0).unwrap().is_empty());
    assert_frame_on(&model, a, slot_rect(&model, 2));
    assert!(model.slots.free_count() >= model.config.minimum_free_slots);
    assert!(model.verify_occupancy().is_ok());
}

#[test]
fn test_press_on_grip_detaches() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let grip = grip_point(&model, a);

    send(&mut model, a, ModuleInput::PointerPressed { global: grip });

    let module = model.module(a).unwrap();
    assert_eq!(module.attach_state(), AttachState::Free);
    assert!(module.window().is_decorated());
    assert!(model.slots.get(0).unwrap().is_empty());
}

#[test]
fn test_press_below_grip_does_nothing() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let body = slot_rect(&model, 0).center();

    let cmd = send(&mut model, a, ModuleInput::PointerPressed { global: body });

    assert!(cmd.is_none());
    assert_eq!(slot_of(&model, a), Some(0));
}

#[test]
fn test_hover_highlights_only_empty_slots() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let b = spawn(&mut model, ModuleKind::Example);
    let grip = grip_point(&model, a);
    send(&mut model, a, ModuleInput::PointerPressed { global: grip });
    let over_empty = slot_rect(&model, 2).center();
    let over_b = slot_rect(&model, 1).center();

    send(&mut model, a, ModuleInput::PointerMoved { global: over_empty });
    assert!(model.slots.get(2).unwrap().is_highlighted());

    // Over b's slot: occupied, so nothing is highlighted
    send(&mut model, a, ModuleInput::PointerMoved { global: over_b });
    assert_eq!(slot_of(&model, b), Some(1));
    assert!(model.slots.iter().all(|s| !s.is_highlighted()));

    send(&mut model, a, ModuleInput::PointerMoved { global: over_empty });
    send(
        &mut model,
        a,
        ModuleInput::PointerReleased {
            global: Point::new(2000.0, 2000.0),
        },
    );
    assert!(model.slots.iter().all(|s| !s.is_highlighted()));
}

#[test]
fn test_drop_on_occupied_slot_takes_first_empty_visible() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let b = spawn(&mut model, ModuleKind::Example);

    let over_a = slot_rect(&model, 0).center();
    drag_to(&mut model, b, over_a);

    assert_eq!(slot_of(&model, a), Some(0), "occupant is never displaced");
    assert_eq!(slot_of(&model, b), Some(1));
}

#[test]
fn test_drop_far_from_board_stays_free() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);

    drag_to(&mut model, a, Point::new(2000.0, 2000.0));

    let module = model.module(a).unwrap();
    assert_eq!(module.attach_state(), AttachState::Free);
    assert_eq!(slot_of(&model, a), None);
    assert!(model.verify_occupancy().is_ok());
}

#[test]
fn test_drop_just_outside_slots_uses_tolerance_band() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let b = spawn(&mut model, ModuleKind::Example);

    // Below every slot's tolerance but inside the board's
    drag_to(&mut model, a, Point::new(400.0, 615.0));

    assert_eq!(slot_of(&model, a), Some(0));
    assert_eq!(slot_of(&model, b), Some(1));
}

#[test]
fn test_only_offscreen_empty_slots_leaves_module_free() {
    let mut model = test_model(3);
    for _ in 0..3 {
        spawn(&mut model, ModuleKind::Example);
    }
    // Lands in slot 3, which sits past the right edge of the 800px board
    let d = spawn(&mut model, ModuleKind::Settings);
    assert_eq!(slot_of(&model, d), Some(3));
    assert!(!model.slots.is_visible(3, &model.board));

    let over_occupied = slot_rect(&model, 1).center();
    drag_to(&mut model, d, over_occupied);

    assert_eq!(model.module(d).unwrap().attach_state(), AttachState::Free);
    assert_eq!(slot_of(&model, d), None);
    assert!(model.verify_occupancy().is_ok());
}

#[test]
fn test_double_click_toggles_docking() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let grip = grip_point(&model, a);

    send(&mut model, a, ModuleInput::DoubleClicked { global: grip });
    assert_eq!(slot_of(&model, a), None);

    let grip = grip_point(&model, a);
    send(&mut model, a, ModuleInput::DoubleClicked { global: grip });
    assert_eq!(slot_of(&model, a), Some(0));
}

#[test]
fn test_explicit_reattach_creates_slot_when_full() {
    let config = DockConfig {
        initial_slots: 1,
        minimum_free_slots: 0,
        ..DockConfig::default()
    };
    let mut model = model_with(config, Box::new(dockyard::perf::NullProbe), std::time::Instant::now());
    let a = spawn(&mut model, ModuleKind::Example);
    let grip = grip_point(&model, a);
    send(&mut model, a, ModuleInput::DoubleClicked { global: grip });
    let b = spawn(&mut model, ModuleKind::Example);
    assert_eq!(slot_of(&model, b), Some(0));

    let grip = grip_point(&model, a);
    send(&mut model, a, ModuleInput::DoubleClicked { global: grip });

    assert_eq!(model.slots.len(), 2);
    assert_eq!(slot_of(&model, a), Some(1));
}

#[test]
fn test_placing_into_occupied_slot_frees_previous_occupant() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let b = spawn(&mut model, ModuleKind::Example);

    let displaced = model.slots.place(b, 0).unwrap();
    assert_eq!(displaced, Some(a));
    assert_eq!(model.slots.slot_of(a), None);
    assert!(model.slots.get(1).unwrap().is_empty());
}

// ========================================================================
// Closing
// ========================================================================

#[test]
fn test_close_asks_for_confirmation() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);

    let cmd = send(&mut model, a, ModuleInput::CloseClicked);

    match cmd {
        Some(Cmd::ConfirmClose { module, title }) => {
            assert_eq!(module, a);
            assert!(title.starts_with("Example"));
        }
        other => panic!("expected ConfirmClose, got {:?}", other),
    }
    assert!(model.module(a).is_some());
}

#[test]
fn test_confirmed_close_vacates_and_destroys() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    send(&mut model, a, ModuleInput::CloseClicked);

    update(&mut model, Msg::Dock(DockMsg::CloseConfirmed(a)));

    assert!(model.module(a).is_none());
    assert!(model.slots.iter().all(|s| s.occupant() != Some(a)));
    assert!(model.verify_occupancy().is_ok());
}

#[test]
fn test_cancelled_close_keeps_module() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    send(&mut model, a, ModuleInput::CloseClicked);

    let cmd = update(&mut model, Msg::Dock(DockMsg::CloseCancelled(a)));

    assert!(cmd.is_none());
    assert_eq!(slot_of(&model, a), Some(0));
}

#[test]
fn test_close_without_confirmation() {
    let config = DockConfig {
        confirm_close: false,
        ..test_config(3)
    };
    let mut model = model_with(config, Box::new(dockyard::perf::NullProbe), std::time::Instant::now());
    let a = spawn(&mut model, ModuleKind::Example);

    let cmd = send(&mut model, a, ModuleInput::CloseClicked);

    assert_eq!(cmd, Some(Cmd::Redraw));
    assert!(model.module(a).is_none());
    assert!(model.slots.get(0).unwrap().is_empty());
}

#[test]
fn test_destroy_all_empties_board() {
    let mut model = test_model(3);
    for kind in ModuleKind::BUILT_IN.iter().take(4) {
        spawn(&mut model, *kind);
    }

    update(&mut model, Msg::Dock(DockMsg::DestroyAll));

    assert_eq!(model.module_count(), 0);
    assert_eq!(model.slots.free_count(), model.slots.len());
}

#[test]
fn test_input_for_destroyed_module_is_ignored() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    update(&mut model, Msg::Dock(DockMsg::CloseConfirmed(a)));

    let cmd = send(&mut model, a, ModuleInput::CloseClicked);
    assert!(cmd.is_none());
}
