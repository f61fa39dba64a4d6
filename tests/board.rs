//! Board geometry tests
//!
//! Scrolling, resizing and moving the board keep attached modules glued to
//! their slots.

mod common;

use common::*;
use dockyard::geometry::{Point, Size};
use dockyard::messages::{BoardMsg, DockMsg, Msg};
use dockyard::model::ModuleKind;
use dockyard::update::update;
use dockyard::Cmd;

#[test]
fn test_scroll_moves_attached_modules() {
    let mut model = test_model(5);
    let a = spawn(&mut model, ModuleKind::Example);

    let cmd = update(&mut model, Msg::Board(BoardMsg::ScrollBy { dx: 200.0, dy: 0.0 }));

    assert_eq!(cmd, Some(Cmd::Redraw));
    assert_eq!(model.board.scroll(), Point::new(200.0, 0.0));
    assert_eq!(slot_rect(&model, 0).x, 10.0 - 200.0);
    assert_frame_on(&model, a, slot_rect(&model, 0));
}

#[test]
fn test_scroll_is_clamped_to_content() {
    let mut model = test_model(5);
    let content = model.content_size();

    update(&mut model, Msg::Board(BoardMsg::ScrollBy { dx: 10_000.0, dy: 0.0 }));
    assert_eq!(model.board.scroll().x, content.width - 800.0);

    update(&mut model, Msg::Board(BoardMsg::ScrollTo(Point::new(-50.0, -50.0))));
    assert_eq!(model.board.scroll(), Point::ORIGIN);
}

#[test]
fn test_scroll_at_limit_is_a_no_op() {
    let mut model = test_model(3);
    let cmd = update(&mut model, Msg::Board(BoardMsg::ScrollBy { dx: -40.0, dy: 0.0 }));
    assert_eq!(cmd, None);
}

#[test]
fn test_scrolling_changes_visible_slots() {
    let mut model = test_model(5);
    assert!(!model.slots.is_visible(4, &model.board));

    update(&mut model, Msg::Board(BoardMsg::ScrollBy { dx: 600.0, dy: 0.0 }));

    assert!(!model.slots.is_visible(0, &model.board));
    assert!(model.slots.is_visible(4, &model.board));
}

#[test]
fn test_resize_stretches_slots_and_modules() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);

    update(&mut model, Msg::Board(BoardMsg::Resized(Size::new(800.0, 700.0))));

    assert_eq!(slot_rect(&model, 0).height, 680.0);
    assert_frame_on(&model, a, slot_rect(&model, 0));
}

#[test]
fn test_short_board_keeps_minimum_slot_height() {
    let mut model = test_model(3);
    update(&mut model, Msg::Board(BoardMsg::Resized(Size::new(800.0, 200.0))));
    assert_eq!(slot_rect(&model, 0).height, 400.0);
}

#[test]
fn test_moving_board_moves_modules() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);

    update(&mut model, Msg::Board(BoardMsg::Moved(Point::new(100.0, 50.0))));

    assert_eq!(slot_rect(&model, 0).origin(), Point::new(110.0, 60.0));
    assert_frame_on(&model, a, slot_rect(&model, 0));
}

#[test]
fn test_resizing_a_slot_shifts_its_neighbours() {
    let mut model = test_model(3);
    let a = spawn(&mut model, ModuleKind::Example);
    let b = spawn(&mut model, ModuleKind::Example);

    update(
        &mut model,
        Msg::Dock(DockMsg::ResizeSlot {
            index: 0,
            size: Size::new(300.0, 500.0),
        }),
    );

    assert_eq!(slot_rect(&model, 0).size(), Size::new(300.0, 500.0));
    assert_eq!(slot_rect(&model, 1).x, 320.0);
    assert_frame_on(&model, a, slot_rect(&model, 0));
    assert_frame_on(&model, b, slot_rect(&model, 1));
}

#[test]
fn test_slot_resize_respects_minimum() {
    let mut model = test_model(3);
    update(
        &mut model,
        Msg::Dock(DockMsg::ResizeSlot {
            index: 1,
            size: Size::new(10.0, 10.0),
        }),
    );
    assert_eq!(slot_rect(&model, 1).size(), Size::new(250.0, 400.0));
}
