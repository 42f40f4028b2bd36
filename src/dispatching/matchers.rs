//! Compatibility predicates.
//!
//! Both predicates sit in the evaluation and repair inner loops: they are
//! pure and cost O(1) / O(k) with k = windows declared for the day.

use crate::models::{Block, Room, RoomKind, Slot, Teacher};

/// Whether a room of kind `room` can host a block requiring `block`.
///
/// `Mixed` on either side matches lecture and lab; otherwise kinds must
/// be equal.
#[inline]
pub fn room_kind_matches(room: RoomKind, block: RoomKind) -> bool {
    match (room, block) {
        (RoomKind::Mixed, _) | (_, RoomKind::Mixed) => true,
        (r, b) => r == b,
    }
}

/// Whether the teacher can teach during `slot`.
///
/// False when nothing is declared for the slot's day; otherwise the slot
/// must fit entirely inside one declared window.
#[inline]
pub fn teacher_available(teacher: &Teacher, slot: &Slot) -> bool {
    let window = slot.window();
    teacher
        .windows_on(slot.day)
        .iter()
        .any(|w| w.covers(&window))
}

/// Kind and capacity both satisfied.
#[inline]
pub fn room_fits(room: &Room, block: &Block) -> bool {
    room_kind_matches(room.kind, block.kind) && room.capacity >= block.students
}
