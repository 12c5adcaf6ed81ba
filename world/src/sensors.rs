//! Rotation of relative sensor readings into absolute direction slots.

use micromouse_core::{Direction, SensorReading};

/// What one turn of sensing revealed about a single absolute direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorInfo {
    /// The direction was not sensed this turn (the robot's rear).
    Blind,
    /// A wall sits immediately adjacent in this direction.
    Wall,
    /// The direction is open, with this many clear cells before a wall.
    Open {
        /// Number of open cells visible before the first wall.
        clear_cells: u32,
    },
}

/// Maps a left/front/right reading onto the four absolute directions.
///
/// Left is a quarter turn counter-clockwise from the heading, right a
/// quarter turn clockwise; the remaining slot is the rear blind spot. A
/// reading of zero means the wall is immediately present, any positive value
/// that many open cells.
#[must_use]
pub fn map_sensors(heading: Direction, reading: &SensorReading) -> [SensorInfo; 4] {
    let mut info = [SensorInfo::Blind; 4];

    let sensed = [
        (heading.left(), reading.left()),
        (heading, reading.front()),
        (heading.right(), reading.right()),
    ];
    for (direction, clear_cells) in sensed {
        info[usize::from(direction.index())] = if clear_cells == 0 {
            SensorInfo::Wall
        } else {
            SensorInfo::Open { clear_cells }
        };
    }

    info
}
