use crate::cpu::InterruptFlags;

use super::MemoryBus;

/// P1 bit 4 low selects the direction keys.
const SELECT_DIRECTION: u8 = 0x10;
/// P1 bit 5 low selects the action buttons.
const SELECT_ACTION: u8 = 0x20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoypadButton {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
}

impl JoypadButton {
    /// Bit within its group's nibble.
    fn bit(self) -> u8 {
        match self {
            Self::A | Self::Right => 0,
            Self::B | Self::Left => 1,
            Self::Select | Self::Up => 2,
            Self::Start | Self::Down => 3,
        }
    }

    fn is_direction(self) -> bool {
        matches!(self, Self::Right | Self::Left | Self::Up | Self::Down)
    }
}

/// Pressed state of both button groups; `true` means held down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Joypad {
    /// A, B, Select, Start.
    pub(crate) action: [bool; 4],
    /// Right, Left, Up, Down.
    pub(crate) direction: [bool; 4],
}

impl Joypad {
    /// Low nibble for the given P1 select bits. Pressed reads 0.
    fn low_nibble(&self, select: u8) -> u8 {
        let nibble = |group: &[bool; 4]| {
            group
                .iter()
                .enumerate()
                .fold(0x0Fu8, |acc, (bit, &pressed)| if pressed { acc & !(1 << bit) } else { acc })
        };

        let mut low = 0x0F;
        if select & SELECT_DIRECTION == 0 {
            low &= nibble(&self.direction);
        }
        if select & SELECT_ACTION == 0 {
            low &= nibble(&self.action);
        }
        low
    }
}

impl MemoryBus {
    pub(super) fn read_joyp(&self) -> u8 {
        let select = self.io[0] & (SELECT_DIRECTION | SELECT_ACTION);
        0xC0 | select | self.joypad.low_nibble(select)
    }

    pub(super) fn write_joyp(&mut self, value: u8) {
        let select = value & (SELECT_DIRECTION | SELECT_ACTION);
        self.io[0] = 0xC0 | select | self.joypad.low_nibble(select);
    }

    /// Update one button. A release-to-press transition requests the joypad
    /// interrupt.
    pub fn set_button(&mut self, button: JoypadButton, pressed: bool) {
        let group = if button.is_direction() {
            &mut self.joypad.direction
        } else {
            &mut self.joypad.action
        };
        let slot = &mut group[button.bit() as usize];
        let newly_pressed = pressed && !*slot;
        *slot = pressed;

        if newly_pressed {
            self.request_interrupt(InterruptFlags::JOYPAD);
        }
    }

    /// Replace both groups at once, as an input poller does once per frame.
    pub fn set_buttons(&mut self, action: [bool; 4], direction: [bool; 4]) {
        const ACTION: [JoypadButton; 4] = [
            JoypadButton::A,
            JoypadButton::B,
            JoypadButton::Select,
            JoypadButton::Start,
        ];
        const DIRECTION: [JoypadButton; 4] = [
            JoypadButton::Right,
            JoypadButton::Left,
            JoypadButton::Up,
            JoypadButton::Down,
        ];

        for (button, pressed) in ACTION.into_iter().zip(action) {
            self.set_button(button, pressed);
        }
        for (button, pressed) in DIRECTION.into_iter().zip(direction) {
            self.set_button(button, pressed);
        }
    }
}
