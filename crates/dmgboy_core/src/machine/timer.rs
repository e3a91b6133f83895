use crate::cpu::InterruptFlags;

use super::bus::{IoRegister, MemoryBus};

/// Steps between DIV increments.
const DIV_PERIOD: u32 = 256;
/// Steps between a TIMA wrap and the reload/interrupt.
const OVERFLOW_DELAY: u8 = 4;
/// TAC bit 2.
const TAC_ENABLE: u8 = 0x04;

/// Divider and programmable counter.
///
/// DIV, TIMA, TMA and TAC live in the bus I/O block; this struct only holds
/// the hidden accumulators. Time advances one master-clock step per
/// [`Timer::clock`] call.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    div_counter: u32,
    tima_counter: u32,
    /// Steps left before a wrapped TIMA is reloaded; 0 when idle.
    overflow_delay: u8,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps per TIMA increment for the rate in TAC bits 1..0
    /// (4096, 262144, 65536 and 16384 Hz).
    pub fn tima_period(tac: u8) -> u32 {
        match tac & 0x03 {
            0b00 => 1024,
            0b01 => 16,
            0b10 => 64,
            _ => 256,
        }
    }

    pub fn overflow_pending(&self) -> bool {
        self.overflow_delay > 0
    }

    pub fn clock(&mut self, bus: &mut MemoryBus) {
        self.div_counter += 1;
        if self.div_counter >= DIV_PERIOD {
            self.div_counter -= DIV_PERIOD;
            bus.increment_div();
        }

        let tac = bus.io(IoRegister::TAC);
        if tac & TAC_ENABLE == 0 {
            return;
        }

        self.tima_counter += 1;

        if self.overflow_delay > 0 {
            self.overflow_delay -= 1;
            if self.overflow_delay == 0 {
                bus.request_interrupt(InterruptFlags::TIMER);
                let tma = bus.io(IoRegister::TMA);
                bus.set_io(IoRegister::TIMA, tma);
            }
            return;
        }

        let period = Self::tima_period(tac);
        while self.tima_counter >= period {
            self.tima_counter -= period;
            let (tima, wrapped) = bus.io(IoRegister::TIMA).overflowing_add(1);
            bus.set_io(IoRegister::TIMA, tima);
            if wrapped {
                self.overflow_delay = OVERFLOW_DELAY;
                break;
            }
        }
    }
}
