use crate::cpu::Cpu;

impl Cpu {
    /// HALT parks the CPU until `handle_interrupt` sees a pending line.
    pub(super) fn exec_halt(&mut self) {
        self.halted = true;
    }

    /// STOP is a plain one-byte no-op; low-power mode is not modelled.
    pub(super) fn exec_stop(&mut self) {
        log::debug!("STOP at {:04X} treated as NOP", self.regs.pc.wrapping_sub(1));
    }
}
