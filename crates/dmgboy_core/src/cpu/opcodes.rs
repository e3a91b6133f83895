//! Opcode descriptor tables.
//!
//! Every opcode byte maps to a small [`Instruction`] descriptor plus its
//! T-state cost. The descriptors are interpreted by a handful of generic
//! executors in `exec`, so the five hundred encodings share one
//! implementation per instruction family. Both tables are built at compile time from the
//! regular x/y/z bit layout of the LR35902 opcode space.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg8 {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    SP,
}

/// Source or destination of an 8-bit transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Reg(Reg8),
    /// (HL)
    IndHl,
    /// (BC)
    IndBc,
    /// (DE)
    IndDe,
    /// (HL+), post-increment.
    IndHlInc,
    /// (HL-), post-decrement.
    IndHlDec,
    /// d8
    Imm8,
    /// (a16)
    IndImm16,
    /// (0xFF00 + a8)
    HighImm8,
    /// (0xFF00 + C)
    HighC,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    Always,
    NotZero,
    Zero,
    NotCarry,
    Carry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    Load { dst: Operand, src: Operand },
    LoadImm16(Reg16),
    StoreSp,
    LoadSpHl,
    LoadHlSpOffset,
    Push(Reg16),
    Pop(Reg16),
    Alu { op: AluOp, src: Operand },
    Inc(Operand),
    Dec(Operand),
    Inc16(Reg16),
    Dec16(Reg16),
    AddHl(Reg16),
    AddSpOffset,
    Daa,
    Cpl,
    Scf,
    Ccf,
    /// RLCA/RRCA/RLA/RRA.
    RotateA(ShiftOp),
    Shift { op: ShiftOp, target: Operand },
    Bit { bit: u8, target: Operand },
    Res { bit: u8, target: Operand },
    Set { bit: u8, target: Operand },
    Jump(Condition),
    JumpHl,
    JumpRelative(Condition),
    Call(Condition),
    Return(Condition),
    ReturnInterrupt,
    Restart(u8),
    Halt,
    Stop,
    DisableInterrupts,
    EnableInterrupts,
    /// 0xCB; only ever seen by a disassembler, the CPU consumes it on fetch.
    Prefix,
    Invalid,
}

/// A decoded table entry.
///
/// `cycles` is the cost when a conditional branch is not taken (and the only
/// cost for everything else); `taken_cycles` applies when it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub instruction: Instruction,
    pub cycles: u8,
    pub taken_cycles: u8,
}

impl Opcode {
    const INVALID: Self = Self::fixed(Instruction::Invalid, 0);

    const fn fixed(instruction: Instruction, cycles: u8) -> Self {
        Self {
            instruction,
            cycles,
            taken_cycles: cycles,
        }
    }

    const fn branch(instruction: Instruction, not_taken: u8, taken: u8) -> Self {
        Self {
            instruction,
            cycles: not_taken,
            taken_cycles: taken,
        }
    }
}

pub static OPCODES: [Opcode; 256] = build_table(false);
pub static CB_OPCODES: [Opcode; 256] = build_table(true);

const fn build_table(prefixed: bool) -> [Opcode; 256] {
    let mut table = [Opcode::INVALID; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = if prefixed {
            decode_cb(i as u8)
        } else {
            decode(i as u8)
        };
        i += 1;
    }
    table
}

/// Register operand from the 3-bit field used throughout the opcode space.
const fn r(index: u8) -> Operand {
    match index {
        0 => Operand::Reg(Reg8::B),
        1 => Operand::Reg(Reg8::C),
        2 => Operand::Reg(Reg8::D),
        3 => Operand::Reg(Reg8::E),
        4 => Operand::Reg(Reg8::H),
        5 => Operand::Reg(Reg8::L),
        6 => Operand::IndHl,
        _ => Operand::Reg(Reg8::A),
    }
}

const fn rp(index: u8) -> Reg16 {
    match index {
        0 => Reg16::BC,
        1 => Reg16::DE,
        2 => Reg16::HL,
        _ => Reg16::SP,
    }
}

/// Pair table used by PUSH/POP, where slot 3 is AF instead of SP.
const fn rp2(index: u8) -> Reg16 {
    match index {
        0 => Reg16::BC,
        1 => Reg16::DE,
        2 => Reg16::HL,
        _ => Reg16::AF,
    }
}

const fn cc(index: u8) -> Condition {
    match index {
        0 => Condition::NotZero,
        1 => Condition::Zero,
        2 => Condition::NotCarry,
        _ => Condition::Carry,
    }
}

const fn alu(index: u8) -> AluOp {
    match index {
        0 => AluOp::Add,
        1 => AluOp::Adc,
        2 => AluOp::Sub,
        3 => AluOp::Sbc,
        4 => AluOp::And,
        5 => AluOp::Xor,
        6 => AluOp::Or,
        _ => AluOp::Cp,
    }
}

const fn shift(index: u8) -> ShiftOp {
    match index {
        0 => ShiftOp::Rlc,
        1 => ShiftOp::Rrc,
        2 => ShiftOp::Rl,
        3 => ShiftOp::Rr,
        4 => ShiftOp::Sla,
        5 => ShiftOp::Sra,
        6 => ShiftOp::Swap,
        _ => ShiftOp::Srl,
    }
}

const fn decode(op: u8) -> Opcode {
    use Instruction as I;

    let x = op >> 6;
    let y = (op >> 3) & 7;
    let z = op & 7;
    let p = y >> 1;
    let q = y & 1;
    let a = Operand::Reg(Reg8::A);

    match x {
        0 => match z {
            0 => match y {
                0 => Opcode::fixed(I::Nop, 4),
                1 => Opcode::fixed(I::StoreSp, 20),
                2 => Opcode::fixed(I::Stop, 4),
                3 => Opcode::fixed(I::JumpRelative(Condition::Always), 12),
                _ => Opcode::branch(I::JumpRelative(cc(y - 4)), 8, 12),
            },
            1 => {
                if q == 0 {
                    Opcode::fixed(I::LoadImm16(rp(p)), 12)
                } else {
                    Opcode::fixed(I::AddHl(rp(p)), 8)
                }
            }
            2 => {
                let mem = match p {
                    0 => Operand::IndBc,
                    1 => Operand::IndDe,
                    2 => Operand::IndHlInc,
                    _ => Operand::IndHlDec,
                };
                if q == 0 {
                    Opcode::fixed(I::Load { dst: mem, src: a }, 8)
                } else {
                    Opcode::fixed(I::Load { dst: a, src: mem }, 8)
                }
            }
            3 => {
                if q == 0 {
                    Opcode::fixed(I::Inc16(rp(p)), 8)
                } else {
                    Opcode::fixed(I::Dec16(rp(p)), 8)
                }
            }
            4 => Opcode::fixed(I::Inc(r(y)), if y == 6 { 12 } else { 4 }),
            5 => Opcode::fixed(I::Dec(r(y)), if y == 6 { 12 } else { 4 }),
            6 => Opcode::fixed(
                I::Load {
                    dst: r(y),
                    src: Operand::Imm8,
                },
                if y == 6 { 12 } else { 8 },
            ),
            _ => match y {
                0..=3 => Opcode::fixed(I::RotateA(shift(y)), 4),
                4 => Opcode::fixed(I::Daa, 4),
                5 => Opcode::fixed(I::Cpl, 4),
                6 => Opcode::fixed(I::Scf, 4),
                _ => Opcode::fixed(I::Ccf, 4),
            },
        },
        1 => {
            if op == 0x76 {
                Opcode::fixed(I::Halt, 4)
            } else {
                let cycles = if y == 6 || z == 6 { 8 } else { 4 };
                Opcode::fixed(I::Load { dst: r(y), src: r(z) }, cycles)
            }
        }
        2 => Opcode::fixed(
            I::Alu {
                op: alu(y),
                src: r(z),
            },
            if z == 6 { 8 } else { 4 },
        ),
        _ => match z {
            0 => match y {
                0..=3 => Opcode::branch(I::Return(cc(y)), 8, 20),
                4 => Opcode::fixed(
                    I::Load {
                        dst: Operand::HighImm8,
                        src: a,
                    },
                    12,
                ),
                5 => Opcode::fixed(I::AddSpOffset, 16),
                6 => Opcode::fixed(
                    I::Load {
                        dst: a,
                        src: Operand::HighImm8,
                    },
                    12,
                ),
                _ => Opcode::fixed(I::LoadHlSpOffset, 12),
            },
            1 => {
                if q == 0 {
                    Opcode::fixed(I::Pop(rp2(p)), 12)
                } else {
                    match p {
                        0 => Opcode::fixed(I::Return(Condition::Always), 16),
                        1 => Opcode::fixed(I::ReturnInterrupt, 16),
                        2 => Opcode::fixed(I::JumpHl, 4),
                        _ => Opcode::fixed(I::LoadSpHl, 8),
                    }
                }
            }
            2 => match y {
                0..=3 => Opcode::branch(I::Jump(cc(y)), 12, 16),
                4 => Opcode::fixed(
                    I::Load {
                        dst: Operand::HighC,
                        src: a,
                    },
                    8,
                ),
                5 => Opcode::fixed(
                    I::Load {
                        dst: Operand::IndImm16,
                        src: a,
                    },
                    16,
                ),
                6 => Opcode::fixed(
                    I::Load {
                        dst: a,
                        src: Operand::HighC,
                    },
                    8,
                ),
                _ => Opcode::fixed(
                    I::Load {
                        dst: a,
                        src: Operand::IndImm16,
                    },
                    16,
                ),
            },
            3 => match y {
                0 => Opcode::fixed(I::Jump(Condition::Always), 16),
                1 => Opcode::fixed(I::Prefix, 4),
                6 => Opcode::fixed(I::DisableInterrupts, 4),
                7 => Opcode::fixed(I::EnableInterrupts, 4),
                _ => Opcode::INVALID,
            },
            4 => match y {
                0..=3 => Opcode::branch(I::Call(cc(y)), 12, 24),
                _ => Opcode::INVALID,
            },
            5 => {
                if q == 0 {
                    Opcode::fixed(I::Push(rp2(p)), 16)
                } else if p == 0 {
                    Opcode::fixed(I::Call(Condition::Always), 24)
                } else {
                    Opcode::INVALID
                }
            }
            6 => Opcode::fixed(
                I::Alu {
                    op: alu(y),
                    src: Operand::Imm8,
                },
                8,
            ),
            _ => Opcode::fixed(I::Restart(y * 8), 16),
        },
    }
}

const fn decode_cb(op: u8) -> Opcode {
    use Instruction as I;

    let x = op >> 6;
    let y = (op >> 3) & 7;
    let z = op & 7;
    let target = r(z);
    let memory = z == 6;

    match x {
        0 => Opcode::fixed(
            I::Shift {
                op: shift(y),
                target,
            },
            if memory { 16 } else { 8 },
        ),
        1 => Opcode::fixed(I::Bit { bit: y, target }, if memory { 12 } else { 8 }),
        2 => Opcode::fixed(I::Res { bit: y, target }, if memory { 16 } else { 8 }),
        _ => Opcode::fixed(I::Set { bit: y, target }, if memory { 16 } else { 8 }),
    }
}

impl fmt::Display for Reg8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg8::A => "A",
            Reg8::B => "B",
            Reg8::C => "C",
            Reg8::D => "D",
            Reg8::E => "E",
            Reg8::H => "H",
            Reg8::L => "L",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Reg16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg16::AF => "AF",
            Reg16::BC => "BC",
            Reg16::DE => "DE",
            Reg16::HL => "HL",
            Reg16::SP => "SP",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(reg) => write!(f, "{reg}"),
            Operand::IndHl => f.write_str("(HL)"),
            Operand::IndBc => f.write_str("(BC)"),
            Operand::IndDe => f.write_str("(DE)"),
            Operand::IndHlInc => f.write_str("(HL+)"),
            Operand::IndHlDec => f.write_str("(HL-)"),
            Operand::Imm8 => f.write_str("d8"),
            Operand::IndImm16 => f.write_str("(a16)"),
            Operand::HighImm8 => f.write_str("(FF00+a8)"),
            Operand::HighC => f.write_str("(FF00+C)"),
        }
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AluOp::Add => "ADD A,",
            AluOp::Adc => "ADC A,",
            AluOp::Sub => "SUB ",
            AluOp::Sbc => "SBC A,",
            AluOp::And => "AND ",
            AluOp::Xor => "XOR ",
            AluOp::Or => "OR ",
            AluOp::Cp => "CP ",
        };
        f.write_str(name)
    }
}

impl fmt::Display for ShiftOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShiftOp::Rlc => "RLC",
            ShiftOp::Rrc => "RRC",
            ShiftOp::Rl => "RL",
            ShiftOp::Rr => "RR",
            ShiftOp::Sla => "SLA",
            ShiftOp::Sra => "SRA",
            ShiftOp::Swap => "SWAP",
            ShiftOp::Srl => "SRL",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Condition::Always => "",
            Condition::NotZero => "NZ,",
            Condition::Zero => "Z,",
            Condition::NotCarry => "NC,",
            Condition::Carry => "C,",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Nop => f.write_str("NOP"),
            Instruction::Load { dst, src } => write!(f, "LD {dst},{src}"),
            Instruction::LoadImm16(reg) => write!(f, "LD {reg},d16"),
            Instruction::StoreSp => f.write_str("LD (a16),SP"),
            Instruction::LoadSpHl => f.write_str("LD SP,HL"),
            Instruction::LoadHlSpOffset => f.write_str("LD HL,SP+r8"),
            Instruction::Push(reg) => write!(f, "PUSH {reg}"),
            Instruction::Pop(reg) => write!(f, "POP {reg}"),
            Instruction::Alu { op, src } => write!(f, "{op}{src}"),
            Instruction::Inc(target) => write!(f, "INC {target}"),
            Instruction::Dec(target) => write!(f, "DEC {target}"),
            Instruction::Inc16(reg) => write!(f, "INC {reg}"),
            Instruction::Dec16(reg) => write!(f, "DEC {reg}"),
            Instruction::AddHl(reg) => write!(f, "ADD HL,{reg}"),
            Instruction::AddSpOffset => f.write_str("ADD SP,r8"),
            Instruction::Daa => f.write_str("DAA"),
            Instruction::Cpl => f.write_str("CPL"),
            Instruction::Scf => f.write_str("SCF"),
            Instruction::Ccf => f.write_str("CCF"),
            Instruction::RotateA(op) => write!(f, "{op}A"),
            Instruction::Shift { op, target } => write!(f, "{op} {target}"),
            Instruction::Bit { bit, target } => write!(f, "BIT {bit},{target}"),
            Instruction::Res { bit, target } => write!(f, "RES {bit},{target}"),
            Instruction::Set { bit, target } => write!(f, "SET {bit},{target}"),
            Instruction::Jump(cond) => write!(f, "JP {cond}a16"),
            Instruction::JumpHl => f.write_str("JP HL"),
            Instruction::JumpRelative(cond) => write!(f, "JR {cond}r8"),
            Instruction::Call(cond) => write!(f, "CALL {cond}a16"),
            Instruction::Return(Condition::Always) => f.write_str("RET"),
            Instruction::Return(cond) => {
                let cond = cond.to_string();
                write!(f, "RET {}", cond.trim_end_matches(','))
            }
            Instruction::ReturnInterrupt => f.write_str("RETI"),
            Instruction::Restart(vector) => write!(f, "RST {vector:02X}H"),
            Instruction::Halt => f.write_str("HALT"),
            Instruction::Stop => f.write_str("STOP"),
            Instruction::DisableInterrupts => f.write_str("DI"),
            Instruction::EnableInterrupts => f.write_str("EI"),
            Instruction::Prefix => f.write_str("PREFIX CB"),
            Instruction::Invalid => f.write_str("INVALID"),
        }
    }
}
