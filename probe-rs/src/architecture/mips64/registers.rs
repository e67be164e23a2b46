//! The MIPS64 register file: the 32 general purpose registers (`$0`-`$31`,
//! shown under their conventional ABI names) plus the handful of CP0
//! registers the core driver exposes for inspection (status, cause,
//! badvaddr, depc) and the multiply/divide result registers (hi/lo).

use std::sync::LazyLock;

use crate::{
    core::{RegisterDataType, RegisterRole, UnwindRule},
    CoreRegister, CoreRegisters, RegisterId,
};

macro_rules! gpr {
    ($id:expr, $name:expr) => {
        CoreRegister {
            roles: &[RegisterRole::Core($name)],
            id: RegisterId($id),
            data_type: RegisterDataType::UnsignedInteger(64),
            unwind_rule: UnwindRule::Clear,
        }
    };
}

pub(crate) const PC: CoreRegister = CoreRegister {
    roles: &[RegisterRole::Core("pc"), RegisterRole::ProgramCounter],
    id: RegisterId(32),
    data_type: RegisterDataType::UnsignedInteger(64),
    unwind_rule: UnwindRule::Clear,
};

pub(crate) const SP: CoreRegister = CoreRegister {
    roles: &[RegisterRole::Core("sp"), RegisterRole::StackPointer],
    id: RegisterId(29),
    data_type: RegisterDataType::UnsignedInteger(64),
    unwind_rule: UnwindRule::Preserve,
};

pub(crate) const RA: CoreRegister = CoreRegister {
    roles: &[RegisterRole::Core("ra"), RegisterRole::ReturnAddress],
    id: RegisterId(31),
    data_type: RegisterDataType::UnsignedInteger(64),
    unwind_rule: UnwindRule::Clear,
};

pub(crate) const FP: CoreRegister = CoreRegister {
    roles: &[RegisterRole::Core("fp"), RegisterRole::FramePointer],
    id: RegisterId(30),
    data_type: RegisterDataType::UnsignedInteger(64),
    unwind_rule: UnwindRule::Preserve,
};

/// `$0`..`$31`, in ABI order, plus `pc`/`hi`/`lo`/`status`/`cause`/
/// `badvaddr`/`depc`.
pub(crate) static MIPS64_CORE_REGISTERS_SET: &[CoreRegister] = &[
    CoreRegister {
        roles: &[RegisterRole::Core("zero")],
        id: RegisterId(0),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Clear,
    },
    gpr!(1, "at"),
    CoreRegister {
        roles: &[RegisterRole::Core("v0"), RegisterRole::Return("r0")],
        id: RegisterId(2),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Clear,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("v1"), RegisterRole::Return("r1")],
        id: RegisterId(3),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Clear,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("a0"), RegisterRole::Argument("a0")],
        id: RegisterId(4),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Clear,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("a1"), RegisterRole::Argument("a1")],
        id: RegisterId(5),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Clear,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("a2"), RegisterRole::Argument("a2")],
        id: RegisterId(6),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Clear,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("a3"), RegisterRole::Argument("a3")],
        id: RegisterId(7),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Clear,
    },
    gpr!(8, "a4"),
    gpr!(9, "a5"),
    gpr!(10, "a6"),
    gpr!(11, "a7"),
    gpr!(12, "t0"),
    gpr!(13, "t1"),
    gpr!(14, "t2"),
    gpr!(15, "t3"),
    CoreRegister {
        roles: &[RegisterRole::Core("s0")],
        id: RegisterId(16),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Preserve,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("s1")],
        id: RegisterId(17),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Preserve,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("s2")],
        id: RegisterId(18),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Preserve,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("s3")],
        id: RegisterId(19),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Preserve,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("s4")],
        id: RegisterId(20),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Preserve,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("s5")],
        id: RegisterId(21),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Preserve,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("s6")],
        id: RegisterId(22),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Preserve,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("s7")],
        id: RegisterId(23),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Preserve,
    },
    gpr!(24, "t8"),
    gpr!(25, "t9"),
    gpr!(26, "k0"),
    gpr!(27, "k1"),
    CoreRegister {
        roles: &[RegisterRole::Core("gp")],
        id: RegisterId(28),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Preserve,
    },
    SP,
    FP,
    RA,
    PC,
    CoreRegister {
        roles: &[RegisterRole::Core("hi")],
        id: RegisterId(33),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Clear,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("lo")],
        id: RegisterId(34),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Clear,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("status")],
        id: RegisterId(35),
        data_type: RegisterDataType::UnsignedInteger(32),
        unwind_rule: UnwindRule::Clear,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("cause")],
        id: RegisterId(36),
        data_type: RegisterDataType::UnsignedInteger(32),
        unwind_rule: UnwindRule::Clear,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("badvaddr")],
        id: RegisterId(37),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Clear,
    },
    CoreRegister {
        roles: &[RegisterRole::Core("depc")],
        id: RegisterId(38),
        data_type: RegisterDataType::UnsignedInteger(64),
        unwind_rule: UnwindRule::Clear,
    },
];

/// The register id of GPR `$n` (`0..=31`), as addressed in
/// [`MIPS64_CORE_REGISTERS_SET`].
pub(crate) fn gpr_id(n: u8) -> RegisterId {
    RegisterId(n as u16)
}

/// The CP0 register/select pairs the `status`/`cause`/`badvaddr`/`depc`
/// entries above correspond to, used by the core driver to pick the right
/// `mfc0`/`dmfc0` encoding when it services a register read.
pub mod cp0 {
    /// (register, select) for the Status register.
    pub const STATUS: (u8, u8) = (12, 0);
    /// (register, select) for the Cause register.
    pub const CAUSE: (u8, u8) = (13, 0);
    /// (register, select) for BadVAddr.
    pub const BADVADDR: (u8, u8) = (8, 0);
    /// (register, select) for the EJTAG Debug Exception PC.
    pub const DEPC: (u8, u8) = (24, 0);
    /// (register, select) for the EJTAG Debug register.
    pub const DEBUG: (u8, u8) = (23, 0);
}

/// The MIPS64 [`CoreRegisters`] table, lazily built from
/// [`MIPS64_CORE_REGISTERS_SET`].
pub static MIPS64_CORE_REGISTERS: LazyLock<CoreRegisters> =
    LazyLock::new(|| CoreRegisters::new(MIPS64_CORE_REGISTERS_SET.iter().collect()));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_set_covers_all_32_gprs_plus_pc() {
        let file = &MIPS64_CORE_REGISTERS;
        assert!(file.by_id(RegisterId(0)).is_some());
        assert!(file.by_id(RegisterId(31)).is_some());
        assert!(file.by_id(RegisterId(32)).is_some());
    }

    #[test]
    fn stack_pointer_has_the_right_role() {
        let file = &MIPS64_CORE_REGISTERS;
        assert_eq!(file.by_role(RegisterRole::StackPointer).unwrap().id, RegisterId(29));
    }
}
