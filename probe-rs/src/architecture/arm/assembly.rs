/// ARM breakpoint instruction (x2)
pub const BKPT: u32 = 0xBE00_BE00;
/// ARM hlt instruction, Thumb2 (x2)
pub const HLT: u32 = 0xBA80_BA80;
