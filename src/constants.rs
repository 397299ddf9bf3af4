/// valid bits in CAN ID for frame formats
/// standard frame format (SFF)
pub const SFF_MASK: u32 = 0x000007ff;
/// extended frame format (EFF)
pub const EFF_MASK: u32 = 0x1fffffff;

/// Number of identifier bits in a standard frame
pub const SFF_BITS: u32 = 11;
/// Number of identifier bits in an extended frame
pub const EFF_BITS: u32 = 29;

// Controller types, first byte of every configuration blob.
// These must match the adapter firmware.
pub const DEV_BXCAN: u8 = 0;
pub const DEV_FDCAN_G0: u8 = 1;
pub const DEV_FDCAN_H7: u8 = 2;

/// Number of bxCAN filter banks
pub const BXCAN_BANKS: usize = 14;

// bxCAN register offsets of the identifier fields
pub const BXCAN_STD_LO_SHIFT: u32 = 5;
pub const BXCAN_STD_HI_SHIFT: u32 = 21;
pub const BXCAN_EXT_SHIFT: u32 = 3;

// FDCAN standard filter element (SFT, SFEC, SFID1, SFID2)
pub const SFT_SHIFT: u32 = 30;
pub const SFEC_SHIFT: u32 = 27;
pub const SFID1_SHIFT: u32 = 16;

// FDCAN extended filter element (EFEC, EFID1, EFT, EFID2)
pub const EFEC_SHIFT: u32 = 61;
pub const EFID1_SHIFT: u32 = 32;
pub const EFT_SHIFT: u32 = 30;

/// filter type field width mask (SFT / EFT)
pub const FT_MASK: u32 = 0x3;
/// element configuration field width mask (SFEC / EFEC)
pub const FEC_MASK: u32 = 0x7;

// filter types
pub const FT_RANGE: u32 = 0x0;
pub const FT_DUAL: u32 = 0x1;
pub const FT_CLASSIC: u32 = 0x2;
pub const FT_DISABLED: u32 = 0x3;
