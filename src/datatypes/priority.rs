// ABOUTME: Defines the X-Mms-Priority header values
// ABOUTME: Normal is the default a draft gets when the sender never chose one

use num_enum::TryFromPrimitive;

/// X-Mms-Priority (field 0x8F)
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Priority {
    Low = 0x80,
    #[default]
    Normal = 0x81,
    High = 0x82,
}
