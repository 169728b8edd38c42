use num_enum::TryFromPrimitive;

/// X-Mms-Message-Class (field 0x8A)
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum MessageClass {
    #[default]
    Personal = 0x80,
    Advertisement = 0x81,
    Informational = 0x82,
    Auto = 0x83,
}

/// X-Mms-Sender-Visibility (field 0x94)
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SenderVisibility {
    Hide = 0x80,
    #[default]
    Show = 0x81,
}
